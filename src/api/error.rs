// ==========================================
// 印花工坊排程引擎 - API层错误类型
// ==========================================
// 职责: 将引擎/导入/配置错误转换为用户友好的错误消息
// 约束: 所有错误信息必须包含显式原因
// ==========================================

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::SchedulingError;
use crate::importer::ImportError;
use crate::repository::RepositoryError;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 排程规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("工序不匹配: {0}")]
    StageMismatch(String),

    #[error("无效的状态转换: job={job_id}, status={status}, operation={operation}")]
    InvalidStateTransition {
        job_id: String,
        status: String,
        operation: String,
    },

    #[error("已是末道工序: {0}")]
    TerminalStage(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 外部数据错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 稳定的错误码, 供前端区分处理
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::StageMismatch(_) => "STAGE_MISMATCH",
            ApiError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ApiError::TerminalStage(_) => "TERMINAL_STAGE",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 SchedulingError 转换
// ==========================================
impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            e @ SchedulingError::StageMismatch { .. } => ApiError::StageMismatch(e.to_string()),
            SchedulingError::InvalidStateTransition {
                job_id,
                status,
                operation,
            } => ApiError::InvalidStateTransition {
                job_id,
                status: status.to_string(),
                operation,
            },
            SchedulingError::TerminalStage { job_id, stage } => ApiError::TerminalStage(format!(
                "作业{}位于末道工序{}，请执行完工",
                job_id, stage
            )),
            e @ SchedulingError::StageNotTerminal { .. } => {
                ApiError::BusinessRuleViolation(e.to_string())
            }
            SchedulingError::InvalidJob(msg) => ApiError::InvalidInput(msg),
            SchedulingError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        SchedulingError::from(err).into()
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
