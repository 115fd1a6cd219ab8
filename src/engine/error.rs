// ==========================================
// 印花工坊排程引擎 - 引擎层错误类型
// ==========================================
// 红线: 所有失败同步返回, 且不留下任何部分修改
// 说明: 均为确定性校验失败, 引擎内部不重试
// ==========================================

use thiserror::Error;

use crate::domain::types::{DecorationMethod, JobStatus};
use crate::repository::error::RepositoryError;

/// 排程引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    /// 作业或设备不存在
    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    /// 设备与作业的工艺/工序不匹配
    #[error(
        "工序不匹配: job={job_id} ({job_method}/{job_stage}), equipment={equipment_id} ({equipment_method}/{equipment_stage})"
    )]
    StageMismatch {
        job_id: String,
        job_method: DecorationMethod,
        job_stage: String,
        equipment_id: String,
        equipment_method: DecorationMethod,
        equipment_stage: String,
    },

    /// 当前状态下不允许该操作
    #[error("无效的状态转换: job={job_id}, status={status}, operation={operation}")]
    InvalidStateTransition {
        job_id: String,
        status: JobStatus,
        operation: String,
    },

    /// 已是末道工序, 无法继续推进
    #[error("已是末道工序: job={job_id}, stage={stage}")]
    TerminalStage { job_id: String, stage: String },

    /// 完工要求作业位于末道工序
    #[error("尚未到达末道工序: job={job_id}, stage={stage}")]
    StageNotTerminal { job_id: String, stage: String },

    /// 作业登记被拒绝
    #[error("作业无效: {0}")]
    InvalidJob(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl SchedulingError {
    /// 稳定的错误码, 供传输层映射
    pub fn code(&self) -> &'static str {
        match self {
            SchedulingError::NotFound { .. } => "NOT_FOUND",
            SchedulingError::StageMismatch { .. } => "STAGE_MISMATCH",
            SchedulingError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            SchedulingError::TerminalStage { .. } => "TERMINAL_STAGE",
            SchedulingError::StageNotTerminal { .. } => "STAGE_NOT_TERMINAL",
            SchedulingError::InvalidJob(_) => "INVALID_JOB",
            SchedulingError::Internal(_) => "INTERNAL",
        }
    }

    pub(crate) fn invalid_transition(job_id: &str, status: JobStatus, operation: &str) -> Self {
        SchedulingError::InvalidStateTransition {
            job_id: job_id.to_string(),
            status,
            operation: operation.to_string(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for SchedulingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => SchedulingError::NotFound { entity, id },
            RepositoryError::DuplicateKey { entity, id } => {
                SchedulingError::InvalidJob(format!("{}(id={})已存在", entity, id))
            }
            RepositoryError::LockError(msg) => SchedulingError::Internal(format!("锁获取失败: {}", msg)),
        }
    }
}

/// Result 类型别名
pub type SchedulingResult<T> = Result<T, SchedulingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let err: SchedulingError = RepositoryError::NotFound {
            entity: "Job".to_string(),
            id: "J9".to_string(),
        }
        .into();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("J9"));

        let err: SchedulingError = RepositoryError::DuplicateKey {
            entity: "Job".to_string(),
            id: "J1".to_string(),
        }
        .into();
        assert!(matches!(err, SchedulingError::InvalidJob(_)));

        let err: SchedulingError = RepositoryError::LockError("poisoned".to_string()).into();
        assert_eq!(err.code(), "INTERNAL");
    }
}
