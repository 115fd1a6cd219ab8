// ==========================================
// 印花工坊排程引擎 - API 层
// ==========================================
// 职责: 面向看板/传输层的门面, 字符串参数解析, 操作日志记录
// 红线: 不含排程规则, 规则全部委托给引擎
// ==========================================

pub mod error;
pub mod import_api;
pub mod query_api;
pub mod request;
pub mod schedule_api;

// 重导出核心API
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use query_api::{DueDateBucket, EquipmentLane, QueryApi, StageBoard};
pub use request::{ScheduleRequest, UtilizationRequest};
pub use schedule_api::{ScheduleApi, ScheduleResponse, UtilizationResponse};
