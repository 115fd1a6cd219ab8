// ==========================================
// 印花工坊排程引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含存储逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod capacity;
pub mod equipment;
pub mod job;
pub mod stage;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use capacity::{CapacityConstraint, CapacityUtilization};
pub use equipment::Equipment;
pub use job::{Job, NewJob, ScheduleSlot, MAX_ESTIMATED_DURATION_MIN};
pub use stage::Stage;
pub use types::{DecorationMethod, JobPriority, JobStatus, UtilizationLevel};
