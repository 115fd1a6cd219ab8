// ==========================================
// 印花工坊排程引擎 - 引擎层
// ==========================================
// 职责: 工序流水线、产能台账、排程引擎、查询视图
// 红线: 作业仓储与产能台账只由排程引擎写入
// ==========================================

pub mod capacity_ledger;
pub mod error;
pub mod events;
pub mod query;
pub mod scheduler;
pub mod stage_pipeline;

// 重导出核心引擎
pub use capacity_ledger::{CapacityLedger, LedgerDrift, LedgerKey};
pub use error::{SchedulingError, SchedulingResult};
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, ScheduleEvent, ScheduleEventPublisher,
    ScheduleEventType,
};
pub use query::ScheduleQuery;
pub use scheduler::{ReleaseOutcome, ScheduleOutcome, SchedulingEngine};
pub use stage_pipeline::StagePipeline;
