// ==========================================
// 印花工坊排程引擎 - 核心库
// ==========================================
// 职责: 作业按工艺工序流转, 排入设备, 按设备日跟踪产能负荷
// 系统定位: 人工排程辅助 (超排只提示, 不拒绝)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 进程内存储
pub mod repository;

// 引擎层 - 排程规则
pub mod engine;

// 导入层 - 外部作业清单
pub mod importer;

// 配置层 - 工坊配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DecorationMethod, JobPriority, JobStatus, UtilizationLevel};

// 领域实体
pub use domain::{ActionLog, ActionType, CapacityUtilization, Equipment, Job, NewJob, Stage};

// 引擎
pub use engine::{ReleaseOutcome, ScheduleOutcome, SchedulingEngine, SchedulingError, StagePipeline};

// 配置
pub use config::{ConfigManager, ShopConfig};

// API
pub use api::{ApiError, ImportApi, QueryApi, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "印花工坊排程引擎";
