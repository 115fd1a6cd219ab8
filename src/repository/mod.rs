// ==========================================
// 印花工坊排程引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 设备登记表 (只读), 作业仓储, 操作日志
// 存储: 进程内; 持久化技术不在本核心范围
// ==========================================

pub mod action_log_repo;
pub mod equipment_registry;
pub mod error;
pub mod job_store;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use equipment_registry::EquipmentRegistry;
pub use error::{RepositoryError, RepositoryResult};
pub use job_store::JobStore;
