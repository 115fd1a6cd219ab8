// ==========================================
// 印花工坊排程引擎 - 应用层
// ==========================================
// 职责: 组装配置、引擎、仓储与API
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
