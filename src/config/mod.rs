// ==========================================
// 印花工坊排程引擎 - 配置层
// ==========================================
// 职责: 工艺 → 有序工序 → 设备清单 的静态配置加载与校验
// 来源: 外部设置子系统导出的 JSON 文件,或内置默认工坊
// ==========================================

pub mod config_manager;
pub mod error;
pub mod shop_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, ConfigSource};
pub use error::{ConfigError, ConfigResult};
pub use shop_config::{EngineSettings, EquipmentConfig, MethodPipelineConfig, ShopConfig, StageConfig};
