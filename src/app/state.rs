// ==========================================
// 印花工坊排程引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 引擎以 Arc 共享, 各 API 并发调用同一实例
// ==========================================

use std::path::Path;
use std::sync::Arc;

use crate::api::{ImportApi, QueryApi, ScheduleApi};
use crate::config::{ConfigManager, ConfigSource, ShopConfig};
use crate::engine::{ScheduleEventPublisher, SchedulingEngine};
use crate::repository::action_log_repo::ActionLogRepository;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 配置来源
    pub config_source: ConfigSource,

    /// 排程引擎
    pub engine: Arc<SchedulingEngine>,

    /// 排程操作API
    pub schedule_api: Arc<ScheduleApi>,

    /// 看板查询API
    pub query_api: Arc<QueryApi>,

    /// 作业导入API
    pub import_api: Arc<ImportApi>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 按配置查找顺序加载配置并创建AppState
    ///
    /// # 参数
    /// - config_path: 显式指定的配置文件 (优先于环境变量与默认位置)
    pub fn load(config_path: Option<&Path>) -> Result<Self, String> {
        let manager = ConfigManager::load(config_path).map_err(|e| format!("无法加载工坊配置: {}", e))?;
        Self::from_manager(manager, None)
    }

    /// 由已加载的配置创建AppState
    pub fn new(config: ShopConfig) -> Result<Self, String> {
        Self::build(config, ConfigSource::Builtin, None)
    }

    /// 创建带事件发布器的AppState (用于下游看板刷新)
    pub fn from_manager(
        manager: ConfigManager,
        event_publisher: Option<Arc<dyn ScheduleEventPublisher>>,
    ) -> Result<Self, String> {
        let source = manager.source().clone();
        Self::build(manager.into_config(), source, event_publisher)
    }

    fn build(
        config: ShopConfig,
        config_source: ConfigSource,
        event_publisher: Option<Arc<dyn ScheduleEventPublisher>>,
    ) -> Result<Self, String> {
        tracing::info!(source = ?config_source, methods = config.methods.len(), "初始化AppState");

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let mut engine = SchedulingEngine::from_config(&config)
            .map_err(|e| format!("无法创建SchedulingEngine: {}", e))?;
        if let Some(publisher) = event_publisher {
            engine = engine.with_event_publisher(publisher);
        }
        let engine = Arc::new(engine);

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let action_log_repo = Arc::new(ActionLogRepository::new());

        // ==========================================
        // 初始化API层
        // ==========================================
        let schedule_api = Arc::new(ScheduleApi::new(engine.clone(), action_log_repo.clone()));
        let query_api = Arc::new(QueryApi::new(engine.clone()));
        let import_api = Arc::new(ImportApi::new(engine.clone(), action_log_repo.clone()));

        tracing::info!(equipment = engine.registry().len(), "AppState初始化完成");

        Ok(Self {
            config_source,
            engine,
            schedule_api,
            query_api,
            import_api,
            action_log_repo,
        })
    }
}
