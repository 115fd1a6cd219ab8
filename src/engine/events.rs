// ==========================================
// 印花工坊排程引擎 - 引擎层事件发布
// ==========================================
// 职责: 定义排程事件发布 trait, 实现依赖倒置
// 说明: Engine 层定义 trait, 展示层/传输层实现适配器
// 约束: 发布失败只记日志, 不影响已完成的排程操作
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 排程事件类型
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEventType {
    /// 作业登记
    JobRegistered,
    /// 作业排入设备
    JobScheduled,
    /// 作业撤排
    JobUnscheduled,
    /// 工序推进 (隐含撤排)
    StageAdvanced,
    /// 开工
    JobStarted,
    /// 完工
    JobCompleted,
}

impl ScheduleEventType {
    pub fn as_str(&self) -> &str {
        match self {
            ScheduleEventType::JobRegistered => "JobRegistered",
            ScheduleEventType::JobScheduled => "JobScheduled",
            ScheduleEventType::JobUnscheduled => "JobUnscheduled",
            ScheduleEventType::StageAdvanced => "StageAdvanced",
            ScheduleEventType::JobStarted => "JobStarted",
            ScheduleEventType::JobCompleted => "JobCompleted",
        }
    }
}

/// 排程事件
///
/// 携带受影响的设备与排程日, 便于下游只刷新对应的看板格子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    /// 作业ID
    pub job_id: String,
    /// 事件类型
    pub event_type: ScheduleEventType,
    /// 受影响设备 (登记/推进到未排状态时可能为空)
    pub equipment_id: Option<String>,
    /// 受影响排程日
    pub day: Option<NaiveDate>,
    /// 事件发生后作业所在工序
    pub stage_id: String,
}

impl ScheduleEvent {
    pub fn new(job_id: &str, event_type: ScheduleEventType, stage_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            event_type,
            equipment_id: None,
            day: None,
            stage_id: stage_id.to_string(),
        }
    }

    /// 附加受影响的 (设备, 日)
    pub fn with_slot(mut self, equipment_id: &str, day: NaiveDate) -> Self {
        self.equipment_id = Some(equipment_id.to_string());
        self.day = Some(day);
        self
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 排程事件发布者 Trait
pub trait ScheduleEventPublisher: Send + Sync {
    /// 发布排程事件
    ///
    /// # 返回
    /// - `Ok(task_id)`: 下游任务 ID (如果支持) 或空字符串
    /// - `Err`: 发布失败
    fn publish(&self, event: ScheduleEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景 (如单元测试)
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl ScheduleEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: ScheduleEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - job_id={}, event_type={}",
            event.job_id,
            event.event_type.as_str()
        );
        Ok(String::new())
    }
}

/// 可选的事件发布者包装
#[derive(Clone, Default)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn ScheduleEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn ScheduleEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件 (如果有发布者); 失败只记警告
    pub fn publish(&self, event: ScheduleEvent) {
        match &self.inner {
            Some(publisher) => {
                let job_id = event.job_id.clone();
                let event_type = event.event_type;
                if let Err(e) = publisher.publish(event) {
                    tracing::warn!(
                        job_id = %job_id,
                        event_type = event_type.as_str(),
                        error = %e,
                        "排程事件发布失败"
                    );
                }
            }
            None => {
                tracing::trace!(
                    "OptionalEventPublisher: 未配置发布者，跳过事件 - job_id={}, event_type={}",
                    event.job_id,
                    event.event_type.as_str()
                );
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}
