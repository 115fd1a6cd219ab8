// ==========================================
// 印花工坊排程引擎 - 生产作业领域模型
// ==========================================
// 红线1: 设备/开始/结束三字段同设同清,以 ScheduleSlot 整体表达
// 红线2: scheduled_end = scheduled_start + estimated_duration (派生,不可单独设置)
// 红线3: current_stage 只前进,撤排不回退工序
// ==========================================
// 说明: 状态字段仅允许引擎 (crate 内) 修改
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{DecorationMethod, JobPriority, JobStatus};

/// 单个作业允许的最大预计工时 (分钟), 30 天
pub const MAX_ESTIMATED_DURATION_MIN: i64 = 30 * 24 * 60;

// ==========================================
// ScheduleSlot - 设备时段
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSlot {
    equipment_id: String,
    scheduled_start: NaiveDateTime,
    scheduled_end: NaiveDateTime,
}

impl ScheduleSlot {
    /// 由开始时间和工时派生时段; 时间溢出时返回 None
    pub(crate) fn new(
        equipment_id: &str,
        start: NaiveDateTime,
        duration: Duration,
    ) -> Option<Self> {
        let end = start.checked_add_signed(duration)?;
        Some(Self {
            equipment_id: equipment_id.to_string(),
            scheduled_start: start,
            scheduled_end: end,
        })
    }

    pub fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    pub fn scheduled_start(&self) -> NaiveDateTime {
        self.scheduled_start
    }

    pub fn scheduled_end(&self) -> NaiveDateTime {
        self.scheduled_end
    }
}

// ==========================================
// NewJob - 作业登记请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub id: String,
    pub job_number: String,
    pub customer: String,
    pub decoration_method: DecorationMethod,
    pub quantity: u32,
    pub estimated_duration_min: i64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: JobPriority,
    #[serde(default)]
    pub artwork_approved: bool,
}

// ==========================================
// Job - 生产作业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    // ===== 基本信息 (登记后不变) =====
    pub id: String,                          // 作业ID
    pub job_number: String,                  // 作业单号
    pub customer: String,                    // 客户
    pub decoration_method: DecorationMethod, // 装饰工艺
    pub quantity: u32,                       // 件数
    pub estimated_duration_min: i64,         // 预计工时 (分钟)
    pub due_date: NaiveDate,                 // 交期
    pub priority: JobPriority,               // 优先级
    pub artwork_approved: bool,              // 稿件已确认

    // ===== 排程状态 (仅引擎修改) =====
    current_stage: String,
    status: JobStatus,
    #[serde(flatten)]
    slot: Option<ScheduleSlot>,
}

impl Job {
    /// 登记新作业: 待排状态,位于工艺首道工序
    pub(crate) fn from_new(new_job: NewJob, first_stage: &str) -> Self {
        Self {
            id: new_job.id,
            job_number: new_job.job_number,
            customer: new_job.customer,
            decoration_method: new_job.decoration_method,
            quantity: new_job.quantity,
            estimated_duration_min: new_job.estimated_duration_min,
            due_date: new_job.due_date,
            priority: new_job.priority,
            artwork_approved: new_job.artwork_approved,
            current_stage: first_stage.to_string(),
            status: JobStatus::Unscheduled,
            slot: None,
        }
    }

    pub fn current_stage(&self) -> &str {
        &self.current_stage
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn slot(&self) -> Option<&ScheduleSlot> {
        self.slot.as_ref()
    }

    pub fn equipment_id(&self) -> Option<&str> {
        self.slot.as_ref().map(|s| s.equipment_id())
    }

    pub fn scheduled_start(&self) -> Option<NaiveDateTime> {
        self.slot.as_ref().map(|s| s.scheduled_start())
    }

    pub fn scheduled_end(&self) -> Option<NaiveDateTime> {
        self.slot.as_ref().map(|s| s.scheduled_end())
    }

    pub fn estimated_duration(&self) -> Duration {
        Duration::minutes(self.estimated_duration_min)
    }

    /// 检查状态与时段的一致性
    ///
    /// # 返回
    /// - `true`: 占用设备的状态必有完整时段,待排状态必无时段,且结束时间等于开始加工时
    pub fn is_consistent(&self) -> bool {
        match (&self.slot, self.status.holds_slot()) {
            (None, false) => true,
            (Some(slot), true) => {
                slot.scheduled_start
                    .checked_add_signed(self.estimated_duration())
                    .map(|end| end == slot.scheduled_end)
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    // ==========================================
    // 引擎专用状态迁移
    // ==========================================

    pub(crate) fn assign(&mut self, slot: ScheduleSlot) {
        self.slot = Some(slot);
        self.status = JobStatus::Scheduled;
    }

    /// 清空时段并回到待排, 返回被释放的时段
    pub(crate) fn release(&mut self) -> Option<ScheduleSlot> {
        self.status = JobStatus::Unscheduled;
        self.slot.take()
    }

    pub(crate) fn move_to_stage(&mut self, stage_id: &str) {
        self.current_stage = stage_id.to_string();
    }

    pub(crate) fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }
}
