// ==========================================
// 印花工坊排程引擎 - 排程引擎
// ==========================================
// 职责: 校验并原子地执行 排入/撤排/推进工序 (以及登记/开工/完工)
// 红线1: 失败不留下任何部分修改 (作业仓储与产能台账均不变)
// 红线2: 产能只提示, 超排不拒绝
// 红线3: 同一作业上的操作串行 (作业锁), 台账更新在台账锁内串行
// ==========================================
// 锁顺序: 变更闸门 → 作业锁 → 台账锁, 查询路径从不反向持有
// 事件在全部锁释放后发布, 发布者可回读引擎
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::instrument;

use crate::config::{ConfigResult, EngineSettings, ShopConfig};
use crate::domain::capacity::CapacityUtilization;
use crate::domain::job::{Job, NewJob, ScheduleSlot, MAX_ESTIMATED_DURATION_MIN};
use crate::domain::types::JobStatus;
use crate::engine::capacity_ledger::{CapacityLedger, LedgerDrift};
use crate::engine::error::{SchedulingError, SchedulingResult};
use crate::engine::events::{
    OptionalEventPublisher, ScheduleEvent, ScheduleEventPublisher, ScheduleEventType,
};
use crate::engine::query::ScheduleQuery;
use crate::engine::stage_pipeline::StagePipeline;
use crate::repository::equipment_registry::EquipmentRegistry;
use crate::repository::job_store::{lock_job, JobStore};

/// 排入结果: 更新后的作业 + 排入后的设备日负荷
///
/// 超排时 utilization.level 为 Overbooked, 由调用方决定是否提示
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOutcome {
    pub job: Job,
    pub utilization: CapacityUtilization,
}

/// 释放结果 (撤排 / 推进工序): 更新后的作业 + 实际释放的时段
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    pub job: Job,
    pub released_slot: ScheduleSlot,
    pub released_day: NaiveDate,
    pub from_stage: String,
}

// ==========================================
// SchedulingEngine - 排程引擎
// ==========================================
pub struct SchedulingEngine {
    pipeline: StagePipeline,
    registry: EquipmentRegistry,
    jobs: JobStore,
    ledger: CapacityLedger,
    settings: EngineSettings,
    // 事件发布器 (依赖倒置)
    event_publisher: OptionalEventPublisher,
    // 排程变更持读锁, 台账审计/重建持写锁
    mutation_gate: RwLock<()>,
}

impl SchedulingEngine {
    /// 由工坊配置构建引擎 (配置先校验)
    pub fn from_config(config: &ShopConfig) -> ConfigResult<Self> {
        config.validate()?;

        let engine = Self {
            pipeline: StagePipeline::from_config(config),
            registry: EquipmentRegistry::from_config(config),
            jobs: JobStore::new(),
            ledger: CapacityLedger::new(&config.engine),
            settings: config.engine.clone(),
            event_publisher: OptionalEventPublisher::none(),
            mutation_gate: RwLock::new(()),
        };

        tracing::info!(
            methods = engine.pipeline.methods().len(),
            equipment = engine.registry.len(),
            "排程引擎初始化完成"
        );
        Ok(engine)
    }

    /// 注入事件发布器
    pub fn with_event_publisher(mut self, publisher: Arc<dyn ScheduleEventPublisher>) -> Self {
        self.event_publisher = OptionalEventPublisher::with_publisher(publisher);
        self
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn pipeline(&self) -> &StagePipeline {
        &self.pipeline
    }

    pub fn registry(&self) -> &EquipmentRegistry {
        &self.registry
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 查询视图
    pub fn query(&self) -> ScheduleQuery<'_> {
        ScheduleQuery::new(&self.pipeline, &self.registry, &self.jobs, &self.ledger)
    }

    pub fn get_job(&self, job_id: &str) -> SchedulingResult<Job> {
        Ok(self.jobs.get(job_id)?)
    }

    // ==========================================
    // 作业登记
    // ==========================================

    /// 登记新作业: 待排状态, 位于工艺首道工序
    #[instrument(skip_all, fields(job_id = %new_job.id, method = %new_job.decoration_method))]
    pub fn register_job(&self, new_job: NewJob) -> SchedulingResult<Job> {
        if new_job.id.trim().is_empty() {
            return Err(SchedulingError::InvalidJob("作业ID不能为空".to_string()));
        }
        if new_job.quantity == 0 {
            return Err(SchedulingError::InvalidJob(format!(
                "作业{}件数必须大于 0",
                new_job.id
            )));
        }
        if new_job.estimated_duration_min <= 0
            || new_job.estimated_duration_min > MAX_ESTIMATED_DURATION_MIN
        {
            return Err(SchedulingError::InvalidJob(format!(
                "作业{}预计工时{}分钟超出范围 (0, {}]",
                new_job.id, new_job.estimated_duration_min, MAX_ESTIMATED_DURATION_MIN
            )));
        }

        let first_stage = self
            .pipeline
            .first_stage(new_job.decoration_method)
            .ok_or_else(|| {
                SchedulingError::InvalidJob(format!(
                    "工艺{}未配置工序流水线",
                    new_job.decoration_method
                ))
            })?;

        let job = Job::from_new(new_job, &first_stage.id);
        self.jobs.insert(job.clone())?;

        tracing::info!(stage = %job.current_stage(), quantity = job.quantity, "作业登记完成");
        self.event_publisher.publish(ScheduleEvent::new(
            &job.id,
            ScheduleEventType::JobRegistered,
            job.current_stage(),
        ));
        Ok(job)
    }

    // ==========================================
    // 核心操作
    // ==========================================
    // 每个操作: 闸门(读) → 作业锁 → 台账锁, 提交后释放全部锁再发布事件

    /// 将作业排入设备
    ///
    /// 前置条件:
    /// 1) 作业存在且处于待排
    /// 2) 设备存在
    /// 3) 设备的工艺与工序同作业当前一致
    ///
    /// 效果: 状态 → scheduled, 时段 = [start, start + 工时), 台账 +quantity
    /// 超排不拒绝, 结果中带回负荷供调用方提示
    #[instrument(skip_all, fields(job_id = %job_id, equipment_id = %equipment_id, start = %start))]
    pub fn schedule(
        &self,
        job_id: &str,
        equipment_id: &str,
        start: NaiveDateTime,
    ) -> SchedulingResult<ScheduleOutcome> {
        let (outcome, event) = {
            let _gate = self.enter_mutation()?;
            let handle = self.jobs.handle(job_id)?;
            let mut job = lock_job(&handle)?;

            let equipment = self.registry.get_equipment(equipment_id)?;

            if job.status() != JobStatus::Unscheduled {
                tracing::warn!(status = %job.status(), "排入被拒绝: 作业不在待排状态");
                return Err(SchedulingError::invalid_transition(job_id, job.status(), "schedule"));
            }

            if !equipment.serves(job.decoration_method, job.current_stage()) {
                tracing::warn!(
                    job_stage = %job.current_stage(),
                    equipment_stage = %equipment.stage_id,
                    "排入被拒绝: 工序不匹配"
                );
                return Err(SchedulingError::StageMismatch {
                    job_id: job_id.to_string(),
                    job_method: job.decoration_method,
                    job_stage: job.current_stage().to_string(),
                    equipment_id: equipment.id.clone(),
                    equipment_method: equipment.decoration_method,
                    equipment_stage: equipment.stage_id.clone(),
                });
            }

            let slot = ScheduleSlot::new(&equipment.id, start, job.estimated_duration()).ok_or_else(
                || SchedulingError::InvalidJob(format!("作业{}结束时间超出可表示范围", job_id)),
            )?;

            // 台账先记, 失败时作业未被修改
            let day = self.ledger.day_of(start);
            let total = self.ledger.book(&equipment.id, day, job.quantity as u64)?;
            job.assign(slot);

            let utilization = CapacityUtilization::compute(
                &equipment.id,
                day,
                total,
                equipment.rated_capacity,
                self.settings.near_capacity_pct,
            );

            tracing::info!(
                %day,
                assigned = utilization.assigned_quantity,
                rated = utilization.rated_capacity,
                pct = utilization.percentage,
                level = %utilization.level,
                "作业排入完成"
            );

            let event = ScheduleEvent::new(job_id, ScheduleEventType::JobScheduled, job.current_stage())
                .with_slot(&equipment.id, day);
            (
                ScheduleOutcome {
                    job: job.clone(),
                    utilization,
                },
                event,
            )
        };

        self.event_publisher.publish(event);
        Ok(outcome)
    }

    /// 撤排: 清空时段, 回到待排; 工序不回退
    ///
    /// 前置条件: 状态为 scheduled 或 in_progress
    #[instrument(skip_all, fields(job_id = %job_id))]
    pub fn unschedule(&self, job_id: &str) -> SchedulingResult<ReleaseOutcome> {
        let outcome = {
            let _gate = self.enter_mutation()?;
            let handle = self.jobs.handle(job_id)?;
            let mut job = lock_job(&handle)?;

            if !matches!(job.status(), JobStatus::Scheduled | JobStatus::InProgress) {
                tracing::warn!(status = %job.status(), "撤排被拒绝");
                return Err(SchedulingError::invalid_transition(job_id, job.status(), "unschedule"));
            }

            let from_stage = job.current_stage().to_string();
            let (released_slot, released_day) = self.release_slot(&mut job)?;

            tracing::info!(equipment_id = %released_slot.equipment_id(), day = %released_day, "作业撤排完成");
            ReleaseOutcome {
                job: job.clone(),
                released_slot,
                released_day,
                from_stage,
            }
        };

        self.event_publisher.publish(
            ScheduleEvent::new(job_id, ScheduleEventType::JobUnscheduled, outcome.job.current_stage())
                .with_slot(outcome.released_slot.equipment_id(), outcome.released_day),
        );
        Ok(outcome)
    }

    /// 推进到下一道工序, 并隐含撤排 (新工序需重新排入对应设备)
    ///
    /// 前置条件:
    /// 1) 状态为 scheduled 或 in_progress
    /// 2) 当前工序存在下一道 (否则 TerminalStage, 应走完工)
    #[instrument(skip_all, fields(job_id = %job_id))]
    pub fn advance_stage(&self, job_id: &str) -> SchedulingResult<ReleaseOutcome> {
        let outcome = {
            let _gate = self.enter_mutation()?;
            let handle = self.jobs.handle(job_id)?;
            let mut job = lock_job(&handle)?;

            if !matches!(job.status(), JobStatus::Scheduled | JobStatus::InProgress) {
                tracing::warn!(status = %job.status(), "推进工序被拒绝");
                return Err(SchedulingError::invalid_transition(job_id, job.status(), "advance_stage"));
            }

            let next_stage = self
                .pipeline
                .next_stage(job.decoration_method, job.current_stage())
                .ok_or_else(|| SchedulingError::TerminalStage {
                    job_id: job_id.to_string(),
                    stage: job.current_stage().to_string(),
                })?
                .id
                .clone();

            let from_stage = job.current_stage().to_string();
            let (released_slot, released_day) = self.release_slot(&mut job)?;
            job.move_to_stage(&next_stage);

            tracing::info!(
                from = %from_stage,
                to = %next_stage,
                equipment_id = %released_slot.equipment_id(),
                "工序推进完成"
            );
            ReleaseOutcome {
                job: job.clone(),
                released_slot,
                released_day,
                from_stage,
            }
        };

        self.event_publisher.publish(
            ScheduleEvent::new(job_id, ScheduleEventType::StageAdvanced, outcome.job.current_stage())
                .with_slot(outcome.released_slot.equipment_id(), outcome.released_day),
        );
        Ok(outcome)
    }

    /// 开工: scheduled → in_progress, 保留时段
    #[instrument(skip_all, fields(job_id = %job_id))]
    pub fn start_job(&self, job_id: &str) -> SchedulingResult<Job> {
        let job = {
            let _gate = self.enter_mutation()?;
            let handle = self.jobs.handle(job_id)?;
            let mut job = lock_job(&handle)?;

            if job.status() != JobStatus::Scheduled {
                return Err(SchedulingError::invalid_transition(job_id, job.status(), "start"));
            }
            job.set_status(JobStatus::InProgress);

            tracing::info!(stage = %job.current_stage(), "作业开工");
            job.clone()
        };

        self.event_publisher
            .publish(self.slot_event(&job, ScheduleEventType::JobStarted));
        Ok(job)
    }

    /// 完工: scheduled/in_progress → completed, 仅限末道工序
    ///
    /// 完工作业保留时段并继续计入台账
    #[instrument(skip_all, fields(job_id = %job_id))]
    pub fn complete_job(&self, job_id: &str) -> SchedulingResult<Job> {
        let job = {
            let _gate = self.enter_mutation()?;
            let handle = self.jobs.handle(job_id)?;
            let mut job = lock_job(&handle)?;

            if !matches!(job.status(), JobStatus::Scheduled | JobStatus::InProgress) {
                return Err(SchedulingError::invalid_transition(job_id, job.status(), "complete"));
            }
            if !self.pipeline.is_terminal(job.decoration_method, job.current_stage()) {
                return Err(SchedulingError::StageNotTerminal {
                    job_id: job_id.to_string(),
                    stage: job.current_stage().to_string(),
                });
            }
            job.set_status(JobStatus::Completed);

            tracing::info!(stage = %job.current_stage(), "作业完工");
            job.clone()
        };

        self.event_publisher
            .publish(self.slot_event(&job, ScheduleEventType::JobCompleted));
        Ok(job)
    }

    // ==========================================
    // 产能查询
    // ==========================================

    pub fn utilization(&self, equipment_id: &str, day: NaiveDate) -> SchedulingResult<CapacityUtilization> {
        let equipment = self.registry.get_equipment(equipment_id)?;
        Ok(self.ledger.utilization(equipment, day)?)
    }

    /// 软检查: 追加 quantity 后是否超过额定产能
    pub fn would_exceed(&self, equipment_id: &str, day: NaiveDate, additional: u64) -> SchedulingResult<bool> {
        let equipment = self.registry.get_equipment(equipment_id)?;
        Ok(self.ledger.would_exceed(equipment, day, additional)?)
    }

    // ==========================================
    // 台账审计 (闸门写锁: 期间无排程变更)
    // ==========================================

    /// 台账自检: 返回台账与作业仓储之间的偏差 (正常应为空)
    pub fn verify_ledger(&self) -> SchedulingResult<Vec<LedgerDrift>> {
        let _gate = self.enter_audit()?;
        let jobs = self.jobs.list_all()?;
        let drift = self.ledger.diff_against(&jobs)?;
        if !drift.is_empty() {
            tracing::error!(entries = drift.len(), "产能台账与作业仓储不一致");
        }
        Ok(drift)
    }

    /// 由作业仓储重建台账
    pub fn rebuild_ledger(&self) -> SchedulingResult<()> {
        let _gate = self.enter_audit()?;
        let jobs = self.jobs.list_all()?;
        self.ledger.rebuild(&jobs)?;
        tracing::info!(jobs = jobs.len(), "产能台账已重建");
        Ok(())
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn enter_mutation(&self) -> SchedulingResult<RwLockReadGuard<'_, ()>> {
        self.mutation_gate
            .read()
            .map_err(|e| SchedulingError::Internal(format!("变更闸门获取失败: {}", e)))
    }

    fn enter_audit(&self) -> SchedulingResult<RwLockWriteGuard<'_, ()>> {
        self.mutation_gate
            .write()
            .map_err(|e| SchedulingError::Internal(format!("审计闸门获取失败: {}", e)))
    }

    /// 释放作业时段与台账件数 (调用方已持有作业锁)
    ///
    /// 台账先释放, 失败时作业未被修改
    fn release_slot(&self, job: &mut Job) -> SchedulingResult<(ScheduleSlot, NaiveDate)> {
        let slot = job.slot().cloned().ok_or_else(|| {
            SchedulingError::Internal(format!("作业{}状态为{}但缺少时段", job.id, job.status()))
        })?;
        let day = self.ledger.day_of(slot.scheduled_start());
        self.ledger.release(slot.equipment_id(), day, job.quantity as u64)?;
        job.release();
        Ok((slot, day))
    }

    fn slot_event(&self, job: &Job, event_type: ScheduleEventType) -> ScheduleEvent {
        let mut event = ScheduleEvent::new(&job.id, event_type, job.current_stage());
        if let Some(slot) = job.slot() {
            event = event.with_slot(slot.equipment_id(), self.ledger.day_of(slot.scheduled_start()));
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{DecorationMethod, JobPriority, UtilizationLevel};

    fn engine() -> SchedulingEngine {
        SchedulingEngine::from_config(&ShopConfig::builtin()).unwrap()
    }

    fn new_job(id: &str, quantity: u32) -> NewJob {
        NewJob {
            id: id.to_string(),
            job_number: format!("WO-{}", id),
            customer: "Acme Tees".to_string(),
            decoration_method: DecorationMethod::ScreenPrinting,
            quantity,
            estimated_duration_min: 180,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
            priority: JobPriority::Normal,
            artwork_approved: true,
        }
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn day1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let engine = engine();
        assert!(matches!(
            engine.register_job(new_job("J0", 0)),
            Err(SchedulingError::InvalidJob(_))
        ));

        let mut job = new_job("J1", 10);
        job.estimated_duration_min = 0;
        assert!(matches!(engine.register_job(job), Err(SchedulingError::InvalidJob(_))));

        engine.register_job(new_job("J2", 10)).unwrap();
        assert!(matches!(
            engine.register_job(new_job("J2", 10)),
            Err(SchedulingError::InvalidJob(_))
        ));
        assert_eq!(engine.jobs().len(), 1);
    }

    #[test]
    fn test_register_rejects_unconfigured_method() {
        let mut config = ShopConfig::builtin();
        config.methods.retain(|m| m.method != DecorationMethod::ScreenPrinting);
        let engine = SchedulingEngine::from_config(&config).unwrap();
        assert!(matches!(
            engine.register_job(new_job("J1", 10)),
            Err(SchedulingError::InvalidJob(_))
        ));
    }

    #[test]
    fn test_schedule_sets_slot_and_books_ledger() {
        let engine = engine();
        engine.register_job(new_job("J1", 144)).unwrap();

        let outcome = engine.schedule("J1", "screen-room-1", at(1, 9)).unwrap();
        assert_eq!(outcome.job.status(), JobStatus::Scheduled);
        assert_eq!(outcome.job.scheduled_end(), Some(at(1, 12)));
        assert_eq!(outcome.utilization.assigned_quantity, 144);
        assert_eq!(engine.utilization("screen-room-1", day1()).unwrap().assigned_quantity, 144);
        assert!(engine.verify_ledger().unwrap().is_empty());
    }

    #[test]
    fn test_schedule_twice_is_invalid_transition() {
        let engine = engine();
        engine.register_job(new_job("J1", 144)).unwrap();
        engine.schedule("J1", "screen-room-1", at(1, 9)).unwrap();

        let err = engine.schedule("J1", "screen-room-2", at(1, 13)).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
        let job = engine.get_job("J1").unwrap();
        assert_eq!(job.equipment_id(), Some("screen-room-1"));
        assert_eq!(engine.utilization("screen-room-2", day1()).unwrap().assigned_quantity, 0);
    }

    #[test]
    fn test_schedule_missing_entities() {
        let engine = engine();
        engine.register_job(new_job("J1", 144)).unwrap();

        assert!(matches!(
            engine.schedule("J404", "screen-room-1", at(1, 9)),
            Err(SchedulingError::NotFound { .. })
        ));
        assert!(matches!(
            engine.schedule("J1", "laser-1", at(1, 9)),
            Err(SchedulingError::NotFound { .. })
        ));
        assert_eq!(engine.get_job("J1").unwrap().status(), JobStatus::Unscheduled);
    }

    #[test]
    fn test_overbooking_never_rejected() {
        let engine = engine();
        engine.register_job(new_job("J1", 300)).unwrap();
        engine.register_job(new_job("J2", 300)).unwrap();

        assert!(engine.would_exceed("screen-room-1", day1(), 500).unwrap());
        engine.schedule("J1", "screen-room-1", at(1, 8)).unwrap();
        let outcome = engine.schedule("J2", "screen-room-1", at(1, 13)).unwrap();

        assert_eq!(outcome.utilization.level, UtilizationLevel::Overbooked);
        assert_eq!(outcome.utilization.percentage, 150.0);
    }

    #[test]
    fn test_start_and_complete_lifecycle() {
        let engine = engine();
        engine.register_job(new_job("J1", 100)).unwrap();

        // 未排作业不能开工
        assert!(engine.start_job("J1").is_err());

        engine.schedule("J1", "screen-room-1", at(1, 9)).unwrap();
        engine.start_job("J1").unwrap();

        // 非末道工序不能完工
        assert!(matches!(
            engine.complete_job("J1"),
            Err(SchedulingError::StageNotTerminal { .. })
        ));

        engine.advance_stage("J1").unwrap();
        engine.schedule("J1", "ink-station-1", at(2, 9)).unwrap();
        engine.advance_stage("J1").unwrap();
        engine.schedule("J1", "auto-press-1", at(3, 9)).unwrap();
        engine.start_job("J1").unwrap();

        let done = engine.complete_job("J1").unwrap();
        assert_eq!(done.status(), JobStatus::Completed);
        assert_eq!(done.equipment_id(), Some("auto-press-1"));
        assert!(done.is_consistent());

        // 完工作业仍计入台账, 且不可再撤排
        assert_eq!(
            engine
                .utilization("auto-press-1", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
                .unwrap()
                .assigned_quantity,
            100
        );
        assert!(engine.unschedule("J1").is_err());
        assert!(engine.advance_stage("J1").is_err());
        assert!(engine.verify_ledger().unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_ledger_matches_bookings() {
        let engine = engine();
        engine.register_job(new_job("J1", 100)).unwrap();
        engine.register_job(new_job("J2", 50)).unwrap();
        engine.schedule("J1", "screen-room-1", at(1, 9)).unwrap();
        engine.schedule("J2", "screen-room-1", at(1, 10)).unwrap();

        let before = engine.ledger().snapshot().unwrap();
        engine.rebuild_ledger().unwrap();
        assert_eq!(engine.ledger().snapshot().unwrap(), before);
    }
}
