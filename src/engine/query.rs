// ==========================================
// 印花工坊排程引擎 - 查询视图层
// ==========================================
// 职责: 只读投影, 供看板展示
// 红线: 每次调用都从作业仓储 + 设备登记表重新计算, 不缓存派生状态
// ==========================================

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::capacity::CapacityUtilization;
use crate::domain::job::Job;
use crate::domain::types::{DecorationMethod, JobStatus};
use crate::engine::capacity_ledger::CapacityLedger;
use crate::engine::error::{SchedulingError, SchedulingResult};
use crate::engine::stage_pipeline::StagePipeline;
use crate::repository::equipment_registry::EquipmentRegistry;
use crate::repository::job_store::JobStore;

pub struct ScheduleQuery<'a> {
    pipeline: &'a StagePipeline,
    registry: &'a EquipmentRegistry,
    jobs: &'a JobStore,
    ledger: &'a CapacityLedger,
}

impl<'a> ScheduleQuery<'a> {
    pub(crate) fn new(
        pipeline: &'a StagePipeline,
        registry: &'a EquipmentRegistry,
        jobs: &'a JobStore,
        ledger: &'a CapacityLedger,
    ) -> Self {
        Self {
            pipeline,
            registry,
            jobs,
            ledger,
        }
    }

    /// 待排作业按交期分组
    ///
    /// # 返回
    /// 交期升序; 同一交期内加急在前, 再按作业单号
    pub fn unscheduled_by_due_date(
        &self,
        method: DecorationMethod,
    ) -> SchedulingResult<BTreeMap<NaiveDate, Vec<Job>>> {
        let jobs = self.jobs.find_by(|job| {
            job.decoration_method == method && job.status() == JobStatus::Unscheduled
        })?;

        let mut grouped: BTreeMap<NaiveDate, Vec<Job>> = BTreeMap::new();
        for job in jobs {
            grouped.entry(job.due_date).or_default().push(job);
        }
        for bucket in grouped.values_mut() {
            bucket.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| a.job_number.cmp(&b.job_number))
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        Ok(grouped)
    }

    /// 某工序某日的设备泳道
    ///
    /// # 返回
    /// 设备ID → 当日开始的作业 (按开始时间); 无作业的设备也返回空泳道
    ///
    /// # 错误
    /// - NotFound: 工序不属于该工艺
    pub fn scheduled_grid(
        &self,
        method: DecorationMethod,
        stage_id: &str,
        day: NaiveDate,
    ) -> SchedulingResult<BTreeMap<String, Vec<Job>>> {
        self.ensure_stage(method, stage_id)?;

        let mut grid: BTreeMap<String, Vec<Job>> = self
            .registry
            .list_equipment(method, stage_id)
            .into_iter()
            .map(|eq| (eq.id.clone(), Vec::new()))
            .collect();

        let ledger = self.ledger;
        let jobs = self.jobs.find_by(|job| match job.slot() {
            Some(slot) => {
                job.status().holds_slot()
                    && grid.contains_key(slot.equipment_id())
                    && ledger.day_of(slot.scheduled_start()) == day
            }
            None => false,
        })?;

        for job in jobs {
            if let Some(equipment_id) = job.equipment_id().map(str::to_string) {
                if let Some(lane) = grid.get_mut(&equipment_id) {
                    lane.push(job);
                }
            }
        }
        for lane in grid.values_mut() {
            lane.sort_by(|a, b| {
                a.scheduled_start()
                    .cmp(&b.scheduled_start())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        Ok(grid)
    }

    /// 某工序某日每台设备的负荷 (看板表头), 保持配置顺序
    pub fn stage_utilization(
        &self,
        method: DecorationMethod,
        stage_id: &str,
        day: NaiveDate,
    ) -> SchedulingResult<Vec<CapacityUtilization>> {
        self.ensure_stage(method, stage_id)?;

        self.registry
            .list_equipment(method, stage_id)
            .into_iter()
            .map(|eq| self.ledger.utilization(eq, day).map_err(SchedulingError::from))
            .collect()
    }

    fn ensure_stage(&self, method: DecorationMethod, stage_id: &str) -> SchedulingResult<()> {
        if self.pipeline.is_valid_stage(method, stage_id) {
            Ok(())
        } else {
            Err(SchedulingError::NotFound {
                entity: format!("Stage({})", method),
                id: stage_id.to_string(),
            })
        }
    }
}
