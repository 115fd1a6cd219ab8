// ==========================================
// 印花工坊排程引擎 - 看板查询 API
// ==========================================
// 职责: 待排清单 / 工序日泳道 / 工序与设备目录
// 红线: 只读, 不写操作日志
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::request::{parse_day, parse_method};
use crate::api::schedule_api::UtilizationResponse;
use crate::domain::equipment::Equipment;
use crate::domain::job::Job;
use crate::domain::stage::Stage;
use crate::engine::SchedulingEngine;

/// 单个交期分组
#[derive(Debug, Clone, Serialize)]
pub struct DueDateBucket {
    pub due_date: NaiveDate,
    pub jobs: Vec<Job>,
}

/// 单台设备的泳道
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentLane {
    pub equipment: Equipment,
    pub utilization: UtilizationResponse,
    pub jobs: Vec<Job>,
}

/// 工序日看板
#[derive(Debug, Clone, Serialize)]
pub struct StageBoard {
    pub stage_id: String,
    pub day: NaiveDate,
    pub lanes: Vec<EquipmentLane>,
}

pub struct QueryApi {
    engine: Arc<SchedulingEngine>,
}

impl QueryApi {
    pub fn new(engine: Arc<SchedulingEngine>) -> Self {
        Self { engine }
    }

    /// 待排作业按交期分组 (交期升序)
    pub fn unscheduled_by_due_date(&self, method: &str) -> ApiResult<Vec<DueDateBucket>> {
        let method = parse_method(method)?;
        let grouped = self.engine.query().unscheduled_by_due_date(method)?;

        Ok(grouped
            .into_iter()
            .map(|(due_date, jobs)| DueDateBucket { due_date, jobs })
            .collect())
    }

    /// 某工序某日的设备泳道, 按配置顺序返回
    pub fn scheduled_grid(&self, method: &str, stage_id: &str, day: &str) -> ApiResult<StageBoard> {
        let method = parse_method(method)?;
        let day = parse_day(day)?;
        let query = self.engine.query();

        let mut grid = query.scheduled_grid(method, stage_id, day)?;
        let utilizations = query.stage_utilization(method, stage_id, day)?;

        let mut lanes = Vec::with_capacity(utilizations.len());
        for utilization in &utilizations {
            let equipment = self.engine.registry().get_equipment(&utilization.equipment_id)?;
            lanes.push(EquipmentLane {
                equipment: equipment.clone(),
                utilization: UtilizationResponse::from(utilization),
                jobs: grid.remove(&utilization.equipment_id).unwrap_or_default(),
            });
        }

        Ok(StageBoard {
            stage_id: stage_id.to_string(),
            day,
            lanes,
        })
    }

    /// 工艺的有序工序
    pub fn list_stages(&self, method: &str) -> ApiResult<Vec<Stage>> {
        let method = parse_method(method)?;
        let stages = self.engine.pipeline().stages_for(method);
        if stages.is_empty() {
            return Err(ApiError::NotFound(format!("工艺{}未配置工序", method)));
        }
        Ok(stages.to_vec())
    }

    /// 工序下的设备
    pub fn list_equipment(&self, method: &str, stage_id: &str) -> ApiResult<Vec<Equipment>> {
        let method = parse_method(method)?;
        if !self.engine.pipeline().is_valid_stage(method, stage_id) {
            return Err(ApiError::NotFound(format!("工序{}不属于工艺{}", stage_id, method)));
        }
        Ok(self
            .engine
            .registry()
            .list_equipment(method, stage_id)
            .into_iter()
            .cloned()
            .collect())
    }
}
