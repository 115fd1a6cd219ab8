// ==========================================
// 印花工坊排程引擎 - 排程操作 API
// ==========================================
// 职责: 排入 / 撤排 / 推进工序 / 负荷查询 (以及登记 / 开工 / 完工)
// 红线: 所有成功写入必须记录操作日志
// 说明: 排入与推进不幂等, 传输层超时后不可盲目重试
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::request::{parse_day, parse_start_time, require_id, ScheduleRequest, UtilizationRequest};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::capacity::{CapacityConstraint, CapacityUtilization};
use crate::domain::job::{Job, NewJob};
use crate::domain::types::UtilizationLevel;
use crate::engine::SchedulingEngine;
use crate::repository::action_log_repo::ActionLogRepository;

// ==========================================
// 响应结构
// ==========================================

/// 负荷响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationResponse {
    pub equipment_id: String,
    pub day: NaiveDate,
    pub assigned: u64,
    pub rated: u32,
    pub pct: f64,
    pub level: UtilizationLevel,
    pub remaining: u64,
    pub overflow: u64,
    pub overflow_ratio: f64,
}

impl From<&CapacityUtilization> for UtilizationResponse {
    fn from(u: &CapacityUtilization) -> Self {
        Self {
            equipment_id: u.equipment_id.clone(),
            day: u.day,
            assigned: u.assigned_quantity,
            rated: u.rated_capacity,
            pct: u.percentage,
            level: u.level,
            remaining: u.remaining_capacity(),
            overflow: u.overflow(),
            overflow_ratio: u.overflow_ratio(),
        }
    }
}

/// 排入响应
///
/// 超排时 warning 给出提示文本, 操作本身已成功
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub job: Job,
    pub utilization: UtilizationResponse,
    pub warning: Option<String>,
}

// ==========================================
// ScheduleApi - 排程操作 API
// ==========================================
pub struct ScheduleApi {
    engine: Arc<SchedulingEngine>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ScheduleApi {
    pub fn new(engine: Arc<SchedulingEngine>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            engine,
            action_log_repo,
        }
    }

    /// 登记作业
    pub fn register_job(&self, new_job: NewJob, operator: &str) -> ApiResult<Job> {
        let job = self.engine.register_job(new_job)?;
        self.record(
            &job,
            ActionType::RegisterJob,
            operator,
            Some(json!({
                "decoration_method": job.decoration_method,
                "quantity": job.quantity,
                "due_date": job.due_date,
            })),
            None,
        );
        Ok(job)
    }

    /// 排入设备
    ///
    /// # 返回
    /// - Ok(ScheduleResponse): 排入成功, 超排时带 warning
    /// - Err(ApiError): NotFound / StageMismatch / InvalidStateTransition / InvalidInput
    pub fn schedule(&self, request: &ScheduleRequest, operator: &str) -> ApiResult<ScheduleResponse> {
        let job_id = require_id("作业ID", &request.job_id)?;
        let equipment_id = require_id("设备ID", &request.equipment_id)?;
        let start = parse_start_time(&request.start_time)?;

        let outcome = self.engine.schedule(job_id, equipment_id, start)?;
        let utilization = UtilizationResponse::from(&outcome.utilization);

        let warning = outcome.utilization.is_overbooked().then(|| {
            format!(
                "设备{}在{}已超排: {}/{} ({:.1}%)",
                utilization.equipment_id,
                utilization.day,
                utilization.assigned,
                utilization.rated,
                utilization.pct
            )
        });

        self.record(
            &outcome.job,
            ActionType::Schedule,
            operator,
            Some(json!({
                "start_time": start,
                "end_time": outcome.job.scheduled_end(),
                "assigned": utilization.assigned,
                "pct": utilization.pct,
                "overbooked": warning.is_some(),
            })),
            Some(utilization.day),
        );

        Ok(ScheduleResponse {
            job: outcome.job,
            utilization,
            warning,
        })
    }

    /// 撤排
    pub fn unschedule(&self, job_id: &str, operator: &str) -> ApiResult<Job> {
        let job_id = require_id("作业ID", job_id)?;
        let outcome = self.engine.unschedule(job_id)?;

        self.record(
            &outcome.job,
            ActionType::Unschedule,
            operator,
            Some(json!({
                "released_equipment_id": outcome.released_slot.equipment_id(),
                "released_start": outcome.released_slot.scheduled_start(),
            })),
            Some(outcome.released_day),
        );
        Ok(outcome.job)
    }

    /// 推进工序 (隐含撤排)
    pub fn advance_stage(&self, job_id: &str, operator: &str) -> ApiResult<Job> {
        let job_id = require_id("作业ID", job_id)?;
        let outcome = self.engine.advance_stage(job_id)?;

        self.record(
            &outcome.job,
            ActionType::AdvanceStage,
            operator,
            Some(json!({
                "from_stage": outcome.from_stage,
                "to_stage": outcome.job.current_stage(),
                "released_equipment_id": outcome.released_slot.equipment_id(),
            })),
            Some(outcome.released_day),
        );
        Ok(outcome.job)
    }

    /// 开工
    pub fn start_job(&self, job_id: &str, operator: &str) -> ApiResult<Job> {
        let job_id = require_id("作业ID", job_id)?;
        let job = self.engine.start_job(job_id)?;
        self.record(&job, ActionType::StartJob, operator, None, None);
        Ok(job)
    }

    /// 完工
    pub fn complete_job(&self, job_id: &str, operator: &str) -> ApiResult<Job> {
        let job_id = require_id("作业ID", job_id)?;
        let job = self.engine.complete_job(job_id)?;
        self.record(&job, ActionType::CompleteJob, operator, None, None);
        Ok(job)
    }

    /// 设备日负荷
    pub fn utilization(&self, request: &UtilizationRequest) -> ApiResult<UtilizationResponse> {
        let equipment_id = require_id("设备ID", &request.equipment_id)?;
        let day = parse_day(&request.day)?;
        let utilization = self.engine.utilization(equipment_id, day)?;
        Ok(UtilizationResponse::from(&utilization))
    }

    /// 作业操作历史
    pub fn action_logs(&self, job_id: &str) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_by_job(job_id)?)
    }

    /// 最近操作 (最新在前)
    pub fn recent_actions(&self, limit: usize) -> ApiResult<Vec<ActionLog>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit必须大于0".to_string()));
        }
        Ok(self.action_log_repo.list_recent(limit)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 写操作日志
    ///
    /// 此时引擎变更已提交, 日志写入失败只记错误, 不改变操作结果
    fn record(
        &self,
        job: &Job,
        action_type: ActionType,
        operator: &str,
        payload: Option<serde_json::Value>,
        day: Option<NaiveDate>,
    ) {
        let actor = if operator.trim().is_empty() { "system" } else { operator.trim() };
        let day = day.or_else(|| {
            job.scheduled_start()
                .map(|start| self.engine.ledger().day_of(start))
        });

        let log = ActionLog {
            action_id: uuid::Uuid::new_v4().to_string(),
            job_id: job.id.clone(),
            action_type,
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            payload_json: payload,
            equipment_id: job.equipment_id().map(str::to_string),
            day,
            detail: Some(format!(
                "{} {} → status={}, stage={}",
                action_type,
                job.job_number,
                job.status(),
                job.current_stage()
            )),
        };

        if let Err(e) = self.action_log_repo.insert(log) {
            tracing::error!(
                job_id = %job.id,
                action = %action_type,
                error = %e,
                "操作日志写入失败 (操作已生效)"
            );
        }
    }
}
