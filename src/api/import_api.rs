// ==========================================
// 印花工坊排程引擎 - 作业导入 API
// ==========================================
// 职责: 包装 CSV 导入器, 为每个成功登记的作业写操作日志
// ==========================================

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::engine::SchedulingEngine;
use crate::importer::{ImportReport, JobCsvImporter};
use crate::repository::action_log_repo::ActionLogRepository;

pub struct ImportApi {
    engine: Arc<SchedulingEngine>,
    action_log_repo: Arc<ActionLogRepository>,
    importer: JobCsvImporter,
}

impl ImportApi {
    pub fn new(engine: Arc<SchedulingEngine>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            engine,
            action_log_repo,
            importer: JobCsvImporter::new(),
        }
    }

    /// 从 CSV 文件导入待排作业
    pub fn import_jobs_csv(&self, path: &Path, operator: &str) -> ApiResult<ImportReport> {
        let report = self.importer.import_file(&self.engine, path)?;
        self.record_imported(&report, operator, &path.display().to_string());
        Ok(report)
    }

    /// 从任意读取源导入 (如上传内容)
    pub fn import_jobs_reader<R: Read>(&self, reader: R, operator: &str) -> ApiResult<ImportReport> {
        let report = self.importer.import_reader(&self.engine, reader)?;
        self.record_imported(&report, operator, "reader");
        Ok(report)
    }

    /// 作业已登记, 日志写入失败只记错误
    fn record_imported(&self, report: &ImportReport, operator: &str, source: &str) {
        let actor = if operator.trim().is_empty() { "system" } else { operator.trim() };
        let now = chrono::Local::now().naive_local();

        for job_id in &report.imported {
            let log = ActionLog {
                action_id: uuid::Uuid::new_v4().to_string(),
                job_id: job_id.clone(),
                action_type: ActionType::RegisterJob,
                action_ts: now,
                actor: actor.to_string(),
                payload_json: Some(serde_json::json!({ "source": source })),
                equipment_id: None,
                day: None,
                detail: Some(format!("CSV导入登记: {}", job_id)),
            };
            if let Err(e) = self.action_log_repo.insert(log) {
                tracing::error!(job_id = %job_id, error = %e, "导入操作日志写入失败 (作业已登记)");
            }
        }
    }
}
