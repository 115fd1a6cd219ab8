// ==========================================
// 印花工坊排程引擎 - 作业导入器
// ==========================================
// 职责: CSV 原始记录 → NewJob → 引擎登记
// 约束: 单行失败收集到报告中, 不中断整批导入
// 表头: id,job_number,customer,decoration_method,quantity,
//       estimated_duration_min,due_date,priority,artwork_approved
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::instrument;

use crate::domain::job::NewJob;
use crate::domain::types::{DecorationMethod, JobPriority};
use crate::engine::SchedulingEngine;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, CsvTable, RawRecord};

/// 必需列
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "job_number",
    "customer",
    "decoration_method",
    "quantity",
    "estimated_duration_min",
    "due_date",
];

/// 被拒绝的行
#[derive(Debug, Clone, Serialize)]
pub struct RowRejection {
    pub row: usize,
    pub job_id: Option<String>,
    pub reason: String,
}

/// 导入报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: Vec<String>,
    pub rejected: Vec<RowRejection>,
}

pub struct JobCsvImporter {
    parser: CsvParser,
}

impl Default for JobCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JobCsvImporter {
    pub fn new() -> Self {
        Self { parser: CsvParser }
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn import_file(&self, engine: &SchedulingEngine, path: &Path) -> ImportResult<ImportReport> {
        let table = self.parser.parse_file(path)?;
        self.import_table(engine, table)
    }

    pub fn import_reader<R: Read>(&self, engine: &SchedulingEngine, reader: R) -> ImportResult<ImportReport> {
        let table = self.parser.parse_reader(reader)?;
        self.import_table(engine, table)
    }

    fn import_table(&self, engine: &SchedulingEngine, table: CsvTable) -> ImportResult<ImportReport> {
        // 表头校验: 必需列缺失整批拒绝, 缺格的短行按行拒绝
        if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !table.has_column(c)) {
            return Err(ImportError::MissingColumn(column.to_string()));
        }
        let records = table.records;

        let mut report = ImportReport {
            total_rows: records.len(),
            ..ImportReport::default()
        };

        for record in &records {
            let job_id = record.get("id").map(str::to_string);
            let outcome = map_record(record)
                .map_err(|e| e.to_string())
                .and_then(|new_job| engine.register_job(new_job).map_err(|e| e.to_string()));

            match outcome {
                Ok(job) => report.imported.push(job.id),
                Err(reason) => {
                    tracing::warn!(row = record.row, job_id = ?job_id, %reason, "作业导入行被拒绝");
                    report.rejected.push(RowRejection {
                        row: record.row,
                        job_id,
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            total = report.total_rows,
            imported = report.imported.len(),
            rejected = report.rejected.len(),
            "作业导入完成"
        );
        Ok(report)
    }
}

// ==========================================
// 字段映射
// ==========================================

/// 单行 → NewJob
pub fn map_record(record: &RawRecord) -> ImportResult<NewJob> {
    let row = record.row;
    let id = record
        .get("id")
        .ok_or(ImportError::PrimaryKeyMissing(row))?
        .to_string();

    let decoration_method = required(record, "decoration_method")?
        .parse::<DecorationMethod>()
        .map_err(|message| conversion(row, "decoration_method", message))?;

    let quantity = required(record, "quantity")?
        .parse::<u32>()
        .map_err(|e| conversion(row, "quantity", e.to_string()))?;

    let estimated_duration_min = required(record, "estimated_duration_min")?
        .parse::<i64>()
        .map_err(|e| conversion(row, "estimated_duration_min", e.to_string()))?;

    let due_raw = required(record, "due_date")?;
    let due_date = parse_date(due_raw).ok_or_else(|| ImportError::DateFormatError {
        row,
        field: "due_date".to_string(),
        value: due_raw.to_string(),
    })?;

    let priority = record
        .get("priority")
        .unwrap_or("")
        .parse::<JobPriority>()
        .map_err(|message| conversion(row, "priority", message))?;

    let artwork_approved = match record.get("artwork_approved") {
        None => false,
        Some(raw) => parse_bool(raw)
            .ok_or_else(|| conversion(row, "artwork_approved", format!("无法识别的布尔值: {}", raw)))?,
    };

    Ok(NewJob {
        id,
        job_number: required(record, "job_number")?.to_string(),
        customer: required(record, "customer")?.to_string(),
        decoration_method,
        quantity,
        estimated_duration_min,
        due_date,
        priority,
        artwork_approved,
    })
}

fn required<'r>(record: &'r RawRecord, field: &str) -> ImportResult<&'r str> {
    record
        .get(field)
        .ok_or_else(|| conversion(record.row, field, "字段为空".to_string()))
}

fn conversion(row: usize, field: &str, message: String) -> ImportError {
    ImportError::TypeConversionError {
        row,
        field: field.to_string(),
        message,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
