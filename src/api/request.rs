// ==========================================
// 印花工坊排程引擎 - API 请求参数
// ==========================================
// 职责: 字符串参数解析与请求结构定义
// 格式: 时间 YYYY-MM-DDTHH:MM[:SS] (也接受空格分隔), 日期 YYYY-MM-DD
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::DecorationMethod;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// 排入请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub job_id: String,
    pub equipment_id: String,
    pub start_time: String,
}

/// 负荷查询请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationRequest {
    pub equipment_id: String,
    pub day: String,
}

pub fn parse_start_time(raw: &str) -> ApiResult<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| {
            ApiError::InvalidInput(format!("时间格式错误，应为YYYY-MM-DDTHH:MM: {}", raw))
        })
}

pub fn parse_day(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidInput(format!("日期格式错误，应为YYYY-MM-DD: {}", raw)))
}

pub fn parse_method(raw: &str) -> ApiResult<DecorationMethod> {
    raw.parse::<DecorationMethod>().map_err(ApiError::InvalidInput)
}

pub fn require_id<'a>(field: &str, raw: &'a str) -> ApiResult<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed)
}
