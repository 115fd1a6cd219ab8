// ==========================================
// 印花工坊排程引擎 - 操作日志领域模型
// ==========================================
// 红线: 所有成功的排程写入必须记录
// 用途: 审计追踪
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,              // 日志ID
    pub job_id: String,                 // 关联作业
    pub action_type: ActionType,        // 操作类型
    pub action_ts: NaiveDateTime,       // 操作时间戳
    pub actor: String,                  // 操作人

    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)

    pub equipment_id: Option<String>,   // 影响设备
    pub day: Option<NaiveDate>,         // 影响排程日
    pub detail: Option<String>,         // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    RegisterJob,  // 登记作业
    Schedule,     // 排入设备
    Unschedule,   // 撤排
    AdvanceStage, // 推进工序
    StartJob,     // 开工
    CompleteJob,  // 完工
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::RegisterJob => "REGISTER_JOB",
            ActionType::Schedule => "SCHEDULE",
            ActionType::Unschedule => "UNSCHEDULE",
            ActionType::AdvanceStage => "ADVANCE_STAGE",
            ActionType::StartJob => "START_JOB",
            ActionType::CompleteJob => "COMPLETE_JOB",
        };
        f.write_str(s)
    }
}
