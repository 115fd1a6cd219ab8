// ==========================================
// 印花工坊排程引擎 - 领域类型定义
// ==========================================
// 职责: 装饰工艺、作业状态、优先级等枚举
// 序列化格式: snake_case (与配置文件/前端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 装饰工艺 (Decoration Method)
// ==========================================
// 决定作业走哪条工序流水线
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationMethod {
    ScreenPrinting, // 丝网印刷
    Embroidery,     // 刺绣
    Dtf,            // 热转印膜
    Dtg,            // 直喷
}

impl DecorationMethod {
    pub const ALL: [DecorationMethod; 4] = [
        DecorationMethod::ScreenPrinting,
        DecorationMethod::Embroidery,
        DecorationMethod::Dtf,
        DecorationMethod::Dtg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecorationMethod::ScreenPrinting => "screen_printing",
            DecorationMethod::Embroidery => "embroidery",
            DecorationMethod::Dtf => "dtf",
            DecorationMethod::Dtg => "dtg",
        }
    }
}

impl fmt::Display for DecorationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecorationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "screen_printing" | "screen" => Ok(DecorationMethod::ScreenPrinting),
            "embroidery" => Ok(DecorationMethod::Embroidery),
            "dtf" => Ok(DecorationMethod::Dtf),
            "dtg" => Ok(DecorationMethod::Dtg),
            other => Err(format!("未知装饰工艺: {}", other)),
        }
    }
}

// ==========================================
// 作业状态 (Job Status)
// ==========================================
// unscheduled → scheduled → in_progress → completed
// scheduled/in_progress 可退回 unscheduled (撤排/推进工序)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Unscheduled, // 待排
    Scheduled,   // 已排
    InProgress,  // 生产中
    Completed,   // 已完成
}

impl JobStatus {
    /// 该状态下作业是否占用设备 (时段字段必须齐全)
    pub fn holds_slot(&self) -> bool {
        !matches!(self, JobStatus::Unscheduled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Unscheduled => "unscheduled",
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 作业优先级 (Priority)
// ==========================================
// 顺序: Rush < Normal, 用于待排池内的排序 (加急在前)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Rush,
    #[default]
    Normal,
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPriority::Rush => write!(f, "rush"),
            JobPriority::Normal => write!(f, "normal"),
        }
    }
}

impl FromStr for JobPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "normal" => Ok(JobPriority::Normal),
            "rush" => Ok(JobPriority::Rush),
            other => Err(format!("未知优先级: {}", other)),
        }
    }
}

// ==========================================
// 产能负荷等级 (Utilization Level)
// ==========================================
// 顺序: Normal < NearCapacity < Overbooked
// 超排是允许的可观测状态,不是错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UtilizationLevel {
    Normal,       // 正常
    NearCapacity, // 接近满负荷
    Overbooked,   // 超排
}

impl fmt::Display for UtilizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilizationLevel::Normal => write!(f, "NORMAL"),
            UtilizationLevel::NearCapacity => write!(f, "NEAR_CAPACITY"),
            UtilizationLevel::Overbooked => write!(f, "OVERBOOKED"),
        }
    }
}
