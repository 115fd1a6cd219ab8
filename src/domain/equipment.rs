// ==========================================
// 印花工坊排程引擎 - 设备领域模型
// ==========================================
// 红线: 一台设备只服务一个工艺的一个工序
// 来源: 配置加载,排程引擎不创建设备
// ==========================================

use crate::domain::types::DecorationMethod;
use serde::{Deserialize, Serialize};

// ==========================================
// Equipment - 生产设备
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,                          // 设备ID (如 screen-room-1)
    pub name: String,                        // 显示名称
    pub stage_id: String,                    // 服务的工序
    pub decoration_method: DecorationMethod, // 服务的工艺
    pub rated_capacity: u32,                 // 额定产能 (件/排程日), > 0
    pub equipment_type: String,              // 设备类型 (如 exposure_unit / press)
}

impl Equipment {
    /// 设备是否服务于给定的 (工艺, 工序)
    pub fn serves(&self, method: DecorationMethod, stage_id: &str) -> bool {
        self.decoration_method == method && self.stage_id == stage_id
    }
}
