// ==========================================
// 印花工坊排程引擎 - 工序领域模型
// ==========================================
// 红线: 工序在同一工艺内全序,只能按 order 向前推进
// 来源: 启动时的静态配置,运行期不可变
// ==========================================

use crate::domain::types::DecorationMethod;
use serde::{Deserialize, Serialize};

// ==========================================
// Stage - 生产工序
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,                         // 工序ID (如 burn_screens)
    pub name: String,                       // 显示名称
    pub order: u32,                         // 工艺内顺序 (从 0 开始)
    pub decoration_method: DecorationMethod, // 所属工艺
}

