// ==========================================
// 印花工坊排程引擎 - 设备登记表
// ==========================================
// 职责: (工艺, 工序) → 设备 映射的唯一权威
// 约束: 启动时由配置构建,运行期只读
// ==========================================

use std::collections::HashMap;

use crate::config::ShopConfig;
use crate::domain::equipment::Equipment;
use crate::domain::types::DecorationMethod;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct EquipmentRegistry {
    // 配置顺序
    units: Vec<Equipment>,
    index: HashMap<String, usize>,
}

impl EquipmentRegistry {
    /// 由已校验的配置构建
    pub fn from_config(config: &ShopConfig) -> Self {
        let units: Vec<Equipment> = config
            .methods
            .iter()
            .flat_map(|pipeline| {
                pipeline.equipment.iter().map(move |eq| Equipment {
                    id: eq.id.clone(),
                    name: eq.name.clone(),
                    stage_id: eq.stage_id.clone(),
                    decoration_method: pipeline.method,
                    rated_capacity: eq.rated_capacity,
                    equipment_type: eq.equipment_type.clone(),
                })
            })
            .collect();

        let index = units
            .iter()
            .enumerate()
            .map(|(i, eq)| (eq.id.clone(), i))
            .collect();

        Self { units, index }
    }

    /// 查询某工艺某工序下的设备, 保持配置顺序
    pub fn list_equipment(&self, method: DecorationMethod, stage_id: &str) -> Vec<&Equipment> {
        self.units
            .iter()
            .filter(|eq| eq.serves(method, stage_id))
            .collect()
    }

    pub fn get_equipment(&self, equipment_id: &str) -> RepositoryResult<&Equipment> {
        self.index
            .get(equipment_id)
            .map(|&i| &self.units[i])
            .ok_or_else(|| RepositoryError::not_found("Equipment", equipment_id))
    }

    pub fn all(&self) -> &[Equipment] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
