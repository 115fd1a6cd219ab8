// ==========================================
// 印花工坊排程引擎 - 产能领域模型
// ==========================================
// 红线: 产能是提示性的,超排允许且可观测,不构成错误
// 用途: (设备, 日) 负荷展示与超排预警
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::UtilizationLevel;

// ==========================================
// CapacityUtilization - 设备日负荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityUtilization {
    pub equipment_id: String,   // 设备ID
    pub day: NaiveDate,         // 排程日

    // ===== 负荷 =====
    pub assigned_quantity: u64, // 已排件数
    pub rated_capacity: u32,    // 额定产能
    pub percentage: f64,        // 负荷率 (%), 可超过 100

    pub level: UtilizationLevel, // 负荷等级
}

impl CapacityUtilization {
    /// 计算负荷
    ///
    /// # 参数
    /// - `near_capacity_pct`: 达到该负荷率即视为接近满负荷
    pub fn compute(
        equipment_id: &str,
        day: NaiveDate,
        assigned_quantity: u64,
        rated_capacity: u32,
        near_capacity_pct: f64,
    ) -> Self {
        let percentage = if rated_capacity == 0 {
            0.0
        } else {
            assigned_quantity as f64 / rated_capacity as f64 * 100.0
        };

        let level = if assigned_quantity > rated_capacity as u64 {
            UtilizationLevel::Overbooked
        } else if percentage >= near_capacity_pct {
            UtilizationLevel::NearCapacity
        } else {
            UtilizationLevel::Normal
        };

        Self {
            equipment_id: equipment_id.to_string(),
            day,
            assigned_quantity,
            rated_capacity,
            percentage,
            level,
        }
    }
}

// ==========================================
// Trait: CapacityConstraint
// ==========================================
// 用途: 调用方决定是否提示超排
pub trait CapacityConstraint {
    /// 追加 quantity 后是否仍在额定产能内
    fn can_add(&self, quantity: u64) -> bool;

    /// 是否已超排
    fn is_overbooked(&self) -> bool;

    /// 剩余产能 (件)
    fn remaining_capacity(&self) -> u64;

    /// 超排件数
    fn overflow(&self) -> u64;

    /// 超排比例, 相对于额定产能
    fn overflow_ratio(&self) -> f64;
}

impl CapacityConstraint for CapacityUtilization {
    fn can_add(&self, quantity: u64) -> bool {
        self.assigned_quantity.saturating_add(quantity) <= self.rated_capacity as u64
    }

    fn is_overbooked(&self) -> bool {
        self.assigned_quantity > self.rated_capacity as u64
    }

    fn remaining_capacity(&self) -> u64 {
        (self.rated_capacity as u64).saturating_sub(self.assigned_quantity)
    }

    fn overflow(&self) -> u64 {
        self.assigned_quantity.saturating_sub(self.rated_capacity as u64)
    }

    fn overflow_ratio(&self) -> f64 {
        if self.rated_capacity == 0 {
            return 0.0;
        }
        self.overflow() as f64 / self.rated_capacity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_compute_levels() {
        let u = CapacityUtilization::compute("E1", day(), 100, 500, 85.0);
        assert_eq!(u.level, UtilizationLevel::Normal);
        assert_eq!(u.percentage, 20.0);

        let u = CapacityUtilization::compute("E1", day(), 450, 500, 85.0);
        assert_eq!(u.level, UtilizationLevel::NearCapacity);

        // 恰好满负荷不算超排
        let u = CapacityUtilization::compute("E1", day(), 500, 500, 85.0);
        assert_eq!(u.level, UtilizationLevel::NearCapacity);
        assert!(!u.is_overbooked());

        let u = CapacityUtilization::compute("E1", day(), 600, 500, 85.0);
        assert_eq!(u.level, UtilizationLevel::Overbooked);
        assert_eq!(u.percentage, 120.0);
    }

    #[test]
    fn test_constraint_helpers() {
        let u = CapacityUtilization::compute("E1", day(), 600, 500, 85.0);
        assert!(u.is_overbooked());
        assert!(!u.can_add(1));
        assert_eq!(u.remaining_capacity(), 0);
        assert_eq!(u.overflow(), 100);
        assert!((u.overflow_ratio() - 0.2).abs() < 1e-9);

        let u = CapacityUtilization::compute("E1", day(), 300, 500, 85.0);
        assert!(u.can_add(200));
        assert!(!u.can_add(201));
        assert_eq!(u.remaining_capacity(), 200);
        assert_eq!(u.overflow_ratio(), 0.0);
    }
}
