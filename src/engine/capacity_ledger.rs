// ==========================================
// 印花工坊排程引擎 - 产能台账
// ==========================================
// 红线: 产能是提示性的, 台账只记数, 从不拒绝排程
// 职责: (设备, 排程日) → 已排件数 计数表
// 不变量: 计数 = 该设备该日所有非待排作业件数之和
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::config::EngineSettings;
use crate::domain::capacity::{CapacityConstraint, CapacityUtilization};
use crate::domain::equipment::Equipment;
use crate::domain::job::Job;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 台账键: (设备ID, 排程日)
pub type LedgerKey = (String, NaiveDate);

/// 台账与作业仓储之间的偏差
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerDrift {
    pub equipment_id: String,
    pub day: NaiveDate,
    pub recorded: u64,
    pub derived: u64,
}

pub struct CapacityLedger {
    entries: Mutex<HashMap<LedgerKey, u64>>,
    day_start_hour: u32,
    near_capacity_pct: f64,
}

impl CapacityLedger {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            day_start_hour: settings.day_start_hour,
            near_capacity_pct: settings.near_capacity_pct,
        }
    }

    fn get_entries(&self) -> RepositoryResult<MutexGuard<'_, HashMap<LedgerKey, u64>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 开始时间所属的排程日 (按 day_start_hour 平移)
    pub fn day_of(&self, start: NaiveDateTime) -> NaiveDate {
        start
            .checked_sub_signed(Duration::hours(self.day_start_hour as i64))
            .unwrap_or(start)
            .date()
    }

    // ==========================================
    // 写入操作 (引擎专用)
    // ==========================================

    /// 记入件数, 返回该 (设备, 日) 的新合计
    pub(crate) fn book(&self, equipment_id: &str, day: NaiveDate, quantity: u64) -> RepositoryResult<u64> {
        let mut entries = self.get_entries()?;
        let total = entries
            .entry((equipment_id.to_string(), day))
            .or_insert(0);
        *total = total.saturating_add(quantity);
        Ok(*total)
    }

    /// 释放件数, 返回该 (设备, 日) 的新合计; 合计归零时移除条目
    pub(crate) fn release(&self, equipment_id: &str, day: NaiveDate, quantity: u64) -> RepositoryResult<u64> {
        let mut entries = self.get_entries()?;
        let key = (equipment_id.to_string(), day);
        let remaining = match entries.get_mut(&key) {
            Some(total) => {
                if *total < quantity {
                    tracing::warn!(
                        equipment_id,
                        %day,
                        recorded = *total,
                        releasing = quantity,
                        "台账释放量大于已记件数"
                    );
                }
                *total = total.saturating_sub(quantity);
                *total
            }
            None => 0,
        };
        if remaining == 0 {
            entries.remove(&key);
        }
        Ok(remaining)
    }

    /// 由作业集合整体重建台账
    pub(crate) fn rebuild(&self, jobs: &[Job]) -> RepositoryResult<()> {
        let derived = self.derive_from_jobs(jobs);
        let mut entries = self.get_entries()?;
        *entries = derived;
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    pub fn assigned(&self, equipment_id: &str, day: NaiveDate) -> RepositoryResult<u64> {
        let entries = self.get_entries()?;
        Ok(entries
            .get(&(equipment_id.to_string(), day))
            .copied()
            .unwrap_or(0))
    }

    /// 设备日负荷
    pub fn utilization(&self, equipment: &Equipment, day: NaiveDate) -> RepositoryResult<CapacityUtilization> {
        let assigned = self.assigned(&equipment.id, day)?;
        Ok(CapacityUtilization::compute(
            &equipment.id,
            day,
            assigned,
            equipment.rated_capacity,
            self.near_capacity_pct,
        ))
    }

    /// 追加件数后是否超过额定产能 (软检查, 仅供提示)
    pub fn would_exceed(&self, equipment: &Equipment, day: NaiveDate, additional: u64) -> RepositoryResult<bool> {
        Ok(!self.utilization(equipment, day)?.can_add(additional))
    }

    pub fn snapshot(&self) -> RepositoryResult<HashMap<LedgerKey, u64>> {
        Ok(self.get_entries()?.clone())
    }

    /// 由作业集合推导台账 (不修改自身)
    pub fn derive_from_jobs(&self, jobs: &[Job]) -> HashMap<LedgerKey, u64> {
        let mut derived: HashMap<LedgerKey, u64> = HashMap::new();
        for job in jobs.iter().filter(|j| j.status().holds_slot()) {
            if let Some(slot) = job.slot() {
                let key = (slot.equipment_id().to_string(), self.day_of(slot.scheduled_start()));
                *derived.entry(key).or_insert(0) += job.quantity as u64;
            }
        }
        derived
    }

    /// 对比台账与作业集合, 返回全部偏差 (正常应为空)
    pub fn diff_against(&self, jobs: &[Job]) -> RepositoryResult<Vec<LedgerDrift>> {
        let derived = self.derive_from_jobs(jobs);
        let recorded = self.snapshot()?;

        let mut keys: Vec<&LedgerKey> = derived.keys().chain(recorded.keys()).collect();
        keys.sort();
        keys.dedup();

        Ok(keys
            .into_iter()
            .filter_map(|key| {
                let r = recorded.get(key).copied().unwrap_or(0);
                let d = derived.get(key).copied().unwrap_or(0);
                (r != d).then(|| LedgerDrift {
                    equipment_id: key.0.clone(),
                    day: key.1,
                    recorded: r,
                    derived: d,
                })
            })
            .collect())
    }
}
