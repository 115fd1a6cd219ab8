// ==========================================
// 印花工坊排程引擎 - 作业仓储
// ==========================================
// 职责: 作业的权威集合, 每个作业一把锁
// 红线: 只有排程引擎持有可写句柄 (crate 内可见)
// 约束: 仓储从不删除作业 (取消订单属于外部协作方)
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::domain::job::Job;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 作业句柄: 同一作业上的操作在此锁上串行
pub(crate) type JobHandle = Arc<Mutex<Job>>;

#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobHandle>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 写入操作 (引擎专用)
    // ==========================================

    /// 插入新作业, 主键重复时拒绝
    pub(crate) fn insert(&self, job: Job) -> RepositoryResult<()> {
        let mut jobs = self
            .jobs
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::DuplicateKey {
                entity: "Job".to_string(),
                id: job.id.clone(),
            });
        }
        jobs.insert(job.id.clone(), Arc::new(Mutex::new(job)));
        Ok(())
    }

    /// 获取作业句柄
    pub(crate) fn handle(&self, job_id: &str) -> RepositoryResult<JobHandle> {
        let jobs = self
            .jobs
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        jobs.get(job_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Job", job_id))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 读取作业快照
    pub fn get(&self, job_id: &str) -> RepositoryResult<Job> {
        let handle = self.handle(job_id)?;
        let job = lock_job(&handle)?;
        Ok(job.clone())
    }

    pub fn contains(&self, job_id: &str) -> RepositoryResult<bool> {
        let jobs = self
            .jobs
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(jobs.contains_key(job_id))
    }

    /// 按条件筛选作业快照 (按作业ID排序, 保证输出稳定)
    pub fn find_by<F>(&self, mut predicate: F) -> RepositoryResult<Vec<Job>>
    where
        F: FnMut(&Job) -> bool,
    {
        // 先复制句柄再逐个加锁, 避免持有目录读锁时等待单个作业
        let handles: Vec<JobHandle> = {
            let jobs = self
                .jobs
                .read()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            jobs.values().cloned().collect()
        };

        let mut result = Vec::new();
        for handle in handles {
            let job = lock_job(&handle)?;
            if predicate(&job) {
                result.push(job.clone());
            }
        }
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Job>> {
        self.find_by(|_| true)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 获取作业锁
pub(crate) fn lock_job(handle: &JobHandle) -> RepositoryResult<MutexGuard<'_, Job>> {
    handle
        .lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::NewJob;
    use crate::domain::types::{DecorationMethod, JobPriority};
    use chrono::NaiveDate;

    fn job(id: &str) -> Job {
        Job::from_new(
            NewJob {
                id: id.to_string(),
                job_number: format!("N-{}", id),
                customer: "Acme".to_string(),
                decoration_method: DecorationMethod::Dtg,
                quantity: 10,
                estimated_duration_min: 60,
                due_date: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
                priority: JobPriority::Normal,
                artwork_approved: false,
            },
            "pretreat",
        )
    }

    #[test]
    fn test_insert_and_get() {
        let store = JobStore::new();
        store.insert(job("J1")).unwrap();
        assert_eq!(store.get("J1").unwrap().id, "J1");
        assert!(store.contains("J1").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let store = JobStore::new();
        store.insert(job("J1")).unwrap();
        assert!(matches!(
            store.insert(job("J1")),
            Err(RepositoryError::DuplicateKey { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_is_not_found() {
        let store = JobStore::new();
        assert!(matches!(store.get("nope"), Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_find_by_sorted() {
        let store = JobStore::new();
        store.insert(job("J3")).unwrap();
        store.insert(job("J1")).unwrap();
        store.insert(job("J2")).unwrap();

        let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["J1", "J2", "J3"]);

        let only = store.find_by(|j| j.id == "J2").unwrap();
        assert_eq!(only.len(), 1);
    }
}
