// ==========================================
// 印花工坊排程引擎 - 操作日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只追加与查询
// 存储: 进程内 (持久化由外部协作方负责)
// ==========================================

use std::sync::{Mutex, MutexGuard};

use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct ActionLogRepository {
    logs: Mutex<Vec<ActionLog>>,
}

impl ActionLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn poison_for_test(&self) {
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = self.logs.lock();
                    panic!("poison action log lock");
                })
                .join()
        });
    }

    fn get_logs(&self) -> RepositoryResult<MutexGuard<'_, Vec<ActionLog>>> {
        self.logs
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加操作日志
    ///
    /// # 返回
    /// - `Ok(action_id)`: 成功写入
    pub fn insert(&self, log: ActionLog) -> RepositoryResult<String> {
        let action_id = log.action_id.clone();
        self.get_logs()?.push(log);
        Ok(action_id)
    }

    /// 查询某作业的全部日志 (按写入顺序)
    pub fn find_by_job(&self, job_id: &str) -> RepositoryResult<Vec<ActionLog>> {
        Ok(self
            .get_logs()?
            .iter()
            .filter(|log| log.job_id == job_id)
            .cloned()
            .collect())
    }

    /// 查询最近 limit 条日志 (最新在前)
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        Ok(self.get_logs()?.iter().rev().take(limit).cloned().collect())
    }
}
