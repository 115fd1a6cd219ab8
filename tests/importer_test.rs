// ==========================================
// 作业导入集成测试
// ==========================================
// 职责: 验证 CSV 导入、逐行拒绝与操作日志
// ==========================================


#[cfg(test)]
mod importer_test {
    use print_shop_scheduler::app::AppState;
    use print_shop_scheduler::config::ShopConfig;
    use print_shop_scheduler::domain::types::{DecorationMethod, JobPriority, JobStatus};
    use std::fs;

    use crate::test_helpers::{day, JOB_CSV_HEADER};

    fn setup() -> AppState {
        AppState::new(ShopConfig::builtin()).unwrap()
    }

    #[test]
    fn test_import_csv_file() {
        let state = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        let content = format!(
            "{}\n\
             J1,1001,Acme,screen_printing,144,180,2024-06-07,rush,yes\n\
             J2,1002,Globex,embroidery,24,90,20240608,,\n\
             J3,1003,Initech,vinyl,10,30,2024-06-09,,\n\
             J4,1004,Umbrella,dtf,0,30,2024-06-09,,\n\
             \n\
             J1,1005,Dup,dtg,10,30,2024-06-09,,\n",
            JOB_CSV_HEADER
        );
        fs::write(&path, content).unwrap();

        let report = state.import_api.import_jobs_csv(&path, "importer").unwrap();
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.imported, vec!["J1".to_string(), "J2".to_string()]);
        assert_eq!(report.rejected.len(), 3);
        assert_eq!(report.rejected[0].job_id.as_deref(), Some("J3"));

        let j1 = state.engine.get_job("J1").unwrap();
        assert_eq!(j1.status(), JobStatus::Unscheduled);
        assert_eq!(j1.current_stage(), "burn_screens");
        assert_eq!(j1.priority, JobPriority::Rush);
        assert!(j1.artwork_approved);

        let j2 = state.engine.get_job("J2").unwrap();
        assert_eq!(j2.decoration_method, DecorationMethod::Embroidery);
        assert_eq!(j2.due_date, day(2024, 6, 8));
        assert_eq!(j2.current_stage(), "digitize");

        let logs = state.schedule_api.action_logs("J1").unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].actor, "importer");
    }

    #[test]
    fn test_import_reader_missing_column() {
        let state = setup();
        let csv = "id,job_number,customer\nJ1,1001,Acme\n";
        let err = state.import_api.import_jobs_reader(csv.as_bytes(), "").unwrap_err();
        assert_eq!(err.code(), "IMPORT_ERROR");
        assert!(state.engine.jobs().is_empty());
    }

    #[test]
    fn test_import_rejects_unsupported_file() {
        let state = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.xlsx");
        fs::write(&path, "binary").unwrap();
        assert!(state.import_api.import_jobs_csv(&path, "").is_err());

        let missing = dir.path().join("missing.csv");
        assert!(state.import_api.import_jobs_csv(&missing, "").is_err());
    }

    #[test]
    fn test_imported_jobs_appear_in_backlog() {
        let state = setup();
        let csv = format!(
            "{}\nA,2001,Acme,dtg,10,30,2024-06-09,,\nB,2002,Acme,dtg,10,30,2024-06-07,,\n",
            JOB_CSV_HEADER
        );
        state.import_api.import_jobs_reader(csv.as_bytes(), "").unwrap();

        let buckets = state.query_api.unscheduled_by_due_date("dtg").unwrap();
        let dates: Vec<_> = buckets.iter().map(|b| b.due_date).collect();
        assert_eq!(dates, vec![day(2024, 6, 7), day(2024, 6, 9)]);
    }

    #[test]
    fn test_short_first_row_rejected_without_failing_batch() {
        let state = setup();
        let csv = format!(
            "{}\nS1,3001,Acme\nS2,3002,Acme,dtf,12,30,2024-06-09,,\n",
            JOB_CSV_HEADER
        );
        let report = state.import_api.import_jobs_reader(csv.as_bytes(), "").unwrap();

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.imported, vec!["S2".to_string()]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].row, 1);
        assert_eq!(report.rejected[0].job_id.as_deref(), Some("S1"));
        assert!(state.engine.get_job("S1").is_err());
    }

    #[test]
    fn test_missing_header_column_fails_even_without_data() {
        let state = setup();
        let csv = "id,job_number,customer,decoration_method,quantity,due_date\n,,,,,\n";
        let err = state.import_api.import_jobs_reader(csv.as_bytes(), "").unwrap_err();
        assert_eq!(err.code(), "IMPORT_ERROR");
        assert!(err.to_string().contains("estimated_duration_min"));

        let header_only = format!("{}\n", JOB_CSV_HEADER);
        let report = state.import_api.import_jobs_reader(header_only.as_bytes(), "").unwrap();
        assert_eq!(report.total_rows, 0);
    }
}
