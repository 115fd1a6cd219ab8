// ==========================================
// API 层集成测试
// ==========================================
// 职责: 验证字符串参数解析、错误码转换、操作日志与看板查询
// ==========================================


#[cfg(test)]
mod api_test {
    use print_shop_scheduler::api::{ApiError, ScheduleRequest, UtilizationRequest};
    use print_shop_scheduler::app::AppState;
    use print_shop_scheduler::config::ShopConfig;
    use print_shop_scheduler::domain::action_log::ActionType;
    use print_shop_scheduler::domain::types::{DecorationMethod, JobStatus, UtilizationLevel};

    use crate::test_helpers::{day, JobBuilder};

    fn setup() -> AppState {
        AppState::new(ShopConfig::builtin()).unwrap()
    }

    fn request(job_id: &str, equipment_id: &str, start: &str) -> ScheduleRequest {
        ScheduleRequest {
            job_id: job_id.to_string(),
            equipment_id: equipment_id.to_string(),
            start_time: start.to_string(),
        }
    }

    #[test]
    fn test_schedule_records_action_log() {
        let state = setup();
        state
            .schedule_api
            .register_job(JobBuilder::new("J1", DecorationMethod::ScreenPrinting).build(), "alice")
            .unwrap();

        let response = state
            .schedule_api
            .schedule(&request("J1", "screen-room-1", "2024-06-01T09:00"), "alice")
            .unwrap();
        assert_eq!(response.job.status(), JobStatus::Scheduled);
        assert_eq!(response.utilization.assigned, 100);
        assert!(response.warning.is_none());

        let logs = state.schedule_api.action_logs("J1").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action_type, ActionType::RegisterJob);
        assert_eq!(logs[1].action_type, ActionType::Schedule);
        assert_eq!(logs[1].actor, "alice");
        assert_eq!(logs[1].equipment_id.as_deref(), Some("screen-room-1"));
        assert_eq!(logs[1].day, Some(day(2024, 6, 1)));
    }

    #[test]
    fn test_overbooked_response_carries_warning() {
        let state = setup();
        for id in ["A", "B"] {
            state
                .schedule_api
                .register_job(
                    JobBuilder::new(id, DecorationMethod::Embroidery).quantity(150).build(),
                    "",
                )
                .unwrap();
        }
        state
            .schedule_api
            .schedule(&request("A", "digitizing-desk-1", "2024-06-01T09:00"), "")
            .unwrap();
        let response = state
            .schedule_api
            .schedule(&request("B", "digitizing-desk-1", "2024-06-01 13:00"), "")
            .unwrap();

        assert_eq!(response.utilization.level, UtilizationLevel::Overbooked);
        assert_eq!(response.utilization.overflow, 100);
        assert!((response.utilization.overflow_ratio - 0.5).abs() < 1e-9);
        assert!(response.warning.is_some());

        let logs = state.schedule_api.action_logs("B").unwrap();
        assert_eq!(logs.last().unwrap().actor, "system");
    }

    #[test]
    fn test_failed_operations_are_not_logged() {
        let state = setup();
        state
            .schedule_api
            .register_job(JobBuilder::new("J1", DecorationMethod::Dtg).build(), "bob")
            .unwrap();

        let err = state
            .schedule_api
            .schedule(&request("J1", "dtg-printer-1", "2024-06-01T09:00"), "bob")
            .unwrap_err();
        assert_eq!(err.code(), "STAGE_MISMATCH");

        let err = state
            .schedule_api
            .schedule(&request("J1", "pretreat-1", "tomorrow"), "bob")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err = state.schedule_api.unschedule("J1", "bob").unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");

        assert_eq!(state.schedule_api.action_logs("J1").unwrap().len(), 1);
    }

    #[test]
    fn test_advance_and_terminal_stage_codes() {
        let state = setup();
        let api = &state.schedule_api;
        api.register_job(JobBuilder::new("J1", DecorationMethod::Dtf).build(), "ops")
            .unwrap();

        for (equipment, start) in [
            ("dtf-printer-1", "2024-06-01T08:00"),
            ("dtf-shaker-1", "2024-06-01T10:00"),
        ] {
            api.schedule(&request("J1", equipment, start), "ops").unwrap();
            api.advance_stage("J1", "ops").unwrap();
        }
        api.schedule(&request("J1", "heat-press-1", "2024-06-01T12:00"), "ops")
            .unwrap();

        let err = api.advance_stage("J1", "ops").unwrap_err();
        assert_eq!(err.code(), "TERMINAL_STAGE");

        let job = api.complete_job("J1", "ops").unwrap();
        assert_eq!(job.status(), JobStatus::Completed);

        let actions: Vec<ActionType> = api
            .action_logs("J1")
            .unwrap()
            .into_iter()
            .map(|log| log.action_type)
            .collect();
        assert_eq!(
            actions,
            vec![
                ActionType::RegisterJob,
                ActionType::Schedule,
                ActionType::AdvanceStage,
                ActionType::Schedule,
                ActionType::AdvanceStage,
                ActionType::Schedule,
                ActionType::CompleteJob,
            ]
        );
    }

    #[test]
    fn test_utilization_request_parsing() {
        let state = setup();
        let response = state
            .schedule_api
            .utilization(&UtilizationRequest {
                equipment_id: "auto-press-1".to_string(),
                day: "2024-06-01".to_string(),
            })
            .unwrap();
        assert_eq!(response.assigned, 0);
        assert_eq!(response.rated, 1500);
        assert_eq!(response.level, UtilizationLevel::Normal);

        let err = state
            .schedule_api
            .utilization(&UtilizationRequest {
                equipment_id: "auto-press-1".to_string(),
                day: "June 1".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let err = state
            .schedule_api
            .utilization(&UtilizationRequest {
                equipment_id: "nope".to_string(),
                day: "2024-06-01".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_query_views() {
        let state = setup();
        let api = &state.schedule_api;
        api.register_job(
            JobBuilder::new("A", DecorationMethod::ScreenPrinting).due(day(2024, 6, 8)).build(),
            "",
        )
        .unwrap();
        api.register_job(
            JobBuilder::new("B", DecorationMethod::ScreenPrinting)
                .due(day(2024, 6, 8))
                .rush()
                .build(),
            "",
        )
        .unwrap();
        api.register_job(
            JobBuilder::new("C", DecorationMethod::ScreenPrinting).due(day(2024, 6, 5)).build(),
            "",
        )
        .unwrap();
        api.schedule(&request("C", "screen-room-2", "2024-06-01T09:00"), "")
            .unwrap();

        let buckets = state.query_api.unscheduled_by_due_date("screen_printing").unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].due_date, day(2024, 6, 8));
        let ids: Vec<&str> = buckets[0].jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);

        let board = state
            .query_api
            .scheduled_grid("screen", "burn_screens", "2024-06-01")
            .unwrap();
        assert_eq!(board.lanes.len(), 2);
        assert_eq!(board.lanes[0].equipment.id, "screen-room-1");
        assert!(board.lanes[0].jobs.is_empty());
        assert_eq!(board.lanes[1].jobs.len(), 1);
        assert_eq!(board.lanes[1].utilization.assigned, 100);

        let err = state
            .query_api
            .scheduled_grid("screen_printing", "stitch", "2024-06-01")
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");

        let equipment = state.query_api.list_equipment("dtg", "print").unwrap();
        assert_eq!(equipment.len(), 2);
        assert!(state.query_api.list_stages("sublimation").is_err());
    }
}
