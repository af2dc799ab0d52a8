//! 计划流水线集成测试：排序 -> 构建 -> 执行 -> 状态落账

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};

    use triage::core::{prioritize, Request, RunState};
    use triage::plan::{Plan, PlanBuilder, PlanExecutor, Step, StepArg, StepStatus};
    use triage::providers::{InMemoryCalendar, InMemoryMailer};
    use triage::tools::{NotifierTool, RequestBookkeepingTool, SchedulerTool, ToolRegistry};

    fn seeded_state() -> RunState {
        let mut state = RunState::new();
        for (patient, condition, urgency, minute) in [
            ("John Doe", "chest pain", "urgent", 0),
            ("Jane Smith", "annual checkup", "routine", 5),
            ("Bob Lee", "diabetes follow-up", "moderate", 10),
        ] {
            state.push_request(Request::new(
                patient,
                condition,
                urgency,
                format!(
                    "{}@example.com",
                    patient.split_whitespace().next().unwrap().to_lowercase()
                ),
                Utc.with_ymd_and_hms(2025, 4, 12, 8, minute, 0).unwrap(),
            ));
        }
        state
    }

    fn executor(calendar: InMemoryCalendar, mailer: InMemoryMailer) -> PlanExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(SchedulerTool::new(Arc::new(calendar), "UTC"));
        registry.register(NotifierTool::new(Arc::new(mailer)));
        registry.register(RequestBookkeepingTool);
        PlanExecutor::new(registry)
    }

    fn builder() -> PlanBuilder {
        PlanBuilder::new("Appointment Confirmation", "Your Clinic")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
    }

    #[tokio::test]
    async fn test_full_bulk_run_books_and_notifies_everyone() {
        let mut state = seeded_state();
        let executor = executor(InMemoryCalendar::new(), InMemoryMailer::new());

        let ranked = prioritize(state.worklist());
        let plan = builder().bulk_schedule(&ranked, today(), true).unwrap();
        let report = executor.execute(&plan, &mut state).await;

        assert_eq!(report.outcomes.len(), 6);
        assert!(report.all_succeeded());
        assert!(!report.halted());

        // 预约按优先级顺序落账：urgent 当天 10:00–11:00，moderate +1，routine +3
        let appointments = state.appointments();
        assert_eq!(appointments.len(), 3);
        assert_eq!(appointments[0].patient, "John Doe");
        assert_eq!(appointments[0].start.to_string(), "2025-04-12 10:00:00");
        assert_eq!(appointments[0].end.to_string(), "2025-04-12 11:00:00");
        assert_eq!(appointments[1].patient, "Bob Lee");
        assert_eq!(appointments[1].start.to_string(), "2025-04-13 10:00:00");
        assert_eq!(appointments[2].patient, "Jane Smith");
        assert_eq!(appointments[2].start.to_string(), "2025-04-15 10:00:00");

        let notifications = state.notifications();
        assert_eq!(notifications.len(), 3);
        assert!(notifications.iter().all(|n| n.outcome == "sent"));

        // 工单本身不因排程而改动
        assert_eq!(state.worklist().len(), 3);
    }

    #[tokio::test]
    async fn test_bad_date_fails_soft_and_dependents_are_skipped() {
        let mut state = seeded_state();
        let executor = executor(InMemoryCalendar::new(), InMemoryMailer::new());

        // 手工计划：坏日期的日程步骤 + 好日程步骤 + 各自的通知步骤
        let schedule = |task: &str, date: &str, patient: &str, output: &str| Step {
            task: task.to_string(),
            tool_id: "schedule_tool".to_string(),
            inputs: vec![
                ("date".to_string(), StepArg::literal(date)),
                ("patient".to_string(), StepArg::literal(patient)),
                ("condition".to_string(), StepArg::literal("checkup")),
            ],
            output: output.to_string(),
            description: String::new(),
        };
        let notify = |task: &str, to: &str, reference: &str, output: &str| Step {
            task: task.to_string(),
            tool_id: "email_tool".to_string(),
            inputs: vec![
                ("to".to_string(), StepArg::literal(to)),
                ("subject".to_string(), StepArg::literal("Confirmation")),
                ("body".to_string(), StepArg::literal("Dear patient,")),
                ("event".to_string(), StepArg::reference(reference)),
            ],
            output: output.to_string(),
            description: String::new(),
        };
        let plan = Plan::build(vec![
            schedule("bad date", "not-a-date", "John Doe", "$a"),
            schedule("good date", "2025-04-12", "Jane Smith", "$b"),
            notify("notify john", "john@example.com", "$a", "$na"),
            notify("notify jane", "jane@example.com", "$b", "$nb"),
        ])
        .unwrap();

        let report = executor.execute(&plan, &mut state).await;
        let statuses: Vec<StepStatus> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::SoftFailure,
                StepStatus::Success,
                StepStatus::SoftFailure,
                StepStatus::Success,
            ]
        );
        assert!(report.outcomes[0].detail.contains("YYYY-MM-DD"));
        assert!(report.outcomes[2].detail.contains("unresolved reference"));

        // 只有 Jane 的预约与通知落账；被跳过的通知没有发送记录
        assert_eq!(state.appointments().len(), 1);
        assert_eq!(state.appointments()[0].patient, "Jane Smith");
        assert_eq!(state.notifications().len(), 1);
        assert_eq!(state.notifications()[0].recipient, "jane@example.com");
    }

    #[tokio::test]
    async fn test_missing_credentials_halt_the_whole_plan() {
        let mut state = seeded_state();
        let executor = executor(InMemoryCalendar::unauthorized(), InMemoryMailer::new());

        let ranked = prioritize(state.worklist());
        let plan = builder().bulk_schedule(&ranked, today(), true).unwrap();
        let report = executor.execute(&plan, &mut state).await;

        assert!(report.halted());
        assert_eq!(report.outcomes.len(), 6);
        assert_eq!(report.outcomes[0].status, StepStatus::HardFailure);
        assert!(report.outcomes[1..]
            .iter()
            .all(|o| o.status == StepStatus::NotRun));

        // 中止后不得有任何预约或通知落账
        assert!(state.appointments().is_empty());
        assert!(state.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_transport_rejection_is_recorded_as_failed_attempt() {
        let mut state = seeded_state();
        let executor = executor(
            InMemoryCalendar::new(),
            InMemoryMailer::rejecting_domain("@example.com"),
        );

        let ranked = prioritize(state.worklist());
        let plan = builder().bulk_schedule(&ranked, today(), true).unwrap();
        let report = executor.execute(&plan, &mut state).await;

        assert!(!report.halted());
        // 日程全部成功，每次尝试发送都留下失败记录
        assert_eq!(state.appointments().len(), 3);
        assert_eq!(state.notifications().len(), 3);
        assert!(state
            .notifications()
            .iter()
            .all(|n| n.outcome.starts_with("failed: ")));
    }

    #[tokio::test]
    async fn test_add_action_grows_the_worklist() {
        let mut state = seeded_state();
        let executor = executor(InMemoryCalendar::new(), InMemoryMailer::new());

        let plan = builder()
            .single_action(&triage::intent::BookkeepingAction::Add {
                patient: Some("Amy Wu".into()),
                condition: Some("migraine".into()),
                urgency: Some("moderate".into()),
                email: Some("amy@example.com".into()),
            })
            .unwrap();
        let report = executor.execute(&plan, &mut state).await;

        assert!(report.all_succeeded());
        assert_eq!(state.worklist().len(), 4);
        assert_eq!(state.worklist()[3].patient, "Amy Wu");
    }
}
