//! Tests for the preference sync controller.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::preferences::*;
    use crate::gateway::fake::{FakeGateway, Scripted};
    use crate::gateway::BackendEntry;
    use crate::schedule::{Frequency, NotificationPreference};
    use crate::sync::types::{FailedStep, LoadOutcome};

    const TOKEN: &str = "device-token-0001";

    fn controller(gateway: &Arc<FakeGateway>) -> PreferenceController<FakeGateway> {
        PreferenceController::new(Arc::clone(gateway), TOKEN).with_status_clear(None)
    }

    fn gym() -> NotificationPreference {
        NotificationPreference::new("Gym", "18:00", Frequency::Weekly).with_days([1, 3, 5])
    }

    fn stored(id: i64, title: &str, frequency: &str, day: Option<u8>, job: &str) -> BackendEntry {
        BackendEntry {
            id,
            title: title.to_string(),
            time: "07:30".to_string(),
            frequency: frequency.to_string(),
            day_of_week: day,
            day_of_month: None,
            end_date: None,
            job_id: Some(job.to_string()),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_weekly_commits_one_preference_with_job_per_day() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);

        let outcome = ctl.create(gym()).await;
        let committed = outcome.committed.expect("create should commit");
        assert_eq!(committed.job_ids.len(), 3);
        assert!(outcome.failures.is_empty());
        assert!(outcome.orphaned_job_ids.is_empty());

        assert_eq!(
            gateway.calls(),
            vec!["schedule:Gym:Some(1)", "schedule:Gym:Some(3)", "schedule:Gym:Some(5)"]
        );

        let state = ctl.snapshot();
        assert_eq!(state.preferences.len(), 1);
        assert_eq!(state.preferences[0].id, committed.id);
        assert!(!state.is_loading);
        assert_eq!(
            state.status.text(),
            "✓ 'Gym' scheduled weekly on 3 selected days at 18:00"
        );
    }

    #[tokio::test]
    async fn test_committed_preference_matches_reload() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);

        let stale = NotificationPreference::new("Walk", "07:00", Frequency::Daily)
            .with_days([1, 3])
            .with_day_of_month(40);
        let committed = ctl.create(stale).await.committed.unwrap();
        assert!(committed.days_of_week.is_empty());
        assert_eq!(committed.day_of_month, None);
        assert_eq!(gateway.stored()[0].day_of_month, None);

        ctl.load().await;
        let reloaded = &ctl.snapshot().preferences[0];
        assert_eq!(reloaded.days_of_week, committed.days_of_week);
        assert_eq!(reloaded.day_of_month, committed.day_of_month);
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_ids() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);

        let first = ctl.create(NotificationPreference::new("Water", "09:00", Frequency::Daily)).await;
        let second = ctl.create(NotificationPreference::new("Water", "09:00", Frequency::Daily)).await;

        let first = first.committed.unwrap();
        let second = second.committed.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(ctl.snapshot().preferences.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_create_commits_nothing_and_reports_orphans() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.fail_schedule_for(Some(3));
        let ctl = controller(&gateway);

        let outcome = ctl.create(gym()).await;

        assert!(!outcome.is_committed());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].step, FailedStep::Schedule { weekday: Some(3) });
        assert_eq!(outcome.orphaned_job_ids, vec!["job-1", "job-2"]);

        let state = ctl.snapshot();
        assert!(state.preferences.is_empty());
        assert!(state.status.text().starts_with("Some notifications failed: "));
        // no compensating deletes
        assert_eq!(gateway.stored().len(), 2);
        assert!(!gateway.calls().iter().any(|c| c.starts_with("delete:")));
    }

    #[tokio::test]
    async fn test_invalid_preference_makes_no_network_call() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);

        let outcome = ctl.create(NotificationPreference::new("  ", "18:00", Frequency::Daily)).await;

        assert!(!outcome.is_committed());
        assert_eq!(outcome.failures[0].step, FailedStep::Validate);
        assert!(gateway.calls().is_empty());
        assert_eq!(ctl.snapshot().status.text(), "Error: title is required");
    }

    #[tokio::test]
    async fn test_remove_deletes_every_job_then_drops_locally() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let gym = ctl.create(gym()).await.committed.unwrap();

        let outcome = ctl.remove(&gym).await;

        assert!(outcome.removed);
        assert!(ctl.snapshot().preferences.is_empty());
        assert!(gateway.stored().is_empty());
        assert_eq!(ctl.snapshot().status.text(), "✓ 'Gym' removed successfully");
    }

    #[tokio::test]
    async fn test_remove_with_failed_delete_keeps_preference() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let pref = ctl
            .create(NotificationPreference::new("Gym", "18:00", Frequency::Weekly).with_days([1, 2]))
            .await
            .committed
            .unwrap();
        assert_eq!(pref.job_ids, vec!["job-1", "job-2"]);
        gateway.fail_delete_of("job-2");

        let outcome = ctl.remove(&pref).await;

        assert!(!outcome.removed);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.failures[0].step,
            FailedStep::Delete {
                job_id: "job-2".to_string()
            }
        );
        // every job is attempted even though one fails
        assert!(gateway.calls().contains(&"delete:job-1".to_string()));
        assert!(gateway.calls().contains(&"delete:job-2".to_string()));

        let state = ctl.snapshot();
        assert_eq!(state.preferences, vec![pref]);
        assert!(state
            .status
            .text()
            .starts_with("Some deletions failed: Job job-2: 404"));
    }

    #[tokio::test]
    async fn test_remove_without_job_ids_drops_locally() {
        let gateway = Arc::new(FakeGateway::new().with_entries(vec![BackendEntry {
            job_id: None,
            ..stored(1, "Legacy", "daily", None, "unused")
        }]));
        let ctl = controller(&gateway);
        ctl.load().await;
        let legacy = ctl.snapshot().preferences[0].clone();
        assert!(legacy.job_ids.is_empty());

        let outcome = ctl.remove(&legacy).await;

        assert!(outcome.removed);
        assert!(ctl.snapshot().preferences.is_empty());
        assert!(!gateway.calls().iter().any(|c| c.starts_with("delete:")));
        assert_eq!(
            ctl.snapshot().status.text(),
            "✓ 'Legacy' removed successfully (no job_ids found)"
        );
    }

    #[tokio::test]
    async fn test_load_groups_backend_entries() {
        let gateway = Arc::new(FakeGateway::new().with_entries(vec![
            stored(1, "Run", "weekly", Some(2), "a"),
            stored(2, "Run", "weekly", Some(4), "b"),
            stored(3, "Pills", "daily", None, "c"),
        ]));
        let ctl = controller(&gateway);

        let outcome = ctl.load().await;

        assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
        let state = ctl.snapshot();
        assert_eq!(state.preferences[0].title, "Run");
        assert_eq!(state.preferences[0].job_ids, vec!["a", "b"]);
        assert_eq!(state.preferences[1].title, "Pills");
        assert_eq!(state.status.text(), "✓ Loaded 2 existing notification(s)");
        assert_eq!(gateway.calls(), vec![format!("list:{TOKEN}")]);
    }

    #[tokio::test]
    async fn test_load_not_found_is_empty_without_message() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.fail_list(Scripted::NotFound);
        let ctl = controller(&gateway);

        let outcome = ctl.load().await;

        assert_eq!(outcome, LoadOutcome::Empty);
        let state = ctl.snapshot();
        assert!(state.preferences.is_empty());
        assert!(state.status.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_load_server_error_keeps_existing_list() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        ctl.create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await;
        gateway.fail_list(Scripted::Server(500, "boom"));

        let outcome = ctl.load().await;

        assert!(matches!(outcome, LoadOutcome::Failed(ref f) if f.step == FailedStep::ListSchedules));
        let state = ctl.snapshot();
        assert_eq!(state.preferences.len(), 1);
        assert_eq!(state.status.text(), "Error loading notifications: 500 - boom");
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_frequency() {
        let gateway = Arc::new(
            FakeGateway::new().with_entries(vec![stored(9, "Odd", "fortnightly", None, "x")]),
        );
        let ctl = controller(&gateway);

        let outcome = ctl.load().await;

        assert!(matches!(outcome, LoadOutcome::Failed(ref f) if f.step == FailedStep::Reconcile));
        assert!(ctl.snapshot().preferences.is_empty());
        assert!(ctl
            .snapshot()
            .status
            .text()
            .starts_with("Error loading notifications: "));
    }

    #[tokio::test]
    async fn test_update_replaces_old_jobs() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let old = ctl.create(gym()).await.committed.unwrap();

        ctl.begin_edit(old.clone());
        let edited = NotificationPreference::new("Gym", "19:00", Frequency::Weekly).with_days([2, 4]);
        let outcome = ctl.save(edited).await;

        let updated = outcome.committed.expect("update should commit");
        assert!(outcome.stale_job_failures.is_empty());
        assert_ne!(updated.id, old.id);
        assert_eq!(updated.time, "19:00");

        let state = ctl.snapshot();
        assert_eq!(state.preferences, vec![updated]);
        assert!(state.editing.is_none());
        assert_eq!(state.status.text(), "✓ 'Gym' updated successfully");
        // only the new jobs remain on the backend
        let days: Vec<_> = gateway.stored().iter().map(|e| e.day_of_week).collect();
        assert_eq!(days, vec![Some(2), Some(4)]);
    }

    #[tokio::test]
    async fn test_update_continues_past_failed_old_delete() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let old = ctl
            .create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await
            .committed
            .unwrap();
        gateway.fail_delete_of(&old.job_ids[0]);

        let outcome = ctl
            .update(old.clone(), NotificationPreference::new("Water", "10:00", Frequency::Daily))
            .await;

        assert!(outcome.is_committed());
        assert_eq!(outcome.stale_job_failures.len(), 1);
        let state = ctl.snapshot();
        assert_eq!(state.preferences.len(), 1);
        assert_eq!(state.preferences[0].time, "10:00");
    }

    #[tokio::test]
    async fn test_update_failure_still_drops_old_preference() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let old = ctl
            .create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await
            .committed
            .unwrap();
        gateway.fail_schedule_for(None);

        let outcome = ctl
            .update(old, NotificationPreference::new("Water", "10:00", Frequency::Daily))
            .await;

        assert!(!outcome.is_committed());
        assert!(ctl.snapshot().preferences.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_old_preference_alone() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let old = ctl
            .create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await
            .committed
            .unwrap();
        let calls_before = gateway.calls().len();

        let outcome = ctl
            .update(old.clone(), NotificationPreference::new("Water", "25:99", Frequency::Daily))
            .await;

        assert_eq!(outcome.failures[0].step, FailedStep::Validate);
        assert_eq!(gateway.calls().len(), calls_before);
        assert_eq!(ctl.snapshot().preferences, vec![old]);
    }

    #[tokio::test]
    async fn test_cancel_edit_makes_save_create() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let old = ctl
            .create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await
            .committed
            .unwrap();

        ctl.begin_edit(old);
        ctl.cancel_edit();
        ctl.save(NotificationPreference::new("Stretch", "11:00", Frequency::Weekdays))
            .await;

        assert_eq!(ctl.snapshot().preferences.len(), 2);
        assert!(!gateway.calls().iter().any(|c| c.starts_with("delete:")));
    }

    #[tokio::test]
    async fn test_clear_status_empties_message() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.fail_list(Scripted::Server(500, "boom"));
        let ctl = controller(&gateway);

        ctl.load().await;
        assert!(!ctl.snapshot().status.is_empty());

        ctl.clear_status();
        assert!(ctl.snapshot().status.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_status_clears_after_delay() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = PreferenceController::new(Arc::clone(&gateway), TOKEN);

        ctl.create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await;
        assert!(ctl.snapshot().status.is_success());

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(ctl.snapshot().status.is_success());

        tokio::time::sleep(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;
        assert!(ctl.snapshot().status.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_after_success_is_not_auto_cleared() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = PreferenceController::new(Arc::clone(&gateway), TOKEN);

        ctl.create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        gateway.fail_list(Scripted::Server(503, "unavailable"));
        ctl.load().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert_eq!(
            ctl.snapshot().status.text(),
            "Error loading notifications: 503 - unavailable"
        );
    }

    #[tokio::test]
    async fn test_subscribers_observe_loading_flag() {
        let gateway = Arc::new(FakeGateway::new());
        let ctl = controller(&gateway);
        let mut rx = ctl.subscribe();

        ctl.create(NotificationPreference::new("Water", "09:00", Frequency::Daily))
            .await;

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update();
        assert!(!seen.is_loading);
        assert_eq!(seen.preferences.len(), 1);
    }
}
