use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::broadcast::Receiver;

use lighthouse_batch::error::{AppError, AppResult, ApiError, InputError};
use lighthouse_batch::models::{Device, JobStatus, MeasurementOutcome, Scores, SourceKind};
use lighthouse_batch::orchestrator::{cancel_pair, CancelHandle};
use lighthouse_batch::services::demo_source::{DEMO_FAILURE_MESSAGE, DEMO_FAILURE_STATUS};
use lighthouse_batch::workflow::GENERIC_FAILURE_MESSAGE;
use lighthouse_batch::{BatchEvent, BatchOrchestrator, Config, DemoSource, MeasurementSource};

/// 每个 (url, device) 的预设行为
#[derive(Clone)]
enum Reply {
    Scores(Scores),
    Outcome(MeasurementOutcome),
    Raise,
}

/// 按脚本返回结果的数据源，未配置的组合返回固定分数
struct ScriptedSource {
    replies: HashMap<(String, Device), Reply>,
    calls: AtomicUsize,
    cancel_after: Option<(usize, CancelHandle)>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    fn reply(mut self, url: &str, device: Device, reply: Reply) -> Self {
        self.replies.insert((url.to_string(), device), reply);
        self
    }

    /// 第 `calls` 次调用时触发取消
    fn cancel_after(mut self, calls: usize, handle: CancelHandle) -> Self {
        self.cancel_after = Some((calls, handle));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn good_scores() -> Scores {
    Scores {
        performance: 95,
        accessibility: 88,
        best_practices: 72,
        seo: 40,
    }
}

impl MeasurementSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn measure<'a>(
        &'a self,
        url: &'a str,
        device: Device,
    ) -> BoxFuture<'a, AppResult<MeasurementOutcome>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, handle)) = &self.cancel_after {
            if call == *after {
                handle.cancel();
            }
        }

        let reply = self
            .replies
            .get(&(url.to_string(), device))
            .cloned()
            .unwrap_or(Reply::Scores(good_scores()));

        let result = match reply {
            Reply::Scores(scores) => Ok(MeasurementOutcome::success(url, scores)),
            Reply::Outcome(outcome) => Ok(outcome),
            Reply::Raise => Err(ApiError::BadResponse {
                status: 503,
                reason: "Service Unavailable".into(),
            }
            .into()),
        };
        async move { result }.boxed()
    }
}

fn drain(rx: &mut Receiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn demo_config(failure_rate: f64) -> Config {
    Config {
        demo_min_delay_ms: 0,
        demo_max_delay_ms: 0,
        demo_failure_rate: failure_rate,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_each_url_becomes_mobile_then_desktop() {
    let mut orchestrator = BatchOrchestrator::new(Arc::new(ScriptedSource::new()));

    let report = orchestrator
        .run_batch(&["a.com", "https://b.com"])
        .await
        .unwrap();

    let records = orchestrator.records();
    assert_eq!(records.len(), 4);
    assert_eq!(
        records
            .iter()
            .map(|r| (r.url.as_str(), r.device))
            .collect::<Vec<_>>(),
        vec![
            ("https://a.com", Device::Mobile),
            ("https://a.com", Device::Desktop),
            ("https://b.com", Device::Mobile),
            ("https://b.com", Device::Desktop),
        ]
    );
    assert!(records.iter().all(|r| r.status == JobStatus::Completed));
    assert!(records.iter().all(|r| r.scores == good_scores()));

    assert_eq!(report.total, 4);
    assert_eq!(report.completed, 4);
    assert!(report.all_succeeded());
    assert_eq!(orchestrator.stats().current_url, None);
    assert_eq!(orchestrator.stats().progress_percentage(), 100);
}

#[tokio::test]
async fn test_events_track_every_transition() {
    let mut orchestrator = BatchOrchestrator::new(Arc::new(ScriptedSource::new()));
    let mut rx = orchestrator.subscribe();

    orchestrator.run_batch(&["a.com"]).await.unwrap();
    let events = drain(&mut rx);

    // Started + 2 × (testing, completed) + Finished
    assert_eq!(events.len(), 6);

    match &events[0] {
        BatchEvent::Started { jobs, stats } => {
            assert_eq!(jobs.len(), 2);
            assert!(jobs.iter().all(|j| j.status == JobStatus::Pending));
            assert_eq!(stats.current_url.as_deref(), Some("https://a.com"));
        }
        other => panic!("expected Started, got {:?}", other),
    }

    let statuses: Vec<(Device, JobStatus)> = events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::JobUpdated { job, .. } => Some((job.device, job.status)),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            (Device::Mobile, JobStatus::Testing),
            (Device::Mobile, JobStatus::Completed),
            (Device::Desktop, JobStatus::Testing),
            (Device::Desktop, JobStatus::Completed),
        ]
    );

    let mut finished = 0;
    for event in &events {
        let stats = event.stats();
        assert!(stats.is_consistent());
        assert_eq!(stats.total, 2);
        assert!(stats.completed + stats.errors >= finished);
        finished = stats.completed + stats.errors;

        if let BatchEvent::JobUpdated { job, stats } = event {
            if job.status == JobStatus::Testing {
                assert_eq!(stats.current_url.as_deref(), Some(job.url.as_str()));
            }
        }
    }

    match events.last() {
        Some(BatchEvent::Finished { report, stats }) => {
            assert_eq!(report.completed, 2);
            assert_eq!(stats.current_url, None);
        }
        other => panic!("expected Finished, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failures_stay_on_their_own_job() {
    let source = ScriptedSource::new()
        .reply("https://bad.com", Device::Mobile, Reply::Raise)
        .reply(
            "https://bad.com",
            Device::Desktop,
            Reply::Outcome(MeasurementOutcome::failure(
                "https://bad.com",
                0,
                "HTTP 500: Internal Server Error",
            )),
        );
    let mut orchestrator = BatchOrchestrator::new(Arc::new(source));

    let report = orchestrator
        .run_batch(&["good.com", "bad.com", "other.com"])
        .await
        .unwrap();

    let records = orchestrator.records();
    assert_eq!(records.len(), 6);

    let raised = &records[2];
    assert_eq!(raised.status, JobStatus::Error);
    assert_eq!(raised.error.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(raised.page_status, 0);
    assert_eq!(raised.scores, Scores::default());

    let reported = &records[3];
    assert_eq!(reported.status, JobStatus::Error);
    assert_eq!(
        reported.error.as_deref(),
        Some("HTTP 500: Internal Server Error")
    );
    assert_eq!(reported.page_status, 0);

    for index in [0, 1, 4, 5] {
        assert_eq!(records[index].status, JobStatus::Completed);
        assert_eq!(records[index].error, None);
        assert_eq!(records[index].page_status, 200);
    }

    assert_eq!(report.completed, 4);
    assert_eq!(report.errors, 2);
    assert!(!report.all_succeeded());
}

#[tokio::test]
async fn test_cancel_stops_before_next_job() {
    let (handle, token) = cancel_pair();
    let source = Arc::new(ScriptedSource::new().cancel_after(1, handle));
    let mut orchestrator =
        BatchOrchestrator::new(source.clone()).with_cancellation(token);

    let report = orchestrator.run_batch(&["a.com", "b.com"]).await.unwrap();

    assert_eq!(source.calls(), 1);
    let statuses: Vec<JobStatus> = orchestrator.records().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            JobStatus::Completed,
            JobStatus::Cancelled,
            JobStatus::Cancelled,
            JobStatus::Cancelled,
        ]
    );
    assert_eq!(report.completed, 1);
    assert_eq!(report.cancelled, 3);
    assert_eq!(orchestrator.stats().in_progress(), 0);
}

#[tokio::test]
async fn test_demo_batch_success() {
    let source = DemoSource::with_seed(&demo_config(0.0), 7);
    let mut orchestrator = BatchOrchestrator::new(Arc::new(source));

    let report = orchestrator.run_batch(&["foo.com"]).await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.completed, 2);
    for record in orchestrator.records() {
        assert_eq!(record.name, "foo.com - Demo Site");
        assert_eq!(record.page_status, 200);
        assert!((60..100).contains(&record.scores.performance));
        assert!((70..100).contains(&record.scores.accessibility));
        assert!((50..100).contains(&record.scores.best_practices));
        assert!((60..100).contains(&record.scores.seo));
    }
}

#[tokio::test]
async fn test_demo_batch_failure() {
    let source = DemoSource::with_seed(&demo_config(1.0), 7);
    let mut orchestrator = BatchOrchestrator::new(Arc::new(source));

    let report = orchestrator.run_batch(&["foo.com"]).await.unwrap();

    assert_eq!(report.errors, 2);
    assert_eq!(report.completed, 0);
    for record in orchestrator.records() {
        assert_eq!(record.status, JobStatus::Error);
        assert_eq!(record.page_status, DEMO_FAILURE_STATUS);
        assert_eq!(record.error.as_deref(), Some(DEMO_FAILURE_MESSAGE));
        assert_eq!(record.scores, Scores::default());
    }
}

#[tokio::test]
async fn test_new_batch_replaces_previous_results() {
    let mut orchestrator = BatchOrchestrator::new(Arc::new(ScriptedSource::new()));

    orchestrator.run_batch(&["a.com", "b.com"]).await.unwrap();
    let first_ids: Vec<_> = orchestrator.records().iter().map(|r| r.id).collect();

    let report = orchestrator.run_batch(&["c.com"]).await.unwrap();

    assert_eq!(report.total, 2);
    assert!(orchestrator
        .records()
        .iter()
        .all(|r| r.url == "https://c.com" && !first_ids.contains(&r.id)));
}

#[tokio::test]
async fn test_empty_submission_keeps_previous_results() {
    let mut orchestrator = BatchOrchestrator::new(Arc::new(ScriptedSource::new()));
    orchestrator.run_batch(&["a.com"]).await.unwrap();

    let empty: Vec<String> = vec!["  ".into()];
    let err = orchestrator.run_batch(&empty).await.unwrap_err();

    assert!(matches!(err, AppError::Input(InputError::EmptySubmission)));
    assert_eq!(orchestrator.records().len(), 2);
}
