mod common;

use std::sync::atomic::Ordering;

use advisory_geofilter::{Advisory, GenerationJob, JobError, JobEvent, JobStatus, LogSeverity, Severity};
use anyhow::anyhow;
use common::{FakeApi, ADVISORY};
use parking_lot::Mutex;

fn red_advisory() -> Advisory {
    Advisory { id: ADVISORY, color: Severity::Red, title: "Lluvias intensas".into() }
}

fn log(message: &str) -> JobEvent {
    JobEvent::Log { message: message.into(), severity: LogSeverity::Info }
}

#[tokio::test]
async fn job_streams_to_completion() {
    let api = FakeApi::new();
    let feed = api.generation_feed();
    for event in [
        log("Descargando shapefile"),
        JobEvent::Progress { current: 1, total: 2 },
        JobEvent::Progress { current: 2, total: 2 },
        JobEvent::Complete { message: "2 mapas".into() },
    ] {
        feed.send(Ok(event)).unwrap();
    }

    let job = GenerationJob::new(red_advisory()).unwrap();
    let mut seen = Vec::new();
    let status = job.run(&api, |e| seen.push(e.clone())).await.unwrap();

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(seen.len(), 4);
    assert_eq!(job.progress().map(|p| (p.current, p.total)), Some((2, 2)));
    assert_eq!(job.last_message().as_deref(), Some("2 mapas"));
}

#[tokio::test]
async fn cancel_unlocks_immediately_and_discards_later_events() {
    let api = FakeApi::new();
    let feed = api.generation_feed();
    let job = GenerationJob::new(red_advisory()).unwrap();
    let seen = Mutex::new(Vec::new());

    let (status, ()) = tokio::join!(
        job.run(&api, |e| seen.lock().push(e.clone())),
        async {
            feed.send(Ok(log("Procesando PIURA"))).unwrap();
            while seen.lock().is_empty() {
                tokio::task::yield_now().await;
            }
            assert_eq!(job.status(), JobStatus::Running);

            // A second run is refused while the first streams
            let refused = job.run(&api, |_| {}).await.unwrap_err();
            assert_eq!(refused.downcast_ref::<JobError>(), Some(&JobError::AlreadyRunning));

            job.cancel(&api).await.unwrap();
            assert_eq!(job.status(), JobStatus::Cancelled);

            feed.send(Ok(JobEvent::Progress { current: 3, total: 4 })).unwrap();
            feed.send(Ok(JobEvent::Complete { message: "listo".into() })).unwrap();
        }
    );

    assert_eq!(status.unwrap(), JobStatus::Cancelled);
    assert_eq!(*seen.lock(), vec![log("Procesando PIURA")]);
    assert_eq!(api.cancels.load(Ordering::SeqCst), 1);
    assert!(job.progress().is_none());
}

#[tokio::test]
async fn stream_errors_and_early_close_fail_the_job() {
    let api = FakeApi::new();
    let feed = api.generation_feed();
    feed.send(Ok(log("inicio"))).unwrap();
    feed.send(Err(anyhow!("connection reset"))).unwrap();
    let job = GenerationJob::new(red_advisory()).unwrap();
    assert_eq!(job.run(&api, |_| {}).await.unwrap(), JobStatus::Failed);

    let feed = api.generation_feed();
    feed.send(Ok(JobEvent::Progress { current: 1, total: 3 })).unwrap();
    drop(feed);
    assert_eq!(job.run(&api, |_| {}).await.unwrap(), JobStatus::Failed);
    assert_eq!(job.last_message().as_deref(), Some("stream closed before completion"));
}

#[tokio::test]
async fn server_error_event_fails_the_job() {
    let api = FakeApi::new();
    let feed = api.generation_feed();
    feed.send(Ok(JobEvent::Error { message: "sin poligonos".into() })).unwrap();

    let job = GenerationJob::new(red_advisory()).unwrap();
    assert_eq!(job.run(&api, |_| {}).await.unwrap(), JobStatus::Failed);
    assert_eq!(api.cancels.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn start_failure_is_reported() {
    let api = FakeApi::new();
    let job = GenerationJob::new(red_advisory()).unwrap();
    assert!(job.run(&api, |_| {}).await.is_err());
    assert_eq!(job.status(), JobStatus::Failed);
}

#[test]
fn only_red_and_orange_advisories_generate_maps() {
    let yellow = Advisory { id: 9, color: Severity::Yellow, title: "Heladas".into() };
    assert!(matches!(
        GenerationJob::new(yellow),
        Err(JobError::NotEligible { advisory: 9, color: Severity::Yellow })
    ));
    let orange = Advisory { id: 10, color: Severity::Orange, title: "Vientos".into() };
    assert!(GenerationJob::new(orange).is_ok());
}
