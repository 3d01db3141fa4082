use runwait::runner::{
    DefaultErrorHandler, RunnableTask, WaitOptions, WaitOutcome, fire_and_forget, run_and_wait,
    wait_for,
};
use runwait::sync::{CancellationToken, StateCell, TriState};
use runwait::time::sleep;
use runwait::{BoxError, RuntimeBuilder, TaskError, task};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn recording_handler() -> (Arc<Mutex<Vec<String>>>, impl Fn(TaskError) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |error: TaskError| sink.lock().unwrap().push(error.to_string()))
}

#[runwait::test]
async fn test_short_work_completes_promptly() {
    let (seen, handler) = recording_handler();
    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(25))
        .max_wait(Duration::from_millis(1000))
        .error_handler(handler);

    let start = Instant::now();
    let outcome = run_and_wait(
        async {
            sleep(Duration::from_millis(10)).await;
            Ok::<_, BoxError>(())
        },
        options,
    )
    .await;
    let elapsed = start.elapsed();

    assert_eq!(outcome, WaitOutcome::Completed);
    assert!(elapsed >= Duration::from_millis(10), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(100), "returned too late: {elapsed:?}");
    assert!(seen.lock().unwrap().is_empty());
}

#[runwait::test]
async fn test_endless_work_times_out() {
    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(25))
        .max_wait(Duration::from_millis(100));

    let start = Instant::now();
    let outcome = run_and_wait(
        async {
            std::future::pending::<()>().await;
            Ok::<_, BoxError>(())
        },
        options,
    )
    .await;
    let elapsed = start.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(elapsed >= Duration::from_millis(100), "gave up too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(200), "gave up too late: {elapsed:?}");
}

#[runwait::test]
async fn test_never_woken_work_times_out_and_keeps_running() {
    let task = RunnableTask::new(async {
        std::future::pending::<()>().await;
        Ok::<_, BoxError>(())
    });
    let state = task.spawn();

    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(25))
        .max_wait(Duration::from_millis(100));

    let start = Instant::now();
    let outcome = wait_for(&state, &options).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(elapsed >= Duration::from_millis(100), "gave up too early: {elapsed:?}");
    assert!(state.is_true());

    sleep(Duration::from_millis(50)).await;
    assert!(state.is_true(), "orphaned work must not be reported finished");
}

#[test]
fn test_shutdown_does_not_report_unfinished_work_as_done() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    let state = rt.block_on(async {
        RunnableTask::new(async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, BoxError>(())
        })
        .spawn()
    });

    assert!(state.is_true());
    drop(rt);
    assert!(state.is_true());
}

#[runwait::test]
async fn test_failing_work_reports_once_and_terminates() {
    let (seen, handler) = recording_handler();
    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(5))
        .max_wait(Duration::from_secs(2))
        .error_handler(handler);

    let outcome = run_and_wait(
        async { Err::<(), _>(io::Error::other("disk unplugged")) },
        options,
    )
    .await;

    assert_eq!(outcome, WaitOutcome::Completed);
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["task failed: disk unplugged".to_string()]
    );
}

#[runwait::test]
async fn test_panicking_work_reports_once_and_terminates() {
    let (seen, handler) = recording_handler();
    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(5))
        .max_wait(Duration::from_secs(2))
        .error_handler(handler);

    let outcome = run_and_wait(
        async {
            sleep(Duration::from_millis(5)).await;
            if true {
                panic!("measure pass failed");
            }
            Ok::<_, BoxError>(())
        },
        options,
    )
    .await;

    assert_eq!(outcome, WaitOutcome::Completed);
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["task panicked: measure pass failed".to_string()]
    );
}

#[runwait::test]
async fn test_cancelled_wait_leaves_work_running() {
    let token = CancellationToken::new();
    let finished = Arc::new(AtomicBool::new(false));

    let canceller = token.clone();
    task::spawn(async move {
        sleep(Duration::from_millis(30)).await;
        canceller.cancel();
    });

    let flag = finished.clone();
    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(5))
        .cancel_on(token);

    let outcome = run_and_wait(
        async move {
            sleep(Duration::from_millis(150)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, BoxError>(())
        },
        options,
    )
    .await;

    assert_eq!(outcome, WaitOutcome::Cancelled);
    assert!(!finished.load(Ordering::SeqCst));

    sleep(Duration::from_millis(400)).await;
    assert!(finished.load(Ordering::SeqCst), "work should outlive the wait");
}

#[runwait::test]
async fn test_timed_out_work_still_finishes() {
    let task = RunnableTask::new(async {
        sleep(Duration::from_millis(120)).await;
        Ok::<_, BoxError>(())
    });
    let state = task.spawn();

    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(10))
        .max_wait(Duration::from_millis(20));
    assert_eq!(wait_for(&state, &options).await, WaitOutcome::TimedOut);
    assert!(state.is_true());

    assert_eq!(wait_for(&state, &WaitOptions::new()).await, WaitOutcome::Completed);
    assert!(state.is_false());
}

#[runwait::test]
async fn test_wait_returns_at_once_when_not_running() {
    let options = WaitOptions::new().poll_interval(Duration::from_secs(5));

    for state in [TriState::False, TriState::Unset] {
        let cell = StateCell::with_state(state);

        let start = Instant::now();
        assert_eq!(wait_for(&cell, &options).await, WaitOutcome::Completed);
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}

#[runwait::test]
async fn test_pre_cancelled_token_stops_before_sleeping() {
    let token = CancellationToken::new();
    token.cancel();

    let cell = StateCell::with_state(TriState::True);
    let options = WaitOptions::new()
        .poll_interval(Duration::from_secs(5))
        .cancel_on(token);

    let start = Instant::now();
    assert_eq!(wait_for(&cell, &options).await, WaitOutcome::Cancelled);
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[runwait::test]
async fn test_fire_and_forget_runs_in_background() {
    let (seen, handler) = recording_handler();
    let ran = Arc::new(AtomicBool::new(false));

    let flag = ran.clone();
    let state = fire_and_forget(
        async move {
            sleep(Duration::from_millis(10)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, BoxError>(())
        },
        handler,
    );

    assert_eq!(wait_for(&state, &WaitOptions::new()).await, WaitOutcome::Completed);
    assert!(ran.load(Ordering::SeqCst));
    assert!(seen.lock().unwrap().is_empty());
}

#[runwait::test]
async fn test_fire_and_forget_with_default_handler_survives_errors() {
    let state = fire_and_forget(async { Err::<(), _>("offline") }, DefaultErrorHandler);

    let options = WaitOptions::new().max_wait(Duration::from_secs(2));
    assert_eq!(wait_for(&state, &options).await, WaitOutcome::Completed);
}

#[test]
#[should_panic(expected = "poll_interval must be > 0")]
fn test_zero_poll_interval_is_rejected() {
    let _ = WaitOptions::new().poll_interval(Duration::ZERO);
}
