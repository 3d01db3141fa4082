use runwait::runner::{WaitOptions, run_and_wait};
use runwait::time::sleep;
use runwait::{BoxError, RuntimeBuilder, TaskError, task};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[test]
fn test_invoke_async_returns_value_from_main_thread() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();
    let main = rt.main_thread();
    let handle = main.handle();

    let (value, on_main, caller_on_main) = main.block_on(async move {
        let probe = handle.clone();
        task::spawn(async move {
            let checker = probe.clone();
            let value = probe.invoke_async(|| 21 * 2).await;
            let on_main = probe.invoke_async(move || checker.is_main_thread()).await;
            (value, on_main, probe.is_main_thread())
        })
        .await
    });

    assert_eq!(value.unwrap(), 42);
    assert!(on_main.unwrap());
    assert!(!caller_on_main);
}

#[test]
fn test_jobs_run_while_waiting_for_background_work() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();
    let main = rt.main_thread();
    let handle = main.handle();
    let main_id = thread::current().id();

    let seen_on = Arc::new(Mutex::new(None));
    let sink = seen_on.clone();

    let options = WaitOptions::new()
        .poll_interval(Duration::from_millis(10))
        .max_wait(Duration::from_secs(2));

    let outcome = main.block_on(run_and_wait(
        async move {
            handle.invoke(move || {
                *sink.lock().unwrap() = Some(thread::current().id());
            });
            sleep(Duration::from_millis(50)).await;
            Ok::<_, BoxError>(())
        },
        options,
    ));

    assert!(outcome.is_completed());
    assert_eq!(*seen_on.lock().unwrap(), Some(main_id));
}

#[test]
fn test_run_parallel_calls_back_on_main_thread() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();
    let main = rt.main_thread();
    let handle = main.handle();
    let main_id = thread::current().id();

    let work_done = Arc::new(AtomicBool::new(false));
    let callback = Arc::new(Mutex::new(None));

    let done = work_done.clone();
    let probe = work_done.clone();
    let sink = callback.clone();

    let state = handle.run_parallel(
        async move {
            sleep(Duration::from_millis(20)).await;
            done.store(true, Ordering::SeqCst);
            Ok::<_, BoxError>(())
        },
        move || {
            *sink.lock().unwrap() = Some((thread::current().id(), probe.load(Ordering::SeqCst)));
        },
    );

    let recorded = main.block_on(async {
        loop {
            if let Some(recorded) = *callback.lock().unwrap() {
                break recorded;
            }
            sleep(Duration::from_millis(5)).await;
        }
    });

    assert_eq!(recorded, (main_id, true));
    assert!(state.is_false());
}

#[test]
fn test_run_parallel_calls_back_after_failure() {
    let rt = RuntimeBuilder::new().worker_threads(1).build();
    let main = rt.main_thread();
    let handle = main.handle();

    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();

    handle.run_parallel(async { Err::<(), _>("network down") }, move || {
        flag.store(true, Ordering::SeqCst);
    });

    main.block_on(async {
        while !called.load(Ordering::SeqCst) {
            sleep(Duration::from_millis(5)).await;
        }
    });
}

#[test]
fn test_run_pending_runs_queued_jobs_once() {
    let rt = RuntimeBuilder::new().worker_threads(1).build();
    let main = rt.main_thread();
    let handle = main.handle();
    let count = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let count = count.clone();
        handle.invoke(move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert_eq!(main.run_pending(), 3);
    assert_eq!(main.run_pending(), 0);
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_panicking_job_is_reported_and_loop_survives() {
    let rt = RuntimeBuilder::new().worker_threads(1).build();
    let main = rt.main_thread();
    let handle = main.handle();

    handle.invoke(|| panic!("fire and forget job"));

    let failed = main.block_on(handle.invoke_async(|| -> u32 { panic!("broken binding") }));
    let ok = main.block_on(handle.invoke_async(|| 5));

    match failed {
        Err(TaskError::Panicked(message)) => assert_eq!(message, "broken binding"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(ok.unwrap(), 5);
}

#[test]
fn test_dropped_main_thread_abandons_jobs() {
    let rt = RuntimeBuilder::new().worker_threads(1).build();
    let main = rt.main_thread();
    let handle = main.handle();

    let pending = handle.invoke_async(|| 1);
    drop(main);
    let late = handle.invoke_async(|| 2);

    assert!(matches!(rt.block_on(pending), Err(TaskError::Abandoned)));
    assert!(matches!(rt.block_on(late), Err(TaskError::Abandoned)));
}

#[test]
fn test_block_on_accepts_local_futures() {
    let rt = RuntimeBuilder::new().worker_threads(1).build();
    let main = rt.main_thread();
    let local = Rc::new(3);

    let value = main.block_on(async move {
        sleep(Duration::from_millis(10)).await;
        *local * 2
    });

    assert_eq!(value, 6);
}

#[test]
fn test_handle_is_main_thread_only_on_owner() {
    let rt = RuntimeBuilder::new().worker_threads(1).build();
    let main = rt.main_thread();
    let handle = main.handle();

    assert!(handle.is_main_thread());

    let remote = handle.clone();
    assert!(!thread::spawn(move || remote.is_main_thread()).join().unwrap());
}
