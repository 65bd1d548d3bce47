//! Property tests for the serialization queue: ordering, mutual exclusion,
//! settlement, and failure isolation, all against scripted executors.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cad_relay::executor::ExecError;
use cad_relay::queue::{ExecOutput, JobError, JobQueue};

use common::{structured_ok, ScriptedExecutor};

#[tokio::test]
async fn test_fifo_order_no_overlap_and_total_time() {
    // Jobs 0, 1, 2 take 100ms, 400ms, 100ms. Submitted near-simultaneously
    // in order, they must execute strictly back to back.
    let events: Arc<Mutex<Vec<(&'static str, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let ev = events.clone();
    let inf = in_flight.clone();
    let ov = overlaps.clone();
    let executor = ScriptedExecutor::new(move |_seq, _kind, code: String| {
        let ev = ev.clone();
        let inf = inf.clone();
        let ov = ov.clone();
        async move {
            let job: usize = code.parse().unwrap();
            if inf.fetch_add(1, Ordering::SeqCst) != 0 {
                ov.fetch_add(1, Ordering::SeqCst);
            }
            ev.lock().unwrap().push(("start", job));
            let delay = [100u64, 400, 100][job];
            tokio::time::sleep(Duration::from_millis(delay)).await;
            ev.lock().unwrap().push(("end", job));
            inf.fetch_sub(1, Ordering::SeqCst);
            Ok(structured_ok("ok"))
        }
    });

    let queue = JobQueue::new(executor.clone(), Duration::from_secs(5));
    let start = Instant::now();

    let mut handles = Vec::new();
    for i in 0..3usize {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            // Small stagger pins the submission order without serializing
            // the submitters themselves.
            tokio::time::sleep(Duration::from_millis(10 * i as u64)).await;
            queue.submit("preview", i.to_string()).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    let elapsed = start.elapsed();

    assert_eq!(overlaps.load(Ordering::SeqCst), 0, "executions overlapped");
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            ("start", 0),
            ("end", 0),
            ("start", 1),
            ("end", 1),
            ("start", 2),
            ("end", 2),
        ],
        "jobs must run in submission order, each starting after the previous settles"
    );
    assert!(
        elapsed >= Duration::from_millis(600),
        "serialized execution cannot beat the sum of delays, took {:?}",
        elapsed
    );
    assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
    assert_eq!(executor.calls(), 3);
}

#[tokio::test]
async fn test_every_job_settles_exactly_once_with_its_own_result() {
    // Job 1 fails; the others succeed. Each submitter gets its own outcome.
    let executor = ScriptedExecutor::new(|_seq, _kind, code: String| async move {
        let job: usize = code.parse().unwrap();
        if job == 1 {
            Err(ExecError::Backend {
                status: 400,
                message: format!("job {} has invalid code", job),
            })
        } else {
            Ok(structured_ok(&format!("job {} done", job)))
        }
    });

    let queue = JobQueue::new(executor.clone(), Duration::from_secs(5));

    let mut handles = Vec::new();
    for i in 0..4usize {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5 * i as u64)).await;
            (i, queue.submit("preview", i.to_string()).await)
        }));
    }

    for handle in handles {
        let (i, outcome) = handle.await.unwrap();
        match outcome {
            Ok(ExecOutput::Structured { message, .. }) => {
                assert_eq!(message, format!("job {} done", i));
            }
            Err(JobError::Execution { status, message }) => {
                assert_eq!(i, 1, "only job 1 was scripted to fail");
                assert_eq!(status, 400);
                assert!(message.contains("job 1"));
            }
            other => panic!("job {} settled unexpectedly: {:?}", i, other),
        }
    }
    assert_eq!(executor.calls(), 4);
}

#[tokio::test]
async fn test_timeout_settles_job_and_releases_queue() {
    // Job 0 hangs far past the deadline; job 1 is quick. The timeout must
    // both settle job 0 and unblock job 1.
    let executor = ScriptedExecutor::new(|_seq, _kind, code: String| async move {
        let job: usize = code.parse().unwrap();
        if job == 0 {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(structured_ok("ok"))
    });

    let queue = JobQueue::new(executor.clone(), Duration::from_millis(200));
    let start = Instant::now();

    let q0 = queue.clone();
    let slow = tokio::spawn(async move { q0.submit("preview", "0".to_string()).await });
    let q1 = queue.clone();
    let fast = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        q1.submit("preview", "1".to_string()).await
    });

    let slow_outcome = slow.await.unwrap();
    match slow_outcome {
        Err(JobError::Timeout { .. }) => {}
        other => panic!("expected timeout, got {:?}", other),
    }

    assert!(fast.await.unwrap().is_ok());
    let elapsed = start.elapsed();
    assert!(
        elapsed < Duration::from_secs(2),
        "the hung job must not hold the queue, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_unknown_kind_rejected_without_invoking_executor() {
    let executor = ScriptedExecutor::new(|_seq, _kind, _code| async { Ok(structured_ok("ok")) });
    let queue = JobQueue::new(executor.clone(), Duration::from_secs(1));

    let err = queue
        .submit("bogus", "result = 1".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::UnknownKind { .. }));
    assert_eq!(err.status(), 400);
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_backend_failure_does_not_stall_the_queue() {
    let executor = ScriptedExecutor::new(|seq, _kind, _code| async move {
        if seq == 0 {
            Err(ExecError::Backend {
                status: 500,
                message: "engine exploded".to_string(),
            })
        } else {
            Ok(structured_ok("recovered"))
        }
    });

    let queue = JobQueue::new(executor.clone(), Duration::from_secs(5));

    let err = queue
        .submit("preview", "first".to_string())
        .await
        .unwrap_err();
    match err {
        JobError::Execution { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "engine exploded");
        }
        other => panic!("expected execution failure, got {:?}", other),
    }

    let output = queue.submit("preview", "second".to_string()).await.unwrap();
    match output {
        ExecOutput::Structured { message, .. } => assert_eq!(message, "recovered"),
        other => panic!("expected structured output, got {:?}", other),
    }
    assert_eq!(executor.calls(), 2);
}
