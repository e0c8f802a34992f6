//! Tests for the async debouncer.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use gridstate::debounce::AsyncDebouncer;
use tokio::time::Instant;

type Log = Arc<Mutex<Vec<(Duration, u32)>>>;

fn debouncer(delay: Duration) -> (AsyncDebouncer<u32>, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let start = Instant::now();
    let debouncer = AsyncDebouncer::new(delay, move |v: u32| {
        sink.lock().unwrap().push((start.elapsed(), v));
    });
    (debouncer, log)
}

#[tokio::test(start_paused = true)]
async fn test_commits_at_0_100_200_fire_once_at_700() {
    let (mut debouncer, log) = debouncer(Duration::from_millis(500));
    debouncer.commit(0);
    tokio::time::advance(Duration::from_millis(100)).await;
    debouncer.commit(100);
    tokio::time::advance(Duration::from_millis(100)).await;
    debouncer.commit(200);

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(log.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_secs(5)).await;
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].1, 200);
    assert!(log[0].0 >= Duration::from_millis(700));
    assert!(log[0].0 < Duration::from_millis(710));
}

#[tokio::test(start_paused = true)]
async fn test_separate_quiet_periods_fire_separately() {
    let (mut debouncer, log) = debouncer(Duration::from_millis(50));
    debouncer.commit(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    debouncer.commit(2);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let values: Vec<u32> = log.lock().unwrap().iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![1, 2]);
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_delivery() {
    let (mut debouncer, log) = debouncer(Duration::from_millis(50));
    debouncer.commit(1);
    debouncer.cancel();
    assert!(!debouncer.is_pending());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(log.lock().unwrap().is_empty());
}
