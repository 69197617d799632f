use std::time::{Duration, Instant};

use awsign_core::AttemptStrategy;

#[test]
fn test_attempt_window() {
    let strategy = AttemptStrategy::new(Duration::from_millis(250), Duration::from_millis(50));
    let start = Instant::now();

    let mut attempt = strategy.start();
    let mut tries = 0;
    while attempt.next() {
        tries += 1;
    }
    let elapsed = start.elapsed();

    // Tries start at 0, 50, 100, 150 and 200ms; the one due at 250ms is past the window.
    assert!((4..=6).contains(&tries), "unexpected number of tries: {tries}");
    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_millis(500));
}

#[tokio::test]
async fn test_next_async_spaces_tries() {
    let strategy = AttemptStrategy::new(Duration::from_secs(1), Duration::from_millis(40));
    let mut attempt = strategy.start();

    let start = Instant::now();
    assert!(attempt.next_async().await);
    assert!(attempt.next_async().await);
    assert!(start.elapsed() >= Duration::from_millis(40));
    assert_eq!(attempt.count(), 2);
}
