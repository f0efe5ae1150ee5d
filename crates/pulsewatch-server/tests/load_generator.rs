//! Synthetic gauge updates and task cancellation (paused clock).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use pulsewatch_core::metrics::Gauge;
use pulsewatch_core::random::{SeededRandom, SequenceRandom};
use pulsewatch_server::app_state::AppState;
use pulsewatch_server::config::ServerConfig;
use pulsewatch_server::load::LoadGenerator;

fn gauge() -> Arc<Gauge> {
    Arc::new(Gauge::new("active_users", "Number of active users").unwrap())
}

#[test]
fn tick_writes_integer_below_max() {
    let g = gauge();
    let gen = LoadGenerator::new(
        g.clone(),
        Arc::new(SequenceRandom::new(vec![0.42, 0.999, 0.0])),
        Duration::from_secs(5),
        100,
    )
    .unwrap();

    assert_eq!(gen.tick(), 42);
    assert_eq!(g.get(), 42.0);
    assert_eq!(gen.tick(), 99);
    assert_eq!(gen.tick(), 0);
    assert_eq!(g.get(), 0.0);
}

#[test]
fn zero_interval_is_rejected() {
    let err = LoadGenerator::new(
        gauge(),
        Arc::new(SequenceRandom::new(vec![0.5])),
        Duration::ZERO,
        100,
    )
    .err()
    .expect("zero interval must fail");
    assert_eq!(err.kind().as_str(), "BAD_CONFIG");
}

#[tokio::test(start_paused = true)]
async fn first_update_lands_after_one_interval() {
    let g = gauge();
    let cancel = CancellationToken::new();
    let handle = LoadGenerator::new(
        g.clone(),
        Arc::new(SequenceRandom::new(vec![0.42, 0.17])),
        Duration::from_secs(5),
        100,
    )
    .unwrap()
    .spawn(cancel.clone());

    time::sleep(Duration::from_millis(4900)).await;
    assert_eq!(g.get(), 0.0);

    time::sleep(Duration::from_millis(200)).await;
    assert_eq!(g.get(), 42.0);

    time::sleep(Duration::from_secs(5)).await;
    assert_eq!(g.get(), 17.0);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancelled_generator_stops_writing() {
    let g = gauge();
    let cancel = CancellationToken::new();
    let handle = LoadGenerator::new(
        g.clone(),
        Arc::new(SequenceRandom::new(vec![0.5])),
        Duration::from_secs(5),
        100,
    )
    .unwrap()
    .spawn(cancel.clone());

    cancel.cancel();
    handle.await.unwrap();

    time::sleep(Duration::from_secs(30)).await;
    assert_eq!(g.get(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn wired_generator_keeps_gauge_in_range() {
    let st = AppState::with_random(ServerConfig::default(), Arc::new(SeededRandom::new(11))).unwrap();
    let cancel = CancellationToken::new();
    let handle = LoadGenerator::from_state(&st).unwrap().spawn(cancel.clone());

    for _ in 0..20 {
        time::sleep(Duration::from_secs(5)).await;
        let v = st.metrics().active_users.get();
        assert!((0.0..100.0).contains(&v), "v = {v}");
        assert_eq!(v.fract(), 0.0);
    }

    cancel.cancel();
    handle.await.unwrap();
}
