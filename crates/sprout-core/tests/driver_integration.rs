//! Integration tests for the async tick driver.
//!
//! All tests run on a paused tokio clock: sleeping advances virtual time and
//! fires the driver's ticker deterministically.

use std::time::Duration;

use sprout_core::{Event, Mode, PomodoroEngine, Preferences, TimerDriver, TimerHandle};
use tokio::task::JoinHandle;
use tokio::time::sleep;

fn spawn() -> (TimerHandle, JoinHandle<PomodoroEngine>) {
    TimerDriver::new().spawn(PomodoroEngine::new(Preferences::in_memory()))
}

#[tokio::test(start_paused = true)]
async fn rapid_toggling_leaves_a_single_ticker() {
    let (handle, _task) = spawn();

    for _ in 0..25 {
        handle.start().await.unwrap();
        handle.pause().await.unwrap();
    }
    handle.start().await.unwrap();

    sleep(Duration::from_millis(4500)).await;
    assert_eq!(handle.snapshot().seconds_left, 1496);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.snapshot().seconds_left, 1495);
}

#[tokio::test(start_paused = true)]
async fn repeated_start_does_not_double_tick() {
    let (handle, _task) = spawn();
    handle.start().await.unwrap();
    sleep(Duration::from_millis(500)).await;
    handle.start().await.unwrap();
    handle.start().await.unwrap();
    sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.snapshot().seconds_left, 1498);
}

#[tokio::test(start_paused = true)]
async fn expiry_switches_mode_and_stops_ticking() {
    let (handle, _task) = spawn();
    let mut events = handle.events();

    handle.set_mode(Mode::Short).await.unwrap();
    handle.start().await.unwrap();
    sleep(Duration::from_millis(300_500)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.mode, Mode::Focus);
    assert_eq!(snap.seconds_left, 1500);
    assert!(!snap.running);

    let mut completed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Event::SessionCompleted {
            mode,
            next_mode,
            seconds_left,
            ..
        } = event
        {
            completed.push((mode, next_mode, seconds_left));
        }
    }
    assert_eq!(completed, vec![(Mode::Short, Mode::Focus, 0)]);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.snapshot().seconds_left, 1500);
}

#[tokio::test(start_paused = true)]
async fn reset_between_ticks_restores_total() {
    let (handle, _task) = spawn();
    handle.start().await.unwrap();
    sleep(Duration::from_millis(2200)).await;
    assert_eq!(handle.snapshot().seconds_left, 1498);

    let snap = handle.reset().await.unwrap();
    assert_eq!(snap.seconds_left, 1500);
    sleep(Duration::from_secs(3)).await;
    assert_eq!(handle.snapshot().seconds_left, 1500);
}

#[tokio::test(start_paused = true)]
async fn mode_switch_while_running_keeps_counting() {
    let (handle, _task) = spawn();
    handle.start().await.unwrap();
    sleep(Duration::from_millis(1500)).await;

    let snap = handle.set_mode(Mode::Long).await.unwrap();
    assert!(snap.running);
    assert_eq!(snap.seconds_left, 900);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.snapshot().seconds_left, 899);
}

#[tokio::test(start_paused = true)]
async fn watchers_see_each_change() {
    let (handle, _task) = spawn();
    let mut rx = handle.watch();

    handle.start().await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().running);

    sleep(Duration::from_millis(1100)).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().seconds_left, 1499);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_ends_the_driver() {
    let (handle, task) = spawn();
    handle.start().await.unwrap();
    drop(handle);
    let engine = task.await.unwrap();
    assert!(engine.is_running());
    assert_eq!(engine.seconds_left(), 1500);
}
