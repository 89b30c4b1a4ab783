mod common;

use std::sync::Arc;
use std::time::Duration;

use pickpoint::{DispatcherState, EventKind};

use common::{GatedOrders, Shell, wait_until};

fn accept(id: &str) -> String {
    format!("accept -id={id} -u_id=1 -date=2099-01-01 -price=10 -w=1")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ceiling_one_runs_commands_one_at_a_time() {
    let orders = Arc::new(GatedOrders::open(Duration::from_millis(20)));
    let shell = Shell::start(1, Arc::clone(&orders));

    shell.send(&accept("1")).await;
    shell.send(&accept("2")).await;
    shell.send("exit").await;

    let (summary, captured) = shell.finish().await;
    assert_eq!(summary.admitted, 2);
    assert_eq!(summary.reason, "exit");
    assert_eq!(orders.max_inside(), 1);
    assert_eq!(orders.finished().len(), 2);
    assert!(captured.contents().contains("All work finished. Exiting..."));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ceiling_k_bounds_commands_in_flight() {
    let orders = Arc::new(GatedOrders::closed());
    let shell = Shell::start(3, Arc::clone(&orders));

    for id in 1..=6 {
        shell.send(&accept(&id.to_string())).await;
    }
    wait_until(|| orders.inside() == 3).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(orders.started().len(), 3);

    orders.release(6);
    shell.send("exit").await;
    let (summary, _) = shell.finish().await;

    assert_eq!(summary.admitted, 6);
    assert_eq!(orders.max_inside(), 3);
    assert_eq!(orders.finished().len(), 6);
}

#[tokio::test]
async fn invalid_ceiling_leaves_pool_unchanged() {
    let orders = Arc::new(GatedOrders::open(Duration::ZERO));
    let mut shell = Shell::start(2, orders);

    shell.send("set_mg -n=0").await;
    let ev = shell.next_event(EventKind::CeilingRejected).await;
    assert_eq!(ev.ceiling, Some(2));
    assert_eq!(shell.admission.ceiling(), 2);
    assert_eq!(shell.admission.available().await, 2);

    shell.send("set_mg").await;
    shell.next_event(EventKind::CeilingRejected).await;

    shell.send("exit").await;
    let (summary, captured) = shell.finish().await;
    assert_eq!(summary.ceiling, 2);
    assert!(!captured.contents().contains("Number of concurrent commands set"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fourth_command_waits_for_a_permit_after_reconfigure() {
    let orders = Arc::new(GatedOrders::closed());
    let mut shell = Shell::start(1, Arc::clone(&orders));

    shell.send("set_mg -n=3").await;
    let ev = shell.next_event(EventKind::CeilingChanged).await;
    assert_eq!(ev.ceiling, Some(3));

    for id in 1..=4 {
        shell.send(&accept(&id.to_string())).await;
    }
    wait_until(|| orders.inside() == 3).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(orders.started().len(), 3);
    assert_eq!(shell.admission.available().await, 0);

    orders.release(1);
    wait_until(|| orders.started().len() == 4).await;

    orders.release(3);
    shell.send("exit").await;
    let (summary, captured) = shell.finish().await;
    assert_eq!(summary.ceiling, 3);
    assert_eq!(orders.max_inside(), 3);
    assert!(captured.contents().contains("Number of concurrent commands set to 3"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exit_drains_admitted_commands_and_ignores_later_lines() {
    let orders = Arc::new(GatedOrders::closed());
    let mut shell = Shell::start(2, Arc::clone(&orders));
    let mut state = shell.dispatcher_state.clone();

    shell.send(&accept("1")).await;
    shell.send(&accept("2")).await;
    wait_until(|| orders.inside() == 2).await;

    shell.send("exit").await;
    shell.send(&accept("99")).await;
    shell.next_event(EventKind::ShutdownRequested).await;
    assert_eq!(*state.borrow_and_update(), DispatcherState::Draining);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shell.handle.is_finished());
    assert!(!shell.captured.contents().contains("All work finished"));

    orders.release(10);
    let (summary, captured) = shell.finish().await;

    assert_eq!(summary.admitted, 2);
    assert_eq!(orders.finished().len(), 2);
    assert!(!orders.started().contains(&"99".to_string()));
    assert_eq!(*state.borrow_and_update(), DispatcherState::Stopped);
    assert!(captured.contents().contains("All work finished. Exiting..."));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_command_does_not_affect_neighbours() {
    let orders = Arc::new(GatedOrders::open(Duration::ZERO).failing("2"));
    let mut shell = Shell::start(3, Arc::clone(&orders));

    for id in 1..=3 {
        shell.send(&accept(&id.to_string())).await;
    }
    shell.send("exit").await;

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    loop {
        let ev = common::within(shell.events.recv()).await.unwrap();
        match ev.kind {
            EventKind::CommandSucceeded => succeeded.push(ev.command_id.unwrap()),
            EventKind::CommandFailed => failed.push(ev.command_id.unwrap()),
            EventKind::AllWorkFinished => break,
            _ => {}
        }
    }
    succeeded.sort_unstable();
    assert_eq!(succeeded, vec![1, 3]);
    assert_eq!(failed, vec![2]);
    shell.finish().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_command_releases_its_permit() {
    let orders = Arc::new(GatedOrders::open(Duration::ZERO).panicking("1"));
    let mut shell = Shell::start(1, Arc::clone(&orders));

    shell.send(&accept("1")).await;
    let ev = shell.next_event(EventKind::CommandPanicked).await;
    assert_eq!(ev.command_id, Some(1));

    shell.send(&accept("2")).await;
    let ev = shell.next_event(EventKind::CommandSucceeded).await;
    assert_eq!(ev.command_id, Some(2));

    shell.send("exit").await;
    shell.finish().await;
}

#[tokio::test]
async fn end_of_input_acts_as_exit() {
    let orders = Arc::new(GatedOrders::open(Duration::ZERO));
    let shell = Shell::start(2, Arc::clone(&orders));

    shell.send(&accept("1")).await;
    let shutdown = shell.shutdown.clone();
    let (summary, _) = shell.close_input().await;

    assert_eq!(summary.reason, "end_of_input");
    assert_eq!(summary.admitted, 1);
    assert_eq!(orders.finished().len(), 1);
    assert!(shutdown.is_cancelled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_signal_drains_like_exit() {
    let orders = Arc::new(GatedOrders::closed());
    let mut shell = Shell::start(1, Arc::clone(&orders));

    shell.send(&accept("1")).await;
    wait_until(|| orders.inside() == 1).await;

    shell.shutdown.cancel();
    let ev = shell.next_event(EventKind::ShutdownRequested).await;
    assert_eq!(ev.reason.as_deref(), Some("signal"));

    shell.send(&accept("2")).await;
    orders.release(1);
    let (summary, _) = shell.finish().await;
    assert_eq!(summary.reason, "signal");
    assert_eq!(summary.admitted, 1);
    assert_eq!(orders.started(), vec!["1".to_string()]);
}

#[tokio::test]
async fn unknown_command_is_reported() {
    let orders = Arc::new(GatedOrders::open(Duration::ZERO));
    let mut shell = Shell::start(2, orders);

    shell.send("frobnicate -x=1").await;
    let ev = shell.next_event(EventKind::UnknownCommand).await;
    assert_eq!(ev.command.as_deref(), Some("frobnicate"));

    shell.send("accept -bogus=1").await;
    let ev = shell.next_event(EventKind::CommandFailed).await;
    assert_eq!(ev.command.as_deref(), Some("accept"));

    shell.send("exit").await;
    let (_, captured) = shell.finish().await;
    assert!(
        captured
            .contents()
            .contains("Unknown command. Type 'help' for a list of commands.")
    );
}
