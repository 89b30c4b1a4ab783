#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Semaphore, broadcast, mpsc};
use tokio::task::JoinHandle;

use pickpoint::{
    AcceptRequest, Captured, Config, Console, Dispatcher, Event, EventKind, Order, OrderService,
    Page, RunSummary, ServiceError, ValidationService,
};

/// Order service that records how many `accept` calls are in flight.
///
/// Each call waits on `gate` before finishing; tests release calls with
/// [`GatedOrders::release`].
pub struct GatedOrders {
    gate: Semaphore,
    hold: Duration,
    inside: AtomicUsize,
    max_inside: AtomicUsize,
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
    fail_ids: HashSet<String>,
    panic_ids: HashSet<String>,
}

impl GatedOrders {
    /// Calls block until released.
    pub fn closed() -> Self {
        Self::with_gate(0, Duration::ZERO)
    }

    /// Calls pass straight through after `hold`.
    pub fn open(hold: Duration) -> Self {
        Self::with_gate(Semaphore::MAX_PERMITS, hold)
    }

    fn with_gate(permits: usize, hold: Duration) -> Self {
        Self {
            gate: Semaphore::new(permits),
            hold,
            inside: AtomicUsize::new(0),
            max_inside: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            fail_ids: HashSet::new(),
            panic_ids: HashSet::new(),
        }
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.fail_ids.insert(id.to_string());
        self
    }

    pub fn panicking(mut self, id: &str) -> Self {
        self.panic_ids.insert(id.to_string());
        self
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn inside(&self) -> usize {
        self.inside.load(Ordering::SeqCst)
    }

    pub fn max_inside(&self) -> usize {
        self.max_inside.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderService for GatedOrders {
    async fn accept(&self, order: Order) -> Result<Order, ServiceError> {
        let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_inside.fetch_max(now, Ordering::SeqCst);
        self.started.lock().unwrap().push(order.id.clone());

        self.gate.acquire().await.unwrap().forget();
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }

        self.inside.fetch_sub(1, Ordering::SeqCst);
        self.finished.lock().unwrap().push(order.id.clone());

        if self.panic_ids.contains(&order.id) {
            panic!("order {} exploded", order.id);
        }
        if self.fail_ids.contains(&order.id) {
            return Err(ServiceError::Storage(format!("cannot store {}", order.id)));
        }
        Ok(order)
    }

    async fn issue(&self, orders: Vec<Order>) -> Result<usize, ServiceError> {
        Ok(orders.len())
    }

    async fn accept_return(&self, _order: Order) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn return_to_courier(&self, _id: &str) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn list_returns(&self, _page: Page) -> Result<Vec<Order>, ServiceError> {
        Ok(Vec::new())
    }

    async fn list_orders(&self, _user_id: &str, _page: Page) -> Result<Vec<Order>, ServiceError> {
        Ok(Vec::new())
    }
}

/// Validation that accepts anything.
pub struct PassValidation;

fn order(id: &str, user_id: &str) -> Order {
    let date = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
    Order::new(id, user_id, date, 1.0, 1.0)
}

#[async_trait]
impl ValidationService for PassValidation {
    async fn validate_accept(&self, req: &AcceptRequest) -> Result<Order, ServiceError> {
        Ok(order(&req.id, &req.user_id))
    }

    async fn validate_issue(&self, ids: &[String]) -> Result<Vec<Order>, ServiceError> {
        Ok(ids.iter().map(|id| order(id, "1")).collect())
    }

    async fn validate_accept_return(&self, id: &str, user_id: &str) -> Result<Order, ServiceError> {
        Ok(order(id, user_id))
    }

    async fn validate_return_to_courier(&self, _id: &str) -> Result<(), ServiceError> {
        Ok(())
    }

    fn validate_list(&self, _offset: &str, _limit: &str) -> Result<Page, ServiceError> {
        Ok(Page::default())
    }
}

/// A dispatcher running on its own task, fed through `tx`.
pub struct Shell {
    pub tx: mpsc::Sender<String>,
    pub handle: JoinHandle<RunSummary>,
    pub captured: Captured,
    pub events: broadcast::Receiver<Event>,
    pub dispatcher_state: tokio::sync::watch::Receiver<pickpoint::DispatcherState>,
    pub admission: Arc<pickpoint::Admission>,
    pub shutdown: tokio_util::sync::CancellationToken,
}

impl Shell {
    pub fn start(ceiling: usize, orders: Arc<GatedOrders>) -> Self {
        let cfg = Config {
            max_concurrent: ceiling,
            ..Config::default()
        };
        let (console, captured) = Console::capture();
        let dispatcher = Dispatcher::builder(cfg)
            .with_console(console)
            .build(orders, Arc::new(PassValidation));
        Self::spawn(dispatcher, captured)
    }

    pub fn spawn(dispatcher: Dispatcher, captured: Captured) -> Self {
        let events = dispatcher.bus().subscribe();
        let dispatcher_state = dispatcher.state();
        let admission = Arc::clone(dispatcher.admission());
        let shutdown = dispatcher.shutdown_token();
        let (tx, rx) = mpsc::channel(64);
        let handle = tokio::spawn(dispatcher.run(rx));
        Self {
            tx,
            handle,
            captured,
            events,
            dispatcher_state,
            admission,
            shutdown,
        }
    }

    pub async fn send(&self, line: &str) {
        let _ = self.tx.send(line.to_string()).await;
    }

    pub async fn finish(self) -> (RunSummary, Captured) {
        let summary = within(self.handle).await.unwrap();
        (summary, self.captured)
    }

    /// Closes the line channel, as end of input does, and waits for the run.
    pub async fn close_input(self) -> (RunSummary, Captured) {
        let Self {
            tx,
            handle,
            captured,
            ..
        } = self;
        drop(tx);
        (within(handle).await.unwrap(), captured)
    }

    /// Waits for the next event of `kind`.
    pub async fn next_event(&mut self, kind: EventKind) -> Event {
        within(async {
            loop {
                let ev = self.events.recv().await.unwrap();
                if ev.kind == kind {
                    return ev;
                }
            }
        })
        .await
    }
}

/// Fails the test if `fut` does not finish within five seconds.
pub async fn within<F: std::future::Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out")
}

/// Polls `cond` until it holds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    within(async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
}
