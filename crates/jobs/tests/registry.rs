//! Tests for `JobRegistry` and the worker loop.
//!
//! The registry runs against an in-memory gateway and a recording sink, so
//! no database is needed. Most tests use a paused clock: the runtime jumps
//! straight to the next timer whenever every task is idle, which makes cycle
//! counts deterministic.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use orderpulse_core::order_generation::{AmountRange, AUTO_ORDER_DESCRIPTION};
use orderpulse_core::types::DbId;
use orderpulse_db::models::order::{NewOrder, Order};
use orderpulse_events::{EventSink, OrderCreated};
use orderpulse_jobs::worker::run_cycle;
use orderpulse_jobs::{CycleOutcome, EntityGateway, GatewayError, GatewayScope, JobConfig, JobRegistry};
use rust_decimal::Decimal;
use tokio::sync::Notify;

const PERIOD: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Stub gateway
// ---------------------------------------------------------------------------

/// Shared, inspectable state behind the stub gateway.
struct StubState {
    eligible: AtomicBool,
    fail_persist: AtomicBool,
    fail_scope: AtomicBool,
    scopes_opened: AtomicUsize,
    scopes_released: AtomicUsize,
    eligibility_checks: AtomicUsize,
    persist_attempts: AtomicUsize,
    next_id: AtomicI64,
    orders: Mutex<Vec<Order>>,
    /// When set, the next `persist` parks on this until it is notified.
    persist_gate: Mutex<Option<Arc<Notify>>>,
    persist_entered: Notify,
}

impl StubState {
    fn new(eligible: bool) -> Arc<Self> {
        Arc::new(Self {
            eligible: AtomicBool::new(eligible),
            fail_persist: AtomicBool::new(false),
            fail_scope: AtomicBool::new(false),
            scopes_opened: AtomicUsize::new(0),
            scopes_released: AtomicUsize::new(0),
            eligibility_checks: AtomicUsize::new(0),
            persist_attempts: AtomicUsize::new(0),
            next_id: AtomicI64::new(1),
            orders: Mutex::new(Vec::new()),
            persist_gate: Mutex::new(None),
            persist_entered: Notify::new(),
        })
    }

    fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

struct StubGateway {
    state: Arc<StubState>,
}

#[async_trait]
impl EntityGateway for StubGateway {
    async fn scope(&self) -> Result<Box<dyn GatewayScope>, GatewayError> {
        if self.state.fail_scope.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("pool exhausted".into()));
        }
        self.state.scopes_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubScope {
            state: Arc::clone(&self.state),
        }))
    }
}

struct StubScope {
    state: Arc<StubState>,
}

#[async_trait]
impl GatewayScope for StubScope {
    async fn is_eligible(&mut self, _customer_id: DbId) -> Result<bool, GatewayError> {
        self.state.eligibility_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.eligible.load(Ordering::SeqCst))
    }

    async fn persist(&mut self, order: &NewOrder) -> Result<Order, GatewayError> {
        self.state.persist_attempts.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.persist_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.state.persist_entered.notify_one();
            gate.notified().await;
        }
        if self.state.fail_persist.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("insert rejected".into()));
        }
        let stored = Order {
            id: self.state.next_id.fetch_add(1, Ordering::SeqCst),
            customer_id: order.customer_id,
            description: order.description.clone(),
            amount: order.amount,
            created_at: order.created_at,
        };
        self.state.orders.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

impl Drop for StubScope {
    fn drop(&mut self) {
        self.state.scopes_released.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Recording sink
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingSink {
    published: Mutex<Vec<(DbId, OrderCreated)>>,
}

impl RecordingSink {
    fn published(&self) -> Vec<(DbId, OrderCreated)> {
        self.published.lock().unwrap().clone()
    }

    fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn publish(&self, customer_id: DbId, event: &OrderCreated) -> usize {
        self.published
            .lock()
            .unwrap()
            .push((customer_id, event.clone()));
        1
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn registry(state: &Arc<StubState>, sink: &Arc<RecordingSink>, period: Duration) -> JobRegistry {
    let gateway = Arc::new(StubGateway {
        state: Arc::clone(state),
    });
    JobRegistry::new(
        gateway,
        Arc::clone(sink) as Arc<dyn EventSink>,
        JobConfig::default().with_period(period),
    )
}

/// Let spawned workers run whatever is due at the current instant.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Advance the paused clock by `periods` whole periods, then settle.
async fn advance_periods(periods: u32) {
    tokio::time::sleep(PERIOD * periods).await;
    settle().await;
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_before_any_period_elapses() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;

    let orders = state.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].customer_id, 7);
    assert_eq!(orders[0].description, AUTO_ORDER_DESCRIPTION);
    assert!(AmountRange::default().contains(orders[0].amount));

    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, 7);
    assert_eq!(published[0].1, OrderCreated::from(&orders[0]));
}

#[tokio::test(start_paused = true)]
async fn cycles_repeat_once_per_period() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;
    assert_eq!(state.order_count(), 1);

    tokio::time::sleep(PERIOD / 2).await;
    assert_eq!(state.order_count(), 1, "no cycle before the period elapses");

    tokio::time::sleep(PERIOD / 2).await;
    settle().await;
    assert_eq!(state.order_count(), 2);

    advance_periods(3).await;
    assert_eq!(state.order_count(), 5);
    assert_eq!(sink.count(), 5);
}

#[tokio::test(start_paused = true)]
async fn generated_amounts_stay_in_configured_range() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let gateway = Arc::new(StubGateway {
        state: Arc::clone(&state),
    });
    let amounts = AmountRange::new(10, 12).unwrap();
    let registry = JobRegistry::new(
        gateway,
        Arc::clone(&sink) as Arc<dyn EventSink>,
        JobConfig::default().with_period(PERIOD).with_amounts(amounts),
    );

    registry.start(1).await;
    settle().await;
    advance_periods(20).await;

    let orders = state.orders();
    assert_eq!(orders.len(), 21);
    for order in orders {
        assert!(
            order.amount == Decimal::from(10) || order.amount == Decimal::from(11),
            "unexpected amount {}",
            order.amount
        );
    }
}

// ---------------------------------------------------------------------------
// Start / stop
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn start_twice_keeps_a_single_job() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    registry.start(7).await;
    settle().await;

    assert_eq!(registry.active_count().await, 1);
    assert_eq!(state.order_count(), 1);

    advance_periods(1).await;
    assert_eq!(state.order_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_without_job_is_noop() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.stop(42).await;

    assert_eq!(registry.active_count().await, 0);
    assert!(!registry.is_running(42).await);
}

#[tokio::test(start_paused = true)]
async fn stop_halts_further_orders() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;
    assert!(registry.is_running(7).await);
    assert_eq!(state.order_count(), 1);

    registry.stop(7).await;
    assert!(!registry.is_running(7).await);

    advance_periods(5).await;
    assert_eq!(state.order_count(), 1);
    assert_eq!(sink.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_during_cycle_lets_that_cycle_finish_once() {
    let state = StubState::new(true);
    let gate = Arc::new(Notify::new());
    *state.persist_gate.lock().unwrap() = Some(Arc::clone(&gate));
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    state.persist_entered.notified().await;
    assert_eq!(state.order_count(), 0);

    registry.stop(7).await;
    assert!(!registry.is_running(7).await);

    gate.notify_one();
    settle().await;
    advance_periods(5).await;

    assert_eq!(state.persist_attempts.load(Ordering::SeqCst), 1);
    assert_eq!(state.order_count(), 1);
    assert_eq!(sink.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_only_affects_its_own_customer() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(1).await;
    registry.start(2).await;
    settle().await;

    registry.stop(1).await;
    advance_periods(2).await;

    assert_eq!(registry.active_ids().await, vec![2]);
    let for_two = state.orders().iter().filter(|o| o.customer_id == 2).count();
    let for_one = state.orders().iter().filter(|o| o.customer_id == 1).count();
    assert_eq!(for_two, 3);
    assert_eq!(for_one, 1);
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_runs_immediately() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;
    registry.stop(7).await;
    registry.start(7).await;
    settle().await;

    assert_eq!(registry.active_count().await, 1);
    assert_eq!(state.order_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn resume_starts_one_job_per_distinct_id() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.resume([3, 1, 2, 2]).await;
    settle().await;

    assert_eq!(registry.active_ids().await, vec![1, 2, 3]);
    assert_eq!(state.order_count(), 3);
}

// ---------------------------------------------------------------------------
// Eligibility and failures
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn ineligible_customer_never_persists() {
    let state = StubState::new(false);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;
    advance_periods(2).await;

    assert_eq!(state.eligibility_checks.load(Ordering::SeqCst), 3);
    assert_eq!(state.persist_attempts.load(Ordering::SeqCst), 0);
    assert_eq!(sink.count(), 0);
    assert!(registry.is_running(7).await, "skipped cycles keep the job alive");

    state.eligible.store(true, Ordering::SeqCst);
    advance_periods(1).await;
    assert_eq!(state.order_count(), 1);
    assert_eq!(sink.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn persist_failure_publishes_nothing_and_retries_next_period() {
    let state = StubState::new(true);
    state.fail_persist.store(true, Ordering::SeqCst);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;

    assert_eq!(state.persist_attempts.load(Ordering::SeqCst), 1);
    assert_eq!(sink.count(), 0);
    assert!(registry.is_running(7).await);

    state.fail_persist.store(false, Ordering::SeqCst);
    advance_periods(1).await;

    assert_eq!(state.persist_attempts.load(Ordering::SeqCst), 2);
    assert_eq!(state.order_count(), 1);
    assert_eq!(sink.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn unavailable_gateway_keeps_job_running() {
    let state = StubState::new(true);
    state.fail_scope.store(true, Ordering::SeqCst);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;
    assert_eq!(state.order_count(), 0);
    assert!(registry.is_running(7).await);

    state.fail_scope.store(false, Ordering::SeqCst);
    advance_periods(1).await;
    assert_eq!(state.order_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn every_scope_is_released() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.start(7).await;
    settle().await;

    state.eligible.store(false, Ordering::SeqCst);
    advance_periods(1).await;

    state.eligible.store(true, Ordering::SeqCst);
    state.fail_persist.store(true, Ordering::SeqCst);
    advance_periods(1).await;

    let opened = state.scopes_opened.load(Ordering::SeqCst);
    assert_eq!(opened, 3);
    assert_eq!(state.scopes_released.load(Ordering::SeqCst), opened);
}

// ---------------------------------------------------------------------------
// run_cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_cycle_reports_outcome() {
    let state = StubState::new(true);
    let gateway = StubGateway {
        state: Arc::clone(&state),
    };
    let sink = RecordingSink::default();
    let amounts = AmountRange::default();

    let outcome = run_cycle(7, &gateway, &sink, &amounts).await.unwrap();
    assert_matches!(outcome, CycleOutcome::Published { order_id: 1, delivered: 1 });

    state.eligible.store(false, Ordering::SeqCst);
    let outcome = run_cycle(7, &gateway, &sink, &amounts).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Skipped);

    state.eligible.store(true, Ordering::SeqCst);
    state.fail_persist.store(true, Ordering::SeqCst);
    let result = run_cycle(7, &gateway, &sink, &amounts).await;
    assert_matches!(result, Err(GatewayError::Unavailable(_)));
    assert_eq!(sink.count(), 1);
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn shutdown_stops_all_jobs_and_rejects_new_ones() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = registry(&state, &sink, PERIOD);

    registry.resume([1, 2, 3]).await;
    settle().await;
    assert_eq!(state.order_count(), 3);

    registry.shutdown().await;
    assert_eq!(registry.active_count().await, 0);

    registry.start(4).await;
    assert_eq!(registry.active_count().await, 0);

    advance_periods(5).await;
    assert_eq!(state.order_count(), 3);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_spawn_one_worker() {
    let state = StubState::new(true);
    let sink = Arc::new(RecordingSink::default());
    let registry = Arc::new(registry(&state, &sink, Duration::from_secs(3600)));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move { registry.start(5).await }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    tokio::time::timeout(Duration::from_secs(2), async {
        while state.order_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first cycle should run");
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(registry.active_count().await, 1);
    assert_eq!(state.scopes_opened.load(Ordering::SeqCst), 1);
    assert_eq!(state.order_count(), 1);
    assert_eq!(sink.count(), 1);

    registry.shutdown().await;
}
