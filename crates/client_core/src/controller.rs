//! Order list screen controller: fetch/refetch, status transitions, modal
//! selection and banners for one mounted screen.

use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use shared::domain::{Order, OrderId, OrderStatus};
use storage::IdentityStore;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::{debug, error, info, warn};

use crate::{
    banner::{BannerKind, BannerSlots, BANNER_TTL},
    error::ControllerError,
    repository::OrderRepository,
    selection::{ActiveModal, SelectionSlot},
    status_filter::resolve_status,
};

const FETCH_FAILURE_MESSAGE: &str = "Failed to load orders. Please try again.";
const IDENTITY_FAILURE_MESSAGE: &str = "Could not read the signed-in user. Please sign in again.";

/// Inputs the hosting surface feeds into a mounted screen. Bumping
/// `refresh_token` forces a refetch for the same filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenInputs {
    pub context: Option<Value>,
    pub refresh_token: u64,
}

impl ScreenInputs {
    pub fn new(context: Option<Value>) -> Self {
        Self {
            context,
            refresh_token: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    LoadingChanged(bool),
    OrdersReplaced { status: OrderStatus, count: usize },
    Banner { kind: BannerKind, message: String },
    LoginRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// A newer fetch was issued while this one was in flight.
    Superseded,
    Failed,
    /// The screen was unmounted while the fetch was in flight.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied { refresh: RefreshOutcome },
    Rejected,
}

/// Owned copy of everything a list render needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSnapshot {
    pub status: OrderStatus,
    pub orders: Vec<Order>,
    pub loading: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub selection: SelectionSlot,
}

impl ScreenSnapshot {
    pub fn total_orders(&self) -> usize {
        self.orders.len()
    }
}

struct ControllerState {
    status: OrderStatus,
    orders: Vec<Order>,
    in_flight: usize,
    latest_fetch: u64,
    banners: BannerSlots,
    banner_timers: HashMap<BannerKind, JoinHandle<()>>,
    selection: SelectionSlot,
    disposed: bool,
}

pub struct OrderLifecycleController {
    repository: Arc<dyn OrderRepository>,
    identity: Arc<dyn IdentityStore>,
    default_status: OrderStatus,
    inner: Mutex<ControllerState>,
    transition_locks: Mutex<HashMap<OrderId, Arc<Mutex<()>>>>,
    mount_task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ControllerEvent>,
}

impl OrderLifecycleController {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        identity: Arc<dyn IdentityStore>,
        default_status: OrderStatus,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            repository,
            identity,
            default_status,
            inner: Mutex::new(ControllerState {
                status: default_status,
                orders: Vec::new(),
                in_flight: 0,
                latest_fetch: 0,
                banners: BannerSlots::default(),
                banner_timers: HashMap::new(),
                selection: SelectionSlot::default(),
                disposed: false,
            }),
            transition_locks: Mutex::new(HashMap::new()),
            mount_task: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn status_filter(&self) -> OrderStatus {
        self.inner.lock().await.status
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.inner.lock().await.orders.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.in_flight > 0
    }

    pub async fn snapshot(&self) -> ScreenSnapshot {
        let guard = self.inner.lock().await;
        let now = Instant::now();
        ScreenSnapshot {
            status: guard.status,
            orders: guard.orders.clone(),
            loading: guard.in_flight > 0,
            success_message: guard
                .banners
                .live(BannerKind::Success, now)
                .map(|banner| banner.message.clone()),
            error_message: guard
                .banners
                .live(BannerKind::Error, now)
                .map(|banner| banner.message.clone()),
            selection: guard.selection.clone(),
        }
    }

    /// Starts the reactive refresh loop. The loop refetches on mount and
    /// whenever the resolved (filter, refresh token) pair changes; changes
    /// that arrive during a fetch coalesce to the latest pair.
    pub async fn mount(self: &Arc<Self>, mut inputs: watch::Receiver<ScreenInputs>) {
        let controller = Arc::downgrade(self);
        let default_status = self.default_status;
        let task = tokio::spawn(async move {
            let mut last_applied: Option<(OrderStatus, u64)> = None;
            loop {
                let current = {
                    let inputs = inputs.borrow_and_update();
                    (
                        resolve_status(inputs.context.as_ref(), default_status),
                        inputs.refresh_token,
                    )
                };

                if last_applied != Some(current) {
                    last_applied = Some(current);
                    let Some(controller) = controller.upgrade() else {
                        break;
                    };
                    let (status, refresh_token) = current;
                    if !controller.set_status_filter(status).await {
                        break;
                    }
                    debug!(status = %status, refresh_token, "screen inputs changed; refreshing");
                    match controller.refresh(status).await {
                        Ok(_) => {}
                        Err(ControllerError::Unauthenticated) => {
                            let _ = controller.events.send(ControllerEvent::LoginRequired);
                        }
                        Err(ControllerError::Disposed) => break,
                        Err(err) => warn!(error = %err, "mount refresh failed"),
                    }
                }

                if inputs.changed().await.is_err() {
                    break;
                }
            }
        });

        let previous = self.mount_task.lock().await.replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Cancels the refresh loop and banner timers. In-flight fetches and
    /// transitions finish without touching state.
    pub async fn unmount(&self) {
        if let Some(task) = self.mount_task.lock().await.take() {
            task.abort();
        }

        let mut guard = self.inner.lock().await;
        guard.disposed = true;
        for (_, timer) in guard.banner_timers.drain() {
            timer.abort();
        }
        guard.banners.clear();
        info!("order screen unmounted");
    }

    /// Makes `status` the active filter and fetches its list. Surfaces that
    /// are not driven through `mount` enter a stage this way.
    pub async fn open(
        self: &Arc<Self>,
        status: OrderStatus,
    ) -> Result<RefreshOutcome, ControllerError> {
        if !self.set_status_filter(status).await {
            return Err(ControllerError::Disposed);
        }
        self.refresh(status).await
    }

    /// Refetches the list for `status`. An applied result also becomes the
    /// active filter, so the snapshot always names the list it holds. Requires a stored identity; without
    /// one nothing is fetched and `Unauthenticated` is returned so the caller
    /// can redirect to sign-in.
    pub async fn refresh(
        self: &Arc<Self>,
        status: OrderStatus,
    ) -> Result<RefreshOutcome, ControllerError> {
        self.ensure_live().await?;

        let user_id = match self.identity.user_id().await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                info!(status = %status, "no stored identity; sign-in required");
                return Err(ControllerError::Unauthenticated);
            }
            Err(source) => {
                error!(error = %source, "failed to read stored identity");
                self.post_banner(BannerKind::Error, IDENTITY_FAILURE_MESSAGE)
                    .await;
                return Err(ControllerError::IdentityStore { source });
            }
        };

        let sequence = {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                return Err(ControllerError::Disposed);
            }
            guard.latest_fetch += 1;
            guard.latest_fetch
        };
        self.begin_load().await;

        let result = self.repository.fetch_orders(status, &user_id).await;

        let mut guard = self.inner.lock().await;
        if guard.disposed {
            debug!(status = %status, sequence, "dropping fetch result after unmount");
            return Ok(RefreshOutcome::Cancelled);
        }
        let loading_cleared = end_load(&mut guard);
        let superseded = sequence != guard.latest_fetch;

        let outcome = match result {
            _ if superseded => {
                debug!(
                    status = %status,
                    sequence,
                    latest = guard.latest_fetch,
                    "discarding stale fetch result"
                );
                RefreshOutcome::Superseded
            }
            Ok(orders) => {
                let count = orders.len();
                guard.status = status;
                guard.orders = orders;
                info!(status = %status, count, "orders replaced");
                let _ = self
                    .events
                    .send(ControllerEvent::OrdersReplaced { status, count });
                RefreshOutcome::Applied { count }
            }
            Err(err) => {
                error!(status = %status, error = %err, "error fetching orders");
                RefreshOutcome::Failed
            }
        };
        drop(guard);

        if loading_cleared {
            let _ = self.events.send(ControllerEvent::LoadingChanged(false));
        }
        if outcome == RefreshOutcome::Failed {
            self.post_banner(BannerKind::Error, FETCH_FAILURE_MESSAGE)
                .await;
        }
        Ok(outcome)
    }

    /// Writes `to` for `order`, then refetches the `from` list the order has
    /// just left. The write and its follow-up refetch are serialized per
    /// order.
    pub async fn advance_status(
        self: &Arc<Self>,
        order: &Order,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<TransitionOutcome, ControllerError> {
        self.ensure_live().await?;

        let lock = self.transition_lock(order.id).await;
        let guard = lock.lock().await;

        self.begin_load().await;
        let result = match self.repository.update_order_status(order.id, to).await {
            Ok(()) => {
                info!(order_id = %order.id, from = %from, to = %to, "order status advanced");
                self.post_banner(BannerKind::Success, format!("Order {to} successfully."))
                    .await;
                self.refresh(from)
                    .await
                    .map(|refresh| TransitionOutcome::Applied { refresh })
            }
            Err(err) => {
                warn!(order_id = %err.order_id(), to = %to, error = %err, "order status update failed");
                self.post_banner(
                    BannerKind::Error,
                    format!("Failed to {to} order. Please try again."),
                )
                .await;
                Ok(TransitionOutcome::Rejected)
            }
        };
        self.finish_load().await;

        drop(guard);
        self.release_transition_lock(order.id, &lock).await;
        result
    }

    /// Accepted → Inprogress.
    pub async fn start_progress(
        self: &Arc<Self>,
        order: &Order,
    ) -> Result<TransitionOutcome, ControllerError> {
        self.advance_status(order, OrderStatus::Accepted, OrderStatus::Inprogress)
            .await
    }

    /// Inprogress → Complete.
    pub async fn complete(
        self: &Arc<Self>,
        order: &Order,
    ) -> Result<TransitionOutcome, ControllerError> {
        self.advance_status(order, OrderStatus::Inprogress, OrderStatus::Complete)
            .await
    }

    pub async fn select_for_details(&self, order: Order) {
        self.inner.lock().await.selection.select_for_details(order);
    }

    pub async fn select_for_comment(&self, order: Order) {
        self.inner.lock().await.selection.select_for_comment(order);
    }

    pub async fn select_for_action(&self, order: Order) {
        self.inner.lock().await.selection.select_for_action(order);
    }

    /// Returns whether the cash modal opened; already-collected orders never
    /// open it.
    pub async fn select_for_cash_collection(&self, order: Order) -> bool {
        let order_id = order.id;
        let opened = self
            .inner
            .lock()
            .await
            .selection
            .select_for_cash_collection(order);
        if !opened {
            debug!(order_id = %order_id, "cash already collected; modal kept closed");
        }
        opened
    }

    pub async fn active_modal(&self) -> ActiveModal {
        self.inner.lock().await.selection.active()
    }

    pub async fn selected_order(&self) -> Option<Order> {
        self.inner.lock().await.selection.selected().cloned()
    }

    /// Closes whichever modal is open and refetches the current filter,
    /// whether or not the modal changed anything server-side.
    pub async fn close_all_modals(self: &Arc<Self>) -> Result<RefreshOutcome, ControllerError> {
        let status = {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                return Err(ControllerError::Disposed);
            }
            guard.selection.close_all();
            guard.status
        };
        self.refresh(status).await
    }

    async fn set_status_filter(&self, status: OrderStatus) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.disposed {
            return false;
        }
        guard.status = status;
        true
    }

    async fn ensure_live(&self) -> Result<(), ControllerError> {
        if self.inner.lock().await.disposed {
            return Err(ControllerError::Disposed);
        }
        Ok(())
    }

    async fn begin_load(&self) {
        let started = {
            let mut guard = self.inner.lock().await;
            guard.in_flight += 1;
            guard.in_flight == 1
        };
        if started {
            let _ = self.events.send(ControllerEvent::LoadingChanged(true));
        }
    }

    async fn finish_load(&self) {
        let cleared = {
            let mut guard = self.inner.lock().await;
            !guard.disposed && end_load(&mut guard)
        };
        if cleared {
            let _ = self.events.send(ControllerEvent::LoadingChanged(false));
        }
    }

    async fn post_banner(self: &Arc<Self>, kind: BannerKind, message: impl Into<String>) {
        let message = message.into();
        let mut guard = self.inner.lock().await;
        if guard.disposed {
            return;
        }

        let serial = guard.banners.post(kind, message.clone(), Instant::now());
        let controller = Arc::downgrade(self);
        let timer = tokio::spawn(async move {
            sleep(BANNER_TTL).await;
            if let Some(controller) = controller.upgrade() {
                controller.inner.lock().await.banners.expire(kind, serial);
            }
        });
        if let Some(previous) = guard.banner_timers.insert(kind, timer) {
            previous.abort();
        }
        drop(guard);

        let _ = self.events.send(ControllerEvent::Banner { kind, message });
    }

    async fn transition_lock(&self, order_id: OrderId) -> Arc<Mutex<()>> {
        let mut locks = self.transition_locks.lock().await;
        Arc::clone(locks.entry(order_id).or_default())
    }

    async fn release_transition_lock(&self, order_id: OrderId, lock: &Arc<Mutex<()>>) {
        let mut locks = self.transition_locks.lock().await;
        // Only the map and the caller still hold it: no transition is queued.
        let idle = locks
            .get(&order_id)
            .is_some_and(|held| Arc::ptr_eq(held, lock) && Arc::strong_count(lock) == 2);
        if idle {
            locks.remove(&order_id);
        }
    }
}

/// Returns true when this call brought the in-flight count to zero.
fn end_load(state: &mut ControllerState) -> bool {
    if state.in_flight == 0 {
        return false;
    }
    state.in_flight -= 1;
    state.in_flight == 0
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
