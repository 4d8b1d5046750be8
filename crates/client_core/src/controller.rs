//! Local mirror of the remote product collection plus the edit form state.
//!
//! Each intent issues at most one request. State is only touched before the
//! request is sent and after it settles; the lock is never held across the
//! network call, so intents may overlap and the last response to settle wins.

use shared::{
    domain::{DraftInput, EditMode, Product, ProductId},
    error::DashboardError,
    protocol::ProductPayload,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::ProductApi;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub products: Vec<Product>,
    pub draft: DraftInput,
    pub editing: Option<ProductId>,
    pub error: Option<DashboardError>,
    inflight_fetches: usize,
}

impl DashboardState {
    /// True while at least one collection fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.inflight_fetches > 0
    }

    pub fn mode(&self) -> EditMode {
        match self.editing {
            Some(id) => EditMode::Update(id),
            None => EditMode::Create,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.map(|error| error.to_string())
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    StateChanged(DashboardState),
    OperationFailed(DashboardError),
}

pub struct ProductListController<A: ProductApi> {
    api: A,
    inner: Mutex<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl<A: ProductApi> ProductListController<A> {
    pub fn new(api: A) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            inner: Mutex::new(DashboardState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.inner.lock().await.clone()
    }

    /// Initial load when the screen opens.
    pub async fn start(&self) {
        self.fetch_all().await;
    }

    pub async fn fetch_all(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.inflight_fetches += 1;
            self.publish(&guard);
        }

        let result = self.api.list_products().await;

        let mut guard = self.inner.lock().await;
        guard.inflight_fetches = guard.inflight_fetches.saturating_sub(1);
        match result {
            Ok(products) => {
                info!(count = products.len(), "products: collection loaded");
                guard.products = products;
                guard.error = None;
                self.publish(&guard);
            }
            Err(err) => {
                error!("products: load failed: {err:#}");
                self.fail(&mut guard, DashboardError::LoadFailed);
            }
        }
    }

    pub async fn create(&self, draft: DraftInput) {
        let payload = {
            let mut guard = self.inner.lock().await;
            guard.draft = draft;
            match payload_from_draft(&guard.draft, DashboardError::AddFailed) {
                Ok(payload) => payload,
                Err(err) => {
                    self.fail(&mut guard, err);
                    return;
                }
            }
        };

        let result = self.api.create_product(&payload).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(product) => {
                info!(product_id = product.id.0, "products: created");
                guard.products.push(product);
                guard.draft = DraftInput::default();
                guard.error = None;
                self.publish(&guard);
            }
            Err(err) => {
                error!("products: create failed: {err:#}");
                self.fail(&mut guard, DashboardError::AddFailed);
            }
        }
    }

    /// Switches the form to update mode for `product`. Purely local.
    pub async fn begin_edit(&self, product: &Product) {
        let mut guard = self.inner.lock().await;
        guard.draft = DraftInput::from_product(product);
        guard.editing = Some(product.id);
        debug!(product_id = product.id.0, "products: editing");
        self.publish(&guard);
    }

    /// Looks `id` up in the mirror and begins editing it. Returns false when
    /// the id is not mirrored locally.
    pub async fn begin_edit_id(&self, id: ProductId) -> bool {
        let product = {
            let guard = self.inner.lock().await;
            guard.product(id).cloned()
        };
        match product {
            Some(product) => {
                self.begin_edit(&product).await;
                true
            }
            None => false,
        }
    }

    pub async fn cancel_edit(&self) {
        let mut guard = self.inner.lock().await;
        guard.editing = None;
        guard.draft = DraftInput::default();
        self.publish(&guard);
    }

    pub async fn update(&self, draft: DraftInput) {
        let (id, payload) = {
            let mut guard = self.inner.lock().await;
            guard.draft = draft;
            let Some(id) = guard.editing else {
                self.fail(&mut guard, DashboardError::NoEditTarget);
                return;
            };
            match payload_from_draft(&guard.draft, DashboardError::UpdateFailed) {
                Ok(payload) => (id, payload),
                Err(err) => {
                    self.fail(&mut guard, err);
                    return;
                }
            }
        };

        let result = self.api.update_product(id, &payload).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(()) => {
                let mut replaced = false;
                for product in guard.products.iter_mut().filter(|p| p.id == id) {
                    product.name = payload.name.clone();
                    product.price = payload.price;
                    replaced = true;
                }
                if !replaced {
                    debug!(product_id = id.0, "products: updated id no longer mirrored");
                }
                info!(product_id = id.0, "products: updated");
                guard.editing = None;
                guard.draft = DraftInput::default();
                guard.error = None;
                self.publish(&guard);
            }
            Err(err) => {
                error!(product_id = id.0, "products: update failed: {err:#}");
                self.fail(&mut guard, DashboardError::UpdateFailed);
            }
        }
    }

    /// Deletes unconditionally; the server decides whether `id` exists.
    pub async fn delete(&self, id: ProductId) {
        let result = self.api.delete_product(id).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(()) => {
                let before = guard.products.len();
                guard.products.retain(|product| product.id != id);
                if guard.products.len() == before {
                    debug!(product_id = id.0, "products: deleted id no longer mirrored");
                }
                info!(product_id = id.0, "products: deleted");
                guard.error = None;
                self.publish(&guard);
            }
            Err(err) => {
                error!(product_id = id.0, "products: delete failed: {err:#}");
                self.fail(&mut guard, DashboardError::DeleteFailed);
            }
        }
    }

    pub async fn set_draft_name(&self, name: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        guard.draft.name = name.into();
        self.publish(&guard);
    }

    pub async fn set_draft_price(&self, price: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        guard.draft.price = price.into();
        self.publish(&guard);
    }

    /// The form button: update when a product is being edited, else create.
    pub async fn submit(&self) {
        let (mode, draft) = {
            let guard = self.inner.lock().await;
            (guard.mode(), guard.draft.clone())
        };
        match mode {
            EditMode::Create => self.create(draft).await,
            EditMode::Update(_) => self.update(draft).await,
        }
    }

    fn fail(&self, state: &mut DashboardState, error: DashboardError) {
        if error.is_validation() {
            warn!("products: input rejected: {error}");
        }
        state.error = Some(error);
        let _ = self.events.send(DashboardEvent::OperationFailed(error));
        self.publish(state);
    }

    fn publish(&self, state: &DashboardState) {
        let _ = self
            .events
            .send(DashboardEvent::StateChanged(state.clone()));
    }
}

fn payload_from_draft(
    draft: &DraftInput,
    unparsable: DashboardError,
) -> Result<ProductPayload, DashboardError> {
    if !draft.has_required_fields() {
        return Err(DashboardError::RequiredFields);
    }
    let Some(price) = draft.parsed_price() else {
        warn!(price = %draft.price, "products: price is not a number");
        return Err(unparsable);
    };
    Ok(ProductPayload::new(draft.name.clone(), price))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
