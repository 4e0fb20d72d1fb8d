//! Shop page controller.
//!
//! `ShopController` owns the page state, the last catalog response and the
//! price-range cache. State changes go through [`reduce`]; catalog requests
//! are tagged with a generation so that only the newest response is applied.

use std::sync::Arc;

use shelf_cache::CachePolicy;
use shelf_catalog::catalog::{CategoryTree, FlatCategory};
use shelf_catalog::ids::CategoryId;
use shelf_catalog::search::{
    CatalogPage, CatalogQuery, FilterUpdate, Pagination, PriceRange, PriceRangeFacet, PAGE_SIZE,
};
use shelf_data::{CatalogBackend, FetchError};
use tracing::{debug, info, warn};

use crate::error::ShopError;
use crate::price::{resolve_price_bounds, PriceBounds, PriceRangeCache};
use crate::state::{reduce, Effects, ShopAction, ShopState};

/// Status of the listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// Nothing requested yet.
    Idle,
    Loading,
    /// Products to show.
    Ready,
    /// The request succeeded with no products.
    Empty,
    /// The request failed; nothing from it is shown.
    Failed(FetchError),
}

impl QueryStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryStatus::Loading)
    }

    /// Short name for logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Idle => "idle",
            QueryStatus::Loading => "loading",
            QueryStatus::Ready => "ready",
            QueryStatus::Empty => "empty",
            QueryStatus::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            QueryStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// An issued catalog request waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub generation: u64,
    pub query: CatalogQuery,
}

/// Coordinates shop state with the catalog backend.
pub struct ShopController<B: ?Sized> {
    backend: Arc<B>,
    state: ShopState,
    generation: u64,
    status: QueryStatus,
    page: Option<CatalogPage>,
    tree: CategoryTree,
    price_cache: PriceRangeCache,
    full_range: Option<PriceRangeFacet>,
}

impl<B> ShopController<B>
where
    B: CatalogBackend + ?Sized,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: ShopState::default(),
            generation: 0,
            status: QueryStatus::Idle,
            page: None,
            tree: CategoryTree::default(),
            price_cache: PriceRangeCache::standard(),
            full_range: None,
        }
    }

    /// Start from an existing state, e.g. one parsed from a URL.
    pub fn with_state(mut self, state: ShopState) -> Self {
        self.state = state;
        self
    }

    /// Override the full-range cache windows.
    pub fn with_price_policy(mut self, policy: CachePolicy) -> Self {
        self.price_cache = PriceRangeCache::new(policy);
        self
    }

    pub fn state(&self) -> &ShopState {
        &self.state
    }

    pub fn status(&self) -> &QueryStatus {
        &self.status
    }

    /// Last applied response.
    pub fn page(&self) -> Option<&CatalogPage> {
        self.page.as_ref()
    }

    pub fn category_tree(&self) -> &CategoryTree {
        &self.tree
    }

    /// Latest issued generation; 0 before the first request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pagination(&self) -> Pagination {
        match &self.page {
            Some(page) => page.pagination(),
            None => Pagination::new(self.state.current_page, PAGE_SIZE, 0),
        }
    }

    /// Request for the current state.
    pub fn current_query(&self) -> CatalogQuery {
        CatalogQuery::for_listing(
            &self.state.filters,
            self.state.sort,
            &self.state.search_term,
            self.state.current_page,
        )
    }

    /// Slider bounds from the full and live snapshots.
    pub fn price_bounds(&self) -> PriceBounds {
        let live = self
            .page
            .as_ref()
            .and_then(|p| p.aggregations.price_range.as_ref());
        resolve_price_bounds(self.full_range.as_ref(), live)
    }

    /// Sidebar rows under the current expansion.
    pub fn visible_categories(&self) -> Vec<FlatCategory> {
        self.tree.visible_rows(&self.state.expanded_categories)
    }

    /// Click action for a category row, or `None` if it is not in the tree.
    pub fn category_action(&self, id: &CategoryId) -> Option<ShopAction> {
        self.tree.find(id).map(|node| ShopAction::CategoryClicked {
            id: node.id.clone(),
            has_children: !node.is_leaf(),
        })
    }

    /// Apply an action without talking to the backend.
    pub fn dispatch_local(&mut self, action: ShopAction) -> Effects {
        let transition = reduce(&self.state, action);
        self.state = transition.state;
        transition.effects
    }

    /// Apply an action and run the request it asks for.
    pub async fn dispatch(&mut self, action: ShopAction) -> Result<Effects, ShopError> {
        let effects = self.dispatch_local(action);
        if effects.refetch {
            self.refresh().await?;
        }
        Ok(effects)
    }

    /// Select a price range; rejects `min > max`.
    pub fn set_price_range(&mut self, min: i64, max: i64) -> Result<Effects, ShopError> {
        let range = PriceRange::new(min, max)?;
        Ok(self.dispatch_local(ShopAction::UpdateFilter(FilterUpdate::PriceRange(Some(range)))))
    }

    /// Start a request for the current state.
    ///
    /// Any earlier request still in flight becomes stale.
    pub fn issue(&mut self) -> PendingRequest {
        self.generation += 1;
        self.status = QueryStatus::Loading;
        self.state.loading = true;
        let query = self.current_query();
        info!(
            generation = self.generation,
            page = query.page_number,
            sort = %query.sort_by,
            "issuing catalog request"
        );
        PendingRequest {
            generation: self.generation,
            query,
        }
    }

    /// Apply a response. Returns false when it was stale and got dropped.
    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<CatalogPage, FetchError>,
    ) -> bool {
        if generation != self.generation {
            warn!(
                generation,
                latest = self.generation,
                "discarding stale catalog response"
            );
            return false;
        }

        match result {
            Ok(page) => {
                self.tree = page.aggregations.category_tree();
                if self.state.reveal_selected(&self.tree) {
                    debug!("expanded branch of selected category");
                }
                self.status = if page.is_empty() {
                    QueryStatus::Empty
                } else {
                    QueryStatus::Ready
                };
                debug!(
                    generation,
                    products = page.len(),
                    total = page.total_count,
                    "applied catalog response"
                );
                self.page = Some(page);
            }
            Err(err) => {
                warn!(generation, error = %err, "catalog request failed");
                self.page = None;
                self.tree = CategoryTree::default();
                self.status = QueryStatus::Failed(err);
            }
        }

        self.dispatch_local(ShopAction::FinishLoading);
        true
    }

    /// Fetch the current state's page and apply it.
    pub async fn refresh(&mut self) -> Result<(), ShopError> {
        let pending = self.issue();
        let result = self.backend.fetch_page(&pending.query).await;
        let failure = result.as_ref().err().cloned();
        self.resolve(pending.generation, result);
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Re-issue the current query after a failure.
    pub async fn retry(&mut self) -> Result<(), ShopError> {
        if let Some(err) = self.status.error() {
            info!(error = %err, "retrying catalog request");
        }
        self.refresh().await
    }

    /// Load the unfiltered price range through the cache.
    pub async fn load_price_range(&mut self) -> Result<PriceBounds, ShopError> {
        match self.price_cache.get_or_fetch(self.backend.as_ref()).await {
            Ok(range) => {
                if range.is_some() {
                    self.full_range = range;
                }
                Ok(self.price_bounds())
            }
            Err(err) => {
                warn!(error = %err, "full price range unavailable");
                Err(err.into())
            }
        }
    }
}
