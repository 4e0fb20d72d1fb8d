//! Shop page state and its reducer.
//!
//! Every user interaction is a [`ShopAction`]; [`reduce`] maps the current
//! state and one action to the next state plus the side effects the caller
//! has to run. The reducer itself does no I/O.

use std::collections::BTreeSet;

use serde::Serialize;
use shelf_catalog::catalog::CategoryTree;
use shelf_catalog::ids::CategoryId;
use shelf_catalog::search::{FilterOptions, FilterUpdate, MultiFacet, SortField, SortOption};

/// State of the shop page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopState {
    pub filters: FilterOptions,
    pub sort: SortOption,
    pub search_term: String,
    /// 1-indexed.
    pub current_page: u32,
    /// Parent categories whose children are shown. UI-only; never sent.
    pub expanded_categories: BTreeSet<CategoryId>,
    /// Loading overlay.
    pub loading: bool,
}

impl Default for ShopState {
    fn default() -> Self {
        Self {
            filters: FilterOptions::default(),
            sort: SortOption::default(),
            search_term: String::new(),
            current_page: 1,
            expanded_categories: BTreeSet::new(),
            loading: false,
        }
    }
}

impl ShopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count shown on the filter badge.
    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count()
    }

    /// Expand every ancestor of the selected category so it is visible.
    ///
    /// Returns true when the expanded set changed.
    pub fn reveal_selected(&mut self, tree: &CategoryTree) -> bool {
        let Some(selected) = self.filters.category_id() else {
            return false;
        };
        let mut changed = false;
        for ancestor in tree.ancestors_of(selected) {
            changed |= self.expanded_categories.insert(ancestor);
        }
        changed
    }
}

/// A user interaction on the shop page.
#[derive(Debug, Clone, PartialEq)]
pub enum ShopAction {
    /// Replace one filter key.
    UpdateFilter(FilterUpdate),
    /// Toggle one value of a multi-select facet.
    ToggleFacetValue { facet: MultiFacet, value: String },
    /// A category row was clicked.
    CategoryClicked { id: CategoryId, has_children: bool },
    /// Drop every filter.
    ClearFilters,
    /// Sort header clicked.
    SetSort(SortField),
    /// Search box changed.
    SetSearch(String),
    /// Pager clicked.
    SetPage(u32),
    /// The pending request settled.
    FinishLoading,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    /// Issue a new catalog request.
    pub refetch: bool,
    /// Scroll the listing back to the top.
    pub scroll_to_top: bool,
}

impl Effects {
    fn none() -> Self {
        Self::default()
    }

    fn refetch() -> Self {
        Self {
            refetch: true,
            scroll_to_top: false,
        }
    }
}

/// Result of one reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ShopState,
    pub effects: Effects,
}

impl Transition {
    fn unchanged(state: &ShopState) -> Self {
        Self {
            state: state.clone(),
            effects: Effects::none(),
        }
    }

    /// New query parameters: back to page one with the overlay on.
    fn requery(mut state: ShopState) -> Self {
        state.current_page = 1;
        state.loading = true;
        Self {
            state,
            effects: Effects::refetch(),
        }
    }
}

/// Apply one action.
pub fn reduce(state: &ShopState, action: ShopAction) -> Transition {
    match action {
        ShopAction::UpdateFilter(update) => {
            let mut next = state.clone();
            next.filters = state.filters.apply(update);
            Transition::requery(next)
        }

        ShopAction::ToggleFacetValue { facet, value } => {
            let mut next = state.clone();
            next.filters = state.filters.toggle_multi(facet, &value);
            Transition::requery(next)
        }

        ShopAction::CategoryClicked { id, has_children: true } => {
            let mut next = state.clone();
            if !next.expanded_categories.remove(&id) {
                next.expanded_categories.insert(id);
            }
            Transition {
                state: next,
                effects: Effects::none(),
            }
        }

        ShopAction::CategoryClicked { id, has_children: false } => {
            let mut next = state.clone();
            next.filters = state.filters.toggle_category(&id);
            Transition::requery(next)
        }

        ShopAction::ClearFilters => {
            let mut next = state.clone();
            next.filters = FilterOptions::default();
            Transition::requery(next)
        }

        ShopAction::SetSort(field) => {
            let mut next = state.clone();
            next.sort = state.sort.toggled(field);
            Transition::requery(next)
        }

        ShopAction::SetSearch(term) => {
            if term == state.search_term {
                return Transition::unchanged(state);
            }
            let mut next = state.clone();
            next.search_term = term;
            Transition::requery(next)
        }

        ShopAction::SetPage(page) => {
            let page = page.max(1);
            if page == state.current_page {
                return Transition::unchanged(state);
            }
            let mut next = state.clone();
            next.current_page = page;
            next.loading = true;
            Transition {
                state: next,
                effects: Effects {
                    refetch: true,
                    scroll_to_top: true,
                },
            }
        }

        ShopAction::FinishLoading => {
            let mut next = state.clone();
            next.loading = false;
            Transition {
                state: next,
                effects: Effects::none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_catalog::catalog::CategoryFacet;
    use shelf_catalog::search::{PriceRange, SortDirection};

    fn on_page(page: u32) -> ShopState {
        ShopState {
            current_page: page,
            ..ShopState::default()
        }
    }

    #[test]
    fn test_filter_change_resets_page() {
        let t = reduce(
            &on_page(3),
            ShopAction::UpdateFilter(FilterUpdate::PriceRange(Some(PriceRange::new(0, 10).unwrap()))),
        );
        assert_eq!(t.state.current_page, 1);
        assert!(t.state.loading);
        assert!(t.effects.refetch);
        assert!(!t.effects.scroll_to_top);
    }

    #[test]
    fn test_search_change_resets_page() {
        let t = reduce(&on_page(4), ShopAction::SetSearch("سعدی".into()));
        assert_eq!(t.state.current_page, 1);
        assert_eq!(t.state.search_term, "سعدی");
        assert!(t.effects.refetch);
    }

    #[test]
    fn test_same_search_is_noop() {
        let state = on_page(2);
        let t = reduce(&state, ShopAction::SetSearch(String::new()));
        assert_eq!(t.state, state);
        assert!(!t.effects.refetch);
    }

    #[test]
    fn test_sort_change_resets_page_and_toggles() {
        let t = reduce(&on_page(2), ShopAction::SetSort(SortField::Title));
        assert_eq!(t.state.current_page, 1);
        assert_eq!(t.state.sort.direction, SortDirection::Desc);

        let t = reduce(&t.state, ShopAction::SetSort(SortField::Price));
        assert_eq!(t.state.sort, SortOption::new(SortField::Price, SortDirection::Asc));
    }

    #[test]
    fn test_page_change_scrolls_to_top() {
        let t = reduce(&ShopState::default(), ShopAction::SetPage(2));
        assert_eq!(t.state.current_page, 2);
        assert!(t.effects.refetch);
        assert!(t.effects.scroll_to_top);

        let again = reduce(&t.state, ShopAction::SetPage(2));
        assert!(!again.effects.refetch);
    }

    #[test]
    fn test_parent_click_only_expands() {
        let id = CategoryId::new("fiction");
        let t = reduce(
            &on_page(3),
            ShopAction::CategoryClicked { id: id.clone(), has_children: true },
        );
        assert!(t.state.expanded_categories.contains(&id));
        assert_eq!(t.state.filters, FilterOptions::default());
        assert_eq!(t.state.current_page, 3);
        assert!(!t.effects.refetch);

        let t = reduce(&t.state, ShopAction::CategoryClicked { id: id.clone(), has_children: true });
        assert!(!t.state.expanded_categories.contains(&id));
    }

    #[test]
    fn test_leaf_click_toggles_filter() {
        let id = CategoryId::new("novel");
        let t = reduce(
            &ShopState::default(),
            ShopAction::CategoryClicked { id: id.clone(), has_children: false },
        );
        assert_eq!(t.state.filters.category, Some(vec![id.clone()]));

        let t = reduce(&t.state, ShopAction::CategoryClicked { id, has_children: false });
        assert_eq!(t.state.filters.category, None);
    }

    #[test]
    fn test_clear_keeps_sort_and_expansion() {
        let mut state = on_page(2);
        state.sort = SortOption::new(SortField::Price, SortDirection::Desc);
        state.expanded_categories.insert(CategoryId::new("p"));
        state.filters = state.filters.toggle_multi(MultiFacet::Language, "fa");

        let t = reduce(&state, ShopAction::ClearFilters);
        assert_eq!(t.state.filters, FilterOptions::default());
        assert_eq!(t.state.sort, state.sort);
        assert_eq!(t.state.expanded_categories, state.expanded_categories);
        assert_eq!(t.state.active_filter_count(), 0);
    }

    #[test]
    fn test_facet_toggle_counts_in_badge() {
        let t = reduce(
            &ShopState::default(),
            ShopAction::ToggleFacetValue {
                facet: MultiFacet::Publisher,
                value: "pub-1".into(),
            },
        );
        assert_eq!(t.state.active_filter_count(), 1);
    }

    #[test]
    fn test_reveal_selected_expands_ancestors() {
        let tree = CategoryTree::from_facets(&[
            CategoryFacet::new("root", "Root", 2),
            CategoryFacet::new("mid", "Mid", 2).with_parent("root"),
            CategoryFacet::new("leaf", "Leaf", 2).with_parent("mid"),
        ]);
        let mut state = ShopState::default();
        state.filters = state.filters.toggle_category(&CategoryId::new("leaf"));

        assert!(state.reveal_selected(&tree));
        assert!(state.expanded_categories.contains(&CategoryId::new("root")));
        assert!(state.expanded_categories.contains(&CategoryId::new("mid")));
        assert!(!state.reveal_selected(&tree));
    }
}
