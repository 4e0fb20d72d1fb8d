//! Shop state in the page URL.
//!
//! Only request-relevant state is encoded; category expansion and the
//! loading flag stay local.

use shelf_catalog::ids::CategoryId;
use shelf_catalog::search::{FilterUpdate, PriceRange, SortDirection, SortField, SortOption};
use tracing::debug;
use url::form_urlencoded;

use crate::price::{DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};
use crate::state::ShopState;

fn list(value: &str) -> Option<Vec<String>> {
    let values: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Parse a URL query string into shop state.
///
/// Unknown keys and unparseable values are ignored.
pub fn parse_query_string(qs: &str) -> ShopState {
    let mut state = ShopState::default();
    let mut field = SortField::default();
    let mut direction = SortDirection::default();
    let mut min_price = None;
    let mut max_price = None;

    let qs = qs.trim_start_matches('?');
    for (key, value) in form_urlencoded::parse(qs.as_bytes()) {
        let value = value.trim();
        let filters = &state.filters;
        match key.as_ref() {
            "q" | "search" => state.search_term = value.to_string(),
            "page" => state.current_page = value.parse::<u32>().unwrap_or(1).max(1),
            "sort" => match value.parse::<SortField>() {
                Ok(parsed) => field = parsed,
                Err(err) => debug!(error = %err, "ignoring sort parameter"),
            },
            "dir" => {
                direction = match value {
                    "desc" => SortDirection::Desc,
                    _ => SortDirection::Asc,
                }
            }
            "category" => {
                let category = (!value.is_empty()).then(|| vec![CategoryId::new(value)]);
                state.filters = filters.apply(FilterUpdate::Category(category));
            }
            "format" => state.filters = filters.apply(FilterUpdate::Formats(list(value))),
            "author" => state.filters = filters.apply(FilterUpdate::AuthorId(list(value))),
            "publisher" => state.filters = filters.apply(FilterUpdate::PublisherId(list(value))),
            "language" => state.filters = filters.apply(FilterUpdate::Language(list(value))),
            "ageGroup" => state.filters = filters.apply(FilterUpdate::AgeGroup(list(value))),
            "rating" => {
                state.filters = filters.apply(FilterUpdate::Rating(value.parse().ok()));
            }
            "minPrice" => min_price = value.parse::<i64>().ok(),
            "maxPrice" => max_price = value.parse::<i64>().ok(),
            _ => {}
        }
    }

    state.sort = SortOption::new(field, direction);

    if min_price.is_some() || max_price.is_some() {
        let min = min_price.unwrap_or(DEFAULT_MIN_PRICE);
        let max = max_price.unwrap_or(DEFAULT_MAX_PRICE);
        match PriceRange::new(min, max) {
            Ok(range) => {
                state.filters = state.filters.apply(FilterUpdate::PriceRange(Some(range)));
            }
            Err(err) => debug!(error = %err, "ignoring price range"),
        }
    }

    state
}

/// Encode shop state as a URL query string.
///
/// Defaults are left out, so a fresh state encodes to an empty string.
pub fn to_query_string(state: &ShopState) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    let filters = &state.filters;

    if !state.search_term.is_empty() {
        out.append_pair("q", &state.search_term);
    }
    if let Some(category) = filters.category_id() {
        out.append_pair("category", category.as_str());
    }
    let lists = [
        ("format", &filters.formats),
        ("author", &filters.author_id),
        ("publisher", &filters.publisher_id),
        ("language", &filters.language),
        ("ageGroup", &filters.age_group),
    ];
    for (key, values) in lists {
        if let Some(values) = values.as_ref().filter(|v| !v.is_empty()) {
            out.append_pair(key, &values.join(","));
        }
    }
    if let Some(range) = filters.price_range {
        out.append_pair("minPrice", &range.min.amount().to_string());
        out.append_pair("maxPrice", &range.max.amount().to_string());
    }
    if let Some(rating) = filters.rating {
        out.append_pair("rating", &rating.to_string());
    }
    if state.sort != SortOption::default() {
        out.append_pair("sort", state.sort.field.as_str());
        if state.sort.direction == SortDirection::Desc {
            out.append_pair("dir", "desc");
        }
    }
    if state.current_page > 1 {
        out.append_pair("page", &state.current_page.to_string());
    }

    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_catalog::search::MultiFacet;

    #[test]
    fn test_parse_listing_url() {
        let state = parse_query_string(
            "?q=%D8%AD%D8%A7%D9%81%D8%B8&category=cat-1&format=Ebook,Audiobook&sort=price&dir=desc&page=3",
        );
        assert_eq!(state.search_term, "حافظ");
        assert_eq!(state.filters.category_id(), Some(&CategoryId::new("cat-1")));
        assert_eq!(
            state.filters.multi(MultiFacet::Format),
            Some(&["Ebook".to_string(), "Audiobook".to_string()][..])
        );
        assert_eq!(state.sort, SortOption::new(SortField::Price, SortDirection::Desc));
        assert_eq!(state.current_page, 3);
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let state = parse_query_string("page=abc&sort=popularity&minPrice=9&maxPrice=2&foo=bar");
        assert_eq!(state, ShopState::default());
    }

    #[test]
    fn test_half_open_price_range() {
        let state = parse_query_string("minPrice=50000");
        let range = state.filters.price_range.unwrap();
        assert_eq!(range.min.amount(), 50_000);
        assert_eq!(range.max.amount(), DEFAULT_MAX_PRICE);
    }

    #[test]
    fn test_default_state_encodes_empty() {
        assert_eq!(to_query_string(&ShopState::default()), "");
    }

    #[test]
    fn test_encode_then_parse_keeps_request_state() {
        let mut state = parse_query_string("category=c&author=a1,a2&minPrice=10&maxPrice=20&page=2");
        state.sort = SortOption::new(SortField::Rating, SortDirection::Desc);
        state.expanded_categories.insert(CategoryId::new("parent"));

        let parsed = parse_query_string(&to_query_string(&state));
        assert_eq!(parsed.filters, state.filters);
        assert_eq!(parsed.sort, state.sort);
        assert_eq!(parsed.current_page, 2);
        assert!(parsed.expanded_categories.is_empty());
    }
}
