//! CLI command implementations.

pub mod browse;
pub mod categories;
pub mod config;
pub mod price_range;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use shelf_catalog::ids::CategoryId;
use shelf_catalog::search::{FilterUpdate, MultiFacet, SortDirection, SortField};
use shelf_data::HttpCatalogClient;
use shelf_shop::price::{DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};
use shelf_shop::{parse_query_string, ShopAction, ShopController, ShopState};

use crate::context::Context;

/// Filter and sort flags shared by the listing commands.
#[derive(Args, Debug)]
pub struct ShopArgs {
    /// Start from a shop URL query string, e.g. `category=c1&page=2`.
    #[arg(long)]
    pub url: Option<String>,

    /// Search term.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Category to select.
    #[arg(long)]
    pub category: Option<String>,

    /// Formats (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub format: Vec<String>,

    /// Author ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub author: Vec<String>,

    /// Publisher ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub publisher: Vec<String>,

    /// Languages (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub language: Vec<String>,

    /// Age groups (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub age_group: Vec<String>,

    /// Lowest price in Toman.
    #[arg(long)]
    pub min_price: Option<i64>,

    /// Highest price in Toman.
    #[arg(long)]
    pub max_price: Option<i64>,

    /// Minimum rating.
    #[arg(long)]
    pub rating: Option<f64>,

    /// Sort field: title, price, rating, publishedDate.
    #[arg(long)]
    pub sort: Option<SortField>,

    /// Sort descending.
    #[arg(long)]
    pub desc: bool,

    /// Page number.
    #[arg(short, long)]
    pub page: Option<u32>,
}

impl ShopArgs {
    /// Controller whose state reflects these flags.
    ///
    /// `--url` seeds the state; the other flags are replayed on top as shop
    /// actions, the way a user would click them.
    pub fn controller(&self, ctx: &Context) -> Result<ShopController<HttpCatalogClient>> {
        self.seed(ctx.shop()?)
    }

    fn seed(
        &self,
        shop: ShopController<HttpCatalogClient>,
    ) -> Result<ShopController<HttpCatalogClient>> {
        let initial = self
            .url
            .as_deref()
            .map(parse_query_string)
            .unwrap_or_else(ShopState::new);
        let mut shop = shop.with_state(initial);
        self.apply(&mut shop)?;
        Ok(shop)
    }

    fn apply(&self, shop: &mut ShopController<HttpCatalogClient>) -> Result<()> {
        if let Some(term) = &self.search {
            shop.dispatch_local(ShopAction::SetSearch(term.trim().to_string()));
        }
        if let Some(category) = &self.category {
            shop.dispatch_local(ShopAction::UpdateFilter(FilterUpdate::Category(Some(vec![
                CategoryId::new(category.as_str()),
            ]))));
        }

        let facets = [
            (MultiFacet::Format, &self.format),
            (MultiFacet::Author, &self.author),
            (MultiFacet::Publisher, &self.publisher),
            (MultiFacet::Language, &self.language),
            (MultiFacet::AgeGroup, &self.age_group),
        ];
        for (facet, values) in facets {
            for value in values {
                let selected = shop.state().filters.multi(facet).unwrap_or_default();
                if !selected.contains(value) {
                    shop.dispatch_local(ShopAction::ToggleFacetValue {
                        facet,
                        value: value.clone(),
                    });
                }
            }
        }

        if self.min_price.is_some() || self.max_price.is_some() {
            let min = self.min_price.unwrap_or(DEFAULT_MIN_PRICE);
            let max = self.max_price.unwrap_or(DEFAULT_MAX_PRICE);
            shop.set_price_range(min, max)
                .with_context(|| format!("Invalid price range {}..{}", min, max))?;
        }
        if let Some(rating) = self.rating {
            shop.dispatch_local(ShopAction::UpdateFilter(FilterUpdate::Rating(Some(rating))));
        }

        if let Some(field) = self.sort {
            shop.dispatch_local(ShopAction::SetSort(field));
        }
        if self.desc && shop.state().sort.direction == SortDirection::Asc {
            let field = shop.state().sort.field;
            shop.dispatch_local(ShopAction::SetSort(field));
        }

        // Filter and sort changes reset the page, so the page goes last.
        if let Some(page) = self.page {
            shop.dispatch_local(ShopAction::SetPage(page));
        }
        Ok(())
    }
}

/// Arguments for the browse command.
#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub shop: ShopArgs,
}

/// Arguments for the categories command.
#[derive(Args, Debug)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub shop: ShopArgs,

    /// Show every level, not just expanded branches.
    #[arg(short, long)]
    pub all: bool,

    /// Expand these parent categories (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,
}

/// Arguments for the price-range command.
#[derive(Args, Debug)]
pub struct PriceRangeArgs {
    #[command(flatten)]
    pub shop: ShopArgs,

    /// Also fetch the filtered listing for its histogram.
    #[arg(long)]
    pub live: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,

        /// API base URL to write.
        #[arg(long, default_value = "http://localhost:5000")]
        base_url: String,
    },
}
