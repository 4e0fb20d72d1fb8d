//! Product cards and their price display rules.

use crate::ids::ProductId;
use crate::money::Price;
use serde::{Deserialize, Serialize};

/// A purchasable format of a book (print, ebook, audiobook).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormat {
    /// Backend format token, e.g. `Physical`.
    #[serde(default)]
    pub format_type: String,
    /// List price; `null` reads as zero.
    #[serde(default, deserialize_with = "crate::money::price_or_default")]
    pub price: Price,
    /// Discounted price; zero or absent means no discount.
    #[serde(default)]
    pub discount_price: Option<Price>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

impl ProductFormat {
    /// Create a format without discount.
    pub fn new(format_type: impl Into<String>, price: i64) -> Self {
        Self {
            format_type: format_type.into(),
            price: Price::new(price),
            discount_price: None,
            stock_quantity: None,
        }
    }

    /// Set the discounted price.
    pub fn with_discount(mut self, discount_price: i64) -> Self {
        self.discount_price = Some(Price::new(discount_price));
        self
    }

    /// Whether the discount actually lowers the price.
    pub fn has_real_discount(&self) -> bool {
        self.discount_price
            .is_some_and(|d| d.is_positive() && d < self.price)
    }

    /// Price the customer pays for this format.
    pub fn effective_price(&self) -> Price {
        match self.discount_price {
            Some(d) if self.has_real_discount() => d,
            _ => self.price,
        }
    }

    /// Persian label for the format token.
    pub fn label(&self) -> &str {
        format_label(&self.format_type)
    }
}

/// Persian label for a backend format token; unknown tokens pass through.
pub fn format_label(token: &str) -> &str {
    match token.to_ascii_lowercase().as_str() {
        "physical" | "print" | "paperback" | "hardcover" => "چاپی",
        "ebook" | "e-book" | "electronic" => "الکترونیکی",
        "audiobook" | "audio" => "صوتی",
        _ => token,
    }
}

/// A product as listed in the catalog grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "coverImage")]
    pub cover_image_url: Option<String>,
    #[serde(default, alias = "authors")]
    pub author_names: Vec<String>,
    #[serde(default, alias = "averageRating")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub formats: Vec<ProductFormat>,
}

impl ProductCard {
    /// Create a card with no formats.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: None,
            cover_image_url: None,
            author_names: Vec::new(),
            rating: None,
            formats: Vec::new(),
        }
    }

    /// Add a format.
    pub fn with_format(mut self, format: ProductFormat) -> Self {
        self.formats.push(format);
        self
    }

    /// The format with the lowest effective price.
    ///
    /// On equal prices the first listed format wins.
    pub fn cheapest_format(&self) -> Option<&ProductFormat> {
        self.formats.iter().fold(None, |best, f| match best {
            Some(b) if b.effective_price() <= f.effective_price() => Some(b),
            _ => Some(f),
        })
    }

    /// Price display derived from the cheapest format.
    pub fn price_display(&self) -> Option<PriceDisplay> {
        self.cheapest_format().map(PriceDisplay::for_format)
    }
}

/// What the card shows in its price area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceDisplay {
    pub display_price: Price,
    /// Struck-through list price, only with a real discount.
    pub original_price: Option<Price>,
    /// Whole percent off, only with a real discount.
    pub discount_percentage: Option<u8>,
    pub has_real_discount: bool,
}

impl PriceDisplay {
    /// Derive the display for one format.
    pub fn for_format(format: &ProductFormat) -> Self {
        if !format.has_real_discount() {
            return Self {
                display_price: format.price,
                original_price: None,
                discount_percentage: None,
                has_real_discount: false,
            };
        }

        let effective = format.effective_price();
        let saved = (format.price - effective).amount() as f64;
        let percent = (saved / format.price.amount() as f64 * 100.0).round();

        Self {
            display_price: effective,
            original_price: Some(format.price),
            discount_percentage: Some(percent.clamp(0.0, 100.0) as u8),
            has_real_discount: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_discount() {
        let format = ProductFormat::new("Physical", 100_000).with_discount(80_000);
        let display = PriceDisplay::for_format(&format);
        assert!(display.has_real_discount);
        assert_eq!(display.display_price, Price::new(80_000));
        assert_eq!(display.original_price, Some(Price::new(100_000)));
        assert_eq!(display.discount_percentage, Some(20));
    }

    #[test]
    fn test_zero_discount_is_ignored() {
        let format = ProductFormat::new("Physical", 100_000).with_discount(0);
        let display = PriceDisplay::for_format(&format);
        assert!(!display.has_real_discount);
        assert_eq!(display.display_price, Price::new(100_000));
        assert_eq!(display.discount_percentage, None);
    }

    #[test]
    fn test_discount_above_price_is_ignored() {
        let format = ProductFormat::new("Ebook", 50_000).with_discount(60_000);
        assert!(!format.has_real_discount());
        assert_eq!(format.effective_price(), Price::new(50_000));
    }

    #[test]
    fn test_cheapest_format_uses_effective_price() {
        let card = ProductCard::new("p1", "Shahnameh")
            .with_format(ProductFormat::new("Physical", 300_000).with_discount(150_000))
            .with_format(ProductFormat::new("Ebook", 180_000))
            .with_format(ProductFormat::new("Audiobook", 200_000));

        let cheapest = card.cheapest_format().unwrap();
        assert_eq!(cheapest.format_type, "Physical");

        let display = card.price_display().unwrap();
        assert_eq!(display.display_price, Price::new(150_000));
        assert_eq!(display.discount_percentage, Some(50));
    }

    #[test]
    fn test_card_without_formats() {
        assert!(ProductCard::new("p2", "Empty").price_display().is_none());
    }

    #[test]
    fn test_deserialize_backend_card() {
        let json = r#"{
            "id": "b-17",
            "title": "Bustan",
            "authors": ["Saadi"],
            "averageRating": 4.5,
            "formats": [
                {"formatType": "Ebook", "price": 90000, "discountPrice": 0},
                {"formatType": "Physical", "price": 120000.0, "discountPrice": 99000}
            ]
        }"#;
        let card: ProductCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.author_names, vec!["Saadi".to_string()]);
        assert_eq!(card.formats[1].price, Price::new(120_000));
        assert_eq!(card.cheapest_format().unwrap().format_type, "Ebook");
    }

    #[test]
    fn test_null_price_reads_as_missing() {
        let json = r#"{
            "id": 42,
            "title": "Golestan",
            "formats": [
                {"formatType": "Ebook", "price": null, "discountPrice": null},
                {"formatType": "Physical", "price": 70000}
            ]
        }"#;
        let card: ProductCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.id.as_str(), "42");
        assert_eq!(card.formats[0].price, Price::default());
        assert_eq!(card.formats[0].discount_price, None);
        assert_eq!(card.formats[1].price, Price::new(70_000));
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(format_label("Physical"), "چاپی");
        assert_eq!(format_label("EBook"), "الکترونیکی");
        assert_eq!(format_label("Vinyl"), "Vinyl");
    }
}
