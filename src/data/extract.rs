//! Product detail extraction from catalogue HTML
//!
//! Locates the price and product name on a product page using CSS selectors.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::ProductDetails;

/// Default selector for the price element
pub const DEFAULT_PRICE_SELECTOR: &str = ".price";

/// Default selector for the product name element
pub const DEFAULT_NAME_SELECTOR: &str = "h1";

/// Errors that can occur when building an extractor
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A selector string could not be parsed
    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),
}

/// Pulls product details out of a page body
///
/// Returns `None` when the page does not carry the expected markers.
pub trait Extractor: Send + Sync {
    fn extract(&self, body: &str) -> Option<ProductDetails>;
}

/// [`Extractor`] that takes the first element matching each selector
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    price: Selector,
    name: Selector,
}

impl Default for SelectorExtractor {
    fn default() -> Self {
        Self {
            price: Selector::parse(DEFAULT_PRICE_SELECTOR).expect("valid default price selector"),
            name: Selector::parse(DEFAULT_NAME_SELECTOR).expect("valid default name selector"),
        }
    }
}

impl SelectorExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with custom selectors
    ///
    /// # Arguments
    /// * `price` - CSS selector for the price element
    /// * `name` - CSS selector for the product name element
    pub fn with_selectors(price: &str, name: &str) -> Result<Self, ExtractError> {
        let parse = |s: &str| Selector::parse(s).map_err(|_| ExtractError::InvalidSelector(s.to_string()));
        Ok(Self {
            price: parse(price)?,
            name: parse(name)?,
        })
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, body: &str) -> Option<ProductDetails> {
        let document = Html::parse_document(body);
        let price = document.select(&self.price).next()?;
        let name = document.select(&self.name).next()?;

        Some(ProductDetails {
            name: stripped_text(&name),
            price: stripped_text(&price),
        })
    }
}

/// Concatenates the element's text nodes, each trimmed, skipping blank ones
fn stripped_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_name_and_price() {
        let html = r#"<h1>Fancy Paint</h1><div class="price">$9.99</div>"#;

        let details = SelectorExtractor::new().extract(html).unwrap();

        assert_eq!(details.name, "Fancy Paint");
        assert_eq!(details.price, "$9.99");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let html = r#"
            <html><body>
              <h1>
                  Ocean Blue
              </h1>
              <span class="price">
                  <span class="currency">€</span> 12,50
              </span>
            </body></html>
        "#;

        let details = SelectorExtractor::new().extract(html).unwrap();

        assert_eq!(details.name, "Ocean Blue");
        assert_eq!(details.price, "€12,50");
    }

    #[test]
    fn test_first_match_wins() {
        let html = r#"
            <h1>Primary</h1><h1>Secondary</h1>
            <p class="price">$1</p><p class="price">$2</p>
        "#;

        let details = SelectorExtractor::new().extract(html).unwrap();

        assert_eq!(details.name, "Primary");
        assert_eq!(details.price, "$1");
    }

    #[test]
    fn test_missing_price_returns_none() {
        let html = "<h1>Paint</h1><p>No price here</p>";
        assert!(SelectorExtractor::new().extract(html).is_none());
    }

    #[test]
    fn test_missing_heading_returns_none() {
        let html = r#"<h2>Paint</h2><div class="price">$5</div>"#;
        assert!(SelectorExtractor::new().extract(html).is_none());
    }

    #[test]
    fn test_empty_elements_still_count_as_present() {
        let html = r#"<h1></h1><div class="price"> </div>"#;

        let details = SelectorExtractor::new().extract(html).unwrap();

        assert_eq!(details.name, "");
        assert_eq!(details.price, "");
    }

    #[test]
    fn test_custom_selectors() {
        let extractor = SelectorExtractor::with_selectors("#cost", ".title").unwrap();
        let html = r#"<div class="title">Sage</div><b id="cost">$3</b>"#;

        let details = extractor.extract(html).unwrap();

        assert_eq!(details.name, "Sage");
        assert_eq!(details.price, "$3");
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let result = SelectorExtractor::with_selectors("[[", "h1");
        assert!(matches!(result, Err(ExtractError::InvalidSelector(s)) if s == "[["));
    }
}
