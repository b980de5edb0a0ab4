//! Test fixtures: the static expected-value oracle for a scenario run.
//!
//! A fixture is loaded before each scenario and passed explicitly through
//! the scenario context. It is never shared mutable state; scenarios that
//! run in parallel workers each get their own copy.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::result::{VitrinaError, VitrinaResult};

/// Path the widget posts cart additions to
pub const CART_ENDPOINT: &str = "/api/cart";

/// Expected values for a product-card scenario run.
///
/// Quantity inputs are kept as strings because scenarios type them verbatim
/// into the quantity field; bounds and counters are numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductFixture {
    /// URL of the product page under test
    pub product_page_url: String,
    /// Product name shown on the card (and image alt text)
    pub product_name: String,
    /// Product description text
    pub product_description: String,
    /// Displayed price string (e.g. "$19.99")
    pub product_price: String,
    /// A valid integer quantity to type, within [1, maxQuantity]
    pub valid_integer_quantity: String,
    /// A valid decimal quantity, only meaningful when decimals are allowed
    pub valid_decimal_quantity: String,
    /// A malformed quantity the input must reject
    pub invalid_quantity: String,
    /// Value the input resets to after rejecting bad input
    pub default_quantity: String,
    /// Upper bound the input clamps to
    pub max_quantity: u32,
    /// Whether the quantity input accepts decimal strings
    pub allow_decimal_quantities: bool,
    /// Cart counter value before any interaction
    pub initial_cart_count: u32,
    /// Ordered variant list offered by the variant selector
    pub available_variants: Vec<String>,
}

impl ProductFixture {
    /// Load a fixture from a JSON file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> VitrinaResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| VitrinaError::Fixture {
            message: format!("cannot read fixture {}: {e}", path.as_ref().display()),
        })?;
        Self::from_json(&raw)
    }

    /// Parse a fixture from a JSON string and validate it.
    pub fn from_json(raw: &str) -> VitrinaResult<Self> {
        let fixture: Self = serde_json::from_str(raw).map_err(|e| VitrinaError::Fixture {
            message: format!("invalid fixture: {e}"),
        })?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// The canonical "Widget" fixture used by the suite tests.
    #[must_use]
    pub fn widget() -> Self {
        Self {
            product_page_url: "http://localhost:3000/product/widget".to_string(),
            product_name: "Widget".to_string(),
            product_description: "A finely machined widget for everyday use".to_string(),
            product_price: "$19.99".to_string(),
            valid_integer_quantity: "5".to_string(),
            valid_decimal_quantity: "2.5".to_string(),
            invalid_quantity: "abc".to_string(),
            default_quantity: "1".to_string(),
            max_quantity: 10,
            allow_decimal_quantities: false,
            initial_cart_count: 0,
            available_variants: vec![
                "Small".to_string(),
                "Medium".to_string(),
                "Large".to_string(),
            ],
        }
    }

    /// Validate internal consistency of the fixture.
    pub fn validate(&self) -> VitrinaResult<()> {
        if self.product_page_url.trim().is_empty() {
            return Err(VitrinaError::Fixture {
                message: "productPageUrl is empty".to_string(),
            });
        }
        if self.max_quantity == 0 {
            return Err(VitrinaError::Fixture {
                message: "maxQuantity must be at least 1".to_string(),
            });
        }
        match self.valid_integer_quantity.parse::<u32>() {
            Ok(q) if (1..=self.max_quantity).contains(&q) => {}
            Ok(q) => {
                return Err(VitrinaError::Fixture {
                    message: format!(
                        "validIntegerQuantity {q} outside [1, {}]",
                        self.max_quantity
                    ),
                });
            }
            Err(_) => {
                return Err(VitrinaError::Fixture {
                    message: format!(
                        "validIntegerQuantity '{}' is not an integer",
                        self.valid_integer_quantity
                    ),
                });
            }
        }
        if self.invalid_quantity.parse::<f64>().is_ok() {
            return Err(VitrinaError::Fixture {
                message: format!(
                    "invalidQuantity '{}' parses as a number",
                    self.invalid_quantity
                ),
            });
        }
        Ok(())
    }

    /// A quantity string one past the clamp bound, as a scenario would type it.
    #[must_use]
    pub fn over_max_quantity(&self) -> String {
        (self.max_quantity + 1).to_string()
    }

    /// Second variant in the enumerated list, used by the selection and
    /// persistence scenarios. None when the page offers fewer than two.
    #[must_use]
    pub fn second_variant(&self) -> Option<&str> {
        self.available_variants.get(1).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_widget_fixture_is_valid() {
        assert!(ProductFixture::widget().validate().is_ok());
    }

    #[test]
    fn test_over_max_quantity() {
        let fixture = ProductFixture::widget();
        assert_eq!(fixture.over_max_quantity(), "11");
    }

    #[test]
    fn test_second_variant() {
        let fixture = ProductFixture::widget();
        assert_eq!(fixture.second_variant(), Some("Medium"));
    }

    #[test]
    fn test_zero_max_quantity_rejected() {
        let mut fixture = ProductFixture::widget();
        fixture.max_quantity = 0;
        assert!(fixture.validate().is_err());
    }

    #[test]
    fn test_numeric_invalid_quantity_rejected() {
        let mut fixture = ProductFixture::widget();
        fixture.invalid_quantity = "3.5".to_string();
        let err = fixture.validate().unwrap_err();
        assert!(err.to_string().contains("parses as a number"));
    }

    #[test]
    fn test_valid_quantity_out_of_bounds_rejected() {
        let mut fixture = ProductFixture::widget();
        fixture.valid_integer_quantity = "99".to_string();
        assert!(fixture.validate().is_err());
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let raw = serde_json::to_string(&ProductFixture::widget()).unwrap();
        assert!(raw.contains("\"productPageUrl\""));
        assert!(raw.contains("\"allowDecimalQuantities\""));
        assert!(raw.contains("\"availableVariants\""));
    }

    #[test]
    fn test_from_path_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = serde_json::to_string_pretty(&ProductFixture::widget()).unwrap();
        file.write_all(raw.as_bytes()).unwrap();
        let loaded = ProductFixture::from_path(file.path()).unwrap();
        assert_eq!(loaded, ProductFixture::widget());
    }

    #[test]
    fn test_missing_field_is_fixture_error() {
        let err = ProductFixture::from_json("{\"productName\":\"Widget\"}").unwrap_err();
        assert!(matches!(err, VitrinaError::Fixture { .. }));
    }
}
