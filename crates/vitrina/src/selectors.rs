//! Selector map: logical UI element names resolved to locator strings.
//!
//! Scenario logic never hardcodes a locator. Every element of the product
//! card is addressed through a logical name, and the map is loaded (and
//! validated) before each scenario run alongside the fixture.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::result::{VitrinaError, VitrinaResult};

/// A locator string for one logical element of the product card.
///
/// Carries the CSS selector plus helpers that compile it into the
/// JavaScript query expressions the CDP driver evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(pub String);

impl Locator {
    /// Create a locator from a CSS selector
    pub fn new(css: impl Into<String>) -> Self {
        Self(css.into())
    }

    /// The raw CSS selector
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Query expression resolving to the first matching element (or null)
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("document.querySelector({:?})", self.0)
    }

    /// Query expression counting matching elements
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("document.querySelectorAll({:?}).length", self.0)
    }

    /// Query expression for visibility: element exists, has layout boxes,
    /// and is not `visibility: hidden`
    #[must_use]
    pub fn to_visible_query(&self) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel:?}); \
             if (!el) return false; \
             if (el.getClientRects().length === 0) return false; \
             return getComputedStyle(el).visibility !== 'hidden'; }})()",
            sel = self.0
        )
    }

    /// Query expression for the committed `value` of an input/select
    #[must_use]
    pub fn to_value_query(&self) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel:?}); \
             return el ? el.value : null; }})()",
            sel = self.0
        )
    }

    /// Query expression for the text content of the element (or null)
    #[must_use]
    pub fn to_text_query(&self) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel:?}); \
             return el ? el.textContent : null; }})()",
            sel = self.0
        )
    }

    /// Query expression for an attribute value (or null)
    #[must_use]
    pub fn to_attribute_query(&self, name: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel:?}); \
             return el ? el.getAttribute({name:?}) : null; }})()",
            sel = self.0
        )
    }

    /// Query expression for the `disabled` property of a control
    #[must_use]
    pub fn to_disabled_query(&self) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel:?}); \
             return el ? el.disabled === true : false; }})()",
            sel = self.0
        )
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Locator {
    fn from(css: &str) -> Self {
        Self::new(css)
    }
}

/// Mapping from logical product-card element names to locator strings.
///
/// Keys mirror the page's test hooks one-to-one; values must uniquely
/// resolve to one element on a correctly rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectorMap {
    /// Root of the product card widget
    pub product_card: Locator,
    /// Product image inside the card
    pub product_image: Locator,
    /// Quantity input field
    pub quantity_input: Locator,
    /// Add-to-cart control
    pub add_to_cart_button: Locator,
    /// Success indicator shown after an add succeeds
    pub add_to_cart_success_message: Locator,
    /// Visible cart counter
    pub cart_count: Locator,
    /// Control opening the cart view
    pub view_cart_button: Locator,
    /// Cart items region
    pub cart_items: Locator,
    /// Out-of-stock indicator
    pub out_of_stock_message: Locator,
    /// Original (struck-through) price when on sale
    pub original_price: Locator,
    /// Discounted price when on sale
    pub discount_price: Locator,
    /// Variant `<select>` control
    pub variant_selector: Locator,
    /// Reviews section root
    pub reviews_section: Locator,
    /// Average rating inside the reviews section
    pub average_rating: Locator,
    /// Review count inside the reviews section
    pub review_count: Locator,
    /// Max-quantity error indicator
    pub max_quantity_error: Locator,
    /// Related products section root
    pub related_products_section: Locator,
    /// A single related-product card
    pub related_product_card: Locator,
    /// Wishlist control
    pub wishlist_button: Locator,
    /// Wishlist confirmation indicator
    pub wishlist_confirmation: Locator,
    /// Product specifications region (dimensions, weight)
    pub product_specs: Locator,
    /// Network-error indicator for failed cart calls
    pub network_error_message: Locator,
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            product_card: "[data-testid=product-card]".into(),
            product_image: "[data-testid=product-image]".into(),
            quantity_input: "[data-testid=quantity-input]".into(),
            add_to_cart_button: "[data-testid=add-to-cart]".into(),
            add_to_cart_success_message: "[data-testid=add-to-cart-success]".into(),
            cart_count: "[data-testid=cart-count]".into(),
            view_cart_button: "[data-testid=view-cart]".into(),
            cart_items: "[data-testid=cart-items]".into(),
            out_of_stock_message: "[data-testid=out-of-stock]".into(),
            original_price: "[data-testid=original-price]".into(),
            discount_price: "[data-testid=discount-price]".into(),
            variant_selector: "[data-testid=variant-selector]".into(),
            reviews_section: "[data-testid=reviews-section]".into(),
            average_rating: "[data-testid=average-rating]".into(),
            review_count: "[data-testid=review-count]".into(),
            max_quantity_error: "[data-testid=max-quantity-error]".into(),
            related_products_section: "[data-testid=related-products]".into(),
            related_product_card: "[data-testid=related-product-card]".into(),
            wishlist_button: "[data-testid=wishlist-button]".into(),
            wishlist_confirmation: "[data-testid=wishlist-confirmation]".into(),
            product_specs: "[data-testid=product-specs]".into(),
            network_error_message: "[data-testid=network-error]".into(),
        }
    }
}

impl SelectorMap {
    /// Load a selector map from a JSON file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> VitrinaResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| VitrinaError::Fixture {
            message: format!("cannot read selector map {}: {e}", path.as_ref().display()),
        })?;
        Self::from_json(&raw)
    }

    /// Parse a selector map from a JSON string and validate it.
    pub fn from_json(raw: &str) -> VitrinaResult<Self> {
        let map: Self = serde_json::from_str(raw).map_err(|e| VitrinaError::Fixture {
            message: format!("invalid selector map: {e}"),
        })?;
        map.validate()?;
        Ok(map)
    }

    /// All (logical name, locator) pairs in declaration order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("productCard", &self.product_card),
            ("productImage", &self.product_image),
            ("quantityInput", &self.quantity_input),
            ("addToCartButton", &self.add_to_cart_button),
            ("addToCartSuccessMessage", &self.add_to_cart_success_message),
            ("cartCount", &self.cart_count),
            ("viewCartButton", &self.view_cart_button),
            ("cartItems", &self.cart_items),
            ("outOfStockMessage", &self.out_of_stock_message),
            ("originalPrice", &self.original_price),
            ("discountPrice", &self.discount_price),
            ("variantSelector", &self.variant_selector),
            ("reviewsSection", &self.reviews_section),
            ("averageRating", &self.average_rating),
            ("reviewCount", &self.review_count),
            ("maxQuantityError", &self.max_quantity_error),
            ("relatedProductsSection", &self.related_products_section),
            ("relatedProductCard", &self.related_product_card),
            ("wishlistButton", &self.wishlist_button),
            ("wishlistConfirmation", &self.wishlist_confirmation),
            ("productSpecs", &self.product_specs),
            ("networkErrorMessage", &self.network_error_message),
        ]
    }

    /// Validate the map: every locator non-empty, no two logical names
    /// sharing the same locator string.
    pub fn validate(&self) -> VitrinaResult<()> {
        let mut seen = HashSet::new();
        for (name, locator) in self.entries() {
            if locator.as_str().trim().is_empty() {
                return Err(VitrinaError::Fixture {
                    message: format!("selector '{name}' is empty"),
                });
            }
            if !seen.insert(locator.as_str()) {
                return Err(VitrinaError::Fixture {
                    message: format!("selector '{name}' duplicates locator '{locator}'"),
                });
            }
        }
        Ok(())
    }
}
