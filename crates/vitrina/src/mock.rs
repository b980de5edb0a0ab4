//! In-memory product-card page for browser-free runs.
//!
//! [`MockDriver`] implements [`PageDriver`](crate::driver::PageDriver)
//! against a small model of the widget under test: quantity commit rules,
//! cart counter, variant selection, reload persistence, and the cart
//! network call (routed through the same [`Interceptor`] engine the CDP
//! driver uses). The suite tests run every scenario against it.

use async_trait::async_trait;

use crate::driver::PageDriver;
use crate::fixture::{ProductFixture, CART_ENDPOINT};
use crate::network::{HttpMethod, InterceptAction, InterceptHandle, InterceptRule, Interceptor};
use crate::result::{VitrinaError, VitrinaResult};
use crate::selectors::{Locator, SelectorMap};

/// Page-level state the fixture does not control: conditions the backend
/// would have to establish (stock, sale, review data). The state-setup
/// mechanism for these is an open question in the suite, so the mock lets
/// tests choose it per scenario.
#[derive(Debug, Clone)]
pub struct MockPageState {
    /// Product is out of stock (indicator shown, add-to-cart disabled)
    pub out_of_stock: bool,
    /// Product is on sale (struck original price + discount price shown)
    pub on_sale: bool,
    /// Reviews section is populated
    pub has_reviews: bool,
    /// Number of related product cards rendered
    pub related_count: usize,
}

impl Default for MockPageState {
    fn default() -> Self {
        Self {
            out_of_stock: false,
            on_sale: true,
            has_reviews: true,
            related_count: 2,
        }
    }
}

/// Logical elements of the product-card page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    ProductCard,
    ProductImage,
    QuantityInput,
    AddToCartButton,
    AddToCartSuccessMessage,
    CartCount,
    ViewCartButton,
    CartItems,
    OutOfStockMessage,
    OriginalPrice,
    DiscountPrice,
    VariantSelector,
    ReviewsSection,
    AverageRating,
    ReviewCount,
    MaxQuantityError,
    RelatedProductsSection,
    RelatedProductCard,
    WishlistButton,
    WishlistConfirmation,
    ProductSpecs,
    NetworkErrorMessage,
}

/// What the page remembers across reloads (the widget persists quantity
/// and variant; the suite asserts the round trip, not the mechanism).
#[derive(Debug, Clone, Default)]
struct PageStorage {
    quantity: Option<String>,
    variant: Option<String>,
}

/// Mock page driver modelling the product-card widget
#[derive(Debug)]
pub struct MockDriver {
    selectors: SelectorMap,
    fixture: ProductFixture,
    state: MockPageState,

    loaded: bool,
    current_url: String,
    quantity: String,
    selected_variant: String,
    cart_count: u32,
    cart_entries: Vec<(String, String)>,
    cart_view_open: bool,
    success_visible: bool,
    max_error_visible: bool,
    network_error_visible: bool,
    wishlist_confirmation_visible: bool,
    storage: PageStorage,
    interceptor: Option<Interceptor>,
}

impl MockDriver {
    /// Create a mock page for a fixture, using the default selector map
    /// and default page state (in stock, on sale, reviews, related cards).
    #[must_use]
    pub fn new(fixture: &ProductFixture) -> Self {
        Self::with_state(fixture, MockPageState::default())
    }

    /// Create a mock page with explicit page state
    #[must_use]
    pub fn with_state(fixture: &ProductFixture, state: MockPageState) -> Self {
        Self {
            selectors: SelectorMap::default(),
            fixture: fixture.clone(),
            state,
            loaded: false,
            current_url: String::new(),
            quantity: fixture.default_quantity.clone(),
            selected_variant: fixture.available_variants.first().cloned().unwrap_or_default(),
            cart_count: fixture.initial_cart_count,
            cart_entries: Vec::new(),
            cart_view_open: false,
            success_visible: false,
            max_error_visible: false,
            network_error_visible: false,
            wishlist_confirmation_visible: false,
            storage: PageStorage::default(),
            interceptor: None,
        }
    }

    /// Create a mock page for an out-of-stock product
    #[must_use]
    pub fn out_of_stock(fixture: &ProductFixture) -> Self {
        Self::with_state(
            fixture,
            MockPageState {
                out_of_stock: true,
                ..MockPageState::default()
            },
        )
    }

    fn resolve(&self, locator: &Locator) -> VitrinaResult<Element> {
        let s = &self.selectors;
        let element = match locator {
            l if l == &s.product_card => Element::ProductCard,
            l if l == &s.product_image => Element::ProductImage,
            l if l == &s.quantity_input => Element::QuantityInput,
            l if l == &s.add_to_cart_button => Element::AddToCartButton,
            l if l == &s.add_to_cart_success_message => Element::AddToCartSuccessMessage,
            l if l == &s.cart_count => Element::CartCount,
            l if l == &s.view_cart_button => Element::ViewCartButton,
            l if l == &s.cart_items => Element::CartItems,
            l if l == &s.out_of_stock_message => Element::OutOfStockMessage,
            l if l == &s.original_price => Element::OriginalPrice,
            l if l == &s.discount_price => Element::DiscountPrice,
            l if l == &s.variant_selector => Element::VariantSelector,
            l if l == &s.reviews_section => Element::ReviewsSection,
            l if l == &s.average_rating => Element::AverageRating,
            l if l == &s.review_count => Element::ReviewCount,
            l if l == &s.max_quantity_error => Element::MaxQuantityError,
            l if l == &s.related_products_section => Element::RelatedProductsSection,
            l if l == &s.related_product_card => Element::RelatedProductCard,
            l if l == &s.wishlist_button => Element::WishlistButton,
            l if l == &s.wishlist_confirmation => Element::WishlistConfirmation,
            l if l == &s.product_specs => Element::ProductSpecs,
            l if l == &s.network_error_message => Element::NetworkErrorMessage,
            other => {
                return Err(VitrinaError::Page {
                    message: format!("unknown locator '{other}'"),
                })
            }
        };
        Ok(element)
    }

    /// Load-time widget behavior: restore persisted quantity and variant,
    /// clear transient indicators.
    fn render(&mut self) {
        self.loaded = true;
        self.quantity = self
            .storage
            .quantity
            .clone()
            .unwrap_or_else(|| self.fixture.default_quantity.clone());
        self.selected_variant = self.storage.variant.clone().unwrap_or_else(|| {
            self.fixture.available_variants.first().cloned().unwrap_or_default()
        });
        self.cart_view_open = false;
        self.success_visible = false;
        self.max_error_visible = false;
        self.network_error_visible = false;
        self.wishlist_confirmation_visible = false;
    }

    /// Quantity commit semantics on blur:
    /// positive integers verbatim (clamped to the max with an error
    /// indicator), decimals only when the fixture allows them, anything
    /// else resets to the default. Zero counts as invalid.
    fn commit_quantity(&mut self, raw: &str) {
        let trimmed = raw.trim();
        let committed = match trimmed.parse::<u32>() {
            Ok(n) if n > self.fixture.max_quantity => {
                self.max_error_visible = true;
                self.fixture.max_quantity.to_string()
            }
            Ok(n) if n >= 1 => {
                self.max_error_visible = false;
                trimmed.to_string()
            }
            _ => {
                let decimal = if self.fixture.allow_decimal_quantities {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && *v > 0.0)
                } else {
                    None
                };
                match decimal {
                    // The clamp bound applies to decimals too.
                    Some(v) if v > f64::from(self.fixture.max_quantity) => {
                        self.max_error_visible = true;
                        self.fixture.max_quantity.to_string()
                    }
                    Some(_) => {
                        self.max_error_visible = false;
                        trimmed.to_string()
                    }
                    None => {
                        self.max_error_visible = false;
                        self.fixture.default_quantity.clone()
                    }
                }
            }
        };
        self.quantity = committed.clone();
        self.storage.quantity = Some(committed);
    }

    /// The add-to-cart network call, routed through the interception
    /// engine exactly like a real request would be.
    fn post_to_cart(&mut self) {
        let url = format!(
            "{}{}",
            self.current_url.trim_end_matches('/'),
            CART_ENDPOINT
        );
        let action = self
            .interceptor
            .as_ref()
            .map_or(InterceptAction::Continue, |i| {
                i.decide(&url, &HttpMethod::Post)
            });
        match action {
            InterceptAction::Fail(_) => {
                self.network_error_visible = true;
            }
            InterceptAction::Continue => {
                self.cart_count += 1;
                self.success_visible = true;
                self.cart_entries
                    .push((self.fixture.product_name.clone(), self.quantity.clone()));
            }
        }
    }

    fn require_loaded(&self) -> VitrinaResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(VitrinaError::Page {
                message: "page not loaded".to_string(),
            })
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> VitrinaResult<()> {
        if url.trim().is_empty() {
            return Err(VitrinaError::Navigation {
                url: url.to_string(),
                message: "empty URL".to_string(),
            });
        }
        self.current_url = url.to_string();
        self.render();
        Ok(())
    }

    async fn reload(&mut self) -> VitrinaResult<()> {
        self.require_loaded()?;
        self.render();
        Ok(())
    }

    async fn current_url(&self) -> VitrinaResult<String> {
        Ok(self.current_url.clone())
    }

    async fn is_visible(&self, locator: &Locator) -> VitrinaResult<bool> {
        self.require_loaded()?;
        let visible = match self.resolve(locator)? {
            Element::ProductCard
            | Element::ProductImage
            | Element::QuantityInput
            | Element::AddToCartButton
            | Element::ViewCartButton
            | Element::WishlistButton
            | Element::VariantSelector
            | Element::CartCount
            | Element::ProductSpecs => true,
            Element::AddToCartSuccessMessage => self.success_visible,
            Element::CartItems => self.cart_view_open,
            Element::OutOfStockMessage => self.state.out_of_stock,
            Element::OriginalPrice | Element::DiscountPrice => self.state.on_sale,
            Element::ReviewsSection | Element::AverageRating | Element::ReviewCount => {
                self.state.has_reviews
            }
            Element::MaxQuantityError => self.max_error_visible,
            Element::RelatedProductsSection | Element::RelatedProductCard => {
                self.state.related_count > 0
            }
            Element::WishlistConfirmation => self.wishlist_confirmation_visible,
            Element::NetworkErrorMessage => self.network_error_visible,
        };
        Ok(visible)
    }

    async fn text_of(&self, locator: &Locator) -> VitrinaResult<Option<String>> {
        self.require_loaded()?;
        let text = match self.resolve(locator)? {
            Element::ProductCard => Some(format!(
                "{} {} {}",
                self.fixture.product_name,
                self.fixture.product_description,
                self.fixture.product_price
            )),
            Element::CartCount => Some(self.cart_count.to_string()),
            Element::CartItems => {
                if self.cart_view_open {
                    Some(
                        self.cart_entries
                            .iter()
                            .map(|(name, qty)| format!("{name} Quantity: {qty}"))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    )
                } else {
                    None
                }
            }
            Element::OutOfStockMessage => self
                .state
                .out_of_stock
                .then(|| "Out of stock".to_string()),
            Element::OriginalPrice => self.state.on_sale.then(|| "$24.99".to_string()),
            Element::DiscountPrice => self
                .state
                .on_sale
                .then(|| self.fixture.product_price.clone()),
            Element::AverageRating => self.state.has_reviews.then(|| "4.6".to_string()),
            Element::ReviewCount => self.state.has_reviews.then(|| "128 reviews".to_string()),
            Element::ProductSpecs => {
                Some("Dimensions: 12 x 8 x 3 cm Weight: 240 g".to_string())
            }
            Element::AddToCartSuccessMessage => self
                .success_visible
                .then(|| "Added to cart".to_string()),
            Element::NetworkErrorMessage => self
                .network_error_visible
                .then(|| "Something went wrong. Please try again.".to_string()),
            Element::MaxQuantityError => self.max_error_visible.then(|| {
                format!("Maximum quantity is {}", self.fixture.max_quantity)
            }),
            Element::WishlistConfirmation => self
                .wishlist_confirmation_visible
                .then(|| "Saved to wishlist".to_string()),
            _ => None,
        };
        Ok(text)
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> VitrinaResult<Option<String>> {
        self.require_loaded()?;
        let value = match (self.resolve(locator)?, name) {
            (Element::ProductImage, "alt") => Some(self.fixture.product_name.clone()),
            (Element::ProductImage, "src") => Some("/images/widget.png".to_string()),
            _ => None,
        };
        Ok(value)
    }

    async fn value_of(&self, locator: &Locator) -> VitrinaResult<Option<String>> {
        self.require_loaded()?;
        let value = match self.resolve(locator)? {
            Element::QuantityInput => Some(self.quantity.clone()),
            Element::VariantSelector => Some(self.selected_variant.clone()),
            _ => None,
        };
        Ok(value)
    }

    async fn count(&self, locator: &Locator) -> VitrinaResult<usize> {
        self.require_loaded()?;
        let count = match self.resolve(locator)? {
            Element::RelatedProductCard => self.state.related_count,
            Element::CartItems => usize::from(self.cart_view_open),
            _ => 1,
        };
        Ok(count)
    }

    async fn is_disabled(&self, locator: &Locator) -> VitrinaResult<bool> {
        self.require_loaded()?;
        Ok(match self.resolve(locator)? {
            Element::AddToCartButton => self.state.out_of_stock,
            _ => false,
        })
    }

    async fn is_struck_through(&self, locator: &Locator) -> VitrinaResult<bool> {
        self.require_loaded()?;
        Ok(matches!(self.resolve(locator)?, Element::OriginalPrice) && self.state.on_sale)
    }

    async fn click(&mut self, locator: &Locator) -> VitrinaResult<()> {
        self.require_loaded()?;
        match self.resolve(locator)? {
            Element::AddToCartButton => {
                // Disabled control swallows the click, like a real button.
                if !self.state.out_of_stock {
                    self.post_to_cart();
                }
            }
            Element::ViewCartButton => self.cart_view_open = true,
            Element::WishlistButton => self.wishlist_confirmation_visible = true,
            _ => {}
        }
        Ok(())
    }

    async fn set_value(&mut self, locator: &Locator, text: &str) -> VitrinaResult<()> {
        self.require_loaded()?;
        match self.resolve(locator)? {
            Element::QuantityInput => {
                self.commit_quantity(text);
                Ok(())
            }
            other => Err(VitrinaError::Page {
                message: format!("cannot type into {other:?}"),
            }),
        }
    }

    async fn select_option(&mut self, locator: &Locator, value: &str) -> VitrinaResult<()> {
        self.require_loaded()?;
        match self.resolve(locator)? {
            Element::VariantSelector => {
                if self.fixture.available_variants.iter().any(|v| v == value) {
                    self.selected_variant = value.to_string();
                    self.storage.variant = Some(value.to_string());
                    Ok(())
                } else {
                    Err(VitrinaError::Page {
                        message: format!("option '{value}' not found in variant selector"),
                    })
                }
            }
            other => Err(VitrinaError::Page {
                message: format!("cannot select from {other:?}"),
            }),
        }
    }

    async fn install_interception(
        &mut self,
        rules: Vec<InterceptRule>,
    ) -> VitrinaResult<InterceptHandle> {
        let interceptor = Interceptor::new(rules);
        let handle = interceptor.handle();
        self.interceptor = Some(interceptor);
        Ok(handle)
    }

    async fn close(&mut self) -> VitrinaResult<()> {
        self.loaded = false;
        self.interceptor = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{FailureKind, UrlPattern};

    fn loaded_driver() -> MockDriver {
        let fixture = ProductFixture::widget();
        let mut driver = MockDriver::new(&fixture);
        futures_block(driver.navigate(&fixture.product_page_url)).unwrap();
        driver
    }

    // The mock's probes are async only to satisfy the driver trait;
    // they resolve immediately, so a minimal block_on suffices here.
    fn futures_block<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }

    #[test]
    fn test_quantity_commit_integer_verbatim() {
        let mut driver = loaded_driver();
        driver.commit_quantity("5");
        assert_eq!(driver.quantity, "5");
        assert!(!driver.max_error_visible);
    }

    #[test]
    fn test_quantity_commit_invalid_resets_to_default() {
        let mut driver = loaded_driver();
        driver.commit_quantity("abc");
        assert_eq!(driver.quantity, "1");
    }

    #[test]
    fn test_quantity_commit_decimal_rejected_when_not_allowed() {
        let mut driver = loaded_driver();
        driver.commit_quantity("2.5");
        assert_eq!(driver.quantity, "1");
    }

    #[test]
    fn test_quantity_commit_decimal_accepted_when_allowed() {
        let mut fixture = ProductFixture::widget();
        fixture.allow_decimal_quantities = true;
        let mut driver = MockDriver::new(&fixture);
        futures_block(driver.navigate(&fixture.product_page_url)).unwrap();
        driver.commit_quantity("2.5");
        assert_eq!(driver.quantity, "2.5");
    }

    #[test]
    fn test_quantity_commit_decimal_above_max_clamps() {
        let mut fixture = ProductFixture::widget();
        fixture.allow_decimal_quantities = true;
        let mut driver = MockDriver::new(&fixture);
        futures_block(driver.navigate(&fixture.product_page_url)).unwrap();
        driver.commit_quantity("99.5");
        assert_eq!(driver.quantity, "10");
        assert!(driver.max_error_visible);
    }

    #[test]
    fn test_quantity_commit_zero_resets_to_default() {
        let mut driver = loaded_driver();
        driver.commit_quantity("0");
        assert_eq!(driver.quantity, "1");
        assert!(!driver.max_error_visible);
    }

    #[test]
    fn test_quantity_commit_clamps_over_max() {
        let mut driver = loaded_driver();
        driver.commit_quantity("11");
        assert_eq!(driver.quantity, "10");
        assert!(driver.max_error_visible);
    }

    #[test]
    fn test_add_to_cart_increments_counter() {
        let mut driver = loaded_driver();
        driver.post_to_cart();
        driver.post_to_cart();
        assert_eq!(driver.cart_count, 2);
        assert!(driver.success_visible);
    }

    #[test]
    fn test_forced_failure_leaves_counter_unchanged() {
        let mut driver = loaded_driver();
        futures_block(driver.install_interception(vec![InterceptRule::fail(
            HttpMethod::Post,
            UrlPattern::Contains(CART_ENDPOINT.to_string()),
            FailureKind::Failed,
        )]))
        .unwrap();
        driver.post_to_cart();
        assert_eq!(driver.cart_count, 0);
        assert!(driver.network_error_visible);
        assert!(!driver.success_visible);
    }

    #[test]
    fn test_reload_restores_persisted_quantity_and_variant() {
        let mut driver = loaded_driver();
        driver.commit_quantity("2");
        futures_block(driver.select_option(
            &SelectorMap::default().variant_selector,
            "Medium",
        ))
        .unwrap();
        futures_block(driver.reload()).unwrap();
        assert_eq!(driver.quantity, "2");
        assert_eq!(driver.selected_variant, "Medium");
    }

    #[test]
    fn test_reload_clears_transient_indicators() {
        let mut driver = loaded_driver();
        driver.post_to_cart();
        assert!(driver.success_visible);
        futures_block(driver.reload()).unwrap();
        assert!(!driver.success_visible);
        // Cart count survives: it lives in the cart, not the page.
        assert_eq!(driver.cart_count, 1);
    }

    #[test]
    fn test_out_of_stock_click_is_swallowed() {
        let fixture = ProductFixture::widget();
        let mut driver = MockDriver::out_of_stock(&fixture);
        futures_block(driver.navigate(&fixture.product_page_url)).unwrap();
        futures_block(driver.click(&SelectorMap::default().add_to_cart_button)).unwrap();
        assert_eq!(driver.cart_count, 0);
    }

    #[test]
    fn test_specs_text_lists_dimensions_and_weight() {
        let driver = loaded_driver();
        let text = futures_block(driver.text_of(&SelectorMap::default().product_specs))
            .unwrap()
            .unwrap();
        assert!(text.contains("Dimensions"), "specs text was: {text}");
        assert!(text.contains("Weight"), "specs text was: {text}");
    }

    #[test]
    fn test_unknown_locator_is_page_error() {
        let driver = loaded_driver();
        let err = futures_block(driver.is_visible(&Locator::new("#nope"))).unwrap_err();
        assert!(matches!(err, VitrinaError::Page { .. }));
    }
}
