//! Page object over the product-card widget.
//!
//! [`ProductPage`] owns a [`PageDriver`], the [`SelectorMap`], and the
//! wait policy for one scenario. Every `expect_*` helper is a bounded
//! poll: it retries the probe until the condition holds or the timeout
//! elapses, then fails the scenario with the expected/observed pair.

use crate::driver::PageDriver;
use crate::network::{InterceptHandle, InterceptRule};
use crate::result::{VitrinaError, VitrinaResult};
use crate::selectors::{Locator, SelectorMap};
use crate::wait::{poll_until, WaitOptions};

/// Driver-agnostic handle on the product-card page for one scenario
pub struct ProductPage {
    driver: Box<dyn PageDriver>,
    selectors: SelectorMap,
    wait: WaitOptions,
    scenario: String,
}

impl ProductPage {
    /// Wrap a driver with a selector map and wait policy
    #[must_use]
    pub fn new(driver: Box<dyn PageDriver>, selectors: SelectorMap, wait: WaitOptions) -> Self {
        Self {
            driver,
            selectors,
            wait,
            scenario: String::new(),
        }
    }

    /// Name scenario failures are attributed to
    pub fn set_scenario(&mut self, name: impl Into<String>) {
        self.scenario = name.into();
    }

    /// Selector map in use
    #[must_use]
    pub fn selectors(&self) -> &SelectorMap {
        &self.selectors
    }

    fn assertion(&self, expected: impl Into<String>, observed: impl Into<String>) -> VitrinaError {
        VitrinaError::assertion(self.scenario.clone(), expected, observed)
    }

    // -- navigation --------------------------------------------------

    /// Navigate to the product page and wait for the card to render
    pub async fn open(&mut self, url: &str) -> VitrinaResult<()> {
        self.driver.navigate(url).await?;
        let card = self.selectors.product_card.clone();
        self.expect_visible("product card", &card).await
    }

    /// Reload the page and wait for the card to render again
    pub async fn reload(&mut self) -> VitrinaResult<()> {
        self.driver.reload().await?;
        let card = self.selectors.product_card.clone();
        self.expect_visible("product card", &card).await
    }

    // -- actions -----------------------------------------------------

    /// Clear the quantity input, type a value, and commit it (blur)
    pub async fn set_quantity(&mut self, value: &str) -> VitrinaResult<()> {
        let input = self.selectors.quantity_input.clone();
        self.driver.set_value(&input, value).await
    }

    /// Click the add-to-cart button
    pub async fn add_to_cart(&mut self) -> VitrinaResult<()> {
        let button = self.selectors.add_to_cart_button.clone();
        self.driver.click(&button).await
    }

    /// Open the cart view
    pub async fn view_cart(&mut self) -> VitrinaResult<()> {
        let button = self.selectors.view_cart_button.clone();
        self.driver.click(&button).await
    }

    /// Click the wishlist button
    pub async fn add_to_wishlist(&mut self) -> VitrinaResult<()> {
        let button = self.selectors.wishlist_button.clone();
        self.driver.click(&button).await
    }

    /// Pick a variant from the selector by value or label
    pub async fn select_variant(&mut self, variant: &str) -> VitrinaResult<()> {
        let select = self.selectors.variant_selector.clone();
        self.driver.select_option(&select, variant).await
    }

    /// Install request interception rules on the page
    pub async fn intercept(&mut self, rules: Vec<InterceptRule>) -> VitrinaResult<InterceptHandle> {
        self.driver.install_interception(rules).await
    }

    /// Release the underlying page
    pub async fn close(&mut self) -> VitrinaResult<()> {
        self.driver.close().await
    }

    // -- probes ------------------------------------------------------

    /// Committed value of the quantity input
    pub async fn quantity_value(&self) -> VitrinaResult<String> {
        let input = &self.selectors.quantity_input;
        Ok(self.driver.value_of(input).await?.unwrap_or_default())
    }

    /// Currently selected variant value
    pub async fn variant_value(&self) -> VitrinaResult<String> {
        let select = &self.selectors.variant_selector;
        Ok(self.driver.value_of(select).await?.unwrap_or_default())
    }

    /// Cart badge count, parsed
    pub async fn cart_count(&self) -> VitrinaResult<u32> {
        let badge = &self.selectors.cart_count;
        let text = self.driver.text_of(badge).await?.unwrap_or_default();
        text.trim().parse().map_err(|_| VitrinaError::Page {
            message: format!("cart count '{text}' is not a number"),
        })
    }

    // -- bounded-wait assertions -------------------------------------

    /// Assert the element becomes visible within the wait budget
    pub async fn expect_visible(&self, what: &str, locator: &Locator) -> VitrinaResult<()> {
        let outcome = poll_until(self.wait, what, || async move {
            self.driver.is_visible(locator).await
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(VitrinaError::Timeout { ms }) => Err(self.assertion(
                format!("{what} ({locator}) visible"),
                format!("still hidden after {ms}ms"),
            )),
            Err(other) => Err(other),
        }
    }

    /// Assert the element stays (or becomes) hidden
    pub async fn expect_hidden(&self, what: &str, locator: &Locator) -> VitrinaResult<()> {
        if self.driver.is_visible(locator).await? {
            return Err(self.assertion(format!("{what} ({locator}) hidden"), "visible"));
        }
        Ok(())
    }

    /// Assert the element's text contains a fragment within the budget
    pub async fn expect_text(
        &self,
        what: &str,
        locator: &Locator,
        fragment: &str,
    ) -> VitrinaResult<()> {
        let outcome = poll_until(self.wait, what, || async move {
            Ok(self
                .driver
                .text_of(locator)
                .await?
                .is_some_and(|t| t.contains(fragment)))
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(VitrinaError::Timeout { .. }) => {
                let observed = self.driver.text_of(locator).await?.unwrap_or_default();
                Err(self.assertion(
                    format!("{what} text containing '{fragment}'"),
                    format!("'{observed}'"),
                ))
            }
            Err(other) => Err(other),
        }
    }

    /// Assert the input's committed value equals `expected` within the budget
    pub async fn expect_value(
        &self,
        what: &str,
        locator: &Locator,
        expected: &str,
    ) -> VitrinaResult<()> {
        let outcome = poll_until(self.wait, what, || async move {
            Ok(self.driver.value_of(locator).await?.as_deref() == Some(expected))
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(VitrinaError::Timeout { .. }) => {
                let observed = self.driver.value_of(locator).await?.unwrap_or_default();
                Err(self.assertion(
                    format!("{what} value '{expected}'"),
                    format!("'{observed}'"),
                ))
            }
            Err(other) => Err(other),
        }
    }

    /// Assert the cart badge shows exactly `expected`
    pub async fn expect_cart_count(&self, expected: u32) -> VitrinaResult<()> {
        let badge = self.selectors.cart_count.clone();
        self.expect_text("cart count", &badge, &expected.to_string())
            .await?;
        let observed = self.cart_count().await?;
        if observed == expected {
            Ok(())
        } else {
            Err(self.assertion(
                format!("cart count {expected}"),
                observed.to_string(),
            ))
        }
    }

    /// Assert at least `minimum` matching elements exist within the budget
    pub async fn expect_count_at_least(
        &self,
        what: &str,
        locator: &Locator,
        minimum: usize,
    ) -> VitrinaResult<()> {
        let outcome = poll_until(self.wait, what, || async move {
            Ok(self.driver.count(locator).await? >= minimum)
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(VitrinaError::Timeout { .. }) => {
                let observed = self.driver.count(locator).await?;
                Err(self.assertion(
                    format!("at least {minimum} {what}"),
                    observed.to_string(),
                ))
            }
            Err(other) => Err(other),
        }
    }

    /// Assert the element carries an attribute with the given value
    /// within the budget
    pub async fn expect_attribute(
        &self,
        what: &str,
        locator: &Locator,
        name: &str,
        expected: &str,
    ) -> VitrinaResult<()> {
        let outcome = poll_until(self.wait, what, || async move {
            Ok(self.driver.attribute(locator, name).await?.as_deref() == Some(expected))
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(VitrinaError::Timeout { .. }) => {
                let observed = self.driver.attribute(locator, name).await?;
                Err(self.assertion(
                    format!("{what} [{name}='{expected}']"),
                    format!("{observed:?}"),
                ))
            }
            Err(other) => Err(other),
        }
    }

    /// Assert the control becomes disabled within the budget
    pub async fn expect_disabled(&self, what: &str, locator: &Locator) -> VitrinaResult<()> {
        let outcome = poll_until(self.wait, what, || async move {
            self.driver.is_disabled(locator).await
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(VitrinaError::Timeout { .. }) => {
                Err(self.assertion(format!("{what} disabled"), "enabled"))
            }
            Err(other) => Err(other),
        }
    }

    /// Assert the element renders with strike-through styling within the budget
    pub async fn expect_struck_through(&self, what: &str, locator: &Locator) -> VitrinaResult<()> {
        let outcome = poll_until(self.wait, what, || async move {
            self.driver.is_struck_through(locator).await
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(VitrinaError::Timeout { .. }) => Err(self.assertion(
                format!("{what} struck through"),
                "no line-through decoration",
            )),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::ProductFixture;
    use crate::mock::MockDriver;
    use crate::wait::WaitOptions;

    fn page(fixture: &ProductFixture) -> ProductPage {
        let driver = MockDriver::new(fixture);
        let wait = WaitOptions::default().with_timeout(200).with_poll_interval(10);
        let mut page = ProductPage::new(Box::new(driver), SelectorMap::default(), wait);
        page.set_scenario("page object test");
        page
    }

    #[tokio::test]
    async fn test_open_waits_for_card() {
        let fixture = ProductFixture::widget();
        let mut page = page(&fixture);
        page.open(&fixture.product_page_url).await.unwrap();
        let card = page.selectors().product_card.clone();
        page.expect_visible("product card", &card).await.unwrap();
    }

    #[tokio::test]
    async fn test_expect_value_reports_observed_on_failure() {
        let fixture = ProductFixture::widget();
        let mut page = page(&fixture);
        page.open(&fixture.product_page_url).await.unwrap();
        let input = page.selectors().quantity_input.clone();
        let err = page
            .expect_value("quantity input", &input, "7")
            .await
            .unwrap_err();
        match err {
            VitrinaError::AssertionFailed { observed, .. } => {
                assert!(observed.contains('1'), "observed was {observed}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_expect_cart_count_matches_badge() {
        let fixture = ProductFixture::widget();
        let mut page = page(&fixture);
        page.open(&fixture.product_page_url).await.unwrap();
        page.add_to_cart().await.unwrap();
        page.expect_cart_count(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_expect_disabled_passes_on_out_of_stock_page() {
        let fixture = ProductFixture::widget();
        let driver = MockDriver::out_of_stock(&fixture);
        let wait = WaitOptions::default().with_timeout(200).with_poll_interval(10);
        let mut page = ProductPage::new(Box::new(driver), SelectorMap::default(), wait);
        page.set_scenario("page object test");
        page.open(&fixture.product_page_url).await.unwrap();
        let button = page.selectors().add_to_cart_button.clone();
        page.expect_disabled("add-to-cart button", &button)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expect_disabled_reports_enabled_after_wait() {
        let fixture = ProductFixture::widget();
        let mut page = page(&fixture);
        page.open(&fixture.product_page_url).await.unwrap();
        let button = page.selectors().add_to_cart_button.clone();
        let err = page
            .expect_disabled("add-to-cart button", &button)
            .await
            .unwrap_err();
        match err {
            VitrinaError::AssertionFailed { observed, .. } => assert_eq!(observed, "enabled"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_expect_attribute_reports_observed_after_wait() {
        let fixture = ProductFixture::widget();
        let mut page = page(&fixture);
        page.open(&fixture.product_page_url).await.unwrap();
        let image = page.selectors().product_image.clone();
        let err = page
            .expect_attribute("product image", &image, "alt", "Sprocket")
            .await
            .unwrap_err();
        match err {
            VitrinaError::AssertionFailed { observed, .. } => {
                assert!(observed.contains("Widget"), "observed was {observed}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_expect_hidden_passes_for_absent_indicator() {
        let fixture = ProductFixture::widget();
        let mut page = page(&fixture);
        page.open(&fixture.product_page_url).await.unwrap();
        let error = page.selectors().network_error_message.clone();
        page.expect_hidden("network error", &error).await.unwrap();
    }
}
