//! The product-card scenario suite.
//!
//! Each scenario is a free async fn over a [`ScenarioContext`]; [`suite`]
//! collects them in run order. Bodies only touch the page through the
//! page object, so they run unchanged against the mock page and a real
//! browser.

use crate::fixture::CART_ENDPOINT;
use crate::network::{FailureKind, HttpMethod, InterceptRule, UrlPattern};
use crate::result::{VitrinaError, VitrinaResult};
use crate::scenario::{Scenario, ScenarioContext};

/// All product-card scenarios in run order
#[must_use]
pub fn suite() -> Vec<Scenario> {
    vec![
        Scenario::new("displays product information", |ctx| {
            Box::pin(displays_product_information(ctx))
        }),
        Scenario::new("accepts a valid integer quantity", |ctx| {
            Box::pin(accepts_valid_integer_quantity(ctx))
        }),
        Scenario::new("applies the decimal quantity policy", |ctx| {
            Box::pin(applies_decimal_quantity_policy(ctx))
        }),
        Scenario::new("resets invalid quantity input to the default", |ctx| {
            Box::pin(resets_invalid_quantity(ctx))
        }),
        Scenario::new("clamps quantity above the maximum", |ctx| {
            Box::pin(clamps_quantity_above_maximum(ctx))
        }),
        Scenario::new("adds the product to the cart", |ctx| {
            Box::pin(adds_product_to_cart(ctx))
        }),
        Scenario::new("shows the chosen quantity in the cart", |ctx| {
            Box::pin(shows_chosen_quantity_in_cart(ctx))
        }),
        Scenario::new("shows the out-of-stock state", |ctx| {
            Box::pin(shows_out_of_stock_state(ctx))
        }),
        Scenario::new("shows sale pricing", |ctx| Box::pin(shows_sale_pricing(ctx))),
        Scenario::new("selects a product variant", |ctx| {
            Box::pin(selects_product_variant(ctx))
        }),
        Scenario::new("shows customer reviews", |ctx| {
            Box::pin(shows_customer_reviews(ctx))
        }),
        Scenario::new("keeps quantity and variant across a reload", |ctx| {
            Box::pin(keeps_state_across_reload(ctx))
        }),
        Scenario::new("shows related products", |ctx| {
            Box::pin(shows_related_products(ctx))
        }),
        Scenario::new("adds the product to the wishlist", |ctx| {
            Box::pin(adds_product_to_wishlist(ctx))
        }),
        Scenario::new("shows product specifications", |ctx| {
            Box::pin(shows_product_specifications(ctx))
        }),
        Scenario::new("surfaces a failed cart request", |ctx| {
            Box::pin(surfaces_failed_cart_request(ctx))
        }),
    ]
}

async fn displays_product_information(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    ctx.page
        .expect_visible("product card", &selectors.product_card)
        .await?;
    ctx.page
        .expect_text("product card", &selectors.product_card, &ctx.fixture.product_name)
        .await?;
    ctx.page
        .expect_text(
            "product card",
            &selectors.product_card,
            &ctx.fixture.product_description,
        )
        .await?;
    ctx.page
        .expect_text(
            "product card",
            &selectors.product_card,
            &ctx.fixture.product_price,
        )
        .await?;
    ctx.page
        .expect_visible("product image", &selectors.product_image)
        .await?;
    ctx.page
        .expect_attribute(
            "product image",
            &selectors.product_image,
            "alt",
            &ctx.fixture.product_name,
        )
        .await
}

async fn accepts_valid_integer_quantity(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let input = ctx.page.selectors().quantity_input.clone();
    let quantity = ctx.fixture.valid_integer_quantity.clone();
    ctx.page.set_quantity(&quantity).await?;
    ctx.page
        .expect_value("quantity input", &input, &quantity)
        .await
}

/// Decimal input is accepted verbatim or reset to the default; the
/// fixture decides which contract the widget is under.
async fn applies_decimal_quantity_policy(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let input = ctx.page.selectors().quantity_input.clone();
    let decimal = ctx.fixture.valid_decimal_quantity.clone();
    ctx.page.set_quantity(&decimal).await?;
    let expected = if ctx.fixture.allow_decimal_quantities {
        decimal
    } else {
        ctx.fixture.default_quantity.clone()
    };
    ctx.page
        .expect_value("quantity input", &input, &expected)
        .await
}

async fn resets_invalid_quantity(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let input = ctx.page.selectors().quantity_input.clone();
    let invalid = ctx.fixture.invalid_quantity.clone();
    let default = ctx.fixture.default_quantity.clone();
    ctx.page.set_quantity(&invalid).await?;
    ctx.page
        .expect_value("quantity input", &input, &default)
        .await
}

async fn clamps_quantity_above_maximum(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    let over_max = ctx.fixture.over_max_quantity();
    let max = ctx.fixture.max_quantity.to_string();
    ctx.page.set_quantity(&over_max).await?;
    ctx.page
        .expect_value("quantity input", &selectors.quantity_input, &max)
        .await?;
    ctx.page
        .expect_visible("max quantity error", &selectors.max_quantity_error)
        .await
}

async fn adds_product_to_cart(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    let expected_count = ctx.fixture.initial_cart_count + 1;
    ctx.page.add_to_cart().await?;
    ctx.page
        .expect_visible("success message", &selectors.add_to_cart_success_message)
        .await?;
    ctx.page.expect_cart_count(expected_count).await
}

async fn shows_chosen_quantity_in_cart(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    let quantity = ctx.fixture.valid_integer_quantity.clone();
    ctx.page.set_quantity(&quantity).await?;
    ctx.page.add_to_cart().await?;
    ctx.page.view_cart().await?;
    ctx.page
        .expect_visible("cart items", &selectors.cart_items)
        .await?;
    ctx.page
        .expect_text(
            "cart items",
            &selectors.cart_items,
            &format!("Quantity: {quantity}"),
        )
        .await?;
    ctx.page
        .expect_text("cart items", &selectors.cart_items, &ctx.fixture.product_name)
        .await
}

/// Requires the page to already be in the out-of-stock state; how that
/// state gets established is up to the run (backend fixture, mock state).
async fn shows_out_of_stock_state(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    ctx.page
        .expect_visible("out-of-stock message", &selectors.out_of_stock_message)
        .await?;
    ctx.page
        .expect_disabled("add-to-cart button", &selectors.add_to_cart_button)
        .await
}

async fn shows_sale_pricing(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    ctx.page
        .expect_visible("original price", &selectors.original_price)
        .await?;
    ctx.page
        .expect_struck_through("original price", &selectors.original_price)
        .await?;
    ctx.page
        .expect_visible("discount price", &selectors.discount_price)
        .await
}

async fn selects_product_variant(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let select = ctx.page.selectors().variant_selector.clone();
    let variant = ctx
        .fixture
        .second_variant()
        .ok_or_else(|| VitrinaError::Fixture {
            message: "fixture needs at least two variants".to_string(),
        })?
        .to_string();
    ctx.page.select_variant(&variant).await?;
    ctx.page
        .expect_value("variant selector", &select, &variant)
        .await
}

async fn shows_customer_reviews(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    ctx.page
        .expect_visible("reviews section", &selectors.reviews_section)
        .await?;
    ctx.page
        .expect_visible("average rating", &selectors.average_rating)
        .await?;
    ctx.page
        .expect_visible("review count", &selectors.review_count)
        .await
}

async fn keeps_state_across_reload(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    let quantity = ctx.fixture.valid_integer_quantity.clone();
    let variant = ctx
        .fixture
        .second_variant()
        .ok_or_else(|| VitrinaError::Fixture {
            message: "fixture needs at least two variants".to_string(),
        })?
        .to_string();

    ctx.page.set_quantity(&quantity).await?;
    ctx.page.select_variant(&variant).await?;
    ctx.page.reload().await?;

    ctx.page
        .expect_value("quantity input", &selectors.quantity_input, &quantity)
        .await?;
    ctx.page
        .expect_value("variant selector", &selectors.variant_selector, &variant)
        .await
}

async fn shows_related_products(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    ctx.page
        .expect_visible("related products section", &selectors.related_products_section)
        .await?;
    ctx.page
        .expect_count_at_least("related product cards", &selectors.related_product_card, 1)
        .await
}

async fn adds_product_to_wishlist(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let confirmation = ctx.page.selectors().wishlist_confirmation.clone();
    ctx.page.add_to_wishlist().await?;
    ctx.page
        .expect_visible("wishlist confirmation", &confirmation)
        .await
}

async fn shows_product_specifications(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let specs = ctx.page.selectors().product_specs.clone();
    ctx.page.expect_visible("product specs", &specs).await?;
    ctx.page
        .expect_text("product specs", &specs, "Dimensions")
        .await?;
    ctx.page.expect_text("product specs", &specs, "Weight").await
}

/// Force the cart request to fail at the network level and check the
/// widget surfaces the error without touching the cart count.
async fn surfaces_failed_cart_request(ctx: &mut ScenarioContext) -> VitrinaResult<()> {
    let selectors = ctx.page.selectors().clone();
    let initial_count = ctx.fixture.initial_cart_count;

    let handle = ctx
        .page
        .intercept(vec![InterceptRule::fail(
            HttpMethod::Post,
            UrlPattern::Contains(CART_ENDPOINT.to_string()),
            FailureKind::Failed,
        )])
        .await?;

    ctx.page.add_to_cart().await?;
    handle
        .wait_for_attempt(std::time::Duration::from_secs(4))
        .await?;
    ctx.page
        .expect_visible("network error message", &selectors.network_error_message)
        .await?;
    ctx.page
        .expect_hidden("success message", &selectors.add_to_cart_success_message)
        .await?;
    ctx.page.expect_cart_count(initial_count).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_covers_all_scenarios() {
        let scenarios = suite();
        assert_eq!(scenarios.len(), 16);
    }

    #[test]
    fn test_scenario_names_are_unique() {
        let scenarios = suite();
        let mut names: Vec<_> = scenarios.iter().map(Scenario::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), scenarios.len());
    }
}
