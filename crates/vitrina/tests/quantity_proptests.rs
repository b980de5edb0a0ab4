//! Property-based tests for the quantity commit rules.
//!
//! The widget contract: integers within range are kept verbatim,
//! integers above the maximum clamp to it, decimals follow the fixture
//! policy, and anything unparseable resets to the default.

use proptest::prelude::*;

use vitrina::{MockDriver, PageDriver, ProductFixture, SelectorMap};

fn commit(fixture: &ProductFixture, typed: &str) -> String {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");
    runtime.block_on(async {
        let selectors = SelectorMap::default();
        let mut driver = MockDriver::new(fixture);
        driver
            .navigate(&fixture.product_page_url)
            .await
            .expect("navigate");
        driver
            .set_value(&selectors.quantity_input, typed)
            .await
            .expect("set quantity");
        driver
            .value_of(&selectors.quantity_input)
            .await
            .expect("read quantity")
            .unwrap_or_default()
    })
}

/// Strings that never parse as a number
fn non_numeric_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,8}"
}

proptest! {
    #[test]
    fn prop_integer_in_range_commits_verbatim(n in 1u32..=10) {
        let fixture = ProductFixture::widget();
        prop_assert_eq!(commit(&fixture, &n.to_string()), n.to_string());
    }

    #[test]
    fn prop_integer_above_max_clamps(n in 11u32..=10_000) {
        let fixture = ProductFixture::widget();
        prop_assert_eq!(commit(&fixture, &n.to_string()), "10");
    }

    #[test]
    fn prop_non_numeric_resets_to_default(raw in non_numeric_strategy()) {
        let fixture = ProductFixture::widget();
        prop_assert_eq!(commit(&fixture, &raw), fixture.default_quantity.clone());
    }

    #[test]
    fn prop_decimal_follows_fixture_policy(whole in 1u32..=9, frac in 1u32..=9) {
        let typed = format!("{whole}.{frac}");

        let strict = ProductFixture::widget();
        prop_assert_eq!(commit(&strict, &typed), strict.default_quantity.clone());

        let mut loose = ProductFixture::widget();
        loose.allow_decimal_quantities = true;
        prop_assert_eq!(commit(&loose, &typed), typed);
    }

    #[test]
    fn prop_decimal_above_max_clamps(whole in 11u32..=1000, frac in 0u32..=9) {
        let mut loose = ProductFixture::widget();
        loose.allow_decimal_quantities = true;
        let typed = format!("{whole}.{frac}");
        prop_assert_eq!(commit(&loose, &typed), "10");
    }

    #[test]
    fn prop_committed_value_is_always_in_contract(raw in "\\PC{0,12}") {
        let strict = ProductFixture::widget();
        let committed = commit(&strict, &raw);
        let in_range = committed
            .parse::<u32>()
            .is_ok_and(|n| (1..=strict.max_quantity).contains(&n));
        prop_assert!(in_range, "committed '{}' from '{}'", committed, raw);

        let mut loose = ProductFixture::widget();
        loose.allow_decimal_quantities = true;
        let committed = commit(&loose, &raw);
        let in_range = committed
            .parse::<f64>()
            .is_ok_and(|v| v > 0.0 && v <= f64::from(loose.max_quantity));
        prop_assert!(in_range, "committed '{}' from '{}'", committed, raw);
    }
}
