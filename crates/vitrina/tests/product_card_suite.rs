//! Full scenario suite run against the in-memory product-card page.
//!
//! These tests exercise the same scenario bodies a browser run uses,
//! end to end through the runner, page object, and interception engine.

use vitrina::{
    scenarios, MockDriver, PageDriver, ProductFixture, RunConfig, Scenario, ScenarioStatus,
    SuiteRunner, VitrinaResult, WaitOptions,
};

fn quick_wait() -> WaitOptions {
    WaitOptions::new().with_timeout(500).with_poll_interval(10)
}

/// Mock pages carry the state a backend fixture would provide.
async fn stateful_driver(
    fixture: ProductFixture,
    scenario: Scenario,
) -> VitrinaResult<Box<dyn PageDriver>> {
    let driver = if scenario.name().contains("out-of-stock") {
        MockDriver::out_of_stock(&fixture)
    } else {
        MockDriver::new(&fixture)
    };
    Ok(Box::new(driver))
}

#[tokio::test]
async fn test_whole_suite_passes_on_mock_page() {
    let fixture = ProductFixture::widget();
    let config = RunConfig::new("product card", fixture.clone()).with_wait(quick_wait());
    let runner = SuiteRunner::new(config);

    let report = runner
        .run(&scenarios::suite(), |scenario| {
            stateful_driver(fixture.clone(), *scenario)
        })
        .await;

    assert!(report.all_passed(), "{}", report.render_text());
    assert_eq!(report.passed_count(), scenarios::suite().len());
}

#[tokio::test]
async fn test_decimal_policy_scenario_follows_fixture() {
    let mut fixture = ProductFixture::widget();
    fixture.allow_decimal_quantities = true;
    let config = RunConfig::new("decimal widget", fixture.clone())
        .with_wait(quick_wait())
        .with_filter("decimal");
    let runner = SuiteRunner::new(config);

    let report = runner
        .run(&scenarios::suite(), |scenario| {
            stateful_driver(fixture.clone(), *scenario)
        })
        .await;

    assert_eq!(report.scenarios.len(), 1);
    assert!(report.all_passed(), "{}", report.render_text());
}

#[tokio::test]
async fn test_out_of_stock_scenario_fails_on_in_stock_page() {
    let fixture = ProductFixture::widget();
    let config = RunConfig::new("in stock", fixture.clone())
        .with_wait(quick_wait())
        .with_filter("out-of-stock");
    let runner = SuiteRunner::new(config);

    // Plain in-stock page for every scenario, including the stock check.
    let report = runner
        .run(&scenarios::suite(), |_| {
            let fixture = fixture.clone();
            async move {
                Ok(Box::new(MockDriver::new(&fixture)) as Box<dyn PageDriver>)
            }
        })
        .await;

    assert_eq!(report.failed_count(), 1);
    let failure = &report.scenarios[0];
    assert_eq!(failure.status, ScenarioStatus::Failed);
    let message = failure.error.as_deref().unwrap_or_default();
    assert!(message.contains("out-of-stock"), "error was: {message}");
}

#[tokio::test]
async fn test_failed_cart_request_keeps_counter_at_initial_value() {
    let mut fixture = ProductFixture::widget();
    fixture.initial_cart_count = 3;
    let config = RunConfig::new("seeded cart", fixture.clone())
        .with_wait(quick_wait())
        .with_filter("failed cart request");
    let runner = SuiteRunner::new(config);

    let report = runner
        .run(&scenarios::suite(), |scenario| {
            stateful_driver(fixture.clone(), *scenario)
        })
        .await;

    assert_eq!(report.scenarios.len(), 1);
    assert!(report.all_passed(), "{}", report.render_text());
}

#[tokio::test]
async fn test_repeated_add_to_cart_keeps_incrementing() {
    let fixture = ProductFixture::widget();
    let driver = MockDriver::new(&fixture);
    let mut page = vitrina::ProductPage::new(
        Box::new(driver),
        vitrina::SelectorMap::default(),
        quick_wait(),
    );
    page.set_scenario("cart monotonicity");
    page.open(&fixture.product_page_url).await.unwrap();

    for clicks in 1..=5u32 {
        page.add_to_cart().await.unwrap();
        page.expect_cart_count(fixture.initial_cart_count + clicks)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_report_serializes_with_scenario_names() {
    let fixture = ProductFixture::widget();
    let config = RunConfig::new("product card", fixture.clone())
        .with_wait(quick_wait())
        .with_filter("displays product information");
    let runner = SuiteRunner::new(config);

    let report = runner
        .run(&scenarios::suite(), |scenario| {
            stateful_driver(fixture.clone(), *scenario)
        })
        .await;

    let json = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(json["suite"], "product card");
    assert_eq!(json["scenarios"][0]["name"], "displays product information");
    assert_eq!(json["scenarios"][0]["status"], "passed");
}
