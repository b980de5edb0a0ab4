//! Scenario registry and sequential suite runner.
//!
//! A [`Scenario`] is a named async check against a [`ProductPage`]. The
//! [`SuiteRunner`] gives every scenario a fresh page on a fresh driver,
//! runs them in order, and collects a [`SuiteReport`]. A failing scenario
//! never aborts the run unless fail-fast is requested.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::driver::PageDriver;
use crate::fixture::ProductFixture;
use crate::page::ProductPage;
use crate::result::{VitrinaError, VitrinaResult};
use crate::selectors::SelectorMap;
use crate::wait::WaitOptions;

/// Everything a scenario body gets to work with
pub struct ScenarioContext {
    /// Page object, already navigated to the product page
    pub page: ProductPage,
    /// Product data the scenario asserts against
    pub fixture: ProductFixture,
}

/// Boxed future a scenario body returns
pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = VitrinaResult<()>> + Send + 'a>>;

/// Scenario entry point. A plain fn pointer keeps the registry `'static`
/// and lets scenarios live as free async fns.
pub type ScenarioFn = for<'a> fn(&'a mut ScenarioContext) -> ScenarioFuture<'a>;

/// A named end-to-end check on the product-card widget
#[derive(Clone, Copy)]
pub struct Scenario {
    name: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    /// Register a scenario body under a name
    #[must_use]
    pub const fn new(name: &'static str, run: ScenarioFn) -> Self {
        Self { name, run }
    }

    /// Human-readable scenario name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Execute the scenario body
    pub async fn run(&self, ctx: &mut ScenarioContext) -> VitrinaResult<()> {
        (self.run)(ctx).await
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// All assertions held
    Passed,
    /// An assertion or driver operation failed
    Failed,
    /// Not run (fail-fast stopped the suite, or filtered out)
    Skipped,
}

impl ScenarioStatus {
    /// Single-character marker for text reports
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Passed => "✓",
            Self::Failed => "✗",
            Self::Skipped => "-",
        }
    }
}

/// Per-scenario record in a suite report
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub status: ScenarioStatus,
    /// Failure message, when failed
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u128,
}

impl ScenarioReport {
    fn passed(name: &str, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: ScenarioStatus::Passed,
            error: None,
            duration_ms: elapsed.as_millis(),
        }
    }

    fn failed(name: &str, error: &VitrinaError, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: ScenarioStatus::Failed,
            error: Some(error.to_string()),
            duration_ms: elapsed.as_millis(),
        }
    }

    fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: ScenarioStatus::Skipped,
            error: None,
            duration_ms: 0,
        }
    }
}

/// Aggregated result of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite: String,
    /// One record per scenario, in run order
    pub scenarios: Vec<ScenarioReport>,
    /// Total wall-clock duration in milliseconds
    pub duration_ms: u128,
}

impl SuiteReport {
    /// True when no scenario failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.scenarios
            .iter()
            .all(|s| s.status != ScenarioStatus::Failed)
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }

    /// Failed scenario records
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.scenarios
            .iter()
            .filter(|s| s.status == ScenarioStatus::Failed)
            .collect()
    }

    /// Plain-text summary, one line per scenario plus totals
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("suite: {}\n", self.suite));
        for s in &self.scenarios {
            out.push_str(&format!(
                "  {} {} ({}ms)\n",
                s.status.marker(),
                s.name,
                s.duration_ms
            ));
            if let Some(error) = &s.error {
                out.push_str(&format!("      {error}\n"));
            }
        }
        out.push_str(&format!(
            "{} passed, {} failed, {} skipped in {}ms\n",
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.duration_ms
        ));
        out
    }
}

/// Explicit per-run configuration. Runs never read globals; everything a
/// scenario depends on arrives through this value.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Suite name used in reports
    pub suite: String,
    /// Product data for the run
    pub fixture: ProductFixture,
    /// Selector map for the run
    pub selectors: SelectorMap,
    /// Wait policy handed to every page object
    pub wait: WaitOptions,
    /// Only run scenarios whose name contains this substring
    pub filter: Option<String>,
    /// Stop at the first failure, skipping the rest
    pub fail_fast: bool,
}

impl RunConfig {
    /// Configuration with the default selector map and wait policy
    #[must_use]
    pub fn new(suite: impl Into<String>, fixture: ProductFixture) -> Self {
        Self {
            suite: suite.into(),
            fixture,
            selectors: SelectorMap::default(),
            wait: WaitOptions::default(),
            filter: None,
            fail_fast: false,
        }
    }

    /// Replace the selector map
    #[must_use]
    pub fn with_selectors(mut self, selectors: SelectorMap) -> Self {
        self.selectors = selectors;
        self
    }

    /// Replace the wait policy
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Only run scenarios whose name contains `needle`
    #[must_use]
    pub fn with_filter(mut self, needle: impl Into<String>) -> Self {
        self.filter = Some(needle.into());
        self
    }

    /// Stop the suite at the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    fn selected(&self, scenario: &Scenario) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |needle| scenario.name().contains(needle))
    }
}

/// Sequential scenario runner
#[derive(Debug)]
pub struct SuiteRunner {
    config: RunConfig,
}

impl SuiteRunner {
    /// Build a runner for one configuration
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run configuration in effect
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the scenarios, creating a fresh driver per scenario through
    /// `factory`. Driver creation failures and scenario failures are both
    /// recorded in the report rather than aborting the suite.
    pub async fn run<F, Fut>(&self, scenarios: &[Scenario], factory: F) -> SuiteReport
    where
        F: Fn(&Scenario) -> Fut,
        Fut: Future<Output = VitrinaResult<Box<dyn PageDriver>>>,
    {
        let suite_start = Instant::now();
        let mut reports = Vec::with_capacity(scenarios.len());
        let mut stop = false;

        for scenario in scenarios {
            if !self.config.selected(scenario) {
                continue;
            }
            if stop {
                reports.push(ScenarioReport::skipped(scenario.name()));
                continue;
            }

            tracing::info!(scenario = scenario.name(), "running");
            let start = Instant::now();
            let report = match factory(scenario).await {
                Ok(driver) => self.run_one(scenario, driver, start).await,
                Err(error) => {
                    tracing::error!(scenario = scenario.name(), %error, "driver setup failed");
                    ScenarioReport::failed(scenario.name(), &error, start.elapsed())
                }
            };

            if report.status == ScenarioStatus::Failed && self.config.fail_fast {
                stop = true;
            }
            reports.push(report);
        }

        SuiteReport {
            suite: self.config.suite.clone(),
            scenarios: reports,
            duration_ms: suite_start.elapsed().as_millis(),
        }
    }

    async fn run_one(
        &self,
        scenario: &Scenario,
        driver: Box<dyn PageDriver>,
        start: Instant,
    ) -> ScenarioReport {
        let mut page = ProductPage::new(driver, self.config.selectors.clone(), self.config.wait);
        page.set_scenario(scenario.name());

        let mut ctx = ScenarioContext {
            page,
            fixture: self.config.fixture.clone(),
        };

        // Every scenario starts from a fresh page load.
        let outcome = match ctx.page.open(&self.config.fixture.product_page_url).await {
            Ok(()) => scenario.run(&mut ctx).await,
            Err(error) => Err(error),
        };

        if let Err(error) = ctx.page.close().await {
            tracing::warn!(scenario = scenario.name(), %error, "page close failed");
        }

        match outcome {
            Ok(()) => {
                tracing::info!(scenario = scenario.name(), "passed");
                ScenarioReport::passed(scenario.name(), start.elapsed())
            }
            Err(error) => {
                tracing::error!(scenario = scenario.name(), %error, "failed");
                ScenarioReport::failed(scenario.name(), &error, start.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    fn quick_config() -> RunConfig {
        RunConfig::new("runner tests", ProductFixture::widget())
            .with_wait(WaitOptions::new().with_timeout(200).with_poll_interval(10))
    }

    fn passing(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
        Box::pin(async move {
            let card = ctx.page.selectors().product_card.clone();
            ctx.page.expect_visible("product card", &card).await
        })
    }

    fn failing(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
        Box::pin(async move {
            let error = ctx.page.selectors().network_error_message.clone();
            ctx.page.expect_visible("network error", &error).await
        })
    }

    fn mock_factory(
        fixture: ProductFixture,
    ) -> impl Fn(&Scenario) -> std::future::Ready<VitrinaResult<Box<dyn PageDriver>>> {
        move |_| std::future::ready(Ok(Box::new(MockDriver::new(&fixture)) as Box<dyn PageDriver>))
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_failures_are_scenario_local() {
            let fixture = ProductFixture::widget();
            let runner = SuiteRunner::new(quick_config());
            let scenarios = [
                Scenario::new("first fails", failing),
                Scenario::new("second still runs", passing),
            ];
            let report = runner.run(&scenarios, mock_factory(fixture)).await;
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.passed_count(), 1);
            assert!(!report.all_passed());
        }

        #[tokio::test]
        async fn test_fail_fast_skips_the_rest() {
            let fixture = ProductFixture::widget();
            let runner = SuiteRunner::new(quick_config().with_fail_fast(true));
            let scenarios = [
                Scenario::new("boom", failing),
                Scenario::new("never runs", passing),
            ];
            let report = runner.run(&scenarios, mock_factory(fixture)).await;
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.skipped_count(), 1);
        }

        #[tokio::test]
        async fn test_filter_selects_by_substring() {
            let fixture = ProductFixture::widget();
            let runner = SuiteRunner::new(quick_config().with_filter("cart"));
            let scenarios = [
                Scenario::new("cart badge", passing),
                Scenario::new("reviews", passing),
            ];
            let report = runner.run(&scenarios, mock_factory(fixture)).await;
            assert_eq!(report.scenarios.len(), 1);
            assert_eq!(report.scenarios[0].name, "cart badge");
        }

        #[tokio::test]
        async fn test_driver_setup_failure_is_recorded() {
            let runner = SuiteRunner::new(quick_config());
            let scenarios = [Scenario::new("no browser", passing)];
            let report = runner
                .run(&scenarios, |_| {
                    std::future::ready(Err(VitrinaError::BrowserNotFound))
                })
                .await;
            assert_eq!(report.failed_count(), 1);
            assert!(report.scenarios[0]
                .error
                .as_deref()
                .unwrap_or_default()
                .contains("Browser"));
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_render_text_lists_scenarios_and_totals() {
            let report = SuiteReport {
                suite: "demo".to_string(),
                scenarios: vec![
                    ScenarioReport::passed("shows info", Duration::from_millis(12)),
                    ScenarioReport::skipped("wishlist"),
                ],
                duration_ms: 12,
            };
            let text = report.render_text();
            assert!(text.contains("suite: demo"));
            assert!(text.contains("✓ shows info"));
            assert!(text.contains("1 passed, 0 failed, 1 skipped"));
        }

        #[test]
        fn test_report_serializes_to_json() {
            let report = SuiteReport {
                suite: "demo".to_string(),
                scenarios: vec![ScenarioReport::passed("ok", Duration::from_millis(1))],
                duration_ms: 1,
            };
            let json = serde_json::to_string(&report).unwrap();
            assert!(json.contains("\"status\":\"passed\""));
        }
    }
}
