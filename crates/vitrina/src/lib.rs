//! Vitrina: Rust-native end-to-end checks for the product-card widget
//!
//! Vitrina (Spanish: "shop window") drives the storefront product-card
//! page through a small driver seam and asserts its customer-facing
//! behavior: product info, quantity validation, cart flows, variants,
//! reviews, persistence across reloads, and forced network failures.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Vitrina Architecture                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌───────────┐    ┌─────────────┐    ┌─────────────────┐    │
//! │   │ Scenarios │───►│ ProductPage │───►│ PageDriver      │    │
//! │   │ (suite)   │    │ (waits +    │    │  CdpDriver      │    │
//! │   │           │    │  asserts)   │    │  MockDriver     │    │
//! │   └───────────┘    └─────────────┘    └─────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scenario bodies never talk CDP directly. The [`PageDriver`] seam has
//! two implementations: [`CdpDriver`] drives headless Chromium (behind
//! the `browser` feature) and [`MockDriver`] models the widget in memory
//! so the whole suite runs in plain `cargo test`.
//!
//! # Example
//!
//! ```
//! use vitrina::{
//!     MockDriver, PageDriver, ProductFixture, RunConfig, SuiteRunner, WaitOptions,
//! };
//!
//! # async fn demo() {
//! let fixture = ProductFixture::widget();
//! let config = RunConfig::new("product card", fixture.clone())
//!     .with_wait(WaitOptions::new().with_timeout(500));
//! let runner = SuiteRunner::new(config);
//! let report = runner
//!     .run(&vitrina::scenarios::suite(), |_| {
//!         let fixture = fixture.clone();
//!         async move { Ok(Box::new(MockDriver::new(&fixture)) as Box<dyn PageDriver>) }
//!     })
//!     .await;
//! assert!(report.failed_count() <= report.scenarios.len());
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod driver;
mod fixture;
mod mock;
mod network;
mod page;
mod result;
mod scenario;
/// The product-card scenario suite
pub mod scenarios;
mod selectors;
mod wait;

#[cfg(feature = "browser")]
pub use driver::CdpDriver;
pub use driver::{BrowserConfig, PageDriver};
pub use fixture::{ProductFixture, CART_ENDPOINT};
pub use mock::{MockDriver, MockPageState};
pub use network::{
    FailureKind, HttpMethod, InterceptAction, InterceptHandle, InterceptRule, Interceptor,
    UrlPattern,
};
pub use page::ProductPage;
pub use result::{VitrinaError, VitrinaResult};
pub use scenario::{
    RunConfig, Scenario, ScenarioContext, ScenarioFn, ScenarioFuture, ScenarioReport,
    ScenarioStatus, SuiteReport, SuiteRunner,
};
pub use selectors::{Locator, SelectorMap};
pub use wait::{
    poll_until, WaitOptions, WaitOutcome, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
