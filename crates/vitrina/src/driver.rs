//! Browser automation driver seam.
//!
//! Scenarios never touch CDP directly: they speak to a [`PageDriver`],
//! which has two implementations. [`CdpDriver`] (behind the `browser`
//! feature) drives a real Chromium over the DevTools protocol via
//! chromiumoxide, evaluating the query expressions built by
//! [`crate::selectors::Locator`]. The in-memory [`crate::mock::MockDriver`]
//! models the product-card widget so the whole suite runs without a
//! browser.

use async_trait::async_trait;

use crate::network::{InterceptHandle, InterceptRule};
use crate::result::VitrinaResult;
use crate::selectors::Locator;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Abstract page driver for scenario execution.
///
/// All DOM reads are instantaneous probes; the bounded waiting lives above
/// this seam in the page object, so both implementations stay simple.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the page to load
    async fn navigate(&mut self, url: &str) -> VitrinaResult<()>;

    /// Reload the current page
    async fn reload(&mut self) -> VitrinaResult<()>;

    /// Current page URL
    async fn current_url(&self) -> VitrinaResult<String>;

    /// Whether the element is present and visible
    async fn is_visible(&self, locator: &Locator) -> VitrinaResult<bool>;

    /// Text content of the element, None when absent
    async fn text_of(&self, locator: &Locator) -> VitrinaResult<Option<String>>;

    /// Attribute value of the element, None when absent
    async fn attribute(&self, locator: &Locator, name: &str) -> VitrinaResult<Option<String>>;

    /// Committed `value` of an input or select, None when absent
    async fn value_of(&self, locator: &Locator) -> VitrinaResult<Option<String>>;

    /// Number of elements matching the locator
    async fn count(&self, locator: &Locator) -> VitrinaResult<usize>;

    /// Whether the control carries the `disabled` property
    async fn is_disabled(&self, locator: &Locator) -> VitrinaResult<bool>;

    /// Whether the element's CSS `text-decoration` includes `line-through`
    async fn is_struck_through(&self, locator: &Locator) -> VitrinaResult<bool>;

    /// Click the element
    async fn click(&mut self, locator: &Locator) -> VitrinaResult<()>;

    /// Clear the input, type `text`, and commit it (input/change/blur)
    async fn set_value(&mut self, locator: &Locator, text: &str) -> VitrinaResult<()>;

    /// Select the option of a `<select>` whose value or label equals `value`
    async fn select_option(&mut self, locator: &Locator, value: &str) -> VitrinaResult<()>;

    /// Install interception rules for this page. The returned handle
    /// resolves once a matched request has been attempted. Rules live until
    /// the driver is closed.
    async fn install_interception(
        &mut self,
        rules: Vec<InterceptRule>,
    ) -> VitrinaResult<InterceptHandle>;

    /// Tear the page and any interception down
    async fn close(&mut self) -> VitrinaResult<()>;
}

// ============================================================================
// Real CDP implementation (behind the `browser` feature)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{async_trait, BrowserConfig, InterceptHandle, InterceptRule, Locator, PageDriver};
    use crate::network::{FailureKind, HttpMethod, InterceptAction, Interceptor};
    use crate::result::{VitrinaError, VitrinaResult};
    use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::fetch::{
        ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
        FailRequestParams, RequestPattern, RequestStage,
    };
    use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
    use chromiumoxide::page::Page;
    use futures::StreamExt;

    impl FailureKind {
        const fn to_error_reason(self) -> ErrorReason {
            match self {
                Self::Failed => ErrorReason::Failed,
                Self::TimedOut => ErrorReason::TimedOut,
                Self::ConnectionRefused => ErrorReason::ConnectionRefused,
                Self::InternetDisconnected => ErrorReason::InternetDisconnected,
            }
        }
    }

    /// Page driver speaking CDP through chromiumoxide
    pub struct CdpDriver {
        browser: Option<Browser>,
        page: Page,
        #[allow(dead_code)]
        handler_task: tokio::task::JoinHandle<()>,
        intercept_task: Option<tokio::task::JoinHandle<()>>,
    }

    impl std::fmt::Debug for CdpDriver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("CdpDriver")
                .field("intercepting", &self.intercept_task.is_some())
                .finish_non_exhaustive()
        }
    }

    impl CdpDriver {
        /// Launch a fresh browser and open a blank page.
        pub async fn launch(config: BrowserConfig) -> VitrinaResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(|e| VitrinaError::BrowserLaunch {
                message: e.to_string(),
            })?;

            let (browser, mut handler) =
                Browser::launch(cdp_config)
                    .await
                    .map_err(|e| VitrinaError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handler_task = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page =
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| VitrinaError::Page {
                        message: e.to_string(),
                    })?;

            Ok(Self {
                browser: Some(browser),
                page,
                handler_task,
                intercept_task: None,
            })
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, expr: &str) -> VitrinaResult<T> {
            let result = self
                .page
                .evaluate(expr)
                .await
                .map_err(|e| VitrinaError::Eval {
                    message: e.to_string(),
                })?;
            result.into_value().map_err(|e| VitrinaError::Eval {
                message: e.to_string(),
            })
        }
    }

    #[async_trait]
    impl PageDriver for CdpDriver {
        async fn navigate(&mut self, url: &str) -> VitrinaResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| VitrinaError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| VitrinaError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn reload(&mut self) -> VitrinaResult<()> {
            self.page
                .reload()
                .await
                .map_err(|e| VitrinaError::Page {
                    message: format!("reload failed: {e}"),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> VitrinaResult<String> {
            let url = self.page.url().await.map_err(|e| VitrinaError::Page {
                message: e.to_string(),
            })?;
            Ok(url.unwrap_or_default())
        }

        async fn is_visible(&self, locator: &Locator) -> VitrinaResult<bool> {
            self.eval(&locator.to_visible_query()).await
        }

        async fn text_of(&self, locator: &Locator) -> VitrinaResult<Option<String>> {
            self.eval(&locator.to_text_query()).await
        }

        async fn attribute(&self, locator: &Locator, name: &str) -> VitrinaResult<Option<String>> {
            self.eval(&locator.to_attribute_query(name)).await
        }

        async fn value_of(&self, locator: &Locator) -> VitrinaResult<Option<String>> {
            self.eval(&locator.to_value_query()).await
        }

        async fn count(&self, locator: &Locator) -> VitrinaResult<usize> {
            self.eval(&locator.to_count_query()).await
        }

        async fn is_disabled(&self, locator: &Locator) -> VitrinaResult<bool> {
            self.eval(&locator.to_disabled_query()).await
        }

        async fn is_struck_through(&self, locator: &Locator) -> VitrinaResult<bool> {
            let expr = format!(
                "(() => {{ const el = document.querySelector({sel:?}); \
                 if (!el) return false; \
                 return getComputedStyle(el).textDecorationLine.includes('line-through'); }})()",
                sel = locator.as_str()
            );
            self.eval(&expr).await
        }

        async fn click(&mut self, locator: &Locator) -> VitrinaResult<()> {
            let expr = format!(
                "(() => {{ const el = document.querySelector({sel:?}); \
                 if (!el) return false; el.click(); return true; }})()",
                sel = locator.as_str()
            );
            let clicked: bool = self.eval(&expr).await?;
            if clicked {
                Ok(())
            } else {
                Err(VitrinaError::Page {
                    message: format!("click target '{locator}' not found"),
                })
            }
        }

        async fn set_value(&mut self, locator: &Locator, text: &str) -> VitrinaResult<()> {
            // Matches user typing: set the value, fire input and change,
            // then blur so the widget commits/validates the field.
            let expr = format!(
                "(() => {{ const el = document.querySelector({sel:?}); \
                 if (!el) return false; \
                 el.focus(); el.value = {text:?}; \
                 el.dispatchEvent(new Event('input', {{bubbles: true}})); \
                 el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                 el.blur(); return true; }})()",
                sel = locator.as_str()
            );
            let set: bool = self.eval(&expr).await?;
            if set {
                Ok(())
            } else {
                Err(VitrinaError::Page {
                    message: format!("input '{locator}' not found"),
                })
            }
        }

        async fn select_option(&mut self, locator: &Locator, value: &str) -> VitrinaResult<()> {
            let expr = format!(
                "(() => {{ const el = document.querySelector({sel:?}); \
                 if (!el) return false; \
                 const opt = Array.from(el.options).find(o => \
                     o.value === {val:?} || o.textContent.trim() === {val:?}); \
                 if (!opt) return false; \
                 el.value = opt.value; \
                 el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                 return true; }})()",
                sel = locator.as_str(),
                val = value
            );
            let selected: bool = self.eval(&expr).await?;
            if selected {
                Ok(())
            } else {
                Err(VitrinaError::Page {
                    message: format!("option '{value}' not found in '{locator}'"),
                })
            }
        }

        async fn install_interception(
            &mut self,
            rules: Vec<InterceptRule>,
        ) -> VitrinaResult<InterceptHandle> {
            let patterns: Vec<RequestPattern> = rules
                .iter()
                .map(|rule| {
                    RequestPattern::builder()
                        .url_pattern(rule.pattern.to_cdp_pattern())
                        .request_stage(RequestStage::Request)
                        .build()
                })
                .collect();

            self.page
                .execute(FetchEnableParams::builder().patterns(patterns).build())
                .await
                .map_err(|e| VitrinaError::InterceptionSetup {
                    message: e.to_string(),
                })?;

            let mut events = self
                .page
                .event_listener::<EventRequestPaused>()
                .await
                .map_err(|e| VitrinaError::InterceptionSetup {
                    message: e.to_string(),
                })?;

            let interceptor = Interceptor::new(rules);
            let handle = interceptor.handle();
            let page = self.page.clone();

            let task = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let method = HttpMethod::parse(&event.request.method);
                    let action = interceptor.decide(&event.request.url, &method);
                    let outcome = match action {
                        InterceptAction::Fail(kind) => {
                            match FailRequestParams::builder()
                                .request_id(event.request_id.clone())
                                .error_reason(kind.to_error_reason())
                                .build()
                            {
                                Ok(params) => page.execute(params).await.map(|_| ()),
                                Err(e) => {
                                    tracing::warn!(target: "vitrina::driver", error = %e, "bad fail params");
                                    continue;
                                }
                            }
                        }
                        InterceptAction::Continue => {
                            match ContinueRequestParams::builder()
                                .request_id(event.request_id.clone())
                                .build()
                            {
                                Ok(params) => page.execute(params).await.map(|_| ()),
                                Err(e) => {
                                    tracing::warn!(target: "vitrina::driver", error = %e, "bad continue params");
                                    continue;
                                }
                            }
                        }
                    };
                    if let Err(e) = outcome {
                        // Page likely navigated away or closed; stop the loop.
                        tracing::debug!(target: "vitrina::driver", error = %e, "interception loop ended");
                        break;
                    }
                }
            });

            if let Some(old) = self.intercept_task.replace(task) {
                old.abort();
            }
            Ok(handle)
        }

        async fn close(&mut self) -> VitrinaResult<()> {
            if let Some(task) = self.intercept_task.take() {
                task.abort();
            }
            if let Some(mut browser) = self.browser.take() {
                browser
                    .close()
                    .await
                    .map_err(|e| VitrinaError::BrowserLaunch {
                        message: e.to_string(),
                    })?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;
