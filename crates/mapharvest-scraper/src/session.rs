//! Browser session lifecycle for one worker.

use std::sync::Arc;

use mapharvest_core::LocaleConfig;

use crate::browser::{find_first, Key, PageDriver};
use crate::dispatch::DriverFactory;
use crate::error::BrowserError;
use crate::selectors;
use crate::settings::{settle, ScraperSettings};

/// Owns one browsing context and the consecutive-failure streak used to
/// decide when the page needs a reload.
///
/// Not shared between workers. Every extraction step takes the session
/// explicitly; there is no ambient "current" session.
pub struct SessionController {
    driver: Box<dyn PageDriver>,
    locale: &'static LocaleConfig,
    settings: Arc<ScraperSettings>,
    failure_streak: u32,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("language", &self.locale.language)
            .field("failure_streak", &self.failure_streak)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Launch a browser, open the origin page and clear any consent dialog.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the browser cannot be launched or the
    /// origin cannot be loaded. A browser that launched is closed before the
    /// error is returned.
    pub async fn start(
        factory: &dyn DriverFactory,
        locale: &'static LocaleConfig,
        settings: Arc<ScraperSettings>,
    ) -> Result<Self, BrowserError> {
        let driver = factory.launch(locale).await?;

        if let Err(e) = driver.navigate(&settings.origin_url).await {
            if let Err(close_err) = driver.close().await {
                tracing::warn!(error = %close_err, "failed to close browser after navigation error");
            }
            return Err(e);
        }
        settle(settings.initial_render).await;

        let session = Self {
            driver,
            locale,
            settings,
            failure_streak: 0,
        };
        session.dismiss_dialogs().await;

        if let Ok(title) = session.driver.title().await {
            tracing::debug!(%title, "origin loaded");
        }
        Ok(session)
    }

    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    #[must_use]
    pub fn locale(&self) -> &'static LocaleConfig {
        self.locale
    }

    #[must_use]
    pub fn settings(&self) -> &ScraperSettings {
        &self.settings
    }

    #[must_use]
    pub fn failure_streak(&self) -> u32 {
        self.failure_streak
    }

    /// Click the consent button if one is shown, then send Escape to close
    /// any other overlay. Never fails.
    pub async fn dismiss_dialogs(&self) {
        let consent = selectors::consent_button(self.locale);
        if let Some(button) = find_first(self.driver(), std::slice::from_ref(&consent)).await {
            match self.driver.click(button).await {
                Ok(()) => {
                    tracing::debug!("dismissed consent dialog");
                    settle(self.settings.field_settle).await;
                }
                Err(e) => tracing::debug!(error = %e, "consent button click failed"),
            }
        }

        if let Some(body) = find_first(self.driver(), &[selectors::body()]).await {
            if let Err(e) = self.driver.press_key(body, Key::Escape).await {
                tracing::debug!(error = %e, "escape key failed");
            }
            settle(self.settings.dialog_settle).await;
        }
    }

    /// Reload the origin when consecutive failures reached the threshold.
    /// Returns `true` when a reset happened.
    pub async fn recover_if_degraded(&mut self) -> bool {
        if self.failure_streak < self.settings.failure_streak_threshold {
            return false;
        }

        tracing::warn!(
            failures = self.failure_streak,
            "failure streak reached threshold, reloading origin"
        );
        self.failure_streak = 0;
        if let Err(e) = self.driver.navigate(&self.settings.origin_url).await {
            tracing::warn!(error = %e, "origin reload failed");
        }
        settle(self.settings.recovery_render).await;
        self.dismiss_dialogs().await;
        true
    }

    pub fn record_success(&mut self) {
        self.failure_streak = 0;
    }

    pub fn record_failure(&mut self) {
        self.failure_streak += 1;
    }

    /// Release the browser. Consumes the session so it can only happen once.
    pub async fn stop(self) {
        match self.driver.close().await {
            Ok(()) => tracing::debug!("browser session closed"),
            Err(e) => tracing::warn!(error = %e, "failed to close browser session"),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
