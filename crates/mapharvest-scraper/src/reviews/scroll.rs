//! Infinite-scroll driving for the review panel.

use crate::browser::{find_first, ElementHandle, Key};
use crate::error::BrowserError;
use crate::selectors;
use crate::session::SessionController;
use crate::settings::settle;

/// Which scrolling path loaded the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMethod {
    /// The DOM probe found the scroll container.
    Container,
    /// Focus moved to the main panel and PageDown was sent.
    Keyboard,
    /// One of the known container class names scrolled.
    KnownContainer,
    /// Nothing could be scrolled; only the initially rendered reviews remain.
    Failed,
}

/// Load as many reviews as the bounds allow, trying the probe first, then
/// the keyboard, then the known container selectors.
pub(crate) async fn scroll_reviews(session: &SessionController) -> ScrollMethod {
    let driver = session.driver();
    let probe = selectors::review_scroll_probe(session.locale());

    match driver.find_scrollable_container(&probe).await {
        Ok(Some(container)) => {
            tracing::debug!("found scrollable review container");
            let passes = session.settings().scroll_passes;
            match scroll_container(session, container, passes).await {
                Ok(()) => return ScrollMethod::Container,
                Err(e) => tracing::warn!(error = %e, "container scrolling failed"),
            }
        }
        Ok(None) => tracing::warn!("no scrollable review container found"),
        Err(e) => tracing::warn!(error = %e, "scroll container probe failed"),
    }

    match keyboard_scroll(session).await {
        Ok(()) => return ScrollMethod::Keyboard,
        Err(e) => tracing::warn!(error = %e, "keyboard scrolling failed"),
    }

    if known_container_scroll(session).await {
        ScrollMethod::KnownContainer
    } else {
        tracing::warn!("all scrolling methods failed");
        ScrollMethod::Failed
    }
}

async fn scroll_container(
    session: &SessionController,
    container: ElementHandle,
    passes: u32,
) -> Result<(), BrowserError> {
    for pass in 1..=passes {
        session.driver().scroll_to_end(container).await?;
        settle(session.settings().scroll_settle).await;
        if pass % 5 == 0 {
            tracing::debug!(pass, passes, "scrolled review container");
        }
    }
    Ok(())
}

/// Open and close the sort menu so keyboard focus lands in the review
/// panel. Best-effort.
async fn nudge_focus(session: &SessionController) {
    let driver = session.driver();
    let settings = session.settings();
    let sort = selectors::sort_button_by_label(session.locale());
    let Some(button) = find_first(driver, std::slice::from_ref(&sort)).await else {
        return;
    };
    if driver.click(button).await.is_err() {
        return;
    }
    settle(settings.dialog_settle).await;
    if let Some(body) = find_first(driver, &[selectors::body()]).await {
        if let Err(e) = driver.press_key(body, Key::Escape).await {
            tracing::debug!(error = %e, "escape key failed");
        }
        settle(settings.dialog_settle).await;
    }
}

async fn keyboard_scroll(session: &SessionController) -> Result<(), BrowserError> {
    let driver = session.driver();
    let settings = session.settings();

    nudge_focus(session).await;

    let main_query = selectors::main_panel();
    let panel = find_first(driver, std::slice::from_ref(&main_query))
        .await
        .ok_or_else(|| BrowserError::Query {
            query: main_query.to_string(),
            reason: "main panel not found".to_string(),
        })?;
    driver.click(panel).await?;
    settle(settings.dialog_settle).await;

    for pass in 1..=settings.page_down_passes {
        driver.press_key(panel, Key::PageDown).await?;
        settle(settings.page_down_settle).await;
        if pass % 5 == 0 {
            tracing::debug!(pass, passes = settings.page_down_passes, "page down");
        }
    }
    Ok(())
}

async fn known_container_scroll(session: &SessionController) -> bool {
    let candidates = match session
        .driver()
        .find_all(&selectors::known_scroll_containers())
        .await
    {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "known container lookup failed");
            return false;
        }
    };

    let passes = session.settings().fallback_scroll_passes;
    for candidate in candidates {
        match scroll_container(session, candidate, passes).await {
            Ok(()) => return true,
            Err(e) => tracing::debug!(error = %e, "known container did not scroll"),
        }
    }
    false
}
