//! Best-effort debugging artifacts written next to the scrape output.

use std::path::{Path, PathBuf};

use crate::browser::PageDriver;

/// Writes screenshots and page snapshots for one keyword. File names carry
/// the sanitized keyword so concurrent shards never overwrite each other.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    dir: PathBuf,
    stem: String,
    enabled: bool,
}

impl Diagnostics {
    #[must_use]
    pub fn new(dir: &Path, stem: &str, enabled: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            enabled,
        }
    }

    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}_{name}", self.stem))
    }

    pub async fn screenshot(&self, driver: &dyn PageDriver, name: &str) {
        if !self.enabled {
            return;
        }
        let path = self.path_for(name);
        match driver.screenshot(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "saved screenshot"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save screenshot"),
        }
    }

    pub async fn snapshot(&self, driver: &dyn PageDriver, name: &str) {
        if self.enabled {
            save_page_source(driver, &self.path_for(name)).await;
        }
    }
}

/// Write the current page source to `path`, logging instead of failing.
pub async fn save_page_source(driver: &dyn PageDriver, path: &Path) {
    let html = match driver.page_source().await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read page source");
            return;
        }
    };
    match tokio::fs::write(path, html).await {
        Ok(()) => tracing::debug!(path = %path.display(), "saved page source"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save page source"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{Action, FakePage};

    #[tokio::test]
    async fn disabled_diagnostics_touch_nothing() {
        let page = FakePage::new();
        let dir = tempfile::tempdir().unwrap();
        let diagnostics = Diagnostics::new(dir.path(), "cafe", false);

        diagnostics.screenshot(&page, "after_search.png").await;
        diagnostics.snapshot(&page, "page_source_reviews.html").await;

        assert!(page.actions().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn snapshot_writes_prefixed_file() {
        let page = FakePage::new();
        page.set_source("<html>reviews</html>");
        let dir = tempfile::tempdir().unwrap();
        let diagnostics = Diagnostics::new(dir.path(), "cafe", true);

        diagnostics.screenshot(&page, "after_search.png").await;
        diagnostics.snapshot(&page, "page_source_reviews.html").await;

        let written = std::fs::read_to_string(dir.path().join("cafe_page_source_reviews.html")).unwrap();
        assert_eq!(written, "<html>reviews</html>");
        assert!(page
            .actions()
            .contains(&Action::Screenshot(dir.path().join("cafe_after_search.png"))));
    }
}
