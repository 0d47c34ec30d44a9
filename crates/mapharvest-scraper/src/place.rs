//! Listing extraction for one keyword.

use std::path::PathBuf;

use mapharvest_core::{LocaleConfig, Place};

use crate::browser::{find_first, wait_for_any, ElementQuery, Key, PageDriver};
use crate::diagnostics::Diagnostics;
use crate::error::{ExtractionFailure, FieldNotFound, PlaceField};
use crate::photo::PhotoDownloader;
use crate::reviews::harvest_reviews;
use crate::sanitize::sanitize_keyword;
use crate::selectors;
use crate::session::SessionController;
use crate::settings::settle;

/// Where a scrape writes its files, and whether photos are fetched.
#[derive(Debug, Clone)]
pub struct ScrapeContext {
    pub output_dir: PathBuf,
    pub photos: Option<PhotoDownloader>,
}

impl ScrapeContext {
    #[must_use]
    pub fn new(output_dir: PathBuf, photos: Option<PhotoDownloader>) -> Self {
        Self { output_dir, photos }
    }
}

/// Collects field results into a [`Place`]. A failed lookup leaves its
/// field empty and is only logged.
struct PlaceBuilder {
    place: Place,
}

impl PlaceBuilder {
    fn new(keyword: &str) -> Self {
        Self {
            place: Place::new(keyword),
        }
    }

    fn slot(&mut self, field: PlaceField) -> &mut String {
        match field {
            PlaceField::Name => &mut self.place.name,
            PlaceField::Category => &mut self.place.category,
            PlaceField::Address => &mut self.place.address,
            PlaceField::Phone => &mut self.place.phone,
            PlaceField::Web => &mut self.place.web,
            PlaceField::PlusCode => &mut self.place.pluscode,
            PlaceField::Hours => &mut self.place.hours,
            PlaceField::Stars => &mut self.place.stars,
            PlaceField::Reviews => &mut self.place.reviews,
        }
    }

    fn set(&mut self, field: PlaceField, value: Result<String, FieldNotFound>) {
        match value {
            Ok(value) => *self.slot(field) = value,
            Err(e) => tracing::warn!(
                keyword = %self.place.keyword,
                field = %e.field,
                reason = %e.reason,
                "field not found"
            ),
        }
    }

    fn build(self) -> Place {
        self.place
    }
}

/// Search for `keyword`, open the matching place and read its listing.
///
/// Every optional field is looked up independently; only a missing search
/// box or an empty result abort the keyword.
///
/// # Errors
///
/// Returns [`ExtractionFailure::SearchBoxNotFound`] when the search input
/// never becomes available, and [`ExtractionFailure::NoResultsFound`] when
/// the search shows neither a result list nor a place title.
pub async fn extract_place(
    session: &SessionController,
    keyword: &str,
    ctx: &ScrapeContext,
) -> Result<Place, ExtractionFailure> {
    let driver = session.driver();
    let locale = session.locale();
    let settings = session.settings();
    let stem = sanitize_keyword(keyword);
    let diagnostics = Diagnostics::new(&ctx.output_dir, &stem, settings.diagnostics);

    // Searching never navigates; drop handles left by the previous keyword.
    driver.release_elements().await;
    submit_search(session, keyword).await?;
    diagnostics.screenshot(driver, "after_search.png").await;
    if let Ok(url) = driver.current_url().await {
        tracing::debug!(keyword, %url, "search submitted");
    }

    let mut builder = PlaceBuilder::new(keyword);
    let results = driver
        .find_all(&selectors::result_list_item())
        .await
        .unwrap_or_default();
    tracing::debug!(keyword, count = results.len(), "search results");

    if let Some(first) = results.first() {
        let name = driver
            .attribute(*first, "aria-label")
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        tracing::debug!(keyword, name = %name, "opening first result");
        builder.set(PlaceField::Name, Ok(name));
        if let Err(e) = driver.click(*first).await {
            tracing::warn!(keyword, error = %e, "could not open first result");
        }
        settle(settings.result_settle).await;
        diagnostics.screenshot(driver, "after_click.png").await;
    } else {
        let Some(name) = single_place_title(driver, locale).await else {
            tracing::error!(keyword, "no results and no place title");
            return Err(ExtractionFailure::NoResultsFound {
                keyword: keyword.to_string(),
            });
        };
        tracing::debug!(keyword, name = %name, "single place opened");
        builder.set(PlaceField::Name, Ok(name));
    }
    settle(settings.field_settle).await;

    let (stars, reviews) = read_rating(session).await;
    builder.set(PlaceField::Stars, stars);
    builder.set(PlaceField::Reviews, reviews);

    if let Some(photos) = &ctx.photos {
        save_photo(driver, photos, ctx, &stem).await;
    }

    builder.set(PlaceField::Category, read_category(driver).await);
    builder.set(
        PlaceField::Address,
        labeled_value(driver, locale.address_text, PlaceField::Address).await,
    );
    builder.set(
        PlaceField::Web,
        labeled_value(driver, locale.website_text, PlaceField::Web).await,
    );
    builder.set(
        PlaceField::Phone,
        labeled_value(driver, locale.phone_text, PlaceField::Phone).await,
    );
    builder.set(
        PlaceField::PlusCode,
        labeled_value(driver, locale.pluscode_text, PlaceField::PlusCode).await,
    );
    builder.set(PlaceField::Hours, read_hours(driver, locale).await);

    let mut place = builder.build();
    tracing::debug!(keyword, name = %place.name, "listing extracted");

    place.review_source_path = harvest_reviews(session, keyword, &ctx.output_dir).await;
    Ok(place)
}

async fn submit_search(session: &SessionController, keyword: &str) -> Result<(), ExtractionFailure> {
    let driver = session.driver();
    let settings = session.settings();
    let not_found = || ExtractionFailure::SearchBoxNotFound {
        keyword: keyword.to_string(),
    };

    let Some(input) = wait_for_any(
        driver,
        &selectors::search_box(),
        settings.search_timeout,
        settings.poll_interval,
    )
    .await
    else {
        tracing::error!(keyword, "search box not found");
        return Err(not_found());
    };
    tracing::debug!(keyword, "found search box");

    let typed = async {
        driver.click(input).await?;
        settle(settings.typing_pause).await;
        driver.clear(input).await?;
        settle(settings.typing_pause).await;
        driver.type_text(input, keyword).await?;
        settle(settings.field_settle).await;
        driver.press_key(input, Key::Enter).await
    }
    .await;
    if let Err(e) = typed {
        tracing::error!(keyword, error = %e, "search box not usable");
        return Err(not_found());
    }
    settle(settings.search_settle).await;
    Ok(())
}

/// Title of a directly opened place, skipping blank and generic headings.
async fn single_place_title(driver: &dyn PageDriver, locale: &LocaleConfig) -> Option<String> {
    let headings = driver.find_all(&selectors::heading()).await.ok()?;
    for heading in headings {
        let Ok(text) = driver.text(heading).await else {
            continue;
        };
        let text = text.trim();
        if !text.is_empty() && text != locale.results_heading_text {
            return Some(text.to_string());
        }
    }
    None
}

fn reject_leftover_label(
    locale: &LocaleConfig,
    field: PlaceField,
    value: String,
) -> Result<String, FieldNotFound> {
    if locale.contains_rating_label(&value) {
        Err(FieldNotFound::new(
            field,
            format!("value still carries a label: {value:?}"),
        ))
    } else {
        Ok(value)
    }
}

/// Split `"4.5(1,234)"` style text into its two parts.
fn split_combined_rating(text: &str) -> Option<(String, String)> {
    if !(text.contains('(') && text.contains(')')) {
        return None;
    }
    let cleaned = text.replace(')', "");
    let mut parts = cleaned.split('(');
    let stars = parts.next()?.trim().to_string();
    let reviews = parts.next()?.trim().to_string();
    Some((stars, reviews))
}

type FieldResult = Result<String, FieldNotFound>;

/// Star rating and review count. Prefers the combined text of the rating
/// image; otherwise reads the two labeled elements separately.
async fn read_rating(session: &SessionController) -> (FieldResult, FieldResult) {
    let driver = session.driver();
    let locale = session.locale();
    let settings = session.settings();

    let Some(rating) = wait_for_any(
        driver,
        &[selectors::rating_image(locale)],
        settings.rating_timeout,
        settings.poll_interval,
    )
    .await
    else {
        return (
            Err(FieldNotFound::new(PlaceField::Stars, "rating element not found")),
            Err(FieldNotFound::new(PlaceField::Reviews, "rating element not found")),
        );
    };

    let text = driver.text(rating).await.unwrap_or_default();
    if let Some((stars, reviews)) = split_combined_rating(&text) {
        return (
            reject_leftover_label(locale, PlaceField::Stars, stars),
            reject_leftover_label(locale, PlaceField::Reviews, reviews),
        );
    }

    let stars = match driver.attribute(rating, "aria-label").await {
        Ok(Some(label)) => reject_leftover_label(
            locale,
            PlaceField::Stars,
            label.replace(locale.stars_text, "").replace(' ', ""),
        ),
        Ok(None) => Err(FieldNotFound::new(PlaceField::Stars, "rating has no label")),
        Err(e) => Err(FieldNotFound::new(PlaceField::Stars, e.to_string())),
    };
    let reviews = match aria_label_of(driver, locale.reviews_text).await {
        Ok(label) => reject_leftover_label(
            locale,
            PlaceField::Reviews,
            label.replace(locale.reviews_text, "").replace(' ', ""),
        ),
        Err(reason) => Err(FieldNotFound::new(PlaceField::Reviews, reason)),
    };
    (stars, reviews)
}

/// Accessible label of the first element whose label contains `needle`.
async fn aria_label_of(driver: &dyn PageDriver, needle: &str) -> Result<String, String> {
    let query = selectors::aria_label_contains(needle);
    let element = find_first(driver, std::slice::from_ref(&query))
        .await
        .ok_or_else(|| format!("no element labeled {needle:?}"))?;
    driver
        .attribute(element, "aria-label")
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "element has no aria-label".to_string())
}

/// Value of a `"<label>value"` accessible label, with the label removed.
async fn labeled_value(driver: &dyn PageDriver, label: &str, field: PlaceField) -> FieldResult {
    let raw = aria_label_of(driver, label)
        .await
        .map_err(|reason| FieldNotFound::new(field, reason))?;
    Ok(raw.replace(label, "").trim().to_string())
}

async fn read_category(driver: &dyn PageDriver) -> FieldResult {
    let query: ElementQuery = selectors::category_button();
    let button = match driver.find_all(&query).await {
        Ok(found) => found.into_iter().next(),
        Err(e) => return Err(FieldNotFound::new(PlaceField::Category, e.to_string())),
    };
    let button =
        button.ok_or_else(|| FieldNotFound::new(PlaceField::Category, "no category button"))?;
    driver
        .text(button)
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| FieldNotFound::new(PlaceField::Category, e.to_string()))
}

/// Strip the locale's boilerplate from the weekly hours label and put one
/// day per line.
fn clean_hours(raw: &str, locale: &LocaleConfig) -> String {
    let mut hours = raw.to_string();
    for phrase in locale.hours_strip {
        hours = hours.replace(phrase, "");
    }
    hours.replace(locale.hours_separator, "\n").trim().to_string()
}

async fn read_hours(driver: &dyn PageDriver, locale: &LocaleConfig) -> FieldResult {
    let raw = aria_label_of(driver, locale.hours_text)
        .await
        .map_err(|reason| FieldNotFound::new(PlaceField::Hours, reason))?;
    Ok(clean_hours(&raw, locale))
}

async fn save_photo(
    driver: &dyn PageDriver,
    photos: &PhotoDownloader,
    ctx: &ScrapeContext,
    stem: &str,
) {
    let Some(img) = find_first(driver, &[selectors::place_photo()]).await else {
        tracing::debug!(stem, "no place photo");
        return;
    };
    let src = match driver.attribute(img, "src").await {
        Ok(Some(src)) if !src.is_empty() => src,
        _ => {
            tracing::debug!(stem, "place photo has no source");
            return;
        }
    };
    match photos.download(&src, &ctx.output_dir, stem).await {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "photo saved"),
        Ok(None) => {}
        Err(e) => tracing::warn!(stem, error = %e, "unable to download photo"),
    }
}

#[cfg(test)]
#[path = "place_test.rs"]
mod tests;
