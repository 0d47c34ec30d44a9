use std::sync::Arc;
use std::time::Duration;

use mapharvest_core::locale::ENGLISH;

use super::*;
use crate::browser::fake::{Action, FakeFactory, FakePage};
use crate::browser::Key;
use crate::settings::ScraperSettings;

async fn open_session(max_reviews: usize) -> (SessionController, FakePage) {
    let factory = FakeFactory::new(|_| {});
    let mut settings = ScraperSettings::immediate("https://maps.test/");
    settings.max_reviews = max_reviews;
    let session = SessionController::start(&factory, &ENGLISH, Arc::new(settings))
        .await
        .unwrap();
    let page = factory.pages().remove(0);
    (session, page)
}

fn add_review(
    page: &FakePage,
    name: &str,
    date: &str,
    text: &str,
    rating_label: Option<&str>,
) -> ElementHandle {
    let review = page.element("");
    let name_el = page.element(name);
    page.within(review, selectors::reviewer_name(), vec![name_el]);
    let date_el = page.element(date);
    page.within(review, selectors::review_date(), vec![date_el]);
    let text_el = page.element(text);
    page.within(review, selectors::review_text(), vec![text_el]);
    if let Some(label) = rating_label {
        let rating_el = page.element("");
        page.set_attr(rating_el, "aria-label", label);
        page.within(review, selectors::review_rating(), vec![rating_el]);
    }
    review
}

fn open_reviews_tab(page: &FakePage) -> ElementHandle {
    let tab = page.element("Reviews");
    page.on_page(selectors::reviews_tab(&ENGLISH), vec![tab]);
    tab
}

fn scrolls(page: &FakePage) -> usize {
    page.count(|a| matches!(a, Action::Scroll(_)))
}

#[tokio::test]
async fn missing_reviews_tab_ends_the_pass() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();

    let report = run_harvest(&session, "cafe", dir.path()).await;

    assert_eq!(report.stage, HarvestStage::TabNotOpened);
    assert!(report.path.is_none());
    assert_eq!(page.count(|a| matches!(a, Action::Probe)), 0);
    session.stop().await;
}

#[tokio::test]
async fn full_pass_writes_deduplicated_reviews() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    let sort = page.element("Sort");
    page.on_page(selectors::sort_button(&ENGLISH), vec![sort]);
    let newest = page.element("Newest");
    page.on_page(selectors::newest_option(&ENGLISH), vec![newest]);
    let container = page.element("");
    page.set_scrollable(container);

    let a = add_review(&page, "Ana", "a week ago", "Great coffee", Some("5 stars"));
    let dup = add_review(&page, "Ana", "a week ago", "Different text", Some("1 star"));
    let b = add_review(&page, "Luis", "2 weeks ago", "Slow service", Some("2 stars"));
    page.on_page(ElementQuery::css("div.jftiEf"), vec![a, dup, b]);

    let report = run_harvest(&session, "Café Östrand", dir.path()).await;

    assert_eq!(report.stage, HarvestStage::Saved);
    assert!(report.sorted);
    assert_eq!(report.scroll, Some(ScrollMethod::Container));
    assert_eq!(report.strategy, Some(ElementQuery::css("div.jftiEf")));
    assert_eq!(report.reviews_written, 2);
    assert_eq!(scrolls(&page), 40);

    let path = report.path.unwrap();
    assert_eq!(path, dir.path().join("cafe-ostrand_reviews.csv"));
    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "Ana");
    assert_eq!(&rows[0][1], "5");
    assert_eq!(&rows[0][3], "Great coffee");
    assert_eq!(&rows[1][0], "Luis");
    session.stop().await;
}

#[tokio::test]
async fn sorting_is_optional() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    let only = add_review(&page, "Ana", "today", "Nice", Some("4 stars"));
    page.on_page(ElementQuery::css("div.jftiEf"), vec![only]);

    let report = run_harvest(&session, "bar", dir.path()).await;

    assert!(!report.sorted);
    assert_eq!(report.stage, HarvestStage::Saved);
    session.stop().await;
}

#[tokio::test]
async fn no_review_elements_leaves_a_snapshot() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    page.set_source("<html>empty</html>");

    let report = run_harvest(&session, "Bar Central", dir.path()).await;

    assert_eq!(report.stage, HarvestStage::Scrolled);
    assert!(report.path.is_none());
    let snapshot = dir.path().join("bar-central_debug_no_reviews.html");
    assert_eq!(std::fs::read_to_string(snapshot).unwrap(), "<html>empty</html>");
    session.stop().await;
}

#[tokio::test]
async fn later_strategies_are_tried_in_order() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    page.fail_query(ElementQuery::css("div.jftiEf"));
    let review = add_review(&page, "Eva", "yesterday", "Fine", None);
    page.on_page(ElementQuery::css("div.WNxzHc"), vec![review]);

    let report = run_harvest(&session, "bar", dir.path()).await;

    assert_eq!(report.strategy, Some(ElementQuery::css("div.WNxzHc")));
    assert_eq!(report.reviews_written, 1);
    session.stop().await;
}

#[tokio::test]
async fn failed_probe_falls_back_to_keyboard() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    page.fail_probe();
    let panel = page.element("");
    page.on_page(selectors::main_panel(), vec![panel]);

    let report = run_harvest(&session, "bar", dir.path()).await;

    assert_eq!(report.scroll, Some(ScrollMethod::Keyboard));
    assert_eq!(
        page.count(|a| *a == Action::Key(panel, Key::PageDown)),
        20
    );
    assert_eq!(scrolls(&page), 0);
    session.stop().await;
}

#[tokio::test]
async fn keyboard_fallback_nudges_sort_menu_first() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    let sort = page.element("Sort");
    page.on_page(selectors::sort_button_by_label(&ENGLISH), vec![sort]);
    let panel = page.element("");
    page.on_page(selectors::main_panel(), vec![panel]);

    run_harvest(&session, "bar", dir.path()).await;

    let actions = page.actions();
    let nudge = actions
        .iter()
        .position(|a| *a == Action::Click(sort))
        .unwrap();
    let focus = actions
        .iter()
        .position(|a| *a == Action::Click(panel))
        .unwrap();
    assert!(nudge < focus);
    session.stop().await;
}

#[tokio::test]
async fn failed_escape_during_nudge_still_scrolls_by_keyboard() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    let sort = page.element("Sort");
    page.on_page(selectors::sort_button_by_label(&ENGLISH), vec![sort]);
    let body = page.element("");
    page.on_page(selectors::body(), vec![body]);
    page.fail_keys(body);
    let panel = page.element("");
    page.on_page(selectors::main_panel(), vec![panel]);

    let report = run_harvest(&session, "bar", dir.path()).await;

    assert_eq!(report.scroll, Some(ScrollMethod::Keyboard));
    assert_eq!(page.count(|a| *a == Action::Key(body, Key::Escape)), 1);
    assert_eq!(
        page.count(|a| *a == Action::Key(panel, Key::PageDown)),
        20
    );
    session.stop().await;
}

#[tokio::test]
async fn known_containers_are_the_last_resort() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    let container = page.element("");
    page.on_page(selectors::known_scroll_containers(), vec![container]);

    let report = run_harvest(&session, "bar", dir.path()).await;

    assert_eq!(report.scroll, Some(ScrollMethod::KnownContainer));
    assert_eq!(scrolls(&page), 10);
    session.stop().await;
}

#[tokio::test]
async fn nothing_to_scroll_still_extracts() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    let review = add_review(&page, "Ana", "today", "Nice", Some("4 stars"));
    page.on_page(ElementQuery::css("div.jftiEf"), vec![review]);

    let report = run_harvest(&session, "bar", dir.path()).await;

    assert_eq!(report.scroll, Some(ScrollMethod::Failed));
    assert_eq!(report.stage, HarvestStage::Saved);
    session.stop().await;
}

#[tokio::test]
async fn harvest_reviews_returns_only_the_path() {
    let (session, page) = open_session(200).await;
    let dir = tempfile::tempdir().unwrap();
    open_reviews_tab(&page);
    let review = add_review(&page, "Ana", "today", "Nice", Some("4 stars"));
    page.on_page(ElementQuery::css("div.jftiEf"), vec![review]);

    let path = harvest_reviews(&session, "bar", dir.path()).await;

    assert_eq!(path, Some(dir.path().join("bar_reviews.csv")));
    session.stop().await;
}

#[tokio::test]
async fn collect_never_exceeds_max_reviews() {
    let page = FakePage::new();
    let elements: Vec<ElementHandle> = (0..10)
        .map(|i| add_review(&page, &format!("R{i}"), "today", "ok", Some("3 stars")))
        .collect();

    let reviews = collect_reviews(&page, &ENGLISH, &elements, 3, Duration::ZERO).await;

    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[2].reviewer_name, "R2");
}

#[tokio::test]
async fn collect_examines_at_most_twice_the_bound() {
    let page = FakePage::new();
    let mut elements: Vec<ElementHandle> = (0..4)
        .map(|_| add_review(&page, "Same", "today", "dup", None))
        .collect();
    elements.push(add_review(&page, "Other", "today", "unique", None));

    let reviews = collect_reviews(&page, &ENGLISH, &elements, 2, Duration::ZERO).await;

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].reviewer_name, "Same");
}

#[tokio::test]
async fn same_reviewer_and_date_collapse_to_one() {
    let page = FakePage::new();
    let elements = vec![
        add_review(&page, "Ana", "a week ago", "first text", Some("5 stars")),
        add_review(&page, "Ana", "a week ago", "second text", Some("2 stars")),
    ];

    let reviews = collect_reviews(&page, &ENGLISH, &elements, 200, Duration::ZERO).await;

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].text, "first text");
}

#[tokio::test]
async fn truncated_text_is_expanded_before_reading() {
    let page = FakePage::new();
    let review = add_review(&page, "Ana", "today", "Short…", None);
    let more = page.element("See more");
    page.within(review, selectors::see_more_button(&ENGLISH), vec![more]);

    let reviews = collect_reviews(&page, &ENGLISH, &[review], 200, Duration::ZERO).await;

    assert_eq!(reviews.len(), 1);
    assert!(page.actions().contains(&Action::Click(more)));
}

#[tokio::test]
async fn unreadable_sub_fields_default_to_empty() {
    let page = FakePage::new();
    let review = page.element("");
    let name = page.element("Ana");
    page.within(review, selectors::reviewer_name(), vec![name]);
    page.fail_text(name);
    let rating = page.element("");
    page.set_attr(rating, "aria-label", "Five stars");
    page.within(review, selectors::review_rating(), vec![rating]);

    let reviews = collect_reviews(&page, &ENGLISH, &[review], 200, Duration::ZERO).await;

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].reviewer_name, "");
    assert_eq!(reviews[0].rating, None);
    assert_eq!(reviews[0].date, "");
    assert_eq!(reviews[0].text, "");
}
