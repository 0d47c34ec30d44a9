//! Lookup strategies for the listing page.
//!
//! Every structural assumption about the target UI lives here. Lists are
//! ordered: callers try them front to back and the first match wins.

use mapharvest_core::LocaleConfig;

use crate::browser::{ElementQuery, ScrollProbe};

pub fn search_box() -> Vec<ElementQuery> {
    vec![
        ElementQuery::css(r#"input[name="q"]"#),
        ElementQuery::css("#searchboxinput"),
    ]
}

pub fn result_list_item() -> ElementQuery {
    ElementQuery::css(r#"div[role="article"]"#)
}

pub fn heading() -> ElementQuery {
    ElementQuery::css("h1")
}

pub fn body() -> ElementQuery {
    ElementQuery::css("body")
}

pub fn consent_button(locale: &LocaleConfig) -> ElementQuery {
    ElementQuery::xpath(format!(
        r#"//*[@aria-label="{}"]"#,
        locale.consent_accept_text
    ))
}

/// Any element whose accessible label contains `needle`.
pub fn aria_label_contains(needle: &str) -> ElementQuery {
    ElementQuery::xpath(format!(r#"//*[contains(@aria-label, "{needle}")]"#))
}

pub fn rating_image(locale: &LocaleConfig) -> ElementQuery {
    ElementQuery::xpath(format!(
        r#"//*[contains(@aria-label, "{}") and @role="img"]"#,
        locale.stars_text
    ))
}

pub fn category_button() -> ElementQuery {
    ElementQuery::xpath(
        r#"//button[contains(@jsaction, "pane.") and contains(@jsaction, ".category")]"#,
    )
}

pub fn place_photo() -> ElementQuery {
    ElementQuery::xpath(r#"//img[@decoding="async"]"#)
}

pub fn reviews_tab(locale: &LocaleConfig) -> ElementQuery {
    ElementQuery::xpath(format!(
        r#"//button[@role="tab" and contains(@aria-label, "{}")]"#,
        locale.reviews_tab_text
    ))
}

pub fn sort_button(locale: &LocaleConfig) -> ElementQuery {
    let sort = locale.sort_text;
    ElementQuery::xpath(format!(
        r#"//button[.//span[text()="{sort}"]] | //span[contains(@class, "GMtm7c") and text()="{sort}"]/ancestor::button"#
    ))
}

/// Sort control located by its accessible label; used to move keyboard
/// focus into the review panel.
pub fn sort_button_by_label(locale: &LocaleConfig) -> ElementQuery {
    ElementQuery::xpath(format!(
        r#"//button[contains(@aria-label, "{}")]"#,
        locale.sort_text
    ))
}

pub fn newest_option(locale: &LocaleConfig) -> ElementQuery {
    let newest = locale.newest_text;
    ElementQuery::xpath(format!(
        r#"//div[@role="menuitemradio" and .//div[text()="{newest}"]] | //div[text()="{newest}"] | //button[.//div[text()="{newest}"]]"#
    ))
}

pub fn review_loaded() -> ElementQuery {
    ElementQuery::css("div.jftiEf, div[data-review-id], div.MyEned")
}

pub fn main_panel() -> ElementQuery {
    ElementQuery::css(r#"div[role="main"]"#)
}

pub fn known_scroll_containers() -> ElementQuery {
    ElementQuery::css("div.m6QErb, div.DxyBCb")
}

/// Review element strategies, most specific first.
pub fn review_elements() -> Vec<ElementQuery> {
    vec![
        ElementQuery::css("div.jftiEf"),
        ElementQuery::css("div[data-review-id]"),
        ElementQuery::css("div.MyEned"),
        ElementQuery::css("div.WNxzHc"),
        ElementQuery::xpath(
            r#"//div[contains(@class, "fontBodyMedium") and .//span[@role="img"]]"#,
        ),
    ]
}

pub fn review_scroll_probe(locale: &LocaleConfig) -> ScrollProbe {
    ScrollProbe {
        min_visible_height: 100,
        content_selectors: vec![
            r#"span[role="img"]"#.to_string(),
            "div.jftiEf".to_string(),
            "div[data-review-id]".to_string(),
        ],
        text_marker: Some(locale.stars_text.to_string()),
    }
}

pub fn see_more_button(locale: &LocaleConfig) -> ElementQuery {
    ElementQuery::css(format!(
        r#"button[aria-label*="{}"]"#,
        locale.see_more_text
    ))
}

pub fn reviewer_name() -> ElementQuery {
    ElementQuery::css("div.d4r55")
}

pub fn review_rating() -> ElementQuery {
    ElementQuery::css(r#"span[role="img"]"#)
}

pub fn review_text() -> ElementQuery {
    ElementQuery::css("span.wiI7pd")
}

pub fn review_date() -> ElementQuery {
    ElementQuery::css("span.rsqaWe")
}
