//! Locale-specific UI labels.
//!
//! The target site exposes no stable machine-readable attributes for most
//! listing fields, so elements are found by the visible text or the
//! `aria-label` the site renders in the browser's language. Each supported
//! [`Language`] maps to one immutable [`LocaleConfig`] table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocaleError {
    #[error("unsupported locale \"{0}\" (expected ES or EN)")]
    UnsupportedLocale(String),
}

/// The two UI languages the scraper knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ES")]
    Es,
    #[serde(rename = "EN")]
    En,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "ES",
            Language::En => "EN",
        }
    }

    #[must_use]
    pub fn labels(self) -> &'static LocaleConfig {
        match self {
            Language::Es => &SPANISH,
            Language::En => &ENGLISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = LocaleError;

    /// Accepts `ES` or `EN` in any letter case; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ES" => Ok(Language::Es),
            "EN" => Ok(Language::En),
            _ => Err(LocaleError::UnsupportedLocale(s.to_string())),
        }
    }
}

/// Label strings used for every text or aria-label match in one session.
#[derive(Debug, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language: Language,
    /// Chromium `--lang` switch that makes the site render in this locale.
    pub browser_lang_arg: &'static str,
    pub stars_text: &'static str,
    pub reviews_text: &'static str,
    pub address_text: &'static str,
    pub website_text: &'static str,
    pub phone_text: &'static str,
    pub pluscode_text: &'static str,
    /// Substring of the aria-label on the expanded weekly hours table.
    pub hours_text: &'static str,
    /// Boilerplate removed from the hours label before it is stored.
    pub hours_strip: &'static [&'static str],
    /// Separator between days in the hours label; replaced by a newline.
    pub hours_separator: &'static str,
    pub sort_text: &'static str,
    pub newest_text: &'static str,
    pub reviews_tab_text: &'static str,
    pub see_more_text: &'static str,
    pub consent_accept_text: &'static str,
    /// Generic heading shown above a result list; never a place name.
    pub results_heading_text: &'static str,
}

impl LocaleConfig {
    /// Resolve a language code into its label table.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError::UnsupportedLocale`] for anything other than
    /// `ES` or `EN`.
    pub fn resolve(code: &str) -> Result<&'static LocaleConfig, LocaleError> {
        code.parse::<Language>().map(Language::labels)
    }

    /// Returns `true` when `raw` still carries one of the rating label words,
    /// meaning the surrounding text was not reduced to a bare number.
    #[must_use]
    pub fn contains_rating_label(&self, raw: &str) -> bool {
        raw.contains(self.stars_text) || raw.contains(self.reviews_text)
    }
}

pub static SPANISH: LocaleConfig = LocaleConfig {
    language: Language::Es,
    browser_lang_arg: "--lang=es-ES",
    stars_text: "estrellas",
    reviews_text: "reseñas",
    address_text: "Dirección: ",
    website_text: "Sitio web: ",
    phone_text: "Teléfono: ",
    pluscode_text: "Plus Code: ",
    hours_text: "Ocultar el horario de la semana",
    hours_strip: &[" Ocultar el horario de la semana", "El horario podría cambiar"],
    hours_separator: "; ",
    sort_text: "Ordenar",
    newest_text: "Más recientes",
    reviews_tab_text: "Reseñas",
    see_more_text: "Ver más",
    consent_accept_text: "Aceptar todo",
    results_heading_text: "Resultados",
};

pub static ENGLISH: LocaleConfig = LocaleConfig {
    language: Language::En,
    browser_lang_arg: "--lang=en-GB",
    stars_text: "stars",
    reviews_text: "reviews",
    address_text: "Address: ",
    website_text: "Website: ",
    phone_text: "Phone: ",
    pluscode_text: "Plus code: ",
    hours_text: "Hide open hours for the week",
    hours_strip: &[". Hide open hours for the week", "Hours might differ"],
    hours_separator: "; ",
    sort_text: "Sort",
    newest_text: "Newest",
    reviews_tab_text: "Reviews",
    see_more_text: "See more",
    consent_accept_text: "Accept all",
    results_heading_text: "Results",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_english() {
        let labels = LocaleConfig::resolve("EN").unwrap();
        assert_eq!(labels.language, Language::En);
        assert_eq!(labels.stars_text, "stars");
        assert_eq!(labels.browser_lang_arg, "--lang=en-GB");
    }

    #[test]
    fn resolves_spanish_case_insensitively() {
        let labels = LocaleConfig::resolve(" es ").unwrap();
        assert_eq!(labels.language, Language::Es);
        assert_eq!(labels.reviews_text, "reseñas");
    }

    #[test]
    fn unknown_code_fails_fast() {
        let err = LocaleConfig::resolve("FR").unwrap_err();
        assert_eq!(err, LocaleError::UnsupportedLocale("FR".to_string()));
    }

    #[test]
    fn empty_code_fails() {
        assert!(matches!(
            "".parse::<Language>(),
            Err(LocaleError::UnsupportedLocale(_))
        ));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for lang in [Language::Es, Language::En] {
            assert_eq!(lang.to_string().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn detects_leftover_rating_labels() {
        assert!(ENGLISH.contains_rating_label("4.5 stars"));
        assert!(ENGLISH.contains_rating_label("1,234 reviews"));
        assert!(!ENGLISH.contains_rating_label("4.5"));
        assert!(SPANISH.contains_rating_label("120 reseñas"));
    }
}
