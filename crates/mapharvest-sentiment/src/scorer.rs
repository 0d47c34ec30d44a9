//! Lexicon scoring and topic classification for place reviews.
//!
//! Both English and Spanish reviews are handled from one word list. Reviews
//! are split into clauses at punctuation and contrast words ("but", "pero"),
//! each clause is scored, and any topic keyword in a clause inherits that
//! clause's polarity.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::SentimentError;
use crate::types::{CategoryBucket, ReviewRecord, ReviewSummary};

/// Review word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("fantastic", 0.5),
    ("wonderful", 0.5),
    ("perfect", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("best", 0.5),
    ("recommend", 0.4),
    ("recommended", 0.4),
    ("nice", 0.3),
    ("lovely", 0.4),
    ("delicious", 0.5),
    ("tasty", 0.4),
    ("fresh", 0.3),
    ("friendly", 0.4),
    ("attentive", 0.4),
    ("helpful", 0.4),
    ("clean", 0.3),
    ("cozy", 0.3),
    ("cheap", 0.3),
    ("quick", 0.3),
    ("fast", 0.3),
    ("beautiful", 0.4),
    ("bueno", 0.3),
    ("buena", 0.3),
    ("buenos", 0.3),
    ("buenas", 0.3),
    ("excelente", 0.5),
    ("excelentes", 0.5),
    ("genial", 0.4),
    ("delicioso", 0.5),
    ("deliciosa", 0.5),
    ("rico", 0.4),
    ("rica", 0.4),
    ("amable", 0.4),
    ("amables", 0.4),
    ("atento", 0.4),
    ("atentos", 0.4),
    ("perfecto", 0.5),
    ("perfecta", 0.5),
    ("recomiendo", 0.4),
    ("recomendable", 0.4),
    ("mejor", 0.5),
    ("limpio", 0.3),
    ("limpia", 0.3),
    ("fresco", 0.3),
    ("acogedor", 0.3),
    ("barato", 0.3),
    ("rápido", 0.3),
    ("rápida", 0.3),
    ("maravilloso", 0.5),
    ("bonito", 0.3),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("rude", -0.5),
    ("unfriendly", -0.5),
    ("dirty", -0.5),
    ("slow", -0.4),
    ("expensive", -0.4),
    ("overpriced", -0.5),
    ("cold", -0.3),
    ("bland", -0.4),
    ("disappointing", -0.5),
    ("disappointed", -0.5),
    ("poor", -0.4),
    ("noisy", -0.3),
    ("mediocre", -0.4),
    ("avoid", -0.5),
    ("malo", -0.4),
    ("mala", -0.4),
    ("malos", -0.4),
    ("pésimo", -0.6),
    ("pésima", -0.6),
    ("peor", -0.6),
    ("sucio", -0.5),
    ("sucia", -0.5),
    ("lento", -0.4),
    ("lenta", -0.4),
    ("caro", -0.4),
    ("carísimo", -0.5),
    ("frío", -0.3),
    ("fría", -0.3),
    ("decepcionante", -0.5),
    ("ruidoso", -0.3),
    ("maleducado", -0.5),
    ("antipático", -0.5),
    ("evitar", -0.5),
];

/// Words that flip the weight of the word right after them.
const NEGATIONS: &[&str] = &["not", "no", "never", "nunca", "nada", "ni"];

/// Words that start a new clause.
const CLAUSE_BREAKS: &[&str] = &["but", "however", "although", "though", "pero", "aunque", "sino"];

/// Topic labels and the words that mention them.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Food",
        &[
            "food", "dish", "dishes", "meal", "meals", "menu", "coffee", "breakfast", "lunch",
            "dinner", "dessert", "drinks", "wine", "beer", "tapas", "pizza", "taste", "comida",
            "plato", "platos", "menú", "café", "desayuno", "cena", "postre", "bebidas", "vino",
            "cerveza", "sabor",
        ],
    ),
    (
        "Service",
        &[
            "service", "staff", "waiter", "waitress", "waiters", "employees", "owner",
            "servicio", "personal", "camarero", "camarera", "camareros", "atención", "dueño",
        ],
    ),
    (
        "Price",
        &[
            "price", "prices", "priced", "value", "cost", "expensive", "overpriced", "cheap",
            "precio", "precios", "caro", "carísimo", "barato",
        ],
    ),
    (
        "Atmosphere",
        &[
            "atmosphere", "ambience", "ambiance", "decor", "music", "vibe", "terrace",
            "ambiente", "decoración", "música", "terraza",
        ],
    ),
    (
        "Cleanliness",
        &[
            "clean", "dirty", "cleanliness", "hygiene", "bathroom", "bathrooms", "toilet",
            "toilets", "limpio", "limpia", "sucio", "sucia", "limpieza", "baño", "baños",
        ],
    ),
    (
        "Wait time",
        &[
            "wait", "waited", "waiting", "queue", "slow", "quick", "fast", "espera", "esperar",
            "esperamos", "cola", "lento", "lenta", "rápido", "rápida",
        ],
    ),
    (
        "Location",
        &[
            "location", "located", "parking", "area", "view", "views", "ubicación", "situado",
            "aparcamiento", "zona", "vistas",
        ],
    ),
];

/// Ratings at or above this count as positive when a clause has no
/// sentiment words of its own.
const POSITIVE_RATING: f32 = 4.0;
const NEGATIVE_RATING: f32 = 2.0;

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphabetic())
        .to_lowercase()
}

fn word_weight(word: &str) -> f32 {
    LEXICON
        .iter()
        .find(|(lex_word, _)| *lex_word == word)
        .map_or(0.0, |&(_, weight)| weight)
}

fn score_words<S: AsRef<str>>(words: &[S]) -> f32 {
    let mut score = 0.0_f32;
    let mut negated = false;
    for word in words {
        let word = word.as_ref();
        if NEGATIONS.contains(&word) {
            negated = true;
            continue;
        }
        let weight = word_weight(word);
        score += if negated { -weight } else { weight };
        negated = false;
    }
    score.clamp(-1.0, 1.0)
}

/// Score a text string using the review lexicon.
///
/// Splits text into lowercase words, sums matching weights (flipping a word
/// preceded by a negation), and clamps the result to `[-1.0, 1.0]`. Returns
/// `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let words: Vec<String> = text.split_whitespace().map(normalize_word).collect();
    score_words(&words)
}

/// Split text into clauses of normalized words.
fn clauses(text: &str) -> Vec<Vec<String>> {
    let mut clauses = Vec::new();
    let mut current = Vec::new();
    for raw in text.split_whitespace() {
        let word = normalize_word(raw);
        if CLAUSE_BREAKS.contains(&word.as_str()) {
            if !current.is_empty() {
                clauses.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !word.is_empty() {
            current.push(word);
        }
        if raw.ends_with(['.', '!', '?', ';', ',', ':']) && !current.is_empty() {
            clauses.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    clauses
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Polarity {
    Positive,
    Negative,
}

fn clause_polarity(words: &[String], rating: Option<f32>) -> Option<Polarity> {
    let score = score_words(words);
    if score > 0.0 {
        return Some(Polarity::Positive);
    }
    if score < 0.0 {
        return Some(Polarity::Negative);
    }
    match rating {
        Some(r) if r >= POSITIVE_RATING => Some(Polarity::Positive),
        Some(r) if r <= NEGATIVE_RATING => Some(Polarity::Negative),
        _ => None,
    }
}

/// Topic mentions in one review, at most one per category and polarity.
fn review_mentions(review: &ReviewRecord) -> BTreeSet<(&'static str, Polarity)> {
    let mut mentions = BTreeSet::new();
    for clause in clauses(&review.text) {
        let topics: Vec<&'static str> = CATEGORIES
            .iter()
            .filter(|(_, words)| clause.iter().any(|w| words.contains(&w.as_str())))
            .map(|(label, _)| *label)
            .collect();
        if topics.is_empty() {
            continue;
        }
        if let Some(polarity) = clause_polarity(&clause, review.rating) {
            mentions.extend(topics.into_iter().map(|label| (label, polarity)));
        }
    }
    mentions
}

fn into_buckets(groups: BTreeMap<&'static str, Vec<usize>>) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> = groups
        .into_iter()
        .map(|(label, review_ids)| CategoryBucket {
            label: label.to_string(),
            count: review_ids.len(),
            review_ids,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    buckets
}

/// Groups reviews into positive and negative topic buckets.
pub trait ReviewClassifier {
    /// # Errors
    ///
    /// Implementations backed by an external service return
    /// [`SentimentError::Classifier`] when it is unavailable.
    fn classify(&self, reviews: &[ReviewRecord]) -> Result<ReviewSummary, SentimentError>;
}

/// Offline classifier driven by [`LEXICON`] and a fixed topic word list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl ReviewClassifier for LexiconClassifier {
    fn classify(&self, reviews: &[ReviewRecord]) -> Result<ReviewSummary, SentimentError> {
        let mut positive: BTreeMap<&'static str, Vec<usize>> = BTreeMap::new();
        let mut negative: BTreeMap<&'static str, Vec<usize>> = BTreeMap::new();

        for review in reviews {
            for (label, polarity) in review_mentions(review) {
                let groups = match polarity {
                    Polarity::Positive => &mut positive,
                    Polarity::Negative => &mut negative,
                };
                groups.entry(label).or_default().push(review.id);
            }
        }

        let positive_categories = into_buckets(positive);
        let negative_categories = into_buckets(negative);
        Ok(ReviewSummary {
            total_positive_mentions: positive_categories.iter().map(|b| b.count).sum(),
            total_negative_mentions: negative_categories.iter().map(|b| b.count).sum(),
            positive_categories,
            negative_categories,
            reviews_by_id: reviews.iter().map(|r| (r.id, r.clone())).collect(),
        })
    }
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
