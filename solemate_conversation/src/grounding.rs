//! Turning free text into catalog lookups.

use std::sync::OnceLock;

use regex::Regex;
use solemate_core::{CatalogQuery, PriceRange, normalize_term};

use crate::validation::extract_references;

/// Strategy that maps a user message to the catalog terms it mentions.
pub trait TermExtractor: Send + Sync {
    fn extract(&self, message: &str) -> CatalogQuery;
}

const DEFAULT_BRANDS: &[&str] = &[
    "nike",
    "adidas",
    "puma",
    "converse",
    "new balance",
    "reebok",
    "under armour",
    "vans",
    "clarks",
    "timberland",
    "asics",
    "skechers",
    "fila",
    "hoka",
    "salomon",
];

/// Canonical category followed by the words that point to it.
const CATEGORY_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "running",
        &[
            "running", "run", "runner", "runners", "jogging", "marathon", "correr",
        ],
    ),
    (
        "casual",
        &[
            "casual",
            "everyday",
            "street",
            "streetwear",
            "lifestyle",
            "urbano",
            "urbanas",
        ],
    ),
    (
        "training",
        &[
            "training",
            "gym",
            "workout",
            "crossfit",
            "entrenamiento",
            "gimnasio",
        ],
    ),
    (
        "formal",
        &["formal", "dress", "office", "oxford", "oxfords", "elegante"],
    ),
    (
        "outdoor",
        &[
            "outdoor", "hiking", "trail", "boot", "boots", "waterproof", "botas", "montaña",
        ],
    ),
];

const STOP_WORDS: &[&str] = &[
    "about", "above", "affordable", "anything", "available", "below", "best", "between",
    "budget", "cheap", "could", "does", "from", "good", "have", "hello", "item", "less",
    "like", "looking", "luxury", "more", "much", "need", "over", "pair", "pairs", "please",
    "premium", "price", "prices", "product", "recommend", "shoe", "shoes", "show",
    "size", "sneaker", "sneakers", "some", "something", "stock", "tell", "than", "thanks",
    "that", "there", "they", "this", "under", "want", "what", "which", "with", "would",
    "your",
];

static BETWEEN_PATTERN: OnceLock<Regex> = OnceLock::new();
static MAX_PRICE_PATTERN: OnceLock<Regex> = OnceLock::new();
static MIN_PRICE_PATTERN: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex patterns validated at compile time"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Static regex pattern is guaranteed to be valid")
}

fn between_pattern() -> &'static Regex {
    BETWEEN_PATTERN.get_or_init(|| {
        compile(r"(?i)between\s+\$?(\d+(?:\.\d+)?)\s+and\s+\$?(\d+(?:\.\d+)?)")
    })
}

fn max_price_pattern() -> &'static Regex {
    MAX_PRICE_PATTERN.get_or_init(|| {
        compile(r"(?i)\b(?:under|below|less than|up to|cheaper than|menos de)\s+\$?(\d+(?:\.\d+)?)")
    })
}

fn min_price_pattern() -> &'static Regex {
    MIN_PRICE_PATTERN.get_or_init(|| {
        compile(r"(?i)\b(?:over|above|more than|at least|más de)\s+\$?(\d+(?:\.\d+)?)")
    })
}

fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keyword heuristic over brands, category synonyms, price phrases and
/// explicit product ids.
///
/// Free keywords (words of four or more letters outside the stop list) are
/// only used when the message names no brand or category, so a vague message
/// can still hit a product by name.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    brands: Vec<String>,
    cheap_ceiling: f64,
    premium_floor: f64,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            brands: DEFAULT_BRANDS.iter().map(|b| (*b).to_string()).collect(),
            cheap_ceiling: 80.0,
            premium_floor: 150.0,
        }
    }
}

impl KeywordExtractor {
    /// Replace the recognised brand list.
    #[must_use]
    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.brands.clear();
        self.with_extra_brands(brands)
    }

    /// Recognise these brands too, e.g. the ones actually in the catalog.
    #[must_use]
    pub fn with_extra_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.brands.extend(
            brands
                .into_iter()
                .map(|b| normalize_term(b.as_ref()))
                .filter(|b| !b.is_empty()),
        );
        self.brands.sort();
        self.brands.dedup();
        self
    }

    /// Bounds used for "cheap" and "premium" style wording.
    #[must_use]
    pub const fn with_price_tiers(mut self, cheap_ceiling: f64, premium_floor: f64) -> Self {
        self.cheap_ceiling = cheap_ceiling;
        self.premium_floor = premium_floor;
        self
    }

    fn brands_in(&self, padded: &str) -> Vec<String> {
        self.brands
            .iter()
            .filter(|b| padded.contains(&format!(" {b} ")))
            .cloned()
            .collect()
    }

    fn price_in(&self, message: &str, words: &[String]) -> PriceRange {
        let mut range = PriceRange::default();
        let parse = |s: &str| s.parse::<f64>().ok();

        if let Some(cap) = between_pattern().captures(message) {
            let a = cap.get(1).and_then(|m| parse(m.as_str()));
            let b = cap.get(2).and_then(|m| parse(m.as_str()));
            if let (Some(a), Some(b)) = (a, b) {
                range.min = Some(a.min(b));
                range.max = Some(a.max(b));
                return range;
            }
        }

        range.max = max_price_pattern()
            .captures(message)
            .and_then(|cap| cap.get(1))
            .and_then(|m| parse(m.as_str()));
        range.min = min_price_pattern()
            .captures(message)
            .and_then(|cap| cap.get(1))
            .and_then(|m| parse(m.as_str()));

        if range.max.is_none() && mentions(words, &["cheap", "budget", "affordable", "barato"]) {
            range.max = Some(self.cheap_ceiling);
        }
        if range.min.is_none() && mentions(words, &["premium", "luxury", "lujo"]) {
            range.min = Some(self.premium_floor);
        }
        range
    }
}

fn mentions(words: &[String], options: &[&str]) -> bool {
    words.iter().any(|w| options.contains(&w.as_str()))
}

fn categories_in(words: &[String]) -> Vec<String> {
    CATEGORY_SYNONYMS
        .iter()
        .filter(|(_, synonyms)| words.iter().any(|w| synonyms.contains(&w.as_str())))
        .map(|(category, _)| (*category).to_string())
        .collect()
}

fn keywords_in(words: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in words {
        let is_candidate = word.chars().count() >= 4
            && word.chars().all(char::is_alphabetic)
            && !STOP_WORDS.contains(&word.as_str());
        if is_candidate && !keywords.contains(word) {
            keywords.push(word.clone());
        }
    }
    keywords
}

impl TermExtractor for KeywordExtractor {
    fn extract(&self, message: &str) -> CatalogQuery {
        let words = normalize_words(message);
        let padded = format!(" {} ", words.join(" "));

        let brands = self.brands_in(&padded);
        let categories = categories_in(&words);
        let keywords = if brands.is_empty() && categories.is_empty() {
            keywords_in(&words)
        } else {
            Vec::new()
        };

        CatalogQuery {
            brands,
            categories,
            keywords,
            price: self.price_in(message, &words),
            product_ids: extract_references(message),
        }
    }
}
