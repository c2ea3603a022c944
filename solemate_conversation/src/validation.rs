//! Anti-hallucination checks on generated replies.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::context::ContextWindow;

/// Ways a product id shows up in text: the `[ref:ID]` / `[ref:ID1,ID2]`
/// citation tag, `product #N`, `item N`, a bare `#N`, or a bare `pN` id.
static REF_PATTERN: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn ref_pattern() -> &'static Regex {
    REF_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\[ref:\s*([a-z0-9_,\-\s]+)\]|\b(?:product|item)\s*#?\s*(\d+)\b|#(\d+)\b|\b(p\d+)\b",
        )
        .expect("Static regex pattern is guaranteed to be valid")
    })
}

/// Product ids referenced in `text`, unique, in order of appearance.
#[must_use]
pub fn extract_references(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let mut push = |id: &str| {
        let id = id.trim();
        if !id.is_empty() && !ids.iter().any(|seen| seen.eq_ignore_ascii_case(id)) {
            ids.push(id.to_string());
        }
    };

    for cap in ref_pattern().captures_iter(text) {
        if let Some(tag) = cap.get(1) {
            tag.as_str().split(',').for_each(&mut push);
        } else if let Some(id) = cap.get(2).or_else(|| cap.get(3)).or_else(|| cap.get(4)) {
            push(id.as_str());
        }
    }

    ids
}

/// Why a generated reply was not accepted. Never leaves the orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationRejection {
    #[error("reply is empty")]
    EmptyReply,

    #[error("reply cites products outside the grounding set: {}", .0.join(", "))]
    UnknownProducts(Vec<String>),
}

/// Accept `reply` only if every cited product id is one of the window's facts.
pub fn validate_reply(reply: &str, window: &ContextWindow) -> Result<(), ValidationRejection> {
    if reply.trim().is_empty() {
        return Err(ValidationRejection::EmptyReply);
    }

    let unknown: Vec<String> = extract_references(reply)
        .into_iter()
        .filter(|id| !window.has_fact(id))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ValidationRejection::UnknownProducts(unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solemate_core::CatalogFact;

    fn window_with(ids: &[&str]) -> ContextWindow {
        ContextWindow {
            turns: Vec::new(),
            facts: ids
                .iter()
                .map(|id| CatalogFact {
                    id: (*id).to_string(),
                    name: format!("Shoe {id}"),
                    brand: "Nike".to_string(),
                    category: "Running".to_string(),
                    price: 99.0,
                    in_stock: true,
                    size: None,
                    color: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_extract_references() {
        let refs = extract_references("Try [ref:p1] or [ref:p2, p3]. Again [REF:P1].");
        assert_eq!(refs, ["p1", "p2", "p3"]);
        assert!(extract_references("No citations here").is_empty());
    }

    #[test]
    fn test_extract_untagged_references() {
        let refs = extract_references("Buy product #99, item 7, #3 or p42.");
        assert_eq!(refs, ["99", "7", "3", "p42"]);
        assert!(extract_references("The Pegasus 39 and the 574 Core").is_empty());
    }

    #[test]
    fn test_known_citations_pass() {
        let window = window_with(&["p1"]);
        assert!(validate_reply("Yes, we have the Nike Air [ref:p1] in stock.", &window).is_ok());
        assert!(validate_reply("Yes, we have the Nike Air in stock.", &window).is_ok());
    }

    #[test]
    fn test_unknown_citation_rejected() {
        let window = window_with(&["p1"]);
        assert_eq!(
            validate_reply("The Zoom X [ref:p99] is great.", &window),
            Err(ValidationRejection::UnknownProducts(vec!["p99".to_string()]))
        );
    }

    #[test]
    fn test_untagged_unknown_ids_rejected() {
        let window = window_with(&["p1"]);
        assert_eq!(
            validate_reply("You should buy product #99, it is great.", &window),
            Err(ValidationRejection::UnknownProducts(vec!["99".to_string()]))
        );
        assert!(validate_reply("Have a look at p99.", &window).is_err());
        assert!(validate_reply("The Zoom X [REF:P99] is great.", &window).is_err());
        assert!(validate_reply("Yes, [REF:P1] is in stock.", &window).is_ok());
    }

    #[test]
    fn test_citation_without_facts_rejected() {
        let window = window_with(&[]);
        assert!(validate_reply("Try [ref:1].", &window).is_err());
    }

    #[test]
    fn test_blank_reply_rejected() {
        assert_eq!(
            validate_reply("  \n", &window_with(&["p1"])),
            Err(ValidationRejection::EmptyReply)
        );
    }
}
