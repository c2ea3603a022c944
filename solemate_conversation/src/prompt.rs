//! Rendering a context window into a provider request.

use std::fmt::Write;

use solemate_core::{CatalogFact, PromptMessage, PromptRequest, Role};

use crate::context::ContextWindow;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a virtual sales assistant for an online \
footwear store. Help customers find the right pair of shoes. Be friendly and professional, \
use the earlier conversation, mention price, size and availability when you recommend a \
product, and say so honestly when you do not know something.";

/// Fixed instructions placed ahead of the catalog block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructions {
    pub system_prompt: String,
}

impl Default for Instructions {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Instructions {
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }
}

/// One catalog line as shown to the model, tagged with its citation.
#[must_use]
pub fn fact_line(fact: &CatalogFact) -> String {
    let mut line = format!(
        "- [ref:{}] {} | {} | {} | ${:.2} | {}",
        fact.id,
        fact.name,
        fact.brand,
        fact.category,
        fact.price,
        if fact.in_stock {
            "in stock"
        } else {
            "out of stock"
        }
    );
    if let Some(size) = &fact.size {
        let _ = write!(line, " | size {size}");
    }
    if let Some(color) = &fact.color {
        let _ = write!(line, " | {color}");
    }
    line
}

fn catalog_block(facts: &[CatalogFact]) -> String {
    if facts.is_empty() {
        return "AVAILABLE PRODUCTS:\nNo matching products were found in the catalog for this \
                message. Do not name or recommend specific products."
            .to_string();
    }

    let lines: Vec<String> = facts.iter().map(fact_line).collect();
    format!(
        "AVAILABLE PRODUCTS:\n{}\n\nOnly recommend products from this list. When you mention \
         one, cite it with its tag exactly as shown, for example [ref:{}].",
        lines.join("\n"),
        facts[0].id
    )
}

/// Build the request for one reply: system block, prior turns, then the
/// current user message last.
#[must_use]
pub fn render_prompt(
    window: &ContextWindow,
    instructions: &Instructions,
    current_message: &str,
) -> PromptRequest {
    let system = format!(
        "{}\n\n{}",
        instructions.system_prompt.trim(),
        catalog_block(&window.facts)
    );

    let mut messages: Vec<PromptMessage> = window
        .turns
        .iter()
        .map(|t| PromptMessage {
            role: t.role,
            text: t.text.clone(),
        })
        .collect();
    messages.push(PromptMessage {
        role: Role::User,
        text: current_message.to_string(),
    });

    PromptRequest { system, messages }
}
