//! Generative provider adapters and the retry policy the conversation layer
//! wraps around them.

mod gemini;
mod retry;

pub use gemini::GeminiProvider;
pub use retry::RetryPolicy;
pub use solemate_core::CompletionProvider;
