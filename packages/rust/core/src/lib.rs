//! Retrieval and prompt assembly for docsprompt.
//!
//! This crate ties the fetcher and the content store together:
//! - [`scorer`] and [`snippet`] rank stored pages against a query
//! - [`prompt`] layers the top matches into an enhanced prompt
//! - [`llm`] sends prompts to an OpenAI-compatible API or a simulated responder
//! - [`term`] summarizes one term from the paragraphs that mention it
//! - [`session`] keeps a store alive across refreshes and questions

pub mod llm;
pub mod prompt;
pub mod scorer;
pub mod session;
pub mod snippet;
pub mod term;

pub use llm::{CompletionProvider, LlmBackend, OpenAiClient, SimulatedLlm};
pub use prompt::{EnhancedPrompt, enhance_prompt};
pub use scorer::search_content;
pub use session::{Answer, RefreshOutcome, Session};
pub use snippet::extract_snippet;
pub use term::{find_term_paragraphs, summarize_term};
