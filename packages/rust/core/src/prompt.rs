//! Enhanced-prompt assembly from ranked matches.
//!
//! The assembled prompt layers a fixed preamble, the numbered context
//! sources, the user's question, and a closing answering instruction.

use docsprompt_shared::{ContextOptions, MatchResult};
use docsprompt_store::ContentStore;
use tracing::debug;

use crate::scorer::search_content;

/// Status reported when nothing in the store matched.
pub const NO_MATCHES_STATUS: &str = "No relevant documentation found.";

/// Marker preceding the user's question inside an enhanced prompt.
pub const QUESTION_MARKER: &str = "USER QUESTION:";

const CONTEXT_HEADER: &str = "CONTEXT FROM DOCUMENTATION:";

const ANSWER_INSTRUCTION: &str = "Please answer the user's question using the provided documentation context when relevant. \nIf the context doesn't contain relevant information, mention that and provide general guidance.";

/// A question layered with retrieved context, ready for a language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedPrompt {
    /// Full prompt text; the bare question when nothing matched.
    pub prompt: String,
    /// The numbered source block alone; empty when nothing matched.
    pub context: String,
    /// Short human-readable outcome, for display and logs.
    pub status: String,
    /// Matches included in the context, in rank order.
    pub sources: Vec<MatchResult>,
}

impl EnhancedPrompt {
    /// Whether any context was attached.
    pub fn has_context(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Format matches as numbered source blocks separated by blank lines.
pub fn build_context(matches: &[MatchResult]) -> String {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "\nSource {}: {}\nURL: {}\nContent: {}\n",
                i + 1,
                m.title,
                m.identifier,
                m.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the prompt for `question` from already-selected matches.
///
/// `total_found` is the match count before truncation and only feeds the
/// status line.
pub fn assemble_prompt(question: &str, selected: &[MatchResult], total_found: usize) -> EnhancedPrompt {
    if selected.is_empty() {
        return EnhancedPrompt {
            prompt: question.to_string(),
            context: String::new(),
            status: NO_MATCHES_STATUS.to_string(),
            sources: Vec::new(),
        };
    }

    let context = build_context(selected);
    let prompt = format!(
        "\n{CONTEXT_HEADER}\n{context}\n\n{QUESTION_MARKER} {question}\n\n{ANSWER_INSTRUCTION}\n"
    );

    EnhancedPrompt {
        prompt,
        context,
        status: format!("Found {total_found} relevant sections"),
        sources: selected.to_vec(),
    }
}

/// Search `store` for `question` and assemble the top matches into a prompt.
pub fn enhance_prompt(store: &ContentStore, question: &str, options: &ContextOptions) -> EnhancedPrompt {
    let matches = search_content(store, question, options.snippet_length);
    let total_found = matches.len();
    let selected = &matches[..total_found.min(options.max_context_items)];

    debug!(
        total_found,
        selected = selected.len(),
        "assembled prompt context"
    );

    assemble_prompt(question, selected, total_found)
}

/// The question line of an enhanced prompt, or the whole text if it has none.
pub fn question_of(prompt: &str) -> &str {
    match prompt.split_once(QUESTION_MARKER) {
        Some((_, rest)) => rest
            .split("\n\n")
            .next()
            .unwrap_or(rest)
            .trim(),
        None => prompt.trim(),
    }
}
