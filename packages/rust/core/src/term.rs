//! Term finder: collect paragraphs mentioning one term and ask for a summary.

use tracing::{info, instrument};

use docsprompt_shared::Result;

use crate::llm::CompletionProvider;

/// Paragraphs whose text contains `term`, case-insensitively, in order.
pub fn find_term_paragraphs<'a>(paragraphs: &'a [String], term: &str) -> Vec<&'a str> {
    let needle = term.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    paragraphs
        .iter()
        .filter(|p| p.to_ascii_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}

/// One-sentence summary prompt for `term`, or `None` without source text.
pub fn build_summary_prompt(term: &str, paragraphs: &[&str], source_urls: &[String]) -> Option<String> {
    if paragraphs.is_empty() {
        return None;
    }

    let urls = source_urls.join(", ");
    let combined = paragraphs.join(" ");
    Some(format!(
        "Create a 1-sentence summary of what a \"{term}\" is based on the following text from {urls}: \n\n{combined}"
    ))
}

/// Summarize `term` from matching paragraphs.
///
/// The provider is not called when no paragraph mentions the term.
#[instrument(skip_all, fields(term = %term, paragraphs = paragraphs.len()))]
pub async fn summarize_term<P: CompletionProvider>(
    provider: &P,
    term: &str,
    paragraphs: &[&str],
    source_urls: &[String],
) -> Result<String> {
    let Some(prompt) = build_summary_prompt(term, paragraphs, source_urls) else {
        info!("no paragraphs mention the term, skipping completion");
        return Ok(format!("No {term} text found."));
    };

    provider.complete(&prompt).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Echoes the prompt back and remembers how often it was called.
    #[derive(Default)]
    struct EchoProvider {
        calls: Mutex<usize>,
    }

    impl CompletionProvider for EchoProvider {
        async fn complete(&self, prompt: &str) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            Ok(prompt.to_string())
        }
    }

    fn paragraphs() -> Vec<String> {
        vec![
            "Froquetism is the practice of arranging frogs by color.".into(),
            "Unrelated paragraph.".into(),
            "Experts say FROQUETISM started in 1902.".into(),
        ]
    }

    #[test]
    fn finds_paragraphs_case_insensitively() {
        let all = paragraphs();
        let found = find_term_paragraphs(&all, "froquetism");
        assert_eq!(found.len(), 2);
        assert!(found[1].contains("1902"));
    }

    #[test]
    fn blank_term_finds_nothing() {
        let all = paragraphs();
        assert!(find_term_paragraphs(&all, "  ").is_empty());
    }

    #[test]
    fn summary_prompt_lists_sources_and_text() {
        let prompt = build_summary_prompt(
            "froquetism",
            &["First.", "Second."],
            &["https://a.example/intro".into(), "https://a.example/doc".into()],
        )
        .unwrap();

        assert_eq!(
            prompt,
            "Create a 1-sentence summary of what a \"froquetism\" is based on the following text from https://a.example/intro, https://a.example/doc: \n\nFirst. Second."
        );
        assert!(build_summary_prompt("x", &[], &[]).is_none());
    }

    #[tokio::test]
    async fn summarize_skips_provider_without_matches() {
        let provider = EchoProvider::default();
        let answer = summarize_term(&provider, "froquetism", &[], &[]).await.unwrap();
        assert_eq!(answer, "No froquetism text found.");
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn summarize_sends_built_prompt() {
        let provider = EchoProvider::default();
        let all = paragraphs();
        let found = find_term_paragraphs(&all, "froquetism");
        let answer = summarize_term(&provider, "froquetism", &found, &["https://a.example/".into()])
            .await
            .unwrap();

        assert!(answer.starts_with("Create a 1-sentence summary"));
        assert!(answer.contains("arranging frogs"));
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }
}
