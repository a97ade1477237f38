//! Keyword-overlap relevance scoring over a content store.
//!
//! Matching is plain substring containment on ASCII-lowercased text, so the
//! keyword `doc` matches `Docusaurus`.

use docsprompt_shared::{MatchResult, PageRecord};
use docsprompt_store::ContentStore;

use crate::snippet::{extract_snippet, keywords};

/// Points for a title hit.
pub const TITLE_WEIGHT: u32 = 3;
/// Points for each matching heading.
pub const HEADING_WEIGHT: u32 = 2;
/// Points for a main-text hit.
pub const CONTENT_WEIGHT: u32 = 1;

/// Score every stored page against `query`, best first.
///
/// Pages scoring zero are left out. Equal scores keep store order.
pub fn search_content(store: &ContentStore, query: &str, snippet_length: usize) -> Vec<MatchResult> {
    let keywords = keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<MatchResult> = store
        .iter()
        .filter_map(|(url, page)| {
            let (score, matched_sections) = score_page(page, &keywords);
            (score > 0).then(|| MatchResult {
                identifier: url.clone(),
                title: page.title.clone(),
                score,
                matched_sections,
                snippet: extract_snippet(&page.main_text, query, snippet_length),
            })
        })
        .collect();

    // Stable sort keeps store order among ties.
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// Score one page, returning the score and the labels of what matched.
pub fn score_page(page: &PageRecord, keywords: &[String]) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut sections = Vec::new();

    if contains_any(&page.title, keywords) {
        score += TITLE_WEIGHT;
        sections.push("title".to_string());
    }

    for heading in &page.headings {
        if contains_any(&heading.text, keywords) {
            score += HEADING_WEIGHT;
            sections.push(format!("heading: {}", heading.text));
        }
    }

    if contains_any(&page.main_text, keywords) {
        score += CONTENT_WEIGHT;
        sections.push("content".to_string());
    }

    (score, sections)
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    if text.is_empty() {
        return false;
    }
    let lowered = text.to_ascii_lowercase();
    keywords.iter().any(|k| lowered.contains(k.as_str()))
}
