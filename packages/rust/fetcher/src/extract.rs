//! HTML feature extraction: title, headings, main text, paragraphs, metadata.
//!
//! The primary content region is the first `<main>`, else the first
//! `<article>`. Navigation chrome nested inside it is skipped.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use docsprompt_shared::{Heading, NO_MAIN_CONTENT, NO_TITLE, PageRecord};
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never counts as main content.
const CHROME_TAGS: &[&str] = &["nav", "aside", "footer", "script", "style"];

/// `<meta name=...>` fields copied into [`PageRecord::metadata`].
const META_FIELDS: &[&str] = &["description", "keywords"];

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));
static MAIN_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main").expect("valid selector"));
static ARTICLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article").expect("valid selector"));
static PARAGRAPH_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));

/// Build a [`PageRecord`] from a raw HTML document.
///
/// `fetched_at` is left unset; the fetch engine stamps it.
pub fn extract_page(url: &str, html: &str) -> PageRecord {
    let doc = Html::parse_document(html);

    PageRecord {
        identifier: url.to_string(),
        title: extract_title(&doc),
        headings: extract_headings(&doc),
        main_text: extract_main_text(&doc),
        paragraphs: extract_paragraphs(&doc),
        metadata: extract_metadata(&doc),
        fetched_at: None,
    }
}

/// Text of the `<title>` element, trimmed.
pub(crate) fn extract_title(doc: &Html) -> String {
    doc.select(&TITLE_SEL)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Every `h1`–`h6` in document order.
pub(crate) fn extract_headings(doc: &Html) -> Vec<Heading> {
    doc.select(&HEADING_SEL)
        .map(|el| {
            let level: u8 = el.value().name()[1..].parse().unwrap_or(1);
            Heading::new(level, el.text().collect::<String>().trim())
        })
        .collect()
}

/// Text of the primary content region with chrome removed.
pub(crate) fn extract_main_text(doc: &Html) -> String {
    let region = doc
        .select(&MAIN_SEL)
        .next()
        .or_else(|| doc.select(&ARTICLE_SEL).next());

    match region {
        Some(el) => {
            let mut text = String::new();
            collect_text(el, &mut text);
            text.trim().to_string()
        }
        None => NO_MAIN_CONTENT.to_string(),
    }
}

/// Non-empty `<p>` texts in document order.
pub(crate) fn extract_paragraphs(doc: &Html) -> Vec<String> {
    doc.select(&PARAGRAPH_SEL)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// `description` / `keywords` meta tags; a tag without `content` maps to "".
pub(crate) fn extract_metadata(doc: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for field in META_FIELDS {
        let Ok(sel) = Selector::parse(&format!(r#"meta[name="{field}"]"#)) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            let content = el.value().attr("content").unwrap_or_default();
            metadata.insert((*field).to_string(), content.to_string());
        }
    }

    metadata
}

/// Append the text under `el` to `out`, skipping chrome subtrees.
fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if CHROME_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_text_skips_nested_chrome() {
        let html = r#"<html><body><main>
            <nav>Breadcrumbs</nav>
            <p>Kept text.</p>
            <aside>Table of contents</aside>
            <div><footer>Edit this page</footer><span>Also kept.</span></div>
        </main></body></html>"#;
        let doc = Html::parse_document(html);
        let text = extract_main_text(&doc);

        assert!(text.contains("Kept text."));
        assert!(text.contains("Also kept."));
        assert!(!text.contains("Breadcrumbs"));
        assert!(!text.contains("Table of contents"));
        assert!(!text.contains("Edit this page"));
    }

    #[test]
    fn main_wins_over_article() {
        let html = r#"<html><body>
            <article>Article body</article>
            <main>Main body</main>
        </body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_main_text(&doc), "Main body");
    }

    #[test]
    fn empty_title_is_kept_empty() {
        let doc = Html::parse_document("<html><head><title>  </title></head></html>");
        assert_eq!(extract_title(&doc), "");
    }

    #[test]
    fn meta_without_content_maps_to_empty() {
        let doc = Html::parse_document(
            r#"<html><head><meta name="keywords"></head><body></body></html>"#,
        );
        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.get("keywords").map(String::as_str), Some(""));
        assert!(!metadata.contains_key("description"));
    }

    #[test]
    fn heading_levels_follow_tag() {
        let doc = Html::parse_document("<h3>Three</h3><h1>One</h1><h6> Six </h6>");
        let headings = extract_headings(&doc);
        let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![3, 1, 6]);
        assert_eq!(headings[2].text, "Six");
    }
}
