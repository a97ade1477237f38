//! Page fetching and HTML feature extraction.
//!
//! This crate provides:
//! - [`extract`]: title, headings, main text, paragraphs and metadata from HTML
//! - [`engine`]: sequential HTTP fetcher with a politeness delay between requests

pub mod engine;
pub mod extract;

pub use engine::{FetchProgress, FetchReport, PageFetcher, SilentProgress};
pub use extract::extract_page;

#[cfg(test)]
mod tests {
    use super::*;
    use docsprompt_shared::{NO_MAIN_CONTENT, NO_TITLE};

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    const URL: &str = "https://docs.example.com/tutorial-basics/create-a-document";

    // -----------------------------------------------------------------------
    // Docusaurus page
    // -----------------------------------------------------------------------

    #[test]
    fn docusaurus_extracts_title_and_headings() {
        let page = extract_page(URL, &load_fixture("docusaurus.html"));

        assert_eq!(page.identifier, URL);
        assert_eq!(page.title, "Create a Document | My Site");

        let headings: Vec<(u8, &str)> = page
            .headings
            .iter()
            .map(|h| (h.level, h.text.as_str()))
            .collect();
        assert_eq!(
            headings,
            vec![
                (1, "Create a Document"),
                (2, "Create your first Doc"),
                (2, "Configure the Sidebar"),
            ]
        );
    }

    #[test]
    fn docusaurus_main_text_drops_chrome() {
        let page = extract_page(URL, &load_fixture("docusaurus.html"));

        assert!(page.main_text.starts_with("Create a Document"));
        assert!(page.main_text.contains("groups of pages"));
        assert!(page.main_text.contains("docs/hello.md"));
        assert!(page.main_text.contains("automatically creates a sidebar"));
        // Breadcrumbs, TOC aside, doc footer and page footer are not content
        assert!(!page.main_text.contains("Home / Tutorial"));
        assert!(!page.main_text.contains("On this page"));
        assert!(!page.main_text.contains("Edit this page"));
        assert!(!page.main_text.contains("Copyright"));
    }

    #[test]
    fn docusaurus_extracts_paragraphs_and_metadata() {
        let page = extract_page(URL, &load_fixture("docusaurus.html"));

        assert_eq!(page.paragraphs.len(), 3);
        assert_eq!(
            page.paragraphs[0],
            "Documents are groups of pages connected through a sidebar."
        );
        assert_eq!(
            page.metadata.get("keywords").map(String::as_str),
            Some("docs, sidebar, markdown")
        );
        assert!(page.metadata["description"].starts_with("Documents are groups"));
        assert!(page.fetched_at.is_none());
    }

    // -----------------------------------------------------------------------
    // Fallbacks
    // -----------------------------------------------------------------------

    #[test]
    fn article_used_when_no_main() {
        let page = extract_page(URL, &load_fixture("article_only.html"));

        assert_eq!(page.title, "Froquetism Notes");
        assert!(page.main_text.starts_with("Froquetism"));
        assert!(page.main_text.contains("arranging frogs"));
        assert!(!page.main_text.contains("Related pages"));
        assert!(page.metadata.is_empty());
    }

    #[test]
    fn bare_page_uses_placeholders() {
        let page = extract_page(URL, &load_fixture("bare.html"));

        assert_eq!(page.title, NO_TITLE);
        assert_eq!(page.main_text, NO_MAIN_CONTENT);
        assert_eq!(page.headings.len(), 1);
        assert_eq!(page.headings[0].level, 2);
        assert_eq!(page.paragraphs, vec!["Body text outside any main region."]);
    }
}
