//! Runtime session: fetcher + content store + prompt assembly + LLM.
//!
//! A session owns the store for the life of the process and writes it back
//! to its file after every change.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use docsprompt_fetcher::{FetchProgress, FetchReport, PageFetcher};
use docsprompt_shared::{AppConfig, ContextOptions, FetchConfig, Result};
use docsprompt_store::ContentStore;

use crate::llm::CompletionProvider;
use crate::prompt::{EnhancedPrompt, enhance_prompt};

/// What a page refresh did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The page was not stored before.
    Added,
    /// The page was stored with different content.
    Updated,
    /// The page was stored with the same content.
    Unchanged,
}

impl std::fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        };
        f.pad(s)
    }
}

/// A question answered with store context.
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub enhanced: EnhancedPrompt,
    pub response: String,
}

/// Process-lifetime bundle of fetcher, store and retrieval options.
pub struct Session {
    fetcher: PageFetcher,
    store: ContentStore,
    store_path: PathBuf,
    options: ContextOptions,
}

impl Session {
    /// Build a session from config, loading the store at `store_path`.
    ///
    /// A missing or unreadable store file starts the session empty.
    pub fn open(config: &AppConfig, store_path: impl Into<PathBuf>) -> Result<Self> {
        let store_path = store_path.into();
        let fetcher = PageFetcher::new(FetchConfig::from(config))?;
        let store = ContentStore::load(&store_path);
        Ok(Self::with_parts(
            fetcher,
            store,
            store_path,
            ContextOptions::from(config),
        ))
    }

    /// Assemble a session from already-built parts.
    pub fn with_parts(
        fetcher: PageFetcher,
        store: ContentStore,
        store_path: PathBuf,
        options: ContextOptions,
    ) -> Self {
        Self {
            fetcher,
            store,
            store_path,
            options,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Override the retrieval options for later queries.
    pub fn set_options(&mut self, options: ContextOptions) {
        self.options = options;
    }

    /// Fetch one page, upsert it and save the store.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn refresh_page(&mut self, url: &str) -> Result<RefreshOutcome> {
        let page = self.fetcher.fetch(url).await?;

        let outcome = match self.store.get(&page.identifier) {
            None => RefreshOutcome::Added,
            Some(existing) if existing.same_content(&page) => RefreshOutcome::Unchanged,
            Some(_) => RefreshOutcome::Updated,
        };

        info!(title = %page.title, %outcome, "refreshed page");
        self.store.insert(page);
        self.store.save(&self.store_path)?;
        Ok(outcome)
    }

    /// Fetch a batch of pages, upsert the successes and save the store.
    pub async fn ingest(&mut self, urls: &[String], progress: &dyn FetchProgress) -> Result<FetchReport> {
        let report = self.fetcher.fetch_all(urls, progress).await;
        self.store.extend(report.pages.iter().cloned());

        if !report.pages.is_empty() {
            self.store.save(&self.store_path)?;
        }
        Ok(report)
    }

    /// Enhanced prompt for `question` from the current store.
    pub fn enhance(&self, question: &str) -> EnhancedPrompt {
        enhance_prompt(&self.store, question, &self.options)
    }

    /// Answer `question` through `provider` using store context.
    #[instrument(skip_all, fields(question = %question))]
    pub async fn answer<P: CompletionProvider>(&self, question: &str, provider: &P) -> Result<Answer> {
        let enhanced = self.enhance(question);
        info!(status = %enhanced.status, "context assembled");

        let response = provider.complete(&enhanced.prompt).await?;

        Ok(Answer {
            question: question.to_string(),
            enhanced,
            response,
        })
    }
}
