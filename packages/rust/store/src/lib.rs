//! In-memory content store with JSON file persistence.
//!
//! The [`ContentStore`] maps a page identifier (its URL) to the extracted
//! [`PageRecord`]. It is built once at startup and passed explicitly to the
//! scorer and prompt assembler.
//!
//! **Persistence rules:**
//! - [`ContentStore::load`] never fails: a missing or malformed file is logged
//!   and yields an empty store.
//! - [`ContentStore::save`] writes pretty-printed UTF-8 JSON keyed by URL.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::Path;

use docsprompt_shared::{DocsPromptError, PageRecord, Result};
use tracing::{debug, error, info, warn};

/// Mapping from page identifier to extracted page.
///
/// Iteration order is the lexicographic order of identifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentStore {
    pages: BTreeMap<String, PageRecord>,
}

impl ContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from `path`, falling back to an empty store on any error.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(store) => {
                info!(path = %path.display(), pages = store.len(), "loaded content store");
                store
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load content store, starting empty");
                Self::new()
            }
        }
    }

    /// Load a store from `path`, reporting read and parse errors.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocsPromptError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Parse a store from its JSON form.
    ///
    /// Records are read one by one: a record that cannot be read is logged and
    /// skipped, and the rest still load. Only a document that is not a JSON
    /// object is an error. A record whose embedded `url` is empty takes its
    /// identifier from the key.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| DocsPromptError::Store(format!("invalid store JSON: {e}")))?;

        let mut pages = BTreeMap::new();
        for (key, value) in raw {
            match serde_json::from_value::<PageRecord>(value) {
                Ok(mut page) => {
                    if page.identifier.is_empty() {
                        page.identifier = key.clone();
                    }
                    pages.insert(key, page);
                }
                Err(e) => warn!(url = %key, error = %e, "skipping unreadable store record"),
            }
        }

        Ok(Self { pages })
    }

    /// Serialize the store as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.pages)
            .map_err(|e| DocsPromptError::Store(format!("failed to serialize store: {e}")))
    }

    /// Write the store to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DocsPromptError::io(parent, e))?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| DocsPromptError::io(path, e))?;
        debug!(path = %path.display(), pages = self.len(), "saved content store");
        Ok(())
    }

    /// Insert or replace a page, keyed by its identifier.
    /// Returns the previous record for that identifier, if any.
    pub fn insert(&mut self, page: PageRecord) -> Option<PageRecord> {
        self.pages.insert(page.identifier.clone(), page)
    }

    /// Insert every page, replacing existing records with the same identifier.
    pub fn extend(&mut self, pages: impl IntoIterator<Item = PageRecord>) {
        for page in pages {
            self.insert(page);
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&PageRecord> {
        self.pages.get(identifier)
    }

    pub fn remove(&mut self, identifier: &str) -> Option<PageRecord> {
        self.pages.remove(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.pages.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate `(identifier, page)` pairs in store order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, PageRecord> {
        self.pages.iter()
    }

    /// Iterate stored identifiers in store order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a ContentStore {
    type Item = (&'a String, &'a PageRecord);
    type IntoIter = btree_map::Iter<'a, String, PageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

impl FromIterator<PageRecord> for ContentStore {
    fn from_iter<I: IntoIterator<Item = PageRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}
