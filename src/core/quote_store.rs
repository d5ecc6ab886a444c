//! In-memory quote list backed by a key-value storage port

use crate::core::error::{QuoteError, Result};
use crate::core::quote::{QuoteRecord, default_quotes, parse_persisted};
use crate::core::storage::{
    FILTER_KEY, KeyValueStorage, LAST_SYNCED_KEY, LAST_VIEWED_KEY, QUOTES_KEY,
};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Synthetic category that matches every record.
pub const ALL_CATEGORIES: &str = "all";

pub struct QuoteStore {
    quotes: Vec<QuoteRecord>,
    selected: String,
    /// Position in `quotes` of the record currently on screen.
    displayed: Option<usize>,
    durable: Arc<dyn KeyValueStorage>,
    session: Arc<dyn KeyValueStorage>,
}

impl QuoteStore {
    /// Creates an empty store. Call [`QuoteStore::load`] to populate it.
    pub fn new(durable: Arc<dyn KeyValueStorage>, session: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            quotes: Vec::new(),
            selected: ALL_CATEGORIES.to_string(),
            displayed: None,
            durable,
            session,
        }
    }

    /// Restores the quote list and the category filter.
    ///
    /// Missing, unparsable or invalid data falls back to the default set,
    /// which is written back so the next load sees it. Never fails.
    pub async fn load(&mut self) {
        match self.read_persisted().await {
            Some(quotes) => {
                debug!("Loaded {} quotes from storage", quotes.len());
                self.quotes = quotes;
            }
            None => {
                info!("No usable quotes in storage, falling back to defaults");
                self.quotes = default_quotes();
                if let Err(e) = self.persist().await {
                    warn!(error = %e, "Failed to persist default quotes");
                }
            }
        }
        self.displayed = None;
        self.selected = self.read_filter().await;
    }

    async fn read_persisted(&self) -> Option<Vec<QuoteRecord>> {
        match self.durable.get(QUOTES_KEY).await {
            Ok(Some(raw)) => parse_persisted(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read quotes from storage");
                None
            }
        }
    }

    async fn read_filter(&self) -> String {
        match self.durable.get(FILTER_KEY).await {
            Ok(Some(category)) if self.is_known_category(&category) => category,
            Ok(Some(category)) => {
                debug!("Dropping stale category filter: {}", category);
                ALL_CATEGORIES.to_string()
            }
            Ok(None) => ALL_CATEGORIES.to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to read category filter");
                ALL_CATEGORIES.to_string()
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.quotes)?;
        self.durable.set(QUOTES_KEY, &raw).await?;
        debug!("Persisted {} quotes", self.quotes.len());
        Ok(())
    }

    /// Appends a manually entered quote. Both fields are trimmed; duplicates
    /// are allowed here. The new record becomes the displayed one.
    pub async fn add(&mut self, text: &str, category: &str) -> Result<QuoteRecord> {
        let (text, category) = (text.trim(), category.trim());
        if text.is_empty() || category.is_empty() {
            return Err(QuoteError::EmptyField);
        }

        let record = QuoteRecord::new(text, category);
        self.quotes.push(record.clone());
        if let Err(e) = self.persist().await {
            self.quotes.pop();
            return Err(e);
        }
        self.display(self.quotes.len() - 1).await;
        info!(text = %record.text, category = %record.category, "Added quote");
        Ok(record)
    }

    /// Pretty printed JSON of the whole list, in store order.
    pub fn export_snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.quotes)?)
    }

    /// Merges a user supplied candidate list, skipping invalid entries and
    /// entries whose dedupe key already exists. Returns the number added.
    pub async fn import_merge(&mut self, candidates: &Value) -> Result<usize> {
        let items = candidates.as_array().ok_or_else(|| {
            QuoteError::InvalidFormat("expected a JSON array of quotes".to_string())
        })?;

        let added = self
            .merge(items.iter().filter_map(QuoteRecord::from_candidate))
            .await?;
        if added > 0 {
            self.display(self.quotes.len() - 1).await;
        }
        Ok(added)
    }

    /// Additive merge shared by import and sync. Existing records are never
    /// touched; the storage write happens once for the whole batch. If that
    /// write fails the batch is dropped again, so memory matches storage.
    pub async fn merge<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = QuoteRecord>,
    {
        let mut seen: HashSet<String> = self.quotes.iter().map(QuoteRecord::dedupe_key).collect();
        let before = self.quotes.len();

        for record in records {
            if !record.is_valid() {
                continue;
            }
            if seen.insert(record.dedupe_key()) {
                self.quotes.push(record);
            } else {
                debug!("Skipping duplicate quote: {:?}", record.text);
            }
        }

        let added = self.quotes.len() - before;
        if added > 0
            && let Err(e) = self.persist().await
        {
            self.quotes.truncate(before);
            return Err(e);
        }
        Ok(added)
    }

    fn filtered_positions(&self, category: &str) -> Vec<usize> {
        self.quotes
            .iter()
            .enumerate()
            .filter(|(_, q)| category == ALL_CATEGORIES || q.category == category)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn filtered_view(&self, category: &str) -> Vec<&QuoteRecord> {
        self.filtered_positions(category)
            .into_iter()
            .map(|i| &self.quotes[i])
            .collect()
    }

    /// `"all"` followed by every distinct category in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for quote in &self.quotes {
            if !categories.contains(&quote.category) {
                categories.push(quote.category.clone());
            }
        }
        categories
    }

    fn is_known_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.quotes.iter().any(|q| q.category == category)
    }

    pub fn selected_category(&self) -> &str {
        &self.selected
    }

    /// Changes and persists the category filter. The session pointer refers
    /// to the old view, so it is dropped.
    pub async fn select_category(&mut self, category: &str) -> Result<()> {
        if !self.is_known_category(category) {
            return Err(QuoteError::UnknownCategory(category.to_string()));
        }
        self.durable.set(FILTER_KEY, category).await?;
        self.selected = category.to_string();
        if let Err(e) = self.session.remove(LAST_VIEWED_KEY).await {
            debug!("Failed to clear last viewed index: {}", e);
        }
        Ok(())
    }

    pub fn current_view(&self) -> Vec<&QuoteRecord> {
        self.filtered_view(&self.selected)
    }

    /// Picks a random record from the current view and makes it the
    /// displayed one.
    pub async fn show_random(&mut self) -> Option<QuoteRecord> {
        let positions = self.filtered_positions(&self.selected);
        let index = *positions.choose(&mut rand::thread_rng())?;
        self.display(index).await;
        Some(self.quotes[index].clone())
    }

    /// Re-displays the record shown last in this session, if it is still
    /// part of the current view.
    pub async fn restore_last_viewed(&mut self) -> Option<QuoteRecord> {
        let raw = match self.session.get(LAST_VIEWED_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                debug!("Failed to read last viewed index: {}", e);
                return None;
            }
        };
        let view_index: usize = raw.parse().ok()?;
        let index = *self.filtered_positions(&self.selected).get(view_index)?;
        self.displayed = Some(index);
        Some(self.quotes[index].clone())
    }

    async fn display(&mut self, index: usize) {
        self.displayed = Some(index);
        let positions = self.filtered_positions(&self.selected);
        let result = match positions.iter().position(|&i| i == index) {
            Some(view_index) => {
                self.session
                    .set(LAST_VIEWED_KEY, &view_index.to_string())
                    .await
            }
            None => self.session.remove(LAST_VIEWED_KEY).await,
        };
        if let Err(e) = result {
            debug!("Failed to update last viewed index: {}", e);
        }
    }

    pub fn displayed(&self) -> Option<&QuoteRecord> {
        self.displayed.and_then(|i| self.quotes.get(i))
    }

    pub async fn mark_synced(&self, at: DateTime<Utc>) -> Result<()> {
        self.durable.set(LAST_SYNCED_KEY, &at.to_rfc3339()).await?;
        Ok(())
    }

    pub async fn last_synced(&self) -> Option<DateTime<Utc>> {
        let raw = self.durable.get(LAST_SYNCED_KEY).await.ok()??;
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn quotes(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quote::parse_candidates;
    use crate::store::memory::MemoryStorage;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct BrokenStorage;

    #[async_trait]
    impl KeyValueStorage for BrokenStorage {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }
        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk on fire"))
        }
        async fn remove(&self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    /// Memory storage whose writes can be switched off.
    #[derive(Default)]
    struct FlakyWrites {
        inner: MemoryStorage,
        failing: AtomicBool,
    }

    impl FlakyWrites {
        fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> anyhow::Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(anyhow!("disk full"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KeyValueStorage for FlakyWrites {
        async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.check()?;
            self.inner.set(key, value).await
        }
        async fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.check()?;
            self.inner.remove(key).await
        }
    }

    async fn flaky_store() -> (QuoteStore, Arc<FlakyWrites>) {
        let durable = Arc::new(FlakyWrites::default());
        let mut store = QuoteStore::new(durable.clone(), Arc::new(MemoryStorage::new()));
        store.load().await;
        durable.fail_writes(true);
        (store, durable)
    }

    fn new_store(durable: Arc<MemoryStorage>) -> QuoteStore {
        QuoteStore::new(durable, Arc::new(MemoryStorage::new()))
    }

    async fn loaded_store() -> (QuoteStore, Arc<MemoryStorage>) {
        let durable = Arc::new(MemoryStorage::new());
        let mut store = new_store(Arc::clone(&durable));
        store.load().await;
        (store, durable)
    }

    #[tokio::test]
    async fn test_load_missing_storage_uses_defaults() {
        let (store, durable) = loaded_store().await;
        assert_eq!(store.quotes(), default_quotes().as_slice());

        // Defaults are written back, so a second load sees the same records
        assert!(durable.get(QUOTES_KEY).await.unwrap().is_some());
        let mut reloaded = new_store(durable);
        reloaded.load().await;
        assert_eq!(reloaded.quotes(), default_quotes().as_slice());
    }

    #[tokio::test]
    async fn test_load_corrupt_storage_uses_defaults() {
        for raw in ["{not json", r#"{"text":"a"}"#, r#"[{"text":"a","category":""}]"#] {
            let durable = Arc::new(MemoryStorage::new());
            durable.set(QUOTES_KEY, raw).await.unwrap();
            let mut store = new_store(Arc::clone(&durable));
            store.load().await;
            assert_eq!(store.len(), 3, "input: {raw}");
        }
    }

    #[tokio::test]
    async fn test_load_survives_failing_storage() {
        let mut store = QuoteStore::new(Arc::new(BrokenStorage), Arc::new(MemoryStorage::new()));
        store.load().await;
        assert_eq!(store.quotes(), default_quotes().as_slice());
        assert_eq!(store.selected_category(), ALL_CATEGORIES);
    }

    #[tokio::test]
    async fn test_load_keeps_persisted_quotes() {
        let durable = Arc::new(MemoryStorage::new());
        durable
            .set(QUOTES_KEY, r#"[{"text":"Stay","category":"Focus"}]"#)
            .await
            .unwrap();
        let mut store = new_store(durable);
        store.load().await;
        assert_eq!(store.quotes(), &[QuoteRecord::new("Stay", "Focus")]);
    }

    #[tokio::test]
    async fn test_add_trims_and_displays() {
        let (mut store, _) = loaded_store().await;
        let record = store.add("  Test quote ", " Testing ").await.unwrap();

        assert_eq!(record, QuoteRecord::new("Test quote", "Testing"));
        assert_eq!(store.len(), 4);
        assert_eq!(store.quotes().last(), Some(&record));
        assert_eq!(store.displayed(), Some(&record));
    }

    #[tokio::test]
    async fn test_add_rejects_empty_fields() {
        let (mut store, _) = loaded_store().await;
        assert!(matches!(
            store.add("   ", "Life").await,
            Err(QuoteError::EmptyField)
        ));
        assert!(matches!(
            store.add("Hello", "").await,
            Err(QuoteError::EmptyField)
        ));
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_add_persists() {
        let (mut store, durable) = loaded_store().await;
        store.add("Persist me", "Storage").await.unwrap();

        let mut reloaded = new_store(durable);
        reloaded.load().await;
        assert_eq!(reloaded.len(), 4);
        assert_eq!(
            reloaded.quotes().last(),
            Some(&QuoteRecord::new("Persist me", "Storage"))
        );
    }

    #[tokio::test]
    async fn test_manual_add_does_not_dedupe_but_import_does() {
        let (mut store, _) = loaded_store().await;
        store.add("Hello", "Life").await.unwrap();
        store.add("  Hello  ", "  Life  ").await.unwrap();
        assert_eq!(store.len(), 5);

        let added = store
            .import_merge(&json!([{"text": "Hello", "category": "Life"}]))
            .await
            .unwrap();
        assert_eq!(added, 0);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() {
        let (mut store, _) = loaded_store().await;
        let err = store
            .import_merge(&json!({"text": "a", "category": "b"}))
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidFormat(_)));
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_import_skips_invalid_and_in_batch_duplicates() {
        let (mut store, _) = loaded_store().await;
        let batch = json!([
            {"text": "New one", "category": "Fresh"},
            {"text": " New one ", "category": "Fresh "},
            {"text": "", "category": "Empty"},
            "not an object",
            {"text": "Another", "category": "Fresh"}
        ]);
        let added = store.import_merge(&batch).await.unwrap();

        assert_eq!(added, 2);
        assert_eq!(store.len(), 5);
        assert_eq!(
            store.displayed(),
            Some(&QuoteRecord::new("Another", "Fresh"))
        );
    }

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let (mut store, _) = loaded_store().await;
        let batch = json!([
            {"text": "One", "category": "A"},
            {"text": "Two", "category": "B"}
        ]);
        assert_eq!(store.import_merge(&batch).await.unwrap(), 2);
        assert_eq!(store.import_merge(&batch).await.unwrap(), 0);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_export_then_import_into_fresh_store() {
        let (mut store, _) = loaded_store().await;
        store.add("Test quote", "Testing").await.unwrap();
        let snapshot = store.export_snapshot().unwrap();

        let mut fresh = new_store(Arc::new(MemoryStorage::new()));
        let added = fresh
            .import_merge(&parse_candidates(&snapshot).unwrap())
            .await
            .unwrap();

        assert_eq!(added, 4);
        assert_eq!(fresh.quotes(), store.quotes());
    }

    #[tokio::test]
    async fn test_export_is_pretty_json() {
        let (store, _) = loaded_store().await;
        let snapshot = store.export_snapshot().unwrap();
        assert!(snapshot.starts_with("[\n"));
        assert!(snapshot.contains("\"category\": \"Motivation\""));
    }

    #[tokio::test]
    async fn test_concrete_scenario() {
        let (mut store, _) = loaded_store().await;
        store.add("Test quote", "Testing").await.unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(
            store.quotes().last(),
            Some(&QuoteRecord::new("Test quote", "Testing"))
        );

        let snapshot = store.export_snapshot().unwrap();
        assert!(snapshot.contains("\"text\": \"Test quote\""));

        let added = store
            .import_merge(&json!([{"text": "Test quote", "category": "Testing"}]))
            .await
            .unwrap();
        assert_eq!(added, 0);
    }

    #[tokio::test]
    async fn test_filtered_view_and_categories() {
        let (mut store, _) = loaded_store().await;
        store.add("Keep going", "Motivation").await.unwrap();

        let all: Vec<_> = store.filtered_view(ALL_CATEGORIES);
        assert_eq!(all.len(), 4);
        assert!(all.iter().zip(store.quotes()).all(|(a, b)| *a == b));

        let motivation = store.filtered_view("Motivation");
        assert_eq!(motivation.len(), 2);
        assert_eq!(motivation[1].text, "Keep going");

        assert!(store.filtered_view("motivation").is_empty());
        assert_eq!(
            store.categories(),
            vec!["all", "Motivation", "Inspiration", "Life"]
        );
    }

    #[tokio::test]
    async fn test_filter_is_persisted_and_validated() {
        let (mut store, durable) = loaded_store().await;
        store.select_category("Life").await.unwrap();
        assert_eq!(store.current_view().len(), 1);

        assert!(matches!(
            store.select_category("Nope").await,
            Err(QuoteError::UnknownCategory(_))
        ));
        assert_eq!(store.selected_category(), "Life");

        let mut reloaded = new_store(Arc::clone(&durable));
        reloaded.load().await;
        assert_eq!(reloaded.selected_category(), "Life");

        // A filter whose category vanished falls back to "all"
        durable
            .set(QUOTES_KEY, r#"[{"text":"Only","category":"Other"}]"#)
            .await
            .unwrap();
        let mut reloaded = new_store(durable);
        reloaded.load().await;
        assert_eq!(reloaded.selected_category(), ALL_CATEGORIES);
    }

    #[tokio::test]
    async fn test_random_quote_respects_filter() {
        let (mut store, _) = loaded_store().await;
        store.select_category("Inspiration").await.unwrap();
        for _ in 0..10 {
            let quote = store.show_random().await.unwrap();
            assert_eq!(quote.category, "Inspiration");
        }
    }

    #[tokio::test]
    async fn test_random_quote_on_empty_store() {
        let mut store = new_store(Arc::new(MemoryStorage::new()));
        assert!(store.show_random().await.is_none());
        assert!(store.displayed().is_none());
    }

    #[tokio::test]
    async fn test_restore_last_viewed() {
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        let mut store = QuoteStore::new(durable.clone(), session.clone());
        store.load().await;

        let shown = store.show_random().await.unwrap();

        let mut same_session = QuoteStore::new(durable.clone(), session);
        same_session.load().await;
        assert_eq!(same_session.restore_last_viewed().await, Some(shown));

        let mut new_session = QuoteStore::new(durable, Arc::new(MemoryStorage::new()));
        new_session.load().await;
        assert!(new_session.restore_last_viewed().await.is_none());
    }

    #[tokio::test]
    async fn test_restore_last_viewed_out_of_range() {
        let session = Arc::new(MemoryStorage::new());
        session.set(LAST_VIEWED_KEY, "42").await.unwrap();
        let mut store = QuoteStore::new(Arc::new(MemoryStorage::new()), session);
        store.load().await;
        assert!(store.restore_last_viewed().await.is_none());
    }

    #[tokio::test]
    async fn test_merge_persists_once_and_never_overwrites() {
        let (mut store, durable) = loaded_store().await;
        let added = store
            .merge(vec![
                QuoteRecord::new("Imagination is more important than knowledge.", "Inspiration"),
                QuoteRecord::new("Remote", "General"),
            ])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(&store.quotes()[..3], default_quotes().as_slice());

        let raw = durable.get(QUOTES_KEY).await.unwrap().unwrap();
        assert_eq!(parse_persisted(&raw).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let (mut store, _) = flaky_store().await;
        store.select_category("Life").await.unwrap_err();
        assert_eq!(store.selected_category(), ALL_CATEGORIES);

        assert!(matches!(
            store.add("Not saved", "Lost").await,
            Err(QuoteError::Storage(_))
        ));
        assert_eq!(store.quotes(), default_quotes().as_slice());
        assert!(store.displayed().is_none());

        let added = store
            .merge(vec![QuoteRecord::new("Remote", "General")])
            .await;
        assert!(added.is_err());
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_import_retry_after_failed_write() {
        let (mut store, durable) = flaky_store().await;
        let batch = json!([
            {"text": "One", "category": "A"},
            {"text": "Two", "category": "B"}
        ]);
        assert!(store.import_merge(&batch).await.is_err());
        assert_eq!(store.len(), 3);

        durable.fail_writes(false);
        assert_eq!(store.import_merge(&batch).await.unwrap(), 2);

        let mut reloaded = QuoteStore::new(durable, Arc::new(MemoryStorage::new()));
        reloaded.load().await;
        assert_eq!(reloaded.len(), 5);
    }

    #[tokio::test]
    async fn test_last_synced_round_trip() {
        let (store, _) = loaded_store().await;
        assert!(store.last_synced().await.is_none());

        let now = Utc::now();
        store.mark_synced(now).await.unwrap();
        let stored = store.last_synced().await.unwrap();
        assert_eq!(stored.timestamp(), now.timestamp());
    }
}
