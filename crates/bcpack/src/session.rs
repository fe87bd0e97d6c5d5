//! Selection tracking and version comparison state.
//!
//! A [`Session`] holds the current [`Selection`], both loaded archives and the
//! merged change list. Loading is split in two so it can run off the session:
//!
//! 1. [`Session::select`] records the selection, bumps the generation and
//!    returns a [`LoadTicket`].
//! 2. [`LoadTicket::load`] fetches and decodes both versions.
//! 3. [`Session::apply`] installs the result, unless a newer selection was
//!    made in the meantime, in which case the result is dropped.
//!
//! State changes are announced on a channel, see [`Session::events`].

use std::fmt;
use std::sync::Arc;

use bcpack_archive::{ArchiveIndex, Content, PackArchive};
use bcpack_common::{Category, Locale};
use bcpack_diff::{merge, FingerprintCache, LabeledFile, LineDiff, ListFilter, MergeSummary, Side};
use bcpack_fetch::{ArchiveKey, Fetcher};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Which of the two loaded versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Slot {
    /// The version being inspected.
    Base,
    /// The version it is compared against.
    Compared,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::Base => "base",
            Slot::Compared => "compared",
        })
    }
}

/// What to load: one locale and category, one or two versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Selection {
    pub locale: Locale,
    pub version: String,
    pub compared_version: Option<String>,
    pub category: Category,
}

impl Selection {
    pub fn new(locale: Locale, version: impl Into<String>, category: Category) -> Self {
        Self {
            locale,
            version: version.into(),
            compared_version: None,
            category,
        }
    }

    pub fn with_compared(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.compared_version = (!version.is_empty()).then_some(version);
        self
    }

    pub fn base_key(&self) -> ArchiveKey {
        ArchiveKey::new(self.locale, self.version.clone(), self.category)
    }

    pub fn compared_key(&self) -> Option<ArchiveKey> {
        self.compared_version
            .as_ref()
            .map(|version| ArchiveKey::new(self.locale, version.clone(), self.category))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.locale, self.version)?;
        if let Some(ref compared) = self.compared_version {
            write!(f, "..{}", compared)?;
        }
        write!(f, "/{}", self.category)
    }
}

/// Notifications emitted by a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new selection became current.
    Selected { generation: u64, selection: Selection },
    /// A version could not be fetched and was treated as empty.
    FetchFailed { generation: u64, slot: Slot, error: String },
    /// A version's index could not be decoded and was treated as empty.
    DecodeFailed { generation: u64, slot: Slot, error: String },
    /// The merged list was recomputed.
    Merged { generation: u64, summary: MergeSummary },
    /// A load finished after a newer selection was made and was dropped.
    Discarded { generation: u64, current: u64 },
    /// The selected file changed.
    FileSelected { name: Option<String> },
}

/// A pending load for one selection.
///
/// Owns everything it needs, so it can be moved into a spawned task.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    selection: Selection,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Fetch and decode both versions concurrently.
    ///
    /// Never fails: an unavailable or undecodable version becomes an empty
    /// archive and the failure is reported when the result is applied.
    pub async fn load(self, fetcher: &dyn Fetcher) -> Loaded {
        let Self {
            generation,
            selection,
        } = self;
        let (locale, category) = (selection.locale, selection.category);

        let base = load_slot(fetcher, selection.base_key(), Slot::Base, generation);
        let compared = async {
            match selection.compared_key() {
                Some(key) => load_slot(fetcher, key, Slot::Compared, generation).await,
                None => (PackArchive::empty(locale, category), None),
            }
        };
        let ((base, base_failure), (compared, compared_failure)) = tokio::join!(base, compared);

        Loaded {
            generation,
            selection,
            base,
            compared,
            failures: base_failure.into_iter().chain(compared_failure).collect(),
        }
    }
}

async fn load_slot(
    fetcher: &dyn Fetcher,
    key: ArchiveKey,
    slot: Slot,
    generation: u64,
) -> (PackArchive, Option<SessionEvent>) {
    let (locale, category) = (key.locale, key.category);

    let pair = match fetcher.fetch_pair(&key).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!(%key, %slot, error = %e, "archive unavailable, treating as empty");
            let event = SessionEvent::FetchFailed {
                generation,
                slot,
                error: e.to_string(),
            };
            return (PackArchive::empty(locale, category), Some(event));
        }
    };

    match ArchiveIndex::decode(&pair.list) {
        Ok(index) => {
            debug!(%key, files = index.len(), pack_len = pair.pack.len(), "archive loaded");
            (PackArchive::from_parts(locale, category, index, pair.pack), None)
        }
        Err(e) => {
            warn!(%key, %slot, error = %e, "index decode failed, treating as empty");
            let event = SessionEvent::DecodeFailed {
                generation,
                slot,
                error: e.to_string(),
            };
            let archive = PackArchive::from_parts(locale, category, ArchiveIndex::empty(), pair.pack);
            (archive, Some(event))
        }
    }
}

/// Both versions of a finished load, tagged with the generation that
/// requested them.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub generation: u64,
    pub selection: Selection,
    pub base: PackArchive,
    pub compared: PackArchive,
    failures: Vec<SessionEvent>,
}

impl Loaded {
    /// Fetch and decode failures encountered while loading.
    pub fn failures(&self) -> &[SessionEvent] {
        &self.failures
    }
}

/// Decoded content of one file in both versions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileDiff {
    pub name: String,
    pub label: Option<bcpack_diff::Label>,
    pub base: Option<Content>,
    pub compared: Option<Content>,
    /// Present when both sides decoded to text.
    pub lines: Option<LineDiff>,
}

/// Current selection, loaded archives, and merged change list.
pub struct Session {
    fetcher: Arc<dyn Fetcher>,
    generation: u64,
    selection: Option<Selection>,
    base: PackArchive,
    compared: PackArchive,
    base_cache: Arc<FingerprintCache>,
    compared_cache: Arc<FingerprintCache>,
    merged: Vec<LabeledFile>,
    filter: ListFilter,
    selected_file: Option<String>,
    subscribers: Mutex<Vec<Sender<SessionEvent>>>,
}

impl Session {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            generation: 0,
            selection: None,
            base: PackArchive::empty(Locale::Jp, Category::default()),
            compared: PackArchive::empty(Locale::Jp, Category::default()),
            base_cache: Arc::new(FingerprintCache::new()),
            compared_cache: Arc::new(FingerprintCache::new()),
            merged: Vec::new(),
            filter: ListFilter::default(),
            selected_file: None,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to state change notifications.
    ///
    /// Each call returns a new receiver that sees every event emitted from
    /// then on. Dropping the receiver unsubscribes it.
    pub fn events(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Number of live event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn fetcher(&self) -> Arc<dyn Fetcher> {
        Arc::clone(&self.fetcher)
    }

    fn emit(&self, event: SessionEvent) {
        // Sending fails only once the receiver is gone; drop those senders.
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Make `selection` current and return a ticket to load it.
    ///
    /// Any load still in flight for an earlier selection becomes stale.
    pub fn select(&mut self, selection: Selection) -> LoadTicket {
        self.generation += 1;
        debug!(generation = self.generation, %selection, "selection changed");

        self.selection = Some(selection.clone());
        self.emit(SessionEvent::Selected {
            generation: self.generation,
            selection: selection.clone(),
        });

        LoadTicket {
            generation: self.generation,
            selection,
        }
    }

    /// Install a finished load. Returns `false` if it was stale and dropped.
    ///
    /// Merges on the calling thread; [`refresh`](Self::refresh) moves the
    /// merge off the async runtime instead.
    pub fn apply(&mut self, loaded: Loaded) -> bool {
        let Some(selection) = self.install(loaded) else {
            return false;
        };
        let merged = self.merge_job()();
        self.finish_merge(&selection, merged);
        true
    }

    /// Select, load and apply in one step.
    pub async fn refresh(&mut self, selection: Selection) -> bool {
        let ticket = self.select(selection);
        let fetcher = self.fetcher();
        let loaded = ticket.load(fetcher.as_ref()).await;

        let Some(selection) = self.install(loaded) else {
            return false;
        };
        let merged = match tokio::task::spawn_blocking(self.merge_job()).await {
            Ok(merged) => merged,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(error = %e, "merge task cancelled, merging inline");
                self.merge_job()()
            }
        };
        self.finish_merge(&selection, merged);
        true
    }

    /// Swap in a load's archives and reset the fingerprint caches.
    /// Returns the loaded selection, or `None` when the load is stale.
    fn install(&mut self, loaded: Loaded) -> Option<Selection> {
        if loaded.generation != self.generation {
            debug!(
                stale = loaded.generation,
                current = self.generation,
                "discarding stale load"
            );
            self.emit(SessionEvent::Discarded {
                generation: loaded.generation,
                current: self.generation,
            });
            return None;
        }

        for failure in loaded.failures {
            self.emit(failure);
        }

        self.base = loaded.base;
        self.compared = loaded.compared;
        self.base_cache.invalidate();
        self.compared_cache.invalidate();

        Some(loaded.selection)
    }

    /// The merge of the installed archives, detached from `self`.
    fn merge_job(&self) -> impl FnOnce() -> Vec<LabeledFile> + Send + 'static {
        let (base, compared) = (self.base.clone(), self.compared.clone());
        let base_cache = Arc::clone(&self.base_cache);
        let compared_cache = Arc::clone(&self.compared_cache);

        move || {
            merge(
                Side::of(&base, &base_cache),
                Side::of(&compared, &compared_cache),
            )
        }
    }

    fn finish_merge(&mut self, selection: &Selection, merged: Vec<LabeledFile>) {
        self.merged = merged;
        let summary = MergeSummary::of(&self.merged);
        info!(
            %selection,
            files = self.merged.len(),
            changed = summary.changed(),
            "versions merged"
        );
        self.emit(SessionEvent::Merged {
            generation: self.generation,
            summary,
        });

        let selected_gone = self
            .selected_file
            .as_deref()
            .is_some_and(|name| !self.contains(name));
        if selected_gone {
            self.selected_file = None;
            self.emit(SessionEvent::FileSelected { name: None });
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn archive(&self, slot: Slot) -> &PackArchive {
        match slot {
            Slot::Base => &self.base,
            Slot::Compared => &self.compared,
        }
    }

    pub fn cache(&self, slot: Slot) -> &FingerprintCache {
        match slot {
            Slot::Base => &self.base_cache,
            Slot::Compared => &self.compared_cache,
        }
    }

    /// The labeled list of every file in either version.
    pub fn merged(&self) -> &[LabeledFile] {
        &self.merged
    }

    pub fn summary(&self) -> MergeSummary {
        MergeSummary::of(&self.merged)
    }

    /// The merged list with the current filter applied.
    pub fn filtered(&self) -> Vec<&LabeledFile> {
        self.filter.apply(&self.merged)
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ListFilter) {
        self.filter = filter;
    }

    fn contains(&self, name: &str) -> bool {
        self.merged.iter().any(|file| file.name() == name)
    }

    /// Select a file of the merged list. Returns `false` for unknown names.
    pub fn select_file(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.selected_file = Some(name.to_string());
        self.emit(SessionEvent::FileSelected {
            name: Some(name.to_string()),
        });
        true
    }

    pub fn selected_file(&self) -> Option<&LabeledFile> {
        let name = self.selected_file.as_deref()?;
        self.merged.iter().find(|file| file.name() == name)
    }

    /// Decrypt a file from one version.
    pub fn extract(&self, slot: Slot, name: &str) -> Result<Content> {
        Ok(self.archive(slot).extract(name)?)
    }

    /// Decrypt a file from both versions and diff the text.
    pub fn file_diff(&self, name: &str) -> Result<FileDiff> {
        let base = read_optional(&self.base, name)?;
        let compared = read_optional(&self.compared, name)?;
        if base.is_none() && compared.is_none() {
            return Err(Error::FileNotFound(name.to_string()));
        }

        let lines = match (
            base.as_ref().and_then(Content::as_text),
            compared.as_ref().and_then(Content::as_text),
        ) {
            (Some(old), Some(new)) => Some(LineDiff::compute(old, new)),
            _ => None,
        };
        let label = self
            .merged
            .iter()
            .find(|file| file.name() == name)
            .map(|file| file.label);

        Ok(FileDiff {
            name: name.to_string(),
            label,
            base,
            compared,
            lines,
        })
    }
}

fn read_optional(archive: &PackArchive, name: &str) -> Result<Option<Content>> {
    archive
        .find(name)
        .map(|entry| archive.read(entry))
        .transpose()
        .map_err(Error::from)
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.generation)
            .field("selection", &self.selection)
            .field("base", &self.base)
            .field("compared", &self.compared)
            .field("merged", &self.merged.len())
            .field("filter", &self.filter)
            .field("selected_file", &self.selected_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use bcpack_archive::fixture::PackBuilder;
    use bcpack_diff::{DiffKind, Label};
    use bcpack_fetch::{FetchError, ResourceKind};

    const LOCALE: Locale = Locale::Jp;
    const CATEGORY: Category = Category::DataLocal;

    #[derive(Default)]
    struct MemoryFetcher {
        files: HashMap<String, Vec<u8>>,
        delays: HashMap<String, Duration>,
    }

    impl MemoryFetcher {
        fn with_version(mut self, version: &str, files: &[(&str, &str)]) -> Self {
            let builder = files
                .iter()
                .fold(PackBuilder::new(), |b, (name, data)| {
                    b.encrypted(LOCALE, name, data.as_bytes())
                });
            let (list, pack) = builder.build();
            self.with_raw(version, list, pack)
        }

        fn with_raw(mut self, version: &str, list: Vec<u8>, pack: Vec<u8>) -> Self {
            let key = ArchiveKey::new(LOCALE, version, CATEGORY);
            self.files.insert(key.resource(ResourceKind::List), list);
            self.files.insert(key.resource(ResourceKind::Pack), pack);
            self
        }

        fn with_delay(mut self, version: &str, delay: Duration) -> Self {
            self.delays.insert(version.to_string(), delay);
            self
        }

        fn into_session(self) -> Session {
            Session::new(Arc::new(self))
        }
    }

    #[async_trait]
    impl Fetcher for MemoryFetcher {
        async fn fetch(&self, key: &ArchiveKey, kind: ResourceKind) -> bcpack_fetch::Result<Vec<u8>> {
            if let Some(delay) = self.delays.get(&key.version) {
                tokio::time::sleep(*delay).await;
            }
            let resource = key.resource(kind);
            self.files
                .get(&resource)
                .cloned()
                .ok_or(FetchError::NotFound { resource })
        }
    }

    fn fetcher() -> MemoryFetcher {
        MemoryFetcher::default()
            .with_version("1.0", &[("x.csv", "1\n2\n3"), ("y.csv", "same"), ("w.csv", "old")])
            .with_version("2.0", &[("y.csv", "same"), ("z.csv", "new"), ("w.csv", "old!")])
            .with_version("3.0", &[("only.csv", "alone")])
    }

    fn selection(version: &str, compared: &str) -> Selection {
        Selection::new(LOCALE, version, CATEGORY).with_compared(compared)
    }

    fn labels(files: &[LabeledFile]) -> Vec<(&str, Label)> {
        files.iter().map(|f| (f.name(), f.label)).collect()
    }

    fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
        rx.try_iter().collect()
    }

    #[tokio::test]
    async fn test_refresh_merges_versions() {
        let mut session = fetcher().into_session();
        let events = session.events();

        assert!(session.refresh(selection("1.0", "2.0")).await);

        assert_eq!(
            labels(session.merged()),
            [
                ("x.csv", Label::Removed),
                ("y.csv", Label::Unchanged),
                ("w.csv", Label::Modified),
                ("z.csv", Label::Added),
            ]
        );
        assert_eq!(session.generation(), 1);

        let events = drain(&events);
        assert!(matches!(events[0], SessionEvent::Selected { generation: 1, .. }));
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::Merged { generation: 1, summary } if summary.changed() == 3
        )));
    }

    #[tokio::test]
    async fn test_without_compared_all_unchanged() {
        let mut session = fetcher().into_session();
        session
            .refresh(Selection::new(LOCALE, "1.0", CATEGORY))
            .await;

        assert_eq!(session.merged().len(), 3);
        assert!(session.merged().iter().all(|f| f.label == Label::Unchanged));
    }

    #[tokio::test]
    async fn test_missing_compared_is_empty() {
        let mut session = fetcher().into_session();
        let events = session.events();

        session.refresh(selection("1.0", "9.9")).await;

        assert!(session.merged().iter().all(|f| f.label == Label::Unchanged));
        assert!(drain(&events).iter().any(|e| matches!(
            e,
            SessionEvent::FetchFailed { slot: Slot::Compared, .. }
        )));
    }

    #[tokio::test]
    async fn test_missing_base_all_added() {
        let mut session = fetcher().into_session();
        session.refresh(selection("0.9", "3.0")).await;

        assert_eq!(labels(session.merged()), [("only.csv", Label::Added)]);
        assert_eq!(session.archive(Slot::Base).entry_count(), 0);
    }

    #[tokio::test]
    async fn test_decode_failure_empties_index() {
        let mut session = fetcher()
            .with_raw("bad", vec![0u8; 15], vec![1, 2, 3])
            .into_session();
        let events = session.events();

        session.refresh(selection("bad", "3.0")).await;

        assert_eq!(session.archive(Slot::Base).entry_count(), 0);
        assert_eq!(session.archive(Slot::Base).pack(), &[1u8, 2, 3][..]);
        assert_eq!(labels(session.merged()), [("only.csv", Label::Added)]);
        assert!(drain(&events).iter().any(|e| matches!(
            e,
            SessionEvent::DecodeFailed { slot: Slot::Base, .. }
        )));
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let mut session = fetcher().into_session();
        let events = session.events();
        let fetcher = session.fetcher();

        let first = session.select(selection("1.0", "2.0"));
        let second = session.select(selection("3.0", ""));

        let second = second.load(fetcher.as_ref()).await;
        let first = first.load(fetcher.as_ref()).await;

        assert!(session.apply(second));
        assert!(!session.apply(first));

        assert_eq!(session.selection(), Some(&selection("3.0", "")));
        assert_eq!(labels(session.merged()), [("only.csv", Label::Unchanged)]);
        assert!(drain(&events).contains(&SessionEvent::Discarded {
            generation: 1,
            current: 2
        }));
    }

    #[tokio::test]
    async fn test_slow_first_selection_loses() {
        let mut session = fetcher()
            .with_delay("1.0", Duration::from_millis(50))
            .into_session();
        let fetcher = session.fetcher();

        let slow = session.select(selection("1.0", "2.0"));
        let fast = session.select(selection("3.0", ""));

        let slow = tokio::spawn({
            let fetcher = Arc::clone(&fetcher);
            async move { slow.load(fetcher.as_ref()).await }
        });
        let fast = tokio::spawn({
            let fetcher = Arc::clone(&fetcher);
            async move { fast.load(fetcher.as_ref()).await }
        });

        // Apply in completion order: the later selection resolves first.
        assert!(session.apply(fast.await.unwrap()));
        assert!(!session.apply(slow.await.unwrap()));

        assert_eq!(session.generation(), 2);
        assert_eq!(labels(session.merged()), [("only.csv", Label::Unchanged)]);
    }

    #[tokio::test]
    async fn test_reload_recomputes_fingerprints() {
        let mut session = fetcher().into_session();

        session.refresh(selection("1.0", "2.0")).await;
        let computed = session.cache(Slot::Base).computed();
        assert_eq!(computed, 2);

        session.refresh(selection("1.0", "2.0")).await;
        assert_eq!(session.cache(Slot::Base).computed(), computed * 2);
        assert_eq!(session.cache(Slot::Base).generation(), 2);
    }

    #[tokio::test]
    async fn test_file_diff_text() {
        let mut session = fetcher().into_session();
        session.refresh(selection("1.0", "2.0")).await;

        let diff = session.file_diff("w.csv").unwrap();
        assert_eq!(diff.label, Some(Label::Modified));
        let lines = diff.lines.unwrap();
        assert_eq!((lines.removed, lines.added), (1, 1));
        assert_eq!(lines.lines[0].kind, DiffKind::Removed);
        assert_eq!(lines.lines[1].content, "old!");
    }

    #[tokio::test]
    async fn test_file_diff_one_side() {
        let mut session = fetcher().into_session();
        session.refresh(selection("1.0", "2.0")).await;

        let diff = session.file_diff("z.csv").unwrap();
        assert_eq!(diff.base, None);
        assert_eq!(diff.compared, Some(Content::Text("new".to_string())));
        assert_eq!(diff.lines, None);

        assert!(matches!(
            session.file_diff("nope.csv"),
            Err(Error::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_by_slot() {
        let mut session = fetcher().into_session();
        session.refresh(selection("1.0", "2.0")).await;

        assert_eq!(
            session.extract(Slot::Base, "x.csv").unwrap().as_text(),
            Some("1\n2\n3")
        );
        assert!(matches!(
            session.extract(Slot::Compared, "x.csv"),
            Err(Error::Archive(bcpack_archive::Error::EntryNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_selected_file_cleared_when_gone() {
        let mut session = fetcher().into_session();
        let events = session.events();
        session.refresh(selection("1.0", "2.0")).await;

        assert!(session.select_file("x.csv"));
        assert!(!session.select_file("missing.csv"));
        assert_eq!(session.selected_file().map(|f| f.label), Some(Label::Removed));

        session.refresh(selection("3.0", "")).await;
        assert!(session.selected_file().is_none());
        assert!(drain(&events).contains(&SessionEvent::FileSelected { name: None }));
    }

    #[tokio::test]
    async fn test_filtered() {
        let mut session = fetcher().into_session();
        session.refresh(selection("1.0", "2.0")).await;

        session.set_filter(ListFilter::new().with_label(Label::Added));
        let names: Vec<&str> = session.filtered().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["z.csv"]);

        session.set_filter(ListFilter::new().with_keyword("y."));
        let names: Vec<&str> = session.filtered().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["y.csv"]);
    }

    #[tokio::test]
    async fn test_events_without_subscriber_are_not_retained() {
        let mut session = fetcher().into_session();

        for i in 0..500 {
            let compared = if i % 2 == 0 { "2.0" } else { "3.0" };
            assert!(session.refresh(selection("1.0", compared)).await);
        }

        assert_eq!(session.generation(), 500);
        assert_eq!(session.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let mut session = fetcher().into_session();
        let dropped = session.events();
        let live = session.events();
        assert_eq!(session.subscriber_count(), 2);

        drop(dropped);
        session.refresh(selection("1.0", "2.0")).await;

        assert_eq!(session.subscriber_count(), 1);
        let events = drain(&live);
        assert!(matches!(events.first(), Some(SessionEvent::Selected { generation: 1, .. })));
        assert!(matches!(events.last(), Some(SessionEvent::Merged { generation: 1, .. })));
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_only_new_events() {
        let mut session = fetcher().into_session();
        session.refresh(selection("1.0", "2.0")).await;

        let events = session.events();
        assert!(drain(&events).is_empty());

        assert!(session.select_file("y.csv"));
        assert_eq!(
            drain(&events),
            [SessionEvent::FileSelected { name: Some("y.csv".to_string()) }]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_refresh_matches_inline_apply() {
        let mut refreshed = fetcher().into_session();
        assert!(refreshed.refresh(selection("1.0", "2.0")).await);

        let mut applied = fetcher().into_session();
        let fetcher = applied.fetcher();
        let loaded = applied.select(selection("1.0", "2.0")).load(fetcher.as_ref()).await;
        assert!(applied.apply(loaded));

        assert_eq!(labels(refreshed.merged()), labels(applied.merged()));
        assert_eq!(
            refreshed.cache(Slot::Compared).computed(),
            applied.cache(Slot::Compared).computed()
        );
    }

    #[test]
    fn test_selection_display() {
        assert_eq!(selection("1.0", "2.0").to_string(), "JP/1.0..2.0/DataLocal");
        assert_eq!(selection("1.0", "").to_string(), "JP/1.0/DataLocal");
    }
}
