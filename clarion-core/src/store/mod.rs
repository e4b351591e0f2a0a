//! Dual-backend preference persistence.
//!
//! A synchronous local cache is always written first and is the source of truth whenever
//! the network is degraded. An optional remote store is written asynchronously and merged
//! over the local cache on read.
mod memory;
pub mod wire;

pub use memory::{MemoryCache, MemoryRemote, RemoteMode};
pub use wire::{FetchResponse, SaveRequest, SaveResponse};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::Cell;
use std::rc::Rc;

use crate::error::A11yError;
use crate::registry::ToggleId;
use crate::snapshot::{DecodedSnapshot, LEGACY_KEYS, PreferenceSnapshot};
use crate::value::ToggleValue;

/// Fast synchronous key/value cache (browser `localStorage` on the web).
pub trait LocalCache {
    /// # Errors
    ///
    /// Returns [`A11yError::Storage`] when the backing storage cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, A11yError>;

    /// # Errors
    ///
    /// Returns [`A11yError::Storage`] when the value cannot be stored (quota, private mode).
    fn set_item(&self, key: &str, value: &str) -> Result<(), A11yError>;

    /// # Errors
    ///
    /// Returns [`A11yError::Storage`] when the key cannot be removed.
    fn remove_item(&self, key: &str) -> Result<(), A11yError>;
}

/// The host application's preference endpoint.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Fetch every preference stored for the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`A11yError::StoreUnavailable`] for network, auth or decoding failures.
    async fn fetch_preferences(&self) -> Result<FetchResponse, A11yError>;

    /// Persist a single preference.
    ///
    /// # Errors
    ///
    /// Returns [`A11yError::StoreUnavailable`] for network, auth or decoding failures.
    async fn save_preference(&self, request: SaveRequest) -> Result<SaveResponse, A11yError>;
}

/// Whether a write should reach the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemotePolicy {
    /// Follow the shared auto-sync flag.
    #[default]
    Auto,
    /// Write remotely even when auto-sync is off.
    Force,
    /// Local cache only.
    Suppress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub remote: RemotePolicy,
}

impl WriteOptions {
    #[must_use]
    pub const fn local_only() -> Self {
        Self {
            remote: RemotePolicy::Suppress,
        }
    }

    #[must_use]
    pub const fn forced() -> Self {
        Self {
            remote: RemotePolicy::Force,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoteStatus {
    Skipped,
    Pending,
    Saved,
    Failed,
}

/// Result of a single [`PreferenceStore::write`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub success: bool,
    pub local: bool,
    pub remote: RemoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_error: Option<String>,
}

/// A write whose local half has completed.
///
/// Dropping it abandons the remote half; [`PendingWrite::settle`] drives it to completion.
#[must_use]
pub struct PendingWrite {
    toggle: ToggleId,
    local: bool,
    remote: Option<LocalBoxFuture<'static, Result<SaveResponse, A11yError>>>,
}

impl PendingWrite {
    #[must_use]
    pub const fn toggle(&self) -> ToggleId {
        self.toggle
    }

    #[must_use]
    pub const fn is_remote_pending(&self) -> bool {
        self.remote.is_some()
    }

    /// Outcome as seen by a caller that does not wait for the network.
    #[must_use]
    pub const fn local_outcome(&self) -> WriteOutcome {
        WriteOutcome {
            success: self.local,
            local: self.local,
            remote: if self.remote.is_some() {
                RemoteStatus::Pending
            } else {
                RemoteStatus::Skipped
            },
            server_error: None,
        }
    }

    /// Wait for the remote half. Never fails: a remote error is reported in the outcome.
    pub async fn settle(self) -> WriteOutcome {
        let Some(remote) = self.remote else {
            return WriteOutcome {
                success: self.local,
                local: self.local,
                remote: RemoteStatus::Skipped,
                server_error: None,
            };
        };
        match remote.await {
            Ok(_) => WriteOutcome {
                success: true,
                local: self.local,
                remote: RemoteStatus::Saved,
                server_error: None,
            },
            Err(err) => {
                warn!("remote save of {} failed: {err}", self.toggle);
                WriteOutcome {
                    success: self.local,
                    local: self.local,
                    remote: RemoteStatus::Failed,
                    server_error: Some(err.to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySaveResult {
    pub preference: ToggleId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-key results of draining a snapshot to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAllReport {
    pub results: Vec<KeySaveResult>,
    pub all_ok: bool,
}

/// Where a [`ReadReport`] snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadSource {
    Remote,
    LocalOnly,
}

#[derive(Debug)]
pub struct ReadReport {
    pub snapshot: PreferenceSnapshot,
    pub source: ReadSource,
    pub rejected: Vec<A11yError>,
    pub remote_error: Option<A11yError>,
}

/// Process-wide auto-sync switch shared by every clone of a store.
pub type SyncFlag = Rc<Cell<bool>>;

/// Persistence front for the engine. Cheap to clone; clones share backends and the
/// auto-sync flag.
#[derive(Clone)]
pub struct PreferenceStore {
    namespace: Rc<str>,
    local: Rc<dyn LocalCache>,
    remote: Option<Rc<dyn RemoteStore>>,
    auto_sync: SyncFlag,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("namespace", &self.namespace)
            .field("remote", &self.remote.is_some())
            .field("auto_sync", &self.auto_sync.get())
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Local-only store. Auto-sync starts enabled.
    pub fn new(namespace: &str, local: Rc<dyn LocalCache>) -> Self {
        Self {
            namespace: Rc::from(namespace),
            local,
            remote: None,
            auto_sync: Rc::new(Cell::new(true)),
        }
    }

    #[must_use]
    pub fn with_remote(mut self, remote: Rc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub const fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    #[must_use]
    pub fn auto_sync(&self) -> bool {
        self.auto_sync.get()
    }

    pub fn set_auto_sync(&self, enabled: bool) {
        debug!("auto-sync {}", if enabled { "enabled" } else { "disabled" });
        self.auto_sync.set(enabled);
    }

    #[must_use]
    pub fn key_for(&self, name: &str) -> String {
        format!("{}_{name}", self.namespace)
    }

    fn local_raw(&self) -> Map<String, Value> {
        let names = ToggleId::ALL
            .iter()
            .map(|id| id.key())
            .chain(LEGACY_KEYS.iter().copied());
        let mut raw = Map::new();
        for name in names {
            match self.local.get_item(&self.key_for(name)) {
                Ok(Some(text)) => {
                    // Older releases stored some values unquoted.
                    let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
                    raw.insert(name.to_string(), value);
                }
                Ok(None) => {}
                Err(err) => error!("reading {name} from local cache failed: {err}"),
            }
        }
        raw
    }

    /// Snapshot built from the local cache alone, defaults filled in.
    #[must_use]
    pub fn read_local(&self) -> DecodedSnapshot {
        PreferenceSnapshot::from_raw(&self.local_raw())
    }

    /// Best-effort merged snapshot. Never fails.
    pub async fn read_all(&self) -> PreferenceSnapshot {
        self.read_all_detailed().await.snapshot
    }

    /// Like [`Self::read_all`], also reporting where the values came from.
    pub async fn read_all_detailed(&self) -> ReadReport {
        let mut merged = self.local_raw();
        let fetched = match &self.remote {
            Some(remote) => remote.fetch_preferences().await,
            None => Err(A11yError::StoreUnavailable(
                "no remote store configured".to_string(),
            )),
        };

        match fetched {
            Ok(response) => {
                merged.extend(response.preferences);
                let decoded = PreferenceSnapshot::from_raw(&merged);
                self.write_snapshot_local(&decoded.snapshot);
                self.drop_legacy_keys();
                ReadReport {
                    snapshot: decoded.snapshot,
                    source: ReadSource::Remote,
                    rejected: decoded.rejected,
                    remote_error: None,
                }
            }
            Err(err) => {
                if self.remote.is_some() {
                    warn!("falling back to local preferences: {err}");
                }
                let decoded = PreferenceSnapshot::from_raw(&merged);
                ReadReport {
                    snapshot: decoded.snapshot,
                    source: ReadSource::LocalOnly,
                    rejected: decoded.rejected,
                    remote_error: Some(err),
                }
            }
        }
    }

    /// Write one value to the local cache only.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be encoded or stored.
    pub fn write_local(&self, toggle: ToggleId, value: &ToggleValue) -> Result<(), A11yError> {
        let encoded = serde_json::to_string(&value.to_json())?;
        self.local.set_item(&self.key_for(toggle.key()), &encoded)
    }

    fn write_snapshot_local(&self, snapshot: &PreferenceSnapshot) {
        for (toggle, value) in snapshot.iter() {
            if let Err(err) = self.write_local(toggle, value) {
                error!("writing {toggle} to local cache failed: {err}");
            }
        }
    }

    fn drop_legacy_keys(&self) {
        for name in LEGACY_KEYS {
            if let Err(err) = self.local.remove_item(&self.key_for(name)) {
                error!("removing legacy key {name} failed: {err}");
            }
        }
    }

    fn should_sync(&self, policy: RemotePolicy) -> bool {
        match policy {
            RemotePolicy::Force => true,
            RemotePolicy::Suppress => false,
            RemotePolicy::Auto => self.auto_sync.get(),
        }
    }

    /// Write the local cache now and prepare the remote write, if any.
    pub fn write(&self, toggle: ToggleId, value: &ToggleValue, opts: WriteOptions) -> PendingWrite {
        let local = match self.write_local(toggle, value) {
            Ok(()) => true,
            Err(err) => {
                error!("writing {toggle} to local cache failed: {err}");
                false
            }
        };

        let remote = self
            .remote
            .as_ref()
            .filter(|_| self.should_sync(opts.remote))
            .map(|remote| {
                let remote = Rc::clone(remote);
                let request = SaveRequest::new(toggle, value);
                async move {
                    remote
                        .save_preference(request)
                        .await
                        .and_then(SaveResponse::into_result)
                }
                .boxed_local()
            });

        PendingWrite {
            toggle,
            local,
            remote,
        }
    }

    /// Send every value of `snapshot` to the remote store, one key at a time.
    pub async fn write_all_to_remote(&self, snapshot: &PreferenceSnapshot) -> SaveAllReport {
        let mut results = Vec::with_capacity(ToggleId::ALL.len());
        for (toggle, value) in snapshot.iter() {
            let saved = match &self.remote {
                Some(remote) => remote
                    .save_preference(SaveRequest::new(toggle, value))
                    .await
                    .and_then(SaveResponse::into_result),
                None => Err(A11yError::StoreUnavailable(
                    "no remote store configured".to_string(),
                )),
            };
            let error = saved.err().map(|err| {
                warn!("saving {toggle} failed: {err}");
                err.to_string()
            });
            results.push(KeySaveResult {
                preference: toggle,
                success: error.is_none(),
                error,
            });
        }
        let all_ok = results.iter().all(|result| result.success);
        SaveAllReport { results, all_ok }
    }

    /// Push whatever the local cache holds to the remote store ("save now").
    pub async fn commit_local_to_remote(&self) -> SaveAllReport {
        let snapshot = self.read_local().snapshot;
        self.write_all_to_remote(&snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn stores(mode: RemoteMode) -> (Rc<MemoryCache>, Rc<MemoryRemote>, PreferenceStore) {
        let cache = Rc::new(MemoryCache::default());
        let remote = Rc::new(MemoryRemote::new(mode));
        let store = PreferenceStore::new("clarion", cache.clone()).with_remote(remote.clone());
        (cache, remote, store)
    }

    #[test]
    fn local_keys_are_namespaced_json() {
        let (cache, _, store) = stores(RemoteMode::Offline);
        let pending = store.write(ToggleId::FontSize, &ToggleValue::Level(120), WriteOptions::default());
        assert!(pending.local_outcome().local);
        assert_eq!(cache.get("clarion_fontSize").as_deref(), Some("120"));
    }

    #[test]
    fn remote_failure_does_not_fail_write() {
        let (_, _, store) = stores(RemoteMode::Offline);
        let outcome = block_on(
            store
                .write(ToggleId::HideImages, &ToggleValue::Flag(true), WriteOptions::default())
                .settle(),
        );
        assert!(outcome.success);
        assert!(outcome.local);
        assert_eq!(outcome.remote, RemoteStatus::Failed);
        assert!(outcome.server_error.is_some());
    }

    #[test]
    fn auto_sync_flag_gates_remote_writes() {
        let (_, remote, store) = stores(RemoteMode::Online);
        let clone = store.clone();
        clone.set_auto_sync(false);
        assert!(!store.auto_sync());

        let skipped = store.write(ToggleId::HideImages, &ToggleValue::Flag(true), WriteOptions::default());
        assert!(!skipped.is_remote_pending());
        let forced = block_on(
            store
                .write(ToggleId::HideImages, &ToggleValue::Flag(true), WriteOptions::forced())
                .settle(),
        );
        assert_eq!(forced.remote, RemoteStatus::Saved);
        assert_eq!(remote.saves().len(), 1);

        store.set_auto_sync(true);
        let suppressed = store.write(ToggleId::HideImages, &ToggleValue::Flag(false), WriteOptions::local_only());
        assert_eq!(suppressed.local_outcome().remote, RemoteStatus::Skipped);
    }

    #[test]
    fn remote_values_win_and_are_written_back() {
        let (cache, remote, store) = stores(RemoteMode::Online);
        cache.insert("clarion_fontSize", "110");
        cache.insert("clarion_lineSpacing", "2");
        remote.seed(json!({"fontSize": 140}));

        let report = block_on(store.read_all_detailed());
        assert_eq!(report.source, ReadSource::Remote);
        assert_eq!(report.snapshot.level(ToggleId::FontSize), 140);
        assert_eq!(report.snapshot.level(ToggleId::LineSpacing), 2);
        assert_eq!(cache.get("clarion_fontSize").as_deref(), Some("140"));
        assert_eq!(cache.get("clarion_hideImages").as_deref(), Some("false"));
    }

    #[test]
    fn unusable_remote_falls_back_to_local() {
        for mode in [RemoteMode::Offline, RemoteMode::NonJson, RemoteMode::Rejecting] {
            let (cache, _, store) = stores(mode);
            cache.insert("clarion_highContrast", "true");
            let report = block_on(store.read_all_detailed());
            assert_eq!(report.source, ReadSource::LocalOnly, "{mode:?}");
            assert!(report.snapshot.flag(ToggleId::HighContrast));
            assert!(report.remote_error.is_some_and(|err| err.is_transient()));
        }
    }

    #[test]
    fn legacy_local_keys_migrate_and_are_removed_after_sync() {
        let (cache, _, store) = stores(RemoteMode::Online);
        cache.insert("clarion_invertedColors", "true");
        cache.insert("clarion_colorblind", "tritanopia");
        let snapshot = block_on(store.read_all());
        assert_eq!(snapshot.level(ToggleId::ColorIntensityMode), 3);
        assert!(cache.get("clarion_invertedColors").is_none());
        assert_eq!(cache.get("clarion_colorblindModes").as_deref(), Some(r#"["tritanopia"]"#));
    }

    #[test]
    fn save_all_reports_each_key() {
        let (_, remote, store) = stores(RemoteMode::Online);
        let report = block_on(store.write_all_to_remote(&PreferenceSnapshot::defaults()));
        assert!(report.all_ok);
        assert_eq!(report.results.len(), ToggleId::ALL.len());
        assert_eq!(remote.saves().len(), ToggleId::ALL.len());

        remote.set_mode(RemoteMode::Rejecting);
        let report = block_on(store.write_all_to_remote(&PreferenceSnapshot::defaults()));
        assert!(!report.all_ok);
        assert!(report.results.iter().all(|result| result.error.is_some()));
    }

    #[test]
    fn commit_pushes_local_cache() {
        let (cache, remote, store) = stores(RemoteMode::Online);
        store.set_auto_sync(false);
        let _ = store.write(ToggleId::LetterSpacing, &ToggleValue::Level(3), WriteOptions::default());
        assert!(remote.saves().is_empty());
        assert_eq!(cache.get("clarion_letterSpacing").as_deref(), Some("3"));

        let report = block_on(store.commit_local_to_remote());
        assert!(report.all_ok);
        assert_eq!(remote.stored("letterSpacing"), Some(json!(3)));
    }

    #[test]
    fn local_only_store_reports_missing_remote() {
        let cache = Rc::new(MemoryCache::default());
        let store = PreferenceStore::new("clarion", cache);
        let report = block_on(store.commit_local_to_remote());
        assert!(!report.all_ok);
        let read = block_on(store.read_all_detailed());
        assert_eq!(read.source, ReadSource::LocalOnly);
    }

    #[test]
    fn failing_cache_is_reported_not_raised() {
        let (cache, _, store) = stores(RemoteMode::Online);
        cache.fail_writes(true);
        let outcome = block_on(
            store
                .write(ToggleId::FontSize, &ToggleValue::Level(130), WriteOptions::default())
                .settle(),
        );
        assert!(!outcome.local);
        assert!(outcome.success);
        assert_eq!(outcome.remote, RemoteStatus::Saved);
    }
}
