//! In-memory backends for tests, the tester CLI and hosts without storage.
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::wire::{FetchResponse, SaveRequest, SaveResponse};
use super::{LocalCache, RemoteStore};
use crate::error::A11yError;

/// `localStorage` stand-in.
#[derive(Debug, Default)]
pub struct MemoryCache {
    items: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryCache {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Make every subsequent write fail, as a full or blocked storage would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl LocalCache for MemoryCache {
    fn get_item(&self, key: &str) -> Result<Option<String>, A11yError> {
        Ok(self.get(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), A11yError> {
        if self.fail_writes.get() {
            return Err(A11yError::Storage(format!("quota exceeded writing {key}")));
        }
        self.insert(key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), A11yError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// How a [`MemoryRemote`] answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoteMode {
    #[default]
    Online,
    /// Requests fail as if the network were down.
    Offline,
    /// The server answers with an HTML page (expired session redirect).
    NonJson,
    /// The server answers `success: false`.
    Rejecting,
}

/// Remote endpoint stand-in that records every save request.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    mode: Cell<RemoteMode>,
    preferences: RefCell<Map<String, Value>>,
    saves: RefCell<Vec<SaveRequest>>,
    fetches: Cell<usize>,
}

impl MemoryRemote {
    #[must_use]
    pub fn new(mode: RemoteMode) -> Self {
        Self {
            mode: Cell::new(mode),
            ..Self::default()
        }
    }

    pub fn set_mode(&self, mode: RemoteMode) {
        self.mode.set(mode);
    }

    /// Replace the stored preferences. Non-object values clear them.
    pub fn seed(&self, preferences: Value) {
        *self.preferences.borrow_mut() = match preferences {
            Value::Object(map) => map,
            _ => Map::new(),
        };
    }

    #[must_use]
    pub fn stored(&self, key: &str) -> Option<Value> {
        self.preferences.borrow().get(key).cloned()
    }

    /// Every save request received, including failed ones.
    #[must_use]
    pub fn saves(&self) -> Vec<SaveRequest> {
        self.saves.borrow().clone()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    fn unreachable() -> A11yError {
        A11yError::StoreUnavailable("network unreachable".to_string())
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryRemote {
    async fn fetch_preferences(&self) -> Result<FetchResponse, A11yError> {
        self.fetches.set(self.fetches.get() + 1);
        match self.mode.get() {
            RemoteMode::Online => Ok(FetchResponse {
                success: true,
                preferences: self.preferences.borrow().clone(),
            }),
            RemoteMode::Offline => Err(Self::unreachable()),
            RemoteMode::NonJson => FetchResponse::from_body("<!DOCTYPE html><p>Log in</p>"),
            RemoteMode::Rejecting => FetchResponse::from_body(r#"{"success":false}"#),
        }
    }

    async fn save_preference(&self, request: SaveRequest) -> Result<SaveResponse, A11yError> {
        self.saves.borrow_mut().push(request.clone());
        match self.mode.get() {
            RemoteMode::Online => {
                self.preferences
                    .borrow_mut()
                    .insert(request.preference, request.value);
                Ok(SaveResponse {
                    success: true,
                    message: None,
                })
            }
            RemoteMode::Offline => Err(Self::unreachable()),
            RemoteMode::NonJson => SaveResponse::from_body("<!DOCTYPE html>"),
            RemoteMode::Rejecting => {
                SaveResponse::from_body(r#"{"success":false,"message":"invalid session key"}"#)
            }
        }
    }
}
