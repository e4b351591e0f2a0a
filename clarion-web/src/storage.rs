//! `localStorage`-backed local cache.
use clarion_core::{A11yError, LocalCache};

use crate::dom::{self, WebError};

/// Resolves `localStorage` on every call so a storage blocked at load (private mode,
/// disabled cookies) degrades to per-call errors instead of failing construction.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageCache;

fn storage_error(err: &WebError) -> A11yError {
    A11yError::Storage(err.to_string())
}

impl LocalCache for LocalStorageCache {
    fn get_item(&self, key: &str) -> Result<Option<String>, A11yError> {
        let storage = dom::local_storage().map_err(|err| storage_error(&err))?;
        storage
            .get_item(key)
            .map_err(|err| storage_error(&WebError::js(&err)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), A11yError> {
        let storage = dom::local_storage().map_err(|err| storage_error(&err))?;
        storage
            .set_item(key, value)
            .map_err(|err| storage_error(&WebError::js(&err)))
    }

    fn remove_item(&self, key: &str) -> Result<(), A11yError> {
        let storage = dom::local_storage().map_err(|err| storage_error(&err))?;
        storage
            .remove_item(key)
            .map_err(|err| storage_error(&WebError::js(&err)))
    }
}
