//! Shared fixtures for the test modules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use crate::client::ApiClient;
use crate::credentials::CredentialStore;
use crate::session::SessionGuard;

/// Session guard that counts teardown notifications.
pub(crate) struct RecordingGuard {
    fired: AtomicUsize,
}

impl RecordingGuard {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(RecordingGuard {
            fired: AtomicUsize::new(0),
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl SessionGuard for RecordingGuard {
    fn session_expired(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

/// Client wired to a fresh credential dir and a recording guard.
pub(crate) fn client_for(base: &str, dir: &TempDir) -> (ApiClient, Arc<RecordingGuard>) {
    let store = CredentialStore::new(dir.path());
    let guard = RecordingGuard::new();
    let client = ApiClient::new(base, store, guard.clone()).unwrap();
    (client, guard)
}
