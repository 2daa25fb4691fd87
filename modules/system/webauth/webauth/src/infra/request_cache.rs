//! In-memory [`RequestCache`] keyed by a session cookie.

use async_trait::async_trait;
use dashmap::DashMap;
use webauth_sdk::{RequestCache, RequestDescriptor};

/// Stores the request a visitor made before the login redirect, under the
/// value of their session cookie.
///
/// Reads do not remove the entry. Callers remove it once the visitor has been
/// sent back to the original request.
#[derive(Debug)]
pub struct InMemoryRequestCache {
    session_cookie: String,
    entries: DashMap<String, RequestDescriptor>,
}

impl InMemoryRequestCache {
    #[must_use]
    pub fn new(session_cookie: impl Into<String>) -> Self {
        Self {
            session_cookie: session_cookie.into(),
            entries: DashMap::new(),
        }
    }

    fn session_key(&self, request: &RequestDescriptor) -> Option<String> {
        request
            .cookie(&self.session_cookie)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    /// Remember `original` for the session `current` belongs to.
    ///
    /// Returns `false` when `current` carries no session cookie.
    #[must_use]
    pub fn save(&self, current: &RequestDescriptor, original: RequestDescriptor) -> bool {
        let Some(key) = self.session_key(current) else {
            tracing::debug!(cookie = %self.session_cookie, "no session cookie, request not cached");
            return false;
        };
        self.entries.insert(key, original);
        true
    }

    /// Forget the cached request for the session `current` belongs to.
    #[must_use]
    pub fn remove(&self, current: &RequestDescriptor) -> Option<RequestDescriptor> {
        let key = self.session_key(current)?;
        self.entries.remove(&key).map(|(_, original)| original)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RequestCache for InMemoryRequestCache {
    async fn get(&self, current: &RequestDescriptor) -> Option<RequestDescriptor> {
        let key = self.session_key(current)?;
        self.entries.get(&key).map(|entry| entry.value().clone())
    }
}
