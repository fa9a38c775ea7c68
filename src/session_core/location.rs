//! Browsing-context capability: read the current URL fragment and replace
//! the current URL.

use std::sync::{Arc, Mutex};

/// Read/replace access to the host's current location. Browser-like hosts
/// bridge this to their real location; native hosts use [`NoopLocation`].
pub trait LocationProvider: Send + Sync + Clone + 'static {
    /// Fragment of the current URL, without the leading `#`, when present.
    fn fragment(&self) -> Option<String>;
    /// Navigates the browsing context to `url`.
    fn replace(&self, url: &str);
}

/// Provider for hosts without a browsing context: no fragment, redirects
/// are skipped.
#[derive(Debug, Clone, Default)]
pub struct NoopLocation;

impl LocationProvider for NoopLocation {
    fn fragment(&self) -> Option<String> {
        None
    }

    fn replace(&self, _url: &str) {}
}

/// Test double with a preset fragment and a log of replaced URLs.
#[derive(Clone, Default)]
pub struct StaticLocation {
    fragment: Option<String>,
    replaced: Arc<Mutex<Vec<String>>>,
}

impl StaticLocation {
    /// Creates a location with no fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a location whose current URL carries `fragment`.
    pub fn with_fragment(fragment: impl Into<String>) -> Self {
        Self {
            fragment: Some(fragment.into()),
            replaced: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs handed to [`LocationProvider::replace`] so far, in order.
    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().expect("replace log poisoned").clone()
    }
}

impl LocationProvider for StaticLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn replace(&self, url: &str) {
        self.replaced
            .lock()
            .expect("replace log poisoned")
            .push(url.to_string());
    }
}
