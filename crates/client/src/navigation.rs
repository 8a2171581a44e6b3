//! Imperative "go to path" navigation.

use std::sync::Mutex;

/// Well-known application paths.
pub mod paths {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/auth/login";
}

/// Navigation surface used by the OAuth redirect handler.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// Records every navigation, newest last.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent path, if any navigation happened.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.entries.lock().ok().and_then(|e| e.last().cloned())
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Navigator for History {
    fn push(&self, path: &str) {
        tracing::debug!(path, "Navigating");
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(path.to_string());
        }
    }
}
