//! Authentication collaborator.
//!
//! Credentials are handled outside this crate. The client only needs to know
//! where the service lives.

/// Supplies the base URL of the Sherpa service.
#[cfg_attr(test, mockall::automock)]
pub trait Auth: Send + Sync {
    fn base_url(&self) -> &str;
}

/// An [`Auth`] that always returns the same base URL.
#[derive(Debug, Clone)]
pub struct StaticAuth {
    base_url: String,
}

impl StaticAuth {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Auth for StaticAuth {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}
