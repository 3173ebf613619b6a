use std::sync::Arc;

use thiserror::Error;

/// Outcome delivered to every waiter when a load does not produce a value.
///
/// Cloneable so one failure can be handed to every caller that was attached
/// to the same in-flight load.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The loader returned an error. Displays the loader's message verbatim.
    #[error("{0:#}")]
    LoadFailed(Arc<anyhow::Error>),

    #[error("Loader panicked before settling")]
    LoaderPanicked,
}

impl CacheError {
    pub fn load_failed(err: impl Into<anyhow::Error>) -> Self {
        CacheError::LoadFailed(Arc::new(err.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_load_failed_displays_loader_message() {
        let err = CacheError::load_failed(anyhow::anyhow!("network error"));
        assert_eq!(err.to_string(), "network error");
    }

    #[test]
    fn test_load_failed_includes_context_chain() {
        let inner: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let err = CacheError::load_failed(inner.context("Failed to fetch school data").unwrap_err());
        assert_eq!(
            err.to_string(),
            "Failed to fetch school data: connection refused"
        );
    }

    #[test]
    fn test_clones_share_the_same_error() {
        let err = CacheError::load_failed(anyhow::anyhow!("boom"));
        let copy = err.clone();
        match (&err, &copy) {
            (CacheError::LoadFailed(a), CacheError::LoadFailed(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected LoadFailed"),
        }
    }
}
