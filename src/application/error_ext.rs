//! Error conversion helpers for file-backed operations
//!
//! Extension traits attach the offending path to I/O and JSON failures.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read mind map", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for JSON decoding results.
pub trait JsonResultExt<T> {
    fn with_parse_context(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> JsonResultExt<T> for serde_json::Result<T> {
    fn with_parse_context(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_io_error_when_adding_context_then_message_names_path() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result
            .with_path_context("read mind map", Path::new("map.json"))
            .unwrap_err();
        assert_eq!(err.to_string(), "operation failed: read mind map: map.json");
    }

    #[test]
    fn given_bad_json_when_adding_context_then_parse_error() {
        let result: serde_json::Result<serde_json::Value> = serde_json::from_str("{");
        let err = result.with_parse_context(Path::new("map.json")).unwrap_err();
        assert!(matches!(err, ApplicationError::Parse { .. }));
        assert!(err.to_string().starts_with("cannot parse map.json"));
    }
}
