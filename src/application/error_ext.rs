//! Error conversion helpers that attach a path to failures

use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait turning any error result into `ApplicationResult` with path context.
pub trait PathContext<T> {
    /// ```ignore
    /// fs.read_to_string(&path).with_path_context("read tree description", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> PathContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{} {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
