//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::errors::ClassifierError;
use ort::session::{Session, builder::SessionBuilder};
use std::path::Path;

/// Opens an ONNX model after letting `configure` adjust the session builder.
pub fn load_session_with(
    model_path: impl AsRef<Path>,
    configure: impl FnOnce(SessionBuilder) -> ort::Result<SessionBuilder>,
    suggestion: Option<&str>,
) -> Result<Session, ClassifierError> {
    let path = model_path.as_ref();
    Session::builder()
        .and_then(configure)
        .and_then(|b| b.commit_from_file(path))
        .map_err(|e| {
            ClassifierError::model_load_error(
                path,
                "failed to create ONNX session",
                suggestion,
                Some(e),
            )
        })
}
