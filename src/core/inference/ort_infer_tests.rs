use super::*;
use crate::core::config::{OrtExecutionProvider, OrtSessionConfig};

#[test]
fn test_new_fails_for_missing_model() {
    let result = OrtInfer::new("does_not_exist.onnx", None);
    assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
}

#[test]
fn test_from_config_fails_for_missing_model() {
    let cfg = OrtSessionConfig::new()
        .with_intra_threads(1)
        .add_execution_provider(OrtExecutionProvider::CPU);
    let result = OrtInfer::from_config(Some(&cfg), "does_not_exist.onnx", Some("input_1"));
    assert!(result.is_err());
}
