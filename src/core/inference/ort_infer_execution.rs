use super::*;
use crate::core::errors::OpaqueError;
use ndarray::ArrayView2;
use ort::value::TensorRef;

impl OrtInfer {
    /// Returns the name of the first declared output.
    fn get_output_name(&self, session: &Session) -> Result<String, ClassifierError> {
        session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                ClassifierError::invalid_input(
                    "No outputs available in session - model may be invalid or corrupted",
                )
            })
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub(super) fn run_2d(&self, x: &Tensor4D) -> Result<Tensor2D, ClassifierError> {
        let input_shape = x.shape().to_vec();
        let batch_size = input_shape[0];

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ClassifierError::inference_error(
                &self.model_name,
                format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;

        let mut session = self.session.lock().map_err(|_| {
            ClassifierError::inference_error(
                &self.model_name,
                "failed to acquire session lock",
                OpaqueError("session mutex poisoned".to_string()),
            )
        })?;
        let output_name = self.get_output_name(&session)?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| {
                ClassifierError::inference_error(
                    &self.model_name,
                    format!(
                        "ONNX Runtime inference failed with input '{}' -> output '{}'",
                        self.input_name, output_name
                    ),
                    e,
                )
            })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifierError::inference_error(
                    &self.model_name,
                    format!("failed to extract output tensor '{output_name}' as f32"),
                    e,
                )
            })?;

        if output_shape.len() != 2 {
            return Err(ClassifierError::inference_error(
                &self.model_name,
                format!("expected a 2D (batch, classes) output, got shape {output_shape:?}"),
                OpaqueError("invalid output tensor dimensions".to_string()),
            ));
        }
        let num_classes = output_shape[1] as usize;
        if output_data.len() != batch_size * num_classes {
            return Err(ClassifierError::inference_error(
                &self.model_name,
                format!(
                    "output data size mismatch for input shape {input_shape:?} -> output shape {output_shape:?}"
                ),
                OpaqueError("output tensor data size mismatch".to_string()),
            ));
        }

        let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)?;
        Ok(array_view.to_owned())
    }
}
