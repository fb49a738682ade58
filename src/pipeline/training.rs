//! Training pipeline.
//!
//! Fits a new classification head on top of a frozen, pretrained feature
//! extractor. The run scans `<dataset>/train`, holds out a validation subset
//! per class, trains with augmented batches and keeps the checkpoint with the
//! best validation accuracy. The class map is written before the first epoch
//! so a checkpoint on disk always has its mapping next to it.

use super::callbacks::{BestCheckpoint, ReduceLrOnPlateau};
use super::data_loader::{Batch, BatchLoader};
use crate::core::batch::to_candle;
use crate::core::config::{ConfigValidator, TrainingConfig, parse_device};
use crate::core::constants::HEAD_HIDDEN_UNITS;
use crate::core::errors::{ClassifierError, ClassifierResult, candle_to_inference};
use crate::domain::{ClassMap, ImageDataset, Sample};
use crate::models::classification::{BreedNet, ClassifierHead, load_backbone};
use crate::processors::RandomAffine;
use crate::utils::ensure_parent_dir;
use candle_core::{D, DType, Device, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

const MODEL_NAME: &str = "BreedNet";

/// Metrics recorded at the end of one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
    /// Learning rate used during the epoch.
    pub learning_rate: f64,
    /// Whether this epoch's weights were written to disk.
    pub checkpoint_saved: bool,
}

/// Outcome of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub history: Vec<EpochMetrics>,
    pub best_val_accuracy: Option<f64>,
    pub final_learning_rate: f64,
    pub class_map: ClassMap,
    pub model_path: PathBuf,
    pub class_names_path: PathBuf,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training Report:")?;
        writeln!(f, "  Classes: {}", self.class_map.len())?;
        writeln!(f, "  Epochs: {}", self.history.len())?;
        match self.best_val_accuracy {
            Some(acc) => writeln!(f, "  Best val_accuracy: {acc:.4}")?,
            None => writeln!(f, "  Best val_accuracy: n/a")?,
        }
        writeln!(f, "  Final learning rate: {:e}", self.final_learning_rate)?;
        writeln!(f, "  Model: {}", self.model_path.display())?;
        write!(f, "  Class map: {}", self.class_names_path.display())
    }
}

/// Runs training with a validated configuration.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    /// Validates `config` and creates a trainer.
    pub fn new(config: TrainingConfig) -> ClassifierResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains the head and writes the best checkpoint and the class map.
    ///
    /// Both output locations are prepared and the class map is written
    /// before the first epoch, so an unwritable destination fails the run
    /// before any training time is spent.
    ///
    /// # Errors
    ///
    /// - `DatasetNotFound` if `<dataset_dir>/train` is missing; nothing is
    ///   written in that case.
    /// - `EmptyDataset` if there are no classes, or the training or
    ///   validation subset ends up empty.
    /// - `ConfigError` if the image size does not fit the feature extractor.
    /// - Any image decode, tensor or filesystem error aborts the run.
    pub fn run(&self) -> ClassifierResult<TrainingReport> {
        let config = &self.config;
        let train_dir = config.train_dir();
        if !train_dir.is_dir() {
            return Err(ClassifierError::DatasetNotFound { path: train_dir });
        }

        let dataset = ImageDataset::scan(&train_dir)?;
        info!(
            "Found {} images belonging to {} classes in {}",
            dataset.len(),
            dataset.num_classes(),
            train_dir.display()
        );
        if dataset.num_classes() == 0 {
            return Err(ClassifierError::EmptyDataset {
                path: train_dir,
                reason: "no class subdirectories".to_string(),
            });
        }
        let class_map = dataset.class_map();
        let split = dataset.split(config.validation_split);
        for (subset, samples) in [("training", &split.training), ("validation", &split.validation)] {
            if samples.is_empty() {
                return Err(ClassifierError::EmptyDataset {
                    path: train_dir.clone(),
                    reason: format!(
                        "{subset} subset is empty with validation_split {}",
                        config.validation_split
                    ),
                });
            }
        }
        info!(
            "Split: {} training / {} validation images",
            split.training.len(),
            split.validation.len()
        );

        let device = parse_device(&config.device)?;
        let backbone = load_backbone(&config.backbone_weights, &device)?;
        let factor = backbone.downsample_factor() as u32;
        let (height, width) = config.image_size;
        if height % factor != 0 || width % factor != 0 || height < factor || width < factor {
            return Err(ClassifierError::config_error_with_context(
                "image_size",
                &format!("{height}x{width}"),
                &format!("must be a positive multiple of {factor} for this feature extractor"),
            ));
        }
        let feature_dim = backbone.feature_dim(config.image_size);
        debug!("Feature dimension: {}", feature_dim);

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let head = ClassifierHead::load(feature_dim, HEAD_HIDDEN_UNITS, dataset.num_classes(), vb)?;
        let net = BreedNet::new(backbone, head, device.clone());

        let params = ParamsAdamW {
            lr: config.learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(varmap.all_vars(), params)
            .map_err(|e| candle_to_inference(MODEL_NAME, "create optimizer", e))?;

        ensure_parent_dir(&config.output_model)?;
        class_map.save(&config.class_names_path)?;
        info!(
            "Saved {} class names to {}",
            class_map.len(),
            config.class_names_path.display()
        );

        let seed = config.seed.unwrap_or_else(rand::random);
        info!("Training seed: {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);

        let train_loader = BatchLoader::new(config.batch_size, config.image_size)
            .with_augmentation(RandomAffine::new(config.augmentation.clone()));
        let val_loader = BatchLoader::new(config.batch_size, config.image_size);

        let mut plateau = ReduceLrOnPlateau::default();
        let mut checkpoint = BestCheckpoint::default();
        let mut history = Vec::with_capacity(config.epochs);

        for epoch in 1..=config.epochs {
            let learning_rate = optimizer.learning_rate();

            let mut train_totals = Totals::default();
            let batches = train_loader.epoch(&split.training, &mut rng, true);
            debug!("Epoch {}: {} training steps", epoch, batches.len());
            for samples in batches {
                let batch = train_loader.load(&samples, &mut rng)?;
                let (loss, correct) = step(&net, &batch, &device, true)?;
                optimizer
                    .backward_step(&loss)
                    .map_err(|e| candle_to_inference(MODEL_NAME, "optimizer step", e))?;
                train_totals.add(&loss, correct, batch.len())?;
            }

            let val_totals = evaluate(&net, &val_loader, &split.validation, &device, &mut rng)?;

            let mut metrics = EpochMetrics {
                epoch,
                loss: train_totals.mean_loss(),
                accuracy: train_totals.accuracy(),
                val_loss: val_totals.mean_loss(),
                val_accuracy: val_totals.accuracy(),
                learning_rate,
                checkpoint_saved: false,
            };
            info!(
                "Epoch {}/{} - loss: {:.4} - accuracy: {:.4} - val_loss: {:.4} - val_accuracy: {:.4} - lr: {:e}",
                epoch,
                config.epochs,
                metrics.loss,
                metrics.accuracy,
                metrics.val_loss,
                metrics.val_accuracy,
                learning_rate
            );

            if checkpoint.improved(metrics.val_accuracy) {
                net.save(&config.output_model)?;
                metrics.checkpoint_saved = true;
                info!(
                    "val_accuracy improved to {:.4}, saved model to {}",
                    metrics.val_accuracy,
                    config.output_model.display()
                );
            }

            if let Some(new_lr) = plateau.step(metrics.val_loss, learning_rate) {
                optimizer.set_learning_rate(new_lr);
                info!("ReduceLROnPlateau: learning rate {:e} -> {:e}", learning_rate, new_lr);
            }

            history.push(metrics);
        }

        Ok(TrainingReport {
            history,
            best_val_accuracy: checkpoint.best(),
            final_learning_rate: optimizer.learning_rate(),
            class_map,
            model_path: config.output_model.clone(),
            class_names_path: config.class_names_path.clone(),
        })
    }
}

/// Validates `config` and runs a full training session.
pub fn build_and_train(config: &TrainingConfig) -> ClassifierResult<TrainingReport> {
    Trainer::new(config.clone())?.run()
}

#[derive(Debug, Default)]
struct Totals {
    loss_sum: f64,
    correct: f64,
    seen: usize,
}

impl Totals {
    fn add(&mut self, loss: &Tensor, correct: f64, count: usize) -> ClassifierResult<()> {
        let loss = loss
            .to_scalar::<f32>()
            .map_err(|e| candle_to_inference(MODEL_NAME, "read loss", e))?;
        self.loss_sum += loss as f64 * count as f64;
        self.correct += correct;
        self.seen += count;
        Ok(())
    }

    fn mean_loss(&self) -> f64 {
        if self.seen == 0 {
            0.0
        } else {
            self.loss_sum / self.seen as f64
        }
    }

    fn accuracy(&self) -> f64 {
        if self.seen == 0 {
            0.0
        } else {
            self.correct / self.seen as f64
        }
    }
}

/// Forward pass on one batch; returns the mean cross-entropy and the number
/// of correct predictions.
fn step(
    net: &BreedNet,
    batch: &Batch,
    device: &Device,
    train: bool,
) -> ClassifierResult<(Tensor, f64)> {
    let run = || -> candle_core::Result<(Tensor, f64)> {
        let xs = to_candle(&batch.inputs, device)?;
        let ys = Tensor::new(batch.labels.as_slice(), device)?;
        let logits = net.forward_t(&xs, train)?;
        let loss = candle_nn::loss::cross_entropy(&logits, &ys)?;
        let correct = logits
            .argmax(D::Minus1)?
            .eq(&ys)?
            .to_dtype(DType::F32)?
            .sum_all()?
            .to_scalar::<f32>()?;
        Ok((loss, correct as f64))
    };
    run().map_err(|e| {
        candle_to_inference(
            MODEL_NAME,
            format!("forward pass on batch with shape {:?}", batch.inputs.shape()),
            e,
        )
    })
}

fn evaluate(
    net: &BreedNet,
    loader: &BatchLoader,
    samples: &[Sample],
    device: &Device,
    rng: &mut StdRng,
) -> ClassifierResult<Totals> {
    let mut totals = Totals::default();
    for chunk in loader.epoch(samples, rng, false) {
        let batch = loader.load(&chunk, rng)?;
        let (loss, correct) = step(net, &batch, device, false)?;
        totals.add(&loss, correct, batch.len())?;
    }
    Ok(totals)
}
