//! Command-line entry point.
//!
//! Usage:
//! ```text
//! dogbreed train --dataset dataset --epochs 6 --output dogbreed.safetensors
//! dogbreed predict --model dogbreed.safetensors --class-names class_names.json dog.jpg
//! ```

use clap::{Args, Parser, Subcommand};
use dogbreed::core::config::{ConfigValidator, InferenceConfig, TrainingConfig};
use dogbreed::core::init_tracing;
use dogbreed::pipeline::build_and_train;
use dogbreed::predictor::ClassifierContext;
use dogbreed::processors::ChannelOrder;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "dogbreed")]
#[command(about = "Train and run a dog breed image classifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fine-tune the classifier head on a directory of labeled images
    Train(TrainArgs),
    /// Classify one or more images with a trained model
    Predict(PredictArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// JSON training configuration; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset root containing a `train` directory of class folders
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Where to write the best checkpoint
    #[arg(long)]
    output: Option<PathBuf>,

    /// Where to write the class index mapping
    #[arg(long)]
    class_names: Option<PathBuf>,

    /// Pretrained VGG19 weights (safetensors, torchvision key layout)
    #[arg(long)]
    backbone: Option<PathBuf>,

    /// Square input size in pixels
    #[arg(long)]
    img_size: Option<u32>,

    /// Seed for shuffling and augmentation
    #[arg(long)]
    seed: Option<u64>,

    /// Compute device: cpu, cuda or cuda:N
    #[arg(long)]
    device: Option<String>,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model (.safetensors or .onnx)
    #[arg(long, default_value = dogbreed::core::DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Class index mapping written by training
    #[arg(long, default_value = dogbreed::core::DEFAULT_CLASS_NAMES_PATH)]
    class_names: PathBuf,

    /// Square input size in pixels; must match training
    #[arg(long, default_value_t = dogbreed::core::DEFAULT_IMAGE_SIZE.0)]
    img_size: u32,

    /// Input layout of ONNX models: hwc or chw
    #[arg(long, default_value = "hwc")]
    channel_order: ChannelOrder,

    /// Compute device for safetensors models
    #[arg(long, default_value = "cpu")]
    device: String,

    /// Image files to classify
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    match Cli::parse().command {
        Command::Train(args) => train(args),
        Command::Predict(args) => predict(args),
    }
}

fn train(args: TrainArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default(),
    };
    if let Some(dataset) = args.dataset {
        config.dataset_dir = dataset;
    }
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(output) = args.output {
        config.output_model = output;
    }
    if let Some(class_names) = args.class_names {
        config.class_names_path = class_names;
    }
    if let Some(backbone) = args.backbone {
        config.backbone_weights = backbone;
    }
    if let Some(size) = args.img_size {
        config.image_size = (size, size);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(device) = args.device {
        config.device = device;
    }

    info!("Training on {}", config.train_dir().display());
    let report = build_and_train(&config)?;
    info!("{}", report);
    Ok(())
}

fn predict(args: PredictArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = InferenceConfig::new(args.model, args.class_names)
        .with_image_size((args.img_size, args.img_size))
        .with_onnx_channel_order(args.channel_order)
        .with_device(args.device);
    config.validate()?;

    let context = ClassifierContext::load(&config)?;
    if !context.is_ready() {
        error!(
            "Model not loaded: need both {} and {}",
            config.model_path.display(),
            config.class_names_path.display()
        );
        return Err("model not loaded".into());
    }

    let mut failures = 0usize;
    for path in &args.images {
        match context.classify_upload(path) {
            Ok(prediction) => println!(
                "{}: {} ({:.2}%)",
                path.display(),
                prediction.label,
                prediction.confidence_percent()
            ),
            Err(e) => {
                failures += 1;
                error!("{}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        warn!("{} of {} images failed", failures, args.images.len());
    }
    Ok(())
}
