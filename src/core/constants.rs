//! Constants shared by the training and inference pipelines.

/// Default dataset root; training reads `<root>/train`.
pub const DEFAULT_DATASET_DIR: &str = "dataset";

/// Subdirectory of the dataset root that holds the labeled class folders.
pub const TRAIN_SUBDIR: &str = "train";

/// Default model input size (height, width).
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (128, 128);

/// Default training batch size.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Default number of training epochs.
pub const DEFAULT_EPOCHS: usize = 6;

/// Default path of the trained model artifact.
pub const DEFAULT_MODEL_PATH: &str = "dogbreed.safetensors";

/// Default path of the index-to-label mapping.
pub const DEFAULT_CLASS_NAMES_PATH: &str = "class_names.json";

/// Default path of the pretrained VGG19 weights (torchvision key layout).
pub const DEFAULT_BACKBONE_PATH: &str = "vgg19.safetensors";

/// Fraction of each class held out for validation.
pub const DEFAULT_VALIDATION_SPLIT: f32 = 0.2;

/// Initial learning rate of the optimizer.
pub const DEFAULT_LEARNING_RATE: f64 = 1e-3;

/// Width of the hidden dense layer in the classification head.
pub const HEAD_HIDDEN_UNITS: usize = 256;

/// Dropout probability between the two dense layers of the head.
pub const HEAD_DROPOUT: f32 = 0.5;

/// Pixel rescale factor applied to both training and inference inputs.
pub const PIXEL_RESCALE: f32 = 1.0 / 255.0;

/// Extensions picked up as samples when scanning a dataset directory.
pub const DATASET_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "ppm", "tif", "tiff"];

/// Extensions accepted for images submitted for classification.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Minimum number of images before batch loading switches to rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Learning-rate multiplier applied when validation loss plateaus.
pub const PLATEAU_FACTOR: f64 = 0.5;

/// Epochs without validation-loss improvement before the learning rate drops.
pub const PLATEAU_PATIENCE: usize = 2;

/// Minimum decrease in validation loss that counts as an improvement.
pub const PLATEAU_MIN_DELTA: f64 = 1e-4;
