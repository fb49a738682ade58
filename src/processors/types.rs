//! Shared processor types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Memory layout of a normalized image tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// Channel, Height, Width order (common in PyTorch and candle)
    #[default]
    CHW,
    /// Height, Width, Channel order (common in TensorFlow)
    HWC,
}

impl FromStr for ChannelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chw" | "nchw" => Ok(ChannelOrder::CHW),
            "hwc" | "nhwc" => Ok(ChannelOrder::HWC),
            other => Err(format!("unknown channel order '{other}', expected chw or hwc")),
        }
    }
}

impl std::fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelOrder::CHW => f.write_str("chw"),
            ChannelOrder::HWC => f.write_str("hwc"),
        }
    }
}
