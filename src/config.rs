use clap::Parser;

use crate::constants::{
    DEFAULT_FRAME_WIDTH, DEFAULT_INITIAL_POSITION, DEFAULT_LANE_SPEED,
    DEFAULT_MEASUREMENT_VARIANCE, DEFAULT_NUM_FRAMES, DEFAULT_PROCESS_NOISE,
};

/// Lane Tracker Configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Number of frames to process.
    #[arg(long, default_value_t = DEFAULT_NUM_FRAMES)]
    pub num_frames: usize,

    /// Frame width in pixels (the synthetic lane starts at its centre).
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
    pub frame_width: usize,

    /// Lane drift per frame in pixels.
    #[arg(long, default_value_t = DEFAULT_LANE_SPEED)]
    pub lane_speed: f64,

    /// Initial position estimate.
    #[arg(long, default_value_t = DEFAULT_INITIAL_POSITION)]
    pub initial_position: f64,

    /// Process noise scale (diagonal of Q).
    #[arg(long, default_value_t = DEFAULT_PROCESS_NOISE)]
    pub process_noise: f64,

    /// Measurement noise variance (R).
    #[arg(long, default_value_t = DEFAULT_MEASUREMENT_VARIANCE)]
    pub measurement_variance: f64,

    /// Standard deviation of synthetic centroid jitter (0 disables it).
    #[arg(long, default_value_t = 0.0)]
    pub noise_std: f64,

    /// Drop measurements for the last DROP frames of every PERIOD frames.
    #[arg(long, value_name = "PERIOD:DROP")]
    pub dropout: Option<String>,

    /// RNG seed for the synthetic detector.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Write per-frame results in CSV format to a local file.
    #[arg(long, value_name = "FILE")]
    pub write_csv: Option<String>,

    /// Write the full track and statistics as JSON to a local file.
    #[arg(long, value_name = "FILE")]
    pub write_json: Option<String>,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Parse the PERIOD:DROP dropout spec, if present.
    pub fn dropout_spec(&self) -> Result<Option<(usize, usize)>, String> {
        let Some(raw) = &self.dropout else {
            return Ok(None);
        };
        let (period, len) = raw
            .split_once(':')
            .ok_or_else(|| format!("invalid dropout spec '{}', expected PERIOD:DROP", raw))?;
        let period: usize = period
            .parse()
            .map_err(|_| format!("invalid dropout period '{}'", period))?;
        let len: usize = len
            .parse()
            .map_err(|_| format!("invalid dropout length '{}'", len))?;
        Ok(Some((period, len)))
    }
}
