use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::error;

use crate::stats::TrackStatistics;
use crate::tracker::TrackPoint;

/// Trait for output handlers
pub trait OutputHandler {
    /// Handle one per-frame track point
    fn handle_point(&mut self, point: &TrackPoint);

    /// Called once after the run with the aggregated statistics
    fn finish(&mut self, _track: &[TrackPoint], _stats: &TrackStatistics) {}
}

/// CSV format output
///
/// One row per frame: step,estimate,velocity,measurement. The measurement
/// field is empty for coasted frames.
pub struct CsvOutput {
    writer: BufWriter<File>,
}

impl CsvOutput {
    pub fn new(path: &str) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(CsvOutput {
            writer: BufWriter::new(file),
        })
    }

    fn format_row(point: &TrackPoint) -> String {
        match point.measurement {
            Some(z) => format!(
                "{},{:.3},{:.3},{:.3}",
                point.step, point.estimate, point.velocity, z
            ),
            None => format!("{},{:.3},{:.3},", point.step, point.estimate, point.velocity),
        }
    }
}

impl OutputHandler for CsvOutput {
    fn handle_point(&mut self, point: &TrackPoint) {
        if let Err(e) = writeln!(self.writer, "{}", Self::format_row(point)) {
            error!("Failed to write CSV row: {}", e);
        }
    }

    fn finish(&mut self, _track: &[TrackPoint], _stats: &TrackStatistics) {
        if let Err(e) = self.writer.flush() {
            error!("Failed to flush CSV output: {}", e);
        }
    }
}

/// JSON format output
///
/// Writes the whole run at the end: the track points plus the aggregated
/// statistics, as one JSON document.
pub struct JsonOutput {
    path: String,
}

impl JsonOutput {
    pub fn new(path: &str) -> Self {
        JsonOutput {
            path: path.to_string(),
        }
    }
}

impl OutputHandler for JsonOutput {
    fn handle_point(&mut self, _point: &TrackPoint) {
        // Whole-run document, written in finish()
    }

    fn finish(&mut self, track: &[TrackPoint], stats: &TrackStatistics) {
        let doc = serde_json::json!({
            "track": track,
            "stats": stats,
        });

        let result = File::create(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|f| serde_json::to_writer_pretty(BufWriter::new(f), &doc).map_err(|e| e.to_string()));

        if let Err(e) = result {
            error!("Failed to write JSON output to {}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_row_with_measurement() {
        let point = TrackPoint {
            step: 3,
            estimate: 321.3399,
            velocity: 0.66,
            measurement: Some(322.0),
        };
        assert_eq!(CsvOutput::format_row(&point), "3,321.340,0.660,322.000");
    }

    #[test]
    fn test_csv_row_without_measurement() {
        let point = TrackPoint {
            step: 4,
            estimate: 322.0,
            velocity: 0.66,
            measurement: None,
        };
        assert_eq!(CsvOutput::format_row(&point), "4,322.000,0.660,");
    }

    #[test]
    fn test_json_output_roundtrip() {
        let track = vec![
            TrackPoint {
                step: 0,
                estimate: 321.34,
                velocity: 0.66,
                measurement: Some(322.0),
            },
            TrackPoint {
                step: 1,
                estimate: 322.0,
                velocity: 0.66,
                measurement: None,
            },
        ];
        let stats = TrackStatistics::from_track(&track);

        let path = std::env::temp_dir().join("lane_tracker_test_output.json");
        let path_str = path.to_str().unwrap().to_string();

        let mut out = JsonOutput::new(&path_str);
        out.finish(&track, &stats);

        let contents = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(doc["track"].as_array().unwrap().len(), 2);
        assert_eq!(doc["track"][1]["measurement"], serde_json::Value::Null);
        assert_eq!(doc["stats"]["measured_frames"], 1);

        let _ = std::fs::remove_file(&path);
    }
}
