//! Timing pattern analysis: burst activity and recurring
//! time-of-day concentration across a set of transaction timestamps.

use serde::{Deserialize, Serialize};

const BURST_THRESHOLD_SECS: i64 = 600;
const MIN_BURST_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalPatternKind {
 BurstActivity,
 TimeOfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalPattern {
 pub kind: TemporalPatternKind,
 pub confidence: f64,
 pub description: String,
 pub timestamps: Vec<i64>,
}

/// Run both detectors over `timestamps` (unix seconds), returning
/// whichever patterns are found.
pub fn analyze_timing_correlation(timestamps: &[i64]) -> Vec<TemporalPattern> {
 let mut patterns = Vec::new();
 if let Some(burst) = detect_burst_activity(timestamps) {
 patterns.push(burst);
 }
 if let Some(tod) = detect_time_of_day_pattern(timestamps) {
 patterns.push(tod);
 }
 patterns
}

/// Slide a window of [`MIN_BURST_SIZE`] timestamps looking for one that
/// fits within [`BURST_THRESHOLD_SECS`].
fn detect_burst_activity(timestamps: &[i64]) -> Option<TemporalPattern> {
 if timestamps.len() < MIN_BURST_SIZE {
 return None;
 }

 let mut sorted = timestamps.to_vec();
 sorted.sort_unstable();

 for start in 0..=(sorted.len() - MIN_BURST_SIZE) {
 let window_end = start + MIN_BURST_SIZE - 1;
 let time_diff = sorted[window_end] - sorted[start];
 if time_diff <= BURST_THRESHOLD_SECS {
 let burst_size = window_end - start + 1;
 let confidence = (0.5 + (burst_size as f64 / 20.0)).min(0.9);
 return Some(TemporalPattern {
 kind: TemporalPatternKind::BurstActivity,
 confidence,
 description: format!("{burst_size} transactions within {time_diff} seconds"),
 timestamps: sorted[start..=window_end].to_vec(),
 });
 }
 }
 None
}

/// Hour-of-day histogram over a +/-1 hour window around the busiest
/// hour; flagged when that window covers more than half of activity.
fn detect_time_of_day_pattern(timestamps: &[i64]) -> Option<TemporalPattern> {
 if timestamps.len() < 5 {
 return None;
 }

 let mut hour_counts = [0usize; 24];
 for &ts in timestamps {
 let hour = hour_of_day(ts);
 hour_counts[hour] += 1;
 }

 let most_common_hour = (0..24).max_by_key(|&h| hour_counts[h]).unwrap();
 let adjacent_count: usize = [
 ((most_common_hour + 23) % 24),
 most_common_hour,
 ((most_common_hour + 1) % 24),
 ]
.iter()
.map(|&h| hour_counts[h])
.sum();

 if (adjacent_count as f64) > (timestamps.len() as f64) * 0.5 {
 let confidence = (0.5 + adjacent_count as f64 / timestamps.len() as f64).min(0.8);
 return Some(TemporalPattern {
 kind: TemporalPatternKind::TimeOfDay,
 confidence,
 description: format!(
 "{adjacent_count}/{} transactions occur around {most_common_hour}:00",
 timestamps.len()
 ),
 timestamps: timestamps.to_vec(),
 });
 }
 None
}

fn hour_of_day(unix_secs: i64) -> usize {
 (unix_secs.rem_euclid(86_400) / 3600) as usize
}

/// Average seconds between consecutive transactions, sorted by time.
pub fn transaction_velocity(timestamps: &[i64]) -> f64 {
 if timestamps.len() < 2 {
 return 0.0;
 }
 let mut sorted = timestamps.to_vec();
 sorted.sort_unstable();
 let diffs: Vec<i64> = sorted.windows(2).map(|w| w[1] - w[0]).collect();
 diffs.iter().sum::<i64>() as f64 / diffs.len() as f64
}
