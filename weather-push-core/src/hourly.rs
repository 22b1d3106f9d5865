//! Merging of hourly precipitation probabilities into alert ranges.

use chrono::Duration;

use crate::model::{AlertRange, HourlySample};

/// Samples at or above this probability (percent) raise an alert.
pub const PRECIPITATION_THRESHOLD: f64 = 30.0;

/// Only the next day of hourly samples is considered.
pub const HOURLY_WINDOW: usize = 24;

/// Collapse the first [`HOURLY_WINDOW`] samples into chronological, non-overlapping ranges.
///
/// A qualifying sample extends the open range when it is at most one hour after the
/// range's end, otherwise it closes that range and opens a new one. Samples under the
/// threshold are skipped and never close a range on their own.
pub fn merge_precipitation_windows(samples: &[HourlySample]) -> Vec<AlertRange> {
    let max_gap = Duration::hours(1);

    let (mut closed, open) = samples
        .iter()
        .take(HOURLY_WINDOW)
        .filter(|sample| sample.probability >= PRECIPITATION_THRESHOLD)
        .fold(
            (Vec::new(), None::<AlertRange>),
            |(mut closed, open), sample| match open {
                Some(mut range) if sample.timestamp - range.end <= max_gap => {
                    range.end = sample.timestamp;
                    if sample.probability > range.max_probability {
                        range.max_probability = sample.probability;
                        range.skycon = sample.skycon.clone();
                    }
                    (closed, Some(range))
                }
                previous => {
                    closed.extend(previous);
                    (closed, Some(open_range(sample)))
                }
            },
        );

    closed.extend(open);
    closed
}

fn open_range(sample: &HourlySample) -> AlertRange {
    AlertRange {
        start: sample.timestamp,
        end: sample.timestamp,
        skycon: sample.skycon.clone(),
        max_probability: sample.probability,
    }
}
