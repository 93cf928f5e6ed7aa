//! Wind-rose aggregation: a circular histogram of (direction, magnitude)
//! pairs.
//!
//! Directions partition [0, 360) into equal angular sectors centered on the
//! compass points, so with 16 sectors the north sector spans the 360-to-0
//! wrap. Magnitudes partition into equal-width bands over [0, max]. Cell
//! frequencies are normalized against the number of qualifying pairs and sum
//! to 1 for any non-empty aggregation.

use crate::types::record::{MagnitudeField, WindRecord};
use serde::Serialize;

/// 16-point compass labels, sector 0 = north.
pub const COMPASS_POINTS_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Shape of the rose: sector count, magnitude band count, and the minimum
/// number of qualifying pairs below which aggregation is refused.
///
/// The threshold of 5 is a domain constant inherited from the station
/// dashboard; a rose drawn from fewer pairs is misleading rather than
/// informative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoseConfig {
    pub sectors: usize,
    pub bands: usize,
    pub min_samples: usize,
}

impl Default for RoseConfig {
    fn default() -> Self {
        Self {
            sectors: 16,
            bands: 6,
            min_samples: 5,
        }
    }
}

/// One (sector, band) cell of the rose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoseBin {
    /// Sector index, counting clockwise from north.
    pub sector: usize,
    /// Angular center of the sector in degrees (0 = north).
    pub sector_center_degrees: f64,
    /// Band index, 0 = weakest.
    pub band: usize,
    /// Inclusive lower magnitude bound of the band.
    pub band_lower: f64,
    /// Upper magnitude bound of the band; the last band includes its upper
    /// bound so the maximum observation lands inside the histogram.
    pub band_upper: f64,
    /// Fraction of all qualifying pairs falling in this cell.
    pub frequency: f64,
}

/// Result of one rose aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RoseAggregation {
    /// The full (sector x band) grid, frequencies summing to 1.
    Bins(Vec<RoseBin>),
    /// Fewer qualifying pairs than the configured minimum; no histogram.
    InsufficientData { qualifying: usize, required: usize },
}

/// Buckets all records carrying both a direction and the chosen magnitude
/// into the circular histogram.
///
/// Speed and gust roses are built by two independent invocations over the
/// same filtered set; each applies the minimum-sample gate on its own
/// qualifying pairs.
pub fn aggregate_rose(
    records: &[WindRecord],
    field: MagnitudeField,
    config: &RoseConfig,
) -> RoseAggregation {
    let pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((r.direction_degrees?, r.magnitude(field)?)))
        .collect();

    if pairs.len() < config.min_samples {
        return RoseAggregation::InsufficientData {
            qualifying: pairs.len(),
            required: config.min_samples,
        };
    }

    let sector_width = 360.0 / config.sectors as f64;
    let max_magnitude = pairs.iter().fold(0.0_f64, |acc, (_, m)| acc.max(*m));
    let band_width = max_magnitude / config.bands as f64;

    let mut counts = vec![0_usize; config.sectors * config.bands];
    for (direction, magnitude) in &pairs {
        let sector = sector_of(*direction, config.sectors);
        // Equal-width bands over [0, max]; a degenerate all-zero series
        // collapses into band 0.
        let band = if band_width > 0.0 {
            ((magnitude / band_width) as usize).min(config.bands - 1)
        } else {
            0
        };
        counts[sector * config.bands + band] += 1;
    }

    let total = pairs.len() as f64;
    let bins = counts
        .iter()
        .enumerate()
        .map(|(cell, count)| {
            let sector = cell / config.bands;
            let band = cell % config.bands;
            RoseBin {
                sector,
                sector_center_degrees: sector as f64 * sector_width,
                band,
                band_lower: band as f64 * band_width,
                band_upper: (band + 1) as f64 * band_width,
                frequency: *count as f64 / total,
            }
        })
        .collect();

    RoseAggregation::Bins(bins)
}

/// Maps a direction in [0, 360) to its compass-centered sector: sector 0 is
/// centered on 0 degrees and spans the wrap-around.
fn sector_of(direction_degrees: f64, sectors: usize) -> usize {
    let sector_width = 360.0 / sectors as f64;
    let shifted = (direction_degrees + sector_width / 2.0) % 360.0;
    ((shifted / sector_width) as usize).min(sectors - 1)
}
