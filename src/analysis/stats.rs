//! Summary metrics over a filtered record set.
//!
//! Every metric is an independent reduction over the records that actually
//! carry the field it needs, so the denominators differ per metric: three
//! records where one speed cell is absent yield a mean over two values but a
//! record count of three.

use crate::types::record::WindRecord;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::HashMap;

/// The speed band considered operationally useful, in km/h.
///
/// The 3-25 km/h defaults are domain constants inherited from the station
/// operators, kept configurable but not rederived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UtilityWindow {
    pub min_kmh: f64,
    pub max_kmh: f64,
}

impl Default for UtilityWindow {
    fn default() -> Self {
        Self {
            min_kmh: 3.0,
            max_kmh: 25.0,
        }
    }
}

impl UtilityWindow {
    pub fn contains(&self, speed_kmh: f64) -> bool {
        speed_kmh >= self.min_kmh && speed_kmh <= self.max_kmh
    }
}

/// Read-only summary of one filtered record set, recomputed in full on every
/// filter change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Most frequent speed value among speed-carrying records.
    pub modal_speed: Option<f64>,
    /// Most frequent direction among direction-carrying records.
    pub dominant_direction: Option<f64>,
    /// Share of speed-carrying records inside the utility window, 0-100.
    pub pct_time_in_utility_window: f64,
    pub mean_speed: Option<f64>,
    pub max_gust: Option<f64>,
    /// Total filtered records, including rows with absent numeric fields.
    pub record_count: usize,
}

/// Computes all summary metrics for a filtered record set.
pub fn summarize(records: &[WindRecord], window: &UtilityWindow) -> SummaryMetrics {
    let speeds = || records.iter().filter_map(|r| r.speed);

    let speed_count = speeds().count();
    let in_window = speeds().filter(|s| window.contains(*s)).count();
    // When no record carries a speed the denominator defaults to 1, yielding
    // 0% rather than a division failure. Deliberate, load-bearing exception.
    let denominator = if speed_count == 0 { 1 } else { speed_count };
    let pct_time_in_utility_window = in_window as f64 / denominator as f64 * 100.0;

    let mean_speed = if speed_count == 0 {
        None
    } else {
        Some(speeds().sum::<f64>() / speed_count as f64)
    };

    SummaryMetrics {
        modal_speed: stable_mode(speeds()),
        dominant_direction: stable_mode(records.iter().filter_map(|r| r.direction_degrees)),
        pct_time_in_utility_window,
        mean_speed,
        max_gust: records
            .iter()
            .filter_map(|r| r.gust)
            .fold(None, |acc: Option<f64>, g| {
                Some(acc.map_or(g, |a| a.max(g)))
            }),
        record_count: records.len(),
    }
}

/// Most frequent value; ties break toward the value encountered first in
/// sequence order.
fn stable_mode(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut occurrences: HashMap<OrderedFloat<f64>, (usize, usize)> = HashMap::new();
    for (position, value) in values.enumerate() {
        let entry = occurrences.entry(OrderedFloat(value)).or_insert((0, position));
        entry.0 += 1;
    }
    occurrences
        .into_iter()
        .min_by_key(|(_, (count, first_seen))| (std::cmp::Reverse(*count), *first_seen))
        .map(|(value, _)| value.into_inner())
}
