//! demos/dashboard.rs
//!
//! Walks the full pipeline the way the dashboard shell does: ingest a wind
//! log, filter it, and print the table, summary metrics, and both wind
//! roses as the payloads a renderer would consume.
//!
//! To run:
//! cargo run --example dashboard -- path/to/wind.csv

use std::error::Error;

use windlog::{
    aggregate_rose, summarize, FilterSpec, MagnitudeField, RoseAggregation, RoseConfig,
    UtilityWindow, Windlog, COMPASS_POINTS_16,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: dashboard <wind-log.csv>")?;

    let client = Windlog::new().await?;
    let dataset = client.from_file(&path).await?;

    let (min_date, max_date) = dataset.date_span().ok_or("dataset is empty")?;
    println!(
        "{} records from {} to {} ({} years available)",
        dataset.records().len(),
        min_date,
        max_date,
        dataset.available_years().len(),
    );
    if dataset.diagnostics().has_issues() {
        println!("normalization diagnostics: {:?}", dataset.diagnostics());
    }

    // The widest selection the date picker would offer.
    let filtered = dataset.filter(&FilterSpec::DateRange {
        start: min_date,
        end: max_date,
    });
    if filtered.is_empty() {
        println!("no records for the selected filter");
        return Ok(());
    }

    let metrics = summarize(&filtered, &UtilityWindow::default());
    println!("\nsummary metrics:\n{}", serde_json::to_string_pretty(&metrics)?);

    for field in [MagnitudeField::Speed, MagnitudeField::Gust] {
        println!("\nwind rose ({field:?}):");
        match aggregate_rose(&filtered, field, &RoseConfig::default()) {
            RoseAggregation::Bins(bins) => {
                for bin in bins.iter().filter(|b| b.frequency > 0.0) {
                    println!(
                        "  {:>3} {:5.1}-{:5.1} km/h  {:5.1}%",
                        COMPASS_POINTS_16[bin.sector],
                        bin.band_lower,
                        bin.band_upper,
                        bin.frequency * 100.0,
                    );
                }
            }
            RoseAggregation::InsufficientData {
                qualifying,
                required,
            } => {
                println!("  insufficient data: {qualifying} qualifying pairs, need {required}");
            }
        }
    }

    Ok(())
}
