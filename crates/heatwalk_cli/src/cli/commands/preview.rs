use anyhow::{Context, Result};
use heatwalk_core::format::{miles, trip_duration};
use heatwalk_core::routing::RouteClient;
use heatwalk_core::{NavConfig, Position};

use crate::cli::color::Colors;
use crate::ui::{Style, warning};

pub async fn run(cfg: &NavConfig, from: Position, to: Position) -> Result<()> {
    let client = RouteClient::from_config(cfg)?;
    let preview = client
        .compute_all_profiles(from, to)
        .await
        .context("Route preview failed")?;

    let c = Colors::new(&Style::default());

    println!("{:<10} {:>9} {:>12}  {}", "Profile", "Distance", "Duration", "Source");
    for slot in preview.iter() {
        let stats = slot.stats();
        let source = match &slot.outcome {
            Ok(()) => c.ok(client.backend_name()),
            Err(e) => c.warn(format!("straight line ({e})")),
        };
        // pad outside the color codes so the columns stay aligned
        let pad = " ".repeat(10usize.saturating_sub(slot.profile.label().len()));
        let label = format!("{}{}", c.profile(slot.profile), pad);
        println!(
            "{} {:>9} {:>12}  {}",
            label,
            miles(stats.distance_m),
            trip_duration(stats.duration_s),
            source
        );
    }

    if !preview.any_success {
        println!();
        warning("Routing service unavailable; distances are straight-line estimates.");
    }
    Ok(())
}
