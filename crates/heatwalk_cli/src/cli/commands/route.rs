use anyhow::{Context, Result};
use heatwalk_core::format::{distance_imperial, instruction_line, miles, trip_duration};
use heatwalk_core::routing::RouteClient;
use heatwalk_core::{NavConfig, Position, Profile};

use crate::cli::color::Colors;
use crate::ui::Style;

pub async fn run(
    cfg: &NavConfig,
    from: Position,
    to: Position,
    profile: Profile,
    json: bool,
) -> Result<()> {
    let client = RouteClient::from_config(cfg)?;
    let route = client
        .route(from, to, profile)
        .await
        .with_context(|| format!("{} route failed", profile.label()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&*route)?);
        return Ok(());
    }

    let c = Colors::new(&Style::default());

    println!("Route ({}) via {}", c.profile(profile), client.backend_name());
    println!("Distance: {}", miles(route.distance_m));
    println!("Duration: {}", trip_duration(route.duration_s));
    println!("Points: {}", route.polyline.len());
    println!();

    for (i, step) in route.instructions.iter().enumerate() {
        let line = instruction_line(&step.text, step.turn_sign, step.street_name.as_deref());
        let dist = if step.distance_m > 0.0 {
            c.dim(format!(" ({})", distance_imperial(step.distance_m)))
        } else {
            String::new()
        };
        println!("{:>3}. {}{}", i + 1, line, dist);
    }

    Ok(())
}
