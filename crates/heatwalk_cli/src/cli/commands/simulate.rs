use anyhow::{Context, Result};
use chrono::Utc;
use futures::StreamExt;
use heatwalk_core::format::{distance_imperial, eta, instruction_line, miles};
use heatwalk_core::navigation::{
    LocationSource, NavProgress, NavState, Navigator, RouteRenderer, SimulatedWalk, WatchOptions,
};
use heatwalk_core::routing::RouteClient;
use heatwalk_core::{LineFeature, NavConfig, Profile};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::args::SimulateArgs;
use crate::cli::color::Colors;
use crate::cli::validate::{parse_lng_lat, parse_profile, validate_endpoints};
use crate::ui::{self, Style, info, success, warning};

/// Prints maneuvers as they change instead of drawing a map.
struct ConsoleRenderer {
    style: Style,
    colors: Colors,
    threshold_m: f64,
    last_step: Option<usize>,
    was_off_route: bool,
    was_rerouting: bool,
    navigating: bool,
    /// Routes drawn while navigating, i.e. applied reroutes.
    reroutes: u32,
    reroutes_at_request: u32,
}

impl ConsoleRenderer {
    fn new(threshold_m: f64) -> Self {
        let style = Style::default();
        Self {
            style,
            colors: Colors::new(&style),
            threshold_m,
            last_step: None,
            was_off_route: false,
            was_rerouting: false,
            navigating: false,
            reroutes: 0,
            reroutes_at_request: 0,
        }
    }
}

impl RouteRenderer for ConsoleRenderer {
    fn set_route_geometry(&mut self, profile: Profile, line: Option<&LineFeature>) {
        let Some(line) = line else {
            return;
        };
        tracing::debug!(
            profile = profile.service_id(),
            points = line.geometry.coordinates.len(),
            "route drawn"
        );
        if self.navigating {
            self.reroutes += 1;
            ui::rerouted(self.reroutes, self.style);
            self.last_step = None;
            self.was_off_route = false;
        }
    }

    fn update_progress(&mut self, p: &NavProgress) {
        if p.rerouting && !self.was_rerouting {
            self.reroutes_at_request = self.reroutes;
        } else if !p.rerouting && self.was_rerouting && self.reroutes == self.reroutes_at_request {
            ui::reroute_failed(self.style);
        }
        self.was_rerouting = p.rerouting;

        if p.off_route && !self.was_off_route {
            let off = self.colors.off_route(
                p.off_route_m,
                self.threshold_m,
                distance_imperial(p.off_route_m),
            );
            ui::off_route(&off, self.style);
        } else if !p.off_route && self.was_off_route {
            ui::back_on_route(self.style);
        }
        self.was_off_route = p.off_route;

        let c = &self.colors;

        if self.last_step == Some(p.step_index) {
            return;
        }
        self.last_step = Some(p.step_index);

        let line = instruction_line(&p.step_text, p.turn_sign, p.street_name.as_deref());
        println!(
            "[{}] {} {}",
            p.at.format("%H:%M:%S"),
            line,
            c.dim(format!(
                "({} left, ETA {})",
                miles(p.total_remaining_m),
                eta(p.eta_s)
            ))
        );
    }

    fn state_changed(&mut self, state: NavState) {
        tracing::info!(?state, "navigation state");
        self.navigating = state == NavState::Navigating;
    }
}

pub async fn run(cfg: &NavConfig, args: &SimulateArgs) -> Result<()> {
    let from = parse_lng_lat(&args.from, "origin")?;
    let to = parse_lng_lat(&args.to, "destination")?;
    validate_endpoints(from, to)?;
    let profile = parse_profile(&args.profile)?;

    let client = Arc::new(RouteClient::from_config(cfg)?);
    let renderer = ConsoleRenderer::new(cfg.reroute.off_route_threshold_m);
    let mut nav = Navigator::new(client, Box::new(renderer)).with_config(cfg);

    let preview = nav
        .choose_destination(from, to)
        .await
        .context("Route preview failed")?;
    if preview.get(profile).is_fallback() {
        warning(format!(
            "{} route unavailable; walking a straight line",
            profile.label()
        ));
    }

    let session = nav.start_nav(profile, Utc::now())?;
    let walk = SimulatedWalk::new(session.route().polyline.clone(), session.started_at())
        .with_pace(args.pace_mps)
        .with_interval(Duration::from_secs_f64(args.interval_s))
        .with_lateral_offset(args.offset_m)
        .real_time(args.real_time);

    let opts = WatchOptions::default();
    info(format!(
        "Walking {} at {:.1} m/s ({} fixes)",
        miles(session.route().distance_m),
        args.pace_mps,
        walk.fixes(opts).len()
    ));

    let mut fixes = walk.watch(opts);
    while let Some(sample) = fixes.next().await {
        let Some(progress) = nav.on_position(sample) else {
            if nav.state() == NavState::Navigating {
                continue;
            }
            break;
        };
        // Without wall-clock pacing the walk would outrun the reroute.
        if progress.rerouting && !args.real_time {
            nav.settle_reroute().await;
        }
    }

    let summary = nav.end()?;
    println!();
    success(format!(
        "Trip ended: {} in {} min, {} reroute(s), {} remaining",
        summary.profile.label(),
        summary.elapsed().num_minutes(),
        summary.reroutes,
        summary
            .remaining_m
            .map(distance_imperial)
            .unwrap_or_else(|| "unknown".to_string())
    ));
    Ok(())
}
