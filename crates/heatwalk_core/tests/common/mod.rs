#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use heatwalk_core::geo::{EARTH_RADIUS_M, haversine_m};
use heatwalk_core::navigation::{NavProgress, NavState, RouteRenderer};
use heatwalk_core::routing::{RouteBackend, RouteCache, RouteClient, RouteQuery};
use heatwalk_core::{Instruction, LineFeature, Position, Profile, Route, RouteError, TurnSign};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const AUSTIN_ORIGIN: Position = Position {
    lng: -97.743,
    lat: 30.267,
};
pub const AUSTIN_DEST: Position = Position {
    lng: -97.740,
    lat: 30.270,
};

pub fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
}

pub fn t_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_750_000_000_000 + ms).unwrap()
}

/// Degrees of longitude spanning `m` meters along the parallel at `lat`.
pub fn lng_degrees(m: f64, lat: f64) -> f64 {
    (m / (EARTH_RADIUS_M * lat.to_radians().cos())).to_degrees()
}

pub fn lat_degrees(m: f64) -> f64 {
    (m / EARTH_RADIUS_M).to_degrees()
}

/// Eastbound straight route from `start`, one instruction per segment.
pub fn east_route(start: Position, segment_lengths_m: &[f64]) -> Route {
    let mut polyline = vec![start];
    let mut lng = start.lng;
    for len in segment_lengths_m {
        lng += lng_degrees(*len, start.lat);
        polyline.push(Position::new(lng, start.lat));
    }

    let instructions = polyline
        .windows(2)
        .enumerate()
        .map(|(i, w)| Instruction {
            distance_m: haversine_m(w[0], w[1]),
            duration_ms: 0.0,
            text: format!("Continue for segment {i}"),
            turn_sign: TurnSign::Continue,
            vertex_interval: (i, i + 1),
            street_name: None,
        })
        .collect();

    let distance_m = polyline.windows(2).map(|w| haversine_m(w[0], w[1])).sum();
    let destination = *polyline.last().unwrap();
    Route {
        distance_m,
        duration_s: distance_m / 1.4,
        polyline,
        instructions,
        waypoints: (start, destination),
    }
}

/// Point `along_m` meters east of `start`, shifted `north_m` meters north.
pub fn east_of(start: Position, along_m: f64, north_m: f64) -> Position {
    Position::new(
        start.lng + lng_degrees(along_m, start.lat),
        start.lat + lat_degrees(north_m),
    )
}

/// L-shaped street-grid route: east along the origin's latitude, then north.
pub fn grid_route(origin: Position, destination: Position) -> Route {
    let corner = Position::new(destination.lng, origin.lat);
    let leg1 = haversine_m(origin, corner);
    let leg2 = haversine_m(corner, destination);
    let speed = 1.3;

    Route {
        distance_m: leg1 + leg2,
        duration_s: (leg1 + leg2) / speed,
        polyline: vec![origin, corner, destination],
        instructions: vec![
            Instruction {
                distance_m: leg1,
                duration_ms: leg1 / speed * 1000.0,
                text: "Continue onto E 6th St".to_string(),
                turn_sign: TurnSign::Continue,
                vertex_interval: (0, 1),
                street_name: Some("E 6th St".to_string()),
            },
            Instruction {
                distance_m: leg2,
                duration_ms: leg2 / speed * 1000.0,
                text: "Turn left onto Brazos St".to_string(),
                turn_sign: TurnSign::Left,
                vertex_interval: (1, 2),
                street_name: Some("Brazos St".to_string()),
            },
            Instruction {
                distance_m: 0.0,
                duration_ms: 0.0,
                text: "Arrive at destination".to_string(),
                turn_sign: TurnSign::Arrive,
                vertex_interval: (2, 2),
                street_name: None,
            },
        ],
        waypoints: (origin, destination),
    }
}

/// In-memory routing service answering with grid routes.
#[derive(Default)]
pub struct FakeBackend {
    calls: AtomicUsize,
    delay: Duration,
    failing: Mutex<HashSet<Profile>>,
    queries: Mutex<Vec<RouteQuery>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<RouteQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn fail(&self, profiles: &[Profile]) {
        let mut failing = self.failing.lock().unwrap();
        failing.clear();
        failing.extend(profiles.iter().copied());
    }

    pub fn fail_all(&self) {
        self.fail(&Profile::ALL);
    }

    pub fn recover(&self) {
        self.fail(&[]);
    }
}

#[async_trait]
impl RouteBackend for FakeBackend {
    async fn fetch_route(&self, query: &RouteQuery) -> Result<Route, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.lock().unwrap().contains(&query.profile) {
            return Err(RouteError::NetworkError("service down".to_string()));
        }
        Ok(grid_route(query.origin, query.destination))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn client_for(backend: &Arc<FakeBackend>) -> Arc<RouteClient> {
    Arc::new(RouteClient::new(
        backend.clone(),
        Arc::new(RouteCache::default()),
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Profile and number of coordinates drawn; `None` hides the line.
    Geometry(Profile, Option<usize>),
    Clear,
    Progress(usize),
    State(NavState),
}

#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RecordingRenderer {
    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn reset(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl RouteRenderer for RecordingRenderer {
    fn set_route_geometry(&mut self, profile: Profile, line: Option<&LineFeature>) {
        self.events.lock().unwrap().push(RenderEvent::Geometry(
            profile,
            line.map(|l| l.geometry.coordinates.len()),
        ));
    }

    fn clear_routes(&mut self) {
        self.events.lock().unwrap().push(RenderEvent::Clear);
    }

    fn update_progress(&mut self, progress: &NavProgress) {
        self.events
            .lock()
            .unwrap()
            .push(RenderEvent::Progress(progress.step_index));
    }

    fn state_changed(&mut self, state: NavState) {
        self.events.lock().unwrap().push(RenderEvent::State(state));
    }
}
