//! GraphHopper-compatible HTTP backend.
//!
//! Request: `POST {base}/route` with unencoded points and turn instructions.
//! Response: `paths[0]` with distance (m), time (ms), point coordinates and
//! instructions whose integer signs are decoded into [`TurnSign`] here.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{CustomModel, RoutingConfig, is_graphhopper_cloud, normalize_base_url};
use crate::error::RouteError;
use crate::model::{Instruction, Position, Route, TurnSign};
use crate::routing::backend::{RouteBackend, RouteQuery};

pub struct GraphHopperBackend {
    http: Client,
    base: String,
    url: String,
    timeout_ms: u64,
}

impl GraphHopperBackend {
    pub fn new(cfg: &RoutingConfig) -> Result<Self> {
        let base = normalize_base_url(&cfg.base_url)
            .with_context(|| format!("Invalid routing base URL: {:?}", cfg.base_url))?;

        let url = if is_graphhopper_cloud(&base) {
            let Some(key) = cfg.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
                bail!(
                    "GraphHopper cloud requires an API key (set {} or routing.api_key)",
                    crate::config::ENV_API_KEY
                );
            };
            reqwest::Url::parse_with_params(&format!("{base}/route"), &[("key", key)])
                .context("Failed to build GraphHopper URL")?
                .to_string()
        } else {
            format!("{base}/route")
        };

        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base,
            url,
            timeout_ms: cfg.timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl RouteBackend for GraphHopperBackend {
    async fn fetch_route(&self, query: &RouteQuery) -> Result<Route, RouteError> {
        let body = RouteBody::from_query(query);

        let resp = self
            .http
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(RouteError::NetworkError(describe_failure(status.as_u16(), &text)));
        }

        let parsed: RouteResponse = serde_json::from_str(&text).map_err(|_| {
            RouteError::NetworkError("GraphHopper returned invalid JSON".to_string())
        })?;

        decode_response(parsed, query)
    }

    fn name(&self) -> &str {
        &self.base
    }
}

impl GraphHopperBackend {
    fn transport_error(&self, e: reqwest::Error) -> RouteError {
        if e.is_timeout() {
            RouteError::Timeout(self.timeout_ms)
        } else {
            RouteError::NetworkError(e.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct RouteBody<'a> {
    profile: &'a str,
    points: [[f64; 2]; 2],
    points_encoded: bool,
    instructions: bool,
    locale: &'a str,
    #[serde(rename = "ch.disable", skip_serializing_if = "Option::is_none")]
    ch_disable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_model: Option<&'a CustomModel>,
}

impl<'a> RouteBody<'a> {
    fn from_query(q: &'a RouteQuery) -> Self {
        let custom_model = q.custom_model.as_ref();
        Self {
            profile: q.profile.service_id(),
            points: [q.origin.to_lng_lat(), q.destination.to_lng_lat()],
            points_encoded: false,
            instructions: true,
            locale: &q.locale,
            // custom models only work with the flexible mode
            ch_disable: custom_model.map(|_| true),
            custom_model,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub paths: Vec<WirePath>,
}

#[derive(Debug, Deserialize)]
pub struct WirePath {
    #[serde(default)]
    pub distance: f64,
    /// Milliseconds.
    #[serde(default)]
    pub time: f64,
    pub points: Option<WirePoints>,
    #[serde(default)]
    pub instructions: Vec<WireInstruction>,
}

#[derive(Debug, Deserialize)]
pub struct WirePoints {
    #[serde(default)]
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct WireInstruction {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sign: i64,
    #[serde(default)]
    pub interval: Vec<usize>,
    pub street_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    hints: Vec<ErrorHint>,
}

#[derive(Debug, Deserialize)]
struct ErrorHint {
    message: Option<String>,
}

fn describe_failure(status: u16, body: &str) -> String {
    let mut msg = format!("GraphHopper {status}");
    if let Ok(err) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(m) = err.message.filter(|m| !m.is_empty()) {
            msg.push_str(&format!(": {m}"));
        }
        if let Some(h) = err.hints.into_iter().find_map(|h| h.message) {
            if !msg.ends_with(&h) {
                msg.push_str(&format!(" ({h})"));
            }
        }
    }
    msg
}

/// Map GraphHopper's integer sign codes onto the closed maneuver set.
pub fn decode_turn_sign(sign: i64) -> TurnSign {
    match sign {
        -98 | -8 | -6 | 6 | 8 => TurnSign::UTurn,
        -3 => TurnSign::SharpLeft,
        -2 => TurnSign::Left,
        -1 => TurnSign::SlightLeft,
        1 => TurnSign::SlightRight,
        2 => TurnSign::Right,
        3 => TurnSign::SharpRight,
        4 => TurnSign::Arrive,
        -7 | 13 => TurnSign::KeepLeft,
        7 | 14 => TurnSign::KeepRight,
        _ => TurnSign::Continue,
    }
}

pub fn decode_response(resp: RouteResponse, query: &RouteQuery) -> Result<Route, RouteError> {
    let Some(path) = resp.paths.into_iter().next() else {
        return Err(RouteError::NoRouteFound(
            "routing service returned no paths".to_string(),
        ));
    };
    let Some(points) = path.points else {
        return Err(RouteError::NoRouteFound(
            "path has no points (check profile and coordinates)".to_string(),
        ));
    };

    let mut polyline: Vec<Position> = points
        .coordinates
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| Position::new(c[0], c[1]))
        .collect();

    match polyline.len() {
        0 => {
            return Err(RouteError::NoRouteFound(
                "path geometry is empty".to_string(),
            ));
        }
        1 => polyline.push(polyline[0]),
        _ => {}
    }

    let last = polyline.len() - 1;
    let mut instructions: Vec<Instruction> = path
        .instructions
        .into_iter()
        .map(|w| {
            let start = w.interval.first().copied().unwrap_or(0).min(last);
            let end = w.interval.get(1).copied().unwrap_or(start).clamp(start, last);
            Instruction {
                distance_m: w.distance.max(0.0),
                duration_ms: w.time.max(0.0),
                text: w.text,
                turn_sign: decode_turn_sign(w.sign),
                vertex_interval: (start, end),
                street_name: w.street_name.filter(|s| !s.is_empty()),
            }
        })
        .collect();

    if instructions.is_empty() {
        instructions = synthesized_instructions(path.distance.max(0.0), path.time.max(0.0), last);
    }

    Ok(Route {
        distance_m: path.distance.max(0.0),
        duration_s: path.time.max(0.0) / 1000.0,
        polyline,
        instructions,
        waypoints: (query.origin, query.destination),
    })
}

fn synthesized_instructions(distance_m: f64, duration_ms: f64, last: usize) -> Vec<Instruction> {
    vec![
        Instruction {
            distance_m,
            duration_ms,
            text: "Continue".to_string(),
            turn_sign: TurnSign::Continue,
            vertex_interval: (0, last),
            street_name: None,
        },
        Instruction {
            distance_m: 0.0,
            duration_ms: 0.0,
            text: "Arrive at destination".to_string(),
            turn_sign: TurnSign::Arrive,
            vertex_interval: (last, last),
            street_name: None,
        },
    ]
}
