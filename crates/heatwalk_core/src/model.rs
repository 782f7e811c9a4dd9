use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic position in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lng: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// `[lng, lat]`, the order used on the wire and in GeoJSON.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// One fix delivered by a location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub position: Position,
    pub at: DateTime<Utc>,
    pub accuracy_m: Option<f64>,
}

impl PositionSample {
    pub fn new(position: Position, at: DateTime<Utc>) -> Self {
        Self {
            position,
            at,
            accuracy_m: None,
        }
    }
}

/// Routing weighting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Fast,
    Balanced,
    Cool,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Fast, Profile::Balanced, Profile::Cool];

    /// Profile identifier understood by the routing service.
    pub fn service_id(self) -> &'static str {
        match self {
            Profile::Fast => "foot_fastest",
            Profile::Balanced => "foot_balanced",
            Profile::Cool => "foot_coolest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Profile::Fast => "Fastest",
            Profile::Balanced => "Balanced",
            Profile::Cool => "Coolest",
        }
    }

    /// Permissive parsing: accepts labels, short names and service ids.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "fastest" | "foot_fastest" => Some(Profile::Fast),
            "bal" | "balanced" | "foot_balanced" => Some(Profile::Balanced),
            "cool" | "coolest" | "foot_coolest" => Some(Profile::Cool),
            _ => None,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Maneuver category of a turn instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSign {
    UTurn,
    SharpLeft,
    Left,
    SlightLeft,
    Continue,
    SlightRight,
    Right,
    SharpRight,
    Arrive,
    KeepLeft,
    KeepRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub distance_m: f64,
    pub duration_ms: f64,
    pub text: String,
    pub turn_sign: TurnSign,
    /// `(start, end)` vertex indices into the owning route's polyline.
    pub vertex_interval: (usize, usize),
    pub street_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub distance_m: f64,
    pub duration_s: f64,
    pub polyline: Vec<Position>,
    pub instructions: Vec<Instruction>,
    pub waypoints: (Position, Position),
}

impl Route {
    pub fn origin(&self) -> Position {
        self.waypoints.0
    }

    pub fn destination(&self) -> Position {
        self.waypoints.1
    }

    pub fn last_step(&self) -> usize {
        self.instructions.len().saturating_sub(1)
    }

    pub fn to_line_feature(&self) -> LineFeature {
        LineFeature::from_positions(&self.polyline)
    }
}

/// Output of snapping a live position onto a route polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    pub closest: Position,
    pub off_distance_m: f64,
    pub next_vertex_index: usize,
    pub traveled_m: f64,
}

/// GeoJSON `Feature<LineString>` as consumed by map renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: LineGeometry,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl LineFeature {
    pub fn from_positions(points: &[Position]) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: LineGeometry {
                kind: "LineString".to_string(),
                coordinates: points.iter().map(|p| p.to_lng_lat()).collect(),
            },
            properties: serde_json::Map::new(),
        }
    }
}
