use thiserror::Error;

use crate::model::{Position, Profile};

/// Route acquisition failures.
///
/// `Clone` so one in-flight result can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RouteError {
    #[error("invalid coordinates: lng={}, lat={}", .0.lng, .0.lat)]
    InvalidCoordinates(Position),

    #[error("route request timed out after {0} ms")]
    Timeout(u64),

    #[error("route request cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("no route found: {0}")]
    NoRouteFound(String),

    #[error("{profile} route unavailable: {reason}")]
    RouteUnavailable { profile: Profile, reason: String },
}

impl RouteError {
    /// Rejected before any I/O; retrying cannot help.
    pub fn is_permanent(&self) -> bool {
        matches!(self, RouteError::InvalidCoordinates(_))
    }
}

/// Navigation state-machine misuse and fatal route errors.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("no route preview is active")]
    NotPreviewing,

    #[error("navigation is not active")]
    NotNavigating,

    #[error(transparent)]
    Route(#[from] RouteError),
}
