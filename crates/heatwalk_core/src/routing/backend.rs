use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CustomModel;
use crate::error::RouteError;
use crate::model::{Position, Profile, Route};

/// Everything a routing service needs for a single point-to-point request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub origin: Position,
    pub destination: Position,
    pub profile: Profile,
    pub custom_model: Option<CustomModel>,
    pub locale: String,
}

/// Seam to the external routing service.
#[async_trait]
pub trait RouteBackend: Send + Sync {
    async fn fetch_route(&self, query: &RouteQuery) -> Result<Route, RouteError>;

    /// Human-readable identifier for logs.
    fn name(&self) -> &str;
}

pub type SharedBackend = Arc<dyn RouteBackend>;
