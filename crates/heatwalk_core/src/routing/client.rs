use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CustomModel, NavConfig, ProfileModels};
use crate::error::RouteError;
use crate::geo::straight_line_route;
use crate::model::{Position, Profile, Route};
use crate::routing::backend::{RouteBackend, RouteQuery, SharedBackend};
use crate::routing::cache::{CacheKey, Lookup, RouteCache, SharedRoute};
use crate::routing::cancel::CancelToken;
use crate::routing::graphhopper::GraphHopperBackend;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(12_000);

/// Parameters of a single route computation.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub origin: Position,
    pub destination: Position,
    pub profile: Profile,
    /// Overrides the profile's configured model when set.
    pub custom_model: Option<CustomModel>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl RouteRequest {
    pub fn new(origin: Position, destination: Position, profile: Profile) -> Self {
        Self {
            origin,
            destination,
            profile,
            custom_model: None,
            timeout: None,
            cancel: None,
        }
    }

    pub fn with_custom_model(mut self, model: CustomModel) -> Self {
        self.custom_model = Some(model);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripStats {
    pub duration_s: f64,
    pub distance_m: f64,
}

/// One slot of a three-profile preview.
#[derive(Debug, Clone)]
pub struct ProfileRoute {
    pub profile: Profile,
    /// Service route, or a straight line when `outcome` is an error.
    pub route: Arc<Route>,
    pub outcome: Result<(), RouteError>,
}

impl ProfileRoute {
    pub fn is_fallback(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn stats(&self) -> TripStats {
        TripStats {
            duration_s: self.route.duration_s,
            distance_m: self.route.distance_m,
        }
    }

    /// The route computed by the service; degraded slots report why not.
    pub fn service_route(&self) -> Result<&Arc<Route>, RouteError> {
        match &self.outcome {
            Ok(()) => Ok(&self.route),
            Err(e) => Err(RouteError::RouteUnavailable {
                profile: self.profile,
                reason: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoutePreview {
    pub origin: Position,
    pub destination: Position,
    pub fast: ProfileRoute,
    pub balanced: ProfileRoute,
    pub cool: ProfileRoute,
    /// At least one profile came from the service.
    pub any_success: bool,
}

impl RoutePreview {
    pub fn get(&self, profile: Profile) -> &ProfileRoute {
        match profile {
            Profile::Fast => &self.fast,
            Profile::Balanced => &self.balanced,
            Profile::Cool => &self.cool,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfileRoute> {
        [&self.fast, &self.balanced, &self.cool].into_iter()
    }

    pub fn all_success(&self) -> bool {
        self.iter().all(|p| !p.is_fallback())
    }
}

/// Multi-profile route acquisition with caching and graceful degradation.
pub struct RouteClient {
    backend: SharedBackend,
    cache: Arc<RouteCache>,
    timeout: Duration,
    locale: String,
    models: ProfileModels,
}

impl RouteClient {
    pub fn new(backend: SharedBackend, cache: Arc<RouteCache>) -> Self {
        Self {
            backend,
            cache,
            timeout: DEFAULT_TIMEOUT,
            locale: "en".to_string(),
            models: ProfileModels::default(),
        }
    }

    /// GraphHopper backend and a fresh cache, both from `cfg`.
    pub fn from_config(cfg: &NavConfig) -> anyhow::Result<Self> {
        let backend = GraphHopperBackend::new(&cfg.routing)?;
        let cache = Arc::new(RouteCache::new(Duration::from_secs(cfg.routing.cache_ttl_s)));
        Ok(Self::new(Arc::new(backend), cache)
            .with_timeout(Duration::from_millis(cfg.routing.timeout_ms))
            .with_locale(cfg.routing.locale.clone())
            .with_models(cfg.models.clone()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_locale(mut self, locale: String) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_models(mut self, models: ProfileModels) -> Self {
        self.models = models;
        self
    }

    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn route(
        &self,
        origin: Position,
        destination: Position,
        profile: Profile,
    ) -> Result<Arc<Route>, RouteError> {
        self.compute_route(RouteRequest::new(origin, destination, profile))
            .await
    }

    pub async fn compute_route(&self, req: RouteRequest) -> Result<Arc<Route>, RouteError> {
        validate(req.origin)?;
        validate(req.destination)?;

        if req.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(RouteError::Cancelled);
        }

        let model = req
            .custom_model
            .clone()
            .or_else(|| self.models.for_profile(req.profile).cloned());
        let key = CacheKey::new(req.origin, req.destination, req.profile, model.as_ref());
        let timeout = req.timeout.unwrap_or(self.timeout);

        let lookup = self.cache.get_or_start(key, || {
            let backend = Arc::clone(&self.backend);
            let query = RouteQuery {
                origin: req.origin,
                destination: req.destination,
                profile: req.profile,
                custom_model: model,
                locale: self.locale.clone(),
            };
            tracing::debug!(
                backend = backend.name(),
                profile = query.profile.service_id(),
                "requesting route"
            );
            async move { fetch_bounded(backend, query, timeout).await }.boxed()
        });

        match lookup {
            Lookup::Hit(route) => Ok(route),
            Lookup::InFlight(request) => await_bounded(request, timeout, req.cancel.as_ref()).await,
        }
    }

    /// All three profiles concurrently; each failure degrades to a straight line.
    pub async fn compute_all_profiles(
        &self,
        origin: Position,
        destination: Position,
    ) -> Result<RoutePreview, RouteError> {
        validate(origin)?;
        validate(destination)?;

        let (fast, balanced, cool) = tokio::join!(
            self.route(origin, destination, Profile::Fast),
            self.route(origin, destination, Profile::Balanced),
            self.route(origin, destination, Profile::Cool),
        );

        let fast = settle_profile(Profile::Fast, fast, origin, destination);
        let balanced = settle_profile(Profile::Balanced, balanced, origin, destination);
        let cool = settle_profile(Profile::Cool, cool, origin, destination);

        let any_success = [&fast, &balanced, &cool].iter().any(|p| !p.is_fallback());
        if !any_success {
            tracing::warn!("all route profiles failed, using straight lines");
        }

        Ok(RoutePreview {
            origin,
            destination,
            fast,
            balanced,
            cool,
            any_success,
        })
    }
}

fn validate(p: Position) -> Result<(), RouteError> {
    if p.is_valid() {
        Ok(())
    } else {
        Err(RouteError::InvalidCoordinates(p))
    }
}

fn settle_profile(
    profile: Profile,
    result: Result<Arc<Route>, RouteError>,
    origin: Position,
    destination: Position,
) -> ProfileRoute {
    match result {
        Ok(route) => ProfileRoute {
            profile,
            route,
            outcome: Ok(()),
        },
        Err(e) => {
            tracing::warn!(profile = profile.service_id(), error = %e, "route fallback");
            ProfileRoute {
                profile,
                route: Arc::new(straight_line_route(origin, destination)),
                outcome: Err(e),
            }
        }
    }
}

async fn fetch_bounded(
    backend: Arc<dyn RouteBackend>,
    query: RouteQuery,
    timeout: Duration,
) -> Result<Arc<Route>, RouteError> {
    match tokio::time::timeout(timeout, backend.fetch_route(&query)).await {
        Ok(result) => result.map(Arc::new),
        Err(_) => Err(RouteError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Wait for a shared request, giving up at `timeout` or on cancellation.
async fn await_bounded(
    request: SharedRoute,
    timeout: Duration,
    cancel: Option<&CancelToken>,
) -> Result<Arc<Route>, RouteError> {
    let wait = async {
        match cancel {
            Some(token) => tokio::select! {
                result = request => result,
                _ = token.cancelled() => Err(RouteError::Cancelled),
            },
            None => request.await,
        }
    };

    tokio::time::timeout(timeout, wait)
        .await
        .unwrap_or(Err(RouteError::Timeout(timeout.as_millis() as u64)))
}
