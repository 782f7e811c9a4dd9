//! Time-bounded route cache with in-flight request sharing.
//!
//! A key is either `Ready` (a route stored less than `ttl` ago) or `Pending`
//! (a request running on the runtime). Lookups for a pending key join the
//! running request instead of starting another. Failures are never stored.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CustomModel;
use crate::error::RouteError;
use crate::model::{Position, Profile, Route};

pub type RouteResult = Result<Arc<Route>, RouteError>;
pub type SharedRoute = Shared<BoxFuture<'static, RouteResult>>;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Exact-match key; coordinates compared bit for bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    origin: (u64, u64),
    destination: (u64, u64),
    profile: Profile,
    model: Option<String>,
}

impl CacheKey {
    pub fn new(
        origin: Position,
        destination: Position,
        profile: Profile,
        model: Option<&CustomModel>,
    ) -> Self {
        Self {
            origin: (origin.lng.to_bits(), origin.lat.to_bits()),
            destination: (destination.lng.to_bits(), destination.lat.to_bits()),
            profile,
            model: model.map(|m| m.to_string()),
        }
    }
}

enum Slot {
    Ready { stored_at: Instant, route: Arc<Route> },
    Pending { id: u64, request: SharedRoute },
}

pub enum Lookup {
    Hit(Arc<Route>),
    InFlight(SharedRoute),
}

pub struct RouteCache {
    ttl: Duration,
    slots: Mutex<HashMap<CacheKey, Slot>>,
    next_id: AtomicU64,
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl RouteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh cached route, the running request for `key`, or a new request
    /// built by `start` and spawned on the current runtime.
    pub fn get_or_start<F>(self: &Arc<Self>, key: CacheKey, start: F) -> Lookup
    where
        F: FnOnce() -> BoxFuture<'static, RouteResult>,
    {
        let mut slots = self.lock();
        let swept = sweep(&mut slots, self.ttl);
        if swept > 0 {
            tracing::trace!(swept, "expired routes dropped");
        }

        match slots.get(&key) {
            Some(Slot::Ready { route, .. }) => {
                tracing::debug!(profile = %key.profile, "route cache hit");
                return Lookup::Hit(Arc::clone(route));
            }
            Some(Slot::Pending { request, .. }) => {
                tracing::debug!(profile = %key.profile, "joining in-flight route request");
                return Lookup::InFlight(request.clone());
            }
            _ => {}
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let fetch = start();
        let cache = Arc::clone(self);
        let settle_key = key.clone();

        let task = tokio::spawn(async move {
            let result = fetch.await;
            cache.settle(&settle_key, id, &result);
            result
        });

        let request: SharedRoute = async move {
            task.await
                .unwrap_or_else(|e| Err(RouteError::NetworkError(format!("route task failed: {e}"))))
        }
        .boxed()
        .shared();

        slots.insert(
            key,
            Slot::Pending {
                id,
                request: request.clone(),
            },
        );
        Lookup::InFlight(request)
    }

    fn settle(&self, key: &CacheKey, id: u64, result: &RouteResult) {
        let mut slots = self.lock();
        let ours = matches!(slots.get(key), Some(Slot::Pending { id: pending, .. }) if *pending == id);
        if !ours {
            return;
        }
        match result {
            Ok(route) => {
                slots.insert(
                    key.clone(),
                    Slot::Ready {
                        stored_at: Instant::now(),
                        route: Arc::clone(route),
                    },
                );
            }
            Err(_) => {
                slots.remove(key);
            }
        }
    }

    /// Drop stored routes older than the TTL. Pending requests are kept.
    pub fn evict_expired(&self) -> usize {
        sweep(&mut self.lock(), self.ttl)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        // The map stays consistent even if a holder panicked.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn sweep(slots: &mut HashMap<CacheKey, Slot>, ttl: Duration) -> usize {
    let before = slots.len();
    slots.retain(|_, slot| match slot {
        Slot::Ready { stored_at, .. } => stored_at.elapsed() < ttl,
        Slot::Pending { .. } => true,
    });
    before - slots.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::straight_line_route;

    fn key(profile: Profile) -> CacheKey {
        CacheKey::new(
            Position::new(-97.743, 30.267),
            Position::new(-97.740, 30.270),
            profile,
            None,
        )
    }

    fn ok_route() -> BoxFuture<'static, RouteResult> {
        async {
            Ok(Arc::new(straight_line_route(
                Position::new(-97.743, 30.267),
                Position::new(-97.740, 30.270),
            )))
        }
        .boxed()
    }

    async fn resolve(lookup: Lookup) -> RouteResult {
        match lookup {
            Lookup::Hit(r) => Ok(r),
            Lookup::InFlight(f) => f.await,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ready_entry_expires_after_ttl() {
        let cache = Arc::new(RouteCache::new(Duration::from_secs(30)));
        resolve(cache.get_or_start(key(Profile::Fast), ok_route)).await.unwrap();

        assert!(matches!(
            cache.get_or_start(key(Profile::Fast), || panic!("should hit")),
            Lookup::Hit(_)
        ));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_sweep_other_expired_keys() {
        let cache = Arc::new(RouteCache::new(Duration::from_secs(30)));
        resolve(cache.get_or_start(key(Profile::Fast), ok_route)).await.unwrap();
        resolve(cache.get_or_start(key(Profile::Balanced), ok_route)).await.unwrap();
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        resolve(cache.get_or_start(key(Profile::Cool), ok_route)).await.unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.evict_expired(), 0);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = Arc::new(RouteCache::default());
        let err = resolve(cache.get_or_start(key(Profile::Cool), || {
            async { Err(RouteError::NoRouteFound("nope".into())) }.boxed()
        }))
        .await;
        assert!(err.is_err());
        assert!(cache.is_empty());

        let ok = resolve(cache.get_or_start(key(Profile::Cool), ok_route)).await;
        assert!(ok.is_ok());
    }

    #[test]
    fn key_distinguishes_profile_and_model() {
        let model = serde_json::json!({ "priority": [] });
        let o = Position::new(1.0, 2.0);
        let d = Position::new(3.0, 4.0);
        assert_ne!(
            CacheKey::new(o, d, Profile::Fast, None),
            CacheKey::new(o, d, Profile::Balanced, None)
        );
        assert_ne!(
            CacheKey::new(o, d, Profile::Fast, None),
            CacheKey::new(o, d, Profile::Fast, Some(&model))
        );
        assert_eq!(
            CacheKey::new(o, d, Profile::Fast, Some(&model)),
            CacheKey::new(o, d, Profile::Fast, Some(&model))
        );
    }
}
