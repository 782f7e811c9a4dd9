use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::error::RouteError;
use crate::model::{Position, PositionSample, Profile, Route, SnapResult, TurnSign};
use crate::routing::{CancelHandle, RouteClient, RouteRequest, cancel_pair};
use crate::tracking::{ProgressOptions, ReroutePolicy, line_tracker, progress};

/// Snapshot emitted after every processed position update.
#[derive(Debug, Clone, PartialEq)]
pub struct NavProgress {
    pub at: DateTime<Utc>,
    pub profile: Profile,
    pub snapped: Position,
    pub off_route_m: f64,
    pub traveled_m: f64,
    pub step_index: usize,
    pub step_count: usize,
    pub step_text: String,
    pub turn_sign: TurnSign,
    pub street_name: Option<String>,
    pub step_remaining_m: f64,
    pub total_remaining_m: f64,
    pub eta_s: f64,
    /// The off-route timer is running.
    pub off_route: bool,
    pub rerouting: bool,
    /// The route was replaced during this update.
    pub rerouted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    pub profile: Profile,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub reroutes: u32,
    pub remaining_m: Option<f64>,
}

impl TripSummary {
    pub fn elapsed(&self) -> TimeDelta {
        self.ended_at - self.started_at
    }
}

struct PendingReroute {
    requested_at: DateTime<Utc>,
    rx: oneshot::Receiver<Result<Arc<Route>, RouteError>>,
}

/// State of one active navigation.
///
/// Position updates are processed one at a time through `&mut self`; a
/// reroute runs as a spawned task and is applied on a later update.
pub struct NavigationSession {
    profile: Profile,
    route: Arc<Route>,
    destination: Position,
    step_index: usize,
    off_route_since: Option<DateTime<Utc>>,
    last_reroute_at: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    last_update_at: Option<DateTime<Utc>>,
    last_remaining_m: Option<f64>,
    reroutes: u32,
    policy: ReroutePolicy,
    progress_opts: ProgressOptions,
    pending: Option<PendingReroute>,
    cancel: CancelHandle,
}

impl NavigationSession {
    pub fn new(
        profile: Profile,
        route: Arc<Route>,
        destination: Position,
        started_at: DateTime<Utc>,
    ) -> Self {
        let (cancel, _) = cancel_pair();
        Self {
            profile,
            route,
            destination,
            step_index: 0,
            off_route_since: None,
            last_reroute_at: None,
            started_at,
            last_update_at: None,
            last_remaining_m: None,
            reroutes: 0,
            policy: ReroutePolicy::default(),
            progress_opts: ProgressOptions::default(),
            pending: None,
            cancel,
        }
    }

    pub fn with_policy(mut self, policy: ReroutePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress_options(mut self, opts: ProgressOptions) -> Self {
        self.progress_opts = opts;
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }
    pub fn destination(&self) -> Position {
        self.destination
    }
    pub fn step_index(&self) -> usize {
        self.step_index
    }
    pub fn off_route_since(&self) -> Option<DateTime<Utc>> {
        self.off_route_since
    }
    pub fn last_reroute_at(&self) -> Option<DateTime<Utc>> {
        self.last_reroute_at
    }
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
    pub fn reroutes(&self) -> u32 {
        self.reroutes
    }
    pub fn reroute_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Process one position update: apply a finished reroute, then snap,
    /// advance progress and consult the reroute policy.
    ///
    /// Fixes with out-of-range or non-finite coordinates are dropped and
    /// return `None`; they never touch the off-route timer.
    ///
    /// Must run inside a tokio runtime; reroutes are spawned on it.
    pub fn update(
        &mut self,
        client: &Arc<RouteClient>,
        sample: PositionSample,
    ) -> Option<NavProgress> {
        if !sample.position.is_valid() {
            tracing::warn!(
                lng = sample.position.lng,
                lat = sample.position.lat,
                "dropping invalid position fix"
            );
            return None;
        }

        let now = sample.at;
        let rerouted = self.poll_reroute();

        let snap = line_tracker::snap(&self.route, sample.position);
        let prog = progress::advance_with(&self.route, self.step_index, &snap, self.progress_opts);
        self.step_index = prog.step_index;

        let decision = self.policy.should_reroute(
            snap.off_distance_m,
            self.off_route_since,
            now,
            self.last_reroute_at,
        );
        self.off_route_since = decision.new_off_route_since;

        if decision.trigger && self.pending.is_none() {
            self.spawn_reroute(client, sample.position, now);
        }

        self.last_update_at = Some(now);
        self.last_remaining_m = Some(prog.total_remaining_m);
        Some(self.snapshot(now, &snap, &prog, rerouted))
    }

    /// Await the in-flight reroute, if any, and apply it.
    ///
    /// Returns `Some(true)` when the route was replaced, `Some(false)` when
    /// the reroute failed and `None` when nothing was pending.
    pub async fn settle_reroute(&mut self) -> Option<bool> {
        let pending = self.pending.take()?;
        let result = pending
            .rx
            .await
            .unwrap_or_else(|_| Err(RouteError::Cancelled));
        Some(self.apply_reroute(result, pending.requested_at))
    }

    /// Stop reacting to reroutes; in-flight results are discarded.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.pending = None;
    }

    pub fn summary(&self) -> TripSummary {
        TripSummary {
            profile: self.profile,
            started_at: self.started_at,
            ended_at: self.last_update_at.unwrap_or(self.started_at),
            reroutes: self.reroutes,
            remaining_m: self.last_remaining_m,
        }
    }

    /// Swap in a new route. Keeps `started_at`; resets step and off-route timer.
    pub fn replace_route(&mut self, route: Arc<Route>, at: DateTime<Utc>) {
        self.route = route;
        self.step_index = 0;
        self.off_route_since = None;
        self.last_reroute_at = Some(self.last_reroute_at.map_or(at, |prev| prev.max(at)));
        self.reroutes += 1;
    }

    fn poll_reroute(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => Err(RouteError::Cancelled),
        };
        let requested_at = pending.requested_at;
        self.pending = None;
        self.apply_reroute(result, requested_at)
    }

    fn apply_reroute(
        &mut self,
        result: Result<Arc<Route>, RouteError>,
        requested_at: DateTime<Utc>,
    ) -> bool {
        match result {
            Ok(route) => {
                tracing::info!(
                    profile = self.profile.service_id(),
                    distance_m = route.distance_m,
                    "rerouted"
                );
                self.replace_route(route, requested_at);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "reroute failed, keeping current route");
                false
            }
        }
    }

    fn spawn_reroute(&mut self, client: &Arc<RouteClient>, from: Position, now: DateTime<Utc>) {
        tracing::info!(
            profile = self.profile.service_id(),
            lng = from.lng,
            lat = from.lat,
            "off route, requesting new route"
        );

        let (tx, rx) = oneshot::channel();
        let client = Arc::clone(client);
        let req = RouteRequest::new(from, self.destination, self.profile)
            .with_cancel(self.cancel.token());

        tokio::spawn(async move {
            let result = client.compute_route(req).await;
            // receiver gone means the session ended
            let _ = tx.send(result);
        });

        self.pending = Some(PendingReroute {
            requested_at: now,
            rx,
        });
    }

    fn snapshot(
        &self,
        at: DateTime<Utc>,
        snap: &SnapResult,
        prog: &progress::Progress,
        rerouted: bool,
    ) -> NavProgress {
        let step = self.route.instructions.get(self.step_index);
        NavProgress {
            at,
            profile: self.profile,
            snapped: snap.closest,
            off_route_m: snap.off_distance_m,
            traveled_m: snap.traveled_m,
            step_index: self.step_index,
            step_count: self.route.instructions.len(),
            step_text: step.map(|s| s.text.clone()).unwrap_or_default(),
            turn_sign: step.map_or(TurnSign::Continue, |s| s.turn_sign),
            street_name: step.and_then(|s| s.street_name.clone()),
            step_remaining_m: prog.step_remaining_m,
            total_remaining_m: prog.total_remaining_m,
            eta_s: prog.eta_s,
            off_route: self.off_route_since.is_some(),
            rerouting: self.pending.is_some(),
            rerouted,
        }
    }
}
