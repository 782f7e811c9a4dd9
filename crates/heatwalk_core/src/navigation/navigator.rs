//! Navigation state machine.
//!
//! `Idle → Previewing → Navigating → Ended → Idle`. Choosing a destination
//! computes all three profiles; starting navigation locks one of them in;
//! position updates are tracked only while navigating.

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use std::sync::Arc;

use crate::config::NavConfig;
use crate::error::NavError;
use crate::model::{Position, PositionSample, Profile};
use crate::navigation::render::RouteRenderer;
use crate::navigation::session::{NavProgress, NavigationSession, TripSummary};
use crate::routing::{RouteClient, RoutePreview};
use crate::tracking::{ProgressOptions, ReroutePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Previewing,
    Navigating,
    /// Transient: reported to the renderer while a session is torn down.
    Ended,
}

enum Phase {
    Idle,
    Previewing(RoutePreview),
    Navigating(NavigationSession),
}

pub struct Navigator {
    client: Arc<RouteClient>,
    renderer: Box<dyn RouteRenderer>,
    policy: ReroutePolicy,
    progress_opts: ProgressOptions,
    phase: Phase,
}

impl Navigator {
    pub fn new(client: Arc<RouteClient>, renderer: Box<dyn RouteRenderer>) -> Self {
        Self {
            client,
            renderer,
            policy: ReroutePolicy::default(),
            progress_opts: ProgressOptions::default(),
            phase: Phase::Idle,
        }
    }

    pub fn with_config(mut self, cfg: &NavConfig) -> Self {
        self.policy = cfg.reroute;
        self.progress_opts = cfg.progress;
        self
    }

    pub fn with_policy(mut self, policy: ReroutePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> NavState {
        match self.phase {
            Phase::Idle => NavState::Idle,
            Phase::Previewing(_) => NavState::Previewing,
            Phase::Navigating(_) => NavState::Navigating,
        }
    }

    pub fn preview(&self) -> Option<&RoutePreview> {
        match &self.phase {
            Phase::Previewing(p) => Some(p),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&NavigationSession> {
        match &self.phase {
            Phase::Navigating(s) => Some(s),
            _ => None,
        }
    }

    pub fn client(&self) -> &Arc<RouteClient> {
        &self.client
    }

    /// Compute and draw the three profile routes to `destination`.
    ///
    /// Invalid coordinates fail before any request; every other routing
    /// failure degrades that profile to a straight line.
    pub async fn choose_destination(
        &mut self,
        origin: Position,
        destination: Position,
    ) -> Result<&RoutePreview, NavError> {
        let preview = self
            .client
            .compute_all_profiles(origin, destination)
            .await?;

        self.drop_session();
        for slot in preview.iter() {
            self.renderer
                .set_route_geometry(slot.profile, Some(&slot.route.to_line_feature()));
        }
        tracing::info!(any_success = preview.any_success, "route preview ready");

        self.set_phase(Phase::Previewing(preview));
        match &self.phase {
            Phase::Previewing(p) => Ok(p),
            _ => Err(NavError::NotPreviewing),
        }
    }

    /// Forget the destination and any routes drawn for it.
    pub fn clear_destination(&mut self) {
        self.drop_session();
        self.renderer.clear_routes();
        self.set_phase(Phase::Idle);
    }

    /// Start navigating the previewed route for `profile`.
    pub fn start_nav(
        &mut self,
        profile: Profile,
        now: DateTime<Utc>,
    ) -> Result<&NavigationSession, NavError> {
        let Phase::Previewing(preview) = &self.phase else {
            return Err(NavError::NotPreviewing);
        };

        let chosen = preview.get(profile);
        if chosen.is_fallback() {
            tracing::warn!(profile = profile.service_id(), "navigating a straight-line fallback");
        }
        let session = NavigationSession::new(
            profile,
            Arc::clone(&chosen.route),
            preview.destination,
            now,
        )
        .with_policy(self.policy)
        .with_progress_options(self.progress_opts);

        for other in Profile::ALL.into_iter().filter(|p| *p != profile) {
            self.renderer.set_route_geometry(other, None);
        }
        tracing::info!(profile = profile.service_id(), "navigation started");

        self.set_phase(Phase::Navigating(session));
        match &self.phase {
            Phase::Navigating(s) => Ok(s),
            _ => Err(NavError::NotNavigating),
        }
    }

    /// Track one position sample. `None` unless navigating, or when the fix
    /// was dropped as invalid.
    pub fn on_position(&mut self, sample: PositionSample) -> Option<NavProgress> {
        let Phase::Navigating(session) = &mut self.phase else {
            return None;
        };

        let progress = session.update(&self.client, sample)?;
        if progress.rerouted {
            let line = session.route().to_line_feature();
            self.renderer.set_route_geometry(session.profile(), Some(&line));
        }
        self.renderer.update_progress(&progress);
        Some(progress)
    }

    /// Wait for an in-flight reroute and apply it right away.
    pub async fn settle_reroute(&mut self) -> bool {
        let Phase::Navigating(session) = &mut self.phase else {
            return false;
        };
        let replaced = session.settle_reroute().await == Some(true);
        if replaced {
            let line = session.route().to_line_feature();
            self.renderer.set_route_geometry(session.profile(), Some(&line));
        }
        replaced
    }

    /// Feed samples from `positions` until it ends or navigation stops.
    /// Returns the number of updates processed.
    pub async fn follow<S>(&mut self, mut positions: S) -> usize
    where
        S: Stream<Item = PositionSample> + Unpin,
    {
        let mut ticks = 0;
        while self.state() == NavState::Navigating {
            let Some(sample) = positions.next().await else {
                break;
            };
            if self.on_position(sample).is_some() {
                ticks += 1;
            }
        }
        ticks
    }

    /// Stop navigating: discard pending reroutes, remove route geometry and
    /// return to `Idle`.
    pub fn end(&mut self) -> Result<TripSummary, NavError> {
        let Phase::Navigating(session) = &mut self.phase else {
            return Err(NavError::NotNavigating);
        };

        session.cancel();
        let summary = session.summary();

        self.renderer.state_changed(NavState::Ended);
        self.renderer.clear_routes();
        tracing::info!(reroutes = summary.reroutes, "navigation ended");

        self.set_phase(Phase::Idle);
        Ok(summary)
    }

    fn drop_session(&mut self) {
        if let Phase::Navigating(session) = &mut self.phase {
            session.cancel();
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        let state = self.state();
        self.renderer.state_changed(state);
    }
}
