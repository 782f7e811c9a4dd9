//! Pedestrian navigation engine.
//!
//! - [`routing`]: multi-profile route acquisition with caching and fallback
//! - [`tracking`]: snapping, progress/ETA and the reroute policy
//! - [`navigation`]: the session state machine and its renderer/location seams

pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod model;
pub mod navigation;
pub mod routing;
pub mod tracking;

pub use config::NavConfig;
pub use error::{NavError, RouteError};
pub use model::{Instruction, LineFeature, Position, PositionSample, Profile, Route, SnapResult, TurnSign};
