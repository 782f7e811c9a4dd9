pub mod backend;
pub mod cache;
pub mod cancel;
pub mod client;
pub mod graphhopper;

pub use backend::{RouteBackend, RouteQuery, SharedBackend};
pub use cache::RouteCache;
pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use client::{ProfileRoute, RouteClient, RoutePreview, RouteRequest, TripStats};
pub use graphhopper::GraphHopperBackend;
