pub mod location;
pub mod navigator;
pub mod render;
pub mod session;

pub use location::{LocationSource, ReplaySource, SimulatedWalk, WatchOptions};
pub use navigator::{NavState, Navigator};
pub use render::{NullRenderer, RouteRenderer};
pub use session::{NavProgress, NavigationSession, TripSummary};
