pub mod line_tracker;
pub mod progress;
pub mod reroute;

pub use line_tracker::snap;
pub use progress::{Progress, ProgressOptions, advance};
pub use reroute::{ReroutePolicy, ReroutePolicyResult, should_reroute};
