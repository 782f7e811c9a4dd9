use crate::model::{LineFeature, Profile};
use crate::navigation::navigator::NavState;
use crate::navigation::session::NavProgress;

/// Consumer of route geometry and progress, typically a map view.
///
/// Calls arrive on the thread driving the [`Navigator`](super::Navigator),
/// in the order the engine produced them.
pub trait RouteRenderer: Send {
    /// Draw (`Some`) or hide (`None`) the line for one profile.
    fn set_route_geometry(&mut self, profile: Profile, line: Option<&LineFeature>);

    fn clear_routes(&mut self) {
        for profile in Profile::ALL {
            self.set_route_geometry(profile, None);
        }
    }

    fn update_progress(&mut self, _progress: &NavProgress) {}

    fn state_changed(&mut self, _state: NavState) {}
}

/// Renderer that ignores everything; for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl RouteRenderer for NullRenderer {
    fn set_route_geometry(&mut self, _profile: Profile, _line: Option<&LineFeature>) {}
}
