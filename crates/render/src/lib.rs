//! Renderer-agnostic scene state.
//!
//! Holds everything the per-frame draw protocol reads on the host side: the
//! orbit camera and the ordered object list with its point light.
//!
//! # Invariants
//! - The view-projection matrix is derived fresh on every call; nothing is cached.
//! - Camera distance from the origin stays strictly positive under zoom.
//! - Scene insertion order is draw order.

mod camera;
mod scene;

pub use camera::Camera;
pub use scene::Scene;

pub fn crate_info() -> &'static str {
    concat!("planefield-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
