//! Scene composition for the globe.
//!
//! [`PlanetaryBodyComposer`] builds the body, cloud and atmosphere shells under
//! one [`RotationGroup`], [`MarkerPlacer`] attaches location sprites to the same
//! group, and [`compose_scene`] wires both together with lights and the
//! environment background.

mod compose;
mod group;
mod markers;
mod mesh;
mod scene;

pub use compose::{PlanetaryBodyComposer, compose_scene};
pub use group::{ATMOSPHERE, BODY, CLOUDS, RotationGroup, SceneNode, SceneObject};
pub use markers::{MarkerPlacer, pin_texture};
pub use mesh::{MeshData, MeshVertex, sphere};
pub use scene::{AmbientLight, DirectionalLight, Scene};
