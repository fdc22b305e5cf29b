//! Camera, render surface and ray picking.

pub mod camera;
pub mod picking;
pub mod surface;

pub use camera::{Camera, CameraView};
pub use picking::{PickHit, Picker, Ray, RayCaster};
pub use surface::{HeadlessSurface, RenderSurface};
