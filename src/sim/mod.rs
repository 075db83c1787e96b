pub mod clock;
pub mod controller;
pub mod field;
pub mod integrator;
pub mod monitors;
pub mod params;
pub mod surface;

pub use controller::{AnimationController, ControllerOptions, RunState};
pub use integrator::Solver;
pub use params::{ParamField, Setup};
pub use surface::{Scene, Surface, Tint};
