pub mod params;
pub mod path_data;
pub mod path_geometry;
pub mod sampler;
pub mod smoother;
pub mod driver;
pub mod svg;
pub mod render_job;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use driver::{DriverState, FrameHandle, FrameScheduler, ManualScheduler, WiggleDriver};
pub use params::WiggleParams;
pub use path_geometry::{ArcLengthPath, MeasuredPath};
pub use sampler::{sample, SamplePoint};
pub use smoother::{smooth, CurveDescription};
