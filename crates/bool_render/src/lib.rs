pub mod camera;
pub mod gpu_context;
pub mod image;
pub mod present;

pub use camera::Camera;
pub use gpu_context::GpuContext;
pub use image::{Image, Rgba};
pub use present::FramePresenter;
