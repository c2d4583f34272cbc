#![forbid(unsafe_code)]

pub mod composite_cpu;
pub mod compositor;
pub mod core;
pub mod error;
pub mod fingerprint;
pub mod layout;
pub mod manifest;
pub mod model;
pub mod noise;
pub mod renderer;
pub mod rng;
pub mod surface;

pub use crate::core::Rgba8Premul;
pub use crate::error::{FragmentaError, FragmentaResult};
pub use crate::fingerprint::{SurfaceFingerprint, fingerprint_surface};
pub use crate::model::{Fragment, FragmentAttributes, FragmentSet};
pub use crate::renderer::{random_call_count, render_frame};
pub use crate::rng::{RandomStream, SeededStream};
pub use crate::surface::{Bitmap, BlendMode, Surface};
