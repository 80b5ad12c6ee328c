//! Individual preprocessing steps

pub mod denoise;
pub mod deskew;
pub mod grayscale;
pub mod morphology;
pub mod threshold;
pub mod upscale;
