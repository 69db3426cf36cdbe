//! Validation modules

pub mod image;

pub use image::{validate_image, ValidationError};
