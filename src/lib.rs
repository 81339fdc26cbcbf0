//! Retrotone - two-tone retro-fication engine
//!
//! Downsample a frame, threshold it with ordered dithering, map it onto a
//! two-color palette, and render it back at display resolution.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
pub mod sources;
