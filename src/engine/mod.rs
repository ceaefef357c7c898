//! Rendering engine: the loader/animation/canvas seam and the built-in CPU implementation.

pub mod backend;
pub mod cpu;
pub mod init;
pub(crate) mod model;
pub mod scene;
