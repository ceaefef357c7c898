//! lottiebind renders Lottie animations into host-owned pixel buffers.
//!
//! The public API is session-oriented:
//!
//! - Create a [`RenderSession`] from animation bytes
//! - Bind a packed 32-bit pixel buffer with [`RenderSession::bind_target`]
//! - Render frames synchronously with [`RenderSession::render_frame`]
//!
//! Sessions are independent and may be used from any thread. A shared engine is initialized by
//! the first live session and torn down with the last. The [`ffi`] module exposes the same
//! lifecycle over a C ABI using opaque handles, and [`Player`] steps frames for hosts that drive
//! a redraw loop.
#![deny(unsafe_code)]

mod foundation;

/// Engine seam and the built-in CPU engine.
pub mod engine;
/// C ABI entry points.
pub mod ffi;
/// Frame stepping for redraw loops.
pub mod playback;
/// Session-oriented rendering API.
pub mod session;

pub use crate::foundation::core::{
    Affine, AnimationInfo, BezPath, FramePolicy, PixelFormat, Point, Rect, Rgba8Premul,
    TargetSize, Transform2D, Vec2,
};
pub use crate::foundation::error::{LottieError, LottieResult};

pub use crate::engine::backend::{Animation, AnimationLoader, Canvas, LOTTIE_MIME};
pub use crate::engine::cpu::{CpuAnimation, CpuCanvas, CpuEngine};
pub use crate::engine::init::{EngineGuard, active_refs};
pub use crate::engine::scene::DrawItem;
pub use crate::playback::player::{
    PlaybackEvent, PlaybackOpts, Player, RepeatCount, RepeatMode, Tick,
};
pub use crate::session::render_session::{
    FRAME_POLICY_ENV, PIXEL_FORMAT_ENV, RenderSession, SessionOpts,
};
