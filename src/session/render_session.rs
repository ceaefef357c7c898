use parking_lot::{Mutex, MutexGuard};

use crate::engine::backend::{Animation, AnimationLoader, Canvas, LOTTIE_MIME};
use crate::engine::cpu::CpuEngine;
use crate::engine::init::EngineGuard;
use crate::foundation::core::{
    AnimationInfo, FramePolicy, PixelFormat, Rgba8Premul, TargetSize,
};
use crate::foundation::error::LottieResult;

/// Environment override for [`SessionOpts::pixel_format`].
pub const PIXEL_FORMAT_ENV: &str = "LOTTIEBIND_PIXEL_FORMAT";
/// Environment override for [`SessionOpts::frame_policy`].
pub const FRAME_POLICY_ENV: &str = "LOTTIEBIND_FRAME_POLICY";

/// Options controlling how a [`RenderSession`] writes frames.
#[derive(Clone, Debug, Default)]
pub struct SessionOpts {
    /// Channel layout written into bound targets.
    pub pixel_format: PixelFormat,
    /// Mapping applied to out-of-range frame requests.
    pub frame_policy: FramePolicy,
    /// Straight RGBA8 color painted under the animation. `None` leaves uncovered pixels
    /// transparent.
    pub clear_rgba: Option<[u8; 4]>,
}

impl SessionOpts {
    /// Defaults, overridden by `LOTTIEBIND_PIXEL_FORMAT` / `LOTTIEBIND_FRAME_POLICY` when set.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Ok(v) = std::env::var(PIXEL_FORMAT_ENV) {
            match v.parse() {
                Ok(f) => opts.pixel_format = f,
                Err(e) => {
                    tracing::warn!(value = %v, error = %e, "ignoring {}", PIXEL_FORMAT_ENV)
                }
            }
        }
        if let Ok(v) = std::env::var(FRAME_POLICY_ENV) {
            match v.parse() {
                Ok(p) => opts.frame_policy = p,
                Err(e) => {
                    tracing::warn!(value = %v, error = %e, "ignoring {}", FRAME_POLICY_ENV)
                }
            }
        }
        opts
    }

    /// Return options with a different target pixel format.
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Return options with a different out-of-range frame policy.
    pub fn with_frame_policy(mut self, policy: FramePolicy) -> Self {
        self.frame_policy = policy;
        self
    }

    /// Return options with a configured background color.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    fn background(&self) -> Rgba8Premul {
        self.clear_rgba
            .map_or(Rgba8Premul::transparent(), |[r, g, b, a]| {
                Rgba8Premul::from_straight_rgba(r, g, b, a)
            })
    }
}

struct Loaded {
    animation: Box<dyn Animation>,
    canvas: Box<dyn Canvas>,
}

/// One animation resource bound to zero or one render targets.
///
/// All methods take `&self`; an internal mutex serializes renders and target rebinds so a
/// session can be shared across threads. A session whose load failed stays inert: binds and
/// renders are no-ops.
pub struct RenderSession {
    state: Mutex<Option<Loaded>>,
    info: Option<AnimationInfo>,
    load_error: Option<String>,
    opts: SessionOpts,
    // Declared last so session resources drop before the engine reference.
    _engine: EngineGuard,
}

impl RenderSession {
    /// Create a session on the built-in CPU engine with default options.
    pub fn create(bytes: &[u8]) -> LottieResult<Self> {
        Self::create_with(bytes, &CpuEngine, SessionOpts::default())
    }

    /// Create a session on `loader`.
    ///
    /// Fails only when the engine cannot be initialized. An animation that does not load still
    /// yields a session; check [`RenderSession::is_loaded`].
    #[tracing::instrument(skip(bytes, loader, opts), fields(len = bytes.len()))]
    pub fn create_with(
        bytes: &[u8],
        loader: &dyn AnimationLoader,
        opts: SessionOpts,
    ) -> LottieResult<Self> {
        let engine = EngineGuard::acquire()?;

        let (state, info, load_error) = match loader.load(bytes, LOTTIE_MIME) {
            Ok(animation) => {
                let (w, h) = animation.intrinsic_size();
                let info = AnimationInfo::from_timeline(
                    animation.total_frames(),
                    animation.frame_rate(),
                    w,
                    h,
                )
                .with_duration_secs(animation.duration_secs());
                tracing::info!(
                    frames = info.frame_count,
                    duration_ms = info.duration_ms,
                    "animation loaded"
                );
                let canvas = loader.canvas();
                (Some(Loaded { animation, canvas }), Some(info), None)
            }
            Err(e) => {
                tracing::error!(error = %e, "animation failed to load; session is inert");
                (None, None, Some(e.to_string()))
            }
        };

        Ok(Self {
            state: Mutex::new(state),
            info,
            load_error,
            opts,
            _engine: engine,
        })
    }

    /// Whether the animation loaded and the session can render.
    pub fn is_loaded(&self) -> bool {
        self.info.is_some()
    }

    /// Metadata derived at load time; `None` for an inert session.
    pub fn info(&self) -> Option<AnimationInfo> {
        self.info
    }

    /// Why loading failed, if it did.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    fn lock(&self) -> MutexGuard<'_, Option<Loaded>> {
        self.state.lock()
    }

    /// Rebind the render target to `buffer` at `width` x `height` device pixels.
    ///
    /// Waits for any in-flight render, drops the previous binding, and resizes the animation
    /// viewport. Fractional sizes truncate toward zero. An empty size or a buffer shorter than
    /// `width * height` leaves the session unbound. No pixels are written and `buffer` is not
    /// retained; it must be passed again to [`RenderSession::render_frame`].
    #[tracing::instrument(level = "debug", skip(self, buffer), fields(len = buffer.len()))]
    pub fn bind_target(&self, buffer: &mut [u32], width: f32, height: f32) {
        let mut state = self.lock();
        let Some(loaded) = state.as_mut() else {
            tracing::debug!("bind_target on inert session ignored");
            return;
        };
        loaded.canvas.clear();

        let size = match TargetSize::from_device(width, height) {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting render target");
                return;
            }
        };
        if buffer.len() < size.pixel_count() {
            tracing::warn!(
                len = buffer.len(),
                needed = size.pixel_count(),
                "rejecting render target: buffer too small"
            );
            return;
        }

        loaded.canvas.set_target(size, self.opts.pixel_format);
        loaded
            .animation
            .set_size(size.width as f32, size.height as f32);
    }

    /// Render `frame` into `buffer`, blocking until every pixel is written.
    ///
    /// `buffer` is lent for this call only and must cover the bound target. Out-of-range frames
    /// follow [`SessionOpts::frame_policy`]. Without a loaded animation, a bound target, or a
    /// large enough buffer this is a no-op and `buffer` is left untouched.
    pub fn render_frame(&self, frame: f32, buffer: &mut [u32]) {
        let mut state = self.lock();
        let Some(loaded) = state.as_mut() else {
            return;
        };
        let Some((size, _)) = loaded.canvas.target() else {
            tracing::debug!(frame, "render_frame before bind_target ignored");
            return;
        };
        if buffer.len() < size.pixel_count() {
            tracing::warn!(
                len = buffer.len(),
                needed = size.pixel_count(),
                "render_frame buffer does not cover bound target"
            );
            return;
        }

        let total = loaded.animation.total_frames();
        let mapped = self.opts.frame_policy.apply(frame, total);
        loaded.animation.set_frame(mapped);
        tracing::trace!(frame, mapped, "rendering frame");

        let Loaded { animation, canvas } = loaded;
        if let Err(e) = canvas.draw(&**animation, self.opts.background(), buffer) {
            tracing::warn!(error = %e, frame = mapped, "frame render failed");
        }
    }

    /// Frame the playhead was last moved to; `None` for an inert session.
    pub fn current_frame(&self) -> Option<f32> {
        self.lock().as_ref().map(|l| l.animation.current_frame())
    }

    /// Currently bound target size.
    pub fn target_size(&self) -> Option<TargetSize> {
        self.lock()
            .as_ref()
            .and_then(|l| l.canvas.target())
            .map(|(size, _)| size)
    }

    pub fn is_bound(&self) -> bool {
        self.target_size().is_some()
    }

    /// Release the animation, the canvas, and this session's engine reference.
    pub fn destroy(self) {
        drop(self);
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        tracing::debug!(loaded = self.info.is_some(), "render session released");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
