use crate::engine::scene::DrawItem;
use crate::foundation::core::{PixelFormat, Rgba8Premul, TargetSize};
use crate::foundation::error::LottieResult;

/// Format tag sessions load with.
pub const LOTTIE_MIME: &str = "lottie";

/// Whether a loader mime tag names Lottie JSON.
pub fn is_lottie_mime(mime: &str) -> bool {
    matches!(
        mime.trim().to_ascii_lowercase().as_str(),
        "lottie" | "lottie+json" | "json"
    )
}

/// A loaded animation resource that can be seeked and sized.
pub trait Animation: Send {
    /// Timeline length in frames (may be fractional).
    fn total_frames(&self) -> f32;

    /// Timeline length in seconds.
    fn duration_secs(&self) -> f32;

    fn frame_rate(&self) -> f32;

    /// Composition size declared by the animation description.
    fn intrinsic_size(&self) -> (f32, f32);

    /// Move the playhead. Callers pass a frame already mapped onto the timeline.
    fn set_frame(&mut self, frame: f32);

    fn current_frame(&self) -> f32;

    /// Resize the logical viewport; content scales uniformly to fit and is centered.
    fn set_size(&mut self, width: f32, height: f32);

    fn size(&self) -> (f32, f32);

    /// Vector draw list for the current frame, bottom-most first, in viewport coordinates.
    fn draw_items(&self) -> Vec<DrawItem>;
}

/// A render target that rasterizes an [`Animation`] into caller-owned pixels.
pub trait Canvas: Send {
    /// Bind target geometry. Drops whatever was bound before.
    fn set_target(&mut self, size: TargetSize, format: PixelFormat);

    /// Forget the current target.
    fn clear(&mut self);

    fn target(&self) -> Option<(TargetSize, PixelFormat)>;

    /// Rasterize the animation's current frame into `out` (row-major, stride = width).
    ///
    /// Returns once every pixel of the frame has been written.
    fn draw(
        &mut self,
        animation: &dyn Animation,
        background: Rgba8Premul,
        out: &mut [u32],
    ) -> LottieResult<()>;
}

/// Engine entry point: turns animation bytes into resources and hands out canvases.
pub trait AnimationLoader: Send + Sync {
    /// Parse `bytes` as `mime`. Nothing borrowed from `bytes` outlives the call.
    fn load(&self, bytes: &[u8], mime: &str) -> LottieResult<Box<dyn Animation>>;

    /// Create an unbound canvas.
    fn canvas(&self) -> Box<dyn Canvas>;
}
