use std::str::FromStr;

use crate::foundation::error::{LottieError, LottieResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Channel layout of a packed 32-bit render target pixel.
///
/// Names read from the most significant byte down, so `Abgr8888` stores red in the low byte
/// (memory order `R, G, B, A` on little-endian hosts, the layout of an `ARGB_8888` platform
/// bitmap). The `S` variants carry straight (un-premultiplied) alpha.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Premultiplied, red in the low byte.
    #[default]
    Abgr8888,
    /// Premultiplied, blue in the low byte.
    Argb8888,
    /// Straight alpha, red in the low byte.
    Abgr8888S,
    /// Straight alpha, blue in the low byte.
    Argb8888S,
}

impl PixelFormat {
    /// Whether color channels are stored multiplied by alpha.
    pub fn is_premultiplied(self) -> bool {
        matches!(self, Self::Abgr8888 | Self::Argb8888)
    }

    /// Pack a premultiplied RGBA8 sample into this format.
    pub fn pack(self, px: Rgba8Premul) -> u32 {
        let [r, g, b, a] = if self.is_premultiplied() {
            [px.r, px.g, px.b, px.a]
        } else {
            px.to_straight_rgba()
        };
        match self {
            Self::Abgr8888 | Self::Abgr8888S => u32::from_le_bytes([r, g, b, a]),
            Self::Argb8888 | Self::Argb8888S => u32::from_le_bytes([b, g, r, a]),
        }
    }

    /// Split a packed pixel back into `[r, g, b, a]`, leaving alpha mode untouched.
    pub fn unpack(self, px: u32) -> [u8; 4] {
        let [lo, g, hi, a] = px.to_le_bytes();
        match self {
            Self::Abgr8888 | Self::Abgr8888S => [lo, g, hi, a],
            Self::Argb8888 | Self::Argb8888S => [hi, g, lo, a],
        }
    }
}

impl FromStr for PixelFormat {
    type Err = LottieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abgr8888" => Ok(Self::Abgr8888),
            "argb8888" => Ok(Self::Argb8888),
            "abgr8888s" => Ok(Self::Abgr8888S),
            "argb8888s" => Ok(Self::Argb8888S),
            other => Err(LottieError::validation(format!(
                "unknown pixel format '{other}'"
            ))),
        }
    }
}

/// Render target dimensions in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    /// Largest edge the CPU rasterizer accepts.
    pub const MAX_EDGE: u32 = u16::MAX as u32;

    pub fn new(width: u32, height: u32) -> LottieResult<Self> {
        if width == 0 || height == 0 {
            return Err(LottieError::target(format!(
                "target size must be non-empty, got {width}x{height}"
            )));
        }
        if width > Self::MAX_EDGE || height > Self::MAX_EDGE {
            return Err(LottieError::target(format!(
                "target size {width}x{height} exceeds {}",
                Self::MAX_EDGE
            )));
        }
        Ok(Self { width, height })
    }

    /// Build from host-side fractional sizes, truncating toward zero.
    pub fn from_device(width: f32, height: f32) -> LottieResult<Self> {
        fn trunc(v: f32) -> u32 {
            if v.is_finite() && v > 0.0 {
                v.trunc().min(u32::MAX as f32) as u32
            } else {
                0
            }
        }
        Self::new(trunc(width), trunc(height))
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

/// Metadata derived once when an animation loads.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationInfo {
    /// Whole frames on the timeline (`ceil(total_frames)`).
    pub frame_count: u32,
    /// Exact timeline length in frames (may be fractional).
    pub total_frames: f32,
    pub duration_ms: u32,
    pub frame_rate: f32,
    /// Intrinsic composition width.
    pub width: f32,
    /// Intrinsic composition height.
    pub height: f32,
}

impl AnimationInfo {
    pub fn from_timeline(total_frames: f32, frame_rate: f32, width: f32, height: f32) -> Self {
        let total_frames = total_frames.max(0.0);
        let duration_ms = if frame_rate > 0.0 {
            ((total_frames / frame_rate) * 1000.0).round() as u32
        } else {
            0
        };
        Self {
            frame_count: total_frames.ceil() as u32,
            total_frames,
            duration_ms,
            frame_rate,
            width,
            height,
        }
    }

    /// Replace the derived duration with one reported by the engine.
    pub fn with_duration_secs(mut self, secs: f32) -> Self {
        if secs.is_finite() && secs >= 0.0 {
            self.duration_ms = (secs * 1000.0).round() as u32;
        }
        self
    }
}

/// How a session maps out-of-range frame requests onto the timeline.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FramePolicy {
    /// Clamp into `[0, total_frames - 1]`.
    #[default]
    Clamp,
    /// Wrap around the timeline length.
    Wrap,
}

impl FramePolicy {
    /// Map `frame` onto a timeline of `total_frames` frames. NaN maps to frame 0.
    pub fn apply(self, frame: f32, total_frames: f32) -> f32 {
        if frame.is_nan() || total_frames <= 0.0 {
            return 0.0;
        }
        let last = (total_frames - 1.0).max(0.0);
        match self {
            Self::Clamp => frame.clamp(0.0, last),
            Self::Wrap => {
                if frame.is_infinite() {
                    return if frame > 0.0 { last } else { 0.0 };
                }
                frame.rem_euclid(total_frames).min(last)
            }
        }
    }
}

impl FromStr for FramePolicy {
    type Err = LottieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "wrap" => Ok(Self::Wrap),
            other => Err(LottieError::validation(format!(
                "unknown frame policy '{other}'"
            ))),
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_straight_rgba(self) -> [u8; 4] {
        fn unpremul(c: u8, a: u8) -> u8 {
            if a == 0 {
                return 0;
            }
            let c = u32::from(c);
            let a = u32::from(a);
            ((c * 255 + a / 2) / a).min(255) as u8
        }

        [
            unpremul(self.r, self.a),
            unpremul(self.g, self.a),
            unpremul(self.b, self.a),
            self.a,
        ]
    }
}

/// Decomposed 2D transform.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    pub translate: Vec2,
    pub rotation_rad: f64,
    pub scale: Vec2,  // default (1,1)
    pub anchor: Vec2, // pivot in local space
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    /// Build from Lottie-style fields, where `position` is where the anchor lands.
    pub fn from_anchor_position(anchor: Vec2, position: Vec2, scale: Vec2, rotation_deg: f64) -> Self {
        Self {
            translate: position - anchor,
            rotation_rad: rotation_deg.to_radians(),
            scale,
            anchor,
        }
    }

    pub fn to_affine(self) -> kurbo::Affine {
        let t_translate = kurbo::Affine::translate(self.translate);
        let t_anchor = kurbo::Affine::translate(self.anchor);
        let t_unanchor = kurbo::Affine::translate(-self.anchor);
        let t_rotate = kurbo::Affine::rotate(self.rotation_rad);
        let t_scale = kurbo::Affine::scale_non_uniform(self.scale.x, self.scale.y);

        // T(translate) * T(anchor) * R(rot) * S(scale) * T(-anchor)
        t_translate * t_anchor * t_rotate * t_scale * t_unanchor
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
