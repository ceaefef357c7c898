//! Serde model for the Lottie subset the built-in engine understands.
//!
//! Unknown fields are ignored and unknown layer/shape types are kept as inert placeholders, so
//! richer documents still load and render their supported parts.

use serde::Deserialize;
use serde_json::Value;

use crate::foundation::core::Vec2;
use crate::foundation::error::{LottieError, LottieResult};

/// Top-level Lottie document.
#[derive(Clone, Debug, Deserialize)]
pub struct LottieDoc {
    #[serde(default)]
    pub v: Option<String>,
    #[serde(default)]
    pub nm: Option<String>,
    pub fr: f64,
    pub ip: f64,
    pub op: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl LottieDoc {
    /// Parse and validate a document.
    pub fn parse(bytes: &[u8]) -> LottieResult<Self> {
        let doc: Self = serde_json::from_slice(bytes)
            .map_err(|e| LottieError::load(format!("invalid lottie json: {e}")))?;
        doc.validate()?;
        tracing::debug!(
            version = ?doc.v,
            name = ?doc.nm,
            layers = doc.layers.len(),
            "parsed lottie document"
        );
        Ok(doc)
    }

    fn validate(&self) -> LottieResult<()> {
        if !(self.fr.is_finite() && self.fr > 0.0) {
            return Err(LottieError::load(format!(
                "frame rate must be > 0, got {}",
                self.fr
            )));
        }
        if !(self.ip.is_finite() && self.op.is_finite() && self.op > self.ip) {
            return Err(LottieError::load(format!(
                "out point must follow in point, got ip={} op={}",
                self.ip, self.op
            )));
        }
        if !(self.w.is_finite() && self.w > 0.0 && self.h.is_finite() && self.h > 0.0) {
            return Err(LottieError::load(format!(
                "composition size must be positive, got {}x{}",
                self.w, self.h
            )));
        }
        Ok(())
    }

    pub fn total_frames(&self) -> f64 {
        self.op - self.ip
    }
}

/// One entry of `layers`.
#[derive(Clone, Debug, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub ty: i64,
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub ind: Option<i64>,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub ip: Option<f64>,
    #[serde(default)]
    pub op: Option<f64>,
    #[serde(default)]
    pub hd: bool,
    #[serde(default)]
    pub ks: TransformProps,
    /// Solid color (`#rrggbb`), solid layers only.
    #[serde(default)]
    pub sc: Option<String>,
    #[serde(default)]
    pub sw: Option<f64>,
    #[serde(default)]
    pub sh: Option<f64>,
    #[serde(default)]
    pub shapes: Vec<ShapeItem>,
}

impl Layer {
    pub const SOLID: i64 = 1;
    pub const SHAPE: i64 = 4;

    /// Whether the layer is on screen at absolute frame `frame`.
    pub fn visible_at(&self, frame: f64, doc: &LottieDoc) -> bool {
        if self.hd {
            return false;
        }
        let ip = self.ip.unwrap_or(doc.ip);
        let op = self.op.unwrap_or(doc.op);
        ip <= frame && frame < op
    }
}

/// Transform block shared by layers (`ks`) and shape groups (`tr`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TransformProps {
    #[serde(default)]
    pub a: Option<Property>,
    #[serde(default)]
    pub p: Option<Property>,
    #[serde(default)]
    pub s: Option<Property>,
    #[serde(default)]
    pub r: Option<Property>,
    #[serde(default)]
    pub o: Option<Property>,
}

impl TransformProps {
    pub fn anchor(&self) -> Vec2 {
        self.a.as_ref().map_or(Vec2::ZERO, |p| p.vec2(Vec2::ZERO))
    }

    pub fn position(&self) -> Vec2 {
        self.p.as_ref().map_or(Vec2::ZERO, |p| p.vec2(Vec2::ZERO))
    }

    /// Scale as a factor (Lottie stores percent).
    pub fn scale(&self) -> Vec2 {
        let pct = self
            .s
            .as_ref()
            .map_or(Vec2::new(100.0, 100.0), |p| p.vec2(Vec2::new(100.0, 100.0)));
        pct / 100.0
    }

    pub fn rotation_deg(&self) -> f64 {
        self.r.as_ref().map_or(0.0, |p| p.scalar(0.0))
    }

    /// Opacity in `[0, 1]` (Lottie stores percent).
    pub fn opacity(&self) -> f32 {
        let pct = self.o.as_ref().map_or(100.0, |p| p.scalar(100.0));
        (pct / 100.0).clamp(0.0, 1.0) as f32
    }
}

/// Entry of a shape layer's `shapes` or a group's `it`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "ty")]
pub enum ShapeItem {
    #[serde(rename = "gr")]
    Group {
        #[serde(default)]
        it: Vec<ShapeItem>,
        #[serde(default)]
        hd: bool,
    },
    #[serde(rename = "rc")]
    Rect {
        #[serde(default)]
        p: Option<Property>,
        #[serde(default)]
        s: Option<Property>,
        #[serde(default)]
        r: Option<Property>,
        #[serde(default)]
        hd: bool,
    },
    #[serde(rename = "el")]
    Ellipse {
        #[serde(default)]
        p: Option<Property>,
        #[serde(default)]
        s: Option<Property>,
        #[serde(default)]
        hd: bool,
    },
    #[serde(rename = "fl")]
    Fill {
        #[serde(default)]
        c: Option<Property>,
        #[serde(default)]
        o: Option<Property>,
        #[serde(default)]
        hd: bool,
    },
    #[serde(rename = "tr")]
    Transform(TransformProps),
    #[serde(other)]
    Unsupported,
}

/// A possibly-animated property (`{"a": 0|1, "k": ...}`).
///
/// Animated properties resolve to their first keyframe's start value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub a: u8,
    #[serde(default)]
    pub k: Value,
}

impl Property {
    pub fn static_value(value: Value) -> Self {
        Self { a: 0, k: value }
    }

    /// Numeric components of the resolved value.
    pub fn components(&self) -> Vec<f64> {
        fn numbers(v: &Value) -> Vec<f64> {
            match v {
                Value::Number(n) => n.as_f64().into_iter().collect(),
                Value::Array(items) => items.iter().filter_map(Value::as_f64).collect(),
                _ => Vec::new(),
            }
        }

        match &self.k {
            Value::Array(items) if items.first().is_some_and(Value::is_object) => items
                .first()
                .and_then(|kf| kf.get("s"))
                .map(numbers)
                .unwrap_or_default(),
            other => numbers(other),
        }
    }

    pub fn scalar(&self, default: f64) -> f64 {
        self.components().first().copied().unwrap_or(default)
    }

    pub fn vec2(&self, default: Vec2) -> Vec2 {
        match self.components().as_slice() {
            [x, y, ..] => Vec2::new(*x, *y),
            [v] => Vec2::new(*v, *v),
            [] => default,
        }
    }

    /// Straight RGBA8 color. Components are `0..=1`, or `0..=255` when any exceeds 1.
    pub fn color(&self) -> Option<[u8; 4]> {
        let c = self.components();
        if c.len() < 3 {
            return None;
        }
        let max = c.iter().copied().fold(0.0f64, f64::max);
        let scale = if max > 1.0 { 1.0 } else { 255.0 };
        let ch = |v: f64| (v * scale).round().clamp(0.0, 255.0) as u8;
        Some([ch(c[0]), ch(c[1]), ch(c[2]), c.get(3).map_or(255, |&a| ch(a))])
    }
}

/// Parse `#rgb` / `#rrggbb` into straight RGBA8.
pub fn parse_hex_color(s: &str) -> Option<[u8; 4]> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        3 => {
            let nib = |i: usize| {
                let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
                Some(v * 17)
            };
            Some([nib(0)?, nib(1)?, nib(2)?, 255])
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/model.rs"]
mod tests;
