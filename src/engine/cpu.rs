use crate::engine::backend::{Animation, AnimationLoader, Canvas, is_lottie_mime};
use crate::engine::model::LottieDoc;
use crate::engine::scene::{DrawItem, build_draw_list, viewport_transform};
use crate::foundation::core::{Affine, BezPath, PixelFormat, Rgba8Premul, TargetSize};
use crate::foundation::error::{LottieError, LottieResult};

/// Built-in software engine: Lottie JSON subset rasterized with `vello_cpu`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuEngine;

impl AnimationLoader for CpuEngine {
    fn load(&self, bytes: &[u8], mime: &str) -> LottieResult<Box<dyn Animation>> {
        if !is_lottie_mime(mime) {
            return Err(LottieError::unsupported_format(format!(
                "no loader for '{mime}'"
            )));
        }
        Ok(Box::new(CpuAnimation::from_doc(LottieDoc::parse(bytes)?)))
    }

    fn canvas(&self) -> Box<dyn Canvas> {
        Box::new(CpuCanvas::new())
    }
}

/// A parsed Lottie document plus playhead and viewport state.
pub struct CpuAnimation {
    doc: LottieDoc,
    frame: f32,
    size: (f32, f32),
}

impl CpuAnimation {
    pub(crate) fn from_doc(doc: LottieDoc) -> Self {
        let size = (doc.w as f32, doc.h as f32);
        Self {
            doc,
            frame: 0.0,
            size,
        }
    }

    /// Draw list for the current frame, in viewport coordinates.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let root = viewport_transform(
            (self.doc.w, self.doc.h),
            (f64::from(self.size.0), f64::from(self.size.1)),
        );
        build_draw_list(&self.doc, self.doc.ip + f64::from(self.frame), root)
    }
}

impl Animation for CpuAnimation {
    fn total_frames(&self) -> f32 {
        self.doc.total_frames() as f32
    }

    fn duration_secs(&self) -> f32 {
        (self.doc.total_frames() / self.doc.fr) as f32
    }

    fn frame_rate(&self) -> f32 {
        self.doc.fr as f32
    }

    fn intrinsic_size(&self) -> (f32, f32) {
        (self.doc.w as f32, self.doc.h as f32)
    }

    fn set_frame(&mut self, frame: f32) {
        self.frame = frame;
    }

    fn current_frame(&self) -> f32 {
        self.frame
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }

    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn draw_items(&self) -> Vec<DrawItem> {
        self.draw_list()
    }
}

/// Software canvas. Rasterizes into a scratch pixmap, then packs into the caller's pixels.
pub struct CpuCanvas {
    target: Option<(TargetSize, PixelFormat)>,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl CpuCanvas {
    pub fn new() -> Self {
        Self {
            target: None,
            ctx: None,
            pixmap: None,
        }
    }

    fn surfaces(
        &mut self,
        w: u16,
        h: u16,
    ) -> (&mut vello_cpu::RenderContext, &mut vello_cpu::Pixmap) {
        let ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        let pixmap = match self.pixmap.take() {
            Some(pm) if pm.width() == w && pm.height() == h => pm,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        (self.ctx.insert(ctx), self.pixmap.insert(pixmap))
    }
}

impl Default for CpuCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for CpuCanvas {
    fn set_target(&mut self, size: TargetSize, format: PixelFormat) {
        self.target = Some((size, format));
    }

    fn clear(&mut self) {
        self.target = None;
    }

    fn target(&self) -> Option<(TargetSize, PixelFormat)> {
        self.target
    }

    fn draw(
        &mut self,
        animation: &dyn Animation,
        background: Rgba8Premul,
        out: &mut [u32],
    ) -> LottieResult<()> {
        let Some((size, format)) = self.target else {
            return Err(LottieError::target("canvas has no target"));
        };
        if out.len() < size.pixel_count() {
            return Err(LottieError::target(format!(
                "buffer holds {} pixels, target needs {}",
                out.len(),
                size.pixel_count()
            )));
        }
        let w: u16 = size
            .width
            .try_into()
            .map_err(|_| LottieError::target("target width exceeds u16"))?;
        let h: u16 = size
            .height
            .try_into()
            .map_err(|_| LottieError::target("target height exceeds u16"))?;

        let items = animation.draw_items();
        let (ctx, pixmap) = self.surfaces(w, h);
        clear_pixmap_to_transparent(pixmap);
        ctx.reset();
        for item in &items {
            draw_item(ctx, item);
        }
        ctx.flush();
        ctx.render_to_pixmap(pixmap);

        for (dst, src) in out[..size.pixel_count()]
            .iter_mut()
            .zip(pixmap.data_as_u8_slice().chunks_exact(4))
        {
            let px = premul_over(
                Rgba8Premul {
                    r: src[0],
                    g: src[1],
                    b: src[2],
                    a: src[3],
                },
                background,
            );
            *dst = format.pack(px);
        }
        Ok(())
    }
}

fn draw_item(ctx: &mut vello_cpu::RenderContext, item: &DrawItem) {
    let opacity = item.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || item.color[3] == 0 {
        return;
    }
    let [r, g, b, a] = item.color;
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(item.transform));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_path(&bezpath_to_cpu(&item.path));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn premul_over(src: Rgba8Premul, dst: Rgba8Premul) -> Rgba8Premul {
    if src.a == 255 || dst.a == 0 {
        return src;
    }
    let inv = 255 - u16::from(src.a);
    let over = |s: u8, d: u8| -> u8 {
        let v = u16::from(s) + ((u16::from(d) * inv + 127) / 255);
        v.min(255) as u8
    };
    Rgba8Premul {
        r: over(src.r, dst.r),
        g: over(src.g, dst.g),
        b: over(src.b, dst.b),
        a: over(src.a, dst.a),
    }
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/engine/cpu.rs"]
mod tests;
