use std::collections::HashMap;

use kurbo::Shape;

use crate::engine::model::{Layer, LottieDoc, ShapeItem, TransformProps, parse_hex_color};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Transform2D, Vec2};

const PATH_TOLERANCE: f64 = 0.1;
const MAX_PARENT_DEPTH: usize = 64;

/// One filled path, in viewport coordinates once the viewport transform is applied.
#[derive(Clone, Debug)]
pub struct DrawItem {
    pub path: BezPath,
    pub transform: Affine,
    /// Straight RGBA8 fill color.
    pub color: [u8; 4],
    /// Accumulated layer/group/fill opacity in `[0, 1]`.
    pub opacity: f32,
}

/// Uniform fit-and-center transform from an intrinsic size into a viewport.
pub fn viewport_transform(intrinsic: (f64, f64), viewport: (f64, f64)) -> Affine {
    let (iw, ih) = intrinsic;
    let (vw, vh) = viewport;
    if iw <= 0.0 || ih <= 0.0 || vw <= 0.0 || vh <= 0.0 {
        return Affine::IDENTITY;
    }
    let s = (vw / iw).min(vh / ih);
    let offset = Vec2::new((vw - iw * s) / 2.0, (vh - ih * s) / 2.0);
    Affine::translate(offset) * Affine::scale(s)
}

fn transform_of(props: &TransformProps) -> Affine {
    Transform2D::from_anchor_position(
        props.anchor(),
        props.position(),
        props.scale(),
        props.rotation_deg(),
    )
    .to_affine()
}

/// Build the paint-ordered draw list for absolute frame `frame`.
///
/// Items are returned bottom-most first.
pub fn build_draw_list(doc: &LottieDoc, frame: f64, root: Affine) -> Vec<DrawItem> {
    let by_index: HashMap<i64, &Layer> = doc
        .layers
        .iter()
        .filter_map(|l| l.ind.map(|i| (i, l)))
        .collect();

    let mut out = Vec::new();
    for layer in doc.layers.iter().rev() {
        if !layer.visible_at(frame, doc) {
            continue;
        }
        let world = root * layer_world_transform(layer, &by_index);
        let opacity = layer.ks.opacity();
        match layer.ty {
            Layer::SOLID => push_solid(layer, world, opacity, &mut out),
            Layer::SHAPE => {
                let mut layer_items = Vec::new();
                let mut pending = Vec::new();
                walk_shapes(
                    &layer.shapes,
                    world,
                    opacity,
                    &mut pending,
                    &mut layer_items,
                );
                // Earlier shape items sit above later ones.
                layer_items.reverse();
                out.extend(layer_items);
            }
            other => tracing::trace!(ty = other, "skipping unsupported layer type"),
        }
    }
    out
}

fn layer_world_transform(layer: &Layer, by_index: &HashMap<i64, &Layer>) -> Affine {
    let mut t = transform_of(&layer.ks);
    let mut parent = layer.parent;
    let mut depth = 0;
    while let Some(idx) = parent {
        let Some(p) = by_index.get(&idx) else { break };
        depth += 1;
        if depth > MAX_PARENT_DEPTH {
            tracing::warn!(layer = ?layer.nm, "layer parent chain too deep; truncating");
            break;
        }
        t = transform_of(&p.ks) * t;
        parent = p.parent;
    }
    t
}

fn push_solid(layer: &Layer, world: Affine, opacity: f32, out: &mut Vec<DrawItem>) {
    let (Some(sc), Some(w), Some(h)) = (layer.sc.as_deref(), layer.sw, layer.sh) else {
        return;
    };
    let Some(color) = parse_hex_color(sc) else {
        tracing::warn!(color = sc, "invalid solid layer color");
        return;
    };
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    out.push(DrawItem {
        path: Rect::new(0.0, 0.0, w, h).to_path(PATH_TOLERANCE),
        transform: world,
        color,
        opacity,
    });
}

struct Geometry {
    path: BezPath,
    transform: Affine,
}

/// Walk one group level. Geometry accumulates into `pending` (shared with the parent so parent
/// fills also paint child geometry); fills emit draw items for everything pending so far.
fn walk_shapes(
    items: &[ShapeItem],
    transform: Affine,
    opacity: f32,
    pending: &mut Vec<Geometry>,
    out: &mut Vec<DrawItem>,
) {
    for item in items {
        match item {
            ShapeItem::Group { it, hd } => {
                if *hd {
                    continue;
                }
                let (group_t, group_o) = it
                    .iter()
                    .find_map(|i| match i {
                        ShapeItem::Transform(tr) => Some((transform_of(tr), tr.opacity())),
                        _ => None,
                    })
                    .unwrap_or((Affine::IDENTITY, 1.0));
                let mut child_pending = Vec::new();
                walk_shapes(
                    it,
                    transform * group_t,
                    opacity * group_o,
                    &mut child_pending,
                    out,
                );
                pending.extend(child_pending);
            }
            ShapeItem::Rect { p, s, r, hd } => {
                if *hd {
                    continue;
                }
                let center = p.as_ref().map_or(Vec2::ZERO, |p| p.vec2(Vec2::ZERO));
                let size = s.as_ref().map_or(Vec2::ZERO, |s| s.vec2(Vec2::ZERO));
                let radius = r.as_ref().map_or(0.0, |r| r.scalar(0.0)).max(0.0);
                if size.x <= 0.0 || size.y <= 0.0 {
                    continue;
                }
                let origin = Point::new(center.x - size.x / 2.0, center.y - size.y / 2.0);
                let rect = Rect::from_origin_size(origin, (size.x, size.y));
                let path = if radius > 0.0 {
                    rect.to_rounded_rect(radius).to_path(PATH_TOLERANCE)
                } else {
                    rect.to_path(PATH_TOLERANCE)
                };
                pending.push(Geometry { path, transform });
            }
            ShapeItem::Ellipse { p, s, hd } => {
                if *hd {
                    continue;
                }
                let center = p.as_ref().map_or(Vec2::ZERO, |p| p.vec2(Vec2::ZERO));
                let size = s.as_ref().map_or(Vec2::ZERO, |s| s.vec2(Vec2::ZERO));
                if size.x <= 0.0 || size.y <= 0.0 {
                    continue;
                }
                let e = kurbo::Ellipse::new(
                    center.to_point(),
                    Vec2::new(size.x / 2.0, size.y / 2.0),
                    0.0,
                );
                pending.push(Geometry {
                    path: e.to_path(PATH_TOLERANCE),
                    transform,
                });
            }
            ShapeItem::Fill { c, o, hd } => {
                if *hd {
                    continue;
                }
                let color = c.as_ref().and_then(|c| c.color()).unwrap_or([0, 0, 0, 255]);
                let fill_o = o
                    .as_ref()
                    .map_or(1.0, |o| (o.scalar(100.0) / 100.0).clamp(0.0, 1.0) as f32);
                for g in pending.iter() {
                    out.push(DrawItem {
                        path: g.path.clone(),
                        transform: g.transform,
                        color,
                        opacity: opacity * fill_o,
                    });
                }
            }
            ShapeItem::Transform(_) | ShapeItem::Unsupported => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scene.rs"]
mod tests;
