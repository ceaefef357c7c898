use super::*;

#[test]
fn abgr_packs_red_into_low_byte() {
    let red = Rgba8Premul::from_straight_rgba(255, 0, 0, 255);
    assert_eq!(PixelFormat::Abgr8888.pack(red), 0xFF00_00FF);
    assert_eq!(PixelFormat::Argb8888.pack(red), 0xFFFF_0000);
    assert_eq!(PixelFormat::Abgr8888.unpack(0xFF00_00FF), [255, 0, 0, 255]);
    assert_eq!(PixelFormat::Argb8888.unpack(0xFFFF_0000), [255, 0, 0, 255]);
}

#[test]
fn straight_formats_unpremultiply() {
    let half_red = Rgba8Premul::from_straight_rgba(255, 0, 0, 128);
    assert_eq!(half_red.r, 128);
    let px = PixelFormat::Abgr8888S.pack(half_red);
    assert_eq!(PixelFormat::Abgr8888S.unpack(px), [255, 0, 0, 128]);
    assert_eq!(PixelFormat::Abgr8888S.pack(Rgba8Premul::transparent()), 0);
}

#[test]
fn pixel_format_parses_case_insensitively() {
    assert_eq!(
        "ARGB8888".parse::<PixelFormat>().unwrap(),
        PixelFormat::Argb8888
    );
    assert_eq!(
        " abgr8888s ".parse::<PixelFormat>().unwrap(),
        PixelFormat::Abgr8888S
    );
    assert!("rgb565".parse::<PixelFormat>().is_err());
}

#[test]
fn target_size_truncates_fractional_device_pixels() {
    let s = TargetSize::from_device(63.9, 64.2).unwrap();
    assert_eq!(
        s,
        TargetSize {
            width: 63,
            height: 64
        }
    );
    assert_eq!(s.pixel_count(), 63 * 64);
}

#[test]
fn target_size_rejects_empty_and_oversized() {
    assert!(TargetSize::from_device(0.9, 10.0).is_err());
    assert!(TargetSize::from_device(f32::NAN, 10.0).is_err());
    assert!(TargetSize::from_device(-4.0, 10.0).is_err());
    assert!(TargetSize::new(70_000, 1).is_err());
}

#[test]
fn animation_info_derives_duration_and_count() {
    let info = AnimationInfo::from_timeline(60.0, 30.0, 100.0, 50.0);
    assert_eq!(info.frame_count, 60);
    assert_eq!(info.duration_ms, 2000);

    let partial = AnimationInfo::from_timeline(2.5, 25.0, 10.0, 10.0);
    assert_eq!(partial.frame_count, 3);
    assert_eq!(partial.duration_ms, 100);
}

#[test]
fn engine_duration_overrides_derived_one() {
    let info = AnimationInfo::from_timeline(60.0, 30.0, 100.0, 50.0);
    assert_eq!(info.with_duration_secs(2.5).duration_ms, 2500);
    assert_eq!(info.with_duration_secs(f32::NAN).duration_ms, 2000);
    assert_eq!(info.with_duration_secs(-1.0).duration_ms, 2000);
}

#[test]
fn clamp_policy_bounds_frames() {
    let p = FramePolicy::Clamp;
    assert_eq!(p.apply(-3.0, 10.0), 0.0);
    assert_eq!(p.apply(4.5, 10.0), 4.5);
    assert_eq!(p.apply(42.0, 10.0), 9.0);
    assert_eq!(p.apply(f32::NAN, 10.0), 0.0);
    assert_eq!(p.apply(f32::INFINITY, 10.0), 9.0);
    assert_eq!(p.apply(3.0, 0.0), 0.0);
}

#[test]
fn wrap_policy_wraps_around_timeline() {
    let p = FramePolicy::Wrap;
    assert_eq!(p.apply(12.0, 10.0), 2.0);
    assert_eq!(p.apply(-1.0, 10.0), 9.0);
    assert_eq!(p.apply(f32::NEG_INFINITY, 10.0), 0.0);
}

#[test]
fn transform_to_affine_identity_and_translation() {
    let t = Transform2D::default();
    assert_eq!(t.to_affine(), kurbo::Affine::IDENTITY);

    let t = Transform2D {
        translate: Vec2::new(10.0, -2.5),
        ..Transform2D::default()
    };
    assert_eq!(
        t.to_affine(),
        kurbo::Affine::translate(Vec2::new(10.0, -2.5))
    );
}

#[test]
fn anchor_lands_on_position() {
    let t = Transform2D::from_anchor_position(
        Vec2::new(5.0, 5.0),
        Vec2::new(20.0, 30.0),
        Vec2::new(2.0, 2.0),
        0.0,
    );
    let p = t.to_affine() * Point::new(5.0, 5.0);
    assert!((p.x - 20.0).abs() < 1e-9);
    assert!((p.y - 30.0).abs() < 1e-9);
}
