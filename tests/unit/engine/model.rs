use super::*;

const MINIMAL: &str = r##"{
    "v": "5.7.4", "fr": 30, "ip": 0, "op": 60, "w": 100, "h": 80,
    "layers": [
        { "ty": 1, "ip": 0, "op": 60, "sc": "#ff0000", "sw": 100, "sh": 80,
          "ks": { "o": { "a": 0, "k": 50 }, "p": { "a": 0, "k": [50, 40, 0] },
                  "a": { "a": 0, "k": [50, 40, 0] } } },
        { "ty": 4, "shapes": [
            { "ty": "gr", "it": [
                { "ty": "rc", "p": { "a": 0, "k": [10, 10] }, "s": { "a": 0, "k": [4, 4] } },
                { "ty": "fl", "c": { "a": 0, "k": [0, 0, 1, 1] } },
                { "ty": "tr" }
            ] },
            { "ty": "st", "c": { "a": 0, "k": [1, 1, 1, 1] } }
        ] },
        { "ty": 0, "refId": "comp_0" }
    ]
}"##;

#[test]
fn parses_minimal_document() {
    let doc = LottieDoc::parse(MINIMAL.as_bytes()).unwrap();
    assert_eq!(doc.total_frames(), 60.0);
    assert_eq!(doc.layers.len(), 3);
    assert_eq!(doc.layers[0].ty, Layer::SOLID);
    assert!((doc.layers[0].ks.opacity() - 0.5).abs() < 1e-6);
    assert_eq!(doc.layers[0].ks.position(), Vec2::new(50.0, 40.0));

    let ShapeItem::Group { it, .. } = &doc.layers[1].shapes[0] else {
        panic!("expected group");
    };
    assert_eq!(it.len(), 3);
    assert!(matches!(it[2], ShapeItem::Transform(_)));
    assert!(matches!(doc.layers[1].shapes[1], ShapeItem::Unsupported));
}

#[test]
fn rejects_malformed_and_degenerate_documents() {
    assert!(matches!(
        LottieDoc::parse(b"not json"),
        Err(LottieError::Load(_))
    ));
    assert!(LottieDoc::parse(br#"{"fr":30,"ip":0,"op":0,"w":10,"h":10}"#).is_err());
    assert!(LottieDoc::parse(br#"{"fr":0,"ip":0,"op":10,"w":10,"h":10}"#).is_err());
    assert!(LottieDoc::parse(br#"{"fr":30,"ip":0,"op":10,"w":0,"h":10}"#).is_err());
    assert!(LottieDoc::parse(br#"{"fr":30,"ip":0,"op":10,"w":10}"#).is_err());
}

#[test]
fn animated_property_uses_first_keyframe() {
    let p: Property = serde_json::from_str(
        r#"{"a":1,"k":[{"t":0,"s":[20,30]},{"t":10,"s":[40,50]}]}"#,
    )
    .unwrap();
    assert_eq!(p.vec2(Vec2::ZERO), Vec2::new(20.0, 30.0));
}

#[test]
fn scalar_and_vector_fallbacks() {
    let p = Property::static_value(serde_json::json!(7));
    assert_eq!(p.scalar(0.0), 7.0);
    assert_eq!(p.vec2(Vec2::ZERO), Vec2::new(7.0, 7.0));

    let empty = Property::default();
    assert_eq!(empty.scalar(3.0), 3.0);
    assert_eq!(empty.vec2(Vec2::new(1.0, 2.0)), Vec2::new(1.0, 2.0));
}

#[test]
fn colors_accept_unit_and_byte_ranges() {
    let unit = Property::static_value(serde_json::json!([1, 0, 0.5]));
    assert_eq!(unit.color(), Some([255, 0, 128, 255]));
    let bytes = Property::static_value(serde_json::json!([255, 10, 0, 255]));
    assert_eq!(bytes.color(), Some([255, 10, 0, 255]));
    let short = Property::static_value(serde_json::json!([1, 0]));
    assert_eq!(short.color(), None);
}

#[test]
fn hex_colors() {
    assert_eq!(parse_hex_color("#ff8000"), Some([255, 128, 0, 255]));
    assert_eq!(parse_hex_color("#0f0"), Some([0, 255, 0, 255]));
    assert_eq!(parse_hex_color("zzz"), None);
    assert_eq!(parse_hex_color("#12345"), None);
}

#[test]
fn layer_visibility_falls_back_to_document_range() {
    let doc = LottieDoc::parse(MINIMAL.as_bytes()).unwrap();
    let shape = &doc.layers[1];
    assert!(shape.visible_at(0.0, &doc));
    assert!(shape.visible_at(59.5, &doc));
    assert!(!shape.visible_at(60.0, &doc));
}
