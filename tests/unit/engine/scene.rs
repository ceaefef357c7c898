use super::*;

fn doc(json: &str) -> LottieDoc {
    LottieDoc::parse(json.as_bytes()).unwrap()
}

#[test]
fn viewport_fits_and_centers() {
    let t = viewport_transform((100.0, 50.0), (200.0, 200.0));
    let p0 = t * Point::new(0.0, 0.0);
    let p1 = t * Point::new(100.0, 50.0);
    assert_eq!(p0, Point::new(0.0, 50.0));
    assert_eq!(p1, Point::new(200.0, 150.0));

    assert_eq!(
        viewport_transform((0.0, 10.0), (10.0, 10.0)),
        Affine::IDENTITY
    );
}

#[test]
fn layers_paint_bottom_up_and_respect_in_out_points() {
    let d = doc(r##"{
        "fr": 10, "ip": 0, "op": 2, "w": 4, "h": 4,
        "layers": [
            { "ty": 1, "ip": 0, "op": 1, "sc": "#ff0000", "sw": 4, "sh": 4 },
            { "ty": 1, "ip": 0, "op": 2, "sc": "#0000ff", "sw": 4, "sh": 4 }
        ]
    }"##);

    let f0 = build_draw_list(&d, 0.0, Affine::IDENTITY);
    assert_eq!(f0.len(), 2);
    assert_eq!(f0[0].color, [0, 0, 255, 255]);
    assert_eq!(f0[1].color, [255, 0, 0, 255]);

    let f1 = build_draw_list(&d, 1.0, Affine::IDENTITY);
    assert_eq!(f1.len(), 1);
    assert_eq!(f1[0].color, [0, 0, 255, 255]);
}

#[test]
fn hidden_layers_and_unknown_types_are_skipped() {
    let d = doc(r##"{
        "fr": 10, "ip": 0, "op": 1, "w": 4, "h": 4,
        "layers": [
            { "ty": 1, "hd": true, "sc": "#ff0000", "sw": 4, "sh": 4 },
            { "ty": 2, "refId": "image_0" },
            { "ty": 1, "sc": "not-a-color", "sw": 4, "sh": 4 }
        ]
    }"##);
    assert!(build_draw_list(&d, 0.0, Affine::IDENTITY).is_empty());
}

#[test]
fn group_fills_cover_preceding_geometry_and_earlier_groups_sit_on_top() {
    let d = doc(r#"{
        "fr": 10, "ip": 0, "op": 1, "w": 10, "h": 10,
        "layers": [ { "ty": 4, "shapes": [
            { "ty": "gr", "it": [
                { "ty": "el", "p": { "k": [5, 5] }, "s": { "k": [4, 4] } },
                { "ty": "fl", "c": { "k": [1, 0, 0, 1] }, "o": { "k": 50 } },
                { "ty": "tr", "o": { "k": 50 } }
            ] },
            { "ty": "gr", "it": [
                { "ty": "rc", "p": { "k": [5, 5] }, "s": { "k": [10, 10] } },
                { "ty": "rc", "p": { "k": [1, 1] }, "s": { "k": [0, 2] } },
                { "ty": "fl", "c": { "k": [0, 1, 0, 1] } }
            ] }
        ] } ]
    }"#);

    let items = build_draw_list(&d, 0.0, Affine::IDENTITY);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].color, [0, 255, 0, 255]);
    assert_eq!(items[1].color, [255, 0, 0, 255]);
    assert!((items[1].opacity - 0.25).abs() < 1e-6);
}

#[test]
fn parent_fill_paints_child_geometry_underneath() {
    let d = doc(r#"{
        "fr": 10, "ip": 0, "op": 1, "w": 10, "h": 10,
        "layers": [ { "ty": 4, "shapes": [
            { "ty": "gr", "it": [
                { "ty": "rc", "p": { "k": [5, 5] }, "s": { "k": [2, 2] } },
                { "ty": "fl", "c": { "k": [1, 0, 0, 1] } }
            ] },
            { "ty": "fl", "c": { "k": [0, 0, 1, 1] } }
        ] } ]
    }"#);

    let items = build_draw_list(&d, 0.0, Affine::IDENTITY);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].color, [0, 0, 255, 255]);
    assert_eq!(items[1].color, [255, 0, 0, 255]);
}

#[test]
fn parent_layer_transforms_chain() {
    let d = doc(r##"{
        "fr": 10, "ip": 0, "op": 1, "w": 100, "h": 100,
        "layers": [
            { "ty": 1, "ind": 2, "parent": 1, "sc": "#ffffff", "sw": 1, "sh": 1,
              "ks": { "p": { "k": [5, 0] } } },
            { "ty": 3, "ind": 1, "ks": { "p": { "k": [10, 20] } } }
        ]
    }"##);

    let items = build_draw_list(&d, 0.0, Affine::IDENTITY);
    assert_eq!(items.len(), 1);
    let origin = items[0].transform * Point::ORIGIN;
    assert_eq!(origin, Point::new(15.0, 20.0));
}

#[test]
fn parent_cycles_terminate() {
    let d = doc(r##"{
        "fr": 10, "ip": 0, "op": 1, "w": 10, "h": 10,
        "layers": [
            { "ty": 1, "ind": 1, "parent": 2, "sc": "#ffffff", "sw": 1, "sh": 1 },
            { "ty": 3, "ind": 2, "parent": 1 }
        ]
    }"##);
    assert_eq!(build_draw_list(&d, 0.0, Affine::IDENTITY).len(), 1);
}
