use bagelverse::panel::DEFAULT_TEXT;
use bagelverse::resources::TYPEFACE_PATH;
use bagelverse::text::Typeface;
use bagelverse::text::extrude::{ExtrudeOptions, extrude_text};
use cgmath::{InnerSpace, Vector3};

// A tiny typeface: "o" is a square ring (a hole inside a square), "i" is a
// plain bar, and the space has no outline at all.
fn test_typeface() -> Typeface {
    let json = r#"{
        "familyName": "Test",
        "resolution": 1000,
        "glyphs": {
            "i": {"ha": 400, "o": "m 100 0 l 300 0 l 300 700 l 100 700"},
            "o": {
                "ha": 800,
                "o": "m 0 0 l 700 0 l 700 700 l 0 700 m 200 200 l 200 500 l 500 500 l 500 200"
            },
            " ": {"ha": 300}
        }
    }"#;
    Typeface::from_json(json).unwrap()
}

#[test]
fn extrusion_spans_depth_plus_both_bevels() {
    let typeface = test_typeface();
    let options = ExtrudeOptions::default();
    let mesh = extrude_text(&typeface, "i", &options).unwrap();
    assert!(!mesh.is_empty());

    let (min, max) = mesh.bounding_box().unwrap();
    let z_extent = max.z - min.z;
    let expected = options.depth + 2.0 * options.bevel_thickness;
    assert!((z_extent - expected).abs() < 1e-4, "z extent was {z_extent}");
}

#[test]
fn extrusion_is_approximately_centered() {
    let typeface = test_typeface();
    let mesh = extrude_text(&typeface, "oi oi", &ExtrudeOptions::default()).unwrap();
    let (min, max) = mesh.bounding_box().unwrap();

    // Centering shifts by half of the pre-translation maximum, so afterwards
    // the maximum is half the extent plus however far the minimum undershoots.
    assert!((max.x + min.x).abs() < max.x, "x range [{}, {}]", min.x, max.x);
    assert!((max.z - 0.115).abs() < 1e-4);
    assert!((min.z + 0.145).abs() < 1e-4);
}

#[test]
fn empty_text_yields_an_empty_mesh() {
    let typeface = test_typeface();
    let mesh = extrude_text(&typeface, "", &ExtrudeOptions::default()).unwrap();
    assert!(mesh.is_empty());
    assert!(mesh.bounding_box().is_none());
}

#[test]
fn unknown_glyphs_and_bare_spaces_yield_an_empty_mesh() {
    let typeface = test_typeface();
    for text in ["???", "   ", "\u{1F369}"] {
        let mesh = extrude_text(&typeface, text, &ExtrudeOptions::default()).unwrap();
        assert!(mesh.is_empty(), "expected no geometry for {text:?}");
    }
}

#[test]
fn unknown_glyphs_mixed_with_known_ones_are_skipped() {
    let typeface = test_typeface();
    let options = ExtrudeOptions::default();
    let with_junk = extrude_text(&typeface, "i?i", &options).unwrap();
    let without = extrude_text(&typeface, "ii", &options).unwrap();
    // The junk character contributes no geometry and no advance.
    assert_eq!(with_junk.vertices.len(), without.vertices.len());
}

#[test]
fn indices_are_in_range_and_normals_unit_length() {
    let typeface = test_typeface();
    let mesh = extrude_text(&typeface, "oi", &ExtrudeOptions::default()).unwrap();

    assert_eq!(mesh.indices.len() % 3, 0);
    let count = mesh.vertices.len() as u32;
    assert!(mesh.indices.iter().all(|&i| i < count));

    for vertex in &mesh.vertices {
        let length = Vector3::from(vertex.normal).magnitude();
        assert!((length - 1.0).abs() < 1e-3, "normal length {length}");
    }
}

#[test]
fn bundled_typeface_builds_the_default_text() {
    let path = std::path::Path::new("assets").join(TYPEFACE_PATH);
    let json = std::fs::read_to_string(path).unwrap();
    let typeface = Typeface::from_json(&json).unwrap();

    // Every character of the default string has a glyph.
    for c in DEFAULT_TEXT.chars() {
        assert!(typeface.glyph(c).is_some(), "missing glyph for {c:?}");
    }

    let options = ExtrudeOptions::default();
    let mesh = extrude_text(&typeface, DEFAULT_TEXT, &options).unwrap();
    assert!(!mesh.is_empty());

    let (min, max) = mesh.bounding_box().unwrap();
    let expected_depth = options.depth + 2.0 * options.bevel_thickness;
    assert!((max.z - min.z - expected_depth).abs() < 1e-3);
    // A fourteen-character string at em size 0.5 is a wide, short mesh.
    assert!(max.x - min.x > 2.0);
    assert!(max.y - min.y < 0.7);
}

#[test]
fn larger_size_scales_the_footprint() {
    let typeface = test_typeface();
    let small = ExtrudeOptions {
        size: 0.5,
        ..Default::default()
    };
    let large = ExtrudeOptions {
        size: 1.0,
        ..Default::default()
    };
    let (min_s, max_s) = extrude_text(&typeface, "i", &small)
        .unwrap()
        .bounding_box()
        .unwrap();
    let (min_l, max_l) = extrude_text(&typeface, "i", &large)
        .unwrap()
        .bounding_box()
        .unwrap();
    assert!((max_l.y - min_l.y) > 1.5 * (max_s.y - min_s.y));
}
