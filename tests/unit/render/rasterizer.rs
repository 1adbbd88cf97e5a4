use super::*;

fn fontless(styles: &StyleConfig) -> CpuRasterizer {
    CpuRasterizer::with_font_cache(
        FontCache::with_database(usvg::fontdb::Database::new(), 4),
        2,
        styles,
    )
}

#[test]
fn empty_frame_is_background() {
    let styles = StyleConfig::default();
    let mut r = fontless(&styles);
    let res = Resolution { width: 8, height: 4 };
    let bg = Rgba8::new(20, 40, 60, 255);
    let f = r.rasterize(&[], res, bg).unwrap();
    assert_eq!(f.resolution(), res);
    assert!(f.data.chunks_exact(4).all(|p| p == [20, 40, 60, 255]));
}

#[test]
fn blank_and_unresolvable_elements_are_skipped() {
    let styles = StyleConfig::default();
    let mut r = fontless(&styles);
    let res = Resolution { width: 6, height: 6 };
    let elements = [
        Element::base("   ", 0, &styles),
        // No fonts in the database: drawing fails and the element is skipped.
        Element::base("word", 1, &styles),
    ];
    let f = r.rasterize(&elements, res, Rgba8::BLACK).unwrap();
    assert!(f.data.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
    assert_eq!(r.cached_fonts(), 0);
}

#[test]
fn surfaces_are_pooled_across_frames() {
    let styles = StyleConfig::default();
    let mut r = fontless(&styles);
    let res = Resolution { width: 4, height: 4 };
    for _ in 0..3 {
        r.rasterize(&[], res, Rgba8::BLACK).unwrap();
    }
    let st = r.pool.stats();
    assert_eq!(st.alloc_surfaces, 1);
    assert_eq!(st.reused_surfaces, 2);
}

#[test]
fn shadow_defaults() {
    let s = Shadow::from_params(&EffectParams::new());
    assert_eq!((s.offset_x, s.offset_y), (2.0, 2.0));
    assert_eq!(s.color, Rgba8::new(0, 0, 0, 127));

    let mut p = EffectParams::new();
    p.insert("offsetX".into(), serde_json::json!(4));
    p.insert("color".into(), serde_json::json!([0, 0, 0, 180]));
    let s = Shadow::from_params(&p);
    assert_eq!(s.offset_x, 4.0);
    assert_eq!(s.color, Rgba8::new(0, 0, 0, 180));
}

#[test]
fn cue_box_requires_background_color() {
    let mut styles = StyleConfig::default();
    assert!(CueBox::from_styles(&styles).is_none());

    styles.cue_background = Some("rgba(0, 0, 0, 0.5)".to_string());
    styles.padding = Some((0.4, -1.0));
    styles.border_radius = Some(6.0);
    let cue = CueBox::from_styles(&styles).unwrap();
    assert_eq!(cue.color, Rgba8::new(0, 0, 0, 127));
    assert_eq!((cue.pad_x, cue.pad_y, cue.radius), (0.4, 0.0, 6.0));
}
