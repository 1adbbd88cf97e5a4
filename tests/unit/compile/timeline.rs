use std::collections::BTreeMap;

use serde_json::json;

use super::*;
use crate::animation::keyframes::Properties;
use crate::model::transcript::{Segment, Word};

fn props(v: serde_json::Value) -> Properties {
    serde_json::from_value(v).unwrap()
}

fn fade(duration: f64, from: serde_json::Value, to: serde_json::Value) -> Animation {
    let mut kf = BTreeMap::new();
    kf.insert("0%".to_string(), props(from));
    kf.insert("100%".to_string(), props(to));
    Animation::word(kf, duration)
}

fn styles(fps: u32, animations: Vec<Animation>) -> StyleConfig {
    StyleConfig {
        fps,
        resolution: Resolution { width: 100, height: 50 },
        animations,
        ..StyleConfig::default()
    }
}

fn one_word(start: f64, end: f64, duration: f64) -> Transcript {
    Transcript::new(
        vec![Segment::from_words(start, end, vec![Word::new("w", start, end)])],
        duration,
    )
}

#[test]
fn frame_count_and_cadence() {
    for (d, fps) in [(0.0, 30), (1.0, 30), (2.5, 24), (1.999, 60), (10.0, 1)] {
        let tl = compile_timeline(&one_word(0.0, 0.5, d), &styles(fps, vec![])).unwrap();
        let expected = (d * f64::from(fps)).floor() as usize + 1;
        assert_eq!(tl.frame_count(), expected, "d={d} fps={fps}");
        for (i, f) in tl.frames.iter().enumerate() {
            assert_eq!(f.index, i);
            assert!((f.timestamp - i as f64 / f64::from(fps)).abs() < 1e-9);
        }
        assert!(tl.frames.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}

#[test]
fn word_activity_is_inclusive_and_bounded_by_segment() {
    let t = Transcript::new(
        vec![Segment::from_words(
            0.0,
            0.5,
            vec![Word::new("a", 0.1, 0.3), Word::new("b", 0.4, 0.9)],
        )],
        1.0,
    );
    let tl = compile_timeline(&t, &styles(10, vec![])).unwrap();
    let texts = |i: usize| -> Vec<&str> {
        tl.frames[i].elements.iter().map(|e| e.text.as_str()).collect()
    };
    assert!(texts(0).is_empty());
    assert_eq!(texts(1), vec!["a"]);
    assert_eq!(texts(3), vec!["a"]);
    assert_eq!(texts(4), vec!["b"]);
    assert_eq!(texts(5), vec!["b"]);
    // Segment ended even though the word did not.
    assert!(texts(6).is_empty());
}

#[test]
fn elements_keep_segment_then_word_order() {
    let t = Transcript::new(
        vec![
            Segment::from_words(0.0, 1.0, vec![Word::new("late", 0.5, 1.0), Word::new("x", 0.0, 1.0)]),
            Segment::from_words(0.0, 1.0, vec![Word::new("early", 0.0, 1.0)]),
        ],
        1.0,
    );
    let tl = compile_timeline(&t, &styles(2, vec![])).unwrap();
    let texts: Vec<&str> = tl.frames[1].elements.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["late", "x", "early"]);
}

#[test]
fn animation_progress_interpolates() {
    let tl = compile_timeline(
        &one_word(0.0, 2.0, 2.0),
        &styles(4, vec![fade(1.0, json!({"opacity": 0}), json!({"opacity": 1}))]),
    )
    .unwrap();
    let op = |i: usize| tl.frames[i].elements[0].opacity;
    assert_eq!(op(0), 0.0);
    assert_eq!(op(1), 0.25);
    assert_eq!(op(2), 0.5);
    assert_eq!(op(3), 0.75);
}

#[test]
fn terminal_keyframe_is_held_after_completion() {
    let tl = compile_timeline(
        &one_word(0.0, 2.0, 2.0),
        &styles(
            4,
            vec![fade(0.5, json!({"opacity": 0, "scale": 0.5}), json!({"opacity": 0.6, "scale": 2.0}))],
        ),
    )
    .unwrap();
    for f in &tl.frames[2..] {
        let e = &f.elements[0];
        assert_eq!(e.opacity, 0.6);
        assert_eq!(e.scale, 2.0);
    }
}

#[test]
fn later_animations_win_on_conflicts() {
    let tl = compile_timeline(
        &one_word(0.0, 1.0, 1.0),
        &styles(
            2,
            vec![
                fade(0.5, json!({"opacity": 0, "x": 5}), json!({"opacity": 0, "x": 5})),
                fade(0.5, json!({"opacity": 1}), json!({"opacity": 1})),
            ],
        ),
    )
    .unwrap();
    let e = &tl.frames[1].elements[0];
    assert_eq!(e.opacity, 1.0);
    assert_eq!(e.x, 5.0);
}

#[test]
fn delay_holds_first_keyframe_and_stagger_offsets_words() {
    let mut anim = fade(1.0, json!({"opacity": 0}), json!({"opacity": 1}));
    anim.delay = 0.5;
    anim.stagger = Some(0.5);
    let t = Transcript::new(
        vec![Segment::from_words(
            0.0,
            4.0,
            vec![Word::new("a", 0.0, 4.0), Word::new("b", 0.0, 4.0)],
        )],
        4.0,
    );
    let tl = compile_timeline(&t, &styles(2, vec![anim])).unwrap();
    // t = 1.0: word 0 is halfway, word 1 (one stagger later) has not started.
    let f = &tl.frames[2];
    assert_eq!(f.elements[0].opacity, 0.5);
    assert_eq!(f.elements[1].opacity, 0.0);
}

#[test]
fn non_word_selectors_are_ignored() {
    let mut anim = fade(1.0, json!({"opacity": 0}), json!({"opacity": 0}));
    anim.selector = "segment".to_string();
    let tl = compile_timeline(&one_word(0.0, 1.0, 1.0), &styles(2, vec![anim])).unwrap();
    assert_eq!(tl.frames[0].elements[0].opacity, 1.0);
}

#[test]
fn animation_without_endpoints_fails_to_compile() {
    let mut kf = BTreeMap::new();
    kf.insert("50%".to_string(), props(json!({"opacity": 0})));
    let anim = Animation::word(kf, 1.0);
    assert!(compile_timeline(&one_word(0.0, 1.0, 1.0), &styles(2, vec![anim])).is_err());
}

#[test]
fn default_positions_center_on_canvas() {
    let tl = compile_timeline(&one_word(0.0, 1.0, 1.0), &styles(2, vec![])).unwrap();
    let e = &tl.frames[0].elements[0];
    assert_eq!((e.x, e.y), (50.0, 25.0));
    assert_eq!(tl.element_count(), 3);
}
