use std::collections::BTreeMap;

use super::*;
use crate::foundation::core::Resolution;
use crate::model::style::Animation;
use crate::model::transcript::Word;

fn seg(start: f64, end: f64, words: Vec<Word>) -> Segment {
    Segment::from_words(start, end, words)
}

#[test]
fn degenerate_segment_is_rebuilt_from_words() {
    let t = Transcript::new(
        vec![seg(4.0, 4.0, vec![Word::new("a", 2.0, 3.0), Word::new("b", 3.0, 5.0)])],
        6.0,
    );
    let v = validate_transcript(&t).unwrap();
    assert_eq!(v.segments[0].start, 2.0);
    assert_eq!(v.segments[0].end, 5.0);
}

#[test]
fn inverted_word_gets_minimum_span() {
    let t = Transcript::new(vec![seg(0.0, 3.0, vec![Word::new("a", 1.0, 0.5)])], 3.0);
    let v = validate_transcript(&t).unwrap();
    let w = &v.segments[0].words[0];
    assert_eq!(w.start, 1.0);
    assert!((w.end - 1.01).abs() < 1e-12);
}

#[test]
fn zero_length_word_is_padded_within_segment() {
    let t = Transcript::new(
        vec![seg(0.0, 1.005, vec![Word::new("a", 1.0, 1.0), Word::new("b", 0.2, 0.2)])],
        2.0,
    );
    let v = validate_transcript(&t).unwrap();
    assert_eq!(v.segments[0].words[0].end, 1.005);
    assert!((v.segments[0].words[1].end - 0.21).abs() < 1e-12);
}

#[test]
fn segment_expands_to_cover_words_but_never_shrinks() {
    let t = Transcript::new(
        vec![seg(1.0, 2.0, vec![Word::new("a", 0.5, 1.5), Word::new("b", 1.6, 2.5)])],
        3.0,
    );
    let v = validate_transcript(&t).unwrap();
    assert_eq!(v.segments[0].start, 0.5);
    assert_eq!(v.segments[0].end, 2.5);

    let t = Transcript::new(vec![seg(0.0, 9.0, vec![Word::new("a", 1.0, 2.0)])], 9.0);
    let v = validate_transcript(&t).unwrap();
    assert_eq!((v.segments[0].start, v.segments[0].end), (0.0, 9.0));
}

#[test]
fn negative_start_clamps_and_empty_segments_drop() {
    let t = Transcript::new(
        vec![
            seg(-1.0, 2.0, vec![Word::new("a", 0.0, 1.0)]),
            seg(2.0, 3.0, vec![]),
        ],
        3.0,
    );
    let v = validate_transcript(&t).unwrap();
    assert_eq!(v.segments.len(), 1);
    assert_eq!(v.segments[0].start, 0.0);
}

#[test]
fn input_is_left_untouched() {
    let t = Transcript::new(vec![seg(3.0, 1.0, vec![Word::new("a", 1.0, 2.0)])], 3.0);
    let before = t.clone();
    let _ = validate_transcript(&t).unwrap();
    assert_eq!(t, before);
}

#[test]
fn revalidation_is_idempotent() {
    let t = Transcript::new(
        vec![
            seg(-0.5, -0.5, vec![Word::new("a", 0.0, 0.0), Word::new("b", 0.3, 0.1)]),
            seg(1.0, 2.0, vec![Word::new("c", 2.5, 2.5)]),
            // The zero-length word comes before the word that extends the segment.
            seg(0.0, 1.0, vec![Word::new("d", 2.5, 2.5), Word::new("e", 2.0, 3.0)]),
        ],
        3.0,
    );
    let once = validate_transcript(&t).unwrap();
    let twice = validate_transcript(&once).unwrap();
    assert_eq!(once, twice);
    assert!((once.segments[2].words[0].end - 2.51).abs() < 1e-12);
    assert_eq!(once.segments[2].end, 3.0);
}

#[test]
fn empty_or_fully_invalid_transcripts_fail() {
    let t = Transcript::new(vec![], 1.0);
    assert!(matches!(validate_transcript(&t), Err(TypemotionError::Validation(_))));

    let t = Transcript::new(vec![seg(0.0, 1.0, vec![])], 1.0);
    assert!(matches!(validate_transcript(&t), Err(TypemotionError::Validation(_))));
}

fn anim(duration: f64, with_keys: bool) -> Animation {
    let mut kf = BTreeMap::new();
    if with_keys {
        kf.insert("0%".to_string(), BTreeMap::new());
        kf.insert("100%".to_string(), BTreeMap::new());
    }
    Animation::word(kf, duration)
}

#[test]
fn style_checks() {
    assert!(validate_styles(&StyleConfig::default()).is_ok());

    let bad = [
        StyleConfig { fps: 0, ..StyleConfig::default() },
        StyleConfig { font_size: 0.0, ..StyleConfig::default() },
        StyleConfig { resolution: Resolution { width: 0, height: 10 }, ..StyleConfig::default() },
        StyleConfig { animations: vec![anim(0.0, true)], ..StyleConfig::default() },
        StyleConfig { animations: vec![anim(0.5, false)], ..StyleConfig::default() },
    ];
    for s in bad {
        assert!(matches!(validate_styles(&s), Err(TypemotionError::Validation(_))));
    }
}
