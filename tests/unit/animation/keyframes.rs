use serde_json::json;

use super::*;

fn kf(time: f64, v: Value) -> Keyframe {
    Keyframe::new(time, serde_json::from_value(v).unwrap()).unwrap()
}

fn fade() -> KeyframeInterpolator {
    KeyframeInterpolator::new(
        vec![kf(0.0, json!({"opacity": 0})), kf(1.0, json!({"opacity": 1}))],
        Ease::Linear,
    )
    .unwrap()
}

#[test]
fn linear_midpoint() {
    let p = fade().interpolate(0.5);
    assert_eq!(p["opacity"].as_f64(), Some(0.5));
}

#[test]
fn endpoints_match_keyframes() {
    let it = fade();
    assert_eq!(it.interpolate(0.0)["opacity"].as_f64(), Some(0.0));
    assert_eq!(it.interpolate(1.0)["opacity"].as_f64(), Some(1.0));
    assert_eq!(it.interpolate(-3.0)["opacity"].as_f64(), Some(0.0));
    assert_eq!(it.interpolate(7.0)["opacity"].as_f64(), Some(1.0));
}

#[test]
fn endpoints_return_keyframe_values_unchanged() {
    let it = KeyframeInterpolator::new(
        vec![
            kf(0.0, json!({"opacity": 0, "color": [255, 0, 0]})),
            kf(1.0, json!({"opacity": 1, "color": [0, 0, 255]})),
        ],
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(&it.interpolate(0.0), &it.keyframes()[0].properties);
    assert_eq!(&it.interpolate(1.0), it.terminal());
    assert_eq!(it.interpolate(1.0)["opacity"], json!(1));
}

#[test]
fn keyframes_are_sorted_on_construction() {
    let it = KeyframeInterpolator::new(
        vec![
            kf(1.0, json!({"x": 10})),
            kf(0.0, json!({"x": 0})),
            kf(0.5, json!({"x": 100})),
        ],
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(it.interpolate(0.25)["x"].as_f64(), Some(50.0));
    assert_eq!(it.interpolate(0.75)["x"].as_f64(), Some(55.0));
}

#[test]
fn missing_endpoints_are_rejected() {
    assert!(KeyframeInterpolator::new(vec![], Ease::Linear).is_err());
    assert!(
        KeyframeInterpolator::new(vec![kf(0.1, json!({})), kf(1.0, json!({}))], Ease::Linear)
            .is_err()
    );
    assert!(
        KeyframeInterpolator::new(vec![kf(0.0, json!({})), kf(0.9, json!({}))], Ease::Linear)
            .is_err()
    );
    assert!(Keyframe::new(1.5, Properties::new()).is_err());
}

#[test]
fn sequences_interpolate_elementwise() {
    let it = KeyframeInterpolator::new(
        vec![
            kf(0.0, json!({"color": [0, 0, 0], "pos": [[0, 0], [10, 10]]})),
            kf(1.0, json!({"color": [255, 100, 50], "pos": [[10, 20], [20, 30]]})),
        ],
        Ease::Linear,
    )
    .unwrap();
    let p = it.interpolate(0.5);
    assert_eq!(p["color"], json!([127.5, 50.0, 25.0]));
    assert_eq!(p["pos"], json!([[5.0, 10.0], [15.0, 20.0]]));
}

#[test]
fn mismatched_sequences_take_target() {
    let it = KeyframeInterpolator::new(
        vec![kf(0.0, json!({"c": [1, 2]})), kf(1.0, json!({"c": [3, 4, 5]}))],
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(it.interpolate(0.1)["c"], json!([3, 4, 5]));
}

#[test]
fn one_sided_keys_pass_through() {
    let it = KeyframeInterpolator::new(
        vec![
            kf(0.0, json!({"a": 1, "n": null})),
            kf(1.0, json!({"b": "x", "n": 4})),
        ],
        Ease::Linear,
    )
    .unwrap();
    let p = it.interpolate(0.3);
    assert_eq!(p["a"], json!(1));
    assert_eq!(p["b"], json!("x"));
    assert_eq!(p["n"], json!(4));
}

#[test]
fn strings_switch_after_half() {
    let it = KeyframeInterpolator::new(
        vec![kf(0.0, json!({"c": "#000000"})), kf(1.0, json!({"c": "#FFFFFF"}))],
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(it.interpolate(0.5)["c"], json!("#000000"));
    assert_eq!(it.interpolate(0.51)["c"], json!("#FFFFFF"));
}

#[test]
fn mixed_types_take_target() {
    let it = KeyframeInterpolator::new(
        vec![kf(0.0, json!({"v": true})), kf(1.0, json!({"v": {"k": 1}}))],
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(it.interpolate(0.1)["v"], json!({"k": 1}));
}

#[test]
fn overshoot_returns_last_keyframe_unmodified() {
    let it = KeyframeInterpolator::new(
        vec![
            kf(0.0, json!({"scale": 0.0})),
            kf(1.0, json!({"scale": 1.0, "tag": "end"})),
        ],
        Ease::OutBack,
    )
    .unwrap();
    let p = it.interpolate(0.8);
    assert_eq!(p, *it.terminal());
}

#[test]
fn eased_time_drives_bracket_search() {
    let it = KeyframeInterpolator::new(
        vec![kf(0.0, json!({"x": 0})), kf(1.0, json!({"x": 100}))],
        Ease::InQuad,
    )
    .unwrap();
    assert_eq!(it.interpolate(0.5)["x"].as_f64(), Some(25.0));
}
