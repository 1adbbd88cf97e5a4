use super::*;

fn device() -> ComputeDevice {
    ComputeDevice::new("cpu:1", 1 << 20).unwrap()
}

fn one_px(px: [f32; 4]) -> DeviceTensor {
    DeviceTensor {
        width: 1,
        height: 1,
        data: px.to_vec(),
    }
}

#[test]
fn neutral_grade_is_identity() {
    let d = device();
    let t = one_px([10.0, 128.0, 250.0, 90.0]);
    let g = ColorGradeEffect::from_params(&EffectParams::new());
    assert_eq!(g, ColorGradeEffect::default());
    assert_eq!(g.apply(&d, t.clone()).unwrap(), t);
}

#[test]
fn brightness_offsets_rgb_only() {
    let d = device();
    let out = ColorGradeEffect::new(0.1, 1.0, 1.0)
        .apply(&d, one_px([100.0, 100.0, 100.0, 50.0]))
        .unwrap();
    assert!((out.data[0] - 125.5).abs() < 1e-3);
    assert_eq!(out.data[3], 50.0);
}

#[test]
fn zero_saturation_is_greyscale() {
    let d = device();
    let out = ColorGradeEffect::new(0.0, 1.0, 0.0)
        .apply(&d, one_px([255.0, 0.0, 0.0, 255.0]))
        .unwrap();
    assert!((out.data[0] - out.data[1]).abs() < 1e-3);
    assert!((out.data[1] - out.data[2]).abs() < 1e-3);
    assert!((out.data[0] - 0.299 * 255.0).abs() < 1e-2);
}

#[test]
fn contrast_pushes_away_from_mid_grey_and_clamps() {
    let d = device();
    let out = ColorGradeEffect::new(0.0, 3.0, 1.0)
        .apply(&d, one_px([200.0, 60.0, 127.5, 255.0]))
        .unwrap();
    assert_eq!(out.data[0], 255.0);
    assert_eq!(out.data[1], 0.0);
    assert!((out.data[2] - 127.5).abs() < 1e-3);
}

#[test]
fn non_finite_parameters_fall_back() {
    let g = ColorGradeEffect::new(f64::NAN, f64::INFINITY, -2.0);
    assert_eq!(g.describe()["contrast"], 1.0);
    assert_eq!(g.describe()["saturation"], 0.0);
}
