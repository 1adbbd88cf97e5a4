use super::*;

fn device() -> ComputeDevice {
    ComputeDevice::new("cpu:2", 1 << 24).unwrap()
}

fn tensor(width: u32, height: u32, fill: f32) -> DeviceTensor {
    DeviceTensor {
        width,
        height,
        data: vec![fill; width as usize * height as usize * 4],
    }
}

#[test]
fn radius_is_clamped() {
    assert_eq!(BlurEffect::new(-3.0).radius(), 0);
    assert_eq!(BlurEffect::new(500.0).radius(), 50);
    assert_eq!(BlurEffect::new(f64::NAN).radius(), 0);
    assert_eq!(BlurEffect::from_params(&EffectParams::new()).radius(), 5);
}

#[test]
fn kernel_is_normalized_and_symmetric() {
    let k = gaussian_kernel(7);
    assert_eq!(k.len(), 15);
    let sum: f32 = k.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    assert!((k[0] - k[14]).abs() < 1e-7);
    assert!(k[7] > k[6]);
}

#[test]
fn zero_radius_is_identity() {
    let d = device();
    let mut t = tensor(3, 2, 0.0);
    t.data[5] = 99.0;
    let out = BlurEffect::new(0.0).apply(&d, t.clone()).unwrap();
    assert_eq!(out, t);
}

#[test]
fn interior_of_constant_image_is_preserved() {
    let d = device();
    let t = tensor(21, 21, 100.0);
    let out = gaussian_blur(&d, &t, 3).unwrap();
    let center = (10 * 21 + 10) * 4;
    assert!((out.data[center] - 100.0).abs() < 1e-3);
    // Zero padding darkens the corners.
    assert!(out.data[0] < 100.0);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let d = device();
    let mut t = tensor(9, 9, 0.0);
    let center = (4 * 9 + 4) * 4;
    t.data[center] = 255.0;
    let out = gaussian_blur(&d, &t, 2).unwrap();
    assert!(out.data[center] < 255.0);
    assert!(out.data[center + 4] > 0.0);
    let total: f32 = out.data.iter().step_by(4).sum();
    assert!((total - 255.0).abs() < 0.05);
}

#[test]
fn mis_sized_input_is_an_effect_error() {
    let d = device();
    let t = DeviceTensor {
        width: 2,
        height: 2,
        data: vec![0.0; 3],
    };
    assert!(matches!(
        gaussian_blur(&d, &t, 2),
        Err(TypemotionError::Effect(_))
    ));
}

#[test]
fn describe_reports_radius() {
    let v = BlurEffect::new(12.0).describe();
    assert_eq!(v["name"], "blur");
    assert_eq!(v["radius"], 12);
}
