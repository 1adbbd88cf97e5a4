use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
}

#[test]
fn unpremul_keeps_opaque_and_clears_transparent() {
    assert_eq!(unpremul_rgba8([10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(unpremul_rgba8([0, 0, 0, 0]), [0, 0, 0, 0]);

    // 200/100/50 premultiplied by 128.
    let u = unpremul_rgba8([100, 50, 25, 128]);
    for (got, want) in u.iter().zip([200, 100, 50]) {
        assert!((i32::from(*got) - want).abs() <= 2);
    }
    assert_eq!(u[3], 128);
}

#[test]
fn f32_to_u8_clamps_and_rejects_nan() {
    assert_eq!(f32_to_u8(-3.0), 0);
    assert_eq!(f32_to_u8(300.0), 255);
    assert_eq!(f32_to_u8(f32::NAN), 0);
    assert_eq!(f32_to_u8(12.6), 13);
}
