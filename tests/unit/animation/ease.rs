use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert!(ease.apply(0.0).abs() < 1e-9, "{} at 0", ease.name());
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{} at 1", ease.name());
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in Ease::ALL.into_iter().filter(|e| {
        !e.overshoots() && !matches!(e, Ease::InBounce | Ease::OutBounce | Ease::InOutBounce)
    }) {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{}", ease.name());
        assert!(b < c, "{}", ease.name());
    }
}

#[test]
fn overshoot_curves_leave_unit_range() {
    assert!(Ease::InBack.apply(0.2) < 0.0);
    assert!(Ease::OutBack.apply(0.8) > 1.0);
    assert!((0..100).map(|i| Ease::OutElastic.apply(f64::from(i) / 100.0)).any(|v| v > 1.0));
}

#[test]
fn bounce_hits_segment_offsets() {
    assert!((Ease::OutBounce.apply(1.5 / 2.75) - 0.75).abs() < 1e-12);
    assert!((Ease::OutBounce.apply(2.25 / 2.75) - 0.9375).abs() < 1e-12);
    assert!((Ease::OutBounce.apply(2.625 / 2.75) - 0.984375).abs() < 1e-12);
}

#[test]
fn lookup_is_case_insensitive_with_aliases() {
    assert_eq!(Ease::from_name("easeOutCubic"), Ease::OutCubic);
    assert_eq!(Ease::from_name("EASEOUTCUBIC"), Ease::OutCubic);
    assert_eq!(Ease::from_name("easeInOut"), Ease::InOutCubic);
    assert_eq!(Ease::from_name("easein"), Ease::InCubic);
    assert_eq!(Ease::from_name("Linear"), Ease::Linear);
}

#[test]
fn unknown_names_fall_back_to_linear() {
    assert_eq!(Ease::from_name("wobble"), Ease::Linear);
    assert_eq!(Ease::from_name(""), Ease::Linear);
}

#[test]
fn names_round_trip_through_lookup() {
    for ease in Ease::ALL {
        assert_eq!(Ease::from_name(ease.name()), ease);
    }
}
