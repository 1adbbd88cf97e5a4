use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(TypemotionError::parse("x").to_string().contains("parse error:"));
    assert!(
        TypemotionError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TypemotionError::timeline("x")
            .to_string()
            .contains("timeline error:")
    );
    assert!(TypemotionError::render("x").to_string().contains("render error:"));
    assert!(TypemotionError::font("x").to_string().contains("font error:"));
    assert!(TypemotionError::effect("x").to_string().contains("effect error:"));
    assert!(TypemotionError::gpu("x").to_string().contains("gpu error:"));
    assert!(
        TypemotionError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
}

#[test]
fn only_frame_level_errors_are_recoverable() {
    assert!(TypemotionError::render("x").is_recoverable());
    assert!(TypemotionError::font("x").is_recoverable());
    assert!(TypemotionError::effect("x").is_recoverable());

    assert!(!TypemotionError::parse("x").is_recoverable());
    assert!(!TypemotionError::validation("x").is_recoverable());
    assert!(!TypemotionError::encoding("x").is_recoverable());
    assert!(!TypemotionError::gpu("x").is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TypemotionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
