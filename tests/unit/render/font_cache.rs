use super::*;

#[test]
fn fifo_evicts_oldest_insert() {
    let mut c = FifoCache::new(2);
    assert!(c.insert("a", 1).is_none());
    assert!(c.insert("b", 2).is_none());
    // Reading "a" does not protect it.
    assert_eq!(c.get(&"a"), Some(&1));
    assert_eq!(c.insert("c", 3), Some(("a", 1)));
    assert!(c.get(&"a").is_none());
    assert!(c.get(&"b").is_some());
    assert!(c.get(&"c").is_some());
    assert_eq!(c.len(), 2);
}

#[test]
fn fifo_reinsert_keeps_position() {
    let mut c = FifoCache::new(2);
    c.insert("a", 1);
    c.insert("b", 2);
    assert!(c.insert("a", 10).is_none());
    assert_eq!(c.insert("c", 3), Some(("a", 10)));
}

#[test]
fn empty_database_is_a_font_error() {
    let mut fc = FontCache::with_database(usvg::fontdb::Database::new(), 4);
    let err = fc.font("Arial", 32.0, 400, false).unwrap_err();
    assert!(matches!(err, TypemotionError::Font(_)));
    assert!(err.is_recoverable());
    assert_eq!(fc.cached_fonts(), 0);
}

#[test]
fn invalid_size_is_rejected() {
    let mut fc = FontCache::with_database(usvg::fontdb::Database::new(), 4);
    assert!(fc.font("Arial", 0.0, 400, false).is_err());
    assert!(fc.font("Arial", f32::NAN, 400, false).is_err());
}

#[test]
fn missing_font_dir_is_tolerated() {
    let fc = FontCache::new(&[PathBuf::from("/no/such/font/dir")], 4);
    assert_eq!(fc.cached_fonts(), 0);
}
