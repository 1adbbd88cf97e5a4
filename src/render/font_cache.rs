use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{TypemotionError, TypemotionResult};

/// Bounded map that evicts the oldest inserted entry once over capacity.
///
/// Lookups do not refresh an entry's position.
#[derive(Debug)]
pub(crate) struct FifoCache<K, V> {
    capacity: usize,
    order: VecDeque<K>,
    map: HashMap<K, V>,
}

impl<K: Clone + Eq + Hash, V> FifoCache<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            map: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Insert `value`; returns the evicted entry, if any.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.map.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        if self.map.len() > self.capacity {
            let oldest = self.order.pop_front()?;
            let v = self.map.remove(&oldest)?;
            return Some((oldest, v));
        }
        None
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TypefaceKey {
    pub(crate) family: String,
    pub(crate) weight: u16,
    pub(crate) italic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FontKey {
    face: TypefaceKey,
    size_bits: u32,
}

/// Font face bytes resolved from the font database.
pub(crate) struct Typeface {
    pub(crate) key: TypefaceKey,
    pub(crate) bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub(crate) index: u32,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("key", &self.key)
            .field("bytes", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

/// A typeface at a specific pixel size.
#[derive(Clone, Debug)]
pub(crate) struct SizedFont {
    pub(crate) typeface: Arc<Typeface>,
    pub(crate) size: f32,
}

/// Typeface and sized-font cache backed by a `fontdb` database.
///
/// Typefaces are keyed by `(family, weight, italic)` and kept for the cache lifetime. Sized fonts
/// are keyed by `(family, size, weight, italic)` and evicted oldest-first.
pub(crate) struct FontCache {
    db: usvg::fontdb::Database,
    typefaces: HashMap<TypefaceKey, Arc<Typeface>>,
    fonts: FifoCache<FontKey, SizedFont>,
}

impl FontCache {
    /// System fonts plus every `.ttf`/`.otf`/`.ttc` in `font_dirs`.
    pub(crate) fn new(font_dirs: &[PathBuf], capacity: usize) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self::with_database(db, capacity)
    }

    pub(crate) fn with_database(db: usvg::fontdb::Database, capacity: usize) -> Self {
        Self {
            db,
            typefaces: HashMap::new(),
            fonts: FifoCache::new(capacity),
        }
    }

    pub(crate) fn face_count(&self) -> usize {
        self.db.len()
    }

    pub(crate) fn cached_fonts(&self) -> usize {
        self.fonts.len()
    }

    /// Resolve `family` at `size`, falling back to sans-serif and then to any face.
    pub(crate) fn font(
        &mut self,
        family: &str,
        size: f32,
        weight: u16,
        italic: bool,
    ) -> TypemotionResult<SizedFont> {
        if !(size.is_finite() && size > 0.0) {
            return Err(TypemotionError::font(format!(
                "font size must be finite and > 0, got {size}"
            )));
        }
        let face = TypefaceKey {
            family: family.to_string(),
            weight,
            italic,
        };
        let key = FontKey {
            face: face.clone(),
            size_bits: size.to_bits(),
        };
        if let Some(f) = self.fonts.get(&key) {
            return Ok(f.clone());
        }

        let typeface = self.typeface(face)?;
        let font = SizedFont { typeface, size };
        if let Some((evicted, _)) = self.fonts.insert(key, font.clone()) {
            tracing::debug!(family = %evicted.face.family, "font cache full, evicted oldest");
        }
        Ok(font)
    }

    fn typeface(&mut self, key: TypefaceKey) -> TypemotionResult<Arc<Typeface>> {
        if let Some(t) = self.typefaces.get(&key) {
            return Ok(t.clone());
        }

        let families = [
            usvg::fontdb::Family::Name(&key.family),
            usvg::fontdb::Family::SansSerif,
        ];
        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight(key.weight),
            stretch: usvg::fontdb::Stretch::Normal,
            style: if key.italic {
                usvg::fontdb::Style::Italic
            } else {
                usvg::fontdb::Style::Normal
            },
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
            .ok_or_else(|| {
                TypemotionError::font(format!("no font face available for '{}'", key.family))
            })?;

        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| {
                TypemotionError::font(format!("failed to read font data for '{}'", key.family))
            })?;

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.clone()), index);
        let typeface = Arc::new(Typeface {
            key: key.clone(),
            bytes: Arc::new(bytes),
            index,
            font,
        });
        tracing::debug!(family = %key.family, weight = key.weight, "loaded typeface");
        self.typefaces.insert(key, typeface.clone());
        Ok(typeface)
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/font_cache.rs"]
mod tests;
