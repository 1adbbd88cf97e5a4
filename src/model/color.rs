use crate::foundation::core::Rgba8;

/// Parse a CSS-like color string.
///
/// Accepts `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)` and `rgba(r, g, b, a)` with `a` in `[0, 1]`.
/// Anything else resolves to opaque white.
pub fn parse_color(s: &str) -> Rgba8 {
    try_parse_color(s).unwrap_or(Rgba8::WHITE)
}

fn try_parse_color(s: &str) -> Option<Rgba8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(body) = strip_fn(s, "rgba") {
        let parts = split_args(body)?;
        if parts.len() != 4 {
            return None;
        }
        let a: f64 = parts[3].parse().ok()?;
        return Some(Rgba8::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            (a * 255.0).clamp(0.0, 255.0) as u8,
        ));
    }
    if let Some(body) = strip_fn(s, "rgb") {
        let parts = split_args(body)?;
        if parts.len() != 3 {
            return None;
        }
        return Some(Rgba8::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            255,
        ));
    }
    None
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn strip_fn<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn split_args(body: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

fn channel(s: &str) -> Option<u8> {
    let v: f64 = s.parse().ok()?;
    Some(v.clamp(0.0, 255.0) as u8)
}

/// Resolve a color from a property value: a color string or an `[r, g, b(, a)]` array.
///
/// Arrays show up when two array colors were interpolated by the keyframe engine.
pub fn color_from_value(v: &serde_json::Value) -> Option<Rgba8> {
    match v {
        serde_json::Value::String(s) => Some(parse_color(s)),
        serde_json::Value::Array(items) if items.len() == 3 || items.len() == 4 => {
            let mut ch = [255u8; 4];
            for (slot, item) in ch.iter_mut().zip(items) {
                *slot = item.as_f64()?.round().clamp(0.0, 255.0) as u8;
            }
            Some(Rgba8::from(ch))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/color.rs"]
mod tests;
