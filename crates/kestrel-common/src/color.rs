//! Colors are packed as `0xAARRGGBB`.

/// Parses `#RGB`, `#RRGGBB` or `#AARRGGBB` (the `#` is optional).
pub fn parse_color(s: &str) -> Option<u32> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        3 => {
            let r = (value >> 8) & 0xF;
            let g = (value >> 4) & 0xF;
            let b = value & 0xF;
            Some(0xFF000000 | (r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11))
        }
        6 => Some(0xFF000000 | value),
        8 => Some(value),
        _ => None,
    }
}

/// Packs normalized `[r, g, b]` channels into an opaque color.
pub fn color_from_rgb(rgb: [f32; 3]) -> u32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    0xFF000000 | channel(rgb[0]) << 16 | channel(rgb[1]) << 8 | channel(rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_forms() {
        assert_eq!(parse_color("#FF0000"), Some(0xFFFF0000));
        assert_eq!(parse_color("1a1a1a"), Some(0xFF1A1A1A));
        assert_eq!(parse_color("#fff"), Some(0xFFFFFFFF));
        assert_eq!(parse_color("#1a9"), Some(0xFF11AA99));
    }

    #[test]
    fn parses_argb() {
        assert_eq!(parse_color("#80FF0000"), Some(0x80FF0000));
        assert_eq!(parse_color("00000000"), Some(0x00000000));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("#FFFF"), None);
        assert_eq!(parse_color("#+12345"), None);
        assert_eq!(parse_color("invalid"), None);
    }

    #[test]
    fn packs_float_channels() {
        assert_eq!(color_from_rgb([0.0, 0.5, 1.0]), 0xFF0080FF);
        assert_eq!(color_from_rgb([0.0, 2.0, -1.0]), 0xFF00FF00);
    }
}
