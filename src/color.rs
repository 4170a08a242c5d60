// color.rs

use plotters::style::RGBColor;

// Names where the X11 palette used by R disagrees with CSS. Everything else
// resolves through the CSS named-colour table.
const X11_OVERRIDES: &[(&str, (u8, u8, u8))] = &[
    ("gray", (190, 190, 190)),
    ("grey", (190, 190, 190)),
    ("green", (0, 255, 0)),
    ("maroon", (176, 48, 96)),
    ("purple", (160, 32, 240)),
];

/// Parses a colour specification as written in a name table.
///
/// Accepts `#RGB`, `#RRGGBB`, `#RRGGBBAA` (alpha is ignored), any CSS/X11
/// colour name, or `grayN`/`greyN` with `N` in `0..=100`. Matching is
/// case-insensitive.
pub(crate) fn parse_color(spec: &str) -> Result<RGBColor, String> {
    let lowered = spec.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Err("empty colour specification".to_string());
    }

    if let Some(hex) = lowered.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| format!("invalid hex colour '{}'", spec));
    }

    if let Some(&(_, (r, g, b))) = X11_OVERRIDES.iter().find(|(name, _)| *name == lowered) {
        return Ok(RGBColor(r, g, b));
    }

    if let Some(level) = lowered
        .strip_prefix("gray")
        .or_else(|| lowered.strip_prefix("grey"))
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|&n| n <= 100)
    {
        let v = (f64::from(level) * 255.0 / 100.0).round() as u8;
        return Ok(RGBColor(v, v, v));
    }

    // Bare hex digits ("bad", "c0ffee") are not names.
    let is_name = lowered.bytes().all(|b| b.is_ascii_alphabetic())
        && !lowered.bytes().all(|b| b.is_ascii_hexdigit());
    if is_name {
        if let Ok(color) = csscolorparser::parse(&lowered) {
            let [r, g, b, _] = color.to_rgba8();
            return Ok(RGBColor(r, g, b));
        }
    }

    Err(format!("unknown colour '{}'", spec))
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|c| c * 17);
            Some(RGBColor(expand(0)?, expand(1)?, expand(2)?))
        }
        6 | 8 => Some(RGBColor(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(parse_color("red").unwrap(), RGBColor(255, 0, 0));
        assert_eq!(parse_color("Blue").unwrap(), RGBColor(0, 0, 255));
        assert_eq!(parse_color("DarkGreen").unwrap(), RGBColor(0, 100, 0));
    }

    #[test]
    fn parses_full_named_palette() {
        assert_eq!(parse_color("royalblue").unwrap(), RGBColor(65, 105, 225));
        assert_eq!(parse_color("DarkOrchid").unwrap(), RGBColor(153, 50, 204));
        assert_eq!(parse_color("seagreen").unwrap(), RGBColor(46, 139, 87));
        assert_eq!(parse_color("lightslategrey").unwrap(), RGBColor(119, 136, 153));
    }

    #[test]
    fn x11_names_win_over_css() {
        assert_eq!(parse_color("green").unwrap(), RGBColor(0, 255, 0));
        assert_eq!(parse_color("gray").unwrap(), RGBColor(190, 190, 190));
        assert_eq!(parse_color("purple").unwrap(), RGBColor(160, 32, 240));
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color("#ff8000").unwrap(), RGBColor(255, 128, 0));
        assert_eq!(parse_color("#F80").unwrap(), RGBColor(255, 136, 0));
        assert_eq!(parse_color("#00000080").unwrap(), RGBColor(0, 0, 0));
    }

    #[test]
    fn parses_numbered_grays() {
        assert_eq!(parse_color("gray0").unwrap(), RGBColor(0, 0, 0));
        assert_eq!(parse_color("grey100").unwrap(), RGBColor(255, 255, 255));
        assert_eq!(parse_color("gray50").unwrap(), RGBColor(128, 128, 128));
        assert!(parse_color("gray101").is_err());
    }

    #[test]
    fn rejects_unknown_specifications() {
        assert!(parse_color("").is_err());
        assert!(parse_color("notacolour").is_err());
        assert!(parse_color("#12").is_err());
        assert!(parse_color("#gggggg").is_err());
        assert!(parse_color("bad").is_err());
        assert!(parse_color("rgb(1,2,3)").is_err());
    }
}
