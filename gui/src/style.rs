use iced::widget::container;
use iced::{Background, Border, Color, Theme};
use tracing::warn;

pub const WARNING_COLOR: Color = Color {
    r: 0.86,
    g: 0.24,
    b: 0.24,
    a: 1.0,
};
const FALLBACK_COLOR: Color = Color {
    r: 0.0,
    g: 0.545,
    b: 0.545,
    a: 1.0,
};

/// Parses a CSS colour name from the built-in palette or a `#rrggbb` value.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel =
            |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        return Some(Color::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }

    let rgb = match value.to_ascii_lowercase().as_str() {
        "darkcyan" => (0, 139, 139),
        "mediumpurple" => (147, 112, 219),
        "tan" => (210, 180, 140),
        "orange" => (255, 165, 0),
        "crimson" => (220, 20, 60),
        "teal" => (0, 128, 128),
        "olive" => (128, 128, 0),
        "steelblue" => (70, 130, 180),
        "indianred" => (205, 92, 92),
        "seagreen" => (46, 139, 87),
        _ => return None,
    };
    Some(Color::from_rgb8(rgb.0, rgb.1, rgb.2))
}

/// Resolves configured colour names, skipping the ones that cannot be parsed.
pub fn palette(names: &[String]) -> Vec<Color> {
    let colors: Vec<Color> = names
        .iter()
        .filter_map(|name| {
            let color = parse_color(name);
            if color.is_none() {
                warn!("Ignoring unknown tag colour '{}'", name);
            }
            color
        })
        .collect();

    if colors.is_empty() {
        vec![FALLBACK_COLOR]
    } else {
        colors
    }
}

/// Colour of the tag at `index`, cycling through the palette.
pub fn tag_color(palette: &[Color], index: usize) -> Color {
    if palette.is_empty() {
        FALLBACK_COLOR
    } else {
        palette[index % palette.len()]
    }
}

/// Rounded, filled background for subreddit and genre pills.
pub struct PillStyle(pub Color);

impl container::StyleSheet for PillStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: Some(Color::WHITE),
            background: Some(Background::Color(self.0)),
            border: Border::with_radius(12.0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_and_hex_colors() {
        assert_eq!(parse_color("crimson"), Some(Color::from_rgb8(220, 20, 60)));
        assert_eq!(parse_color(" DarkCyan "), Some(Color::from_rgb8(0, 139, 139)));
        assert_eq!(parse_color("#ff8800"), Some(Color::from_rgb8(255, 136, 0)));
        assert_eq!(parse_color("#ff88"), None);
        assert_eq!(parse_color("#gg0000"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_palette_skips_unknown_names() {
        let names = vec!["tan".to_string(), "nope".to_string(), "olive".to_string()];
        assert_eq!(
            palette(&names),
            vec![Color::from_rgb8(210, 180, 140), Color::from_rgb8(128, 128, 0)]
        );
        assert_eq!(palette(&["nope".to_string()]), vec![FALLBACK_COLOR]);
    }

    #[test]
    fn test_tag_color_cycles() {
        let colors = palette(&["tan".to_string(), "olive".to_string(), "teal".to_string()]);
        assert_eq!(tag_color(&colors, 0), colors[0]);
        assert_eq!(tag_color(&colors, 4), colors[1]);
        assert_eq!(tag_color(&[], 3), FALLBACK_COLOR);
    }
}
