//! Rich-like style strings ("bright_red dim", "bold cyan on black") to ratatui styles

use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

use crate::shared::present::Tone;

/// Parse a whitespace separated style string. Unknown tokens are ignored.
pub fn parse_style(spec: &str) -> Style {
    let mut style = Style::default();
    let mut background = false;

    for token in spec.split_whitespace().map(str::to_ascii_lowercase) {
        if token == "on" {
            background = true;
            continue;
        }

        if let Some(modifier) = parse_modifier(&token) {
            style = style.add_modifier(modifier);
        } else if let Some(color) = parse_color(&token) {
            style = if background {
                style.bg(color)
            } else {
                style.fg(color)
            };
        }
        background = false;
    }

    style
}

/// Colour applied over the column style for a toned cell
pub fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Positive => Style::new().fg(Color::Green).add_modifier(Modifier::DIM),
        Tone::Negative => Style::new().fg(Color::Red).add_modifier(Modifier::DIM),
        Tone::Neutral => Style::new(),
    }
}

fn parse_modifier(token: &str) -> Option<Modifier> {
    match token {
        "bold" | "b" => Some(Modifier::BOLD),
        "dim" | "d" => Some(Modifier::DIM),
        "italic" | "i" => Some(Modifier::ITALIC),
        "underline" | "u" => Some(Modifier::UNDERLINED),
        "blink" => Some(Modifier::SLOW_BLINK),
        "reverse" | "r" => Some(Modifier::REVERSED),
        "strike" | "s" => Some(Modifier::CROSSED_OUT),
        _ => None,
    }
}

fn parse_color(token: &str) -> Option<Color> {
    let color = match token {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::Gray,
        "bright_black" | "grey" | "gray" => Color::DarkGray,
        "bright_red" => Color::LightRed,
        "bright_green" => Color::LightGreen,
        "bright_yellow" => Color::LightYellow,
        "bright_blue" => Color::LightBlue,
        "bright_magenta" => Color::LightMagenta,
        "bright_cyan" => Color::LightCyan,
        "bright_white" => Color::White,
        // Hex ("#ff8800") and indexed ("208") colours
        other => return Color::from_str(other).ok(),
    };
    Some(color)
}
