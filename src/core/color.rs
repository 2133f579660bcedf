//! Color schemes for the text formatter
//!
//! A [`ColorScheme`] names a style per category using the
//! `foreground+attributes:background+attributes` syntax, for example
//! `"green"`, `"black+h"` (bright black) or `"yellow+bu:blue"`. Schemes are
//! compiled once into a [`CompiledColorScheme`] of [`Style`] values.

use super::log_level::LogLevel;
use colored::Color;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

const RESET: &str = "\x1b[0m";

static STANDARD_SCHEME: LazyLock<ColorScheme> = LazyLock::new(|| ColorScheme {
    info_level_style: "green".to_string(),
    warn_level_style: "yellow".to_string(),
    error_level_style: "red".to_string(),
    fatal_level_style: "red".to_string(),
    panic_level_style: "red".to_string(),
    debug_level_style: "blue".to_string(),
    prefix_style: "cyan".to_string(),
    timestamp_style: "black+h".to_string(),
});

static STANDARD_COMPILED: LazyLock<CompiledColorScheme> =
    LazyLock::new(|| CompiledColorScheme::compile(&STANDARD_SCHEME));

static NO_COLORS: LazyLock<CompiledColorScheme> = LazyLock::new(|| CompiledColorScheme {
    info_level: Style::plain(),
    warn_level: Style::plain(),
    error_level: Style::plain(),
    fatal_level: Style::plain(),
    panic_level: Style::plain(),
    debug_level: Style::plain(),
    prefix: Style::plain(),
    timestamp: Style::plain(),
});

/// Style names per category. Empty names fall back to the standard scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub info_level_style: String,
    pub warn_level_style: String,
    pub error_level_style: String,
    pub fatal_level_style: String,
    pub panic_level_style: String,
    pub debug_level_style: String,
    pub prefix_style: String,
    pub timestamp_style: String,
}

impl ColorScheme {
    /// The process-wide default scheme
    pub fn standard() -> &'static ColorScheme {
        &STANDARD_SCHEME
    }

    pub fn compile(&self) -> CompiledColorScheme {
        CompiledColorScheme::compile(self)
    }
}

/// A compiled text transform: SGR codes wrapped around the painted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    sgr: String,
}

impl Style {
    /// The identity transform
    pub fn plain() -> Self {
        Self { sgr: String::new() }
    }

    /// Parse a style name such as `"red"`, `"black+h"` or `"white+b:red"`.
    ///
    /// Unknown color names contribute nothing, so a bad name degrades to
    /// uncolored text instead of failing.
    pub fn parse(spec: &str) -> Self {
        let (fg, bg) = spec.split_once(':').unwrap_or((spec, ""));
        let (fg_name, fg_attrs) = fg.split_once('+').unwrap_or((fg, ""));
        let (bg_name, bg_attrs) = bg.split_once('+').unwrap_or((bg, ""));

        let mut codes: Vec<Cow<'static, str>> = Vec::new();
        for attr in fg_attrs.chars() {
            let code = match attr {
                'b' => "1",
                'd' => "2",
                'u' => "4",
                'B' => "5",
                'i' => "7",
                's' => "9",
                _ => continue,
            };
            codes.push(Cow::Borrowed(code));
        }
        codes.extend(color_code(fg_name, fg_attrs.contains('h'), false));
        codes.extend(color_code(bg_name, bg_attrs.contains('h'), true));

        Self {
            sgr: codes.join(";"),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.sgr.is_empty()
    }

    pub fn paint(&self, text: &str) -> String {
        if self.is_plain() {
            return text.to_string();
        }
        format!("\x1b[{}m{}{}", self.sgr, text, RESET)
    }
}

fn color_code(name: &str, bright: bool, background: bool) -> Option<Cow<'static, str>> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if let Ok(index) = name.parse::<u8>() {
        let layer = if background { 48 } else { 38 };
        return Some(Cow::Owned(format!("{};5;{}", layer, index)));
    }
    if name == "default" {
        return Some(Cow::Borrowed(if background { "49" } else { "39" }));
    }

    let mut color: Color = name.parse().ok()?;
    if bright {
        color = brighten(color);
    }
    Some(if background {
        color.to_bg_str()
    } else {
        color.to_fg_str()
    })
}

fn brighten(color: Color) -> Color {
    match color {
        Color::Black => Color::BrightBlack,
        Color::Red => Color::BrightRed,
        Color::Green => Color::BrightGreen,
        Color::Yellow => Color::BrightYellow,
        Color::Blue => Color::BrightBlue,
        Color::Magenta => Color::BrightMagenta,
        Color::Cyan => Color::BrightCyan,
        Color::White => Color::BrightWhite,
        other => other,
    }
}

/// One [`Style`] per category; every category is always bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledColorScheme {
    pub info_level: Style,
    pub warn_level: Style,
    pub error_level: Style,
    pub fatal_level: Style,
    pub panic_level: Style,
    pub debug_level: Style,
    pub prefix: Style,
    pub timestamp: Style,
}

impl CompiledColorScheme {
    pub fn compile(scheme: &ColorScheme) -> Self {
        let standard = ColorScheme::standard();
        let pick = |main: &str, fallback: &str| {
            Style::parse(if main.is_empty() { fallback } else { main })
        };

        Self {
            info_level: pick(&scheme.info_level_style, &standard.info_level_style),
            warn_level: pick(&scheme.warn_level_style, &standard.warn_level_style),
            error_level: pick(&scheme.error_level_style, &standard.error_level_style),
            fatal_level: pick(&scheme.fatal_level_style, &standard.fatal_level_style),
            panic_level: pick(&scheme.panic_level_style, &standard.panic_level_style),
            debug_level: pick(&scheme.debug_level_style, &standard.debug_level_style),
            prefix: pick(&scheme.prefix_style, &standard.prefix_style),
            timestamp: pick(&scheme.timestamp_style, &standard.timestamp_style),
        }
    }

    /// The compiled process-wide default scheme
    pub fn standard() -> &'static CompiledColorScheme {
        &STANDARD_COMPILED
    }

    /// A scheme whose every style is the identity
    pub fn no_colors() -> &'static CompiledColorScheme {
        &NO_COLORS
    }

    pub fn level(&self, level: LogLevel) -> &Style {
        match level {
            LogLevel::Debug => &self.debug_level,
            LogLevel::Info => &self.info_level,
            LogLevel::Warn => &self.warn_level,
            LogLevel::Error => &self.error_level,
            LogLevel::Panic => &self.panic_level,
            LogLevel::Fatal => &self.fatal_level,
        }
    }
}
