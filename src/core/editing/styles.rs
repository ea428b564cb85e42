// Style values carried by FormatRange operations and read from paragraphs.

use serde::{Deserialize, Serialize};

/// Paragraph named style as the Docs API spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamedStyle {
    #[default]
    NormalText,
    Title,
    Subtitle,
    /// HEADING_1 through HEADING_6.
    Heading(u8),
}

impl NamedStyle {
    /// Parse a style name supplied by a caller. Returns `None` for names the
    /// Docs API does not know.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NORMAL_TEXT" => Some(NamedStyle::NormalText),
            "TITLE" => Some(NamedStyle::Title),
            "SUBTITLE" => Some(NamedStyle::Subtitle),
            other => other
                .strip_prefix("HEADING_")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=6).contains(n))
                .map(NamedStyle::Heading),
        }
    }

    /// Read a style from a fetched document. Unknown values are treated as
    /// normal text.
    pub fn from_api(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn as_api_str(&self) -> &'static str {
        match self {
            NamedStyle::NormalText => "NORMAL_TEXT",
            NamedStyle::Title => "TITLE",
            NamedStyle::Subtitle => "SUBTITLE",
            NamedStyle::Heading(1) => "HEADING_1",
            NamedStyle::Heading(2) => "HEADING_2",
            NamedStyle::Heading(3) => "HEADING_3",
            NamedStyle::Heading(4) => "HEADING_4",
            NamedStyle::Heading(5) => "HEADING_5",
            NamedStyle::Heading(_) => "HEADING_6",
        }
    }

    /// Section depth for heading styles: 0 for title/subtitle, 1-6 for headings.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            NamedStyle::Title | NamedStyle::Subtitle => Some(0),
            NamedStyle::Heading(level) => Some(*level),
            NamedStyle::NormalText => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    Center,
    End,
    Justified,
}

impl Alignment {
    /// Accepts the user-facing names (LEFT, CENTER, RIGHT, JUSTIFY) and the API ones.
    pub fn from_user(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LEFT" | "START" => Some(Alignment::Start),
            "CENTER" => Some(Alignment::Center),
            "RIGHT" | "END" => Some(Alignment::End),
            "JUSTIFY" | "JUSTIFIED" => Some(Alignment::Justified),
            _ => None,
        }
    }

    pub fn as_api_str(&self) -> &'static str {
        match self {
            Alignment::Start => "START",
            Alignment::Center => "CENTER",
            Alignment::End => "END",
            Alignment::Justified => "JUSTIFIED",
        }
    }
}

/// Colour with channels in 0.0..=1.0, the shape both Docs and Sheets expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl RgbColor {
    /// Parse `#RRGGBB` or `RRGGBB`. Returns `None` for anything else.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Self {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }
}

/// Character-level formatting. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub foreground: Option<RgbColor>,
    pub background: Option<RgbColor>,
}

impl TextStyle {
    /// Field mask names for the fields that are set, in API spelling.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.bold.is_some() {
            fields.push("bold");
        }
        if self.italic.is_some() {
            fields.push("italic");
        }
        if self.underline.is_some() {
            fields.push("underline");
        }
        if self.strikethrough.is_some() {
            fields.push("strikethrough");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        if self.font_family.is_some() {
            fields.push("weightedFontFamily");
        }
        if self.foreground.is_some() {
            fields.push("foregroundColor");
        }
        if self.background.is_some() {
            fields.push("backgroundColor");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphStyle {
    pub named_style: Option<NamedStyle>,
    pub alignment: Option<Alignment>,
}

impl ParagraphStyle {
    pub fn is_empty(&self) -> bool {
        self.named_style.is_none() && self.alignment.is_none()
    }
}
