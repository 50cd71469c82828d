//! Chunk listing for `raff view`: one line (or JSON object) per chunk, optional hex dump.
//!
//! Styling is passed in as a [`ViewStyle`]; nothing here reads global colour state.

use std::fmt::Write as _;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use clap::builder::styling::{AnsiColor, Style};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::ChunkHeader;
use crate::reader::{RaffReader, ReadError, Termination};

/// Errors produced while viewing a stream.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid view config: {0}")]
    Config(#[from] toml::de::Error),
}

/// When to emit ANSI colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    #[must_use]
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            ColorChoice::Auto => is_terminal,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// The sixteen ANSI foreground colours, as named in a view config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl From<Color> for AnsiColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => AnsiColor::Black,
            Color::Red => AnsiColor::Red,
            Color::Green => AnsiColor::Green,
            Color::Yellow => AnsiColor::Yellow,
            Color::Blue => AnsiColor::Blue,
            Color::Magenta => AnsiColor::Magenta,
            Color::Cyan => AnsiColor::Cyan,
            Color::White => AnsiColor::White,
            Color::BrightBlack => AnsiColor::BrightBlack,
            Color::BrightRed => AnsiColor::BrightRed,
            Color::BrightGreen => AnsiColor::BrightGreen,
            Color::BrightYellow => AnsiColor::BrightYellow,
            Color::BrightBlue => AnsiColor::BrightBlue,
            Color::BrightMagenta => AnsiColor::BrightMagenta,
            Color::BrightCyan => AnsiColor::BrightCyan,
            Color::BrightWhite => AnsiColor::BrightWhite,
        }
    }
}

/// View settings loadable from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub color: ColorChoice,
    pub name_color: Color,
    pub octet_count_color: Color,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
            name_color: Color::Blue,
            octet_count_color: Color::BrightMagenta,
        }
    }
}

impl ViewConfig {
    pub fn parse(text: &str) -> Result<Self, ViewError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ViewError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Styles for this config; `enabled = false` yields plain text.
    #[must_use]
    pub fn style(&self, enabled: bool) -> ViewStyle {
        if !enabled {
            return ViewStyle::plain();
        }
        ViewStyle {
            name: Style::new().fg_color(Some(AnsiColor::from(self.name_color).into())),
            octet_count: Style::new().fg_color(Some(AnsiColor::from(self.octet_count_color).into())),
        }
    }
}

/// Terminal styles applied by [`render_chunk_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewStyle {
    pub name: Style,
    pub octet_count: Style,
}

impl ViewStyle {
    #[must_use]
    pub fn plain() -> Self {
        Self::default()
    }
}

fn styled(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

/// Control characters become `.` so file contents cannot drive the terminal.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '.' } else { c })
        .collect()
}

/// One listing line: icon glyph, name, octet count and header position.
#[must_use]
pub fn render_chunk_line(header: &ChunkHeader, position: u64, style: &ViewStyle) -> String {
    let name = format!("{:>4}", printable(&header.name.to_name_string()));
    format!(
        "{:>2} {} {} (pos: {:08x})",
        printable(&header.icon.to_icon_string()),
        styled(style.name, &name),
        styled(style.octet_count, &header.octet_count.to_string()),
        position
    )
}

/// Canonical hex dump: offset, 16 octets in two groups of 8, printable ASCII column.
#[must_use]
pub fn hex_dump(octets: &[u8]) -> String {
    let mut out = String::new();
    for (line, row) in octets.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", line * 16);
        for i in 0..16 {
            match row.get(i) {
                Some(b) => {
                    let _ = write!(out, "{b:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == 7 || i == 15 {
                out.push(' ');
            }
        }
        out.push('|');
        out.extend(row.iter().map(|&b| {
            if (0x20..=0x7e).contains(&b) {
                char::from(b)
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

/// One chunk in `--json` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkRecord {
    pub icon: String,
    pub name: String,
    pub octet_count: u32,
    pub position: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_hex: Option<String>,
}

impl ChunkRecord {
    #[must_use]
    pub fn new(header: &ChunkHeader, position: u64, payload: Option<&[u8]>) -> Self {
        Self {
            icon: header.icon.to_icon_string(),
            name: header.name.to_name_string(),
            octet_count: header.octet_count,
            position,
            payload_hex: payload.map(|p| p.iter().map(|b| format!("{b:02x}")).collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    /// Above zero, payloads are read and dumped instead of skipped.
    pub verbosity: u8,
    pub format: OutputFormat,
    pub style: ViewStyle,
}

/// What a completed listing saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSummary {
    pub chunk_count: usize,
    pub termination: Option<Termination>,
}

/// List every remaining chunk of `reader` to `out`.
pub fn view<R: Read, W: Write>(
    reader: &mut RaffReader<R>,
    out: &mut W,
    options: &ViewOptions,
) -> Result<ViewSummary, ViewError> {
    let mut chunk_count = 0;
    loop {
        let position = reader.position();
        let Some(header) = reader.next_header()? else {
            break;
        };
        chunk_count += 1;

        let payload = if options.verbosity > 0 {
            Some(reader.read_payload()?)
        } else {
            reader.skip_payload()?;
            None
        };

        match options.format {
            OutputFormat::Text => {
                writeln!(out, "{}", render_chunk_line(&header, position, &options.style))?;
                if let Some(payload) = &payload {
                    write!(out, "{}", hex_dump(payload))?;
                }
            }
            OutputFormat::Json => {
                let record = ChunkRecord::new(&header, position, payload.as_deref());
                serde_json::to_writer(&mut *out, &record)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(ViewSummary {
        chunk_count,
        termination: reader.termination(),
    })
}
