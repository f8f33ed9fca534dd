//! Core domain types for the manuscript pipeline.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ManubuildError, Result};

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// One of the two top-level manuscript groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Volume {
    #[serde(rename = "VOL1")]
    Vol1,
    #[serde(rename = "VOL2")]
    Vol2,
}

impl Volume {
    /// Every volume, in output order.
    pub const ALL: [Volume; 2] = [Volume::Vol1, Volume::Vol2];

    /// Identifier as written in the volume header (`VOL1`).
    pub fn id(self) -> &'static str {
        match self {
            Volume::Vol1 => "VOL1",
            Volume::Vol2 => "VOL2",
        }
    }

    /// Config table key (`vol1`).
    pub fn key(self) -> &'static str {
        match self {
            Volume::Vol1 => "vol1",
            Volume::Vol2 => "vol2",
        }
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Volume {
    type Err = ManubuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VOL1" => Ok(Volume::Vol1),
            "VOL2" => Ok(Volume::Vol2),
            other => Err(ManubuildError::parse(format!("unknown volume id '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Chapter
// ---------------------------------------------------------------------------

/// A single chapter cut out of the master document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub volume: Volume,
    pub number: u32,
    pub title: String,
    /// Chapter text without the heading line, trimmed.
    pub body: String,
}

impl Chapter {
    /// File name the chapter is written to (`chapter_03.md`).
    pub fn filename(&self) -> String {
        chapter_filename(self.number)
    }

    /// Canonical heading line, independent of how the source wrote it.
    pub fn heading(&self) -> String {
        format!("# 第{}章｜{}", self.number, self.title)
    }

    /// Heading, one blank line, then the body.
    pub fn content(&self) -> String {
        format!("{}\n\n{}", self.heading(), self.body)
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Chapter {}-{}: {}>", self.volume, self.number, self.title)
    }
}

/// File name for a chapter number, zero-padded to two digits.
pub fn chapter_filename(number: u32) -> String {
    format!("chapter_{number:02}.md")
}

// ---------------------------------------------------------------------------
// FigureId
// ---------------------------------------------------------------------------

/// Identifier of a figure referenced by `![FIG:<id>]()`.
///
/// Always one or more word characters, so it is safe to use as a file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FigureId(String);

impl FigureId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        static ID_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^\w+$").expect("valid regex"));

        if !ID_RE.is_match(&id) {
            return Err(ManubuildError::validation(format!(
                "invalid figure identifier '{id}'"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image file name (`<id>.png`).
    pub fn file_name(&self) -> String {
        format!("{}.png", self.0)
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FigureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FigureId {
    type Error = ManubuildError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FigureId> for String {
    fn from(id: FigureId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(number: u32, title: &str, body: &str) -> Chapter {
        Chapter {
            volume: Volume::Vol1,
            number,
            title: title.into(),
            body: body.into(),
        }
    }

    #[test]
    fn filename_is_zero_padded() {
        assert_eq!(chapter(3, "t", "").filename(), "chapter_03.md");
        assert_eq!(chapter(12, "t", "").filename(), "chapter_12.md");
        assert_eq!(chapter(120, "t", "").filename(), "chapter_120.md");
    }

    #[test]
    fn content_is_heading_blank_line_body() {
        let ch = chapter(1, "BIMの基礎", "本文です。\n\n- 項目");
        assert_eq!(ch.content(), "# 第1章｜BIMの基礎\n\n本文です。\n\n- 項目");
    }

    #[test]
    fn volume_ids_roundtrip() {
        for vol in Volume::ALL {
            assert_eq!(vol.id().parse::<Volume>().unwrap(), vol);
        }
        assert!("VOL3".parse::<Volume>().is_err());
    }

    #[test]
    fn figure_id_accepts_word_characters_only() {
        assert!(FigureId::new("cad_vs_bim").is_ok());
        assert!(FigureId::new("4d_5d_bim").is_ok());
        assert!(FigureId::new("図1").is_ok());
        assert!(FigureId::new("a-b").is_err());
        assert!(FigureId::new("").is_err());
    }

    #[test]
    fn figure_id_serializes_as_plain_string() {
        let id = FigureId::new("lod_matrix").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"lod_matrix\"");
        let back: FigureId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<FigureId>("\"bad id\"").is_err());
    }
}
