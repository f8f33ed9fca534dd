//! Reading split chapter files back from a volume directory.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use manubuild_shared::{ManubuildError, Result};

use crate::blocks::{Block, parse_blocks};

/// A `chapter_NN.md` file loaded from disk.
#[derive(Debug, Clone)]
pub struct ChapterFile {
    pub path: PathBuf,
    pub number: u32,
    pub content: String,
}

impl ChapterFile {
    pub fn blocks(&self) -> Vec<Block> {
        parse_blocks(&self.content)
    }

    /// Text of the first level-1 heading, falling back to the file stem.
    pub fn title(&self) -> String {
        self.blocks()
            .into_iter()
            .find_map(|b| match b {
                Block::Heading { level: 1, text } => Some(text),
                _ => None,
            })
            .unwrap_or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }
}

/// Chapter number encoded in a split file name, if it is one.
pub fn chapter_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("chapter_")?
        .strip_suffix(".md")?
        .parse()
        .ok()
}

/// Load every chapter file in `dir`, ascending by chapter number.
///
/// The table of contents and unrelated files are skipped. A missing directory
/// means the split stage has not run yet.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_chapter_files(dir: &Path) -> Result<Vec<ChapterFile>> {
    if !dir.is_dir() {
        return Err(ManubuildError::not_found(dir));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| ManubuildError::io(dir, e))?;
    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| ManubuildError::io(dir, e))?;
        let path = entry.path();
        let Some(number) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(chapter_number)
        else {
            continue;
        };
        let content = std::fs::read_to_string(&path).map_err(|e| ManubuildError::io(&path, e))?;
        debug!(file = %path.display(), chars = content.chars().count(), "loaded chapter");
        files.push(ChapterFile {
            path,
            number,
            content,
        });
    }

    files.sort_by_key(|f| f.number);

    if files.is_empty() {
        warn!("no chapter files found");
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mb-chapters-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_chapter_numbers() {
        assert_eq!(chapter_number("chapter_01.md"), Some(1));
        assert_eq!(chapter_number("chapter_120.md"), Some(120));
        assert_eq!(chapter_number("00_toc.md"), None);
        assert_eq!(chapter_number("chapter_x.md"), None);
        assert_eq!(chapter_number("chapter_01.txt"), None);
    }

    #[test]
    fn loads_in_numeric_order() {
        let dir = temp_dir();
        for (name, body) in [
            ("chapter_10.md", "# ten"),
            ("chapter_02.md", "# two"),
            ("chapter_100.md", "# hundred"),
            ("00_toc.md", "# toc"),
            ("notes.txt", "x"),
        ] {
            std::fs::write(dir.join(name), body).unwrap();
        }

        let files = load_chapter_files(&dir).unwrap();
        let numbers: Vec<u32> = files.iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![2, 10, 100]);
        assert_eq!(files[0].content, "# two");
        assert_eq!(
            files[0].blocks(),
            vec![Block::Heading { level: 1, text: "two".into() }]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn title_falls_back_to_file_stem() {
        let file = |content: &str| ChapterFile {
            path: PathBuf::from("/x/chapter_03.md"),
            number: 3,
            content: content.to_string(),
        };
        assert_eq!(file("intro\n\n# 第3章｜LOD\n\n# other").title(), "第3章｜LOD");
        assert_eq!(file("## only a subheading").title(), "chapter_03");
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = std::env::temp_dir().join(format!("mb-chapters-missing-{}", uuid::Uuid::now_v7()));
        assert!(load_chapter_files(&dir).unwrap_err().is_not_found());
    }
}
