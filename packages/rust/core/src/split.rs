//! Chapter splitter and table-of-contents writer.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use manubuild_manuscript::Manuscript;
use manubuild_shared::{AppConfig, Chapter, ManubuildError, ProjectPaths, Result, Volume};

/// File name of the per-volume table of contents.
pub const TOC_FILE_NAME: &str = "00_toc.md";

/// Files written for one volume.
#[derive(Debug, Clone)]
pub struct VolumeSplit {
    pub volume: Volume,
    pub dir: PathBuf,
    pub chapters: Vec<PathBuf>,
    pub toc: PathBuf,
}

/// Render the table of contents: a heading, a blank line, then one numbered
/// line per chapter in parse order.
pub fn render_toc(title: &str, chapters: &[Chapter]) -> String {
    let mut out = format!("# {title} - 目次\n\n");
    for chapter in chapters {
        out.push_str(&format!("{}. {}\n", chapter.number, chapter.title));
    }
    out
}

/// Write every chapter of one volume plus its table of contents into `dir`.
///
/// Existing files are overwritten.
#[instrument(skip_all, fields(dir = %dir.display(), chapters = chapters.len()))]
pub fn write_volume(dir: &Path, toc_title: &str, chapters: &[Chapter]) -> Result<(Vec<PathBuf>, PathBuf)> {
    std::fs::create_dir_all(dir).map_err(|e| ManubuildError::io(dir, e))?;

    let mut written = Vec::with_capacity(chapters.len());
    for chapter in chapters {
        let path = dir.join(chapter.filename());
        let content = chapter.content();
        std::fs::write(&path, &content).map_err(|e| ManubuildError::io(&path, e))?;
        info!(
            file = %chapter.filename(),
            title = %chapter.title,
            chars = content.chars().count(),
            "wrote chapter"
        );
        written.push(path);
    }

    let toc = dir.join(TOC_FILE_NAME);
    std::fs::write(&toc, render_toc(toc_title, chapters)).map_err(|e| ManubuildError::io(&toc, e))?;
    debug!(path = %toc.display(), "wrote table of contents");

    Ok((written, toc))
}

/// Split a parsed manuscript into per-volume chapter directories.
pub fn split_manuscript(
    manuscript: &Manuscript,
    paths: &ProjectPaths,
    config: &AppConfig,
) -> Result<Vec<VolumeSplit>> {
    let mut splits = Vec::with_capacity(Volume::ALL.len());
    for volume in Volume::ALL {
        let dir = paths.volume_dir(volume);
        let (chapters, toc) = write_volume(
            &dir,
            &config.volume(volume).toc_title,
            manuscript.chapters(volume),
        )?;
        splits.push(VolumeSplit {
            volume,
            dir,
            chapters,
            toc,
        });
    }
    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use manubuild_manuscript::parse_manuscript;

    const SAMPLE: &str = include_str!("../../../../fixtures/master/MASTER.sample.md");

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mb-split-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn chapter(number: u32, title: &str) -> Chapter {
        Chapter {
            volume: Volume::Vol1,
            number,
            title: title.into(),
            body: "本文".into(),
        }
    }

    #[test]
    fn toc_lists_chapters_in_order() {
        let toc = render_toc("VOL1: テスト", &[chapter(1, "A"), chapter(2, "B")]);
        assert_eq!(toc, "# VOL1: テスト - 目次\n\n1. A\n2. B\n");
    }

    #[test]
    fn empty_volume_gets_heading_only_toc() {
        assert_eq!(render_toc("T", &[]), "# T - 目次\n\n");
    }

    #[test]
    fn splits_sample_into_volume_dirs() {
        let root = temp_dir();
        let config = AppConfig::default();
        let paths = ProjectPaths::new(&root, &config);
        let manuscript = parse_manuscript(SAMPLE).unwrap();

        let splits = split_manuscript(&manuscript, &paths, &config).unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].chapters.len(), 3);
        assert_eq!(splits[1].chapters.len(), 2);

        let vol1 = paths.volume_dir(Volume::Vol1);
        let first = std::fs::read_to_string(vol1.join("chapter_01.md")).unwrap();
        assert!(first.starts_with("# 第1章｜BIMの基礎\n\n"));
        assert!(!first.contains("CHAPTER_END"));
        assert!(!first.contains("この行はどの章にも属さない"));

        let toc = std::fs::read_to_string(vol1.join(TOC_FILE_NAME)).unwrap();
        assert!(toc.starts_with("# VOL1: BIM利用技術者試験2級対応 - 目次\n\n1. BIMの基礎\n"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn chapter_files_reproduce_content() {
        let root = temp_dir();
        let config = AppConfig::default();
        let paths = ProjectPaths::new(&root, &config);
        let manuscript = parse_manuscript(SAMPLE).unwrap();
        split_manuscript(&manuscript, &paths, &config).unwrap();

        for volume in Volume::ALL {
            let joined: String = manuscript
                .chapters(volume)
                .iter()
                .map(|c| std::fs::read_to_string(paths.volume_dir(volume).join(c.filename())).unwrap())
                .collect();
            let expected: String = manuscript.chapters(volume).iter().map(Chapter::content).collect();
            assert_eq!(joined, expected);
        }

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn rerun_yields_identical_bytes() {
        let root = temp_dir();
        let config = AppConfig::default();
        let paths = ProjectPaths::new(&root, &config);
        let manuscript = parse_manuscript(SAMPLE).unwrap();

        let first = split_manuscript(&manuscript, &paths, &config).unwrap();
        let snapshot: Vec<Vec<u8>> = first
            .iter()
            .flat_map(|s| s.chapters.iter().chain(std::iter::once(&s.toc)))
            .map(|p| std::fs::read(p).unwrap())
            .collect();

        let second = split_manuscript(&manuscript, &paths, &config).unwrap();
        let again: Vec<Vec<u8>> = second
            .iter()
            .flat_map(|s| s.chapters.iter().chain(std::iter::once(&s.toc)))
            .map(|p| std::fs::read(p).unwrap())
            .collect();
        assert_eq!(snapshot, again);

        let _ = std::fs::remove_dir_all(&root);
    }
}
