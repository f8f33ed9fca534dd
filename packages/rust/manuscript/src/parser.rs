//! Master document parser.
//!
//! The document is scanned once, top to bottom. Marker lines open and close
//! spans; everything else is body text for whichever chapter is open.
//!
//! ```text
//! ## VOL1: 2級対応            <- volume header
//! ### 第1章｜BIMの基礎         <- chapter header
//! ...body...
//! ---CHAPTER_END---           <- optional explicit end
//! ## 付録                      <- appendix: closes the volume
//! ---END_OF_MASTER---         <- end of document: closes the volume
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use manubuild_shared::{Chapter, FigureId, ManubuildError, Result, Volume};

use crate::figures;

const CHAPTER_END: &str = "---CHAPTER_END---";
const END_OF_MASTER: &str = "---END_OF_MASTER---";
const APPENDIX: &str = "## 付録";

static VOLUME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## (VOL\d+):\s*(.*)$").expect("valid regex"));

static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^### 第([0-9０-９]+)章｜(.+)$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Manuscript
// ---------------------------------------------------------------------------

/// Parsed master document: one ordered chapter list per volume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manuscript {
    volumes: BTreeMap<Volume, Vec<Chapter>>,
}

impl Manuscript {
    /// Chapters of one volume, in source order.
    pub fn chapters(&self, volume: Volume) -> &[Chapter] {
        self.volumes.get(&volume).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every chapter, volume by volume.
    pub fn all_chapters(&self) -> impl Iterator<Item = &Chapter> {
        Volume::ALL.into_iter().flat_map(|v| self.chapters(v))
    }

    /// Distinct figure ids referenced anywhere in the manuscript.
    pub fn figure_references(&self) -> BTreeSet<FigureId> {
        figures::collect_figure_references(self.all_chapters())
    }

    pub fn chapter_count(&self) -> usize {
        self.volumes.values().map(Vec::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Read and parse the master document at `path`.
///
/// Fails with [`ManubuildError::NotFound`] before touching anything else when
/// the file does not exist.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn parse_master_file(path: &Path) -> Result<Manuscript> {
    if !path.exists() {
        return Err(ManubuildError::not_found(path));
    }

    let text = std::fs::read_to_string(path).map_err(|e| ManubuildError::io(path, e))?;
    debug!(bytes = text.len(), "read master document");
    parse_manuscript(&text)
}

/// Split master document text into per-volume chapter lists.
pub fn parse_manuscript(text: &str) -> Result<Manuscript> {
    let mut scan = Scan::default();

    for (idx, line) in text.lines().enumerate() {
        scan.line(idx + 1, line)?;
    }

    let manuscript = scan.finish()?;

    info!(
        vol1_chapters = manuscript.chapters(Volume::Vol1).len(),
        vol2_chapters = manuscript.chapters(Volume::Vol2).len(),
        "manuscript parsed"
    );

    Ok(manuscript)
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Marker<'a> {
    Volume { id: &'a str, label: &'a str },
    Chapter { number: u32, title: &'a str },
    /// Explicit chapter end; `before` is any text preceding the marker.
    ChapterEnd { before: &'a str },
    Appendix,
    EndOfMaster { before: &'a str },
    Text,
}

fn classify(line_no: usize, line: &str) -> Result<Marker<'_>> {
    if let Some(pos) = line.find(END_OF_MASTER) {
        return Ok(Marker::EndOfMaster {
            before: &line[..pos],
        });
    }
    if let Some(pos) = line.find(CHAPTER_END) {
        return Ok(Marker::ChapterEnd {
            before: &line[..pos],
        });
    }
    if line.starts_with(APPENDIX) {
        return Ok(Marker::Appendix);
    }

    if let Some(caps) = VOLUME_RE.captures(line) {
        let id = caps.get(1).map_or("", |m| m.as_str());
        let label = caps.get(2).map_or("", |m| m.as_str().trim());
        return Ok(Marker::Volume { id, label });
    }

    if let Some(caps) = CHAPTER_RE.captures(line) {
        let title = caps.get(2).map_or("", |m| m.as_str().trim());
        if title.is_empty() {
            // A header without a title is ordinary text.
            return Ok(Marker::Text);
        }
        let digits = &caps[1];
        let number = chapter_number(digits).ok_or_else(|| {
            ManubuildError::parse(format!("line {line_no}: chapter number '{digits}' is out of range"))
        })?;
        return Ok(Marker::Chapter { number, title });
    }

    Ok(Marker::Text)
}

/// Chapter number from ASCII or full-width (`０`-`９`) digits.
fn chapter_number(digits: &str) -> Option<u32> {
    digits.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '０'..='９' => c as u32 - '０' as u32,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Which volume segment the scan is inside.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Outside,
    Known(Volume),
    /// Header with an id outside the known set; its chapters are dropped.
    Unknown,
}

#[derive(Debug)]
struct OpenChapter<'a> {
    volume: Volume,
    number: u32,
    title: &'a str,
    lines: Vec<&'a str>,
}

impl OpenChapter<'_> {
    fn close(self) -> Chapter {
        Chapter {
            volume: self.volume,
            number: self.number,
            title: self.title.to_string(),
            body: self.lines.join("\n").trim().to_string(),
        }
    }
}

#[derive(Debug)]
struct Scan<'a> {
    segment: Segment,
    open: Option<OpenChapter<'a>>,
    volumes: BTreeMap<Volume, Vec<Chapter>>,
    seen: BTreeSet<Volume>,
}

impl Default for Scan<'_> {
    fn default() -> Self {
        Self {
            segment: Segment::Outside,
            open: None,
            volumes: Volume::ALL.into_iter().map(|v| (v, Vec::new())).collect(),
            seen: BTreeSet::new(),
        }
    }
}

impl<'a> Scan<'a> {
    fn line(&mut self, line_no: usize, line: &'a str) -> Result<()> {
        match classify(line_no, line)? {
            Marker::Volume { id, label } => {
                self.close_chapter();
                self.segment = match id.parse::<Volume>() {
                    Ok(volume) => {
                        debug!(line = line_no, volume = %volume, label, "volume header");
                        self.seen.insert(volume);
                        Segment::Known(volume)
                    }
                    Err(_) => {
                        warn!(line = line_no, id, "unknown volume id, skipping its chapters");
                        Segment::Unknown
                    }
                };
            }
            Marker::Chapter { number, title } => {
                self.close_chapter();
                match self.segment {
                    Segment::Known(volume) => {
                        if number == 0 {
                            return Err(ManubuildError::validation(format!(
                                "line {line_no}: chapter numbers start at 1 ({volume})"
                            )));
                        }
                        self.open = Some(OpenChapter {
                            volume,
                            number,
                            title,
                            lines: Vec::new(),
                        });
                    }
                    Segment::Unknown => {}
                    Segment::Outside => {
                        debug!(line = line_no, number, "chapter header outside any volume, ignored");
                    }
                }
            }
            Marker::ChapterEnd { before } => {
                self.push_text(before);
                self.close_chapter();
            }
            Marker::Appendix => {
                self.close_chapter();
                self.segment = Segment::Outside;
            }
            Marker::EndOfMaster { before } => {
                self.push_text(before);
                self.close_chapter();
                self.segment = Segment::Outside;
            }
            Marker::Text => self.push_text(line),
        }
        Ok(())
    }

    fn push_text(&mut self, text: &'a str) {
        if let Some(open) = self.open.as_mut() {
            open.lines.push(text);
        }
    }

    fn close_chapter(&mut self) {
        if let Some(open) = self.open.take() {
            let chapter = open.close();
            self.volumes.entry(chapter.volume).or_default().push(chapter);
        }
    }

    fn finish(mut self) -> Result<Manuscript> {
        self.close_chapter();

        for (volume, chapters) in &self.volumes {
            if !self.seen.contains(volume) {
                warn!(volume = %volume, "volume header not found");
            } else if chapters.is_empty() {
                warn!(volume = %volume, "no chapters found in volume");
            }
            validate_numbers(*volume, chapters)?;
        }

        Ok(Manuscript {
            volumes: self.volumes,
        })
    }
}

/// Duplicate numbers would collide on the output filename, so they are fatal.
fn validate_numbers(volume: Volume, chapters: &[Chapter]) -> Result<()> {
    let mut numbers = HashSet::new();
    for chapter in chapters {
        if !numbers.insert(chapter.number) {
            return Err(ManubuildError::validation(format!(
                "duplicate chapter number {} in {volume} ('{}')",
                chapter.number, chapter.title
            )));
        }
    }

    if chapters.windows(2).any(|w| w[0].number > w[1].number) {
        warn!(volume = %volume, "chapters are not in ascending order in the source");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../../../fixtures/master/MASTER.sample.md");

    fn titles(m: &Manuscript, v: Volume) -> Vec<(u32, String)> {
        m.chapters(v).iter().map(|c| (c.number, c.title.clone())).collect()
    }

    #[test]
    fn single_chapter_then_empty_volume() {
        let text = "# 教科書\n\n## VOL1: 2級対応\n\n### 第1章｜BIMの基礎\n\nBIMとは何か。\n\n## VOL2: 準1級対応\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(titles(&m, Volume::Vol1), vec![(1, "BIMの基礎".to_string())]);
        assert_eq!(m.chapters(Volume::Vol1)[0].body, "BIMとは何か。");
        assert!(m.chapters(Volume::Vol2).is_empty());
    }

    #[test]
    fn sample_fixture_counts_headers() {
        let m = parse_manuscript(SAMPLE).unwrap();
        assert_eq!(
            titles(&m, Volume::Vol1),
            vec![
                (1, "BIMの基礎".to_string()),
                (2, "BIMモデルの構成".to_string()),
                (3, "LODと情報連携".to_string()),
            ]
        );
        assert_eq!(
            titles(&m, Volume::Vol2),
            vec![(1, "BIM実行計画".to_string()), (2, "干渉チェック".to_string())]
        );
        assert_eq!(m.chapter_count(), 5);
    }

    #[test]
    fn bodies_do_not_cross_boundaries() {
        let m = parse_manuscript(SAMPLE).unwrap();
        for chapter in m.all_chapters() {
            assert!(!chapter.body.contains("### 第"), "{chapter} leaked a header");
            assert!(!chapter.body.contains("## VOL"), "{chapter} leaked a volume header");
            assert!(!chapter.body.contains("付録"), "{chapter} leaked the appendix");
            assert!(!chapter.body.contains(CHAPTER_END));
        }
        // Text after CHAPTER_END and before the next header is discarded.
        assert!(
            !m.all_chapters()
                .any(|c| c.body.contains("この行はどの章にも属さない"))
        );
    }

    #[test]
    fn body_is_trimmed_and_keeps_inner_formatting() {
        let text = "## VOL1: x\n### 第1章｜題\n\n\n  - a\n\n```\ncode\n```\n\n\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(m.chapters(Volume::Vol1)[0].body, "- a\n\n```\ncode\n```");
    }

    #[test]
    fn content_uses_canonical_heading() {
        let text = "## VOL2: x\n### 第7章｜  設計手法   \nbody";
        let m = parse_manuscript(text).unwrap();
        let ch = &m.chapters(Volume::Vol2)[0];
        assert_eq!(ch.title, "設計手法");
        assert_eq!(ch.content(), "# 第7章｜設計手法\n\nbody");
    }

    #[test]
    fn end_of_master_stops_parsing() {
        let text = "## VOL1: x\n### 第1章｜A\nkeep ---END_OF_MASTER---\n### 第2章｜B\nlost\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(m.chapters(Volume::Vol1).len(), 1);
        assert_eq!(m.chapters(Volume::Vol1)[0].body, "keep");
    }

    #[test]
    fn volume_resumes_after_appendix_with_new_header() {
        let text = "## VOL1: x\n### 第1章｜A\na\n## 付録\n### 第9章｜Appendix\nz\n## VOL2: y\n### 第1章｜B\nb\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(titles(&m, Volume::Vol1), vec![(1, "A".to_string())]);
        assert_eq!(m.chapters(Volume::Vol1)[0].body, "a");
        assert_eq!(titles(&m, Volume::Vol2), vec![(1, "B".to_string())]);
    }

    #[test]
    fn unknown_volume_is_a_boundary() {
        let text = "## VOL1: x\n### 第1章｜A\na\n## VOL3: extra\n### 第1章｜C\nc\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(m.chapters(Volume::Vol1)[0].body, "a");
        assert_eq!(m.chapter_count(), 1);
    }

    #[test]
    fn duplicate_chapter_numbers_are_rejected() {
        let text = "## VOL1: x\n### 第1章｜A\na\n### 第1章｜B\nb\n";
        let err = parse_manuscript(text).unwrap_err();
        assert!(matches!(err, ManubuildError::Validation { .. }));
        assert!(err.to_string().contains("duplicate chapter number 1"));
    }

    #[test]
    fn same_number_in_different_volumes_is_fine() {
        let text = "## VOL1: x\n### 第1章｜A\n## VOL2: y\n### 第1章｜B\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(m.chapter_count(), 2);
    }

    #[test]
    fn chapter_zero_is_rejected() {
        let text = "## VOL1: x\n### 第0章｜序\n";
        assert!(matches!(
            parse_manuscript(text).unwrap_err(),
            ManubuildError::Validation { .. }
        ));
    }

    #[test]
    fn header_without_title_is_text() {
        let text = "## VOL1: x\n### 第1章｜A\n### 第2章｜   \nstill A\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(m.chapter_count(), 1);
        assert!(m.chapters(Volume::Vol1)[0].body.contains("still A"));
    }

    #[test]
    fn full_width_chapter_numbers_are_read() {
        let text = "## VOL1: x\n### 第１章｜BIMの基礎\n本文\n### 第１２章｜応用\n続き\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(
            titles(&m, Volume::Vol1),
            vec![(1, "BIMの基礎".to_string()), (12, "応用".to_string())]
        );
        assert_eq!(m.chapters(Volume::Vol1)[0].filename(), "chapter_01.md");
        assert_eq!(m.chapters(Volume::Vol1)[0].body, "本文");
    }

    #[test]
    fn other_unicode_digits_are_text() {
        // Arabic-Indic digits are not chapter numbers.
        let text = "## VOL1: x\n### 第1章｜A\n### 第\u{0661}章｜B\nstill A\n";
        let m = parse_manuscript(text).unwrap();
        assert_eq!(m.chapter_count(), 1);
        assert!(m.chapters(Volume::Vol1)[0].body.contains("still A"));
    }

    #[test]
    fn chapter_number_accepts_both_digit_widths() {
        assert_eq!(chapter_number("07"), Some(7));
        assert_eq!(chapter_number("１0"), Some(10));
        assert_eq!(chapter_number("99999999999"), None);
    }

    #[test]
    fn crlf_input_is_normalized() {
        let text = "## VOL1: x\r\n### 第1章｜A\r\nline1\r\nline2\r\n";
        let m = parse_manuscript(text).unwrap();
        let ch = &m.chapters(Volume::Vol1)[0];
        assert_eq!(ch.title, "A");
        assert_eq!(ch.body, "line1\nline2");
    }

    #[test]
    fn missing_master_is_not_found() {
        let path = std::env::temp_dir().join(format!("mb-missing-{}/MASTER.md", uuid::Uuid::now_v7()));
        let err = parse_master_file(&path).unwrap_err();
        assert!(err.is_not_found());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn figure_references_span_all_chapters() {
        let m = parse_manuscript(SAMPLE).unwrap();
        let ids: Vec<String> = m.figure_references().into_iter().map(String::from).collect();
        assert_eq!(
            ids,
            vec!["bep_flow", "cad_vs_bim", "clash_detection", "info_layers", "lod_matrix", "site_photo"]
        );
    }
}
