//! Chapter block model.
//!
//! Chapter Markdown is flattened into a list of [`Block`]s that both
//! assemblers lay out. Inline formatting is dropped; structure is kept.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use manubuild_shared::FigureId;

/// One layout unit of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    /// `depth` starts at 1 for top-level items. `marker` is `• ` or `3. `.
    ListItem { depth: usize, marker: String, text: String },
    Code(String),
    Figure(FigureId),
    Rule,
}

impl Block {
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Block::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// Plain text lines of the block as they would appear on a slide.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Block::Heading { text, .. } | Block::Paragraph(text) | Block::Code(text) => {
                text.lines().map(str::to_string).collect()
            }
            Block::ListItem { depth, marker, text } => {
                let indent = "  ".repeat(depth.saturating_sub(1));
                let mut lines = text.lines();
                let mut out = Vec::new();
                if let Some(first) = lines.next() {
                    out.push(format!("{indent}{marker}{first}"));
                }
                out.extend(lines.map(|l| format!("{indent}{l}")));
                out
            }
            Block::Figure(_) | Block::Rule => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    text: String,
    heading: Option<u8>,
    /// Next ordinal per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    item_marker: String,
    image: Option<(String, String)>,
    row: Vec<String>,
    in_table: bool,
}

impl Builder {
    fn flush_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let block = if self.lists.is_empty() {
            Block::Paragraph(text.to_string())
        } else {
            Block::ListItem {
                depth: self.lists.len(),
                marker: std::mem::take(&mut self.item_marker),
                text: text.to_string(),
            }
        };
        self.blocks.push(block);
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_text();
                self.heading = Some(heading_level(level));
            }
            Tag::CodeBlock(_) => self.flush_text(),
            Tag::List(start) => {
                // Text of the enclosing item comes before its nested list.
                self.flush_text();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_text();
                self.item_marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Tag::Table(_) => {
                self.flush_text();
                self.in_table = true;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                let level = self.heading.take().unwrap_or(1);
                let text = std::mem::take(&mut self.text).trim().to_string();
                if !text.is_empty() {
                    self.blocks.push(Block::Heading { level, text });
                }
            }
            TagEnd::CodeBlock => {
                let code = std::mem::take(&mut self.text);
                let code = code.trim_end_matches('\n');
                if !code.is_empty() {
                    self.blocks.push(Block::Code(code.to_string()));
                }
            }
            TagEnd::Paragraph | TagEnd::Item => self.flush_text(),
            TagEnd::List(_) => {
                self.flush_text();
                self.lists.pop();
            }
            TagEnd::Image => {
                if let Some((dest, alt)) = self.image.take() {
                    match figure_placeholder(&dest, &alt) {
                        Some(id) => {
                            self.flush_text();
                            self.blocks.push(Block::Figure(id));
                        }
                        None => self.text.push_str(&alt),
                    }
                }
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.text).trim().to_string();
                self.row.push(cell);
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let row = std::mem::take(&mut self.row);
                if row.iter().any(|c| !c.is_empty()) {
                    self.blocks.push(Block::Paragraph(row.join(" | ")));
                }
            }
            TagEnd::Table => self.in_table = false,
            _ => {}
        }
    }

    fn push_str(&mut self, s: &str) {
        match self.image.as_mut() {
            Some((_, alt)) => alt.push_str(s),
            None => self.text.push_str(s),
        }
    }
}

/// Parse chapter Markdown into layout blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut builder = Builder::default();

    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(tag) => builder.end(tag),
            Event::Text(text) | Event::Code(text) => builder.push_str(&text),
            Event::SoftBreak | Event::HardBreak => {
                if builder.in_table {
                    builder.push_str(" ");
                } else {
                    builder.push_str("\n");
                }
            }
            Event::Rule => {
                builder.flush_text();
                builder.blocks.push(Block::Rule);
            }
            _ => {}
        }
    }

    builder.flush_text();
    builder.blocks
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// `![FIG:<id>]()` parses as an image with an empty target.
fn figure_placeholder(dest: &str, alt: &str) -> Option<FigureId> {
    if !dest.is_empty() {
        return None;
    }
    alt.strip_prefix("FIG:")
        .and_then(|id| FigureId::new(id).ok())
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Blocks of a chapter grouped by section headings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sectioned {
    /// Text of the first level-1 heading, if any.
    pub title: Option<String>,
    /// Blocks before the first section heading (chapter heading excluded).
    pub preamble: Vec<Block>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn figures(&self) -> impl Iterator<Item = &FigureId> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Figure(id) => Some(id),
            _ => None,
        })
    }
}

/// Group blocks into sections starting at headings of exactly `level`.
///
/// Deeper headings stay inside their section; shallower ones (other than the
/// chapter title) end up in the preamble or the current section unchanged.
pub fn split_sections(blocks: &[Block], level: u8) -> Sectioned {
    let mut out = Sectioned::default();
    let mut current: Option<Section> = None;

    for block in blocks {
        match block {
            Block::Heading { level: 1, text } if out.title.is_none() => {
                out.title = Some(text.clone());
            }
            Block::Heading { level: l, text } if *l == level => {
                if let Some(done) = current.take() {
                    out.sections.push(done);
                }
                current = Some(Section {
                    title: text.clone(),
                    blocks: Vec::new(),
                });
            }
            other => match current.as_mut() {
                Some(section) => section.blocks.push(other.clone()),
                None => out.preamble.push(other.clone()),
            },
        }
    }

    if let Some(done) = current {
        out.sections.push(done);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fig(id: &str) -> Block {
        Block::Figure(FigureId::new(id).unwrap())
    }

    #[test]
    fn headings_paragraphs_and_rules() {
        let blocks = parse_blocks("# 第1章｜A\n\n本文 **強調** と `code`。\n次の行\n\n---\n\n#### 1.1 節");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, text: "第1章｜A".into() },
                Block::Paragraph("本文 強調 と code。\n次の行".into()),
                Block::Rule,
                Block::Heading { level: 4, text: "1.1 節".into() },
            ]
        );
    }

    #[test]
    fn nested_and_ordered_lists() {
        let blocks = parse_blocks("- one\n  - inner\n- two\n\n3. c\n4. d\n");
        assert_eq!(
            blocks,
            vec![
                Block::ListItem { depth: 1, marker: "• ".into(), text: "one".into() },
                Block::ListItem { depth: 2, marker: "• ".into(), text: "inner".into() },
                Block::ListItem { depth: 1, marker: "• ".into(), text: "two".into() },
                Block::ListItem { depth: 1, marker: "3. ".into(), text: "c".into() },
                Block::ListItem { depth: 1, marker: "4. ".into(), text: "d".into() },
            ]
        );
        assert_eq!(blocks[1].lines(), vec!["  • inner".to_string()]);
    }

    #[test]
    fn code_blocks_keep_lines() {
        let blocks = parse_blocks("```text\nline 1\n  line 2\n```\n");
        assert_eq!(blocks, vec![Block::Code("line 1\n  line 2".into())]);
    }

    #[test]
    fn figure_placeholders_become_blocks() {
        let blocks = parse_blocks("前 ![FIG:cad_vs_bim]() 後\n\n![photo](x.png)\n\n![FIG:a-b]()");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("前".into()),
                fig("cad_vs_bim"),
                Block::Paragraph("後".into()),
                Block::Paragraph("photo".into()),
                Block::Paragraph("FIG:a-b".into()),
            ]
        );
    }

    #[test]
    fn tables_flatten_to_rows() {
        let blocks = parse_blocks("| LOD | 内容 |\n|---|---|\n| 100 | 概略 |\n");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("LOD | 内容".into()),
                Block::Paragraph("100 | 概略".into()),
            ]
        );
    }

    #[test]
    fn sections_split_at_level() {
        let md = "# 第1章｜A\n\n導入\n\n#### 1.1 X\n\nx\n\n##### 詳細\n\n![FIG:f]()\n\n#### 1.2 Y\n\ny\n";
        let s = split_sections(&parse_blocks(md), 4);
        assert_eq!(s.title.as_deref(), Some("第1章｜A"));
        assert_eq!(s.preamble, vec![Block::Paragraph("導入".into())]);
        assert_eq!(s.sections.len(), 2);
        assert_eq!(s.sections[0].title, "1.1 X");
        assert_eq!(s.sections[0].blocks.len(), 3);
        assert_eq!(s.sections[0].figures().count(), 1);
        assert_eq!(s.sections[1].blocks, vec![Block::Paragraph("y".into())]);
    }

    #[test]
    fn no_sections_keeps_everything_in_preamble() {
        let s = split_sections(&parse_blocks("# T\n\na\n\nb"), 4);
        assert!(s.sections.is_empty());
        assert_eq!(s.preamble.len(), 2);
    }
}
