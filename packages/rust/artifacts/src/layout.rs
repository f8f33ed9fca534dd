//! Page layout for the PDF book.
//!
//! Blocks are flowed onto A4 pages as positioned [`Item`]s. Positions are in
//! millimetres from the bottom-left corner, which is what the PDF writer uses.
//! Nothing here touches the PDF backend, so layouts can be inspected directly.

use manubuild_manuscript::Block;
use manubuild_shared::{FigureId, PdfConfig};

/// Points to millimetres.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

const LINE_SPACING: f32 = 1.45;
const PARAGRAPH_GAP: f32 = 2.0;
const HEADING_GAP: f32 = 4.0;
const FIGURE_GAP: f32 = 4.0;
const LIST_INDENT: f32 = 5.0;

const TITLE_COLOR: u32 = 0x2E4053;
const H1_COLOR: u32 = 0x1F618D;
const H2_COLOR: u32 = 0x2874A6;
const BODY_COLOR: u32 = 0x000000;
const CODE_COLOR: u32 = 0x333333;
const RULE_COLOR: u32 = 0x999999;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Paper size and margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for PageSetup {
    /// A4 with 20mm top/bottom and 25mm left/right margins.
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            top: 20.0,
            bottom: 20.0,
            left: 25.0,
            right: 25.0,
        }
    }
}

impl PageSetup {
    pub fn content_width(&self) -> f32 {
        self.width - self.left - self.right
    }

    pub fn content_height(&self) -> f32 {
        self.height - self.top - self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Mono,
}

/// Something placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        color: u32,
        face: Face,
        text: String,
    },
    /// `y` is the bottom edge.
    Image {
        id: FigureId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Rule { x1: f32, x2: f32, y: f32, color: u32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|i| match i {
            Item::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Cover page content.
#[derive(Debug, Clone)]
pub struct Cover {
    pub title: String,
    pub label: String,
}

/// Result of laying out a whole book.
#[derive(Debug, Clone, Default)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
    pub placed: Vec<FigureId>,
    pub missing: Vec<FigureId>,
}

// ---------------------------------------------------------------------------
// Text measurement
// ---------------------------------------------------------------------------

/// Full-width characters: CJK, kana, hangul, full-width forms.
pub fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x20000..=0x2FFFD)
}

/// Estimated advance of `ch` in ems.
pub fn char_width_em(ch: char, face: Face) -> f32 {
    if is_wide(ch) {
        return 1.0;
    }
    match face {
        Face::Mono => 0.6,
        Face::Regular => match ch {
            ' ' => 0.28,
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
            'm' | 'w' | 'M' | 'W' => 0.85,
            c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.64,
            c if c.is_ascii() => 0.52,
            _ => 0.6,
        },
    }
}

pub fn text_width_mm(text: &str, size: f32, face: Face) -> f32 {
    text.chars().map(|c| char_width_em(c, face)).sum::<f32>() * size * PT_TO_MM
}

/// Greedy line breaking to `max_mm`.
///
/// Wide characters may break anywhere; other text breaks at the last space
/// on the line, or mid-word when a line has no space. Existing newlines are
/// kept as breaks.
pub fn wrap(text: &str, max_mm: f32, size: f32, face: Face) -> Vec<String> {
    let em = size * PT_TO_MM;
    let mut out = Vec::new();

    for raw in text.split('\n') {
        let mut line = String::new();
        let mut width = 0.0;

        for ch in raw.chars() {
            let advance = char_width_em(ch, face) * em;
            if width + advance > max_mm && !line.is_empty() {
                if ch == ' ' {
                    out.push(std::mem::take(&mut line));
                    width = 0.0;
                    continue;
                }
                let space = if is_wide(ch) {
                    None
                } else {
                    line.rfind(' ').filter(|&i| i > 0)
                };
                match space {
                    Some(i) => {
                        let rest = line[i + 1..].to_string();
                        line.truncate(i);
                        out.push(std::mem::take(&mut line));
                        line = rest;
                    }
                    None => out.push(std::mem::take(&mut line)),
                }
                width = text_width_mm(&line, size, face);
            }
            line.push(ch);
            width += advance;
        }
        out.push(line);
    }
    out
}

// ---------------------------------------------------------------------------
// Layout engine
// ---------------------------------------------------------------------------

struct Flow<'a, F> {
    setup: PageSetup,
    config: &'a PdfConfig,
    dims: F,
    pages: Vec<Page>,
    page: Page,
    /// Distance from the top margin already used on the current page.
    cursor: f32,
    placed: Vec<FigureId>,
    missing: Vec<FigureId>,
}

impl<F> Flow<'_, F>
where
    F: Fn(&FigureId) -> Option<(u32, u32)>,
{
    fn new_page(&mut self) {
        let done = std::mem::take(&mut self.page);
        self.pages.push(done);
        self.cursor = 0.0;
    }

    fn page_is_empty(&self) -> bool {
        self.page.items.is_empty()
    }

    fn remaining(&self) -> f32 {
        self.setup.content_height() - self.cursor
    }

    fn gap(&mut self, mm: f32) {
        if !self.page_is_empty() {
            self.cursor += mm;
        }
    }

    fn line(&mut self, x: f32, text: String, size: f32, color: u32, face: Face) {
        let height = size * PT_TO_MM * LINE_SPACING;
        if height > self.remaining() && !self.page_is_empty() {
            self.new_page();
        }
        let baseline = self.setup.height - self.setup.top - self.cursor - size * PT_TO_MM;
        self.page.items.push(Item::Text {
            x,
            y: baseline,
            size,
            color,
            face,
            text,
        });
        self.cursor += height;
    }

    fn wrapped(&mut self, indent: f32, text: &str, size: f32, color: u32, face: Face) {
        let x = self.setup.left + indent;
        let max = self.setup.content_width() - indent;
        for line in wrap(text, max, size, face) {
            self.line(x, line, size, color, face);
        }
    }

    fn cover(&mut self, cover: &Cover) {
        let center = self.setup.width / 2.0;
        let mut y = self.setup.height * 0.55;
        for line in wrap(&cover.title, self.setup.content_width(), 24.0, Face::Regular) {
            let width = text_width_mm(&line, 24.0, Face::Regular);
            self.page.items.push(Item::Text {
                x: center - width / 2.0,
                y,
                size: 24.0,
                color: TITLE_COLOR,
                face: Face::Regular,
                text: line,
            });
            y -= 24.0 * PT_TO_MM * LINE_SPACING;
        }
        y -= 10.0;
        let width = text_width_mm(&cover.label, 14.0, Face::Regular);
        self.page.items.push(Item::Text {
            x: center - width / 2.0,
            y,
            size: 14.0,
            color: TITLE_COLOR,
            face: Face::Regular,
            text: cover.label.clone(),
        });
        self.new_page();
    }

    fn heading(&mut self, level: u8, text: &str, after_chapter_heading: bool) {
        let breaks = self.config.break_on_sections
            && level >= self.config.section_level
            && !after_chapter_heading
            && !self.page_is_empty();
        if breaks {
            self.new_page();
        }

        let (size, color) = if level <= 1 { (18.0, H1_COLOR) } else { (14.0, H2_COLOR) };
        self.gap(HEADING_GAP);
        self.wrapped(0.0, text, size, color, Face::Regular);
        self.cursor += 1.0;
    }

    fn figure(&mut self, id: &FigureId) {
        let Some((px_w, px_h)) = (self.dims)(id).filter(|(w, h)| *w > 0 && *h > 0) else {
            self.missing.push(id.clone());
            return;
        };

        let aspect = px_h as f32 / px_w as f32;
        let mut width = self.setup.content_width();
        let mut height = width * aspect;
        if height > self.setup.content_height() {
            height = self.setup.content_height();
            width = height / aspect;
        }

        self.gap(FIGURE_GAP);
        if height > self.remaining() && !self.page_is_empty() {
            self.new_page();
        }
        let x = self.setup.left + (self.setup.content_width() - width) / 2.0;
        let y = self.setup.height - self.setup.top - self.cursor - height;
        self.page.items.push(Item::Image {
            id: id.clone(),
            x,
            y,
            width,
            height,
        });
        self.cursor += height + FIGURE_GAP;
        self.placed.push(id.clone());
    }

    fn rule(&mut self) {
        self.gap(PARAGRAPH_GAP);
        if self.remaining() < PARAGRAPH_GAP {
            self.new_page();
        }
        let y = self.setup.height - self.setup.top - self.cursor;
        self.page.items.push(Item::Rule {
            x1: self.setup.left,
            x2: self.setup.width - self.setup.right,
            y,
            color: RULE_COLOR,
        });
        self.cursor += PARAGRAPH_GAP;
    }

    fn chapter(&mut self, blocks: &[Block]) {
        if !self.page_is_empty() {
            self.new_page();
        }

        let body = self.config.body_font_size;
        let mut previous: Option<&Block> = None;
        for block in blocks {
            match block {
                Block::Heading { level, text } => {
                    let after_chapter_heading = matches!(previous, Some(Block::Heading { level: 1, .. }));
                    self.heading(*level, text, after_chapter_heading);
                }
                Block::Paragraph(text) => {
                    self.gap(PARAGRAPH_GAP);
                    self.wrapped(0.0, text, body, BODY_COLOR, Face::Regular);
                }
                Block::ListItem { depth, marker, text } => {
                    let indent = depth.saturating_sub(1) as f32 * LIST_INDENT;
                    self.wrapped(indent, &format!("{marker}{text}"), body, BODY_COLOR, Face::Regular);
                }
                Block::Code(code) => {
                    self.gap(PARAGRAPH_GAP);
                    self.wrapped(LIST_INDENT, code, body - 1.5, CODE_COLOR, Face::Mono);
                }
                Block::Figure(id) => self.figure(id),
                Block::Rule => self.rule(),
            }
            previous = Some(block);
        }
    }
}

/// Lay out a cover page followed by each chapter's blocks.
///
/// `dims` returns the pixel size of a figure image, or `None` when it is
/// unavailable; such figures are skipped and reported in `missing`.
pub fn layout_document<F>(
    setup: PageSetup,
    config: &PdfConfig,
    cover: &Cover,
    chapters: &[Vec<Block>],
    dims: F,
) -> DocumentLayout
where
    F: Fn(&FigureId) -> Option<(u32, u32)>,
{
    let mut flow = Flow {
        setup,
        config,
        dims,
        pages: Vec::new(),
        page: Page::default(),
        cursor: 0.0,
        placed: Vec::new(),
        missing: Vec::new(),
    };

    flow.cover(cover);
    for blocks in chapters {
        flow.chapter(blocks);
    }
    if !flow.page_is_empty() {
        flow.new_page();
    }

    DocumentLayout {
        pages: flow.pages,
        placed: flow.placed,
        missing: flow.missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manubuild_manuscript::parse_blocks;

    fn cover() -> Cover {
        Cover {
            title: "BIM教科書".into(),
            label: "VOL1".into(),
        }
    }

    fn no_figures(_: &FigureId) -> Option<(u32, u32)> {
        None
    }

    #[test]
    fn wide_text_breaks_anywhere() {
        let em = 10.0 * PT_TO_MM;
        let lines = wrap("あいうえおかきくけこ", em * 4.0 + 0.01, 10.0, Face::Regular);
        assert_eq!(lines, vec!["あいうえ", "おかきく", "けこ"]);
    }

    #[test]
    fn latin_text_breaks_at_spaces() {
        let max = text_width_mm("alpha beta", 10.0, Face::Regular) + 0.01;
        let lines = wrap("alpha beta alpha beta", max, 10.0, Face::Regular);
        assert_eq!(lines, vec!["alpha beta", "alpha beta"]);
        for line in &lines {
            assert!(text_width_mm(line, 10.0, Face::Regular) <= max);
        }
    }

    #[test]
    fn long_word_breaks_mid_word() {
        let max = text_width_mm("abcd", 10.0, Face::Mono) + 0.01;
        assert_eq!(wrap("abcdefgh", max, 10.0, Face::Mono), vec!["abcd", "efgh"]);
    }

    #[test]
    fn newlines_are_kept() {
        assert_eq!(wrap("a\n\nb", 100.0, 10.0, Face::Regular), vec!["a", "", "b"]);
    }

    #[test]
    fn cover_and_chapters_start_new_pages() {
        let chapters = vec![
            parse_blocks("# 第1章｜A\n\n本文"),
            parse_blocks("# 第2章｜B\n\n本文"),
        ];
        let layout = layout_document(PageSetup::default(), &PdfConfig::default(), &cover(), &chapters, no_figures);

        assert_eq!(layout.pages.len(), 3);
        assert!(layout.pages[0].texts().any(|t| t == "BIM教科書"));
        assert_eq!(layout.pages[1].texts().next(), Some("第1章｜A"));
        assert_eq!(layout.pages[2].texts().next(), Some("第2章｜B"));
    }

    #[test]
    fn sections_break_pages_except_first() {
        let md = "# 第1章｜A\n\n#### 1.1 X\n\nx\n\n#### 1.2 Y\n\ny\n\n##### deeper\n\nz";
        let chapters = vec![parse_blocks(md)];
        let layout = layout_document(PageSetup::default(), &PdfConfig::default(), &cover(), &chapters, no_figures);

        // cover, [chapter heading + 1.1], [1.2], [deeper]
        assert_eq!(layout.pages.len(), 4);
        let first: Vec<&str> = layout.pages[1].texts().collect();
        assert_eq!(first, vec!["第1章｜A", "1.1 X", "x"]);
        assert_eq!(layout.pages[2].texts().next(), Some("1.2 Y"));
        assert_eq!(layout.pages[3].texts().next(), Some("deeper"));

        let config = PdfConfig {
            break_on_sections: false,
            ..PdfConfig::default()
        };
        let flat = layout_document(PageSetup::default(), &config, &cover(), &chapters, no_figures);
        assert_eq!(flat.pages.len(), 2);
    }

    #[test]
    fn long_chapters_overflow_onto_new_pages() {
        let body = "段落の本文です。".repeat(40);
        let md = format!("# 第1章｜A\n\n{}", vec![body; 20].join("\n\n"));
        let setup = PageSetup::default();
        let layout = layout_document(setup, &PdfConfig::default(), &cover(), &[parse_blocks(&md)], no_figures);

        assert!(layout.pages.len() > 3);
        for page in &layout.pages[1..] {
            for item in &page.items {
                if let Item::Text { x, y, text, size, .. } = item {
                    assert!(*y >= setup.bottom - 0.01, "text below margin: {text}");
                    assert!(x + text_width_mm(text, *size, Face::Regular) <= setup.width - setup.right + 0.01);
                }
            }
        }
    }

    #[test]
    fn figures_scale_to_content_width() {
        let md = "# 第1章｜A\n\n![FIG:wide]()\n\n![FIG:tall]()\n\n![FIG:gone]()";
        let dims = |id: &FigureId| match id.as_str() {
            "wide" => Some((1500, 900)),
            "tall" => Some((100, 1000)),
            _ => None,
        };
        let setup = PageSetup::default();
        let layout = layout_document(setup, &PdfConfig::default(), &cover(), &[parse_blocks(md)], dims);

        let images: Vec<(f32, f32)> = layout
            .pages
            .iter()
            .flat_map(|p| &p.items)
            .filter_map(|i| match i {
                Item::Image { width, height, .. } => Some((*width, *height)),
                _ => None,
            })
            .collect();
        assert_eq!(images.len(), 2);
        assert!((images[0].0 - setup.content_width()).abs() < 0.01);
        assert!((images[0].1 - setup.content_width() * 0.6).abs() < 0.01);
        assert!((images[1].1 - setup.content_height()).abs() < 0.01);
        assert!(images[1].0 < setup.content_width());

        let missing: Vec<&str> = layout.missing.iter().map(FigureId::as_str).collect();
        assert_eq!(missing, vec!["gone"]);
        assert_eq!(layout.placed.len(), 2);
    }

    #[test]
    fn list_items_are_indented_by_depth() {
        let layout = layout_document(
            PageSetup::default(),
            &PdfConfig::default(),
            &cover(),
            &[parse_blocks("- a\n  - b\n")],
            no_figures,
        );
        let xs: Vec<(f32, &str)> = layout.pages[1]
            .items
            .iter()
            .filter_map(|i| match i {
                Item::Text { x, text, .. } => Some((*x, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![(25.0, "• a"), (30.0, "• b")]);
    }
}
