//! PDF book rendering with printpdf.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use printpdf::{
    BuiltinFont, Color, Image as PdfImage, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use tracing::{debug, info, instrument, warn};

use manubuild_manuscript::{Block, ChapterFile};
use manubuild_shared::{
    AppConfig, FigureId, ManubuildError, PdfConfig, ProjectPaths, Result, find_font_file,
    write_atomic,
};

use crate::layout::{Cover, Face, Item, PageSetup, layout_document};

/// What a PDF build produced.
#[derive(Debug, Clone)]
pub struct PdfSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub figures: usize,
    pub missing: Vec<FigureId>,
    /// TrueType font embedded in the document, if any.
    pub font: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum FontSource {
    Probe(Option<PathBuf>),
    Builtin,
}

/// Lays chapters out on A4 pages and writes the PDF.
#[derive(Debug, Clone)]
pub struct PdfBuilder {
    setup: PageSetup,
    config: PdfConfig,
    figures_dir: PathBuf,
    fonts: FontSource,
}

impl PdfBuilder {
    pub fn new(figures_dir: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self {
            setup: PageSetup::default(),
            config: config.pdf.clone(),
            figures_dir: figures_dir.into(),
            fonts: FontSource::Probe(config.render.font_path.clone()),
        }
    }

    pub fn from_config(paths: &ProjectPaths, config: &AppConfig) -> Self {
        Self::new(&paths.figures, config)
    }

    /// Skip font probing and use the built-in Helvetica/Courier faces.
    pub fn builtin_fonts(mut self) -> Self {
        self.fonts = FontSource::Builtin;
        self
    }

    /// Render `chapters` behind a cover page and write the result to `output`.
    #[instrument(skip_all, fields(output = %output.display(), chapters = chapters.len()))]
    pub fn build(&self, cover: &Cover, chapters: &[ChapterFile], output: &Path) -> Result<PdfSummary> {
        let blocks: Vec<Vec<Block>> = chapters.iter().map(ChapterFile::blocks).collect();
        let images = self.load_figures(&blocks);

        let layout = layout_document(self.setup, &self.config, cover, &blocks, |id| {
            images.get(id).map(|img| (img.width(), img.height()))
        });
        for id in &layout.missing {
            warn!(figure = %id, dir = %self.figures_dir.display(), "figure image missing, skipped");
        }

        let (doc, font) = self.render(&cover.title, &layout.pages, &images)?;
        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ManubuildError::Render(format!("failed to serialize PDF: {e}")))?;
        write_atomic(output, &bytes)?;

        info!(
            pages = layout.pages.len(),
            figures = layout.placed.len(),
            size = bytes.len(),
            "PDF written"
        );

        Ok(PdfSummary {
            path: output.to_path_buf(),
            pages: layout.pages.len(),
            figures: layout.placed.len(),
            missing: layout.missing,
            font,
        })
    }

    fn load_figures(&self, chapters: &[Vec<Block>]) -> HashMap<FigureId, DynamicImage> {
        let mut images = HashMap::new();
        for id in chapters.iter().flatten().filter_map(|b| match b {
            Block::Figure(id) => Some(id),
            _ => None,
        }) {
            if images.contains_key(id) {
                continue;
            }
            let path = self.figures_dir.join(id.file_name());
            if !path.is_file() {
                continue;
            }
            match image::open(&path) {
                Ok(img) => {
                    images.insert(id.clone(), img);
                }
                Err(e) => warn!(figure = %id, error = %e, "unreadable figure image"),
            }
        }
        debug!(count = images.len(), "figure images loaded");
        images
    }

    fn render(
        &self,
        title: &str,
        pages: &[crate::layout::Page],
        images: &HashMap<FigureId, DynamicImage>,
    ) -> Result<(PdfDocumentReference, Option<PathBuf>)> {
        let (w, h) = (Mm(self.setup.width), Mm(self.setup.height));
        let (doc, first_page, first_layer) = PdfDocument::new(title, w, h, "Layer 1");
        let fonts = self.fonts(&doc)?;

        for (i, page) in pages.iter().enumerate() {
            let layer = if i == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (p, l) = doc.add_page(w, h, "Layer 1");
                doc.get_page(p).get_layer(l)
            };
            for item in &page.items {
                draw(&layer, item, &fonts, images);
            }
        }

        Ok((doc, fonts.embedded))
    }

    fn fonts(&self, doc: &PdfDocumentReference) -> Result<Fonts> {
        let probed = match &self.fonts {
            FontSource::Probe(configured) => find_font_file(configured.as_deref()),
            FontSource::Builtin => None,
        };
        if let Some(path) = probed {
            let loaded = File::open(&path)
                .map_err(|e| e.to_string())
                .and_then(|f| doc.add_external_font(f).map_err(|e| e.to_string()));
            match loaded {
                Ok(font) => {
                    debug!(font = %path.display(), "embedding font");
                    return Ok(Fonts {
                        regular: font.clone(),
                        mono: font,
                        embedded: Some(path),
                    });
                }
                Err(e) => warn!(font = %path.display(), error = %e, "font not embeddable, using built-in faces"),
            }
        }

        let builtin = |f: BuiltinFont| {
            doc.add_builtin_font(f)
                .map_err(|e| ManubuildError::Render(format!("built-in font: {e}")))
        };
        Ok(Fonts {
            regular: builtin(BuiltinFont::Helvetica)?,
            mono: builtin(BuiltinFont::Courier)?,
            embedded: None,
        })
    }
}

struct Fonts {
    regular: IndirectFontRef,
    mono: IndirectFontRef,
    embedded: Option<PathBuf>,
}

fn draw(
    layer: &PdfLayerReference,
    item: &Item,
    fonts: &Fonts,
    images: &HashMap<FigureId, DynamicImage>,
) {
    match item {
        Item::Text { x, y, size, color, face, text } => {
            let (font, text) = match (face, fonts.embedded.is_some()) {
                (_, true) => (&fonts.regular, text.clone()),
                (Face::Regular, false) => (&fonts.regular, latin1(text)),
                (Face::Mono, false) => (&fonts.mono, latin1(text)),
            };
            layer.set_fill_color(rgb(*color));
            layer.use_text(text, *size, Mm(*x), Mm(*y), font);
        }
        Item::Image { id, x, y, width, .. } => {
            let Some(img) = images.get(id) else {
                return;
            };
            let dpi = img.width() as f32 * 25.4 / width;
            PdfImage::from_dynamic_image(&DynamicImage::ImageRgb8(img.to_rgb8())).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(Mm(*y)),
                    dpi: Some(dpi),
                    ..Default::default()
                },
            );
        }
        Item::Rule { x1, x2, y, color } => {
            layer.set_outline_color(rgb(*color));
            layer.set_outline_thickness(0.5);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(*y)), false),
                    (Point::new(Mm(*x2), Mm(*y)), false),
                ],
                is_closed: false,
            });
        }
    }
}

fn rgb(color: u32) -> Color {
    let channel = |shift: u32| ((color >> shift) & 0xFF) as f32 / 255.0;
    Color::Rgb(Rgb::new(channel(16), channel(8), channel(0), None))
}

/// Built-in PDF faces only cover Latin-1.
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mb-pdf-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn chapter(dir: &Path, number: u32, content: &str) -> ChapterFile {
        ChapterFile {
            path: dir.join(format!("chapter_{number:02}.md")),
            number,
            content: content.to_string(),
        }
    }

    fn cover() -> Cover {
        Cover {
            title: "BIM Textbook".into(),
            label: "VOL1".into(),
        }
    }

    #[test]
    fn builds_pdf_with_figures() {
        let dir = temp_dir();
        let figures = dir.join("figs");
        std::fs::create_dir_all(&figures).unwrap();
        image::RgbImage::from_pixel(30, 20, image::Rgb([200, 30, 30]))
            .save(figures.join("present.png"))
            .unwrap();

        let chapters = vec![
            chapter(&dir, 1, "# Chapter 1\n\nBody text.\n\n![FIG:present]()\n\n![FIG:absent]()"),
            chapter(&dir, 2, "# Chapter 2\n\n- item\n\n```\ncode\n```\n\n---\n"),
        ];
        let output = dir.join("dist/book.pdf");
        let summary = PdfBuilder::new(&figures, &AppConfig::default())
            .builtin_fonts()
            .build(&cover(), &chapters, &output)
            .unwrap();

        assert_eq!(summary.pages, 3);
        assert_eq!(summary.figures, 1);
        assert_eq!(summary.missing, vec![FigureId::new("absent").unwrap()]);
        assert!(summary.font.is_none());

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!dir.join("dist/.book.pdf.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_volume_still_has_cover() {
        let dir = temp_dir();
        let output = dir.join("empty.pdf");
        let summary = PdfBuilder::new(dir.join("figs"), &AppConfig::default())
            .builtin_fonts()
            .build(&cover(), &[], &output)
            .unwrap();
        assert_eq!(summary.pages, 1);
        assert!(output.is_file());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn latin1_replaces_wide_glyphs() {
        assert_eq!(latin1("BIM教科書 café"), "BIM??? café");
    }
}
