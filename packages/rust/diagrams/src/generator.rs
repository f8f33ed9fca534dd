//! Rendering every referenced figure to `<figures>/<id>.png`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use rusttype::Font;
use tracing::{debug, info, instrument, warn};

use manubuild_shared::{AppConfig, FigureId, ManubuildError, ProjectPaths, Result};

use crate::canvas::{Canvas, TextStyle, WHEAT, tint};
use crate::fonts::resolve_font;
use crate::registry::DiagramRegistry;

/// How a figure file came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureKind {
    Drawn,
    Placeholder,
}

/// Outcome of [`DiagramGenerator::generate_all`].
#[derive(Debug, Clone, Default)]
pub struct DiagramReport {
    pub drawn: Vec<FigureId>,
    pub placeholders: Vec<FigureId>,
}

impl DiagramReport {
    pub fn total(&self) -> usize {
        self.drawn.len() + self.placeholders.len()
    }
}

pub struct DiagramGenerator {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    font: Option<Font<'static>>,
    registry: DiagramRegistry,
}

impl DiagramGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, width: u32, height: u32, font: Option<Font<'static>>) -> Self {
        Self {
            output_dir: output_dir.into(),
            width,
            height,
            font,
            registry: DiagramRegistry::new(),
        }
    }

    /// Generator writing to the project's figures directory with the configured size and font.
    pub fn from_config(paths: &ProjectPaths, config: &AppConfig) -> Self {
        let font = resolve_font(config.render.font_path.as_deref());
        Self::new(
            paths.figures.clone(),
            config.figure.width_px,
            config.figure.height_px,
            font,
        )
    }

    pub fn with_registry(mut self, registry: DiagramRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render each id in sorted order. Ids without a routine get a placeholder,
    /// so every id ends up with an image file.
    #[instrument(skip_all, fields(count = ids.len(), dir = %self.output_dir.display()))]
    pub fn generate_all(&self, ids: &BTreeSet<FigureId>) -> Result<DiagramReport> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ManubuildError::io(&self.output_dir, e))?;

        info!("generating figures");
        let mut report = DiagramReport::default();

        for id in ids {
            match self.generate(id)? {
                FigureKind::Drawn => report.drawn.push(id.clone()),
                FigureKind::Placeholder => report.placeholders.push(id.clone()),
            }
        }

        info!(
            drawn = report.drawn.len(),
            placeholders = report.placeholders.len(),
            "figures generated"
        );
        Ok(report)
    }

    /// Render one figure, falling back to a placeholder.
    pub fn generate(&self, id: &FigureId) -> Result<FigureKind> {
        let mut canvas = Canvas::new(self.width, self.height, self.font.clone());

        let kind = match self.registry.get(id.as_str()) {
            Some(draw) => {
                debug!(figure = %id, "drawing");
                draw(&mut canvas);
                FigureKind::Drawn
            }
            None => {
                warn!(figure = %id, "no drawing routine, writing placeholder");
                draw_placeholder(&mut canvas, id);
                FigureKind::Placeholder
            }
        };

        let path = self.output_dir.join(id.file_name());
        canvas
            .into_image()
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| ManubuildError::Render(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "figure written");

        Ok(kind)
    }
}

fn draw_placeholder(canvas: &mut Canvas, id: &FigureId) {
    canvas.label(
        0.5,
        0.5,
        &format!("図: {id}\n（自動生成予定）"),
        TextStyle::new(14.0),
        tint(WHEAT, 0.5),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("mb-diagrams-test-{}", uuid::Uuid::now_v7()))
    }

    fn ids(names: &[&str]) -> BTreeSet<FigureId> {
        names.iter().map(|n| FigureId::new(*n).unwrap()).collect()
    }

    #[test]
    fn unknown_id_gets_placeholder_file() {
        let dir = temp_dir();
        let generator = DiagramGenerator::new(&dir, 300, 180, None);

        let report = generator.generate_all(&ids(&["site_photo"])).unwrap();
        assert!(report.drawn.is_empty());
        assert_eq!(report.placeholders, vec![FigureId::new("site_photo").unwrap()]);
        assert!(dir.join("site_photo.png").is_file());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn known_and_unknown_mix() {
        let dir = temp_dir();
        let generator = DiagramGenerator::new(&dir, 300, 180, None);

        let report = generator
            .generate_all(&ids(&["cad_vs_bim", "zzz_missing", "4d_5d_bim"]))
            .unwrap();
        assert_eq!(report.total(), 3);
        let drawn: Vec<&str> = report.drawn.iter().map(FigureId::as_str).collect();
        assert_eq!(drawn, vec!["4d_5d_bim", "cad_vs_bim"]);

        let (w, h) = image::image_dimensions(dir.join("cad_vs_bim.png")).unwrap();
        assert_eq!((w, h), (300, 180));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn custom_registry_replaces_builtins() {
        fn fill(c: &mut Canvas) {
            c.rect(0.0, 0.0, 1.0, 1.0, crate::canvas::Shape::fill(crate::canvas::RED));
        }
        let dir = temp_dir();
        let mut registry = DiagramRegistry::empty();
        registry.register("custom", fill);
        let generator = DiagramGenerator::new(&dir, 100, 60, None).with_registry(registry);

        let report = generator.generate_all(&ids(&["custom", "cad_vs_bim"])).unwrap();
        assert_eq!(report.drawn.len(), 1);
        assert_eq!(report.placeholders.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_set_creates_directory_only() {
        let dir = temp_dir();
        let report = DiagramGenerator::new(&dir, 100, 60, None)
            .generate_all(&BTreeSet::new())
            .unwrap();
        assert_eq!(report.total(), 0);
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
