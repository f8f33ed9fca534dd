//! Build stages and the end-to-end orchestrator.
//!
//! `split → figures → pdf → slides → manifest`. Each stage can also be run on
//! its own; the document stages read the split chapter files back from disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use manubuild_artifacts::{Cover, PdfBuilder, PdfSummary, PptxBuilder, PptxSummary};
use manubuild_diagrams::{DiagramGenerator, DiagramReport};
use manubuild_manuscript::{
    ChapterFile, Manuscript, collect_figure_references, load_chapter_files, parse_master_file,
};
use manubuild_shared::{AppConfig, ProjectPaths, Result, Volume, load_config, load_config_from};

use crate::manifest::{DistManifest, VolumeStats, artifact_meta, write_manifest};
use crate::split::{VolumeSplit, split_manuscript};

/// Resolved configuration and locations for one project.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub paths: ProjectPaths,
    pub config: AppConfig,
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>, config: AppConfig) -> Self {
        let paths = ProjectPaths::new(root, &config);
        Self { paths, config }
    }

    /// Load the config for `root`, from `config_file` when given.
    pub fn load(root: &Path, config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => load_config_from(path)?,
            None => load_config(root)?,
        };
        Ok(Self::new(root, config))
    }
}

/// Result of a full build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub chapters: BTreeMap<Volume, usize>,
    pub figures: DiagramReport,
    pub pdfs: Vec<PdfSummary>,
    pub decks: Vec<PptxSummary>,
    pub manifest: PathBuf,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Every deliverable file, PDFs first.
    pub fn deliverables(&self) -> Vec<&Path> {
        self.pdfs
            .iter()
            .map(|p| p.path.as_path())
            .chain(self.decks.iter().map(|d| d.path.as_path()))
            .collect()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn phase(&self, name: &str);
    /// Called as each unit of work in a stage completes.
    fn task_progress(&self, current: usize, total: usize, detail: &str);
    /// Called when a full build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn task_progress(&self, _current: usize, _total: usize, _detail: &str) {}
    fn done(&self, _report: &BuildReport) {}
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Parse the master document. Nothing is written.
pub fn load_manuscript(ctx: &BuildContext) -> Result<Manuscript> {
    parse_master_file(&ctx.paths.master_file)
}

/// Parse the master document and write the per-volume chapter files.
#[instrument(skip_all, fields(root = %ctx.paths.root.display()))]
pub fn split_stage(ctx: &BuildContext, progress: &dyn ProgressReporter) -> Result<Vec<VolumeSplit>> {
    let manuscript = load_manuscript(ctx)?;
    ctx.paths.ensure_dirs()?;
    write_chapters(ctx, &manuscript, progress)
}

/// Parse the master document and render every referenced figure.
#[instrument(skip_all, fields(root = %ctx.paths.root.display()))]
pub fn figures_stage(ctx: &BuildContext, progress: &dyn ProgressReporter) -> Result<DiagramReport> {
    let manuscript = load_manuscript(ctx)?;
    ctx.paths.ensure_dirs()?;
    render_figures(ctx, &manuscript, progress)
}

/// Build one PDF per volume from the split chapter files.
#[instrument(skip_all, fields(root = %ctx.paths.root.display()))]
pub fn pdf_stage(ctx: &BuildContext, progress: &dyn ProgressReporter) -> Result<Vec<PdfSummary>> {
    progress.phase("Building PDFs");
    let builder = PdfBuilder::from_config(&ctx.paths, &ctx.config);

    let mut out = Vec::with_capacity(Volume::ALL.len());
    for (i, volume) in Volume::ALL.into_iter().enumerate() {
        let chapters = load_chapter_files(&ctx.paths.volume_dir(volume))?;
        let meta = ctx.config.volume(volume);
        let cover = Cover {
            title: meta.book_title.clone(),
            label: meta.toc_title.clone(),
        };
        let summary = builder.build(&cover, &chapters, &ctx.paths.pdf_path(volume))?;
        info!(volume = %volume, pages = summary.pages, path = %summary.path.display(), "PDF built");
        progress.task_progress(i + 1, Volume::ALL.len(), &file_label(&summary.path));
        out.push(summary);
    }
    Ok(out)
}

/// Build one PPTX deck per volume from the split chapter files.
#[instrument(skip_all, fields(root = %ctx.paths.root.display()))]
pub fn slides_stage(ctx: &BuildContext, progress: &dyn ProgressReporter) -> Result<Vec<PptxSummary>> {
    progress.phase("Building slide decks");
    let builder = PptxBuilder::from_config(&ctx.paths, &ctx.config);

    let mut out = Vec::with_capacity(Volume::ALL.len());
    for (i, volume) in Volume::ALL.into_iter().enumerate() {
        let chapters: Vec<ChapterFile> = load_chapter_files(&ctx.paths.volume_dir(volume))?;
        let meta = ctx.config.volume(volume);
        let summary = builder.build(
            &meta.deck_title,
            &meta.deck_subtitle,
            &chapters,
            &ctx.paths.pptx_path(volume),
        )?;
        info!(volume = %volume, slides = summary.slides, path = %summary.path.display(), "PPTX built");
        progress.task_progress(i + 1, Volume::ALL.len(), &file_label(&summary.path));
        out.push(summary);
    }
    Ok(out)
}

/// Run every stage and write `dist/manifest.json`.
///
/// The master document is parsed before anything is created, so a missing or
/// malformed manuscript leaves the project untouched.
#[instrument(skip_all, fields(root = %ctx.paths.root.display()))]
pub fn build_all(ctx: &BuildContext, progress: &dyn ProgressReporter) -> Result<BuildReport> {
    let start = Instant::now();

    progress.phase("Parsing manuscript");
    let manuscript = load_manuscript(ctx)?;
    ctx.paths.ensure_dirs()?;

    write_chapters(ctx, &manuscript, progress)?;
    let figures = render_figures(ctx, &manuscript, progress)?;
    let pdfs = pdf_stage(ctx, progress)?;
    let decks = slides_stage(ctx, progress)?;

    progress.phase("Writing manifest");
    let mut manifest = DistManifest::new(&ctx.config);
    for volume in Volume::ALL {
        let chapters = manuscript.chapters(volume);
        manifest.volumes.insert(
            ctx.paths.slug(volume).to_string(),
            VolumeStats {
                chapters: chapters.len(),
                figures: collect_figure_references(chapters).len(),
            },
        );
    }
    for path in pdfs.iter().map(|p| &p.path).chain(decks.iter().map(|d| &d.path)) {
        manifest.artifacts.push(artifact_meta(path)?);
    }
    let manifest_path = ctx.paths.manifest_path();
    write_manifest(&manifest_path, &manifest)?;

    let report = BuildReport {
        chapters: Volume::ALL
            .into_iter()
            .map(|v| (v, manuscript.chapters(v).len()))
            .collect(),
        figures,
        pdfs,
        decks,
        manifest: manifest_path,
        elapsed: start.elapsed(),
    };

    info!(
        chapters = manuscript.chapter_count(),
        figures = report.figures.total(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "build complete"
    );
    progress.done(&report);
    Ok(report)
}

fn write_chapters(
    ctx: &BuildContext,
    manuscript: &Manuscript,
    progress: &dyn ProgressReporter,
) -> Result<Vec<VolumeSplit>> {
    progress.phase("Splitting chapters");
    let splits = split_manuscript(manuscript, &ctx.paths, &ctx.config)?;
    for (i, s) in splits.iter().enumerate() {
        progress.task_progress(i + 1, splits.len(), ctx.paths.slug(s.volume));
    }
    Ok(splits)
}

fn render_figures(
    ctx: &BuildContext,
    manuscript: &Manuscript,
    progress: &dyn ProgressReporter,
) -> Result<DiagramReport> {
    progress.phase("Rendering figures");
    let ids = manuscript.figure_references();
    let report = DiagramGenerator::from_config(&ctx.paths, &ctx.config).generate_all(&ids)?;
    progress.task_progress(report.total(), ids.len(), "figures");
    Ok(report)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
