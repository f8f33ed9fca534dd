//! Build orchestration for manubuild.
//!
//! This crate ties together manuscript parsing, chapter splitting, figure
//! rendering and deliverable assembly into the stages the CLI runs.

pub mod manifest;
pub mod pipeline;
pub mod split;

pub use manifest::{ArtifactMeta, DistManifest, VolumeStats};
pub use pipeline::{
    BuildContext, BuildReport, ProgressReporter, SilentProgress, build_all, figures_stage,
    load_manuscript, pdf_stage, slides_stage, split_stage,
};
pub use split::{TOC_FILE_NAME, VolumeSplit, render_toc, split_manuscript};
