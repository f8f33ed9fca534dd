//! Shared types, error model, and configuration for manubuild.
//!
//! This crate is the foundation depended on by all other manubuild crates.
//! It provides:
//! - [`ManubuildError`], the unified error type
//! - Domain types ([`Volume`], [`Chapter`], [`FigureId`])
//! - Configuration ([`AppConfig`], config loading)
//! - [`ProjectPaths`], the path resolver, and [`find_font_file`]

pub mod config;
pub mod error;
pub mod files;
pub mod fonts;
pub mod paths;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, FigureConfig, PathsConfig, PdfConfig, ProjectConfig,
    RenderConfig, SlidesConfig, VolumeConfig, VolumesConfig, config_file_path, init_config,
    load_config, load_config_from, user_config_dir,
};
pub use error::{ManubuildError, Result};
pub use files::write_atomic;
pub use fonts::find_font_file;
pub use paths::ProjectPaths;
pub use types::{Chapter, FigureId, Volume, chapter_filename};
