//! Application configuration for manubuild.
//!
//! The project config lives at `<root>/manubuild.toml`; when it is absent the
//! user-level `~/.manubuild/manubuild.toml` is tried, then built-in defaults.
//! Keys missing from a file take their default value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ManubuildError, Result};
use crate::types::Volume;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "manubuild.toml";

/// User-level config directory name under the home directory.
const CONFIG_DIR_NAME: &str = ".manubuild";

/// Smallest accepted `pdf.body_font_size`, in points.
pub const MIN_BODY_FONT_SIZE: f32 = 4.0;

// ---------------------------------------------------------------------------
// Config structs (matching manubuild.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub volumes: VolumesConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub figure: FigureConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub slides: SlidesConfig,
}

impl AppConfig {
    /// Display and naming settings for one volume.
    pub fn volume(&self, volume: Volume) -> &VolumeConfig {
        match volume {
            Volume::Vol1 => &self.volumes.vol1,
            Volume::Vol2 => &self.volumes.vol2,
        }
    }

    /// Reject settings that would produce colliding or unusable outputs.
    pub fn validate(&self) -> Result<()> {
        let (a, b) = (&self.volumes.vol1.slug, &self.volumes.vol2.slug);
        for slug in [a, b] {
            if slug.is_empty() || slug.contains(['/', '\\']) || slug.starts_with('.') {
                return Err(ManubuildError::config(format!("invalid volume slug '{slug}'")));
            }
        }
        if a == b {
            return Err(ManubuildError::config(format!(
                "volume slugs must differ (both are '{a}')"
            )));
        }
        if self.figure.width_px == 0 || self.figure.height_px == 0 {
            return Err(ManubuildError::config("figure size must be non-zero"));
        }
        if !(1..=6).contains(&self.pdf.section_level) || !(1..=6).contains(&self.slides.section_level) {
            return Err(ManubuildError::config("section_level must be between 1 and 6"));
        }
        // Code blocks are set 1.5pt below body text.
        let size = self.pdf.body_font_size;
        if size.is_nan() || size < MIN_BODY_FONT_SIZE {
            return Err(ManubuildError::config(format!(
                "pdf.body_font_size must be at least {MIN_BODY_FONT_SIZE}"
            )));
        }
        Ok(())
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_name")]
    pub name: String,
    #[serde(default = "default_project_version")]
    pub version: String,
    #[serde(default = "default_project_description")]
    pub description: String,
    #[serde(default = "default_project_author")]
    pub author: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            version: default_project_version(),
            description: default_project_description(),
            author: default_project_author(),
        }
    }
}

fn default_project_name() -> String {
    "BIM利用技術者試験 教科書シリーズ".into()
}
fn default_project_version() -> String {
    "1.0.0".into()
}
fn default_project_description() -> String {
    "BIM利用技術者試験2級・準1級対応教科書".into()
}
fn default_project_author() -> String {
    "BIM教育チーム".into()
}

/// `[paths]` section. Relative paths resolve against the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_master")]
    pub master: PathBuf,
    #[serde(default = "default_manuscript")]
    pub manuscript: PathBuf,
    #[serde(default = "default_figures")]
    pub figures: PathBuf,
    #[serde(default = "default_dist")]
    pub dist: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            master: default_master(),
            manuscript: default_manuscript(),
            figures: default_figures(),
            dist: default_dist(),
        }
    }
}

fn default_master() -> PathBuf {
    "MASTER.md".into()
}
fn default_manuscript() -> PathBuf {
    "manuscript".into()
}
fn default_figures() -> PathBuf {
    PathBuf::from("assets").join("figs")
}
fn default_dist() -> PathBuf {
    "dist".into()
}

/// `[volumes]` section: one table per volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumesConfig {
    #[serde(default = "default_vol1")]
    pub vol1: VolumeConfig,
    #[serde(default = "default_vol2")]
    pub vol2: VolumeConfig,
}

impl Default for VolumesConfig {
    fn default() -> Self {
        Self {
            vol1: default_vol1(),
            vol2: default_vol2(),
        }
    }
}

/// `[volumes.volN]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Directory and deliverable file stem (`vol1_2kyu`).
    pub slug: String,
    /// Heading of the generated `00_toc.md`.
    pub toc_title: String,
    /// Title printed on the PDF cover.
    pub book_title: String,
    /// Title slide heading.
    pub deck_title: String,
    /// Title slide subtitle.
    pub deck_subtitle: String,
}

fn default_vol1() -> VolumeConfig {
    VolumeConfig {
        slug: "vol1_2kyu".into(),
        toc_title: "VOL1: BIM利用技術者試験2級対応".into(),
        book_title: "BIM利用技術者試験 教科書".into(),
        deck_title: "BIM利用技術者試験2級対応".into(),
        deck_subtitle: "教科書・講義スライド".into(),
    }
}

fn default_vol2() -> VolumeConfig {
    VolumeConfig {
        slug: "vol2_jun1kyu".into(),
        toc_title: "VOL2: BIM利用技術者試験準1級対応".into(),
        book_title: "BIM利用技術者試験 教科書".into(),
        deck_title: "BIM利用技術者試験準1級対応".into(),
        deck_subtitle: "教科書・講義スライド".into(),
    }
}

/// `[render]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    /// TrueType font used for diagrams and embedded into PDFs.
    /// When unset, well-known system locations are probed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

/// `[figure]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureConfig {
    #[serde(default = "default_figure_width")]
    pub width_px: u32,
    #[serde(default = "default_figure_height")]
    pub height_px: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width_px: default_figure_width(),
            height_px: default_figure_height(),
        }
    }
}

fn default_figure_width() -> u32 {
    1500
}
fn default_figure_height() -> u32 {
    900
}

/// `[pdf]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Heading level treated as a section boundary.
    #[serde(default = "default_section_level")]
    pub section_level: u8,
    /// Start every section on a new page.
    #[serde(default = "default_true")]
    pub break_on_sections: bool,
    #[serde(default = "default_body_font_size")]
    pub body_font_size: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            section_level: default_section_level(),
            break_on_sections: true,
            body_font_size: default_body_font_size(),
        }
    }
}

fn default_section_level() -> u8 {
    4
}
fn default_true() -> bool {
    true
}
fn default_body_font_size() -> f32 {
    10.5
}

/// `[slides]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidesConfig {
    #[serde(default = "default_section_level")]
    pub section_level: u8,
    /// Content slides per chapter.
    #[serde(default = "default_max_sections")]
    pub max_sections: usize,
    /// Non-empty lines per content slide.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    /// Characters per line before truncation.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            section_level: default_section_level(),
            max_sections: default_max_sections(),
            max_lines: default_max_lines(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_sections() -> usize {
    5
}
fn default_max_lines() -> usize {
    10
}
fn default_max_chars() -> usize {
    100
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the project config file (`<root>/manubuild.toml`).
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Get the path to the user-level config directory (`~/.manubuild/`).
pub fn user_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ManubuildError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Load the config for a project root.
///
/// Tries `<root>/manubuild.toml`, then `~/.manubuild/manubuild.toml`,
/// and returns defaults if neither exists.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let project = config_file_path(root);
    if project.exists() {
        return load_config_from(&project);
    }

    if let Ok(dir) = user_config_dir() {
        let user = dir.join(CONFIG_FILE_NAME);
        if user.exists() {
            return load_config_from(&user);
        }
    }

    tracing::debug!(path = ?project, "config file not found, using defaults");
    Ok(AppConfig::default())
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ManubuildError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ManubuildError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    tracing::debug!(?path, "loaded config");
    Ok(config)
}

/// Write a default config file into the project root.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_config(root: &Path, force: bool) -> Result<PathBuf> {
    let path = config_file_path(root);
    if path.exists() && !force {
        return Err(ManubuildError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    std::fs::create_dir_all(root).map_err(|e| ManubuildError::io(root, e))?;
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| ManubuildError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ManubuildError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mb-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("vol1_2kyu"));
        assert!(toml_str.contains("MASTER.md"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.slides.max_sections, 5);
        assert_eq!(parsed.volumes.vol2.slug, "vol2_jun1kyu");
        assert_eq!(parsed.figure.width_px, 1500);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[paths]
master = "book/MASTER.md"

[volumes.vol2]
slug = "advanced"
toc_title = "Advanced"
book_title = "Book"
deck_title = "Deck"
deck_subtitle = "Slides"

[slides]
max_lines = 6
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.master, PathBuf::from("book/MASTER.md"));
        assert_eq!(config.paths.dist, PathBuf::from("dist"));
        assert_eq!(config.volume(Volume::Vol1).slug, "vol1_2kyu");
        assert_eq!(config.volume(Volume::Vol2).slug, "advanced");
        assert_eq!(config.slides.max_lines, 6);
        assert_eq!(config.slides.max_chars, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_colliding_slugs() {
        let mut config = AppConfig::default();
        config.volumes.vol2.slug = config.volumes.vol1.slug.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));

        config.volumes.vol2.slug = "../escape".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_tiny_body_font() {
        let mut config = AppConfig::default();
        config.pdf.body_font_size = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("body_font_size"));

        config.pdf.body_font_size = f32::NAN;
        assert!(config.validate().is_err());

        config.pdf.body_font_size = MIN_BODY_FONT_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn init_then_load() {
        let tmp = temp_dir();
        let path = init_config(&tmp, false).unwrap();
        assert!(path.exists());

        let config = load_config(&tmp).unwrap();
        assert_eq!(config.pdf.section_level, 4);

        assert!(init_config(&tmp, false).is_err());
        assert!(init_config(&tmp, true).is_ok());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let tmp = temp_dir();
        std::fs::write(config_file_path(&tmp), "[figure]\nwidth_px = \"wide\"\n").unwrap();
        let err = load_config_from(&config_file_path(&tmp)).unwrap_err();
        assert!(matches!(err, ManubuildError::Config { .. }));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
