//! Canonical project locations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::AppConfig;
use crate::error::{ManubuildError, Result};
use crate::types::{FigureId, Volume};

/// Where every input and output of a build lives, resolved against a root.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub master_file: PathBuf,
    pub manuscript: PathBuf,
    pub figures: PathBuf,
    pub dist: PathBuf,
    slugs: BTreeMap<Volume, String>,
}

impl ProjectPaths {
    /// Resolve all locations for `root` using the `[paths]` and `[volumes]` config.
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        let root = root.into();
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        };

        let slugs = Volume::ALL
            .into_iter()
            .map(|v| (v, config.volume(v).slug.clone()))
            .collect();

        Self {
            master_file: resolve(&config.paths.master),
            manuscript: resolve(&config.paths.manuscript),
            figures: resolve(&config.paths.figures),
            dist: resolve(&config.paths.dist),
            root,
            slugs,
        }
    }

    /// Volume file-system name (`vol1_2kyu`).
    pub fn slug(&self, volume: Volume) -> &str {
        self.slugs
            .get(&volume)
            .map(String::as_str)
            .unwrap_or_else(|| volume.key())
    }

    /// Directory holding a volume's split chapter files.
    pub fn volume_dir(&self, volume: Volume) -> PathBuf {
        self.manuscript.join(self.slug(volume))
    }

    /// Rendered image for a figure.
    pub fn figure_path(&self, id: &FigureId) -> PathBuf {
        self.figures.join(id.file_name())
    }

    pub fn pdf_path(&self, volume: Volume) -> PathBuf {
        self.dist.join(format!("{}.pdf", self.slug(volume)))
    }

    pub fn pptx_path(&self, volume: Volume) -> PathBuf {
        self.dist.join(format!("{}.pptx", self.slug(volume)))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dist.join("manifest.json")
    }

    /// Create every output directory. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> Result<()> {
        let mut dirs = vec![self.manuscript.clone()];
        dirs.extend(Volume::ALL.iter().map(|v| self.volume_dir(*v)));
        dirs.push(self.figures.clone());
        dirs.push(self.dist.clone());

        for dir in &dirs {
            std::fs::create_dir_all(dir).map_err(|e| ManubuildError::io(dir, e))?;
        }

        debug!(root = %self.root.display(), "output directories ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let paths = ProjectPaths::new("/work/book", &AppConfig::default());
        assert_eq!(paths.master_file, PathBuf::from("/work/book/MASTER.md"));
        assert_eq!(
            paths.volume_dir(Volume::Vol1),
            PathBuf::from("/work/book/manuscript/vol1_2kyu")
        );
        assert_eq!(paths.figures, PathBuf::from("/work/book/assets/figs"));
        assert_eq!(
            paths.pptx_path(Volume::Vol2),
            PathBuf::from("/work/book/dist/vol2_jun1kyu.pptx")
        );
        let id = FigureId::new("cad_vs_bim").unwrap();
        assert_eq!(
            paths.figure_path(&id),
            PathBuf::from("/work/book/assets/figs/cad_vs_bim.png")
        );
    }

    #[test]
    fn absolute_overrides_are_kept() {
        let mut config = AppConfig::default();
        config.paths.dist = PathBuf::from("/srv/out");
        let paths = ProjectPaths::new("/work/book", &config);
        assert_eq!(paths.pdf_path(Volume::Vol1), PathBuf::from("/srv/out/vol1_2kyu.pdf"));
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let root = std::env::temp_dir().join(format!("mb-paths-test-{}", uuid::Uuid::now_v7()));
        let paths = ProjectPaths::new(&root, &AppConfig::default());
        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();
        assert!(paths.volume_dir(Volume::Vol2).is_dir());
        assert!(paths.figures.is_dir());
        assert!(paths.dist.is_dir());
        let _ = std::fs::remove_dir_all(&root);
    }
}
