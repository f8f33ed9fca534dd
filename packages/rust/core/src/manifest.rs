//! Dist manifest: what a build produced and the checksums of each deliverable.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use manubuild_shared::{AppConfig, ManubuildError, Result, write_atomic};

/// Bumped whenever the manifest layout changes.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Metadata for a single deliverable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub chapters: usize,
    pub figures: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
}

/// Contents of `dist/manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistManifest {
    pub schema_version: u32,
    pub project: ProjectInfo,
    pub built_at: DateTime<Utc>,
    /// Keyed by volume slug.
    pub volumes: BTreeMap<String, VolumeStats>,
    pub artifacts: Vec<ArtifactMeta>,
}

impl DistManifest {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            project: ProjectInfo {
                name: config.project.name.clone(),
                version: config.project.version.clone(),
            },
            built_at: Utc::now(),
            volumes: BTreeMap::new(),
            artifacts: Vec::new(),
        }
    }
}

/// Checksum and size of a file already on disk.
pub fn artifact_meta(path: &Path) -> Result<ArtifactMeta> {
    let bytes = std::fs::read(path).map_err(|e| ManubuildError::io(path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let hash = format!("{:x}", hasher.finalize());

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(file = %filename, size = bytes.len(), "hashed artifact");

    Ok(ArtifactMeta {
        filename,
        sha256: hash,
        size_bytes: bytes.len() as u64,
    })
}

/// Write the manifest as pretty JSON, atomically.
#[instrument(skip_all, fields(path = %path.display(), artifacts = manifest.artifacts.len()))]
pub fn write_manifest(path: &Path, manifest: &DistManifest) -> Result<()> {
    write_json(path, manifest)
}

/// Read a previously written manifest.
pub fn read_manifest(path: &Path) -> Result<DistManifest> {
    let content = std::fs::read_to_string(path).map_err(|e| ManubuildError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| ManubuildError::validation(format!("invalid manifest.json: {e}")))
}

fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| ManubuildError::validation(format!("JSON serialization failed: {e}")))?;
    write_atomic(path, json)?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mb-manifest-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn hashes_file_contents() {
        let dir = temp_dir();
        let path = dir.join("vol1_2kyu.pdf");
        std::fs::write(&path, b"abc").unwrap();

        let meta = artifact_meta(&path).unwrap();
        assert_eq!(meta.filename, "vol1_2kyu.pdf");
        assert_eq!(meta.size_bytes, 3);
        assert_eq!(
            meta.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn manifest_round_trips_through_disk() {
        let dir = temp_dir();
        let path = dir.join("dist/manifest.json");

        let mut manifest = DistManifest::new(&AppConfig::default());
        manifest.volumes.insert(
            "vol1_2kyu".into(),
            VolumeStats {
                chapters: 3,
                figures: 4,
            },
        );
        manifest.artifacts.push(ArtifactMeta {
            filename: "vol1_2kyu.pdf".into(),
            sha256: "0".repeat(64),
            size_bytes: 10,
        });
        write_manifest(&path, &manifest).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"schema_version\": 1"));
        assert!(!dir.join("dist/.manifest.json.tmp").exists());

        let back = read_manifest(&path).unwrap();
        assert_eq!(back.volumes["vol1_2kyu"].chapters, 3);
        assert_eq!(back.artifacts, manifest.artifacts);
        assert_eq!(back.built_at, manifest.built_at);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = temp_dir();
        assert!(artifact_meta(&dir.join("nope.pdf")).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
