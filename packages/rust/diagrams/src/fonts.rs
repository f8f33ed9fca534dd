//! Loading the font used for figure text.

use std::path::Path;

use rusttype::Font;
use tracing::{debug, warn};

use manubuild_shared::find_font_file;

/// Parse a font file; `None` (with a warning) when it cannot be used.
pub fn load_font(path: &Path) -> Option<Font<'static>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(font = %path.display(), error = %e, "cannot read font");
            return None;
        }
    };
    match Font::try_from_vec(bytes) {
        Some(font) => {
            debug!(font = %path.display(), "font loaded");
            Some(font)
        }
        None => {
            warn!(font = %path.display(), "not a usable TrueType/OpenType font");
            None
        }
    }
}

/// Configured font, else the first usable system font.
pub fn resolve_font(configured: Option<&Path>) -> Option<Font<'static>> {
    let font = find_font_file(configured).and_then(|path| load_font(&path));
    if font.is_none() {
        warn!("figures will be drawn without text");
    }
    font
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_rejected() {
        let dir = std::env::temp_dir().join(format!("mb-fonts-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        assert!(load_font(&path).is_none());
        assert!(load_font(&dir.join("missing.ttf")).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
