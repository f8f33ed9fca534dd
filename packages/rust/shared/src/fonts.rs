//! Locating a TrueType/OpenType font with Japanese glyphs.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Well-known system locations, most complete CJK coverage first.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/opentype/ipafont-gothic/ipagp.ttf",
    "/usr/share/fonts/truetype/fonts-japanese-gothic.ttf",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\meiryo.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
];

/// File names looked up in the user font directory.
const USER_FONTS: &[&str] = &[
    "NotoSansCJKjp-Regular.otf",
    "NotoSansJP-Regular.ttf",
    "ipagp.ttf",
];

/// Pick the font file to render text with.
///
/// A configured path wins when it exists; otherwise the user font directory
/// and then the system locations are probed. `None` means text is skipped.
pub fn find_font_file(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            debug!(font = %path.display(), "using configured font");
            return Some(path.to_path_buf());
        }
        warn!(font = %path.display(), "configured font not found, probing system fonts");
    }

    let user = dirs::font_dir()
        .into_iter()
        .flat_map(|dir| USER_FONTS.iter().map(move |name| dir.join(name)));
    let system = SYSTEM_FONTS.iter().map(PathBuf::from);

    let found = user.chain(system).find(|p| p.is_file());
    match &found {
        Some(path) => debug!(font = %path.display(), "found system font"),
        None => warn!("no usable font found; text will not be rendered"),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_font_wins() {
        let dir = std::env::temp_dir().join(format!("mb-font-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let font = dir.join("custom.ttf");
        std::fs::write(&font, b"not really a font").unwrap();

        assert_eq!(find_font_file(Some(&font)), Some(font.clone()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_configured_font_falls_back() {
        let missing = Path::new("/definitely/not/here.ttf");
        let found = find_font_file(Some(missing));
        assert_ne!(found.as_deref(), Some(missing));
    }
}
