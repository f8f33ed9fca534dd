//! Figure placeholder extraction.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use manubuild_shared::{Chapter, FigureId};

/// `![FIG:<id>]()` with an empty link target. Anything else is ordinary markup.
static FIGURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[FIG:(\w+)\]\(\)").expect("valid regex"));

/// Every distinct figure id placeholder in `content`, sorted.
pub fn extract_figure_references(content: &str) -> BTreeSet<FigureId> {
    FIGURE_RE
        .captures_iter(content)
        .filter_map(|caps| FigureId::new(&caps[1]).ok())
        .collect()
}

/// Union of the figure references of several chapters, headings included.
pub fn collect_figure_references<'a>(
    chapters: impl IntoIterator<Item = &'a Chapter>,
) -> BTreeSet<FigureId> {
    chapters
        .into_iter()
        .flat_map(|c| extract_figure_references(&c.content()))
        .collect()
}
