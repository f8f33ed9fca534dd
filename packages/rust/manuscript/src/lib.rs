//! Manuscript parsing for manubuild.
//!
//! - [`parse_manuscript`] splits the master document into per-volume chapters
//! - [`extract_figure_references`] finds `![FIG:<id>]()` placeholders
//! - [`parse_blocks`] turns chapter Markdown into layout blocks for the
//!   assemblers, and [`load_chapter_files`] reads split chapters back

mod blocks;
mod chapters;
mod figures;
mod parser;

pub use blocks::{Block, Section, Sectioned, parse_blocks, split_sections};
pub use chapters::{ChapterFile, chapter_number, load_chapter_files};
pub use figures::{collect_figure_references, extract_figure_references};
pub use parser::{Manuscript, parse_manuscript, parse_master_file};
