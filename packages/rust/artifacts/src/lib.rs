//! Deliverable assemblers for manubuild.
//!
//! - [`PdfBuilder`] lays chapters out on A4 pages ([`layout`]) and renders
//!   them with printpdf.
//! - [`PptxBuilder`] plans a lecture deck and packages it as PresentationML.

pub mod layout;
mod pdf;
mod pptx;

pub use layout::{Cover, PageSetup};
pub use pdf::{PdfBuilder, PdfSummary};
pub use pptx::{PptxBuilder, PptxSummary, SLIDE_HEIGHT, SLIDE_WIDTH, Slide, plan_deck};
