//! Figure rendering for manubuild.
//!
//! [`DiagramGenerator`] looks each referenced figure id up in a
//! [`DiagramRegistry`] and paints it on a [`Canvas`]; ids without a routine
//! get a placeholder image so every reference resolves to a file.

pub mod canvas;
mod fonts;
mod generator;
mod registry;
mod vol1;
mod vol2;

pub use canvas::Canvas;
pub use fonts::{load_font, resolve_font};
pub use generator::{DiagramGenerator, DiagramReport, FigureKind};
pub use registry::{DiagramRegistry, DrawFn};
