//! Sketchboard Application
//!
//! Headless shell around the core: a scripted collaborative session, SVG
//! thumbnails and the keyboard shortcut table.

pub mod demo;
mod shortcuts;
pub mod thumbnail;

pub use demo::{AppError, DemoReport};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use thumbnail::SvgThumbnail;
