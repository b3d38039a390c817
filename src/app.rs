//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the current catalog,
//! selection, page scroll and mirrored playback state.

mod model;
mod sections;

pub use model::*;
pub use sections::{Section, SectionBoundary, active_section};

#[cfg(test)]
mod tests;
