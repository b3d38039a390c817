//! Page sections and scroll-based active-section detection.
//!
//! The body is one virtual page (hero, about, music) addressed by a scroll
//! offset; which section counts as "active" is a pure function of that offset
//! and the section boundaries, independent of any rendering code.

/// The page sections, in display order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Section {
    Home,
    About,
    Music,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Home, Section::About, Section::Music];

    pub fn label(self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::About => "About",
            Section::Music => "Music",
        }
    }
}

/// A section and the page row at which it starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SectionBoundary {
    pub section: Section,
    pub top: u16,
}

/// Which section is in view at `scroll`.
///
/// `probe_offset` shifts the probe line below the top of the viewport so a
/// section counts as active slightly before its first row reaches the top.
/// Walks the boundaries bottom-up and picks the last section whose top is at
/// or above the probe line; falls back to the first section.
pub fn active_section(scroll: u16, probe_offset: u16, bounds: &[SectionBoundary]) -> Section {
    let probe = scroll.saturating_add(probe_offset);
    for boundary in bounds.iter().rev() {
        if boundary.top <= probe {
            return boundary.section;
        }
    }
    bounds.first().map(|b| b.section).unwrap_or(Section::Home)
}
