//! Static asset constants (stylesheet and logo).

/// Stylesheet for the web interface.
pub const CSS: &str = include_str!("style.css");

/// Header logo.
pub const LOGO_SVG: &str = include_str!("logo.svg");
