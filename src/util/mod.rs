//! Presentation helpers: color mode preference and chart theming.

pub mod chart_theme;
pub mod color_mode;
