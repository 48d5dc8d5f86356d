//! Chart styling derived from the color mode.
//!
//! `chart_theme` is pure; `ChartThemeWatcher` re-derives it whenever the
//! `ColorModeStore` publishes a new mode.

#[cfg(test)]
#[path = "chart_theme_test.rs"]
mod chart_theme_test;

use serde::Serialize;
use tokio::sync::watch;

use super::color_mode::ColorMode;

/// Raw colors for one mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePalette {
    pub text_color: &'static str,
    pub muted_text_color: &'static str,
    pub axis_line_color: &'static str,
    pub split_line_color: &'static str,
    pub tooltip_bg: &'static str,
    pub tooltip_border: &'static str,
}

pub const LIGHT_PALETTE: ThemePalette = ThemePalette {
    text_color: "#1f2937",
    muted_text_color: "#6b7280",
    axis_line_color: "#d1d5db",
    split_line_color: "#e5e7eb",
    tooltip_bg: "#ffffff",
    tooltip_border: "#e5e7eb",
};

pub const DARK_PALETTE: ThemePalette = ThemePalette {
    text_color: "#f3f4f6",
    muted_text_color: "#9ca3af",
    axis_line_color: "#4b5563",
    split_line_color: "#374151",
    tooltip_bg: "#1f2937",
    tooltip_border: "#374151",
};

// =============================================================================
// OPTION TREE
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOptions {
    pub line_style: LineStyle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitledOptions {
    pub text_style: TextStyle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub border_width: u32,
    pub text_style: TextStyle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub axis_line: LineOptions,
    pub axis_label: TextStyle,
    pub split_line: LineOptions,
}

/// Chart option object ready to merge into a chart's own options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub background_color: &'static str,
    pub text_style: TextStyle,
    pub title: TitledOptions,
    pub legend: TitledOptions,
    pub tooltip: TooltipOptions,
    pub x_axis: AxisOptions,
    pub y_axis: AxisOptions,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartTheme {
    pub mode: &'static str,
    pub palette: ThemePalette,
    pub options: ChartOptions,
}

#[must_use]
pub fn palette(mode: ColorMode) -> ThemePalette {
    match mode {
        ColorMode::Light => LIGHT_PALETTE,
        ColorMode::Dark => DARK_PALETTE,
    }
}

fn axis(p: &ThemePalette) -> AxisOptions {
    AxisOptions {
        axis_line: LineOptions { line_style: LineStyle { color: p.axis_line_color } },
        axis_label: TextStyle { color: p.muted_text_color },
        split_line: LineOptions { line_style: LineStyle { color: p.split_line_color } },
    }
}

/// Build the chart styling for `mode`.
#[must_use]
pub fn chart_theme(mode: ColorMode) -> ChartTheme {
    let p = palette(mode);
    let options = ChartOptions {
        // Charts inherit the page background.
        background_color: "transparent",
        text_style: TextStyle { color: p.text_color },
        title: TitledOptions { text_style: TextStyle { color: p.text_color } },
        legend: TitledOptions { text_style: TextStyle { color: p.muted_text_color } },
        tooltip: TooltipOptions {
            background_color: p.tooltip_bg,
            border_color: p.tooltip_border,
            border_width: 1,
            text_style: TextStyle { color: p.text_color },
        },
        x_axis: axis(&p),
        y_axis: axis(&p),
    };
    let mode = if mode.is_dark() { "dark" } else { "light" };
    ChartTheme { mode, palette: p, options }
}

/// Follows a color-mode channel and yields a fresh theme per change.
pub struct ChartThemeWatcher {
    rx: watch::Receiver<ColorMode>,
}

impl ChartThemeWatcher {
    #[must_use]
    pub fn new(rx: watch::Receiver<ColorMode>) -> Self {
        Self { rx }
    }

    #[must_use]
    pub fn current(&self) -> ChartTheme {
        chart_theme(*self.rx.borrow())
    }

    /// Wait for the next mode change. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<ChartTheme> {
        self.rx.changed().await.ok()?;
        Some(chart_theme(*self.rx.borrow_and_update()))
    }
}
