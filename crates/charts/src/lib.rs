//! investor-intel chart rendering adapter.
//!
//! Implements [`pipeline::ChartRenderer`] by rasterising each
//! [`pipeline::ChartSpec`] to a PNG file with the `image` crate: a line chart
//! with markers and a dashed grid for trends, horizontal bars (first entry at
//! the top) for rankings. Charts with no points still produce a file showing
//! the empty axes.
//!
//! Every chart carries its title above the plot, the x-axis name below it,
//! and the y-axis name turned along the left edge. Value ticks are numbered,
//! trend points are labelled with their year, and each bar is labelled with
//! its name. Text is drawn from the `font8x8` bitmap font, so no system fonts
//! are needed.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Pixel layout and file encoding live here; the
//! [`pipeline`] crate decides what each chart shows and where it is written.

mod canvas;

use std::path::Path;

use pipeline::{ChartRenderer, ChartSpec, ChartStyle, PipelineError};

use canvas::{text_width, Canvas, BLACK, GLYPH, GRID, SERIES};

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;

const TITLE_SCALE: i64 = 3;
const LABEL_SCALE: i64 = 2;

/// Space kept for bar names left of a bar chart's plot area.
const BAR_NAME_GUTTER: i64 = 300;
/// Space kept for the turned y-axis name.
const Y_LABEL_GUTTER: i64 = 40;

/// [`ChartRenderer`] that writes 1200x600 PNG files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngChartRenderer;

/// Plot area in pixel coordinates.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl PlotArea {
    fn for_style(style: ChartStyle) -> Self {
        let left = match style {
            ChartStyle::Line => 110,
            ChartStyle::HorizontalBars => BAR_NAME_GUTTER,
        };
        PlotArea {
            left,
            top: 70,
            right: i64::from(WIDTH) - 40,
            bottom: i64::from(HEIGHT) - 90,
        }
    }

    fn width(self) -> i64 {
        self.right - self.left
    }

    fn height(self) -> i64 {
        self.bottom - self.top
    }
}

impl PngChartRenderer {
    fn draw(&self, spec: &ChartSpec) -> Canvas {
        let mut canvas = Canvas::new(WIDTH, HEIGHT);
        let area = PlotArea::for_style(spec.style);
        let scale_max = axis_max(spec.max_value());

        match spec.style {
            ChartStyle::Line => draw_line_chart(&mut canvas, area, spec, scale_max),
            ChartStyle::HorizontalBars => draw_bar_chart(&mut canvas, area, spec, scale_max),
        }

        // Axes last so they sit on top of grid lines and bar ends.
        canvas.line((area.left, area.top), (area.left, area.bottom), 2, BLACK);
        canvas.line((area.left, area.bottom), (area.right, area.bottom), 2, BLACK);
        draw_titles(&mut canvas, area, spec);
        canvas
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), PipelineError> {
        let canvas = self.draw(spec);
        canvas.save(path).map_err(|e| PipelineError::ChartRender {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(kind = %spec.kind, points = spec.points.len(), path = %path.display(), "Chart written");
        Ok(())
    }
}

/// Rounds the value axis up to a whole number, at least 1.
fn axis_max(max_value: f64) -> f64 {
    max_value.ceil().max(1.0)
}

/// Whole-number tick step giving at most ten grid lines.
fn tick_step(scale_max: f64) -> f64 {
    (scale_max / 10.0).ceil().max(1.0)
}

/// Tick values from 0 up to `scale_max`.
fn ticks(scale_max: f64) -> impl Iterator<Item = f64> {
    let step = tick_step(scale_max);
    (0u32..)
        .map(move |i| f64::from(i) * step)
        .take_while(move |tick| *tick <= scale_max)
}

/// Shortens `text` with a trailing `...` so it is at most `max_chars` long.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn draw_titles(canvas: &mut Canvas, area: PlotArea, spec: &ChartSpec) {
    let glyph = GLYPH * LABEL_SCALE;

    let title_x = (i64::from(WIDTH) - text_width(&spec.title, TITLE_SCALE)) / 2;
    canvas.text(title_x, 24, &spec.title, TITLE_SCALE, BLACK);

    let x_label_x = area.left + (area.width() - text_width(&spec.x_label, LABEL_SCALE)) / 2;
    canvas.text(x_label_x, area.bottom + 50, &spec.x_label, LABEL_SCALE, BLACK);

    let y_label_y = area.bottom - (area.height() - text_width(&spec.y_label, LABEL_SCALE)) / 2;
    canvas.text_vertical((Y_LABEL_GUTTER - glyph) / 2, y_label_y, &spec.y_label, LABEL_SCALE, BLACK);
}

fn draw_line_chart(canvas: &mut Canvas, area: PlotArea, spec: &ChartSpec, scale_max: f64) {
    let glyph = GLYPH * LABEL_SCALE;
    for tick in ticks(scale_max) {
        let y = area.bottom - (tick / scale_max * area.height() as f64).round() as i64;
        if tick > 0.0 {
            canvas.dashed_hline(y, area.left, area.right, GRID);
        }
        let label = format!("{tick}");
        let x = area.left - 8 - text_width(&label, LABEL_SCALE);
        canvas.text(x, y - glyph / 2, &label, LABEL_SCALE, BLACK);
    }

    if spec.points.is_empty() {
        return;
    }

    let min_x = spec.points.iter().map(|p| p.position).fold(f64::INFINITY, f64::min);
    let max_x = spec.points.iter().map(|p| p.position).fold(f64::NEG_INFINITY, f64::max);
    // Inset so markers at the extremes are not cut by the axes.
    let inset = 20;
    let span_px = (area.width() - 2 * inset) as f64;

    let pixels: Vec<(i64, i64)> = spec
        .points
        .iter()
        .map(|p| {
            let x = if max_x > min_x {
                area.left + inset + ((p.position - min_x) / (max_x - min_x) * span_px).round() as i64
            } else {
                area.left + area.width() / 2
            };
            let y = area.bottom - (p.value / scale_max * area.height() as f64).round() as i64;
            (x, y)
        })
        .collect();

    for pair in pixels.windows(2) {
        canvas.line(pair[0], pair[1], 3, SERIES);
    }
    for &(x, y) in &pixels {
        canvas.fill_circle(x, y, 7, SERIES);
    }

    // Label every point when they fit, otherwise every n-th one.
    let widest = spec
        .points
        .iter()
        .map(|p| text_width(&p.label, LABEL_SCALE))
        .max()
        .unwrap_or(0);
    let spacing = if pixels.len() > 1 {
        (span_px / (pixels.len() - 1) as f64).max(1.0)
    } else {
        span_px
    };
    let stride = ((widest + glyph) as f64 / spacing).ceil().max(1.0) as usize;
    for (point, &(x, _)) in spec.points.iter().zip(&pixels).step_by(stride) {
        let label_x = x - text_width(&point.label, LABEL_SCALE) / 2;
        canvas.text(label_x, area.bottom + 10, &point.label, LABEL_SCALE, BLACK);
    }
}

fn draw_bar_chart(canvas: &mut Canvas, area: PlotArea, spec: &ChartSpec, scale_max: f64) {
    let glyph = GLYPH * LABEL_SCALE;
    for tick in ticks(scale_max) {
        let x = area.left + (tick / scale_max * area.width() as f64).round() as i64;
        canvas.line((x, area.bottom), (x, area.bottom + 6), 2, BLACK);
        let label = format!("{tick}");
        canvas.text(x - text_width(&label, LABEL_SCALE) / 2, area.bottom + 10, &label, LABEL_SCALE, BLACK);
    }

    if spec.points.is_empty() {
        return;
    }

    let name_room = (area.left - Y_LABEL_GUTTER - 12) / glyph;
    let band = area.height() as f64 / spec.points.len() as f64;
    let thickness = (band * 0.8).max(1.0);
    for (i, point) in spec.points.iter().enumerate() {
        let center = area.top as f64 + band * (i as f64 + 0.5);
        let top = (center - thickness / 2.0).round() as i64;
        let bottom = (center + thickness / 2.0).round() as i64;
        let length = (point.value / scale_max * area.width() as f64).round() as i64;
        if length > 0 {
            canvas.fill_rect(area.left, top, area.left + length, bottom, SERIES);
        }

        let name = truncate(&point.label, name_room.max(0) as usize);
        let name_x = area.left - 10 - text_width(&name, LABEL_SCALE);
        canvas.text(name_x, center.round() as i64 - glyph / 2, &name, LABEL_SCALE, BLACK);
    }
}
