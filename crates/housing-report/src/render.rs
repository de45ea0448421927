//! Learning-curve charts.
//!
//! [`render_learning_curve`] issues drawing calls against any
//! [`DrawingSurface`]. [`SvgSurface`] records those calls and serializes them
//! as an SVG document with `quick-xml`.

use std::io::{self, Cursor};
use std::path::Path;

use housing_common::format_numeric;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::curve::{LearningCurve, ReportOptions};
use crate::error::{ReportError, Result};

pub const X_LABEL: &str = "Number of training samples";
pub const Y_LABEL: &str = "RMSE";
pub const TRAINING_LABEL: &str = "training RMSE";
pub const VALIDATION_LABEL: &str = "validation RMSE";
pub const BAND_ALPHA: f64 = 0.15;
const MARKER_SIZE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const GREEN: Color = Color { r: 0, g: 128, b: 0 };

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
}

/// How one data series is drawn and labelled in the legend.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub color: Color,
    pub line: LineStyle,
    pub marker: Marker,
    pub marker_size: f64,
    pub label: String,
}

impl SeriesStyle {
    pub fn training() -> Self {
        Self {
            color: Color::BLUE,
            line: LineStyle::Solid,
            marker: Marker::Circle,
            marker_size: MARKER_SIZE,
            label: TRAINING_LABEL.to_string(),
        }
    }

    pub fn validation() -> Self {
        Self {
            color: Color::GREEN,
            line: LineStyle::Dashed,
            marker: Marker::Square,
            marker_size: MARKER_SIZE,
            label: VALIDATION_LABEL.to_string(),
        }
    }
}

/// Data-space extent of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// Smallest bounds covering `xs` and `ys`, padded by 5% vertically.
    /// A zero-width range is widened by one unit on each side.
    pub fn covering(xs: &[f64], ys: &[f64]) -> Self {
        let (x_min, x_max) = min_max(xs);
        let (y_min, y_max) = min_max(ys);
        let (x_min, x_max) = widen(x_min, x_max);
        let (y_min, y_max) = widen(y_min, y_max);
        let pad = (y_max - y_min) * 0.05;
        Self {
            x_min,
            x_max,
            y_min: y_min - pad,
            y_max: y_max + pad,
        }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

/// Target of chart drawing calls.
pub trait DrawingSurface {
    fn set_bounds(&mut self, bounds: Bounds);

    /// Shaded region between `lower` and `upper` along `xs`.
    fn fill_between(&mut self, xs: &[f64], lower: &[f64], upper: &[f64], color: Color, alpha: f64);

    /// Connected series with markers; the style's label joins the legend.
    fn plot(&mut self, xs: &[f64], ys: &[f64], style: &SeriesStyle);

    fn grid(&mut self);

    fn axis_labels(&mut self, x_label: &str, y_label: &str);

    fn legend(&mut self);
}

/// Draws training and validation RMSE with one-standard-deviation bands.
pub fn render_learning_curve<S: DrawingSurface>(curve: &LearningCurve, surface: &mut S) -> Result<()> {
    let n = curve.len();
    if n == 0 {
        return Err(ReportError::invalid("learning curve has no points"));
    }
    for (name, len) in [
        ("train_mean", curve.train_mean.len()),
        ("train_std", curve.train_std.len()),
        ("test_mean", curve.test_mean.len()),
        ("test_std", curve.test_std.len()),
    ] {
        if len != n {
            return Err(ReportError::Shape(format!(
                "{name} has {len} points but there are {n} training sizes"
            )));
        }
    }

    let xs = curve.sizes_f64();
    let train_upper = (&curve.train_mean + &curve.train_std).to_vec();
    let train_lower = (&curve.train_mean - &curve.train_std).to_vec();
    let test_upper = (&curve.test_mean + &curve.test_std).to_vec();
    let test_lower = (&curve.test_mean - &curve.test_std).to_vec();

    let all_y: Vec<f64> = [&train_upper, &train_lower, &test_upper, &test_lower]
        .into_iter()
        .flatten()
        .copied()
        .collect();
    surface.set_bounds(Bounds::covering(&xs, &all_y));

    let training = SeriesStyle::training();
    surface.plot(&xs, &curve.train_mean.to_vec(), &training);
    surface.fill_between(&xs, &train_lower, &train_upper, training.color, BAND_ALPHA);

    let validation = SeriesStyle::validation();
    surface.plot(&xs, &curve.test_mean.to_vec(), &validation);
    surface.fill_between(&xs, &test_lower, &test_upper, validation.color, BAND_ALPHA);

    surface.grid();
    surface.axis_labels(X_LABEL, Y_LABEL);
    surface.legend();
    tracing::debug!(points = n, "Rendered learning curve");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Band {
        xs: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        color: Color,
        alpha: f64,
    },
    Series {
        xs: Vec<f64>,
        ys: Vec<f64>,
        style: SeriesStyle,
    },
    Grid,
    AxisLabels {
        x: String,
        y: String,
    },
    Legend,
}

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 50.0;
const TICKS: usize = 5;
const GRID_COLOR: &str = "#b0b0b0";

/// Records drawing calls and writes them as SVG.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    bounds: Bounds,
    shapes: Vec<Shape>,
    legend_entries: Vec<SeriesStyle>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            bounds: Bounds {
                x_min: 0.0,
                x_max: 1.0,
                y_min: 0.0,
                y_max: 1.0,
            },
            shapes: Vec::new(),
            legend_entries: Vec::new(),
        }
    }

    /// Surface sized by the chart settings in `options`.
    pub fn from_options(options: &ReportOptions) -> Self {
        Self::new(options.width, options.height)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Labels of the plotted series, in drawing order.
    pub fn legend_labels(&self) -> Vec<&str> {
        self.legend_entries
            .iter()
            .map(|style| style.label.as_str())
            .collect()
    }

    fn plot_width(&self) -> f64 {
        (self.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0)
    }

    fn px(&self, x: f64) -> f64 {
        let span = self.bounds.x_max - self.bounds.x_min;
        MARGIN_LEFT + (x - self.bounds.x_min) / span * self.plot_width()
    }

    fn py(&self, y: f64) -> f64 {
        let span = self.bounds.y_max - self.bounds.y_min;
        MARGIN_TOP + self.plot_height() - (y - self.bounds.y_min) / span * self.plot_height()
    }

    fn points(&self, xs: &[f64], ys: &[f64]) -> String {
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| format!("{},{}", coord(self.px(x)), coord(self.py(y))))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Serializes the recorded chart.
    pub fn to_svg(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        root.push_attribute(("width", coord(self.width).as_str()));
        root.push_attribute(("height", coord(self.height).as_str()));
        root.push_attribute((
            "viewBox",
            format!("0 0 {} {}", coord(self.width), coord(self.height)).as_str(),
        ));
        writer.write_event(Event::Start(root))?;

        empty(
            &mut writer,
            "rect",
            &[
                ("width", coord(self.width)),
                ("height", coord(self.height)),
                ("fill", "white".to_string()),
            ],
        )?;
        for shape in &self.shapes {
            self.write_shape(&mut writer, shape)?;
        }
        self.write_frame(&mut writer)?;

        writer.write_event(Event::End(BytesEnd::new("svg")))?;
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }

    /// Writes the chart to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_svg()?)?;
        tracing::info!(path = %path.display(), "Wrote learning curve chart");
        Ok(())
    }

    fn write_shape<W: io::Write>(&self, writer: &mut Writer<W>, shape: &Shape) -> io::Result<()> {
        match shape {
            Shape::Band {
                xs,
                lower,
                upper,
                color,
                alpha,
            } => {
                let mut points = self.points(xs, upper);
                let back_xs: Vec<f64> = xs.iter().rev().copied().collect();
                let back_ys: Vec<f64> = lower.iter().rev().copied().collect();
                points.push(' ');
                points.push_str(&self.points(&back_xs, &back_ys));
                empty(
                    writer,
                    "polygon",
                    &[
                        ("points", points),
                        ("fill", color.hex()),
                        ("fill-opacity", alpha.to_string()),
                        ("stroke", "none".to_string()),
                    ],
                )
            }
            Shape::Series { xs, ys, style } => self.write_series(writer, xs, ys, style),
            Shape::Grid => self.write_grid(writer),
            Shape::AxisLabels { x, y } => {
                let x_pos = MARGIN_LEFT + self.plot_width() / 2.0;
                let y_pos = MARGIN_TOP + self.plot_height() / 2.0;
                text(
                    writer,
                    &[
                        ("x", coord(x_pos)),
                        ("y", coord(self.height - 10.0)),
                        ("text-anchor", "middle".to_string()),
                    ],
                    x,
                )?;
                text(
                    writer,
                    &[
                        ("x", "18".to_string()),
                        ("y", coord(y_pos)),
                        ("text-anchor", "middle".to_string()),
                        ("transform", format!("rotate(-90 18 {})", coord(y_pos))),
                    ],
                    y,
                )
            }
            Shape::Legend => self.write_legend(writer),
        }
    }

    fn write_series<W: io::Write>(
        &self,
        writer: &mut Writer<W>,
        xs: &[f64],
        ys: &[f64],
        style: &SeriesStyle,
    ) -> io::Result<()> {
        let color = style.color.hex();
        let mut line = vec![
            ("points", self.points(xs, ys)),
            ("fill", "none".to_string()),
            ("stroke", color.clone()),
            ("stroke-width", "1.5".to_string()),
        ];
        if style.line == LineStyle::Dashed {
            line.push(("stroke-dasharray", "6,4".to_string()));
        }
        empty(writer, "polyline", &line)?;

        for (&x, &y) in xs.iter().zip(ys) {
            write_marker(writer, style, self.px(x), self.py(y))?;
        }
        Ok(())
    }

    fn write_grid<W: io::Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let left = MARGIN_LEFT;
        let right = MARGIN_LEFT + self.plot_width();
        let top = MARGIN_TOP;
        let bottom = MARGIN_TOP + self.plot_height();
        for i in 0..=TICKS {
            let t = i as f64 / TICKS as f64;
            let x = left + t * self.plot_width();
            let y = top + t * self.plot_height();
            for (x1, y1, x2, y2) in [(x, top, x, bottom), (left, y, right, y)] {
                empty(
                    writer,
                    "line",
                    &[
                        ("x1", coord(x1)),
                        ("y1", coord(y1)),
                        ("x2", coord(x2)),
                        ("y2", coord(y2)),
                        ("stroke", GRID_COLOR.to_string()),
                        ("stroke-width", "0.8".to_string()),
                    ],
                )?;
            }
        }
        Ok(())
    }

    fn write_frame<W: io::Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        empty(
            writer,
            "rect",
            &[
                ("x", coord(MARGIN_LEFT)),
                ("y", coord(MARGIN_TOP)),
                ("width", coord(self.plot_width())),
                ("height", coord(self.plot_height())),
                ("fill", "none".to_string()),
                ("stroke", "black".to_string()),
            ],
        )?;

        let bottom = MARGIN_TOP + self.plot_height();
        for i in 0..=TICKS {
            let t = i as f64 / TICKS as f64;
            let x_value = self.bounds.x_min + t * (self.bounds.x_max - self.bounds.x_min);
            let y_value = self.bounds.y_min + t * (self.bounds.y_max - self.bounds.y_min);
            text(
                writer,
                &[
                    ("x", coord(self.px(x_value))),
                    ("y", coord(bottom + 16.0)),
                    ("text-anchor", "middle".to_string()),
                    ("font-size", "10".to_string()),
                ],
                &tick_label(x_value),
            )?;
            text(
                writer,
                &[
                    ("x", coord(MARGIN_LEFT - 6.0)),
                    ("y", coord(self.py(y_value) + 3.0)),
                    ("text-anchor", "end".to_string()),
                    ("font-size", "10".to_string()),
                ],
                &tick_label(y_value),
            )?;
        }
        Ok(())
    }

    fn write_legend<W: io::Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if self.legend_entries.is_empty() {
            return Ok(());
        }
        let box_width = 150.0;
        let row_height = 18.0;
        let x = MARGIN_LEFT + self.plot_width() - box_width - 10.0;
        let y = MARGIN_TOP + 10.0;
        empty(
            writer,
            "rect",
            &[
                ("x", coord(x)),
                ("y", coord(y)),
                ("width", coord(box_width)),
                ("height", coord(row_height * self.legend_entries.len() as f64 + 8.0)),
                ("fill", "white".to_string()),
                ("fill-opacity", "0.8".to_string()),
                ("stroke", "#cccccc".to_string()),
            ],
        )?;

        for (idx, style) in self.legend_entries.iter().enumerate() {
            let row_y = y + 4.0 + row_height * (idx as f64 + 0.5);
            let mut sample = vec![
                ("x1", coord(x + 8.0)),
                ("y1", coord(row_y)),
                ("x2", coord(x + 36.0)),
                ("y2", coord(row_y)),
                ("stroke", style.color.hex()),
                ("stroke-width", "1.5".to_string()),
            ];
            if style.line == LineStyle::Dashed {
                sample.push(("stroke-dasharray", "6,4".to_string()));
            }
            empty(writer, "line", &sample)?;
            write_marker(writer, style, x + 22.0, row_y)?;
            text(
                writer,
                &[
                    ("x", coord(x + 44.0)),
                    ("y", coord(row_y + 4.0)),
                    ("font-size", "12".to_string()),
                ],
                &style.label,
            )?;
        }
        Ok(())
    }
}

impl DrawingSurface for SvgSurface {
    fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    fn fill_between(&mut self, xs: &[f64], lower: &[f64], upper: &[f64], color: Color, alpha: f64) {
        self.shapes.push(Shape::Band {
            xs: xs.to_vec(),
            lower: lower.to_vec(),
            upper: upper.to_vec(),
            color,
            alpha,
        });
    }

    fn plot(&mut self, xs: &[f64], ys: &[f64], style: &SeriesStyle) {
        self.shapes.push(Shape::Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            style: style.clone(),
        });
        self.legend_entries.push(style.clone());
    }

    fn grid(&mut self) {
        self.shapes.push(Shape::Grid);
    }

    fn axis_labels(&mut self, x_label: &str, y_label: &str) {
        self.shapes.push(Shape::AxisLabels {
            x: x_label.to_string(),
            y: y_label.to_string(),
        });
    }

    fn legend(&mut self) {
        self.shapes.push(Shape::Legend);
    }
}

fn coord(value: f64) -> String {
    format!("{value:.2}")
}

fn tick_label(value: f64) -> String {
    format_numeric((value * 100.0).round() / 100.0)
}

fn write_marker<W: io::Write>(
    writer: &mut Writer<W>,
    style: &SeriesStyle,
    cx: f64,
    cy: f64,
) -> io::Result<()> {
    let half = style.marker_size / 2.0;
    let fill = style.color.hex();
    match style.marker {
        Marker::Circle => empty(
            writer,
            "circle",
            &[
                ("cx", coord(cx)),
                ("cy", coord(cy)),
                ("r", coord(half)),
                ("fill", fill),
            ],
        ),
        Marker::Square => empty(
            writer,
            "rect",
            &[
                ("x", coord(cx - half)),
                ("y", coord(cy - half)),
                ("width", coord(style.marker_size)),
                ("height", coord(style.marker_size)),
                ("fill", fill),
            ],
        ),
    }
}

fn empty<W: io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, String)],
) -> io::Result<()> {
    let mut element = BytesStart::new(name);
    for (key, value) in attributes {
        element.push_attribute((*key, value.as_str()));
    }
    writer.write_event(Event::Empty(element))
}

fn text<W: io::Write>(
    writer: &mut Writer<W>,
    attributes: &[(&str, String)],
    content: &str,
) -> io::Result<()> {
    let mut element = BytesStart::new("text");
    for (key, value) in attributes {
        element.push_attribute((*key, value.as_str()));
    }
    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new(content)))?;
    writer.write_event(Event::End(BytesEnd::new("text")))
}
