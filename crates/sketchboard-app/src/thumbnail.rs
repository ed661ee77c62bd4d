//! SVG thumbnails of a board's strokes.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Rect;
use sketchboard_core::stroke::{Color, Stroke, StrokeCollection, StrokeKind};
use sketchboard_core::{RenderError, ThumbnailRenderer};
use std::fmt::Write;

/// Padding around the drawing, in board units.
const PADDING: f64 = 10.0;

/// Renders strokes into a base64 SVG data URL sized to fit the drawing.
pub struct SvgThumbnail {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

impl Default for SvgThumbnail {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            background: Color::WHITE,
        }
    }
}

impl SvgThumbnail {
    /// The raw SVG document.
    pub fn svg(&self, strokes: &StrokeCollection) -> Result<String, RenderError> {
        let view = strokes
            .iter()
            .map(|s| s.bounds().inflate(s.style.stroke_width / 2.0, s.style.stroke_width / 2.0))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::new(0.0, 0.0, self.width as f64, self.height as f64))
            .inflate(PADDING, PADDING);

        let mut out = String::new();
        write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
            self.width,
            self.height,
            view.x0,
            view.y0,
            view.width(),
            view.height()
        )
        .map_err(fmt_error)?;
        write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            view.x0,
            view.y0,
            view.width(),
            view.height(),
            self.background
        )
        .map_err(fmt_error)?;
        for stroke in strokes {
            write_stroke(&mut out, stroke).map_err(fmt_error)?;
        }
        out.push_str("</svg>");
        Ok(out)
    }
}

impl ThumbnailRenderer for SvgThumbnail {
    fn render(&self, strokes: &StrokeCollection) -> Result<String, RenderError> {
        let svg = self.svg(strokes)?;
        Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)))
    }
}

fn fmt_error(err: std::fmt::Error) -> RenderError {
    RenderError(err.to_string())
}

fn paint(stroke: &Stroke, fill: Option<Color>) -> String {
    let style = &stroke.style;
    let fill = fill
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string());
    format!(
        r#"stroke="{}" stroke-width="{}" fill="{}" opacity="{}" stroke-linecap="round" stroke-linejoin="round""#,
        style.stroke_color, style.stroke_width, fill, style.opacity
    )
}

fn write_stroke(out: &mut String, stroke: &Stroke) -> std::fmt::Result {
    let (x, y) = (stroke.origin.x, stroke.origin.y);
    match &stroke.kind {
        StrokeKind::Path { points } => {
            let coords: Vec<String> = points
                .chunks_exact(2)
                .map(|p| format!("{},{}", p[0], p[1]))
                .collect();
            write!(
                out,
                r#"<polyline points="{}" {}/>"#,
                coords.join(" "),
                paint(stroke, None)
            )
        }
        StrokeKind::Rectangle { width, height } => write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
            x,
            y,
            width,
            height,
            paint(stroke, stroke.style.fill_color)
        ),
        StrokeKind::Circle { radius } => write!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}" {}/>"#,
            x,
            y,
            radius,
            paint(stroke, stroke.style.fill_color)
        ),
        StrokeKind::Line { points } => write!(
            out,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
            points[0],
            points[1],
            points[2],
            points[3],
            paint(stroke, None)
        ),
        StrokeKind::Text { text, font_size } => write!(
            out,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}" opacity="{}">{}</text>"#,
            x,
            y,
            font_size,
            stroke.style.stroke_color,
            stroke.style.opacity,
            escape(text)
        ),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
