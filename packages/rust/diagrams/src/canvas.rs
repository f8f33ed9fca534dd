//! Raster drawing surface with plot-style coordinates.
//!
//! Drawing routines work in data coordinates (x to the right, y up, `0..1`
//! by default) inside the current panel. The canvas maps them to pixels and
//! draws with `imageproc`. Sizes given in points scale with the image height.

use image::{Rgb, RgbImage};
use imageproc::drawing;
use imageproc::point::Point;
use rusttype::{Font, Scale};

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const fn hex(rgb: u32) -> Rgb<u8> {
    Rgb([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8])
}

pub const WHITE: Rgb<u8> = hex(0xFFFFFF);
pub const BLACK: Rgb<u8> = hex(0x000000);
pub const GRAY: Rgb<u8> = hex(0x808080);
pub const LIGHT_GRAY: Rgb<u8> = hex(0xD3D3D3);
pub const RED: Rgb<u8> = hex(0xFF0000);
pub const GREEN: Rgb<u8> = hex(0x008000);
pub const BLUE: Rgb<u8> = hex(0x0000FF);
pub const ORANGE: Rgb<u8> = hex(0xFFA500);
pub const PURPLE: Rgb<u8> = hex(0x800080);
pub const YELLOW: Rgb<u8> = hex(0xFFFF00);
pub const PINK: Rgb<u8> = hex(0xFFC0CB);
pub const WHEAT: Rgb<u8> = hex(0xF5DEB3);
pub const LAVENDER: Rgb<u8> = hex(0xE6E6FA);
pub const LIGHT_BLUE: Rgb<u8> = hex(0xADD8E6);
pub const LIGHT_GREEN: Rgb<u8> = hex(0x90EE90);
pub const LIGHT_YELLOW: Rgb<u8> = hex(0xFFFFE0);
pub const LIGHT_CORAL: Rgb<u8> = hex(0xF08080);

/// Blend toward white, as if painted with `alpha` on a white background.
pub fn tint(color: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
    Rgb([mix(color[0]), mix(color[1]), mix(color[2])])
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// Fill and outline of a closed shape. `width` is in points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shape {
    pub fill: Option<Rgb<u8>>,
    pub stroke: Option<Rgb<u8>>,
    pub width: f32,
    pub dashed: bool,
}

impl Shape {
    pub fn fill(color: Rgb<u8>) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn outline(color: Rgb<u8>, width: f32) -> Self {
        Self::default().stroke(color, width)
    }

    pub fn stroke(mut self, color: Rgb<u8>, width: f32) -> Self {
        self.stroke = Some(color);
        self.width = width;
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Text appearance. `size` is in points; the anchor defaults to the center.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgb<u8>,
    pub bold: bool,
    pub h: HAlign,
    pub v: VAlign,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            color: BLACK,
            bold: false,
            h: HAlign::Center,
            v: VAlign::Center,
        }
    }

    pub fn color(mut self, color: Rgb<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn left(mut self) -> Self {
        self.h = HAlign::Left;
        self
    }

    pub fn right(mut self) -> Self {
        self.h = HAlign::Right;
        self
    }

    pub fn top(mut self) -> Self {
        self.v = VAlign::Top;
        self
    }

    pub fn bottom(mut self) -> Self {
        self.v = VAlign::Bottom;
        self
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Pixel rectangle of the current panel and its data limits.
#[derive(Debug, Clone, Copy)]
struct View {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    x: (f32, f32),
    y: (f32, f32),
    title_y: f32,
}

pub struct Canvas {
    image: RgbImage,
    font: Option<Font<'static>>,
    /// Pixels per point.
    pt: f32,
    /// Pixels reserved at the top for a figure-wide title.
    frame_top: f32,
    view: View,
}

impl Canvas {
    /// White canvas of the given size; text is skipped when `font` is `None`.
    pub fn new(width: u32, height: u32, font: Option<Font<'static>>) -> Self {
        let image = RgbImage::from_pixel(width.max(1), height.max(1), WHITE);
        // A 900px tall canvas corresponds to a 6in figure at 150 dpi.
        let pt = image.height() as f32 / 900.0 * 150.0 / 72.0;
        let mut canvas = Self {
            image,
            font,
            pt,
            frame_top: 0.0,
            view: View {
                left: 0.0,
                top: 0.0,
                width: 1.0,
                height: 1.0,
                x: (0.0, 1.0),
                y: (0.0, 1.0),
                title_y: 0.0,
            },
        };
        canvas.panel(0, 0, 1, 1);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    // -- layout ------------------------------------------------------------

    /// Figure-wide title; panels selected afterwards sit below it.
    pub fn suptitle(&mut self, text: &str) {
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        self.frame_top = h * 0.07;
        self.text_px((w / 2.0, h * 0.035), text, TextStyle::new(16.0).bold());
        self.panel(0, 0, 1, 1);
    }

    /// Draw into cell (`col`, `row`) of a `cols` x `rows` grid with limits reset to `0..1`.
    pub fn panel(&mut self, col: u32, row: u32, cols: u32, rows: u32) {
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        let cell_w = w / cols.max(1) as f32;
        let cell_h = (h - self.frame_top) / rows.max(1) as f32;
        let cell_left = col as f32 * cell_w;
        let cell_top = self.frame_top + row as f32 * cell_h;

        let margin_x = cell_w * 0.04;
        let title_band = cell_h * 0.1;
        let margin_bottom = cell_h * 0.03;

        self.view = View {
            left: cell_left + margin_x,
            top: cell_top + title_band,
            width: cell_w - 2.0 * margin_x,
            height: cell_h - title_band - margin_bottom,
            x: (0.0, 1.0),
            y: (0.0, 1.0),
            title_y: cell_top + title_band * 0.55,
        };
    }

    /// Data range mapped onto the current panel.
    pub fn limits(&mut self, x: (f32, f32), y: (f32, f32)) {
        self.view.x = x;
        self.view.y = y;
    }

    /// Panel title, centered in the band above the plot area.
    pub fn title(&mut self, text: &str, style: TextStyle) {
        let x = self.view.left + self.view.width / 2.0;
        let y = self.view.title_y;
        let style = TextStyle {
            h: HAlign::Center,
            v: VAlign::Center,
            ..style
        };
        self.text_px((x, y), text, style);
    }

    // -- coordinates ---------------------------------------------------------

    fn px(&self, (x, y): (f32, f32)) -> (f32, f32) {
        let v = &self.view;
        let fx = (x - v.x.0) / (v.x.1 - v.x.0);
        let fy = (y - v.y.0) / (v.y.1 - v.y.0);
        (v.left + fx * v.width, v.top + (1.0 - fy) * v.height)
    }

    fn sx(&self, dx: f32) -> f32 {
        dx / (self.view.x.1 - self.view.x.0) * self.view.width
    }

    fn sy(&self, dy: f32) -> f32 {
        dy / (self.view.y.1 - self.view.y.0) * self.view.height
    }

    /// Line width in pixels for a width in points.
    fn lw(&self, width: f32) -> f32 {
        (width * self.pt).max(1.0)
    }

    // -- shapes --------------------------------------------------------------

    /// Axis-aligned rectangle anchored at its lower-left corner.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, shape: Shape) {
        self.boxed(x, y, w, h, 0.0, shape);
    }

    /// Rectangle with rounded corners.
    pub fn round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, shape: Shape) {
        self.boxed(x, y, w, h, 10.0 * self.pt, shape);
    }

    fn boxed(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, shape: Shape) {
        let (left, top) = self.px((x, y + h));
        let (pw, ph) = (self.sx(w).abs(), self.sy(h).abs());
        let outline = box_outline(left, top, pw, ph, radius);
        self.shape_px(&outline, shape);
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, shape: Shape) {
        let (x, y) = self.px((cx, cy));
        let radius = self.sx(r).abs();
        self.ellipse_px((x, y), radius, radius, shape);
    }

    /// Ellipse given by its full width and height.
    pub fn ellipse(&mut self, cx: f32, cy: f32, w: f32, h: f32, shape: Shape) {
        let center = self.px((cx, cy));
        let (rx, ry) = (self.sx(w).abs() / 2.0, self.sy(h).abs() / 2.0);
        self.ellipse_px(center, rx, ry, shape);
    }

    fn ellipse_px(&mut self, (x, y): (f32, f32), rx: f32, ry: f32, shape: Shape) {
        let center = (x.round() as i32, y.round() as i32);
        let (rx, ry) = (rx.round().max(1.0) as i32, ry.round().max(1.0) as i32);

        if let Some(fill) = shape.fill {
            drawing::draw_filled_ellipse_mut(&mut self.image, center, rx, ry, fill);
        }
        if let Some(stroke) = shape.stroke {
            let width = self.lw(shape.width).round() as i32;
            for i in 0..width.max(1) {
                let d = i - width / 2;
                let (ex, ey) = ((rx + d).max(1), (ry + d).max(1));
                drawing::draw_hollow_ellipse_mut(&mut self.image, center, ex, ey, stroke);
            }
        }
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb<u8>, width: f32) {
        self.polyline(&[from, to], color, width);
    }

    pub fn dashed_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb<u8>, width: f32) {
        let (a, b) = (self.px(from), self.px(to));
        let w = self.lw(width);
        self.dashed_px(a, b, color, w);
    }

    pub fn polyline(&mut self, points: &[(f32, f32)], color: Rgb<u8>, width: f32) {
        let pts: Vec<(f32, f32)> = points.iter().map(|p| self.px(*p)).collect();
        let w = self.lw(width);
        self.polyline_px(&pts, color, w, false);
    }

    /// Straight arrow with a filled head at `to`.
    pub fn arrow(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb<u8>, width: f32) {
        let (a, b) = (self.px(from), self.px(to));
        let w = self.lw(width);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1.0 {
            return;
        }
        let (ux, uy) = (dx / len, dy / len);
        let head = (7.0 * self.pt + 2.0 * w).min(len);
        let half = head * 0.45;
        let base = (b.0 - ux * head, b.1 - uy * head);

        if len > head {
            self.segment_px(a, base, color, w);
        }
        let tri = [
            b,
            (base.0 - uy * half, base.1 + ux * half),
            (base.0 + uy * half, base.1 - ux * half),
        ];
        fill_polygon(&mut self.image, &tri, color);
    }

    /// Five-pointed star marker; `size` is the outer radius in points.
    pub fn star(&mut self, cx: f32, cy: f32, size: f32, color: Rgb<u8>) {
        let (x, y) = self.px((cx, cy));
        let outer = size * self.pt;
        let inner = outer * 0.45;
        let points: Vec<(f32, f32)> = (0..10)
            .map(|i| {
                let r = if i % 2 == 0 { outer } else { inner };
                let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
                (x + r * angle.cos(), y + r * angle.sin())
            })
            .collect();
        fill_polygon(&mut self.image, &points, color);
    }

    // -- text ----------------------------------------------------------------

    pub fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
        let p = self.px((x, y));
        self.text_px(p, text, style);
    }

    /// Text on a rounded background box.
    pub fn label(&mut self, x: f32, y: f32, text: &str, style: TextStyle, fill: Rgb<u8>) {
        let (px, py) = self.px((x, y));
        let (tw, th) = self.measure(text, style.size);
        let pad = 0.4 * style.size * self.pt;

        let left = match style.h {
            HAlign::Left => px,
            HAlign::Center => px - tw / 2.0,
            HAlign::Right => px - tw,
        };
        let top = match style.v {
            VAlign::Top => py,
            VAlign::Center => py - th / 2.0,
            VAlign::Bottom => py - th,
        };
        let outline = box_outline(left - pad, top - pad, tw + 2.0 * pad, th + 2.0 * pad, pad);
        self.shape_px(&outline, Shape::fill(fill).stroke(tint(fill, 0.6), 0.8));
        self.text_px((px, py), text, style);
    }

    /// Legend box in the upper-right corner of the panel.
    pub fn legend(&mut self, entries: &[(&str, Rgb<u8>)]) {
        if entries.is_empty() {
            return;
        }
        let size = 9.0;
        let line_h = size * self.pt * 1.5;
        let swatch = size * self.pt;
        let text_w = entries
            .iter()
            .map(|(t, _)| self.measure(t, size).0)
            .fold(0.0_f32, f32::max);

        let pad = swatch * 0.6;
        let box_w = pad * 3.0 + swatch + text_w;
        let box_h = pad * 2.0 + line_h * entries.len() as f32;
        let left = self.view.left + self.view.width - box_w - pad;
        let top = self.view.top + pad;

        let outline = box_outline(left, top, box_w, box_h, pad * 0.5);
        self.shape_px(&outline, Shape::fill(WHITE).stroke(LIGHT_GRAY, 0.8));

        for (i, (text, color)) in entries.iter().enumerate() {
            let cy = top + pad + line_h * (i as f32 + 0.5);
            let sw = box_outline(left + pad, cy - swatch / 2.0, swatch, swatch, 0.0);
            self.shape_px(&sw, Shape::fill(*color));
            self.text_px(
                (left + pad * 2.0 + swatch, cy),
                text,
                TextStyle::new(size).left(),
            );
        }
    }

    /// Pixel size of multi-line text; estimated when no font is loaded.
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        let px = size * self.pt;
        let line_h = px * 1.25;
        let lines: Vec<&str> = text.lines().collect();
        let width = lines
            .iter()
            .map(|line| match &self.font {
                Some(font) => drawing::text_size(Scale::uniform(px), font, line).0 as f32,
                None => line.chars().count() as f32 * px * 0.9,
            })
            .fold(0.0_f32, f32::max);
        (width, line_h * lines.len().max(1) as f32)
    }

    fn text_px(&mut self, (x, y): (f32, f32), text: &str, style: TextStyle) {
        let Some(font) = self.font.as_ref() else {
            return;
        };
        let px = style.size * self.pt;
        let scale = Scale::uniform(px);
        let line_h = px * 1.25;
        let lines: Vec<&str> = text.lines().collect();
        let total = line_h * lines.len() as f32;

        let top = match style.v {
            VAlign::Top => y,
            VAlign::Center => y - total / 2.0,
            VAlign::Bottom => y - total,
        };

        for (i, line) in lines.iter().enumerate() {
            let width = drawing::text_size(scale, font, line).0 as f32;
            let left = match style.h {
                HAlign::Left => x,
                HAlign::Center => x - width / 2.0,
                HAlign::Right => x - width,
            };
            let (lx, ly) = (left.round() as i32, (top + i as f32 * line_h).round() as i32);
            drawing::draw_text_mut(&mut self.image, style.color, lx, ly, scale, font, line);
            if style.bold {
                drawing::draw_text_mut(&mut self.image, style.color, lx + 1, ly, scale, font, line);
            }
        }
    }

    // -- pixel primitives ----------------------------------------------------

    fn shape_px(&mut self, outline: &[(f32, f32)], shape: Shape) {
        if let Some(fill) = shape.fill {
            fill_polygon(&mut self.image, outline, fill);
        }
        if let Some(stroke) = shape.stroke {
            let w = self.lw(shape.width);
            let mut closed = outline.to_vec();
            if let Some(first) = outline.first() {
                closed.push(*first);
            }
            self.polyline_px(&closed, stroke, w, shape.dashed);
        }
    }

    fn polyline_px(&mut self, points: &[(f32, f32)], color: Rgb<u8>, width: f32, dashed: bool) {
        for pair in points.windows(2) {
            if dashed {
                self.dashed_px(pair[0], pair[1], color, width);
            } else {
                self.segment_px(pair[0], pair[1], color, width);
            }
        }
        if width >= 3.0 && !dashed {
            let r = (width / 2.0).round() as i32;
            for p in points {
                let c = (p.0.round() as i32, p.1.round() as i32);
                drawing::draw_filled_circle_mut(&mut self.image, c, r, color);
            }
        }
    }

    fn dashed_px(&mut self, a: (f32, f32), b: (f32, f32), color: Rgb<u8>, width: f32) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1.0 {
            return;
        }
        let dash = width * 3.0 + 4.0 * self.pt;
        let gap = dash * 0.6;
        let (ux, uy) = (dx / len, dy / len);

        let mut t = 0.0;
        while t < len {
            let end = (t + dash).min(len);
            self.segment_px(
                (a.0 + ux * t, a.1 + uy * t),
                (a.0 + ux * end, a.1 + uy * end),
                color,
                width,
            );
            t = end + gap;
        }
    }

    fn segment_px(&mut self, a: (f32, f32), b: (f32, f32), color: Rgb<u8>, width: f32) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        if width < 1.5 || len < 1.0 {
            drawing::draw_line_segment_mut(&mut self.image, a, b, color);
            return;
        }
        let half = width / 2.0;
        let (nx, ny) = (-dy / len * half, dx / len * half);
        let quad = [
            (a.0 + nx, a.1 + ny),
            (b.0 + nx, b.1 + ny),
            (b.0 - nx, b.1 - ny),
            (a.0 - nx, a.1 - ny),
        ];
        fill_polygon(&mut self.image, &quad, color);
    }
}

/// Outline of a box in pixel space, with corners rounded by `radius`.
fn box_outline(left: f32, top: f32, w: f32, h: f32, radius: f32) -> Vec<(f32, f32)> {
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    if r < 1.0 {
        return vec![(left, top), (left + w, top), (left + w, top + h), (left, top + h)];
    }

    let corners = [
        (left + w - r, top + r, -std::f32::consts::FRAC_PI_2),
        (left + w - r, top + h - r, 0.0),
        (left + r, top + h - r, std::f32::consts::FRAC_PI_2),
        (left + r, top + r, std::f32::consts::PI),
    ];
    let steps = 6;
    corners
        .iter()
        .flat_map(|&(cx, cy, start)| {
            (0..=steps).map(move |i| {
                let a = start + std::f32::consts::FRAC_PI_2 * i as f32 / steps as f32;
                (cx + r * a.cos(), cy + r * a.sin())
            })
        })
        .collect()
}

/// Fill a polygon given in pixel space, skipping degenerate input.
fn fill_polygon(image: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>) {
    let mut poly: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for p in points {
        let q = Point::new(p.0.round() as i32, p.1.round() as i32);
        if poly.last() != Some(&q) {
            poly.push(q);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }

    match poly.len() {
        0 => {}
        1 | 2 => {
            let (a, b) = (poly[0], poly[poly.len() - 1]);
            drawing::draw_line_segment_mut(
                image,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                color,
            );
        }
        _ => drawing::draw_polygon_mut(image, &poly, color),
    }
}
