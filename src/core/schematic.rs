//! Local isometric box diagram of the parcels, drawn without the image model.

use crate::domain::model::ProductRecord;
use crate::utils::error::Result;
use image::{ImageFormat, Rgb, RgbImage};
use regex::Regex;
use std::io::Cursor;
use std::sync::LazyLock;

static DIMENSIONS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*[xX×*]\s*(\d+(?:\.\d+)?)\s*[xX×*]\s*(\d+(?:\.\d+)?)")
        .expect("dimensions pattern is valid")
});

pub const CANVAS_WIDTH: u32 = 1024;
pub const CANVAS_HEIGHT: u32 = 768;
const MARGIN: f32 = 40.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE: Rgb<u8> = Rgb([40, 40, 40]);
const EXPLOSIVE_COLOR: Rgb<u8> = Rgb([214, 69, 65]);
const PERISHABLE_COLOR: Rgb<u8> = Rgb([76, 175, 80]);
const ORDINARY_COLOR: Rgb<u8> = Rgb([66, 133, 244]);

// cos(30°), sin(30°)
const ISO_X: f32 = 0.866_025_4;
const ISO_Y: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDims {
    pub width: f32,
    pub height: f32,
    pub length: f32,
}

/// Reads the first `W x H x L` triple in `text`; units are ignored.
pub fn parse_dimensions(text: &str) -> Option<BoxDims> {
    let caps = DIMENSIONS_PATTERN.captures(text)?;
    let value = |i: usize| caps.get(i)?.as_str().parse::<f32>().ok();

    let dims = BoxDims {
        width: value(1)?,
        height: value(2)?,
        length: value(3)?,
    };

    (dims.width > 0.0 && dims.height > 0.0 && dims.length > 0.0).then_some(dims)
}

struct Parcel {
    origin_x: f32,
    dims: BoxDims,
    color: Rgb<u8>,
}

/// Renders every product with parseable dimensions as an extruded box,
/// left to right. Returns PNG bytes, or `None` when nothing could be drawn.
pub fn render_schematic(products: &[ProductRecord]) -> Result<Option<Vec<u8>>> {
    let mut boxes = Vec::new();
    for product in products {
        match parse_dimensions(&product.dimensions) {
            Some(dims) => boxes.push((dims, hazard_color(product))),
            None => tracing::warn!(
                "Skipping '{}' in schematic, unreadable dimensions: {}",
                product.name,
                product.dimensions
            ),
        }
    }

    if boxes.is_empty() {
        return Ok(None);
    }

    let largest = boxes
        .iter()
        .map(|(d, _)| d.width.max(d.height).max(d.length))
        .fold(0.0_f32, f32::max);
    let gap = largest * 0.25;

    let mut parcels = Vec::with_capacity(boxes.len());
    let mut cursor = 0.0;
    for (dims, color) in boxes {
        parcels.push(Parcel {
            origin_x: cursor,
            dims,
            color,
        });
        cursor += dims.width + gap;
    }

    let faces: Vec<(Vec<[f32; 3]>, Rgb<u8>)> = parcels.iter().flat_map(parcel_faces).collect();

    let projected: Vec<(f32, f32)> = faces
        .iter()
        .flat_map(|(corners, _)| corners.iter().map(|p| project(*p)))
        .collect();
    let (min_u, max_u, min_v, max_v) = bounds(&projected);

    let span_u = (max_u - min_u).max(f32::EPSILON);
    let span_v = (max_v - min_v).max(f32::EPSILON);
    let scale = ((CANVAS_WIDTH as f32 - 2.0 * MARGIN) / span_u)
        .min((CANVAS_HEIGHT as f32 - 2.0 * MARGIN) / span_v);

    let to_screen = |(u, v): (f32, f32)| {
        (
            MARGIN + (u - min_u) * scale,
            MARGIN + (v - min_v) * scale,
        )
    };

    let mut canvas = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND);

    // Parcels further along x sit closer to the viewer, so later faces win
    for (corners, color) in &faces {
        let screen: Vec<(f32, f32)> = corners.iter().map(|p| to_screen(project(*p))).collect();
        fill_polygon(&mut canvas, &screen, *color);
        for i in 0..screen.len() {
            draw_line(&mut canvas, screen[i], screen[(i + 1) % screen.len()], OUTLINE);
        }
    }

    let mut png = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(Some(png))
}

fn hazard_color(product: &ProductRecord) -> Rgb<u8> {
    if product.explosive.is_true() {
        EXPLOSIVE_COLOR
    } else if product.perishable.is_true() {
        PERISHABLE_COLOR
    } else {
        ORDINARY_COLOR
    }
}

/// Top, +x and +z faces, the three visible from the viewpoint.
fn parcel_faces(parcel: &Parcel) -> Vec<(Vec<[f32; 3]>, Rgb<u8>)> {
    let x0 = parcel.origin_x;
    let x1 = x0 + parcel.dims.width;
    let h = parcel.dims.height;
    let l = parcel.dims.length;

    vec![
        (
            vec![[x0, h, 0.0], [x1, h, 0.0], [x1, h, l], [x0, h, l]],
            shade(parcel.color, 1.15),
        ),
        (
            vec![[x1, 0.0, 0.0], [x1, h, 0.0], [x1, h, l], [x1, 0.0, l]],
            shade(parcel.color, 0.85),
        ),
        (
            vec![[x0, 0.0, l], [x1, 0.0, l], [x1, h, l], [x0, h, l]],
            shade(parcel.color, 0.7),
        ),
    ]
}

fn project([x, y, z]: [f32; 3]) -> (f32, f32) {
    ((x - z) * ISO_X, (x + z) * ISO_Y - y)
}

fn bounds(points: &[(f32, f32)]) -> (f32, f32, f32, f32) {
    points.iter().fold(
        (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
        |(min_u, max_u, min_v, max_v), &(u, v)| {
            (min_u.min(u), max_u.max(u), min_v.min(v), max_v.max(v))
        },
    )
}

fn shade(color: Rgb<u8>, factor: f32) -> Rgb<u8> {
    let Rgb([r, g, b]) = color;
    let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    Rgb([scale(r), scale(g), scale(b)])
}

/// Scanline fill; only correct for convex polygons.
fn fill_polygon(canvas: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    let (_, _, min_y, max_y) = bounds(points);

    let first_row = min_y.floor().max(0.0) as u32;
    let last_row = max_y.ceil().min(height as f32 - 1.0).max(0.0) as u32;

    for row in first_row..=last_row {
        let y = row as f32 + 0.5;
        let mut left = f32::MAX;
        let mut right = f32::MIN;

        for i in 0..points.len() {
            let (x1, y1) = points[i];
            let (x2, y2) = points[(i + 1) % points.len()];
            if (y1 <= y && y2 > y) || (y2 <= y && y1 > y) {
                let x = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
                left = left.min(x);
                right = right.max(x);
            }
        }

        if left > right {
            continue;
        }

        let start = left.round().max(0.0) as u32;
        let end = right.round().min(width as f32 - 1.0);
        if end < start as f32 {
            continue;
        }
        for col in start..=end as u32 {
            canvas.put_pixel(col, row, color);
        }
    }
}

fn draw_line(canvas: &mut RgbImage, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (from.0 + dx * t).round();
        let y = (from.1 + dy * t).round();
        if x >= 0.0 && y >= 0.0 && (x as u32) < width && (y as u32) < height {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}
