//! Bar chart rendering for gradebook reports. Marks are drawn on a fixed
//! 0-100 scale; styling is deliberately minimal.

use anyhow::{anyhow, Result};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;

pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 540;

const MARGIN_LEFT: u32 = 40;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 20;
const MARGIN_BOTTOM: u32 = 30;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([66, 133, 244]),
    Rgb([219, 68, 55]),
    Rgb([244, 180, 0]),
    Rgb([15, 157, 88]),
    Rgb([171, 71, 188]),
    Rgb([0, 172, 193]),
];

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for x in x0..x1.min(img.width()) {
        for y in y0..y1.min(img.height()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Render one bar per (label, value) pair, in input order, to PNG bytes.
/// Values are clamped into 0..=100.
pub fn bar_chart_png(values: &[(String, f64)], width: u32, height: u32) -> Result<Vec<u8>> {
    if values.is_empty() {
        return Err(anyhow!("Cannot render a chart with no values"));
    }

    let mut img = RgbImage::new(width, height);
    fill_rect(&mut img, 0, 0, width, height, BACKGROUND);

    let plot_left = MARGIN_LEFT;
    let plot_right = width.saturating_sub(MARGIN_RIGHT);
    let plot_top = MARGIN_TOP;
    let plot_bottom = height.saturating_sub(MARGIN_BOTTOM);
    let plot_height = (plot_bottom - plot_top) as f64;

    // Axes
    fill_rect(&mut img, plot_left - 2, plot_top, plot_left, plot_bottom, AXIS);
    fill_rect(&mut img, plot_left - 2, plot_bottom, plot_right, plot_bottom + 2, AXIS);

    let slot = (plot_right - plot_left) / values.len() as u32;
    let gap = (slot / 5).max(2);
    let bar_width = slot.saturating_sub(gap).max(1);

    for (i, (_, value)) in values.iter().enumerate() {
        let clamped = value.clamp(0.0, 100.0);
        let bar_height = ((clamped / 100.0) * plot_height).round() as u32;

        let x0 = plot_left + i as u32 * slot + gap / 2;
        let x1 = x0 + bar_width;
        let y0 = plot_bottom.saturating_sub(bar_height);

        fill_rect(&mut img, x0, y0, x1, plot_bottom, PALETTE[i % PALETTE.len()]);
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| anyhow!("Failed to encode chart PNG: {}", e))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<(String, f64)> {
        vec![
            ("Maths".to_string(), 78.0),
            ("Science".to_string(), 42.5),
            ("English".to_string(), 91.0),
        ]
    }

    #[test]
    fn renders_a_decodable_png_of_requested_size() {
        let bytes = bar_chart_png(&sample(), 300, 200).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 300);
        assert_eq!(decoded.height(), 200);
    }

    #[test]
    fn chart_contains_bar_pixels() {
        let bytes = bar_chart_png(&sample(), 300, 200).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let colored = decoded
            .pixels()
            .filter(|p| p.0 != [255, 255, 255] && p.0 != [60, 60, 60])
            .count();
        assert!(colored > 100, "expected bar pixels, found {}", colored);
    }

    #[test]
    fn rendering_is_deterministic() {
        let first = bar_chart_png(&sample(), 300, 200).unwrap();
        let second = bar_chart_png(&sample(), 300, 200).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let values = vec![("Bonus".to_string(), 250.0), ("Below".to_string(), -10.0)];
        let bytes = bar_chart_png(&values, 200, 150).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(bar_chart_png(&[], 300, 200).is_err());
    }
}
