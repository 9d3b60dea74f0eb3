//! Screenshot annotation: one outlined rectangle per visible element

use crate::dom::BoundingBox;
use crate::error::{InventoryError, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;

/// Outline color
pub const HIGHLIGHT: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Draw an outline for each box onto the image
///
/// Boxes smaller than one pixel or lying entirely outside the image are
/// skipped. Returns the number of outlines drawn.
pub fn draw_boxes(image: &mut RgbaImage, boxes: &[BoundingBox]) -> usize {
    let (width, height) = image.dimensions();
    let mut drawn = 0;

    for bbox in boxes {
        let w = bbox.width.round();
        let h = bbox.height.round();
        if w < 1.0 || h < 1.0 {
            continue;
        }

        let x = bbox.x.round();
        let y = bbox.y.round();
        if x >= width as f64 || y >= height as f64 || x + w <= 0.0 || y + h <= 0.0 {
            continue;
        }

        let rect = Rect::at(x as i32, y as i32).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(image, rect, HIGHLIGHT);
        drawn += 1;
    }

    drawn
}

/// Decode a screenshot, outline the boxes and save it to `output`
///
/// The output format follows the file extension.
pub fn annotate_screenshot(screenshot: &[u8], boxes: &[BoundingBox], output: &Path) -> Result<usize> {
    let mut image = image::load_from_memory(screenshot)
        .map_err(|e| InventoryError::RenderFailed(format!("Failed to decode screenshot: {}", e)))?
        .to_rgba8();

    let drawn = draw_boxes(&mut image, boxes);

    image
        .save(output)
        .map_err(|e| InventoryError::RenderFailed(format!("Failed to save {}: {}", output.display(), e)))?;

    Ok(drawn)
}
