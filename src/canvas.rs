use std::io::Cursor;

use egui::{Color32, ColorImage, Pos2};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::data_url::encode_data_url;
use crate::error::CanvasError;
use crate::input::CanvasInput;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub const MIN_BRUSH_WIDTH: f32 = 1.0;
pub const MAX_BRUSH_WIDTH: f32 = 50.0;
pub const DEFAULT_BRUSH_WIDTH: f32 = 5.0;

/// The raster surface the user sketches on.
///
/// Strokes are not kept around as objects: each pointer move paints one
/// round-capped segment straight into the pixel buffer. The buffer always
/// holds a solid background before anything is drawn on it.
#[derive(Debug, Clone)]
pub struct SketchCanvas {
    buffer: RgbaImage,
    /// Whether a stroke is currently in progress
    drawing: bool,
    /// End of the current path, if any
    last_point: Option<Pos2>,
    /// Bumped on every pixel mutation so the texture can be refreshed lazily
    version: u64,
}

impl Default for SketchCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchCanvas {
    /// An empty surface; it gets real dimensions on the first layout pass.
    pub fn new() -> Self {
        Self {
            buffer: RgbaImage::new(0, 0),
            drawing: false,
            last_point: None,
            version: 0,
        }
    }

    /// Create a surface of the given size, already filled with the background
    pub fn with_size(size: [usize; 2]) -> Self {
        let mut canvas = Self::new();
        canvas.resize(size);
        canvas
    }

    /// Match the buffer to the layout box.
    ///
    /// A real size change recreates the buffer and wipes everything drawn so
    /// far. Calling this with the current size does nothing, so it is safe to
    /// call every frame.
    pub fn resize(&mut self, size: [usize; 2]) -> bool {
        if size == self.size() {
            return false;
        }
        let [width, height] = size;
        log::debug!("Resizing sketch canvas to {}x{}", width, height);
        self.buffer = RgbaImage::from_pixel(width as u32, height as u32, BACKGROUND);
        self.last_point = None;
        self.version += 1;
        true
    }

    pub fn begin_stroke(&mut self, pos: Pos2) {
        self.drawing = true;
        self.last_point = Some(pos);
    }

    /// Extend the current stroke to `pos` using the brush width at this moment.
    ///
    /// Returns false when no stroke is in progress.
    pub fn extend_stroke(&mut self, pos: Pos2, brush_width: f32) -> bool {
        if !self.drawing {
            return false;
        }
        if let Some(from) = self.last_point {
            self.paint_segment(from, pos, brush_width);
        }
        self.last_point = Some(pos);
        true
    }

    pub fn end_stroke(&mut self) {
        self.drawing = false;
        self.last_point = None;
    }

    /// Apply one translated pointer/touch command
    pub fn apply(&mut self, input: CanvasInput, brush_width: f32) {
        match input {
            CanvasInput::Begin(pos) => self.begin_stroke(pos),
            CanvasInput::Extend(pos) => {
                self.extend_stroke(pos, brush_width);
            }
            CanvasInput::End => self.end_stroke(),
        }
    }

    /// Refill the whole buffer with the background color
    pub fn clear(&mut self) {
        log::debug!("Clearing sketch canvas");
        for pixel in self.buffer.pixels_mut() {
            *pixel = BACKGROUND;
        }
        self.version += 1;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn size(&self) -> [usize; 2] {
        [self.buffer.width() as usize, self.buffer.height() as usize]
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        self.buffer
            .get_pixel_checked(x, y)
            .map(|Rgba([r, g, b, a])| Color32::from_rgba_unmultiplied(*r, *g, *b, *a))
    }

    /// True if no stroke pixels remain in the buffer
    pub fn is_blank(&self) -> bool {
        self.buffer.pixels().all(|p| *p == BACKGROUND)
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(self.size(), self.buffer.as_raw())
    }

    /// Snapshot the buffer as a base64 PNG `data:` URL
    pub fn to_png_data_url(&self) -> Result<String, CanvasError> {
        if self.buffer.width() == 0 || self.buffer.height() == 0 {
            return Err(CanvasError::Empty);
        }
        let mut bytes = Vec::new();
        self.buffer
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(encode_data_url("image/png", &bytes))
    }

    /// Fill every pixel whose center lies within half the brush width of the
    /// segment, which gives round caps and joins for free.
    fn paint_segment(&mut self, from: Pos2, to: Pos2, brush_width: f32) {
        let (width, height) = self.buffer.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let radius = brush_width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH) / 2.0;
        let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
        let max_x = (from.x.max(to.x) + radius).ceil().min(width as f32) as u32;
        let max_y = (from.y.max(to.y) + radius).ceil().min(height as f32) as u32;
        let radius_sq = radius * radius;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(center, from, to) <= radius_sq {
                    self.buffer.put_pixel(x, y, STROKE_COLOR);
                }
            }
        }
        self.version += 1;
    }
}

fn distance_sq_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p - (a + ab * t)).length_sq()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_until_laid_out() {
        let canvas = SketchCanvas::new();
        assert_eq!(canvas.size(), [0, 0]);
        assert!(matches!(canvas.to_png_data_url(), Err(CanvasError::Empty)));
    }

    #[test]
    fn segment_distance_handles_degenerate_segments() {
        let p = Pos2::new(3.0, 4.0);
        let origin = Pos2::ZERO;
        assert_eq!(distance_sq_to_segment(p, origin, origin), 25.0);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_sq_to_segment(Pos2::new(5.0, 2.0), a, b), 4.0);
        assert_eq!(distance_sq_to_segment(Pos2::new(13.0, 4.0), a, b), 25.0);
    }

    #[test]
    fn strokes_outside_the_buffer_are_clipped() {
        let mut canvas = SketchCanvas::with_size([10, 10]);
        canvas.begin_stroke(Pos2::new(-50.0, -50.0));
        assert!(canvas.extend_stroke(Pos2::new(-40.0, -40.0), 5.0));
        assert!(canvas.is_blank());
    }

    #[test]
    fn same_size_resize_keeps_content() {
        let mut canvas = SketchCanvas::with_size([20, 20]);
        canvas.begin_stroke(Pos2::new(2.0, 10.0));
        canvas.extend_stroke(Pos2::new(18.0, 10.0), 3.0);
        assert!(!canvas.resize([20, 20]));
        assert!(!canvas.is_blank());
    }
}
