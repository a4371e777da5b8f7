//! Brightness-to-glyph rendering of raster images.
//!
//! Images are decoded, reduced to 8-bit luminance, resampled to the requested
//! character width and quantized against [`GLYPH_RAMP`]. Terminal cells are
//! roughly twice as tall as they are wide, so the target height is halved.

use std::error::Error;
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use image::imageops::FilterType;
use image::ImageError;
use tracing::debug;

/// Glyphs ordered from darkest to lightest.
pub static GLYPH_RAMP: [char; 10] = ['@', '%', '#', '*', '+', '=', '-', ':', '.', ' '];

/// Vertical correction applied to the aspect ratio to account for tall cells.
pub const CELL_ASPECT_CORRECTION: f64 = 0.5;

/// Output size, in glyphs, above which rendering is refused.
pub const MAX_RENDER_CELLS: u64 = 1_000_000;

pub const UNSUPPORTED_FORMAT_PLACEHOLDER: &str = "[Image format not supported]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The buffer is empty or not a raster format the decoder recognises.
    UnsupportedFormat,
    /// The format was recognised but the content could not be processed.
    Decode(String),
}

impl RenderError {
    /// Text shown in place of the rendering.
    pub fn placeholder(&self) -> String {
        match self {
            RenderError::UnsupportedFormat => UNSUPPORTED_FORMAT_PLACEHOLDER.to_string(),
            RenderError::Decode(reason) => format!("[Error converting image: {reason}]"),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnsupportedFormat => write!(f, "image format not supported"),
            RenderError::Decode(reason) => write!(f, "failed to decode image: {reason}"),
        }
    }
}

impl Error for RenderError {}

impl From<ImageError> for RenderError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Unsupported(_) => RenderError::UnsupportedFormat,
            other => RenderError::Decode(other.to_string()),
        }
    }
}

/// Number of character rows for an image of `orig_width × orig_height` pixels
/// rendered `width` characters wide. Never less than one.
pub fn target_height(orig_width: u32, orig_height: u32, width: NonZeroU32) -> u32 {
    let aspect = f64::from(orig_height) / f64::from(orig_width);
    let height = (f64::from(width.get()) * aspect * CELL_ASPECT_CORRECTION).round();
    if height < 1.0 {
        1
    } else if height >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        height as u32
    }
}

/// Maps a luminance sample onto the ramp by linear quantization.
pub fn glyph_for_luminance(value: u8) -> char {
    let last = GLYPH_RAMP.len() - 1;
    let index = (usize::from(value) * last) / 255;
    GLYPH_RAMP[index.min(last)]
}

/// Renders encoded image bytes as rows of exactly `width` glyphs joined by `\n`.
pub fn render(image_bytes: &[u8], width: NonZeroU32) -> Result<String, RenderError> {
    if image_bytes.is_empty() {
        return Err(RenderError::UnsupportedFormat);
    }

    let decoded = image::load_from_memory(image_bytes)?;
    let (orig_width, orig_height) = (decoded.width(), decoded.height());
    if orig_width == 0 || orig_height == 0 {
        return Err(RenderError::Decode(format!(
            "image has no pixels ({orig_width}x{orig_height})"
        )));
    }

    let height = target_height(orig_width, orig_height, width);
    if u64::from(width.get()) * u64::from(height) > MAX_RENDER_CELLS {
        return Err(RenderError::Decode("image too large to render".to_string()));
    }

    let gray = decoded.to_luma8();
    let resized = image::imageops::resize(&gray, width.get(), height, FilterType::Triangle);
    debug!(
        orig_width,
        orig_height,
        width = width.get(),
        height,
        "rendering image as glyphs"
    );

    let row_len = width.get() as usize;
    let mut out = String::with_capacity((row_len + 1) * height as usize);
    for (i, sample) in resized.as_raw().iter().enumerate() {
        if i > 0 && i % row_len == 0 {
            out.push('\n');
        }
        out.push(glyph_for_luminance(*sample));
    }
    Ok(out)
}

/// Like [`render`], but failures become a human-readable placeholder line.
pub fn render_or_placeholder(image_bytes: &[u8], width: NonZeroU32) -> String {
    render(image_bytes, width).unwrap_or_else(|err| {
        debug!(error = %err, "image rendering fell back to placeholder");
        err.placeholder()
    })
}

/// Renders on the blocking pool, giving up after `timeout`.
pub async fn render_media_text(bytes: Vec<u8>, width: NonZeroU32, timeout: Duration) -> String {
    let task = tokio::task::spawn_blocking(move || render_or_placeholder(&bytes, width));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(text)) => text,
        Ok(Err(join_err)) => RenderError::Decode(join_err.to_string()).placeholder(),
        Err(_) => RenderError::Decode("timed out".to_string()).placeholder(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Luma, Rgb, RgbImage};
    use std::io::Cursor;

    fn width(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("non-zero width")
    }

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), format)
            .expect("encode test image");
        buf
    }

    fn solid_png(w: u32, h: u32, value: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([value, value, value]));
        encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
    }

    #[test]
    fn ramp_bounds_map_to_first_and_last_glyph() {
        assert_eq!(glyph_for_luminance(0), '@');
        assert_eq!(glyph_for_luminance(255), ' ');
        assert_eq!(glyph_for_luminance(28), '@');
        assert_eq!(glyph_for_luminance(29), '%');
        assert_eq!(glyph_for_luminance(254), '.');
    }

    #[test]
    fn target_height_rounds_and_halves() {
        assert_eq!(target_height(100, 50, width(10)), 3);
        assert_eq!(target_height(100, 100, width(40)), 20);
        assert_eq!(target_height(40, 80, width(40)), 40);
    }

    #[test]
    fn target_height_clamps_extreme_aspect_to_one_row() {
        assert_eq!(target_height(1000, 1, width(40)), 1);
        assert_eq!(target_height(u32::MAX, 1, width(1)), 1);
    }

    #[test]
    fn solid_black_image_renders_darkest_glyph_rows() {
        let output = render(&solid_png(100, 50, 0), width(10)).expect("render");
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows.len(), 3);
        for row in rows {
            assert_eq!(row, "@@@@@@@@@@");
        }
    }

    #[test]
    fn oversized_output_is_refused_without_allocating() {
        let tiny = solid_png(1, 1, 0);
        assert_eq!(
            render(&tiny, width(u32::MAX)),
            Err(RenderError::Decode("image too large to render".into()))
        );
        assert_eq!(
            render_or_placeholder(&tiny, width(u32::MAX)),
            "[Error converting image: image too large to render]"
        );

        // A tall image at a modest width can exceed the limit too.
        let tall = solid_png(1, 4000, 0);
        assert!(render(&tall, width(1000)).is_err());
        let widest = render(&solid_png(2, 2, 0), width(1000)).expect("within limit");
        assert_eq!(widest.lines().count(), 500);
    }

    #[test]
    fn solid_black_jpeg_renders_darkest_glyph() {
        let img = RgbImage::from_pixel(100, 50, Rgb([0, 0, 0]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg);
        let output = render(&bytes, width(10)).expect("render");
        assert!(output.chars().filter(|c| *c != '\n').all(|c| c == '@'));
        assert!(output.lines().all(|row| row.chars().count() == 10));
    }

    #[test]
    fn solid_white_image_renders_lightest_glyph() {
        let output = render(&solid_png(20, 20, 255), width(8)).expect("render");
        assert_eq!(output.lines().count(), 4);
        assert!(output.lines().all(|row| row == "        "));
    }

    #[test]
    fn every_row_has_requested_width_and_ramp_glyphs_only() {
        let gradient = image::GrayImage::from_fn(64, 48, |x, y| Luma([((x * 4 + y) % 256) as u8]));
        let bytes = encode(DynamicImage::ImageLuma8(gradient), ImageFormat::Png);
        for w in [1, 7, 40, 90] {
            let output = render(&bytes, width(w)).expect("render");
            let expected_rows = target_height(64, 48, width(w)) as usize;
            assert_eq!(output.lines().count(), expected_rows);
            for row in output.split('\n') {
                assert_eq!(row.chars().count(), w as usize);
                assert!(row.chars().all(|c| GLYPH_RAMP.contains(&c)));
            }
        }
    }

    #[test]
    fn output_has_no_trailing_newline() {
        let output = render(&solid_png(10, 10, 128), width(4)).expect("render");
        assert!(!output.ends_with('\n'));
    }

    #[test]
    fn rendering_is_deterministic() {
        let img = RgbImage::from_fn(33, 17, |x, y| Rgb([(x * 7) as u8, (y * 13) as u8, 90]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);
        let first = render(&bytes, width(25)).expect("render");
        let second = render(&bytes, width(25)).expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn extreme_aspect_ratio_still_produces_one_full_row() {
        let output = render(&solid_png(1000, 1, 0), width(40)).expect("render");
        assert_eq!(output, "@".repeat(40));
    }

    #[test]
    fn other_formats_are_decoded() {
        let img = RgbImage::from_pixel(16, 16, Rgb([0, 0, 0]));
        for format in [ImageFormat::Bmp, ImageFormat::Gif] {
            let bytes = encode(DynamicImage::ImageRgb8(img.clone()), format);
            let output = render(&bytes, width(4)).expect("render");
            assert_eq!(output, "@@@@\n@@@@");
        }
    }

    #[test]
    fn empty_buffer_is_unsupported() {
        assert_eq!(render(&[], width(40)), Err(RenderError::UnsupportedFormat));
        assert_eq!(
            render_or_placeholder(&[], width(40)),
            "[Image format not supported]"
        );
    }

    #[test]
    fn non_image_bytes_are_unsupported() {
        let text = b"definitely not an image, just some words";
        assert_eq!(render(text, width(40)), Err(RenderError::UnsupportedFormat));
        assert!(render_or_placeholder(text, width(40)).contains("format"));
    }

    #[test]
    fn truncated_image_yields_error_placeholder() {
        let img = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * y) as u8, (x + y) as u8, x as u8]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);
        let truncated = &bytes[..bytes.len() / 2];
        let result = render(truncated, width(20));
        assert!(matches!(result, Err(RenderError::Decode(_))));
        let placeholder = render_or_placeholder(truncated, width(20));
        assert!(placeholder.starts_with("[Error converting image: "));
        assert!(placeholder.ends_with(']'));
    }

    #[tokio::test]
    async fn blocking_wrapper_returns_rendering() {
        let text = render_media_text(solid_png(4, 4, 0), width(4), Duration::from_secs(5)).await;
        assert_eq!(text, "@@@@\n@@@@");
    }

    #[tokio::test]
    async fn blocking_wrapper_recovers_bad_input() {
        let text = render_media_text(Vec::new(), width(4), Duration::from_secs(5)).await;
        assert_eq!(text, UNSUPPORTED_FORMAT_PLACEHOLDER);
    }
}
