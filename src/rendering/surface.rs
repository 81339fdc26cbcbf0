//! Pixel surface helpers.
//!
//! Surfaces are `tiny_skia::Pixmap`s. The downscale into the processing
//! surface uses bilinear filtering; the upscale back onto the display
//! surface is nearest-neighbor. That resample-then-upscale round trip is
//! what produces the blocky pixelated look; no separate "blocking" step
//! exists.

use bayer_dither::Rgb;
use tiny_skia::{
    BlendMode, ColorU8, FilterQuality, Paint, Pixmap, PixmapPaint, Rect, Transform,
};

use crate::error::ProcessError;

/// Scanline band coverage: black at 30% opacity.
const SCANLINE_ALPHA: u8 = 77;

/// Fit a source into a container, preserving aspect ratio.
///
/// `scale = min(container_w / source_w, container_h / source_h)`, floored
/// to integer pixels, never below 1x1.
pub fn fit_container(source: (u32, u32), container: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = (source.0.max(1) as f64, source.1.max(1) as f64);
    let (cw, ch) = (container.0 as f64, container.1 as f64);
    let scale = (cw / sw).min(ch / sh);
    (
        ((sw * scale) as u32).max(1),
        ((sh * scale) as u32).max(1),
    )
}

/// Build a pixmap from a straight-alpha RGBA8 buffer.
pub fn rgba_to_pixmap(rgba: &[u8], width: u32, height: u32) -> Result<Pixmap, ProcessError> {
    debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
    let mut pixmap = Pixmap::new(width, height).ok_or(ProcessError::PixmapAllocation)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

/// Read a pixmap back as straight-alpha RGBA8 bytes.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for p in pixmap.pixels() {
        let c = p.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// Render `src` into a fresh processing surface at `(width, height)`.
///
/// Bilinear filtering: this single resample performs the pixelation once
/// the result is blitted back up without smoothing.
pub fn downscale(src: &Pixmap, width: u32, height: u32) -> Result<Pixmap, ProcessError> {
    let mut target = Pixmap::new(width, height).ok_or(ProcessError::PixmapAllocation)?;
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::Source,
        quality: FilterQuality::Bilinear,
    };
    let transform = Transform::from_scale(
        width as f32 / src.width() as f32,
        height as f32 / src.height() as f32,
    );
    target.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    Ok(target)
}

/// Blit `src` onto `dst`, scaled to fill it, nearest-neighbor.
///
/// No smoothing: hard pixel edges are the point.
pub fn blit_nearest(src: &Pixmap, dst: &mut Pixmap) {
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::Source,
        quality: FilterQuality::Nearest,
    };
    let transform = Transform::from_scale(
        dst.width() as f32 / src.width() as f32,
        dst.height() as f32 / src.height() as f32,
    );
    dst.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
}

/// Darken every other display row with a 1-pixel scanline band.
///
/// Bands composite with the overlay blend mode so they darken the
/// underlying color without fully replacing it.
pub fn overlay_scanlines(dst: &mut Pixmap) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, SCANLINE_ALPHA);
    paint.blend_mode = BlendMode::Overlay;
    paint.anti_alias = false;

    let width = dst.width() as f32;
    for y in (1..dst.height()).step_by(2) {
        if let Some(rect) = Rect::from_xywh(0.0, y as f32, width, 1.0) {
            dst.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }
}

/// Fill a surface with a solid opaque color.
pub fn fill_solid(dst: &mut Pixmap, color: Rgb) {
    dst.fill(tiny_skia::Color::from_rgba8(
        color.r, color.g, color.b, 255,
    ));
}
