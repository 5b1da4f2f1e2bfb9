use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeOptions, Resizer};
use image::DynamicImage;

use crate::{
    codec::{encode_image, mime_for},
    error::{Result, UploadError},
    intake::{FileCandidate, StagedFile},
    policy::{ClassRules, OutputFormat},
};

/// Slack allowed over the input byte size before a re-encode counts as growth.
pub const REENCODE_TOLERANCE: usize = 4096;

const QUALITY_FLOOR: u8 = 5;
const QUALITY_STEP: u8 = 15;

/// Dimensions after bounding the longest edge to `max`, or `None` when the
/// image already fits. The aspect ratio is preserved exactly.
pub fn target_dimensions(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    if width <= max && height <= max {
        return None;
    }
    let (w, h) = (width as f64, height as f64);
    if width >= height {
        let new_h = ((h * max as f64 / w).round() as u32).max(1);
        Some((max, new_h))
    } else {
        let new_w = ((w * max as f64 / h).round() as u32).max(1);
        Some((new_w, max))
    }
}

fn resize(image: &DynamicImage, new_w: u32, new_h: u32) -> Result<DynamicImage> {
    let resize_err = |err: &dyn std::fmt::Display| UploadError::decode(format!("Unable to resize image: {err}"));

    // Keep RGB images in three channels so the resize does not inflate them.
    let (src, pixel_type) = match image {
        DynamicImage::ImageRgb8(rgb) => (
            Image::from_vec_u8(rgb.width(), rgb.height(), rgb.as_raw().clone(), PixelType::U8x3),
            PixelType::U8x3,
        ),
        _ => {
            let rgba = image.to_rgba8();
            (
                Image::from_vec_u8(rgba.width(), rgba.height(), rgba.into_raw(), PixelType::U8x4),
                PixelType::U8x4,
            )
        }
    };
    let src = src.map_err(|err| resize_err(&err))?;

    let mut dst = Image::new(new_w, new_h, pixel_type);
    let mut resizer = Resizer::new();
    resizer
        .resize(&src, &mut dst, &ResizeOptions::default())
        .map_err(|err| resize_err(&err))?;

    let resized = match pixel_type {
        PixelType::U8x3 => image::RgbImage::from_raw(new_w, new_h, dst.into_vec())
            .map(DynamicImage::ImageRgb8),
        _ => image::RgbaImage::from_raw(new_w, new_h, dst.into_vec())
            .map(DynamicImage::ImageRgba8),
    };
    resized.ok_or_else(|| resize_err(&"buffer size mismatch"))
}

/// File name for a staged re-encode: the stem keeps the user's name, the
/// extension follows the output format.
fn staged_name(name: &str, format: OutputFormat) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    format!("{stem}.{}", format.extension())
}

/// Encode (downsampling first when the longest edge exceeds the class limit)
/// into a freshly staged file. Used for crop output, which has no original
/// byte stream worth preserving.
pub fn encode_staged(name: &str, image: &DynamicImage, rules: &ClassRules) -> Result<StagedFile> {
    let (image, width, height) = match target_dimensions(image.width(), image.height(), rules.max_dimension) {
        Some((w, h)) => (resize(image, w, h)?, w, h),
        None => (image.clone(), image.width(), image.height()),
    };
    let bytes = encode_image(&image, rules.format, rules.quality)?;
    Ok(StagedFile {
        name: staged_name(name, rules.format),
        mime: mime_for(rules.format).to_string(),
        bytes,
        width,
        height,
    })
}

/// Compress a freshly selected candidate. The output byte size never exceeds
/// the input beyond [`REENCODE_TOLERANCE`]: without a resize, a re-encode
/// that fails to shrink the payload keeps the original bytes; with a resize,
/// the lossy encode quality steps down until the payload fits under the
/// input (tightly packed sources would otherwise balloon at the class
/// quality).
pub fn compress_candidate(
    candidate: &FileCandidate,
    image: &DynamicImage,
    rules: &ClassRules,
) -> Result<StagedFile> {
    let Some((width, height)) = target_dimensions(image.width(), image.height(), rules.max_dimension)
    else {
        let staged = encode_staged(&candidate.name, image, rules)?;
        if staged.bytes.len() >= candidate.bytes.len() {
            tracing::debug!(name = %candidate.name, "re-encode would grow file, keeping original");
            return Ok(StagedFile {
                name: candidate.name.clone(),
                mime: candidate.mime.clone(),
                bytes: candidate.bytes.clone(),
                width: image.width(),
                height: image.height(),
            });
        }
        return Ok(staged);
    };

    let resized = resize(image, width, height)?;
    let mut quality = rules.quality;
    let mut bytes = encode_image(&resized, rules.format, quality)?;
    while rules.format == OutputFormat::Jpg
        && bytes.len() > candidate.bytes.len() + REENCODE_TOLERANCE
        && quality > QUALITY_FLOOR
    {
        quality = quality.saturating_sub(QUALITY_STEP).max(QUALITY_FLOOR);
        bytes = encode_image(&resized, rules.format, quality)?;
    }
    tracing::debug!(
        name = %candidate.name,
        from = candidate.bytes.len(),
        to = bytes.len(),
        width,
        height,
        quality,
        "compressed candidate"
    );
    Ok(StagedFile {
        name: staged_name(&candidate.name, rules.format),
        mime: mime_for(rules.format).to_string(),
        bytes,
        width,
        height,
    })
}
