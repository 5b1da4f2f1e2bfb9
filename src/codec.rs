use std::io::Cursor;

use image::DynamicImage;
use zune_jpeg::JpegDecoder;

use crate::{
    error::{Result, UploadError, INVALID_FILE_MESSAGE},
    policy::OutputFormat,
};

/// Decode an image from raw bytes. JPEGs go through zune-jpeg first because it
/// is considerably faster on large camera files; anything it cannot handle
/// falls back to the generic loader.
pub fn decode_image(bytes: &[u8], mime: &str) -> Result<DynamicImage> {
    if mime.eq_ignore_ascii_case("image/jpeg") {
        let mut decoder = JpegDecoder::new(Cursor::new(bytes));
        if let Ok(pixels) = decoder.decode() {
            // zune-jpeg usually returns RGB8
            if let Some(info) = decoder.info() {
                if let Some(rgb) =
                    image::RgbImage::from_raw(info.width as u32, info.height as u32, pixels)
                {
                    return Ok(DynamicImage::ImageRgb8(rgb));
                }
            }
        }
        // Fall through to the generic loader on any zune failure.
    }
    image::load_from_memory(bytes).map_err(|err| {
        tracing::debug!(%err, "image decode failed");
        UploadError::decode(INVALID_FILE_MESSAGE)
    })
}

/// Re-encode an image in the requested output format. `quality` only affects
/// the lossy JPEG path; PNG and WebP are written lossless.
pub fn encode_image(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let writer = Cursor::new(&mut bytes);
    let result = match format {
        OutputFormat::Jpg => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
            // JPEG has no alpha channel; flatten first to avoid encoder errors.
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(writer);
            image.write_with_encoder(encoder)
        }
        OutputFormat::Webp => {
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(writer);
            image.write_with_encoder(encoder)
        }
    };
    result.map_err(|err| UploadError::decode(format!("Unable to encode image: {err}")))?;
    Ok(bytes)
}

pub fn mime_for(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Jpg => "image/jpeg",
        OutputFormat::Png => "image/png",
        OutputFormat::Webp => "image/webp",
    }
}
