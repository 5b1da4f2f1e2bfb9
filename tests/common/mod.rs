#![allow(dead_code)]

use std::{cell::RefCell, io::Cursor, rc::Rc};

use image::{DynamicImage, Rgba, RgbaImage};
use once_cell::sync::Lazy;

use uploadcropper::{
    intake::FileCandidate,
    preview::{InMemoryPreviews, PreviewHandle, PreviewProvider},
    transport::{Transport, UploadedAsset},
    StagedFile, UploadPolicy,
};

pub static POLICY: Lazy<UploadPolicy> = Lazy::new(UploadPolicy::default);

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    let pixel = Rgba(color);
    let buffer = RgbaImage::from_pixel(width, height, pixel);
    DynamicImage::ImageRgba8(buffer)
}

/// High-frequency test image: per-pixel pseudo-noise, so lossy encode sizes
/// actually track quality and dimensions instead of collapsing to nothing.
pub fn detail_image(width: u32, height: u32) -> DynamicImage {
    let buffer = RgbaImage::from_fn(width, height, |x, y| {
        let v = x
            .wrapping_mul(31)
            .wrapping_add(y.wrapping_mul(57))
            .wrapping_add(x.wrapping_mul(y)) as u8;
        Rgba([v, v.wrapping_mul(3), v.wrapping_add(97), 255])
    });
    DynamicImage::ImageRgba8(buffer)
}

pub fn jpeg_bytes(image: &DynamicImage, quality: u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_with_encoder(encoder)
        .expect("failed to encode jpeg fixture");
    bytes
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(Cursor::new(&mut bytes));
    image
        .write_with_encoder(encoder)
        .expect("failed to encode png fixture");
    bytes
}

pub fn jpeg_candidate(name: &str, width: u32, height: u32) -> FileCandidate {
    let image = solid_image(width, height, [40, 90, 160, 255]);
    FileCandidate {
        name: name.to_string(),
        mime: "image/jpeg".to_string(),
        bytes: jpeg_bytes(&image, 80),
    }
}

pub fn png_candidate(name: &str, width: u32, height: u32) -> FileCandidate {
    let image = solid_image(width, height, [200, 30, 30, 255]);
    FileCandidate {
        name: name.to_string(),
        mime: "image/png".to_string(),
        bytes: png_bytes(&image),
    }
}

/// Preview provider that stays inspectable after the session takes ownership.
#[derive(Clone, Default)]
pub struct SharedPreviews(pub Rc<RefCell<InMemoryPreviews>>);

impl SharedPreviews {
    pub fn live_count(&self) -> usize {
        self.0.borrow().live_count()
    }

    pub fn created(&self) -> usize {
        self.0.borrow().created
    }

    pub fn revoked(&self) -> usize {
        self.0.borrow().revoked
    }
}

impl PreviewProvider for SharedPreviews {
    fn create_preview(&mut self, file: &StagedFile) -> PreviewHandle {
        self.0.borrow_mut().create_preview(file)
    }

    fn revoke_preview(&mut self, handle: PreviewHandle) {
        self.0.borrow_mut().revoke_preview(handle)
    }
}

/// Transport fake that replays a fixed progress sequence and then either
/// succeeds with the given URL or fails with the given message.
pub struct FakeTransport {
    pub progress: Vec<u8>,
    pub result: Result<String, String>,
    pub calls: usize,
}

impl FakeTransport {
    pub fn succeeding(progress: &[u8], url: &str) -> Self {
        Self {
            progress: progress.to_vec(),
            result: Ok(url.to_string()),
            calls: 0,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            progress: Vec::new(),
            result: Err(message.to_string()),
            calls: 0,
        }
    }
}

impl Transport for FakeTransport {
    fn upload(
        &mut self,
        _file: &StagedFile,
        on_progress: &mut dyn FnMut(u8),
    ) -> anyhow::Result<UploadedAsset> {
        self.calls += 1;
        for pct in &self.progress {
            on_progress(*pct);
        }
        match &self.result {
            Ok(url) => Ok(UploadedAsset { url: url.clone() }),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
