use image::DynamicImage;

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.1;
/// Fraction of the viewport's shorter dimension covered by the crop window.
pub const CROP_WINDOW_FRACTION: f32 = 0.8;

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2 { x, y }
}

/// The fixed on-screen area the crop engine renders into.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    fn center(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }
}

/// Crop rectangle in the source image's native pixel space.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CropArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropArea {
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        image.crop_imm(self.x, self.y, self.width, self.height)
    }
}

/// Interactive viewport over the preview image. The image is rendered
/// centered, translated by `position` and scaled by `scale`; a fixed crop
/// window sits at the viewport center and never moves. Cropping is therefore a
/// pure function of three scalars, with no hit-testing against a movable
/// window.
pub struct CropEngine {
    image_width: u32,
    image_height: u32,
    viewport: Viewport,
    aspect: Option<f32>,
    scale: f32,
    position: Vec2,
}

impl CropEngine {
    pub fn new(image_width: u32, image_height: u32, viewport: Viewport, aspect: Option<f32>) -> Self {
        Self {
            image_width: image_width.max(1),
            image_height: image_height.max(1),
            viewport,
            aspect,
            scale: 1.0,
            position: Vec2::default(),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Translate the image under the crop window, 1:1 with pointer movement.
    /// The offset is deliberately unclamped; crop derivation corrects for it.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + ZOOM_STEP).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - ZOOM_STEP).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.position = Vec2::default();
    }

    /// Screen-space size of the fixed crop window: 80% of the viewport's
    /// shorter dimension, adjusted by the configured aspect ratio.
    pub fn crop_window(&self) -> Vec2 {
        let base = CROP_WINDOW_FRACTION * self.viewport.width.min(self.viewport.height);
        match self.aspect {
            Some(aspect) if aspect >= 1.0 => vec2(base, base / aspect),
            Some(aspect) => vec2(base * aspect, base),
            None => vec2(base, base),
        }
    }

    /// Derive the crop rectangle in source pixels from the current transform.
    ///
    /// The image's screen origin is the viewport center plus the pan offset
    /// minus half the displayed (post-scale) size; the window origin is the
    /// viewport center minus half the window. Their difference, divided by the
    /// scale, is the source-space origin, clamped to the image on the near
    /// side. The size is the window divided by the scale, clamped to the
    /// remaining extent; when that clamp would break a configured aspect
    /// ratio, the larger dimension is shrunk to restore it.
    pub fn compute_crop_area(&self) -> CropArea {
        let center = self.viewport.center();
        let displayed = vec2(
            self.image_width as f32 * self.scale,
            self.image_height as f32 * self.scale,
        );
        let image_origin = vec2(
            center.x + self.position.x - displayed.x * 0.5,
            center.y + self.position.y - displayed.y * 0.5,
        );
        let window = self.crop_window();
        let window_origin = vec2(center.x - window.x * 0.5, center.y - window.y * 0.5);

        let src_x = ((window_origin.x - image_origin.x) / self.scale).max(0.0);
        let src_y = ((window_origin.y - image_origin.y) / self.scale).max(0.0);
        let mut src_w = (window.x / self.scale).min(self.image_width as f32 - src_x);
        let mut src_h = (window.y / self.scale).min(self.image_height as f32 - src_y);

        if let Some(aspect) = self.aspect {
            if src_w / src_h > aspect {
                src_w = src_h * aspect;
            } else {
                src_h = src_w / aspect;
            }
        }

        let x = (src_x.round() as u32).min(self.image_width.saturating_sub(1));
        let y = (src_y.round() as u32).min(self.image_height.saturating_sub(1));
        let width = (src_w.round() as u32).clamp(1, self.image_width - x);
        let height = (src_h.round() as u32).clamp(1, self.image_height - y);
        CropArea { x, y, width, height }
    }
}
