use serde::Deserialize;

use crate::error::Result;

/// Named category of uploadable asset. The class decides which validation
/// rules apply and whether the crop step is offered.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Avatar,
    Logo,
    Document,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }
}

/// Validation and re-encoding rules for one asset class.
#[derive(Clone, Debug, Deserialize)]
pub struct ClassRules {
    /// MIME types accepted for this class.
    pub allowed_mime: Vec<String>,
    /// Byte-size ceiling for the raw selected file.
    pub max_bytes: u64,
    /// Longest-edge ceiling in pixels; larger images are downsampled.
    pub max_dimension: u32,
    /// Lossy encode quality (1-100).
    pub quality: u8,
    pub format: OutputFormat,
    /// Whether the interactive crop step is offered after selection.
    pub crop: bool,
    /// Width / height constraint for the crop window, when configured.
    pub crop_aspect: Option<f32>,
}

impl ClassRules {
    pub fn allows_mime(&self, mime: &str) -> bool {
        self.allowed_mime.iter().any(|m| m.eq_ignore_ascii_case(mime))
    }
}

const IMAGE_MIME: &[&str] = &["image/jpeg", "image/png", "image/webp"];

const MB: u64 = 1024 * 1024;

/// Per-class upload rules, supplied by the embedding application. Classes not
/// present in a deserialized policy fall back to the defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub avatar: ClassRules,
    pub logo: ClassRules,
    pub document: ClassRules,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        let image_mime = IMAGE_MIME.iter().map(|m| m.to_string()).collect::<Vec<_>>();
        Self {
            avatar: ClassRules {
                allowed_mime: image_mime.clone(),
                max_bytes: 5 * MB,
                max_dimension: 1200,
                quality: 80,
                format: OutputFormat::Jpg,
                crop: true,
                crop_aspect: Some(1.0),
            },
            logo: ClassRules {
                allowed_mime: image_mime,
                max_bytes: 5 * MB,
                max_dimension: 1200,
                quality: 85,
                format: OutputFormat::Png,
                crop: true,
                crop_aspect: None,
            },
            document: ClassRules {
                allowed_mime: IMAGE_MIME
                    .iter()
                    .map(|m| m.to_string())
                    .chain(std::iter::once("application/pdf".to_string()))
                    .collect(),
                max_bytes: 25 * MB,
                max_dimension: 2400,
                quality: 85,
                format: OutputFormat::Jpg,
                crop: false,
                crop_aspect: None,
            },
        }
    }
}

impl UploadPolicy {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn rules_for(&self, class: AssetClass) -> &ClassRules {
        match class {
            AssetClass::Avatar => &self.avatar,
            AssetClass::Logo => &self.logo,
            AssetClass::Document => &self.document,
        }
    }
}
