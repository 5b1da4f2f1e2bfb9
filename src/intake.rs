use image::DynamicImage;

use crate::{
    codec::decode_image,
    error::{Result, UploadError, DROP_IMAGE_MESSAGE},
    policy::ClassRules,
};

/// How the file arrived. Drops onto image-only surfaces get an extra gate
/// before the regular rules run.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SelectionSource {
    Browse,
    Drop,
}

/// A raw file as handed over by the embedding UI, before any rule has run.
#[derive(Clone, Debug)]
pub struct FileCandidate {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A validated, decoded and re-encoded file owned by the session. Staged files
/// are replaced wholesale at each pipeline stage, never mutated in place.
#[derive(Clone, Debug)]
pub struct StagedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl StagedFile {
    /// Stage a non-image candidate untouched. Documents skip the decode,
    /// compress, and crop stages entirely, so no dimensions are known.
    pub fn raw(candidate: &FileCandidate) -> Self {
        Self {
            name: candidate.name.clone(),
            mime: candidate.mime.clone(),
            bytes: candidate.bytes.clone(),
            width: 0,
            height: 0,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn longest_edge(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Run the synchronous validation rules in order: drop gate, MIME allow-list,
/// byte-size ceiling. A candidate is wholly accepted or wholly rejected;
/// nothing reaches compression after a failure here.
pub fn validate(candidate: &FileCandidate, rules: &ClassRules, source: SelectionSource) -> Result<()> {
    let image_only = rules.allowed_mime.iter().all(|m| m.starts_with("image/"));
    if source == SelectionSource::Drop && image_only && !candidate.mime.starts_with("image/") {
        return Err(UploadError::DragRejected(DROP_IMAGE_MESSAGE.to_string()));
    }
    if !rules.allows_mime(&candidate.mime) {
        return Err(UploadError::validation(format!(
            "File type {} is not supported",
            candidate.mime
        )));
    }
    if candidate.bytes.len() as u64 > rules.max_bytes {
        return Err(UploadError::validation(format!(
            "File is too large (max {} MB)",
            rules.max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Probe the actual pixel dimensions by decoding the candidate. This is the
/// deeper check behind the declared MIME type and must complete before
/// compression starts.
pub fn probe(candidate: &FileCandidate) -> Result<DynamicImage> {
    let image = decode_image(&candidate.bytes, &candidate.mime)?;
    tracing::debug!(
        name = %candidate.name,
        width = image.width(),
        height = image.height(),
        "probed candidate dimensions"
    );
    Ok(image)
}
