use anyhow::Result;

use crate::intake::StagedFile;

/// Terminal output of a successful upload. Ownership passes to the caller via
/// the `on_upload` hook; the session does not retain it past the
/// success-display window.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UploadedAsset {
    pub url: String,
}

/// The external storage collaborator: given a file, return a URL or an error.
///
/// The session calls this exactly once per confirmed upload and awaits one
/// terminal result; it never retries, batches, or inspects transport
/// internals. `on_progress` receives integer percentages 0..=100 as the
/// transport sees fit to report them. The call is not abortable.
pub trait Transport {
    fn upload(
        &mut self,
        file: &StagedFile,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<UploadedAsset>;
}
