use std::collections::HashSet;

use crate::intake::StagedFile;

/// Opaque, revocable reference to a displayable preview of a staged file.
/// Distinct from the file bytes; the provider decides what backs it (an object
/// URL in a browser embedding, a texture id in a native one).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PreviewHandle(pub u64);

/// Resource-lifecycle pair for preview bitmaps. The session owns at most one
/// live handle at a time and routes every replacement through a single
/// release-then-install step, so a provider never sees a double revoke or a
/// use-after-revoke.
pub trait PreviewProvider {
    fn create_preview(&mut self, file: &StagedFile) -> PreviewHandle;
    fn revoke_preview(&mut self, handle: PreviewHandle);
}

/// Bookkeeping provider for tests and headless embeddings: tracks which
/// handles are live and how many were ever created.
#[derive(Default)]
pub struct InMemoryPreviews {
    next_id: u64,
    live: HashSet<PreviewHandle>,
    pub created: usize,
    pub revoked: usize,
}

impl InMemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.live.contains(&handle)
    }
}

impl PreviewProvider for InMemoryPreviews {
    fn create_preview(&mut self, _file: &StagedFile) -> PreviewHandle {
        self.next_id += 1;
        let handle = PreviewHandle(self.next_id);
        self.live.insert(handle);
        self.created += 1;
        handle
    }

    fn revoke_preview(&mut self, handle: PreviewHandle) {
        if self.live.remove(&handle) {
            self.revoked += 1;
        }
    }
}
