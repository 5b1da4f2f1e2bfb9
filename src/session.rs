use crate::{
    codec::decode_image,
    compress::{compress_candidate, encode_staged},
    crop::{CropEngine, Viewport},
    error::{Result, UploadError},
    intake::{probe, validate, FileCandidate, SelectionSource, StagedFile},
    policy::{AssetClass, UploadPolicy},
    preview::{PreviewHandle, PreviewProvider},
    transport::{Transport, UploadedAsset},
};

/// Session lifecycle. `Success` and `Error` are terminal: the only way out is
/// an explicit acknowledge/dismiss back to `Idle`.
#[derive(Clone, PartialEq, Debug)]
pub enum SessionState {
    Idle,
    Previewing,
    Cropping,
    Uploading { progress: u8 },
    Success,
    Error { message: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Previewing => "previewing",
            SessionState::Cropping => "cropping",
            SessionState::Uploading { .. } => "uploading",
            SessionState::Success => "success",
            SessionState::Error { .. } => "error",
        }
    }
}

/// Everything that can advance the session lifecycle.
#[derive(Clone, PartialEq, Debug)]
pub enum SessionEvent {
    /// A file passed validation and compression. `crop` mirrors the class
    /// rules and decides whether the crop step is entered directly.
    FileAccepted { crop: bool },
    /// Validation, decode, or crop processing failed.
    Rejected { message: String },
    CropRequested,
    CropApplied,
    Cancelled,
    UploadStarted,
    Progress(u8),
    UploadSucceeded,
    UploadFailed { message: String },
    SuccessAcknowledged,
    ErrorDismissed,
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::FileAccepted { .. } => "file_accepted",
            SessionEvent::Rejected { .. } => "rejected",
            SessionEvent::CropRequested => "crop_requested",
            SessionEvent::CropApplied => "crop_applied",
            SessionEvent::Cancelled => "cancelled",
            SessionEvent::UploadStarted => "upload_started",
            SessionEvent::Progress(_) => "progress",
            SessionEvent::UploadSucceeded => "upload_succeeded",
            SessionEvent::UploadFailed { .. } => "upload_failed",
            SessionEvent::SuccessAcknowledged => "success_acknowledged",
            SessionEvent::ErrorDismissed => "error_dismissed",
        }
    }
}

/// Pure transition table. `None` means the event does not apply in the given
/// state and must leave it untouched; in particular, stray progress or failure
/// reports arriving after a terminal state are ignored.
pub fn next_state(state: &SessionState, event: &SessionEvent) -> Option<SessionState> {
    use SessionEvent as E;
    use SessionState as S;
    match (state, event) {
        (S::Idle, E::FileAccepted { crop: true }) => Some(S::Cropping),
        (S::Idle, E::FileAccepted { crop: false }) => Some(S::Previewing),
        (S::Idle | S::Previewing | S::Cropping, E::Rejected { message }) => Some(S::Error {
            message: message.clone(),
        }),
        (S::Previewing, E::CropRequested) => Some(S::Cropping),
        (S::Cropping, E::CropApplied) => Some(S::Previewing),
        (S::Previewing | S::Cropping, E::Cancelled) => Some(S::Idle),
        (S::Previewing, E::UploadStarted) => Some(S::Uploading { progress: 0 }),
        (S::Uploading { .. }, E::Progress(pct)) => Some(S::Uploading {
            progress: (*pct).min(100),
        }),
        (S::Uploading { .. }, E::UploadSucceeded) => Some(S::Success),
        (S::Uploading { .. }, E::UploadFailed { message }) => Some(S::Error {
            message: message.clone(),
        }),
        (S::Success, E::SuccessAcknowledged) => Some(S::Idle),
        (S::Error { .. }, E::ErrorDismissed) => Some(S::Idle),
        _ => None,
    }
}

/// Caller-supplied callbacks, fired at fixed transition points: `on_error` for
/// any validation or transport failure, `on_upload` on transport success,
/// `on_remove` when an already-persisted asset is removed, `on_progress` as
/// the transport reports.
#[derive(Default)]
pub struct Hooks {
    pub on_upload: Option<Box<dyn FnMut(&UploadedAsset)>>,
    pub on_remove: Option<Box<dyn FnMut()>>,
    pub on_error: Option<Box<dyn FnMut(&str)>>,
    pub on_progress: Option<Box<dyn FnMut(u8)>>,
}

impl Hooks {
    pub fn on_upload(mut self, f: impl FnMut(&UploadedAsset) + 'static) -> Self {
        self.on_upload = Some(Box::new(f));
        self
    }

    pub fn on_remove(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_remove = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_progress(mut self, f: impl FnMut(u8) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }
}

/// One upload attempt: intake, compression, optional crop, upload. The session
/// exclusively owns the staged file and at most one live preview handle; every
/// preview replacement goes through a single release-then-install step.
pub struct UploadSession {
    policy: UploadPolicy,
    class: AssetClass,
    previews: Box<dyn PreviewProvider>,
    hooks: Hooks,
    state: SessionState,
    staged: Option<StagedFile>,
    preview: Option<PreviewHandle>,
    engine: Option<CropEngine>,
}

impl UploadSession {
    pub fn new(policy: UploadPolicy, class: AssetClass, previews: Box<dyn PreviewProvider>) -> Self {
        Self {
            policy,
            class,
            previews,
            hooks: Hooks::default(),
            state: SessionState::Idle,
            staged: None,
            preview: None,
            engine: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn staged_file(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn preview_handle(&self) -> Option<PreviewHandle> {
        self.preview
    }

    /// Feed one event through the reducer. Returns whether the event applied;
    /// inapplicable events leave the state untouched.
    pub fn dispatch(&mut self, event: SessionEvent) -> bool {
        match next_state(&self.state, &event) {
            Some(next) => {
                tracing::debug!(from = self.state.name(), to = next.name(), event = event.name(), "session transition");
                self.state = next;
                true
            }
            None => {
                tracing::warn!(state = self.state.name(), event = event.name(), "event ignored");
                false
            }
        }
    }

    /// Validate, probe, and compress a selected file, then enter `Previewing`
    /// (or `Cropping` when the class crops). Only permitted while `Idle`; in
    /// particular the UI contract disables selection while an upload is
    /// outstanding. On failure the session enters `Error` and no file is
    /// staged.
    pub fn select_file(&mut self, candidate: FileCandidate, source: SelectionSource) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(self.state_error("select_file"));
        }
        let rules = self.policy.rules_for(self.class).clone();
        let staged = validate(&candidate, &rules, source).and_then(|_| {
            if candidate.mime.starts_with("image/") {
                probe(&candidate).and_then(|image| compress_candidate(&candidate, &image, &rules))
            } else {
                // Allowed non-image types (documents) upload as-is; there is
                // nothing to decode, compress, or crop.
                Ok(StagedFile::raw(&candidate))
            }
        });
        let staged = match staged {
            Ok(staged) => staged,
            Err(err) => return Err(self.reject(err)),
        };
        let crop = rules.crop && staged.is_image();
        self.staged = Some(staged);
        self.replace_preview();
        self.dispatch(SessionEvent::FileAccepted { crop });
        Ok(())
    }

    /// Enter the crop step (from `Previewing`), or install the crop engine for
    /// a session that entered `Cropping` directly on selection. The viewport
    /// is supplied by the embedding UI.
    pub fn begin_crop(&mut self, viewport: Viewport) -> Result<()> {
        match (&self.state, &self.staged) {
            (SessionState::Previewing, Some(file)) if file.is_image() => {
                let aspect = self.policy.rules_for(self.class).crop_aspect;
                self.engine = Some(CropEngine::new(file.width, file.height, viewport, aspect));
                self.dispatch(SessionEvent::CropRequested);
                Ok(())
            }
            (SessionState::Cropping, Some(file)) if self.engine.is_none() => {
                let aspect = self.policy.rules_for(self.class).crop_aspect;
                self.engine = Some(CropEngine::new(file.width, file.height, viewport, aspect));
                Ok(())
            }
            _ => Err(self.state_error("begin_crop")),
        }
    }

    /// The interactive crop engine, available while `Cropping` with a
    /// configured viewport.
    pub fn engine_mut(&mut self) -> Option<&mut CropEngine> {
        match self.state {
            SessionState::Cropping => self.engine.as_mut(),
            _ => None,
        }
    }

    /// Materialize the crop: the derived rectangle is cut from the staged
    /// image, re-encoded, and becomes the new staged file with a fresh
    /// preview.
    pub fn apply_crop(&mut self) -> Result<()> {
        let (Some(engine), Some(file)) = (&self.engine, &self.staged) else {
            return Err(self.state_error("apply_crop"));
        };
        if self.state != SessionState::Cropping {
            return Err(self.state_error("apply_crop"));
        }
        let area = engine.compute_crop_area();
        let rules = self.policy.rules_for(self.class).clone();
        let cropped = decode_image(&file.bytes, &file.mime)
            .map(|image| area.apply(&image))
            .and_then(|image| encode_staged(&file.name, &image, &rules));
        match cropped {
            Ok(staged) => {
                tracing::info!(x = area.x, y = area.y, width = area.width, height = area.height, "crop applied");
                self.staged = Some(staged);
                self.replace_preview();
                self.engine = None;
                self.dispatch(SessionEvent::CropApplied);
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Immediate, synchronous cancel from `Previewing` or `Cropping`: releases
    /// the preview and discards the staged file.
    pub fn cancel(&mut self) -> Result<()> {
        if !self.dispatch(SessionEvent::Cancelled) {
            return Err(self.state_error("cancel"));
        }
        self.release_resources();
        Ok(())
    }

    /// Drive the confirmed upload through the transport. Blocks until the
    /// transport's one terminal result; progress reports are fed through the
    /// reducer as they arrive. On failure the staged file is discarded, so a
    /// retry starts from a fresh selection.
    pub fn upload(&mut self, transport: &mut dyn Transport) -> Result<UploadedAsset> {
        if self.state != SessionState::Previewing {
            return Err(self.state_error("upload"));
        }
        let Some(file) = self.staged.clone() else {
            return Err(self.state_error("upload"));
        };
        self.dispatch(SessionEvent::UploadStarted);
        tracing::info!(name = %file.name, bytes = file.bytes.len(), "upload started");

        let result = {
            let mut on_progress = |pct: u8| {
                if self.dispatch(SessionEvent::Progress(pct)) {
                    if let Some(f) = self.hooks.on_progress.as_mut() {
                        f(pct.min(100));
                    }
                }
            };
            transport.upload(&file, &mut on_progress)
        };

        match result {
            Ok(asset) => {
                self.dispatch(SessionEvent::UploadSucceeded);
                tracing::info!(url = %asset.url, "upload succeeded");
                if let Some(f) = self.hooks.on_upload.as_mut() {
                    f(&asset);
                }
                Ok(asset)
            }
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!(%message, "upload failed");
                self.dispatch(SessionEvent::UploadFailed {
                    message: message.clone(),
                });
                self.release_resources();
                if let Some(f) = self.hooks.on_error.as_mut() {
                    f(&message);
                }
                Err(UploadError::Transport(message))
            }
        }
    }

    /// Return to `Idle` after the UI's fixed success-display delay, releasing
    /// the preview.
    pub fn acknowledge_success(&mut self) -> Result<()> {
        if !self.dispatch(SessionEvent::SuccessAcknowledged) {
            return Err(self.state_error("acknowledge_success"));
        }
        self.release_resources();
        Ok(())
    }

    /// Dismiss an error back to `Idle`. A full reset: the next attempt starts
    /// from a fresh selection.
    pub fn dismiss_error(&mut self) -> Result<()> {
        if !self.dispatch(SessionEvent::ErrorDismissed) {
            return Err(self.state_error("dismiss_error"));
        }
        self.release_resources();
        Ok(())
    }

    /// Notify the caller that an already-persisted asset was removed. Not part
    /// of the attempt lifecycle, so only meaningful while `Idle`.
    pub fn remove_existing(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(self.state_error("remove_existing"));
        }
        if let Some(f) = self.hooks.on_remove.as_mut() {
            f();
        }
        Ok(())
    }

    fn reject(&mut self, err: UploadError) -> UploadError {
        let message = err.user_message();
        self.release_resources();
        self.dispatch(SessionEvent::Rejected {
            message: message.clone(),
        });
        if let Some(f) = self.hooks.on_error.as_mut() {
            f(&message);
        }
        err
    }

    /// The single release-then-install step all preview replacement goes
    /// through: at most one handle is ever live.
    fn replace_preview(&mut self) {
        if let Some(old) = self.preview.take() {
            self.previews.revoke_preview(old);
        }
        if let Some(file) = &self.staged {
            self.preview = Some(self.previews.create_preview(file));
        }
    }

    fn release_resources(&mut self) {
        if let Some(old) = self.preview.take() {
            self.previews.revoke_preview(old);
        }
        self.staged = None;
        self.engine = None;
    }

    fn state_error(&self, event: &str) -> UploadError {
        UploadError::State {
            from: self.state.name().to_string(),
            event: event.to_string(),
        }
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        self.release_resources();
    }
}
