//! Client-side image upload pipeline: selection intake, compression,
//! interactive crop, and upload orchestration, driven by an explicit state
//! machine with no UI binding. The rendering layer subscribes to
//! [`session::SessionState`] and supplies the external collaborators
//! ([`transport::Transport`], [`preview::PreviewProvider`]).

pub mod codec;
pub mod compress;
pub mod crop;
pub mod error;
pub mod intake;
pub mod policy;
pub mod preview;
pub mod session;
pub mod transport;

pub use crop::{CropArea, CropEngine, Viewport};
pub use error::{Result, UploadError};
pub use intake::{FileCandidate, SelectionSource, StagedFile};
pub use policy::{AssetClass, UploadPolicy};
pub use session::{Hooks, SessionEvent, SessionState, UploadSession};
pub use transport::{Transport, UploadedAsset};
