use store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Failures caught at the controller boundary.
///
/// The `Display` text is what ends up in the observable state's
/// `error_message`, so it is written for the user.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Storage is not ready yet")]
    StoreUnavailable,

    #[error("Failed to load: {0}")]
    ReadFailure(#[source] StoreError),

    #[error("Failed to save: {0}")]
    WriteFailure(#[source] StoreError),

    #[error("Story {0} is not loaded")]
    UnknownStory(Uuid),

    #[error("Post {0} is not loaded")]
    UnknownPost(Uuid),

    /// A newer regeneration started before this one's reload landed.
    #[error("Stories were regenerated again before they finished loading")]
    ReloadSuperseded,
}
