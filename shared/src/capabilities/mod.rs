mod media_library;
mod navigator;
mod uploader;

pub use self::media_library::{
    MediaLibrary, MediaLibraryError, MediaLibraryOperation, MediaLibraryOutput,
    MediaLibraryResult, MediaTypes, PermissionStatus, PickedAsset, PickerConfig, PickerResult,
    DEFAULT_SELECTION_LIMIT,
};
pub use self::navigator::{NavigationOperation, Navigator, Route};
pub use self::uploader::{
    UploadError, UploadMethod, UploadOperation, UploadRequest, UploadResponse, UploadResult,
    Uploader,
};

// Crux's built-in Render capability covers view updates.
pub use crux_core::render::Render;

use crate::event::Event;
use crate::App;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub media_library: MediaLibrary<Event>,
    pub uploader: Uploader<Event>,
    pub navigator: Navigator<Event>,
}
