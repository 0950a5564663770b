use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SELECTION_LIMIT: u32 = 5;
pub const MAX_SELECTION_LIMIT: u32 = 50;
pub const FULL_QUALITY: f32 = 1.0;

/// Device photo library: permission prompt and the multi-image picker.
#[derive(Capability)]
pub struct MediaLibrary<Ev> {
    context: CapabilityContext<MediaLibraryOperation, Ev>,
}

impl<Ev> MediaLibrary<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<MediaLibraryOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn request_permission<F>(&self, callback: F)
    where
        F: FnOnce(MediaLibraryResult) -> Ev + Send + 'static,
    {
        self.request(MediaLibraryOperation::RequestPermission, callback);
    }

    pub fn pick_images<F>(&self, config: PickerConfig, callback: F)
    where
        F: FnOnce(MediaLibraryResult) -> Ev + Send + 'static,
    {
        let config = config.validated();
        self.request(MediaLibraryOperation::PickImages { config }, callback);
    }

    fn request<F>(&self, operation: MediaLibraryOperation, callback: F)
    where
        F: FnOnce(MediaLibraryResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MediaLibraryOperation {
    RequestPermission,
    PickImages { config: PickerConfig },
}

impl Operation for MediaLibraryOperation {
    type Output = MediaLibraryResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MediaTypes {
    #[default]
    Images,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickerConfig {
    pub media_types: MediaTypes,
    pub allows_editing: bool,
    pub allows_multiple_selection: bool,
    pub selection_limit: u32,
    /// Compression quality in `0.0..=1.0`, where `1.0` keeps the original.
    pub quality: f32,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            media_types: MediaTypes::Images,
            allows_editing: false,
            allows_multiple_selection: true,
            selection_limit: DEFAULT_SELECTION_LIMIT,
            quality: FULL_QUALITY,
        }
    }
}

impl PickerConfig {
    pub fn multiple(limit: u32) -> Self {
        Self {
            allows_multiple_selection: true,
            selection_limit: limit.clamp(1, MAX_SELECTION_LIMIT),
            ..Default::default()
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn validated(mut self) -> Self {
        self.quality = if self.quality.is_finite() {
            self.quality.clamp(0.0, FULL_QUALITY)
        } else {
            FULL_QUALITY
        };
        self.selection_limit = self.selection_limit.clamp(1, MAX_SELECTION_LIMIT);
        if !self.allows_multiple_selection {
            self.selection_limit = 1;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// One item of a picker result. `file_size` is not reported on every platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickedAsset {
    pub uri: String,
    pub file_size: Option<u64>,
}

impl PickedAsset {
    pub fn new(uri: impl Into<String>, file_size: Option<u64>) -> Self {
        Self {
            uri: uri.into(),
            file_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PickerResult {
    pub canceled: bool,
    pub assets: Vec<PickedAsset>,
}

impl PickerResult {
    pub fn picked(assets: Vec<PickedAsset>) -> Self {
        Self {
            canceled: false,
            assets,
        }
    }

    pub fn canceled() -> Self {
        Self {
            canceled: true,
            assets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MediaLibraryOutput {
    Permission(PermissionStatus),
    Picked(PickerResult),
}

impl MediaLibraryOutput {
    pub fn permission_status(&self) -> Option<PermissionStatus> {
        match self {
            MediaLibraryOutput::Permission(status) => Some(*status),
            _ => None,
        }
    }

    pub fn into_picked(self) -> Option<PickerResult> {
        match self {
            MediaLibraryOutput::Picked(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaLibraryError {
    #[error("media library permission denied")]
    PermissionDenied,

    #[error("media library not supported on this platform")]
    NotSupported,

    #[error("picker failed: {reason}")]
    PickerFailed { reason: String },

    #[error("unexpected media library output: {reason}")]
    UnexpectedOutput { reason: String },
}

pub type MediaLibraryResult = Result<MediaLibraryOutput, MediaLibraryError>;
