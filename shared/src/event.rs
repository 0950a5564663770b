use serde::{Deserialize, Serialize};

use crate::capabilities::{MediaLibraryResult, UploadResult};
use crate::config::AlbumConfig;
use crate::model::UploadToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Platform {
    Ios,
    Android,
    Web,
    #[default]
    Unknown,
}

impl Platform {
    /// The browser picker needs no library permission.
    #[must_use]
    pub const fn requires_media_permission(self) -> bool {
        !matches!(self, Self::Web)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle
    ScreenMounted {
        platform: Platform,
    },
    Configure(Box<AlbumConfig>),

    // User actions
    PickImagesRequested,
    RemoveImage {
        index: usize,
    },
    UploadRequested,
    GoHomeRequested,
    DismissAlert,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    PermissionResolved(Box<MediaLibraryResult>),
    #[serde(skip)]
    ImagesPicked(Box<MediaLibraryResult>),
    #[serde(skip)]
    UploadCompleted {
        token: UploadToken,
        result: Box<UploadResult>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ScreenMounted { .. } => "screen_mounted",
            Self::Configure(_) => "configure",
            Self::PickImagesRequested => "pick_images_requested",
            Self::RemoveImage { .. } => "remove_image",
            Self::UploadRequested => "upload_requested",
            Self::GoHomeRequested => "go_home_requested",
            Self::DismissAlert => "dismiss_alert",
            Self::PermissionResolved(_) => "permission_resolved",
            Self::ImagesPicked(_) => "images_picked",
            Self::UploadCompleted { .. } => "upload_completed",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::PickImagesRequested
                | Self::RemoveImage { .. }
                | Self::UploadRequested
                | Self::GoHomeRequested
                | Self::DismissAlert
        )
    }
}
