//! Shared core for the album upload screen.
//!
//! The screen lets the user pick several images from the device library,
//! drop some of them from the preview grid and upload the rest as one
//! multipart request. All platform work (permission prompt, picker, upload
//! transport, navigation) is requested from the shell through capabilities;
//! this crate only holds the state machine and the view projection.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod multipart;
pub mod upload;
pub mod validation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{AlbumConfig, ConfigError};
pub use event::{Event, Platform};
pub use model::{Alert, ImageRef, Model, PermissionState, SelectionState, UploadGuard, UploadToken};

use capabilities::{MediaLibraryError, UploadError};
use validation::BatchTooLarge;

pub const UPLOADING_MESSAGE: &str = "Uploading Images...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    PermissionDenied,
    BatchTooLarge,
    EmptySelection,
    Picker,
    Transport,
    Busy,
    Configuration,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PermissionDenied => "MEDIA_PERMISSION_DENIED",
            Self::BatchTooLarge => "BATCH_TOO_LARGE",
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::Picker => "PICKER_ERROR",
            Self::Transport => "UPLOAD_ERROR",
            Self::Busy => "UPLOAD_IN_FLIGHT",
            Self::Configuration => "CONFIG_ERROR",
        }
    }

    /// Only these kinds reach the user as an alert; the rest are logged.
    #[must_use]
    pub const fn is_user_facing(self) -> bool {
        matches!(self, Self::BatchTooLarge | Self::EmptySelection)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlbumError {
    #[error("Permission to access media library was denied")]
    PermissionDenied,

    #[error(transparent)]
    BatchTooLarge(#[from] BatchTooLarge),

    #[error("Please select images to upload")]
    EmptySelection,

    #[error("Error picking images: {0}")]
    Picker(#[from] MediaLibraryError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("upload already in progress")]
    UploadInFlight,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AlbumError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::BatchTooLarge(_) => ErrorKind::BatchTooLarge,
            Self::EmptySelection => ErrorKind::EmptySelection,
            Self::Picker(_) => ErrorKind::Picker,
            Self::Upload(_) => ErrorKind::Transport,
            Self::UploadInFlight => ErrorKind::Busy,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind().code()
    }

    #[must_use]
    pub const fn alert(&self) -> Option<Alert> {
        match self {
            Self::BatchTooLarge(_) => Some(Alert::BatchTooLarge),
            Self::EmptySelection => Some(Alert::EmptySelection),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Thumbnail {
    /// Position to send back in `Event::RemoveImage`.
    pub index: usize,
    pub uri: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ScreenView {
    Gallery {
        thumbnails: Vec<Thumbnail>,
        confirmation: Option<String>,
    },
    Uploading {
        message: String,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub screen: ScreenView,
    pub alert: Option<String>,
    pub can_pick: bool,
    pub can_upload: bool,
    pub can_go_home: bool,
    pub selected_count: usize,
    pub permission: PermissionState,
}

pub mod app {
    use tracing::{debug, error, info, warn};

    use super::*;
    use crate::capabilities::{MediaLibraryResult, PickerResult, Route, UploadResult};
    use crate::upload::{self, UploadOutcome};
    use crate::validation;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn report(model: &mut Model, error: AlbumError) {
            let kind = error.kind();
            if kind.is_user_facing() {
                warn!(code = kind.code(), "{error}");
                if let Some(alert) = error.alert() {
                    model.show_alert(alert);
                }
            } else if kind == ErrorKind::Busy {
                warn!(code = kind.code(), "{error}");
            } else {
                error!(code = kind.code(), "{error}");
            }
        }

        fn handle_permission(result: MediaLibraryResult, model: &mut Model) {
            let status = match result {
                Ok(output) => output.permission_status(),
                Err(e) => {
                    debug!(error = %e, "Permission request failed");
                    None
                }
            };

            match status {
                Some(status) if status.is_granted() => {
                    model.permission = PermissionState::Granted;
                    info!("Media library permission granted");
                }
                _ => {
                    model.permission = PermissionState::Denied;
                    Self::report(model, AlbumError::PermissionDenied);
                }
            }
        }

        fn handle_picked(result: MediaLibraryResult, model: &mut Model) {
            let picked = result.and_then(|output| {
                output
                    .into_picked()
                    .ok_or_else(|| MediaLibraryError::UnexpectedOutput {
                        reason: "expected a picker result".into(),
                    })
            });

            match picked {
                Ok(picked) => Self::append_batch(picked, model),
                Err(e) => Self::report(model, AlbumError::Picker(e)),
            }
        }

        // The size gate runs before the cancel flag is looked at.
        fn append_batch(picked: PickerResult, model: &mut Model) {
            let batch_bytes =
                match validation::validate_batch(&picked.assets, model.config.max_batch_bytes) {
                    Ok(bytes) => bytes,
                    Err(too_large) => {
                        Self::report(model, too_large.into());
                        return;
                    }
                };

            if picked.canceled {
                debug!("Picker cancelled");
                return;
            }

            let added = picked.assets.len();
            model
                .selection
                .add(picked.assets.into_iter().map(|asset| asset.uri));
            info!(
                added,
                batch_bytes,
                selected = model.selection.len(),
                "Images added to selection"
            );
        }

        fn start_upload(model: &mut Model, caps: &Capabilities) {
            if model.upload_guard.is_busy() {
                Self::report(model, AlbumError::UploadInFlight);
                return;
            }

            if model.selection.is_empty() {
                Self::report(model, AlbumError::EmptySelection);
                return;
            }

            let Some(token) = model.upload_guard.try_acquire() else {
                Self::report(model, AlbumError::UploadInFlight);
                return;
            };

            let request = upload::build_request(&model.config.upload_endpoint, &model.selection);
            info!(
                request_id = request.request_id(),
                token = token.value(),
                images = request.form().len(),
                "Starting upload"
            );

            caps.uploader.send(request, move |result| Event::UploadCompleted {
                token,
                result: Box::new(result),
            });
        }

        fn finish_upload(token: UploadToken, result: UploadResult, model: &mut Model) -> bool {
            if !model.upload_guard.release(token) {
                warn!(token = token.value(), "Ignoring stale upload response");
                return false;
            }

            match upload::interpret_response(result) {
                UploadOutcome::Confirmed { message } => {
                    info!(
                        uploaded = model.selection.len(),
                        has_message = message.is_some(),
                        "Upload succeeded"
                    );
                    model.confirmation = message;
                    model.selection.clear();
                }
                UploadOutcome::Failed(e) => Self::report(model, AlbumError::Upload(e)),
            }
            true
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            if event.is_user_initiated() {
                debug!(event = event.name(), "User action");
            }

            match event {
                Event::ScreenMounted { platform } => {
                    if model.permission.was_requested() {
                        debug!("Media library permission already requested");
                        return;
                    }

                    if platform.requires_media_permission() {
                        model.permission = PermissionState::Requesting;
                        caps.media_library.request_permission(|result| {
                            Event::PermissionResolved(Box::new(result))
                        });
                    } else {
                        model.permission = PermissionState::NotApplicable;
                        debug!(?platform, "Media library permission not applicable");
                    }
                    caps.render.render();
                }

                Event::Configure(config) => match (*config).validated() {
                    Ok(config) => {
                        info!(endpoint = %config.upload_endpoint, "Album configured");
                        model.config = config;
                    }
                    Err(e) => Self::report(model, e.into()),
                },

                Event::PermissionResolved(result) => {
                    Self::handle_permission(*result, model);
                    caps.render.render();
                }

                Event::PickImagesRequested => {
                    if model.is_uploading() {
                        debug!("Picker disabled while uploading");
                        return;
                    }
                    caps.media_library
                        .pick_images(model.config.picker.clone(), |result| {
                            Event::ImagesPicked(Box::new(result))
                        });
                }

                Event::ImagesPicked(result) => {
                    // A picker opened before the upload started can still resolve mid-upload.
                    if model.is_uploading() {
                        warn!("Dropping picker result that arrived during upload");
                        return;
                    }
                    Self::handle_picked(*result, model);
                    caps.render.render();
                }

                Event::RemoveImage { index } => {
                    if model.is_uploading() {
                        debug!("Removal disabled while uploading");
                        return;
                    }
                    match model.selection.remove(index) {
                        Some(image) => {
                            debug!(index, uri = %image, "Image removed");
                            caps.render.render();
                        }
                        None => debug!(index, "Remove index out of range"),
                    }
                }

                Event::UploadRequested => {
                    Self::start_upload(model, caps);
                    caps.render.render();
                }

                Event::UploadCompleted { token, result } => {
                    if Self::finish_upload(token, *result, model) {
                        caps.render.render();
                    }
                }

                Event::GoHomeRequested => {
                    caps.navigator.navigate(Route::Home);
                }

                Event::DismissAlert => {
                    model.clear_alert();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let uploading = model.is_uploading();

            let screen = if uploading {
                ScreenView::Uploading {
                    message: UPLOADING_MESSAGE.into(),
                }
            } else {
                ScreenView::Gallery {
                    thumbnails: model
                        .selection
                        .iter()
                        .enumerate()
                        .map(|(index, image)| Thumbnail {
                            index,
                            uri: image.uri().to_string(),
                        })
                        .collect(),
                    confirmation: model.confirmation.clone(),
                }
            };

            ViewModel {
                screen,
                alert: model.active_alert.map(|a| a.message().to_string()),
                can_pick: !uploading,
                can_upload: !uploading,
                can_go_home: true,
                selected_count: model.selection.len(),
                permission: model.permission,
            }
        }
    }
}
