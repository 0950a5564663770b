use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AlbumConfig;

/// Handle to a locally readable image. Don't store image bytes here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn uri(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered image selection. Insertion order drives the grid and the
/// index-based removal; duplicates are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    images: Vec<ImageRef>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I, S>(&mut self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images.extend(uris.into_iter().map(ImageRef::new));
    }

    /// Removes the image at `index`; `None` when out of range.
    pub fn remove(&mut self, index: usize) -> Option<ImageRef> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRef> {
        self.images.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRef> {
        self.images.iter()
    }

    pub fn uris(&self) -> Vec<&str> {
        self.images.iter().map(ImageRef::uri).collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadToken(u64);

impl UploadToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Explicit in-flight guard for uploads. A token is issued before the
/// transport call, and only the matching completion releases the guard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadGuard {
    next_token: u64,
    in_flight: Option<UploadToken>,
}

impl UploadGuard {
    pub fn try_acquire(&mut self) -> Option<UploadToken> {
        if self.in_flight.is_some() {
            return None;
        }
        self.next_token = self.next_token.wrapping_add(1);
        let token = UploadToken(self.next_token);
        self.in_flight = Some(token);
        Some(token)
    }

    /// Returns `false` for a token that is not the one in flight.
    pub fn release(&mut self, token: UploadToken) -> bool {
        if self.in_flight == Some(token) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<UploadToken> {
        self.in_flight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    #[default]
    Unknown,
    Requesting,
    Granted,
    Denied,
    NotApplicable,
}

impl PermissionState {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    #[must_use]
    pub const fn was_requested(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    BatchTooLarge,
    EmptySelection,
}

impl Alert {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BatchTooLarge => crate::validation::BATCH_TOO_LARGE_MESSAGE,
            Self::EmptySelection => "Please select images to upload",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub config: AlbumConfig,
    pub permission: PermissionState,
    pub selection: SelectionState,
    pub upload_guard: UploadGuard,
    /// Last server confirmation; kept until the next successful upload.
    pub confirmation: Option<String>,
    pub active_alert: Option<Alert>,
}

impl Model {
    pub fn show_alert(&mut self, alert: Alert) {
        self.active_alert = Some(alert);
    }

    pub fn clear_alert(&mut self) {
        self.active_alert = None;
    }

    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.upload_guard.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn selection(uris: &[&str]) -> SelectionState {
        let mut s = SelectionState::new();
        s.add(uris.iter().copied());
        s
    }

    #[test]
    fn test_add_appends_in_order_without_dedup() {
        let mut s = selection(&["a", "b"]);
        s.add(["b", "c"]);
        assert_eq!(s.uris(), vec!["a", "b", "b", "c"]);
    }

    #[test]
    fn test_remove_shifts_later_indices() {
        let mut s = selection(&["a", "b", "c"]);
        assert_eq!(s.remove(1), Some(ImageRef::new("b")));
        assert_eq!(s.uris(), vec!["a", "c"]);
        assert_eq!(s.get(1).map(ImageRef::uri), Some("c"));
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut s = selection(&["a"]);
        assert_eq!(s.remove(1), None);
        assert_eq!(s.remove(usize::MAX), None);
        assert_eq!(s.uris(), vec!["a"]);

        let mut empty = SelectionState::new();
        assert_eq!(empty.remove(0), None);
    }

    #[test]
    fn test_clear() {
        let mut s = selection(&["a", "b"]);
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_guard_is_exclusive() {
        let mut guard = UploadGuard::default();
        let token = guard.try_acquire().unwrap();
        assert!(guard.is_busy());
        assert!(guard.try_acquire().is_none());
        assert!(guard.release(token));
        assert!(!guard.is_busy());
    }

    #[test]
    fn test_guard_ignores_stale_tokens() {
        let mut guard = UploadGuard::default();
        let first = guard.try_acquire().unwrap();
        assert!(guard.release(first));
        let second = guard.try_acquire().unwrap();
        assert_ne!(first, second);
        assert!(!guard.release(first));
        assert_eq!(guard.in_flight(), Some(second));
        assert!(guard.release(second));
        assert!(!guard.release(second));
    }

    #[test]
    fn test_permission_state() {
        assert!(!PermissionState::Unknown.was_requested());
        assert!(PermissionState::NotApplicable.was_requested());
        assert!(PermissionState::Granted.is_granted());
        assert!(!PermissionState::Denied.is_granted());
    }

    #[test]
    fn test_alert_messages() {
        assert_eq!(Alert::BatchTooLarge.message(), "Total image size can not exceed 5MB");
        assert_eq!(Alert::EmptySelection.message(), "Please select images to upload");
    }

    proptest! {
        #[test]
        fn prop_batches_concatenate(batches in prop::collection::vec(
            prop::collection::vec("[a-z]{1,8}", 0..6), 0..8,
        )) {
            let mut s = SelectionState::new();
            for batch in &batches {
                s.add(batch.iter().cloned());
            }
            let expected: Vec<&str> = batches.iter().flatten().map(String::as_str).collect();
            prop_assert_eq!(s.uris(), expected);
        }

        #[test]
        fn prop_remove_deletes_exactly_one(
            uris in prop::collection::vec("[a-z]{1,4}", 0..10),
            index in 0usize..12,
        ) {
            let mut s = SelectionState::new();
            s.add(uris.iter().cloned());
            let removed = s.remove(index);

            if index < uris.len() {
                let mut expected = uris.clone();
                let gone = expected.remove(index);
                prop_assert_eq!(removed.map(|r| r.uri().to_string()), Some(gone));
                prop_assert_eq!(s.uris(), expected.iter().map(String::as_str).collect::<Vec<_>>());
            } else {
                prop_assert!(removed.is_none());
                prop_assert_eq!(s.uris(), uris.iter().map(String::as_str).collect::<Vec<_>>());
            }
        }
    }
}
