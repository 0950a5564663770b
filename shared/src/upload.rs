//! Multipart batch upload: form construction and response interpretation.
//!
//! Every part is sent as `photo.jpg` / `image/jpeg` whatever the source file
//! really is. The receiving server depends on these exact values.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::capabilities::{UploadError, UploadRequest, UploadResult};
use crate::model::SelectionState;
use crate::multipart::{FormPart, MultipartForm};

pub const UPLOAD_FIELD_NAME: &str = "image";
pub const UPLOAD_FILE_NAME: &str = "photo.jpg";
pub const UPLOAD_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Confirmed { message: Option<String> },
    Failed(UploadError),
}

/// One repeated `image` part per selected image, in selection order.
#[must_use]
pub fn build_form(selection: &SelectionState) -> MultipartForm {
    let mut form = MultipartForm::new();
    for image in selection.iter() {
        form.append(FormPart::file(
            UPLOAD_FIELD_NAME,
            UPLOAD_FILE_NAME,
            UPLOAD_CONTENT_TYPE,
            image.uri(),
        ));
    }
    form
}

#[must_use]
pub fn build_request(endpoint: &str, selection: &SelectionState) -> UploadRequest {
    UploadRequest::post(endpoint, build_form(selection))
}

/// Maps the transport result onto the screen outcome. Non-2xx statuses and
/// non-JSON success bodies are failures. Any JSON success body confirms the
/// upload; a string `message` field, when present, is the confirmation text.
#[instrument(skip(result))]
pub fn interpret_response(result: UploadResult) -> UploadOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => return UploadOutcome::Failed(e),
    };

    if !response.is_success() {
        return UploadOutcome::Failed(UploadError::HttpStatus {
            status: response.status(),
        });
    }

    if response.body().iter().all(u8::is_ascii_whitespace) {
        debug!(status = response.status(), "Upload succeeded with empty body");
        return UploadOutcome::Confirmed { message: None };
    }

    match response.json::<Value>() {
        Ok(reply) => UploadOutcome::Confirmed {
            message: reply
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned),
        },
        Err(e) => UploadOutcome::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::UploadResponse;

    #[test]
    fn test_form_has_one_image_part_per_selection_item() {
        let mut selection = SelectionState::new();
        selection.add(["file:///a.png", "file:///b.heic", "file:///a.png"]);

        let form = build_form(&selection);
        assert_eq!(form.len(), 3);
        assert_eq!(form.parts_named("image").count(), 3);

        let uris: Vec<&str> = form.parts().iter().map(|p| p.uri.as_str()).collect();
        assert_eq!(uris, vec!["file:///a.png", "file:///b.heic", "file:///a.png"]);

        for part in form.parts() {
            assert_eq!(part.file_name, "photo.jpg");
            assert_eq!(part.content_type, "image/jpeg");
        }
    }

    #[test]
    fn test_request_targets_endpoint() {
        let mut selection = SelectionState::new();
        selection.add(["file:///a.jpg"]);
        let request = build_request("https://api.example.com/upload", &selection);
        assert_eq!(request.url(), "https://api.example.com/upload");
        assert_eq!(request.form().len(), 1);
    }

    #[test]
    fn test_success_with_message() {
        let response = UploadResponse::ok_json(&serde_json::json!({ "message": "ok" }));
        assert_eq!(
            interpret_response(Ok(response)),
            UploadOutcome::Confirmed {
                message: Some("ok".into())
            }
        );
    }

    #[test]
    fn test_success_without_message() {
        let response = UploadResponse::ok_json(&serde_json::json!({ "count": 2 }));
        assert_eq!(
            interpret_response(Ok(response)),
            UploadOutcome::Confirmed { message: None }
        );

        let empty = UploadResponse::new(201, b"  \n".to_vec());
        assert_eq!(
            interpret_response(Ok(empty)),
            UploadOutcome::Confirmed { message: None }
        );
    }

    #[test]
    fn test_non_object_json_body_confirms() {
        let bodies: [&[u8]; 4] = [br#""uploaded""#, b"[]", b"true", br#"{"message":7}"#];
        for body in bodies {
            let response = UploadResponse::new(200, body.to_vec());
            assert_eq!(
                interpret_response(Ok(response)),
                UploadOutcome::Confirmed { message: None },
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_non_success_status_fails() {
        let response = UploadResponse::new(500, br#"{"message":"boom"}"#.to_vec());
        assert_eq!(
            interpret_response(Ok(response)),
            UploadOutcome::Failed(UploadError::HttpStatus { status: 500 })
        );
    }

    #[test]
    fn test_unparseable_body_fails() {
        let response = UploadResponse::new(200, b"<html>ok</html>".to_vec());
        assert!(matches!(
            interpret_response(Ok(response)),
            UploadOutcome::Failed(UploadError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_transport_error_passes_through() {
        let err = UploadError::ConnectionError {
            message: "offline".into(),
        };
        assert_eq!(
            interpret_response(Err(err.clone())),
            UploadOutcome::Failed(err)
        );
    }
}
