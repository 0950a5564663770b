use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::multipart::MultipartForm;

/// Injected upload transport. The shell reads the local files referenced by
/// the form, sends one multipart request and hands back the raw response.
#[derive(Capability)]
pub struct Uploader<Ev> {
    context: CapabilityContext<UploadOperation, Ev>,
}

impl<Ev> Uploader<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<UploadOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn send<F>(&self, request: UploadRequest, callback: F)
    where
        F: FnOnce(UploadResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(UploadOperation::Send(request))
                .await;
            context.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UploadOperation {
    Send(UploadRequest),
}

impl Operation for UploadOperation {
    type Output = UploadResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UploadMethod {
    #[default]
    Post,
}

impl UploadMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRequest {
    request_id: String,
    method: UploadMethod,
    url: String,
    form: MultipartForm,
}

impl UploadRequest {
    pub fn new(method: UploadMethod, url: impl Into<String>, form: MultipartForm) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            method,
            url: url.into(),
            form,
        }
    }

    pub fn post(url: impl Into<String>, form: MultipartForm) -> Self {
        Self::new(UploadMethod::Post, url, form)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> UploadMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn form(&self) -> &MultipartForm {
        &self.form
    }

    pub fn content_type(&self) -> String {
        self.form.content_type_header()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    status: u16,
    body: Vec<u8>,
}

impl UploadResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn ok_json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string().into_bytes())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, UploadError> {
        serde_json::from_slice(&self.body).map_err(|e| UploadError::InvalidResponse {
            reason: format!("failed to parse JSON: {e}"),
        })
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum UploadError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not read local file {uri}: {message}")]
    FileUnreadable { uri: String, message: String },

    #[error("connection failed: {message}")]
    ConnectionError { message: String },

    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error {status}")]
    HttpStatus { status: u16 },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("request cancelled")]
    Cancelled,
}

pub type UploadResult = Result<UploadResponse, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::FormPart;

    #[test]
    fn test_request_ids_are_unique() {
        let a = UploadRequest::post("/upload", MultipartForm::new());
        let b = UploadRequest::post("/upload", MultipartForm::new());
        assert_ne!(a.request_id(), b.request_id());
        assert_eq!(a.method(), UploadMethod::Post);
        assert_eq!(a.method().as_str(), "POST");
    }

    #[test]
    fn test_request_content_type_uses_form_boundary() {
        let mut form = MultipartForm::with_boundary("abc");
        form.append(FormPart::file("image", "photo.jpg", "image/jpeg", "file:///x"));
        let request = UploadRequest::post("https://api.example.com/upload", form);
        assert_eq!(request.content_type(), "multipart/form-data; boundary=abc");
        assert_eq!(request.form().len(), 1);
        assert_eq!(request.url(), "https://api.example.com/upload");
    }

    #[test]
    fn test_response_status_classes() {
        assert!(UploadResponse::new(200, vec![]).is_success());
        assert!(UploadResponse::new(204, vec![]).is_success());
        assert!(!UploadResponse::new(302, vec![]).is_success());
        assert!(!UploadResponse::new(500, vec![]).is_success());
    }

    #[test]
    fn test_response_json() {
        let response = UploadResponse::ok_json(&serde_json::json!({ "message": "ok" }));
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["message"], "ok");

        let broken = UploadResponse::new(200, b"<html>".to_vec());
        assert!(matches!(
            broken.json::<serde_json::Value>(),
            Err(UploadError::InvalidResponse { .. })
        ));
    }
}
