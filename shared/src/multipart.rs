//! `multipart/form-data` form descriptor.
//!
//! The core never holds image bytes: a [`MultipartForm`] lists parts that point
//! at local URIs, and the shell resolves them when it performs the request.
//! Shells without a native multipart encoder can call [`MultipartForm::encode`]
//! with their own URI reader.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub uri: String,
}

impl FormPart {
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            uri: uri.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("album-{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Appends a part. Repeating a field name is allowed and means an array.
    pub fn append(&mut self, part: FormPart) {
        self.parts.push(part);
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts sharing `name`, in form order.
    pub fn parts_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormPart> + 'a {
        self.parts.iter().filter(move |p| p.name == name)
    }

    pub fn content_type_header(&self) -> String {
        format!("{MULTIPART_CONTENT_TYPE}; boundary={}", self.boundary)
    }

    /// Encodes the body, reading each part's bytes through `read`.
    /// The first resolver error aborts encoding.
    pub fn encode<F, E>(&self, mut read: F) -> Result<Bytes, E>
    where
        F: FnMut(&str) -> Result<Vec<u8>, E>,
    {
        let mut body = BytesMut::new();

        for part in &self.parts {
            let data = read(&part.uri)?;

            body.put_slice(b"--");
            body.put_slice(self.boundary.as_bytes());
            body.put_slice(CRLF);
            body.put_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                    escape_quoted(&part.name),
                    escape_quoted(&part.file_name)
                )
                .as_bytes(),
            );
            body.put_slice(CRLF);
            body.put_slice(format!("Content-Type: {}", part.content_type).as_bytes());
            body.put_slice(CRLF);
            body.put_slice(CRLF);
            body.put_slice(&data);
            body.put_slice(CRLF);
        }

        body.put_slice(b"--");
        body.put_slice(self.boundary.as_bytes());
        body.put_slice(b"--");
        body.put_slice(CRLF);

        Ok(body.freeze())
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}
