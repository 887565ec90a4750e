//! HTTP transport - one multipart POST per processing request.
//!
//! Stateless apart from connection reuse; any number of calls may be in
//! flight concurrently on worker threads. The transport does not cancel:
//! superseded requests run to completion and their results are discarded by
//! sequence token upstream. No client timeout is configured - a hung request
//! is superseded by the next submission, never aborted.

use crate::core::sequencer::{ProcessService, ProcessedImage, ProcessingRequest};
use crate::remote::RemoteError;
use log::{debug, trace};
use reqwest::blocking::multipart;

/// Blocking HTTP client bound to one server base URL.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
    base: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// GET an endpoint, mapping non-2xx to a transport error.
    pub(crate) fn get(&self, path: &str) -> Result<reqwest::blocking::Response, RemoteError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Self::check_status(response)
    }

    /// POST a multipart form, mapping non-2xx to a transport error.
    pub(crate) fn post_multipart(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<reqwest::blocking::Response, RemoteError> {
        let response = self
            .http
            .post(self.url(path))
            .multipart(form)
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Self::check_status(response)
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(RemoteError::Transport(format!(
            "server returned {}: {}",
            status,
            body.trim()
        )))
    }

    /// Multipart part carrying the source image bytes verbatim.
    pub(crate) fn image_part(
        source: &crate::entities::source::SourceImage,
    ) -> Result<multipart::Part, RemoteError> {
        multipart::Part::bytes(source.bytes().to_vec())
            .file_name(source.upload_name())
            .mime_str(source.mime())
            .map_err(|e| RemoteError::Transport(e.to_string()))
    }
}

impl ProcessService for HttpTransport {
    fn process(&self, request: &ProcessingRequest) -> Result<ProcessedImage, RemoteError> {
        let mut form = multipart::Form::new().part("image", Self::image_part(&request.source)?);
        for (name, value) in request.params.wire_fields() {
            form = form.text(name, value);
        }
        if let Some(data) = &request.palette_data {
            form = form.text("palette_data", data.clone());
        }

        debug!(
            "POST /process token={} source={}x{} ({} bytes)",
            request.token,
            request.source.width(),
            request.source.height(),
            request.source.bytes().len()
        );

        let response = self.post_multipart("/process", form)?;
        let bytes = response
            .bytes()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        trace!("token={} response: {} bytes", request.token, bytes.len());

        // Content type is ignored on purpose: the server answers JPEG for
        // JPEG uploads and PNG otherwise, and any decodable image is fine.
        let decoded =
            image::load_from_memory(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(ProcessedImage {
            rgba: decoded.to_rgba8(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = HttpTransport::new("http://localhost:8080/");
        assert_eq!(transport.base_url(), "http://localhost:8080");
        assert_eq!(transport.url("/process"), "http://localhost:8080/process");
    }
}
