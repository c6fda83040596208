//! OCR.space HTTP client.
//!
//! Uploads one image per call and interprets the JSON reply. Every failure is
//! returned as an [`OcrError`] variant so callers never have to inspect
//! message text to tell network problems from service-side errors.

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::preprocess::prepare_upload;
use crate::config::OcrSettings;
use crate::log;

/// Failure of a single OCR request.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("API key is not configured")]
    MissingApiKey,
    #[error("image file could not be read at {path}: {reason}")]
    ImageRead { path: PathBuf, reason: String },
    #[error("the request to OCR.space timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed ({detail})")]
    HttpStatus { status: u16, detail: String },
    #[error("invalid response from OCR.space: {0}")]
    InvalidResponse(String),
    #[error("processing error: {0}")]
    Processing(String),
    #[error("OCR error ({code}): {detail}")]
    ExitCode { code: i64, detail: String },
    #[error("no text found in results")]
    NoText,
    #[error("{detail} (OCRExitCode: {code:?})")]
    Unexpected { code: Option<i64>, detail: String },
}

impl OcrError {
    /// True for failures on the way to the service (as opposed to failures
    /// the service reported).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }
}

impl From<reqwest::Error> for OcrError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OcrError::Timeout
        } else {
            OcrError::Network(e.to_string())
        }
    }
}

/// `ErrorMessage` is sometimes a string and sometimes a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn first(&self) -> Option<&str> {
        match self {
            Self::One(s) => Some(s.as_str()),
            Self::Many(v) => v.first().map(|s| s.as_str()),
        }
    }

    fn joined(&self) -> String {
        match self {
            Self::One(s) => s.clone(),
            Self::Many(v) => v.join(", "),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(rename = "OCRExitCode")]
    ocr_exit_code: Option<i64>,
    #[serde(rename = "IsErroredOnProcessing", default)]
    is_errored_on_processing: bool,
    #[serde(rename = "ErrorMessage")]
    error_message: Option<ErrorMessage>,
}

impl OcrResponse {
    /// Text of the first parsed result, if there is one.
    fn first_text(&self) -> Option<&str> {
        self.parsed_results
            .as_deref()
            .and_then(|results| results.first())
            .map(|result| result.parsed_text.as_deref().unwrap_or_default())
    }

    fn error_text(&self, fallback: &str) -> String {
        self.error_message
            .as_ref()
            .map(|m| m.joined())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Turns an HTTP status and body into recognized text or an error.
pub fn interpret_response(status: u16, body: &str) -> Result<String, OcrError> {
    if status != 200 {
        let detail = serde_json::from_str::<OcrResponse>(body)
            .ok()
            .and_then(|r| r.error_message.and_then(|m| m.first().map(str::to_string)))
            .or_else(|| Some(body.trim().to_string()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| format!("HTTP Status {}", status));
        return Err(OcrError::HttpStatus { status, detail });
    }

    let response: OcrResponse =
        serde_json::from_str(body).map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

    if response.is_errored_on_processing {
        return Err(OcrError::Processing(
            response.error_text("Unknown processing error."),
        ));
    }

    match (response.ocr_exit_code, response.first_text()) {
        (Some(1), Some(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Err(OcrError::NoText)
            } else {
                Ok(text.to_string())
            }
        }
        (Some(code @ 2..=7), _) => Err(OcrError::ExitCode {
            code,
            detail: response.error_text("Specific OCR error code received."),
        }),
        (code, _) => Err(OcrError::Unexpected {
            code,
            detail: response.error_text("Unknown OCR error from API."),
        }),
    }
}

/// Blocking OCR.space client.
pub struct OcrClient {
    http: Client,
    endpoint: String,
    language: String,
    ocr_engine: u8,
    max_upload_bytes: u64,
}

impl OcrClient {
    /// Builds a client with the configured endpoint, language and timeout.
    pub fn new(settings: &OcrSettings) -> Result<Self, OcrError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            language: settings.language.clone(),
            ocr_engine: settings.ocr_engine,
            max_upload_bytes: settings.max_upload_bytes,
        })
    }

    /// Uploads the image at `image_path` and returns the recognized text.
    pub fn recognize(&self, image_path: &Path, api_key: &str) -> Result<String, OcrError> {
        if api_key.trim().is_empty() {
            return Err(OcrError::MissingApiKey);
        }

        let upload = prepare_upload(image_path, self.max_upload_bytes).map_err(|e| {
            OcrError::ImageRead {
                path: image_path.to_path_buf(),
                reason: format!("{:#}", e),
            }
        })?;

        log(&format!(
            "Sending OCR request for {} ({} bytes) with API key {}... (Engine: {}, Lang: {})",
            image_path.display(),
            upload.bytes.len(),
            api_key.chars().take(5).collect::<String>(),
            self.ocr_engine,
            self.language
        ));

        let file_part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = multipart::Form::new()
            .text("apikey", api_key.to_string())
            .text("language", self.language.clone())
            .text("OCREngine", self.ocr_engine.to_string())
            .text("isOverlayRequired", "False")
            .part("file", file_part);

        let response = self.http.post(&self.endpoint).multipart(form).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        interpret_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_success() {
        let body = r#"{"ParsedResults":[{"ParsedText":"暴击率 6.3%\r\n"}],"OCRExitCode":1,"IsErroredOnProcessing":false}"#;
        assert_eq!(interpret_response(200, body).unwrap(), "暴击率 6.3%");
    }

    #[test]
    fn test_empty_text() {
        let body = r#"{"ParsedResults":[{"ParsedText":"  "}],"OCRExitCode":1,"IsErroredOnProcessing":false}"#;
        assert!(matches!(interpret_response(200, body), Err(OcrError::NoText)));
    }

    #[test]
    fn test_processing_error_list() {
        let body = r#"{"OCRExitCode":3,"IsErroredOnProcessing":true,"ErrorMessage":["File failed validation","Bad type"]}"#;
        match interpret_response(200, body) {
            Err(OcrError::Processing(msg)) => assert_eq!(msg, "File failed validation, Bad type"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_processing_error_with_null_results() {
        let body = r#"{"ParsedResults":null,"OCRExitCode":3,"IsErroredOnProcessing":true,"ErrorMessage":["Image too large"]}"#;
        match interpret_response(200, body) {
            Err(OcrError::Processing(msg)) => assert_eq!(msg, "Image too large"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_null_parsed_text() {
        let body = r#"{"ParsedResults":[{"ParsedText":null}],"OCRExitCode":1,"IsErroredOnProcessing":false}"#;
        assert!(matches!(interpret_response(200, body), Err(OcrError::NoText)));
    }

    #[test]
    fn test_processing_error_string() {
        let body = r#"{"IsErroredOnProcessing":true,"ErrorMessage":"Timed out waiting for results"}"#;
        match interpret_response(200, body) {
            Err(OcrError::Processing(msg)) => assert_eq!(msg, "Timed out waiting for results"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_exit_code_error() {
        let body = r#"{"ParsedResults":[],"OCRExitCode":4,"IsErroredOnProcessing":false,"ErrorMessage":["Parsing failed"]}"#;
        match interpret_response(200, body) {
            Err(OcrError::ExitCode { code, detail }) => {
                assert_eq!(code, 4);
                assert_eq!(detail, "Parsing failed");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_exit_code() {
        let body = r#"{"OCRExitCode":99,"IsErroredOnProcessing":false}"#;
        assert!(matches!(
            interpret_response(200, body),
            Err(OcrError::Unexpected { code: Some(99), .. })
        ));
    }

    #[test]
    fn test_http_status_with_json_detail() {
        let body = r#"{"ErrorMessage":["Invalid API key"]}"#;
        match interpret_response(403, body) {
            Err(OcrError::HttpStatus { status, detail }) => {
                assert_eq!(status, 403);
                assert_eq!(detail, "Invalid API key");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_http_status_plain_body() {
        match interpret_response(500, "") {
            Err(OcrError::HttpStatus { detail, .. }) => assert_eq!(detail, "HTTP Status 500"),
            other => panic!("unexpected: {:?}", other),
        }
        match interpret_response(403, "The API key is invalid") {
            Err(OcrError::HttpStatus { detail, .. }) => assert_eq!(detail, "The API key is invalid"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            interpret_response(200, "<html>"),
            Err(OcrError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let client = OcrClient::new(&OcrSettings::default()).unwrap();
        let result = client.recognize(Path::new("missing.png"), "  ");
        assert!(matches!(result, Err(OcrError::MissingApiKey)));
    }

    #[test]
    fn test_missing_image() {
        let dir = tempdir().unwrap();
        let client = OcrClient::new(&OcrSettings::default()).unwrap();
        let result = client.recognize(&dir.path().join("missing.png"), "key");
        assert!(matches!(result, Err(OcrError::ImageRead { .. })));
    }
}
