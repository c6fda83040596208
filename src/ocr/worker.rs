//! Background recognition of one screenshot.
//!
//! The upload blocks for up to the HTTP timeout, so each job runs on its own
//! thread and reports back over a channel. The GUI polls the receiver every
//! frame and only starts a new job once the previous one has reported.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use super::client::{OcrClient, OcrError};
use super::extract::{parse_ocr_text, AttributeCounts};
use crate::config::OcrSettings;

/// A screenshot waiting to be recognized.
#[derive(Debug, Clone)]
pub struct OcrJob {
    /// Path to the screenshot file
    pub image_path: PathBuf,
    /// OCR.space API key
    pub api_key: String,
    /// When the user submitted the job
    pub submitted_at: DateTime<Local>,
}

impl OcrJob {
    /// Creates a new job.
    pub fn new(image_path: PathBuf, api_key: String) -> Self {
        Self {
            image_path,
            api_key,
            submitted_at: Local::now(),
        }
    }
}

/// Text and attributes recognized in one screenshot.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Raw text returned by the OCR service
    pub text: String,
    /// Attributes found in the text
    pub counts: AttributeCounts,
}

/// Result of one job.
#[derive(Debug)]
pub struct OcrOutcome {
    pub job: OcrJob,
    pub result: Result<Recognition, OcrError>,
}

/// Uploads, recognizes and parses one screenshot on the current thread.
pub fn recognize_image(job: &OcrJob, settings: &OcrSettings) -> Result<Recognition, OcrError> {
    let client = OcrClient::new(settings)?;
    let text = client.recognize(&job.image_path, &job.api_key)?;
    let counts = parse_ocr_text(&text);
    Ok(Recognition { text, counts })
}

/// Runs `job` on a new thread. Exactly one outcome is sent, then the channel
/// closes.
pub fn spawn_recognition(job: OcrJob, settings: OcrSettings) -> Receiver<OcrOutcome> {
    let (sender, receiver) = channel();

    thread::spawn(move || {
        crate::log(&format!(
            "OCR worker: processing {}",
            job.image_path.display()
        ));

        let result = recognize_image(&job, &settings);
        match &result {
            Ok(recognition) => crate::log(&format!(
                "OCR worker: {} attribute(s) found in {}",
                recognition.counts.values().sum::<u32>(),
                job.image_path.display()
            )),
            Err(e) => crate::log(&format!(
                "OCR worker: failed for {}: {}",
                job.image_path.display(),
                e
            )),
        }

        // The receiver is gone if the window closed meanwhile
        let _ = sender.send(OcrOutcome { job, result });
    });

    receiver
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_worker_reports_missing_image() {
        let dir = tempdir().unwrap();
        let job = OcrJob::new(dir.path().join("missing.png"), "key".to_string());

        let receiver = spawn_recognition(job, OcrSettings::default());
        let outcome = receiver
            .recv_timeout(Duration::from_secs(10))
            .expect("Worker did not report");

        assert_eq!(outcome.job.image_path, dir.path().join("missing.png"));
        assert!(matches!(outcome.result, Err(OcrError::ImageRead { .. })));

        // Exactly one outcome, then the channel closes
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn test_worker_reports_missing_key() {
        let job = OcrJob::new(PathBuf::from("echo.png"), String::new());

        let receiver = spawn_recognition(job, OcrSettings::default());
        let outcome = receiver.recv().expect("Worker did not report");
        assert!(matches!(outcome.result, Err(OcrError::MissingApiKey)));
    }
}
