//! GUI application state management.
//!
//! Tracks user input values, the active panel and the status line.

use crate::config::StartMode;
use crate::ocr::AttributeCounts;
use crate::stats::SortMode;

/// Which front-end is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    /// Load a screenshot and recognize it
    Ocr,
    /// Click a button per observed attribute
    Manual,
}

impl From<StartMode> for Panel {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Ocr => Panel::Ocr,
            StartMode::Manual => Panel::Manual,
        }
    }
}

/// Status line content.
#[derive(Clone, Debug, Default)]
pub enum StatusMessage {
    /// Nothing happened yet
    #[default]
    Ready,
    /// Neutral information or progress
    Info(String),
    /// An action succeeded
    Success(String),
    /// An action failed
    Error(String),
}

impl StatusMessage {
    /// Get display text for the status line.
    pub fn text(&self) -> String {
        match self {
            Self::Ready => "就绪。".to_string(),
            Self::Info(msg) | Self::Success(msg) => msg.clone(),
            Self::Error(msg) => format!("错误: {}", msg),
        }
    }
}

/// GUI application state.
#[derive(Debug)]
pub struct GuiState {
    /// Active panel.
    pub panel: Panel,
    /// API key entry contents.
    pub api_key_input: String,
    /// Image path entry contents (also filled by dropping a file).
    pub image_path_input: String,
    /// Table sort order.
    pub sort_mode: SortMode,
    /// Status line.
    pub status: StatusMessage,
    /// Raw OCR text and per-image findings of the latest recognition.
    pub ocr_log: String,
}

impl GuiState {
    pub fn new(panel: Panel, sort_mode: SortMode, api_key: Option<String>) -> Self {
        let status = if api_key.is_none() {
            StatusMessage::Info("提示: 请在上方输入框配置你的 OCR.space API Key。".to_string())
        } else {
            StatusMessage::Ready
        };

        Self {
            panel,
            api_key_input: api_key.unwrap_or_default(),
            image_path_input: String::new(),
            sort_mode,
            status,
            ocr_log: String::new(),
        }
    }
}

/// One-line summary of the attributes found in an image, e.g. `暴击率: 2, 暴击伤害: 1`.
pub fn format_counts_summary(counts: &AttributeCounts) -> String {
    counts
        .iter()
        .map(|(attribute, count)| format!("{}: {}", attribute.name(), count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    #[test]
    fn test_format_counts_summary() {
        let mut counts = AttributeCounts::new();
        counts.insert(Attribute::CritDamage, 1);
        counts.insert(Attribute::CritRate, 2);
        assert_eq!(format_counts_summary(&counts), "暴击率: 2, 暴击伤害: 1");
        assert_eq!(format_counts_summary(&AttributeCounts::new()), "");
    }

    #[test]
    fn test_initial_status_hints_missing_key() {
        let state = GuiState::new(Panel::Ocr, SortMode::Descending, None);
        assert!(matches!(state.status, StatusMessage::Info(_)));
        assert!(state.api_key_input.is_empty());

        let state = GuiState::new(Panel::Manual, SortMode::Descending, Some("abc".to_string()));
        assert!(matches!(state.status, StatusMessage::Ready));
        assert_eq!(state.api_key_input, "abc");
    }
}
