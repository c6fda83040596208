use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::attributes::Attribute;
use crate::log;

/// Pattern to match value-like words:
/// - Integers: 40, +40
/// - Decimals: 6.3, +7.5, .5
/// - Either form followed by a percent sign: 12.6%
///
/// Only the capture group is parsed, so the percent sign never reaches the value.
/// Digits are ASCII only; full-width forms are folded before matching.
const VALUE_PATTERN: &str = r"([+-]?(?:[0-9]*\.[0-9]+|[0-9]+))%?";

/// Number of lines after a mention that may still hold its value.
const LOOKAHEAD_LINES: usize = 2;

/// Per-attribute counts found in one OCR text. Attributes that were not found
/// are absent rather than zero.
pub type AttributeCounts = BTreeMap<Attribute, u32>;

fn value_regex() -> &'static Regex {
    static VALUE_REGEX: OnceLock<Regex> = OnceLock::new();
    VALUE_REGEX.get_or_init(|| Regex::new(VALUE_PATTERN).expect("value pattern is valid"))
}

/// Returns the first number in `window` that is a valid roll for `attribute`.
///
/// Numbers are tried left to right. A candidate that fails to parse is skipped.
pub fn find_valid_value(attribute: Attribute, window: &str) -> Option<f64> {
    let window = fold_full_width(window);
    value_regex()
        .captures_iter(&window)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .find(|&value| attribute.is_valid_value(value))
}

/// Maps full-width digits, decimal point and percent sign (`０`-`９`, `．`,
/// `％`) to their ASCII forms. Other characters are kept as they are.
fn fold_full_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '．' => '.',
            '％' => '%',
            _ => c,
        })
        .collect()
}

/// Builds the search window for a mention on `lines[idx]`: the line itself
/// plus up to [`LOOKAHEAD_LINES`] following lines, joined by spaces.
fn search_window(lines: &[&str], idx: usize) -> String {
    let end = (idx + 1 + LOOKAHEAD_LINES).min(lines.len());
    lines[idx..end].join(" ")
}

/// Counts echo attributes in raw OCR text.
///
/// For every attribute, each line containing its in-game name is one mention.
/// A mention counts once if the line or the next two lines contain a value
/// from that attribute's roll table; scanning stops at the first such value,
/// so a label followed by an old and a new value is not counted twice.
pub fn parse_ocr_text(text: &str) -> AttributeCounts {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut counts = AttributeCounts::new();

    for attribute in Attribute::ALL {
        for (idx, line) in lines.iter().enumerate() {
            if !line.contains(attribute.name()) {
                continue;
            }

            let window = search_window(&lines, idx);
            if let Some(value) = find_valid_value(attribute, &window) {
                log(&format!(
                    "Parser: {} = {} (line {})",
                    attribute,
                    value,
                    idx + 1
                ));
                *counts.entry(attribute).or_insert(0) += 1;
            }
        }
    }

    counts
}
