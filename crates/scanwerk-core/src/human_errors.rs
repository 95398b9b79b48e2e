// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for capture and processing screens.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives whether the UI offers a retry prompt.

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Try the same step again (re-capture, re-adjust, re-export).
    Transient,
    /// User must change something first (pick another file, move corners).
    ActionRequired,
    /// Retrying the same input will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the screen should offer a retry button.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanError` into a `HumanError` for display.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        ScanError::SingularSystem => HumanError {
            message: "We couldn't straighten this page.".into(),
            suggestion: "Drag the corner points so they sit on the four corners of the page, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ScanError::DecodeFailure(_) => HumanError {
            message: "We couldn't open this image.".into(),
            suggestion: "The picture may be damaged. Take the photo again or choose a different file.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::EncodeFailure(_) => HumanError {
            message: "We couldn't finish processing this page.".into(),
            suggestion: "Your captured pages are still here. Try again, or save the pages individually so nothing is lost.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::UnsupportedFormat(detail) => HumanError {
            message: "This type of image isn't supported.".into(),
            suggestion: format!("Please choose a JPEG, PNG, or WebP image. (File type: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::InvalidInput(detail) => HumanError {
            message: "Something about this page isn't right.".into(),
            suggestion: format!("Check the file and the corner points, then try again. ({detail})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ScanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or try copying the file to a different location first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check the settings file for typos, or delete it to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_corners_ask_for_adjustment() {
        let human = humanize_error(&ScanError::SingularSystem);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.retriable);
    }

    #[test]
    fn encode_failure_offers_retry_and_keeps_pages() {
        let human = humanize_error(&ScanError::EncodeFailure("no output".into()));
        assert!(human.retriable);
        assert!(human.suggestion.contains("save the pages"));
    }

    #[test]
    fn unsupported_format_is_permanent() {
        let err = ScanError::UnsupportedFormat("image/gif".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("image/gif"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = ScanError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
