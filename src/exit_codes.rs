//! # Exit Codes
//!
//! Standard exit codes for the VibeGuard CLI.
//!
//! These codes follow common Unix conventions and provide meaningful
//! feedback to scripts and CI/CD pipelines.

use crate::session::ErrorKind;

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General error (unspecified)
pub const EXIT_ERROR: i32 = 1;

/// Configuration error (missing or invalid config)
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Network error (connection failed, timeout, unreadable response)
pub const EXIT_NETWORK_ERROR: i32 = 4;

/// Scan found issues, or the score is below `--fail-under`
pub const EXIT_FINDINGS_FOUND: i32 = 5;

/// Invalid input (nothing to scan, missing language)
pub const EXIT_INVALID_INPUT: i32 = 6;

/// The scanning service answered with an error status
pub const EXIT_SERVER_ERROR: i32 = 7;

/// The archive could not be built or packaged
pub const EXIT_ARCHIVE_ERROR: i32 = 9;

/// Exit code for a failed pipeline operation.
pub fn for_error_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => EXIT_INVALID_INPUT,
        ErrorKind::Archive => EXIT_ARCHIVE_ERROR,
        ErrorKind::Network => EXIT_NETWORK_ERROR,
        ErrorKind::Server => EXIT_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_CONFIG_ERROR,
            EXIT_NETWORK_ERROR,
            EXIT_FINDINGS_FOUND,
            EXIT_INVALID_INPUT,
            EXIT_SERVER_ERROR,
            EXIT_ARCHIVE_ERROR,
        ];

        for (i, &code1) in codes.iter().enumerate() {
            for (j, &code2) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(code1, code2, "Exit codes {} and {} are not unique", i, j);
                }
            }
        }
    }

    #[test]
    fn test_success_is_zero() {
        assert_eq!(EXIT_SUCCESS, 0);
    }

    #[test]
    fn test_every_error_kind_has_its_own_code() {
        assert_eq!(for_error_kind(ErrorKind::Validation), 6);
        assert_eq!(for_error_kind(ErrorKind::Archive), 9);
        assert_eq!(for_error_kind(ErrorKind::Network), 4);
        assert_eq!(for_error_kind(ErrorKind::Server), 7);
    }
}
