//! Output normalization and the pass criterion.
//!
//! The exit code is appended to the normalized stdout, so a program that
//! prints the right thing but crashes or returns the wrong status still fails.

use std::str::Utf8Error;

use crate::models::Outcome;

/// Drop every space and newline.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, ' ' | '\n')).collect()
}

/// Comparable form of a run: normalized stdout (carriage returns removed too)
/// followed by the exit code.
pub fn actual_output(stdout: &[u8], exit_code: i32) -> Result<String, Utf8Error> {
    let text = std::str::from_utf8(stdout)?;
    let mut actual: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\n' | '\r'))
        .collect();
    actual.push_str(&exit_code.to_string());
    Ok(actual)
}

/// Classify one run against the expected fixture text.
pub fn compare(expected: &str, stdout: &[u8], exit_code: i32) -> Outcome {
    let Ok(actual) = actual_output(stdout, exit_code) else {
        return Outcome::InvalidOutput;
    };
    let expected = normalize(expected);
    if expected == actual {
        Outcome::Pass
    } else {
        Outcome::OutputMismatch { expected, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(" 1 2\n3 \n\n4");
        assert_eq!(once, "1234");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_keeps_tabs_and_carriage_returns() {
        assert_eq!(normalize("a\tb\r\n"), "a\tb\r");
    }

    #[test]
    fn exit_code_is_folded_into_actual() {
        assert_eq!(actual_output(b"5\n", 0).unwrap(), "50");
        assert_eq!(actual_output(b"1 2\r\n", 3).unwrap(), "123");
        assert_eq!(actual_output(b"", -11).unwrap(), "-11");
    }

    #[test]
    fn matching_stdout_with_unfolded_fixture_is_a_mismatch() {
        assert_eq!(
            compare("5", b"5\n", 0),
            Outcome::OutputMismatch {
                expected: "5".into(),
                actual: "50".into(),
            }
        );
    }

    #[test]
    fn fixture_with_exit_code_passes() {
        assert_eq!(compare("5\n0\n", b"5\n", 0), Outcome::Pass);
    }

    #[test]
    fn different_exit_codes_cannot_both_pass() {
        let expected = "70";
        assert_eq!(compare(expected, b"7\n", 0), Outcome::Pass);
        assert!(matches!(
            compare(expected, b"7\n", 1),
            Outcome::OutputMismatch { .. }
        ));
    }

    #[test]
    fn invalid_utf8_is_reported_without_comparing() {
        assert_eq!(compare("0", &[0xff, 0xfe], 0), Outcome::InvalidOutput);
    }
}
