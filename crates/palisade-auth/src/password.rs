//! Advisory password strength scoring.
//!
//! Produces a 0-5 score plus actionable feedback. The score is guidance for
//! signup and password-change forms; it is never consulted during login.

use serde::Serialize;

/// Result of evaluating a candidate password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordAssessment {
    /// Strength score clamped to the 0-5 range.
    pub score: u8,
    /// Suggestions for improving the password, in evaluation order.
    pub feedback: Vec<String>,
}

/// Score a candidate password.
///
/// Length contributes up to two points, each character class one point, and
/// two penalties subtract for repeated runs and single-class passwords. The
/// final score is clamped to 0-5.
#[must_use]
pub fn evaluate(password: &str) -> PasswordAssessment {
    let mut score: i8 = 0;
    let mut feedback = Vec::new();

    let length = password.chars().count();
    if length >= 12 {
        score += 2;
    } else if length >= 8 {
        score += 1;
    } else {
        feedback.push("too short".to_string());
    }

    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    } else {
        feedback.push("add lowercase letters".to_string());
    }

    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    } else {
        feedback.push("add uppercase letters".to_string());
    }

    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    } else {
        feedback.push("add digits".to_string());
    }

    if password.chars().any(|c| !c.is_alphanumeric()) {
        score += 1;
    } else {
        feedback.push("add symbols".to_string());
    }

    if has_repeated_run(password) {
        score -= 1;
        feedback.push("avoid repeated characters".to_string());
    }

    if is_single_class(password) {
        score -= 1;
        feedback.push("mix character types".to_string());
    }

    #[allow(clippy::cast_sign_loss)]
    let score = score.clamp(0, 5) as u8;

    PasswordAssessment { score, feedback }
}

/// Whether the password contains three or more identical consecutive characters.
fn has_repeated_run(password: &str) -> bool {
    let mut run = 0u32;
    let mut previous = None;
    for c in password.chars() {
        if previous == Some(c) {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            previous = Some(c);
            run = 1;
        }
    }
    false
}

/// Whether the password is non-empty and drawn from a single character class.
fn is_single_class(password: &str) -> bool {
    !password.is_empty()
        && (password.chars().all(char::is_alphabetic) || password.chars().all(char::is_numeric))
}
