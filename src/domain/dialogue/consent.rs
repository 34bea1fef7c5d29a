//! Interpretation of yes/no style user replies.

/// Returns true if the reply counts as "yes".
///
/// Deliberately loose: any reply whose trimmed, lower-cased form starts with
/// `y` is affirmative ("y", "yes", "yeah", "yolo").
pub fn is_affirmative(reply: &str) -> bool {
    reply.trim().to_lowercase().starts_with('y')
}

/// Returns true if the preferences reply means "no preferences".
///
/// Only an exact, case-insensitive "no" qualifies.
pub fn declines_preferences(reply: &str) -> bool {
    reply.to_lowercase() == "no"
}
