//! User-visible texts sent by the dialogue.

pub const GREETING: &str = "👋 Welcome! Please send your raw prompt.";
pub const ASK_MODE: &str = "🔧 Enter the mode (e.g., clarity, deep_research, creative, etc):";
pub const OPTIMIZING: &str = "⚙️ Optimizing your prompt...";
pub const ASK_FOLLOWUP: &str = "🤔 Want to answer follow-up questions? (yes/no)";
pub const ASK_QUESTIONS: &str = "✍️ Please enter the questions asked by the model:";
pub const ASK_PREFERENCES: &str = "💬 Any preferences/answers to the questions? (or type 'no')";
pub const ASK_EXPLANATION: &str = "📘 Want explanation of the optimization? (yes/no)";
pub const FOLLOWUP_FAILED: &str = "❌ Error in follow-up.";
pub const EXPLANATION_FAILED: &str = "❌ Explanation request failed.";
pub const DONE: &str = "✅ Done. You can send another prompt with /start.";
pub const CANCELLED: &str = "❌ Canceled.";

/// Reported when optimization fails.
pub fn optimization_failed(reason: impl std::fmt::Display) -> String {
    format!("❌ Error: {}", reason)
}

/// Re-prompt after an unknown mode, listing the available keys.
pub fn unknown_mode<'a>(entered: &str, available: impl IntoIterator<Item = &'a str>) -> String {
    let keys: Vec<&str> = available.into_iter().collect();
    format!(
        "❓ Unknown mode '{}'. Choose one of: {}",
        entered.trim(),
        keys.join(", ")
    )
}
