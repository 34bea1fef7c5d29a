//! Rendering of [`PromptFeedback`] into chat messages.

use super::PromptFeedback;

pub const REPORT_HEADER: &str = "🧠 *Prompt Feedback Analysis*";
pub const STRENGTHS_HEADER: &str = "👍 *Original Prompt Strengths*";
pub const WEAKNESSES_HEADER: &str = "👎 *Original Prompt Weaknesses*";
pub const IMPROVEMENTS_HEADER: &str = "🧠 *What the LLM Understands Better Now*";
pub const TIPS_HEADER: &str = "💡 *Tips for Future Prompts*";

/// Renders the feedback as an ordered list of Markdown messages.
///
/// The first message is always the report header. It is followed by up to
/// four sections in fixed order (strengths, weaknesses, improvements, tips);
/// a section whose list is empty is left out.
pub fn feedback_messages(feedback: &PromptFeedback) -> Vec<String> {
    let sections = [
        (STRENGTHS_HEADER, &feedback.original_prompt.strengths),
        (WEAKNESSES_HEADER, &feedback.original_prompt.weaknesses),
        (IMPROVEMENTS_HEADER, &feedback.llm_understanding_improvements),
        (TIPS_HEADER, &feedback.tips_for_future_prompts),
    ];

    let mut messages = vec![REPORT_HEADER.to_string()];
    messages.extend(
        sections
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(header, items)| render_section(header, items)),
    );
    messages
}

fn render_section(header: &str, items: &[String]) -> String {
    items.iter().fold(header.to_string(), |mut section, item| {
        section.push_str("\n• ");
        section.push_str(item);
        section
    })
}
