//! Feedback domain module.
//!
//! Extraction of the structured self-critique from model output and its
//! rendering into chat messages.

mod extractor;
mod report;

pub use extractor::{
    CandidateSource, Extraction, FeedbackExtractor, OriginalPromptAssessment, PromptFeedback,
};
pub use report::{
    feedback_messages, IMPROVEMENTS_HEADER, REPORT_HEADER, STRENGTHS_HEADER, TIPS_HEADER,
    WEAKNESSES_HEADER,
};
