//! Structured-output extraction.
//!
//! Locates the feedback JSON object that the explanation request asks the
//! model to return and parses it into [`PromptFeedback`]. Models are not
//! reliable about the envelope, so two strategies are tried in order:
//!
//! 1. a code fence explicitly marked as JSON (```` ```json ````);
//! 2. only when no such fence exists, the span from the first `{` to the last `}`.
//!
//! "The model returned no JSON" and "the model returned broken JSON" are
//! reported as different outcomes.

use serde::{Deserialize, Deserializer, Serialize};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Assessment of the user's original prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalPromptAssessment {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub weaknesses: Vec<String>,
}

/// The four-section feedback record produced by the explanation request.
///
/// Every list is optional in the model output; a missing or null list is
/// read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFeedback {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_prompt: OriginalPromptAssessment,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub llm_understanding_improvements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tips_for_future_prompts: Vec<String>,
}

impl PromptFeedback {
    /// Returns true if every section is empty.
    pub fn is_empty(&self) -> bool {
        self.original_prompt.strengths.is_empty()
            && self.original_prompt.weaknesses.is_empty()
            && self.llm_understanding_improvements.is_empty()
            && self.tips_for_future_prompts.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D>(deserializer: D) -> Result<OriginalPromptAssessment, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OriginalPromptAssessment>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which strategy located the candidate span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Fenced,
    BraceSpan,
}

/// Outcome of an extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A candidate span was found and parsed into the expected shape.
    Found(PromptFeedback),
    /// No fenced block and no brace-delimited span.
    NotFound,
    /// A candidate span was found but is not valid JSON of the expected shape.
    ParseError(String),
}

impl Extraction {
    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found(_))
    }

    /// Consumes the extraction, keeping only a successful record.
    pub fn found(self) -> Option<PromptFeedback> {
        match self {
            Extraction::Found(feedback) => Some(feedback),
            _ => None,
        }
    }
}

/// Extracts [`PromptFeedback`] from free-form model output.
#[derive(Debug, Clone, Default)]
pub struct FeedbackExtractor;

impl FeedbackExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the feedback record from `raw_text`. The candidate span is
    /// parsed exactly as found. Never panics.
    pub fn extract(&self, raw_text: &str) -> Extraction {
        let Some((_, candidate)) = self.locate(raw_text) else {
            return Extraction::NotFound;
        };

        match serde_json::from_str::<PromptFeedback>(candidate) {
            Ok(feedback) => Extraction::Found(feedback),
            Err(e) => Extraction::ParseError(e.to_string()),
        }
    }

    /// Finds the candidate JSON span and reports which strategy found it.
    pub fn locate<'a>(&self, text: &'a str) -> Option<(CandidateSource, &'a str)> {
        if let Some(interior) = extract_from_json_fence(text) {
            return Some((CandidateSource::Fenced, interior));
        }
        extract_brace_span(text).map(|span| (CandidateSource::BraceSpan, span))
    }
}

/// Interior of the first ```` ```json ```` fence that is followed by
/// whitespace and later closed.
fn extract_from_json_fence(text: &str) -> Option<&str> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(JSON_FENCE) {
        let after_marker = search_from + offset + JSON_FENCE.len();
        let rest = &text[after_marker..];
        let body = rest.trim_start();

        if body.len() < rest.len() {
            if let Some(end) = body.find(FENCE) {
                return Some(body[..end].trim_end());
            }
        }

        search_from = after_marker;
    }

    None
}

/// Greedy span from the first `{` through the last `}`.
fn extract_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FEEDBACK_JSON: &str = r#"{
        "original_prompt": {
            "strengths": ["Short and focused"],
            "weaknesses": ["No audience", "No format"]
        },
        "llm_understanding_improvements": ["Explicit role"],
        "tips_for_future_prompts": ["State the audience"]
    }"#;

    fn expected_feedback() -> PromptFeedback {
        PromptFeedback {
            original_prompt: OriginalPromptAssessment {
                strengths: vec!["Short and focused".to_string()],
                weaknesses: vec!["No audience".to_string(), "No format".to_string()],
            },
            llm_understanding_improvements: vec!["Explicit role".to_string()],
            tips_for_future_prompts: vec!["State the audience".to_string()],
        }
    }

    mod fenced {
        use super::*;

        #[test]
        fn parses_fenced_block() {
            let text = format!("Here you go:\n```json\n{}\n```\nHope it helps.", FEEDBACK_JSON);
            let extractor = FeedbackExtractor::new();
            assert_eq!(
                extractor.locate(&text).map(|(source, _)| source),
                Some(CandidateSource::Fenced)
            );
            assert_eq!(extractor.extract(&text), Extraction::Found(expected_feedback()));
        }

        #[test]
        fn fence_requires_whitespace_after_marker() {
            // "```jsonish" is not a JSON fence, so the brace span is used
            let text = format!("```jsonish{}```", FEEDBACK_JSON);
            let extractor = FeedbackExtractor::new();
            assert_eq!(
                extractor.locate(&text).map(|(source, _)| source),
                Some(CandidateSource::BraceSpan)
            );
            assert!(extractor.extract(&text).is_found());
        }

        #[test]
        fn broken_fenced_json_is_parse_error_without_fallback() {
            let text = "```json\n{\"original_prompt\": {\"strengths\": [\"a\"\n```\n{}";
            let result = FeedbackExtractor::new().extract(text);
            assert!(matches!(result, Extraction::ParseError(_)), "{result:?}");
        }

        #[test]
        fn unclosed_fence_falls_back_to_brace_span() {
            let text = format!("```json\n{}", FEEDBACK_JSON);
            assert_eq!(
                FeedbackExtractor::new().extract(&text),
                Extraction::Found(expected_feedback())
            );
        }
    }

    mod bare {
        use super::*;

        #[test]
        fn parses_bare_object_with_surrounding_prose() {
            let text = format!("Sure! {} Let me know.", FEEDBACK_JSON);
            assert_eq!(
                FeedbackExtractor::new().extract(&text),
                Extraction::Found(expected_feedback())
            );
        }

        #[test]
        fn missing_sections_are_empty() {
            let result = FeedbackExtractor::new().extract(r#"{"tips_for_future_prompts": ["Be specific"]}"#);
            let feedback = result.found().unwrap();
            assert!(feedback.original_prompt.strengths.is_empty());
            assert!(feedback.llm_understanding_improvements.is_empty());
            assert_eq!(feedback.tips_for_future_prompts, vec!["Be specific"]);
        }

        #[test]
        fn null_sections_are_empty() {
            let result = FeedbackExtractor::new()
                .extract(r#"{"original_prompt": null, "tips_for_future_prompts": null}"#);
            assert!(result.found().unwrap().is_empty());
        }

        #[test]
        fn truncated_object_is_parse_error() {
            let text = r#"{"original_prompt": {"strengths": ["a"]}, "tips_for_future_prompts": [}"#;
            assert!(matches!(
                FeedbackExtractor::new().extract(text),
                Extraction::ParseError(_)
            ));
        }

        #[test]
        fn wrong_shape_is_parse_error() {
            let text = r#"{"tips_for_future_prompts": "just one string"}"#;
            assert!(matches!(
                FeedbackExtractor::new().extract(text),
                Extraction::ParseError(_)
            ));
        }

        #[test]
        fn greedy_span_covering_two_objects_is_parse_error() {
            let text = r#"first {"a": 1} then {"b": 2}"#;
            assert!(matches!(
                FeedbackExtractor::new().extract(text),
                Extraction::ParseError(_)
            ));
        }
    }

    mod not_found {
        use super::*;

        #[test]
        fn plain_prose_is_not_found() {
            assert_eq!(
                FeedbackExtractor::new().extract("I could not analyse that prompt."),
                Extraction::NotFound
            );
        }

        #[test]
        fn empty_text_is_not_found() {
            assert_eq!(FeedbackExtractor::new().extract(""), Extraction::NotFound);
        }

        #[test]
        fn closing_brace_before_opening_is_not_found() {
            assert_eq!(FeedbackExtractor::new().extract("} oops {"), Extraction::NotFound);
        }
    }

    mod control_characters {
        use super::*;

        #[test]
        fn outside_the_span_are_harmless() {
            let text = format!("\u{0007}Result:\u{0000} {} \u{001b}[0m", FEEDBACK_JSON);
            assert_eq!(
                FeedbackExtractor::new().extract(&text),
                Extraction::Found(expected_feedback())
            );
        }

        #[test]
        fn raw_control_inside_a_string_is_parse_error() {
            let text = "{\"tips_for_future_prompts\": [\"bad\u{0001}tip\"]}";
            assert!(matches!(
                FeedbackExtractor::new().extract(text),
                Extraction::ParseError(_)
            ));
        }

        #[test]
        fn del_and_c1_characters_are_kept() {
            let record = PromptFeedback {
                tips_for_future_prompts: vec!["keep\u{7f}this\u{85}text".to_string()],
                ..PromptFeedback::default()
            };
            let text = format!("```json\n{}\n```", serde_json::to_string(&record).unwrap());
            assert_eq!(FeedbackExtractor::new().extract(&text), Extraction::Found(record));
        }
    }

    fn items() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(
            "[a-zA-Z0-9 .,'!?{}\"\\\\éß漢\\x00-\\x1F\\x7F-\\x9F-]{0,40}",
            0..4,
        )
    }

    fn feedback() -> impl Strategy<Value = PromptFeedback> {
        (items(), items(), items(), items()).prop_map(|(strengths, weaknesses, improvements, tips)| {
            PromptFeedback {
                original_prompt: OriginalPromptAssessment {
                    strengths,
                    weaknesses,
                },
                llm_understanding_improvements: improvements,
                tips_for_future_prompts: tips,
            }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn fenced_rendering_extracts_back(record in feedback()) {
            let json = serde_json::to_string_pretty(&record).unwrap();
            let text = format!("Analysis below.\n```json\n{}\n```\n", json);
            prop_assert_eq!(FeedbackExtractor::new().extract(&text), Extraction::Found(record));
        }
    }
}
