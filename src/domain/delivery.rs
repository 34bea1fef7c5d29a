//! Delivery strategy selection.
//!
//! Chat platforms cap the size of a single message. A generated result is
//! sent inline when it fits, as a run of fixed-size messages when it is
//! moderately long, and as a text attachment beyond that.

use crate::domain::foundation::ValidationError;

/// Maximum characters in one inline message.
pub const INLINE_LIMIT: usize = 4000;

/// Maximum number of messages a chunked delivery may use.
pub const MAX_CHUNKS: usize = 5;

/// Filename used for attachments.
pub const DEFAULT_ATTACHMENT_FILENAME: &str = "response.txt";

/// How a text result is handed to the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// One message containing the full text.
    Inline(String),
    /// Consecutive messages whose concatenation is the full text.
    Chunked(Vec<String>),
    /// A single file attachment with the full text as content.
    AttachedFile { content: String, filename: String },
}

impl Delivery {
    /// Number of transport calls this delivery needs.
    pub fn message_count(&self) -> usize {
        match self {
            Delivery::Inline(_) | Delivery::AttachedFile { .. } => 1,
            Delivery::Chunked(chunks) => chunks.len(),
        }
    }
}

/// Length thresholds for choosing a [`Delivery`].
///
/// Lengths are counted in characters (Unicode scalar values), never bytes,
/// so chunk boundaries never split a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPolicy {
    inline_limit: usize,
    max_chunks: usize,
    attachment_filename: String,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            inline_limit: INLINE_LIMIT,
            max_chunks: MAX_CHUNKS,
            attachment_filename: DEFAULT_ATTACHMENT_FILENAME.to_string(),
        }
    }
}

impl DeliveryPolicy {
    /// Creates a policy with custom thresholds.
    pub fn new(
        inline_limit: usize,
        max_chunks: usize,
        attachment_filename: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let attachment_filename = attachment_filename.into();
        if inline_limit == 0 {
            return Err(ValidationError::rejected("inline_limit", "must be greater than zero"));
        }
        if max_chunks == 0 {
            return Err(ValidationError::rejected("max_chunks", "must be greater than zero"));
        }
        if attachment_filename.trim().is_empty() {
            return Err(ValidationError::blank("attachment_filename"));
        }
        Ok(Self {
            inline_limit,
            max_chunks,
            attachment_filename,
        })
    }

    pub fn inline_limit(&self) -> usize {
        self.inline_limit
    }

    /// Longest text that is still delivered as chunks.
    pub fn chunked_limit(&self) -> usize {
        self.inline_limit.saturating_mul(self.max_chunks)
    }

    pub fn attachment_filename(&self) -> &str {
        &self.attachment_filename
    }

    /// Chooses how to deliver `text`. Total over all inputs.
    pub fn select(&self, text: &str) -> Delivery {
        let length = text.chars().count();

        if length <= self.inline_limit {
            Delivery::Inline(text.to_string())
        } else if length <= self.chunked_limit() {
            Delivery::Chunked(split_fixed(text, self.inline_limit))
        } else {
            Delivery::AttachedFile {
                content: text.to_string(),
                filename: self.attachment_filename.clone(),
            }
        }
    }
}

/// Splits text into consecutive windows of `width` characters; only the
/// last window may be shorter.
fn split_fixed(text: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == width {
            chunks.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(text[start..].to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text_of(len: usize) -> String {
        "abcdefghij".chars().cycle().take(len).collect()
    }

    mod select {
        use super::*;

        #[test]
        fn empty_text_is_inline() {
            assert_eq!(DeliveryPolicy::default().select(""), Delivery::Inline(String::new()));
        }

        #[test]
        fn text_at_limit_is_inline() {
            let text = text_of(4000);
            assert_eq!(DeliveryPolicy::default().select(&text), Delivery::Inline(text));
        }

        #[test]
        fn one_past_limit_is_two_chunks() {
            let text = text_of(4001);
            match DeliveryPolicy::default().select(&text) {
                Delivery::Chunked(chunks) => {
                    assert_eq!(chunks.len(), 2);
                    assert_eq!(chunks[0].chars().count(), 4000);
                    assert_eq!(chunks[1].chars().count(), 1);
                }
                other => panic!("Expected Chunked, got {:?}", other),
            }
        }

        #[test]
        fn text_at_chunked_limit_is_five_chunks() {
            let text = text_of(20000);
            match DeliveryPolicy::default().select(&text) {
                Delivery::Chunked(chunks) => assert_eq!(chunks.len(), 5),
                other => panic!("Expected Chunked, got {:?}", other),
            }
        }

        #[test]
        fn one_past_chunked_limit_is_attachment() {
            let text = text_of(20001);
            assert_eq!(
                DeliveryPolicy::default().select(&text),
                Delivery::AttachedFile {
                    content: text,
                    filename: "response.txt".to_string(),
                }
            );
        }

        #[test]
        fn length_counts_characters_not_bytes() {
            // 4000 two-byte characters is 8000 bytes but still inline
            let text: String = std::iter::repeat('é').take(4000).collect();
            assert!(matches!(DeliveryPolicy::default().select(&text), Delivery::Inline(_)));
        }

        #[test]
        fn chunks_never_split_multibyte_characters() {
            let text: String = std::iter::repeat("日本").take(2500).collect();
            match DeliveryPolicy::default().select(&text) {
                Delivery::Chunked(chunks) => {
                    assert_eq!(chunks.len(), 2);
                    assert_eq!(chunks.concat(), text);
                }
                other => panic!("Expected Chunked, got {:?}", other),
            }
        }

        #[test]
        fn custom_policy_uses_its_own_thresholds() {
            let policy = DeliveryPolicy::new(3, 2, "out.md").unwrap();
            assert_eq!(policy.select("abc"), Delivery::Inline("abc".to_string()));
            assert_eq!(
                policy.select("abcdef"),
                Delivery::Chunked(vec!["abc".to_string(), "def".to_string()])
            );
            assert_eq!(
                policy.select("abcdefg"),
                Delivery::AttachedFile {
                    content: "abcdefg".to_string(),
                    filename: "out.md".to_string(),
                }
            );
        }
    }

    mod policy {
        use super::*;

        #[test]
        fn rejects_zero_inline_limit() {
            assert!(DeliveryPolicy::new(0, 5, "response.txt").is_err());
        }

        #[test]
        fn rejects_zero_chunks() {
            assert!(DeliveryPolicy::new(4000, 0, "response.txt").is_err());
        }

        #[test]
        fn rejects_blank_filename() {
            assert!(DeliveryPolicy::new(4000, 5, " ").is_err());
        }

        #[test]
        fn message_count_reflects_shape() {
            assert_eq!(Delivery::Inline("x".into()).message_count(), 1);
            assert_eq!(
                Delivery::Chunked(vec!["a".into(), "b".into(), "c".into()]).message_count(),
                3
            );
        }
    }

    fn text_with_len(range: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = String> {
        proptest::collection::vec(any::<char>(), range).prop_map(String::from_iter)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn short_text_is_inline_unchanged(text in text_with_len(0..=4000)) {
            prop_assert_eq!(DeliveryPolicy::default().select(&text), Delivery::Inline(text));
        }

        #[test]
        fn medium_text_chunks_reassemble_exactly(text in text_with_len(4001..=20000)) {
            let length = text.chars().count();
            match DeliveryPolicy::default().select(&text) {
                Delivery::Chunked(chunks) => {
                    prop_assert_eq!(chunks.len(), (length + 3999) / 4000);
                    prop_assert!(chunks.iter().all(|c| c.chars().count() <= 4000));
                    prop_assert_eq!(chunks.concat(), text);
                }
                other => prop_assert!(false, "Expected Chunked, got {:?}", other),
            }
        }

        #[test]
        fn long_text_is_attached_unchanged(text in text_with_len(20001..=24000)) {
            match DeliveryPolicy::default().select(&text) {
                Delivery::AttachedFile { content, .. } => prop_assert_eq!(content, text),
                other => prop_assert!(false, "Expected AttachedFile, got {:?}", other),
            }
        }
    }
}
