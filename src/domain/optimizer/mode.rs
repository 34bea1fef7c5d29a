//! Mode catalog.
//!
//! A mode is a named rewriting directive ("clarity", "creative", ...). The
//! catalog is built once at startup, either from the built-in table or from
//! a YAML file of `key: instruction` pairs, and is read-only afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// Key of the mode that enables the follow-up sub-flow.
pub const DEEP_RESEARCH: &str = "deep_research";

/// A validated mode: its key and the instruction that biases generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    key: String,
    instruction: String,
}

impl Mode {
    /// Creates a mode, rejecting blank keys or instructions.
    pub fn new(
        key: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let key = normalize_key(&key.into());
        let instruction = instruction.into();
        if key.is_empty() {
            return Err(ValidationError::blank("mode"));
        }
        if key.chars().any(char::is_whitespace) {
            return Err(ValidationError::rejected(
                "mode",
                format!("'{}' contains whitespace", key),
            ));
        }
        if instruction.trim().is_empty() {
            return Err(ValidationError::blank(format!("{}.instruction", key)));
        }
        Ok(Self { key, instruction })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Returns true if this mode enters the follow-up sub-flow.
    pub fn is_deep_research(&self) -> bool {
        self.key == DEEP_RESEARCH
    }
}

/// Errors that can occur while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read mode catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mode catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid mode: {0}")]
    Validation(#[from] ValidationError),

    #[error("Mode catalog is empty")]
    Empty,
}

/// Read-only map from mode key to [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeCatalog {
    modes: BTreeMap<String, Mode>,
}

impl ModeCatalog {
    /// Builds a catalog from `(key, instruction)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, CatalogError>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut modes = BTreeMap::new();
        for (key, instruction) in pairs {
            let mode = Mode::new(key, instruction)?;
            modes.insert(mode.key().to_string(), mode);
        }
        if modes.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { modes })
    }

    /// The catalog shipped with the assistant.
    pub fn builtin() -> Self {
        let modes = BUILTIN_MODES
            .iter()
            .map(|(key, instruction)| {
                let mode = Mode {
                    key: (*key).to_string(),
                    instruction: (*instruction).to_string(),
                };
                ((*key).to_string(), mode)
            })
            .collect();
        Self { modes }
    }

    /// Parses a YAML mapping of `key: instruction`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let pairs: BTreeMap<String, String> = serde_yaml::from_str(yaml)?;
        Self::from_pairs(pairs)
    }

    /// Reads and parses a YAML catalog file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Looks up a mode by user-entered text. Surrounding whitespace and case
    /// are ignored.
    pub fn lookup(&self, key: &str) -> Option<&Mode> {
        self.modes.get(&normalize_key(key))
    }

    /// Mode keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Default for ModeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

const BUILTIN_MODES: &[(&str, &str)] = &[
    (
        DEEP_RESEARCH,
        "The prompt will be used by a deep researching agent. Enhance it so the agent produces the best possible research report, covering each and every relevant detail.",
    ),
    (
        "clarity",
        "Rewrite the prompt so that the LLM will produce an extremely clear and unambiguous response. Eliminate vagueness, add specific details, and enforce a logical structure.",
    ),
    (
        "depth",
        "Rewrite the prompt to guide the LLM toward a thoughtful, multi-layered response. Encourage analysis, rationale, and contextual depth.",
    ),
    (
        "creative",
        "Rewrite the prompt so the LLM delivers a highly imaginative and expressive response. Encourage vivid examples, analogies, metaphors, and creative language.",
    ),
    (
        "technical",
        "Rewrite the prompt so that the LLM generates precise, technically accurate content using domain-specific terminology, clear step-by-step logic, and relevant technical context.",
    ),
    (
        "concise",
        "Rewrite the prompt to guide the LLM toward a brief, direct, and efficient response that retains clarity while reducing unnecessary verbosity.",
    ),
    (
        "structured",
        "Rewrite the prompt to instruct the LLM to format the response cleanly, using bullet points, markdown tables, hierarchical sections, and clear headings.",
    ),
    (
        "teaching",
        "Rewrite the prompt so that the LLM explains the topic progressively, with simple analogies, examples, and concepts tailored for a learning audience, including beginners.",
    ),
    (
        "executive_summary",
        "Rewrite the prompt to elicit a high-level summary optimized for decision-makers. Prioritize key takeaways, actionable insights, and strategic framing.",
    ),
    (
        "contrarian",
        "Rewrite the prompt to guide the LLM toward challenging conventional thinking. Encourage counterpoints, critique of assumptions, and alternative perspectives.",
    ),
    (
        "step_by_step",
        "Rewrite the prompt to instruct the LLM to break down the response into clear, ordered steps or phases, with detailed explanations for each.",
    ),
    (
        "journalistic",
        "Rewrite the prompt to elicit a response in the tone and structure of investigative or analytical journalism, including critical analysis, source-based reasoning, and consideration of bias.",
    ),
    (
        "socratic",
        "Rewrite the prompt to instruct the LLM to ask probing, thought-provoking questions instead of providing direct answers, encouraging reflective thinking from the user.",
    ),
    (
        "controversial",
        "Rewrite the prompt to provoke the most unconventional or polarizing response the LLM can generate. Push against mainstream assumptions while maintaining logical structure and factual support.",
    ),
    (
        "devil_advocate",
        "Rewrite the prompt to make the LLM take a strong opposing stance and play devil's advocate, arguing against popular opinion or the user's assumed position using logic and evidence.",
    ),
    (
        "debate_ready",
        "Rewrite the prompt so that the LLM structures its answer like a formal argument, clearly outlining opposing viewpoints, rebuttals, and a conclusion.",
    ),
    (
        "startup_pitch",
        "Rewrite the prompt to generate a polished, concise startup pitch. Include value proposition, problem and solution, market fit, and differentiation, in a persuasive tone.",
    ),
    (
        "real_world_applications",
        "Rewrite the prompt to guide the LLM toward output that maps theoretical ideas to real-world use cases, industries, or everyday scenarios.",
    ),
    (
        "personal_growth",
        "Rewrite the prompt so the LLM provides actionable advice, reflection prompts, and behavioral frameworks for improving mindset, habits, or emotional resilience.",
    ),
    (
        "marketing_landing_page",
        "Rewrite the prompt to produce marketing copy for a product or service landing page. Include headline, problem and solution framing, benefits, call to action, and testimonials if applicable.",
    ),
    (
        "socratic_reverse",
        "Rewrite the prompt to make the LLM ask a sequence of layered, increasingly specific questions back to the user in order to clarify the problem or uncover blind spots.",
    ),
    (
        "satirical",
        "Rewrite the prompt so that the LLM responds with sarcasm, exaggeration, or parody, in the style of satirical commentary on the topic.",
    ),
];
