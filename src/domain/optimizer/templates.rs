//! Instruction templates sent to the generation capability.
//!
//! Three requests exist: the optimization itself, the deep-research
//! follow-up answers, and the self-critique ("explanation") of a rewrite.

use super::Mode;

/// Returns the system instruction for an optimization in `mode`.
///
/// Deep research gets a dedicated instruction aimed at research agents; every
/// other mode embeds its catalog instruction as the top priority.
pub fn optimization_system_prompt(mode: &Mode) -> String {
    if mode.is_deep_research() {
        DEEP_RESEARCH_SYSTEM.to_string()
    } else {
        GENERAL_SYSTEM.replace("{instruction}", mode.instruction())
    }
}

/// System instruction for the follow-up sub-flow. It replays the original
/// deep-research conversation.
pub fn followup_system_prompt() -> &'static str {
    DEEP_RESEARCH_SYSTEM
}

/// The user turn that asks for an optimization.
pub fn optimization_user_turn(raw_prompt: &str) -> String {
    format!("Optimise this: {}", raw_prompt)
}

/// The user turn that relays the downstream model's questions.
///
/// The preferences line is left out entirely when `preferences` is empty.
pub fn followup_user_turn(questions_asked: &str, preferences: &str) -> String {
    let mut turn = format!(
        "The model has asked the following questions:{}\n",
        questions_asked
    );
    if !preferences.is_empty() {
        turn.push_str(&format!("My preferences:{}\n", preferences));
    }
    turn.push_str(FOLLOWUP_CLOSING);
    turn
}

/// System instruction for the explanation request.
pub fn explanation_system_prompt() -> &'static str {
    EXPLAINER_SYSTEM
}

/// The user turn that asks the model to critique its own rewrite.
pub fn explanation_request(original_prompt: &str, mode: &Mode, optimized_prompt: &str) -> String {
    format!(
        r#"Act as a world-class prompt engineering expert.

Compare the following two prompts and return a structured analysis in **valid JSON format** using the schema below.

📌 Original Prompt:
"{original}"

🎯 Final Goal of optimized prompt:
"{goal}"

✨ Optimized Prompt:
"{optimized}"

Return exactly this JSON object structure:

{{
  "original_prompt": {{
    "strengths": ["..."],
    "weaknesses": ["..."]
  }},
  "llm_understanding_improvements": ["..."],
  "tips_for_future_prompts": ["..."]
}}

🧠 Section Guidance:
👍 Original Prompt Strengths
• State what the original prompt did well. Be generous but honest.

👎 Original Prompt Weaknesses
• Point out key missing elements or flaws in the original and their impact.

🧠 What LLMs Understand Better Now
• Explain how the refined prompt improves LLM comprehension: structure, role, clarity and specificity.

💡 Tips for Future Prompts
• Give practical suggestions to improve prompt writing skills.

⚠️ Important Instructions:
- Do NOT output anything other than the JSON object.
- Make sure the response is valid JSON and not a markdown code block."#,
        original = original_prompt,
        goal = mode.instruction(),
        optimized = optimized_prompt,
    )
}

// ============================================================================
// Templates
// ============================================================================

const DEEP_RESEARCH_SYSTEM: &str = r#"Act as a world-class prompt engineering expert.

Your task is to transform a raw, basic user query into a fully optimized, detailed, and highly effective prompt designed for use with deep researching agents from gemini or chatgpt.

🎯 Your optimized prompt must retain the original intent but dramatically expand its scope, specificity, and structure.

⚠️ CRITICAL INSTRUCTION: Do NOT output any commentary, apologies, or explanations. Output ONLY the **final refined prompt** as plain text."#;

const GENERAL_SYSTEM: &str = r#"Act as a world-class prompt engineering expert.

Your task is to transform a raw, basic user query into a fully optimized, detailed, and highly effective prompt designed for use with advanced LLMs.

🎯 Your optimized prompt must retain the original intent but dramatically expand its scope, specificity, and structure.

🧠 Apply the following techniques where appropriate:

1. **Role & Persona**: Assign an expert identity to the AI (e.g., "You are a veteran data scientist with 15 years of industry experience.")
2. **Context**: Add background info or assumptions to frame the task meaningfully.
3. **Audience**: Define who the output is intended for (e.g., beginner, developer, executive).
4. **Structure & Format**: Specify how the answer should be organized (e.g., "Use a three-part breakdown with bullets and a markdown table").
5. **Goals & Intent**: State what the user wants to achieve (e.g., "The goal is to create a step-by-step learning plan...").
6. **Key Elements**: Include concepts, examples, analogies, pitfalls, comparisons, and optional depth levels.
7. **Constraints**: Add exclusions if appropriate (e.g., "Do not include political commentary").

🎯 MOST IMPORTANT INSTRUCTION: **{instruction}**

⚠️ CRITICAL INSTRUCTION: Do NOT output any commentary, apologies, or explanations. Output ONLY the **final refined prompt** as plain text."#;

const FOLLOWUP_CLOSING: &str = "Please answer them generally\n⚠️ CRITICAL INSTRUCTION: Do NOT output any commentary, apologies, or explanations. Output ONLY the answers as plain text.";

const EXPLAINER_SYSTEM: &str = "You are a prompt engineer. You need to explain your own work.";
