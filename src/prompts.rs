//! Fixed prompts for the two analysis modes.
//!
//! Every persona and instruction template lives here so the dispatcher in
//! [`crate::analysis`] stays free of prompt text and unit tests can inspect
//! exactly what is sent. The user-facing instructions are in Turkish, the
//! working language of the audit team; the personas only pin the language
//! of the answer, which is configurable.

/// Persona for summarize-and-recommend.
///
/// `{language}` is replaced with [`crate::AssistantConfig::response_language`].
pub const AUDITOR_PERSONA: &str = "You are a Quality Assurance Director with 15 years of experience, \
a Six Sigma Master Black Belt, and an ISO 9001 Lead Auditor. \
Provide concise, data-driven, and actionable recommendations in {language}.";

/// Persona for question answering.
pub const ASSISTANT_PERSONA: &str = "You are a helpful assistant. Answer in {language}.";

/// Three-part deliverable requested for every summary. The report text is
/// appended directly after it.
pub const SUMMARY_INSTRUCTIONS: &str = "Aşağıdaki haftalık denetim raporunu incele ve:\n\
1) 3 maddede kısa özet\n\
2) 2 kritik problem\n\
3) 3 aksiyon önerisi\n\n";

/// System message for summarize-and-recommend.
pub fn auditor_system_prompt(language: &str) -> String {
    AUDITOR_PERSONA.replace("{language}", language)
}

/// System message for question answering.
pub fn assistant_system_prompt(language: &str) -> String {
    ASSISTANT_PERSONA.replace("{language}", language)
}

/// User message for summarize-and-recommend.
pub fn summary_user_prompt(report: &str) -> String {
    let mut prompt = String::with_capacity(SUMMARY_INSTRUCTIONS.len() + report.len());
    prompt.push_str(SUMMARY_INSTRUCTIONS);
    prompt.push_str(report);
    prompt
}

/// User message for question answering.
pub fn question_user_prompt(report: &str, question: &str) -> String {
    format!("Rapor:\n\n{report}\n\nSORU: {question}")
}
