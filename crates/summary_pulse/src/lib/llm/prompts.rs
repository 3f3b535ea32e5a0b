//! Prompt texts for every completion the crate issues

pub const ANALYSIS_SYSTEM: &str = include_str!("./prompts/analysis_system.txt");
pub const SUMMARY_SYSTEM: &str = include_str!("./prompts/summary_system.txt");
pub const REFINE_SYSTEM: &str = include_str!("./prompts/refine_system.txt");
const QUESTION_SYSTEM: &str = include_str!("./prompts/question_system.txt");

pub fn analysis_user(transcript_text: &str) -> String {
    format!("Analyse the following transcript:\n\n{transcript_text}")
}

pub fn summary_user(transcript_text: &str) -> String {
    format!("Summarise the following transcript:\n\n{transcript_text}")
}

pub fn refine_user(draft: &str) -> String {
    format!("Edit the following summary:\n\n{draft}")
}

pub fn question_system(context_label: &str) -> String {
    QUESTION_SYSTEM.replace("{context}", context_label)
}

pub fn question_user(context_label: &str, context: &str, question: &str) -> String {
    format!("Answer the question about the following {context_label}:\n\n{context}\n\nQuestion: {question}")
}
