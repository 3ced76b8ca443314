//! Instruction prompts sent to language-model backends, one per analysis type.

use pdfsh_core::analysis::AnalysisType;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes documents.";

/// Characters of document text included in a request.
pub const MAX_INPUT_CHARS: usize = 8000;

pub fn instruction(analysis_type: AnalysisType) -> &'static str {
    match analysis_type {
        AnalysisType::Summary => {
            "Please provide a concise summary of the following text. \
             Focus on the main points and key information."
        }
        AnalysisType::Keywords => {
            "Extract the most important keywords and concepts from this text. \
             List them in order of importance."
        }
        AnalysisType::Entities => {
            "Identify and list all named entities in this text including:\n\
             - People names\n\
             - Organizations\n\
             - Locations\n\
             - Dates\n\
             - Technical terms"
        }
        AnalysisType::Comprehensive => {
            "Analyze this text and provide:\n\
             1. A brief summary (2-3 paragraphs)\n\
             2. Key topics and themes\n\
             3. Important entities (people, places, organizations)\n\
             4. Main conclusions or insights\n\
             5. Any action items or recommendations mentioned"
        }
        AnalysisType::Technical => {
            "Analyze this technical document and identify:\n\
             1. Technical concepts and terminology\n\
             2. Technologies mentioned\n\
             3. Architecture or design patterns\n\
             4. Best practices discussed\n\
             5. Potential issues or improvements"
        }
    }
}

/// The user turn: instruction followed by the (truncated) document text.
pub fn user_message(analysis_type: AnalysisType, text: &str) -> String {
    format!(
        "{}\n\nText to analyze:\n{}",
        instruction(analysis_type),
        truncate_chars(text, MAX_INPUT_CHARS)
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_type_has_an_instruction() {
        for analysis_type in AnalysisType::iter() {
            assert!(!instruction(analysis_type).is_empty());
        }
    }

    #[test]
    fn test_long_text_is_truncated_on_char_boundary() {
        let text = "é".repeat(MAX_INPUT_CHARS + 10);
        let message = user_message(AnalysisType::Summary, &text);
        let body = message.split("Text to analyze:\n").nth(1).unwrap();
        assert_eq!(body.chars().count(), MAX_INPUT_CHARS);
    }
}
