use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use colored::Colorize;
use pdfsh_core::command::parser::quote;
use pdfsh_core::command::{CommandName, CompletionContext, CompletionIndex};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// rustyline helper providing completion, hints and command highlighting.
pub struct ShellHelper {
    index: CompletionIndex,
    working_dir: PathBuf,
}

impl ShellHelper {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            index: CompletionIndex::new(),
            working_dir: working_dir.into(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let request = self.index.request_at(line, pos, &self.working_dir);
        let candidates = self
            .index
            .complete(&request.partial, &request.context)
            .into_iter()
            .map(|candidate| Pair {
                replacement: replacement(&candidate, &request.context),
                display: candidate,
            })
            .collect();
        Ok((request.start, candidates))
    }
}

/// Text inserted for a candidate. File names are quoted so they stay one argument.
fn replacement(candidate: &str, context: &CompletionContext) -> String {
    match context {
        CompletionContext::CommandName => format!("{candidate} "),
        CompletionContext::Filename { .. } => quote(candidate),
        _ => candidate.to_string(),
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    /// Shows the rest of the command name when exactly one command matches.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(char::is_whitespace) {
            return None;
        }

        let matches = self.index.complete(line, &CompletionContext::CommandName);
        match matches.as_slice() {
            [only] if only.len() > line.len() => Some(only[line.len()..].to_string()),
            _ => None,
        }
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let trimmed = line.trim_start();
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let word = &trimmed[..end];
        if word.is_empty() || CommandName::lookup(word).is_none() {
            return Borrowed(line);
        }

        let indent = &line[..line.len() - trimmed.len()];
        Owned(format!("{indent}{}{}", word.bright_cyan(), &trimmed[end..]))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for ShellHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsh_core::command::tokenize;

    #[test]
    fn test_file_names_with_spaces_stay_one_argument() {
        let context = CompletionContext::Filename {
            dir: PathBuf::from("."),
        };
        let inserted = replacement("my report.pdf", &context);
        assert_eq!(inserted, "'my report.pdf'");

        let line = format!("open {inserted}");
        assert_eq!(tokenize(&line).unwrap(), vec!["open", "my report.pdf"]);
    }

    #[test]
    fn test_plain_candidates_are_unchanged() {
        let context = CompletionContext::Filename {
            dir: PathBuf::from("."),
        };
        assert_eq!(replacement("doc1.pdf", &context), "doc1.pdf");
        assert_eq!(replacement("summary", &CompletionContext::AnalysisType), "summary");
        assert_eq!(replacement("open", &CompletionContext::CommandName), "open ");
    }
}
