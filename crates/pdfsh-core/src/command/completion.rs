//! Autocomplete index for the interactive editor.

use std::path::{Path, PathBuf};

use crate::analysis::AnalysisType;
use crate::command::builtin::{CommandName, command_names, find_builtin_command};

/// What kind of token is being completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// The first word of the line
    CommandName,
    /// A file argument; candidates are PDF files under the given directory
    Filename { dir: PathBuf },
    /// The argument of `analyze`
    AnalysisType,
    /// An argument that has no completions
    Nothing,
}

/// A completion request derived from the line being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Byte offset where the partial token starts
    pub start: usize,
    pub partial: String,
    pub context: CompletionContext,
}

/// Candidate source for tab completion.
#[derive(Debug, Clone)]
pub struct CompletionIndex {
    commands: Vec<&'static str>,
    analysis_types: Vec<&'static str>,
}

impl Default for CompletionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionIndex {
    pub fn new() -> Self {
        let mut analysis_types = AnalysisType::names();
        analysis_types.sort_unstable();
        Self {
            commands: command_names(),
            analysis_types,
        }
    }

    /// Candidates starting with `partial`, sorted ascending. Matching is
    /// case-sensitive; no match yields an empty list.
    pub fn complete(&self, partial: &str, context: &CompletionContext) -> Vec<String> {
        match context {
            CompletionContext::CommandName => prefixed(&self.commands, partial),
            CompletionContext::AnalysisType => prefixed(&self.analysis_types, partial),
            CompletionContext::Filename { dir } => pdf_candidates(dir, partial),
            CompletionContext::Nothing => Vec::new(),
        }
    }

    /// Works out what is being completed at byte offset `pos` of `line`.
    ///
    /// Relative file names are resolved against `cwd`.
    pub fn request_at(&self, line: &str, pos: usize, cwd: &Path) -> CompletionRequest {
        let before = &line[..pos];
        let trimmed = before.trim_start();
        let offset = before.len() - trimmed.len();

        let Some(split) = trimmed.find(char::is_whitespace) else {
            return CompletionRequest {
                start: offset,
                partial: trimmed.to_string(),
                context: CompletionContext::CommandName,
            };
        };

        let command_word = &trimmed[..split];
        let partial_start = before
            .rfind(char::is_whitespace)
            .map(|idx| idx + before[idx..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let partial = before[partial_start..].to_string();

        let context = match CommandName::lookup(command_word) {
            Some(CommandName::Analyze) => CompletionContext::AnalysisType,
            Some(name) if find_builtin_command(name).takes_path() => CompletionContext::Filename {
                dir: cwd.to_path_buf(),
            },
            _ => CompletionContext::Nothing,
        };

        CompletionRequest {
            start: partial_start,
            partial,
            context,
        }
    }
}

fn prefixed(candidates: &[&'static str], partial: &str) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.starts_with(partial))
        .map(|c| c.to_string())
        .collect()
}

/// PDF files matching `partial`, which may contain a directory prefix.
fn pdf_candidates(dir: &Path, partial: &str) -> Vec<String> {
    let (prefix, stem) = match partial.rfind('/') {
        Some(idx) => partial.split_at(idx + 1),
        None => ("", partial),
    };
    let search_dir = if prefix.is_empty() {
        dir.to_path_buf()
    } else {
        dir.join(prefix)
    };

    let Ok(entries) = std::fs::read_dir(&search_dir) else {
        return Vec::new();
    };

    let mut candidates: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_pdf_name(name) && name.starts_with(stem))
        .map(|name| format!("{prefix}{name}"))
        .collect();
    candidates.sort();
    candidates
}

/// Whether `name` has a `.pdf` extension, in any case.
pub fn is_pdf_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_candidates_are_sorted_subset_of_table() {
        let index = CompletionIndex::new();
        let table = command_names();

        for partial in ["", "c", "s", "co", "e", "x", "S"] {
            let candidates = index.complete(partial, &CompletionContext::CommandName);
            assert!(candidates.windows(2).all(|w| w[0] <= w[1]));
            assert!(candidates.iter().all(|c| table.contains(&c.as_str())));
        }

        assert_eq!(
            index.complete("co", &CompletionContext::CommandName),
            vec!["compare", "comprehensive"]
        );
        assert_eq!(
            index.complete("s", &CompletionContext::CommandName),
            vec!["save", "sheets", "shell", "summary"]
        );
        assert!(index.complete("S", &CompletionContext::CommandName).is_empty());
        assert!(index.complete("zz", &CompletionContext::CommandName).is_empty());
    }

    #[test]
    fn test_filename_candidates_filter_pdfs() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.pdf", "notes.txt", "UPPER.PDF", "archive.pdf.bak"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();
        let context = CompletionContext::Filename {
            dir: dir.path().to_path_buf(),
        };
        let index = CompletionIndex::new();

        assert_eq!(index.complete("", &context), vec!["UPPER.PDF", "a.pdf", "b.pdf"]);
        assert_eq!(index.complete("a", &context), vec!["a.pdf"]);
        assert!(index.complete("u", &context).is_empty());
    }

    #[test]
    fn test_filename_candidates_in_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/report.pdf"), "x").unwrap();
        let context = CompletionContext::Filename {
            dir: dir.path().to_path_buf(),
        };

        assert_eq!(
            CompletionIndex::new().complete("docs/r", &context),
            vec!["docs/report.pdf"]
        );
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let context = CompletionContext::Filename {
            dir: PathBuf::from("/definitely/not/here"),
        };
        assert!(CompletionIndex::new().complete("", &context).is_empty());
    }

    #[test]
    fn test_request_at_detects_context() {
        let index = CompletionIndex::new();
        let cwd = Path::new("/work");

        let req = index.request_at("  ope", 5, cwd);
        assert_eq!(req.start, 2);
        assert_eq!(req.partial, "ope");
        assert_eq!(req.context, CompletionContext::CommandName);

        let req = index.request_at("open rep", 8, cwd);
        assert_eq!(req.start, 5);
        assert_eq!(req.partial, "rep");
        assert_eq!(
            req.context,
            CompletionContext::Filename {
                dir: PathBuf::from("/work")
            }
        );

        let req = index.request_at("analyze su", 10, cwd);
        assert_eq!(req.context, CompletionContext::AnalysisType);
        assert_eq!(index.complete(&req.partial, &req.context), vec!["summary"]);

        let req = index.request_at("help me", 7, cwd);
        assert_eq!(req.context, CompletionContext::Nothing);
    }
}
