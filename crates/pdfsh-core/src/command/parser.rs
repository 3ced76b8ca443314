//! Tokenizer for shell input lines.
//!
//! Words are separated by unquoted whitespace. Single and double quotes group
//! their contents into one word and may be juxtaposed with bare text
//! (`'a b'c` is the single word `a bc`). There are no escape characters: a
//! quote of the other kind inside a quoted section is literal.

use crate::error::ParseError;

/// A tokenized input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First word of the line, as typed
    pub name: String,
    /// Remaining words, quotes removed
    pub args: Vec<String>,
    /// Raw text after the command name, surrounding whitespace trimmed
    pub rest: String,
}

impl ParsedCommand {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

struct Token {
    text: String,
    end: usize,
}

/// Splits `line` into a command name and its arguments.
pub fn parse(line: &str) -> Result<ParsedCommand, ParseError> {
    let mut tokens = split(line)?.into_iter();
    let Some(first) = tokens.next() else {
        return Err(ParseError::Empty);
    };

    Ok(ParsedCommand {
        rest: line[first.end..].trim().to_string(),
        name: first.text,
        args: tokens.map(|t| t.text).collect(),
    })
}

/// Splits `line` into words.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let tokens = split(line)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(tokens.into_iter().map(|t| t.text).collect())
}

/// Joins words back into a line that [`tokenize`] splits into the same words.
pub fn join<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| quote(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quotes a single word if it needs it.
pub fn quote(word: &str) -> String {
    let needs_quoting =
        word.is_empty() || word.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"');
    if !needs_quoting {
        return word.to_string();
    }
    // Close the single-quoted run, emit the quote inside double quotes, reopen.
    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}

fn split(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut open_quote: Option<(char, usize)> = None;

    for (idx, ch) in line.char_indices() {
        match open_quote {
            Some((quote, _)) if ch == quote => open_quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    open_quote = Some((ch, idx));
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(Token {
                            text: std::mem::take(&mut current),
                            end: idx,
                        });
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if let Some((quote, start)) = open_quote {
        return Err(ParseError::UnterminatedQuote {
            quote,
            column: line[..start].chars().count() + 1,
        });
    }

    if in_token {
        tokens.push(Token {
            text: current,
            end: line.len(),
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_name_and_args() {
        let parsed = parse("  open   report.pdf ").unwrap();
        assert_eq!(parsed.name, "open");
        assert_eq!(parsed.args, vec!["report.pdf"]);
        assert_eq!(parsed.rest, "report.pdf");
    }

    #[test]
    fn test_quoted_arguments_are_single_words() {
        let parsed = parse(r#"compare "annual report.pdf" 'q3 notes.pdf'"#).unwrap();
        assert_eq!(parsed.args, vec!["annual report.pdf", "q3 notes.pdf"]);
    }

    #[test]
    fn test_rest_keeps_raw_text() {
        let parsed = parse("shell ls -la | grep 'x y'").unwrap();
        assert_eq!(parsed.name, "shell");
        assert_eq!(parsed.rest, "ls -la | grep 'x y'");
        assert_eq!(parsed.args, vec!["ls", "-la", "|", "grep", "x y"]);
    }

    #[test]
    fn test_adjacent_quotes_join_words() {
        assert_eq!(tokenize(r#"a'b c'"d"e"#).unwrap(), vec!["ab cde"]);
        assert_eq!(tokenize(r#"say "it's""#).unwrap(), vec!["say", "it's"]);
        assert_eq!(tokenize("x '' y").unwrap(), vec!["x", "", "y"]);
    }

    #[test]
    fn test_empty_and_whitespace_lines_fail() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse(" \t "), Err(ParseError::Empty));
        assert_eq!(tokenize("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_unterminated_quote_fails() {
        assert_eq!(
            parse(r#"open "half.pdf"#),
            Err(ParseError::UnterminatedQuote {
                quote: '"',
                column: 6
            })
        );
        assert!(matches!(
            tokenize("echo 'oops"),
            Err(ParseError::UnterminatedQuote { quote: '\'', .. })
        ));
    }

    #[test]
    fn test_unknown_commands_are_still_tokenized() {
        let parsed = parse("frobnicate now").unwrap();
        assert_eq!(parsed.name, "frobnicate");
    }

    #[test]
    fn test_join_then_tokenize_is_identity() {
        let inputs = [
            r#"open "my file.pdf""#,
            r#"shell echo 'it'"'"'s' "say hi""#,
            "compare '' ' lead' 'trail '",
            r#"a'b'"c d" 'x"y' "p'q""#,
            "plain words only",
        ];

        for input in inputs {
            let first = tokenize(input).unwrap();
            let rejoined = join(&first);
            let second = tokenize(&rejoined).unwrap();
            assert_eq!(first, second, "round trip of {input:?} via {rejoined:?}");
        }
    }
}
