/// Split a command line into argument tokens.
///
/// Whitespace separates tokens except inside single or double quotes. Quotes
/// are removed and an unclosed quote runs to the end of the line. An empty
/// quoted pair is an empty token.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_whitespace() {
        assert_eq!(split_command_line("  chat hi   t:e@1 "), vec!["chat", "hi", "t:e@1"]);
    }

    #[test]
    fn test_quotes_group_words() {
        assert_eq!(
            split_command_line(r#"chat "Hello there, friend" range:3"#),
            vec!["chat", "Hello there, friend", "range:3"]
        );
        assert_eq!(
            split_command_line("narrate 'it''s fine'"),
            vec!["narrate", "its fine"]
        );
    }

    #[test]
    fn test_empty_quotes_and_unclosed_quotes() {
        assert_eq!(split_command_line(r#"chat """#), vec!["chat", ""]);
        assert_eq!(split_command_line(r#"chat "never closed"#), vec!["chat", "never closed"]);
        assert!(split_command_line("   ").is_empty());
    }
}
