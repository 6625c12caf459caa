//! Parsing of the free-text recipe fields submitted by the client form.

use crate::error::TitleError;

/// Longest title the `recipes.title` column holds, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Splits a comma-separated ingredient list.
pub fn parse_ingredients(text: &str) -> Vec<String> {
    split_trimmed(text, ',')
}

/// Splits newline-separated steps.
pub fn parse_steps(text: &str) -> Vec<String> {
    split_trimmed(text, '\n')
}

/// Trims a title and checks it is non-empty and fits the column.
pub fn normalize_title(title: &str) -> Result<String, TitleError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TitleError::Empty);
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(TitleError::TooLong {
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

fn split_trimmed(text: &str, separator: char) -> Vec<String> {
    text.split(separator)
        .map(str::trim)
        // Blank entries (e.g. from "a,,b" or a trailing newline) are dropped, not stored as "".
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredients_trims() {
        assert_eq!(
            parse_ingredients(" flour, 2 eggs ,milk"),
            vec!["flour", "2 eggs", "milk"]
        );
    }

    #[test]
    fn test_parse_empty_is_empty() {
        assert!(parse_ingredients("").is_empty());
        assert!(parse_steps("").is_empty());
        assert!(parse_steps("   \n  ").is_empty());
    }

    #[test]
    fn test_parse_steps_handles_crlf() {
        assert_eq!(
            parse_steps("Boil water\r\nAdd pasta\r\n\r\nDrain\n"),
            vec!["Boil water", "Add pasta", "Drain"]
        );
    }

    #[test]
    fn test_steps_keep_commas() {
        assert_eq!(
            parse_steps("Mix flour, sugar, and salt"),
            vec!["Mix flour, sugar, and salt"]
        );
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Soup "), Ok("Soup".to_string()));
        assert_eq!(normalize_title("   "), Err(TitleError::Empty));
    }

    #[test]
    fn test_title_length_limit_counts_characters() {
        let longest = "é".repeat(MAX_TITLE_CHARS);
        assert_eq!(normalize_title(&format!(" {} ", longest)), Ok(longest));

        assert_eq!(
            normalize_title(&"a".repeat(MAX_TITLE_CHARS + 1)),
            Err(TitleError::TooLong {
                max: MAX_TITLE_CHARS
            })
        );
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        assert_eq!(parse_ingredients("a,,b, "), vec!["a", "b"]);
    }
}
