//! Line tokenizer shared by the OBJ and MTL parsers

/// Split a line into its whitespace-separated tokens
///
/// There is no quoting or escaping: every run of non-whitespace characters is a token.
/// An empty or blank line yields an empty vector, which callers skip.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_mixed_whitespace() {
        assert_eq!(tokenize("f 1/2/3\t4/5/6   7/8/9\r"), vec!["f", "1/2/3", "4/5/6", "7/8/9"]);
    }

    #[test]
    fn test_blank_lines_are_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t \r\n").is_empty());
    }

    #[test]
    fn test_no_quoting() {
        assert_eq!(tokenize("map_Kd \"my file.png\""), vec!["map_Kd", "\"my", "file.png\""]);
    }
}
