/// Number of whitespace separated words in `text`. Blank text counts zero.
pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("Hello"), 1);
        assert_eq!(word_count("  two\twords\n"), 2);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }
}
