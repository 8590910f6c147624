// file: src/summarizer/chunker.rs
// description: overlapping word-window chunking for long resume text
// reference: internal text processing

/// Splits text into windows of at most `chunk_size` words, each starting
/// `chunk_size - overlap` words after the previous one.
pub fn chunk_words(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }

    chunks
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(chunk_words("hello  world\n", 10, 2), vec!["hello world"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(chunk_words("", 10, 2).is_empty());
        assert!(chunk_words(" \n\t", 10, 2).is_empty());
    }

    #[test]
    fn test_windows_overlap() {
        let chunks = chunk_words(&numbered(25), 10, 2);

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].starts_with("w0 ") && chunks[0].ends_with(" w9"));
        assert!(chunks[1].starts_with("w8 ") && chunks[1].ends_with(" w17"));
        assert!(chunks[2].starts_with("w16 ") && chunks[2].ends_with(" w24"));
        for chunk in &chunks {
            assert!(word_count(chunk) <= 10);
        }
    }

    #[test]
    fn test_exact_fit_has_no_trailing_chunk() {
        assert_eq!(chunk_words(&numbered(10), 10, 2).len(), 1);
    }
}
