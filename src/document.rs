use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

/// Extract the text content of a PDF
pub fn extract_text(path: &Path) -> Result<String> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| anyhow!("failed to extract text from {}: {}", path.display(), e))?;

    if text.trim().is_empty() {
        return Err(anyhow!("no text content in {}", path.display()));
    }

    info!(path = %path.display(), chars = text.len(), "extracted PDF text");
    Ok(text)
}

/// Split text into overlapping windows on whitespace boundaries.
///
/// Each chunk is at most `chunk_size` characters (unless a single word is
/// longer than that), and consecutive chunks share up to `overlap` trailing
/// characters so sentences cut at a boundary stay retrievable.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    // A carry as large as the window would never leave room for new words
    let overlap = overlap.min(chunk_size.saturating_sub(1));

    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > chunk_size {
            let carry = overlap_tail(&current, overlap);
            chunks.push(std::mem::take(&mut current));
            // Only seed the next window with the carry if the word still fits
            if carry.len() + word.len() + 1 <= chunk_size {
                current = carry;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Last whole words of a chunk, up to `overlap` characters
fn overlap_tail(chunk: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }

    let mut tail: Vec<&str> = Vec::new();
    let mut len = 0;
    for word in chunk.split_whitespace().rev() {
        let added = word.len() + usize::from(!tail.is_empty());
        if len + added > overlap {
            break;
        }
        tail.push(word);
        len += added;
    }

    tail.reverse();
    tail.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("a short paragraph of text", 100, 10);
        assert_eq!(chunks, vec!["a short paragraph of text"]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunk_text("", 100, 10).is_empty());
        assert!(chunk_text("   \n\t ", 100, 10).is_empty());
    }

    #[test]
    fn test_chunks_respect_size_bound() {
        let text = "word ".repeat(500);
        let chunks = chunk_text(&text, 60, 10);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 60, "chunk too long: {}", chunk.len());
            assert!(!chunk.trim().is_empty());
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let words: Vec<String> = (0..100).map(|i| format!("w{:03}", i)).collect();
        let text = words.join(" ");
        let chunks = chunk_text(&text, 50, 12);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(tail_word),
                "chunk {:?} does not carry the tail of {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_all_words_are_covered_in_order() {
        let words: Vec<String> = (0..200).map(|i| format!("t{}", i)).collect();
        let text = words.join(" ");
        let chunks = chunk_text(&text, 40, 8);

        // Every word appears, and first occurrences are in order
        let joined = chunks.join(" ");
        let mut last_pos = 0;
        for word in &words {
            let pos = joined[last_pos..]
                .find(word.as_str())
                .unwrap_or_else(|| panic!("word {} missing or out of order", word));
            last_pos += pos;
        }
    }

    #[test]
    fn test_near_size_word_after_boundary_stays_within_bound() {
        // A word shorter than the window but longer than window minus
        // overlap must not ride on top of the carry
        let chunks = chunk_text("aaa bb cccccccccccccccccc", 20, 5);

        for chunk in &chunks {
            assert!(chunk.len() <= 20, "chunk too long ({}): {:?}", chunk.len(), chunk);
        }
        assert!(chunks.iter().any(|c| c.contains("cccccccccccccccccc")));
    }

    #[test]
    fn test_overlap_larger_than_chunk_size_is_clamped() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_text(text, 10, 50);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.len() <= 10, "chunk too long ({}): {:?}", chunk.len(), chunk);
        }
        assert!(chunks.last().unwrap().contains("ten"));
    }

    #[test]
    fn test_oversized_word_still_chunked() {
        let text = format!("{} tail", "x".repeat(80));
        let chunks = chunk_text(&text, 20, 5);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("xxx"));
        assert!(chunks[1].ends_with("tail"));
    }
}
