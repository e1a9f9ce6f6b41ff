//! Chunking: split extracted document text into overlapping windows.
//!
//! ## Why overlap?
//!
//! A record that straddles a window boundary would be half-visible to both
//! neighbouring chunks and extracted by neither. Overlapping consecutive
//! windows by a few hundred characters gives every boundary-straddling record
//! one window that sees it whole. The cost is that the model may report the
//! same record twice; the aggregator does not deduplicate, since dedup policy
//! belongs to the caller, not the pipeline.
//!
//! Windows are measured in *characters*, not bytes, so multi-byte text never
//! splits inside a code point.

use crate::error::Doc2TableError;

/// One contiguous window of the document text, tagged with its ordinal
/// position among its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-indexed position in the chunk sequence.
    pub index: usize,
    /// The window's text. Every chunk except the last is exactly `size`
    /// characters; the last may be shorter.
    pub text: String,
}

/// Split `text` into overlapping windows of at most `size` characters, with
/// consecutive windows sharing `overlap` characters.
///
/// The cursor starts at 0; each step emits `[cursor, cursor + size)` clamped
/// to the text length, then advances by `size - overlap`. The loop stops once
/// a window reaches the end of the text, so the advance is always strictly
/// positive and every character is covered by at least one window.
///
/// Edge cases:
/// * empty `text` → exactly one empty chunk (downstream always expects at
///   least one unit of work, never an empty sequence)
/// * `size >= text.chars().count()` → exactly one chunk equal to the text
/// * `overlap >= size` or `size == 0` → `InvalidConfig` (the cursor would
///   stall and the loop would never terminate)
///
/// The output is deterministic for identical inputs.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>, Doc2TableError> {
    if size == 0 {
        return Err(Doc2TableError::InvalidConfig(
            "chunk size must be ≥ 1".into(),
        ));
    }
    if overlap >= size {
        return Err(Doc2TableError::InvalidConfig(format!(
            "chunk overlap ({overlap}) must be smaller than chunk size ({size})"
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut cursor = 0usize;

    loop {
        let end = (cursor + size).min(chars.len());
        chunks.push(Chunk {
            index: chunks.len(),
            text: chars[cursor..end].iter().collect(),
        });
        if end == chars.len() {
            break;
        }
        cursor = end - overlap;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reassemble the original text by dropping each non-first chunk's
    /// leading `overlap` characters.
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for chunk in chunks {
            if chunk.index == 0 {
                out.push_str(&chunk.text);
            } else {
                out.extend(chunk.text.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn empty_text_yields_one_empty_chunk() {
        let chunks = chunk_text("", 8000, 500).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "");
    }

    #[test]
    fn text_smaller_than_size_yields_one_chunk() {
        let chunks = chunk_text("short document", 8000, 500).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short document");
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        let err = chunk_text("abc", 10, 10).unwrap_err();
        assert!(matches!(err, Doc2TableError::InvalidConfig(_)));
    }

    #[test]
    fn overlap_greater_than_size_is_rejected() {
        let err = chunk_text("abc", 10, 20).unwrap_err();
        assert!(matches!(err, Doc2TableError::InvalidConfig(_)));
    }

    #[test]
    fn zero_size_is_rejected() {
        let err = chunk_text("abc", 0, 0).unwrap_err();
        assert!(matches!(err, Doc2TableError::InvalidConfig(_)));
    }

    #[test]
    fn twenty_thousand_chars_at_default_geometry_is_three_chunks() {
        // 0..8000, 7500..15500, 15000..20000 — the end-to-end property
        // the whole pipeline depends on.
        let text = "x".repeat(20_000);
        let chunks = chunk_text(&text, 8000, 500).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text.chars().count(), 8000);
        assert_eq!(chunks[1].text.chars().count(), 8000);
        assert_eq!(chunks[2].text.chars().count(), 5000);
    }

    #[test]
    fn indices_are_sequential() {
        let text = "a".repeat(100);
        let chunks = chunk_text(&text, 30, 5).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn reconstruction_covers_every_character() {
        // Distinct characters so a dropped or duplicated region is visible.
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        for (size, overlap) in [(100, 0), (100, 30), (100, 99), (7, 3), (1000, 250)] {
            let chunks = chunk_text(&text, size, overlap).unwrap();
            assert!(!chunks.is_empty());
            assert_eq!(
                reconstruct(&chunks, overlap),
                text,
                "size={size} overlap={overlap}"
            );
        }
    }

    #[test]
    fn windows_split_on_char_boundaries() {
        // 3-byte characters; byte-based slicing would panic mid code point.
        let text = "€".repeat(50);
        let chunks = chunk_text(&text, 20, 5).unwrap();
        assert_eq!(reconstruct(&chunks, 5), text);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.text.chars().count(), 20);
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "the quick brown fox ".repeat(100);
        let a = chunk_text(&text, 64, 16).unwrap();
        let b = chunk_text(&text, 64, 16).unwrap();
        assert_eq!(a, b);
    }
}
