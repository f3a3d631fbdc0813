//! Overlapping-window text splitter.
//!
//! Splits extracted document text into retrieval chunks of at most
//! `CHUNK_SIZE` characters with `CHUNK_OVERLAP` characters carried over
//! between consecutive chunks, preserving order. Window edges prefer
//! paragraph, line, sentence, then word boundaries.

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

pub const CHUNK_SIZE: usize = 1500;
pub const CHUNK_OVERLAP: usize = 150;

const BREAKS: [&str; 4] = ["\n\n", "\n", ". ", " "];

fn prev_char_boundary(text: &str, mut pos: usize) -> usize {
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Pick a cut point at or before `end`, preferring natural boundaries in
/// the back half of the window so chunks stay close to full size.
fn find_cut(text: &str, start: usize, end: usize) -> usize {
    let window = &text[start..end];
    let min_cut = window.len() / 2;

    for brk in BREAKS {
        if let Some(pos) = window.rfind(brk) {
            if pos > min_cut {
                return start + pos + brk.len();
            }
        }
    }
    end
}

pub fn split_text(text: &str, max_chars: usize, overlap: usize) -> Vec<Chunk> {
    debug_assert!(overlap < max_chars);

    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < text.len() {
        let mut end = prev_char_boundary(text, (start + max_chars).min(text.len()));
        if end < text.len() {
            end = find_cut(text, start, end);
        }

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            chunks.push(Chunk {
                index,
                text: piece.to_string(),
            });
            index += 1;
        }

        if end >= text.len() {
            break;
        }

        // Step back so consecutive windows share `overlap` characters.
        // The next start must still advance past the previous one.
        let next = prev_char_boundary(text, end.saturating_sub(overlap));
        start = if next > start { next } else { end };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_text("", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
        assert!(split_text("   \n  ", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_text("A short lesson.", CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "A short lesson.");
    }

    #[test]
    fn chunks_respect_max_size_and_order() {
        let text: String = (0..500).map(|i| format!("word{} ", i)).collect();
        let chunks = split_text(&text, 100, 20);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(chunk.text.len() <= 100);
        }
    }

    #[test]
    fn every_word_lands_in_some_chunk() {
        let text: String = (0..300).map(|i| format!("tok{} ", i)).collect();
        let chunks = split_text(&text, 120, 30);
        for i in 0..300 {
            let needle = format!("tok{}", i);
            assert!(
                chunks.iter().any(|c| c.text.contains(&needle)),
                "missing {}",
                needle
            );
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text: String = (0..400).map(|i| format!("item{} ", i)).collect();
        let chunks = split_text(&text, 150, 40);
        for pair in chunks.windows(2) {
            let head: String = pair[1].text.chars().take(6).collect();
            assert!(
                pair[0].text.contains(head.trim()),
                "no shared text between chunk {} and {}",
                pair[0].index,
                pair[1].index
            );
        }
    }

    #[test]
    fn paragraph_boundaries_are_preferred() {
        let text = format!("{}\n\n{}", "a".repeat(80), "b".repeat(80));
        let chunks = split_text(&text, 100, 10);
        assert!(chunks[0].text.chars().all(|c| c == 'a'));
    }

    #[test]
    fn multibyte_text_does_not_split_mid_char() {
        let text = "é".repeat(2000);
        let chunks = split_text(&text, 100, 10);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().all(|c| c == 'é'));
        }
    }
}
