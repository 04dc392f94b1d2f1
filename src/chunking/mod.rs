//! Sentence-based chunking of long transcripts.
//!
//! Splits text on periods and greedily packs sentences into chunks no longer
//! than a character bound, so each chunk can be sent to the model on its own.

use crate::reduction::char_len;

/// Split `text` into chunks of at most `max_size` characters at sentence boundaries.
///
/// Sentences are joined with single spaces. A sentence longer than `max_size`
/// is kept whole as its own chunk rather than being cut mid-sentence.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences(text) {
        let sentence_len = char_len(&sentence);

        if current.is_empty() {
            current = sentence;
            current_len = sentence_len;
            continue;
        }

        if current_len + 1 + sentence_len > max_size {
            chunks.push(std::mem::take(&mut current));
            current = sentence;
            current_len = sentence_len;
        } else {
            current.push(' ');
            current.push_str(&sentence);
            current_len += 1 + sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Trimmed, non-empty sentences of `text`.
///
/// Every sentence that ended with a period in the source keeps it; trailing
/// text after the last period is returned without one.
fn sentences(text: &str) -> impl Iterator<Item = String> + '_ {
    let pieces: Vec<&str> = text.split('.').collect();
    let last = pieces.len().saturating_sub(1);

    pieces.into_iter().enumerate().filter_map(move |(i, piece)| {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            None
        } else if i < last {
            Some(format!("{}.", trimmed))
        } else {
            Some(trimmed.to_string())
        }
    })
}
