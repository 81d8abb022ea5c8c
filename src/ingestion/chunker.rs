//! Overlapping text chunking with boundary-aware cut points
//!
//! Passages are exact slices of the source text. Because consecutive
//! passages share `overlap` characters, the original document can be
//! reconstructed from the passages and their character offsets.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::types::Passage;

/// Splits text into overlapping passages of bounded character length.
///
/// Cut points prefer, in order: a paragraph break, a sentence boundary, a
/// line break, a word boundary, and finally a hard cut at the character
/// limit. Soft break points are only taken past a third of the window so a
/// stray early boundary cannot produce degenerate slivers.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker. `max_chunk_size` and `overlap` are in characters;
    /// the overlap must be strictly smaller than the chunk size so every
    /// step makes forward progress.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(Error::config("max_chunk_size must be greater than zero"));
        }
        if overlap >= max_chunk_size {
            return Err(Error::config(format!(
                "overlap ({overlap}) must be smaller than max_chunk_size ({max_chunk_size})"
            )));
        }
        Ok(Self {
            max_chunk_size,
            overlap,
        })
    }

    /// Lazily chunk `text`. The returned iterator borrows the text and does
    /// no work until driven; calling this again restarts from the beginning.
    pub fn chunk<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            max_chunk_size: self.max_chunk_size,
            overlap: self.overlap,
            start_byte: 0,
            start_char: 0,
            next_index: 0,
        }
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

/// Iterator over the passages of one text. Produced by [`Chunker::chunk`].
#[derive(Debug)]
pub struct Chunks<'a> {
    text: &'a str,
    max_chunk_size: usize,
    overlap: usize,
    start_byte: usize,
    start_char: usize,
    next_index: usize,
}

impl Iterator for Chunks<'_> {
    type Item = Passage;

    fn next(&mut self) -> Option<Passage> {
        if self.start_byte >= self.text.len() {
            return None;
        }

        let remainder = &self.text[self.start_byte..];
        let end_byte = match nth_char_boundary(remainder, self.max_chunk_size) {
            // Remainder fits in one window; a trailing partial chunk is kept.
            None => self.text.len(),
            Some(limit) => self.start_byte + find_cut(remainder, limit),
        };

        let slice = &self.text[self.start_byte..end_byte];
        let chars = slice.chars().count();
        let passage = Passage {
            index: self.next_index,
            text: slice.to_string(),
            char_start: self.start_char,
            char_end: self.start_char + chars,
        };
        self.next_index += 1;

        if end_byte >= self.text.len() {
            self.start_byte = self.text.len();
            self.start_char += chars;
        } else if chars > self.overlap {
            // Step back so the next passage re-covers the last `overlap`
            // characters of this one.
            self.start_byte += suffix_char_start(slice, self.overlap);
            self.start_char += chars - self.overlap;
        } else {
            // Chunk no bigger than the overlap; skip overlapping entirely
            // rather than stall.
            self.start_byte = end_byte;
            self.start_char += chars;
        }

        Some(passage)
    }
}

/// Byte offset of the `n`-th character of `s`, or `None` when `s` has no
/// more than `n` characters.
fn nth_char_boundary(s: &str, n: usize) -> Option<usize> {
    s.char_indices().nth(n).map(|(i, _)| i)
}

/// Byte offset where the last `n` characters of `s` begin.
fn suffix_char_start(s: &str, n: usize) -> usize {
    if n == 0 {
        return s.len();
    }
    s.char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Pick the cut point (in bytes) for a window of `limit` bytes at the head
/// of `remainder`. Always returns a value in `(0, limit]`.
fn find_cut(remainder: &str, limit: usize) -> usize {
    let window = &remainder[..limit];
    let min_cut = limit / 3;

    if let Some(pos) = window.rfind("\n\n") {
        let cut = pos + 2;
        if cut > min_cut {
            return cut;
        }
    }

    let mut sentence_cut = None;
    for (offset, _) in window.split_sentence_bound_indices() {
        if offset > min_cut {
            sentence_cut = Some(offset);
        }
    }
    if let Some(cut) = sentence_cut {
        return cut;
    }

    if let Some(pos) = window.rfind('\n') {
        let cut = pos + 1;
        if cut > min_cut {
            return cut;
        }
    }

    if let Some(pos) = window.rfind(' ') {
        let cut = pos + 1;
        if cut > min_cut {
            return cut;
        }
    }

    limit
}
