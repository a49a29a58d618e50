use unicode_segmentation::UnicodeSegmentation;

use crate::chunk::Chunk;
use crate::error::LoadError;
use crate::page::Page;

/// Chunking parameters.
///
/// Sizes are byte budgets; a multi-byte character is never split, so chunks
/// on ASCII text hit the budget exactly and shorter otherwise.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Upper bound on chunk text length. A chunk only exceeds it when a
    /// single indivisible span of input already does.
    pub chunk_size: usize,
    /// How far each chunk reaches back into the previous one. Must be
    /// smaller than `chunk_size`.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

/// Splits pages into overlapping fixed-size chunks.
///
/// Deterministic: the same pages and parameters always produce the same
/// chunk sequence. Overlap never crosses a page boundary.
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Result<Self, LoadError> {
        if config.chunk_overlap >= config.chunk_size {
            return Err(LoadError::InvalidChunking {
                size: config.chunk_size,
                overlap: config.chunk_overlap,
            });
        }
        Ok(Self { config })
    }

    /// Chunk every page in order, numbering chunks across the whole corpus.
    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut chunk_index = 0;

        for page in pages {
            for span in self.split_page(&page.text) {
                if span.trim().is_empty() {
                    continue;
                }
                chunks.push(Chunk::new(
                    span.to_string(),
                    page.source.clone(),
                    page.page_number,
                    chunk_index,
                ));
                chunk_index += 1;
            }
        }

        chunks
    }

    /// Cut one page's text into overlapping windows.
    fn split_page<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut spans = Vec::new();
        if text.is_empty() {
            return spans;
        }

        let mut start = 0;
        loop {
            // Everything left fits in one chunk.
            if text.len() - start <= self.config.chunk_size {
                spans.push(&text[start..]);
                break;
            }

            let limit = floor_char_boundary(text, start + self.config.chunk_size);
            let mut end = self.find_break(text, start, limit);
            if end <= start {
                // Budget smaller than the next character; take it whole.
                end = start
                    + text[start..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
            }
            spans.push(&text[start..end]);

            if end == text.len() {
                break;
            }

            let mut next = floor_char_boundary(text, end.saturating_sub(self.config.chunk_overlap));
            if next <= start {
                // Window shorter than the overlap; restart without one.
                next = end;
            }
            start = next;
        }

        spans
    }

    /// Pick where the chunk ends: paragraph break, then sentence boundary,
    /// then whitespace, then a hard cut at the budget.
    fn find_break(&self, text: &str, start: usize, limit: usize) -> usize {
        let window = &text[start..limit];

        if let Some(pos) = window.rfind("\n\n") {
            if pos > 0 {
                return start + pos + 2;
            }
        }

        if let Some(pos) = last_sentence_boundary(window) {
            return start + pos;
        }

        if let Some(pos) = window.rfind(|c: char| c.is_whitespace()) {
            if pos > 0 {
                let ws_len = window[pos..].chars().next().map_or(1, char::len_utf8);
                return start + pos + ws_len;
            }
        }

        limit
    }
}

/// Start offset of the last sentence in `window`, if it holds more than one.
fn last_sentence_boundary(window: &str) -> Option<usize> {
    let mut last = None;
    for (offset, _) in window.split_sentence_bound_indices() {
        if offset > 0 {
            last = Some(offset);
        }
    }
    last
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> Page {
        Page::new(text.to_string(), "handbook.pdf".to_string(), Some(1))
    }

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(ChunkerConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    #[test]
    fn short_page_is_one_chunk() {
        let chunks = chunker(1000, 150).chunk_pages(&[page("A single short paragraph.")]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "A single short paragraph.");
        assert_eq!(chunks[0].page_number, Some(1));
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let result = Chunker::new(ChunkerConfig {
            chunk_size: 100,
            chunk_overlap: 100,
        });
        assert!(matches!(result, Err(LoadError::InvalidChunking { .. })));
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "One sentence here. Another sentence there. ".repeat(60);
        let pages = [page(&text)];
        let first = chunker(200, 40).chunk_pages(&pages);
        let second = chunker(200, 40).chunk_pages(&pages);
        assert_eq!(first, second);
    }

    #[test]
    fn chunks_respect_size_budget() {
        let text = "Words of modest length fill this page over and over. ".repeat(100);
        let chunks = chunker(300, 50).chunk_pages(&[page(&text)]);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 300, "chunk of {} bytes", chunk.text.len());
        }
    }

    #[test]
    fn unbroken_text_falls_back_to_hard_cuts() {
        let text = "x".repeat(500);
        let chunks = chunker(100, 10).chunk_pages(&[page(&text)]);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.text.len() <= 100));
    }

    #[test]
    fn adjacent_chunks_share_the_overlap() {
        let text = "abcdefghij".repeat(100);
        let overlap = 50;
        let chunks = chunker(200, overlap).chunk_pages(&[page(&text)]);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let lead: String = pair[1].text.chars().take(overlap).collect();
            assert!(
                pair[0].text.ends_with(&lead),
                "expected trailing overlap between consecutive chunks"
            );
        }
    }

    #[test]
    fn overlap_does_not_cross_pages() {
        let first = Page::new("alpha ".repeat(100), "doc.pdf".to_string(), Some(1));
        let second = Page::new("omega ".repeat(100), "doc.pdf".to_string(), Some(2));
        let chunks = chunker(200, 50).chunk_pages(&[first, second]);

        for chunk in &chunks {
            match chunk.page_number {
                Some(1) => assert!(!chunk.text.contains("omega")),
                Some(2) => assert!(!chunk.text.contains("alpha")),
                other => panic!("unexpected page number {other:?}"),
            }
        }
    }

    #[test]
    fn breaks_prefer_sentence_boundaries() {
        let text = "This is the first sentence of the page. This is the second one. \
                    This is the third one and it keeps going for a while longer."
            .to_string();
        let chunks = chunker(80, 10).chunk_pages(&[page(&text)]);
        assert!(chunks.len() > 1);
        // The first cut lands after a complete sentence, not mid-word.
        assert!(chunks[0].text.trim_end().ends_with('.'));
    }

    #[test]
    fn paragraph_breaks_win_over_sentences() {
        let text = format!(
            "First paragraph sentence one. Sentence two.\n\n{}",
            "Second paragraph text. ".repeat(20)
        );
        let chunks = chunker(120, 20).chunk_pages(&[page(&text)]);
        assert!(chunks[0].text.ends_with("\n\n"));
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let text = "Some repeated filler text for chunking. ".repeat(50);
        let chunks = chunker(200, 40).chunk_pages(&[page(&text)]);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }
}
