//! Paragraph-based document chunking for ingestion.
//!
//! Documents are split on blank lines, tiny fragments are dropped, and
//! paragraphs are packed into chunks of at most `MAX_CHUNK_CHARS`. Each new
//! chunk starts with the word-aligned tail of the previous one so that a
//! fact straddling a chunk boundary is still retrievable from either side.

/// Target upper bound for one chunk, in characters.
pub const MAX_CHUNK_CHARS: usize = 800;

/// How much of the previous chunk's tail is carried into the next one.
pub const OVERLAP_CHARS: usize = 100;

/// Paragraphs shorter than this are noise (stray headings, page numbers).
pub const MIN_PARAGRAPH_CHARS: usize = 10;

/// Split a document into retrieval-sized chunks.
///
/// A single paragraph longer than `MAX_CHUNK_CHARS` becomes its own chunk
/// rather than being split mid-sentence.
pub fn chunk_text(text: &str) -> Vec<String> {
    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect();

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for para in paragraphs {
        if !current.is_empty()
            && current.chars().count() + para.chars().count() + 2 > MAX_CHUNK_CHARS
        {
            let tail = word_tail(&current, OVERLAP_CHARS);
            chunks.push(std::mem::take(&mut current));
            current = tail;
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(para);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// The last `max_chars` characters of `text`, trimmed forward to the next
/// word boundary so the overlap never starts mid-word.
fn word_tail(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let tail: String = chars[chars.len() - max_chars..].iter().collect();
    match tail.find(' ') {
        Some(pos) => tail[pos + 1..].to_string(),
        None => tail,
    }
}
