pub mod sentences;

/// Longest chunk, in characters, handed to the phonemizer in one go. Keeps
/// each chunk well inside the model's phoneme context.
pub const MAX_CHUNK_CHARS: usize = 300;

/// Split input into whitespace-normalized chunks of whole sentences.
pub fn chunks(input: &str) -> Vec<String> {
    chunks_with_limit(input, MAX_CHUNK_CHARS)
}

pub fn chunks_with_limit(input: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    for sentence in sentences::split(input) {
        if char_len(&sentence) > max_chars {
            pieces.extend(sentences::split_words(&sentence, max_chars));
        } else {
            pieces.push(sentence);
        }
    }

    // Pack consecutive pieces up to the limit
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if !current.is_empty() && char_len(&current) + 1 + char_len(&piece) > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
