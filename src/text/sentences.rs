use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SENTENCE_END: Regex = Regex::new(
        r"(?x)
        [.!?;]+\s+|     # Latin terminators followed by whitespace
        [。！？；]+\s*|  # CJK terminators, no space needed
        \n+             # Line breaks
        "
    )
    .unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

pub fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Split into sentences, keeping terminators. Empty sentences are dropped.
pub fn split(input: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for m in SENTENCE_END.find_iter(input) {
        push_normalized(&mut sentences, &input[last_end..m.end()]);
        last_end = m.end();
    }

    if last_end < input.len() {
        push_normalized(&mut sentences, &input[last_end..]);
    }

    sentences
}

fn push_normalized(out: &mut Vec<String>, text: &str) {
    let sentence = normalize(text);
    if !sentence.is_empty() {
        out.push(sentence);
    }
}

/// Greedily pack words into pieces of at most `max_chars`. A single word
/// longer than the limit becomes its own piece.
pub fn split_words(sentence: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
