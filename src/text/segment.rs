use super::normalize::normalize;

/// Maximum number of characters in a spoken chunk.
pub const MAX_CHUNK_LEN: usize = 240;

/// Characters that end a sentence.
pub fn is_sentence_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '。' | '！' | '？' | '…')
}

/// Softer pause characters used to split an over-long sentence.
pub fn is_clause_delimiter(ch: char) -> bool {
    matches!(ch, ',' | '，' | ';' | '；' | ':' | '：')
}

/// Normalize `text` and split it into chunks of at most [`MAX_CHUNK_LEN`] characters.
pub fn segment(text: &str) -> Vec<String> {
    segment_with_max_len(text, MAX_CHUNK_LEN)
}

/// Normalize `text` and split it into speakable chunks of at most `max_len` characters.
///
/// Sentences are cut at terminal punctuation and newlines first; any
/// sentence still longer than `max_len` is split at clause punctuation, then
/// word-wrapped, then hard-cut. Lengths are counted in `char`s.
pub fn segment_with_max_len(text: &str, max_len: usize) -> Vec<String> {
    let cleaned = normalize(text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let mut sentences = split_sentences(&cleaned);
    if sentences.is_empty() {
        sentences.push(cleaned);
    }

    split_long_chunks(sentences, max_len.max(1))
}

/// Split text into sentences.
///
/// A newline always closes the current sentence. A run of terminators is
/// absorbed into a single boundary (`"Really?!"` is one sentence). An
/// ellipsis run followed by a lower-case continuation (`"Wait... really"`)
/// does not close the sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_at_boundaries(text, is_sentence_terminator, true)
}

/// Split text at clause punctuation, absorbing runs of delimiters the same
/// way [`split_sentences`] absorbs terminators.
pub fn split_by_delimiters(text: &str) -> Vec<String> {
    split_at_boundaries(text, is_clause_delimiter, false)
}

fn split_at_boundaries(
    text: &str,
    is_boundary: fn(char) -> bool,
    continue_after_ellipsis: bool,
) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut buffer = String::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\n' {
            flush(&mut parts, &mut buffer);
            i += 1;
            continue;
        }

        buffer.push(ch);
        if is_boundary(ch) {
            let run_start = i;
            while i + 1 < chars.len() && is_boundary(chars[i + 1]) {
                i += 1;
                buffer.push(chars[i]);
            }

            let run = &chars[run_start..=i];
            let keep_going =
                continue_after_ellipsis && is_ellipsis(run) && continues_lowercase(&chars, i + 1);
            if !keep_going {
                flush(&mut parts, &mut buffer);
            }
        }
        i += 1;
    }

    flush(&mut parts, &mut buffer);
    parts
}

fn is_ellipsis(run: &[char]) -> bool {
    run.iter().all(|&c| c == '.' || c == '…') && (run.len() >= 2 || run[0] == '…')
}

/// True when the text at `from` is horizontal whitespace followed by a lower-case letter.
fn continues_lowercase(chars: &[char], from: usize) -> bool {
    let mut j = from;
    let mut saw_space = false;
    while j < chars.len() && chars[j].is_whitespace() && chars[j] != '\n' {
        saw_space = true;
        j += 1;
    }
    saw_space && chars.get(j).is_some_and(|c| c.is_lowercase())
}

fn flush(parts: &mut Vec<String>, buffer: &mut String) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
    buffer.clear();
}

/// Re-split every chunk longer than `max_len`.
pub fn split_long_chunks(chunks: Vec<String>, max_len: usize) -> Vec<String> {
    let mut result = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        if char_len(&chunk) <= max_len {
            result.push(chunk);
            continue;
        }

        let clauses = split_by_delimiters(&chunk);
        if clauses.len() > 1 {
            for clause in clauses {
                if char_len(&clause) <= max_len {
                    result.push(clause);
                } else {
                    wrap_words(&clause, max_len, &mut result);
                }
            }
            continue;
        }

        wrap_words(&chunk, max_len, &mut result);
    }

    result
}

/// Greedily pack whitespace-separated words into chunks of at most `max_len`
/// characters. Text without whitespace, and any single word longer than
/// `max_len`, is hard-cut every `max_len` characters.
pub fn wrap_words(text: &str, max_len: usize, out: &mut Vec<String>) {
    if !text.chars().any(char::is_whitespace) {
        hard_cut(text, max_len, out);
        return;
    }

    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = char_len(word);

        if word_len > max_len {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            hard_cut(word, max_len, out);
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len > max_len {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

fn hard_cut(text: &str, max_len: usize, out: &mut Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    for piece in chars.chunks(max_len) {
        out.push(piece.iter().collect());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn empty_input_has_no_chunks() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t  ").is_empty());
    }

    #[test]
    fn splits_basic_sentences() {
        assert_eq!(
            segment("Hello world. How are you? Fine!"),
            vec!["Hello world.", "How are you?", "Fine!"]
        );
    }

    #[test]
    fn absorbs_terminator_runs() {
        assert_eq!(
            segment("Wait... really?! Yes."),
            vec!["Wait... really?!", "Yes."]
        );
        assert_eq!(segment("What?!? No."), vec!["What?!?", "No."]);
    }

    #[test]
    fn ellipsis_before_capital_is_a_boundary() {
        assert_eq!(segment("Well... Maybe."), vec!["Well...", "Maybe."]);
    }

    #[test]
    fn newline_closes_sentence() {
        assert_eq!(segment("First line\nSecond line"), vec!["First line", "Second line"]);
    }

    #[test]
    fn splits_cjk_punctuation() {
        assert_eq!(segment("你好。今天好吗？好！"), vec!["你好。", "今天好吗？", "好！"]);
    }

    #[test]
    fn long_sentence_splits_on_clauses() {
        let clause = "word ".repeat(30);
        let text = format!("{}, {}; {}.", clause.trim(), clause.trim(), clause.trim());
        let chunks = segment_with_max_len(&text, 200);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].ends_with(','));
        assert!(chunks[1].ends_with(';'));
        assert!(chunks[2].ends_with('.'));
    }

    #[test]
    fn long_sentence_without_clauses_word_wraps() {
        let text = "alpha ".repeat(100);
        let chunks = segment(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MAX_CHUNK_LEN);
            assert!(!chunk.starts_with(' ') && !chunk.ends_with(' '));
        }
        assert_eq!(non_whitespace(&chunks.concat()), non_whitespace(&text));
    }

    #[test]
    fn text_without_spaces_is_hard_cut() {
        let text = "字".repeat(500);
        let chunks = segment(&text);
        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![240, 240, 20]);
    }

    #[test]
    fn oversized_token_among_words_is_hard_cut() {
        let token = "x".repeat(300);
        let text = format!("short words {token} more words");
        let chunks = segment(&text);
        assert_eq!(chunks[0], "short words");
        assert_eq!(chunks[1].chars().count(), 240);
        assert_eq!(chunks[2].chars().count(), 60);
        assert_eq!(chunks[3], "more words");
    }

    #[test]
    fn chunks_stay_bounded_and_preserve_text() {
        let text = "The quick brown fox jumps over the lazy dog, again and again; \
                    it never tires: it never sleeps. "
            .repeat(20);
        let chunks = segment_with_max_len(&text, 60);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 60, "chunk too long: {chunk:?}");
        }
        assert_eq!(non_whitespace(&chunks.concat()), non_whitespace(&normalize(&text)));
    }

    #[test]
    fn segmentation_is_deterministic() {
        let text = "One. Two, three; four! 五六七。".repeat(30);
        assert_eq!(segment(&text), segment(&text));
    }
}
