use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CODE_FENCE_RE: Regex = Regex::new(r"(?s)```.*?```").unwrap();
    static ref INLINE_CODE_RE: Regex = Regex::new(r"`[^`]*`").unwrap();
    static ref IMAGE_RE: Regex = Regex::new(r"!\[([^\]]*)\]\([^)]+\)").unwrap();
    static ref LINK_RE: Regex = Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap();
    static ref HEADING_RE: Regex = Regex::new(r"(?m)^#{1,6}\s*").unwrap();
    static ref BLOCKQUOTE_RE: Regex = Regex::new(r"(?m)^>\s?").unwrap();
    static ref NUMBERED_ITEM_RE: Regex = Regex::new(r"(?m)^\s*(\d+)[.)]\s+").unwrap();
    static ref LETTERED_ITEM_RE: Regex = Regex::new(r"(?m)^\s*([A-Za-z])[.)]\s+").unwrap();
    static ref BULLET_RE: Regex = Regex::new(r"(?m)^\s*[-*+]\s+").unwrap();
    static ref RULE_RE: Regex = Regex::new(r"(?m)^\s*[-*_]{3,}\s*$").unwrap();
    static ref REFERENCE_DEF_RE: Regex = Regex::new(r"(?m)^\[[^\]]+\]:\s*\S+").unwrap();
    static ref STRIKE_RE: Regex = Regex::new(r"~~([^~]+)~~").unwrap();
    static ref STRONG_STAR_RE: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref STRONG_UNDERSCORE_RE: Regex = Regex::new(r"__(.*?)__").unwrap();
    static ref HORIZONTAL_SPACE_RE: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref NEWLINE_SPACE_RE: Regex = Regex::new(r"\s*\n\s*").unwrap();
    static ref BLANK_RUN_RE: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Strip lightweight markdown and collapse whitespace so the text reads well aloud.
///
/// Link and image text is kept, code is dropped, list markers become spoken
/// punctuation (`1) ` becomes `1. `) and emphasis markers are removed around
/// their inner text.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut text = raw.replace("\r\n", "\n");
    text = CODE_FENCE_RE.replace_all(&text, " ").into_owned();
    text = INLINE_CODE_RE.replace_all(&text, " ").into_owned();
    text = IMAGE_RE.replace_all(&text, "${1}").into_owned();
    text = LINK_RE.replace_all(&text, "${1}").into_owned();
    text = HEADING_RE.replace_all(&text, "").into_owned();
    text = BLOCKQUOTE_RE.replace_all(&text, "").into_owned();
    text = NUMBERED_ITEM_RE.replace_all(&text, "${1}. ").into_owned();
    text = LETTERED_ITEM_RE.replace_all(&text, "${1}. ").into_owned();
    text = BULLET_RE.replace_all(&text, "").into_owned();
    text = RULE_RE.replace_all(&text, " ").into_owned();
    text = REFERENCE_DEF_RE.replace_all(&text, " ").into_owned();
    text = STRIKE_RE.replace_all(&text, "${1}").into_owned();
    text = STRONG_STAR_RE.replace_all(&text, "${1}").into_owned();
    text = STRONG_UNDERSCORE_RE.replace_all(&text, "${1}").into_owned();
    text = strip_single_emphasis(&text);
    text = HORIZONTAL_SPACE_RE.replace_all(&text, " ").into_owned();
    text = NEWLINE_SPACE_RE.replace_all(&text, "\n").into_owned();
    text = BLANK_RUN_RE.replace_all(&text, "\n\n").into_owned();
    text.trim().to_string()
}

/// Remove single `*` / `_` emphasis markers.
///
/// A span only counts as emphasis when the opening marker sits at the start
/// of the text or after whitespace or `>`, the inner text contains no marker
/// characters, and the closing marker is followed by whitespace, `<` or the
/// end of the text. Identifiers such as `snake_case_name` are left alone.
fn strip_single_emphasis(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let opens = (ch == '*' || ch == '_')
            && (i == 0 || chars[i - 1].is_whitespace() || chars[i - 1] == '>');

        if opens {
            let close = chars[i + 1..]
                .iter()
                .position(|&c| c == '*' || c == '_')
                .map(|offset| i + 1 + offset);

            if let Some(j) = close {
                let closes_cleanly = chars[j] == ch
                    && j > i + 1
                    && chars
                        .get(j + 1)
                        .map_or(true, |&next| next.is_whitespace() || next == '<');
                if closes_cleanly {
                    out.extend(&chars[i + 1..j]);
                    i = j + 1;
                    continue;
                }
            }
        }

        out.push(ch);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_headings_and_emphasis() {
        let text = "# Title\n\nSome **bold** and *italic* text.";
        assert_eq!(normalize(text), "Title\nSome bold and italic text.");
    }

    #[test]
    fn keeps_link_and_image_text() {
        assert_eq!(
            normalize("See [the docs](https://example.com) and ![a cat](cat.png) now"),
            "See the docs and a cat now"
        );
    }

    #[test]
    fn drops_code() {
        assert_eq!(normalize("Run `cargo test` please"), "Run please");
        assert_eq!(normalize("Intro\n```\nfn main() {}\n```\nOutro"), "Intro\nOutro");
    }

    #[test]
    fn converts_list_markers() {
        assert_eq!(normalize("1) First\n2) Second"), "1. First\n2. Second");
        assert_eq!(normalize("a) alpha\nB. beta"), "a. alpha\nB. beta");
        assert_eq!(normalize("- one\n* two\n+ three"), "one\ntwo\nthree");
    }

    #[test]
    fn drops_rules_quotes_and_reference_links() {
        assert_eq!(normalize("Above\n---\nBelow"), "Above\nBelow");
        assert_eq!(normalize("> quoted line"), "quoted line");
        assert_eq!(normalize("Text\n[1]: https://example.com"), "Text");
        assert_eq!(normalize("~~old~~ new"), "old new");
        assert_eq!(normalize("__strong__ words"), "strong words");
    }

    #[test]
    fn leaves_identifiers_with_underscores() {
        assert_eq!(normalize("call snake_case_name now"), "call snake_case_name now");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  a \t\t b  \r\n\r\n\r\n\r\n  c  "), "a b\nc");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn is_idempotent_on_plain_text() {
        let samples = [
            "Hello world. How are you?",
            "Line one\nLine two\n\n\n\nLine three",
            "  spaced   out\ttext  ",
            "これはテストです。次の文。",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
