//! crates/vocal_tales_core/src/parse.rs
//!
//! Extracts a title and body from the generation provider's raw reply.

/// Title used when the reply carries no recognizable title line.
pub const FALLBACK_TITLE: &str = "A Magical Story";

/// Splits a raw provider reply into `(title, body)`. Never fails.
///
/// The first line starting with `TITLE:` or a `#` heading marker wins;
/// its prefix is stripped and the remaining lines become the body. A
/// reply with no marker line at all falls back to [`FALLBACK_TITLE`]
/// with the whole trimmed reply as the body.
pub fn parse_story_response(raw: &str) -> (String, String) {
    let lines: Vec<&str> = raw.trim().lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let stripped = if let Some(rest) = line.strip_prefix("TITLE:") {
            rest
        } else if line.starts_with('#') {
            line.trim_start_matches('#')
        } else {
            continue;
        };

        let title = stripped.trim().to_string();
        let body = lines[i + 1..].join("\n").trim().to_string();
        return (title, body);
    }

    (FALLBACK_TITLE.to_string(), raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_marker_line() {
        let (title, body) = parse_story_response("TITLE: Foo\nBar\nBaz");
        assert_eq!(title, "Foo");
        assert_eq!(body, "Bar\nBaz");
    }

    #[test]
    fn extracts_heading_marker_line() {
        let (title, body) = parse_story_response("# The Brave Rabbit\n\nOnce upon a time.");
        assert_eq!(title, "The Brave Rabbit");
        assert_eq!(body, "Once upon a time.");
    }

    #[test]
    fn no_marker_falls_back() {
        let (title, body) = parse_story_response("no marker line");
        assert_eq!(title, FALLBACK_TITLE);
        assert_eq!(body, "no marker line");
    }

    #[test]
    fn only_first_marker_is_honored() {
        let (title, body) = parse_story_response("TITLE: First\nTITLE: Second\nbody");
        assert_eq!(title, "First");
        assert_eq!(body, "TITLE: Second\nbody");
    }

    #[test]
    fn marker_below_preamble_is_found() {
        let raw = "Here is your story!\nTITLE: The Moon Garden\nIt began at night.";
        let (title, body) = parse_story_response(raw);
        assert_eq!(title, "The Moon Garden");
        assert_eq!(body, "It began at night.");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let (title, body) = parse_story_response("TITLE:   Spaced Out   \n\n  body text  \n\n");
        assert_eq!(title, "Spaced Out");
        assert_eq!(body, "body text");
    }

    #[test]
    fn empty_reply_yields_fallback_and_empty_body() {
        let (title, body) = parse_story_response("");
        assert_eq!(title, FALLBACK_TITLE);
        assert_eq!(body, "");
    }
}
