//! Dictation file format.
//!
//! Lines are trimmed first. A line starting with `# ` is a header: when it
//! reads `# key: value` the lowercased key is stored with its value, any
//! other header line is dropped. Every remaining non-empty line is a
//! sentence, in file order.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use diktat_core::types::Dictation;

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^#\s*(\w+):\s*(.+)").expect("Invalid header regex"))
}

/// Parse the contents of one dictation file.
pub fn parse_dictation(id: &str, text: &str) -> Dictation {
    let mut metadata = BTreeMap::new();
    let mut sentences = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.starts_with("# ") {
            if let Some(caps) = header_regex().captures(line) {
                metadata.insert(caps[1].to_lowercase(), caps[2].to_string());
            }
        } else if !line.is_empty() {
            sentences.push(line.to_string());
        }
    }

    Dictation {
        id: id.to_string(),
        sentences,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Titel: Im Zoo
# Thema: Tiere
# Übung: Groß- und Kleinschreibung
# Schwierigkeit: 2

Im Zoo leben viele Tiere.
   Der Löwe schläft im Schatten.

Die Affen klettern auf die Bäume.
";

    #[test]
    fn test_parse_headers_and_sentences() {
        let d = parse_dictation("zoo.txt", SAMPLE);
        assert_eq!(d.id, "zoo.txt");
        assert_eq!(d.metadata.get("titel").unwrap(), "Im Zoo");
        assert_eq!(d.metadata.get("thema").unwrap(), "Tiere");
        assert_eq!(d.metadata.get("übung").unwrap(), "Groß- und Kleinschreibung");
        assert_eq!(d.metadata.get("schwierigkeit").unwrap(), "2");
        assert_eq!(
            d.sentences,
            vec![
                "Im Zoo leben viele Tiere.",
                "Der Löwe schläft im Schatten.",
                "Die Affen klettern auf die Bäume.",
            ]
        );
    }

    #[test]
    fn test_header_without_key_value_is_dropped() {
        let d = parse_dictation("x.txt", "# nur ein Kommentar\nEin Satz.");
        assert!(d.metadata.is_empty());
        assert_eq!(d.sentences, vec!["Ein Satz."]);
    }

    #[test]
    fn test_hash_without_space_is_a_sentence() {
        let d = parse_dictation("x.txt", "#Hashtag: kein Header\n#");
        assert!(d.metadata.is_empty());
        assert_eq!(d.sentences, vec!["#Hashtag: kein Header", "#"]);
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let d = parse_dictation("x.txt", "# Beschreibung: Zeit: 10:30 Uhr");
        assert_eq!(d.metadata.get("beschreibung").unwrap(), "Zeit: 10:30 Uhr");
    }

    #[test]
    fn test_later_header_overrides_earlier() {
        let d = parse_dictation("x.txt", "# Titel: Alt\n# titel: Neu");
        assert_eq!(d.metadata.get("titel").unwrap(), "Neu");
    }

    #[test]
    fn test_empty_file() {
        let d = parse_dictation("leer.txt", "\n\n   \n");
        assert!(d.sentences.is_empty());
        assert!(d.metadata.is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        let d = parse_dictation("x.txt", "# Titel: CRLF\r\nErster Satz.\r\nZweiter Satz.\r\n");
        assert_eq!(d.metadata.get("titel").unwrap(), "CRLF");
        assert_eq!(d.sentences, vec!["Erster Satz.", "Zweiter Satz."]);
    }
}
