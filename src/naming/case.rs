//! Naming conventions for suggested filenames.
//!
//! [`format`] normalizes an arbitrary phrase (an LLM suggestion, an old file
//! stem) into one of eight conventions. Every convention is a pure function
//! of the phrase's tokens, so applying it to its own output is a no-op.

use std::fmt;

/// Lowercase tokens that Title Case keeps uppercase
const KNOWN_ACRONYMS: &[&str] = &[
    "api", "ceo", "csv", "cto", "cv", "faq", "hr", "html", "json", "pdf", "sql", "ui", "uk",
    "url", "usa", "ux", "xml",
];

/// Longest suffix after the final dot treated as an extension
const MAX_EXTENSION_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseFormat {
    Snake,
    Title,
    Camel,
    Kebab,
    Upper,
    Lower,
    NoCaps,
    Pascal,
}

impl CaseFormat {
    pub const ALL: [CaseFormat; 8] = [
        CaseFormat::Snake,
        CaseFormat::Title,
        CaseFormat::Camel,
        CaseFormat::Kebab,
        CaseFormat::Upper,
        CaseFormat::Lower,
        CaseFormat::NoCaps,
        CaseFormat::Pascal,
    ];

    /// Convention by its display name; anything unrecognized is snake_case
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == name.trim())
            .unwrap_or(CaseFormat::Snake)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseFormat::Snake => "snake_case",
            CaseFormat::Title => "Title Case",
            CaseFormat::Camel => "camelCase",
            CaseFormat::Kebab => "kebab-case",
            CaseFormat::Upper => "UPPER_CASE",
            CaseFormat::Lower => "lower case",
            CaseFormat::NoCaps => "no caps",
            CaseFormat::Pascal => "PascalCase",
        }
    }

    pub fn apply(&self, phrase: &str) -> String {
        let tokens = tokenize(&clean(phrase));

        match self {
            CaseFormat::Snake => join_mapped(&tokens, "_", str::to_lowercase),
            CaseFormat::Kebab => join_mapped(&tokens, "-", str::to_lowercase),
            CaseFormat::Upper => join_mapped(&tokens, "_", str::to_uppercase),
            CaseFormat::Lower | CaseFormat::NoCaps => join_mapped(&tokens, " ", str::to_lowercase),
            CaseFormat::Pascal => join_mapped(&tokens, "", capitalize),
            CaseFormat::Title => join_mapped(&tokens, " ", |token| {
                if looks_like_acronym(token) {
                    token.to_uppercase()
                } else {
                    capitalize(token)
                }
            }),
            CaseFormat::Camel => {
                let mut out = String::new();
                for (i, token) in tokens.iter().enumerate() {
                    if i == 0 {
                        out.push_str(&word_chars(&token.to_lowercase()));
                    } else {
                        out.push_str(&word_chars(&capitalize(token)));
                    }
                }
                out
            }
        }
    }
}

impl fmt::Display for CaseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format `phrase` in the named convention
pub fn format(phrase: &str, convention: &str) -> String {
    CaseFormat::parse(convention).apply(phrase)
}

fn join_mapped<F>(tokens: &[String], sep: &str, map: F) -> String
where
    F: Fn(&str) -> String,
{
    tokens
        .iter()
        .map(|t| word_chars(&map(t.as_str())))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Case mapping can introduce combining marks (`İ` lowercases to `i` + U+0307)
fn word_chars(token: &str) -> String {
    token.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Drop an extension-looking suffix, then everything but words, spaces and hyphens
fn clean(phrase: &str) -> String {
    let phrase = strip_extension(phrase.trim());

    let kept: String = phrase
        .chars()
        .map(|c| if c == '_' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_extension(phrase: &str) -> &str {
    let Some(idx) = phrase.rfind('.') else {
        return phrase;
    };
    let suffix = &phrase[idx + 1..];
    let is_extension = (1..=MAX_EXTENSION_LEN).contains(&suffix.len())
        && suffix.chars().all(|c| c.is_ascii_alphanumeric())
        && suffix.chars().any(|c| c.is_ascii_alphabetic());

    if is_extension {
        &phrase[..idx]
    } else {
        phrase
    }
}

/// Split on spaces and hyphens, then on lower/digit → upper humps
fn tokenize(cleaned: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for word in cleaned.split(|c: char| c.is_whitespace() || c == '-') {
        let mut current = String::new();
        let mut prev: Option<char> = None;
        for c in word.chars() {
            if let Some(p) = prev {
                if c.is_uppercase() && (p.is_lowercase() || p.is_numeric()) && !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
            prev = Some(c);
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }

    tokens
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// All-caps words of two or more letters, all-caps tokens with a digit, and known acronyms
fn looks_like_acronym(token: &str) -> bool {
    let letters = token.chars().filter(|c| c.is_alphabetic()).count();
    let has_upper = token.chars().any(char::is_uppercase);
    let has_lower = token.chars().any(char::is_lowercase);
    let has_digit = token.chars().any(|c| c.is_ascii_digit());

    (letters >= 2 && has_upper && !has_lower)
        || (has_upper && has_digit && !has_lower)
        || KNOWN_ACRONYMS.contains(&token.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_examples() {
        assert_eq!(format("hello world test", "Title Case"), "Hello World Test");
        assert_eq!(format("hello world test", "camelCase"), "helloWorldTest");
        assert_eq!(format("hello world test", "kebab-case"), "hello-world-test");
        assert_eq!(format("hello world test", "snake_case"), "hello_world_test");
        assert_eq!(format("hello world test", "UPPER_CASE"), "HELLO_WORLD_TEST");
        assert_eq!(format("Hello World Test", "lower case"), "hello world test");
        assert_eq!(format("Hello World Test", "no caps"), "hello world test");
        assert_eq!(format("hello world test", "PascalCase"), "HelloWorldTest");
    }

    #[test]
    fn test_title_case_keeps_acronyms() {
        assert_eq!(format("cv_for_jane", "Title Case"), "CV For Jane");
        assert_eq!(format("API design notes", "Title Case"), "API Design Notes");
        assert_eq!(format("q3 report", "Title Case"), "Q3 Report");
        assert_eq!(format("Q3 report", "Title Case"), "Q3 Report");
        assert_eq!(format("MP3 rips", "Title Case"), "MP3 Rips");
        assert_eq!(format("mp3player notes", "Title Case"), "Mp3player Notes");
        assert_eq!(format("Mp3player Notes", "Title Case"), "Mp3player Notes");
    }

    #[test]
    fn test_case_mapping_drops_combining_marks() {
        assert_eq!(format("İstanbul trip", "snake_case"), "istanbul_trip");
        assert_eq!(format("İstanbul trip", "camelCase"), "istanbulTrip");
        assert_eq!(format("İstanbul trip", "Title Case"), "İstanbul Trip");
    }

    #[test]
    fn test_unknown_convention_is_snake() {
        assert_eq!(format("Some Phrase", "SHOUTY-kebab"), "some_phrase");
        assert_eq!(CaseFormat::parse(""), CaseFormat::Snake);
    }

    #[test]
    fn test_strips_extension_and_punctuation() {
        assert_eq!(format("Quarterly Report (final).pdf", "snake_case"), "quarterly_report_final");
        assert_eq!(format("notes.tar", "kebab-case"), "notes");
        // Not an extension: no letters after the dot
        assert_eq!(format("version 1.2", "snake_case"), "version_12");
        assert_eq!(format("  lots   of\tspace  ", "kebab-case"), "lots-of-space");
    }

    #[test]
    fn test_splits_humps() {
        assert_eq!(format("budgetReport2024", "snake_case"), "budget_report2024");
        assert_eq!(format("MeetingNotes", "kebab-case"), "meeting-notes");
        assert_eq!(format("invoice-march_2024", "PascalCase"), "InvoiceMarch2024");
    }

    #[test]
    fn test_empty_phrase() {
        for convention in CaseFormat::ALL {
            assert_eq!(convention.apply("!!!"), "");
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let phrases = [
            "my_file_name",
            "Annual budget REVIEW 2024",
            "cv for jane",
            "multi-part-name",
            "helloWorldTest",
            "Quarterly Report Q3",
            "mp3player notes",
            "İstanbul trip",
            "Covid19 update",
            "straße plan",
        ];
        for convention in CaseFormat::ALL {
            for phrase in phrases {
                let once = convention.apply(phrase);
                assert_eq!(convention.apply(&once), once, "{} on {:?}", convention, phrase);
            }
        }
    }

    #[test]
    fn test_parse_round_trips_names() {
        for convention in CaseFormat::ALL {
            assert_eq!(CaseFormat::parse(convention.as_str()), convention);
        }
    }
}
