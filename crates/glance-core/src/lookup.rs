use glance_config::lookup::LookupConfig;

/// How a span of text is split into lookup candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// Space-delimited, Latin-alphabet-style text
    AsciiLike,
    /// Scripts without word separators
    Unsegmented,
}

impl LookupMode {
    /// Decided by the leading character alone
    pub fn detect(text: &str) -> Self {
        match text.chars().next() {
            Some(c) if (' '..='~').contains(&c) => LookupMode::AsciiLike,
            _ => LookupMode::Unsegmented,
        }
    }

    pub fn is_ascii_like(self) -> bool {
        self == LookupMode::AsciiLike
    }
}

/// Candidates with the default limits
pub fn candidates(text: &str, allow_capitalized_variant: bool, is_ascii_like: bool) -> Vec<String> {
    CandidateGenerator::default().candidates(text, allow_capitalized_variant, is_ascii_like)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateGenerator {
    config: LookupConfig,
}

impl CandidateGenerator {
    pub fn new(config: LookupConfig) -> Self {
        Self { config }
    }

    /// Ordered lookup candidates for `text`; earlier entries take priority.
    ///
    /// Duplicates are left in place.
    pub fn candidates(
        &self,
        text: &str,
        allow_capitalized_variant: bool,
        is_ascii_like: bool,
    ) -> Vec<String> {
        let text = text.trim_start();
        if text.is_empty() {
            return Vec::new();
        }

        if is_ascii_like {
            self.word_candidates(text, allow_capitalized_variant)
        } else {
            self.unsegmented_candidates(text)
        }
    }

    fn word_candidates(&self, text: &str, allow_capitalized_variant: bool) -> Vec<String> {
        let words = leading_words(text, self.config.max_compound_words.max(1));
        let Some(&base) = words.first() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut push = |candidate: String| {
            let variant = allow_capitalized_variant
                .then(|| decapitalize(&candidate))
                .flatten();
            out.push(candidate);
            out.extend(variant);
        };

        push(base.to_string());

        let segments: Vec<&str> = base.split('-').filter(|s| !s.is_empty()).collect();
        if segments.len() > 1 {
            push(segments.concat());
            push(segments.join(" "));
            push(segments[0].to_string());
        }

        for n in (2..=words.len()).rev() {
            push(words[..n].join(" "));
        }

        out
    }

    fn unsegmented_candidates(&self, text: &str) -> Vec<String> {
        let span: Vec<char> = text
            .chars()
            .take_while(|c| !c.is_whitespace())
            .take(self.config.max_unsegmented_chars)
            .collect();

        (1..=span.len())
            .rev()
            .map(|n| span[..n].iter().collect())
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '-'
}

/// Up to `max` words from the start of `text`, stopping at the first
/// character that is neither part of a word nor inline whitespace
fn leading_words(text: &str, max: usize) -> Vec<&str> {
    let mut words = Vec::new();
    // Leading punctuation such as an opening quote is not part of the word
    let mut rest = text.trim_start_matches(|c: char| !is_word_char(c) && !c.is_whitespace());

    while words.len() < max {
        let end = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
        let word = rest[..end].trim_matches(['-', '\'']);
        if word.is_empty() {
            break;
        }
        words.push(word);

        rest = &rest[end..];
        let after_space = rest.trim_start_matches([' ', '\t']);
        if after_space.len() == rest.len() {
            break;
        }
        rest = after_space;
    }

    words
}

/// `Rained` -> `rained`; `None` when the first letter is not uppercase
fn decapitalize(word: &str) -> Option<String> {
    let mut chars = word.chars();
    let first = chars.next().filter(|c| c.is_uppercase())?;
    Some(first.to_lowercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_mode_from_leading_char() {
        assert_eq!(LookupMode::detect("Rained"), LookupMode::AsciiLike);
        assert_eq!(LookupMode::detect(" x"), LookupMode::AsciiLike);
        assert_eq!(LookupMode::detect("猫と犬"), LookupMode::Unsegmented);
        assert_eq!(LookupMode::detect("é"), LookupMode::Unsegmented);
        assert_eq!(LookupMode::detect(""), LookupMode::Unsegmented);
    }

    #[test]
    fn capitalized_variant_follows_literal_form() {
        let words = candidates("Rained cats", true, true);
        assert_eq!(&words[..2], ["Rained", "rained"]);
        assert_eq!(words, ["Rained", "rained", "Rained cats", "rained cats"]);
    }

    #[test]
    fn no_variant_when_disabled_or_lowercase() {
        assert_eq!(candidates("Rained", false, true), ["Rained"]);
        assert_eq!(candidates("rained", true, true), ["rained"]);
    }

    #[test]
    fn compounds_longest_first() {
        let words = candidates("rained cats and dogs, really", true, true);
        assert_eq!(
            words,
            [
                "rained",
                "rained cats and dogs",
                "rained cats and",
                "rained cats",
            ]
        );
    }

    #[test]
    fn compound_limit_and_whitespace() {
        let generator = CandidateGenerator::new(LookupConfig {
            max_compound_words: 2,
            ..LookupConfig::default()
        });
        assert_eq!(
            generator.candidates("look   up to", false, true),
            ["look", "look up"]
        );
    }

    #[test]
    fn hyphenated_words() {
        let words = candidates("E-mail me", true, true);
        assert_eq!(
            words,
            [
                "E-mail", "e-mail", "Email", "email", "E mail", "e mail", "E", "e",
                "E-mail me", "e-mail me",
            ]
        );
    }

    #[test]
    fn punctuation_bounds_the_base_word() {
        assert_eq!(candidates("(don't) stop", false, true), ["don't"]);
        assert_eq!(candidates("dogs.", false, true), ["dogs"]);
        assert!(candidates("...", true, true).is_empty());
    }

    #[test]
    fn unsegmented_shrinks_from_full_span() {
        assert_eq!(candidates("猫と犬", false, false), ["猫と犬", "猫と", "猫"]);
        assert_eq!(candidates("猫 犬", false, false), ["猫"]);

        let generator = CandidateGenerator::new(LookupConfig {
            max_unsegmented_chars: 2,
            ..LookupConfig::default()
        });
        assert_eq!(generator.candidates("猫と犬", false, false), ["猫と", "猫"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(candidates("", true, true).is_empty());
        assert!(candidates("", false, false).is_empty());
        assert!(candidates("   ", true, true).is_empty());
    }
}
