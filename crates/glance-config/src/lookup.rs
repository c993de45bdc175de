use std::env;

use serde::{Deserialize, Serialize};

fn default_max_compound_words() -> usize {
    4
}

fn default_max_unsegmented_chars() -> usize {
    32
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct LookupConfig {
    /// Longest phrase tried in space-delimited text
    #[serde(default = "default_max_compound_words")]
    pub max_compound_words: usize,
    #[serde(default = "default_max_unsegmented_chars")]
    pub max_unsegmented_chars: usize,
}

impl LookupConfig {
    pub fn new() -> Self {
        let max_compound_words = env::var("LOOKUP_MAX_COMPOUND_WORDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_compound_words);

        let max_unsegmented_chars = env::var("LOOKUP_MAX_UNSEGMENTED_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_unsegmented_chars);

        Self {
            max_compound_words,
            max_unsegmented_chars,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_compound_words: default_max_compound_words(),
            max_unsegmented_chars: default_max_unsegmented_chars(),
        }
    }
}
