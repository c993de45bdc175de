use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default lookup text preparation
    fn process(&self, text: &str) -> String {
        // NFKC folds full-width Latin to ASCII and half-width kana to full-width
        let text: String = text.nfkc().collect();

        // Only the first line of a selection is looked up
        text.trim_start()
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
