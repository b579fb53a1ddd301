/// Range of precomposed Hangul syllables (가..힣).
const HANGUL_SYLLABLES: std::ops::RangeInclusive<char> = '\u{AC00}'..='\u{D7A3}';

/// Decides whether a text is already written in the target language by
/// looking at the share of Hangul syllables among its non-space characters.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    threshold: f64,
}

impl LanguageDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Fraction of non-space characters that are Hangul syllables.
    pub fn script_ratio(text: &str) -> f64 {
        let script_chars = text.chars().filter(|c| HANGUL_SYLLABLES.contains(c)).count();
        let stripped_len = text.chars().filter(|c| *c != ' ').count();
        script_chars as f64 / stripped_len.max(1) as f64
    }

    /// Empty text counts as already in the target language.
    pub fn is_target_language(&self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        Self::script_ratio(text) > self.threshold
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(0.3)
    }
}
