use std::collections::HashSet;
use tracing::debug;

/// ISO 639-1 codes of every language NLTK ships a stopword list for.
pub const NLTK_LANGUAGES: [&str; 23] = [
    "ar", "az", "da", "de", "el", "en", "es", "fi", "fr", "hu", "id", "it", "kk", "ne", "nl",
    "no", "pt", "ro", "ru", "sl", "sv", "tg", "tr",
];

/// Case-sensitive stopword set. Matching happens on lemmas, so a
/// capitalised "The" is kept while "the" is dropped.
#[derive(Debug, Clone, Default)]
pub struct StopwordList {
    words: HashSet<String>,
}

impl StopwordList {
    /// Union of the NLTK lists of every language, so Spanish "de" is dropped
    /// from an English comment as well.
    pub fn all_languages() -> Self {
        let list = Self::for_languages(&NLTK_LANGUAGES);
        debug!("Loaded {} stopwords across {} languages", list.len(), NLTK_LANGUAGES.len());
        list
    }

    /// Languages are ISO 639-1 codes from [`NLTK_LANGUAGES`]; unknown codes
    /// contribute nothing.
    pub fn for_languages(codes: &[&str]) -> Self {
        let words = codes
            .iter()
            .filter(|code| NLTK_LANGUAGES.contains(*code))
            .flat_map(|code| stop_words::get(code).iter())
            .map(|word| word.to_string())
            .collect();
        Self { words }
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_list() {
        let stopwords = StopwordList::for_languages(&["en"]);
        assert_eq!(stopwords.len(), 179);
        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("don't"));
        assert!(!stopwords.contains("The"));
        assert!(!stopwords.contains("good"));
        assert!(!stopwords.contains("de"));
    }

    #[test]
    fn test_union_covers_every_language() {
        let english = StopwordList::for_languages(&["en"]);
        let all = StopwordList::all_languages();
        assert!(all.len() > english.len());
        for word in ["the", "la", "es", "de", "und", "и"] {
            assert!(all.contains(word), "{} should be a stopword", word);
        }
        assert!(!all.contains("vida"));
        assert!(!all.contains("good"));
    }

    #[test]
    fn test_unknown_language_is_ignored() {
        assert!(StopwordList::for_languages(&["xx"]).is_empty());
    }

    #[test]
    fn test_extra_words() {
        let stopwords = StopwordList::for_languages(&["en"]).with_words(["lol"]);
        assert!(stopwords.contains("lol"));
    }
}
