use std::collections::HashMap;

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("thieves", "thief"),
    ("data", "datum"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("theses", "thesis"),
    ("crises", "crisis"),
];

/// Rule-based noun lemmatizer. Only lowercase alphabetic words are
/// rewritten; anything else (capitalised words, numbers, punctuation) is
/// returned unchanged.
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self {
            exceptions: IRREGULAR_PLURALS.iter().copied().collect(),
        }
    }

    pub fn lemmatize(&self, word: &str) -> String {
        if !word.chars().all(|c| c.is_ascii_lowercase()) {
            return word.to_string();
        }
        if let Some(lemma) = self.exceptions.get(word) {
            return lemma.to_string();
        }
        if word.len() <= 3 {
            return word.to_string();
        }

        if word.len() > 4 {
            if let Some(stem) = word.strip_suffix("ies") {
                return format!("{}y", stem);
            }
        }
        for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
        word.to_string()
    }
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("dogs"), "dog");
        assert_eq!(lemmatizer.lemmatize("houses"), "house");
        assert_eq!(lemmatizer.lemmatize("stories"), "story");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("churches"), "church");
        assert_eq!(lemmatizer.lemmatize("classes"), "class");
    }

    #[test]
    fn test_irregular_plurals() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("women"), "woman");
        assert_eq!(lemmatizer.lemmatize("data"), "datum");
    }

    #[test]
    fn test_words_left_alone() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("class"), "class");
        assert_eq!(lemmatizer.lemmatize("virus"), "virus");
        assert_eq!(lemmatizer.lemmatize("this"), "this");
        assert_eq!(lemmatizer.lemmatize("good"), "good");
        assert_eq!(lemmatizer.lemmatize("Dogs"), "Dogs");
        assert_eq!(lemmatizer.lemmatize("dogs,"), "dogs,");
        assert_eq!(lemmatizer.lemmatize("its"), "its");
    }
}
