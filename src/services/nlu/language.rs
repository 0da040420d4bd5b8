use crate::models::Language;

const SPANISH_MARKERS: &[&str] = &[
    "hola", "gracias", "por", "qué", "cómo", "dónde", "cuándo", "cuánto", "servicios", "precio",
    "horarios",
];

/// Coarse substring heuristic; only used when the caller asks for `auto`.
pub fn detect_language(text: &str) -> Language {
    if SPANISH_MARKERS.iter().any(|marker| text.contains(marker)) {
        Language::Es
    } else {
        Language::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_spanish_markers() {
        assert_eq!(detect_language("hola, buenos días"), Language::Es);
        assert_eq!(detect_language("¿cuánto cuesta?"), Language::Es);
    }

    #[test]
    fn test_defaults_to_english() {
        assert_eq!(detect_language("what are your hours"), Language::En);
        assert_eq!(detect_language(""), Language::En);
    }

    #[test]
    fn test_substring_matches_inside_english_words() {
        // "por" inside "important" is enough for the heuristic.
        assert_eq!(detect_language("is it important"), Language::Es);
    }
}
