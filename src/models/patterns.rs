use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::intent::{IntentKind, Language};

/// On-disk shape of `intents.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentsFile {
    #[serde(default)]
    pub intents: BTreeMap<String, IntentDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentDefinition {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub responses: HashMap<String, String>,
}

/// Trigger phrases per intent name plus canned responses for stateless
/// intents. Phrases are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternTable {
    patterns: BTreeMap<String, Vec<String>>,
    responses: HashMap<String, HashMap<Language, String>>,
}

impl PatternTable {
    pub fn from_file(file: IntentsFile) -> Self {
        let mut table = PatternTable::default();
        for (name, definition) in file.intents {
            table.insert(&name, definition.patterns.iter().map(String::as_str));
            for (tag, text) in &definition.responses {
                match tag.as_str() {
                    "en" | "es" => table.set_response(&name, Language::parse(tag), text),
                    other => tracing::warn!(intent = %name, language = other, "ignoring response in unsupported language"),
                }
            }
        }
        table
    }

    /// Registers phrases for an intent. Blank phrases are dropped since they
    /// would match every input.
    pub fn insert<'a>(&mut self, intent: &str, phrases: impl IntoIterator<Item = &'a str>) {
        let entry = self.patterns.entry(intent.to_string()).or_default();
        for phrase in phrases {
            let phrase = phrase.trim().to_lowercase();
            if phrase.is_empty() {
                tracing::warn!(intent, "ignoring blank trigger phrase");
                continue;
            }
            entry.push(phrase);
        }
    }

    pub fn set_response(&mut self, intent: &str, language: Language, text: &str) {
        self.responses
            .entry(intent.to_string())
            .or_default()
            .insert(language, text.to_string());
    }

    /// First registered phrase of `kind` contained in `text`.
    pub fn first_match(&self, kind: IntentKind, text: &str) -> Option<&str> {
        self.patterns
            .get(kind.as_str())?
            .iter()
            .find(|phrase| text.contains(phrase.as_str()))
            .map(String::as_str)
    }

    /// Canned response for `kind`, falling back to English.
    pub fn response(&self, kind: IntentKind, language: Language) -> Option<&str> {
        let by_language = self.responses.get(kind.as_str())?;
        by_language
            .get(&language)
            .or_else(|| by_language.get(&Language::En))
            .map(String::as_str)
    }

    pub fn intent_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    pub fn patterns(&self) -> &BTreeMap<String, Vec<String>> {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The table the assistant ships with, used when `intents.json` cannot be
    /// read.
    pub fn builtin() -> Self {
        let mut table = PatternTable::default();
        table.insert(
            "service_inquiry",
            [
                "what services do you offer",
                "what services do you have",
                "tell me about your services",
                "what do you do",
                "services",
                "qué servicios ofrecen",
                "qué servicios tienen",
                "cuéntame sobre sus servicios",
                "qué hacen",
            ],
        );
        table.insert(
            "price_inquiry",
            [
                "how much",
                "what is the price",
                "cost",
                "price",
                "pricing",
                "rates",
                "cuánto cuesta",
                "cuál es el precio",
                "precio",
                "costos",
                "tarifas",
            ],
        );
        table.insert(
            "hours_inquiry",
            [
                "what are your hours",
                "when are you open",
                "business hours",
                "schedule",
                "opening times",
                "cuáles son sus horarios",
                "cuándo están abiertos",
                "horarios",
                "horario de atención",
            ],
        );
        table.insert(
            "location_inquiry",
            [
                "where are you located",
                "address",
                "location",
                "directions",
                "how to get there",
                "dónde están ubicados",
                "dirección",
                "ubicación",
                "cómo llegar",
            ],
        );
        table.insert(
            "appointment_booking",
            [
                "book an appointment",
                "make an appointment",
                "schedule",
                "reserve",
                "booking",
                "reservar una cita",
                "hacer una cita",
                "agendar",
                "reserva",
            ],
        );
        table.insert(
            "greeting",
            [
                "hello",
                "hi",
                "good morning",
                "good afternoon",
                "good evening",
                "hola",
                "buenos días",
                "buenas tardes",
                "buenas noches",
            ],
        );
        table.insert(
            "goodbye",
            [
                "goodbye",
                "bye",
                "thank you",
                "thanks",
                "see you",
                "see you later",
                "adiós",
                "hasta luego",
                "gracias",
                "nos vemos",
                "hasta la vista",
            ],
        );

        table.set_response(
            "greeting",
            Language::En,
            "Hello! Welcome to Hera's Nails and Lashes. How can I help you today?",
        );
        table.set_response(
            "greeting",
            Language::Es,
            "¡Hola! Bienvenido a Hera's Nails and Lashes. ¿En qué puedo ayudarte hoy?",
        );
        table.set_response(
            "goodbye",
            Language::En,
            "Thank you for calling Hera's Nails and Lashes. Have a wonderful day!",
        );
        table.set_response(
            "goodbye",
            Language::Es,
            "Gracias por llamar a Hera's Nails and Lashes. ¡Que tengas un buen día!",
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_lowercases_and_drops_blank() {
        let file: IntentsFile = serde_json::from_str(
            r#"{"intents":{"greeting":{"patterns":["Hello","  ",""],"responses":{"en":"Hi there"}}}}"#,
        )
        .unwrap();
        let table = PatternTable::from_file(file);

        assert_eq!(table.patterns()["greeting"], vec!["hello".to_string()]);
        assert_eq!(table.first_match(IntentKind::Greeting, "well hello"), Some("hello"));
        assert_eq!(table.first_match(IntentKind::Greeting, ""), None);
    }

    #[test]
    fn test_response_falls_back_to_english() {
        let mut table = PatternTable::default();
        table.set_response("greeting", Language::En, "Hi there");
        assert_eq!(table.response(IntentKind::Greeting, Language::Es), Some("Hi there"));
        assert_eq!(table.response(IntentKind::Goodbye, Language::En), None);
    }

    #[test]
    fn test_builtin_has_both_languages() {
        let table = PatternTable::builtin();
        assert_eq!(table.len(), 7);
        assert!(table
            .response(IntentKind::Goodbye, Language::Es)
            .unwrap()
            .starts_with("Gracias"));
    }
}
