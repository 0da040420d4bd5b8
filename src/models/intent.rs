use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Locale tag used for telephony speech synthesis and recognition.
    pub fn locale(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Es => "es-ES",
        }
    }

    /// Accepts `en`, `es` and locale tags such as `es-ES` or `en-US`.
    /// Anything else falls back to English.
    pub fn parse(s: &str) -> Self {
        let tag = s.trim().to_lowercase();
        if tag == "es" || tag.starts_with("es-") || tag.starts_with("es_") {
            Language::Es
        } else {
            Language::En
        }
    }
}

/// Language requested by the caller: a fixed language, or `auto` to run the
/// detection heuristic over the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageHint {
    Fixed(Language),
    Auto,
}

impl LanguageHint {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("auto") {
            LanguageHint::Auto
        } else {
            LanguageHint::Fixed(Language::parse(s))
        }
    }
}

impl From<Language> for LanguageHint {
    fn from(language: Language) -> Self {
        LanguageHint::Fixed(language)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Greeting,
    Goodbye,
    SpecificAppointment,
    AppointmentBooking,
    ServiceInquiry,
    SpecificService,
    PriceInquiry,
    HoursInquiry,
    LocationInquiry,
    ParkingInquiry,
    TransportInquiry,
    DetailedServiceInfo,
    GeneralInquiry,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Greeting => "greeting",
            IntentKind::Goodbye => "goodbye",
            IntentKind::SpecificAppointment => "specific_appointment",
            IntentKind::AppointmentBooking => "appointment_booking",
            IntentKind::ServiceInquiry => "service_inquiry",
            IntentKind::SpecificService => "specific_service",
            IntentKind::PriceInquiry => "price_inquiry",
            IntentKind::HoursInquiry => "hours_inquiry",
            IntentKind::LocationInquiry => "location_inquiry",
            IntentKind::ParkingInquiry => "parking_inquiry",
            IntentKind::TransportInquiry => "transport_inquiry",
            IntentKind::DetailedServiceInfo => "detailed_service_info",
            IntentKind::GeneralInquiry => "general_inquiry",
        }
    }

    pub fn is_appointment(&self) -> bool {
        matches!(
            self,
            IntentKind::SpecificAppointment | IntentKind::AppointmentBooking
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Service,
    Time,
    Price,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub value: String,
}

impl Entity {
    pub fn new(kind: EntityKind, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Result of classifying one utterance. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(rename = "type")]
    pub kind: IntentKind,
    pub confidence: f32,
    pub language: Language,
    pub original_text: String,
    pub entities: Vec<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Intent {
    pub fn new(
        kind: IntentKind,
        confidence: f32,
        language: Language,
        text: &str,
        entities: Vec<Entity>,
    ) -> Self {
        Self {
            kind,
            confidence,
            language,
            original_text: text.to_string(),
            entities,
            service: None,
        }
    }

    pub fn with_service(mut self, service: &str) -> Self {
        self.service = Some(service.to_string());
        self
    }

    /// Service the response should talk about: the explicit `service` field,
    /// else the first extracted entity when it names a service.
    pub fn primary_service(&self) -> Option<&str> {
        self.service.as_deref().or_else(|| {
            self.entities
                .first()
                .filter(|e| e.kind == EntityKind::Service)
                .map(|e| e.value.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_locales() {
        assert_eq!(Language::parse("es"), Language::Es);
        assert_eq!(Language::parse("es-ES"), Language::Es);
        assert_eq!(Language::parse("en-US"), Language::En);
        assert_eq!(Language::parse("fr"), Language::En);
        assert_eq!(LanguageHint::parse("AUTO"), LanguageHint::Auto);
    }

    #[test]
    fn test_intent_serializes_wire_names() {
        let intent = Intent::new(
            IntentKind::SpecificService,
            0.8,
            Language::En,
            "tell me about manicures",
            vec![Entity::new(EntityKind::Service, "manicure")],
        )
        .with_service("manicure");

        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["type"], "specific_service");
        assert_eq!(json["language"], "en");
        assert_eq!(json["originalText"], "tell me about manicures");
        assert_eq!(json["entities"][0]["type"], "service");
        assert_eq!(json["service"], "manicure");
    }

    #[test]
    fn test_primary_service_skips_non_service_entity() {
        let intent = Intent::new(
            IntentKind::PriceInquiry,
            0.9,
            Language::En,
            "how much today",
            vec![
                Entity::new(EntityKind::Time, "today"),
                Entity::new(EntityKind::Price, "how much"),
            ],
        );
        assert_eq!(intent.primary_service(), None);
    }
}
