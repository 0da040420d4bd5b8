use crate::models::{Entity, EntityKind, Intent, IntentKind, Language, PatternTable};

use super::entities::{self, APPOINTMENT_SERVICE_TERMS, SERVICE_SEARCH_TERMS};

type Detector = fn(&str, Language) -> Option<Intent>;

/// Evaluation order. The first stage that yields an intent wins, so a weak
/// early match shadows a stronger later one.
const STAGES: &[(IntentKind, Option<Detector>)] = &[
    (IntentKind::Greeting, None),
    (IntentKind::Goodbye, None),
    (IntentKind::SpecificAppointment, Some(detect_specific_appointment)),
    (IntentKind::AppointmentBooking, None),
    (IntentKind::ServiceInquiry, None),
    (IntentKind::SpecificService, Some(detect_specific_service)),
    (IntentKind::PriceInquiry, None),
    (IntentKind::HoursInquiry, None),
    (IntentKind::LocationInquiry, None),
    (IntentKind::ParkingInquiry, Some(detect_parking)),
    (IntentKind::TransportInquiry, Some(detect_transport)),
    (IntentKind::DetailedServiceInfo, Some(detect_detailed_service_info)),
    (IntentKind::GeneralInquiry, None),
];

const PATTERN_CONFIDENCE: f32 = 0.9;
const DEFAULT_CONFIDENCE: f32 = 0.5;

const APPOINTMENT_KEYWORDS: &[&str] = &[
    "appointment",
    "book",
    "booking",
    "reserve",
    "reservation",
    "schedule",
    "cita",
    "reservar",
    "reserva",
    "agendar",
    "agenda",
    "programar",
];

const SERVICE_INQUIRY_PHRASES: &[&str] = &[
    "what services",
    "tell me about",
    "information about",
    "details about",
    "qué servicios",
    "cuéntame sobre",
    "información sobre",
    "detalles sobre",
    "options",
    "opciones",
    "offer",
    "ofrecen",
    "have",
    "tienen",
];

const DETAIL_PHRASES: &[&str] = &[
    "tell me more about",
    "more details",
    "what includes",
    "what is included",
    "más detalles",
    "qué incluye",
    "qué contiene",
    "descripción",
    "duration",
    "duración",
    "how long",
    "cuánto tiempo",
];

const PARKING_KEYWORDS: &[&str] = &["parking", "estacionamiento", "aparcamiento"];

const TRANSPORT_KEYWORDS: &[&str] = &["transport", "bus", "metro", "transporte", "autobús"];

pub struct IntentClassifier<'a> {
    patterns: &'a PatternTable,
}

impl<'a> IntentClassifier<'a> {
    pub fn new(patterns: &'a PatternTable) -> Self {
        Self { patterns }
    }

    /// Classifies already-normalized text. Never fails: unmatched input ends
    /// up as `general_inquiry`.
    pub fn classify(&self, text: &str, language: Language) -> Intent {
        for (kind, detector) in STAGES {
            if let Some(intent) = self.check(text, *kind, *detector, language) {
                tracing::debug!(intent = intent.kind.as_str(), confidence = intent.confidence, "intent detected");
                return intent;
            }
        }

        tracing::debug!("no specific intent detected, defaulting to general inquiry");
        Intent::new(
            IntentKind::GeneralInquiry,
            DEFAULT_CONFIDENCE,
            language,
            text,
            entities::extract_entities(text),
        )
    }

    fn check(
        &self,
        text: &str,
        kind: IntentKind,
        detector: Option<Detector>,
        language: Language,
    ) -> Option<Intent> {
        if let Some(phrase) = self.patterns.first_match(kind, text) {
            tracing::debug!(intent = kind.as_str(), phrase, "pattern matched");
            return Some(Intent::new(
                kind,
                PATTERN_CONFIDENCE,
                language,
                text,
                entities::extract_entities(text),
            ));
        }

        detector.and_then(|detect| detect(text, language))
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn detect_specific_service(text: &str, language: Language) -> Option<Intent> {
    if let Some((service, form)) = entities::first_term(SERVICE_SEARCH_TERMS, text) {
        tracing::debug!(service, form, "service term found");
        let intent = Intent::new(
            IntentKind::SpecificService,
            0.8,
            language,
            text,
            vec![Entity::new(EntityKind::Service, service)],
        );
        return Some(intent.with_service(service));
    }

    if contains_any(text, SERVICE_INQUIRY_PHRASES) {
        return Some(Intent::new(
            IntentKind::ServiceInquiry,
            0.7,
            language,
            text,
            Vec::new(),
        ));
    }

    None
}

fn detect_detailed_service_info(text: &str, language: Language) -> Option<Intent> {
    contains_any(text, DETAIL_PHRASES).then(|| {
        Intent::new(
            IntentKind::DetailedServiceInfo,
            0.8,
            language,
            text,
            entities::extract_entities(text),
        )
    })
}

/// Guarded on an appointment keyword: without one this yields nothing and
/// the later stages get their turn.
fn detect_specific_appointment(text: &str, language: Language) -> Option<Intent> {
    if !contains_any(text, APPOINTMENT_KEYWORDS) {
        return None;
    }

    if let Some((service, form)) = entities::first_term(APPOINTMENT_SERVICE_TERMS, text) {
        tracing::debug!(service, form, "appointment for a specific service");
        let intent = Intent::new(
            IntentKind::SpecificAppointment,
            0.9,
            language,
            text,
            vec![Entity::new(EntityKind::Service, service)],
        );
        return Some(intent.with_service(service));
    }

    Some(Intent::new(
        IntentKind::AppointmentBooking,
        0.8,
        language,
        text,
        Vec::new(),
    ))
}

fn detect_parking(text: &str, language: Language) -> Option<Intent> {
    contains_any(text, PARKING_KEYWORDS)
        .then(|| Intent::new(IntentKind::ParkingInquiry, 0.8, language, text, Vec::new()))
}

fn detect_transport(text: &str, language: Language) -> Option<Intent> {
    contains_any(text, TRANSPORT_KEYWORDS)
        .then(|| Intent::new(IntentKind::TransportInquiry, 0.8, language, text, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        let table = PatternTable::builtin();
        IntentClassifier::new(&table).classify(text, Language::En)
    }

    #[test]
    fn test_empty_text_is_general_inquiry() {
        let intent = classify("");
        assert_eq!(intent.kind, IntentKind::GeneralInquiry);
        assert_eq!(intent.confidence, 0.5);
        assert!(intent.entities.is_empty());
    }

    #[test]
    fn test_greetings_in_both_languages() {
        assert_eq!(classify("hello").kind, IntentKind::Greeting);
        assert_eq!(classify("hola").kind, IntentKind::Greeting);
        assert_eq!(classify("hello").confidence, 0.9);
    }

    #[test]
    fn test_service_inquiry_from_pattern() {
        assert_eq!(classify("what services do you offer").kind, IntentKind::ServiceInquiry);
    }

    #[test]
    fn test_specific_service_detector() {
        let intent = classify("tell me about manicures");
        assert_eq!(intent.kind, IntentKind::SpecificService);
        assert_eq!(intent.service.as_deref(), Some("manicure"));
        assert_eq!(intent.confidence, 0.8);
        assert_eq!(intent.entities, vec![Entity::new(EntityKind::Service, "manicure")]);
    }

    #[test]
    fn test_loose_service_phrasing_falls_back_to_inquiry() {
        let intent = classify("what options are there");
        assert_eq!(intent.kind, IntentKind::ServiceInquiry);
        assert_eq!(intent.confidence, 0.7);
        assert!(intent.service.is_none());
    }

    #[test]
    fn test_appointment_with_service() {
        let intent = classify("book an appointment for a manicure");
        assert_eq!(intent.kind, IntentKind::SpecificAppointment);
        assert_eq!(intent.service.as_deref(), Some("manicure"));
        assert_eq!(intent.confidence, 0.9);
    }

    #[test]
    fn test_appointment_without_service() {
        let intent = classify("book an appointment");
        assert_eq!(intent.kind, IntentKind::AppointmentBooking);
        assert_eq!(intent.confidence, 0.8);
        assert!(intent.service.is_none());
    }

    #[test]
    fn test_service_alone_is_not_an_appointment() {
        let intent = classify("manicure");
        assert!(!intent.kind.is_appointment());
        assert_eq!(intent.kind, IntentKind::SpecificService);
    }

    #[test]
    fn test_greeting_shadows_service_inquiry() {
        let intent = classify("hello, what services do you offer");
        assert_eq!(intent.kind, IntentKind::Greeting);
    }

    #[test]
    fn test_loose_inquiry_shadows_parking() {
        // "have" is a loose service-inquiry phrase evaluated before parking.
        assert_eq!(classify("do you have parking").kind, IntentKind::ServiceInquiry);
        assert_eq!(classify("is there parking nearby").kind, IntentKind::ParkingInquiry);
    }

    #[test]
    fn test_price_hours_location() {
        let price = classify("how much does it cost");
        assert_eq!(price.kind, IntentKind::PriceInquiry);
        assert_eq!(price.primary_service(), None);
        // A named service is picked up by the earlier specific-service stage.
        assert_eq!(
            classify("how much does a manicure cost").kind,
            IntentKind::SpecificService
        );
        assert_eq!(classify("what are your hours").kind, IntentKind::HoursInquiry);
        assert_eq!(classify("where are you located").kind, IntentKind::LocationInquiry);
        assert_eq!(classify("¿cuánto cuesta?").kind, IntentKind::PriceInquiry);
    }

    #[test]
    fn test_transport_and_detail_detectors() {
        assert_eq!(classify("which bus goes there").kind, IntentKind::Greeting);
        assert_eq!(classify("is the metro close").kind, IntentKind::TransportInquiry);
        let detail = classify("how long does it take");
        assert_eq!(detail.kind, IntentKind::DetailedServiceInfo);
        assert_eq!(detail.confidence, 0.8);
    }

    #[test]
    fn test_schedule_keyword_guards_into_booking() {
        // "schedule" is both an appointment keyword and an hours phrase; the
        // appointment stage runs first.
        assert_eq!(classify("schedule").kind, IntentKind::AppointmentBooking);
    }

    #[test]
    fn test_punctuation_only_falls_through() {
        let intent = classify("?!...");
        assert_eq!(intent.kind, IntentKind::GeneralInquiry);
    }

    #[test]
    fn test_language_is_passed_through() {
        let table = PatternTable::builtin();
        let intent = IntentClassifier::new(&table).classify("hello", Language::Es);
        assert_eq!(intent.language, Language::Es);
    }
}
