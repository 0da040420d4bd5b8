use chrono::Weekday;
use once_cell::sync::Lazy;

use crate::models::{
    DayKey, Intent, IntentKind, KnowledgeBase, Language, PatternTable, ServiceCategory,
    ServiceVariant,
};

use super::templates::{lookup, render, TemplateId};

/// Greeting and goodbye replies for tables loaded without responses.
static BUILTIN_PATTERNS: Lazy<PatternTable> = Lazy::new(PatternTable::builtin);

/// Canonical service key → text searched for in category and variant names.
const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("manicure", "manicuras"),
    ("pedicure", "pedicuras"),
    ("eyebrows", "cejas"),
    ("eyelashes", "pestañas"),
    ("facial", "faciales"),
    ("nails", "manicuras"),
    ("micropigmentation", "micropigmentación"),
];

const MAX_LISTED_VARIANTS: usize = 3;

pub struct Responder<'a> {
    kb: &'a KnowledgeBase,
    patterns: &'a PatternTable,
}

impl<'a> Responder<'a> {
    pub fn new(kb: &'a KnowledgeBase, patterns: &'a PatternTable) -> Self {
        Self { kb, patterns }
    }

    /// Renders the answer for `intent`. Lookup misses produce a "not found"
    /// answer; nothing here fails.
    pub fn respond(&self, intent: Option<&Intent>, language: Language) -> String {
        let Some(intent) = intent else {
            return lookup(TemplateId::GeneralHelp, language).to_string();
        };

        match intent.kind {
            IntentKind::ServiceInquiry => self.service_overview(language),
            IntentKind::SpecificService => self.specific_service(intent.primary_service(), language),
            IntentKind::DetailedServiceInfo => {
                self.detailed_service(intent.primary_service(), language)
            }
            IntentKind::PriceInquiry => self.prices(intent.primary_service(), language),
            IntentKind::HoursInquiry => self.hours(language),
            IntentKind::LocationInquiry => self.location(language),
            IntentKind::ParkingInquiry => self.parking(language),
            IntentKind::TransportInquiry => self.transport(language),
            IntentKind::SpecificAppointment | IntentKind::AppointmentBooking => {
                appointment_prompt(intent.service.as_deref(), language)
            }
            IntentKind::Greeting | IntentKind::Goodbye => self
                .patterns
                .response(intent.kind, language)
                .map(str::to_string)
                .unwrap_or_else(|| self.canned(intent.kind, language)),
            IntentKind::GeneralInquiry => lookup(TemplateId::GeneralHelp, language).to_string(),
        }
    }

    fn canned(&self, kind: IntentKind, language: Language) -> String {
        BUILTIN_PATTERNS
            .response(kind, language)
            .map(str::to_string)
            .unwrap_or_else(|| lookup(TemplateId::GeneralHelp, language).to_string())
    }

    fn service_overview(&self, language: Language) -> String {
        let categories: Vec<&str> = self
            .kb
            .services()
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        render(
            TemplateId::ServiceOverview,
            language,
            &[
                ("count", &categories.len().to_string()),
                ("categories", &categories.join(", ")),
            ],
        )
    }

    fn specific_service(&self, service: Option<&str>, language: Language) -> String {
        let Some(category) = service.and_then(|s| self.find_category(s)) else {
            return render(
                TemplateId::ServiceNotFound,
                language,
                &[("service", &service_label(service, language))],
            );
        };

        let mut response = render(
            TemplateId::ServiceSummary,
            language,
            &[
                ("category", &category.category),
                ("count", &category.variants.len().to_string()),
                ("price", &price_range(category, language)),
            ],
        );

        if !category.variants.is_empty() {
            let options: Vec<&str> = category
                .variants
                .iter()
                .take(MAX_LISTED_VARIANTS)
                .map(|v| v.name.as_str())
                .collect();
            response.push_str(&render(
                TemplateId::ServiceSomeOptions,
                language,
                &[("options", &options.join(", "))],
            ));
        }

        response.push_str(lookup(TemplateId::ServiceFollowUp, language));
        response
    }

    fn detailed_service(&self, service: Option<&str>, language: Language) -> String {
        let Some(variant) = service.and_then(|s| self.find_variant(s)) else {
            return lookup(TemplateId::DetailNotFound, language).to_string();
        };

        let price = variant
            .price()
            .map(|p| format!("{}€", format_price(p)))
            .unwrap_or_else(|| lookup(TemplateId::PriceOnRequest, language).to_string());

        render(
            TemplateId::DetailedService,
            language,
            &[
                ("name", &variant.name),
                ("description", &variant.description),
                ("price", &price),
                ("duration", variant.duration.as_deref().unwrap_or("Variable")),
            ],
        )
    }

    fn prices(&self, service: Option<&str>, language: Language) -> String {
        let Some(service) = service else {
            let prices = self.kb.all_prices();
            let Some((min, max)) = min_max(&prices) else {
                return lookup(TemplateId::PriceUnavailable, language).to_string();
            };
            return render(
                TemplateId::PriceOverview,
                language,
                &[("min", &format_price(min)), ("max", &format_price(max))],
            );
        };

        match self.find_category(service) {
            Some(category) => render(
                TemplateId::PriceForService,
                language,
                &[
                    ("category", &category.category),
                    ("price", &price_range(category, language)),
                ],
            ),
            None => render(
                TemplateId::PriceNotFound,
                language,
                &[("service", service)],
            ),
        }
    }

    fn hours(&self, language: Language) -> String {
        let days = self.kb.schedule.ordered_hours();
        if days.is_empty() {
            return lookup(TemplateId::HoursFallback, language).to_string();
        }

        let hours: Vec<String> = days
            .iter()
            .map(|(day, range)| format!("{}: {}", day_name(day, language), time_range(range, language)))
            .collect();
        render(TemplateId::HoursList, language, &[("hours", &hours.join(", "))])
    }

    fn location(&self, language: Language) -> String {
        let Some(location) = self.kb.schedule.location.as_ref() else {
            return lookup(TemplateId::LocationFallback, language).to_string();
        };

        let address = location
            .address
            .as_deref()
            .unwrap_or_else(|| lookup(TemplateId::AddressFallback, language));
        let directions = location
            .directions
            .as_deref()
            .unwrap_or_else(|| lookup(TemplateId::DirectionsFallback, language));

        render(
            TemplateId::LocationDetails,
            language,
            &[("address", address), ("directions", directions)],
        )
    }

    fn parking(&self, language: Language) -> String {
        let Some(parking) = self.kb.schedule.parking.as_ref() else {
            return lookup(TemplateId::ParkingFallback, language).to_string();
        };

        let mut response = lookup(TemplateId::ParkingIntro, language).to_string();
        for option in &parking.options {
            response.push_str(&render(
                TemplateId::ParkingOption,
                language,
                &[
                    ("kind", &option.kind),
                    ("location", &option.location),
                    ("distance", &option.distance),
                    ("cost", &option.cost),
                ],
            ));
        }
        response.push_str(lookup(TemplateId::ParkingOutro, language));
        response
    }

    fn transport(&self, language: Language) -> String {
        let Some(transport) = self
            .kb
            .schedule
            .location
            .as_ref()
            .and_then(|l| l.public_transport.as_ref())
        else {
            return lookup(TemplateId::TransportFallback, language).to_string();
        };

        let mut response = lookup(TemplateId::TransportIntro, language).to_string();
        if let Some(bus) = &transport.bus {
            let lines: Vec<&str> = bus.iter().map(|b| b.line.as_str()).collect();
            response.push_str(&render(
                TemplateId::TransportBus,
                language,
                &[("lines", &lines.join(", "))],
            ));
        }
        if let Some(metro) = &transport.metro {
            let lines: Vec<&str> = metro.iter().map(|m| m.line.as_str()).collect();
            response.push_str(&render(
                TemplateId::TransportMetro,
                language,
                &[("lines", &lines.join(", "))],
            ));
        }
        response.push_str(lookup(TemplateId::TransportOutro, language));
        response
    }

    /// First category whose name, or one of whose variant names, contains the
    /// searched term for `service`.
    pub fn find_category(&self, service: &str) -> Option<&'a ServiceCategory> {
        let term = category_term(service);
        self.kb.services().iter().find(|category| {
            category.category.to_lowercase().contains(&term)
                || category
                    .variants
                    .iter()
                    .any(|v| v.name.to_lowercase().contains(&term))
        })
    }

    fn find_variant(&self, service: &str) -> Option<&'a ServiceVariant> {
        let term = service.to_lowercase();
        self.kb
            .services()
            .iter()
            .flat_map(|category| category.variants.iter())
            .find(|variant| variant.name.to_lowercase().contains(&term))
    }
}

fn category_term(service: &str) -> String {
    CATEGORY_ALIASES
        .iter()
        .find(|(canonical, _)| *canonical == service)
        .map(|(_, term)| *term)
        .unwrap_or(service)
        .to_lowercase()
}

fn appointment_prompt(service: Option<&str>, language: Language) -> String {
    match service {
        Some(service) => render(
            TemplateId::AppointmentForService,
            language,
            &[("service", service)],
        ),
        None => lookup(TemplateId::AppointmentGeneric, language).to_string(),
    }
}

fn service_label(service: Option<&str>, language: Language) -> String {
    service
        .map(str::to_string)
        .unwrap_or_else(|| lookup(TemplateId::UnknownService, language).to_string())
}

/// Price text for one category: a single price, a min–max range, or "on
/// request" when nothing is priced.
pub fn price_range(category: &ServiceCategory, language: Language) -> String {
    if category.variants.is_empty() {
        return match category.flat_price() {
            Some(price) => render(
                TemplateId::SinglePrice,
                language,
                &[("price", &format_price(price))],
            ),
            None => lookup(TemplateId::PriceOnRequest, language).to_string(),
        };
    }

    match min_max(&category.variant_prices()) {
        Some((min, max)) if min == max => render(
            TemplateId::SinglePrice,
            language,
            &[("price", &format_price(min))],
        ),
        Some((min, max)) => render(
            TemplateId::PriceRange,
            language,
            &[("min", &format_price(min)), ("max", &format_price(max))],
        ),
        None => lookup(TemplateId::PriceOnRequest, language).to_string(),
    }
}

fn min_max(prices: &[f64]) -> Option<(f64, f64)> {
    let first = *prices.first()?;
    Some(
        prices
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
    )
}

/// Plain number: `25` for whole euros, `12.5` otherwise.
pub fn format_price(price: f64) -> String {
    format!("{price}")
}

const SPANISH_DAYS: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const ENGLISH_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn day_name(day: &DayKey, language: Language) -> String {
    match day {
        DayKey::Weekday(weekday) => weekday_name(*weekday, language).to_string(),
        DayKey::Other(name) => name.clone(),
    }
}

pub fn weekday_name(weekday: Weekday, language: Language) -> &'static str {
    let index = weekday.num_days_from_monday() as usize;
    match language {
        Language::En => ENGLISH_DAYS[index],
        Language::Es => SPANISH_DAYS[index],
    }
}

fn time_range(range: &str, language: Language) -> String {
    if range.trim().eq_ignore_ascii_case("closed") {
        lookup(TemplateId::Closed, language).to_string()
    } else {
        range.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, Entity, EntityKind, Schedule};

    fn kb() -> KnowledgeBase {
        KnowledgeBase {
            catalog: serde_json::from_str(
                r#"{"services":[
                    {"category":"Manicuras","url":"https://example.com/manicuras","variants":[
                        {"name":"Manicura express","description":"Limado y esmaltado","price_original_eur":12,"duration":"30 min"},
                        {"name":"Manicura semipermanente","description":"Esmalte semipermanente","price_original_eur":25,"price_discounted_eur":20,"duration":"45 min"},
                        {"name":"Manicura spa","description":"Exfoliación e hidratación","price_original_eur":30,"duration":"60 min"},
                        {"name":"Manicura francesa","description":"Diseño clásico","price_original_eur":28,"duration":"50 min"}
                    ]},
                    {"category":"Packs","price_original_eur":55.5}
                ]}"#,
            )
            .unwrap(),
            schedule: serde_json::from_str(
                r#"{
                    "business_hours":{"monday":"9:30 AM - 8:30 PM","saturday":"9:30 AM - 2:30 PM","sunday":"Closed"},
                    "location":{"address":"Calle Santos Justo y Pastor 72, Valencia","directions":"Near La Salud.",
                        "public_transport":{"bus":[{"line":"18"},{"line":"40"}],"metro":[{"line":"3"}]}},
                    "parking":{"options":[{"type":"Private parking","location":"Calle Doctor Manuel Candela","distance":"5 min","cost":"2€/h"}]}
                }"#,
            )
            .unwrap(),
        }
    }

    fn intent(kind: IntentKind, entities: Vec<Entity>) -> Intent {
        Intent::new(kind, 0.9, Language::En, "", entities)
    }

    #[test]
    fn test_service_overview_lists_categories() {
        let kb = kb();
        let table = PatternTable::builtin();
        let text = Responder::new(&kb, &table)
            .respond(Some(&intent(IntentKind::ServiceInquiry, vec![])), Language::En);
        assert!(text.starts_with("We offer 2 service categories: Manicuras, Packs."));
    }

    #[test]
    fn test_specific_service_lists_three_variants_and_range() {
        let kb = kb();
        let table = PatternTable::builtin();
        let intent = intent(IntentKind::SpecificService, vec![]).with_service("manicure");
        let text = Responder::new(&kb, &table).respond(Some(&intent), Language::En);

        assert!(text.contains("For Manicuras, we have 4 options available."));
        assert!(text.contains("Prices from 12€ to 30€"));
        assert!(text.contains("Manicura express, Manicura semipermanente, Manicura spa."));
        assert!(!text.contains("francesa"));
    }

    #[test]
    fn test_unknown_service_is_not_found_template() {
        let kb = kb();
        let table = PatternTable::builtin();
        let intent = intent(IntentKind::SpecificService, vec![]).with_service("tinte");
        let text = Responder::new(&kb, &table).respond(Some(&intent), Language::Es);
        assert!(text.contains("no encontramos información específica sobre tinte"));
    }

    #[test]
    fn test_detailed_service_renders_variant() {
        let kb = kb();
        let table = PatternTable::builtin();
        let intent = intent(
            IntentKind::DetailedServiceInfo,
            vec![Entity::new(EntityKind::Service, "semipermanente")],
        );
        let text = Responder::new(&kb, &table).respond(Some(&intent), Language::En);
        assert_eq!(
            text,
            "Manicura semipermanente: Esmalte semipermanente. Price: 20€. Duration: 45 min. Would you like to book an appointment for this service?"
        );
    }

    #[test]
    fn test_detailed_service_without_entity() {
        let kb = kb();
        let table = PatternTable::builtin();
        let text = Responder::new(&kb, &table)
            .respond(Some(&intent(IntentKind::DetailedServiceInfo, vec![])), Language::En);
        assert!(text.starts_with("Sorry, I couldn't find detailed information"));
    }

    #[test]
    fn test_global_price_range() {
        let kb = kb();
        let table = PatternTable::builtin();
        let text = Responder::new(&kb, &table)
            .respond(Some(&intent(IntentKind::PriceInquiry, vec![])), Language::En);
        assert!(text.starts_with("Our prices range from 12€ to 55.5€"));
    }

    #[test]
    fn test_price_for_flat_priced_category() {
        let kb = kb();
        let table = PatternTable::builtin();
        let intent = intent(
            IntentKind::PriceInquiry,
            vec![Entity::new(EntityKind::Service, "pack")],
        );
        let text = Responder::new(&kb, &table).respond(Some(&intent), Language::Es);
        assert!(text.starts_with("Para Packs: Precio: 55.5€."));
    }

    #[test]
    fn test_price_without_prices_has_no_infinity() {
        let kb = KnowledgeBase::default();
        let table = PatternTable::builtin();
        let text = Responder::new(&kb, &table)
            .respond(Some(&intent(IntentKind::PriceInquiry, vec![])), Language::En);
        assert!(!text.contains("inf"));
        assert!(!text.contains('€'));
    }

    #[test]
    fn test_hours_localized() {
        let kb = kb();
        let table = PatternTable::builtin();
        let responder = Responder::new(&kb, &table);
        let hours = intent(IntentKind::HoursInquiry, vec![]);

        let es = responder.respond(Some(&hours), Language::Es);
        assert!(es.contains("lunes: 9:30 AM - 8:30 PM"));
        assert!(es.contains("domingo: Cerrado"));
        for day in ENGLISH_DAYS {
            assert!(!es.to_lowercase().contains(&day.to_lowercase()));
        }

        let en = responder.respond(Some(&hours), Language::En);
        assert_eq!(
            en,
            "Our hours are: Monday: 9:30 AM - 8:30 PM, Saturday: 9:30 AM - 2:30 PM, Sunday: Closed. Would you like to make an appointment?"
        );
    }

    #[test]
    fn test_missing_schedule_uses_fallbacks() {
        let kb = KnowledgeBase {
            catalog: Catalog::default(),
            schedule: Schedule::default(),
        };
        let table = PatternTable::builtin();
        let responder = Responder::new(&kb, &table);

        let hours = responder.respond(Some(&intent(IntentKind::HoursInquiry, vec![])), Language::En);
        assert!(hours.contains("9:30 AM to 8:30 PM"));
        let parking =
            responder.respond(Some(&intent(IntentKind::ParkingInquiry, vec![])), Language::En);
        assert!(parking.starts_with("We have nearby parking options."));
        let transport =
            responder.respond(Some(&intent(IntentKind::TransportInquiry, vec![])), Language::Es);
        assert!(transport.starts_with("Tenemos fácil acceso en transporte público."));
    }

    #[test]
    fn test_location_parking_transport_from_kb() {
        let kb = kb();
        let table = PatternTable::builtin();
        let responder = Responder::new(&kb, &table);

        let location =
            responder.respond(Some(&intent(IntentKind::LocationInquiry, vec![])), Language::En);
        assert_eq!(
            location,
            "We are located at Calle Santos Justo y Pastor 72, Valencia. Near La Salud. Would you like information about public transportation or parking?"
        );

        let parking =
            responder.respond(Some(&intent(IntentKind::ParkingInquiry, vec![])), Language::Es);
        assert!(parking.contains("Private parking en Calle Doctor Manuel Candela (5 min, 2€/h)."));

        let transport =
            responder.respond(Some(&intent(IntentKind::TransportInquiry, vec![])), Language::En);
        assert!(transport.contains("Bus lines 18, 40. Metro lines 3."));
    }

    #[test]
    fn test_appointment_prompt_names_service() {
        let kb = kb();
        let table = PatternTable::builtin();
        let responder = Responder::new(&kb, &table);
        let specific = intent(IntentKind::SpecificAppointment, vec![]).with_service("pedicure");
        assert!(responder
            .respond(Some(&specific), Language::En)
            .contains("book an appointment for pedicure"));
        let generic = intent(IntentKind::AppointmentBooking, vec![]);
        assert!(responder
            .respond(Some(&generic), Language::Es)
            .starts_with("Perfecto, entiendo que quieres reservar una cita."));
    }

    #[test]
    fn test_greeting_falls_back_when_table_lacks_responses() {
        let kb = kb();
        let table = PatternTable::default();
        let responder = Responder::new(&kb, &table);
        let text = responder.respond(Some(&intent(IntentKind::Greeting, vec![])), Language::Es);
        assert!(text.starts_with("¡Hola!"));

        let builtin = BUILTIN_PATTERNS.response(IntentKind::Goodbye, Language::En).unwrap();
        let text = responder.respond(Some(&intent(IntentKind::Goodbye, vec![])), Language::En);
        assert_eq!(text, builtin);
    }

    #[test]
    fn test_no_intent_gets_general_help() {
        let kb = kb();
        let table = PatternTable::builtin();
        let text = Responder::new(&kb, &table).respond(None, Language::En);
        assert!(text.starts_with("I can help you with information about our services"));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(25.0), "25");
        assert_eq!(format_price(12.5), "12.5");
    }
}
