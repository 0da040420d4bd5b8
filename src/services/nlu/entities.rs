use crate::models::{Entity, EntityKind};

/// Canonical service key followed by the surface forms that name it.
pub type Vocabulary = &'static [(&'static str, &'static [&'static str])];

pub const SERVICE_TERMS: Vocabulary = &[
    ("manicure", &["manicure", "manicuras", "manicura", "manicures"]),
    ("pedicure", &["pedicure", "pedicuras", "pedicura", "pedicures"]),
    ("eyebrows", &["eyebrows", "cejas", "ceja", "eyebrow"]),
    ("eyelashes", &["eyelashes", "pestañas", "pestaña", "eyelash", "lash", "lashes"]),
    ("facial", &["facial", "faciales", "facials"]),
    ("nails", &["nails", "uñas", "uña", "nail"]),
    ("micropigmentation", &["micropigmentación", "micropigmentation"]),
    ("pack", &["pack", "packs", "paquete", "paquetes"]),
    ("spa", &["spa", "spa manos", "spa de pies"]),
    ("lifting", &["lifting", "lifting de pestañas"]),
    ("laminado", &["laminado", "laminado de cejas"]),
    ("diseño", &["diseño", "diseños", "francesa"]),
    ("semipermanente", &["semipermanente", "semi-permanente"]),
    ("gel", &["gel", "uñas gel", "extensiones gel"]),
    ("depilación", &["depilación", "depilacion", "depilación con hilo"]),
    ("tinte", &["tinte", "tinte de pestañas", "tinte de cejas"]),
];

/// Wider vocabulary used when the caller asks about a service directly.
pub const SERVICE_SEARCH_TERMS: Vocabulary = &[
    (
        "manicure",
        &["manicuras", "manicura", "manicure", "manicures", "manicura completa", "manicura semipermanente"],
    ),
    (
        "pedicure",
        &["pedicuras", "pedicura", "pedicure", "pedicures", "pedicura completa", "pedicura semipermanente"],
    ),
    (
        "eyebrows",
        &["cejas", "ceja", "eyebrows", "eyebrow", "depilación de cejas", "diseño de cejas"],
    ),
    (
        "eyelashes",
        &["pestañas", "pestaña", "eyelashes", "eyelash", "lash", "lashes", "lifting de pestañas"],
    ),
    ("facial", &["faciales", "facial", "facials", "tratamiento facial"]),
    ("nails", &["uñas", "uña", "nails", "nail", "extensiones de uñas"]),
    ("micropigmentation", &["micropigmentación", "micropigmentation"]),
    ("pack", &["pack", "packs", "paquete", "paquetes"]),
    ("spa", &["spa", "spa manos", "spa de pies"]),
    ("lifting", &["lifting", "lifting de pestañas"]),
    ("laminado", &["laminado", "laminado de cejas"]),
    ("diseño", &["diseño", "diseños", "francesa"]),
    ("semipermanente", &["semipermanente", "semi-permanente"]),
    ("gel", &["gel", "uñas gel", "extensiones gel"]),
    ("depilación", &["depilación", "depilacion", "depilación con hilo"]),
    ("tinte", &["tinte", "tinte de pestañas", "tinte de cejas"]),
];

/// Service phrases recognised next to an appointment keyword. Narrower than
/// the search vocabulary: bare words like "nails" or "facial" do not make a
/// booking request service-specific.
pub const APPOINTMENT_SERVICE_TERMS: Vocabulary = &[
    (
        "manicure",
        &["manicura", "manicuras", "manicure", "manicures", "manicura completa", "manicura semipermanente"],
    ),
    (
        "pedicure",
        &["pedicura", "pedicuras", "pedicure", "pedicures", "pedicura completa", "pedicura semipermanente"],
    ),
    ("eyebrows", &["ceja", "cejas", "depilación de cejas", "diseño de cejas"]),
    ("eyelashes", &["pestaña", "pestañas", "lifting de pestañas"]),
    ("facial", &["tratamiento facial"]),
    ("nails", &["extensiones de uñas"]),
    ("micropigmentation", &["micropigmentación", "micropigmentation"]),
    ("pack", &["pack", "packs", "paquete", "paquetes"]),
    ("spa", &["spa manos", "spa de pies"]),
    ("lifting", &["lifting de pestañas"]),
    ("laminado", &["laminado de cejas"]),
    ("diseño", &["francesa"]),
    ("semipermanente", &["semi-permanente"]),
    ("gel", &["uñas gel", "extensiones gel"]),
    ("depilación", &["depilación con hilo"]),
    ("tinte", &["tinte de pestañas", "tinte de cejas"]),
];

pub const TIME_KEYWORDS: &[&str] = &[
    "tomorrow",
    "today",
    "friday",
    "monday",
    "next week",
    "mañana",
    "hoy",
    "viernes",
    "lunes",
    "próxima semana",
];

pub const PRICE_KEYWORDS: &[&str] = &["price", "cost", "how much", "precio", "costo", "cuánto"];

/// First canonical term in `vocabulary` with a surface form inside `text`.
pub fn first_term(vocabulary: Vocabulary, text: &str) -> Option<(&'static str, &'static str)> {
    vocabulary.iter().find_map(|(canonical, forms)| {
        forms
            .iter()
            .find(|form| text.contains(*form))
            .map(|form| (*canonical, *form))
    })
}

/// Service, time and price fragments, in that order. A canonical service is
/// emitted at most once; overlapping matches ("nails" and "manicure") are
/// kept as they are.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut entities = Vec::new();

    for (canonical, forms) in SERVICE_TERMS {
        if forms.iter().any(|form| text.contains(form)) {
            entities.push(Entity::new(EntityKind::Service, canonical));
        }
    }

    for keyword in TIME_KEYWORDS {
        if text.contains(keyword) {
            entities.push(Entity::new(EntityKind::Time, keyword));
        }
    }

    for keyword in PRICE_KEYWORDS {
        if text.contains(keyword) {
            entities.push(Entity::new(EntityKind::Price, keyword));
        }
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(entities: &[Entity], kind: EntityKind) -> Vec<&str> {
        entities
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.value.as_str())
            .collect()
    }

    #[test]
    fn test_one_entity_per_canonical_service() {
        let entities = extract_entities("manicure or manicures?");
        assert_eq!(values(&entities, EntityKind::Service), vec!["manicure"]);
    }

    #[test]
    fn test_overlapping_services_are_kept() {
        let entities = extract_entities("nails and a manicure");
        assert_eq!(values(&entities, EntityKind::Service), vec!["manicure", "nails"]);
    }

    #[test]
    fn test_spanish_forms_map_to_canonical_terms() {
        let entities = extract_entities("quiero pestañas y cejas");
        assert_eq!(values(&entities, EntityKind::Service), vec!["eyebrows", "eyelashes"]);
    }

    #[test]
    fn test_time_and_price_keywords() {
        let entities = extract_entities("how much is a facial tomorrow, what's the price");
        assert_eq!(entities[0], Entity::new(EntityKind::Service, "facial"));
        assert_eq!(values(&entities, EntityKind::Time), vec!["tomorrow"]);
        assert_eq!(values(&entities, EntityKind::Price), vec!["price", "how much"]);
    }

    #[test]
    fn test_empty_text_has_no_entities() {
        assert!(extract_entities("").is_empty());
    }

    #[test]
    fn test_first_term_reports_matched_form() {
        assert_eq!(
            first_term(SERVICE_SEARCH_TERMS, "lifting de pestañas por favor"),
            Some(("eyelashes", "pestañas"))
        );
        assert_eq!(first_term(APPOINTMENT_SERVICE_TERMS, "a facial"), None);
    }
}
