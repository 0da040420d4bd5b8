//! Response texts keyed by (template, language). A template missing for a
//! language renders the English text instead.

use crate::models::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    ServiceOverview,
    ServiceNotFound,
    ServiceSummary,
    ServiceSomeOptions,
    ServiceFollowUp,
    DetailNotFound,
    DetailedService,
    PriceOverview,
    PriceUnavailable,
    PriceNotFound,
    PriceForService,
    SinglePrice,
    PriceRange,
    PriceOnRequest,
    HoursFallback,
    HoursList,
    Closed,
    LocationFallback,
    LocationDetails,
    DirectionsFallback,
    AddressFallback,
    ParkingFallback,
    ParkingIntro,
    ParkingOption,
    ParkingOutro,
    TransportFallback,
    TransportIntro,
    TransportBus,
    TransportMetro,
    TransportOutro,
    AppointmentForService,
    AppointmentGeneric,
    GeneralHelp,
    NotUnderstood,
    UnknownService,
    BookingConfirmed,
    BookingFailed,
    AskName,
    AskService,
    AskDate,
    AskTime,
    DateTimeUnderstood,
    DateTimeUnclear,
    AvailableTimes,
    NoAvailableTimes,
    VoiceWelcome,
    VoiceFarewell,
    VoiceError,
}

pub type TemplateTable = &'static [(TemplateId, Language, &'static str)];

pub const TEMPLATES: TemplateTable = &[
    (TemplateId::ServiceOverview, Language::En, "We offer {count} service categories: {categories}. What service interests you most? I can provide detailed information about prices, duration, and what each service includes."),
    (TemplateId::ServiceOverview, Language::Es, "Ofrecemos {count} categorías de servicios: {categories}. ¿Qué servicio te interesa más? Puedo darte información detallada sobre precios, duración y lo que incluye cada servicio."),
    (TemplateId::ServiceNotFound, Language::En, "Sorry, we couldn't find specific information about {service}. Would you like to see all our services?"),
    (TemplateId::ServiceNotFound, Language::Es, "Lo siento, no encontramos información específica sobre {service}. ¿Te gustaría ver todos nuestros servicios?"),
    (TemplateId::ServiceSummary, Language::En, "For {category}, we have {count} options available. {price}. "),
    (TemplateId::ServiceSummary, Language::Es, "Para {category}, tenemos {count} opciones disponibles. {price}. "),
    (TemplateId::ServiceSomeOptions, Language::En, "Some options include: {options}. "),
    (TemplateId::ServiceSomeOptions, Language::Es, "Algunas opciones incluyen: {options}. "),
    (TemplateId::ServiceFollowUp, Language::En, "Would you like more information about any specific option or pricing?"),
    (TemplateId::ServiceFollowUp, Language::Es, "¿Te gustaría más información sobre alguna opción específica o sobre precios?"),
    (TemplateId::DetailNotFound, Language::En, "Sorry, I couldn't find detailed information about that specific service. Could you be more specific?"),
    (TemplateId::DetailNotFound, Language::Es, "Lo siento, no encontré información detallada sobre ese servicio específico. ¿Podrías ser más específico?"),
    (TemplateId::DetailedService, Language::En, "{name}: {description}. Price: {price}. Duration: {duration}. Would you like to book an appointment for this service?"),
    (TemplateId::DetailedService, Language::Es, "{name}: {description}. Precio: {price}. Duración: {duration}. ¿Te gustaría hacer una cita para este servicio?"),
    (TemplateId::PriceOverview, Language::En, "Our prices range from {min}€ to {max}€ depending on the service. What specific service interests you for more detailed information?"),
    (TemplateId::PriceOverview, Language::Es, "Nuestros precios varían desde {min}€ hasta {max}€ dependiendo del servicio. ¿Qué servicio específico te interesa para darte información más detallada?"),
    (TemplateId::PriceUnavailable, Language::En, "Our prices depend on the service. What specific service interests you?"),
    (TemplateId::PriceUnavailable, Language::Es, "Nuestros precios dependen del servicio. ¿Qué servicio específico te interesa?"),
    (TemplateId::PriceNotFound, Language::En, "Sorry, I couldn't find pricing information for {service}. Could you be more specific?"),
    (TemplateId::PriceNotFound, Language::Es, "Lo siento, no encontré información de precios para {service}. ¿Podrías ser más específico?"),
    (TemplateId::PriceForService, Language::En, "For {category}: {price}. Would you like more information about specific options?"),
    (TemplateId::PriceForService, Language::Es, "Para {category}: {price}. ¿Te gustaría más información sobre las opciones específicas?"),
    (TemplateId::SinglePrice, Language::En, "Price: {price}€"),
    (TemplateId::SinglePrice, Language::Es, "Precio: {price}€"),
    (TemplateId::PriceRange, Language::En, "Prices from {min}€ to {max}€"),
    (TemplateId::PriceRange, Language::Es, "Precios desde {min}€ hasta {max}€"),
    (TemplateId::PriceOnRequest, Language::En, "Price available on request"),
    (TemplateId::PriceOnRequest, Language::Es, "Precio disponible bajo consulta"),
    (TemplateId::HoursFallback, Language::En, "Our hours are Monday through Friday from 9:30 AM to 8:30 PM, Saturdays from 9:30 AM to 2:30 PM, and closed on Sundays. Would you like to make an appointment?"),
    (TemplateId::HoursFallback, Language::Es, "Nuestros horarios son de lunes a viernes de 9:30 AM a 8:30 PM, sábados de 9:30 AM a 2:30 PM, y cerrados los domingos. ¿Te gustaría hacer una cita?"),
    (TemplateId::HoursList, Language::En, "Our hours are: {hours}. Would you like to make an appointment?"),
    (TemplateId::HoursList, Language::Es, "Nuestros horarios son: {hours}. ¿Te gustaría hacer una cita?"),
    (TemplateId::Closed, Language::En, "Closed"),
    (TemplateId::Closed, Language::Es, "Cerrado"),
    (TemplateId::LocationFallback, Language::En, "We are located at Calle Santos Justo y Pastor 72, Valencia, Spain. We are near the health district and the Santos Justo y Pastor church. Would you like help with directions or transportation?"),
    (TemplateId::LocationFallback, Language::Es, "Estamos ubicados en Calle Santos Justo y Pastor 72, Valencia, España. Estamos cerca de la zona de la salud y de la iglesia de Santos Justo y Pastor. ¿Te gustaría ayuda con las direcciones o el transporte?"),
    (TemplateId::LocationDetails, Language::En, "We are located at {address}. {directions} Would you like information about public transportation or parking?"),
    (TemplateId::LocationDetails, Language::Es, "Estamos ubicados en {address}. {directions} ¿Te gustaría información sobre transporte público o estacionamiento?"),
    (TemplateId::AddressFallback, Language::En, "Calle Santos Justo y Pastor 72, Valencia"),
    (TemplateId::DirectionsFallback, Language::En, "We are in the centre of Valencia, near the La Salud area."),
    (TemplateId::DirectionsFallback, Language::Es, "Estamos en el centro de Valencia, cerca de la zona de La Salud."),
    (TemplateId::ParkingFallback, Language::En, "We have nearby parking options. There's private parking 5-7 minutes walking distance and blue/white zone parking on nearby streets. Would you like more information?"),
    (TemplateId::ParkingFallback, Language::Es, "Tenemos opciones de estacionamiento cercanas. Hay parking privado a 5-7 minutos caminando y zona azul/blanca en las calles cercanas. ¿Te gustaría más información?"),
    (TemplateId::ParkingIntro, Language::En, "Parking options: "),
    (TemplateId::ParkingIntro, Language::Es, "Opciones de estacionamiento: "),
    (TemplateId::ParkingOption, Language::En, "{kind} at {location} ({distance}, {cost}). "),
    (TemplateId::ParkingOption, Language::Es, "{kind} en {location} ({distance}, {cost}). "),
    (TemplateId::ParkingOutro, Language::En, "Would you like information about public transportation as an alternative?"),
    (TemplateId::ParkingOutro, Language::Es, "¿Te gustaría información sobre transporte público como alternativa?"),
    (TemplateId::TransportFallback, Language::En, "We have easy access by public transportation. There are multiple bus and metro options nearby. Would you like specific information about the lines?"),
    (TemplateId::TransportFallback, Language::Es, "Tenemos fácil acceso en transporte público. Hay múltiples opciones de autobús y metro cerca. ¿Te gustaría información específica sobre las líneas?"),
    (TemplateId::TransportIntro, Language::En, "Public transportation options: "),
    (TemplateId::TransportIntro, Language::Es, "Opciones de transporte público: "),
    (TemplateId::TransportBus, Language::En, "Bus lines {lines}. "),
    (TemplateId::TransportBus, Language::Es, "Autobús líneas {lines}. "),
    (TemplateId::TransportMetro, Language::En, "Metro lines {lines}. "),
    (TemplateId::TransportMetro, Language::Es, "Metro líneas {lines}. "),
    (TemplateId::TransportOutro, Language::En, "Would you like information about parking as well?"),
    (TemplateId::TransportOutro, Language::Es, "¿Te gustaría información sobre estacionamiento también?"),
    (TemplateId::AppointmentForService, Language::En, "Excellent! I can help you book an appointment for {service}. What date and time would you prefer? We're available Monday through Friday from 9:30 AM to 8:30 PM, and Saturdays from 9:30 AM to 2:30 PM. Would you like to book it now?"),
    (TemplateId::AppointmentForService, Language::Es, "¡Excelente! Puedo ayudarte a reservar una cita para {service}. ¿Qué fecha y hora prefieres? Estamos disponibles de lunes a viernes de 9:30 AM a 8:30 PM, y sábados de 9:30 AM a 2:30 PM. ¿Te gustaría reservarlo ahora?"),
    (TemplateId::AppointmentGeneric, Language::En, "Perfect, I understand you want to book an appointment. What specific service would you like to book? I can help you with manicures, pedicures, facials, eyebrow services, and more. What date and time would you prefer?"),
    (TemplateId::AppointmentGeneric, Language::Es, "Perfecto, entiendo que quieres reservar una cita. ¿Para qué servicio específico te gustaría reservar? Puedo ayudarte con manicuras, pedicuras, faciales, servicios de cejas y más. ¿Qué fecha y hora prefieres?"),
    (TemplateId::GeneralHelp, Language::En, "I can help you with information about our services, prices, hours, location, transportation, and appointments. What would you like to know?"),
    (TemplateId::GeneralHelp, Language::Es, "Puedo ayudarte con información sobre nuestros servicios, precios, horarios, ubicación, transporte y citas. ¿Qué te gustaría saber?"),
    (TemplateId::NotUnderstood, Language::En, "I'm sorry, I didn't understand that. Could you please repeat?"),
    (TemplateId::NotUnderstood, Language::Es, "Lo siento, no entendí eso. ¿Podrías repetir?"),
    (TemplateId::UnknownService, Language::En, "that service"),
    (TemplateId::UnknownService, Language::Es, "ese servicio"),
    (TemplateId::BookingConfirmed, Language::En, "Perfect {name}! Your appointment for {service} is confirmed for {date} at {time}. We'll send you an email reminder. Is there anything else I can help you with?"),
    (TemplateId::BookingConfirmed, Language::Es, "¡Perfecto {name}! Tu cita para {service} está confirmada para {date} a las {time}. Te enviaremos un recordatorio por email. ¿Hay algo más en lo que pueda ayudarte?"),
    (TemplateId::BookingFailed, Language::En, "I'm sorry, there was an error processing your appointment. Please try again or call us directly."),
    (TemplateId::BookingFailed, Language::Es, "Lo siento, hubo un error al procesar tu cita. Por favor, intenta de nuevo o llámanos directamente."),
    (TemplateId::AskName, Language::En, "Could you tell me your name, please?"),
    (TemplateId::AskName, Language::Es, "¿Me podrías decir tu nombre, por favor?"),
    (TemplateId::AskService, Language::En, "Which service would you like to book?"),
    (TemplateId::AskService, Language::Es, "¿Qué servicio te gustaría reservar?"),
    (TemplateId::AskDate, Language::En, "What day would you like to come in?"),
    (TemplateId::AskDate, Language::Es, "¿Qué día te gustaría venir?"),
    (TemplateId::AskTime, Language::En, "What time would suit you best?"),
    (TemplateId::AskTime, Language::Es, "¿A qué hora te viene mejor?"),
    (TemplateId::DateTimeUnderstood, Language::En, "Perfect, I understand you want an appointment for {date} at {time}. What's your name and what service would you like?"),
    (TemplateId::DateTimeUnderstood, Language::Es, "Perfecto, entiendo que quieres una cita para {date} a las {time}. ¿Cuál es tu nombre y qué servicio te gustaría?"),
    (TemplateId::DateTimeUnclear, Language::En, "Sorry, I couldn't understand the date and time. Please tell me something like \"tomorrow at 2 PM\" or \"Friday at 10 AM\"."),
    (TemplateId::DateTimeUnclear, Language::Es, "Lo siento, no pude entender la fecha y hora. Por favor, dime algo como \"mañana a las 2 de la tarde\" o \"el viernes a las 10 de la mañana\"."),
    (TemplateId::AvailableTimes, Language::En, "For {date}, we have available times: {times}. What time would you prefer?"),
    (TemplateId::AvailableTimes, Language::Es, "Para {date}, tenemos horarios disponibles: {times}. ¿Qué horario prefieres?"),
    (TemplateId::NoAvailableTimes, Language::En, "Sorry, there are no available times on {date}. Would you like to try another day?"),
    (TemplateId::NoAvailableTimes, Language::Es, "Lo siento, no hay horarios disponibles el {date}. ¿Te gustaría probar otro día?"),
    (TemplateId::VoiceWelcome, Language::En, "Hello! Welcome to Hera's Nails and Lashes beauty salon in Valencia. I'm here to help you with our services, hours, location, and appointments. How can I assist you today?"),
    (TemplateId::VoiceWelcome, Language::Es, "¡Hola! Bienvenido a Hera's Nails and Lashes, salón de belleza en Valencia. Estoy aquí para ayudarte con nuestros servicios, horarios, ubicación y citas. ¿En qué puedo ayudarte?"),
    (TemplateId::VoiceFarewell, Language::En, "Thank you for calling Hera's Nails and Lashes. Have a wonderful day!"),
    (TemplateId::VoiceFarewell, Language::Es, "Gracias por llamar a Hera's Nails and Lashes. ¡Que tengas un buen día!"),
    (TemplateId::VoiceError, Language::En, "I'm sorry, there was an error processing your request. Could you please try again?"),
    (TemplateId::VoiceError, Language::Es, "Lo siento, hubo un error procesando tu solicitud. ¿Podrías intentar de nuevo?"),
];

/// Text for `id` in `language` from `table`, else the English text.
pub fn lookup_in(table: TemplateTable, id: TemplateId, language: Language) -> &'static str {
    let find = |lang: Language| {
        table
            .iter()
            .find(|(tid, l, _)| *tid == id && *l == lang)
            .map(|(_, _, text)| *text)
    };
    find(language)
        .or_else(|| find(Language::En))
        .unwrap_or_default()
}

pub fn lookup(id: TemplateId, language: Language) -> &'static str {
    lookup_in(TEMPLATES, id, language)
}

/// Fills `{name}` placeholders. Unknown placeholders are left untouched.
pub fn fill(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

pub fn render(id: TemplateId, language: Language, args: &[(&str, &str)]) -> String {
    fill(lookup(id, language), args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_translation_falls_back_to_english() {
        const TABLE: TemplateTable = &[(TemplateId::GeneralHelp, Language::En, "english only")];
        assert_eq!(lookup_in(TABLE, TemplateId::GeneralHelp, Language::Es), "english only");
        assert_eq!(lookup_in(TABLE, TemplateId::Closed, Language::Es), "");
        assert_eq!(
            lookup(TemplateId::AddressFallback, Language::Es),
            "Calle Santos Justo y Pastor 72, Valencia"
        );
    }

    #[test]
    fn test_render_fills_placeholders() {
        let text = render(
            TemplateId::PriceRange,
            Language::Es,
            &[("min", "12"), ("max", "45")],
        );
        assert_eq!(text, "Precios desde 12€ hasta 45€");
    }

    #[test]
    fn test_every_template_has_english_text() {
        for (id, _, _) in TEMPLATES {
            assert!(!lookup(*id, Language::En).is_empty(), "{id:?} has no English text");
        }
    }
}
