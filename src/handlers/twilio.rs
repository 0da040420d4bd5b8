use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::Language;

/// Twilio form fields, in the order they were posted.
pub type FormParams = Vec<(String, String)>;

pub fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

pub fn validate_twilio_signature(
    auth_token: &str,
    signature: &str,
    url: &str,
    params: &[(String, String)],
) -> bool {
    // URL followed by every param, sorted by key
    let mut data = url.to_string();
    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, value) in sorted_params {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = match Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(data.as_bytes());
    let result = mac.finalize().into_bytes();
    let expected = base64::engine::general_purpose::STANDARD.encode(result);

    expected == signature
}

/// Rejects webhook calls that Twilio did not sign. Skipped when no auth token
/// is configured.
pub fn verify_request(
    config: &AppConfig,
    headers: &HeaderMap,
    path: &str,
    params: &[(String, String)],
) -> Result<(), AppError> {
    if config.twilio_auth_token.is_empty() {
        return Ok(());
    }

    let signature = headers
        .get("x-twilio-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if signature.is_empty() {
        tracing::warn!(path, "missing X-Twilio-Signature header");
        return Err(AppError::Forbidden("Missing signature".to_string()));
    }

    let url = webhook_url(config, headers, path);
    if !validate_twilio_signature(&config.twilio_auth_token, signature, &url, params) {
        tracing::warn!(url = %url, "invalid Twilio signature");
        return Err(AppError::Forbidden("Invalid signature".to_string()));
    }
    Ok(())
}

/// The URL Twilio posted to: PUBLIC_URL when set, otherwise rebuilt from
/// the proxy headers.
fn webhook_url(config: &AppConfig, headers: &HeaderMap, path: &str) -> String {
    if !config.public_url.is_empty() {
        return format!("{}{path}", config.public_url.trim_end_matches('/'));
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}{path}")
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Minimal TwiML voice response builder.
#[derive(Debug, Default)]
pub struct VoiceResponse {
    verbs: Vec<String>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: &str, language: Language) -> Self {
        self.verbs.push(format!(
            r#"<Say voice="alice" language="{}">{}</Say>"#,
            language.locale(),
            escape_xml(text)
        ));
        self
    }

    /// Listens for speech and posts the transcript to `action`.
    pub fn gather(mut self, action: &str, language: Language) -> Self {
        self.verbs.push(format!(
            r#"<Gather input="speech" language="{}" speechTimeout="auto" action="{}" method="POST" enhanced="true"/>"#,
            language.locale(),
            escape_xml(action)
        ));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push("<Hangup/>".to_string());
        self
    }

    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Response>{}</Response>"#,
            self.verbs.concat()
        )
    }
}

impl IntoResponse for VoiceResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml")], self.to_xml()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> FormParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sign(token: &str, data: &str) -> String {
        let mut mac = Hmac::<Sha1>::new_from_slice(token.as_bytes()).unwrap();
        mac.update(data.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_signature_sorts_params() {
        let url = "https://salon.example/api/voice/process";
        let form = params(&[("SpeechResult", "hello"), ("CallSid", "CA1")]);
        let signature = sign("secret", &format!("{url}CallSidCA1SpeechResulthello"));

        assert!(validate_twilio_signature("secret", &signature, url, &form));
        assert!(!validate_twilio_signature("other", &signature, url, &form));
        assert!(!validate_twilio_signature("secret", &signature, "https://evil.example", &form));
    }

    #[test]
    fn test_verify_request_uses_public_url() {
        let config = AppConfig {
            twilio_auth_token: "secret".to_string(),
            public_url: "https://salon.example/".to_string(),
            ..AppConfig::default()
        };
        let form = params(&[("CallSid", "CA1")]);
        let mut headers = HeaderMap::new();
        assert!(matches!(
            verify_request(&config, &headers, "/api/voice/incoming", &form),
            Err(AppError::Forbidden(_))
        ));

        let signature = sign("secret", "https://salon.example/api/voice/incomingCallSidCA1");
        headers.insert("x-twilio-signature", signature.parse().unwrap());
        assert!(verify_request(&config, &headers, "/api/voice/incoming", &form).is_ok());
    }

    #[test]
    fn test_verify_request_skipped_without_token() {
        let config = AppConfig::default();
        assert!(verify_request(&config, &HeaderMap::new(), "/api/voice/status", &[]).is_ok());
    }

    #[test]
    fn test_voice_response_escapes_text() {
        let xml = VoiceResponse::new()
            .say("Nails & Lashes <3", Language::Es)
            .hangup()
            .to_xml();
        assert!(xml.contains(r#"<Say voice="alice" language="es-ES">Nails &amp; Lashes &lt;3</Say>"#));
        assert!(xml.ends_with("<Hangup/></Response>"));
    }

    #[test]
    fn test_param_ignores_blank_values() {
        let form = params(&[("SpeechResult", "  "), ("CallSid", "CA9")]);
        assert_eq!(param(&form, "SpeechResult"), None);
        assert_eq!(param(&form, "CallSid"), Some("CA9"));
    }
}
