//! URL/Endpoint Builder (component E).

use secrecy::{ExposeSecret, SecretString};

/// Build the upstream URL for a single call.
///
/// `<baseURL>/models/<model>:<op>?key=<apiKey>[&alt=sse]`, where `op` is
/// `streamGenerateContent` for streaming calls and `generateContent` otherwise.
pub fn build_url(base_url: &str, model: &str, api_key: &SecretString, streaming: bool) -> String {
    let base = base_url.trim_end_matches('/');
    let op = if streaming { "streamGenerateContent" } else { "generateContent" };
    let key = api_key.expose_secret();

    if streaming {
        format!("{base}/models/{model}:{op}?key={key}&alt=sse")
    } else {
        format!("{base}/models/{model}:{op}?key={key}")
    }
}

/// Resolve the model to call: the request's own model if present, else the
/// configuration's default.
pub fn resolve_model(requested: Option<&str>, default_model: &str) -> String {
    requested.filter(|m| !m.is_empty()).unwrap_or(default_model).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_non_streaming_url() {
        let key = SecretString::from("secret-key".to_string());
        let url = build_url("https://generativelanguage.googleapis.com/v1beta", "gemini-2.0-flash", &key, false);
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=secret-key"
        );
    }

    #[test]
    fn builds_streaming_url_with_sse_flag() {
        let key = SecretString::from("secret-key".to_string());
        let url = build_url("https://generativelanguage.googleapis.com/v1beta", "gemini-2.0-flash", &key, true);
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:streamGenerateContent?key=secret-key&alt=sse"
        );
    }

    #[test]
    fn resolves_default_model_when_request_omits_one() {
        assert_eq!(resolve_model(None, "gemini-2.0-flash"), "gemini-2.0-flash");
        assert_eq!(resolve_model(Some("gemini-2.5-pro"), "gemini-2.0-flash"), "gemini-2.5-pro");
    }
}
