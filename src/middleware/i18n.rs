// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

/// Idiomas com mensagens traduzidas. O caixa é de língua alemã.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    De,
    En,
}

impl Lang {
    fn from_tag(tag: &str) -> Option<Self> {
        // "de-CH" -> "de", "en" -> "en"
        match tag.split('-').next().unwrap_or(tag).to_ascii_lowercase().as_str() {
            "de" => Some(Lang::De),
            "en" => Some(Lang::En),
            _ => None,
        }
    }
}

// Extrator de idioma a partir do Accept-Language
#[derive(Debug, Clone, Copy, Default)]
pub struct Locale(pub Lang);

impl Locale {
    pub fn from_header(raw: Option<&str>) -> Self {
        let lang = raw
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .iter()
                    .find_map(|tag| Lang::from_tag(tag))
            })
            .unwrap_or_default();
        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok());

        Ok(Locale::from_header(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header(Some("fr-CH, en;q=0.8, de;q=0.5")).0, Lang::En);
        assert_eq!(Locale::from_header(Some("de-CH")).0, Lang::De);
    }

    #[test]
    fn falls_back_to_german() {
        assert_eq!(Locale::from_header(None).0, Lang::De);
        assert_eq!(Locale::from_header(Some("fr, it")).0, Lang::De);
    }
}
