//! Message templates for passcode delivery.
//!
//! Templates are parsed once when a provider is registered; a malformed
//! template therefore fails startup, never a request. Placeholders use
//! `{{ name }}` syntax over a fixed field set, and a missing subject or
//! body template renders as the empty string.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder at offset {0}")]
    UnclosedPlaceholder(usize),

    #[error("unknown template field `{0}`")]
    UnknownField(String),
}

/// Data available to subject and body templates.
#[derive(Debug, Clone, Default)]
pub struct PushData {
    pub to: String,
    pub namespace: String,
    pub code_type: String,
    pub channel: String,
    pub code: String,
    pub url: String,
    pub ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    To,
    Namespace,
    CodeType,
    Channel,
    Code,
    Url,
    Ttl,
}

impl Field {
    fn parse(name: &str) -> Result<Self, TemplateError> {
        match name {
            "to" => Ok(Self::To),
            "namespace" => Ok(Self::Namespace),
            "code_type" => Ok(Self::CodeType),
            "channel" => Ok(Self::Channel),
            "code" => Ok(Self::Code),
            "url" => Ok(Self::Url),
            "ttl" => Ok(Self::Ttl),
            other => Err(TemplateError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed message template.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string, validating every placeholder.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or(TemplateError::UnclosedPlaceholder(offset + start))?;
            let field = Field::parse(after[..end].trim())?;
            segments.push(Segment::Field(field));

            offset += start + 2 + end + 2;
            rest = &after[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Render the template against the given push data.
    pub fn render(&self, data: &PushData) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => match field {
                    Field::To => out.push_str(&data.to),
                    Field::Namespace => out.push_str(&data.namespace),
                    Field::CodeType => out.push_str(&data.code_type),
                    Field::Channel => out.push_str(&data.channel),
                    Field::Code => out.push_str(&data.code),
                    Field::Url => out.push_str(&data.url),
                    Field::Ttl => out.push_str(&format!("{}s", data.ttl.as_secs())),
                },
            }
        }
        out
    }
}

/// Optional subject/body template pair bound to a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderTemplates {
    subject: Option<Template>,
    body: Option<Template>,
}

impl ProviderTemplates {
    /// Parse the optional subject and body sources. Either may be absent.
    pub fn new(subject: Option<&str>, body: Option<&str>) -> Result<Self, TemplateError> {
        Ok(Self {
            subject: subject.map(Template::parse).transpose()?,
            body: body.map(Template::parse).transpose()?,
        })
    }

    /// Render `(subject, body)`; a missing part yields an empty string.
    pub fn render(&self, data: &PushData) -> (String, String) {
        (
            self.subject.as_ref().map(|t| t.render(data)).unwrap_or_default(),
            self.body.as_ref().map(|t| t.render(data)).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> PushData {
        PushData {
            to: "user@example.com".to_string(),
            namespace: "login".to_string(),
            code_type: "numeric".to_string(),
            channel: "email".to_string(),
            code: "123456".to_string(),
            url: "https://example.com/otp/login/abc?otp=123456&action=check".to_string(),
            ttl: Duration::from_secs(90),
        }
    }

    #[test]
    fn test_render_substitutes_fields() {
        let tpl = Template::parse("Your {{ channel }} code is {{code}}, valid {{ ttl }}").unwrap();
        assert_eq!(
            tpl.render(&sample_data()),
            "Your email code is 123456, valid 90s"
        );
    }

    #[test]
    fn test_literal_only_template() {
        let tpl = Template::parse("no placeholders here").unwrap();
        assert_eq!(tpl.render(&sample_data()), "no placeholders here");
    }

    #[test]
    fn test_unclosed_placeholder_is_rejected() {
        let err = Template::parse("hello {{code").unwrap_err();
        assert!(matches!(err, TemplateError::UnclosedPlaceholder(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Template::parse("hello {{ nope }}").unwrap_err();
        assert_eq!(err, TemplateError::UnknownField("nope".to_string()));
    }

    #[test]
    fn test_missing_parts_render_empty() {
        let templates = ProviderTemplates::new(None, Some("{{ code }}")).unwrap();
        let (subject, body) = templates.render(&sample_data());
        assert_eq!(subject, "");
        assert_eq!(body, "123456");
    }
}
