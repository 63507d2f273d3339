use super::media_type::{parse_accept, MediaRange};
use serde_json::Value;
use thiserror::Error;

/// A writer failed to serialize the data it was given.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Could not serialize json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not serialize form: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    #[error("{0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum WriterNotFound {
    #[error("Could not find writer {0}")]
    UnknownType(String),

    #[error("Could not find fitting data writer for content type {0}")]
    NoMatch(String),

    #[error("Writer {0} is not supported by this service")]
    NotSupported(String),
}

/// Serializes response data into one representation.
pub trait Writer: Send {
    fn content_type(&self) -> &'static str;

    /// Whether the writer can produce a representation the range accepts.
    fn is_content_type_supported(&self, range: &MediaRange) -> bool;

    fn write(&self, data: &Value) -> Result<Vec<u8>, WriteError>;

    fn as_jsonp_mut(&mut self) -> Option<&mut JsonpWriter> {
        None
    }
}

#[derive(Debug, Default)]
pub struct JsonWriter;

impl Writer for JsonWriter {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn is_content_type_supported(&self, range: &MediaRange) -> bool {
        range.matches("application/json")
            || (range.kind() == "application" && range.subtype().ends_with("+json"))
    }

    fn write(&self, data: &Value) -> Result<Vec<u8>, WriteError> {
        Ok(serde_json::to_vec(data)?)
    }
}

const DEFAULT_CALLBACK: &str = "callback";

/// JSON wrapped into a javascript function call.
#[derive(Debug, Default)]
pub struct JsonpWriter {
    callback_name: Option<String>,
}

impl JsonpWriter {
    pub fn callback_name(&self) -> Option<&str> {
        self.callback_name.as_deref()
    }

    /// Everything except `[A-Za-z0-9._]` is stripped from the name.
    pub fn set_callback_name(&mut self, name: &str) {
        let name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
            .collect();
        self.callback_name = (!name.is_empty()).then_some(name);
    }
}

impl Writer for JsonpWriter {
    fn content_type(&self) -> &'static str {
        "application/javascript"
    }

    fn is_content_type_supported(&self, range: &MediaRange) -> bool {
        range.matches("application/javascript") || range.matches("text/javascript")
    }

    fn write(&self, data: &Value) -> Result<Vec<u8>, WriteError> {
        let json = serde_json::to_string(data)?;
        let callback = self.callback_name().unwrap_or(DEFAULT_CALLBACK);
        Ok(format!("{}({})", callback, json).into_bytes())
    }

    fn as_jsonp_mut(&mut self) -> Option<&mut JsonpWriter> {
        Some(self)
    }
}

/// `application/x-www-form-urlencoded`, limited to flat objects.
#[derive(Debug, Default)]
pub struct FormWriter;

impl Writer for FormWriter {
    fn content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn is_content_type_supported(&self, range: &MediaRange) -> bool {
        range.matches("application/x-www-form-urlencoded")
    }

    fn write(&self, data: &Value) -> Result<Vec<u8>, WriteError> {
        let Value::Object(object) = data else {
            return Err(WriteError::Unsupported(
                "Form writer expects an object".to_string(),
            ));
        };

        let mut pairs = Vec::with_capacity(object.len());
        for (key, value) in object {
            let value = match value {
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(WriteError::Unsupported(format!(
                        "Form writer can not serialize nested value at \"{}\"",
                        key
                    )))
                }
            };
            pairs.push((key.as_str(), value));
        }

        Ok(serde_urlencoded::to_string(pairs)?.into_bytes())
    }
}

struct WriterEntry {
    name: String,
    format: String,
    create: fn() -> Box<dyn Writer>,
}

/// Known writers in negotiation order.
pub struct WriterFactory {
    entries: Vec<WriterEntry>,
}

impl Default for WriterFactory {
    fn default() -> Self {
        Self::new()
            .register("json", "json", || Box::new(JsonWriter))
            .register("jsonp", "jsonp", || Box::<JsonpWriter>::default())
            .register("form", "form", || Box::new(FormWriter))
    }
}

impl WriterFactory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a writer under a name and a `?format=` value. A writer
    /// registered again under the same name keeps its position.
    pub fn register(
        mut self,
        name: impl Into<String>,
        format: impl Into<String>,
        create: fn() -> Box<dyn Writer>,
    ) -> Self {
        let entry = WriterEntry {
            name: name.into(),
            format: format.into(),
            create,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn writer_type_by_format(&self, format: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.format.eq_ignore_ascii_case(format))
            .map(|e| e.name.as_str())
    }

    /// Picks a writer. An explicit writer type is used as is; otherwise the
    /// `Accept` value is negotiated against the supported writers (all
    /// writers when the list is empty). A missing `Accept` value accepts
    /// anything.
    pub fn get_writer(
        &self,
        content_type: Option<&str>,
        writer_type: Option<&str>,
        supported: &[String],
    ) -> Result<Box<dyn Writer>, WriterNotFound> {
        if let Some(writer_type) = writer_type {
            return self
                .entries
                .iter()
                .find(|e| e.name == writer_type)
                .map(|e| (e.create)())
                .ok_or_else(|| WriterNotFound::UnknownType(writer_type.to_string()));
        }

        let accept = content_type.filter(|c| !c.trim().is_empty()).unwrap_or("*/*");
        let mut candidates: Vec<(&WriterEntry, Box<dyn Writer>)> = self
            .entries
            .iter()
            .filter(|e| supported.is_empty() || supported.contains(&e.name))
            .map(|e| (e, (e.create)()))
            .collect();

        for range in parse_accept(accept) {
            if let Some(index) = candidates
                .iter()
                .position(|(_, writer)| writer.is_content_type_supported(&range))
            {
                let (entry, writer) = candidates.swap_remove(index);
                tracing::trace!(writer = %entry.name, %range, "negotiated writer");
                return Ok(writer);
            }
        }

        Err(WriterNotFound::NoMatch(accept.to_string()))
    }
}

impl std::fmt::Debug for WriterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterFactory")
            .field("writers", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn supported() -> Vec<String> {
        vec!["json".to_string(), "jsonp".to_string()]
    }

    #[test]
    fn test_negotiation_follows_accept() {
        let factory = WriterFactory::default();

        let writer = factory.get_writer(None, None, &supported()).unwrap();
        assert_eq!(writer.content_type(), "application/json");

        let writer = factory
            .get_writer(Some("text/javascript, application/json;q=0.5"), None, &supported())
            .unwrap();
        assert_eq!(writer.content_type(), "application/javascript");

        let writer = factory
            .get_writer(Some("application/problem+json"), None, &supported())
            .unwrap();
        assert_eq!(writer.content_type(), "application/json");
    }

    #[test]
    fn test_negotiation_respects_supported_writers() {
        let factory = WriterFactory::default();
        let err = factory
            .get_writer(Some("application/x-www-form-urlencoded"), None, &supported())
            .err()
            .unwrap();
        assert!(matches!(err, WriterNotFound::NoMatch(_)));

        let writer = factory
            .get_writer(Some("application/x-www-form-urlencoded"), None, &[])
            .unwrap();
        assert_eq!(writer.content_type(), "application/x-www-form-urlencoded");
    }

    #[test]
    fn test_unknown_writer_type() {
        let err = WriterFactory::default()
            .get_writer(None, Some("xml"), &supported())
            .err()
            .unwrap();
        assert!(matches!(err, WriterNotFound::UnknownType(ref t) if t == "xml"));
    }

    #[test]
    fn test_writer_type_by_format() {
        let factory = WriterFactory::default();
        assert_eq!(factory.writer_type_by_format("JSONP"), Some("jsonp"));
        assert_eq!(factory.writer_type_by_format("yaml"), None);
    }

    #[test]
    fn test_jsonp_callback() {
        let mut writer = JsonpWriter::default();
        let data = json!({"id": 1});
        assert_eq!(writer.write(&data).unwrap(), b"callback({\"id\":1})");

        writer.set_callback_name("alert(1);cb.x_y");
        assert_eq!(writer.callback_name(), Some("alert1cb.x_y"));
        assert_eq!(writer.write(&data).unwrap(), b"alert1cb.x_y({\"id\":1})");

        writer.set_callback_name("();");
        assert_eq!(writer.callback_name(), None);
    }

    #[test]
    fn test_form_writer() {
        let data = json!({"name": "pen", "price": 2.5, "active": true});
        let body = FormWriter.write(&data).unwrap();
        let mut pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body).unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("active".to_string(), "true".to_string()),
                ("name".to_string(), "pen".to_string()),
                ("price".to_string(), "2.5".to_string()),
            ]
        );

        assert!(FormWriter.write(&json!({"nested": {"a": 1}})).is_err());
        assert!(FormWriter.write(&json!([1, 2])).is_err());
    }
}
