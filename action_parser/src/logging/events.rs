//! Log events emitted by the parser, file reader and batch validator

use super::codes::{Code, ErrorMetadata};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Log severity levels. Lower levels are more severe; a sink with minimum
/// level `Info` accepts `Error`, `Warning` and `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LogLevel {
    Error = 0,
    #[serde(rename = "WARN")]
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Accepts level names in any case, `warn`, or the numeric level
impl FromStr for LogLevel {
    type Err = String;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.to_ascii_lowercase().as_str() {
            "error" | "0" => Ok(LogLevel::Error),
            "warning" | "warn" | "1" => Ok(LogLevel::Warning),
            "info" | "2" => Ok(LogLevel::Info),
            "debug" | "3" => Ok(LogLevel::Debug),
            _ => Err(format!("unknown log level '{}'", level)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(level: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        level.parse()
    }
}

/// Action file line an event was raised for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSource {
    pub origin: String,
    pub line: usize,
}

/// One logged event. Context keys stay sorted so every rendering is stable.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub source: Option<EventSource>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            source: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Uncoded warning
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_source(mut self, origin: &str, line: usize) -> Self {
        self.source = Some(EventSource {
            origin: origin.to_string(),
            line,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    /// Registry entry for error events; `None` for everything else
    pub fn error_metadata(&self) -> Option<&'static ErrorMetadata> {
        if self.is_error() {
            self.code.metadata()
        } else {
            None
        }
    }

    pub fn requires_halt(&self) -> bool {
        self.error_metadata().is_some_and(|m| m.requires_halt)
    }

    /// `[LEVEL] CODE - message at position N [origin:line]`
    pub fn format(&self) -> String {
        let mut line = format!(
            "[{}] {} - {}",
            self.level.as_str(),
            self.code,
            self.message
        );
        if let Some(span) = &self.span {
            line.push_str(&format!(" at position {}", span.start().offset));
        }
        if let Some(source) = &self.source {
            line.push_str(&format!(" [{}:{}]", source.origin, source.line));
        }
        line
    }

    /// One-line format followed by the registry entry and the context
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!(
            "\n  Category: {}\n  Severity: {}",
            self.code.category(),
            self.code.severity().as_str()
        ));

        if let Some(metadata) = self.error_metadata() {
            output.push_str(&format!(
                "\n  Recoverable: {}\n  Requires halt: {}\n  Description: {}\n  Recommended action: {}",
                metadata.recoverable,
                metadata.requires_halt,
                metadata.description,
                metadata.recommended_action
            ));
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// Single-line JSON for structured sinks
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&JsonEvent::from(self))
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: String,
    level: LogLevel,
    code: &'static str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_metadata: Option<JsonMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<JsonSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a EventSource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct JsonMetadata {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

#[derive(Serialize)]
struct JsonSpan {
    start_offset: usize,
    end_offset: usize,
    line: usize,
    column: usize,
}

impl<'a> From<&'a LogEvent> for JsonEvent<'a> {
    fn from(event: &'a LogEvent) -> Self {
        Self {
            timestamp: event.timestamp.to_rfc3339(),
            level: event.level,
            code: event.code.as_str(),
            message: &event.message,
            category: event.code.category(),
            severity: event.code.severity().as_str(),
            error_metadata: event.error_metadata().map(|m| JsonMetadata {
                recoverable: m.recoverable,
                requires_halt: m.requires_halt,
                description: m.description,
                recommended_action: m.recommended_action,
            }),
            span: event.span.as_ref().map(|span| JsonSpan {
                start_offset: span.start().offset,
                end_offset: span.end().offset,
                line: span.start().line as usize,
                column: span.start().column as usize,
            }),
            source: event.source.as_ref(),
            context: &event.context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::Position;

    #[test]
    fn test_log_level_names() {
        assert_eq!("error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("ERROR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("2".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error < LogLevel::Debug);
    }

    #[test]
    fn test_error_event_metadata() {
        let event = LogEvent::error(codes::syntax::STRUCTURAL_MISMATCH, "expected ')'");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E042");
        assert_eq!(event.error_metadata().map(|m| m.category), Some("Syntax"));
        assert!(!event.requires_halt());
    }

    #[test]
    fn test_non_error_events_have_no_metadata() {
        let event = LogEvent::success(codes::success::ACTION_PARSED, "ok");
        assert!(event.is_info());
        assert!(event.error_metadata().is_none());
        assert!(!event.requires_halt());
    }

    #[test]
    fn test_format_includes_position_and_source() {
        let span = Span::new(Position::new(7, 1, 8), Position::new(8, 1, 9));
        let event = LogEvent::error(codes::lexical::INVALID_CHARACTER, "unexpected '$'")
            .with_span(span)
            .with_source("actions.txt", 4);

        let formatted = event.format();
        assert!(formatted.starts_with("[ERROR] E020 - unexpected '$'"));
        assert!(formatted.contains("at position 7"));
        assert!(formatted.ends_with("[actions.txt:4]"));
    }

    #[test]
    fn test_detailed_format_lists_recommendation_and_sorted_context() {
        let event = LogEvent::error(codes::lexical::UNTERMINATED_STRING, "missing quote")
            .with_context("quote", "\"")
            .with_context("opened_at", "5");
        let detailed = event.format_detailed();

        assert!(detailed.contains("Category: Lexical"));
        assert!(detailed.contains("Recommended action: Add the matching closing quote"));
        assert!(detailed.ends_with("Context:\n    opened_at: 5\n    quote: \""));
    }

    #[test]
    fn test_warning_and_debug_defaults() {
        assert_eq!(LogEvent::warning("slow").code.as_str(), "W000");
        assert!(LogEvent::debug("trace").is_debug());
        assert!(!LogEvent::warning("slow").format_detailed().contains("Recommended action"));
    }

    #[test]
    fn test_json_formatting() {
        let span = Span::new(Position::new(5, 1, 6), Position::new(6, 1, 7));
        let event = LogEvent::error(codes::syntax::UNEXPECTED_TRAILING_INPUT, "trailing input")
            .with_span(span)
            .with_source("model.actions", 3)
            .with_context("found", "2");

        let json: serde_json::Value =
            serde_json::from_str(&event.format_json().expect("json")).expect("parse");
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E041");
        assert_eq!(json["span"]["start_offset"], 5);
        assert_eq!(json["source"]["line"], 3);
        assert_eq!(json["context"]["found"], "2");
        assert_eq!(json["error_metadata"]["requires_halt"], false);

        let info: serde_json::Value =
            serde_json::from_str(&LogEvent::info("hi").format_json().expect("json"))
                .expect("parse");
        assert_eq!(info["level"], "INFO");
        assert!(info.get("error_metadata").is_none());
        assert!(info.get("context").is_none());
    }
}
