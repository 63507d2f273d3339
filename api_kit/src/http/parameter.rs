use super::error::HttpError;
use super::request::RequestContext;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Where a raw parameter value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Path => f.write_str("path"),
            ParamLocation::Query => f.write_str("query"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Time,
    /// Kept as the raw string.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub location: ParamLocation,
    pub kind: ParamType,
    pub nullable: bool,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, location: ParamLocation, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            location,
            kind,
            nullable: false,
        }
    }

    pub fn query(name: impl Into<String>, kind: ParamType) -> Self {
        Self::new(name, ParamLocation::Query, kind)
    }

    pub fn path(name: impl Into<String>, kind: ParamType) -> Self {
        Self::new(name, ParamLocation::Path, kind)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Converts raw path and query values into typed handler arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterReader;

impl ParameterReader {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, value: Option<&str>, spec: &ParameterSpec) -> Result<ParamValue, HttpError> {
        let Some(value) = value else {
            if spec.nullable {
                return Ok(ParamValue::Null);
            }
            return Err(HttpError::BadRequest(format!(
                "Missing {} parameter \"{}\"",
                spec.location, spec.name
            )));
        };

        let invalid = |expected: &str| {
            HttpError::BadRequest(format!(
                "Invalid {} parameter \"{}\", expected {}",
                spec.location, spec.name, expected
            ))
        };

        match spec.kind {
            ParamType::String | ParamType::Raw => Ok(ParamValue::String(value.to_string())),
            ParamType::Integer => value
                .trim()
                .parse::<i64>()
                .map(ParamValue::Integer)
                .map_err(|_| invalid("an integer")),
            ParamType::Float => value
                .trim()
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|_| invalid("a number")),
            ParamType::Boolean => parse_bool(value)
                .map(ParamValue::Boolean)
                .ok_or_else(|| invalid("a boolean")),
            ParamType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(ParamValue::Date)
                .map_err(|_| invalid("a date (YYYY-MM-DD)")),
            ParamType::DateTime => parse_date_time(value)
                .map(ParamValue::DateTime)
                .ok_or_else(|| invalid("a date-time (RFC 3339)")),
            ParamType::Time => NaiveTime::parse_from_str(value, "%H:%M:%S")
                .map(ParamValue::Time)
                .map_err(|_| invalid("a time (HH:MM:SS)")),
        }
    }

    /// Reads a query parameter of the current request.
    pub fn read_query(&self, request: &RequestContext, spec: &ParameterSpec) -> Result<ParamValue, HttpError> {
        self.parse(request.query_param(&spec.name), spec)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
