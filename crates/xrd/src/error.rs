//! Error types for resource descriptor parsing and serialization

use std::fmt;

#[derive(Debug)]
pub enum XrdError {
    Xml(Box<quick_xml::Error>),
    Json(Box<serde_json::Error>),
    Malformed(String),
}

impl fmt::Display for XrdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrdError::Xml(err) => write!(f, "XML error: {}", err),
            XrdError::Json(err) => write!(f, "JSON error: {}", err),
            XrdError::Malformed(msg) => write!(f, "Malformed resource descriptor: {}", msg),
        }
    }
}

impl std::error::Error for XrdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XrdError::Xml(err) => Some(err.as_ref()),
            XrdError::Json(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for XrdError {
    fn from(err: quick_xml::Error) -> Self {
        XrdError::Xml(Box::new(err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for XrdError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XrdError::Xml(Box::new(quick_xml::Error::from(err)))
    }
}

impl From<serde_json::Error> for XrdError {
    fn from(err: serde_json::Error) -> Self {
        XrdError::Json(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, XrdError>;
