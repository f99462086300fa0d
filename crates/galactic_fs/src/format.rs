//! Render targets for file content

use crate::{Entry, FsError, ObjectUrl};
use std::str::FromStr;

/// How `File::get` renders content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Raw bytes
    Bytes,
    /// Bytes tagged with the file's MIME type
    Blob,
    /// Parsed JSON value
    Json,
    /// UTF-8 text
    Text,
    /// Scoped reference resolvable through the owning filesystem
    Url,
    /// The entry itself
    Entry,
}

impl FromStr for Format {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bytes" | "arrayBuffer" => Ok(Format::Bytes),
            "blob" => Ok(Format::Blob),
            "json" => Ok(Format::Json),
            "text" | "string" => Ok(Format::Text),
            "url" => Ok(Format::Url),
            "entry" => Ok(Format::Entry),
            other => Err(FsError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Bytes plus MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Rendered file content
#[derive(Debug)]
pub enum Content {
    Bytes(Vec<u8>),
    Blob(Blob),
    Json(serde_json::Value),
    Text(String),
    Url(ObjectUrl),
    Entry(Entry),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!("string".parse::<Format>().unwrap(), Format::Text);
        assert_eq!("arrayBuffer".parse::<Format>().unwrap(), Format::Bytes);
        assert_eq!("entry".parse::<Format>().unwrap(), Format::Entry);
    }

    #[test]
    fn test_unknown_format() {
        let err = "xml".parse::<Format>().unwrap_err();
        assert!(matches!(err, FsError::UnsupportedFormat(name) if name == "xml"));
    }
}
