//! Glob patterns over full paths.
//!
//! `*` matches any run of characters, separators included. Everything
//! else matches literally and the whole path must match.

use crate::{FsError, Result};
use regex::Regex;

/// Compiled path pattern
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("(?s)^{}$", body))
            .map_err(|e| FsError::InvalidPath(format!("bad pattern {:?}: {}", pattern, e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Literal folder prefix before the first wildcard
    pub fn base(&self) -> &str {
        let literal = self.pattern.split('*').next().unwrap_or("");
        match literal.rfind('/') {
            Some(pos) => &literal[..=pos],
            None => "",
        }
    }
}
