//! Declaration locations for error reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a declaration was found.
///
/// `element` is the scanner's name for the annotated element (for example
/// `com.example.Adapters#loadImage`); line and column are 1-indexed and `0`
/// when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub element: String,
    pub line: u32,
    pub col: u32,
}

impl Location {
    #[inline]
    pub fn new(element: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            element: element.into(),
            line,
            col,
        }
    }

    /// A location known only by element name.
    #[inline]
    pub fn element(element: impl Into<String>) -> Self {
        Self::new(element, 0, 0)
    }

    #[inline]
    pub fn has_position(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_position() {
            write!(f, "{}:{}:{}", self.element, self.line, self.col)
        } else {
            f.write_str(&self.element)
        }
    }
}
