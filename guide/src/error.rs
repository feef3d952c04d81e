use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or querying the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document has the requested name.
    #[error("document not found: {name}{}", did_you_mean(.suggestion))]
    NotFound {
        name: String,
        /// A stored name that matches case-insensitively.
        suggestion: Option<String>,
    },

    /// A document name that cannot be addressed by path.
    #[error("invalid document name '{0}': use lowercase letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
