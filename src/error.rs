//! Per-document build errors

use thiserror::Error;

/// Why a single source document did not become a post.
///
/// None of these abort a build: the aggregator logs them and moves on to the
/// next document.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A required front-matter field is missing or empty
    #[error("missing `{field}` in front-matter")]
    Validation { field: &'static str },

    /// The document or one of its fields could not be parsed
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// Another document already claimed this slug
    #[error("slug {slug:?} is already used by {existing}")]
    DuplicateSlug { slug: String, existing: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub(crate) fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Validation failures and slug collisions are warnings, everything else is an error
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::DuplicateSlug { .. })
    }
}
