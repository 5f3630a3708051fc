//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BuildError;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Same as [`string_or_vec`], but keeps "absent" apart from "empty"
fn opt_string_or_vec<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_vec(deserializer).map(Some)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    #[serde(rename = "readTime")]
    pub read_time: Option<u32>,
    pub featured: bool,
    /// Posts are published unless explicitly marked otherwise
    #[serde(default = "default_published")]
    pub published: bool,
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_string_or_vec", default)]
    pub keywords: Option<Vec<String>>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            slug: None,
            date: None,
            last_modified: None,
            author: None,
            summary: None,
            excerpt: None,
            tags: Vec::new(),
            category: None,
            read_time: None,
            featured: false,
            published: true,
            description: None,
            keywords: None,
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), BuildError> {
        // Editors on Windows may save a byte-order mark ahead of the fence
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let trimmed = content.trim_start();

        let Some(rest) = trimmed.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        let rest = rest.trim_start_matches([' ', '\t', '\r']);
        let Some(rest) = rest.strip_prefix('\n') else {
            // A line like `----` or `--- text` is markdown, not a fence
            return Ok((FrontMatter::default(), content));
        };

        let (yaml, remaining) = if let Some(body) = rest.strip_prefix("---") {
            ("", body)
        } else if let Some(end_pos) = rest.find("\n---") {
            (&rest[..end_pos], &rest[end_pos + 4..])
        } else {
            // No closing fence, treat everything as content
            return Ok((FrontMatter::default(), content));
        };

        // Drop the rest of the closing fence line
        let remaining = match remaining.find('\n') {
            Some(pos) if remaining[..pos].trim().is_empty() => &remaining[pos + 1..],
            None if remaining.trim().is_empty() => "",
            _ => remaining,
        };

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml)
            .map_err(|e| BuildError::parse("front-matter", e))?;
        Ok((fm, remaining))
    }

    /// Title, treating an empty value as missing
    pub fn title(&self) -> Result<&str, BuildError> {
        non_empty(&self.title).ok_or(BuildError::Validation { field: "title" })
    }

    /// Parse the `date` field into a calendar date
    pub fn parse_date(&self) -> Result<Option<NaiveDate>, BuildError> {
        parse_optional(&self.date, "date")
    }

    /// Parse the `lastModified` field into a calendar date
    pub fn parse_last_modified(&self) -> Result<Option<NaiveDate>, BuildError> {
        parse_optional(&self.last_modified, "lastModified")
    }
}

/// `Some` only for values that are present and not blank
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn parse_optional(value: &Option<String>, field: &str) -> Result<Option<NaiveDate>, BuildError> {
    match non_empty(value) {
        Some(s) => parse_date_string(s)
            .map(Some)
            .ok_or_else(|| BuildError::parse(format!("`{}`", field), format!("invalid date {:?}", s))),
        None => Ok(None),
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    // Explicit offsets are normalized to UTC first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_byte_order_mark() {
        let (fm, body) = FrontMatter::parse("\u{feff}---\ntitle: With BOM\n---\nBody").unwrap();
        assert_eq!(fm.title().unwrap(), "With BOM");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - blog
category: Tech
readTime: 4
featured: true
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.tags, vec!["rust", "blog"]);
        assert_eq!(fm.category.as_deref(), Some("Tech"));
        assert_eq!(fm.read_time, Some(4));
        assert!(fm.featured);
        assert!(fm.published);
        assert!(fm.keywords.is_none());
        assert!(remaining.contains("This is the content."));
        assert!(!remaining.contains("---"));
    }

    #[test]
    fn test_single_string_tags_and_keywords() {
        let content = "---\ntitle: Single\ntags: Notes\nkeywords: rust\n---\nBody\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
        assert_eq!(fm.keywords, Some(vec!["rust".to_string()]));
        assert_eq!(remaining, "Body\n");
    }

    #[test]
    fn test_explicit_unpublished() {
        let content = "---\ntitle: Draft\npublished: false\n---\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(!fm.published);
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just markdown\n\nNo metadata here.";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, content);
        assert!(fm.title().is_err());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, BuildError::Parse { .. }));
    }

    #[test]
    fn test_empty_title_is_missing() {
        let content = "---\ntitle: \"  \"\n---\nBody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert!(matches!(
            fm.title(),
            Err(BuildError::Validation { field: "title" })
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date_string("2024-01-15"), Some(expected));
        assert_eq!(parse_date_string("2024/01/15"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(
            parse_date_string("2024-01-16T01:00:00+02:00"),
            Some(expected)
        );
        assert_eq!(parse_date_string("next tuesday"), None);
    }

    #[test]
    fn test_invalid_date_field() {
        let fm = FrontMatter {
            date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(fm.parse_date().is_err());
        assert_eq!(fm.parse_last_modified().unwrap(), None);
    }
}
