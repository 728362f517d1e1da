// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message template rendering.
//!
//! A template is plain text with `{key}` placeholders filled from a contact.
//! `{{` and `}}` produce literal braces. Known keys, with their Portuguese
//! aliases:
//!
//! | key        | alias       | contact field |
//! |------------|-------------|---------------|
//! | `name`     | `nome`      | name          |
//! | `city`     | `cidade`    | address       |
//! | `category` | `categoria` | category      |
//!
//! Absent contact fields render as the empty string. Anything else between
//! braces is an error, so a typo never reaches a customer.

use montandon_core::types::Contact;
use thiserror::Error;

const KNOWN_KEYS: &[&str] = &["name", "nome", "city", "cidade", "category", "categoria"];

/// Why a template could not be rendered. Offsets are byte positions in the
/// template content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder `{{{key}}}` at offset {offset}{}", suggestion_suffix(.suggestion))]
    UnknownPlaceholder {
        key: String,
        offset: usize,
        suggestion: Option<&'static str>,
    },

    #[error("empty placeholder `{{}}` at offset {offset}")]
    EmptyPlaceholder { offset: usize },

    #[error("unclosed `{{` at offset {offset}")]
    Unclosed { offset: usize },

    #[error("unmatched `}}` at offset {offset}; write `}}}}` for a literal brace")]
    StrayClose { offset: usize },
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|s| format!(" (did you mean `{{{s}}}`?)"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    City,
    Category,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" | "nome" => Some(Self::Name),
            "city" | "cidade" => Some(Self::City),
            "category" | "categoria" => Some(Self::Category),
            _ => None,
        }
    }

    fn value(self, contact: &Contact) -> &str {
        match self {
            Self::Name => &contact.name,
            Self::City => contact.address.as_deref().unwrap_or_default(),
            Self::Category => contact.category.as_deref().unwrap_or_default(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Brace(char),
    Field(Field),
}

fn parse(content: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let bytes = content.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                if text_start < i {
                    segments.push(Segment::Text(&content[text_start..i]));
                }
                segments.push(Segment::Brace(bytes[i] as char));
                i += 2;
                text_start = i;
            }
            b'{' => {
                if text_start < i {
                    segments.push(Segment::Text(&content[text_start..i]));
                }
                let close = content[i + 1..]
                    .find(['{', '}'])
                    .map(|rel| i + 1 + rel)
                    .filter(|&end| bytes[end] == b'}')
                    .ok_or(TemplateError::Unclosed { offset: i })?;
                let key = &content[i + 1..close];
                if key.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder { offset: i });
                }
                let field = Field::from_key(key).ok_or_else(|| TemplateError::UnknownPlaceholder {
                    key: key.to_string(),
                    offset: i,
                    suggestion: suggest_key(key),
                })?;
                segments.push(Segment::Field(field));
                i = close + 1;
                text_start = i;
            }
            b'}' => return Err(TemplateError::StrayClose { offset: i }),
            _ => i += 1,
        }
    }
    if text_start < bytes.len() {
        segments.push(Segment::Text(&content[text_start..]));
    }
    Ok(segments)
}

/// Closest known key by Jaro-Winkler similarity, if any is close enough.
fn suggest_key(key: &str) -> Option<&'static str> {
    KNOWN_KEYS
        .iter()
        .map(|known| (*known, strsim::jaro_winkler(key, known)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(known, _)| known)
}

/// Checks template syntax and placeholder names without a contact.
pub fn validate_template(content: &str) -> Result<(), TemplateError> {
    parse(content).map(|_| ())
}

/// Renders `content` for one contact.
pub fn render(content: &str, contact: &Contact) -> Result<String, TemplateError> {
    let segments = parse(content)?;
    let mut out = String::with_capacity(content.len() + 32);
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Brace(brace) => out.push(brace),
            Segment::Field(field) => out.push_str(field.value(contact)),
        }
    }
    Ok(out)
}
