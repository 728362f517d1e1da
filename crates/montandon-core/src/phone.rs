// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number canonicalization.
//!
//! Numbers are reduced to bare digits and, when they look like a national
//! number (10 or 11 digits), prefixed with a default country code. There is
//! no dialing-plan validation beyond that length heuristic.

/// Country code prepended when none is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "55";

/// Normalizes a raw phone string to digits-only form with a country code.
///
/// - every non-digit character is removed
/// - an empty result stays empty
/// - exactly one leading zero (trunk prefix) is dropped
/// - 10 or 11 remaining digits get `country_code` prepended
/// - anything else is returned as cleaned digits
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = digits.strip_prefix('0').unwrap_or(&digits);

    match national.len() {
        10 | 11 => format!("{country_code}{national}"),
        _ => national.to_string(),
    }
}

/// A phone normalizer bound to a configured country code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNormalizer {
    country_code: String,
}

impl PhoneNormalizer {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_phone(raw, &self.country_code)
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}
