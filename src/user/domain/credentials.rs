//! Email addresses, plaintext passwords, and stored password hashes.

use super::UserDomainError;
use std::fmt;

const MAX_EMAIL_LENGTH: usize = 255;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 100;

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses an email address.
    ///
    /// The address is trimmed and lower-cased. It must contain exactly one
    /// `@`, a non-empty local part, and a dotted domain.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::InvalidEmail`] when the address is
    /// malformed.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();

        if is_well_formed(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(UserDomainError::InvalidEmail(raw))
        }
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_well_formed(address: &str) -> bool {
    if address.chars().count() > MAX_EMAIL_LENGTH || address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    let labels_ok = domain.split('.').all(|label| !label.is_empty());
    !local.is_empty() && !domain.contains('@') && domain.contains('.') && labels_ok
}

const fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

const fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Character classes must all appear on one line, after its leading dots.
fn line_is_strong(line: &str) -> bool {
    let rest = line.trim_start_matches('.');
    let has_upper = rest.chars().any(|ch| ch.is_ascii_uppercase());
    let has_lower = rest.chars().any(|ch| ch.is_ascii_lowercase());
    let has_digit_or_symbol = rest
        .chars()
        .any(|ch| ch.is_ascii_digit() || !is_word_char(ch));
    has_upper && has_lower && has_digit_or_symbol
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plaintext password that passed the strength rules.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(String);

impl PlainPassword {
    /// Validates a candidate password.
    ///
    /// Passwords are 8 to 100 characters long and contain an ASCII
    /// uppercase letter, an ASCII lowercase letter, and a digit or symbol.
    /// A symbol is anything outside `[A-Za-z0-9_]`, so non-ASCII letters
    /// count as symbols and `_` does not. All three must occur on a single
    /// line, and leading dots on that line do not count.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::PasswordLength`] or
    /// [`UserDomainError::WeakPassword`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let candidate = value.into();
        let length = candidate.chars().count();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            return Err(UserDomainError::PasswordLength {
                min: MIN_PASSWORD_LENGTH,
                max: MAX_PASSWORD_LENGTH,
            });
        }

        if !candidate.split(is_line_break).any(line_is_strong) {
            return Err(UserDomainError::WeakPassword);
        }

        Ok(Self(candidate))
    }

    /// Exposes the plaintext for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(..)")
    }
}

/// Encoded one-way password hash as produced by a password hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an encoded hash string.
    #[must_use]
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}
