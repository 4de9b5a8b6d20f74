//! Header field-line parsing and the header map.

use std::collections::HashMap;

use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldLineError {
    #[error("field line has no ':' between field name and value")]
    MissingColon,
    #[error("field name is empty")]
    EmptyName,
    #[error("field name has whitespace before the colon")]
    SpaceBeforeColon,
    #[error("field name {0:?} contains a character outside the token set")]
    InvalidNameCharacter(String),
    #[error("field line is not valid utf-8")]
    InvalidEncoding,
}

/// Case-insensitive header map. Keys are stored lower-cased; lookups may
/// use any casing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Parse one field line from the front of `data`.
    ///
    /// Returns `(consumed, done)`: how many bytes were used, and whether
    /// the empty line ending the header section was reached. `(0, false)`
    /// means no complete line is buffered yet; call again with more data.
    ///
    /// Field names keep their trailing-whitespace violations visible: the
    /// name is trimmed of leading spaces only, so `Host : x` is an error
    /// rather than silently accepted. Values are trimmed on both sides.
    pub fn parse_field_line(&mut self, data: &[u8]) -> Result<(usize, bool), FieldLineError> {
        let Some(crlf) = find_crlf(data) else {
            return Ok((0, false));
        };
        if crlf == 0 {
            return Ok((2, true));
        }

        let line = std::str::from_utf8(&data[..crlf]).map_err(|_| FieldLineError::InvalidEncoding)?;
        let (name, value) = line.split_once(':').ok_or(FieldLineError::MissingColon)?;
        let name = name.trim_start_matches(' ');
        let value = value.trim_matches(' ');

        if name.is_empty() {
            return Err(FieldLineError::EmptyName);
        }
        if name.contains(' ') {
            return Err(FieldLineError::SpaceBeforeColon);
        }
        if !name.bytes().all(is_token_byte) {
            return Err(FieldLineError::InvalidNameCharacter(name.to_string()));
        }

        self.add(name, value);
        Ok((crlf + 2, false))
    }

    /// Insert under the duplicate-merge rule: a repeat of the stored value
    /// is dropped, a different value is appended with `", "`.
    pub fn add(&mut self, name: &str, value: &str) {
        let key = name.to_ascii_lowercase();
        match self.map.get_mut(&key) {
            Some(existing) => {
                if existing.as_str() != value {
                    existing.push_str(", ");
                    existing.push_str(value);
                }
            }
            None => {
                self.map.insert(key, value.to_string());
            }
        }
    }

    /// Insert, overwriting any existing value. Used on the response side
    /// where the server owns the map.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.map
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == CRLF)
}

/// Token characters per the HTTP grammar: ASCII letters and digits plus
/// ``!#$%&'*+-.^_`|~``.
pub(crate) fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}
