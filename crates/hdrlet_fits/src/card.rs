//! Header cards: one keyword, its value and an optional comment.
//!
//! A card serializes to exactly one 80-character record. Values follow the
//! fixed-format conventions: strings start in column 11, numbers and logicals
//! are right-justified to column 30.

use std::fmt;

use crate::error::FitsError;

/// Length of one header record.
pub const CARD_LEN: usize = 80;

/// Maximum keyword length.
pub const KEYWORD_LEN: usize = 8;

/// Keywords whose cards hold free text instead of a value.
const COMMENTARY_KEYWORDS: [&str; 3] = ["HISTORY", "COMMENT", ""];

/// A header value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `T` or `F`
    Logical(bool),
    /// Integer without decimal point or exponent
    Integer(i64),
    /// Real number
    Float(f64),
    /// Quoted character string (trailing blanks are not significant)
    String(String),
    /// Keyword present with an empty value field
    Undefined,
}

impl Value {
    /// String content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content. Floats with no fractional part are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Numeric content as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Logical content.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Logical(b) => Some(*b),
            _ => None,
        }
    }

    fn format_field(&self, keyword: &str) -> Result<String, FitsError> {
        let field = match self {
            Value::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
            Value::Integer(i) => format!("{:>20}", i),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(FitsError::invalid_card(keyword, "non-finite float"));
                }
                // Debug formatting is the shortest representation that reads back exactly
                let text = format!("{:?}", f).replace('e', "E");
                format!("{:>20}", text)
            }
            Value::String(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{:<8}'", escaped)
            }
            Value::Undefined => String::new(),
        };
        Ok(field)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Undefined => Ok(()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Logical(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// One header card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    keyword: String,
    value: Value,
    comment: String,
    /// Text cards (no value indicator) are written back unchanged.
    text: bool,
}

impl Card {
    /// Create a value card. The keyword is upper-cased.
    pub fn new(keyword: &str, value: impl Into<Value>, comment: &str) -> Self {
        let keyword = keyword.trim().to_uppercase();
        let text = COMMENTARY_KEYWORDS.contains(&keyword.as_str());
        Self {
            keyword,
            value: value.into(),
            comment: comment.trim().to_string(),
            text,
        }
    }

    /// Create a `HISTORY` card.
    pub fn history(text: &str) -> Self {
        Self::commentary("HISTORY", text)
    }

    /// Create a `COMMENT` card.
    pub fn comment(text: &str) -> Self {
        Self::commentary("COMMENT", text)
    }

    fn commentary(keyword: &str, text: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            value: Value::String(text.trim_end().to_string()),
            comment: String::new(),
            text: true,
        }
    }

    /// Keyword of this card.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Value of this card. Commentary cards hold their text as a string.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the value.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Comment text.
    pub fn comment_text(&self) -> &str {
        &self.comment
    }

    /// Whether this card holds free text instead of a value: `HISTORY`,
    /// `COMMENT`, blank keywords, and any card read without `= ` in columns
    /// 9-10 (`CONTINUE`, `HIERARCH`).
    pub fn is_commentary(&self) -> bool {
        self.text
    }

    /// Check that the keyword follows the FITS rules.
    pub fn validate_keyword(keyword: &str) -> Result<(), FitsError> {
        let valid = keyword.len() <= KEYWORD_LEN
            && keyword
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(FitsError::InvalidKeyword(keyword.to_string()))
        }
    }

    /// Format this card as an 80-byte record.
    pub fn to_record(&self) -> Result<[u8; CARD_LEN], FitsError> {
        Self::validate_keyword(&self.keyword)?;

        let mut text = format!("{:<8}", self.keyword);
        if self.is_commentary() {
            let body = self.value.as_str().unwrap_or_default();
            text.push_str(body);
        } else {
            let field = self.value.format_field(&self.keyword)?;
            if field.len() > CARD_LEN - 10 {
                return Err(FitsError::ValueTooLong {
                    keyword: self.keyword.clone(),
                });
            }
            text.push_str("= ");
            text.push_str(&field);
            if !self.comment.is_empty() {
                text.push_str(" / ");
                text.push_str(&self.comment);
            }
        }

        if !text.is_ascii() {
            return Err(FitsError::invalid_card(&self.keyword, "non-ASCII text"));
        }
        if self.is_commentary() && text.len() > CARD_LEN {
            return Err(FitsError::ValueTooLong {
                keyword: self.keyword.clone(),
            });
        }

        let mut record = [b' '; CARD_LEN];
        let len = text.len().min(CARD_LEN);
        record[..len].copy_from_slice(&text.as_bytes()[..len]);
        Ok(record)
    }

    /// Parse an 80-byte record. Returns `None` for the `END` card.
    pub fn from_record(record: &[u8]) -> Result<Option<Self>, FitsError> {
        if record.len() != CARD_LEN || !record.is_ascii() {
            return Err(FitsError::invalid_card("", "record is not 80 ASCII bytes"));
        }
        // Checked ASCII above, so byte offsets are char boundaries
        let text = std::str::from_utf8(record)
            .map_err(|_| FitsError::invalid_card("", "record is not valid text"))?;
        let keyword = text[..KEYWORD_LEN].trim_end();

        if keyword == "END" {
            return Ok(None);
        }

        if &text[8..10] != "= " || COMMENTARY_KEYWORDS.contains(&keyword) {
            return Ok(Some(Self {
                keyword: keyword.to_string(),
                value: Value::String(text[8..].trim_end().to_string()),
                comment: String::new(),
                text: true,
            }));
        }

        let (value, comment) = parse_value_field(keyword, &text[10..])?;
        Ok(Some(Self {
            keyword: keyword.to_string(),
            value,
            comment,
            text: false,
        }))
    }
}

fn parse_value_field(keyword: &str, field: &str) -> Result<(Value, String), FitsError> {
    let trimmed = field.trim_start();

    if let Some(rest) = trimmed.strip_prefix('\'') {
        let mut value = String::new();
        let mut chars = rest.char_indices().peekable();
        let mut end = None;
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    value.push('\'');
                    chars.next();
                } else {
                    end = Some(i + 1);
                    break;
                }
            } else {
                value.push(c);
            }
        }
        let end = end.ok_or_else(|| FitsError::invalid_card(keyword, "unterminated string"))?;
        let comment = rest[end..]
            .split_once('/')
            .map(|(_, c)| c.trim().to_string())
            .unwrap_or_default();
        return Ok((Value::String(value.trim_end().to_string()), comment));
    }

    let (raw, comment) = match field.split_once('/') {
        Some((v, c)) => (v.trim(), c.trim().to_string()),
        None => (field.trim(), String::new()),
    };

    let value = match raw {
        "" => Value::Undefined,
        "T" => Value::Logical(true),
        "F" => Value::Logical(false),
        _ if raw.contains(['.', 'E', 'e', 'D', 'd']) => raw
            .replace(['D', 'd'], "E")
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| FitsError::invalid_card(keyword, format!("bad number '{}'", raw)))?,
        _ => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| FitsError::invalid_card(keyword, format!("bad value '{}'", raw)))?,
    };

    Ok((value, comment))
}
