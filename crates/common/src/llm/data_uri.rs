//! `data:<mime>;base64,<payload>` values for binary prompt inputs

use crate::errors::{AppError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::str::FromStr;

/// A self-describing binary payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    /// Standard base64, padded
    pub data: String,
}

impl DataUri {
    pub fn encode(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    /// File extension for the media subtype, e.g. `png` for `image/png`
    pub fn extension(&self) -> &str {
        let subtype = self.mime_type.split('/').nth(1).unwrap_or_default();
        let subtype = subtype.split(['+', ';']).next().unwrap_or_default().trim();
        if !subtype.is_empty() && subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
            subtype
        } else {
            "bin"
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD.decode(&self.data).map_err(|e| AppError::InvalidFormat {
            message: format!("Invalid base64 payload: {}", e),
        })
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

impl FromStr for DataUri {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| AppError::InvalidFormat {
            message: message.to_string(),
        };

        let rest = s
            .strip_prefix("data:")
            .ok_or_else(|| invalid("Data URI must start with 'data:'"))?;
        let (mime_type, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| invalid("Data URI must use base64 encoding"))?;
        if mime_type.is_empty() || !mime_type.contains('/') {
            return Err(invalid("Data URI must include a MIME type"));
        }

        let uri = DataUri {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        };
        uri.decode()?;
        Ok(uri)
    }
}
