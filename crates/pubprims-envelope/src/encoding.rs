//! Data encoding tags.
//!
//! The tag written to `metadata.data_encoding` is the only thing the parser
//! consults when choosing a decode path. Payload bytes are never sniffed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the `data` member of an envelope is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataEncoding {
    /// The payload JSON value, embedded as-is.
    Raw,
    /// Same layout as `Raw`, under the explicit JSON tag.
    Json,
    /// JSON text, gzip-compressed, base64-encoded.
    Base64GzipJson,
    /// Canonical protobuf bytes, base64-encoded.
    Proto,
}

impl DataEncoding {
    /// The wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            DataEncoding::Raw => "raw",
            DataEncoding::Json => "json",
            DataEncoding::Base64GzipJson => "base64_gzip_json",
            DataEncoding::Proto => "proto",
        }
    }

    /// Returns true if `data` carries an embedded JSON value.
    pub fn is_text(self) -> bool {
        matches!(self, DataEncoding::Raw | DataEncoding::Json)
    }

    /// Returns true if the decoded payload is JSON.
    pub fn is_json_family(self) -> bool {
        !matches!(self, DataEncoding::Proto)
    }
}

impl fmt::Display for DataEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(DataEncoding::Raw),
            "json" => Ok(DataEncoding::Json),
            "base64_gzip_json" => Ok(DataEncoding::Base64GzipJson),
            "proto" => Ok(DataEncoding::Proto),
            other => Err(format!("unknown data encoding: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DataEncoding; 4] = [
        DataEncoding::Raw,
        DataEncoding::Json,
        DataEncoding::Base64GzipJson,
        DataEncoding::Proto,
    ];

    #[test]
    fn serde_tags_match_as_str() {
        for encoding in ALL {
            let json = serde_json::to_string(&encoding).unwrap();
            assert_eq!(json, format!("\"{}\"", encoding.as_str()));
            assert_eq!(encoding.as_str().parse::<DataEncoding>().unwrap(), encoding);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!("gzip".parse::<DataEncoding>().is_err());
        assert!(serde_json::from_str::<DataEncoding>("\"zlib\"").is_err());
    }

    #[test]
    fn families() {
        assert!(DataEncoding::Raw.is_text());
        assert!(DataEncoding::Json.is_text());
        assert!(!DataEncoding::Base64GzipJson.is_text());
        assert!(DataEncoding::Base64GzipJson.is_json_family());
        assert!(!DataEncoding::Proto.is_json_family());
    }
}
