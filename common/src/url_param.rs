//! Query-string token for catalog state.
//!
//! A value is written as CBOR and then URL-safe base64, so the whole filter
//! state fits in a single query parameter and parses back to an equal value.

use std::{fmt::Display, str::FromStr};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};


#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UrlParam<T>(pub T);

impl <T> From<T> for UrlParam<T> {
    fn from(value: T) -> Self {
        UrlParam(value)
    }
}

impl <T: Serialize> UrlParam<T> {
    pub fn encode(&self) -> Result<String, StateParseError> {
        let mut serialized = Vec::new();
        ciborium::into_writer(&self.0, &mut serialized).map_err(|e| StateParseError::EncodeError(format!("{:?}", e)))?;
        Ok(URL_SAFE.encode(serialized))
    }
}

// Display the state in a way that can be parsed by FromStr
impl<T: Serialize> Display for UrlParam<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Ok(encoded) = self.encode() {
            write!(f, "{}", encoded)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum StateParseError {
    DecodeError(base64::DecodeError),
    CiboriumError(ciborium::de::Error<std::io::Error>),
    EncodeError(String),
}

impl std::fmt::Display for StateParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeError(err) => write!(f, "Failed to decode base64: {}", err),
            Self::CiboriumError(err) => write!(f, "Failed to deserialize: {}", err),
            Self::EncodeError(err) => write!(f, "Failed to serialize: {}", err),
        }
    }
}

impl std::error::Error for StateParseError {}

// Parse the state from a string that was created by Display
impl<T: for<'de> Deserialize<'de>> FromStr for UrlParam<T> {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = URL_SAFE
            .decode(s.as_bytes())
            .map_err(StateParseError::DecodeError)?;
        let parsed = ciborium::from_reader(std::io::Cursor::new(decoded))
            .map_err(StateParseError::CiboriumError)?;
        Ok(UrlParam(parsed))
    }
}
