//! Catalog value types shared by providers and the gateway

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque catalog record (book, review, library entry).
pub type Item = serde_json::Value;

/// Outcome of a lookup by primary key.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

/// Reading status of a library entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingStatus {
    WantToRead,
    CurrentlyReading,
    Read,
    DidNotFinish,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 4] = [
        ReadingStatus::WantToRead,
        ReadingStatus::CurrentlyReading,
        ReadingStatus::Read,
        ReadingStatus::DidNotFinish,
    ];

    /// Names accepted on the wire, in declaration order.
    pub const NAMES: &'static [&'static str] =
        &["WANT_TO_READ", "CURRENTLY_READING", "READ", "DID_NOT_FINISH"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "WANT_TO_READ",
            ReadingStatus::CurrentlyReading => "CURRENTLY_READING",
            ReadingStatus::Read => "READ",
            ReadingStatus::DidNotFinish => "DID_NOT_FINISH",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown reading status '{}'", s))
    }
}

/// Changes applied to an existing library entry
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    /// Library entry (user book) id
    pub id: i64,
    pub status: ReadingStatus,
    /// Star rating, 1-5
    pub rating: Option<f64>,
    /// Reading progress percentage, 0-100
    pub progress: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_status_parses_wire_names() {
        for name in ReadingStatus::NAMES {
            let status: ReadingStatus = name.parse().unwrap();
            assert_eq!(status.as_str(), *name);
        }
        assert!("WANTTOREAD".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn reading_status_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ReadingStatus::DidNotFinish).unwrap();
        assert_eq!(json, "\"DID_NOT_FINISH\"");
    }

    #[test]
    fn lookup_from_option() {
        assert_eq!(Lookup::from(Some(1)), Lookup::Found(1));
        assert!(!Lookup::<i32>::from(None).is_found());
    }
}
