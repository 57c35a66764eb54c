//! Bar timeframes produced by the aggregator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar period of a series. Serialized as the short codes `"D"` / `"W"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "D")]
    Daily,
    /// Calendar weeks ending Friday.
    #[serde(rename = "W")]
    Weekly,
}

impl Timeframe {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Weekly => "W",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_short_code() {
        let json = serde_json::to_string(&[Timeframe::Daily, Timeframe::Weekly]).unwrap();
        assert_eq!(json, r#"["D","W"]"#);
        assert_eq!(Timeframe::Weekly.to_string(), "W");
    }
}
