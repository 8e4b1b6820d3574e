use crate::error::ScraperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation interval of an observation page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingInterval {
    TenMinutes,
    Hourly,
    Daily,
    /// Each month cut into six buckets of five days (the last one takes the rest)
    FiveDay,
    /// Each month cut into 1-10, 11-20 and 21-end
    TenDay,
}

impl SamplingInterval {
    pub const ALL: [SamplingInterval; 5] = [
        SamplingInterval::TenMinutes,
        SamplingInterval::Hourly,
        SamplingInterval::Daily,
        SamplingInterval::FiveDay,
        SamplingInterval::TenDay,
    ];

    /// Prefix of the page name in the address path
    pub fn token(self) -> &'static str {
        match self {
            SamplingInterval::TenMinutes => "10min",
            SamplingInterval::Hourly => "hourly",
            SamplingInterval::Daily => "daily",
            SamplingInterval::FiveDay => "mb5daily",
            SamplingInterval::TenDay => "10daily",
        }
    }

    /// Key used in output file names and remote object keys
    pub fn key(self) -> &'static str {
        match self {
            SamplingInterval::TenMinutes => "every_10_minutes",
            SamplingInterval::Hourly => "every_1_hour",
            SamplingInterval::Daily => "every_1_days",
            SamplingInterval::FiveDay => "every_5_days",
            SamplingInterval::TenDay => "every_10_days",
        }
    }

    /// Short form accepted on the command line
    pub fn alias(self) -> &'static str {
        match self {
            SamplingInterval::TenMinutes => "10m",
            SamplingInterval::Hourly => "1h",
            SamplingInterval::Daily => "1d",
            SamplingInterval::FiveDay => "5d",
            SamplingInterval::TenDay => "10d",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.token() == token)
    }
}

impl FromStr for SamplingInterval {
    type Err = ScraperError;

    /// Accepts the short alias or the file-name key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|i| i.alias() == s || i.key() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|i| i.alias()).collect();
                ScraperError::UnknownInterval(format!(
                    "{s} (allowed input is one of {})",
                    allowed.join(", ")
                ))
            })
    }
}

impl fmt::Display for SamplingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_resolvable() {
        for interval in SamplingInterval::ALL {
            assert_eq!(SamplingInterval::from_token(interval.token()), Some(interval));
        }
        assert_eq!(SamplingInterval::from_token("weekly"), None);
    }

    #[test]
    fn test_from_str_accepts_alias_and_key() {
        assert_eq!("10m".parse::<SamplingInterval>().unwrap(), SamplingInterval::TenMinutes);
        assert_eq!(
            "every_5_days".parse::<SamplingInterval>().unwrap(),
            SamplingInterval::FiveDay
        );
        let err = "invalid_interval".parse::<SamplingInterval>().unwrap_err();
        assert!(err.to_string().contains("allowed input is one of"));
    }
}
