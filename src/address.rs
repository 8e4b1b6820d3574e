//! Query address codec: builds the canonical page address for a (date, site, interval)
//! and parses such an address back. `parse(addr.url())` recovers the date, region,
//! station and interval of `addr`; the schema class must come from the caller.

use crate::constants::{
    JMA_ETRN_VIEW_URL, PARAM_DAY, PARAM_MONTH, PARAM_REGION, PARAM_STATION, PARAM_YEAR,
};
use crate::error::{Result, ScraperError};
use crate::registry::{SamplingInterval, SchemaClass, Site};
use chrono::{Datelike, Local, NaiveDate};
use reqwest::Url;
use std::fmt;
use std::str::FromStr;

/// Local calendar date, the reference point for "past only"
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryAddress {
    observation_date: NaiveDate,
    region_code: u32,
    station_code: u32,
    interval: SamplingInterval,
    schema_class: SchemaClass,
}

impl QueryAddress {
    /// Fails with `InvalidAddress` unless `observation_date` is strictly before today.
    pub fn new(
        observation_date: NaiveDate,
        region_code: u32,
        station_code: u32,
        interval: SamplingInterval,
        schema_class: SchemaClass,
    ) -> Result<Self> {
        Self::new_as_of(
            observation_date,
            region_code,
            station_code,
            interval,
            schema_class,
            today(),
        )
    }

    pub fn new_as_of(
        observation_date: NaiveDate,
        region_code: u32,
        station_code: u32,
        interval: SamplingInterval,
        schema_class: SchemaClass,
        today: NaiveDate,
    ) -> Result<Self> {
        if observation_date >= today {
            return Err(ScraperError::InvalidAddress(format!(
                "observation date {observation_date} must be before {today}"
            )));
        }
        Ok(Self {
            observation_date,
            region_code,
            station_code,
            interval,
            schema_class,
        })
    }

    pub fn for_site(site: &Site, observation_date: NaiveDate, interval: SamplingInterval) -> Result<Self> {
        Self::new(
            observation_date,
            site.region_code,
            site.station_code,
            interval,
            site.schema_class,
        )
    }

    pub fn observation_date(&self) -> NaiveDate {
        self.observation_date
    }

    pub fn region_code(&self) -> u32 {
        self.region_code
    }

    pub fn station_code(&self) -> u32 {
        self.station_code
    }

    pub fn interval(&self) -> SamplingInterval {
        self.interval
    }

    pub fn schema_class(&self) -> SchemaClass {
        self.schema_class
    }

    /// The canonical address string. Month and day are not zero-padded.
    pub fn url(&self) -> String {
        format!(
            "{base}/{interval}_{schema}.php?{PARAM_REGION}={region}&{PARAM_STATION}={station}&{PARAM_YEAR}={year}&{PARAM_MONTH}={month}&{PARAM_DAY}={day}",
            base = JMA_ETRN_VIEW_URL,
            interval = self.interval.token(),
            schema = self.schema_class.token(),
            region = self.region_code,
            station = self.station_code,
            year = self.observation_date.year(),
            month = self.observation_date.month(),
            day = self.observation_date.day(),
        )
    }

    /// Parse an address back into its parts.
    ///
    /// Only the first value of a repeated query key is used. A schema token in the path
    /// that names a class other than `schema_class` makes the address inconsistent.
    pub fn parse(url: &str, schema_class: SchemaClass) -> Result<Self> {
        Self::parse_as_of(url, schema_class, today())
    }

    pub fn parse_as_of(url: &str, schema_class: SchemaClass, today: NaiveDate) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| ScraperError::MalformedAddress(format!("{url}: {e}")))?;

        let observation_date = date_from_url(&parsed)?;
        let region_code = int_param(&parsed, PARAM_REGION)?;
        let station_code = int_param(&parsed, PARAM_STATION)?;
        let (interval, path_class) = page_tokens(&parsed)?;

        if path_class != schema_class {
            return Err(ScraperError::MalformedAddress(format!(
                "{url}: page is a '{path_class}' page but '{schema_class}' was expected"
            )));
        }

        Self::new_as_of(
            observation_date,
            region_code,
            station_code,
            interval,
            schema_class,
            today,
        )
    }
}

impl fmt::Display for QueryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Only the observation date of an address, without any past-date check.
///
/// Used when replaying failed fetches, where the site is recovered separately.
pub fn parse_date(url: &str) -> Result<NaiveDate> {
    let parsed = Url::parse(url)
        .map_err(|e| ScraperError::MalformedAddress(format!("{url}: {e}")))?;
    date_from_url(&parsed)
}

/// Region and station codes of an address
pub fn parse_site_codes(url: &str) -> Result<(u32, u32)> {
    let parsed = Url::parse(url)
        .map_err(|e| ScraperError::MalformedAddress(format!("{url}: {e}")))?;
    Ok((int_param(&parsed, PARAM_REGION)?, int_param(&parsed, PARAM_STATION)?))
}

/// Interval and schema class named by the page in the address path
pub fn parse_page(url: &str) -> Result<(SamplingInterval, SchemaClass)> {
    let parsed = Url::parse(url)
        .map_err(|e| ScraperError::MalformedAddress(format!("{url}: {e}")))?;
    page_tokens(&parsed)
}

fn date_from_url(url: &Url) -> Result<NaiveDate> {
    let year: i32 = int_param(url, PARAM_YEAR)?;
    let month: u32 = int_param(url, PARAM_MONTH)?;
    let day: u32 = int_param(url, PARAM_DAY)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ScraperError::MalformedAddress(format!("{year}-{month}-{day} is not a calendar date"))
    })
}

fn first_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn int_param<T: FromStr>(url: &Url, key: &str) -> Result<T> {
    let raw = first_param(url, key).ok_or_else(|| {
        ScraperError::MalformedAddress(format!("missing required query parameter '{key}'"))
    })?;
    raw.trim().parse().map_err(|_| {
        ScraperError::MalformedAddress(format!("query parameter '{key}' is not an integer: '{raw}'"))
    })
}

/// `.../10min_s1.php` -> (TenMinutes, Rich)
fn page_tokens(url: &Url) -> Result<(SamplingInterval, SchemaClass)> {
    let page = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or_default();
    let stem = page.split('.').next().unwrap_or_default();
    let (interval_token, schema_token) = stem.rsplit_once('_').ok_or_else(|| {
        ScraperError::MalformedAddress(format!("page name '{page}' has no interval/schema tokens"))
    })?;
    let interval = SamplingInterval::from_token(interval_token).ok_or_else(|| {
        ScraperError::MalformedAddress(format!("unknown interval token '{interval_token}'"))
    })?;
    let class = SchemaClass::from_token(schema_token).ok_or_else(|| {
        ScraperError::MalformedAddress(format!("unknown schema token '{schema_token}'"))
    })?;
    Ok((interval, class))
}
