/// Base of every past-data page address
pub const JMA_ETRN_VIEW_URL: &str = "https://www.data.jma.go.jp/obd/stats/etrn/view";

/// The JMA pages mark the observation table body with this element id
pub const TABLE_ID_MARKER: &str = "tablefix1";

/// Joins the outer and inner header labels of a two-level column
pub const HEADER_SEPARATOR: &str = "_";

/// Joins the date, location and interval parts of an output file stem
pub const STEM_SEPARATOR: &str = "__";

/// The only content type the fetcher accepts
pub const HTML_CONTENT_TYPE: &str = "text/html";

pub const DEFAULT_TIMEOUT_SECONDS: f64 = 2.0;
pub const DEFAULT_DELAY_MS: u64 = 2000;
pub const DEFAULT_DATA_ROOT: &str = "__data__";
pub const DEFAULT_BUCKET: &str = "00-hq";
pub const DEFAULT_CONFIG_FILE: &str = "jma_scraper.toml";

// Layout under the data root
pub const CSV_DIR: &str = "jma_csv";
pub const DB_DIR: &str = "jma_db";
pub const DB_FILE: &str = "jma_app.db";
pub const LOG_DIR: &str = "logs";

// Query parameter keys of the address
pub const PARAM_REGION: &str = "prec_no";
pub const PARAM_STATION: &str = "block_no";
pub const PARAM_YEAR: &str = "year";
pub const PARAM_MONTH: &str = "month";
pub const PARAM_DAY: &str = "day";
