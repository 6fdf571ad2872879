use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Listing-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batching: BatchingConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// What to search for in every location
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Category phrase; the query becomes "<category> in <location>"
    pub category: String,

    /// Search endpoint that accepts the local-results parameters
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://www.google.com/search".to_string()
}

/// Browser automation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// W3C WebDriver endpoint (chromedriver, geckodriver, ...)
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Browser name requested from the WebDriver server
    pub browser: String,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Upper bound for every wait-until-present (seconds)
    #[serde(rename = "wait-timeout-secs")]
    pub wait_timeout_secs: u64,

    /// Maximum result pages per location; 0 means unlimited
    #[serde(rename = "max-pages")]
    pub max_pages: u32,
}

impl DriverConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn page_limit(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser: "chrome".to_string(),
            headless: false,
            wait_timeout_secs: 15,
            max_pages: 0,
        }
    }
}

/// Inclusive range for a randomized delay, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    #[serde(rename = "min-ms")]
    pub min_ms: u64,

    #[serde(rename = "max-ms")]
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0)
    }
}

/// Randomized delays inserted between browser actions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// After issuing a search, while results populate
    pub settle: DelayRange,

    /// After opening a listing's detail view
    pub click: DelayRange,

    /// After closing a listing's detail view
    pub dismiss: DelayRange,

    /// After clicking a pagination control
    pub page: DelayRange,

    /// Between two locations
    pub location: DelayRange,
}

impl PacingConfig {
    /// Pacing with every delay set to zero
    ///
    /// Useful when driving a scripted or local page engine where there is no
    /// remote service to be polite to.
    pub fn zero() -> Self {
        Self {
            settle: DelayRange::zero(),
            click: DelayRange::zero(),
            dismiss: DelayRange::zero(),
            page: DelayRange::zero(),
            location: DelayRange::zero(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            settle: DelayRange::new(4_000, 6_000),
            click: DelayRange::new(2_000, 4_000),
            dismiss: DelayRange::new(1_000, 3_000),
            page: DelayRange::new(3_000, 5_000),
            location: DelayRange::new(45_000, 120_000),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one JSON artifact per scraped location
    #[serde(rename = "results-dir")]
    pub results_dir: String,

    /// Artifact file name prefix
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,

    /// Path of the resume checkpoint
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    /// Path of the deduplicated CSV produced by `merge`
    #[serde(rename = "consolidated-path")]
    pub consolidated_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: ".".to_string(),
            file_prefix: "restaurants".to_string(),
            checkpoint_path: "scraper_progress.json".to_string(),
            consolidated_path: "all_restaurants.csv".to_string(),
        }
    }
}

/// Defaults for the `batch` command
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Spread major locations evenly across batches
    pub strategic: bool,

    #[serde(rename = "output-dir")]
    pub output_dir: String,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            strategic: false,
            output_dir: "location_batches".to_string(),
        }
    }
}

/// CSS selectors for the local-results markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "listings-container")]
    pub listings_container: String,
    pub listing: String,
    pub name: String,
    pub website: String,
    #[serde(rename = "phone-data")]
    pub phone_data: String,
    #[serde(rename = "phone-attribute")]
    pub phone_attribute: String,
    #[serde(rename = "phone-link")]
    pub phone_link: String,
    #[serde(rename = "address-primary")]
    pub address_primary: String,
    #[serde(rename = "address-secondary")]
    pub address_secondary: String,
    #[serde(rename = "address-value")]
    pub address_value: String,
    #[serde(rename = "address-labeled")]
    pub address_labeled: String,
    #[serde(rename = "detail-close")]
    pub detail_close: String,
    #[serde(rename = "pagination-link")]
    pub pagination_link: String,
    #[serde(rename = "more-results")]
    pub more_results: String,
}

impl SelectorConfig {
    /// Every selector paired with its config key, for validation
    pub fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("listings-container", &self.listings_container),
            ("listing", &self.listing),
            ("name", &self.name),
            ("website", &self.website),
            ("phone-data", &self.phone_data),
            ("phone-attribute", &self.phone_attribute),
            ("phone-link", &self.phone_link),
            ("address-primary", &self.address_primary),
            ("address-secondary", &self.address_secondary),
            ("address-value", &self.address_value),
            ("address-labeled", &self.address_labeled),
            ("detail-close", &self.detail_close),
            ("pagination-link", &self.pagination_link),
            ("more-results", &self.more_results),
        ]
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listings_container: ".rlfl__tls".to_string(),
            listing: ".rllt__details".to_string(),
            name: "h2.qrShPb".to_string(),
            website: "a.mI8Pwc".to_string(),
            phone_data: "[data-phone-number]".to_string(),
            phone_attribute: "data-phone-number".to_string(),
            phone_link: "a.Od1FEc".to_string(),
            address_primary: "div.zloOqf.PZPZlf".to_string(),
            address_secondary: "[data-dtype='d3ifr']".to_string(),
            address_value: "span.LrzXr".to_string(),
            address_labeled: "div[data-local-attribute='d3adr'] span.LrzXr".to_string(),
            detail_close: "button.VfPpkd-icon-button".to_string(),
            pagination_link: ".NKTSme a".to_string(),
            more_results: "[aria-label*='More results']".to_string(),
        }
    }
}
