use std::path::PathBuf;
use std::time::Duration;

use crate::{
    Error, Result, DEFAULT_BASE_URL, DEFAULT_MAX_PAGES, FILE_PREFIX, OUTPUT_DIR, PAGE_LIMIT,
    REQUEST_DELAY_MS,
};

/// Which shape of record ends up in the snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Upstream records as returned, CSV columns are the union of all keys.
    #[default]
    Raw,
    /// Six flat fields per member.
    Normalized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    /// Keep requesting the next offset while more data may exist.
    UntilExhausted { max_pages: usize },
    /// One request per listed offset, in order.
    Fixed(Vec<usize>),
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::UntilExhausted {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Everything a run needs. Built by the binary from CLI flags and the environment,
/// or directly in tests to point at a fake endpoint and a temporary directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub page_limit: usize,
    pub request_delay: Duration,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub variant: Variant,
    pub pagination: Pagination,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Config {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: PAGE_LIMIT,
            request_delay: Duration::from_millis(REQUEST_DELAY_MS),
            output_dir: PathBuf::from(OUTPUT_DIR),
            file_prefix: FILE_PREFIX.to_string(),
            variant: Variant::default(),
            pagination: Pagination::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("api key is empty".into()));
        }
        if self.page_limit == 0 {
            return Err(Error::Config("page limit must be greater than 0".into()));
        }
        match &self.pagination {
            Pagination::UntilExhausted { max_pages: 0 } => {
                Err(Error::Config("max pages must be greater than 0".into()))
            }
            Pagination::Fixed(offsets) if offsets.is_empty() => {
                Err(Error::Config("no offsets to request".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Parses a comma separated offset list such as `0,250,500`.
pub fn parse_offsets(list: &str) -> Result<Vec<usize>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| Error::Config(format!("invalid offset: {s}")))
        })
        .collect()
}
