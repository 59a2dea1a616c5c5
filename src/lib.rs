//! Congressional members snapshot.
//! Pages through the api.congress.gov member list and saves the result as JSON and CSV,
//! once under a timestamped name and once as the `latest` copy.

mod error;
mod macros;

pub mod config;
pub mod normalize;
pub mod process;
pub mod request;
pub mod write;

pub use config::{Config, Pagination, Variant};
pub use error::{Error, Result};
pub use normalize::NormalizedMember;
pub use process::{run, RunSummary};
pub use request::{PageReport, PageStatus};
pub use write::{MemberSet, SnapshotPaths};

/// A member record exactly as the API returned it.
pub type RawMember = serde_json::Map<String, serde_json::Value>;

const DEFAULT_BASE_URL: &str = "https://api.congress.gov/v3/member";
const PAGE_LIMIT: usize = 250;
const REQUEST_DELAY_MS: u64 = 500;
const OUTPUT_DIR: &str = "data";
const FILE_PREFIX: &str = "congressional_members";
/// Upper bound on requests when paging until the data runs out.
const DEFAULT_MAX_PAGES: usize = 40;
