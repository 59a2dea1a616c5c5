use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use members::{config::parse_offsets, info_time, run, Config, Error, Pagination, Result, Variant};

#[derive(Parser)]
#[command(name = "members")]
#[command(about = "Fetches congressional members from api.congress.gov and saves JSON and CSV snapshots")]
#[command(version)]
struct Cli {
    /// api.congress.gov key
    #[arg(long, env = "CONGRESS_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "CONGRESS_API_BASE_URL", default_value = "https://api.congress.gov/v3/member")]
    base_url: String,

    /// Directory the snapshots are written to
    #[arg(long, env = "MEMBERS_OUTPUT_DIR", default_value = "data")]
    output_dir: PathBuf,

    #[arg(long, default_value = "congressional_members")]
    prefix: String,

    /// Members per request
    #[arg(long, default_value_t = 250)]
    limit: usize,

    /// Pause after every request, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Save first/last name, state, district, party and chamber instead of the raw records
    #[arg(long)]
    normalize: bool,

    /// Request exactly these offsets (comma-separated, e.g. 0,250,500) instead of paging until done
    #[arg(long, conflicts_with = "max_pages")]
    offsets: Option<String>,

    /// Upper bound on requests when paging until done
    #[arg(long, default_value_t = 40)]
    max_pages: usize,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let pagination = match self.offsets {
            Some(list) => Pagination::Fixed(parse_offsets(&list)?),
            None => Pagination::UntilExhausted {
                max_pages: self.max_pages,
            },
        };
        Ok(Config {
            base_url: self.base_url,
            page_limit: self.limit,
            request_delay: Duration::from_millis(self.delay_ms),
            output_dir: self.output_dir,
            file_prefix: self.prefix,
            variant: if self.normalize {
                Variant::Normalized
            } else {
                Variant::Raw
            },
            pagination,
            ..Config::new(self.api_key)
        })
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let start_time = Local::now();
    let config = Cli::parse().into_config()?;

    let summary = match run(&config).await {
        Ok(summary) => summary,
        Err(Error::NoMembers) => {
            info_time!("No members data fetched. Exiting.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e),
    };

    if !summary.is_complete() {
        for page in summary.incomplete_pages() {
            info_time!("WARNING: page at offset {} returned no members: {:?}", page.offset, page.status);
        }
    }
    info_time!("Files saved:");
    for path in summary.files.all() {
        info_time!("  - {}", path.display());
    }
    info_time!(start_time, "Full program time:");

    Ok(ExitCode::SUCCESS)
}
