use chrono::Local;
use reqwest::Client;

use crate::normalize::normalize_members;
use crate::request::{request_page, PageReport, PageStatus};
use crate::write::{write_snapshot, MemberSet, SnapshotPaths};
use crate::{info_time, Config, Error, Pagination, RawMember, Result, Variant};

/// Every member fetched, in request order, plus how each page went.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub members: Vec<RawMember>,
    pub pages: Vec<PageReport>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages: Vec<PageReport>,
    pub total_members: usize,
    pub files: SnapshotPaths,
}

impl RunSummary {
    /// `true` when every requested page came back with members.
    pub fn is_complete(&self) -> bool {
        self.pages.iter().all(PageReport::is_fetched)
    }

    pub fn incomplete_pages(&self) -> impl Iterator<Item = &PageReport> {
        self.pages.iter().filter(|page| !page.is_fetched())
    }
}

/// Fetches, optionally normalizes and writes one snapshot.
/// Returns `Error::NoMembers` without touching the output directory's files when nothing came back.
pub async fn run(config: &Config) -> Result<RunSummary> {
    config.validate()?;
    let start_time = Local::now();
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let client = Client::new();
    let report = fetch_all_members(&client, config).await;
    if report.members.is_empty() {
        return Err(Error::NoMembers);
    }

    let total_members = report.members.len();
    let members = match config.variant {
        Variant::Raw => MemberSet::Raw(report.members),
        Variant::Normalized => MemberSet::Normalized(normalize_members(&report.members)),
    };

    let files = SnapshotPaths::new(
        &config.output_dir,
        &config.file_prefix,
        Local::now().naive_local(),
    );
    write_snapshot(&members, &files).await?;
    info_time!(start_time, "Data fetch completed: {} members.", total_members);

    Ok(RunSummary {
        pages: report.pages,
        total_members,
        files,
    })
}

/// Requests pages according to `config.pagination`, waiting `config.request_delay`
/// after every request whatever its outcome.
pub async fn fetch_all_members(client: &Client, config: &Config) -> FetchReport {
    info_time!("Starting to fetch congressional members data...");
    let start_time = Local::now();

    let mut report = FetchReport::default();
    match &config.pagination {
        Pagination::Fixed(offsets) => {
            for &offset in offsets {
                fetch_into(&mut report, client, config, offset).await;
            }
        }
        Pagination::UntilExhausted { max_pages } => {
            let mut offset = 0;
            let mut upstream_total = None;
            for _ in 0..*max_pages {
                let (status, total) = fetch_into(&mut report, client, config, offset).await;
                upstream_total = total.or(upstream_total);
                if !has_more(&status, offset, config.page_limit, upstream_total) {
                    break;
                }
                offset += config.page_limit;
            }
        }
    }

    info_time!(start_time, "Total members fetched: {}", report.members.len());
    report
}

async fn fetch_into(
    report: &mut FetchReport,
    client: &Client,
    config: &Config,
    offset: usize,
) -> (PageStatus, Option<usize>) {
    let page = request_page(client, config, offset).await;
    report.members.extend(page.members);
    if let PageStatus::Fetched(count) = page.report.status {
        info_time!(
            "Fetched {} members from offset {} (total: {})",
            count,
            offset,
            report.members.len()
        );
    }
    let status = page.report.status.clone();
    report.pages.push(page.report);

    // Rate limiting, applied after failures too.
    if !config.request_delay.is_zero() {
        tokio::time::sleep(config.request_delay).await;
    }
    (status, page.total)
}

/// Whether a page at `offset + limit` may hold more members.
fn has_more(status: &PageStatus, offset: usize, limit: usize, total: Option<usize>) -> bool {
    let next = offset + limit;
    if let Some(total) = total {
        if next >= total {
            return false;
        }
    }
    match status {
        PageStatus::Fetched(count) => *count >= limit,
        PageStatus::NoData | PageStatus::Empty => false,
        // Without an upstream total there is no telling what a failed page held.
        PageStatus::Failed(_) => total.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_without_total_asks_for_more() {
        assert!(has_more(&PageStatus::Fetched(250), 0, 250, None));
        assert!(!has_more(&PageStatus::Fetched(32), 500, 250, None));
    }

    #[test]
    fn total_stops_paging() {
        assert!(has_more(&PageStatus::Fetched(250), 250, 250, Some(532)));
        assert!(!has_more(&PageStatus::Fetched(250), 250, 250, Some(500)));
    }

    #[test]
    fn empty_pages_stop_paging() {
        assert!(!has_more(&PageStatus::Empty, 0, 250, Some(532)));
        assert!(!has_more(&PageStatus::NoData, 0, 250, None));
    }

    #[test]
    fn failed_page_continues_only_with_known_total() {
        let failed = PageStatus::Failed("503".into());
        assert!(has_more(&failed, 0, 250, Some(532)));
        assert!(!has_more(&failed, 0, 250, None));
        assert!(!has_more(&failed, 500, 250, Some(532)));
    }

    #[test]
    fn summary_flags_missing_pages() {
        let summary = RunSummary {
            pages: vec![
                PageReport {
                    offset: 0,
                    status: PageStatus::Fetched(250),
                },
                PageReport {
                    offset: 250,
                    status: PageStatus::Failed("timed out".into()),
                },
            ],
            total_members: 250,
            files: SnapshotPaths::new(
                std::path::Path::new("data"),
                "members",
                Local::now().naive_local(),
            ),
        };
        assert!(!summary.is_complete());
        assert_eq!(summary.incomplete_pages().map(|p| p.offset).collect::<Vec<_>>(), vec![250]);
    }
}
