use reqwest::Client;
use serde::Deserialize;

use crate::{info_time, Config, RawMember, Result};

/// Body of one member-list response. Anything else in it is ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageBody {
    pub members: Option<Vec<RawMember>>,
    pub pagination: Option<PageInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageInfo {
    /// Total number of members upstream, across all pages.
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    Fetched(usize),
    /// The body had no `members` key.
    NoData,
    /// `members` was an empty array.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub offset: usize,
    pub status: PageStatus,
}

impl PageReport {
    pub fn is_fetched(&self) -> bool {
        matches!(self.status, PageStatus::Fetched(_))
    }
}

/// Result of asking for a single page: what happened, the members it carried
/// and the upstream total if the body reported one.
#[derive(Debug)]
pub(crate) struct Page {
    pub report: PageReport,
    pub members: Vec<RawMember>,
    pub total: Option<usize>,
}

/// Requests the page at `offset`. Never fails: transport, status and decoding
/// errors are logged and come back as `PageStatus::Failed`.
pub(crate) async fn request_page(client: &Client, config: &Config, offset: usize) -> Page {
    info_time!("Fetching page at offset {}...", offset);

    let body = match request_page_body(client, config, offset).await {
        Ok(body) => body,
        Err(e) => {
            info_time!("Error fetching data at offset {}: {}", offset, e);
            return Page {
                report: PageReport {
                    offset,
                    status: PageStatus::Failed(e.to_string()),
                },
                members: Vec::new(),
                total: None,
            };
        }
    };

    let total = body.pagination.and_then(|p| p.count);
    let (status, members) = match body.members {
        None => {
            info_time!("No data found at offset {}", offset);
            (PageStatus::NoData, Vec::new())
        }
        Some(members) if members.is_empty() => {
            info_time!("No members found at offset {}", offset);
            (PageStatus::Empty, members)
        }
        Some(members) => (PageStatus::Fetched(members.len()), members),
    };

    Page {
        report: PageReport { offset, status },
        members,
        total,
    }
}

/// Errors are stripped of their URL, the query string carries the api key.
async fn request_page_body(client: &Client, config: &Config, offset: usize) -> Result<PageBody> {
    let offset = offset.to_string();
    let limit = config.page_limit.to_string();
    let res = client
        .get(&config.base_url)
        .query(&[
            ("format", "json"),
            ("offset", offset.as_str()),
            ("limit", limit.as_str()),
            ("api_key", config.api_key.as_str()),
        ])
        .send()
        .await
        .map_err(reqwest::Error::without_url)?
        .error_for_status()
        .map_err(reqwest::Error::without_url)?;
    let body = res
        .json::<PageBody>()
        .await
        .map_err(reqwest::Error::without_url)?;
    Ok(body)
}
