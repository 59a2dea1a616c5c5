use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::{info_time, normalize::NormalizedMember, RawMember, Result};

const FILE_TIMESTAMP_FMT: &str = "%Y%m%d_%H%M%S";
const LAST_UPDATED_FMT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// The collection that gets written, in one of the two record shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberSet {
    Raw(Vec<RawMember>),
    Normalized(Vec<NormalizedMember>),
}

impl MemberSet {
    pub fn len(&self) -> usize {
        match self {
            MemberSet::Raw(members) => members.len(),
            MemberSet::Normalized(members) => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty-printed `{last_updated, total_members, members}` envelope.
    pub fn render_json(&self, last_updated: NaiveDateTime) -> Result<Vec<u8>> {
        let last_updated = last_updated.format(LAST_UPDATED_FMT).to_string();
        let bytes = match self {
            MemberSet::Raw(members) => render_envelope(&last_updated, members)?,
            MemberSet::Normalized(members) => render_envelope(&last_updated, members)?,
        };
        Ok(bytes)
    }

    pub fn render_csv(&self) -> Result<Vec<u8>> {
        match self {
            MemberSet::Raw(members) => render_raw_csv(members),
            MemberSet::Normalized(members) => render_normalized_csv(members),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    last_updated: &'a str,
    total_members: usize,
    members: &'a [T],
}

fn render_envelope<T: Serialize>(last_updated: &str, members: &[T]) -> Result<Vec<u8>> {
    let envelope = Envelope {
        last_updated,
        total_members: members.len(),
        members,
    };
    let mut bytes = serde_json::to_vec_pretty(&envelope)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Columns are the sorted union of every key seen, each row padded to all of them.
fn render_raw_csv(members: &[RawMember]) -> Result<Vec<u8>> {
    let columns: BTreeSet<&str> = members
        .iter()
        .flat_map(|member| member.keys().map(String::as_str))
        .collect();

    let mut wtr = csv_writer();
    wtr.write_record(&columns)?;
    for member in members {
        wtr.write_record(columns.iter().map(|column| cell_text(member.get(*column))))?;
    }
    Ok(wtr.into_inner()?)
}

fn render_normalized_csv(members: &[NormalizedMember]) -> Result<Vec<u8>> {
    let mut wtr = csv_writer();
    for member in members {
        wtr.serialize(member)?;
    }
    Ok(wtr.into_inner()?)
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![])
}

/// Nested objects and arrays go in as their JSON text.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// The four files one run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub latest_json: PathBuf,
    pub latest_csv: PathBuf,
}

impl SnapshotPaths {
    pub fn new(dir: &Path, prefix: &str, taken_at: NaiveDateTime) -> Self {
        let stamp = taken_at.format(FILE_TIMESTAMP_FMT);
        SnapshotPaths {
            json: dir.join(format!("{prefix}_{stamp}.json")),
            csv: dir.join(format!("{prefix}_{stamp}.csv")),
            latest_json: dir.join(format!("{prefix}_latest.json")),
            latest_csv: dir.join(format!("{prefix}_latest.csv")),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [&self.json, &self.csv, &self.latest_json, &self.latest_csv]
    }
}

pub async fn write_json(members: &MemberSet, path: &Path) -> Result<()> {
    let bytes = members.render_json(Local::now().naive_local())?;
    tokio::fs::write(path, bytes).await?;
    info_time!("Saved JSON data to {}", path.display());
    Ok(())
}

pub async fn write_csv(members: &MemberSet, path: &Path) -> Result<()> {
    if members.is_empty() {
        info_time!("No members data to save as CSV");
        return Ok(());
    }
    let bytes = members.render_csv()?;
    tokio::fs::write(path, bytes).await?;
    info_time!("Saved CSV data to {}", path.display());
    Ok(())
}

/// Writes the timestamped pair first, then overwrites the latest pair.
pub async fn write_snapshot(members: &MemberSet, paths: &SnapshotPaths) -> Result<()> {
    write_json(members, &paths.json).await?;
    write_csv(members, &paths.csv).await?;
    write_json(members, &paths.latest_json).await?;
    write_csv(members, &paths.latest_csv).await?;
    Ok(())
}
