//! Session reports: a canonical summary of every run in a session, and its
//! on-disk form.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   report.json          canonical JSON of SessionReportV1
//!   report_digest.txt    "sha256:<hex>" over report.json, SessionReport domain
//! ```
//!
//! Reading is fail-closed: a missing file, an undeclared file, a
//! non-canonical `report.json` or a digest mismatch is an error. The
//! directory path is never part of the digest.

use std::collections::BTreeSet;
use std::path::Path;

use dstar_kernel::proof::canon::{canonical_json_bytes, CanonError};
use dstar_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use dstar_search::policy::PlannerPolicyV1;
use dstar_search::trace::termination_to_json;

use crate::session::{ReplanSession, RouteV1, RunRecordV1};

pub const REPORT_SCHEMA_VERSION: &str = "session_report.v1";

const REPORT_FILENAME: &str = "report.json";
const DIGEST_FILENAME: &str = "report_digest.txt";

/// Canonical summary of a replanning session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReportV1 {
    pub world_id: String,
    pub policy: PlannerPolicyV1,
    pub runs: Vec<RunRecordV1>,
}

impl SessionReportV1 {
    #[must_use]
    pub fn from_session(session: &ReplanSession) -> Self {
        Self {
            world_id: session.world_id().to_string(),
            policy: session.policy().clone(),
            runs: session.runs().to_vec(),
        }
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::SessionReport, &bytes))
    }

    fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "policy": policy_to_json(&self.policy),
            "runs": self.runs.iter().map(run_to_json).collect::<Vec<_>>(),
            "schema_version": REPORT_SCHEMA_VERSION,
            "world_id": self.world_id,
        })
    }
}

fn policy_to_json(p: &PlannerPolicyV1) -> serde_json::Value {
    serde_json::json!({
        "bound_sentinel_bits": p.bound_sentinel.to_bits(),
        "max_expansions": p.max_expansions,
        "max_neighbors": p.max_neighbors,
        "on_budget_exhausted": p.on_budget_exhausted.as_str(),
    })
}

fn run_to_json(r: &RunRecordV1) -> serde_json::Value {
    serde_json::json!({
        "expansions": r.expansions,
        "kind": r.kind.as_str(),
        "route": route_to_json(&r.route),
        "seeds": r.seeds,
        "termination": termination_to_json(&r.termination),
        "trace_digest": r.trace_digest.as_str(),
    })
}

fn route_to_json(route: &RouteV1) -> serde_json::Value {
    let cells: Vec<serde_json::Value> = route
        .cells()
        .iter()
        .map(|c| serde_json::json!([c.x, c.y]))
        .collect();
    serde_json::json!({
        "cells": cells,
        "cost_bits": route.cost().map(f64::to_bits),
        "kind": route.as_str(),
    })
}

/// Error writing a report directory.
#[derive(Debug)]
pub enum ReportDirWriteError {
    Io { detail: String },
    CanonFailed { detail: String },
}

impl std::fmt::Display for ReportDirWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
        }
    }
}

impl std::error::Error for ReportDirWriteError {}

/// Error reading or verifying a report directory.
#[derive(Debug)]
pub enum ReportDirReadError {
    Io { detail: String },
    MissingFile { filename: String },
    /// A file other than the two report files is present.
    ExtraFile { name: String },
    ParseFailed { detail: String },
    VersionMismatch { found: String },
    /// `report.json` parses but is not in canonical form.
    NonCanonical,
    DigestMismatch { stored: String, recomputed: String },
    CanonFailed { detail: String },
}

impl std::fmt::Display for ReportDirReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MissingFile { filename } => write!(f, "missing report file: {filename}"),
            Self::ExtraFile { name } => write!(f, "unexpected file in report dir: {name}"),
            Self::ParseFailed { detail } => write!(f, "report parse error: {detail}"),
            Self::VersionMismatch { found } => write!(f, "report version mismatch: {found}"),
            Self::NonCanonical => f.write_str("report.json is not canonical JSON"),
            Self::DigestMismatch { stored, recomputed } => {
                write!(f, "digest mismatch: stored={stored}, recomputed={recomputed}")
            }
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
        }
    }
}

impl std::error::Error for ReportDirReadError {}

/// A report read back from disk with its digest checked.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedReportV1 {
    pub value: serde_json::Value,
    pub digest: ContentHash,
}

/// Write `report` to `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`ReportDirWriteError`] on I/O failure or canonical JSON error.
pub fn write_report_dir(
    report: &SessionReportV1,
    dir: &Path,
) -> Result<ContentHash, ReportDirWriteError> {
    let bytes = report
        .to_canonical_json_bytes()
        .map_err(|e| ReportDirWriteError::CanonFailed {
            detail: e.to_string(),
        })?;
    let digest = canonical_hash(HashDomain::SessionReport, &bytes);

    std::fs::create_dir_all(dir).map_err(|e| ReportDirWriteError::Io {
        detail: format!("create_dir_all: {e}"),
    })?;
    write_atomic(&dir.join(REPORT_FILENAME), &bytes)?;
    write_atomic(&dir.join(DIGEST_FILENAME), digest.as_str().as_bytes())?;

    tracing::debug!(
        dir = %dir.display(),
        digest = %digest,
        runs = report.runs.len(),
        "report written"
    );
    Ok(digest)
}

/// Read a report directory and check it end to end.
///
/// # Errors
///
/// Returns [`ReportDirReadError`] on any validation failure.
pub fn read_report_dir(dir: &Path) -> Result<VerifiedReportV1, ReportDirReadError> {
    let bytes = read_required(dir, REPORT_FILENAME)?;
    let stored = read_required(dir, DIGEST_FILENAME)?;

    for name in list_files(dir)? {
        if name != REPORT_FILENAME && name != DIGEST_FILENAME {
            return Err(ReportDirReadError::ExtraFile { name });
        }
    }

    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| ReportDirReadError::ParseFailed {
            detail: e.to_string(),
        })?;
    let version = value["schema_version"].as_str().unwrap_or("");
    if version != REPORT_SCHEMA_VERSION {
        return Err(ReportDirReadError::VersionMismatch {
            found: version.to_string(),
        });
    }
    let recanonical = canonical_json_bytes(&value).map_err(|e| ReportDirReadError::CanonFailed {
        detail: e.to_string(),
    })?;
    if recanonical != bytes {
        return Err(ReportDirReadError::NonCanonical);
    }

    let digest = canonical_hash(HashDomain::SessionReport, &bytes);
    let stored = String::from_utf8_lossy(&stored).trim().to_string();
    if digest.as_str() != stored {
        return Err(ReportDirReadError::DigestMismatch {
            stored,
            recomputed: digest.as_str().to_string(),
        });
    }
    Ok(VerifiedReportV1 { value, digest })
}

/// Write via temp file + rename in the same directory.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ReportDirWriteError> {
    let dir = path.parent().ok_or_else(|| ReportDirWriteError::Io {
        detail: "no parent directory".into(),
    })?;
    let temp_name = format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = dir.join(temp_name);

    std::fs::write(&temp_path, content).map_err(|e| ReportDirWriteError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| ReportDirWriteError::Io {
        detail: format!("rename {} to {}: {e}", temp_path.display(), path.display()),
    })
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, ReportDirReadError> {
    std::fs::read(dir.join(filename)).map_err(|_| ReportDirReadError::MissingFile {
        filename: filename.to_string(),
    })
}

fn list_files(dir: &Path) -> Result<BTreeSet<String>, ReportDirReadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReportDirReadError::Io {
        detail: format!("read_dir: {e}"),
    })?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReportDirReadError::Io {
            detail: format!("read_dir entry: {e}"),
        })?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
