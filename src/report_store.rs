use std::fs::{create_dir_all, read_dir, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{TrajSafeError, TrajSafeResult};
use crate::report::{Report, ReportSummary};

const REPORT_PREFIX: &str = "report_traj_";
const SUMMARY_FILE: &str = "summary.json";

/// A report file that exists but could not be read or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableReport {
    pub path: PathBuf,
    pub error: String,
}

/// Everything found under a report directory, decodable or not.
#[derive(Debug, Default)]
pub struct ReportCorpus {
    pub reports: Vec<Report>,
    pub unreadable: Vec<UnreadableReport>,
}

impl ReportCorpus {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty() && self.unreadable.is_empty()
    }
}

/// Directory of persisted reports: one file per trajectory plus `summary.json`.
#[derive(Debug, Clone)]
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn report_path(&self, traj_id: i64) -> PathBuf {
        self.root.join(format!("{REPORT_PREFIX}{traj_id}.json"))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub fn ensure_dir(&self) -> TrajSafeResult<()> {
        create_dir_all(&self.root).map_err(|e| {
            TrajSafeError::io(format!("creating output dir {}", self.root.display()), e)
        })
    }

    pub fn save_report(&self, report: &Report) -> TrajSafeResult<PathBuf> {
        let path = self.report_path(report.traj_id);
        write_json(&path, report)?;
        debug!(path = %path.display(), "report written");
        Ok(path)
    }

    pub fn save_summary(&self, summary: &ReportSummary) -> TrajSafeResult<PathBuf> {
        let path = self.summary_path();
        write_json(&path, summary)?;
        Ok(path)
    }

    /// Every `report_traj_*.json` under the root, ordered by `traj_id`.
    /// Fails on the first file that cannot be decoded.
    pub fn load_reports(&self) -> TrajSafeResult<Vec<Report>> {
        let mut reports = self
            .report_files()?
            .iter()
            .map(|path| read_report(path))
            .collect::<TrajSafeResult<Vec<_>>>()?;
        reports.sort_by_key(|r| r.traj_id);
        Ok(reports)
    }

    /// Like [`ReportStore::load_reports`], but a bad file is recorded and
    /// skipped. Only an unreadable directory is an error.
    pub fn load_corpus(&self) -> TrajSafeResult<ReportCorpus> {
        let mut corpus = ReportCorpus::default();
        for path in self.report_files()? {
            match read_report(&path) {
                Ok(report) => corpus.reports.push(report),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "report skipped");
                    let error = match std::error::Error::source(&err) {
                        Some(cause) => format!("{err}: {cause}"),
                        None => err.to_string(),
                    };
                    corpus.unreadable.push(UnreadableReport { path, error });
                }
            }
        }

        corpus.reports.sort_by_key(|r| r.traj_id);
        Ok(corpus)
    }

    fn report_files(&self) -> TrajSafeResult<Vec<PathBuf>> {
        let entries = read_dir(&self.root).map_err(|e| {
            TrajSafeError::io(format!("reading report dir {}", self.root.display()), e)
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if is_report_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn read_report(path: &Path) -> TrajSafeResult<Report> {
    let file =
        File::open(path).map_err(|e| TrajSafeError::io(format!("opening {}", path.display()), e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| TrajSafeError::serialization(format!("decoding {}", path.display()), e))
}

fn is_report_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file() && name.starts_with(REPORT_PREFIX) && name.ends_with(".json")
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> TrajSafeResult<()> {
    let file = File::create(path)
        .map_err(|e| TrajSafeError::io(format!("creating {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| TrajSafeError::serialization(format!("writing {}", path.display()), e))?;
    writer
        .flush()
        .map_err(|e| TrajSafeError::io(format!("flushing {}", path.display()), e))
}
