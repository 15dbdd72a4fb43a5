//! Trajectory samples and CSV ingestion.
//!
//! Rows are grouped by `traj_id` before any numeric parsing happens, so a
//! malformed cell only fails the trajectory it belongs to.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{TrajSafeError, TrajSafeResult};

/// Columns every input table must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "traj_id", "t", "x", "y", "theta", "v", "omega", "goal_x", "goal_y",
];

/// One pose/velocity sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub v: f64,
    pub omega: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub gx: f64,
    pub gy: f64,
}

/// Samples ordered by `t` ascending, all heading for the same goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub goal: Goal,
    pub samples: Vec<TrajectorySample>,
}

impl Trajectory {
    /// Build a trajectory, sorting samples by `t`. Rejects an empty sample list.
    pub fn new(goal: Goal, mut samples: Vec<TrajectorySample>) -> TrajSafeResult<Self> {
        if samples.is_empty() {
            return Err(TrajSafeError::data("trajectory has no samples"));
        }
        samples.sort_by(|a, b| a.t.total_cmp(&b.t));
        Ok(Self { goal, samples })
    }
}

/// A raw input row. Numeric cells stay textual until the owning group is parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct TrajectoryRow {
    pub traj_id: i64,
    pub t: String,
    pub x: String,
    pub y: String,
    pub theta: String,
    pub v: String,
    pub omega: String,
    pub goal_x: String,
    pub goal_y: String,
}

/// All rows sharing one `traj_id`, in file order.
#[derive(Debug, Clone)]
pub struct TrajectoryGroup {
    pub traj_id: i64,
    pub rows: Vec<TrajectoryRow>,
}

impl TrajectoryGroup {
    /// Parse the group's rows into a sorted [`Trajectory`].
    ///
    /// The goal is taken from the first row; later rows naming a different
    /// goal are logged and otherwise ignored.
    pub fn to_trajectory(&self) -> TrajSafeResult<Trajectory> {
        let first = self.rows.first().ok_or_else(|| {
            TrajSafeError::data(format!("trajectory {} has no samples", self.traj_id))
        })?;

        let goal = Goal {
            gx: self.parse_cell(0, "goal_x", &first.goal_x)?,
            gy: self.parse_cell(0, "goal_y", &first.goal_y)?,
        };

        let mut samples = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let gx = self.parse_cell(i, "goal_x", &row.goal_x)?;
            let gy = self.parse_cell(i, "goal_y", &row.goal_y)?;
            if gx != goal.gx || gy != goal.gy {
                warn!(
                    traj_id = self.traj_id,
                    row = i,
                    "goal ({gx}, {gy}) differs from first sample goal ({}, {}); using the first",
                    goal.gx,
                    goal.gy
                );
            }

            samples.push(TrajectorySample {
                t: self.parse_cell(i, "t", &row.t)?,
                x: self.parse_cell(i, "x", &row.x)?,
                y: self.parse_cell(i, "y", &row.y)?,
                theta: self.parse_cell(i, "theta", &row.theta)?,
                v: self.parse_cell(i, "v", &row.v)?,
                omega: self.parse_cell(i, "omega", &row.omega)?,
            });
        }

        Trajectory::new(goal, samples)
    }

    fn parse_cell(&self, row: usize, field: &str, raw: &str) -> TrajSafeResult<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TrajSafeError::data(format!(
                "trajectory {} row {row}: missing value for '{field}'",
                self.traj_id
            )));
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(TrajSafeError::data(format!(
                "trajectory {} row {row}: '{field}' is not a finite number: '{trimmed}'",
                self.traj_id
            ))),
        }
    }
}

/// Read a trajectory table and group it by `traj_id`, ascending.
pub fn read_trajectory_groups<R: Read>(reader: R) -> TrajSafeResult<Vec<TrajectoryGroup>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(TrajSafeError::data(format!(
                "missing required column '{column}'"
            )));
        }
    }

    let mut groups: BTreeMap<i64, Vec<TrajectoryRow>> = BTreeMap::new();
    let mut row_count = 0usize;
    for result in rdr.deserialize::<TrajectoryRow>() {
        let row = result?;
        groups.entry(row.traj_id).or_default().push(row);
        row_count += 1;
    }

    debug!(rows = row_count, trajectories = groups.len(), "trajectory table read");

    Ok(groups
        .into_iter()
        .map(|(traj_id, rows)| TrajectoryGroup { traj_id, rows })
        .collect())
}

/// Open `path` and group its rows by `traj_id`.
pub fn load_trajectory_groups(path: &Path) -> TrajSafeResult<Vec<TrajectoryGroup>> {
    let file = File::open(path).map_err(|e| {
        TrajSafeError::io(format!("opening trajectory table {}", path.display()), e)
    })?;
    read_trajectory_groups(file)
}
