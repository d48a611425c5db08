//! Plain-text belief list persistence.
//!
//! One belief per line, `states` whitespace-separated values. Values are
//! read as a token stream, so a belief may wrap across lines, but a file
//! that ends part-way through a belief is rejected.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::{Belief, BeliefList};
use crate::error::{Result, SolverError};

/// Decimal places written per value unless the caller asks otherwise.
pub const DEFAULT_PRECISION: usize = 25;

/// Write `list` to `path`, one belief per line at `precision` decimals.
pub fn write_belief_list<P: AsRef<Path>>(list: &BeliefList, path: P, precision: usize) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for belief in list.iter() {
        let line: Vec<String> = belief
            .as_array()
            .iter()
            .map(|p| format!("{:.*}", precision, p))
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a belief list of `states`-dimensional beliefs from `path`.
pub fn read_belief_list<P: AsRef<Path>>(path: P, states: usize) -> Result<BeliefList> {
    if states == 0 {
        return Err(SolverError::invalid_config(
            "states".to_string(),
            "belief dimension must be positive".to_string(),
        ));
    }
    let file = File::open(path)?;
    parse_belief_list(BufReader::new(file), states)
}

/// Parse beliefs from any buffered reader.
pub fn parse_belief_list<R: BufRead>(reader: R, states: usize) -> Result<BeliefList> {
    let mut list = BeliefList::new();
    let mut pending: Vec<f64> = Vec::with_capacity(states);
    let mut pending_start = 0;
    let mut last_line = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = line?;
        for token in line.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| SolverError::Parse {
                line: line_no,
                reason: format!("'{}' is not a number", token),
            })?;
            if pending.is_empty() {
                pending_start = line_no;
            }
            pending.push(value);
            if pending.len() == states {
                list.append(&Belief::from_vec(std::mem::take(&mut pending)));
                pending.reserve(states);
            }
        }
    }

    if !pending.is_empty() {
        return Err(SolverError::Parse {
            line: last_line,
            reason: format!(
                "truncated belief starting on line {}: {} of {} values",
                pending_start,
                pending.len(),
                states
            ),
        });
    }

    Ok(list)
}
