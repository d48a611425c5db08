//! Text exports: alpha-vector files, metrics CSV and a run summary.
//!
//! The alpha file is the format classic POMDP tools exchange value
//! functions in: for every vector, a line with its action, a line with its
//! values, then a blank line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array1;

use crate::alpha::AlphaVector;
use crate::error::{Result, SolverError};
use crate::metrics::SolverMetrics;
use crate::solver::SolveReport;
use crate::vector_set::VectorSet;

/// Write `set` as an alpha file with `precision` decimals.
pub fn write_alpha_file<P: AsRef<Path>>(set: &VectorSet, path: P, precision: usize) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for v in set.iter() {
        writeln!(file, "{}", v.action)?;
        let values: Vec<String> = v.values.iter().map(|x| format!("{:.*}", precision, x)).collect();
        writeln!(file, "{}", values.join(" "))?;
        writeln!(file)?;
    }
    file.flush()?;
    Ok(())
}

/// Read an alpha file of `states`-dimensional vectors.
pub fn read_alpha_file<P: AsRef<Path>>(path: P, states: usize) -> Result<VectorSet> {
    let file = File::open(path)?;
    parse_alpha_file(BufReader::new(file), states)
}

pub fn parse_alpha_file<R: BufRead>(reader: R, states: usize) -> Result<VectorSet> {
    let mut set = VectorSet::new();
    let mut action: Option<(usize, usize)> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match action.take() {
            None => {
                let a = trimmed.parse::<usize>().map_err(|_| SolverError::Parse {
                    line: line_no,
                    reason: format!("expected an action index, found '{}'", trimmed),
                })?;
                action = Some((a, line_no));
            }
            Some((a, _)) => {
                let values = trimmed
                    .split_whitespace()
                    .map(|t| {
                        t.parse::<f64>().map_err(|_| SolverError::Parse {
                            line: line_no,
                            reason: format!("'{}' is not a number", t),
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                if values.len() != states {
                    return Err(SolverError::Parse {
                        line: line_no,
                        reason: format!("expected {} values, found {}", states, values.len()),
                    });
                }
                set.push(AlphaVector::new(a, Array1::from(values)));
            }
        }
    }

    if let Some((_, line)) = action {
        return Err(SolverError::Parse {
            line,
            reason: "action without a values line".to_string(),
        });
    }
    Ok(set)
}

/// Export per-epoch metrics to CSV
pub fn export_metrics_csv<P: AsRef<Path>>(metrics: &SolverMetrics, path: P) -> Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "epoch,vectors,per_action,lp_calls,elapsed_ms,residual,min_value,max_value")?;
    for e in &metrics.epochs {
        let per_action: Vec<String> = e.per_action.iter().map(|n| n.to_string()).collect();
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            e.epoch,
            e.vectors,
            per_action.join(";"),
            e.lp_calls,
            e.elapsed_ms,
            e.residual.unwrap_or(f64::NAN),
            e.min_value.unwrap_or(f64::NAN),
            e.max_value.unwrap_or(f64::NAN),
        )?;
    }

    Ok(())
}

/// Markdown summary of a finished run
pub fn export_solve_report<P: AsRef<Path>>(report: &SolveReport, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    let metrics = &report.metrics;

    writeln!(file, "# Solve Report")?;
    writeln!(file)?;
    writeln!(file, "- Termination: {}", report.termination)?;
    writeln!(file, "- Epochs: {}", report.epochs)?;
    writeln!(file, "- Final vectors: {}", report.value_function.vectors().len())?;
    writeln!(file, "- Peak vectors: {}", metrics.peak_vectors())?;
    writeln!(file, "- LP calls: {}", metrics.total_lp_calls())?;
    writeln!(file, "- Time: {} ms", metrics.total_elapsed_ms())?;
    writeln!(file)?;

    writeln!(file, "| epoch | vectors | residual | min | max |")?;
    writeln!(file, "|-------|---------|----------|-----|-----|")?;
    for e in &metrics.epochs {
        writeln!(
            file,
            "| {} | {} | {} | {} | {} |",
            e.epoch,
            e.vectors,
            fmt_opt(e.residual),
            fmt_opt(e.min_value),
            fmt_opt(e.max_value),
        )?;
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.6}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Tolerance;
    use ndarray::array;

    #[test]
    fn test_alpha_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.alpha");
        let set: VectorSet = vec![
            AlphaVector::new(2, array![1.5, -0.25]),
            AlphaVector::new(0, array![0.0, 3.0]),
        ]
        .into_iter()
        .collect();

        write_alpha_file(&set, &path, 12).unwrap();
        let read = read_alpha_file(&path, 2).unwrap();
        assert!(read.approx_eq_set(&set, &Tolerance::default()));
        assert_eq!(read.get(0).unwrap().action, 2);
    }

    #[test]
    fn test_alpha_file_errors() {
        let truncated = "1\n0.5 0.5\n\n3\n";
        match parse_alpha_file(truncated.as_bytes(), 2) {
            Err(SolverError::Parse { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected {:?}", other),
        }

        let short = "1\n0.5\n";
        assert!(parse_alpha_file(short.as_bytes(), 2).is_err());
    }
}
