use super::{Belief, BeliefList};
use crate::error::{Result, SolverError};

/// Grids larger than this are refused rather than allocated.
const MAX_GRID_POINTS: usize = 1_000_000;

/// Fixed set of belief points used by point-based backups.
#[derive(Debug, Clone)]
pub struct BeliefGrid {
    points: BeliefList,
}

impl BeliefGrid {
    /// Every belief whose components are multiples of `1 / resolution`.
    pub fn regular(states: usize, resolution: usize) -> Result<Self> {
        if states == 0 || resolution == 0 {
            return Err(SolverError::invalid_config(
                "grid_resolution".to_string(),
                format!("need states > 0 and resolution > 0, got {} and {}", states, resolution),
            ));
        }
        let count = composition_count(resolution, states);
        if count > MAX_GRID_POINTS {
            return Err(SolverError::invalid_config(
                "grid_resolution".to_string(),
                format!("{} grid points exceeds the limit of {}", count, MAX_GRID_POINTS),
            ));
        }

        let mut points = BeliefList::with_capacity(count);
        let mut counts = vec![0usize; states];
        enumerate_compositions(resolution, 0, &mut counts, &mut |c: &[usize]| {
            let probs = c.iter().map(|&k| k as f64 / resolution as f64).collect();
            points.append(&Belief::from_vec(probs));
        });
        Ok(BeliefGrid { points })
    }

    pub fn from_list(points: BeliefList) -> Self {
        BeliefGrid { points }
    }

    pub fn points(&self) -> &BeliefList {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Number of ways to write `total` as an ordered sum of `parts` non-negative integers.
fn composition_count(total: usize, parts: usize) -> usize {
    // C(total + parts - 1, parts - 1), saturating
    let k = parts - 1;
    let n = total + k;
    let mut result: usize = 1;
    for i in 0..k {
        result = result.saturating_mul(n - i) / (i + 1);
        if result > MAX_GRID_POINTS {
            return usize::MAX;
        }
    }
    result
}

fn enumerate_compositions<F: FnMut(&[usize])>(
    remaining: usize,
    index: usize,
    counts: &mut [usize],
    emit: &mut F,
) {
    if index == counts.len() - 1 {
        counts[index] = remaining;
        emit(counts);
        return;
    }
    for k in (0..=remaining).rev() {
        counts[index] = k;
        enumerate_compositions(remaining - k, index + 1, counts, emit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_grid_size() {
        let grid = BeliefGrid::regular(3, 4).unwrap();
        assert_eq!(grid.len(), 15);
        for b in grid.points().iter() {
            assert!(b.is_valid(1e-12));
        }
        // corners come first for their leading state
        assert_eq!(grid.points().get(0), Some(&Belief::corner(3, 0)));
    }

    #[test]
    fn test_single_state() {
        let grid = BeliefGrid::regular(1, 5).unwrap();
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_rejects_zero_resolution() {
        assert!(BeliefGrid::regular(3, 0).is_err());
    }
}
