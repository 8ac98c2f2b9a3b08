use rgeometry::data::Point;

use crate::registry::ShapeCandidate;
use crate::shape::{Classification, Membership, Shape};

/// Per-candidate labels for every sample point.
#[derive(Clone, Debug, Default)]
pub struct ClassificationRecord {
    names: Vec<&'static str>,
    // labels[candidate][point]
    labels: Vec<Vec<Classification>>,
    points: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub inside: usize,
    pub boundary: usize,
    pub outside: usize,
}

/// Applies every candidate to every point.
pub fn classify(candidates: &[ShapeCandidate], shape: &Shape, points: &[Point<f64>]) -> ClassificationRecord {
    let labels = candidates
        .iter()
        .map(|c| points.iter().map(|p| c.classify(shape, p)).collect())
        .collect();

    ClassificationRecord {
        names: candidates.iter().map(|c| c.name).collect(),
        labels,
        points: points.len(),
    }
}

impl ClassificationRecord {
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn point_count(&self) -> usize {
        self.points
    }

    pub fn labels(&self, name: &str) -> Option<&[Classification]> {
        let i = self.names.iter().position(|n| *n == name)?;
        Some(&self.labels[i])
    }

    pub fn get(&self, name: &str, index: usize) -> Option<Classification> {
        self.labels(name)?.get(index).copied()
    }

    /// `(candidate name, point index, classification)` for every pair.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, usize, Classification)> + '_ {
        self.names
            .iter()
            .zip(&self.labels)
            .flat_map(|(name, ls)| ls.iter().enumerate().map(move |(i, c)| (*name, i, *c)))
    }

    /// Whether all candidates give the same label to point `index`;
    /// `None` past the end of the sample.
    pub fn agrees_at(&self, index: usize, mode: Membership) -> Option<bool> {
        if index >= self.points {
            return None;
        }
        let mut it = self.labels.iter().filter_map(|ls| ls.get(index).copied());
        Some(match it.next() {
            Some(first) => it.all(|c| mode.same(first, c)),
            None => true,
        })
    }

    /// Indices of points on which at least two candidates disagree.
    pub fn disagreements(&self, mode: Membership) -> Vec<usize> {
        (0..self.points)
            .filter(|&i| self.agrees_at(i, mode) == Some(false))
            .collect()
    }

    pub fn agrees(&self, mode: Membership) -> bool {
        (0..self.points).all(|i| self.agrees_at(i, mode) != Some(false))
    }

    pub fn summary(&self) -> Vec<(&'static str, LabelCounts)> {
        self.names
            .iter()
            .zip(&self.labels)
            .map(|(name, ls)| {
                let mut counts = LabelCounts::default();
                for c in ls {
                    match c {
                        Classification::Inside => counts.inside += 1,
                        Classification::Boundary => counts.boundary += 1,
                        Classification::Outside => counts.outside += 1,
                    }
                }
                (*name, counts)
            })
            .collect()
    }
}
