use std::fmt::Write;

use serde::Serialize;

use crate::session::{CandidateOutcome, CandidateResult, Ranking};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Completed,
    Failed,
    Skipped,
}

/// One candidate line of a rendered report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub status: RowStatus,
    pub total_ms: Option<i64>,
    pub average_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub fastest: bool,
    pub slowest: bool,
}

impl ReportRow {
    pub fn from_results(results: &[CandidateResult], ranking: Option<Ranking>) -> Vec<Self> {
        results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let (status, total_ms, average_ms, reason) = match &r.outcome {
                    CandidateOutcome::Completed(t) => (RowStatus::Completed, t.total_ms, t.average_ms, None),
                    CandidateOutcome::Failed { reason } => (RowStatus::Failed, None, None, Some(reason.clone())),
                    CandidateOutcome::Skipped => (RowStatus::Skipped, None, None, None),
                };
                Self {
                    name: r.name.clone(),
                    status,
                    total_ms,
                    average_ms,
                    reason,
                    fastest: ranking.map_or(false, |k| k.fastest == i),
                    slowest: ranking.map_or(false, |k| k.slowest == i),
                }
            })
            .collect()
    }

    fn mark(&self) -> &'static str {
        match (self.fastest, self.slowest) {
            (true, true) => "fastest,slowest",
            (true, false) => "fastest",
            (false, true) => "slowest",
            _ => "",
        }
    }
}

pub fn render_table(rows: &[ReportRow]) -> String {
    let name_w = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_w$}  {:>10}  {:>14}  {}",
        "name", "total ms", "average ms", "note"
    );
    for r in rows {
        let total = r.total_ms.map_or_else(|| "-".to_string(), |t| t.to_string());
        let avg = r.average_ms.map_or_else(|| "-".to_string(), |a| format!("{a:.6}"));
        let note = match r.status {
            RowStatus::Completed => r.mark().to_string(),
            RowStatus::Failed => format!("FAILED: {}", r.reason.as_deref().unwrap_or("unknown")),
            RowStatus::Skipped => "skipped".to_string(),
        };
        let _ = writeln!(out, "{:<name_w$}  {:>10}  {:>14}  {}", r.name, total, avg, note);
    }
    out
}

pub fn render_json(rows: &[ReportRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TrialResult;

    fn completed(name: &str, total: i64, trials: u64) -> CandidateResult {
        CandidateResult {
            name: name.to_string(),
            outcome: CandidateOutcome::Completed(TrialResult {
                name: name.to_string(),
                trials,
                total_ms: Some(total),
                average_ms: Some(total as f64 / trials as f64),
                elapsed: None,
                last: None,
            }),
        }
    }

    #[test]
    fn rows_carry_ranking_and_failures() {
        let results = vec![
            completed("a", 50, 10),
            CandidateResult {
                name: "b".into(),
                outcome: CandidateOutcome::Failed { reason: "boom".into() },
            },
            completed("c", 90, 10),
        ];
        let rows = ReportRow::from_results(&results, Some(Ranking { fastest: 0, slowest: 2 }));
        assert!(rows[0].fastest && !rows[0].slowest);
        assert_eq!(rows[1].status, RowStatus::Failed);
        assert!(rows[2].slowest);

        let table = render_table(&rows);
        assert!(table.contains("FAILED: boom"));
        assert!(table.contains("5.000000"));
        assert_eq!(table.lines().count(), 4);

        let json = render_json(&rows).unwrap();
        assert!(json.contains("\"status\": \"failed\""));
        assert!(json.contains("\"average_ms\": 9.0"));
    }
}
