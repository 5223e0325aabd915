//! Tab-separated reports of payoff progress.

use crate::Result;
use crate::experiment::ComparisonReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// File name of the averages report for an experiment of `tests_count` trials.
pub fn default_report_name(tests_count: usize) -> String {
    format!("chsh_{tests_count}_averages.csv")
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

/// Writes the per-round averages of both correlation kinds, rounds numbered from 1.
pub fn write_averages<W: Write>(writer: W, report: &ComparisonReport) -> Result<()> {
    let mut out = tsv_writer(writer);
    out.write_record([
        "Step",
        "Average payoff of Classical automata",
        "Average payoff of Quantum automata",
    ])?;
    for (step, (classical, quantum)) in report.classical.iter().zip(&report.quantum).enumerate() {
        out.write_record([
            (step + 1).to_string(),
            classical.to_string(),
            quantum.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the progress of a single play, rounds numbered from 1.
pub fn write_progress<W: Write>(writer: W, progress: &[f64]) -> Result<()> {
    let mut out = tsv_writer(writer);
    out.write_record(["Step", "Mean payoff"])?;
    for (step, mean) in progress.iter().enumerate() {
        out.write_record([(step + 1).to_string(), mean.to_string()])?;
    }
    out.flush()?;
    Ok(())
}

/// Creates (or truncates) `path` and writes the averages report to it.
pub fn save_averages(path: &Path, report: &ComparisonReport) -> Result<()> {
    write_averages(File::create(path)?, report)?;
    tracing::info!(path = %path.display(), steps = report.steps(), "Saved averages report");
    Ok(())
}

/// Creates (or truncates) `path` and writes the progress of one play to it.
pub fn save_progress(path: &Path, progress: &[f64]) -> Result<()> {
    write_progress(File::create(path)?, progress)?;
    tracing::info!(path = %path.display(), steps = progress.len(), "Saved progress report");
    Ok(())
}
