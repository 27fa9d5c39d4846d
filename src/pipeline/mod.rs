//! The analyze pipeline: load → aggregate → chart → report.

pub mod aggregate;
pub mod chart;
pub mod loader;
pub mod report;

use crate::domain::DepartmentStat;
use crate::error::Result;
use crate::observability::metrics as obs;
use chart::{ChartConfig, ChartRenderer};
use report::SummaryReport;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

/// The three outputs of one pipeline run.
#[derive(Debug)]
pub struct Analysis {
    pub aggregate: Vec<DepartmentStat>,
    pub chart_png: Vec<u8>,
    pub summary: SummaryReport,
}

/// Boundary consumed by the CLI and the demo server.
///
/// Holds the chart renderer so backend configuration happens once, at
/// construction. The pipeline itself is synchronous and self-contained per
/// call; nothing is shared between invocations.
pub struct Analyzer {
    renderer: ChartRenderer,
}

impl Analyzer {
    pub fn new(chart_config: ChartConfig) -> Self {
        Self { renderer: ChartRenderer::new(chart_config) }
    }

    /// Runs the full pipeline on a CSV stream. All-or-nothing: either every
    /// output is produced or the error propagates and nothing partial
    /// escapes.
    #[instrument(skip(self, input))]
    pub fn analyze<R: Read>(&self, input: R) -> Result<Analysis> {
        let started = Instant::now();
        obs::record_analyze_run();

        let result = self.run(input);

        obs::record_analyze_duration(started.elapsed().as_secs_f64());
        if result.is_err() {
            obs::record_analyze_error();
        }
        result
    }

    pub fn analyze_path(&self, path: &Path) -> Result<Analysis> {
        self.analyze(std::fs::File::open(path)?)
    }

    fn run<R: Read>(&self, input: R) -> Result<Analysis> {
        let visits = loader::load_visits(input)?;
        let aggregate = aggregate::department_counts(&visits.records);
        let chart_png = self.renderer.render(&aggregate)?;
        let summary = SummaryReport::build(&visits, &aggregate);

        info!(
            total_visits = summary.total_visits,
            total_patients = summary.total_patients,
            departments = summary.unique_departments,
            "analysis complete"
        );
        Ok(Analysis { aggregate, chart_png, summary })
    }
}
