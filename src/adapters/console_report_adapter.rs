//! Console summary table implementing ReportPort.

use std::cell::RefCell;
use std::io::Write;

use crate::domain::error::RetireSimError;
use crate::domain::format::render_table;
use crate::domain::simulation::SimulationOutcome;
use crate::ports::report_port::ReportPort;

/// Renders the summary table to a writer (stdout by default). Traces and raw
/// history are not shown on the console.
pub struct ConsoleReportAdapter<W: Write = std::io::Stdout> {
    out: RefCell<W>,
}

impl ConsoleReportAdapter {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReportAdapter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

pub fn render_summary(outcomes: &[SimulationOutcome]) -> String {
    let rows: Vec<Vec<String>> = outcomes.iter().map(SimulationOutcome::cells).collect();
    let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
    format!(
        "{}\n{} of {} start years survived\n",
        render_table(&SimulationOutcome::HEADERS, &rows),
        succeeded,
        outcomes.len()
    )
}

impl<W: Write> ReportPort for ConsoleReportAdapter<W> {
    fn write_summary(&self, outcomes: &[SimulationOutcome]) -> Result<(), RetireSimError> {
        let mut out = self.out.borrow_mut();
        out.write_all(render_summary(outcomes).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
