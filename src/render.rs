use crate::error::Result;
use crate::exceptions::ExceptionTable;
use crate::report::{RenewalsReport, RevenuePoint, RevenueTable};
use serde::Serialize;
use std::io::Write;

/// Presentation collaborator that displays the tables and draws the chart.
pub trait RenderSink {
    fn render(
        &mut self,
        revenue_table: &RevenueTable,
        exceptions: &ExceptionTable,
        series: &[RevenuePoint],
    ) -> Result<()>;

    fn render_report(&mut self, report: &RenewalsReport) -> Result<()> {
        self.render(&report.revenue_table, &report.exceptions, &report.series)
    }
}

#[derive(Serialize)]
struct RenderView<'a> {
    revenue_table: &'a RevenueTable,
    exceptions: &'a ExceptionTable,
    series: &'a [RevenuePoint],
}

/// Writes the three views as one pretty-printed JSON document.
pub struct JsonRenderSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonRenderSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSink for JsonRenderSink<W> {
    fn render(
        &mut self,
        revenue_table: &RevenueTable,
        exceptions: &ExceptionTable,
        series: &[RevenuePoint],
    ) -> Result<()> {
        let view = RenderView {
            revenue_table,
            exceptions,
            series,
        };
        serde_json::to_writer_pretty(&mut self.writer, &view)?;
        self.writer.flush()?;
        Ok(())
    }
}
