//! Bar chart rendering.

use crate::domain::DepartmentStat;
use crate::error::{AnalyzeError, Result};
use crate::observability::metrics as obs;
use plotters::prelude::*;
use serde::Deserialize;
use std::io::Cursor;
use tracing::debug;

/// Chart dimensions in pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { width: 960, height: 600 }
    }
}

/// Renders the aggregate as a PNG bar chart.
///
/// The renderer owns its backend configuration; constructing one is the
/// explicit initialization step, there is no process-wide drawing state.
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Draws one bar per aggregate row, in aggregate order, and returns the
    /// encoded PNG bytes. An empty aggregate still produces a valid image
    /// with empty axes.
    pub fn render(&self, stats: &[DepartmentStat]) -> Result<Vec<u8>> {
        let ChartConfig { width, height } = self.config;

        let mut rgb = vec![0u8; (width as usize) * (height as usize) * 3];
        if let Err(e) = self.draw(stats, &mut rgb) {
            obs::record_chart_error();
            return Err(e);
        }

        let image = image::RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| AnalyzeError::Chart("pixel buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .map_err(|e| AnalyzeError::Chart(format!("PNG encoding failed: {e}")))?;

        obs::record_chart_rendered(png.len());
        debug!(bars = stats.len(), bytes = png.len(), "rendered department chart");
        Ok(png)
    }

    fn draw(&self, stats: &[DepartmentStat], rgb: &mut [u8]) -> Result<()> {
        let root = BitMapBackend::with_buffer(rgb, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let y_max = stats.iter().map(|s| s.patient_count).max().unwrap_or(0).max(1) as u32;

        let mut chart = ChartBuilder::on(&root)
            .caption("Patient count per department", ("sans-serif", 28))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(48)
            .build_cartesian_2d((0..stats.len().max(1)).into_segmented(), 0u32..y_max + 1)
            .map_err(chart_error)?;

        let labels: Vec<&str> = stats.iter().map(|s| s.department.as_str()).collect();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Department")
            .y_desc("Patients")
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(i) => labels.get(*i).copied().unwrap_or("").to_string(),
                _ => String::new(),
            })
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(stats.iter().enumerate().map(|(i, stat)| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0),
                        (SegmentValue::Exact(i + 1), stat.patient_count as u32),
                    ],
                    BLUE.mix(0.6).filled(),
                )
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
        Ok(())
    }
}

fn chart_error<E: std::fmt::Display>(e: E) -> AnalyzeError {
    AnalyzeError::Chart(e.to_string())
}
