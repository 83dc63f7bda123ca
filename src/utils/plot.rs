use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::projection::seasonal::MONTH_LABELS;
use crate::projection::series::ProjectionSeries;

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(max.abs() * 0.05).max(1.0);
    (min - pad, max + pad)
}

/// Growth curve from the current year to the target year.
pub fn create_projection_plot(series: &ProjectionSeries, path: &Path) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let first = series.first().map(|p| p.year).unwrap_or(0);
    // a single-year series still needs a non-empty axis
    let last = series.last().map(|p| p.year).unwrap_or(first).max(first + 1);
    let (low, high) = value_range(series.values());

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Projected value {}-{}", first, last), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(first..last, low..high)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Value")
        .draw()?;

    let green = RGBColor(0, 200, 81);
    chart.draw_series(AreaSeries::new(
        series.points.iter().map(|p| (p.year, p.value)),
        low,
        green.mix(0.1),
    ))?;
    chart.draw_series(LineSeries::new(
        series.points.iter().map(|p| (p.year, p.value)),
        green.stroke_width(2),
    ))?;
    chart.draw_series(
        series
            .points
            .iter()
            .map(|p| Circle::new((p.year, p.value), 3, green.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Predicted value for each calendar month.
pub fn create_seasonal_plot(monthly: &[f64; 12], path: &Path) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let (low, high) = value_range(monthly.iter().copied());
    let mut chart = ChartBuilder::on(&root)
        .caption("Seasonality", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0usize..11usize, low..high)?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&|m| MONTH_LABELS.get(*m).copied().unwrap_or("").to_string())
        .y_desc("Value")
        .draw()?;

    let coral = RGBColor(255, 90, 95);
    chart.draw_series(LineSeries::new(
        monthly.iter().copied().enumerate(),
        coral.stroke_width(2),
    ))?;
    chart.draw_series(
        monthly
            .iter()
            .enumerate()
            .map(|(m, &v)| Circle::new((m, v), 3, coral.filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_projection_plot_writes_svg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("projection.svg");
        create_projection_plot(&ProjectionSeries::project(300.0, 6.0, 2024, 2030), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Projected value 2024-2030"));
    }

    #[test]
    fn test_single_point_projection_plot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.svg");
        create_projection_plot(&ProjectionSeries::project(300.0, 6.0, 2024, 2024), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_seasonal_plot_writes_svg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seasonal.svg");
        let monthly = [
            310.0, 305.0, 290.0, 280.0, 270.0, 265.0, 275.0, 280.0, 285.0, 295.0, 300.0, 340.0,
        ];
        create_seasonal_plot(&monthly, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Seasonality"));
    }

    #[test]
    fn test_value_range_pads_flat_series() {
        let (low, high) = value_range([300.0, 300.0].into_iter());
        assert!(low < 300.0 && high > 300.0);
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
    }
}
