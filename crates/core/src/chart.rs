//! SVG rendering for the correlation chart and the dashboard's label histogram.

use std::path::Path;

use anyhow::Context;
use plotters::prelude::*;

use crate::correlate::CorrelationRow;
use crate::domain::{LabelCounts, Sentiment};
use crate::storage::write_atomic;

const CHART_SIZE: (u32, u32) = (1000, 600);
const DISTRIBUTION_SIZE: (u32, u32) = (520, 320);

fn label_color(label: Sentiment) -> RGBColor {
    match label {
        Sentiment::Positive => RGBColor(46, 139, 87),
        Sentiment::Negative => RGBColor(205, 55, 55),
        Sentiment::Neutral => RGBColor(70, 110, 190),
    }
}

fn plot_err(err: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!("chart rendering failed: {err}")
}

/// Percentages for `labels` on the left axis, close price on the right, one x
/// step per trading day. Labels absent from the sentiment data get no line.
pub fn correlation_svg(
    rows: &[CorrelationRow],
    labels: &[Sentiment],
    ticker: &str,
) -> anyhow::Result<String> {
    anyhow::ensure!(!rows.is_empty(), "no rows to plot");

    let n = rows.len();
    let x_range = -0.5f64..(n as f64 - 0.5);
    let (lo, hi) = rows
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.close), hi.max(r.close))
        });
    let pad = if hi > lo { (hi - lo) * 0.1 } else { 1.0 };
    let price_range = (lo - pad)..(hi + pad);

    let date_label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        rows.get(i as usize)
            .map(|r| r.date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{ticker} Stock Price vs News Sentiment"),
                ("sans-serif", 22).into_font(),
            )
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), 0f64..100f64)
            .map_err(plot_err)?
            .set_secondary_coord(x_range, price_range);

        chart
            .configure_mesh()
            .x_labels(n * 2 + 1)
            .x_label_formatter(&date_label)
            .x_desc("Date")
            .y_desc("Sentiment (%)")
            .draw()
            .map_err(plot_err)?;
        chart
            .configure_secondary_axes()
            .y_desc("Price")
            .draw()
            .map_err(plot_err)?;

        for &label in labels {
            let color = label_color(label);
            chart
                .draw_series(
                    LineSeries::new(
                        rows.iter()
                            .enumerate()
                            .map(|(i, r)| (i as f64, r.percentages.get(label))),
                        color.stroke_width(2),
                    )
                    .point_size(3),
                )
                .map_err(plot_err)?
                .label(format!("{label} %"))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .draw_secondary_series(
                LineSeries::new(
                    rows.iter().enumerate().map(|(i, r)| (i as f64, r.close)),
                    BLACK.stroke_width(2),
                )
                .point_size(3),
            )
            .map_err(plot_err)?
            .label("Close")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }
    Ok(svg)
}

pub fn render_correlation_chart(
    rows: &[CorrelationRow],
    labels: &[Sentiment],
    ticker: &str,
    path: &Path,
) -> anyhow::Result<()> {
    let svg = correlation_svg(rows, labels, ticker)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    write_atomic(path, svg.as_bytes())
}

/// Bar chart of headline counts per label.
pub fn distribution_svg(counts: &LabelCounts) -> anyhow::Result<String> {
    let top = Sentiment::DISPLAY_ORDER
        .iter()
        .map(|l| counts.get(*l))
        .max()
        .unwrap_or(0)
        .max(1);

    let bar_label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        Sentiment::DISPLAY_ORDER
            .get(i as usize)
            .map(|l| l.to_string())
            .unwrap_or_default()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, DISTRIBUTION_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Sentiment Distribution", ("sans-serif", 18).into_font())
            .margin(12)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(-0.5f64..2.5f64, 0f64..(f64::from(top) * 1.1))
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&bar_label)
            .y_desc("Headlines")
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(Sentiment::DISPLAY_ORDER.iter().enumerate().map(|(i, label)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - 0.35, 0.0), (x + 0.35, f64::from(counts.get(*label)))],
                    label_color(*label).filled(),
                )
            }))
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, close: f64, counts: LabelCounts) -> CorrelationRow {
        CorrelationRow {
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            close,
            counts,
            percentages: counts.percentages(),
        }
    }

    #[test]
    fn correlation_chart_carries_title_and_axes() {
        let rows = vec![
            row(5, 243.1, LabelCounts { positive: 3, neutral: 0, negative: 1 }),
            row(6, 244.0, LabelCounts::default()),
        ];
        let svg = correlation_svg(&rows, &Sentiment::DISPLAY_ORDER, "AAPL").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("AAPL Stock Price vs News Sentiment"));
        assert!(svg.contains("Sentiment (%)"));
        assert!(svg.contains("Price"));
        assert!(svg.contains("2026-01-05"));
        assert!(svg.contains("Positive %"));
        assert!(svg.contains("Neutral %"));
    }

    #[test]
    fn only_requested_labels_get_a_line() {
        let rows = vec![row(5, 243.1, LabelCounts { positive: 2, neutral: 0, negative: 0 })];
        let svg = correlation_svg(&rows, &[Sentiment::Positive], "AAPL").unwrap();
        assert!(svg.contains("Positive %"));
        assert!(!svg.contains("Negative %"));
        assert!(!svg.contains("Neutral %"));
        assert!(svg.contains("Close"));
    }

    #[test]
    fn single_flat_day_still_renders() {
        let rows = vec![row(5, 100.0, LabelCounts::default())];
        assert!(correlation_svg(&rows, &[], "MSFT").is_ok());
    }

    #[test]
    fn no_rows_is_an_error() {
        assert!(correlation_svg(&[], &Sentiment::DISPLAY_ORDER, "AAPL").is_err());
    }

    #[test]
    fn chart_file_is_written_into_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("AAPL.svg");
        let rows = vec![row(5, 100.0, LabelCounts::default())];
        render_correlation_chart(&rows, &[], "AAPL", &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));
    }

    #[test]
    fn distribution_handles_an_empty_tally() {
        let svg = distribution_svg(&LabelCounts::default()).unwrap();
        assert!(svg.contains("Sentiment Distribution"));
    }
}
