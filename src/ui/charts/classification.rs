//! Grouped vertical bars: prescription vs over-the-counter per category.
//!
//! Both series share one niced y-domain, so bars are comparable across
//! groups. Clicking a bar drills into its category.
use crate::api::types::ClassificationRow;
use crate::ui::detail::DetailKey;
use crate::ui::format::format_number;
use crate::ui::view::{Element, Node, el};

use super::scale::{BandScale, LinearScale};
use super::{
    AxisLabel, Bar, ChartKind, ChartLayout, ChartView, Growth, Margin, axis, bar_rect, max_value,
    svg_frame,
};

const MARGIN: Margin = Margin {
    top: 30.0,
    right: 140.0,
    bottom: 70.0,
    left: 60.0,
};
const OUTER_HEIGHT: f64 = 320.0;
const DELAY_STEP_MS: u64 = 80;
const LABEL_ROTATION: f64 = -35.0;

pub const PRESCRIPTION: &str = "Prescription";
pub const OVER_THE_COUNTER: &str = "Over-the-Counter";

/// Series in draw order with their colors.
pub const SERIES: [(&str, &str); 2] = [(PRESCRIPTION, "#2563eb"), (OVER_THE_COUNTER, "#10b981")];

fn series_value(row: &ClassificationRow, series: &str) -> u64 {
    if series == PRESCRIPTION {
        row.prescription
    } else {
        row.over_the_counter
    }
}

/// The y-scale shared by every group.
pub fn y_scale(data: &[ClassificationRow], inner_height: f64) -> LinearScale {
    let max = max_value(
        data.iter()
            .map(|d| d.prescription.max(d.over_the_counter)),
    );
    LinearScale::new((0.0, max), (inner_height, 0.0)).nice(5)
}

pub fn render(data: &[ClassificationRow], container_width: f64) -> ChartView {
    let layout = ChartLayout::new(container_width, OUTER_HEIGHT, MARGIN);
    let height = layout.inner_height;

    let x0 = BandScale::new(
        data.iter().map(|d| d.category.clone()).collect(),
        (0.0, layout.inner_width),
        0.2,
    );
    let x1 = BandScale::new(
        SERIES.iter().map(|(name, _)| name.to_string()).collect(),
        (0.0, x0.bandwidth()),
        0.1,
    );
    let y = y_scale(data, height);

    let mut bars = Vec::with_capacity(data.len() * SERIES.len());
    for (g, row) in data.iter().enumerate() {
        let group_x = x0.at(g);
        for (s, (series, color)) in SERIES.iter().enumerate() {
            let value = series_value(row, series);
            let top = y.map(value as f64);
            bars.push(Bar {
                key: row.category.clone(),
                series: Some(*series),
                value,
                x: group_x + x1.at(s),
                y: top,
                width: x1.bandwidth(),
                height: height - top,
                fill: color.to_string(),
                corner_radius: 4.0,
                growth: Growth::Upward,
                delay_ms: s as u64 * DELAY_STEP_MS,
                tooltip: vec![
                    row.category.clone(),
                    format!("{series}: {}", format_number(value)),
                ],
                detail: Some(DetailKey::Category(row.category.clone())),
            });
        }
    }

    let labels: Vec<AxisLabel> = data
        .iter()
        .map(|d| AxisLabel {
            text: d.category.clone(),
            key: d.category.clone(),
            detail: Some(DetailKey::Category(d.category.clone())),
        })
        .collect();

    let mut plot: Vec<Node> = bars
        .iter()
        .enumerate()
        .map(|(i, b)| bar_rect(b, i).attr("data-series", b.series.unwrap_or_default()).into())
        .collect();
    plot.push(axis::bottom_band(&x0, &labels, height, LABEL_ROTATION).into());
    plot.push(axis::left_linear(&y).into());
    plot.push(legend(layout.inner_width + 20.0).into());

    ChartView {
        kind: ChartKind::ClassificationBreakdown,
        svg: svg_frame(ChartKind::ClassificationBreakdown, &layout, plot, None),
        layout,
        bars,
        labels,
    }
}

fn legend(x: f64) -> Element {
    el("g")
        .class("legend")
        .attr("transform", format!("translate({x}, 0)"))
        .children(SERIES.iter().enumerate().map(|(i, (name, color))| {
            el("g")
                .attr("transform", format!("translate(0, {})", i * 28))
                .child(
                    el("rect")
                        .attr("width", 18)
                        .attr("height", 18)
                        .attr("rx", 4)
                        .attr("fill", *color),
                )
                .child(
                    el("text")
                        .attr("x", 26)
                        .attr("y", 14)
                        .attr("font-size", "12px")
                        .attr("fill", "#64748b")
                        .text(*name),
                )
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, rx: u64, otc: u64) -> ClassificationRow {
        ClassificationRow {
            category: category.to_string(),
            prescription: rx,
            over_the_counter: otc,
        }
    }

    #[test]
    fn two_bars_per_group_on_shared_domain() {
        let view = render(&[row("Pain Relief", 40, 60)], 800.0);
        assert_eq!(view.bars.len(), 2);

        let y = y_scale(&[row("Pain Relief", 40, 60)], view.layout.inner_height);
        assert_eq!(y.domain(), (0.0, 60.0));

        let (rx, otc) = (&view.bars[0], &view.bars[1]);
        assert_eq!(rx.series, Some(PRESCRIPTION));
        assert_eq!(otc.series, Some(OVER_THE_COUNTER));
        // Tallest bar spans the full plot height; 40/60 of it for the other.
        assert!((otc.height - 220.0).abs() < 1e-9);
        assert!((rx.height - 220.0 * 40.0 / 60.0).abs() < 1e-9);
        assert!(otc.x > rx.x);
        assert_eq!(rx.tooltip[1], "Prescription: 40");
    }

    #[test]
    fn groups_stagger_within_group() {
        let view = render(&[row("A", 1, 2), row("B", 3, 4)], 800.0);
        let delays: Vec<u64> = view.bars.iter().map(|b| b.delay_ms).collect();
        assert_eq!(delays, vec![0, 80, 0, 80]);
    }

    #[test]
    fn empty_dataset_renders_axes_and_legend_only() {
        let view = render(&[], 800.0);
        assert!(view.bars.is_empty());
        assert_eq!(view.svg.find_by_class("legend").len(), 1);
    }

    #[test]
    fn vertical_bars_grow_from_baseline() {
        let view = render(&[row("A", 10, 0)], 800.0);
        let html = view.svg.to_html();
        assert!(html.contains("attributeName=\"height\""));
        assert!(html.contains("attributeName=\"y\""));
        assert!(html.contains("data-series=\"Over-the-Counter\""));
    }
}
