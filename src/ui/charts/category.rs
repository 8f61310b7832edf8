//! Horizontal bar chart of medicine counts per category.
//!
//! Height grows with the number of categories (38 px per row, never below
//! 320 px); width follows the container.
use crate::api::types::CategoryShare;
use crate::ui::detail::DetailKey;
use crate::ui::format::{format_decimal, format_number};
use crate::ui::view::Node;

use super::scale::{BandScale, LinearScale};
use super::{
    AxisLabel, Bar, ChartKind, ChartLayout, ChartView, Growth, Margin, axis, bar_rect,
    chart_color, fade_in_label, max_value, svg_frame,
};

const MARGIN: Margin = Margin {
    top: 20.0,
    right: 40.0,
    bottom: 40.0,
    left: 110.0,
};
const ROW_HEIGHT: f64 = 38.0;
const MIN_HEIGHT: f64 = 320.0;
const DELAY_STEP_MS: u64 = 40;
const LABEL_DELAY_MS: u64 = 300;

/// Outer chart height for `rows` categories.
pub fn outer_height(rows: usize) -> f64 {
    (rows as f64 * ROW_HEIGHT).max(MIN_HEIGHT)
}

pub fn render(data: &[CategoryShare], container_width: f64) -> ChartView {
    let layout = ChartLayout::new(container_width, outer_height(data.len()), MARGIN);
    let x = LinearScale::new(
        (0.0, max_value(data.iter().map(|d| d.count))),
        (0.0, layout.inner_width),
    );
    let y = BandScale::new(
        data.iter().map(|d| d.category.clone()).collect(),
        (0.0, layout.inner_height),
        0.25,
    );

    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, d)| Bar {
            key: d.category.clone(),
            series: None,
            value: d.count,
            x: 0.0,
            y: y.at(i),
            width: x.map(d.count as f64),
            height: y.bandwidth(),
            fill: chart_color(i).to_string(),
            corner_radius: 5.0,
            growth: Growth::Rightward,
            delay_ms: i as u64 * DELAY_STEP_MS,
            tooltip: vec![
                d.category.clone(),
                format!("Count: {}", format_number(d.count)),
                format!("Share: {}%", format_decimal(d.percentage)),
            ],
            detail: Some(DetailKey::Category(d.category.clone())),
        })
        .collect();

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
        .map(|(i, b)| bar_rect(b, i).into())
        .collect();
    plot.extend(bars.iter().map(|b| {
        Node::from(fade_in_label(
            b.width + 8.0,
            b.y + b.height / 2.0,
            format_number(b.value),
            b.delay_ms + LABEL_DELAY_MS,
            "11px",
            "500",
        ))
    }));
    plot.push(axis::left_band(&y, &labels, layout.inner_height).into());
    plot.push(axis::bottom_linear(&x, layout.inner_height).into());

    ChartView {
        kind: ChartKind::CategoryDistribution,
        svg: svg_frame(ChartKind::CategoryDistribution, &layout, plot, None),
        layout,
        bars,
        labels,
    }
}
