//! Ranking of the top manufacturers by medicine count.
//!
//! Fixed 360 px tall, bars filled with a horizontal gradient, labelled with
//! market share.
use crate::api::types::ManufacturerRank;
use crate::ui::detail::DetailKey;
use crate::ui::format::{format_decimal, format_number, truncate_label};
use crate::ui::view::{Node, el};

use super::scale::{BandScale, LinearScale};
use super::{
    AxisLabel, Bar, ChartKind, ChartLayout, ChartView, Growth, Margin, axis, bar_rect,
    fade_in_label, max_value, svg_frame,
};

const MARGIN: Margin = Margin {
    top: 20.0,
    right: 70.0,
    bottom: 40.0,
    left: 140.0,
};
const OUTER_HEIGHT: f64 = 360.0;
const DELAY_STEP_MS: u64 = 60;
const LABEL_DELAY_MS: u64 = 300;
const GRADIENT_ID: &str = "mfr-gradient";

/// Axis labels longer than this are shortened.
const LABEL_MAX_CHARS: usize = 16;
const LABEL_KEEP_CHARS: usize = 14;

pub fn render(data: &[ManufacturerRank], container_width: f64) -> ChartView {
    let layout = ChartLayout::new(container_width, OUTER_HEIGHT, MARGIN);
    let x = LinearScale::new(
        (0.0, max_value(data.iter().map(|d| d.medicine_count))),
        (0.0, layout.inner_width),
    );
    let y = BandScale::new(
        data.iter().map(|d| d.manufacturer.clone()).collect(),
        (0.0, layout.inner_height),
        0.25,
    );

    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, d)| Bar {
            key: d.manufacturer.clone(),
            series: None,
            value: d.medicine_count,
            x: 0.0,
            y: y.at(i),
            width: x.map(d.medicine_count as f64),
            height: y.bandwidth(),
            fill: format!("url(#{GRADIENT_ID})"),
            corner_radius: 5.0,
            growth: Growth::Rightward,
            delay_ms: i as u64 * DELAY_STEP_MS,
            tooltip: vec![
                d.manufacturer.clone(),
                format!("Medicines: {}", format_number(d.medicine_count)),
                format!("Categories: {}", d.category_count),
                format!("Market Share: {}%", format_decimal(d.market_share)),
            ],
            detail: Some(DetailKey::Manufacturer(d.manufacturer.clone())),
        })
        .collect();

    let labels: Vec<AxisLabel> = data
        .iter()
        .map(|d| AxisLabel {
            text: truncate_label(&d.manufacturer, LABEL_MAX_CHARS, LABEL_KEEP_CHARS),
            key: d.manufacturer.clone(),
            detail: Some(DetailKey::Manufacturer(d.manufacturer.clone())),
        })
        .collect();

    let mut plot: Vec<Node> = bars
        .iter()
        .enumerate()
        .map(|(i, b)| bar_rect(b, i).into())
        .collect();
    plot.extend(data.iter().zip(&bars).map(|(d, b)| {
        Node::from(
            fade_in_label(
                b.width + 8.0,
                b.y + b.height / 2.0,
                format!("{}%", format_decimal(d.market_share)),
                b.delay_ms + LABEL_DELAY_MS,
                "10px",
                "600",
            )
            .class("bar-label share-label"),
        )
    }));
    plot.push(axis::left_band(&y, &labels, layout.inner_height).into());
    plot.push(axis::bottom_linear(&x, layout.inner_height).into());

    let defs = el("defs").child(
        el("linearGradient")
            .id(GRADIENT_ID)
            .attr("x1", "0%")
            .attr("x2", "100%")
            .child(el("stop").attr("offset", "0%").attr("stop-color", "#2563eb"))
            .child(el("stop").attr("offset", "100%").attr("stop-color", "#7c3aed")),
    );

    ChartView {
        kind: ChartKind::ManufacturerRanking,
        svg: svg_frame(ChartKind::ManufacturerRanking, &layout, plot, Some(defs)),
        layout,
        bars,
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(name: &str, medicines: u64, share: f64) -> ManufacturerRank {
        ManufacturerRank {
            manufacturer: name.to_string(),
            medicine_count: medicines,
            category_count: 3,
            market_share: share,
        }
    }

    #[test]
    fn fixed_height_regardless_of_rows() {
        let one = render(&[rank("Acme", 10, 50.0)], 800.0);
        let many: Vec<_> = (0..10).map(|i| rank(&format!("M{i}"), 10 - i, 5.0)).collect();
        let ten = render(&many, 800.0);
        assert_eq!(one.layout.outer_height(), 360.0);
        assert_eq!(ten.layout.outer_height(), 360.0);
        assert_eq!(ten.bars[9].delay_ms, 540);
    }

    #[test]
    fn long_names_are_truncated_on_axis_only() {
        let view = render(&[rank("Globex Pharmaceutical Holdings", 40, 12.5)], 800.0);
        assert_eq!(view.labels[0].text, "Globex Pharmac...");
        assert_eq!(
            view.labels[0].detail,
            Some(DetailKey::Manufacturer(
                "Globex Pharmaceutical Holdings".into()
            ))
        );
        assert_eq!(view.bars[0].tooltip[3], "Market Share: 12.5%");
        assert!(view.svg.to_html().contains(">12.5%<"));
    }

    #[test]
    fn share_labels_keep_bar_label_class() {
        let view = render(&[rank("Acme", 10, 50.0), rank("Globex", 5, 25.0)], 800.0);
        let shares = view.svg.find_by_class("share-label");
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|e| e.has_class("bar-label")));
        assert_eq!(view.svg.find_by_class("bar-label").len(), 2);
    }

    #[test]
    fn bars_use_gradient_fill() {
        let view = render(&[rank("Acme", 1, 100.0)], 500.0);
        assert_eq!(view.bars[0].fill, "url(#mfr-gradient)");
        assert!(view.svg.find_by_id("mfr-gradient").is_some());
    }
}
