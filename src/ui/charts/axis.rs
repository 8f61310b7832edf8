//! Axis groups for the bar charts.
use super::scale::{BandScale, LinearScale};
use super::{AxisLabel, interaction_attrs};
use crate::ui::format::format_tick;
use crate::ui::view::{Element, el};

const TICK_SIZE: f64 = 6.0;
const AXIS_TICKS: usize = 5;

/// Band axis on the left edge; labels may be clickable.
pub(super) fn left_band(scale: &BandScale, labels: &[AxisLabel], height: f64) -> Element {
    let half = scale.bandwidth() / 2.0;
    let ticks = labels.iter().enumerate().map(|(i, label)| {
        let y = scale.at(i) + half;
        let text = el("text")
            .class("axis-label")
            .attr("data-index", i)
            .attr("x", -(TICK_SIZE + 3.0))
            .attr("dy", "0.32em")
            .attr("text-anchor", "end")
            .text(label.text.as_str());
        el("g")
            .class("tick")
            .attr("transform", format!("translate(0,{y})"))
            .child(el("line").attr("x2", -TICK_SIZE).attr("stroke", "currentColor"))
            .child(interaction_attrs(text, &[], label.detail.as_ref()))
    });
    el("g")
        .class("axis axis-left")
        .child(domain_line(0.0, 0.0, 0.0, height))
        .children(ticks)
}

/// Band axis along the bottom, labels rotated by `rotate` degrees.
pub(super) fn bottom_band(scale: &BandScale, labels: &[AxisLabel], y: f64, rotate: f64) -> Element {
    let half = scale.bandwidth() / 2.0;
    let ticks = labels.iter().enumerate().map(|(i, label)| {
        let x = scale.at(i) + half;
        let text = el("text")
            .class("axis-label")
            .attr("data-index", i)
            .attr("y", TICK_SIZE + 3.0)
            .attr("dx", "-0.5em")
            .attr("dy", "0.5em")
            .attr("transform", format!("rotate({rotate})"))
            .attr("text-anchor", "end")
            .text(label.text.as_str());
        el("g")
            .class("tick")
            .attr("transform", format!("translate({x},0)"))
            .child(el("line").attr("y2", TICK_SIZE).attr("stroke", "currentColor"))
            .child(interaction_attrs(text, &[], label.detail.as_ref()))
    });
    el("g")
        .class("axis axis-bottom")
        .attr("transform", format!("translate(0,{y})"))
        .children(ticks)
}

/// Numeric axis along the bottom at plot height `y`.
pub(super) fn bottom_linear(scale: &LinearScale, y: f64) -> Element {
    let (r0, r1) = scale.range();
    let ticks = scale.ticks(AXIS_TICKS).into_iter().map(|v| {
        el("g")
            .class("tick")
            .attr("transform", format!("translate({},0)", scale.map(v)))
            .child(el("line").attr("y2", TICK_SIZE).attr("stroke", "currentColor"))
            .child(
                el("text")
                    .attr("y", TICK_SIZE + 3.0)
                    .attr("dy", "0.71em")
                    .attr("text-anchor", "middle")
                    .text(format_tick(v)),
            )
    });
    el("g")
        .class("axis axis-bottom")
        .attr("transform", format!("translate(0,{y})"))
        .child(domain_line(r0, 0.0, r1, 0.0))
        .children(ticks)
}

/// Numeric axis on the left edge.
pub(super) fn left_linear(scale: &LinearScale) -> Element {
    let (r0, r1) = scale.range();
    let ticks = scale.ticks(AXIS_TICKS).into_iter().map(|v| {
        el("g")
            .class("tick")
            .attr("transform", format!("translate(0,{})", scale.map(v)))
            .child(el("line").attr("x2", -TICK_SIZE).attr("stroke", "currentColor"))
            .child(
                el("text")
                    .attr("x", -(TICK_SIZE + 3.0))
                    .attr("dy", "0.32em")
                    .attr("text-anchor", "end")
                    .text(format_tick(v)),
            )
    });
    el("g")
        .class("axis axis-left")
        .child(domain_line(0.0, r0, 0.0, r1))
        .children(ticks)
}

fn domain_line(x1: f64, y1: f64, x2: f64, y2: f64) -> Element {
    el("line")
        .class("domain")
        .attr("x1", x1)
        .attr("y1", y1)
        .attr("x2", x2)
        .attr("y2", y2)
        .attr("stroke", "currentColor")
}
