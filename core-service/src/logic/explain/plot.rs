//! Explanation Plots - Inline SVG
//!
//! Plain string building; the page embeds the result directly.

use super::types::{Attribution, Explanation};
use crate::logic::features::Feature;

pub const POSITIVE_COLOR: &str = "#ff0051";
pub const NEGATIVE_COLOR: &str = "#008bfb";

/// Rows shown before the remainder is folded into one line
const MAX_ROWS: usize = 10;

const WIDTH: f64 = 640.0;
const LABEL_WIDTH: f64 = 230.0;
const VALUE_WIDTH: f64 = 70.0;
const ROW_HEIGHT: f64 = 24.0;
const TOP: f64 = 30.0;
const AXIS_HEIGHT: f64 = 34.0;

/// Waterfall from the base value to the row's output.
/// Red segments push risk up, blue push it down; largest first.
pub fn force_plot_svg(explanation: &Explanation) -> String {
    let ranked: Vec<Attribution> = explanation
        .ranked()
        .into_iter()
        .filter(|a| a.value != 0.0)
        .collect();

    let mut rows: Vec<(String, f64)> = ranked
        .iter()
        .take(MAX_ROWS)
        .map(|a| {
            (
                format!("{} = {}", a.feature.label(), a.feature.display_value(a.input)),
                a.value,
            )
        })
        .collect();

    if ranked.len() > MAX_ROWS {
        let rest = &ranked[MAX_ROWS..];
        let value: f64 = rest.iter().map(|a| a.value).sum();
        rows.push((format!("{} other features", rest.len()), value));
    }

    // Running total after each row
    let mut cumulative = Vec::with_capacity(rows.len() + 1);
    let mut acc = explanation.base_value;
    cumulative.push(acc);
    for (_, value) in &rows {
        acc += value;
        cumulative.push(acc);
    }

    let lo = cumulative.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = cumulative.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if hi - lo > 0.0 { hi - lo } else { 1.0 };

    let plot_left = LABEL_WIDTH;
    let plot_width = WIDTH - LABEL_WIDTH - VALUE_WIDTH;
    let x = |v: f64| plot_left + (v - lo) / span * plot_width;

    let height = TOP + rows.len() as f64 * ROW_HEIGHT + AXIS_HEIGHT;
    let mut svg = svg_open(height);

    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"18\" font-size=\"12\">f(x) = {:.3} (base {:.3})</text>",
        plot_left,
        explanation.raw_output,
        explanation.base_value
    ));

    for (i, (label, value)) in rows.iter().enumerate() {
        let y = TOP + i as f64 * ROW_HEIGHT;
        let (start, end) = (cumulative[i], cumulative[i + 1]);
        let left = x(start.min(end));
        let bar_width = (x(start.max(end)) - left).max(1.0);
        let color = if *value > 0.0 { POSITIVE_COLOR } else { NEGATIVE_COLOR };

        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"end\">{}</text>",
            plot_left - 8.0,
            y + 16.0,
            label
        ));
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" />",
            left,
            y + 4.0,
            bar_width,
            ROW_HEIGHT - 8.0,
            color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"{}\">{:+.3}</text>",
            WIDTH - VALUE_WIDTH + 6.0,
            y + 16.0,
            color,
            value
        ));
    }

    let axis_y = TOP + rows.len() as f64 * ROW_HEIGHT + 6.0;
    svg.push_str(&format!(
        "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#999\" />",
        plot_left,
        axis_y,
        plot_left + plot_width,
        axis_y
    ));
    for (name, value) in [("E[f(x)]", explanation.base_value), ("f(x)", explanation.raw_output)] {
        let vx = x(value);
        svg.push_str(&format!(
            "<line x1=\"{vx:.1}\" y1=\"{:.1}\" x2=\"{vx:.1}\" y2=\"{:.1}\" stroke=\"#555\" stroke-dasharray=\"3,3\" />",
            TOP,
            axis_y
        ));
        svg.push_str(&format!(
            "<text x=\"{vx:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{} = {:.3}</text>",
            axis_y + 18.0,
            name,
            value
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Horizontal bars of mean |SHAP|, in the order given
pub fn importance_bar_svg(ranking: &[(Feature, f64)]) -> String {
    let rows: Vec<&(Feature, f64)> = ranking.iter().take(MAX_ROWS).collect();
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    let plot_left = LABEL_WIDTH;
    let plot_width = WIDTH - LABEL_WIDTH - VALUE_WIDTH;
    let height = TOP + rows.len() as f64 * ROW_HEIGHT + 10.0;
    let mut svg = svg_open(height);

    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"18\" font-size=\"12\">mean(|SHAP value|)</text>",
        plot_left
    ));

    for (i, (feature, value)) in rows.iter().enumerate() {
        let y = TOP + i as f64 * ROW_HEIGHT;
        let bar_width = if max > 0.0 { value / max * plot_width } else { 0.0 };

        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"end\">{}</text>",
            plot_left - 8.0,
            y + 16.0,
            feature.label()
        ));
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" />",
            plot_left,
            y + 4.0,
            bar_width,
            ROW_HEIGHT - 8.0,
            NEGATIVE_COLOR
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">{:.3}</text>",
            plot_left + bar_width + 6.0,
            y + 16.0,
            value
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn svg_open(height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\" font-family=\"sans-serif\">",
        WIDTH, height, WIDTH, height
    )
}
