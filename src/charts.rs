use std::f64::consts::PI;
use std::fmt::Write;

const MARGIN: f64 = 40.0;
const TITLE_HEIGHT: f64 = 30.0;

/// Vertical bar chart scaled to the largest value.
pub fn bar_chart_svg(
    title: &str,
    labels: &[String],
    values: &[f64],
    width: u32,
    height: u32,
) -> String {
    let count = labels.len().min(values.len());
    let w = width as f64;
    let h = height as f64;
    let plot_height = (h - TITLE_HEIGHT - 2.0 * MARGIN).max(0.0);
    let baseline = TITLE_HEIGHT + MARGIN + plot_height;
    let max = scale_max(&values[..count]);

    let mut out = svg_open(width, height, title);
    let _ = write!(
        out,
        "<line class=\"axis\" x1=\"{MARGIN:.1}\" y1=\"{baseline:.1}\" x2=\"{:.1}\" y2=\"{baseline:.1}\" stroke=\"#52606d\" />",
        w - MARGIN
    );

    if count > 0 {
        let slot = (w - 2.0 * MARGIN) / count as f64;
        let bar_width = slot * 0.6;
        for (i, (label, &value)) in labels.iter().zip(values).take(count).enumerate() {
            let bar_height = if max > 0.0 {
                (value.max(0.0) / max) * plot_height
            } else {
                0.0
            };
            let x = MARGIN + i as f64 * slot + (slot - bar_width) / 2.0;
            let y = baseline - bar_height;
            let center = x + bar_width / 2.0;
            let _ = write!(
                out,
                "<rect class=\"bar\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_width:.1}\" height=\"{bar_height:.1}\" fill=\"#3e7cb1\" />"
            );
            let _ = write!(
                out,
                "<text class=\"value\" x=\"{center:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
                y - 4.0,
                format_value(value)
            );
            let _ = write!(
                out,
                "<text class=\"label\" x=\"{center:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
                baseline + 16.0,
                escape_xml(label)
            );
        }
    }

    out.push_str("</svg>");
    out
}

/// Closed polygon on one axis per label, scaled to the largest value.
pub fn radar_chart_svg(title: &str, labels: &[String], values: &[f64], size: u32) -> String {
    let count = labels.len().min(values.len());
    let s = size as f64;
    let cx = s / 2.0;
    let cy = TITLE_HEIGHT + (s - TITLE_HEIGHT) / 2.0;
    let radius = ((s - TITLE_HEIGHT) / 2.0 - MARGIN * 1.5).max(0.0);
    let max = scale_max(&values[..count]);

    let mut out = svg_open(size, size, title);
    if count == 0 {
        out.push_str("</svg>");
        return out;
    }

    let point = |i: usize, r: f64| {
        let angle = -PI / 2.0 + 2.0 * PI * i as f64 / count as f64;
        (cx + r * angle.cos(), cy + r * angle.sin())
    };

    for ring in 1..=4 {
        let r = radius * ring as f64 / 4.0;
        let ring_points = (0..count)
            .map(|i| {
                let (x, y) = point(i, r);
                format!("{x:.1},{y:.1}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            out,
            "<polygon class=\"grid\" points=\"{ring_points}\" fill=\"none\" stroke=\"#d0d7de\" />"
        );
    }

    for (i, label) in labels.iter().take(count).enumerate() {
        let (x, y) = point(i, radius);
        let (lx, ly) = point(i, radius + 18.0);
        let _ = write!(
            out,
            "<line class=\"axis\" x1=\"{cx:.1}\" y1=\"{cy:.1}\" x2=\"{x:.1}\" y2=\"{y:.1}\" stroke=\"#d0d7de\" />"
        );
        let _ = write!(
            out,
            "<text class=\"label\" x=\"{lx:.1}\" y=\"{ly:.1}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
            escape_xml(label)
        );
    }

    let shape = values
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, &value)| {
            let r = if max > 0.0 {
                (value.max(0.0) / max) * radius
            } else {
                0.0
            };
            let (x, y) = point(i, r);
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        out,
        "<polygon class=\"shape\" points=\"{shape}\" fill=\"#3e7cb1\" fill-opacity=\"0.35\" stroke=\"#0d3b66\" stroke-width=\"2\" />"
    );

    out.push_str("</svg>");
    out
}

fn svg_open(width: u32, height: u32, title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"><text class=\"title\" x=\"{:.1}\" y=\"22\" font-size=\"16\" font-weight=\"bold\" text-anchor=\"middle\">{}</text>",
        width as f64 / 2.0,
        escape_xml(title)
    )
}

fn scale_max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
