//! Price history line chart rendered as SVG

use crate::market::PriceSeries;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Chart title
pub const CHART_TITLE: &str = "Stock Performance Over the Last 12 Months";

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 4;

const BACKGROUND: &str = "#111111";
const GRID: &str = "#2a2a2a";
const TEXT: &str = "#e0e0e0";
const PALETTE: [&str; 8] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
];

struct Bounds {
    start: i64,
    end: i64,
    low: f64,
    high: f64,
}

impl Bounds {
    fn of(series: &[PriceSeries]) -> Option<Self> {
        let points = series.iter().flat_map(|s| s.points.iter());
        let mut bounds: Option<Self> = None;
        for point in points.filter(|p| p.close.is_finite()) {
            let ts = point.date.timestamp();
            let b = bounds.get_or_insert(Self {
                start: ts,
                end: ts,
                low: point.close,
                high: point.close,
            });
            b.start = b.start.min(ts);
            b.end = b.end.max(ts);
            b.low = b.low.min(point.close);
            b.high = b.high.max(point.close);
        }

        // Flat ranges still need a non-zero span
        bounds.map(|mut b| {
            if b.end == b.start {
                b.end += 86_400;
            }
            if (b.high - b.low).abs() < f64::EPSILON {
                b.low -= 1.0;
                b.high += 1.0;
            }
            b
        })
    }

    fn x(&self, ts: i64) -> f64 {
        let plot = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        MARGIN_LEFT + (ts - self.start) as f64 / (self.end - self.start) as f64 * plot
    }

    fn y(&self, price: f64) -> f64 {
        let plot = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + (self.high - price) / (self.high - self.low) * plot
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn date_label(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Render one line per series on a shared date/price axis
///
/// Series without points still get a legend entry. With no points at all
/// the chart shows a "No data" notice.
pub fn render_line_chart(series: &[PriceSeries]) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="{WIDTH}" height="{HEIGHT}" font-family="sans-serif">"#
    );
    let _ = write!(svg, r#"<rect width="100%" height="100%" fill="{BACKGROUND}"/>"#);
    let _ = write!(
        svg,
        r#"<text x="{}" y="28" fill="{TEXT}" font-size="18" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        escape(CHART_TITLE)
    );

    let Some(bounds) = Bounds::of(series) else {
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" fill="{TEXT}" font-size="14" text-anchor="middle">No data</text></svg>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        return svg;
    };

    let plot_bottom = HEIGHT - MARGIN_BOTTOM;
    let plot_right = WIDTH - MARGIN_RIGHT;

    for i in 0..=Y_TICKS {
        let price = bounds.low + (bounds.high - bounds.low) * i as f64 / Y_TICKS as f64;
        let y = bounds.y(price);
        let _ = write!(
            svg,
            r#"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{plot_right}" y2="{y:.1}" stroke="{GRID}"/><text x="{}" y="{:.1}" fill="{TEXT}" font-size="11" text-anchor="end">{price:.2}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0
        );
    }

    for i in 0..=X_TICKS {
        let ts = bounds.start + (bounds.end - bounds.start) * i as i64 / X_TICKS as i64;
        let x = bounds.x(ts);
        let _ = write!(
            svg,
            r#"<line x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{plot_bottom}" stroke="{GRID}"/><text x="{x:.1}" y="{}" fill="{TEXT}" font-size="11" text-anchor="middle">{}</text>"#,
            plot_bottom + 18.0,
            date_label(ts)
        );
    }

    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="{}" fill="{TEXT}" font-size="13" text-anchor="middle">Date</text>"#,
        (MARGIN_LEFT + plot_right) / 2.0,
        HEIGHT - 16.0
    );
    let _ = write!(
        svg,
        r#"<text x="18" y="{:.1}" fill="{TEXT}" font-size="13" text-anchor="middle" transform="rotate(-90 18 {:.1})">Price</text>"#,
        (MARGIN_TOP + plot_bottom) / 2.0,
        (MARGIN_TOP + plot_bottom) / 2.0
    );

    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<String> = s
            .points
            .iter()
            .filter(|p| p.close.is_finite())
            .map(|p| format!("{:.1},{:.1}", bounds.x(p.date.timestamp()), bounds.y(p.close)))
            .collect();
        if !points.is_empty() {
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{}"><title>{}</title></polyline>"#,
                points.join(" "),
                escape(&s.symbol)
            );
        }

        let legend_y = MARGIN_TOP + 10.0 + i as f64 * 20.0;
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{:.1}" width="14" height="4" fill="{color}"/><text x="{}" y="{:.1}" fill="{TEXT}" font-size="12">{}</text>"#,
            plot_right + 16.0,
            legend_y - 4.0,
            plot_right + 36.0,
            legend_y + 1.0,
            escape(&s.symbol)
        );
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PricePoint;
    use chrono::{Duration, TimeZone};

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::new(symbol, points)
    }

    #[test]
    fn test_one_polyline_per_series() {
        let svg = render_line_chart(&[
            series("AAPL", &[180.0, 182.5, 181.0]),
            series("TCS.NS", &[3900.0, 3950.0, 3925.0]),
        ]);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(CHART_TITLE));
        assert!(svg.contains(">Date<"));
        assert!(svg.contains(">Price<"));
        assert!(svg.contains(">TCS.NS<"));
        assert!(svg.contains("2024-01-02"));
    }

    #[test]
    fn test_empty_chart() {
        let svg = render_line_chart(&[]);
        assert!(svg.contains("No data"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_single_point_is_finite() {
        let svg = render_line_chart(&[series("M&M.NS", &[100.0])]);
        assert!(!svg.contains("NaN"));
        assert!(svg.contains("M&amp;M.NS"));
    }
}
