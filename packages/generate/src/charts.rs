//! Plotly figure documents.
//!
//! Each builder returns a [`Figure`] (the `data` + `layout` JSON Plotly
//! expects). [`write_figure_html`] wraps a figure in a standalone page that
//! loads `plotly.js` from its CDN, so nothing here rasterizes.

use std::path::Path;

use hate_trend_analytics_models::{CovidIncidentPoint, PredictionResult, TimeSeriesPoint};
use hate_trend_state_models::UsState;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{GenerateError, write_atomic};

/// CDN build of `plotly.js` referenced by generated pages.
pub const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// A Plotly figure: a list of traces plus a layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    /// Trace objects.
    pub data: Vec<Value>,
    /// Layout object.
    pub layout: Value,
}

impl Figure {
    /// Title text from the layout, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.layout
            .get("title")
            .and_then(|title| title.get("text"))
            .and_then(Value::as_str)
    }
}

fn line_figure(title: String, x_title: &str, points: &[TimeSeriesPoint]) -> Figure {
    let x: Vec<&str> = points.iter().map(|p| p.period.as_str()).collect();
    let y: Vec<u64> = points.iter().map(|p| p.count).collect();

    Figure {
        data: vec![json!({
            "type": "scatter",
            "mode": "lines",
            "x": x,
            "y": y,
        })],
        layout: json!({
            "title": { "text": title },
            "xaxis": { "title": { "text": x_title }, "type": "category" },
            "yaxis": { "title": { "text": "Hate crimes" }, "rangemode": "tozero" },
        }),
    }
}

/// Line chart of yearly incident counts for `state`.
#[must_use]
pub fn year_series_figure(state: UsState, points: &[TimeSeriesPoint]) -> Figure {
    line_figure(
        format!("Hate crimes per year in {}", state.name()),
        "Year",
        points,
    )
}

/// Line chart of monthly incident counts for `state`.
#[must_use]
pub fn month_series_figure(state: UsState, points: &[TimeSeriesPoint]) -> Figure {
    line_figure(
        format!("Hate crimes per month in {}", state.name()),
        "Year, month",
        points,
    )
}

/// Scatter of monthly COVID-19 cases (x) against monthly incidents (y).
#[must_use]
pub fn covid_scatter_figure(state: UsState, points: &[CovidIncidentPoint]) -> Figure {
    let x: Vec<u64> = points.iter().map(|p| p.cases).collect();
    let y: Vec<u64> = points.iter().map(|p| p.incidents).collect();
    let text: Vec<String> = points.iter().map(|p| format!("Month {}", p.month)).collect();

    Figure {
        data: vec![json!({
            "type": "scatter",
            "mode": "markers",
            "x": x,
            "y": y,
            "text": text,
        })],
        layout: json!({
            "title": { "text": format!("COVID-19 cases vs. hate crimes in {}", state.name()) },
            "xaxis": { "title": { "text": "COVID-19 cases" } },
            "yaxis": { "title": { "text": "Hate crimes" } },
        }),
    }
}

/// U.S. choropleth of percent difference between actual and predicted
/// counts. Undefined differences are left blank on the map.
#[must_use]
pub fn choropleth_figure(results: &[PredictionResult], target_year: i32) -> Figure {
    let locations: Vec<&str> = results.iter().map(|r| r.state.code()).collect();
    let z: Vec<Option<f64>> = results
        .iter()
        .map(|r| Some(r.percent_difference).filter(|v| v.is_finite()))
        .collect();
    let text: Vec<String> = results
        .iter()
        .map(|r| {
            format!(
                "{}<br>Actual: {}<br>Predicted: {}",
                r.state.name(),
                r.actual_count,
                r.predicted_count
            )
        })
        .collect();

    Figure {
        data: vec![json!({
            "type": "choropleth",
            "locationmode": "USA-states",
            "locations": locations,
            "z": z,
            "text": text,
            "colorscale": "RdBu",
            "reversescale": true,
            "zmid": 0,
            "colorbar": { "title": { "text": "% difference" } },
        })],
        layout: json!({
            "title": {
                "text": format!("Hate crimes in {target_year}: percent difference from prediction")
            },
            "geo": {
                "scope": "usa",
                "projection": { "type": "albers usa" },
            },
        }),
    }
}

/// Renders `figure` as a standalone HTML page.
///
/// # Errors
///
/// Returns [`GenerateError::Json`] if the figure cannot be serialized.
pub fn render_figure_html(figure: &Figure) -> Result<String, GenerateError> {
    // A literal "</script>" inside the JSON would end the script element.
    let figure_json = serde_json::to_string(figure)?.replace("</", "<\\/");
    let title = escape_html(figure.title().unwrap_or("Figure"));

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN_URL}"></script>
</head>
<body>
<div id="figure" style="width:100%;height:90vh;"></div>
<script>
const figure = {figure_json};
Plotly.newPlot("figure", figure.data, figure.layout, {{ responsive: true }});
</script>
</body>
</html>
"#
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Writes `figure` to `path` as a standalone HTML page.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_figure_html(path: &Path, figure: &Figure) -> Result<(), GenerateError> {
    let html = render_figure_html(figure)?;
    write_atomic(path, html.as_bytes())?;
    log::info!("Wrote figure to {}", path.display());
    Ok(())
}
