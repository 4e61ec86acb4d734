//! Chart descriptions and the sinks that consume them.
//!
//! Commands build a [`Chart`] from query results and hand it to whatever
//! [`ChartSink`] the session was configured with. The default sink writes a
//! JSON document per chart; `--no-charts` swaps in [`DisabledChartSink`].

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::time::now_utc_rfc3339;

pub const CHART_SCHEMA_VERSION: &str = "dbreports.chart.v1";
pub const CHART_SCHEMA_FILE: &str = "chart.schema.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Line,
    LineWithMarkers,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Series {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub color: String,
    pub style: SeriesStyle,
    pub points: Vec<Point>,
}

impl Series {
    #[must_use]
    pub fn new(color: &str, style: SeriesStyle, points: Vec<Point>) -> Self {
        Self {
            label: None,
            color: color.to_string(),
            style,
            points,
        }
    }

    #[must_use]
    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Annotation {
    pub text: String,
    pub at: Point,
}

/// Axis-aligned bounds in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Background {
    pub image_path: String,
    pub extent: Extent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x_ticks: Vec<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
}

impl Chart {
    #[must_use]
    pub fn new(title: impl Into<String>, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            x_ticks: Vec::new(),
            annotations: Vec::new(),
            background: None,
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    #[must_use]
    pub fn with_x_ticks(mut self, ticks: Vec<f64>) -> Self {
        self.x_ticks = ticks;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    pub fn annotate(&mut self, text: impl Into<String>, at: Point) {
        self.annotations.push(Annotation {
            text: text.into(),
            at,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartDocument {
    pub schema_version: String,
    pub generated_at_utc: String,
    pub chart: Chart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartReceipt {
    Saved(PathBuf),
    Unavailable(String),
}

pub trait ChartSink {
    fn render(&mut self, chart: &Chart) -> Result<ChartReceipt>;
}

/// Writes each chart as `NNN-<slug>.json` under one directory. Numbering
/// continues after the highest prefix already present, so earlier sessions
/// are never overwritten.
#[derive(Debug, Clone)]
pub struct JsonChartSink {
    out_dir: PathBuf,
}

impl JsonChartSink {
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl ChartSink for JsonChartSink {
    fn render(&mut self, chart: &Chart) -> Result<ChartReceipt> {
        std::fs::create_dir_all(&self.out_dir).with_context(|| {
            format!(
                "failed to create chart output directory: {}",
                self.out_dir.display()
            )
        })?;
        write_schema_artifact(&self.out_dir.join(CHART_SCHEMA_FILE))?;

        let sequence = next_sequence(&self.out_dir)?;
        let path = self
            .out_dir
            .join(format!("{sequence:03}-{}.json", slug(&chart.title)));
        let document = ChartDocument {
            schema_version: CHART_SCHEMA_VERSION.to_string(),
            generated_at_utc: now_utc_rfc3339()?,
            chart: chart.clone(),
        };
        let encoded = serde_json::to_string_pretty(&document)
            .context("failed to encode chart document as JSON")?;
        std::fs::write(&path, encoded)
            .with_context(|| format!("failed to write chart document: {}", path.display()))?;

        tracing::info!(path = %path.display(), series = chart.series.len(), "chart written");
        Ok(ChartReceipt::Saved(path))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisabledChartSink;

impl ChartSink for DisabledChartSink {
    fn render(&mut self, _chart: &Chart) -> Result<ChartReceipt> {
        Ok(ChartReceipt::Unavailable(
            "chart output is disabled".to_string(),
        ))
    }
}

#[must_use]
pub fn chart_json_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ChartDocument))
        .unwrap_or(serde_json::Value::Null)
}

#[must_use]
pub fn slug(title: &str) -> String {
    let lowered = title.to_ascii_lowercase();
    let joined = slug_separator_regex().replace_all(&lowered, "-");
    let trimmed = joined.trim_matches('-');
    if trimmed.is_empty() {
        "chart".to_string()
    } else {
        trimmed.to_string()
    }
}

fn slug_separator_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug separator regex should compile"))
}

fn sequence_prefix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(\d{3,})-.+\.json$").expect("chart sequence regex should compile")
    })
}

fn next_sequence(out_dir: &Path) -> Result<usize> {
    let entries = std::fs::read_dir(out_dir)
        .with_context(|| format!("failed to list chart output directory: {}", out_dir.display()))?;

    let mut highest = 0;
    for entry in entries {
        let entry = entry.context("failed to read chart output directory entry")?;
        let name = entry.file_name();
        let sequence = name
            .to_str()
            .and_then(|name| sequence_prefix_regex().captures(name))
            .and_then(|captures| captures[1].parse::<usize>().ok());
        if let Some(sequence) = sequence {
            highest = highest.max(sequence);
        }
    }
    Ok(highest + 1)
}

fn write_schema_artifact(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    let encoded = serde_json::to_string_pretty(&chart_json_schema())
        .context("failed to encode chart schema")?;
    std::fs::write(path, encoded).context("failed to write chart schema artifact")
}
