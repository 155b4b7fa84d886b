//! Report builders: pure functions from query rows to a serialisable payload.
//!
//! Handlers fetch rows and hand them here; nothing in this tree touches the
//! pool, so every page renders from synthetic rows in tests. Chart shapes are
//! generic label/series bundles the front end turns into Plotly figures.

use serde::{Deserialize, Serialize};

use crate::kpi::KpiCard;

pub mod attendance;
pub mod home;
pub mod hospitality;
pub mod loans;
pub mod retail;
pub mod tickets;
pub mod validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    GroupedBar,
    StackedBar,
    Line,
    Pie,
}

/// One plotted series. `hover` lines, when present, pair with `values`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hover: Vec<String>,
}

impl Series {
    pub fn new(name: &str, values: Vec<f64>) -> Self {
        Series { name: name.to_string(), values, hover: Vec::new() }
    }

    pub fn with_hover(name: &str, values: Vec<f64>, hover: Vec<String>) -> Self {
        Series { name: name.to_string(), values, hover }
    }
}

/// Per-label decoration: crest image above the bar plus a result-coloured ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoration {
    pub label: String,
    pub crest: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub decorations: Vec<Decoration>,
}

impl Chart {
    pub fn new(id: &str, title: &str, kind: ChartKind, labels: Vec<String>, series: Vec<Series>) -> Self {
        Chart {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            labels,
            series,
            decorations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub kpis: Vec<KpiCard>,
    pub charts: Vec<Chart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl ReportPayload {
    pub fn new(kpis: Vec<KpiCard>, charts: Vec<Chart>) -> Self {
        ReportPayload { kpis, charts, notice: None }
    }

    /// Empty page shown when the pre-aggregated tables hold no rows yet.
    pub fn no_data() -> Self {
        ReportPayload {
            kpis: Vec::new(),
            charts: Vec::new(),
            notice: Some("No hay datos disponibles".to_string()),
        }
    }

    /// Rendered in place of the page when a query fails. The message is for
    /// the operator looking at the screen, not a retry signal.
    pub fn error(detail: &str) -> Self {
        ReportPayload {
            kpis: Vec::new(),
            charts: Vec::new(),
            notice: Some(format!("Error: {}", detail)),
        }
    }

    pub fn stub(text: &str) -> Self {
        ReportPayload { kpis: Vec::new(), charts: Vec::new(), notice: Some(text.to_string()) }
    }
}

/// Stands shown in per-match hovers, in the stadium's customary order.
pub const STAND_ORDER: [&str; 4] = ["FONDO MARATHON", "PREFERENCIA", "FONDO PABELLON", "TRIBUNA"];

/// Spanish weekday labels in business order. Source rows carry the weekday as
/// a label, so ordering has to be restored positionally.
pub const WEEKDAYS: [&str; 7] =
    ["Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado", "Domingo"];

/// Index of a weekday label in Monday-first order; case and accent tolerant
/// enough for the feed's two spellings of Wednesday and Saturday.
pub fn weekday_index(label: &str) -> Option<usize> {
    let norm = label.trim().to_lowercase();
    WEEKDAYS.iter().position(|w| {
        let wl = w.to_lowercase();
        wl == norm || wl.replace('é', "e").replace('á', "a") == norm
    })
}

/// Group (label, value) pairs and average the values per label, keeping the
/// Monday→Sunday order and dropping labels with no data.
pub fn weekday_means(pairs: &[(String, f64)]) -> (Vec<String>, Vec<f64>) {
    let mut sums = [0.0f64; 7];
    let mut counts = [0u32; 7];
    for (label, value) in pairs {
        if let Some(i) = weekday_index(label) {
            sums[i] += value;
            counts[i] += 1;
        }
    }
    let mut labels = Vec::new();
    let mut means = Vec::new();
    for i in 0..7 {
        if counts[i] > 0 {
            labels.push(WEEKDAYS[i].to_string());
            means.push(sums[i] / counts[i] as f64);
        }
    }
    (labels, means)
}

/// Group (kickoff, value) pairs and average per kickoff hour, sorted by hour.
pub fn kickoff_means(pairs: &[(String, f64)]) -> (Vec<String>, Vec<f64>) {
    let mut grouped: std::collections::BTreeMap<String, (f64, u32)> = std::collections::BTreeMap::new();
    for (hour, value) in pairs {
        let entry = grouped.entry(hour.clone()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    let mut labels = Vec::new();
    let mut means = Vec::new();
    for (hour, (sum, count)) in grouped {
        labels.push(hour);
        means.push(sum / count as f64);
    }
    (labels, means)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_means_keep_monday_first_order() {
        let pairs = vec![
            ("Domingo".to_string(), 100.0),
            ("Lunes".to_string(), 10.0),
            ("Lunes".to_string(), 20.0),
            ("Sabado".to_string(), 50.0),
        ];
        let (labels, means) = weekday_means(&pairs);
        assert_eq!(labels, vec!["Lunes", "Sábado", "Domingo"]);
        assert_eq!(means, vec![15.0, 50.0, 100.0]);
    }

    #[test]
    fn kickoff_means_sort_by_hour() {
        let pairs = vec![
            ("21:00".to_string(), 4.0),
            ("14:00".to_string(), 2.0),
            ("14:00".to_string(), 4.0),
        ];
        let (labels, means) = kickoff_means(&pairs);
        assert_eq!(labels, vec!["14:00", "21:00"]);
        assert_eq!(means, vec![3.0, 4.0]);
    }

    #[test]
    fn unknown_weekday_labels_are_dropped() {
        let (labels, _) = weekday_means(&[("Funday".to_string(), 1.0)]);
        assert!(labels.is_empty());
    }
}
