//! Season-over-season comparative KPI cards.
//!
//! Every report page shows the same card shape: current-season value, prior
//! season value, and a percentage delta coloured by whether the movement is an
//! improvement. Most metrics improve upward; late-arriving season-ticket
//! holders improve downward.

use serde::{Deserialize, Serialize};

/// Which direction counts as an improvement for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Visual tone of a card, mapped to CSS classes by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Positive => "kpi-value-positive",
            Tone::Negative => "kpi-value-negative",
        }
    }
}

/// Unit suffix applied when rendering card values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    Count,
    Euros,
    Tickets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delta {
    Percent(f64),
    NotApplicable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiCard {
    pub label: String,
    pub value: f64,
    pub prior: f64,
    pub display_value: String,
    pub display_prior: String,
    pub delta: Delta,
    pub delta_text: String,
    pub tone: Tone,
}

impl KpiCard {
    /// Build a comparative card. `prior > 0` yields a percentage delta;
    /// otherwise the delta is "N/A" and the tone falls back to a direct
    /// current-vs-prior comparison (lower-is-better cards stay positive,
    /// matching the legacy dashboard).
    pub fn compare(label: &str, current: f64, prior: f64, polarity: Polarity, format: ValueFormat) -> Self {
        let (delta, delta_text, tone) = if prior > 0.0 {
            let pct = (current - prior) / prior * 100.0;
            let improved = match polarity {
                Polarity::HigherIsBetter => pct >= 0.0,
                Polarity::LowerIsBetter => pct <= 0.0,
            };
            let text = if pct >= 0.0 { format!("+{:.1}%", pct) } else { format!("{:.1}%", pct) };
            let tone = if improved { Tone::Positive } else { Tone::Negative };
            (Delta::Percent(pct), text, tone)
        } else {
            let tone = match polarity {
                Polarity::HigherIsBetter => {
                    if current >= prior { Tone::Positive } else { Tone::Negative }
                }
                Polarity::LowerIsBetter => Tone::Positive,
            };
            (Delta::NotApplicable("N/A".to_string()), "N/A".to_string(), tone)
        };
        KpiCard {
            label: label.to_string(),
            value: current,
            prior,
            display_value: format_value(current, format),
            display_prior: format!("Temp. 24/25: {}", format_value(prior, format)),
            delta,
            delta_text,
            tone,
        }
    }

    /// Absolute card without a prior-season comparison (retail totals only
    /// exist for the current season).
    pub fn simple(label: &str, value: f64, format: ValueFormat) -> Self {
        KpiCard {
            label: label.to_string(),
            value,
            prior: 0.0,
            display_value: format_value(value, format),
            display_prior: String::new(),
            delta: Delta::NotApplicable("N/A".to_string()),
            delta_text: String::new(),
            tone: Tone::Positive,
        }
    }
}

/// Thousands separator with dots, Spanish style: 1234567 -> "1.234.567".
pub fn format_with_dots(val: f64) -> String {
    let rounded = val.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if negative { format!("-{}", out) } else { out }
}

pub fn format_value(val: f64, format: ValueFormat) -> String {
    match format {
        ValueFormat::Count => format_with_dots(val),
        ValueFormat::Euros => format!("{}€", format_with_dots(val)),
        ValueFormat::Tickets => format!("{} entradas", format_with_dots(val)),
    }
}

/// Mean that tolerates empty slices; report pages treat no-matches as zero.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / values.len() as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_delta_is_improvement_by_default() {
        let card = KpiCard::compare("Recaudación Total", 1200.0, 1000.0, Polarity::HigherIsBetter, ValueFormat::Euros);
        assert_eq!(card.delta, Delta::Percent(20.0));
        assert_eq!(card.delta_text, "+20.0%");
        assert_eq!(card.tone, Tone::Positive);
    }

    #[test]
    fn negative_delta_is_decline_by_default() {
        let card = KpiCard::compare("Entradas", 900.0, 1000.0, Polarity::HigherIsBetter, ValueFormat::Tickets);
        assert_eq!(card.delta_text, "-10.0%");
        assert_eq!(card.tone, Tone::Negative);
    }

    #[test]
    fn inverted_polarity_flips_tone() {
        // More late arrivals than last season is a decline even though the number grew
        let worse = KpiCard::compare("Abonados Tardíos", 150.0, 100.0, Polarity::LowerIsBetter, ValueFormat::Count);
        assert_eq!(worse.delta_text, "+50.0%");
        assert_eq!(worse.tone, Tone::Negative);

        let better = KpiCard::compare("Abonados Tardíos", 80.0, 100.0, Polarity::LowerIsBetter, ValueFormat::Count);
        assert_eq!(better.delta_text, "-20.0%");
        assert_eq!(better.tone, Tone::Positive);
    }

    #[test]
    fn zero_prior_yields_not_applicable() {
        let card = KpiCard::compare("Recaudación", 500.0, 0.0, Polarity::HigherIsBetter, ValueFormat::Euros);
        assert_eq!(card.delta_text, "N/A");
        assert_eq!(card.tone, Tone::Positive);

        let down = KpiCard::compare("Recaudación", -5.0, 0.0, Polarity::HigherIsBetter, ValueFormat::Euros);
        assert_eq!(down.delta_text, "N/A");
        assert_eq!(down.tone, Tone::Negative);

        let inverted = KpiCard::compare("Abonados Tardíos", 12.0, 0.0, Polarity::LowerIsBetter, ValueFormat::Count);
        assert_eq!(inverted.tone, Tone::Positive);
    }

    #[test]
    fn dot_separator_formatting() {
        assert_eq!(format_with_dots(0.0), "0");
        assert_eq!(format_with_dots(999.0), "999");
        assert_eq!(format_with_dots(1000.0), "1.000");
        assert_eq!(format_with_dots(1234567.0), "1.234.567");
        assert_eq!(format_with_dots(-4500.0), "-4.500");
        assert_eq!(format_value(2500.0, ValueFormat::Euros), "2.500€");
        assert_eq!(format_value(120.0, ValueFormat::Tickets), "120 entradas");
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }
}
