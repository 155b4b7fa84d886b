//! Estadio / Entradas: match-day general ticketing.

use std::collections::HashMap;

use crate::crests::{crest_path, MatchOutcome};
use crate::kpi::{mean, KpiCard, Polarity, ValueFormat};
use crate::queries::{TicketMatchRow, TicketSectorRow, CURRENT_SEASON, PRIOR_SEASON};
use crate::reports::{
    kickoff_means, weekday_means, Chart, ChartKind, Decoration, ReportPayload, Series, STAND_ORDER,
};

pub fn build(matches: &[TicketMatchRow], sectors: &[TicketSectorRow]) -> ReportPayload {
    let current: Vec<&TicketMatchRow> =
        matches.iter().filter(|m| m.season == CURRENT_SEASON).collect();
    let prior: Vec<&TicketMatchRow> = matches.iter().filter(|m| m.season == PRIOR_SEASON).collect();
    if current.is_empty() {
        return ReportPayload::no_data();
    }

    let sold_now: f64 = current.iter().map(|m| m.sold).sum();
    let sold_then: f64 = prior.iter().map(|m| m.sold).sum();
    let rev_now: f64 = current.iter().map(|m| m.revenue).sum();
    let rev_then: f64 = prior.iter().map(|m| m.revenue).sum();
    let sold_vals: Vec<f64> = current.iter().map(|m| m.sold).collect();
    let sold_vals_then: Vec<f64> = prior.iter().map(|m| m.sold).collect();
    let rev_vals: Vec<f64> = current.iter().map(|m| m.revenue).collect();
    let rev_vals_then: Vec<f64> = prior.iter().map(|m| m.revenue).collect();

    let kpis = vec![
        KpiCard::compare("Entradas Vendidas", sold_now, sold_then, Polarity::HigherIsBetter, ValueFormat::Tickets),
        KpiCard::compare("Entradas por Partido", mean(&sold_vals), mean(&sold_vals_then), Polarity::HigherIsBetter, ValueFormat::Tickets),
        KpiCard::compare("Recaudación Total", rev_now, rev_then, Polarity::HigherIsBetter, ValueFormat::Euros),
        KpiCard::compare("Recaudación por Partido", mean(&rev_vals), mean(&rev_vals_then), Polarity::HigherIsBetter, ValueFormat::Euros),
    ];

    let labels: Vec<String> = current.iter().map(|m| m.opponent.clone()).collect();
    let decorations: Vec<Decoration> = current
        .iter()
        .map(|m| Decoration {
            label: m.opponent.clone(),
            crest: crest_path(&m.opponent),
            color: MatchOutcome::from_result(m.result.as_deref().unwrap_or("")).color().to_string(),
        })
        .collect();

    let mut revenue_chart = Chart::new(
        "entradas-recaudacion",
        "Recaudación por Partido",
        ChartKind::Bar,
        labels.clone(),
        vec![Series::new("Recaudación", rev_vals)],
    );
    revenue_chart.decorations = decorations.clone();

    let mut sold_chart = Chart::new(
        "entradas-vendidas",
        "Entradas Vendidas y No Vendidas",
        ChartKind::GroupedBar,
        labels,
        vec![
            Series::with_hover("Vendidas", sold_vals, stand_hover(&current, sectors, |s| s.sold)),
            Series::with_hover(
                "No Vendidas",
                current.iter().map(|m| m.unsold).collect(),
                stand_hover(&current, sectors, |s| s.unsold),
            ),
        ],
    );
    sold_chart.decorations = decorations;

    let weekday_pairs: Vec<(String, f64)> = current
        .iter()
        .filter_map(|m| m.weekday.clone().map(|d| (d, m.sold)))
        .collect();
    let (wd_labels, wd_means) = weekday_means(&weekday_pairs);
    let weekday_chart = Chart::new(
        "entradas-dia-semana",
        "Media de Entradas por Día de la Semana",
        ChartKind::Bar,
        wd_labels,
        vec![Series::new("Media de entradas", wd_means)],
    );

    let hour_pairs: Vec<(String, f64)> = current
        .iter()
        .filter_map(|m| m.kickoff.clone().map(|h| (h, m.sold)))
        .collect();
    let (h_labels, h_means) = kickoff_means(&hour_pairs);
    let hour_chart = Chart::new(
        "entradas-hora",
        "Media de Entradas por Hora del Partido",
        ChartKind::Bar,
        h_labels,
        vec![Series::new("Media de entradas", h_means)],
    );

    ReportPayload::new(kpis, vec![revenue_chart, sold_chart, weekday_chart, hour_chart])
}

/// Per-match hover text with the per-stand breakdown, one line per stand in
/// the stadium's customary order.
fn stand_hover(
    matches: &[&TicketMatchRow],
    sectors: &[TicketSectorRow],
    pick: fn(&TicketSectorRow) -> f64,
) -> Vec<String> {
    let mut by_match: HashMap<i64, Vec<&TicketSectorRow>> = HashMap::new();
    for s in sectors.iter().filter(|s| s.season == CURRENT_SEASON) {
        by_match.entry(s.match_id).or_default().push(s);
    }
    matches
        .iter()
        .map(|m| match by_match.get(&m.match_id) {
            Some(rows) => STAND_ORDER
                .iter()
                .filter_map(|stand| rows.iter().find(|s| s.stand == *stand))
                .map(|s| format!("{}: {:.0}", s.stand, pick(s)))
                .collect::<Vec<_>>()
                .join("<br>"),
            None => String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::Delta;

    fn row(season: &str, id: i64, opponent: &str, sold: f64, revenue: f64) -> TicketMatchRow {
        TicketMatchRow {
            season: season.to_string(),
            match_id: id,
            schedule: None,
            weekday: Some("Domingo".to_string()),
            kickoff: Some("18:30".to_string()),
            opponent: opponent.to_string(),
            result: Some("1-0".to_string()),
            sold,
            unsold: 100.0,
            revenue,
        }
    }

    #[test]
    fn comparative_cards_and_chart_shapes() {
        let matches = vec![
            row("actual", 1, "Racing", 20_000.0, 300_000.0),
            row("actual", 2, "Mirandés", 18_000.0, 250_000.0),
            row("anterior", 9, "Eibar", 15_000.0, 200_000.0),
        ];
        // Deliberately out of stadium order
        let sector = |stand: &str, sold: f64| TicketSectorRow {
            season: "actual".to_string(),
            match_id: 1,
            stand: stand.to_string(),
            sold,
            unsold: 50.0,
            revenue: 90_000.0,
        };
        let sectors = vec![sector("TRIBUNA", 5_000.0), sector("FONDO MARATHON", 7_000.0)];
        let payload = build(&matches, &sectors);
        assert_eq!(payload.kpis.len(), 4);
        assert_eq!(payload.kpis[0].display_value, "38.000 entradas");
        assert!(matches!(payload.kpis[0].delta, Delta::Percent(_)));
        assert_eq!(payload.charts.len(), 4);
        let sold = &payload.charts[1];
        assert_eq!(sold.labels, vec!["Racing", "Mirandés"]);
        assert_eq!(sold.series[0].hover[0], "FONDO MARATHON: 7000<br>TRIBUNA: 5000");
        assert_eq!(sold.series[0].hover[1], "");
        assert!(sold.decorations[0].crest.is_some());
        assert_eq!(sold.decorations[0].color, "#2ecc71");
    }

    #[test]
    fn empty_current_season_renders_placeholder() {
        let payload = build(&[], &[]);
        assert_eq!(payload.notice.as_deref(), Some("No hay datos disponibles"));
    }
}
