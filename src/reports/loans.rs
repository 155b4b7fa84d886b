//! Estadio / Cesiones: the season-ticket seat-loan secondary market.

use std::collections::HashMap;

use crate::crests::{crest_path, MatchOutcome};
use crate::kpi::{mean, KpiCard, Polarity, ValueFormat};
use crate::queries::{LoanMatchRow, LoanRevenueRow, TicketSectorRow, CURRENT_SEASON, PRIOR_SEASON};
use crate::reports::{
    kickoff_means, weekday_means, Chart, ChartKind, Decoration, ReportPayload, Series, STAND_ORDER,
};

pub fn build(
    matches: &[LoanMatchRow],
    revenue: &[LoanRevenueRow],
    sectors: &[TicketSectorRow],
) -> ReportPayload {
    let current: Vec<&LoanMatchRow> = matches.iter().filter(|m| m.season == CURRENT_SEASON).collect();
    let prior: Vec<&LoanMatchRow> = matches.iter().filter(|m| m.season == PRIOR_SEASON).collect();
    if current.is_empty() {
        return ReportPayload::no_data();
    }
    let rev_now: Vec<&LoanRevenueRow> = revenue.iter().filter(|r| r.season == CURRENT_SEASON).collect();
    let rev_then: Vec<&LoanRevenueRow> = revenue.iter().filter(|r| r.season == PRIOR_SEASON).collect();

    let loans_now: f64 = current.iter().map(|m| m.total_loans).sum();
    let loans_then: f64 = prior.iter().map(|m| m.total_loans).sum();
    let sold_now: f64 = current.iter().map(|m| m.sold).sum();
    let sold_then: f64 = prior.iter().map(|m| m.sold).sum();
    let revenue_now: f64 = rev_now.iter().map(|r| r.revenue).sum();
    let revenue_then: f64 = rev_then.iter().map(|r| r.revenue).sum();
    let per_loan_now = if sold_now > 0.0 { revenue_now / sold_now } else { 0.0 };
    let per_loan_then = if sold_then > 0.0 { revenue_then / sold_then } else { 0.0 };

    let kpis = vec![
        KpiCard::compare("Cesiones Generadas", loans_now, loans_then, Polarity::HigherIsBetter, ValueFormat::Count),
        KpiCard::compare("Cesiones Vendidas", sold_now, sold_then, Polarity::HigherIsBetter, ValueFormat::Count),
        KpiCard::compare("Recaudación Media por Cesión", per_loan_now, per_loan_then, Polarity::HigherIsBetter, ValueFormat::Euros),
        KpiCard::compare("Recaudación Total", revenue_now, revenue_then, Polarity::HigherIsBetter, ValueFormat::Euros),
    ];

    let rev_labels: Vec<String> = rev_now.iter().map(|r| r.opponent.clone()).collect();
    let rev_ids: Vec<i64> = rev_now.iter().map(|r| r.match_id).collect();
    let mut revenue_chart = Chart::new(
        "cesiones-recaudacion",
        "Recaudación por Partido",
        ChartKind::Bar,
        rev_labels,
        vec![Series::with_hover(
            "Recaudación",
            rev_now.iter().map(|r| r.revenue).collect(),
            stand_hover(&rev_ids, sectors, |s| s.revenue, true),
        )],
    );
    revenue_chart.decorations = rev_now
        .iter()
        .map(|r| Decoration {
            label: r.opponent.clone(),
            crest: crest_path(&r.opponent),
            color: MatchOutcome::from_result(r.result.as_deref().unwrap_or("")).color().to_string(),
        })
        .collect();

    let labels: Vec<String> = current.iter().map(|m| m.opponent.clone()).collect();
    let ids: Vec<i64> = current.iter().map(|m| m.match_id).collect();
    let mut sold_chart = Chart::new(
        "cesiones-vendidas",
        "Cesiones Vendidas y No Vendidas",
        ChartKind::GroupedBar,
        labels,
        vec![
            Series::with_hover(
                "Vendidas",
                current.iter().map(|m| m.sold).collect(),
                stand_hover(&ids, sectors, |s| s.sold, false),
            ),
            Series::with_hover(
                "No Vendidas",
                current.iter().map(|m| m.unsold).collect(),
                stand_hover(&ids, sectors, |s| s.unsold, false),
            ),
        ],
    );
    sold_chart.decorations = current
        .iter()
        .map(|m| Decoration {
            label: m.opponent.clone(),
            crest: crest_path(&m.opponent),
            color: MatchOutcome::from_result(m.result.as_deref().unwrap_or("")).color().to_string(),
        })
        .collect();

    let weekday_pairs: Vec<(String, f64)> = current
        .iter()
        .filter_map(|m| m.weekday.clone().map(|d| (d, m.sold)))
        .collect();
    let (wd_labels, wd_means) = weekday_means(&weekday_pairs);
    let weekday_chart = Chart::new(
        "cesiones-dia-semana",
        "Media de Cesiones Vendidas por Día de la Semana",
        ChartKind::Bar,
        wd_labels,
        vec![Series::new("Media de cesiones", wd_means)],
    );

    let hour_pairs: Vec<(String, f64)> = current
        .iter()
        .filter_map(|m| m.kickoff.clone().map(|h| (h, m.sold)))
        .collect();
    let (h_labels, h_means) = kickoff_means(&hour_pairs);
    let hour_chart = Chart::new(
        "cesiones-hora",
        "Media de Cesiones Vendidas por Hora del Partido",
        ChartKind::Bar,
        h_labels,
        vec![Series::new("Media de cesiones", h_means)],
    );

    ReportPayload::new(kpis, vec![revenue_chart, sold_chart, weekday_chart, hour_chart])
}

fn stand_hover(
    match_ids: &[i64],
    sectors: &[TicketSectorRow],
    pick: fn(&TicketSectorRow) -> f64,
    euros: bool,
) -> Vec<String> {
    let mut by_match: HashMap<i64, Vec<&TicketSectorRow>> = HashMap::new();
    for s in sectors.iter().filter(|s| s.season == CURRENT_SEASON) {
        by_match.entry(s.match_id).or_default().push(s);
    }
    match_ids
        .iter()
        .map(|id| match by_match.get(id) {
            Some(rows) => STAND_ORDER
                .iter()
                .filter_map(|stand| rows.iter().find(|s| s.stand == *stand))
                .map(|s| {
                    if euros {
                        format!("{}: {:.0}€", s.stand, pick(s))
                    } else {
                        format!("{}: {:.0}", s.stand, pick(s))
                    }
                })
                .collect::<Vec<_>>()
                .join("<br>"),
            None => String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(season: &str, id: i64, opponent: &str, total: f64, sold: f64, unsold: f64) -> LoanMatchRow {
        LoanMatchRow {
            season: season.to_string(),
            match_id: id,
            schedule: None,
            weekday: Some("Sábado".to_string()),
            kickoff: Some("21:00".to_string()),
            opponent: opponent.to_string(),
            result: Some("0-0".to_string()),
            total_loans: total,
            sold,
            unsold,
            balance: 0.0,
        }
    }

    fn r(season: &str, id: i64, opponent: &str, revenue: f64) -> LoanRevenueRow {
        LoanRevenueRow {
            season: season.to_string(),
            match_id: id,
            schedule: None,
            opponent: opponent.to_string(),
            result: Some("0-0".to_string()),
            revenue,
        }
    }

    #[test]
    fn mean_revenue_per_loan_uses_sold_count() {
        let matches = vec![m("actual", 1, "Cádiz", 900.0, 600.0, 300.0), m("anterior", 2, "Huesca", 800.0, 400.0, 400.0)];
        let revenue = vec![r("actual", 1, "Cádiz", 12_000.0), r("anterior", 2, "Huesca", 10_000.0)];
        let sectors = vec![
            TicketSectorRow {
                season: "actual".to_string(),
                match_id: 1,
                stand: "TRIBUNA".to_string(),
                sold: 150.0,
                unsold: 20.0,
                revenue: 3_000.0,
            },
            TicketSectorRow {
                season: "actual".to_string(),
                match_id: 1,
                stand: "PREFERENCIA".to_string(),
                sold: 200.0,
                unsold: 30.0,
                revenue: 4_000.0,
            },
        ];
        let payload = build(&matches, &revenue, &sectors);
        assert_eq!(payload.kpis[2].value, 20.0);
        assert_eq!(payload.kpis[2].prior, 25.0);
        assert_eq!(payload.kpis[2].tone, crate::kpi::Tone::Negative);
        assert_eq!(payload.charts[1].series[0].values, vec![600.0]);
        assert_eq!(payload.charts[1].decorations[0].color, "#f39c12");
        // Hover lists stands in the customary order
        assert_eq!(payload.charts[1].series[0].hover[0], "PREFERENCIA: 200<br>TRIBUNA: 150");
        assert_eq!(payload.charts[0].series[0].hover[0], "PREFERENCIA: 4000€<br>TRIBUNA: 3000€");
    }

    #[test]
    fn zero_sold_loans_do_not_divide_by_zero() {
        let matches = vec![m("actual", 1, "Córdoba", 100.0, 0.0, 100.0)];
        let payload = build(&matches, &[], &[]);
        assert_eq!(payload.kpis[2].value, 0.0);
    }
}
