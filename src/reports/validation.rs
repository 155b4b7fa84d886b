//! Matchday-by-matchday validation table for the data team.
//!
//! Compares the current season's home matches against the first N home league
//! matches of the prior season, straight from the silver tables rather than
//! the pre-aggregations, so discrepancies in the batch job show up here.

use chrono::NaiveDateTime;

use crate::kpi::format_with_dots;
use crate::queries::{LoanRawRow, TicketingRawRow};

pub const HOME_TEAM: &str = "RC Deportivo";
pub const CURRENT_LABEL: &str = "25/26";
pub const PRIOR_LABEL: &str = "24/25";

/// Current-season home rows, ordered as stored (already sorted by schedule).
pub fn current_tickets<'a>(
    rows: &'a [TicketingRawRow],
    season_start: NaiveDateTime,
) -> Vec<&'a TicketingRawRow> {
    rows.iter()
        .filter(|r| r.home == HOME_TEAM && r.schedule.map(|s| s >= season_start).unwrap_or(false))
        .collect()
}

pub fn prior_tickets<'a>(rows: &'a [TicketingRawRow], ids: &[i64]) -> Vec<&'a TicketingRawRow> {
    rows.iter().filter(|r| ids.contains(&r.match_id)).collect()
}

pub fn current_loans<'a>(rows: &'a [LoanRawRow], season_start: NaiveDateTime) -> Vec<&'a LoanRawRow> {
    rows.iter()
        .filter(|r| r.home == HOME_TEAM && r.schedule.map(|s| s >= season_start).unwrap_or(false))
        .collect()
}

pub fn prior_loans<'a>(rows: &'a [LoanRawRow], ids: &[i64]) -> Vec<&'a LoanRawRow> {
    rows.iter().filter(|r| ids.contains(&r.match_id)).collect()
}

fn fmt(val: f64) -> String {
    format_with_dots(val)
}

fn pct_diff(current: f64, prior: f64) -> String {
    if prior > 0.0 {
        format!("{:+.1}%", (current - prior) / prior * 100.0)
    } else {
        "N/A".to_string()
    }
}

fn date_of(schedule: Option<NaiveDateTime>) -> String {
    schedule.map(|s| s.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "?".to_string())
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn ticket_table(out: &mut String, title: &str, rows: &[&TicketingRawRow]) {
    out.push_str(&"=".repeat(120));
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(120));
    out.push('\n');
    out.push_str(&format!(
        "{:>3} {:>12} {:<22} {:>7} {:>10} {:>10} {:>14} {:>14}\n",
        "J", "Fecha", "Rival", "Result", "Vendidas", "No Vend", "Recaud. Entr.", "Recaud. Ces."
    ));
    out.push_str(&"-".repeat(120));
    out.push('\n');
    for (i, r) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} {:>12} {:<22} {:>7} {:>10} {:>10} {:>14} {:>14}\n",
            i + 1,
            date_of(r.schedule),
            r.opponent,
            r.result.as_deref().unwrap_or("-"),
            fmt(r.sold),
            fmt(r.unsold),
            fmt(r.revenue),
            fmt(r.loan_revenue),
        ));
    }
    out.push_str(&"-".repeat(120));
    out.push('\n');
    let (sold, unsold, rev, loan_rev) = rows.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, r| {
        (acc.0 + r.sold, acc.1 + r.unsold, acc.2 + r.revenue, acc.3 + r.loan_revenue)
    });
    out.push_str(&format!(
        "{:>46} {:>10} {:>10} {:>14} {:>14}\n",
        "TOTAL", fmt(sold), fmt(unsold), fmt(rev), fmt(loan_rev)
    ));
    if !rows.is_empty() {
        let n = rows.len();
        out.push_str(&format!(
            "{:>46} {:>10} {:>10} {:>14} {:>14}\n",
            "PROMEDIO",
            fmt(mean(sold, n)),
            fmt(mean(unsold, n)),
            fmt(mean(rev, n)),
            fmt(mean(loan_rev, n)),
        ));
    }
}

fn loan_table(out: &mut String, title: &str, rows: &[&LoanRawRow]) {
    out.push_str(&"=".repeat(100));
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(100));
    out.push('\n');
    out.push_str(&format!(
        "{:>3} {:>12} {:<22} {:>14} {:>14} {:>12}\n",
        "J", "Fecha", "Rival", "Ces. Vendidas", "Ces. No Vend", "Saldo"
    ));
    out.push_str(&"-".repeat(100));
    out.push('\n');
    for (i, r) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} {:>12} {:<22} {:>14} {:>14} {:>12}\n",
            i + 1,
            date_of(r.schedule),
            r.opponent,
            fmt(r.sold),
            fmt(r.unsold),
            fmt(r.balance),
        ));
    }
    out.push_str(&"-".repeat(100));
    out.push('\n');
    let (sold, unsold, balance) = rows
        .iter()
        .fold((0.0, 0.0, 0.0), |acc, r| (acc.0 + r.sold, acc.1 + r.unsold, acc.2 + r.balance));
    out.push_str(&format!(
        "{:>39} {:>14} {:>14} {:>12}\n",
        "TOTAL", fmt(sold), fmt(unsold), fmt(balance)
    ));
    if !rows.is_empty() {
        let n = rows.len();
        out.push_str(&format!(
            "{:>39} {:>14} {:>14} {:>12}\n",
            "PROMEDIO",
            fmt(mean(sold, n)),
            fmt(mean(unsold, n)),
            fmt(mean(balance, n)),
        ));
    }
}

pub fn render(
    tick_now: &[&TicketingRawRow],
    tick_then: &[&TicketingRawRow],
    loans_now: &[&LoanRawRow],
    loans_then: &[&LoanRawRow],
) -> String {
    let mut out = String::new();
    ticket_table(
        &mut out,
        &format!(
            "TEMPORADA ACTUAL {} — ENTRADAS (Ticketing) — {} partidos como local",
            CURRENT_LABEL,
            tick_now.len()
        ),
        tick_now,
    );
    out.push('\n');
    ticket_table(
        &mut out,
        &format!(
            "TEMPORADA ANTERIOR {} — ENTRADAS (Ticketing) — Primeros {} partidos con datos",
            PRIOR_LABEL,
            tick_then.len()
        ),
        tick_then,
    );
    out.push('\n');
    loan_table(
        &mut out,
        &format!(
            "TEMPORADA ACTUAL {} — CESIONES — {} partidos como local",
            CURRENT_LABEL,
            loans_now.len()
        ),
        loans_now,
    );
    out.push('\n');
    loan_table(
        &mut out,
        &format!(
            "TEMPORADA ANTERIOR {} — CESIONES — Primeros {} partidos con datos",
            PRIOR_LABEL,
            loans_then.len()
        ),
        loans_then,
    );

    out.push('\n');
    out.push_str(&"=".repeat(80));
    out.push('\n');
    out.push_str("RESUMEN COMPARATIVO\n");
    out.push_str(&"=".repeat(80));
    out.push('\n');
    out.push_str(&format!(
        "{:<35} {:>15} {:>15} {:>12}\n",
        "Métrica", CURRENT_LABEL, PRIOR_LABEL, "Diferencia"
    ));
    out.push_str(&"-".repeat(80));
    out.push('\n');

    let sum = |rows: &[&TicketingRawRow], pick: fn(&TicketingRawRow) -> f64| -> f64 {
        rows.iter().map(|r| pick(r)).sum()
    };
    let lsum = |rows: &[&LoanRawRow], pick: fn(&LoanRawRow) -> f64| -> f64 {
        rows.iter().map(|r| pick(r)).sum()
    };
    let metrics: Vec<(&str, f64, f64)> = vec![
        ("Entradas vendidas (total)", sum(tick_now, |r| r.sold), sum(tick_then, |r| r.sold)),
        (
            "Entradas vendidas (promedio)",
            mean(sum(tick_now, |r| r.sold), tick_now.len()),
            mean(sum(tick_then, |r| r.sold), tick_then.len()),
        ),
        ("Entradas no vendidas (total)", sum(tick_now, |r| r.unsold), sum(tick_then, |r| r.unsold)),
        ("Recaudación entradas (total)", sum(tick_now, |r| r.revenue), sum(tick_then, |r| r.revenue)),
        (
            "Recaudación entradas (promedio)",
            mean(sum(tick_now, |r| r.revenue), tick_now.len()),
            mean(sum(tick_then, |r| r.revenue), tick_then.len()),
        ),
        (
            "Recaudación cesiones (total)",
            sum(tick_now, |r| r.loan_revenue),
            sum(tick_then, |r| r.loan_revenue),
        ),
        ("Cesiones vendidas (total)", lsum(loans_now, |r| r.sold), lsum(loans_then, |r| r.sold)),
        (
            "Cesiones no vendidas (total)",
            lsum(loans_now, |r| r.unsold),
            lsum(loans_then, |r| r.unsold),
        ),
        ("Saldo cesiones (total)", lsum(loans_now, |r| r.balance), lsum(loans_then, |r| r.balance)),
    ];
    for (label, now, then) in metrics {
        out.push_str(&format!(
            "{:<35} {:>15} {:>15} {:>12}\n",
            label,
            fmt(now),
            fmt(then),
            pct_diff(now, then)
        ));
    }

    if tick_then.len() < tick_now.len() {
        out.push_str(&format!(
            "\nNOTA: Ticketing temp. anterior tiene datos de {} partidos (faltan {} de los {} esperados)\n",
            tick_then.len(),
            tick_now.len() - tick_then.len(),
            tick_now.len()
        ));
    }
    if loans_then.len() < loans_now.len() {
        out.push_str(&format!(
            "NOTA: Cesiones temp. anterior tiene datos de {} partidos (faltan {} de los {} esperados)\n",
            loans_then.len(),
            loans_now.len() - loans_then.len(),
            loans_now.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap().and_hms_opt(18, 30, 0).unwrap()
    }

    fn tick(id: i64, date: &str, home: &str, sold: f64) -> TicketingRawRow {
        TicketingRawRow {
            match_id: id,
            schedule: Some(dt(date)),
            home: home.to_string(),
            opponent: "Racing".to_string(),
            result: Some("1-0".to_string()),
            season_id: None,
            sold,
            unsold: 100.0,
            revenue: sold * 20.0,
            loan_revenue: 500.0,
        }
    }

    #[test]
    fn season_filters_respect_home_side_and_start_date() {
        let rows = vec![
            tick(1, "2025-08-20", HOME_TEAM, 20_000.0),
            tick(2, "2025-08-25", "Racing", 15_000.0),
            tick(3, "2025-05-10", HOME_TEAM, 18_000.0),
        ];
        let start = dt("2025-08-01");
        let now = current_tickets(&rows, start);
        assert_eq!(now.len(), 1);
        assert_eq!(now[0].match_id, 1);
        let then = prior_tickets(&rows, &[3]);
        assert_eq!(then.len(), 1);
    }

    #[test]
    fn render_includes_totals_and_missing_data_note() {
        let rows = vec![
            tick(1, "2025-08-20", HOME_TEAM, 20_000.0),
            tick(2, "2025-09-02", HOME_TEAM, 10_000.0),
            tick(3, "2024-08-18", HOME_TEAM, 12_000.0),
        ];
        let now = current_tickets(&rows, dt("2025-08-01"));
        let then = prior_tickets(&rows, &[3]);
        let report = render(&now, &then, &[], &[]);
        assert!(report.contains("RESUMEN COMPARATIVO"));
        assert!(report.contains("30.000"));
        assert!(report.contains("+150.0%"));
        assert!(report.contains("faltan 1 de los 2 esperados"));
    }

    #[test]
    fn zero_prior_shows_na_difference() {
        let rows = vec![tick(1, "2025-08-20", HOME_TEAM, 5_000.0)];
        let now = current_tickets(&rows, dt("2025-08-01"));
        let report = render(&now, &[], &[], &[]);
        assert!(report.contains("N/A"));
    }
}
