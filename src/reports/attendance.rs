//! Estadio / Asistencia: season-ticket-holder attendance.

use crate::crests::{crest_path, MatchOutcome};
use crate::kpi::{KpiCard, Polarity, ValueFormat};
use crate::queries::{
    AttendanceAgeRow, AttendanceKpiRow, AttendanceMatchRow, AttendanceSectorRow,
    AttendanceStreakRow, CURRENT_SEASON, PRIOR_SEASON,
};
use crate::reports::{Chart, ChartKind, Decoration, ReportPayload, Series};

pub fn build(
    kpi_rows: &[AttendanceKpiRow],
    sectors: &[AttendanceSectorRow],
    streaks: &[AttendanceStreakRow],
    matches: &[AttendanceMatchRow],
    ages: &[AttendanceAgeRow],
) -> ReportPayload {
    let now = kpi_rows.iter().find(|r| r.season == CURRENT_SEASON);
    let then = kpi_rows.iter().find(|r| r.season == PRIOR_SEASON);
    let now = match now {
        Some(row) => row,
        None => return ReportPayload::no_data(),
    };
    let zero = AttendanceKpiRow {
        season: PRIOR_SEASON.to_string(),
        avg_attendees: 0.0,
        attendance_pct: 0.0,
        male_count: 0.0,
        male_pct: 0.0,
        female_count: 0.0,
        female_pct: 0.0,
        avg_age: 0.0,
        avg_late: 0.0,
        late_pct: 0.0,
    };
    let then = then.unwrap_or(&zero);

    let mut attendance = KpiCard::compare(
        "Abonados por Partido",
        now.avg_attendees,
        then.avg_attendees,
        Polarity::HigherIsBetter,
        ValueFormat::Count,
    );
    attendance.display_value = format!("{} ({:.1}%)", attendance.display_value, now.attendance_pct);

    let mut late = KpiCard::compare(
        "Abonados Tardíos",
        now.avg_late,
        then.avg_late,
        Polarity::LowerIsBetter,
        ValueFormat::Count,
    );
    late.display_value = format!("{} ({:.1}%)", late.display_value, now.late_pct);

    let mut men = KpiCard::compare("Hombres", now.male_count, then.male_count, Polarity::HigherIsBetter, ValueFormat::Count);
    men.display_value = format!("{} ({:.1}%)", men.display_value, now.male_pct);
    let mut women = KpiCard::compare("Mujeres", now.female_count, then.female_count, Polarity::HigherIsBetter, ValueFormat::Count);
    women.display_value = format!("{} ({:.1}%)", women.display_value, now.female_pct);

    let kpis = vec![
        attendance,
        men,
        women,
        KpiCard::compare("Edad Media", now.avg_age, then.avg_age, Polarity::HigherIsBetter, ValueFormat::Count),
        late,
    ];

    let sector_chart = Chart::new(
        "asistencia-sector",
        "% de Asistencia por Grada",
        ChartKind::Bar,
        sectors.iter().map(|s| s.stand.clone()).collect(),
        vec![Series::with_hover(
            "% asistencia",
            sectors.iter().map(|s| s.attendance_pct).collect(),
            sectors.iter().map(|s| format!("{:.0} abonados", s.attendees)).collect(),
        )],
    );

    let mut streak_chart = Chart::new(
        "asistencia-consecutiva",
        "Abonados con Asistencia Consecutiva",
        ChartKind::Bar,
        streaks.iter().map(|s| format!("J{}", s.matchday)).collect(),
        vec![Series::with_hover(
            "Abonados",
            streaks.iter().map(|s| s.streak_members).collect(),
            streaks.iter().map(|s| s.opponent.clone()).collect(),
        )],
    );
    streak_chart.decorations = streaks
        .iter()
        .map(|s| Decoration {
            label: format!("J{}", s.matchday),
            crest: crest_path(&s.opponent),
            color: MatchOutcome::from_result(s.result.as_deref().unwrap_or("")).color().to_string(),
        })
        .collect();

    let match_chart = Chart::new(
        "asistencia-partido",
        "Espectadores Totales y Abonados Asistentes",
        ChartKind::Line,
        matches.iter().map(|m| m.opponent.clone()).collect(),
        vec![
            Series::new("Espectadores", matches.iter().map(|m| m.spectators).collect()),
            Series::new("Abonados", matches.iter().map(|m| m.members).collect()),
        ],
    );

    let age_chart = Chart::new(
        "asistencia-edad",
        "Asistentes por Grupo de Edad",
        ChartKind::Bar,
        ages.iter().map(|a| a.age_group.clone()).collect(),
        vec![Series::with_hover(
            "Asistentes",
            ages.iter().map(|a| a.attendees).collect(),
            ages.iter().map(|a| format!("{:.1}%", a.pct)).collect(),
        )],
    );

    ReportPayload::new(kpis, vec![sector_chart, streak_chart, match_chart, age_chart])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::Tone;

    fn kpi_row(season: &str, avg: f64, late: f64) -> AttendanceKpiRow {
        AttendanceKpiRow {
            season: season.to_string(),
            avg_attendees: avg,
            attendance_pct: 82.0,
            male_count: 14_000.0,
            male_pct: 70.0,
            female_count: 6_000.0,
            female_pct: 30.0,
            avg_age: 44.0,
            avg_late: late,
            late_pct: 6.0,
        }
    }

    #[test]
    fn late_arrivals_card_is_inverted() {
        let rows = vec![kpi_row("actual", 20_000.0, 900.0), kpi_row("anterior", 19_000.0, 700.0)];
        let payload = build(&rows, &[], &[], &[], &[]);
        let late = payload.kpis.iter().find(|k| k.label == "Abonados Tardíos").unwrap();
        // Went up, and up is bad for this card
        assert_eq!(late.tone, Tone::Negative);
        assert!(late.delta_text.starts_with('+'));
        let att = &payload.kpis[0];
        assert_eq!(att.tone, Tone::Positive);
        assert!(att.display_value.contains("(82.0%)"));
    }

    #[test]
    fn missing_current_season_gives_placeholder() {
        let rows = vec![kpi_row("anterior", 19_000.0, 700.0)];
        assert!(build(&rows, &[], &[], &[], &[]).notice.is_some());
    }

    #[test]
    fn streak_chart_uses_matchday_labels() {
        let rows = vec![kpi_row("actual", 20_000.0, 900.0)];
        let streaks = vec![AttendanceStreakRow {
            matchday: 3,
            opponent: "Racing".to_string(),
            result: Some("2-0".to_string()),
            streak_members: 8_500.0,
        }];
        let payload = build(&rows, &[], &streaks, &[], &[]);
        let chart = payload.charts.iter().find(|c| c.id == "asistencia-consecutiva").unwrap();
        assert_eq!(chart.labels, vec!["J3"]);
        assert_eq!(chart.decorations[0].color, "#2ecc71");
    }
}
