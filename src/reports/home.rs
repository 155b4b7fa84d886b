//! Landing page: one revenue summary card per business area.

use crate::kpi::{KpiCard, ValueFormat};
use crate::queries::{HospitalityMatchRow, RetailKpiRow, TicketMatchRow, CURRENT_SEASON};
use crate::reports::ReportPayload;
use crate::sections::Section;

pub const MUSEUM_STUB: &str = "Pendiente de desarrollo";

/// Section card: current-season revenue when the area has data, a greyed
/// "Sin datos" card when it does not.
fn summary_card(section: Section, revenue: Option<f64>) -> KpiCard {
    match revenue {
        Some(total) => KpiCard::simple(section.label(), total, ValueFormat::Euros),
        None => {
            let mut card = KpiCard::simple(section.label(), 0.0, ValueFormat::Euros);
            card.display_value = "Sin datos".to_string();
            card
        }
    }
}

pub fn build(
    tickets: &[TicketMatchRow],
    hospitality: &[HospitalityMatchRow],
    retail: &[RetailKpiRow],
) -> ReportPayload {
    let stadium: f64 = tickets
        .iter()
        .filter(|m| m.season == CURRENT_SEASON)
        .map(|m| m.revenue)
        .sum();
    let bars: f64 = hospitality
        .iter()
        .filter(|m| m.season == CURRENT_SEASON)
        .map(|m| m.revenue)
        .sum();
    let kpis = vec![
        summary_card(Section::Stadium, (stadium > 0.0).then_some(stadium)),
        summary_card(Section::Museum, None),
        summary_card(Section::Retail, retail.first().map(|r| r.revenue_total)),
        summary_card(Section::Hospitality, (bars > 0.0).then_some(bars)),
    ];
    ReportPayload::new(kpis, Vec::new())
}

/// The museum section has no data feed yet.
pub fn museum() -> ReportPayload {
    ReportPayload::stub(MUSEUM_STUB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_without_data_render_greyed_cards() {
        let tickets = vec![TicketMatchRow {
            season: "actual".to_string(),
            match_id: 1,
            schedule: None,
            weekday: None,
            kickoff: None,
            opponent: "Racing".to_string(),
            result: None,
            sold: 100.0,
            unsold: 10.0,
            revenue: 25_000.0,
        }];
        let payload = build(&tickets, &[], &[]);
        assert_eq!(payload.kpis.len(), 4);
        assert_eq!(payload.kpis[0].display_value, "25.000€");
        assert_eq!(payload.kpis[1].display_value, "Sin datos");
        assert_eq!(payload.kpis[3].display_value, "Sin datos");
    }

    #[test]
    fn museum_is_a_stub() {
        assert_eq!(museum().notice.as_deref(), Some(MUSEUM_STUB));
    }
}
