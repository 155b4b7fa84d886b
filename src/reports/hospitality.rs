//! Dépor Hostelería: stadium food and drink concessions.
//!
//! The page has two modes. The global view compares the season against the
//! prior one; picking a kickoff slot instead compares that slot's per-match
//! means against the all-slot means.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::crests::{crest_path, MatchOutcome};
use crate::kpi::{mean, KpiCard, Polarity, ValueFormat};
use crate::queries::{
    HospitalityMatchRow, HospitalityOutletRow, HospitalityPaymentRow, HospitalityProductOutletRow,
    HospitalityProductRow, CURRENT_SEASON, PRIOR_SEASON,
};
use crate::reports::{Chart, ChartKind, Decoration, ReportPayload, Series};

/// Kickoff slots. Fixtures only ever start at a handful of hours, so slots are
/// defined by exact kickoff strings rather than ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Mediodia,
    Tarde,
    Noche,
}

pub const ALL_SLOTS: [Slot; 3] = [Slot::Mediodia, Slot::Tarde, Slot::Noche];

impl Slot {
    pub fn kickoffs(self) -> &'static [&'static str] {
        match self {
            Slot::Mediodia => &["14:00", "16:15"],
            Slot::Tarde => &["17:00", "18:30", "19:00"],
            Slot::Noche => &["20:30", "21:00"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Mediodia => "Mediodía",
            Slot::Tarde => "Tarde",
            Slot::Noche => "Noche",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Slot::Mediodia => "mediodia",
            Slot::Tarde => "tarde",
            Slot::Noche => "noche",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Slot> {
        ALL_SLOTS.iter().copied().find(|s| s.slug() == slug)
    }

    pub fn classify(kickoff: &str) -> Option<Slot> {
        ALL_SLOTS.iter().copied().find(|s| s.kickoffs().contains(&kickoff))
    }
}

/// Products counted as drinks when any keyword appears in the name.
const DRINK_KEYWORDS: [&str; 18] = [
    "agua", "aquarius", "botella", "café", "caña", "cerveza", "clara", "coca", "colacao",
    "copa vino", "descafeinado", "estrella tostada", "fanta", "gintonic", "nestea", "ron",
    "tónica", "zumo",
];

/// Merchandise sold over the counters; kept out of consumption charts.
const EXCLUDED_KEYWORDS: [&str; 2] = ["vaso depor", "bufanda"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductCategory {
    Drink,
    Food,
    Excluded,
}

pub fn classify_product(name: &str) -> ProductCategory {
    let lower = name.to_lowercase();
    if EXCLUDED_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return ProductCategory::Excluded;
    }
    if DRINK_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return ProductCategory::Drink;
    }
    ProductCategory::Food
}

/// Collapse point-of-sale name variants onto one product.
pub fn normalize_product(name: &str) -> &str {
    match name {
        "Agua Cabreiroá" => "Agua Cabreiroa",
        "Aquarius Limón" => "Aquarius",
        "Café Cortado" | "Café con leche" | "Café de Pota" => "Café",
        "Coca-Cola" => "Coca Cola",
        "Coca-Cola Zero" => "Coca Cola Zero",
        "Cerveza tostada 0'0" | "Estrella Tostada 0'0" => "Tostada 0'0",
        other => other,
    }
}

pub fn build(
    matches: &[HospitalityMatchRow],
    products: &[HospitalityProductRow],
    outlets: &[HospitalityOutletRow],
    product_outlets: &[HospitalityProductOutletRow],
    payments: &[HospitalityPaymentRow],
    slot: Option<Slot>,
) -> ReportPayload {
    let current: Vec<&HospitalityMatchRow> =
        matches.iter().filter(|m| m.season == CURRENT_SEASON).collect();
    if current.is_empty() {
        return ReportPayload::no_data();
    }
    let in_slot = |kickoff: &Option<String>| match (slot, kickoff) {
        (None, _) => true,
        (Some(s), Some(k)) => Slot::classify(k) == Some(s),
        (Some(_), None) => false,
    };

    let kpis = match slot {
        None => global_kpis(&current, matches),
        Some(s) => slot_kpis(&current, s),
    };

    let shown: Vec<&&HospitalityMatchRow> = current.iter().filter(|m| in_slot(&m.kickoff)).collect();
    let labels: Vec<String> = shown.iter().map(|m| m.opponent.clone()).collect();
    let mut revenue_chart = Chart::new(
        "hosteleria-recaudacion",
        "Recaudación por Partido",
        ChartKind::Bar,
        labels,
        vec![Series::with_hover(
            "Recaudación",
            shown.iter().map(|m| m.revenue).collect(),
            shown.iter().map(|m| format!("{:.0} pedidos", m.orders)).collect(),
        )],
    );
    revenue_chart.decorations = shown
        .iter()
        .map(|m| Decoration {
            label: m.opponent.clone(),
            crest: crest_path(&m.opponent),
            color: MatchOutcome::from_result(m.result.as_deref().unwrap_or("")).color().to_string(),
        })
        .collect();

    let payment_charts = payment_charts(payments, &current);
    let product_chart = top_products_chart(products, &in_slot);
    let outlet_chart = outlets_chart(outlets, product_outlets, &in_slot);
    let slot_chart = slot_means_chart(&current);

    let mut charts = vec![revenue_chart];
    charts.extend(payment_charts);
    charts.push(product_chart);
    charts.push(outlet_chart);
    charts.push(slot_chart);
    ReportPayload::new(kpis, charts)
}

fn global_kpis(current: &[&HospitalityMatchRow], all: &[HospitalityMatchRow]) -> Vec<KpiCard> {
    let prior: Vec<&HospitalityMatchRow> = all.iter().filter(|m| m.season == PRIOR_SEASON).collect();
    let orders_now: f64 = current.iter().map(|m| m.orders).sum();
    let orders_then: f64 = prior.iter().map(|m| m.orders).sum();
    let rev_now: f64 = current.iter().map(|m| m.revenue).sum();
    let rev_then: f64 = prior.iter().map(|m| m.revenue).sum();
    let ticket_now = if orders_now > 0.0 { rev_now / orders_now } else { 0.0 };
    let ticket_then = if orders_then > 0.0 { rev_then / orders_then } else { 0.0 };
    let orders_mean_now = mean(&current.iter().map(|m| m.orders).collect::<Vec<_>>());
    let orders_mean_then = mean(&prior.iter().map(|m| m.orders).collect::<Vec<_>>());
    let rev_mean_now = mean(&current.iter().map(|m| m.revenue).collect::<Vec<_>>());
    let rev_mean_then = mean(&prior.iter().map(|m| m.revenue).collect::<Vec<_>>());
    vec![
        KpiCard::compare("Total Pedidos", orders_now, orders_then, Polarity::HigherIsBetter, ValueFormat::Count),
        KpiCard::compare("Promedio de Pedidos", orders_mean_now, orders_mean_then, Polarity::HigherIsBetter, ValueFormat::Count),
        KpiCard::compare("Ticket Medio", ticket_now, ticket_then, Polarity::HigherIsBetter, ValueFormat::Euros),
        KpiCard::compare("Recaudación Total", rev_now, rev_then, Polarity::HigherIsBetter, ValueFormat::Euros),
        KpiCard::compare("Recaudación Promedio", rev_mean_now, rev_mean_then, Polarity::HigherIsBetter, ValueFormat::Euros),
    ]
}

/// Slot cards compare the slot's per-match means against the all-slot means,
/// so the "prior" on each card is the global mean rather than last season.
fn slot_kpis(current: &[&HospitalityMatchRow], slot: Slot) -> Vec<KpiCard> {
    let slot_rows: Vec<&&HospitalityMatchRow> = current
        .iter()
        .filter(|m| m.kickoff.as_deref().and_then(Slot::classify) == Some(slot))
        .collect();
    let orders_slot = mean(&slot_rows.iter().map(|m| m.orders).collect::<Vec<_>>());
    let orders_all = mean(&current.iter().map(|m| m.orders).collect::<Vec<_>>());
    let rev_slot = mean(&slot_rows.iter().map(|m| m.revenue).collect::<Vec<_>>());
    let rev_all = mean(&current.iter().map(|m| m.revenue).collect::<Vec<_>>());
    let ticket = |rows: &[f64], orders: &[f64]| {
        let o: f64 = orders.iter().sum();
        if o > 0.0 { rows.iter().sum::<f64>() / o } else { 0.0 }
    };
    let ticket_slot = ticket(
        &slot_rows.iter().map(|m| m.revenue).collect::<Vec<_>>(),
        &slot_rows.iter().map(|m| m.orders).collect::<Vec<_>>(),
    );
    let ticket_all = ticket(
        &current.iter().map(|m| m.revenue).collect::<Vec<_>>(),
        &current.iter().map(|m| m.orders).collect::<Vec<_>>(),
    );

    let vs_global = |label: &str, value: f64, baseline: f64, format: ValueFormat| {
        let mut card = KpiCard::compare(label, value, baseline, Polarity::HigherIsBetter, format);
        card.display_prior = format!("Media global: {}", crate::kpi::format_value(baseline, format));
        card
    };
    vec![
        vs_global(&format!("Pedidos por Partido ({})", slot.label()), orders_slot, orders_all, ValueFormat::Count),
        vs_global(&format!("Ticket Medio ({})", slot.label()), ticket_slot, ticket_all, ValueFormat::Euros),
        vs_global(&format!("Recaudación por Partido ({})", slot.label()), rev_slot, rev_all, ValueFormat::Euros),
    ]
}

/// Point-of-sale method keys in bar-stacking order.
const METHOD_ORDER: [&str; 3] = ["cash", "credit_card", "club_card"];

/// Display names for the point-of-sale method keys. `club_card` is the club's
/// own prepaid card, branded moeDÉiro.
fn method_label(method: &str) -> &str {
    match method {
        "cash" => "Efectivo",
        "credit_card" => "Tarjeta",
        "club_card" => "moeDÉiro",
        other => other,
    }
}

fn payment_charts(payments: &[HospitalityPaymentRow], matches: &[&HospitalityMatchRow]) -> Vec<Chart> {
    let current: Vec<&HospitalityPaymentRow> =
        payments.iter().filter(|p| p.season == CURRENT_SEASON).collect();
    let mut methods: Vec<String> = METHOD_ORDER
        .iter()
        .filter(|m| current.iter().any(|p| p.payment_method == **m))
        .map(|m| m.to_string())
        .collect();
    for p in &current {
        if !methods.contains(&p.payment_method) {
            methods.push(p.payment_method.clone());
        }
    }
    // Rows arrive schedule-sorted; keep one label per match in that order
    let mut match_ids: Vec<i64> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut totals: HashMap<(i64, &str), f64> = HashMap::new();
    let mut method_totals: HashMap<&str, f64> = HashMap::new();
    for p in &current {
        if !match_ids.contains(&p.match_id) {
            match_ids.push(p.match_id);
            labels.push(p.opponent.clone());
        }
        *totals.entry((p.match_id, p.payment_method.as_str())).or_insert(0.0) += p.revenue;
        *method_totals.entry(p.payment_method.as_str()).or_insert(0.0) += p.revenue;
    }
    let series: Vec<Series> = methods
        .iter()
        .map(|m| {
            Series::new(
                method_label(m),
                match_ids.iter().map(|id| totals.get(&(*id, m.as_str())).copied().unwrap_or(0.0)).collect(),
            )
        })
        .collect();
    let mut stacked = Chart::new(
        "hosteleria-pago-partido",
        "Método de Pago por Partido",
        ChartKind::StackedBar,
        labels.clone(),
        series,
    );
    stacked.decorations = match_ids
        .iter()
        .zip(&labels)
        .map(|(id, opponent)| {
            let result = matches
                .iter()
                .find(|m| m.match_id == *id)
                .and_then(|m| m.result.as_deref())
                .unwrap_or("");
            Decoration {
                label: opponent.clone(),
                crest: crest_path(opponent),
                color: MatchOutcome::from_result(result).color().to_string(),
            }
        })
        .collect();
    vec![
        stacked,
        Chart::new(
            "hosteleria-pago-total",
            "Distribución por Método de Pago",
            ChartKind::Pie,
            methods.iter().map(|m| method_label(m).to_string()).collect(),
            vec![Series::new(
                "Recaudación",
                methods.iter().map(|m| method_totals.get(m.as_str()).copied().unwrap_or(0.0)).collect(),
            )],
        ),
    ]
}

fn top_products_chart(products: &[HospitalityProductRow], in_slot: &dyn Fn(&Option<String>) -> bool) -> Chart {
    let mut merged: HashMap<&str, (f64, f64)> = HashMap::new();
    for p in products.iter().filter(|p| in_slot(&p.kickoff)) {
        if classify_product(&p.product) == ProductCategory::Excluded {
            continue;
        }
        let entry = merged.entry(normalize_product(&p.product)).or_insert((0.0, 0.0));
        entry.0 += p.quantity;
        entry.1 += p.revenue;
    }
    let mut rows: Vec<(&str, f64, f64)> =
        merged.into_iter().map(|(name, (qty, rev))| (name, qty, rev)).collect();
    rows.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(15);
    Chart::new(
        "hosteleria-productos",
        "Productos Más Vendidos",
        ChartKind::Bar,
        rows.iter().map(|(name, _, _)| name.to_string()).collect(),
        vec![Series::with_hover(
            "Recaudación",
            rows.iter().map(|(_, _, rev)| *rev).collect(),
            rows.iter()
                .map(|(name, qty, _)| {
                    let cat = match classify_product(name) {
                        ProductCategory::Drink => "Bebida",
                        _ => "Comestible",
                    };
                    format!("{} · {:.0} uds", cat, qty)
                })
                .collect(),
        )],
    )
}

fn outlets_chart(
    outlets: &[HospitalityOutletRow],
    product_outlets: &[HospitalityProductOutletRow],
    in_slot: &dyn Fn(&Option<String>) -> bool,
) -> Chart {
    let mut merged: HashMap<&str, f64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for o in outlets.iter().filter(|o| in_slot(&o.kickoff)) {
        if !merged.contains_key(o.outlet.as_str()) {
            order.push(&o.outlet);
        }
        *merged.entry(o.outlet.as_str()).or_insert(0.0) += o.revenue;
    }
    order.sort_by(|a, b| {
        merged[b].partial_cmp(&merged[a]).unwrap_or(std::cmp::Ordering::Equal)
    });

    // Top three products per outlet for the hover
    let mut per_outlet: HashMap<&str, HashMap<&str, f64>> = HashMap::new();
    for po in product_outlets.iter().filter(|po| in_slot(&po.kickoff)) {
        *per_outlet
            .entry(po.outlet.as_str())
            .or_default()
            .entry(normalize_product(&po.product))
            .or_insert(0.0) += po.quantity;
    }
    let hover: Vec<String> = order
        .iter()
        .map(|outlet| match per_outlet.get(*outlet) {
            Some(products) => {
                let mut top: Vec<(&&str, &f64)> = products.iter().collect();
                top.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
                top.iter()
                    .take(3)
                    .map(|(name, qty)| format!("{}: {:.0}", name, qty))
                    .collect::<Vec<_>>()
                    .join("<br>")
            }
            None => String::new(),
        })
        .collect();

    Chart::new(
        "hosteleria-cantinas",
        "Recaudación por Cantina",
        ChartKind::Bar,
        order.iter().map(|o| o.to_string()).collect(),
        vec![Series::with_hover(
            "Recaudación",
            order.iter().map(|o| merged[o]).collect(),
            hover,
        )],
    )
}

fn slot_means_chart(current: &[&HospitalityMatchRow]) -> Chart {
    let mut rev_means = Vec::new();
    let mut ticket_means = Vec::new();
    for slot in ALL_SLOTS {
        let rows: Vec<&&HospitalityMatchRow> = current
            .iter()
            .filter(|m| m.kickoff.as_deref().and_then(Slot::classify) == Some(slot))
            .collect();
        rev_means.push(mean(&rows.iter().map(|m| m.revenue).collect::<Vec<_>>()));
        let orders: f64 = rows.iter().map(|m| m.orders).sum();
        let revenue: f64 = rows.iter().map(|m| m.revenue).sum();
        ticket_means.push(if orders > 0.0 { revenue / orders } else { 0.0 });
    }
    Chart::new(
        "hosteleria-franjas",
        "Recaudación Media y Ticket Medio por Franja",
        ChartKind::GroupedBar,
        ALL_SLOTS.iter().map(|s| s.label().to_string()).collect(),
        vec![
            Series::new("Recaudación media", rev_means),
            Series::new("Ticket medio", ticket_means),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(season: &str, id: i64, kickoff: &str, orders: f64, revenue: f64) -> HospitalityMatchRow {
        HospitalityMatchRow {
            season: season.to_string(),
            match_id: id,
            schedule: None,
            kickoff: Some(kickoff.to_string()),
            opponent: format!("Rival {}", id),
            result: Some("1-2".to_string()),
            orders,
            revenue,
        }
    }

    #[test]
    fn slot_classification() {
        assert_eq!(Slot::classify("14:00"), Some(Slot::Mediodia));
        assert_eq!(Slot::classify("18:30"), Some(Slot::Tarde));
        assert_eq!(Slot::classify("21:00"), Some(Slot::Noche));
        assert_eq!(Slot::classify("12:00"), None);
        assert_eq!(Slot::from_slug("noche"), Some(Slot::Noche));
    }

    #[test]
    fn product_classification_and_normalisation() {
        assert_eq!(classify_product("Cerveza Estrella Galicia"), ProductCategory::Drink);
        assert_eq!(classify_product("Bocadillo de jamón"), ProductCategory::Food);
        assert_eq!(classify_product("Vaso Depor reutilizable"), ProductCategory::Excluded);
        assert_eq!(normalize_product("Café con leche"), "Café");
        assert_eq!(normalize_product("Coca-Cola"), "Coca Cola");
        assert_eq!(normalize_product("Empanada"), "Empanada");
    }

    #[test]
    fn global_view_has_five_comparative_cards() {
        let matches = vec![
            m("actual", 1, "14:00", 1000.0, 20_000.0),
            m("actual", 2, "21:00", 500.0, 12_000.0),
            m("anterior", 9, "18:30", 900.0, 15_000.0),
        ];
        let payload = build(&matches, &[], &[], &[], &[], None);
        assert_eq!(payload.kpis.len(), 5);
        assert_eq!(payload.kpis[0].label, "Total Pedidos");
        assert_eq!(payload.kpis[0].value, 1500.0);
        assert_eq!(payload.kpis[0].prior, 900.0);
    }

    #[test]
    fn slot_view_compares_against_global_means() {
        let matches = vec![
            m("actual", 1, "14:00", 1000.0, 20_000.0),
            m("actual", 2, "21:00", 500.0, 10_000.0),
        ];
        let payload = build(&matches, &[], &[], &[], &[], Some(Slot::Mediodia));
        assert_eq!(payload.kpis.len(), 3);
        let orders = &payload.kpis[0];
        assert_eq!(orders.value, 1000.0);
        assert_eq!(orders.prior, 750.0);
        assert!(orders.display_prior.starts_with("Media global:"));
        // Revenue chart only shows the slot's matches
        let chart = payload.charts.iter().find(|c| c.id == "hosteleria-recaudacion").unwrap();
        assert_eq!(chart.labels, vec!["Rival 1"]);
    }

    #[test]
    fn payment_chart_labels_by_rival_with_spanish_methods() {
        let matches = vec![m("actual", 1, "18:30", 500.0, 9_000.0), m("actual", 2, "21:00", 700.0, 14_000.0)];
        let pay = |id: i64, opponent: &str, method: &str, revenue: f64| HospitalityPaymentRow {
            season: "actual".to_string(),
            match_id: id,
            schedule: None,
            opponent: opponent.to_string(),
            payment_method: method.to_string(),
            revenue,
        };
        let payments = vec![
            pay(1, "Sporting", "credit_card", 6_000.0),
            pay(1, "Sporting", "cash", 3_000.0),
            pay(2, "Racing", "cash", 8_000.0),
            pay(2, "Racing", "club_card", 400.0),
        ];
        let payload = build(&matches, &[], &[], &[], &payments, None);
        let stacked = payload.charts.iter().find(|c| c.id == "hosteleria-pago-partido").unwrap();
        assert_eq!(stacked.labels, vec!["Sporting", "Racing"]);
        let names: Vec<&str> = stacked.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Efectivo", "Tarjeta", "moeDÉiro"]);
        assert_eq!(stacked.series[0].values, vec![3_000.0, 8_000.0]);
        assert_eq!(stacked.decorations[0].crest.as_deref(), Some("/assets/Escudos/Real Sporting.png"));
        // m() fixtures lose 1-2 at home
        assert_eq!(stacked.decorations[0].color, "#e74c3c");

        let pie = payload.charts.iter().find(|c| c.id == "hosteleria-pago-total").unwrap();
        assert_eq!(pie.labels, vec!["Efectivo", "Tarjeta", "moeDÉiro"]);
        assert_eq!(pie.series[0].values, vec![11_000.0, 6_000.0, 400.0]);
    }

    #[test]
    fn excluded_products_never_reach_the_chart() {
        let matches = vec![m("actual", 1, "14:00", 10.0, 100.0)];
        let products = vec![
            HospitalityProductRow {
                product: "Bufanda Dépor".to_string(),
                kickoff: None,
                quantity: 50.0,
                revenue: 900.0,
            },
            HospitalityProductRow {
                product: "Cerveza".to_string(),
                kickoff: None,
                quantity: 400.0,
                revenue: 1_200.0,
            },
        ];
        let payload = build(&matches, &products, &[], &[], &[], None);
        let chart = payload.charts.iter().find(|c| c.id == "hosteleria-productos").unwrap();
        assert_eq!(chart.labels, vec!["Cerveza"]);
        assert!(chart.series[0].hover[0].starts_with("Bebida"));
    }
}
