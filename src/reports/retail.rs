//! Dépor Tiendas: club shop sales around home matchdays.

use std::collections::HashMap;

use crate::crests::{crest_path, MatchOutcome};
use crate::kpi::{KpiCard, Polarity, ValueFormat};
use crate::queries::{
    RetailChannelRow, RetailKpiRow, RetailMatchdayRow, RetailProductStoreRow, RetailStoreRow,
    RetailTopProductRow, CURRENT_SEASON, PRIOR_SEASON,
};
use crate::reports::{kickoff_means, weekday_means, Chart, ChartKind, Decoration, ReportPayload, Series};

/// Shorten a catalogue title by dropping club-name boilerplate the supplier
/// prepends to every item.
pub fn abbreviate_product(name: &str) -> String {
    let mut s = name.to_string();
    for pattern in [
        "RC DEPORTIVO DE LA CORUÑA",
        "DEPORTIVO DE LA CORUÑA",
        "Deportivo de la Coruña",
        "DEPORTIVO",
        "Deportivo",
        "White Antique-Azure-Gold-",
    ] {
        s = s.replace(pattern, " ");
    }
    let cleaned: Vec<&str> = s.split_whitespace().collect();
    cleaned.join(" ").trim_matches(|c: char| c == '-' || c.is_whitespace()).to_string()
}

pub fn build(
    kpi_rows: &[RetailKpiRow],
    matchdays: &[RetailMatchdayRow],
    stores: &[RetailStoreRow],
    top_products: &[RetailTopProductRow],
    product_stores: &[RetailProductStoreRow],
    channels: &[RetailChannelRow],
) -> ReportPayload {
    let current: Vec<&RetailMatchdayRow> =
        matchdays.iter().filter(|m| m.season == CURRENT_SEASON).collect();
    let prior: Vec<&RetailMatchdayRow> =
        matchdays.iter().filter(|m| m.season == PRIOR_SEASON).collect();
    if current.is_empty() && kpi_rows.is_empty() {
        return ReportPayload::no_data();
    }

    let sales_now: f64 = current.iter().map(|m| m.sales).sum();
    let sales_then: f64 = prior.iter().map(|m| m.sales).sum();
    let mut kpis = vec![KpiCard::compare(
        "Ventas en Días de Partido",
        sales_now,
        sales_then,
        Polarity::HigherIsBetter,
        ValueFormat::Euros,
    )];
    if let Some(totals) = kpi_rows.first() {
        kpis.push(KpiCard::simple("Recaudación Total", totals.revenue_total, ValueFormat::Euros));
        kpis.push(KpiCard::simple("Beneficio Total", totals.profit_total, ValueFormat::Euros));
        kpis.push(KpiCard::simple("Número de Ventas", totals.sale_count, ValueFormat::Count));
        kpis.push(KpiCard::simple("Ticket Promedio", totals.avg_ticket, ValueFormat::Euros));
    }

    let labels: Vec<String> =
        current.iter().map(|m| m.opponent.clone().unwrap_or_default()).collect();
    let mut matchday_chart = Chart::new(
        "deportiendas-matchday",
        "Ventas en Riazor por Partido",
        ChartKind::Bar,
        labels,
        vec![Series::new("Ventas", current.iter().map(|m| m.sales).collect())],
    );
    matchday_chart.decorations = current
        .iter()
        .map(|m| {
            let opponent = m.opponent.clone().unwrap_or_default();
            Decoration {
                crest: crest_path(&opponent),
                label: opponent,
                color: MatchOutcome::from_result(m.result.as_deref().unwrap_or("")).color().to_string(),
            }
        })
        .collect();

    let weekday_pairs: Vec<(String, f64)> = current
        .iter()
        .filter_map(|m| m.weekday.clone().map(|d| (d, m.sales)))
        .collect();
    let (wd_labels, wd_means) = weekday_means(&weekday_pairs);
    let weekday_chart = Chart::new(
        "deportiendas-dia-semana",
        "Ventas Medias por Día de la Semana",
        ChartKind::Bar,
        wd_labels,
        vec![Series::new("Ventas medias", wd_means)],
    );

    let hour_pairs: Vec<(String, f64)> = current
        .iter()
        .filter_map(|m| m.kickoff.clone().map(|h| (h, m.sales)))
        .collect();
    let (h_labels, h_means) = kickoff_means(&hour_pairs);
    let hour_chart = Chart::new(
        "deportiendas-hora",
        "Ventas Medias por Hora del Partido",
        ChartKind::Bar,
        h_labels,
        vec![Series::new("Ventas medias", h_means)],
    );

    let top10: Vec<&RetailTopProductRow> = top_products.iter().take(10).collect();
    let product_chart = Chart::new(
        "deportiendas-productos",
        "Top 10 Productos",
        ChartKind::Bar,
        top10.iter().map(|p| abbreviate_product(&p.product)).collect(),
        vec![Series::with_hover(
            "Unidades",
            top10.iter().map(|p| p.units).collect(),
            top10.iter().map(|p| format!("{:.0}€", p.total_sales)).collect(),
        )],
    );

    let mut per_store: HashMap<&str, Vec<(&str, f64)>> = HashMap::new();
    for ps in product_stores {
        per_store.entry(ps.store.as_str()).or_default().push((&ps.product, ps.units));
    }
    let store_hover: Vec<String> = stores
        .iter()
        .map(|s| match per_store.get(s.store.as_str()) {
            Some(products) => {
                let mut top: Vec<&(&str, f64)> = products.iter().collect();
                top.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                top.iter()
                    .take(3)
                    .map(|(name, units)| format!("{}: {:.0}", abbreviate_product(name), units))
                    .collect::<Vec<_>>()
                    .join("<br>")
            }
            None => String::new(),
        })
        .collect();
    let store_chart = Chart::new(
        "deportiendas-tiendas",
        "Recaudación por Tienda",
        ChartKind::Bar,
        stores.iter().map(|s| s.store.clone()).collect(),
        vec![Series::with_hover(
            "Ventas",
            stores.iter().map(|s| s.total_sales).collect(),
            store_hover,
        )],
    );

    let channel_chart = Chart::new(
        "deportiendas-canal",
        "Ventas por Canal",
        ChartKind::Pie,
        channels.iter().map(|c| c.channel.clone()).collect(),
        vec![Series::new("Ventas", channels.iter().map(|c| c.total_sales).collect())],
    );

    ReportPayload::new(
        kpis,
        vec![matchday_chart, weekday_chart, hour_chart, product_chart, store_chart, channel_chart],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn club_name_boilerplate_is_stripped() {
        assert_eq!(
            abbreviate_product("DEPORTIVO - Camiseta Primera Equipación"),
            "Camiseta Primera Equipación"
        );
        assert_eq!(
            abbreviate_product("Camiseta RC DEPORTIVO DE LA CORUÑA - Primera Equipación"),
            "Camiseta - Primera Equipación"
        );
        assert_eq!(abbreviate_product("Bufanda Deportivo 2025"), "Bufanda 2025");
        assert_eq!(abbreviate_product("Llavero"), "Llavero");
    }

    #[test]
    fn matchday_card_is_the_only_comparative_one() {
        let kpi_rows = vec![RetailKpiRow {
            revenue_total: 500_000.0,
            profit_total: 120_000.0,
            sale_count: 30_000.0,
            avg_ticket: 16.7,
        }];
        let matchdays = vec![
            RetailMatchdayRow {
                season: "actual".to_string(),
                date: None,
                weekday: Some("Sábado".to_string()),
                kickoff: Some("18:30".to_string()),
                opponent: Some("Almería".to_string()),
                result: Some("3-1".to_string()),
                sales: 42_000.0,
            },
            RetailMatchdayRow {
                season: "anterior".to_string(),
                date: None,
                weekday: Some("Domingo".to_string()),
                kickoff: Some("14:00".to_string()),
                opponent: Some("Racing".to_string()),
                result: Some("1-1".to_string()),
                sales: 35_000.0,
            },
        ];
        let payload = build(&kpi_rows, &matchdays, &[], &[], &[], &[]);
        assert_eq!(payload.kpis.len(), 5);
        assert_eq!(payload.kpis[0].delta_text, "+20.0%");
        assert!(payload.kpis[1].delta_text.is_empty());
        assert_eq!(payload.charts[0].decorations[0].color, "#2ecc71");
    }

    #[test]
    fn top_products_chart_is_capped_at_ten() {
        let products: Vec<RetailTopProductRow> = (0..14)
            .map(|i| RetailTopProductRow {
                product: format!("Producto {}", i),
                units: (100 - i) as f64,
                total_sales: 1_000.0,
            })
            .collect();
        let matchdays = vec![RetailMatchdayRow {
            season: "actual".to_string(),
            date: None,
            weekday: None,
            kickoff: None,
            opponent: None,
            result: None,
            sales: 1.0,
        }];
        let payload = build(&[], &matchdays, &[], &products, &[], &[]);
        let chart = payload.charts.iter().find(|c| c.id == "deportiendas-productos").unwrap();
        assert_eq!(chart.labels.len(), 10);
    }
}
