//! Read-only query wrappers over the pre-aggregated report tables.
//!
//! The batch job maintains the `pre_*` tables; this module only reads them.
//! Spanish column names are aliased to English field names in the SQL, and
//! numeric aggregates are cast to DOUBLE so every row decodes uniformly.
//! Season partitions arrive pre-labelled as 'actual' / 'anterior'.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlPool;

pub const CURRENT_SEASON: &str = "actual";
pub const PRIOR_SEASON: &str = "anterior";

// =============================================================================
// TICKETING (Estadio / Entradas)
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TicketMatchRow {
    pub season: String,
    pub match_id: i64,
    pub schedule: Option<NaiveDateTime>,
    pub weekday: Option<String>,
    pub kickoff: Option<String>,
    pub opponent: String,
    pub result: Option<String>,
    pub sold: f64,
    pub unsold: f64,
    pub revenue: f64,
}

pub async fn pre_ticket_matches(pool: &MySqlPool) -> Result<Vec<TicketMatchRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, id_partido AS match_id, schedule, \
                dia_semana AS weekday, hora_exacta AS kickoff, t2_name AS opponent, result, \
                CAST(n_publico AS DOUBLE) AS sold, \
                CAST(norm_no_vend AS DOUBLE) AS unsold, \
                CAST(recaudacion AS DOUBLE) AS revenue \
         FROM pre_entradas_partido ORDER BY temporada, schedule",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TicketSectorRow {
    pub season: String,
    pub match_id: i64,
    pub stand: String,
    pub sold: f64,
    pub unsold: f64,
    pub revenue: f64,
}

pub async fn pre_ticket_sectors(pool: &MySqlPool) -> Result<Vec<TicketSectorRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, id_partido AS match_id, grada AS stand, \
                CAST(vendidas AS DOUBLE) AS sold, \
                CAST(no_vendidas AS DOUBLE) AS unsold, \
                CAST(recaudacion AS DOUBLE) AS revenue \
         FROM pre_entradas_sector",
    )
    .fetch_all(pool)
    .await
}

// =============================================================================
// SEAT LOANS (Estadio / Cesiones)
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct LoanMatchRow {
    pub season: String,
    pub match_id: i64,
    pub schedule: Option<NaiveDateTime>,
    pub weekday: Option<String>,
    pub kickoff: Option<String>,
    pub opponent: String,
    pub result: Option<String>,
    pub total_loans: f64,
    pub sold: f64,
    pub unsold: f64,
    pub balance: f64,
}

pub async fn pre_loan_matches(pool: &MySqlPool) -> Result<Vec<LoanMatchRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, id_partido AS match_id, schedule, \
                dia_semana AS weekday, hora_exacta AS kickoff, t2_name AS opponent, result, \
                CAST(total_cesiones AS DOUBLE) AS total_loans, \
                CAST(vendidas AS DOUBLE) AS sold, \
                CAST(no_vendidas AS DOUBLE) AS unsold, \
                CAST(saldo_total AS DOUBLE) AS balance \
         FROM pre_cesiones_partido ORDER BY temporada, schedule",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct LoanRevenueRow {
    pub season: String,
    pub match_id: i64,
    pub schedule: Option<NaiveDateTime>,
    pub opponent: String,
    pub result: Option<String>,
    pub revenue: f64,
}

pub async fn pre_loan_revenue(pool: &MySqlPool) -> Result<Vec<LoanRevenueRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, id_partido AS match_id, schedule, \
                t2_name AS opponent, result, \
                CAST(rec_ces_vend AS DOUBLE) AS revenue \
         FROM pre_cesiones_recaudacion ORDER BY temporada, schedule",
    )
    .fetch_all(pool)
    .await
}

pub async fn pre_loan_sectors(pool: &MySqlPool) -> Result<Vec<TicketSectorRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, id_partido AS match_id, grada AS stand, \
                CAST(vendidas AS DOUBLE) AS sold, \
                CAST(no_vendidas AS DOUBLE) AS unsold, \
                CAST(recaudacion AS DOUBLE) AS revenue \
         FROM pre_cesiones_sector",
    )
    .fetch_all(pool)
    .await
}

// =============================================================================
// HOSPITALITY (Dépor Hostelería)
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct HospitalityMatchRow {
    pub season: String,
    pub match_id: i64,
    pub schedule: Option<NaiveDateTime>,
    pub kickoff: Option<String>,
    pub opponent: String,
    pub result: Option<String>,
    pub orders: f64,
    pub revenue: f64,
}

pub async fn pre_hospitality_matches(pool: &MySqlPool) -> Result<Vec<HospitalityMatchRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, id_partido AS match_id, schedule, \
                hora_exacta AS kickoff, t2_name AS opponent, result, \
                CAST(n_pedidos AS DOUBLE) AS orders, \
                CAST(recaudacion_total AS DOUBLE) AS revenue \
         FROM pre_hosteleria_partido ORDER BY temporada, schedule",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct HospitalityProductRow {
    pub product: String,
    pub kickoff: Option<String>,
    pub quantity: f64,
    pub revenue: f64,
}

pub async fn pre_hospitality_products(pool: &MySqlPool) -> Result<Vec<HospitalityProductRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT product_name AS product, hora_exacta AS kickoff, \
                CAST(cantidad AS DOUBLE) AS quantity, \
                CAST(recaudacion AS DOUBLE) AS revenue \
         FROM pre_hosteleria_producto ORDER BY recaudacion DESC",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct HospitalityOutletRow {
    pub outlet_id: i64,
    pub outlet: String,
    pub kickoff: Option<String>,
    pub quantity: f64,
    pub revenue: f64,
}

pub async fn pre_hospitality_outlets(pool: &MySqlPool) -> Result<Vec<HospitalityOutletRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT store_id AS outlet_id, store_name AS outlet, hora_exacta AS kickoff, \
                CAST(cantidad AS DOUBLE) AS quantity, \
                CAST(recaudacion AS DOUBLE) AS revenue \
         FROM pre_hosteleria_cantina ORDER BY recaudacion DESC",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct HospitalityProductOutletRow {
    pub product: String,
    pub outlet: String,
    pub kickoff: Option<String>,
    pub quantity: f64,
}

pub async fn pre_hospitality_product_outlets(
    pool: &MySqlPool,
) -> Result<Vec<HospitalityProductOutletRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT product_name AS product, store_name AS outlet, hora_exacta AS kickoff, \
                CAST(cantidad AS DOUBLE) AS quantity \
         FROM pre_hosteleria_producto_cantina ORDER BY cantidad DESC",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct HospitalityPaymentRow {
    pub season: String,
    pub match_id: i64,
    pub schedule: Option<NaiveDateTime>,
    pub opponent: String,
    pub payment_method: String,
    pub revenue: f64,
}

pub async fn pre_hospitality_payments(pool: &MySqlPool) -> Result<Vec<HospitalityPaymentRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, id_partido AS match_id, schedule, \
                t2_name AS opponent, payment_method, \
                CAST(recaudacion AS DOUBLE) AS revenue \
         FROM pre_hosteleria_metodo_pago ORDER BY schedule",
    )
    .fetch_all(pool)
    .await
}

// =============================================================================
// ATTENDANCE (Estadio / Asistencia)
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AttendanceKpiRow {
    pub season: String,
    pub avg_attendees: f64,
    pub attendance_pct: f64,
    pub male_count: f64,
    pub male_pct: f64,
    pub female_count: f64,
    pub female_pct: f64,
    pub avg_age: f64,
    pub avg_late: f64,
    pub late_pct: f64,
}

pub async fn pre_attendance_kpis(pool: &MySqlPool) -> Result<Vec<AttendanceKpiRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, \
                CAST(promedio_asistentes AS DOUBLE) AS avg_attendees, \
                CAST(pct_asistencia AS DOUBLE) AS attendance_pct, \
                CAST(male_count AS DOUBLE) AS male_count, \
                CAST(male_pct AS DOUBLE) AS male_pct, \
                CAST(female_count AS DOUBLE) AS female_count, \
                CAST(female_pct AS DOUBLE) AS female_pct, \
                CAST(edad_promedio AS DOUBLE) AS avg_age, \
                CAST(promedio_tarde AS DOUBLE) AS avg_late, \
                CAST(pct_tarde AS DOUBLE) AS late_pct \
         FROM pre_asistencia_kpis",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AttendanceSectorRow {
    pub stand: String,
    pub attendees: f64,
    pub attendance_pct: f64,
}

pub async fn pre_attendance_sectors(pool: &MySqlPool) -> Result<Vec<AttendanceSectorRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT sector AS stand, CAST(asistentes AS DOUBLE) AS attendees, \
                CAST(pct_asistencia AS DOUBLE) AS attendance_pct \
         FROM pre_asistencia_sector",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AttendanceStreakRow {
    pub matchday: i64,
    pub opponent: String,
    pub result: Option<String>,
    pub streak_members: f64,
}

pub async fn pre_attendance_streaks(pool: &MySqlPool) -> Result<Vec<AttendanceStreakRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT jornada_num AS matchday, t2_name AS opponent, result, \
                CAST(abonados_consecutivos AS DOUBLE) AS streak_members \
         FROM pre_asistencia_consecutiva ORDER BY jornada_num",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AttendanceMatchRow {
    pub schedule: Option<NaiveDateTime>,
    pub opponent: String,
    pub result: Option<String>,
    pub spectators: f64,
    pub members: f64,
}

pub async fn pre_attendance_matches(pool: &MySqlPool) -> Result<Vec<AttendanceMatchRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT schedule, t2_name AS opponent, result, \
                CAST(total_espectadores AS DOUBLE) AS spectators, \
                CAST(abonados_asistentes AS DOUBLE) AS members \
         FROM pre_asistencia_partido ORDER BY schedule",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AttendanceAgeRow {
    pub age_group: String,
    pub attendees: f64,
    pub pct: f64,
}

pub async fn pre_attendance_ages(pool: &MySqlPool) -> Result<Vec<AttendanceAgeRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT grupo_edad AS age_group, CAST(asistentes AS DOUBLE) AS attendees, \
                CAST(pct AS DOUBLE) AS pct \
         FROM pre_asistencia_edad",
    )
    .fetch_all(pool)
    .await
}

// =============================================================================
// RETAIL (Dépor Tiendas)
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RetailKpiRow {
    pub revenue_total: f64,
    pub profit_total: f64,
    pub sale_count: f64,
    pub avg_ticket: f64,
}

pub async fn pre_retail_kpis(pool: &MySqlPool) -> Result<Vec<RetailKpiRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT CAST(recaudacion_total AS DOUBLE) AS revenue_total, \
                CAST(beneficio_total AS DOUBLE) AS profit_total, \
                CAST(num_ventas AS DOUBLE) AS sale_count, \
                CAST(ticket_promedio AS DOUBLE) AS avg_ticket \
         FROM pre_deportiendas_kpis",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RetailMatchdayRow {
    pub season: String,
    pub date: Option<NaiveDate>,
    pub weekday: Option<String>,
    pub kickoff: Option<String>,
    pub opponent: Option<String>,
    pub result: Option<String>,
    pub sales: f64,
}

pub async fn pre_retail_matchdays(pool: &MySqlPool) -> Result<Vec<RetailMatchdayRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT temporada AS season, fecha AS date, dow AS weekday, hora AS kickoff, \
                rival AS opponent, resultado AS result, \
                CAST(ventas_riazor AS DOUBLE) AS sales \
         FROM pre_deportiendas_matchday ORDER BY temporada, fecha",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RetailStoreRow {
    pub store: String,
    pub total_sales: f64,
}

pub async fn pre_retail_stores(pool: &MySqlPool) -> Result<Vec<RetailStoreRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT tienda AS store, CAST(total_sales AS DOUBLE) AS total_sales \
         FROM pre_deportiendas_por_tienda ORDER BY total_sales DESC",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RetailTopProductRow {
    pub product: String,
    pub units: f64,
    pub total_sales: f64,
}

pub async fn pre_retail_top_products(pool: &MySqlPool) -> Result<Vec<RetailTopProductRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT product_title AS product, CAST(uds_vendidas AS DOUBLE) AS units, \
                CAST(total_sales AS DOUBLE) AS total_sales \
         FROM pre_deportiendas_top_productos ORDER BY uds_vendidas DESC",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RetailProductStoreRow {
    pub store: String,
    pub product: String,
    pub units: f64,
}

pub async fn pre_retail_product_stores(pool: &MySqlPool) -> Result<Vec<RetailProductStoreRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT tienda AS store, product_title AS product, \
                CAST(uds_vendidas AS DOUBLE) AS units \
         FROM pre_deportiendas_producto_tienda",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RetailChannelRow {
    pub channel: String,
    pub total_sales: f64,
}

pub async fn pre_retail_channels(pool: &MySqlPool) -> Result<Vec<RetailChannelRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT canal AS channel, CAST(total AS DOUBLE) AS total_sales \
         FROM pre_deportiendas_canal",
    )
    .fetch_all(pool)
    .await
}

// =============================================================================
// SILVER TABLES (validation report)
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TicketingRawRow {
    pub match_id: i64,
    pub schedule: Option<NaiveDateTime>,
    pub home: String,
    pub opponent: String,
    pub result: Option<String>,
    pub season_id: Option<String>,
    pub sold: f64,
    pub unsold: f64,
    pub revenue: f64,
    pub loan_revenue: f64,
}

/// Per-match ticketing totals joined with fixture metadata; one row per match.
pub async fn ticketing_raw(pool: &MySqlPool) -> Result<Vec<TicketingRawRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT t.id_partido AS match_id, p.schedule, p.t1_name AS home, \
                p.t2_name AS opponent, p.result, p.id_temporada AS season_id, \
                CAST(SUM(t.n_publico) AS DOUBLE) AS sold, \
                CAST(SUM(t.norm_no_vend) AS DOUBLE) AS unsold, \
                CAST(SUM(t.recaudacion) AS DOUBLE) AS revenue, \
                CAST(SUM(t.rec_ces_vend) AS DOUBLE) AS loan_revenue \
         FROM slv_ticketing t \
         LEFT JOIN slv_partidos p ON t.id_partido = p.id \
         WHERE p.id IS NOT NULL \
         GROUP BY t.id_partido, p.schedule, p.t1_name, p.t2_name, p.result, p.id_temporada \
         ORDER BY p.schedule",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct LoanRawRow {
    pub match_id: i64,
    pub schedule: Option<NaiveDateTime>,
    pub home: String,
    pub opponent: String,
    pub season_id: Option<String>,
    pub sold: f64,
    pub unsold: f64,
    pub balance: f64,
}

/// Per-match seat-loan totals; 'V' rows are sold, 'D' rows still available.
pub async fn loans_raw(pool: &MySqlPool) -> Result<Vec<LoanRawRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT c.id_partido AS match_id, p.schedule, p.t1_name AS home, \
                p.t2_name AS opponent, p.id_temporada AS season_id, \
                CAST(SUM(c.estado_mercado_secundario_v_d_b = 'V') AS DOUBLE) AS sold, \
                CAST(SUM(c.estado_mercado_secundario_v_d_b = 'D') AS DOUBLE) AS unsold, \
                CAST(SUM(c.saldo_mercado_secundario) AS DOUBLE) AS balance \
         FROM slv_cesiones c \
         LEFT JOIN slv_partidos p ON c.id_partido = p.id \
         WHERE p.id IS NOT NULL \
         GROUP BY c.id_partido, p.schedule, p.t1_name, p.t2_name, p.id_temporada \
         ORDER BY p.schedule",
    )
    .fetch_all(pool)
    .await
}

/// IDs of the first `n` home league matches of a season, skipping pre-season
/// friendlies (league play starts mid-August).
pub async fn first_home_match_ids(
    pool: &MySqlPool,
    n: u32,
    season_year: i32,
) -> Result<Vec<i64>, sqlx::Error> {
    let cutoff = format!("{}-08-15", season_year);
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT id FROM slv_partidos \
         WHERE t1_name = 'RC Deportivo' AND id_temporada = ? AND schedule >= ? \
         ORDER BY schedule LIMIT ?",
    )
    .bind(season_year.to_string())
    .bind(cutoff)
    .bind(n)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
