//! TTL selection per response category

use std::time::Duration;

use chrono::NaiveDate;

use super::CacheTtl;
use super::key::merged_params;
use crate::client::query::QueryParams;

/// Pick the TTL class for a request.
///
/// Invoice requests are checked in priority order: today's invoices, then
/// pending invoices, then any date-bounded query. Statistics and product
/// listings have their own classes; everything else is `GENERAL`.
/// `today` is passed in so the function stays pure.
pub fn resolve_ttl(endpoint: &str, params: &QueryParams, today: NaiveDate) -> Duration {
    let (path, params) = merged_params(endpoint, params);
    let get = |name: &str| params.get(name).map(String::as_str);

    if path.contains("facturas") {
        let today = today.format("%Y-%m-%d").to_string();
        let desde = get("fecha_desde");
        let hasta = get("fecha_hasta");

        if desde == Some(today.as_str()) && hasta == Some(today.as_str()) {
            return CacheTtl::TODAY;
        }
        if get("estado") == Some("pendiente") {
            return CacheTtl::PENDING;
        }
        if desde.is_some() || hasta.is_some() {
            return CacheTtl::HISTORICAL;
        }
    }

    if path.contains("estadisticas") {
        return CacheTtl::STATS;
    }

    if path.contains("productos") && get("id").is_none() {
        return CacheTtl::PRODUCTS;
    }

    CacheTtl::GENERAL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn ms(d: Duration) -> u128 {
        d.as_millis()
    }

    #[test]
    fn test_todays_invoices() {
        let params = QueryParams::new()
            .with("fecha_desde", "2024-05-01")
            .with("fecha_hasta", "2024-05-01");
        assert_eq!(ms(resolve_ttl("api/facturas.php", &params, today())), 30_000);
    }

    #[test]
    fn test_pending_invoices() {
        let params = QueryParams::new().with("estado", "pendiente");
        assert_eq!(ms(resolve_ttl("api/facturas.php", &params, today())), 120_000);
    }

    #[test]
    fn test_historical_invoices() {
        let params = QueryParams::new().with("fecha_desde", "2024-01-01");
        assert_eq!(ms(resolve_ttl("api/facturas.php", &params, today())), 300_000);

        let params = QueryParams::new().with("fecha_hasta", "2024-01-31");
        assert_eq!(ms(resolve_ttl("api/facturas.php", &params, today())), 300_000);
    }

    #[test]
    fn test_today_wins_over_pending() {
        let params = QueryParams::new()
            .with("estado", "pendiente")
            .with("fecha_desde", "2024-05-01")
            .with("fecha_hasta", "2024-05-01");
        assert_eq!(resolve_ttl("api/facturas.php", &params, today()), CacheTtl::TODAY);
    }

    #[test]
    fn test_pending_wins_over_range() {
        let params = QueryParams::new()
            .with("estado", "pendiente")
            .with("fecha_desde", "2024-01-01");
        assert_eq!(
            resolve_ttl("api/facturas.php", &params, today()),
            CacheTtl::PENDING
        );
    }

    #[test]
    fn test_only_one_bound_today_is_historical() {
        let params = QueryParams::new().with("fecha_desde", "2024-05-01");
        assert_eq!(
            resolve_ttl("api/facturas.php", &params, today()),
            CacheTtl::HISTORICAL
        );
    }

    #[test]
    fn test_unfiltered_invoices_fall_through() {
        assert_eq!(
            resolve_ttl("api/facturas.php", &QueryParams::new(), today()),
            CacheTtl::GENERAL
        );
    }

    #[test]
    fn test_products() {
        assert_eq!(
            ms(resolve_ttl("api/productos.php", &QueryParams::new(), today())),
            600_000
        );
    }

    #[test]
    fn test_single_product_is_general() {
        let params = QueryParams::new().with("id", 12);
        assert_eq!(
            resolve_ttl("api/productos.php", &params, today()),
            CacheTtl::GENERAL
        );
        assert_eq!(
            resolve_ttl("api/productos.php?id=12", &QueryParams::new(), today()),
            CacheTtl::GENERAL
        );
    }

    #[test]
    fn test_statistics() {
        assert_eq!(
            ms(resolve_ttl("api/estadisticas", &QueryParams::new(), today())),
            60_000
        );
    }

    #[test]
    fn test_anything_else() {
        assert_eq!(
            ms(resolve_ttl("api/anything-else", &QueryParams::new(), today())),
            900_000
        );
    }

    #[test]
    fn test_embedded_query_counts() {
        assert_eq!(
            resolve_ttl(
                "api/facturas.php?estado=pendiente",
                &QueryParams::new(),
                today()
            ),
            CacheTtl::PENDING
        );
    }
}
