//! Invalidation rules
//!
//! Invalidation is substring-based, so a write to one resource does not by
//! itself reach caches derived from it. The table in [`Resource::invalidates`]
//! lists, for every resource, all cached resources a write to it makes stale.

use std::fmt;

use super::store::CacheStore;

/// Key fragments whose entries are reset when the calendar day changes
pub const DAY_SCOPED_PATTERNS: &[&str] = &["facturas", "estadisticas"];

/// Backend resources that have cached responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Clientes,
    Productos,
    Facturas,
    Estadisticas,
    Notificaciones,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Clientes,
        Resource::Productos,
        Resource::Facturas,
        Resource::Estadisticas,
        Resource::Notificaciones,
    ];

    /// Backend path, relative to the configured base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Resource::Clientes => "api/clientes.php",
            Resource::Productos => "api/productos.php",
            Resource::Facturas => "api/facturas.php",
            Resource::Estadisticas => "api/estadisticas.php",
            Resource::Notificaciones => "api/notificaciones.php",
        }
    }

    /// Substring identifying this resource's cache keys
    pub fn pattern(&self) -> &'static str {
        let endpoint = self.endpoint();
        endpoint.rsplit('/').next().unwrap_or(endpoint)
    }

    /// Resources whose cached responses go stale when this one is written
    pub fn invalidates(&self) -> &'static [Resource] {
        match self {
            // Invoices embed the client name
            Resource::Clientes => &[Resource::Clientes, Resource::Facturas],
            // Low-stock notifications
            Resource::Productos => &[Resource::Productos, Resource::Notificaciones],
            // Invoices move stock, totals and pending counts
            Resource::Facturas => &[
                Resource::Facturas,
                Resource::Estadisticas,
                Resource::Notificaciones,
                Resource::Productos,
            ],
            Resource::Estadisticas => &[Resource::Estadisticas],
            Resource::Notificaciones => &[Resource::Notificaciones],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Clientes => "clientes",
            Resource::Productos => "productos",
            Resource::Facturas => "facturas",
            Resource::Estadisticas => "estadisticas",
            Resource::Notificaciones => "notificaciones",
        };
        f.write_str(name)
    }
}

/// Apply the rule row for `resource`; returns the number of entries removed
pub fn invalidate_resource(store: &CacheStore, resource: Resource) -> usize {
    resource
        .invalidates()
        .iter()
        .map(|dependent| store.invalidate(dependent.pattern()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheTtl;

    #[test]
    fn test_patterns_are_file_names() {
        assert_eq!(Resource::Facturas.pattern(), "facturas.php");
        assert_eq!(Resource::Estadisticas.pattern(), "estadisticas.php");
    }

    #[test]
    fn test_every_rule_includes_itself() {
        for resource in Resource::ALL {
            assert!(resource.invalidates().contains(&resource), "{}", resource);
        }
    }

    #[test]
    fn test_invoice_write_reaches_statistics() {
        assert!(Resource::Facturas
            .invalidates()
            .contains(&Resource::Estadisticas));
    }

    #[test]
    fn test_invalidate_resource_applies_row() {
        let store = CacheStore::memory_only();
        store.set("GET:api/facturas.php", &1, CacheTtl::GENERAL);
        store.set("GET:api/estadisticas.php?fecha=2024-05-01", &1, CacheTtl::STATS);
        store.set("GET:api/productos.php", &1, CacheTtl::PRODUCTS);
        store.set("GET:api/clientes.php", &1, CacheTtl::GENERAL);

        assert_eq!(invalidate_resource(&store, Resource::Facturas), 3);
        assert_eq!(store.get::<i32>("GET:api/clientes.php"), Some(1));
        assert!(store.get::<i32>("GET:api/estadisticas.php?fecha=2024-05-01").is_none());
    }

    #[test]
    fn test_statistics_write_leaves_invoices() {
        let store = CacheStore::memory_only();
        store.set("GET:api/facturas.php", &1, CacheTtl::GENERAL);
        store.set("GET:api/estadisticas.php", &1, CacheTtl::STATS);

        assert_eq!(invalidate_resource(&store, Resource::Estadisticas), 1);
        assert_eq!(store.get::<i32>("GET:api/facturas.php"), Some(1));
    }
}
