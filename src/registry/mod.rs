//! Static catalog of observation sites, sampling intervals and the column schema each
//! (schema class, interval) pair produces. Built once at startup and passed by reference.

pub mod interval;
pub mod schema;
pub mod site;

pub use interval::SamplingInterval;
pub use schema::{builtin_schema, ColumnSchema};
pub use site::{SchemaClass, Site};

use crate::error::{Result, ScraperError};
use std::collections::HashMap;

pub struct Registry {
    sites: Vec<Site>,
    schemas: HashMap<(SchemaClass, SamplingInterval), ColumnSchema>,
}

impl Registry {
    pub fn new(sites: Vec<Site>, schemas: HashMap<(SchemaClass, SamplingInterval), ColumnSchema>) -> Self {
        Self { sites, schemas }
    }

    /// Registry with the built-in sites and a schema for every class/interval pair
    pub fn builtin() -> Self {
        let mut schemas = HashMap::new();
        for class in [SchemaClass::Rich, SchemaClass::Sparse] {
            for interval in SamplingInterval::ALL {
                schemas.insert((class, interval), builtin_schema(class, interval));
            }
        }
        Self::new(site::builtin_sites(), schemas)
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Look up a site by its `en_name`
    pub fn site(&self, en_name: &str) -> Result<&Site> {
        let wanted = en_name.trim().to_lowercase();
        self.sites.iter().find(|s| s.en_name == wanted).ok_or_else(|| {
            let names: Vec<&str> = self.sites.iter().map(|s| s.en_name.as_str()).collect();
            ScraperError::UnknownSite(format!(
                "{en_name} (location_name must be one of {})",
                names.join(", ")
            ))
        })
    }

    pub fn site_by_codes(&self, region_code: u32, station_code: u32) -> Option<&Site> {
        self.sites
            .iter()
            .find(|s| s.region_code == region_code && s.station_code == station_code)
    }

    pub fn schema(&self, class: SchemaClass, interval: SamplingInterval) -> Result<&ColumnSchema> {
        self.schemas.get(&(class, interval)).ok_or_else(|| {
            ScraperError::Config(format!("no column schema registered for {class}/{interval}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_has_sites() {
        let registry = Registry::builtin();
        let hamamatsu = registry.site("hamamatsu").unwrap();
        assert_eq!(hamamatsu.region_code, 50);
        assert_eq!(hamamatsu.station_code, 47654);
        assert_eq!(hamamatsu.schema_class, SchemaClass::Rich);

        let iwata = registry.site("Iwata").unwrap();
        assert_eq!(iwata.schema_class, SchemaClass::Sparse);
        assert_eq!(registry.site_by_codes(50, 47656).unwrap().en_name, "shizuoka");
    }

    #[test]
    fn test_unknown_site_lists_choices() {
        let registry = Registry::builtin();
        let err = registry.site("invalid_location").unwrap_err();
        assert!(err.to_string().contains("location_name must be one of"));
    }

    #[test]
    fn test_schema_selected_by_site_class() {
        let registry = Registry::builtin();
        let rich = registry.schema(SchemaClass::Rich, SamplingInterval::TenMinutes).unwrap();
        let sparse = registry.schema(SchemaClass::Sparse, SamplingInterval::TenMinutes).unwrap();
        assert_eq!(rich.len(), 11);
        assert_eq!(sparse.len(), 9);
    }

    #[test]
    fn test_missing_schema_is_an_error() {
        let registry = Registry::new(site::builtin_sites(), HashMap::new());
        assert!(registry.schema(SchemaClass::Rich, SamplingInterval::Daily).is_err());
    }
}
