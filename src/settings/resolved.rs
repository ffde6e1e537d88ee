use std::time::Duration;

use predictive_search::{ArrayFormat, ResourceType, SearchConfig, SearchOptions};

/// Application-ready configuration derived from user input, config files and
/// defaults.
#[derive(Debug)]
pub(crate) struct ResolvedConfig {
    pub(crate) store_url: String,
    pub(crate) timeout: Duration,
    pub(crate) search: SearchConfig,
    pub(crate) options: SearchOptions,
}

impl ResolvedConfig {
    /// Print a human readable summary of the effective configuration.
    pub(crate) fn print_summary(&self) {
        print!("{}", self.summary());
    }

    fn summary(&self) -> String {
        let resources = &self.search.resources;
        let mut lines = vec![
            "Effective configuration:".to_string(),
            format!("  Store URL: {}", self.store_url),
            format!("  Timeout: {}ms", self.timeout.as_millis()),
            format!(
                "  Search path: {}",
                self.search.search_path.as_deref().unwrap_or_default()
            ),
            format!("  Debounce: {}ms", self.options.debounce.as_millis()),
            format!("  Cache bucket size: {}", self.options.bucket_size),
            format!(
                "  Array format: {}",
                match self.options.array_format {
                    ArrayFormat::Brackets => "brackets",
                    ArrayFormat::Comma => "comma",
                }
            ),
            format!("  Resource types: {}", join_types(&resources.types)),
        ];

        match resources.limit {
            Some(limit) => lines.push(format!("  Limit: {limit}")),
            None => lines.push("  Limit: (endpoint default)".to_string()),
        }
        if let Some(policy) = resources.options.unavailable_products {
            lines.push(format!("  Unavailable products: {}", policy.as_str()));
        }
        if !resources.options.fields.is_empty() {
            let fields: Vec<&str> = resources
                .options
                .fields
                .iter()
                .map(|field| field.as_str())
                .collect();
            lines.push(format!("  Fields: {}", fields.join(", ")));
        }
        for (key, value) in &resources.extra {
            lines.push(format!("  resources.{key}: {value}"));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn join_types(types: &[ResourceType]) -> String {
    if types.is_empty() {
        return "(endpoint default)".to_string();
    }
    types
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use predictive_search::{SearchField, UnavailableProducts};

    use super::*;

    #[test]
    fn summary_lists_effective_values() {
        let config = ResolvedConfig {
            store_url: "https://shop.example".into(),
            timeout: Duration::from_secs(10),
            search: SearchConfig::new()
                .search_path("/search")
                .resource_type(ResourceType::Product)
                .resource_type(ResourceType::Page)
                .field(SearchField::VariantsSku)
                .unavailable_products(UnavailableProducts::Last)
                .resource_param("fuzzy", true),
            options: SearchOptions::default(),
        };

        let summary = config.summary();
        assert!(summary.contains("  Store URL: https://shop.example\n"));
        assert!(summary.contains("  Debounce: 10ms\n"));
        assert!(summary.contains("  Cache bucket size: 40\n"));
        assert!(summary.contains("  Resource types: product, page\n"));
        assert!(summary.contains("  Limit: (endpoint default)\n"));
        assert!(summary.contains("  Fields: variants.sku\n"));
        assert!(summary.contains("  Unavailable products: last\n"));
        assert!(summary.contains("  resources.fuzzy: true\n"));
    }

    #[test]
    fn join_types_handles_empty() {
        assert_eq!(join_types(&[]), "(endpoint default)");
    }
}
