//! Priced agent offerings for agent-payment terminals

use serde::{Deserialize, Serialize};

/// A service offering the operator can charge for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOffering {
    /// Stable id, written to tags as `agentId`
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Price as a decimal amount of the native currency
    pub price: String,
}

impl AgentOffering {
    /// Create a new offering
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price: price.into(),
        }
    }
}

/// The catalog used when the terminal runs in agent mode without its own list
pub fn default_catalog() -> Vec<AgentOffering> {
    vec![
        AgentOffering::new(
            "research-agent",
            "Research Agent",
            "Web research with cited summaries",
            "0.001",
        ),
        AgentOffering::new(
            "translation-agent",
            "Translation Agent",
            "Document translation across 40 languages",
            "0.0005",
        ),
        AgentOffering::new(
            "image-agent",
            "Image Agent",
            "Image generation and editing",
            "0.002",
        ),
    ]
}

/// Find an offering by id
pub fn find_offering<'a>(catalog: &'a [AgentOffering], id: &str) -> Option<&'a AgentOffering> {
    catalog.iter().find(|o| o.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::to_smallest_unit;

    #[test]
    fn test_default_catalog_prices_parse() {
        for offering in default_catalog() {
            assert!(to_smallest_unit(&offering.price).is_ok(), "{}", offering.id);
        }
    }

    #[test]
    fn test_find_offering() {
        let catalog = default_catalog();
        assert_eq!(find_offering(&catalog, "image-agent").unwrap().price, "0.002");
        assert!(find_offering(&catalog, "missing").is_none());
    }
}
