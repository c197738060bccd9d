//! World configuration.

/// Sizing hints for a `World`.
///
/// Every structure grows past these capacities on demand; they only decide how
/// much is allocated up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    /// Number of entities to reserve room for.
    pub initial_entity_capacity: usize,
    /// Number of component types to reserve room for.
    pub initial_component_capacity: usize,
}

impl WorldConfig {
    /// Create a config with the default capacities.
    pub fn new() -> WorldConfig {
        WorldConfig {
            initial_entity_capacity: 100,
            initial_component_capacity: 20,
        }
    }

    /// Override the initial entity capacity.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> WorldConfig {
        self.initial_entity_capacity = capacity;
        self
    }

    /// Override the initial component type capacity.
    #[must_use]
    pub fn with_component_capacity(mut self, capacity: usize) -> WorldConfig {
        self.initial_component_capacity = capacity;
        self
    }
}

impl Default for WorldConfig {
    fn default() -> WorldConfig {
        WorldConfig::new()
    }
}
