//! Container settings
//!
//! [ContainerConfig] derives serde traits so that embedding applications can read it from
//! their own configuration files. Missing fields take their default value.

use serde::{Deserialize, Serialize};

/// Built-in instantiation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Simple,
    #[default]
    Subclassing,
}

/// Meaning of a property declared several times in the same definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePropertyPolicy {
    /// Inject every value in order: the last one ends up in the field
    #[default]
    LastWins,
    /// Fail the creation of the bean
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub instantiation_strategy: StrategyKind,
    /// Allow a definition to replace an existing one registered under the same name
    pub allow_definition_overriding: bool,
    pub duplicate_properties: DuplicatePropertyPolicy,
    /// Maximal number of beans being created at the same time through nested references
    pub max_creation_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            instantiation_strategy: StrategyKind::default(),
            allow_definition_overriding: true,
            duplicate_properties: DuplicatePropertyPolicy::default(),
            max_creation_depth: 256,
        }
    }
}

impl ContainerConfig {
    pub fn with_instantiation_strategy(mut self, strategy: StrategyKind) -> Self {
        self.instantiation_strategy = strategy;
        self
    }

    pub fn with_definition_overriding(mut self, allow: bool) -> Self {
        self.allow_definition_overriding = allow;
        self
    }

    pub fn with_duplicate_properties(mut self, policy: DuplicatePropertyPolicy) -> Self {
        self.duplicate_properties = policy;
        self
    }

    pub fn with_max_creation_depth(mut self, depth: usize) -> Self {
        self.max_creation_depth = depth;
        self
    }
}
