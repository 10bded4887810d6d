//! Load cases

use serde::{Deserialize, Serialize};

/// A load case groups load groups under a common name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCase {
    /// Name of the load case
    pub name: String,
    /// Load groups that make up the case
    pub load_groups: Vec<String>,
    /// Description of the load case
    pub description: Option<String>,
}

impl LoadCase {
    /// Create a new, empty load case
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            load_groups: Vec::new(),
            description: None,
        }
    }

    /// Create a load case with description
    pub fn with_description(name: &str, description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::new(name)
        }
    }

    /// Add a load group
    pub fn with_group(mut self, group: &str) -> Self {
        self.add_group(group);
        self
    }

    /// Add a load group if not already present
    pub fn add_group(&mut self, group: &str) {
        if !self.includes(group) {
            self.load_groups.push(group.to_string());
        }
    }

    /// Check if this case includes a load group
    pub fn includes(&self, group: &str) -> bool {
        self.load_groups.iter().any(|g| g == group)
    }
}
