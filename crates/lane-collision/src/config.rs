//! YAML launch configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compare::SortOrder;
use crate::error::LaneError;
use crate::group::GroupSize;
use crate::kernels::Backend;

/// One launch of the lane kernels: the group, how to run it, and the
/// per-lane values.
///
/// ```yaml
/// group_size: 32
/// backend: threaded
/// order: ascending
/// values: [7, 3, 7, 1]
/// ```
///
/// Every field is optional; a missing `values` list launches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    pub group_size: GroupSize,
    pub backend: Backend,
    pub order: SortOrder,
    pub values: Vec<i64>,
}

impl LaunchConfig {
    /// Check that the values fit the group.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::TooManyValues`] when there are more values than
    /// lanes.
    pub fn validate(&self) -> Result<(), LaneError> {
        if self.values.len() > self.group_size.lanes() {
            return Err(LaneError::TooManyValues {
                lanes: self.group_size.lanes(),
                actual: self.values.len(),
            });
        }
        Ok(())
    }
}

/// Parse a YAML launch configuration file.
///
/// # Errors
///
/// Returns [`LaneError::Io`] if the file cannot be read, [`LaneError::Yaml`]
/// if the YAML is malformed or names an invalid group size, backend or
/// order, and [`LaneError::TooManyValues`] if the values overflow the group.
pub fn parse_config(path: &Path) -> Result<LaunchConfig, LaneError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a YAML launch configuration from a string.
pub fn parse_config_str(yaml: &str) -> Result<LaunchConfig, LaneError> {
    let config: LaunchConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}
