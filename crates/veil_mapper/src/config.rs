use serde::Deserialize;
use veil_schema::{FieldCatalog, FieldEnumerator};

use crate::{DateFormat, Mapper, MapperError};

// -----------------------------------------------------------------------------
// CyclePolicy

/// What to do when an object is reached again while it is being written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Fail with [`MapperError::CircularReference`].
    #[default]
    Fail,
    /// Write `null` in place of the back-reference.
    WriteNull,
}

// -----------------------------------------------------------------------------
// MapperConfig

/// Settings of a [`Mapper`], fixed at construction.
///
/// Loadable from JSON; missing keys take their defaults.
///
/// ```
/// use veil_mapper::{CyclePolicy, MapperConfig};
///
/// let config = MapperConfig::from_json(r#"{"cycle_policy": "write_null"}"#).unwrap();
/// assert_eq!(config.cycle_policy, CyclePolicy::WriteNull);
/// assert_eq!(config.date_format, "%d/%m/%Y");
/// assert_eq!(config.max_depth, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// `strftime` pattern for every date written or read.
    pub date_format: String,
    pub cycle_policy: CyclePolicy,
    /// Deepest nesting of objects, sequences and mappings.
    pub max_depth: usize,
}

impl MapperConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, MapperError> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn validate(&self) -> Result<DateFormat, MapperError> {
        if self.max_depth == 0 {
            return Err(MapperError::InvalidConfig {
                reason: "max_depth must be at least 1".to_owned(),
            });
        }
        DateFormat::new(&self.date_format)
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            date_format: DateFormat::DEFAULT_PATTERN.to_owned(),
            cycle_policy: CyclePolicy::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

// -----------------------------------------------------------------------------
// MapperBuilder

/// Builds a [`Mapper`] with a validated configuration.
///
/// ```
/// use veil_mapper::{CyclePolicy, Mapper};
///
/// let mapper = Mapper::builder()
///     .date_format("%Y-%m-%d")
///     .cycle_policy(CyclePolicy::WriteNull)
///     .build()
///     .unwrap();
/// assert_eq!(mapper.config().date_format, "%Y-%m-%d");
///
/// assert!(Mapper::builder().date_format("%Y-%").build().is_err());
/// ```
#[must_use]
pub struct MapperBuilder {
    config: MapperConfig,
    catalog: Option<FieldCatalog>,
}

impl MapperBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            config: MapperConfig::default(),
            catalog: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn date_format(mut self, pattern: impl Into<String>) -> Self {
        self.config.date_format = pattern.into();
        self
    }

    pub fn cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.config.cycle_policy = policy;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Lists fields through `enumerator` instead of the declared fields.
    pub fn field_enumerator(mut self, enumerator: impl FieldEnumerator) -> Self {
        self.catalog = Some(FieldCatalog::with_enumerator(enumerator));
        self
    }

    /// Validates the configuration and creates the mapper.
    ///
    /// # Errors
    ///
    /// [`MapperError::InvalidDateFormat`] or [`MapperError::InvalidConfig`].
    pub fn build(self) -> Result<Mapper, MapperError> {
        let date_format = self.config.validate()?;
        Ok(Mapper::from_parts(
            self.config,
            date_format,
            self.catalog.unwrap_or_default(),
        ))
    }
}

impl Default for MapperBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{CyclePolicy, MapperConfig};
    use crate::{Mapper, MapperError};

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            MapperConfig::from_json(r#"{"dateFormat": "%Y"}"#),
            Err(MapperError::Json(_))
        ));
    }

    #[test]
    fn zero_depth_is_invalid() {
        let err = Mapper::builder().max_depth(0).build().err();
        assert!(matches!(err, Some(MapperError::InvalidConfig { .. })));
    }

    #[test]
    fn full_config_from_json() {
        let config = MapperConfig::from_json(
            r#"{"date_format": "%Y", "cycle_policy": "fail", "max_depth": 8}"#,
        )
        .unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::Fail);
        let mapper = Mapper::builder().config(config).build().unwrap();
        assert_eq!(mapper.config().max_depth, 8);
    }
}
