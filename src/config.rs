use crate::error::ConfigError;

/// Slot count of a freshly created table.
pub const DEFAULT_INITIAL_CAPACITY: usize = 5;

/// Fraction of occupied slots that triggers growth.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Multiplier applied to the slot count on growth.
pub const DEFAULT_GROWTH_FACTOR: usize = 2;

/// Sizing policy for a [`HashTable`](crate::HashTable).
///
/// A table grows before any insertion that would push its population above
/// `max_load_factor * capacity`. Growth multiplies the slot count by
/// `growth_factor`, repeating until the pending insertion fits.
///
/// # Examples
///
/// ```rust
/// # use seq_hash::TableConfig;
/// #
/// let config = TableConfig::default()
///     .with_initial_capacity(64)
///     .with_max_load_factor(0.5);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.growth_factor, 2);
///
/// assert!(TableConfig::default().with_growth_factor(1).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Starting slot count.
    pub initial_capacity: usize,
    /// Fraction of occupied slots that triggers growth, in `(0, 1)`.
    pub max_load_factor: f64,
    /// Multiplier applied on growth, at least 2.
    pub growth_factor: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl TableConfig {
    /// Sets the starting slot count.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the load factor that triggers growth.
    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    /// Sets the growth multiplier.
    pub fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Checks that the configuration describes a usable table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        // Written as a negated range check so NaN is rejected too.
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(ConfigError::LoadFactorOutOfRange(self.max_load_factor));
        }
        if self.growth_factor < 2 {
            return Err(ConfigError::GrowthFactorTooSmall(self.growth_factor));
        }
        Ok(())
    }

    /// Largest population a table with `capacity` slots may hold.
    #[inline(always)]
    pub(crate) fn load_limit(&self, capacity: usize) -> usize {
        (self.max_load_factor * capacity as f64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TableConfig::default();
        assert_eq!(config.initial_capacity, 5);
        assert_eq!(config.max_load_factor, 0.75);
        assert_eq!(config.growth_factor, 2);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = TableConfig::default().with_initial_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn rejects_load_factor_outside_open_unit_interval() {
        for factor in [0.0, 1.0, -0.5, 1.25] {
            let config = TableConfig::default().with_max_load_factor(factor);
            assert_eq!(
                config.validate(),
                Err(ConfigError::LoadFactorOutOfRange(factor))
            );
        }

        let nan = TableConfig::default().with_max_load_factor(f64::NAN);
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::LoadFactorOutOfRange(_))
        ));
    }

    #[test]
    fn rejects_non_growing_factor() {
        for factor in [0, 1] {
            let config = TableConfig::default().with_growth_factor(factor);
            assert_eq!(
                config.validate(),
                Err(ConfigError::GrowthFactorTooSmall(factor))
            );
        }
        assert!(TableConfig::default().with_growth_factor(3).validate().is_ok());
    }

    #[test]
    fn load_limit_truncates() {
        let config = TableConfig::default();
        assert_eq!(config.load_limit(5), 3);
        assert_eq!(config.load_limit(10), 7);
        assert_eq!(config.load_limit(20), 15);
        assert_eq!(config.load_limit(1), 0);
    }
}
