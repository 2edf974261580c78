//! Physical constants
//!
//! Densities and areas shared by every methodology. The named constants are the
//! standard values; [`PhysicalConstants`] bundles them so a caller can inject an
//! alternative set (for example to reproduce results computed with a different
//! ocean area) without any methodology reading global state.

use crate::errors::{SLCError, SLCResult};
use crate::field::FloatValue;
use serde::{Deserialize, Serialize};

/// Seconds in one year (s).
pub const SECONDS_PER_YEAR: FloatValue = 31556926.0;

/// Density of glacier ice (kg/m^3).
pub const RHO_ICE: FloatValue = 917.0;

/// Density of seawater (kg/m^3).
pub const RHO_SEAWATER: FloatValue = 1027.0;

/// Density of freshwater (kg/m^3).
pub const RHO_FRESHWATER: FloatValue = 1.0e3;

/// Area of the global ocean (m^2).
///
/// Gregory et al. (2019), used to convert a volume to a sea-level equivalent.
pub const OCEAN_AREA: FloatValue = 3.625e14;

/// Physical constants used to convert ice geometry into sea-level equivalents.
///
/// The default set matches the named constants in this module. Any field left out
/// of a TOML or JSON document takes its default value.
///
/// ```rust
/// use slc_core::constants::{PhysicalConstants, RHO_ICE};
///
/// let constants = PhysicalConstants::from_toml_str("ocean_area = 3.61e14").unwrap();
/// assert_eq!(constants.rho_ice, RHO_ICE);
/// assert_eq!(constants.ocean_area, 3.61e14);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Density of ice.
    /// unit: kg / m^3
    /// default: 917.0
    pub rho_ice: FloatValue,

    /// Density of seawater.
    /// unit: kg / m^3
    /// default: 1027.0
    pub rho_seawater: FloatValue,

    /// Density of freshwater.
    /// unit: kg / m^3
    /// default: 1000.0
    pub rho_freshwater: FloatValue,

    /// Global ocean area used for the sea-level-equivalent conversion.
    /// unit: m^2
    /// default: 3.625e14
    pub ocean_area: FloatValue,

    /// Length of a year.
    /// unit: s
    /// default: 31556926
    pub seconds_per_year: FloatValue,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            rho_ice: RHO_ICE,
            rho_seawater: RHO_SEAWATER,
            rho_freshwater: RHO_FRESHWATER,
            ocean_area: OCEAN_AREA,
            seconds_per_year: SECONDS_PER_YEAR,
        }
    }
}

impl PhysicalConstants {
    /// Parse a set of constants from a TOML document and validate it.
    pub fn from_toml_str(source: &str) -> SLCResult<Self> {
        let constants: Self = toml::from_str(source).map_err(|e| SLCError::Config(e.to_string()))?;
        constants.validate()?;
        Ok(constants)
    }

    /// Check that every density and area is strictly positive and finite.
    pub fn validate(&self) -> SLCResult<()> {
        let named = [
            ("rho_ice", self.rho_ice),
            ("rho_seawater", self.rho_seawater),
            ("rho_freshwater", self.rho_freshwater),
            ("ocean_area", self.ocean_area),
            ("seconds_per_year", self.seconds_per_year),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(SLCError::InvalidConstants(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Ratio of seawater to ice density, converting an ice column to its
    /// flotation thickness.
    pub fn seawater_to_ice(&self) -> FloatValue {
        self.rho_seawater / self.rho_ice
    }

    /// Ratio of ice to seawater density, converting ice volume to displaced ocean water.
    pub fn ice_to_seawater(&self) -> FloatValue {
        self.rho_ice / self.rho_seawater
    }

    /// Ratio of ice to freshwater density, converting ice volume to meltwater.
    pub fn ice_to_freshwater(&self) -> FloatValue {
        self.rho_ice / self.rho_freshwater
    }

    /// Ratio of freshwater to seawater density.
    pub fn freshwater_to_seawater(&self) -> FloatValue {
        self.rho_freshwater / self.rho_seawater
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_named_constants() {
        let constants = PhysicalConstants::default();
        assert_eq!(constants.rho_ice, 917.0);
        assert_eq!(constants.rho_seawater, 1027.0);
        assert_eq!(constants.rho_freshwater, 1000.0);
        assert_eq!(constants.ocean_area, 3.625e14);
        assert_eq!(constants.seconds_per_year, 31556926.0);
        assert!(constants.validate().is_ok());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let constants = PhysicalConstants::from_toml_str("rho_seawater = 1028.0").unwrap();
        assert_eq!(constants.rho_seawater, 1028.0);
        assert_eq!(constants.rho_ice, RHO_ICE);
        assert_eq!(constants.ocean_area, OCEAN_AREA);
    }

    #[test]
    fn empty_toml_is_default() {
        let constants = PhysicalConstants::from_toml_str("").unwrap();
        assert_eq!(constants, PhysicalConstants::default());
    }

    #[test]
    fn malformed_toml_errors() {
        let result = PhysicalConstants::from_toml_str("rho_ice = \"heavy\"");
        assert!(matches!(result, Err(SLCError::Config(_))));
    }

    #[test]
    fn non_positive_density_rejected() {
        let result = PhysicalConstants::from_toml_str("rho_ice = 0.0");
        match result {
            Err(SLCError::InvalidConstants(msg)) => assert!(msg.contains("rho_ice")),
            other => panic!("Expected InvalidConstants, got {:?}", other),
        }
    }

    #[test]
    fn density_ratios() {
        let constants = PhysicalConstants::default();
        assert_eq!(constants.seawater_to_ice(), 1027.0 / 917.0);
        assert_eq!(constants.ice_to_seawater(), 917.0 / 1027.0);
        assert_eq!(constants.ice_to_freshwater(), 0.917);
        assert_eq!(constants.freshwater_to_seawater(), 1000.0 / 1027.0);
    }
}
