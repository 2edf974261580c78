//! Sea-level contribution methodologies
//!
//! Each methodology is an independent leaf module that only shares the physical
//! constants and field helpers:
//!
//! - [`a2020::A2020`]: cover masks and a height budget (Adhikari et al. 2020)
//! - [`g2020::G2020`]: three-term decomposition in an absolute frame (Goelzer et al. 2020)
//! - [`g2020_datum::G2020Datum`]: the same decomposition relative to a sea-level datum
//! - [`vaf::Vaf`]: volume above floatation converted to freshwater (ISMIP6)
//!
//! All of them implement [`SeaLevelMethod`], which computes a contribution from a pair
//! of [`IceSheetState`]s. A methodology can also be picked at configuration time through
//! the [`Methodology`] enum.
//!
//! ```rust
//! use ndarray::array;
//! use slc_core::field::IceSheetState;
//! use slc_core::methods::Methodology;
//!
//! let methodology: Methodology = serde_json::from_str(r#"{"method": "Vaf"}"#).unwrap();
//!
//! let h0 = array![1000.0];
//! let h = array![900.0];
//! let bed = array![-500.0];
//! let sea_surface = array![0.0];
//! let area = array![1.0e12];
//! let reference = IceSheetState::new(&h0, &bed, &sea_surface).unwrap();
//! let current = IceSheetState::new(&h, &bed, &sea_surface).unwrap();
//!
//! let slc = methodology.sea_level_contribution(&reference, &current, &area).unwrap();
//! assert!(slc > 0.0);
//! ```

pub mod a2020;
pub mod g2020;
pub mod g2020_datum;
pub mod vaf;

use crate::constants::PhysicalConstants;
use crate::errors::{SLCError, SLCResult};
use crate::field::{Field, FloatValue, IceSheetState};
use a2020::A2020;
use g2020::G2020;
use g2020_datum::G2020Datum;
use log::info;
use ndarray::Dimension;
use serde::{Deserialize, Serialize};
use vaf::Vaf;

/// Sea-level contribution from the sea-level equivalents of two states.
///
/// A loss of ice volume (current below reference) gives a positive contribution.
#[inline]
pub(crate) fn sea_level_change(reference: FloatValue, current: FloatValue) -> FloatValue {
    -(current - reference)
}

/// Breakdown of a G2020 contribution into its three terms (m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct G2020Terms {
    /// Change in volume above floatation, as displaced ocean water
    pub above_floatation: FloatValue,
    /// Change in potential ocean volume below the bed
    pub potential_ocean_volume: FloatValue,
    /// Correction for the difference between freshwater and seawater density
    pub density_correction: FloatValue,
}

impl G2020Terms {
    /// Sum of the three terms
    pub fn total(&self) -> FloatValue {
        self.above_floatation + self.potential_ocean_volume + self.density_correction
    }
}

/// Capability shared by every methodology: a sea-level contribution from a pair of states.
///
/// How the `sea_surface` field of each state is interpreted depends on the implementation:
/// the local sea-surface elevation for [`A2020`] and [`Vaf`], the sea-level datum `zn`
/// for [`G2020Datum`], and unused by [`G2020`] and [`VafBedRelative`].
pub trait SeaLevelMethod<D: Dimension> {
    /// Short name of the methodology, used in log messages
    fn name(&self) -> &'static str;

    /// Sea-level contribution (m) of the change from `reference` to `current`
    fn sea_level_contribution(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue>;
}

impl<D: Dimension> SeaLevelMethod<D> for A2020 {
    fn name(&self) -> &'static str {
        "A2020"
    }

    fn sea_level_contribution(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        self.contribution(reference, current, area)
    }
}

impl<D: Dimension> SeaLevelMethod<D> for G2020 {
    fn name(&self) -> &'static str {
        "G2020"
    }

    fn sea_level_contribution(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        self.contribution(
            reference.thickness,
            current.thickness,
            reference.bed,
            current.bed,
            area,
        )
    }
}

impl<D: Dimension> SeaLevelMethod<D> for G2020Datum {
    fn name(&self) -> &'static str {
        "G2020Datum"
    }

    fn sea_level_contribution(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        self.contribution(
            reference.thickness,
            current.thickness,
            reference.bed,
            current.bed,
            reference.sea_surface,
            current.sea_surface,
            area,
        )
    }
}

impl<D: Dimension> SeaLevelMethod<D> for Vaf {
    fn name(&self) -> &'static str {
        "Vaf"
    }

    fn sea_level_contribution(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        self.contribution(reference, current, area)
    }
}

/// [`Vaf`] with the bed given relative to the contemporary sea level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VafBedRelative(pub Vaf);

impl<D: Dimension> SeaLevelMethod<D> for VafBedRelative {
    fn name(&self) -> &'static str {
        "VafBedRelative"
    }

    fn sea_level_contribution(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        self.0.contribution_bed_relative(
            reference.thickness,
            current.thickness,
            reference.bed,
            current.bed,
            area,
        )
    }
}

/// Methodology selected at configuration time
///
/// Serialised with a `method` tag and optional `constants` table, e.g. in TOML:
///
/// ```toml
/// method = "G2020Datum"
///
/// [constants]
/// ocean_area = 3.61e14
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Methodology {
    A2020 {
        #[serde(default)]
        constants: PhysicalConstants,
    },
    G2020 {
        #[serde(default)]
        constants: PhysicalConstants,
    },
    G2020Datum {
        #[serde(default)]
        constants: PhysicalConstants,
    },
    Vaf {
        #[serde(default)]
        constants: PhysicalConstants,
    },
    VafBedRelative {
        #[serde(default)]
        constants: PhysicalConstants,
    },
}

impl Methodology {
    /// Parse a methodology selection from a TOML document and validate its constants.
    pub fn from_toml_str(source: &str) -> SLCResult<Self> {
        let methodology: Self =
            toml::from_str(source).map_err(|e| SLCError::Config(e.to_string()))?;
        methodology.constants().validate()?;
        Ok(methodology)
    }

    /// Physical constants the methodology will use
    pub fn constants(&self) -> &PhysicalConstants {
        match self {
            Methodology::A2020 { constants }
            | Methodology::G2020 { constants }
            | Methodology::G2020Datum { constants }
            | Methodology::Vaf { constants }
            | Methodology::VafBedRelative { constants } => constants,
        }
    }

    /// Sea-level contribution using the selected methodology
    ///
    /// The constants are validated first, so a selection deserialised without
    /// [`from_toml_str`](Self::from_toml_str) cannot divide by a zero density.
    pub fn sea_level_contribution<D: Dimension>(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let constants = *self.constants();
        constants.validate()?;
        match self {
            Methodology::A2020 { .. } => {
                evaluate(&A2020::from_constants(constants), reference, current, area)
            }
            Methodology::G2020 { .. } => {
                evaluate(&G2020::from_constants(constants), reference, current, area)
            }
            Methodology::G2020Datum { .. } => {
                evaluate(&G2020Datum::from_constants(constants), reference, current, area)
            }
            Methodology::Vaf { .. } => {
                evaluate(&Vaf::from_constants(constants), reference, current, area)
            }
            Methodology::VafBedRelative { .. } => evaluate(
                &VafBedRelative(Vaf::from_constants(constants)),
                reference,
                current,
                area,
            ),
        }
    }
}

fn evaluate<D: Dimension, M: SeaLevelMethod<D>>(
    method: &M,
    reference: &IceSheetState<'_, D>,
    current: &IceSheetState<'_, D>,
    area: &Field<D>,
) -> SLCResult<FloatValue> {
    let slc = method.sea_level_contribution(reference, current, area)?;
    info!("{} sea-level contribution: {:e} m", method.name(), slc);
    Ok(slc)
}
