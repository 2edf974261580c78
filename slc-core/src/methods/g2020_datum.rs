//! Sea-level contribution following Goelzer et al. (2020), relative to a sea-level datum
//!
//! Goelzer, H. et al., The Cryosphere 14, 833–840,
//! <https://doi.org/10.5194/tc-14-833-2020>
//!
//! Symbols follow the paper, with the bed elevation `b` given relative to a
//! time-varying datum `zn` (the paper's `z0`) that represents the local sea-level
//! surface. Setting `zn = 0` in both states recovers eq. 8 and 12, and therefore the
//! absolute-frame [`G2020`](super::g2020::G2020) results.

use super::{sea_level_change, G2020Terms};
use crate::constants::PhysicalConstants;
use crate::errors::SLCResult;
use crate::field::{ensure_same_shape, negative_part, positive_part, Field, FloatValue};
use log::debug;
use ndarray::{Dimension, Zip};
use serde::{Deserialize, Serialize};

/// G2020 sea-level contribution with bed elevation relative to a sea-level datum
///
/// Thickness above floatation per cell is
/// $$ h_{af} = \max\left(H + \frac{\rho_{sw}}{\rho_i}\min(b - z_n, 0), 0\right) $$
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct G2020Datum {
    constants: PhysicalConstants,
}

impl G2020Datum {
    /// Create the method with a custom set of physical constants
    pub fn from_constants(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    fn displaced_ocean_water(&self, volume: FloatValue) -> FloatValue {
        volume / self.constants.ocean_area * self.constants.ice_to_seawater()
    }

    /// Volume above floatation (m^3), eq. 13
    pub fn volume_above_floatation<D: Dimension>(
        &self,
        thickness: &Field<D>,
        bed: &Field<D>,
        datum: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[
            ("thickness", thickness),
            ("bed", bed),
            ("datum", datum),
            ("area", area),
        ])?;
        let seawater_to_ice = self.constants.seawater_to_ice();
        Ok(Zip::from(thickness)
            .and(bed)
            .and(datum)
            .and(area)
            .fold(0.0, |acc, &h, &b, &zn, &a| {
                let flotation = negative_part(b - zn) * seawater_to_ice;
                acc + positive_part(h + flotation) * a
            }))
    }

    /// Sea-level contribution from the change in volume above floatation, eq. 2, 3
    #[allow(clippy::too_many_arguments)]
    pub fn slc_above_floatation<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        reference_datum: &Field<D>,
        datum: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference = self.volume_above_floatation(
            reference_thickness,
            reference_bed,
            reference_datum,
            area,
        )?;
        let current = self.volume_above_floatation(thickness, bed, datum, area)?;
        debug!(
            "G2020 (datum) volume above floatation: reference {:e} m^3, current {:e} m^3",
            reference, current
        );
        Ok(sea_level_change(
            self.displaced_ocean_water(reference),
            self.displaced_ocean_water(current),
        ))
    }

    /// Potential ocean volume between bed and datum (m^3), eq. 14
    pub fn potential_ocean_volume<D: Dimension>(
        &self,
        bed: &Field<D>,
        datum: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[("bed", bed), ("datum", datum), ("area", area)])?;
        Ok(Zip::from(bed)
            .and(datum)
            .and(area)
            .fold(0.0, |acc, &b, &zn, &a| acc + positive_part(zn - b) * a))
    }

    /// Sea-level contribution from the change in potential ocean volume, eq. 9
    pub fn slc_potential_ocean_volume<D: Dimension>(
        &self,
        reference_bed: &Field<D>,
        reference_datum: &Field<D>,
        bed: &Field<D>,
        datum: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference = self.potential_ocean_volume(reference_bed, reference_datum, area)?;
        let current = self.potential_ocean_volume(bed, datum, area)?;
        Ok(sea_level_change(
            reference / self.constants.ocean_area,
            current / self.constants.ocean_area,
        ))
    }

    /// Density-correction volume (m^3), eq. 10. Independent of the datum.
    pub fn density_correction_volume<D: Dimension>(
        &self,
        thickness: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[("thickness", thickness), ("area", area)])?;
        let correction = self.constants.ice_to_freshwater() - self.constants.ice_to_seawater();
        Ok(Zip::from(thickness)
            .and(area)
            .fold(0.0, |acc, &h, &a| acc + h * correction * a))
    }

    /// Sea-level contribution from the density correction, eq. 11
    pub fn slc_density_correction<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference = self.density_correction_volume(reference_thickness, area)?;
        let current = self.density_correction_volume(thickness, area)?;
        Ok(sea_level_change(
            reference / self.constants.ocean_area,
            current / self.constants.ocean_area,
        ))
    }

    /// The three contributions, each evaluated independently
    #[allow(clippy::too_many_arguments)]
    pub fn terms<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        reference_datum: &Field<D>,
        datum: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<G2020Terms> {
        let terms = G2020Terms {
            above_floatation: self.slc_above_floatation(
                reference_thickness,
                thickness,
                reference_bed,
                bed,
                reference_datum,
                datum,
                area,
            )?,
            potential_ocean_volume: self.slc_potential_ocean_volume(
                reference_bed,
                reference_datum,
                bed,
                datum,
                area,
            )?,
            density_correction: self.slc_density_correction(reference_thickness, thickness, area)?,
        };
        debug!("G2020 (datum) terms: {:?}", terms);
        Ok(terms)
    }

    /// Total sea-level contribution, eq. 15
    #[allow(clippy::too_many_arguments)]
    pub fn contribution<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        reference_datum: &Field<D>,
        datum: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        Ok(self
            .terms(
                reference_thickness,
                thickness,
                reference_bed,
                bed,
                reference_datum,
                datum,
                area,
            )?
            .total())
    }

    /// Volume of grounded ice (m^3), eq. 4
    ///
    /// A cell is grounded where `H > (b − sl)·ρ_sw/ρ_i`, with `sl` a diagnostic
    /// sea-level field that need not equal the datum.
    pub fn grounded_volume<D: Dimension>(
        &self,
        thickness: &Field<D>,
        bed: &Field<D>,
        sea_level: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[
            ("thickness", thickness),
            ("bed", bed),
            ("sea_level", sea_level),
            ("area", area),
        ])?;
        let seawater_to_ice = self.constants.seawater_to_ice();
        Ok(Zip::from(thickness)
            .and(bed)
            .and(sea_level)
            .and(area)
            .fold(0.0, |acc, &h, &b, &sl, &a| {
                if h > (b - sl) * seawater_to_ice {
                    acc + h * a
                } else {
                    acc
                }
            }))
    }

    /// Sea-level equivalent change of grounded ice volume (diagnostic)
    #[allow(clippy::too_many_arguments)]
    pub fn slc_grounded<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        reference_sea_level: &Field<D>,
        sea_level: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference =
            self.grounded_volume(reference_thickness, reference_bed, reference_sea_level, area)?;
        let current = self.grounded_volume(thickness, bed, sea_level, area)?;
        Ok(sea_level_change(
            self.displaced_ocean_water(reference),
            self.displaced_ocean_water(current),
        ))
    }

    /// Total ice volume expressed as a flotation-thickness volume (m^3)
    pub fn total_volume<D: Dimension>(
        &self,
        thickness: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[("thickness", thickness), ("area", area)])?;
        let seawater_to_ice = self.constants.seawater_to_ice();
        Ok(Zip::from(thickness)
            .and(area)
            .fold(0.0, |acc, &h, &a| acc + h * seawater_to_ice * a))
    }

    /// Sea-level equivalent change of total ice volume (diagnostic)
    pub fn slc_total<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference = self.total_volume(reference_thickness, area)?;
        let current = self.total_volume(thickness, area)?;
        Ok(sea_level_change(
            self.displaced_ocean_water(reference),
            self.displaced_ocean_water(current),
        ))
    }
}
