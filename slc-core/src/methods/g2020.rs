//! Sea-level contribution following Goelzer et al. (2020), absolute reference frame
//!
//! Goelzer, H. et al., The Cryosphere 14, 833–840,
//! <https://doi.org/10.5194/tc-14-833-2020>
//!
//! Reformulated like [`A2020`](super::a2020::A2020): the bed elevation `B` is given in a
//! fixed absolute reference frame, so no datum correction for the sea-surface is needed.
//! The contribution is the sum of three independent terms:
//!
//! - change in volume above floatation, expressed as displaced ocean water (eq. 2, 3)
//! - change in potential ocean volume below the bed (eq. 8, 9)
//! - density correction for converting ice to freshwater (eq. 10, 11)
//!
//! See [`G2020Datum`](super::g2020_datum::G2020Datum) for the variant where bed
//! elevation is given relative to a time-varying sea-level datum.

use super::{sea_level_change, G2020Terms};
use crate::constants::PhysicalConstants;
use crate::errors::SLCResult;
use crate::field::{ensure_same_shape, negative_part, positive_part, Field, FloatValue};
use log::debug;
use ndarray::{Dimension, Zip};
use serde::{Deserialize, Serialize};

/// G2020 sea-level contribution in an absolute reference frame
///
/// Thickness above floatation per cell is
/// $$ h_{af} = \max\left(H + \frac{\rho_{sw}}{\rho_i}\min(B, 0), 0\right) $$
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct G2020 {
    constants: PhysicalConstants,
}

impl G2020 {
    /// Create the method with a custom set of physical constants
    pub fn from_constants(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Sea-level equivalent of an ice volume, via the ocean water it displaces
    fn displaced_ocean_water(&self, volume: FloatValue) -> FloatValue {
        volume / self.constants.ocean_area * self.constants.ice_to_seawater()
    }

    /// Volume above floatation (m^3), eq. 1/13
    pub fn volume_above_floatation<D: Dimension>(
        &self,
        thickness: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[("thickness", thickness), ("bed", bed), ("area", area)])?;
        let seawater_to_ice = self.constants.seawater_to_ice();
        Ok(Zip::from(thickness)
            .and(bed)
            .and(area)
            .fold(0.0, |acc, &h, &b, &a| {
                let flotation = negative_part(b) * seawater_to_ice;
                acc + positive_part(h + flotation) * a
            }))
    }

    /// Sea-level contribution from the change in volume above floatation.
    ///
    /// The volume is divided by seawater density to give the ocean water it displaces.
    pub fn slc_above_floatation<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference = self.volume_above_floatation(reference_thickness, reference_bed, area)?;
        let current = self.volume_above_floatation(thickness, bed, area)?;
        debug!(
            "G2020 volume above floatation: reference {:e} m^3, current {:e} m^3",
            reference, current
        );
        Ok(sea_level_change(
            self.displaced_ocean_water(reference),
            self.displaced_ocean_water(current),
        ))
    }

    /// Potential ocean volume below sea level (m^3), eq. 8/14
    pub fn potential_ocean_volume<D: Dimension>(
        &self,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[("bed", bed), ("area", area)])?;
        Ok(Zip::from(bed)
            .and(area)
            .fold(0.0, |acc, &b, &a| acc + positive_part(-b) * a))
    }

    /// Sea-level contribution from the change in potential ocean volume, eq. 9
    pub fn slc_potential_ocean_volume<D: Dimension>(
        &self,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference = self.potential_ocean_volume(reference_bed, area)?;
        let current = self.potential_ocean_volume(bed, area)?;
        Ok(sea_level_change(
            reference / self.constants.ocean_area,
            current / self.constants.ocean_area,
        ))
    }

    /// Density-correction volume (m^3), eq. 10
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
    pub fn terms<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<G2020Terms> {
        let terms = G2020Terms {
            above_floatation: self.slc_above_floatation(
                reference_thickness,
                thickness,
                reference_bed,
                bed,
                area,
            )?,
            potential_ocean_volume: self.slc_potential_ocean_volume(reference_bed, bed, area)?,
            density_correction: self.slc_density_correction(reference_thickness, thickness, area)?,
        };
        debug!("G2020 terms: {:?}", terms);
        Ok(terms)
    }

    /// Total sea-level contribution, eq. 12/15
    pub fn contribution<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        Ok(self
            .terms(reference_thickness, thickness, reference_bed, bed, area)?
            .total())
    }

    /// Volume of grounded ice (m^3), eq. 4
    ///
    /// A cell is grounded where `H > B·ρ_sw/ρ_i`.
    pub fn grounded_volume<D: Dimension>(
        &self,
        thickness: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[("thickness", thickness), ("bed", bed), ("area", area)])?;
        let seawater_to_ice = self.constants.seawater_to_ice();
        Ok(Zip::from(thickness)
            .and(bed)
            .and(area)
            .fold(0.0, |acc, &h, &b, &a| {
                if h > b * seawater_to_ice {
                    acc + h * a
                } else {
                    acc
                }
            }))
    }

    /// Sea-level equivalent change of grounded ice volume (diagnostic)
    pub fn slc_grounded<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference = self.grounded_volume(reference_thickness, reference_bed, area)?;
        let current = self.grounded_volume(thickness, bed, area)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{OCEAN_AREA, RHO_FRESHWATER, RHO_ICE, RHO_SEAWATER};
    use crate::errors::SLCError;
    use is_close::is_close;
    use ndarray::{array, Array2};

    fn single(value: f64) -> Array2<f64> {
        array![[value]]
    }

    #[test]
    fn volume_above_floatation_marine_cell() {
        let method = G2020::default();
        let volume = method
            .volume_above_floatation(&single(1000.0), &single(-500.0), &single(2.0))
            .unwrap();
        let expected = (1000.0 - 500.0 * RHO_SEAWATER / RHO_ICE) * 2.0;
        assert!(is_close!(volume, expected));
    }

    #[test]
    fn volume_above_floatation_land_cell_is_full_column() {
        let volume = G2020::default()
            .volume_above_floatation(&single(300.0), &single(250.0), &single(3.0))
            .unwrap();
        assert_eq!(volume, 900.0);
    }

    #[test]
    fn floating_ice_has_no_volume_above_floatation() {
        let volume = G2020::default()
            .volume_above_floatation(&single(200.0), &single(-1000.0), &single(1.0))
            .unwrap();
        assert_eq!(volume, 0.0);
    }

    #[test]
    fn potential_ocean_volume_only_below_zero() {
        let bed = array![-100.0, 0.0, 250.0, -20.0];
        let area = array![1.0, 1.0, 1.0, 2.0];
        let volume = G2020::default().potential_ocean_volume(&bed, &area).unwrap();
        assert_eq!(volume, 140.0);
    }

    #[test]
    fn bed_uplift_lowers_potential_ocean_volume() {
        // Uplift reduces the ocean basin below the ice: water is pushed out, sea level rises
        let area = single(OCEAN_AREA);
        let slc = G2020::default()
            .slc_potential_ocean_volume(&single(-500.0), &single(-490.0), &area)
            .unwrap();
        assert!(is_close!(slc, 10.0));
    }

    #[test]
    fn density_correction_value() {
        let area = single(OCEAN_AREA);
        let slc = G2020::default()
            .slc_density_correction(&single(1000.0), &single(900.0), &area)
            .unwrap();
        let expected = 100.0 * (RHO_ICE / RHO_FRESHWATER - RHO_ICE / RHO_SEAWATER);
        assert!(is_close!(slc, expected));
    }

    #[test]
    fn grounded_thinning_on_land() {
        // Bed above sea level: every term but above floatation and density is zero
        let bed = single(100.0);
        let area = single(OCEAN_AREA);
        let method = G2020::default();
        let terms = method
            .terms(&single(1000.0), &single(900.0), &bed, &bed, &area)
            .unwrap();
        assert!(is_close!(terms.above_floatation, 100.0 * RHO_ICE / RHO_SEAWATER));
        assert_eq!(terms.potential_ocean_volume, 0.0);
        // Together they convert the lost ice straight to freshwater
        assert!(is_close!(terms.total(), 100.0 * RHO_ICE / RHO_FRESHWATER));
    }

    #[test]
    fn contribution_is_sum_of_terms() {
        let h0 = array![[1000.0, 400.0], [0.0, 1500.0]];
        let h = array![[950.0, 380.0], [20.0, 1400.0]];
        let b0 = array![[-500.0, -700.0], [50.0, -100.0]];
        let b = array![[-498.0, -699.0], [50.5, -99.0]];
        let area = array![[1.0e9, 2.0e9], [3.0e9, 4.0e9]];
        let method = G2020::default();

        let slc = method.contribution(&h0, &h, &b0, &b, &area).unwrap();
        let summed = method.slc_above_floatation(&h0, &h, &b0, &b, &area).unwrap()
            + method.slc_potential_ocean_volume(&b0, &b, &area).unwrap()
            + method.slc_density_correction(&h0, &h, &area).unwrap();
        assert_eq!(slc, summed);
    }

    #[test]
    fn unchanged_state_contributes_nothing() {
        let h = array![[1000.0, 400.0], [0.0, 1500.0]];
        let b = array![[-500.0, -700.0], [50.0, -100.0]];
        let area = array![[1.0e9, 2.0e9], [3.0e9, 4.0e9]];
        let method = G2020::default();
        assert_eq!(method.contribution(&h, &h, &b, &b, &area).unwrap(), 0.0);
        assert_eq!(method.slc_grounded(&h, &h, &b, &b, &area).unwrap(), 0.0);
        assert_eq!(method.slc_total(&h, &h, &area).unwrap(), 0.0);
    }

    #[test]
    fn grounded_volume_uses_bed_threshold() {
        // Second cell: 100 < 200 * rho_sw / rho_i
        let h = array![1000.0, 100.0];
        let b = array![-500.0, 200.0];
        let area = array![2.0, 5.0];
        let volume = G2020::default().grounded_volume(&h, &b, &area).unwrap();
        assert_eq!(volume, 2000.0);
    }

    #[test]
    fn total_volume_is_area_weighted() {
        let h = array![1000.0, 200.0];
        let area = array![2.0, 5.0];
        let volume = G2020::default().total_volume(&h, &area).unwrap();
        assert!(is_close!(volume, 3000.0 * RHO_SEAWATER / RHO_ICE));
    }

    #[test]
    fn mismatched_area_errors() {
        let h = array![1000.0, 200.0];
        let area = array![2.0, 5.0, 1.0];
        let result = G2020::default().contribution(&h, &h, &h, &h, &area);
        assert!(matches!(result, Err(SLCError::ShapeMismatch { .. })));
    }
}
