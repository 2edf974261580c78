//! Sea-level contribution from volume above floatation (ISMIP6)
//!
//! Following ISMIP6 (<https://doi.org/10.5194/tc-14-3071-2020>,
//! <https://doi.org/10.1029/2024EF004561>), the change in volume above floatation is
//! converted directly to freshwater. This differs from [`G2020`](super::g2020::G2020),
//! which first expresses the volume as displaced seawater and adds a separate density
//! correction.
//!
//! Two coordinate conventions are supported:
//! - absolute frame: bed `B` and sea surface `S` relative to the same reference
//! - bed relative: `B` given relative to sea level at that time (equivalently `S = 0`)

use super::sea_level_change;
use crate::constants::PhysicalConstants;
use crate::errors::SLCResult;
use crate::field::{
    area_weighted_sum, ensure_same_shape, positive_part, Field, FloatValue, IceSheetState,
};
use log::debug;
use ndarray::{Dimension, Zip};
use serde::{Deserialize, Serialize};

/// Volume-above-floatation sea-level contribution
///
/// $$ h_f = \frac{\rho_{sw}}{\rho_i}\max(S - B, 0), \quad
///    V_{af} = \sum \max(H - h_f, 0) A, \quad
///    SLE = \frac{V_{af}}{A_O}\frac{\rho_i}{\rho_{fw}} $$
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vaf {
    constants: PhysicalConstants,
}

impl Vaf {
    /// Create the method with a custom set of physical constants
    pub fn from_constants(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Sea-level equivalent of an ice volume converted to freshwater
    fn freshwater_equivalent(&self, volume: FloatValue) -> FloatValue {
        volume / self.constants.ocean_area * self.constants.ice_to_freshwater()
    }

    /// Volume above floatation (m^3) with `B` and `S` in an absolute frame
    pub fn volume_above_floatation<D: Dimension>(
        &self,
        thickness: &Field<D>,
        bed: &Field<D>,
        sea_surface: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[
            ("thickness", thickness),
            ("bed", bed),
            ("sea_surface", sea_surface),
            ("area", area),
        ])?;
        let seawater_to_ice = self.constants.seawater_to_ice();
        Ok(Zip::from(thickness)
            .and(bed)
            .and(sea_surface)
            .and(area)
            .fold(0.0, |acc, &h, &b, &s, &a| {
                let flotation = positive_part(s - b) * seawater_to_ice;
                acc + positive_part(h - flotation) * a
            }))
    }

    /// Sea-level contribution between two states in an absolute frame
    pub fn contribution<D: Dimension>(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let volume_reference = self.volume_above_floatation(
            reference.thickness,
            reference.bed,
            reference.sea_surface,
            area,
        )?;
        let volume_current = self.volume_above_floatation(
            current.thickness,
            current.bed,
            current.sea_surface,
            area,
        )?;
        debug!(
            "VAF: reference {:e} m^3, current {:e} m^3",
            volume_reference, volume_current
        );
        Ok(sea_level_change(
            self.freshwater_equivalent(volume_reference),
            self.freshwater_equivalent(volume_current),
        ))
    }

    /// Volume above floatation (m^3) with `B` relative to the contemporary sea level
    pub fn volume_above_floatation_bed_relative<D: Dimension>(
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
                let flotation = positive_part(-b) * seawater_to_ice;
                acc + positive_part(h - flotation) * a
            }))
    }

    /// Sea-level contribution between two states with `B` relative to sea level
    pub fn contribution_bed_relative<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        reference_bed: &Field<D>,
        bed: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let volume_reference =
            self.volume_above_floatation_bed_relative(reference_thickness, reference_bed, area)?;
        let volume_current = self.volume_above_floatation_bed_relative(thickness, bed, area)?;
        debug!(
            "VAF (bed relative): reference {:e} m^3, current {:e} m^3",
            volume_reference, volume_current
        );
        Ok(sea_level_change(
            self.freshwater_equivalent(volume_reference),
            self.freshwater_equivalent(volume_current),
        ))
    }

    /// Volume of grounded ice (m^3), where `H > (B − S)·ρ_sw/ρ_i`
    pub fn grounded_volume<D: Dimension>(
        &self,
        thickness: &Field<D>,
        bed: &Field<D>,
        sea_surface: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        ensure_same_shape(&[
            ("thickness", thickness),
            ("bed", bed),
            ("sea_surface", sea_surface),
            ("area", area),
        ])?;
        let seawater_to_ice = self.constants.seawater_to_ice();
        Ok(Zip::from(thickness)
            .and(bed)
            .and(sea_surface)
            .and(area)
            .fold(0.0, |acc, &h, &b, &s, &a| {
                if h > (b - s) * seawater_to_ice {
                    acc + h * a
                } else {
                    acc
                }
            }))
    }

    /// Freshwater sea-level equivalent change of grounded ice volume (diagnostic)
    pub fn slc_grounded<D: Dimension>(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let volume_reference = self.grounded_volume(
            reference.thickness,
            reference.bed,
            reference.sea_surface,
            area,
        )?;
        let volume_current =
            self.grounded_volume(current.thickness, current.bed, current.sea_surface, area)?;
        Ok(sea_level_change(
            self.freshwater_equivalent(volume_reference),
            self.freshwater_equivalent(volume_current),
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

    /// Freshwater sea-level equivalent change of total ice volume (diagnostic)
    pub fn slc_total<D: Dimension>(
        &self,
        reference_thickness: &Field<D>,
        thickness: &Field<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let volume_reference = self.total_volume(reference_thickness, area)?;
        let volume_current = self.total_volume(thickness, area)?;
        Ok(sea_level_change(
            self.freshwater_equivalent(volume_reference),
            self.freshwater_equivalent(volume_current),
        ))
    }
}

/// Change of the area-weighted mean of any field between two states.
///
/// Both sums are normalised by `total_area`, which the caller supplies so the mean
/// can be taken over a different region than the grid covers (for global mean
/// sea-level change, the ocean area). Use [`total_area`](crate::field::total_area)
/// for the mean over the grid itself.
pub fn mean_difference<D: Dimension>(
    reference: &Field<D>,
    current: &Field<D>,
    area: &Field<D>,
    total_area: FloatValue,
) -> SLCResult<FloatValue> {
    ensure_same_shape(&[("reference", reference), ("current", current), ("area", area)])?;
    let mean_reference = area_weighted_sum(reference, area)? / total_area;
    let mean_current = area_weighted_sum(current, area)? / total_area;
    Ok(mean_current - mean_reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{OCEAN_AREA, RHO_FRESHWATER, RHO_ICE, RHO_SEAWATER};
    use crate::errors::SLCError;
    use crate::field::total_area;
    use is_close::is_close;
    use ndarray::{array, Array2};

    #[test]
    fn volume_above_floatation_absolute_frame() {
        let volume = Vaf::default()
            .volume_above_floatation(&array![1000.0], &array![-500.0], &array![10.0], &array![2.0])
            .unwrap();
        assert!(is_close!(volume, 2.0 * (1000.0 - 510.0 * RHO_SEAWATER / RHO_ICE)));
    }

    #[test]
    fn bed_relative_equals_absolute_with_zero_sea_surface() {
        let h = array![[1000.0, 50.0], [700.0, 0.0]];
        let b = array![[-500.0, -800.0], [120.0, -10.0]];
        let s = Array2::<f64>::zeros((2, 2));
        let area = array![[1.0e9, 2.0e9], [3.0e9, 4.0e9]];
        let method = Vaf::default();
        assert_eq!(
            method.volume_above_floatation(&h, &b, &s, &area).unwrap(),
            method
                .volume_above_floatation_bed_relative(&h, &b, &area)
                .unwrap()
        );
    }

    #[test]
    fn thinning_grounded_cell() {
        // H0 = 1000 m, H = 900 m, both grounded on a bed 500 m below sea level
        let h0 = array![[1000.0]];
        let h = array![[900.0]];
        let b = array![[-500.0]];
        let s = array![[0.0]];
        let area = array![[OCEAN_AREA]];
        let reference = IceSheetState::new(&h0, &b, &s).unwrap();
        let current = IceSheetState::new(&h, &b, &s).unwrap();

        let method = Vaf::default();
        let slc = method.contribution(&reference, &current, &area).unwrap();
        assert!(is_close!(slc, 100.0 * RHO_ICE / RHO_FRESHWATER));

        let slc_bed_relative = method
            .contribution_bed_relative(&h0, &h, &b, &b, &area)
            .unwrap();
        assert_eq!(slc, slc_bed_relative);
    }

    #[test]
    fn floating_ice_does_not_contribute() {
        let b = array![-1000.0];
        let s = array![0.0];
        let area = array![OCEAN_AREA];
        let h0 = array![300.0];
        let h = array![100.0];
        let reference = IceSheetState::new(&h0, &b, &s).unwrap();
        let current = IceSheetState::new(&h, &b, &s).unwrap();
        let slc = Vaf::default()
            .contribution(&reference, &current, &area)
            .unwrap();
        assert_eq!(slc, 0.0);
    }

    #[test]
    fn diagnostics_unchanged_state() {
        let h = array![1000.0, 300.0];
        let b = array![-500.0, 100.0];
        let s = array![0.0, 0.0];
        let area = array![1.0e10, 1.0e10];
        let state = IceSheetState::new(&h, &b, &s).unwrap();
        let method = Vaf::default();
        assert_eq!(method.slc_grounded(&state, &state, &area).unwrap(), 0.0);
        assert_eq!(method.slc_total(&h, &h, &area).unwrap(), 0.0);
    }

    #[test]
    fn total_volume_change_is_freshwater_converted() {
        let area = array![OCEAN_AREA];
        let slc = Vaf::default()
            .slc_total(&array![1000.0], &array![900.0], &area)
            .unwrap();
        assert!(is_close!(
            slc,
            100.0 * RHO_SEAWATER / RHO_ICE * RHO_ICE / RHO_FRESHWATER
        ));
    }

    #[test]
    fn mean_difference_over_grid() {
        let sea_surface0 = array![0.0, 0.0, 0.0];
        let sea_surface = array![1.0, 2.0, 4.0];
        let area = array![1.0, 1.0, 2.0];
        let change =
            mean_difference(&sea_surface0, &sea_surface, &area, total_area(&area)).unwrap();
        assert_eq!(change, 11.0 / 4.0);
    }

    #[test]
    fn mean_difference_rejects_mismatch() {
        let result = mean_difference(&array![0.0, 1.0], &array![0.0], &array![1.0, 1.0], 2.0);
        assert!(matches!(result, Err(SLCError::ShapeMismatch { .. })));
    }
}
