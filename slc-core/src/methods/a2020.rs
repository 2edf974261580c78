//! Sea-level contribution following Adhikari et al. (2020)
//!
//! Adhikari, S. et al., The Cryosphere 14, 2819–2833,
//! <https://doi.org/10.5194/tc-14-2819-2020>
//!
//! Bed elevation `B` and sea-surface elevation `S` are given in the same absolute
//! reference frame. Every cell of each state is first classified as ocean/floating or
//! land/grounded, and as ice-covered or ice-free. The change in ice thickness is then
//! split into a migration term and a variation term, whose sum is converted into a
//! sea-level contribution.

use crate::constants::PhysicalConstants;
use crate::errors::SLCResult;
use crate::field::{
    area_weighted_sum, ensure_same_shape, positive_part, Field, FloatValue, IceSheetState,
};
use log::{debug, trace};
use ndarray::{Dimension, Zip};
use serde::{Deserialize, Serialize};

/// Binary cover masks of one ice-sheet state
///
/// Each field holds 1.0 where the cell belongs to the class and 0.0 elsewhere,
/// so the masks can be used directly as multiplicative weights.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverMasks<D: Dimension> {
    /// Ice-covered cells (grounded or floating), `I`
    pub ice: Field<D>,
    /// Land or grounded cells, `L`. The complement of the ocean/floating mask.
    pub land: Field<D>,
    /// Grounded ice, `G = I·L`
    pub grounded: Field<D>,
}

/// Per-cell decomposition of the ice height change between two states
///
/// All heights are in metres of ice.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightBudget<D: Dimension> {
    /// Migration term `HM`: raw thickness change where a cell is grounded in both
    /// states, change of the shelf-equivalent height elsewhere
    pub migration: Field<D>,
    /// Variation term `HV`: buoyancy correction, non-zero only where a cell is not
    /// grounded in both states
    pub variation: Field<D>,
    /// Combined height change `HS = HM + HV`
    pub total: Field<D>,
}

/// A2020 sea-level contribution calculations
///
/// A cell floats when its thickness is below the flotation thickness:
/// $$ F = H - \frac{\rho_{sw}}{\rho_i}(S - B) < 0 $$
///
/// The shelf-equivalent height of grounded ice is
/// $$ H_F = G\left(H - \frac{\rho_{sw}}{\rho_i}\max(S - B, 0)\right) $$
///
/// and the sea-level contribution is
/// $$ SLC = -\frac{\rho_i}{\rho_{fw}} \frac{\sum (H_M + H_V) A}{A_O} $$
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct A2020 {
    constants: PhysicalConstants,
}

impl A2020 {
    /// Create the method with a custom set of physical constants
    pub fn from_constants(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Classify every cell of one state.
    ///
    /// Degenerate all-zero input classifies every cell as ice-free land.
    pub fn classify<D: Dimension>(
        &self,
        thickness: &Field<D>,
        bed: &Field<D>,
        sea_surface: &Field<D>,
    ) -> SLCResult<CoverMasks<D>> {
        ensure_same_shape(&[
            ("thickness", thickness),
            ("bed", bed),
            ("sea_surface", sea_surface),
        ])?;
        let seawater_to_ice = self.constants.seawater_to_ice();

        let land = Zip::from(thickness)
            .and(bed)
            .and(sea_surface)
            .map_collect(|&h, &b, &s| {
                let floating = h - seawater_to_ice * (s - b) < 0.0;
                if floating {
                    0.0
                } else {
                    1.0
                }
            });
        let ice = thickness.mapv(|h| if h > 0.0 { 1.0 } else { 0.0 });
        let grounded = Zip::from(&ice)
            .and(&land)
            .map_collect(|&ice, &land| ice * land);

        trace!(
            "A2020 classification: {} ice cells, {} grounded of {}",
            ice.iter().filter(|&&v| v > 0.0).count(),
            grounded.iter().filter(|&&v| v > 0.0).count(),
            ice.len()
        );

        Ok(CoverMasks {
            ice,
            land,
            grounded,
        })
    }

    /// Classify a state bundled as an [`IceSheetState`]
    pub fn classify_state<D: Dimension>(
        &self,
        state: &IceSheetState<'_, D>,
    ) -> SLCResult<CoverMasks<D>> {
        self.classify(state.thickness, state.bed, state.sea_surface)
    }

    /// Shelf-equivalent height `H_F = G·(H − H_n)` with `H_n = ρ_sw/ρ_i · max(S − B, 0)`
    fn shelf_equivalent<D: Dimension>(
        &self,
        state: &IceSheetState<'_, D>,
        grounded: &Field<D>,
    ) -> Field<D> {
        let seawater_to_ice = self.constants.seawater_to_ice();
        Zip::from(state.thickness)
            .and(state.bed)
            .and(state.sea_surface)
            .and(grounded)
            .map_collect(|&h, &b, &s, &g| {
                let neutral = seawater_to_ice * positive_part(s - b);
                g * (h - neutral)
            })
    }

    /// Per-cell height budget between two states using precomputed masks.
    ///
    /// Cells that change between grounded and floating are attributed through the
    /// shelf-equivalent height rather than the raw thickness change.
    pub fn height_budget<D: Dimension>(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        reference_masks: &CoverMasks<D>,
        current_masks: &CoverMasks<D>,
    ) -> SLCResult<HeightBudget<D>> {
        ensure_same_shape(&[
            ("reference.thickness", reference.thickness),
            ("reference.bed", reference.bed),
            ("reference.sea_surface", reference.sea_surface),
            ("current.thickness", current.thickness),
            ("current.bed", current.bed),
            ("current.sea_surface", current.sea_surface),
            ("reference_masks.ice", &reference_masks.ice),
            ("reference_masks.land", &reference_masks.land),
            ("reference_masks.grounded", &reference_masks.grounded),
            ("current_masks.ice", &current_masks.ice),
            ("current_masks.land", &current_masks.land),
            ("current_masks.grounded", &current_masks.grounded),
        ])?;

        let shelf_reference = self.shelf_equivalent(reference, &reference_masks.grounded);
        let shelf_current = self.shelf_equivalent(current, &current_masks.grounded);
        let variation_factor = 1.0 - self.constants.freshwater_to_seawater();

        let thickness_change = Zip::from(reference.thickness)
            .and(current.thickness)
            .map_collect(|&h0, &h| h - h0);
        let shelf_change = Zip::from(&shelf_reference)
            .and(&shelf_current)
            .map_collect(|&hf0, &hf| hf - hf0);

        let mut migration = Field::zeros(current.thickness.raw_dim());
        let mut variation = Field::zeros(current.thickness.raw_dim());
        Zip::from(&mut migration)
            .and(&mut variation)
            .and(&thickness_change)
            .and(&shelf_change)
            .and(&reference_masks.land)
            .and(&current_masks.land)
            .for_each(|hm, hv, &dh, &dhf, &l0, &l| {
                let both_land = l0 * l;
                *hm = dh * both_land + dhf * (1.0 - both_land);
                *hv = variation_factor * (dh - dhf) * (1.0 - both_land);
            });
        let total = Zip::from(&migration)
            .and(&variation)
            .map_collect(|&hm, &hv| hm + hv);

        Ok(HeightBudget {
            migration,
            variation,
            total,
        })
    }

    /// Sea-level contribution between two states, classifying each state independently.
    ///
    /// A cell may change classification between the reference and current state.
    pub fn contribution<D: Dimension>(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let reference_masks = self.classify_state(reference)?;
        let current_masks = self.classify_state(current)?;
        self.contribution_with_masks(reference, current, &reference_masks, &current_masks, area)
    }

    /// Sea-level contribution between two states with masks supplied by the caller.
    ///
    /// Lets callers reuse masks across repeated evaluations. Given the masks that
    /// [`classify`](Self::classify) produces, the result is identical to
    /// [`contribution`](Self::contribution).
    pub fn contribution_with_masks<D: Dimension>(
        &self,
        reference: &IceSheetState<'_, D>,
        current: &IceSheetState<'_, D>,
        reference_masks: &CoverMasks<D>,
        current_masks: &CoverMasks<D>,
        area: &Field<D>,
    ) -> SLCResult<FloatValue> {
        let budget = self.height_budget(reference, current, reference_masks, current_masks)?;
        let volume = area_weighted_sum(&budget.total, area)?;
        let slc = -self.constants.ice_to_freshwater() * volume / self.constants.ocean_area;

        debug!("A2020: height change volume {:e} m^3, slc {:e} m", volume, slc);
        Ok(slc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{OCEAN_AREA, RHO_FRESHWATER, RHO_ICE, RHO_SEAWATER};
    use crate::errors::SLCError;
    use is_close::is_close;
    use ndarray::{array, Array1, Array2};

    fn single(value: f64) -> Array2<f64> {
        array![[value]]
    }

    #[test]
    fn classify_grounded_cell() {
        // F = 1000 - 1027/917 * 500 ≈ 440 > 0
        let masks = A2020::default()
            .classify(&single(1000.0), &single(-500.0), &single(0.0))
            .unwrap();
        assert_eq!(masks.ice, single(1.0));
        assert_eq!(masks.land, single(1.0));
        assert_eq!(masks.grounded, single(1.0));
    }

    #[test]
    fn classify_floating_cell() {
        let masks = A2020::default()
            .classify(&single(100.0), &single(-500.0), &single(0.0))
            .unwrap();
        assert_eq!(masks.ice, single(1.0));
        assert_eq!(masks.land, single(0.0));
        assert_eq!(masks.grounded, single(0.0));
    }

    #[test]
    fn classify_open_ocean_and_bare_land() {
        let thickness = array![0.0, 0.0];
        let bed = array![-200.0, 300.0];
        let sea_surface = array![0.0, 0.0];
        let masks = A2020::default()
            .classify(&thickness, &bed, &sea_surface)
            .unwrap();
        assert_eq!(masks.ice, array![0.0, 0.0]);
        assert_eq!(masks.land, array![0.0, 1.0]);
        assert_eq!(masks.grounded, array![0.0, 0.0]);
    }

    #[test]
    fn classify_all_zero_is_ice_free_land() {
        let zeros = Array2::<f64>::zeros((3, 4));
        let masks = A2020::default().classify(&zeros, &zeros, &zeros).unwrap();
        assert!(masks.land.iter().all(|&v| v == 1.0));
        assert!(masks.ice.iter().all(|&v| v == 0.0));
        assert!(masks.grounded.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn classify_rejects_mismatched_shapes() {
        let result = A2020::default().classify(
            &Array1::<f64>::zeros(3),
            &Array1::<f64>::zeros(3),
            &Array1::<f64>::zeros(4),
        );
        assert!(matches!(result, Err(SLCError::ShapeMismatch { .. })));
    }

    #[test]
    fn unchanged_state_contributes_nothing() {
        let thickness = array![[1000.0, 50.0], [0.0, 2500.0]];
        let bed = array![[-500.0, -800.0], [-100.0, 400.0]];
        let sea_surface = array![[0.0, 0.5], [0.2, 0.0]];
        let area = array![[1.0e9, 2.0e9], [1.5e9, 0.5e9]];
        let state = IceSheetState::new(&thickness, &bed, &sea_surface).unwrap();

        let slc = A2020::default().contribution(&state, &state, &area).unwrap();
        assert_eq!(slc, 0.0);
    }

    #[test]
    fn grounded_thinning_raises_sea_level() {
        let bed = single(-500.0);
        let sea_surface = single(0.0);
        let area = single(OCEAN_AREA);
        let h0 = single(1000.0);
        let h = single(900.0);
        let reference = IceSheetState::new(&h0, &bed, &sea_surface).unwrap();
        let current = IceSheetState::new(&h, &bed, &sea_surface).unwrap();

        let method = A2020::default();
        let slc = method.contribution(&reference, &current, &area).unwrap();
        // Grounded in both states: raw thickness change, freshwater conversion
        assert!(is_close!(slc, 100.0 * RHO_ICE / RHO_FRESHWATER));

        let slc_thickening = method.contribution(&current, &reference, &area).unwrap();
        assert!(slc_thickening < 0.0);
    }

    #[test]
    fn ungrounding_uses_shelf_equivalent() {
        let bed = single(-500.0);
        let sea_surface = single(0.0);
        let area = single(OCEAN_AREA);
        let h0 = single(1000.0);
        let h = single(400.0);
        let reference = IceSheetState::new(&h0, &bed, &sea_surface).unwrap();
        let current = IceSheetState::new(&h, &bed, &sea_surface).unwrap();

        let method = A2020::default();
        let current_masks = method.classify_state(&current).unwrap();
        assert_eq!(current_masks.land, single(0.0));

        let reference_masks = method.classify_state(&reference).unwrap();
        let budget = method
            .height_budget(&reference, &current, &reference_masks, &current_masks)
            .unwrap();

        let hf0 = 1000.0 - RHO_SEAWATER / RHO_ICE * 500.0;
        let expected_migration = -hf0;
        let expected_variation = (1.0 - RHO_FRESHWATER / RHO_SEAWATER) * (-600.0 + hf0);
        assert!(is_close!(budget.migration[[0, 0]], expected_migration));
        assert!(is_close!(budget.variation[[0, 0]], expected_variation));
        assert!(is_close!(
            budget.total[[0, 0]],
            expected_migration + expected_variation
        ));

        let slc = method.contribution(&reference, &current, &area).unwrap();
        assert!(is_close!(
            slc,
            -RHO_ICE / RHO_FRESHWATER * (expected_migration + expected_variation)
        ));
        assert!(slc > 0.0);
    }

    #[test]
    fn floating_ice_change_only_has_density_effect() {
        // Floating in both states: no grounded ice, HF = 0
        let bed = single(-1000.0);
        let sea_surface = single(0.0);
        let area = single(OCEAN_AREA);
        let h0 = single(300.0);
        let h = single(200.0);
        let reference = IceSheetState::new(&h0, &bed, &sea_surface).unwrap();
        let current = IceSheetState::new(&h, &bed, &sea_surface).unwrap();

        let slc = A2020::default()
            .contribution(&reference, &current, &area)
            .unwrap();
        let expected =
            RHO_ICE / RHO_FRESHWATER * (1.0 - RHO_FRESHWATER / RHO_SEAWATER) * 100.0;
        assert!(is_close!(slc, expected));
    }

    #[test]
    fn masks_supplied_by_caller_match() {
        let h0 = array![1000.0, 400.0, 0.0, 1200.0];
        let h = array![900.0, 650.0, 10.0, 0.0];
        let b0 = array![-500.0, -500.0, 100.0, -50.0];
        let b = array![-495.0, -500.0, 100.0, -45.0];
        let s0 = array![0.0, 0.0, 0.0, 0.0];
        let s = array![0.1, 0.1, 0.1, 0.1];
        let area = array![1.0e10, 2.0e10, 3.0e10, 4.0e10];
        let reference = IceSheetState::new(&h0, &b0, &s0).unwrap();
        let current = IceSheetState::new(&h, &b, &s).unwrap();

        let method = A2020::default();
        let reference_masks = method.classify_state(&reference).unwrap();
        let current_masks = method.classify_state(&current).unwrap();

        let direct = method.contribution(&reference, &current, &area).unwrap();
        let reused = method
            .contribution_with_masks(&reference, &current, &reference_masks, &current_masks, &area)
            .unwrap();
        assert_eq!(direct.to_bits(), reused.to_bits());
    }

    #[test]
    fn mis_shaped_ice_mask_rejected() {
        let h = array![1000.0, 400.0];
        let b = array![-500.0, -500.0];
        let s = array![0.0, 0.0];
        let state = IceSheetState::new(&h, &b, &s).unwrap();

        let method = A2020::default();
        let masks = method.classify_state(&state).unwrap();
        let mut bad_masks = masks.clone();
        bad_masks.ice = array![1.0, 1.0, 0.0];

        let result = method.height_budget(&state, &state, &masks, &bad_masks);
        match result {
            Err(SLCError::ShapeMismatch { field, found, .. }) => {
                assert_eq!(field, "current_masks.ice");
                assert_eq!(found, vec![3]);
            }
            other => panic!("Expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn area_must_match_grid() {
        let h = Array1::<f64>::zeros(3);
        let state = IceSheetState::new(&h, &h, &h).unwrap();
        let area = Array1::<f64>::ones(2);
        let result = A2020::default().contribution(&state, &state, &area);
        match result {
            Err(SLCError::ShapeMismatch { field, .. }) => assert_eq!(field, "area"),
            other => panic!("Expected ShapeMismatch, got {:?}", other),
        }
    }
}
