//! Python bindings
//!
//! Exposes every methodology to numpy callers as plain functions. Arrays of any
//! dimensionality are accepted as long as all arrays passed to one call share a
//! shape; a mismatch raises `ValueError`. The standard physical constants are used.

use ndarray::IxDyn;
use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use slc_core::constants::{
    OCEAN_AREA, RHO_FRESHWATER, RHO_ICE, RHO_SEAWATER, SECONDS_PER_YEAR,
};
use slc_core::errors::SLCError;
use slc_core::field::{Field, FloatValue, IceSheetState};
use slc_core::methods::a2020::{CoverMasks, A2020};
use slc_core::methods::g2020::G2020;
use slc_core::methods::g2020_datum::G2020Datum;
use slc_core::methods::vaf::{self, Vaf};

type PyField<'py> = PyReadonlyArrayDyn<'py, FloatValue>;
type FieldTriple<'py> = (
    Bound<'py, PyArrayDyn<FloatValue>>,
    Bound<'py, PyArrayDyn<FloatValue>>,
    Bound<'py, PyArrayDyn<FloatValue>>,
);

fn to_py_err(e: SLCError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn field(array: &PyField<'_>) -> Field<IxDyn> {
    array.as_array().to_owned()
}

fn owned_state(
    thickness: &PyField<'_>,
    bed: &PyField<'_>,
    sea_surface: &PyField<'_>,
) -> (Field<IxDyn>, Field<IxDyn>, Field<IxDyn>) {
    (field(thickness), field(bed), field(sea_surface))
}

/// Binary ice, land and grounded-ice masks of one state (A2020)
#[pyfunction]
fn a2020_masks<'py>(
    py: Python<'py>,
    thickness: PyField<'py>,
    bed: PyField<'py>,
    sea_surface: PyField<'py>,
) -> PyResult<FieldTriple<'py>> {
    let masks = A2020::default()
        .classify(&field(&thickness), &field(&bed), &field(&sea_surface))
        .map_err(to_py_err)?;
    Ok((
        masks.ice.into_pyarray_bound(py),
        masks.land.into_pyarray_bound(py),
        masks.grounded.into_pyarray_bound(py),
    ))
}

/// Sea-level contribution (m) following A2020
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn a2020_slc(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    s0: PyField<'_>,
    s: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    let (h0, b0, s0) = owned_state(&h0, &b0, &s0);
    let (h, b, s) = owned_state(&h, &b, &s);
    let reference = IceSheetState::new(&h0, &b0, &s0).map_err(to_py_err)?;
    let current = IceSheetState::new(&h, &b, &s).map_err(to_py_err)?;
    A2020::default()
        .contribution(&reference, &current, &field(&area))
        .map_err(to_py_err)
}

/// Sea-level contribution (m) following A2020 with precomputed land and grounded masks
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn a2020_slc_with_masks(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    s0: PyField<'_>,
    s: PyField<'_>,
    l0: PyField<'_>,
    l: PyField<'_>,
    g0: PyField<'_>,
    g: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    let (h0, b0, s0) = owned_state(&h0, &b0, &s0);
    let (h, b, s) = owned_state(&h, &b, &s);
    let reference = IceSheetState::new(&h0, &b0, &s0).map_err(to_py_err)?;
    let current = IceSheetState::new(&h, &b, &s).map_err(to_py_err)?;
    // The ice mask only depends on thickness and does not enter the budget.
    let reference_masks = CoverMasks {
        ice: h0.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
        land: field(&l0),
        grounded: field(&g0),
    };
    let current_masks = CoverMasks {
        ice: h.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
        land: field(&l),
        grounded: field(&g),
    };
    A2020::default()
        .contribution_with_masks(
            &reference,
            &current,
            &reference_masks,
            &current_masks,
            &field(&area),
        )
        .map_err(to_py_err)
}

/// Per-cell migration, variation and total height change (m of ice) following A2020
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn a2020_height_budget<'py>(
    py: Python<'py>,
    h0: PyField<'py>,
    h: PyField<'py>,
    b0: PyField<'py>,
    b: PyField<'py>,
    s0: PyField<'py>,
    s: PyField<'py>,
) -> PyResult<FieldTriple<'py>> {
    let (h0, b0, s0) = owned_state(&h0, &b0, &s0);
    let (h, b, s) = owned_state(&h, &b, &s);
    let method = A2020::default();
    let reference = IceSheetState::new(&h0, &b0, &s0).map_err(to_py_err)?;
    let current = IceSheetState::new(&h, &b, &s).map_err(to_py_err)?;
    let reference_masks = method.classify_state(&reference).map_err(to_py_err)?;
    let current_masks = method.classify_state(&current).map_err(to_py_err)?;
    let budget = method
        .height_budget(&reference, &current, &reference_masks, &current_masks)
        .map_err(to_py_err)?;
    Ok((
        budget.migration.into_pyarray_bound(py),
        budget.variation.into_pyarray_bound(py),
        budget.total.into_pyarray_bound(py),
    ))
}

/// Sea-level contribution (m) following G2020 in an absolute frame
#[pyfunction]
fn g2020_slc(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020::default()
        .contribution(&field(&h0), &field(&h), &field(&b0), &field(&b), &field(&area))
        .map_err(to_py_err)
}

/// G2020 terms (above floatation, potential ocean volume, density correction) in m
#[pyfunction]
fn g2020_terms(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<(FloatValue, FloatValue, FloatValue)> {
    let terms = G2020::default()
        .terms(&field(&h0), &field(&h), &field(&b0), &field(&b), &field(&area))
        .map_err(to_py_err)?;
    Ok((
        terms.above_floatation,
        terms.potential_ocean_volume,
        terms.density_correction,
    ))
}

/// Above-floatation term (m) of G2020
#[pyfunction]
fn g2020_slc_above_floatation(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020::default()
        .slc_above_floatation(&field(&h0), &field(&h), &field(&b0), &field(&b), &field(&area))
        .map_err(to_py_err)
}

/// Potential-ocean-volume term (m) of G2020
#[pyfunction]
fn g2020_slc_potential_ocean_volume(
    b0: PyField<'_>,
    b: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020::default()
        .slc_potential_ocean_volume(&field(&b0), &field(&b), &field(&area))
        .map_err(to_py_err)
}

/// Density-correction term (m) of G2020
#[pyfunction]
fn g2020_slc_density_correction(
    h0: PyField<'_>,
    h: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020::default()
        .slc_density_correction(&field(&h0), &field(&h), &field(&area))
        .map_err(to_py_err)
}

/// Grounded-volume sea-level equivalent change (m) following G2020
#[pyfunction]
fn g2020_slc_grounded(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020::default()
        .slc_grounded(&field(&h0), &field(&h), &field(&b0), &field(&b), &field(&area))
        .map_err(to_py_err)
}

/// Total-volume sea-level equivalent change (m) following G2020
#[pyfunction]
fn g2020_slc_total(h0: PyField<'_>, h: PyField<'_>, area: PyField<'_>) -> PyResult<FloatValue> {
    G2020::default()
        .slc_total(&field(&h0), &field(&h), &field(&area))
        .map_err(to_py_err)
}

/// Sea-level contribution (m) following G2020 with bed relative to the datum `zn`
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn g2020_datum_slc(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    zn0: PyField<'_>,
    zn: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020Datum::default()
        .contribution(
            &field(&h0),
            &field(&h),
            &field(&b0),
            &field(&b),
            &field(&zn0),
            &field(&zn),
            &field(&area),
        )
        .map_err(to_py_err)
}

/// G2020 terms relative to the datum `zn`, in m
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn g2020_datum_terms(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    zn0: PyField<'_>,
    zn: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<(FloatValue, FloatValue, FloatValue)> {
    let terms = G2020Datum::default()
        .terms(
            &field(&h0),
            &field(&h),
            &field(&b0),
            &field(&b),
            &field(&zn0),
            &field(&zn),
            &field(&area),
        )
        .map_err(to_py_err)?;
    Ok((
        terms.above_floatation,
        terms.potential_ocean_volume,
        terms.density_correction,
    ))
}

/// Above-floatation term (m) of G2020 relative to the datum `zn`
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn g2020_datum_slc_above_floatation(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    zn0: PyField<'_>,
    zn: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020Datum::default()
        .slc_above_floatation(
            &field(&h0),
            &field(&h),
            &field(&b0),
            &field(&b),
            &field(&zn0),
            &field(&zn),
            &field(&area),
        )
        .map_err(to_py_err)
}

/// Potential-ocean-volume term (m) of G2020 below the datum `zn`
#[pyfunction]
fn g2020_datum_slc_potential_ocean_volume(
    b0: PyField<'_>,
    zn0: PyField<'_>,
    b: PyField<'_>,
    zn: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020Datum::default()
        .slc_potential_ocean_volume(
            &field(&b0),
            &field(&zn0),
            &field(&b),
            &field(&zn),
            &field(&area),
        )
        .map_err(to_py_err)
}

/// Density-correction term (m) of G2020, independent of the datum
#[pyfunction]
fn g2020_datum_slc_density_correction(
    h0: PyField<'_>,
    h: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020Datum::default()
        .slc_density_correction(&field(&h0), &field(&h), &field(&area))
        .map_err(to_py_err)
}

/// Total-volume sea-level equivalent change (m) following G2020, datum formulation
#[pyfunction]
fn g2020_datum_slc_total(
    h0: PyField<'_>,
    h: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020Datum::default()
        .slc_total(&field(&h0), &field(&h), &field(&area))
        .map_err(to_py_err)
}

/// Grounded-volume sea-level equivalent change (m) with a diagnostic sea level `sl`
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn g2020_datum_slc_grounded(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    sl0: PyField<'_>,
    sl: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    G2020Datum::default()
        .slc_grounded(
            &field(&h0),
            &field(&h),
            &field(&b0),
            &field(&b),
            &field(&sl0),
            &field(&sl),
            &field(&area),
        )
        .map_err(to_py_err)
}

/// Sea-level contribution (m) from volume above floatation, absolute frame
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn vaf_slc(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    s0: PyField<'_>,
    s: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    let (h0, b0, s0) = owned_state(&h0, &b0, &s0);
    let (h, b, s) = owned_state(&h, &b, &s);
    let reference = IceSheetState::new(&h0, &b0, &s0).map_err(to_py_err)?;
    let current = IceSheetState::new(&h, &b, &s).map_err(to_py_err)?;
    Vaf::default()
        .contribution(&reference, &current, &field(&area))
        .map_err(to_py_err)
}

/// Sea-level contribution (m) from volume above floatation, bed relative to sea level
#[pyfunction]
fn vaf_slc_bed_relative(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    let (h0, h, b0, b) = (field(&h0), field(&h), field(&b0), field(&b));
    Vaf::default()
        .contribution_bed_relative(&h0, &h, &b0, &b, &field(&area))
        .map_err(to_py_err)
}

/// Grounded-volume freshwater sea-level equivalent change (m)
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn vaf_slc_grounded(
    h0: PyField<'_>,
    h: PyField<'_>,
    b0: PyField<'_>,
    b: PyField<'_>,
    s0: PyField<'_>,
    s: PyField<'_>,
    area: PyField<'_>,
) -> PyResult<FloatValue> {
    let (h0, b0, s0) = owned_state(&h0, &b0, &s0);
    let (h, b, s) = owned_state(&h, &b, &s);
    let reference = IceSheetState::new(&h0, &b0, &s0).map_err(to_py_err)?;
    let current = IceSheetState::new(&h, &b, &s).map_err(to_py_err)?;
    Vaf::default()
        .slc_grounded(&reference, &current, &field(&area))
        .map_err(to_py_err)
}

/// Total-volume freshwater sea-level equivalent change (m)
#[pyfunction]
fn vaf_slc_total(h0: PyField<'_>, h: PyField<'_>, area: PyField<'_>) -> PyResult<FloatValue> {
    Vaf::default()
        .slc_total(&field(&h0), &field(&h), &field(&area))
        .map_err(to_py_err)
}

/// Area-weighted sum `Σ R·A` of a field
#[pyfunction]
fn area_weighted_sum(values: PyField<'_>, area: PyField<'_>) -> PyResult<FloatValue> {
    slc_core::field::area_weighted_sum(&field(&values), &field(&area)).map_err(to_py_err)
}

/// Change of the area-weighted mean of a field, normalised by `total_area`
#[pyfunction]
fn mean_difference(
    r0: PyField<'_>,
    r: PyField<'_>,
    area: PyField<'_>,
    total_area: FloatValue,
) -> PyResult<FloatValue> {
    vaf::mean_difference(&field(&r0), &field(&r), &field(&area), total_area).map_err(to_py_err)
}

#[pymodule]
#[pyo3(name = "_lib")]
fn slc(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("RHO_ICE", RHO_ICE)?;
    m.add("RHO_SEAWATER", RHO_SEAWATER)?;
    m.add("RHO_FRESHWATER", RHO_FRESHWATER)?;
    m.add("OCEAN_AREA", OCEAN_AREA)?;
    m.add("SECONDS_PER_YEAR", SECONDS_PER_YEAR)?;

    m.add_function(wrap_pyfunction!(a2020_masks, m)?)?;
    m.add_function(wrap_pyfunction!(a2020_slc, m)?)?;
    m.add_function(wrap_pyfunction!(a2020_slc_with_masks, m)?)?;
    m.add_function(wrap_pyfunction!(a2020_height_budget, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_slc, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_terms, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_slc_above_floatation, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_slc_potential_ocean_volume, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_slc_density_correction, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_slc_grounded, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_slc_total, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_datum_slc, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_datum_terms, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_datum_slc_above_floatation, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_datum_slc_potential_ocean_volume, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_datum_slc_density_correction, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_datum_slc_grounded, m)?)?;
    m.add_function(wrap_pyfunction!(g2020_datum_slc_total, m)?)?;
    m.add_function(wrap_pyfunction!(vaf_slc, m)?)?;
    m.add_function(wrap_pyfunction!(vaf_slc_bed_relative, m)?)?;
    m.add_function(wrap_pyfunction!(vaf_slc_grounded, m)?)?;
    m.add_function(wrap_pyfunction!(vaf_slc_total, m)?)?;
    m.add_function(wrap_pyfunction!(area_weighted_sum, m)?)?;
    m.add_function(wrap_pyfunction!(mean_difference, m)?)?;
    Ok(())
}
