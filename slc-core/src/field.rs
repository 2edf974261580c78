//! Gridded fields and area-weighted reductions
//!
//! Every quantity handled by this crate is a scalar field over a fixed grid,
//! represented as an [`ndarray::Array`] of any dimensionality. Fields used
//! together in one call must be co-registered: same shape, same cell ordering.
//! No broadcasting is performed; a shape mismatch is reported as
//! [`SLCError::ShapeMismatch`] before any arithmetic happens.
//!
//! Volume integrals are always area-weighted sums `Σ q·A` because cell area may
//! vary across the grid.
//!
//! ```rust
//! use ndarray::array;
//! use slc_core::field::{area_weighted_sum, total_area};
//!
//! let depth = array![[1.0, 2.0], [3.0, 4.0]];
//! let area = array![[10.0, 10.0], [20.0, 20.0]];
//! assert_eq!(area_weighted_sum(&depth, &area).unwrap(), 170.0);
//! assert_eq!(total_area(&area), 60.0);
//! ```

use crate::errors::{SLCError, SLCResult};
use ndarray::{Array, Dimension, Zip};

/// Floating point type used for every field and scalar result.
pub type FloatValue = f64;

/// A gridded scalar field.
pub type Field<D> = Array<FloatValue, D>;

/// Geometry of an ice sheet at a single instant.
///
/// Bundles the thickness, bed elevation and sea-surface elevation (or datum) of
/// one state. The fields are borrowed; building a state does not copy the grids.
/// Which coordinate convention `bed` and `sea_surface` follow depends on the
/// methodology the state is passed to.
#[derive(Debug, Clone, Copy)]
pub struct IceSheetState<'a, D: Dimension> {
    /// Ice thickness (m), expected to be non-negative
    pub thickness: &'a Field<D>,
    /// Bed elevation (m)
    pub bed: &'a Field<D>,
    /// Sea-surface elevation or sea-level datum (m)
    pub sea_surface: &'a Field<D>,
}

impl<'a, D: Dimension> IceSheetState<'a, D> {
    /// Bundle three fields into a state, checking they share a shape.
    pub fn new(
        thickness: &'a Field<D>,
        bed: &'a Field<D>,
        sea_surface: &'a Field<D>,
    ) -> SLCResult<Self> {
        ensure_same_shape(&[
            ("thickness", thickness),
            ("bed", bed),
            ("sea_surface", sea_surface),
        ])?;
        Ok(Self {
            thickness,
            bed,
            sea_surface,
        })
    }

    /// Shape of the grid this state lives on
    pub fn shape(&self) -> &[usize] {
        self.thickness.shape()
    }
}

/// Check that all named fields share the shape of the first one.
///
/// The error names the first field that disagrees.
pub fn ensure_same_shape<D: Dimension>(fields: &[(&str, &Field<D>)]) -> SLCResult<()> {
    let Some((_, first)) = fields.first() else {
        return Ok(());
    };
    let expected = first.shape();
    for (name, field) in &fields[1..] {
        if field.shape() != expected {
            return Err(SLCError::ShapeMismatch {
                field: name.to_string(),
                expected: expected.to_vec(),
                found: field.shape().to_vec(),
            });
        }
    }
    Ok(())
}

/// Area-weighted sum `Σ R·A` of an arbitrary field.
pub fn area_weighted_sum<D: Dimension>(
    values: &Field<D>,
    area: &Field<D>,
) -> SLCResult<FloatValue> {
    ensure_same_shape(&[("values", values), ("area", area)])?;
    Ok(Zip::from(values)
        .and(area)
        .fold(0.0, |acc, &value, &cell_area| acc + value * cell_area))
}

/// Total area of a grid, `Σ A`.
pub fn total_area<D: Dimension>(area: &Field<D>) -> FloatValue {
    area.iter().fold(0.0, |acc, &cell_area| acc + cell_area)
}

/// `max(x, 0)` that keeps NaN instead of silently replacing it with zero.
#[inline]
pub(crate) fn positive_part(x: FloatValue) -> FloatValue {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// `min(x, 0)` that keeps NaN instead of silently replacing it with zero.
#[inline]
pub(crate) fn negative_part(x: FloatValue) -> FloatValue {
    if x > 0.0 {
        0.0
    } else {
        x
    }
}
