pub mod normalize;
pub mod codec;
pub mod overlap;
pub mod structural;
pub mod boundary;

pub use normalize::*;
pub use codec::*;
pub use overlap::*;
pub use structural::*;
pub use boundary::*;

use crate::{
    error::{Result, SilhouetteError},
    types::BinaryMask,
};

/// Metrics only compare grids of identical shape; anything else is an
/// upstream normalization bug and is reported, never padded or cropped.
pub(crate) fn ensure_same_shape(a: &BinaryMask, b: &BinaryMask) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(SilhouetteError::ShapeMismatch {
            left: a.shape(),
            right: b.shape(),
        });
    }
    Ok(())
}
