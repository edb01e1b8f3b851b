//! Scalar type and tolerance shared by every cut
//!
//! `Real` follows the `f64`/`f32` feature, and so does the parry build re-exported as
//! [`parry3d`], so ray casts against a mesh use the same precision as its positions.

#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// On-plane distance used when a request does not set its own `epsilon`.
///
/// Resolved once, first match wins: [`set_tolerance`] called before any extraction, the
/// `CONTOURCUT_TOLERANCE` variable at build time, then the precision default.
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn precision_default() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-5
    }
    #[cfg(feature = "f64")]
    {
        1e-9
    }
}

/// Distance under which a vertex counts as lying on a cutting plane, the default of
/// [`ExtractOptions::epsilon`](crate::extract::ExtractOptions::epsilon).
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        option_env!("CONTOURCUT_TOLERANCE")
            .and_then(|raw| Real::from_str(raw).ok())
            .map_or_else(precision_default, |value| value.max(Real::EPSILON))
    })
}

/// Fix the default on-plane distance. Only the first call counts, and only if no
/// extraction has read [`tolerance`] yet.
pub fn set_tolerance(value: Real) {
    if TOLERANCE_CELL.set(value.max(Real::EPSILON)).is_err() {
        log::debug!("tolerance already fixed at {}; ignoring {}", tolerance(), value);
    }
}

#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;
