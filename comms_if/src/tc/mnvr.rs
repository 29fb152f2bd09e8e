//! # Motion manoeuvre telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A motion manoeuvre that can be completed by thruster control.
///
/// Each degree of freedom is a normalised demand nominally in the range
/// `[-1, +1]`. Values outside this range are accepted and saturated at the
/// mixer output, never rejected.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, StructOpt)]
pub struct MnvrCmd {
    /// Demand along the vehicle's X+ (forwards) axis.
    ///
    /// Positive demands are "forwards", negative demands are "backwards".
    pub surge: f64,

    /// Demand along the vehicle's Y+ (starboard) axis.
    ///
    /// Positive demands translate the vehicle to the right, negative to the
    /// left.
    pub sway: f64,

    /// Demand along the vehicle's Z+ (upwards) axis.
    ///
    /// Positive demands move the vehicle towards the surface, negative
    /// towards the seabed.
    pub heave: f64,

    /// Rotational demand about the vehicle's Z+ (upwards) axis.
    ///
    /// Follows the right hand grip rule, so that a positive demand will
    /// rotate the vehicle to the left and a negative demand to the right.
    pub yaw: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MnvrCmd {
    /// A manoeuvre with all degrees of freedom at zero, commanding every
    /// thruster to its neutral pulse width.
    pub fn zero() -> Self {
        MnvrCmd {
            surge: 0.0,
            sway: 0.0,
            heave: 0.0,
            yaw: 0.0,
        }
    }
}
