//! Arm geometry model
//!
//! The kinematic chain is an ordered list of revolute joints. Each joint
//! rotates about one of the axes of its local frame and is followed by a rigid
//! link, expressed as an offset in the joint's (rotated) local frame. With all
//! joint angles at zero the chain is straight along the offsets.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

// Internal
use crate::joint::NUM_KIN_JOINTS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single revolute joint and the link which follows it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The local axis about which the joint rotates.
    pub axis: Axis,

    /// Offset from this joint to the next one, in the joint's local frame.
    ///
    /// Units: centimeters
    pub offset_cm: [f64; 3],
}

/// The full kinematic chain of the arm.
///
/// Once built a chain is never modified, it describes one physical arm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSpec {
    links: [Link; NUM_KIN_JOINTS],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Rotation axis of a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Axis {
    /// Unit vector of the axis.
    pub fn unit(&self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

impl Link {
    pub const fn new(axis: Axis, offset_cm: [f64; 3]) -> Self {
        Self { axis, offset_cm }
    }

    /// Rotation produced by this joint at the given angle.
    pub fn rotation(&self, angle_rad: f64) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&self.axis.unit(), angle_rad)
    }

    /// The link offset as a vector.
    pub fn offset(&self) -> Vector3<f64> {
        Vector3::new(self.offset_cm[0], self.offset_cm[1], self.offset_cm[2])
    }

    /// Length of the link.
    ///
    /// Units: centimeters
    pub fn length_cm(&self) -> f64 {
        self.offset().norm()
    }
}

impl LinkSpec {
    pub const fn new(links: [Link; NUM_KIN_JOINTS]) -> Self {
        Self { links }
    }

    /// Geometry of the reference arm.
    ///
    /// - Joint 0 rotates about z, followed by a 1.5 cm link along z.
    /// - Joint 1 rotates about x, followed by a 9.6 cm link along -y.
    /// - Joint 2 rotates about x, followed by a 17.7 cm link along -y.
    pub const fn reference() -> Self {
        Self::new([
            Link::new(Axis::Z, [0.0, 0.0, 1.5]),
            Link::new(Axis::X, [0.0, -9.6, 0.0]),
            Link::new(Axis::X, [0.0, -17.7, 0.0]),
        ])
    }

    /// The links in chain order, base first.
    pub fn links(&self) -> &[Link; NUM_KIN_JOINTS] {
        &self.links
    }

    /// Total length of the chain when fully stretched.
    ///
    /// Units: centimeters
    pub fn max_reach_cm(&self) -> f64 {
        self.links.iter().map(Link::length_cm).sum()
    }
}

impl Default for LinkSpec {
    fn default() -> Self {
        Self::reference()
    }
}
