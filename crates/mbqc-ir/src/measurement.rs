//! Measurement planes, angles and Pauli operators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when recognizing Pauli angles.
const PAULI_ANGLE_TOLERANCE: f64 = 1e-12;

/// A single-qubit Pauli operator.
///
/// Used both as a measurement axis and as the kind of a byproduct correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Combine an X component and a Z component into a single Pauli.
    ///
    /// Returns `None` when neither component is present.
    pub fn from_components(x: bool, z: bool) -> Option<Self> {
        match (x, z) {
            (true, true) => Some(Pauli::Y),
            (true, false) => Some(Pauli::X),
            (false, true) => Some(Pauli::Z),
            (false, false) => None,
        }
    }

    /// Whether this Pauli has an X component (X or Y).
    #[inline]
    pub fn has_x(self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }

    /// Whether this Pauli has a Z component (Z or Y).
    #[inline]
    pub fn has_z(self) -> bool {
        matches!(self, Pauli::Z | Pauli::Y)
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        };
        f.write_str(name)
    }
}

/// The plane of the Bloch sphere a measurement is taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Plane {
    /// Equatorial plane: `cos(θ)X + sin(θ)Y`.
    #[default]
    XY,
    /// `cos(θ)Y + sin(θ)Z`.
    YZ,
    /// `cos(θ)X + sin(θ)Z`.
    XZ,
}

impl Plane {
    /// Axes spanning the plane, as `(cos axis, sin axis)`.
    pub fn axes(self) -> (Pauli, Pauli) {
        match self {
            Plane::XY => (Pauli::X, Pauli::Y),
            Plane::YZ => (Pauli::Y, Pauli::Z),
            Plane::XZ => (Pauli::X, Pauli::Z),
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Plane::XY => "XY",
            Plane::YZ => "YZ",
            Plane::XZ => "XZ",
        };
        f.write_str(name)
    }
}

/// A single-qubit measurement: a plane and an angle in units of π.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measurement plane.
    pub plane: Plane,
    /// Measurement angle in units of π.
    pub angle: f64,
}

impl Measurement {
    /// Create a measurement in an arbitrary plane.
    pub fn new(plane: Plane, angle: f64) -> Self {
        Self { plane, angle }
    }

    /// Create an XY-plane measurement.
    pub fn xy(angle: f64) -> Self {
        Self::new(Plane::XY, angle)
    }

    /// Create a YZ-plane measurement.
    pub fn yz(angle: f64) -> Self {
        Self::new(Plane::YZ, angle)
    }

    /// Create an XZ-plane measurement.
    pub fn xz(angle: f64) -> Self {
        Self::new(Plane::XZ, angle)
    }

    /// Create a Pauli measurement along the given axis.
    pub fn pauli(axis: Pauli) -> Self {
        match axis {
            Pauli::X => Self::xy(0.0),
            Pauli::Y => Self::xy(0.5),
            Pauli::Z => Self::yz(0.5),
        }
    }

    /// Return the Pauli axis if the angle is a multiple of π/2.
    ///
    /// Non-finite angles are never Pauli.
    pub fn pauli_axis(&self) -> Option<Pauli> {
        if !self.angle.is_finite() {
            return None;
        }
        let normalized = self.angle.rem_euclid(2.0);
        let quarter = (normalized * 2.0).round();
        if (normalized * 2.0 - quarter).abs() > PAULI_ANGLE_TOLERANCE {
            return None;
        }
        let (cos_axis, sin_axis) = self.plane.axes();
        // quarter turns: 0 and 2 lie on the cos axis, 1 and 3 on the sin axis
        match quarter as u8 % 2 {
            0 => Some(cos_axis),
            _ => Some(sin_axis),
        }
    }

    /// Check if this is a Pauli measurement.
    #[inline]
    pub fn is_pauli(&self) -> bool {
        self.pauli_axis().is_some()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.plane, self.angle)
    }
}
