//! Closed cross-section curves: ellipses with feature bumps.

use smallvec::SmallVec;
use std::f64::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Perimeter of an ellipse with semi-axes `a` and `b` (Ramanujan's second
/// approximation).
#[must_use]
pub fn ellipse_perimeter(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum <= 0.0 {
        return 0.0;
    }
    let h = ((a - b) / sum).powi(2);
    PI * sum * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
}

/// Semi-axes `(a, aspect * a)` of the ellipse with the given perimeter.
#[must_use]
pub fn semi_axes_for_perimeter(perimeter: f64, aspect: f64) -> (f64, f64) {
    let a = perimeter / ellipse_perimeter(1.0, aspect);
    (a, aspect * a)
}

/// Polar radius of an ellipse centred at the origin.
#[must_use]
pub fn ellipse_radius(a: f64, b: f64, angle: f64) -> f64 {
    let (s, c) = angle.sin_cos();
    a * b / ((b * c).powi(2) + (a * s).powi(2)).sqrt()
}

/// Smallest signed difference between two angles, in `(-π, π]`.
#[must_use]
pub fn angle_delta(angle: f64, center: f64) -> f64 {
    let d = (angle - center).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

/// A Gaussian radial bump on a section, such as a ridge or keel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bump {
    /// Angle of the crest, radians from the frame's first axis.
    pub angle: f64,
    /// Angular standard width, radians.
    pub width: f64,
    /// Radial height at the crest, millimeters.
    pub height: f64,
}

impl Bump {
    /// Create a bump.
    #[must_use]
    pub const fn new(angle: f64, width: f64, height: f64) -> Self {
        Self {
            angle,
            width,
            height,
        }
    }

    /// Radial contribution at `angle`.
    #[must_use]
    pub fn at(&self, angle: f64) -> f64 {
        let x = angle_delta(angle, self.angle) / self.width;
        self.height * (-x * x).exp()
    }

    /// Copy with the height multiplied by `factor`.
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        self.height *= factor;
        self
    }
}

/// One planar section ring in piece-local coordinates.
///
/// The ring lies in the plane `w = const`; its polar radius is an ellipse
/// plus bumps, measured from `(cu, cv)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RingShape {
    /// Axial position.
    pub w: f64,
    /// Centre along the frame's first radial axis.
    pub cu: f64,
    /// Centre along the frame's second radial axis.
    pub cv: f64,
    /// Semi-axis along the first radial axis.
    pub a: f64,
    /// Semi-axis along the second radial axis.
    pub b: f64,
    /// Feature bumps, already scaled by their axial envelope.
    pub bumps: SmallVec<[Bump; 2]>,
}

impl RingShape {
    /// A plain elliptical ring.
    #[must_use]
    pub fn ellipse(w: f64, a: f64, b: f64) -> Self {
        Self {
            w,
            cu: 0.0,
            cv: 0.0,
            a,
            b,
            bumps: SmallVec::new(),
        }
    }

    /// Copy with the centre moved.
    #[must_use]
    pub const fn centered(mut self, cu: f64, cv: f64) -> Self {
        self.cu = cu;
        self.cv = cv;
        self
    }

    /// Copy with an extra bump.
    #[must_use]
    pub fn with_bump(mut self, bump: Bump) -> Self {
        if bump.height.abs() > 0.0 {
            self.bumps.push(bump);
        }
        self
    }

    /// Polar radius at `angle`.
    #[must_use]
    pub fn radius(&self, angle: f64) -> f64 {
        ellipse_radius(self.a, self.b, angle) + self.bumps.iter().map(|b| b.at(angle)).sum::<f64>()
    }

    /// Local `(u, v)` of the ring point at `angle`.
    #[must_use]
    pub fn point(&self, angle: f64) -> (f64, f64) {
        let r = self.radius(angle);
        let (s, c) = angle.sin_cos();
        (self.cu + r * c, self.cv + r * s)
    }

    /// Linear blend of two rings with matching bump lists.
    ///
    /// Bumps present on only one side fade in proportionally.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let mix = |x: f64, y: f64| x + (y - x) * t;
        let mut bumps: SmallVec<[Bump; 2]> = SmallVec::new();
        for (i, b) in self.bumps.iter().enumerate() {
            let h = other.bumps.get(i).map_or(0.0, |o| o.height);
            bumps.push(Bump::new(b.angle, b.width, mix(b.height, h)));
        }
        for b in other.bumps.iter().skip(self.bumps.len()) {
            bumps.push(b.scaled(t));
        }
        Self {
            w: mix(self.w, other.w),
            cu: mix(self.cu, other.cu),
            cv: mix(self.cv, other.cv),
            a: mix(self.a, other.a),
            b: mix(self.b, other.b),
            bumps,
        }
    }

    /// Copy with every length multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            w: self.w * factor,
            cu: self.cu * factor,
            cv: self.cv * factor,
            a: self.a * factor,
            b: self.b * factor,
            bumps: self.bumps.iter().map(|b| b.scaled(factor)).collect(),
        }
    }
}

/// Sample angles around a ring.
///
/// With a warp `(center, strength)`, samples crowd around `center`: the local
/// spacing there shrinks by `1 - strength` and grows by `1 + strength` on the
/// opposite side. For `center = π/2` and `n` a multiple of 4, `center` is
/// itself a sample and the set stays symmetric under `θ -> π - θ`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ring_angles(n: usize, warp: Option<(f64, f64)>) -> Vec<f64> {
    (0..n)
        .map(|k| {
            let phi = TAU * k as f64 / n as f64;
            match warp {
                Some((center, strength)) => {
                    phi - strength * (phi - center).sin()
                }
                None => phi,
            }
        })
        .collect()
}
