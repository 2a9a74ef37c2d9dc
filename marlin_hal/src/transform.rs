// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors and 4x4 transforms in the form they cross the native boundary.

use core::ops::Mul;

use peniko::kurbo::Affine;
use peniko::Color;

/// Straight-alpha components of `color` in `0.0..=1.0`, as the backend takes
/// them.
pub(crate) fn rgba_f32(color: Color) -> [f32; 4] {
    [color.r, color.g, color.b, color.a].map(|c| f32::from(c) / 255.0)
}

/// A 4x4 transform, stored row-major as it crosses the native boundary.
///
/// Points are column vectors: `p' = M p`, with the translation in the last
/// column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    m: [f32; 16],
}

impl Transform3D {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const fn from_row_major(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Embed a 2D affine in the z = 0 plane.
    pub fn from_affine(transform: &Affine) -> Self {
        let [a, b, c, d, e, f] = transform.as_coeffs().map(|v| v as f32);
        Self::from_row_major([
            a, c, 0.0, e, //
            b, d, 0.0, f, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.m[3] = x;
        t.m[7] = y;
        t.m[11] = z;
        t
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.m[0] = x;
        t.m[5] = y;
        t.m[10] = z;
        t
    }

    /// Rotation about the z axis, in radians.
    pub fn rotate_z(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut t = Self::IDENTITY;
        t.m[0] = cos;
        t.m[1] = -sin;
        t.m[4] = sin;
        t.m[5] = cos;
        t
    }

    /// A perspective projection looking down -z, with the camera at the
    /// origin and the image plane at distance `focal`.
    pub fn perspective(focal: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.m[14] = -1.0 / focal;
        t.m[15] = 0.0;
        t
    }

    pub fn to_row_major(&self) -> &[f32; 16] {
        &self.m
    }

    /// Apply to a point, dividing by w.
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let row = |r: usize| {
            let m = &self.m[r * 4..r * 4 + 4];
            m[0] * p[0] + m[1] * p[1] + m[2] * p[2] + m[3]
        };
        let w = row(3);
        let w = if w == 0.0 { 1.0 } else { w };
        [row(0) / w, row(1) / w, row(2) / w]
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3D {
    type Output = Self;

    /// `self * rhs` applies `rhs` first.
    fn mul(self, rhs: Self) -> Self {
        let mut m = [0.0_f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                m[row * 4 + col] = (0..4)
                    .map(|k| self.m[row * 4 + k] * rhs.m[k * 4 + col])
                    .sum::<f32>();
            }
        }
        Self { m }
    }
}
