use std::ops::{Mul, Index, IndexMut};

use crate::vector::Vec3;
use crate::quaternion::Quaternion;

/// 4 x 4 homogeneous transform matrix, stored as 16 floats in row-major
/// order: `m[0..4]` is the first row, the translation column sits at
/// indices 3, 7 and 11.
#[derive(Clone, Copy, PartialEq, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    pub m: [f32; 16],
}
impl Mat4 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        r0c0: f32, r0c1: f32, r0c2: f32, r0c3: f32,
        r1c0: f32, r1c1: f32, r1c2: f32, r1c3: f32,
        r2c0: f32, r2c1: f32, r2c2: f32, r2c3: f32,
        r3c0: f32, r3c1: f32, r3c2: f32, r3c3: f32,
    ) -> Self {
        Self {
            m: [
                r0c0, r0c1, r0c2, r0c3,
                r1c0, r1c1, r1c2, r1c3,
                r2c0, r2c1, r2c2, r2c3,
                r3c0, r3c1, r3c2, r3c3,
            ]
        }
    }

    pub fn identity() -> Self {
        Self::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0
        )
    }

    pub fn from_translation(v: Vec3) -> Self {
        Self::new(
            1.0, 0.0, 0.0, v.x,
            0.0, 1.0, 0.0, v.y,
            0.0, 0.0, 1.0, v.z,
            0.0, 0.0, 0.0, 1.0
        )
    }

    pub fn from_scale(s: f32) -> Self {
        Self::from_nonuniform_scale(s, s, s)
    }

    pub fn from_nonuniform_scale(s1: f32, s2: f32, s3: f32) -> Self {
        Self::new(
            s1,  0.0, 0.0, 0.0,
            0.0, s2,  0.0, 0.0,
            0.0, 0.0, s3,  0.0,
            0.0, 0.0, 0.0, 1.0
        )
    }

    /// Sum of the rotation sub-block diagonal.
    pub fn trace(&self) -> f32 {
        self.m[0] + self.m[5] + self.m[10]
    }

    /// Applies the rotation sub-block only, ignoring translation.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.m[0]*v.x + self.m[1]*v.y + self.m[2]*v.z,
            self.m[4]*v.x + self.m[5]*v.y + self.m[6]*v.z,
            self.m[8]*v.x + self.m[9]*v.y + self.m[10]*v.z,
        )
    }

    /// Applies the full transform to a point with implicit w = 1.
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        self.transform_vector(v) + Vec3::new(self.m[3], self.m[7], self.m[11])
    }

    /// The same matrix with rows and columns swapped. CSS `matrix3d()`
    /// consumes column-major element order.
    pub fn transposed(&self) -> Self {
        let m = &self.m;
        Self::new(
            m[0], m[4], m[8],  m[12],
            m[1], m[5], m[9],  m[13],
            m[2], m[6], m[10], m[14],
            m[3], m[7], m[11], m[15],
        )
    }
}

impl Index<usize> for Mat4 {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.m[i]
    }
}

impl IndexMut<usize> for Mat4 {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.m[i]
    }
}

impl From<[f32; 16]> for Mat4 {
    fn from(m: [f32; 16]) -> Mat4 {
        Mat4 { m }
    }
}

impl From<Mat4> for [f32; 16] {
    fn from(mat: Mat4) -> [f32; 16] {
        mat.m
    }
}

impl From<Quaternion> for Mat4 {
    /// Convert a rotation quaternion to a 4 x 4 rotation matrix.
    /// The quaternion must be normalized.
    fn from(quat: Quaternion) -> Mat4 {
        let x2 = quat.x + quat.x;
        let y2 = quat.y + quat.y;
        let z2 = quat.z + quat.z;

        let xx2 = x2 * quat.x;
        let xy2 = x2 * quat.y;
        let xz2 = x2 * quat.z;

        let yy2 = y2 * quat.y;
        let yz2 = y2 * quat.z;
        let zz2 = z2 * quat.z;

        let wx2 = x2 * quat.w;
        let wy2 = y2 * quat.w;
        let wz2 = z2 * quat.w;

        Mat4::new(
            1.0 - yy2 - zz2, xy2 - wz2,       xz2 + wy2,       0.0,
            xy2 + wz2,       1.0 - xx2 - zz2, yz2 - wx2,       0.0,
            xz2 - wy2,       yz2 + wx2,       1.0 - xx2 - yy2, 0.0,
            0.0,             0.0,             0.0,             1.0,
        )
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        let mut m = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.m[row * 4 + k] * other.m[k * 4 + col];
                }
                m[row * 4 + col] = sum;
            }
        }
        Self { m }
    }
}

#[test]
fn mat_multiply() {
    let translate = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let scale = Mat4::from_scale(2.0);

    // Scale first, then translate.
    let res = translate * scale;
    assert!(res == Mat4::new(
        2.0, 0.0, 0.0, 1.0,
        0.0, 2.0, 0.0, 2.0,
        0.0, 0.0, 2.0, 3.0,
        0.0, 0.0, 0.0, 1.0
    ));
    assert!(res.transform_point(Vec3::new(1.0, 1.0, 1.0)) == Vec3::new(3.0, 4.0, 5.0));
}

#[test]
fn identity_is_noop() {
    let id = Mat4::identity();
    let p = Vec3::new(4.0, -2.0, 7.0);

    assert!(id.transform_point(p) == p);
    assert!(id * id == id);
    assert!(id.trace() == 3.0);
}

#[test]
fn transpose_swaps_translation() {
    let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let tt = t.transposed();

    assert!(tt[12] == 1.0 && tt[13] == 2.0 && tt[14] == 3.0);
    assert!(tt.transposed() == t);
}
