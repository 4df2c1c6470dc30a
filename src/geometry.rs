//! Rotation/zoom math shared by the raster path, the GPU path and picking.

use std::f32::consts::PI;

/// Below this angle (radians) a rotation is treated as zero, so near-rest
/// desklets don't jitter from a degenerate transform.
pub const ANGLE_MIN: f32 = 0.1;

/// Zoom factor that keeps a `width` x `height` rectangle rotated by `rotation`
/// inside its own bounding box.
///
/// The angle is folded into [0, pi/2] first; the factor comes from projecting
/// the half-diagonal on both axes and taking the most constraining one.
pub fn zoom_for_rotation(width: f32, height: f32, rotation: f32) -> f32 {
    let w = width / 2.0;
    let h = height / 2.0;
    let alpha = h.atan2(w);
    let mut theta = rotation.abs();
    if theta > PI / 2.0 {
        theta -= PI / 2.0;
    }

    let d = (w * w + h * h).sqrt();
    let xmax = d * (alpha + theta).cos().abs().max((alpha - theta).cos().abs());
    let ymax = d * (alpha + theta).sin().abs().max((alpha - theta).sin().abs());
    (w / xmax).min(h / ymax)
}

/// Column-major 4x4 matrix, the layout the transform uniforms use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(pub [[f32; 4]; 4]);

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.0[3] = [x, y, z, 1.0];
        m
    }

    pub fn scaling(x: f32, y: f32, z: f32) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.0[0][0] = x;
        m.0[1][1] = y;
        m.0[2][2] = z;
        m
    }

    pub fn rotation_z(radians: f32) -> Mat4 {
        let (s, c) = radians.sin_cos();
        let mut m = Mat4::IDENTITY;
        m.0[0][0] = c;
        m.0[0][1] = s;
        m.0[1][0] = -s;
        m.0[1][1] = c;
        m
    }

    pub fn rotation_y(radians: f32) -> Mat4 {
        let (s, c) = radians.sin_cos();
        let mut m = Mat4::IDENTITY;
        m.0[0][0] = c;
        m.0[0][2] = -s;
        m.0[2][0] = s;
        m.0[2][2] = c;
        m
    }

    pub fn rotation_x(radians: f32) -> Mat4 {
        let (s, c) = radians.sin_cos();
        let mut m = Mat4::IDENTITY;
        m.0[1][1] = c;
        m.0[1][2] = s;
        m.0[2][1] = -s;
        m.0[2][2] = c;
        m
    }

    /// Right-handed perspective projection, same parametrization as the
    /// classic `gluPerspective`.
    pub fn perspective(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fovy_degrees.to_radians() / 2.0).tan();
        let mut m = Mat4([[0.0; 4]; 4]);
        m.0[0][0] = f / aspect;
        m.0[1][1] = f;
        m.0[2][2] = (far + near) / (near - far);
        m.0[2][3] = -1.0;
        m.0[3][2] = 2.0 * far * near / (near - far);
        m
    }

    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in rhs.0.iter().enumerate() {
            for r in 0..4 {
                out[c][r] = (0..4).map(|k| self.0[k][r] * col[k]).sum();
            }
        }
        Mat4(out)
    }

    /// Applies the matrix to a point, returning homogeneous (x, y, z, w).
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 4] {
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0f32; 4];
        for (r, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|c| self.0[c][r] * v[c]).sum();
        }
        out
    }
}

/// Transform state a desklet's model matrix is built from.
#[derive(Debug, Clone, Copy)]
pub struct DeskletTransform {
    pub width: f32,
    pub height: f32,
    pub ratio: f32,
    pub rotation: f32,
    pub depth_rotation_x: f32,
    pub depth_rotation_y: f32,
}

/// Model matrix of a desklet in the GPU scene.
///
/// The depth push combines a sqrt(3)/2 term, matched to the 60-degree
/// projection, with a 0.45 tilt-compensation factor. Both are calibrated
/// constants.
pub fn desklet_matrix(t: &DeskletTransform) -> Mat4 {
    let ry = if t.depth_rotation_y.abs() > ANGLE_MIN {
        t.depth_rotation_y
    } else {
        0.0
    };
    let rx = if t.depth_rotation_x.abs() > ANGLE_MIN {
        t.depth_rotation_x
    } else {
        0.0
    };

    let depth = -t.height * 3.0f32.sqrt() / 2.0
        - 0.45 * (t.width * ry.sin().abs()).max(t.height * rx.sin().abs());
    let mut m = Mat4::translation(0.0, 0.0, depth);

    if t.ratio != 1.0 {
        m = m.mul(&Mat4::scaling(t.ratio, t.ratio, 1.0));
    }

    if t.rotation.abs() > ANGLE_MIN {
        let zoom = zoom_for_rotation(t.width, t.height, t.rotation);
        m = m.mul(&Mat4::scaling(zoom, zoom, 1.0));
        // The projection convention is left-handed relative to the 2D case,
        // hence the negated angles.
        m = m.mul(&Mat4::rotation_z(-t.rotation));
    }

    if ry != 0.0 {
        m = m.mul(&Mat4::rotation_y(-ry));
    }
    if rx != 0.0 {
        m = m.mul(&Mat4::rotation_x(-rx));
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_times_point() {
        let p = Mat4::IDENTITY.transform_point([3.0, -2.0, 1.0]);
        assert_eq!(p, [3.0, -2.0, 1.0, 1.0]);
    }

    #[test]
    fn translation_composes_with_scale() {
        let m = Mat4::translation(10.0, 0.0, 0.0).mul(&Mat4::scaling(2.0, 2.0, 1.0));
        let p = m.transform_point([1.0, 1.0, 0.0]);
        assert_eq!(p[0], 12.0);
        assert_eq!(p[1], 2.0);
    }
}
