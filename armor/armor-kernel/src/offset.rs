//! Vertex normals and variable-distance surface offsets.

use crate::error::{KernelError, KernelResult};
use crate::intersect::corner_angle;
use crate::kernel::Tolerance;
use armor_types::{SolidMesh, Vector3};
use rayon::prelude::*;

/// Smallest cosine between a vertex normal and an incident face normal
/// used for angle correction. Caps the correction factor at 2.
const MIN_CORRECTION_COS: f64 = 0.5;

/// Angle-weighted vertex normals.
///
/// Unreferenced vertices get a zero normal.
#[must_use]
pub fn vertex_normals(mesh: &SolidMesh) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); mesh.vertex_count()];
    for (f, face) in mesh.faces.iter().enumerate() {
        let Some(n) = mesh.face_unit_normal(f) else {
            continue;
        };
        let [a, b, c] = mesh.triangle(f);
        let angles = [
            corner_angle(&a, &b, &c),
            corner_angle(&b, &c, &a),
            corner_angle(&c, &a, &b),
        ];
        for (i, &v) in face.iter().enumerate() {
            normals[v as usize] += n.into_inner() * angles[i];
        }
    }
    for n in &mut normals {
        let len = n.norm();
        if len > 0.0 {
            *n /= len;
        }
    }
    normals
}

/// Offset directions: unit vertex normals scaled by the angle correction.
///
/// Moving a vertex by `d` along its direction keeps it (approximately) at
/// distance `d` from the planes of all incident faces, so sharp creases keep
/// their full wall thickness.
#[must_use]
pub fn offset_directions(mesh: &SolidMesh) -> Vec<Vector3<f64>> {
    let normals = vertex_normals(mesh);
    let mut min_cos = vec![1.0_f64; mesh.vertex_count()];
    for (f, face) in mesh.faces.iter().enumerate() {
        let Some(n) = mesh.face_unit_normal(f) else {
            continue;
        };
        for &v in face {
            let c = normals[v as usize].dot(&n.into_inner());
            min_cos[v as usize] = min_cos[v as usize].min(c);
        }
    }
    normals
        .par_iter()
        .zip(min_cos.par_iter())
        .map(|(n, &c)| n / c.max(MIN_CORRECTION_COS))
        .collect()
}

/// Offset a surface inward by a per-vertex distance.
///
/// Each vertex moves against its [`offset_directions`] entry by
/// `distances[i]`; positive distances move into the solid. Faces and regions
/// are kept as-is.
///
/// # Errors
///
/// Returns [`KernelError::OffsetLength`] if the field length does not match the
/// vertex count, or [`KernelError::Degenerate`] for non-finite distances.
pub fn offset_surface(
    surface: &SolidMesh,
    distances: &[f64],
    tol: Tolerance,
) -> KernelResult<SolidMesh> {
    if distances.len() != surface.vertex_count() {
        return Err(KernelError::OffsetLength {
            expected: surface.vertex_count(),
            actual: distances.len(),
        });
    }
    if distances.iter().any(|d| !d.is_finite()) {
        return Err(KernelError::degenerate("non-finite offset distance"));
    }

    let directions = offset_directions(surface);
    if directions
        .iter()
        .zip(distances)
        .any(|(dir, d)| d.abs() > tol.linear && dir.norm() <= tol.linear)
    {
        return Err(KernelError::degenerate("vertex without a surface normal"));
    }

    let mut out = surface.clone();
    out.vertices
        .par_iter_mut()
        .zip(directions.par_iter().zip(distances.par_iter()))
        .for_each(|(p, (dir, d))| *p -= dir * *d);
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armor_types::{Point3, unit_cube};

    #[test]
    fn cube_corner_normal_points_diagonally() {
        let cube = unit_cube();
        let normals = vertex_normals(&cube);
        let expected = Vector3::new(1.0, 1.0, 1.0).normalize();
        // Vertex 6 is the (1, 1, 1) corner; angle weighting makes it symmetric.
        assert_relative_eq!(normals[6], expected, epsilon = 1e-12);
    }

    #[test]
    fn corrected_offset_keeps_face_distance() {
        let cube = unit_cube();
        let dirs = offset_directions(&cube);
        // Corner direction is (1,1,1)/sqrt(3) scaled by sqrt(3): unit distance
        // along it moves one unit off each face plane.
        assert_relative_eq!(dirs[6], Vector3::new(1.0, 1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn inward_offset_shrinks_cube() {
        let cube = unit_cube();
        let shrunk = offset_surface(&cube, &[0.1; 8], Tolerance::default()).unwrap();
        assert_relative_eq!(shrunk.vertices[0], Point3::new(0.1, 0.1, 0.1), epsilon = 1e-12);
        assert_relative_eq!(shrunk.vertices[6], Point3::new(0.9, 0.9, 0.9), epsilon = 1e-12);
        assert_relative_eq!(shrunk.signed_volume(), 0.8_f64.powi(3), epsilon = 1e-9);
    }

    #[test]
    fn length_mismatch_rejected() {
        let cube = unit_cube();
        let err = offset_surface(&cube, &[0.1; 3], Tolerance::default());
        assert!(matches!(err, Err(KernelError::OffsetLength { .. })));
    }
}
