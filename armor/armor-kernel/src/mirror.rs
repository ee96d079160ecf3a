//! Reflection of solids through a plane.

use armor_types::{Plane, SolidMesh};
use rayon::prelude::*;

/// Mirror image of a solid.
///
/// Reflection flips handedness, so face winding is reversed to keep normals
/// pointing outward. Regions are carried over face by face.
#[must_use]
pub fn mirror_mesh(mesh: &SolidMesh, plane: &Plane) -> SolidMesh {
    let mut out = mesh.clone();
    out.vertices
        .par_iter_mut()
        .for_each(|p| *p = plane.reflect_point(p));
    out.flip_winding();
    out
}
