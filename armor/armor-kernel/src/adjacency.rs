//! Edge adjacency for manifold checks and boundary tracing.

#![allow(clippy::cast_possible_truncation)]

use armor_types::SolidMesh;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Faces incident to each undirected edge, plus directed edge usage.
#[derive(Debug, Clone)]
pub struct EdgeAdjacency {
    /// Map from undirected edge `(min, max)` to incident face indices.
    pub edge_faces: HashMap<(u32, u32), SmallVec<[u32; 2]>>,
    /// Number of faces using each directed edge `(from, to)`.
    pub directed: HashMap<(u32, u32), u32>,
}

impl EdgeAdjacency {
    /// Build adjacency from a mesh.
    #[must_use]
    pub fn build(mesh: &SolidMesh) -> Self {
        let mut edge_faces: HashMap<(u32, u32), SmallVec<[u32; 2]>> =
            HashMap::with_capacity(mesh.face_count() * 3 / 2);
        let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(mesh.face_count() * 3);

        for (face_idx, face) in mesh.faces.iter().enumerate() {
            for i in 0..3 {
                let v0 = face[i];
                let v1 = face[(i + 1) % 3];
                edge_faces
                    .entry(undirected(v0, v1))
                    .or_default()
                    .push(face_idx as u32);
                *directed.entry((v0, v1)).or_insert(0) += 1;
            }
        }

        Self {
            edge_faces,
            directed,
        }
    }

    /// Edges with exactly one incident face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_faces.values().filter(|f| f.len() == 1).count()
    }

    /// Edges with more than two incident faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_faces.values().filter(|f| f.len() > 2).count()
    }

    /// Interior edges whose two faces traverse them in the same direction.
    #[must_use]
    pub fn inconsistent_edge_count(&self) -> usize {
        self.directed.values().filter(|&&count| count > 1).count()
    }

    /// Whether every edge has exactly two faces with opposite directions.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        self.edge_faces.values().all(|f| f.len() == 2)
            && self
                .directed
                .iter()
                .all(|(&(a, b), &count)| count == 1 && self.directed.get(&(b, a)) == Some(&1))
    }

    /// Directed boundary edges, oriented as their single face traverses them.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .directed
            .keys()
            .filter(|&&(a, b)| {
                self.edge_faces
                    .get(&undirected(a, b))
                    .is_some_and(|f| f.len() == 1)
            })
            .copied()
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Chain the boundary edges into closed loops.
    ///
    /// Each loop lists vertices in the direction the adjacent faces traverse
    /// them. Returns `None` if the boundary does not decompose into simple loops.
    #[must_use]
    pub fn boundary_loops(&self) -> Option<Vec<Vec<u32>>> {
        let edges = self.boundary_edges();
        let mut next: HashMap<u32, u32> = HashMap::with_capacity(edges.len());
        for &(a, b) in &edges {
            if next.insert(a, b).is_some() {
                return None;
            }
        }

        let mut loops = Vec::new();
        let mut visited: hashbrown::HashSet<u32> = hashbrown::HashSet::new();
        for &(start, _) in &edges {
            if visited.contains(&start) {
                continue;
            }
            let mut chain = vec![start];
            visited.insert(start);
            let mut current = start;
            loop {
                let n = *next.get(&current)?;
                if n == start {
                    break;
                }
                if !visited.insert(n) {
                    return None;
                }
                chain.push(n);
                current = n;
            }
            loops.push(chain);
        }
        Some(loops)
    }

    /// Vertex neighbours (one-ring) for every vertex.
    #[must_use]
    pub fn vertex_neighbors(&self, vertex_count: usize) -> Vec<SmallVec<[u32; 8]>> {
        let mut neighbors: Vec<SmallVec<[u32; 8]>> = vec![SmallVec::new(); vertex_count];
        let mut keys: Vec<&(u32, u32)> = self.edge_faces.keys().collect();
        keys.sort_unstable();
        for &(a, b) in keys {
            neighbors[a as usize].push(b);
            neighbors[b as usize].push(a);
        }
        neighbors
    }
}

/// Canonical key for an undirected edge.
#[inline]
#[must_use]
pub const fn undirected(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}
