//! Convex polyhedron maintained by successive half-space insertion.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::box_::FBox;
use crate::error::GeometryError;
use crate::face::{BrushFace, FaceId};
use crate::math::{FPlane, FVector, THRESH_VERTEX_MATCH};
use crate::side::{Side, SideMark};
use crate::topology::{Edge, EdgeId, EdgeMark, Registry, SideId, Vertex, VertexId, VertexMark, VertexMarks};

/// Outcome of inserting one face's plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddFaceResult {
    /// The plane cut the solid and now has a side.
    Ok,
    /// The plane does not cut the solid; nothing changed.
    FaceIsRedundant,
    /// The plane would remove the whole solid; nothing changed.
    BrushIsNull,
}

/// Corner indices of each box side, clockwise when seen from outside. Corner `i` takes
/// max.x when bit 0 is set, max.y for bit 1 and max.z for bit 2.
const BOX_CYCLES: [[usize; 4]; 6] = [
    [0, 2, 6, 4],
    [1, 5, 7, 3],
    [0, 4, 5, 1],
    [2, 3, 7, 6],
    [0, 1, 3, 2],
    [4, 6, 7, 5],
];

#[derive(Clone, Debug, Default)]
pub struct Polyhedron {
    registry: Registry,
    sides: SlotMap<SideId, Side>,
    bounds: FBox,
}

impl Polyhedron {
    /// The box spanned by `world_bounds`, with no faces attached to its sides.
    pub fn new(world_bounds: &FBox) -> Result<Polyhedron, GeometryError> {
        Polyhedron::from_polygons(&world_bounds.corners(), &BOX_CYCLES)
    }

    /// Build a closed polyhedron from vertex positions and one index cycle per side.
    /// Every cycle must wind clockwise when seen from outside, so that each shared
    /// edge is traversed once in each direction.
    pub fn from_polygons<C: AsRef<[usize]>>(positions: &[FVector], cycles: &[C]) -> Result<Polyhedron, GeometryError> {
        let mut registry = Registry::new();
        let vertices: Vec<VertexId> = positions.iter().map(|&p| registry.add_vertex(p)).collect();
        let mut sides = SlotMap::with_key();
        let mut known_edges: HashMap<(usize, usize), EdgeId> = HashMap::new();

        for cycle in cycles {
            let cycle = cycle.as_ref();
            let side_id = sides.insert_with_key(Side::new);
            let side: &mut Side = &mut sides[side_id];
            for (i, &start) in cycle.iter().enumerate() {
                let end = cycle[(i + 1) % cycle.len()];
                if known_edges.contains_key(&(start, end)) {
                    return Err(GeometryError::SanityCheck(format!(
                        "edge from vertex {} to {} is traversed twice in the same direction", start, end
                    )));
                }
                match known_edges.get(&(end, start)) {
                    Some(&edge) if registry.edges[edge].left.is_some() => {
                        return Err(GeometryError::SanityCheck(format!(
                            "edge between vertices {} and {} bounds more than two sides", start, end
                        )));
                    }
                    Some(&edge) => side.add_backward_edge(edge, &mut registry)?,
                    None => {
                        let edge = registry.add_edge(vertices[start], vertices[end]);
                        known_edges.insert((start, end), edge);
                        side.add_forward_edge(edge, &mut registry)?;
                    }
                }
            }
            if !side.is_closed(&registry) {
                return Err(GeometryError::OpenBoundary);
            }
        }

        let mut polyhedron = Polyhedron { registry, sides, bounds: FBox::new() };
        polyhedron.update_bounds();
        Ok(polyhedron)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.registry.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.registry.edges.iter()
    }

    pub fn sides(&self) -> impl Iterator<Item = (SideId, &Side)> {
        self.sides.iter()
    }

    pub fn side(&self, id: SideId) -> Option<&Side> {
        self.sides.get(id)
    }

    pub fn side_count(&self) -> usize {
        self.sides.len()
    }

    pub fn bounds(&self) -> &FBox {
        &self.bounds
    }

    pub fn side_of_face(&self, face: FaceId) -> Option<SideId> {
        self.sides.iter().find(|(_, side)| side.face == Some(face)).map(|(id, _)| id)
    }

    pub fn side_positions(&self, side: SideId) -> Vec<FVector> {
        self.sides.get(side).map(|s| s.positions(&self.registry)).unwrap_or_default()
    }

    /// True once every side is realized by a face, i.e. no side of the initial world
    /// box survives.
    pub fn closed(&self) -> bool {
        self.sides.values().all(|side| side.face.is_some())
    }

    /// The vertex lying within `THRESH_VERTEX_MATCH` of `position` on every axis.
    pub fn find_vertex(&self, position: &FVector) -> Option<VertexId> {
        self.registry
            .vertices
            .iter()
            .find(|(_, v)| (0..3).all(|i| (v.position[i] - position[i]).abs() < THRESH_VERTEX_MATCH))
            .map(|(id, _)| id)
    }

    /// The edge joining the vertices at `start` and `end`, in either direction.
    pub fn find_edge_between(&self, start: &FVector, end: &FVector) -> Option<EdgeId> {
        self.registry.find_edge(self.find_vertex(start)?, self.find_vertex(end)?)
    }

    /// Faces of the sides on either side of `edge`.
    pub fn edge_faces(&self, edge: EdgeId) -> Vec<FaceId> {
        let Some(edge) = self.registry.edges.get(edge) else {
            return Vec::new();
        };
        [edge.left, edge.right]
            .into_iter()
            .flatten()
            .filter_map(|side| self.sides.get(side).and_then(|s| s.face))
            .collect()
    }

    /// Cut the solid with the plane of `face`, keeping the half-space behind it.
    ///
    /// On success `face` is linked to its new side and the faces of any side that was
    /// cut away completely are appended to `dropped`. Redundant and null insertions
    /// leave the polyhedron untouched, and so does an error.
    pub fn add_face(&mut self, face: &mut BrushFace, dropped: &mut Vec<FaceId>) -> Result<AddFaceResult, GeometryError> {
        let boundary = *face.boundary();
        let mut vertex_marks = self.registry.mark_vertices(&boundary);

        let total = vertex_marks.len();
        let count = |mark: VertexMark| vertex_marks.values().filter(|&&m| m == mark).count();
        let (keep, drop, undecided) = (count(VertexMark::Keep), count(VertexMark::Drop), count(VertexMark::Undecided));

        if keep + undecided == total {
            trace!(face = ?face.id(), "face is redundant");
            return Ok(AddFaceResult::FaceIsRedundant);
        }
        if drop + undecided == total {
            trace!(face = ?face.id(), "face nullifies the brush");
            return Ok(AddFaceResult::BrushIsNull);
        }

        let backup = self.clone();
        let dropped_len = dropped.len();
        let result = self.cut(face, &boundary, &mut vertex_marks, dropped);
        if result != Ok(AddFaceResult::Ok) {
            *self = backup;
            dropped.truncate(dropped_len);
            face.set_side(None);
        }
        result
    }

    fn cut(&mut self, face: &mut BrushFace, boundary: &FPlane, vertex_marks: &mut VertexMarks, dropped: &mut Vec<FaceId>) -> Result<AddFaceResult, GeometryError> {
        let edge_marks = self.registry.mark_edges(boundary, vertex_marks);

        let mut new_edges = Vec::new();
        let side_ids: Vec<SideId> = self.sides.keys().collect();
        for side_id in side_ids {
            let side = &mut self.sides[side_id];
            match side.mark(&edge_marks) {
                SideMark::Drop => {
                    if let Some(face) = side.face {
                        dropped.push(face);
                    }
                    self.sides.remove(side_id);
                }
                SideMark::Keep => {
                    if let Some(edge_id) = side.find_undecided_edge(&edge_marks) {
                        // The new side must traverse this edge forward.
                        let edge = &mut self.registry.edges[edge_id];
                        if edge.right == Some(side_id) {
                            *edge = edge.flipped();
                        }
                        new_edges.push(edge_id);
                    }
                }
                SideMark::Split => {
                    let edge = side.split_using_edge_marks(&mut self.registry, vertex_marks, &edge_marks)?;
                    new_edges.push(edge);
                }
            }
        }

        let new_side = self.sides.insert_with_key(Side::new);
        if self.close_boundary(new_side, new_edges).is_err() {
            debug!(face = ?face.id(), "new side does not close, treating face as redundant");
            return Ok(AddFaceResult::FaceIsRedundant);
        }
        self.sides[new_side].face = Some(face.id());
        face.set_side(Some(new_side));

        self.registry.edges.retain(|id, _| edge_marks.get(id) != Some(&EdgeMark::Drop));
        self.registry.vertices.retain(|id, _| vertex_marks.get(id) != Some(&VertexMark::Drop));

        self.fold_colinear_triangles(dropped)?;
        self.update_bounds();
        Ok(AddFaceResult::Ok)
    }

    /// Chain the edges created by a cut into one boundary cycle on `side_id`.
    fn close_boundary(&mut self, side_id: SideId, mut edges: Vec<EdgeId>) -> Result<(), GeometryError> {
        if edges.len() < 3 {
            return Err(GeometryError::OpenBoundary);
        }

        let side = &mut self.sides[side_id];
        let first = edges.remove(0);
        side.add_forward_edge(first, &mut self.registry)?;
        let mut end = self.registry.edges[first].end;
        while !edges.is_empty() {
            let registry = &self.registry;
            let index = edges.iter()
                .position(|&e| registry.edges[e].start == end)
                .ok_or(GeometryError::OpenBoundary)?;
            let next = edges.remove(index);
            side.add_forward_edge(next, &mut self.registry)?;
            end = self.registry.edges[next].end;
        }

        if side.is_closed(&self.registry) {
            Ok(())
        } else {
            Err(GeometryError::OpenBoundary)
        }
    }

    /// Insert every face in order. Redundant faces are appended to `dropped` along
    /// with the faces of sides cut away later. Stops at the first null insertion.
    pub fn add_faces(&mut self, faces: &mut [BrushFace], dropped: &mut Vec<FaceId>) -> Result<AddFaceResult, GeometryError> {
        for face in faces.iter_mut() {
            match self.add_face(face, dropped)? {
                AddFaceResult::Ok => {}
                AddFaceResult::FaceIsRedundant => dropped.push(face.id()),
                AddFaceResult::BrushIsNull => return Ok(AddFaceResult::BrushIsNull),
            }
        }
        Ok(AddFaceResult::Ok)
    }

    /// Relink each face to the side carrying its id in this polyhedron.
    pub fn restore_face_geometries(&self, faces: &mut [BrushFace]) {
        for face in faces.iter_mut() {
            face.set_side(self.side_of_face(face.id()));
        }
    }

    /// Remove sides that degenerated into triangles with three parallel edges. Each one
    /// is folded into the neighbour across its longest edge and its face is dropped.
    pub fn fold_colinear_triangles(&mut self, dropped: &mut Vec<FaceId>) -> Result<usize, GeometryError> {
        let mut folded = 0;
        loop {
            let candidate = self.sides.iter().find_map(|(id, side)| {
                let longest = side.is_colinear_triangle(&self.registry);
                (longest < side.edges().len()).then_some((id, longest))
            });
            let Some((side_id, longest)) = candidate else {
                return Ok(folded);
            };
            self.fold_triangle(side_id, longest, dropped)?;
            folded += 1;
        }
    }

    fn fold_triangle(&mut self, side_id: SideId, longest: usize, dropped: &mut Vec<FaceId>) -> Result<(), GeometryError> {
        let Some(side) = self.sides.remove(side_id) else {
            return Ok(());
        };

        let long_edge = side.edges()[longest];
        let first = side.edges()[(longest + 1) % 3];
        let second = side.edges()[(longest + 2) % 3];
        let neighbour = self.registry.edges[long_edge]
            .other_side(side_id)
            .filter(|id| self.sides.contains_key(*id))
            .ok_or(GeometryError::DegenerateSide(3))?;

        self.registry.edges[first].replace_side(side_id, neighbour);
        self.registry.edges[second].replace_side(side_id, neighbour);
        self.sides[neighbour].replace_edge(long_edge, first, second, &self.registry)?;
        self.registry.edges.remove(long_edge);

        if let Some(face) = side.face {
            dropped.push(face);
        }
        debug!(?side_id, ?neighbour, "folded colinear triangle");
        Ok(())
    }

    /// Cut the corner at `vertex_index` off `side_id` into a new triangular side. Both
    /// sides keep the face of the original. Returns the new side.
    pub fn chop_side(&mut self, side_id: SideId, vertex_index: usize) -> Result<SideId, GeometryError> {
        let side = self.sides.get_mut(side_id).ok_or(GeometryError::DegenerateSide(0))?;
        let corner = side.chop(vertex_index, &mut self.registry)?;
        let face = side.face;

        let [incoming, outgoing, closing] = corner.edges;
        let triangle = self.sides.insert_with_key(Side::new);
        let side = &mut self.sides[triangle];
        side.face = face;
        side.take_over_edge(incoming, side_id, &mut self.registry)?;
        side.take_over_edge(outgoing, side_id, &mut self.registry)?;
        side.add_backward_edge(closing, &mut self.registry)?;
        Ok(triangle)
    }

    /// Verify the structural invariants of the topology: Euler's formula, every edge
    /// bounding two distinct sides that traverse it in opposite directions, side
    /// vertex lists agreeing with their edges, and no duplicate vertices or edges.
    pub fn sanity_check(&self) -> Result<(), GeometryError> {
        let fail = |message: String| Err(GeometryError::SanityCheck(message));

        let vertex_count = self.registry.vertices.len() as i64;
        let edge_count = self.registry.edges.len() as i64;
        let side_count = self.sides.len() as i64;
        if vertex_count - edge_count + side_count != 2 {
            return fail(format!(
                "failed Euler check: {} vertices, {} edges, {} sides",
                vertex_count, edge_count, side_count
            ));
        }

        let mut visits: HashMap<EdgeId, usize> = HashMap::new();
        for (side_id, side) in &self.sides {
            if side.edges().len() != side.vertices().len() {
                return fail(format!("side {:?} has {} edges but {} vertices", side_id, side.edges().len(), side.vertices().len()));
            }
            for (i, &edge_id) in side.edges().iter().enumerate() {
                let Some(edge) = self.registry.edges.get(edge_id) else {
                    return fail(format!("side {:?} refers to missing edge {:?}", side_id, edge_id));
                };
                if edge.left != Some(side_id) && edge.right != Some(side_id) {
                    return fail(format!("edge {:?} does not refer back to side {:?}", edge_id, side_id));
                }
                if edge.start_vertex(side_id) != side.vertices()[i] {
                    return fail(format!("vertex {} of side {:?} does not start edge {}", i, side_id, i));
                }
                *visits.entry(edge_id).or_insert(0) += 1;
            }
        }

        let mut endpoints: HashSet<(VertexId, VertexId)> = HashSet::new();
        for (edge_id, edge) in &self.registry.edges {
            let count = visits.get(&edge_id).copied().unwrap_or(0);
            if count != 2 {
                return fail(format!("edge {:?} was visited {} times", edge_id, count));
            }
            if edge.left == edge.right {
                return fail(format!("edge {:?} has the same side on both sides", edge_id));
            }
            if edge.start == edge.end {
                return fail(format!("edge {:?} starts and ends at the same vertex", edge_id));
            }
            let key = if edge.start < edge.end { (edge.start, edge.end) } else { (edge.end, edge.start) };
            if !endpoints.insert(key) {
                return fail(format!("edge {:?} duplicates another edge", edge_id));
            }
            for vertex in [edge.start, edge.end] {
                if !self.registry.vertices.contains_key(vertex) {
                    return fail(format!("edge {:?} refers to missing vertex {:?}", edge_id, vertex));
                }
            }
        }

        let positions: Vec<FVector> = self.registry.vertices.values().map(|v| v.position).collect();
        for (i, p) in positions.iter().enumerate() {
            if positions[i + 1..].iter().any(|q| crate::math::points_are_same(p, q)) {
                return fail(format!("duplicate vertex at {:?}", p));
            }
        }

        Ok(())
    }

    fn update_bounds(&mut self) {
        self.bounds = FBox::new_from_points(self.registry.vertices.values().map(|v| &v.position));
    }
}
