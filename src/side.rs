use arrayvec::ArrayVec;
use cgmath::InnerSpace;

use crate::error::GeometryError;
use crate::face::FaceId;
use crate::math::{is_zero, major_axis, project_onto_axis_plane, vectors_are_parallel, FPlane, FRay, FVector, KINDA_SMALL_NUMBER};
use crate::topology::{EdgeId, EdgeMark, EdgeMarks, Registry, SideId, VertexId, VertexMark, VertexMarks};

/// Classification of a whole side against a cutting plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideMark {
    Keep,
    Drop,
    Split,
}

/// The corner cut off a side by `Side::chop`, in the order a triangle side
/// traverses it: the two original edges, then the new closing edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChoppedCorner {
    pub edges: [EdgeId; 3],
}

/// The finite polygon one face occupies on a polyhedron: a cyclic sequence of edges
/// where each edge ends at the vertex the next one starts from. Vertices wind
/// clockwise when the side is seen from outside the solid.
#[derive(Clone, Debug, PartialEq)]
pub struct Side {
    id: SideId,
    /// The textured face this side realizes, if any.
    pub face: Option<FaceId>,
    edges: Vec<EdgeId>,
    /// `vertices[i]` is the vertex at which this side enters `edges[i]`.
    vertices: Vec<VertexId>,
}

impl Side {
    pub fn new(id: SideId) -> Self {
        Side { id, face: None, edges: Vec::new(), vertices: Vec::new() }
    }

    pub fn id(&self) -> SideId {
        self.id
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn positions(&self, registry: &Registry) -> Vec<FVector> {
        self.vertices.iter().map(|&v| registry.position(v)).collect()
    }

    /// Append `edge` so that this side traverses it from start to end, making this
    /// side the edge's right side.
    pub fn add_forward_edge(&mut self, edge: EdgeId, registry: &mut Registry) -> Result<(), GeometryError> {
        let start = registry.edges[edge].start;
        self.check_continues_at(start, registry)?;
        registry.edges[edge].right = Some(self.id);
        self.edges.push(edge);
        self.vertices.push(start);
        Ok(())
    }

    /// Append `edge` so that this side traverses it from end to start, making this
    /// side the edge's left side.
    pub fn add_backward_edge(&mut self, edge: EdgeId, registry: &mut Registry) -> Result<(), GeometryError> {
        let start = registry.edges[edge].end;
        self.check_continues_at(start, registry)?;
        registry.edges[edge].left = Some(self.id);
        self.edges.push(edge);
        self.vertices.push(start);
        Ok(())
    }

    pub fn add_forward_edges(&mut self, edges: &[EdgeId], registry: &mut Registry) -> Result<(), GeometryError> {
        edges.iter().try_for_each(|&edge| self.add_forward_edge(edge, registry))
    }

    pub fn add_backward_edges(&mut self, edges: &[EdgeId], registry: &mut Registry) -> Result<(), GeometryError> {
        edges.iter().try_for_each(|&edge| self.add_backward_edge(edge, registry))
    }

    /// Append an edge that currently belongs to side `from`, taking over its place in
    /// the edge while keeping the direction in which `from` traversed it.
    pub fn take_over_edge(&mut self, edge: EdgeId, from: SideId, registry: &mut Registry) -> Result<(), GeometryError> {
        let start = registry.edges[edge].start_vertex(from);
        self.check_continues_at(start, registry)?;
        registry.edges[edge].replace_side(from, self.id);
        self.edges.push(edge);
        self.vertices.push(start);
        Ok(())
    }

    fn check_continues_at(&self, start: VertexId, registry: &Registry) -> Result<(), GeometryError> {
        match self.edges.last() {
            Some(&last) if registry.edges[last].end_vertex(self.id) != start => Err(GeometryError::DisconnectedEdge),
            _ => Ok(()),
        }
    }

    pub fn is_closed(&self, registry: &Registry) -> bool {
        let count = self.edges.len();
        if count < 3 {
            return false;
        }
        (0..count).all(|i| {
            let edge = &registry.edges[self.edges[i]];
            let next = &registry.edges[self.edges[(i + 1) % count]];
            edge.end_vertex(self.id) == next.start_vertex(self.id)
        })
    }

    /// Tally the marks of this side's edges. Every edge must have been marked in the
    /// current insertion pass.
    pub fn mark(&self, edge_marks: &EdgeMarks) -> SideMark {
        let mut keep = 0;
        let mut drop = 0;
        let mut undecided = 0;
        for &edge in &self.edges {
            match edge_marks[edge] {
                EdgeMark::Keep => keep += 1,
                EdgeMark::Drop => drop += 1,
                EdgeMark::Undecided => undecided += 1,
                EdgeMark::Split => {}
            }
        }

        debug_assert!(undecided < self.edges.len(), "side lies entirely in the cutting plane");

        if keep + undecided == self.edges.len() {
            SideMark::Keep
        } else if drop + undecided == self.edges.len() {
            SideMark::Drop
        } else {
            SideMark::Split
        }
    }

    pub fn find_undecided_edge(&self, edge_marks: &EdgeMarks) -> Option<EdgeId> {
        self.edges.iter().copied().find(|&edge| edge_marks[edge] == EdgeMark::Undecided)
    }

    /// Cut the dropped part off a split side. The run of edges between the last edge
    /// leaving the kept region and the first edge entering it again is replaced by
    /// one new edge, which is returned. This side becomes the new edge's left side;
    /// its right side is the face being inserted.
    pub fn split_using_edge_marks(&mut self, registry: &mut Registry, vertex_marks: &VertexMarks, edge_marks: &EdgeMarks) -> Result<EdgeId, GeometryError> {
        let count = self.edges.len();
        if count == 0 {
            return Err(GeometryError::InvalidSideSplit);
        }

        // Index of the edge leaving the kept region and of the edge entering it.
        let mut leave_index = None;
        let mut enter_index = None;
        let mut last_mark = edge_marks[self.edges[count - 1]];

        for (i, &edge) in self.edges.iter().enumerate() {
            let mark = edge_marks[edge];
            match mark {
                EdgeMark::Split => {
                    let start = registry.edges[edge].start_vertex(self.id);
                    if vertex_marks[start] == VertexMark::Keep {
                        leave_index = Some(i);
                    } else {
                        enter_index = Some(i);
                    }
                }
                EdgeMark::Keep if last_mark == EdgeMark::Drop => enter_index = Some(i),
                EdgeMark::Drop if last_mark == EdgeMark::Keep => leave_index = Some((i + count - 1) % count),
                _ => {}
            }
            last_mark = mark;
        }

        let (leave_index, enter_index) = match (leave_index, enter_index) {
            (Some(leave), Some(enter)) if leave != enter => (leave, enter),
            _ => return Err(GeometryError::InvalidSideSplit),
        };

        let from = registry.edges[self.edges[leave_index]].end_vertex(self.id);
        let to = registry.edges[self.edges[enter_index]].start_vertex(self.id);
        if from == to {
            return Err(GeometryError::InvalidSideSplit);
        }

        let new_edge = registry.add_edge(to, from);
        registry.edges[new_edge].left = Some(self.id);
        self.replace_edges(leave_index, enter_index, new_edge, registry);
        Ok(new_edge)
    }

    /// Keep the edges from `first_kept` around to `last_kept` and close the gap with `edge`.
    fn replace_edges(&mut self, last_kept: usize, first_kept: usize, edge: EdgeId, registry: &Registry) {
        let count = self.edges.len();
        let mut edges = Vec::with_capacity(count);
        let mut i = first_kept;
        loop {
            edges.push(self.edges[i]);
            if i == last_kept {
                break;
            }
            i = (i + 1) % count;
        }
        edges.push(edge);
        self.edges = edges;
        self.update_vertices(registry);
    }

    /// Replace `old` with the two edges `first` and `second`, which must already refer
    /// to this side and together connect the endpoints of `old`.
    pub fn replace_edge(&mut self, old: EdgeId, first: EdgeId, second: EdgeId, registry: &Registry) -> Result<(), GeometryError> {
        let index = self.edges.iter().position(|&e| e == old).ok_or(GeometryError::DisconnectedEdge)?;
        let entry = registry.edges[old].start_vertex(self.id);
        let pair = if registry.edges[first].start_vertex(self.id) == entry {
            [first, second]
        } else {
            [second, first]
        };
        self.edges.splice(index..=index, pair);
        self.update_vertices(registry);
        if self.is_closed(registry) {
            Ok(())
        } else {
            Err(GeometryError::DisconnectedEdge)
        }
    }

    fn update_vertices(&mut self, registry: &Registry) {
        self.vertices = self.edges.iter().map(|&e| registry.edges[e].start_vertex(self.id)).collect();
    }

    /// For a triangle whose edges are all parallel, the index of its longest edge;
    /// otherwise the number of edges.
    pub fn is_colinear_triangle(&self, registry: &Registry) -> usize {
        if self.edges.len() != 3 {
            return self.edges.len();
        }

        let vectors: ArrayVec<FVector, 3> = self.edges.iter().map(|&e| registry.edge_vector(e)).collect();
        if !vectors_are_parallel(&vectors[0], &vectors[1]) {
            return self.edges.len();
        }

        let lengths: ArrayVec<f32, 3> = vectors.iter().map(|v| v.magnitude2()).collect();
        if lengths[0] > lengths[1] {
            if lengths[0] > lengths[2] { 0 } else { 2 }
        } else if lengths[1] > lengths[2] {
            1
        } else {
            2
        }
    }

    /// Cut off the corner at `vertex_index` with a new edge from its predecessor to
    /// its successor. This side keeps the remaining polygon; the caller turns the
    /// returned corner into a new side.
    pub fn chop(&mut self, vertex_index: usize, registry: &mut Registry) -> Result<ChoppedCorner, GeometryError> {
        let count = self.edges.len();
        if count <= 3 || vertex_index >= count {
            return Err(GeometryError::DegenerateSide(count));
        }

        let incoming = self.edges[(vertex_index + count - 1) % count];
        let outgoing = self.edges[vertex_index];
        let predecessor = self.vertices[(vertex_index + count - 1) % count];
        let successor = self.vertices[(vertex_index + 1) % count];

        let new_edge = registry.add_edge(predecessor, successor);
        registry.edges[new_edge].right = Some(self.id);
        self.replace_edges((vertex_index + count - 2) % count, (vertex_index + 1) % count, new_edge, registry);

        Ok(ChoppedCorner { edges: [incoming, outgoing, new_edge] })
    }

    /// Distance along `ray` to the point where it enters this side from the front,
    /// if it hits the polygon at all.
    pub fn intersect_with_ray(&self, ray: &FRay, boundary: &FPlane, registry: &Registry) -> Option<f32> {
        let normal = boundary.normal();
        if normal.dot(ray.direction) > -KINDA_SMALL_NUMBER {
            return None;
        }

        let distance = boundary.intersect_with_ray(ray)?;
        let axis = major_axis(&normal);
        let (hit_x, hit_y) = project_onto_axis_plane(&ray.point_at_distance(distance), axis);
        let relative = |vertex: VertexId| {
            let (x, y) = project_onto_axis_plane(&registry.position(vertex), axis);
            (x - hit_x, y - hit_y)
        };

        let last = *self.vertices.last()?;
        let mut v0 = relative(last);
        let mut crossings = 0;
        for &vertex in &self.vertices {
            let v1 = relative(vertex);
            if (is_zero(v0.0) && is_zero(v0.1)) || (is_zero(v1.0) && is_zero(v1.1)) {
                // The hit point coincides with a polygon vertex.
                return Some(distance);
            }

            // Count crossings of the positive X axis; zero counts as negative.
            if (v0.1 > 0.0 && v1.1 <= 0.0) || (v0.1 <= 0.0 && v1.1 > 0.0) {
                if v0.0 > 0.0 && v1.0 > 0.0 {
                    crossings += 1;
                } else if (v0.0 > 0.0 && v1.0 <= 0.0) || (v0.0 <= 0.0 && v1.0 > 0.0) {
                    let x = -v0.1 * (v1.0 - v0.0) / (v1.1 - v0.1) + v0.0;
                    if x >= 0.0 {
                        crossings += 1;
                    }
                }
            }
            v0 = v1;
        }

        if crossings % 2 == 0 { None } else { Some(distance) }
    }
}
