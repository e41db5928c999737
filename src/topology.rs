//! Vertices and edges of a polyhedron, and the transient marks assigned to them
//! while a plane is inserted.

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::math::{line_plane_intersection, snap, EPointStatus, FPlane, FVector};

new_key_type! {
    pub struct VertexId;
    pub struct EdgeId;
    pub struct SideId;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: FVector,
}

impl Vertex {
    pub fn new(position: FVector) -> Self {
        Vertex { position }
    }
}

/// An edge between two vertices. Seen from outside the solid, `right` traverses the
/// edge from `start` to `end` and `left` traverses it from `end` to `start`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub start: VertexId,
    pub end: VertexId,
    pub left: Option<SideId>,
    pub right: Option<SideId>,
}

impl Edge {
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Edge { start, end, left: None, right: None }
    }

    /// The vertex at which `side` enters this edge.
    pub fn start_vertex(&self, side: SideId) -> VertexId {
        if self.left == Some(side) { self.end } else { self.start }
    }

    /// The vertex at which `side` leaves this edge.
    pub fn end_vertex(&self, side: SideId) -> VertexId {
        if self.left == Some(side) { self.start } else { self.end }
    }

    pub fn other_side(&self, side: SideId) -> Option<SideId> {
        if self.left == Some(side) { self.right } else { self.left }
    }

    pub fn connects(&self, v1: VertexId, v2: VertexId) -> bool {
        (self.start == v1 && self.end == v2) || (self.start == v2 && self.end == v1)
    }

    /// The same edge traversed the other way around.
    pub fn flipped(&self) -> Edge {
        Edge { start: self.end, end: self.start, left: self.right, right: self.left }
    }

    pub fn replace_side(&mut self, old: SideId, new: SideId) {
        if self.left == Some(old) {
            self.left = Some(new);
        } else if self.right == Some(old) {
            self.right = Some(new);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexMark {
    Keep,
    Drop,
    /// Lies on the cutting plane.
    Undecided,
    /// Created by splitting an edge in the current pass.
    New,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeMark {
    Keep,
    Drop,
    Split,
    Undecided,
}

impl EdgeMark {
    pub fn from_vertex_marks(start: VertexMark, end: VertexMark) -> EdgeMark {
        use VertexMark::*;
        match (start, end) {
            (Keep, Drop) | (Drop, Keep) => EdgeMark::Split,
            (Keep, _) | (_, Keep) => EdgeMark::Keep,
            (Drop, _) | (_, Drop) => EdgeMark::Drop,
            _ => EdgeMark::Undecided,
        }
    }
}

pub type VertexMarks = SecondaryMap<VertexId, VertexMark>;
pub type EdgeMarks = SecondaryMap<EdgeId, EdgeMark>;

/// Owns the vertices and edges of one polyhedron. Sides refer to both by handle.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    pub vertices: SlotMap<VertexId, Vertex>,
    pub edges: SlotMap<EdgeId, Edge>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, position: FVector) -> VertexId {
        self.vertices.insert(Vertex::new(position))
    }

    pub fn add_edge(&mut self, start: VertexId, end: VertexId) -> EdgeId {
        self.edges.insert(Edge::new(start, end))
    }

    pub fn position(&self, vertex: VertexId) -> FVector {
        self.vertices[vertex].position
    }

    /// Direction of `edge` from its start to its end.
    pub fn edge_vector(&self, edge: EdgeId) -> FVector {
        let edge = &self.edges[edge];
        self.position(edge.end) - self.position(edge.start)
    }

    pub fn find_edge(&self, v1: VertexId, v2: VertexId) -> Option<EdgeId> {
        self.edges.iter().find(|(_, edge)| edge.connects(v1, v2)).map(|(id, _)| id)
    }

    /// Classify every vertex against `plane`: vertices above it are dropped.
    pub fn mark_vertices(&self, plane: &FPlane) -> VertexMarks {
        let mut marks = VertexMarks::with_capacity(self.vertices.len());
        for (id, vertex) in &self.vertices {
            let mark = match plane.point_status(&vertex.position) {
                EPointStatus::Above => VertexMark::Drop,
                EPointStatus::Below => VertexMark::Keep,
                EPointStatus::Inside => VertexMark::Undecided,
            };
            marks.insert(id, mark);
        }
        marks
    }

    /// Derive every edge's mark from the marks of its vertices.
    pub fn edge_marks(&self, vertex_marks: &VertexMarks) -> EdgeMarks {
        let mut marks = EdgeMarks::with_capacity(self.edges.len());
        for (id, edge) in &self.edges {
            marks.insert(id, EdgeMark::from_vertex_marks(vertex_marks[edge.start], vertex_marks[edge.end]));
        }
        marks
    }

    /// Mark every edge and split the edges that cross `plane`. A split edge keeps its
    /// kept endpoint; the dropped endpoint is replaced by a new vertex on the plane,
    /// which is recorded in `vertex_marks`.
    pub fn mark_edges(&mut self, plane: &FPlane, vertex_marks: &mut VertexMarks) -> EdgeMarks {
        let marks = self.edge_marks(vertex_marks);
        for (id, &mark) in &marks {
            if mark == EdgeMark::Split {
                let new_vertex = self.split_edge(id, plane, vertex_marks);
                vertex_marks.insert(new_vertex, VertexMark::New);
            }
        }
        marks
    }

    fn split_edge(&mut self, id: EdgeId, plane: &FPlane, vertex_marks: &VertexMarks) -> VertexId {
        let edge = self.edges[id];
        let point = line_plane_intersection(&self.position(edge.start), &self.position(edge.end), plane);
        let new_vertex = self.add_vertex(snap(point));

        let mut replacement = edge;
        if vertex_marks[edge.start] == VertexMark::Drop {
            replacement.start = new_vertex;
        } else {
            replacement.end = new_vertex;
        }
        self.edges[id] = replacement;
        new_vertex
    }
}
