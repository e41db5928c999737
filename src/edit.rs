//! Vertex, edge and face editing. An edit moves or adds points, takes the convex hull of
//! the resulting point set and rebuilds the brush from the hull's planes. Every edit is
//! first built on a scratch polyhedron; the brush only changes once that succeeds.

use cgmath::InnerSpace;
use tracing::debug;

use crate::box_::FBox;
use crate::brush::Brush;
use crate::error::GeometryError;
use crate::face::{BrushFace, FaceId};
use crate::geometry::{AddFaceResult, Polyhedron};
use crate::hull::{hull_facets, HullFacet};
use crate::math::{is_zero, planes_are_same, FVector, KINDA_SMALL_NUMBER, THRESH_POINTS_ARE_SAME, THRESH_VERTEX_MATCH};
use crate::topology::VertexId;

/// Faces and geometry produced by a trial edit.
#[derive(Debug)]
struct Reshaped {
    faces: Vec<BrushFace>,
    geometry: Polyhedron,
}

impl Reshaped {
    /// Where the vertex placed at `target` ended up.
    fn position_of(&self, target: &FVector) -> FVector {
        self.geometry
            .find_vertex(target)
            .map(|id| self.geometry.registry().position(id))
            .unwrap_or(*target)
    }
}

fn near(p: &FVector, q: &FVector) -> bool {
    (0..3).all(|i| (p[i] - q[i]).abs() < THRESH_VERTEX_MATCH)
}

/// One face per hull facet. A facet facing the same way as a current face keeps that
/// face. Any other facet copies the texturing of the face whose polygon shares most of
/// its corners, ties going to the face closest in orientation.
fn derive_faces(faces: &[BrushFace], polygons: &[Vec<FVector>], facets: &[HullFacet]) -> Result<Vec<BrushFace>, GeometryError> {
    let mut derived = Vec::with_capacity(facets.len());
    for facet in facets {
        let normal = facet.plane.normal();
        if let Some(face) = faces.iter().find(|f| f.boundary().normal().dot(normal) > 1.0 - KINDA_SMALL_NUMBER) {
            let mut face = face.clone();
            if !planes_are_same(face.boundary(), &facet.plane, THRESH_POINTS_ARE_SAME) {
                face.set_boundary(facet.plane);
            }
            derived.push(face);
            continue;
        }

        let score = |(face, polygon): (&BrushFace, &Vec<FVector>)| {
            let shared = facet.points.iter().filter(|p| polygon.iter().any(|q| near(p, q))).count();
            shared as f32 + 0.1 * face.boundary().normal().dot(normal)
        };
        let source = faces
            .iter()
            .zip(polygons)
            .max_by(|a, b| score(*a).total_cmp(&score(*b)))
            .map(|(face, _)| face)
            .ok_or(GeometryError::NoGeometry)?;
        derived.push(source.derived(facet.plane));
    }
    Ok(derived)
}

/// Build the solid bounded by the hull of `points` inside `world_bounds`.
fn rebuild_from_hull(world_bounds: &FBox, faces: &[BrushFace], polygons: &[Vec<FVector>], points: &[FVector]) -> Result<Reshaped, GeometryError> {
    let facets = hull_facets(points)?;
    let mut faces = derive_faces(faces, polygons, &facets)?;

    let mut geometry = Polyhedron::new(world_bounds)?;
    let mut dropped = Vec::new();
    if geometry.add_faces(&mut faces, &mut dropped)? == AddFaceResult::BrushIsNull {
        return Err(GeometryError::DegenerateHull);
    }
    geometry.sanity_check()?;
    if !geometry.closed() {
        return Err(GeometryError::OpenBoundary);
    }
    if !world_bounds.contains_box(geometry.bounds()) {
        return Err(GeometryError::OutsideWorld);
    }

    faces.retain(|face| !dropped.contains(&face.id()));
    geometry.restore_face_geometries(&mut faces);
    Ok(Reshaped { faces, geometry })
}

impl Brush {
    fn polygons(&self) -> Vec<Vec<FVector>> {
        self.faces().iter().map(|face| self.face_vertices(face.id())).collect()
    }

    /// Rebuild from the hull of `points`, requiring every point in `kept` to remain a vertex.
    fn reshape(&self, world_bounds: &FBox, points: &[FVector], kept: &[FVector]) -> Result<Reshaped, GeometryError> {
        if self.geometry().is_none() {
            return Err(GeometryError::NoGeometry);
        }
        let reshaped = rebuild_from_hull(world_bounds, self.faces(), &self.polygons(), points)?;
        if let Some(lost) = kept.iter().find(|p| reshaped.geometry.find_vertex(p).is_none()) {
            return Err(GeometryError::VertexAbsorbed(*lost));
        }
        Ok(reshaped)
    }

    fn commit(&mut self, world_bounds: &FBox, reshaped: Reshaped) {
        debug!(brush = ?self.id(), faces = reshaped.faces.len(), "applying vertex edit");
        self.replace_geometry(world_bounds, reshaped.faces, reshaped.geometry);
    }

    /// Trial move of the vertices at `positions`. Yields the rebuilt solid and the moved
    /// positions. Unless `merge` is set, a vertex may not land on one that stays put.
    fn plan_vertex_move(&self, world_bounds: &FBox, positions: &[FVector], delta: &FVector, merge: bool) -> Result<(Reshaped, Vec<FVector>), GeometryError> {
        let geometry = self.geometry().ok_or(GeometryError::NoGeometry)?;
        if positions.is_empty() || is_zero(delta.magnitude2()) {
            return Err(GeometryError::InvalidDirection(*delta));
        }
        let moved = positions
            .iter()
            .map(|p| geometry.find_vertex(p).ok_or(GeometryError::VertexNotFound(*p)))
            .collect::<Result<Vec<VertexId>, _>>()?;

        let mut points = Vec::with_capacity(geometry.vertices().count());
        let mut targets = Vec::with_capacity(moved.len());
        for (id, vertex) in geometry.vertices() {
            if moved.contains(&id) {
                points.push(vertex.position + delta);
                targets.push(vertex.position + delta);
            } else {
                points.push(vertex.position);
            }
        }

        if !merge {
            if let Some(target) = targets.iter().find(|t| points.iter().filter(|p| near(p, t)).count() > 1) {
                return Err(GeometryError::VertexAbsorbed(*target));
            }
        }

        let reshaped = self.reshape(world_bounds, &points, &points)?;
        Ok((reshaped, targets))
    }

    /// Whether the vertices at `positions` can move by `delta` with every vertex of the
    /// brush surviving as a vertex of a valid solid.
    pub fn can_move_vertices(&self, world_bounds: &FBox, positions: &[FVector], delta: &FVector) -> bool {
        self.plan_vertex_move(world_bounds, positions, delta, true).is_ok()
    }

    /// Move the vertices at `positions` by `delta` and rebuild the faces from the convex
    /// hull of the new vertex set. Returns where the moved vertices ended up. On error
    /// the brush is unchanged.
    pub fn move_vertices(&mut self, world_bounds: &FBox, positions: &[FVector], delta: &FVector) -> Result<Vec<FVector>, GeometryError> {
        let (reshaped, targets) = self.plan_vertex_move(world_bounds, positions, delta, true)?;
        let moved = targets.iter().map(|target| reshaped.position_of(target)).collect();
        self.commit(world_bounds, reshaped);
        Ok(moved)
    }

    fn plan_edge_move(&self, world_bounds: &FBox, edges: &[(FVector, FVector)], delta: &FVector) -> Result<(Reshaped, Vec<(FVector, FVector)>), GeometryError> {
        let geometry = self.geometry().ok_or(GeometryError::NoGeometry)?;
        let mut positions = Vec::with_capacity(edges.len() * 2);
        for (start, end) in edges {
            if geometry.find_edge_between(start, end).is_none() {
                return Err(GeometryError::EdgeNotFound(*start, *end));
            }
            positions.push(*start);
            positions.push(*end);
        }

        let (reshaped, _) = self.plan_vertex_move(world_bounds, &positions, delta, false)?;
        let moved: Vec<(FVector, FVector)> = edges.iter().map(|(start, end)| (start + delta, end + delta)).collect();
        if let Some((start, end)) = moved.iter().find(|(start, end)| reshaped.geometry.find_edge_between(start, end).is_none()) {
            return Err(GeometryError::EdgeNotFound(*start, *end));
        }
        let moved = moved.iter().map(|(start, end)| (reshaped.position_of(start), reshaped.position_of(end))).collect();
        Ok((reshaped, moved))
    }

    /// Whether the edges can move by `delta` and still be edges of a valid solid.
    pub fn can_move_edges(&self, world_bounds: &FBox, edges: &[(FVector, FVector)], delta: &FVector) -> bool {
        self.plan_edge_move(world_bounds, edges, delta).is_ok()
    }

    /// Move the end points of `edges` by `delta`. Returns the moved edges.
    pub fn move_edges(&mut self, world_bounds: &FBox, edges: &[(FVector, FVector)], delta: &FVector) -> Result<Vec<(FVector, FVector)>, GeometryError> {
        let (reshaped, moved) = self.plan_edge_move(world_bounds, edges, delta)?;
        self.commit(world_bounds, reshaped);
        Ok(moved)
    }

    fn plan_face_move(&self, world_bounds: &FBox, face_ids: &[FaceId], delta: &FVector) -> Result<Reshaped, GeometryError> {
        let mut positions = Vec::new();
        for &id in face_ids {
            let polygon = self.face_vertices(id);
            if polygon.is_empty() {
                return Err(GeometryError::FaceNotFound(id));
            }
            positions.extend(polygon);
        }

        let (reshaped, _) = self.plan_vertex_move(world_bounds, &positions, delta, false)?;
        for &id in face_ids {
            let expected = self.face(id).ok_or(GeometryError::FaceNotFound(id))?.boundary().translate(delta);
            let survives = reshaped
                .faces
                .iter()
                .find(|face| face.id() == id)
                .is_some_and(|face| planes_are_same(face.boundary(), &expected, THRESH_VERTEX_MATCH));
            if !survives {
                return Err(GeometryError::FaceNotFound(id));
            }
        }
        Ok(reshaped)
    }

    /// Whether the faces can be translated by `delta` with each one keeping its identity
    /// and orientation.
    pub fn can_move_faces(&self, world_bounds: &FBox, face_ids: &[FaceId], delta: &FVector) -> bool {
        self.plan_face_move(world_bounds, face_ids, delta).is_ok()
    }

    /// Translate the polygons of `face_ids` by `delta`, dragging the neighbouring faces along.
    pub fn move_faces(&mut self, world_bounds: &FBox, face_ids: &[FaceId], delta: &FVector) -> Result<(), GeometryError> {
        let reshaped = self.plan_face_move(world_bounds, face_ids, delta)?;
        self.commit(world_bounds, reshaped);
        Ok(())
    }

    fn plan_edge_split(&self, world_bounds: &FBox, start: &FVector, end: &FVector, delta: &FVector) -> Result<(Reshaped, FVector), GeometryError> {
        let geometry = self.geometry().ok_or(GeometryError::NoGeometry)?;
        let edge_id = geometry.find_edge_between(start, end).ok_or(GeometryError::EdgeNotFound(*start, *end))?;
        if is_zero(delta.magnitude2()) {
            return Err(GeometryError::InvalidDirection(*delta));
        }
        // The new vertex may not sink below either face meeting at the edge.
        for face_id in geometry.edge_faces(edge_id) {
            let face = self.face(face_id).ok_or(GeometryError::FaceNotFound(face_id))?;
            if delta.dot(face.boundary().normal()) < -KINDA_SMALL_NUMBER {
                return Err(GeometryError::InvalidDirection(*delta));
            }
        }

        let edge = &geometry.registry().edges[edge_id];
        let center = (geometry.registry().position(edge.start) + geometry.registry().position(edge.end)) * 0.5;
        let target = center + delta;
        let mut points = self.vertices();
        points.push(target);
        let reshaped = self.reshape(world_bounds, &points, &points)?;
        Ok((reshaped, target))
    }

    pub fn can_split_edge(&self, world_bounds: &FBox, start: &FVector, end: &FVector, delta: &FVector) -> bool {
        self.plan_edge_split(world_bounds, start, end, delta).is_ok()
    }

    /// Add a vertex at the midpoint of the edge from `start` to `end`, displaced by
    /// `delta`. Returns the position of the new vertex.
    pub fn split_edge(&mut self, world_bounds: &FBox, start: &FVector, end: &FVector, delta: &FVector) -> Result<FVector, GeometryError> {
        let (reshaped, target) = self.plan_edge_split(world_bounds, start, end, delta)?;
        let position = reshaped.position_of(&target);
        self.commit(world_bounds, reshaped);
        Ok(position)
    }

    fn plan_face_split(&self, world_bounds: &FBox, face_id: FaceId, delta: &FVector) -> Result<(Reshaped, FVector), GeometryError> {
        let face = self.face(face_id).ok_or(GeometryError::FaceNotFound(face_id))?;
        let polygon = self.face_vertices(face_id);
        if polygon.is_empty() {
            return Err(GeometryError::NoGeometry);
        }
        if is_zero(delta.dot(face.boundary().normal())) {
            return Err(GeometryError::InvalidDirection(*delta));
        }

        let center = polygon.iter().fold(FVector::new(0.0, 0.0, 0.0), |sum, p| sum + p) / polygon.len() as f32;
        let target = center + delta;
        let mut points = self.vertices();
        points.push(target);
        let reshaped = self.reshape(world_bounds, &points, &points)?;
        Ok((reshaped, target))
    }

    pub fn can_split_face(&self, world_bounds: &FBox, face_id: FaceId, delta: &FVector) -> bool {
        self.plan_face_split(world_bounds, face_id, delta).is_ok()
    }

    /// Add a vertex at the center of the polygon of `face_id`, displaced by `delta`. The
    /// face is replaced by faces meeting at the new vertex, which inherit its texturing.
    /// Returns the position of the new vertex.
    pub fn split_face(&mut self, world_bounds: &FBox, face_id: FaceId, delta: &FVector) -> Result<FVector, GeometryError> {
        let (reshaped, target) = self.plan_face_split(world_bounds, face_id, delta)?;
        let position = reshaped.position_of(&target);
        self.commit(world_bounds, reshaped);
        Ok(position)
    }

    /// Round every vertex to the nearest multiple of `grid` and rebuild. Vertices that
    /// merge, or end up inside the new hull, disappear.
    pub fn snap(&mut self, world_bounds: &FBox, grid: f32) -> Result<(), GeometryError> {
        if grid <= 0.0 {
            return Err(GeometryError::InvalidGrid(grid));
        }
        let points: Vec<FVector> = self.vertices().into_iter().map(|v| v.map(|c| (c / grid).round() * grid)).collect();
        let reshaped = self.reshape(world_bounds, &points, &[])?;
        self.commit(world_bounds, reshaped);
        Ok(())
    }

    /// Round vertex coordinates lying within `epsilon` of an integer and rebuild, so that
    /// face planes follow the repaired corners.
    pub fn correct(&mut self, world_bounds: &FBox, epsilon: f32) -> Result<(), GeometryError> {
        let round = |c: f32| if (c - c.round()).abs() < epsilon { c.round() } else { c };
        let points: Vec<FVector> = self.vertices().into_iter().map(|v| v.map(round)).collect();
        let reshaped = self.reshape(world_bounds, &points, &[])?;
        self.commit(world_bounds, reshaped);
        Ok(())
    }
}
