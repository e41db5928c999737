use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use cgmath::InnerSpace;
use tracing::{debug, warn};

use crate::box_::FBox;
use crate::entity::EntityId;
use crate::error::GeometryError;
use crate::face::{BrushFace, FaceId};
use crate::geometry::{AddFaceResult, Polyhedron};
use crate::hit::{Hit, HitTarget, HitType, PickResult};
use crate::math::{EPointStatus, FMatrix, FPlane, FRay, FVector, THRESH_POINT_ON_PLANE, THRESH_ZERO_NORM_SQUARED};
use crate::object::{self, ObjectRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrushId(u32);

static NEXT_BRUSH_ID: AtomicU32 = AtomicU32::new(1);

impl BrushId {
    fn next() -> BrushId {
        BrushId(NEXT_BRUSH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A convex solid bounded by the planes of its faces. The geometry is rebuilt from
/// the face list after every edit; a brush whose planes enclose no volume is left
/// with no faces and no geometry.
#[derive(Debug)]
pub struct Brush {
    id: BrushId,
    world_bounds: FBox,
    faces: Vec<BrushFace>,
    geometry: Option<Polyhedron>,
    entity: Option<EntityId>,
    selected: bool,
}

impl Brush {
    pub fn new(world_bounds: &FBox, faces: Vec<BrushFace>) -> Brush {
        let mut brush = Brush {
            id: BrushId::next(),
            world_bounds: *world_bounds,
            faces: Vec::new(),
            geometry: None,
            entity: None,
            selected: false,
        };
        brush.restore_faces(faces);
        brush
    }

    /// An axis aligned cuboid filling `bounds`, every face using `texture_name`.
    pub fn new_cuboid(world_bounds: &FBox, bounds: &FBox, texture_name: &str) -> Brush {
        let faces = [
            (FVector::unit_x(), bounds.max.x),
            (-FVector::unit_x(), -bounds.min.x),
            (FVector::unit_y(), bounds.max.y),
            (-FVector::unit_y(), -bounds.min.y),
            (FVector::unit_z(), bounds.max.z),
            (-FVector::unit_z(), -bounds.min.z),
        ]
        .into_iter()
        .map(|(normal, distance)| BrushFace::from_plane(FPlane::new(normal, distance), texture_name))
        .collect();
        Brush::new(world_bounds, faces)
    }

    pub fn id(&self) -> BrushId {
        self.id
    }

    pub fn faces(&self) -> &[BrushFace] {
        &self.faces
    }

    pub fn face(&self, id: FaceId) -> Option<&BrushFace> {
        self.faces.iter().find(|face| face.id() == id)
    }

    fn face_index(&self, id: FaceId) -> Result<usize, GeometryError> {
        self.faces.iter().position(|face| face.id() == id).ok_or(GeometryError::FaceNotFound(id))
    }

    pub fn geometry(&self) -> Option<&Polyhedron> {
        self.geometry.as_ref()
    }

    pub fn world_bounds(&self) -> &FBox {
        &self.world_bounds
    }

    /// Bounds of the current geometry; invalid for a brush without geometry.
    pub fn bounds(&self) -> FBox {
        self.geometry.as_ref().map(|g| *g.bounds()).unwrap_or_default()
    }

    /// A brush is valid once its faces enclose a finite volume.
    pub fn is_valid(&self) -> bool {
        self.geometry.as_ref().is_some_and(|g| g.closed())
    }

    pub fn vertices(&self) -> Vec<FVector> {
        self.geometry.iter().flat_map(|g| g.vertices().map(|(_, v)| v.position)).collect()
    }

    /// Every edge as a pair of end points.
    pub fn edges(&self) -> Vec<(FVector, FVector)> {
        match &self.geometry {
            Some(g) => g.edges().map(|(_, e)| (g.registry().position(e.start), g.registry().position(e.end))).collect(),
            None => Vec::new(),
        }
    }

    pub fn edge_vectors(&self) -> Vec<FVector> {
        match &self.geometry {
            Some(g) => g.edges().map(|(id, _)| g.registry().edge_vector(id)).collect(),
            None => Vec::new(),
        }
    }

    /// Corners of the polygon `face` occupies, clockwise when seen from outside.
    pub fn face_vertices(&self, face: FaceId) -> Vec<FVector> {
        match (&self.geometry, self.face(face).and_then(|f| f.side())) {
            (Some(geometry), Some(side)) => geometry.side_positions(side),
            _ => Vec::new(),
        }
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub(crate) fn set_entity(&mut self, entity: Option<EntityId>) {
        self.entity = entity;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    /// Replace the face list and rebuild.
    pub fn restore_faces(&mut self, faces: Vec<BrushFace>) {
        self.detach_faces();
        self.faces = faces;
        for face in &mut self.faces {
            face.set_brush(Some(self.id));
            face.set_side(None);
        }
        self.rebuild_geometry();
    }

    fn detach_faces(&mut self) {
        for face in &mut self.faces {
            face.set_brush(None);
            face.set_side(None);
        }
    }

    fn invalidate(&mut self) {
        self.detach_faces();
        self.faces.clear();
        self.geometry = None;
    }

    /// Rebuild the geometry from the face list. Faces that do not contribute a side are
    /// removed. If the planes enclose nothing, or the topology cannot be built, the
    /// brush is left without faces and `BrushIsNull` is returned.
    pub fn rebuild_geometry(&mut self) -> AddFaceResult {
        if self.faces.is_empty() {
            self.geometry = None;
            return AddFaceResult::BrushIsNull;
        }

        let mut dropped = Vec::new();
        let outcome = Polyhedron::new(&self.world_bounds).and_then(|mut geometry| {
            let result = geometry.add_faces(&mut self.faces, &mut dropped)?;
            if result == AddFaceResult::Ok {
                geometry.sanity_check()?;
            }
            Ok((geometry, result))
        });

        match outcome {
            Ok((_, AddFaceResult::BrushIsNull)) => {
                debug!(brush = ?self.id, "brush planes enclose no volume");
                self.invalidate();
                AddFaceResult::BrushIsNull
            }
            Err(error) => {
                warn!(brush = ?self.id, %error, "failed to rebuild brush geometry");
                self.invalidate();
                AddFaceResult::BrushIsNull
            }
            Ok((geometry, _)) => {
                if !dropped.is_empty() {
                    debug!(brush = ?self.id, count = dropped.len(), "removing faces without geometry");
                    for face in self.faces.iter_mut().filter(|f| dropped.contains(&f.id())) {
                        face.set_brush(None);
                        face.set_side(None);
                    }
                    self.faces.retain(|face| !dropped.contains(&face.id()));
                }
                geometry.restore_face_geometries(&mut self.faces);
                self.geometry = Some(geometry);
                if self.faces.is_empty() {
                    self.invalidate();
                    return AddFaceResult::BrushIsNull;
                }
                AddFaceResult::Ok
            }
        }
    }

    /// Add `face` as a new boundary and rebuild. A face that does not cut the brush
    /// is discarded and the brush is left as it was. A face that cuts all of it away
    /// leaves the brush invalid, with no faces. Returns whether the brush is still a
    /// valid solid bounded by the new face.
    pub fn clip(&mut self, world_bounds: &FBox, face: BrushFace) -> bool {
        if self.geometry.is_none() {
            debug!(brush = ?self.id, "cannot clip a brush without geometry");
            return false;
        }

        let face_id = face.id();
        let previous_faces = self.faces.clone();
        let previous_geometry = self.geometry.clone();
        let previous_world_bounds = self.world_bounds;

        self.world_bounds = *world_bounds;
        self.faces.push(face);
        for face in &mut self.faces {
            face.set_brush(Some(self.id));
        }

        if self.rebuild_geometry() == AddFaceResult::BrushIsNull {
            debug!(brush = ?self.id, face = ?face_id, "clip removed the whole brush");
            return false;
        }
        if self.face(face_id).is_none() {
            debug!(brush = ?self.id, face = ?face_id, "clip face is redundant");
            self.world_bounds = previous_world_bounds;
            self.faces = previous_faces;
            self.geometry = previous_geometry;
            return false;
        }
        self.is_valid()
    }

    /// Whether translating face `face_id` by `delta` keeps the brush a valid solid
    /// inside `world_bounds` in which every face still has a side. The live geometry is
    /// not changed.
    pub fn can_move_boundary(&mut self, world_bounds: &FBox, face_id: FaceId, delta: &FVector) -> bool {
        let Ok(index) = self.face_index(face_id) else {
            return false;
        };

        let mut moved = self.faces[index].clone();
        moved.translate(delta, false);

        let Ok(mut geometry) = Polyhedron::new(world_bounds) else {
            return false;
        };
        let mut dropped = Vec::new();
        let mut result = Ok(AddFaceResult::Ok);
        for (i, face) in self.faces.iter_mut().enumerate() {
            if i == index {
                continue;
            }
            match geometry.add_face(face, &mut dropped) {
                Ok(AddFaceResult::Ok) => {}
                Ok(AddFaceResult::FaceIsRedundant) => dropped.push(face.id()),
                other => {
                    result = other;
                    break;
                }
            }
        }
        if result == Ok(AddFaceResult::Ok) {
            result = geometry.add_face(&mut moved, &mut dropped);
        }

        let inside_world = world_bounds.contains_box(geometry.bounds());
        if let Some(live) = &self.geometry {
            live.restore_face_geometries(&mut self.faces);
        }

        result == Ok(AddFaceResult::Ok) && dropped.is_empty() && inside_world && geometry.closed()
    }

    /// Translate face `face_id` by `delta` and rebuild, returning the outcome of the
    /// rebuild. Check the move with `can_move_boundary` first: a move that empties the
    /// brush reports `BrushIsNull` and leaves it without faces.
    pub fn move_boundary(&mut self, world_bounds: &FBox, face_id: FaceId, delta: &FVector, lock_texture: bool) -> Result<AddFaceResult, GeometryError> {
        let index = self.face_index(face_id)?;
        self.faces[index].translate(delta, lock_texture);
        self.world_bounds = *world_bounds;
        Ok(self.rebuild_geometry())
    }

    /// Swap in faces and geometry produced by a checked vertex edit.
    pub(crate) fn replace_geometry(&mut self, world_bounds: &FBox, faces: Vec<BrushFace>, geometry: Polyhedron) {
        self.detach_faces();
        self.world_bounds = *world_bounds;
        self.faces = faces;
        for face in &mut self.faces {
            face.set_brush(Some(self.id));
        }
        geometry.restore_face_geometries(&mut self.faces);
        self.geometry = Some(geometry);
    }

    /// Apply `transform` to every face plane and rebuild.
    pub fn transform(&mut self, world_bounds: &FBox, transform: &FMatrix, lock_textures: bool) {
        self.world_bounds = *world_bounds;
        for face in &mut self.faces {
            if !face.transform(transform, lock_textures) {
                warn!(brush = ?self.id, "singular transform collapses the brush");
                self.invalidate();
                return;
            }
        }
        self.rebuild_geometry();
    }

    /// Record the first face struck by `ray`, in face order.
    pub fn pick(&self, ray: &FRay, result: &mut PickResult) {
        let Some(geometry) = &self.geometry else {
            return;
        };
        if geometry.bounds().intersect_with_ray(ray).is_none() {
            return;
        }

        for face in &self.faces {
            let Some(side) = face.side().and_then(|id| geometry.side(id)) else {
                continue;
            };
            if let Some(distance) = side.intersect_with_ray(ray, face.boundary(), geometry.registry()) {
                let target = HitTarget::Face { brush: self.id, face: face.id() };
                result.add(Hit::new(HitType::Face, distance, ray.point_at_distance(distance), target, 0.0));
                return;
            }
        }
    }

    /// True if `point` lies on or behind every face plane.
    pub fn contains_point(&self, point: &FVector) -> bool {
        self.bounds().contains_point(point)
            && self.faces.iter().all(|face| face.boundary().point_status(point) != EPointStatus::Above)
    }

    pub fn contains_brush(&self, other: &Brush) -> bool {
        self.bounds().contains_box(&other.bounds())
            && other.vertices().iter().all(|v| self.contains_point(v))
    }

    pub fn contains_box(&self, other: &FBox) -> bool {
        self.bounds().contains_box(other)
            && other.corners().iter().all(|corner| self.contains_point(corner))
    }

    pub fn intersects_brush(&self, other: &Brush) -> bool {
        if !self.bounds().intersects(&other.bounds()) {
            return false;
        }
        let normals: Vec<FVector> = self.faces.iter().chain(&other.faces).map(|f| f.boundary().normal()).collect();
        convex_hulls_intersect(&self.vertices(), &other.vertices(), &normals, &self.edge_vectors(), &other.edge_vectors())
    }

    pub fn intersects_box(&self, other: &FBox) -> bool {
        if !self.bounds().intersects(other) {
            return false;
        }
        let axes = [FVector::unit_x(), FVector::unit_y(), FVector::unit_z()];
        let normals: Vec<FVector> = self.faces.iter().map(|f| f.boundary().normal()).chain(axes).collect();
        convex_hulls_intersect(&self.vertices(), &other.corners(), &normals, &self.edge_vectors(), &axes)
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        object::contains(ObjectRef::Brush(self), object)
    }

    pub fn intersects(&self, object: ObjectRef) -> bool {
        object::intersects(ObjectRef::Brush(self), object)
    }

    pub fn take_snapshot(&self) -> BrushSnapshot {
        BrushSnapshot { brush: self.id, faces: Rc::new(self.faces.clone()) }
    }
}

/// Separating axis test for two convex point sets. Candidate axes are the face
/// normals of both solids and the cross products of every pair of edge directions.
fn convex_hulls_intersect(a: &[FVector], b: &[FVector], normals: &[FVector], a_edges: &[FVector], b_edges: &[FVector]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let separates = |axis: FVector| {
        if axis.magnitude2() < THRESH_ZERO_NORM_SQUARED {
            return false;
        }
        let axis = axis.normalize();
        let (a_min, a_max) = project(a, &axis);
        let (b_min, b_max) = project(b, &axis);
        a_max < b_min - THRESH_POINT_ON_PLANE || b_max < a_min - THRESH_POINT_ON_PLANE
    };

    if normals.iter().any(|&n| separates(n)) {
        return false;
    }
    !a_edges.iter().any(|ea| b_edges.iter().any(|eb| separates(ea.cross(*eb))))
}

fn project(points: &[FVector], axis: &FVector) -> (f32, f32) {
    points.iter().fold((f32::MAX, f32::MIN), |(min, max), p| {
        let d = p.dot(*axis);
        (min.min(d), max.max(d))
    })
}

/// The faces of a brush at one point in time, used to undo geometry edits.
#[derive(Clone, Debug)]
pub struct BrushSnapshot {
    brush: BrushId,
    faces: Rc<Vec<BrushFace>>,
}

impl BrushSnapshot {
    pub fn brush(&self) -> BrushId {
        self.brush
    }

    pub fn faces(&self) -> &[BrushFace] {
        &self.faces
    }

    pub fn restore(&self, brush: &mut Brush) {
        debug_assert_eq!(brush.id(), self.brush);
        brush.restore_faces(self.faces.as_ref().clone());
    }
}
