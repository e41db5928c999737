//! Pairwise containment and intersection between map objects.

use crate::box_::FBox;
use crate::brush::Brush;
use crate::entity::Entity;

#[derive(Clone, Copy, Debug)]
pub enum ObjectRef<'a> {
    Entity(&'a Entity),
    Brush(&'a Brush),
}

impl<'a> ObjectRef<'a> {
    pub fn bounds(&self) -> FBox {
        match self {
            ObjectRef::Entity(entity) => entity.bounds(),
            ObjectRef::Brush(brush) => brush.bounds(),
        }
    }
}

/// Whether `container` fully encloses `object`. Bounds are compared first; brushes
/// then test the other object's vertices against their face planes.
pub fn contains(container: ObjectRef, object: ObjectRef) -> bool {
    if !container.bounds().contains_box(&object.bounds()) {
        return false;
    }
    match (container, object) {
        (ObjectRef::Brush(brush), ObjectRef::Brush(other)) => brush.contains_brush(other),
        (ObjectRef::Brush(brush), ObjectRef::Entity(entity)) => brush.contains_box(&entity.bounds()),
        (ObjectRef::Entity(_), _) => true,
    }
}

/// Whether `a` and `b` overlap. Symmetric.
pub fn intersects(a: ObjectRef, b: ObjectRef) -> bool {
    if !a.bounds().intersects(&b.bounds()) {
        return false;
    }
    match (a, b) {
        (ObjectRef::Brush(a), ObjectRef::Brush(b)) => a.intersects_brush(b),
        (ObjectRef::Brush(brush), ObjectRef::Entity(entity))
        | (ObjectRef::Entity(entity), ObjectRef::Brush(brush)) => brush.intersects_box(&entity.bounds()),
        (ObjectRef::Entity(_), ObjectRef::Entity(_)) => true,
    }
}
