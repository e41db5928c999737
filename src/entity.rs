use std::sync::atomic::{AtomicU32, Ordering};

use tracing::warn;

use crate::box_::FBox;
use crate::brush::{Brush, BrushId};
use crate::hit::{Hit, HitTarget, HitType, PickResult};
use crate::math::FRay;
use crate::object::{self, ObjectRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

static NEXT_ENTITY_ID: AtomicU32 = AtomicU32::new(1);

impl EntityId {
    fn next() -> EntityId {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A map entity. Point entities occupy a fixed box; brush entities own brushes and
/// are bounded by them.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    pub classname: String,
    point_bounds: FBox,
    brushes: Vec<Brush>,
}

impl Entity {
    pub fn new_point(classname: &str, bounds: FBox) -> Entity {
        Entity { id: EntityId::next(), classname: classname.to_string(), point_bounds: bounds, brushes: Vec::new() }
    }

    pub fn new_brush_entity(classname: &str) -> Entity {
        Entity::new_point(classname, FBox::new())
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    pub fn brush(&self, id: BrushId) -> Option<&Brush> {
        self.brushes.iter().find(|brush| brush.id() == id)
    }

    pub fn brush_mut(&mut self, id: BrushId) -> Option<&mut Brush> {
        self.brushes.iter_mut().find(|brush| brush.id() == id)
    }

    pub fn add_brush(&mut self, mut brush: Brush) {
        brush.set_entity(Some(self.id));
        self.brushes.push(brush);
    }

    pub fn remove_brush(&mut self, id: BrushId) -> Option<Brush> {
        let index = self.brushes.iter().position(|brush| brush.id() == id)?;
        let mut brush = self.brushes.remove(index);
        brush.set_entity(None);
        Some(brush)
    }

    /// Remove brushes whose faces no longer enclose a volume. These must not be
    /// persisted. Returns them.
    pub fn remove_invalid_brushes(&mut self) -> Vec<Brush> {
        let (valid, invalid): (Vec<Brush>, Vec<Brush>) = std::mem::take(&mut self.brushes)
            .into_iter()
            .partition(|brush| brush.is_valid());
        self.brushes = valid;
        invalid.into_iter().map(|mut brush| {
            warn!(entity = ?self.id, brush = ?brush.id(), "removing invalid brush");
            brush.set_entity(None);
            brush
        }).collect()
    }

    /// The union of the brush bounds, or the point bounds for an entity without brushes.
    pub fn bounds(&self) -> FBox {
        if self.brushes.is_empty() {
            return self.point_bounds;
        }
        let mut bounds = FBox::new();
        for brush in &self.brushes {
            bounds.add_box(&brush.bounds());
        }
        bounds
    }

    /// Point entities are hit on their bounds; brush entities through their brushes.
    pub fn pick(&self, ray: &FRay, result: &mut PickResult) {
        if self.brushes.is_empty() {
            if let Some(distance) = self.point_bounds.intersect_with_ray(ray) {
                let hit_point = ray.point_at_distance(distance);
                result.add(Hit::new(HitType::Entity, distance, hit_point, HitTarget::Entity(self.id), 0.0));
            }
            return;
        }
        for brush in &self.brushes {
            brush.pick(ray, result);
        }
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        object::contains(ObjectRef::Entity(self), object)
    }

    pub fn intersects(&self, object: ObjectRef) -> bool {
        object::intersects(ObjectRef::Entity(self), object)
    }
}
