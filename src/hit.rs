//! Ray picking results.

use std::cmp::Ordering;

use bitflags::bitflags;

use crate::brush::BrushId;
use crate::entity::EntityId;
use crate::face::FaceId;
use crate::math::{FVector, KINDA_SMALL_NUMBER};

/// Kind of object a hit refers to. Filters combine several kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HitType(u32);

bitflags! {
    impl HitType : u32 {
        /// A brush face was hit.
        const Face      = 0x00000001;
        /// The bounds of an entity were hit.
        const Entity    = 0x00000002;
    }
}

/// What a hit refers to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitTarget {
    None,
    Face { brush: BrushId, face: FaceId },
    Entity(EntityId),
}

/// The result of one successful ray test. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    hit_type: HitType,
    distance: f32,
    hit_point: FVector,
    target: HitTarget,
    error: f32,
}

impl Hit {
    pub fn new(hit_type: HitType, distance: f32, hit_point: FVector, target: HitTarget, error: f32) -> Hit {
        Hit { hit_type, distance, hit_point, target, error }
    }

    /// The sentinel returned when no hit satisfies a query.
    pub fn no_hit() -> Hit {
        Hit {
            hit_type: HitType::empty(),
            distance: 0.0,
            hit_point: FVector::new(0.0, 0.0, 0.0),
            target: HitTarget::None,
            error: f32::MAX,
        }
    }

    pub fn hit_type(&self) -> HitType {
        self.hit_type
    }

    /// Distance from the ray origin.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn hit_point(&self) -> FVector {
        self.hit_point
    }

    pub fn target(&self) -> HitTarget {
        self.target
    }

    /// How far off the ray passed the target; zero for exact hits.
    pub fn error(&self) -> f32 {
        self.error
    }

    pub fn is_match(&self) -> bool {
        !self.hit_type.is_empty()
    }

    pub fn has_type(&self, filter: HitType) -> bool {
        self.hit_type.intersects(filter)
    }
}

/// Order in which a `PickResult` keeps its hits.
pub trait CompareHits {
    fn compare(&self, lhs: &Hit, rhs: &Hit) -> Ordering;
}

fn compare_distance(lhs: &Hit, rhs: &Hit) -> Ordering {
    lhs.distance.total_cmp(&rhs.distance)
}

/// Nearest first.
pub struct CompareHitsByDistance;

impl CompareHits for CompareHitsByDistance {
    fn compare(&self, lhs: &Hit, rhs: &Hit) -> Ordering {
        compare_distance(lhs, rhs)
    }
}

/// Grouped by hit type in ascending bit order, nearest first within a type.
pub struct CompareHitsByType;

impl CompareHits for CompareHitsByType {
    fn compare(&self, lhs: &Hit, rhs: &Hit) -> Ordering {
        lhs.hit_type.bits().cmp(&rhs.hit_type.bits()).then_with(|| compare_distance(lhs, rhs))
    }
}

/// Smallest target first, as measured by `size`, then nearest.
pub struct CompareHitsBySize<F> {
    size: F,
}

impl<F: Fn(&Hit) -> f32> CompareHitsBySize<F> {
    pub fn new(size: F) -> Self {
        CompareHitsBySize { size }
    }
}

impl<F: Fn(&Hit) -> f32> CompareHits for CompareHitsBySize<F> {
    fn compare(&self, lhs: &Hit, rhs: &Hit) -> Ordering {
        (self.size)(lhs).total_cmp(&(self.size)(rhs)).then_with(|| compare_distance(lhs, rhs))
    }
}

/// Hits collected along one pick ray, kept sorted by a comparator.
pub struct PickResult {
    hits: Vec<Hit>,
    compare: Box<dyn CompareHits>,
}

impl Default for PickResult {
    fn default() -> Self {
        Self::by_distance()
    }
}

impl PickResult {
    pub fn by_distance() -> PickResult {
        PickResult::with_comparator(CompareHitsByDistance)
    }

    pub fn with_comparator(compare: impl CompareHits + 'static) -> PickResult {
        PickResult { hits: Vec::new(), compare: Box::new(compare) }
    }

    /// Insert `hit` after every hit that does not order after it.
    pub fn add(&mut self, hit: Hit) {
        let index = self.hits.partition_point(|h| self.compare.compare(h, &hit) != Ordering::Greater);
        self.hits.insert(index, hit);
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }

    /// The first hit of a type in `type_filter` that is not occluded. Hits of a type
    /// that is neither matched nor in `ignore_filter` occlude the hits behind them.
    pub fn find_first(&self, type_filter: HitType, ignore_filter: HitType) -> Hit {
        self.find_first_by(|hit| hit.has_type(type_filter), |hit| hit.has_type(ignore_filter))
    }

    /// Like `find_first` with arbitrary predicates. Hits at the same distance are
    /// examined together; among them the matching hit with the smallest error wins
    /// unless an occluder at that distance has a smaller error.
    pub fn find_first_by(&self, matches: impl Fn(&Hit) -> bool, ignores: impl Fn(&Hit) -> bool) -> Hit {
        let mut index = 0;
        while index < self.hits.len() {
            let distance = self.hits[index].distance;
            let mut best_match: Option<&Hit> = None;
            let mut best_occluder_error = f32::MAX;
            let mut occluded = false;

            while index < self.hits.len() && (self.hits[index].distance - distance).abs() < KINDA_SMALL_NUMBER {
                let hit = &self.hits[index];
                if matches(hit) {
                    if best_match.map_or(true, |best| hit.error < best.error) {
                        best_match = Some(hit);
                    }
                } else if !ignores(hit) {
                    best_occluder_error = best_occluder_error.min(hit.error);
                    occluded = true;
                }
                index += 1;
            }

            if let Some(hit) = best_match {
                if hit.error <= best_occluder_error {
                    return *hit;
                }
            }
            if occluded {
                break;
            }
        }
        Hit::no_hit()
    }

    /// The first hit of a type in `type_filter`, ignoring everything else.
    pub fn first_of_type(&self, type_filter: HitType) -> Hit {
        self.find_first(type_filter, HitType::all())
    }

    pub fn all_of_type(&self, type_filter: HitType) -> Vec<Hit> {
        self.hits.iter().filter(|hit| hit.has_type(type_filter)).copied().collect()
    }
}
