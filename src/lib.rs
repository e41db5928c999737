pub mod math;
pub mod box_;
pub mod error;
pub mod topology;
pub mod side;
pub mod geometry;
pub mod hull;
pub mod face;
pub mod brush;
pub mod edit;
pub mod entity;
pub mod object;
pub mod hit;

pub use box_::FBox;
pub use brush::{Brush, BrushId, BrushSnapshot};
pub use entity::{Entity, EntityId};
pub use error::GeometryError;
pub use face::{BrushFace, FaceId, SurfaceFlags};
pub use geometry::{AddFaceResult, Polyhedron};
pub use hull::{hull_facets, HullFacet};
pub use hit::{CompareHits, CompareHitsByDistance, CompareHitsBySize, CompareHitsByType, Hit, HitTarget, HitType, PickResult};
pub use math::{FMatrix, FPlane, FRay, FVector};
pub use object::ObjectRef;
