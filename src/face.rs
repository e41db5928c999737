use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use cgmath::InnerSpace;

use crate::brush::BrushId;
use crate::math::{translation_of, FMatrix, FPlane, FVector};
use crate::topology::SideId;

/// Identifies a face across snapshots and geometry rebuilds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(u32);

static NEXT_FACE_ID: AtomicU32 = AtomicU32::new(1);

impl FaceId {
    fn next() -> FaceId {
        FaceId(NEXT_FACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Content and surface properties carried by a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SurfaceFlags(u32);

bitflags! {
    impl SurfaceFlags : u32 {
        /// Surface emits light.
        const Light     = 0x00000001;
        /// Reduced friction.
        const Slick     = 0x00000002;
        /// Surface is drawn as sky.
        const Sky       = 0x00000004;
        /// Turbulent water warp.
        const Warp      = 0x00000008;
        /// 33% translucent.
        const Trans33   = 0x00000010;
        /// 66% translucent.
        const Trans66   = 0x00000020;
        /// Texture scrolls.
        const Flowing   = 0x00000040;
        /// Surface is not drawn.
        const NoDraw    = 0x00000080;
        /// Split the BSP here but don't draw.
        const Hint      = 0x00000100;
        /// Ignored entirely by the compiler.
        const Skip      = 0x00000200;
    }
}

// Maps the names used in map files to their flag bits.
pub static SURFACE_FLAGS: phf::Map<&'static str, u32> = phf::phf_map! {
    "LIGHT" => 0x00000001,
    "SLICK" => 0x00000002,
    "SKY" => 0x00000004,
    "WARP" => 0x00000008,
    "TRANS33" => 0x00000010,
    "TRANS66" => 0x00000020,
    "FLOWING" => 0x00000040,
    "NODRAW" => 0x00000080,
    "HINT" => 0x00000100,
    "SKIP" => 0x00000200,
};

impl SurfaceFlags {
    /// Unknown names are ignored.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> SurfaceFlags {
        let mut flags = SurfaceFlags::empty();
        for name in names {
            if let Some(&bits) = SURFACE_FLAGS.get(name) {
                flags |= SurfaceFlags::from_bits_retain(bits);
            }
        }
        flags
    }
}

const fn axis(x: f32, y: f32, z: f32) -> FVector {
    FVector { x, y, z }
}

/// Paraxial texture projection axes: for each of the six major directions the
/// normal followed by the texture's X and Y axes.
const BASE_AXES: [[FVector; 3]; 6] = [
    [axis(0.0, 0.0, 1.0), axis(1.0, 0.0, 0.0), axis(0.0, -1.0, 0.0)],
    [axis(0.0, 0.0, -1.0), axis(1.0, 0.0, 0.0), axis(0.0, -1.0, 0.0)],
    [axis(1.0, 0.0, 0.0), axis(0.0, 1.0, 0.0), axis(0.0, 0.0, -1.0)],
    [axis(-1.0, 0.0, 0.0), axis(0.0, 1.0, 0.0), axis(0.0, 0.0, -1.0)],
    [axis(0.0, 1.0, 0.0), axis(1.0, 0.0, 0.0), axis(0.0, 0.0, -1.0)],
    [axis(0.0, -1.0, 0.0), axis(1.0, 0.0, 0.0), axis(0.0, 0.0, -1.0)],
];

/// One bounding plane of a brush together with its texturing attributes. The solid
/// lies behind the plane.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushFace {
    id: FaceId,
    boundary: FPlane,
    pub texture_name: String,
    pub x_offset: f32,
    pub y_offset: f32,
    pub rotation: f32,
    pub x_scale: f32,
    pub y_scale: f32,
    pub surface_flags: SurfaceFlags,
    pub selected: bool,
    brush: Option<BrushId>,
    side: Option<SideId>,
}

impl BrushFace {
    pub fn from_plane(boundary: FPlane, texture_name: &str) -> BrushFace {
        BrushFace {
            id: FaceId::next(),
            boundary,
            texture_name: texture_name.to_string(),
            x_offset: 0.0,
            y_offset: 0.0,
            rotation: 0.0,
            x_scale: 1.0,
            y_scale: 1.0,
            surface_flags: SurfaceFlags::empty(),
            selected: false,
            brush: None,
            side: None,
        }
    }

    /// Face through three points given clockwise as seen from outside the solid.
    /// `None` if the points are colinear.
    pub fn from_points(p1: &FVector, p2: &FVector, p3: &FVector, texture_name: &str) -> Option<BrushFace> {
        FPlane::from_points(p1, p2, p3).map(|plane| BrushFace::from_plane(plane, texture_name))
    }

    /// A new face on `boundary` carrying this face's texturing.
    pub fn derived(&self, boundary: FPlane) -> BrushFace {
        BrushFace {
            id: FaceId::next(),
            boundary,
            selected: false,
            brush: None,
            side: None,
            ..self.clone()
        }
    }

    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn boundary(&self) -> &FPlane {
        &self.boundary
    }

    pub fn set_boundary(&mut self, boundary: FPlane) {
        self.boundary = boundary;
    }

    /// Three points on the boundary that reproduce it through `from_points`.
    pub fn points(&self) -> [FVector; 3] {
        let anchor = self.boundary.anchor();
        let (u, v) = self.boundary.tangents();
        [anchor, anchor + v * 64.0, anchor + u * 64.0]
    }

    pub fn brush(&self) -> Option<BrushId> {
        self.brush
    }

    pub(crate) fn set_brush(&mut self, brush: Option<BrushId>) {
        self.brush = brush;
    }

    /// The side realizing this face in its brush's current geometry.
    pub fn side(&self) -> Option<SideId> {
        self.side
    }

    pub(crate) fn set_side(&mut self, side: Option<SideId>) {
        self.side = side;
    }

    /// Texture X and Y axes of the paraxial projection for this face's normal.
    pub fn texture_axes(&self) -> (FVector, FVector) {
        let normal = self.boundary.normal();
        let mut best = 0;
        let mut best_dot = f32::MIN;
        for (i, axes) in BASE_AXES.iter().enumerate() {
            let dot = normal.dot(axes[0]);
            if dot > best_dot {
                best_dot = dot;
                best = i;
            }
        }
        (BASE_AXES[best][1], BASE_AXES[best][2])
    }

    pub fn translate(&mut self, delta: &FVector, lock_texture: bool) {
        if lock_texture {
            self.compensate_translation(delta);
        }
        self.boundary = self.boundary.translate(delta);
    }

    /// Apply an affine transform to the boundary. Texture locking only compensates the
    /// translation part. Returns false, leaving the face unchanged, if the transform is
    /// singular.
    pub fn transform(&mut self, transform: &FMatrix, lock_texture: bool) -> bool {
        let Some(boundary) = self.boundary.transform(transform) else {
            return false;
        };
        if lock_texture {
            self.compensate_translation(&translation_of(transform));
        }
        self.boundary = boundary;
        true
    }

    fn compensate_translation(&mut self, delta: &FVector) {
        let (x_axis, y_axis) = self.texture_axes();
        if self.x_scale != 0.0 {
            self.x_offset -= delta.dot(x_axis) / self.x_scale;
        }
        if self.y_scale != 0.0 {
            self.y_offset -= delta.dot(y_axis) / self.y_scale;
        }
    }
}
