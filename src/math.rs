use cgmath::{InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3, Vector4};

pub type FVector = Vector3<f32>;
pub type FMatrix = Matrix4<f32>;

/// An infinite plane `x*X + y*Y + z*Z = w`. The normal `(x, y, z)` is expected
/// to be normalized, which makes `w` the plane's distance from the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FPlane {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Classification of a point relative to a plane (or a ray treated as a plane).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EPointStatus {
    /// In front of the plane, in the direction of its normal.
    Above,
    /// Behind the plane.
    Below,
    /// Within `THRESH_POINT_ON_PLANE` of the plane.
    Inside,
}

impl FPlane {
    pub fn new(normal: FVector, distance: f32) -> FPlane {
        FPlane { x: normal.x, y: normal.y, z: normal.z, w: distance }
    }

    /// Plane through three points. The normal is `(p3 - p1) x (p2 - p1)`, so the
    /// points wind clockwise when seen from the front. Returns `None` for colinear points.
    pub fn from_points(p1: &FVector, p2: &FVector, p3: &FVector) -> Option<FPlane> {
        let normal = (p3 - p1).cross(p2 - p1);
        if normal.magnitude2() < THRESH_ZERO_NORM_SQUARED {
            return None;
        }
        let normal = normal.normalize();
        Some(FPlane::new(normal, p1.dot(normal)))
    }

    pub fn normal(&self) -> FVector {
        FVector::new(self.x, self.y, self.z)
    }

    pub fn distance(&self) -> f32 {
        self.w
    }

    /// Signed distance of `p` from the plane.
    pub fn plane_dot(&self, p: FVector) -> f32 {
        (self.x * p.x) + (self.y * p.y) + (self.z * p.z) - self.w
    }

    pub fn point_status(&self, p: &FVector) -> EPointStatus {
        let distance = self.plane_dot(*p);
        if distance > THRESH_POINT_ON_PLANE {
            EPointStatus::Above
        } else if distance < -THRESH_POINT_ON_PLANE {
            EPointStatus::Below
        } else {
            EPointStatus::Inside
        }
    }

    /// The point on the plane closest to the origin.
    pub fn anchor(&self) -> FVector {
        self.normal() * self.w
    }

    /// Distance along `ray` at which it crosses the plane, if it does so in front of
    /// the ray origin.
    pub fn intersect_with_ray(&self, ray: &FRay) -> Option<f32> {
        let d = self.normal().dot(ray.direction);
        if d.abs() < SMALL_NUMBER {
            return None;
        }
        let distance = -self.plane_dot(ray.origin) / d;
        if distance < 0.0 {
            return None;
        }
        Some(distance)
    }

    pub fn translate(&self, delta: &FVector) -> FPlane {
        FPlane::new(self.normal(), self.w + self.normal().dot(*delta))
    }

    /// Transform the plane by an affine point transformation. Normals are carried by
    /// the inverse transpose so that non-uniform scales keep them perpendicular.
    pub fn transform(&self, transform: &FMatrix) -> Option<FPlane> {
        let inverse = transform.invert()?;
        let normal = inverse.transpose() * self.normal().extend(0.0);
        let normal = normal.truncate();
        if normal.magnitude2() < THRESH_ZERO_NORM_SQUARED {
            return None;
        }
        let normal = normal.normalize();
        let anchor = transform_point(transform, &self.anchor());
        Some(FPlane::new(normal, anchor.dot(normal)))
    }

    /// Two vectors spanning the plane such that `u x v == normal`.
    pub fn tangents(&self) -> (FVector, FVector) {
        let normal = self.normal();
        let helper = match major_axis(&normal) {
            0 => FVector::unit_y(),
            1 => FVector::unit_z(),
            _ => FVector::unit_x(),
        };
        let u = helper.cross(normal).normalize();
        let v = normal.cross(u);
        (u, v)
    }
}

/// A half-line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FRay {
    pub origin: FVector,
    /// Normalized direction.
    pub direction: FVector,
}

impl FRay {
    pub fn new(origin: FVector, direction: FVector) -> FRay {
        FRay { origin, direction: direction.normalize() }
    }

    pub fn point_at_distance(&self, distance: f32) -> FVector {
        self.origin + self.direction * distance
    }

    /// Classify `p` against the plane through the ray origin with the ray direction as
    /// its normal.
    pub fn point_status(&self, p: &FVector) -> EPointStatus {
        let distance = (p - self.origin).dot(self.direction);
        if distance > THRESH_POINT_ON_PLANE {
            EPointStatus::Above
        } else if distance < -THRESH_POINT_ON_PLANE {
            EPointStatus::Below
        } else {
            EPointStatus::Inside
        }
    }
}

// Magic numbers for numerical precision.

/// Thickness of plane for front/back/inside test
pub const THRESH_POINT_ON_PLANE: f32 = 0.10;
/// Two points are same if within this distance
pub const THRESH_POINTS_ARE_SAME: f32 = 0.002;
/// Size of a unit normal that is considered "zero", squared
pub const THRESH_ZERO_NORM_SQUARED: f32 = 0.0001;
/// Vectors are parallel if the sine of their angle is below this
pub const THRESH_VECTORS_ARE_PARALLEL: f32 = 0.001;
/// Split points this close to an integer coordinate are moved onto it
pub const THRESH_SNAP: f32 = 0.001;
/// A vertex named by an edit is found if it lies within this distance on every axis
pub const THRESH_VERTEX_MATCH: f32 = 0.01;

pub const SMALL_NUMBER: f32 = 1.0e-8;
pub const KINDA_SMALL_NUMBER: f32 = 1.0e-4;

pub fn points_are_same(p: &FVector, q: &FVector) -> bool {
    (0..3).all(|i| (p[i] - q[i]).abs() < THRESH_POINTS_ARE_SAME)
}

/// Planes facing the same way whose distances differ by less than `tolerance`.
pub fn planes_are_same(a: &FPlane, b: &FPlane, tolerance: f32) -> bool {
    a.normal().dot(b.normal()) > 1.0 - KINDA_SMALL_NUMBER && (a.w - b.w).abs() < tolerance
}

pub fn is_zero(value: f32) -> bool {
    value.abs() < KINDA_SMALL_NUMBER
}

pub fn vectors_are_parallel(a: &FVector, b: &FVector) -> bool {
    let cross = a.cross(*b).magnitude2();
    let scale = a.magnitude2() * b.magnitude2();
    cross <= THRESH_VECTORS_ARE_PARALLEL * THRESH_VECTORS_ARE_PARALLEL * scale
}

/// Index of the component with the largest magnitude.
pub fn major_axis(v: &FVector) -> usize {
    let (x, y, z) = (v.x.abs(), v.y.abs(), v.z.abs());
    if x >= y && x >= z {
        0
    } else if y >= z {
        1
    } else {
        2
    }
}

/// Round components lying within `THRESH_SNAP` of an integer.
pub fn snap(v: FVector) -> FVector {
    let snap_component = |c: f32| {
        let rounded = c.round();
        if (c - rounded).abs() < THRESH_SNAP { rounded } else { c }
    };
    FVector::new(snap_component(v.x), snap_component(v.y), snap_component(v.z))
}

/// Find the intersection of an infinite line (defined by two points) and
/// a plane.  Assumes that the line and plane do indeed intersect; you must
/// make sure they're not parallel before calling.
pub fn line_plane_intersection(point1: &FVector, point2: &FVector, plane: &FPlane) -> FVector {
    let d1 = plane.plane_dot(*point1);
    let d2 = plane.plane_dot(*point2);
    point1 + (point2 - point1) * (d1 / (d1 - d2))
}

pub fn transform_point(transform: &FMatrix, p: &FVector) -> FVector {
    let v: Vector4<f32> = transform * p.extend(1.0);
    v.truncate() / v.w
}

/// Translation part of an affine transform.
pub fn translation_of(transform: &FMatrix) -> FVector {
    transform.w.truncate()
}

/// Drop the `axis` component of `p`, projecting it onto the coordinate plane
/// perpendicular to that axis.
pub fn project_onto_axis_plane(p: &FVector, axis: usize) -> (f32, f32) {
    match axis {
        0 => (p.y, p.z),
        1 => (p.z, p.x),
        _ => (p.x, p.y),
    }
}
