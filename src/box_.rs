use std::ops::{Index, IndexMut};

use crate::math::{FRay, FVector};

/// Half size of the default editor world.
pub const DEFAULT_WORLD_HALF_SIZE: f32 = 8192.0;

/// An axis-aligned bounding box. A box that has never received a point is invalid
/// and contains nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FBox {
    pub min: FVector,
    pub max: FVector,
    pub is_valid: bool
}

impl Default for FBox {
    fn default() -> Self {
        Self::new()
    }
}

impl FBox {

    pub fn new() -> FBox {
        FBox {
            min: FVector::new(0.0, 0.0, 0.0),
            max: FVector::new(0.0, 0.0, 0.0),
            is_valid: false
        }
    }

    pub fn new_from_min_max(min: FVector, max: FVector) -> FBox {
        FBox { min, max, is_valid: true }
    }

    pub fn new_from_points<'a>(points: impl IntoIterator<Item = &'a FVector>) -> FBox {
        let mut box_ = FBox::new();
        for point in points {
            box_.add_point(point);
        }
        box_
    }

    /// A cube of the given half size centered at the origin.
    pub fn world_bounds(half_size: f32) -> FBox {
        FBox::new_from_min_max(
            FVector::new(-half_size, -half_size, -half_size),
            FVector::new(half_size, half_size, half_size),
        )
    }

    pub fn corners(&self) -> [FVector; 8] {
        // Bit 0 selects max.x, bit 1 max.y, bit 2 max.z.
        std::array::from_fn(|i| FVector::new(
            if i & 1 == 0 { self.min.x } else { self.max.x },
            if i & 2 == 0 { self.min.y } else { self.max.y },
            if i & 4 == 0 { self.min.z } else { self.max.z },
        ))
    }

    pub fn center(&self) -> FVector {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> FVector {
        self.max - self.min
    }

    pub fn add_point(&mut self, point: &FVector) {
        if self.is_valid {
            self.min.x = self.min.x.min(point.x);
            self.min.y = self.min.y.min(point.y);
            self.min.z = self.min.z.min(point.z);
            self.max.x = self.max.x.max(point.x);
            self.max.y = self.max.y.max(point.y);
            self.max.z = self.max.z.max(point.z);
        } else {
            self.min = *point;
            self.max = *point;
            self.is_valid = true;
        }
    }

    pub fn add_box(&mut self, other: &FBox) {
        if !other.is_valid {
            return;
        }
        if self.is_valid {
            self.add_point(&other.min);
            self.add_point(&other.max);
        } else {
            *self = *other;
        }
    }

    pub fn translate(&self, delta: &FVector) -> FBox {
        FBox { min: self.min + delta, max: self.max + delta, is_valid: self.is_valid }
    }

    pub fn intersects(&self, other: &FBox) -> bool {
        self.is_valid && other.is_valid &&
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: &FVector) -> bool {
        self.is_valid &&
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    pub fn contains_box(&self, other: &FBox) -> bool {
        self.is_valid && other.is_valid &&
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Distance along `ray` to the first point where it enters the box, or where it
    /// leaves the box if the ray starts inside. `None` if the ray misses.
    pub fn intersect_with_ray(&self, ray: &FRay) -> Option<f32> {
        if !self.is_valid {
            return None;
        }

        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            if direction == 0.0 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (self.min[axis] - origin) / direction;
            let t2 = (self.max[axis] - origin) / direction;
            near = near.max(t1.min(t2));
            far = far.min(t1.max(t2));
        }

        if far < near || far < 0.0 {
            None
        } else if near >= 0.0 {
            Some(near)
        } else {
            Some(far)
        }
    }
}

impl Index<usize> for FBox {
    type Output = FVector;
    fn index(&self, index: usize) -> &FVector {
        match index {
            0 => &self.min,
            1 => &self.max,
            _ => panic!("Index out of bounds")
        }
    }
}

impl IndexMut<usize> for FBox {
    fn index_mut(&mut self, index: usize) -> &mut FVector {
        match index {
            0 => &mut self.min,
            1 => &mut self.max,
            _ => panic!("Index out of bounds")
        }
    }
}
