use brushwork::box_;
use brushwork::math::{FRay, FVector};

use box_::FBox;

#[test]
fn box_new_test() {
    let box_ = FBox::new();
    assert_eq!(box_.min, FVector::new(0.0, 0.0, 0.0));
    assert_eq!(box_.max, FVector::new(0.0, 0.0, 0.0));
    assert_eq!(box_.is_valid, false);
}

#[test]
fn box_new_from_points_test() {
    let points = vec![
        FVector::new(1.0, 2.0, 3.0),
        FVector::new(4.0, 5.0, 6.0),
        FVector::new(7.0, 8.0, 9.0)
    ];
    let box_ = FBox::new_from_points(&points);
    assert_eq!(box_.min, FVector::new(1.0, 2.0, 3.0));
    assert_eq!(box_.max, FVector::new(7.0, 8.0, 9.0));
    assert_eq!(box_.is_valid, true);
}

#[test]
fn box_new_from_min_max_test() {
    let min = FVector::new(1.0, 2.0, 3.0);
    let max = FVector::new(4.0, 5.0, 6.0);
    let box_ = FBox::new_from_min_max(min, max);
    assert_eq!(box_.min, min);
    assert_eq!(box_.max, max);
    assert_eq!(box_.is_valid, true);
}

#[test]
fn box_world_bounds_test() {
    let box_ = FBox::world_bounds(box_::DEFAULT_WORLD_HALF_SIZE);
    assert_eq!(box_.min, FVector::new(-8192.0, -8192.0, -8192.0));
    assert_eq!(box_.max, FVector::new(8192.0, 8192.0, 8192.0));
}

#[test]
fn box_center_test() {
    let box_ = FBox::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    assert_eq!(box_.center(), FVector::new(2.5, 3.5, 4.5));
}

#[test]
fn box_size_test() {
    let box_ = FBox::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    assert_eq!(box_.size(), FVector::new(3.0, 3.0, 3.0));
}

#[test]
fn box_corners_test() {
    let box_ = FBox::new_from_min_max(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 2.0, 3.0));
    let corners = box_.corners();
    assert_eq!(corners[0], FVector::new(0.0, 0.0, 0.0));
    assert_eq!(corners[1], FVector::new(1.0, 0.0, 0.0));
    assert_eq!(corners[2], FVector::new(0.0, 2.0, 0.0));
    assert_eq!(corners[4], FVector::new(0.0, 0.0, 3.0));
    assert_eq!(corners[7], FVector::new(1.0, 2.0, 3.0));
}

#[test]
fn box_index_test() {
    let box_ = FBox::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    assert_eq!(box_[0], FVector::new(1.0, 2.0, 3.0));
    assert_eq!(box_[1], FVector::new(4.0, 5.0, 6.0));
}

#[test]
fn box_add_box_test() {
    let mut box_ = FBox::new();
    box_.add_box(&FBox::new_from_min_max(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0)));
    box_.add_box(&FBox::new_from_min_max(FVector::new(-1.0, 2.0, 0.5), FVector::new(0.0, 3.0, 0.5)));
    box_.add_box(&FBox::new());
    assert_eq!(box_.min, FVector::new(-1.0, 0.0, 0.0));
    assert_eq!(box_.max, FVector::new(1.0, 3.0, 1.0));
}

#[test]
fn box_intersects_disjoint_test() {
    let box1 = FBox::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    let box2 = FBox::new_from_min_max(FVector::new(5.0, 6.0, 7.0), FVector::new(8.0, 9.0, 10.0));
    assert_eq!(box1.intersects(&box2), false);
}

#[test]
fn box_intersects_contained_test() {
    let box1 = FBox::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    let box2 = FBox::new_from_min_max(FVector::new(2.0, 3.0, 4.0), FVector::new(3.0, 4.0, 5.0));
    assert_eq!(box1.intersects(&box2), true);
    assert_eq!(box1.contains_box(&box2), true);
    assert_eq!(box2.contains_box(&box1), false);
}

#[test]
fn box_intersects_overlap_test() {
    let box1 = FBox::new_from_min_max(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0));
    let box2 = FBox::new_from_min_max(FVector::new(0.5, 0.5, 0.5), FVector::new(1.5, 1.5, 1.5));
    assert_eq!(box1.intersects(&box2), true);
    assert_eq!(box1.contains_box(&box2), false);
}

#[test]
fn box_invalid_contains_nothing_test() {
    let box_ = FBox::new();
    assert_eq!(box_.contains_point(&FVector::new(0.0, 0.0, 0.0)), false);
    assert_eq!(box_.intersects(&box_), false);
}

#[test]
fn box_ray_hit_test() {
    let box_ = FBox::new_from_min_max(FVector::new(-1.0, -1.0, -1.0), FVector::new(1.0, 1.0, 1.0));
    let ray = FRay::new(FVector::new(10.0, 0.0, 0.0), FVector::new(-1.0, 0.0, 0.0));
    assert_eq!(box_.intersect_with_ray(&ray), Some(9.0));
}

#[test]
fn box_ray_from_inside_test() {
    let box_ = FBox::new_from_min_max(FVector::new(-1.0, -1.0, -1.0), FVector::new(1.0, 1.0, 1.0));
    let ray = FRay::new(FVector::new(0.0, 0.0, 0.0), FVector::new(0.0, 0.0, 1.0));
    assert_eq!(box_.intersect_with_ray(&ray), Some(1.0));
}

#[test]
fn box_ray_miss_test() {
    let box_ = FBox::new_from_min_max(FVector::new(-1.0, -1.0, -1.0), FVector::new(1.0, 1.0, 1.0));
    let away = FRay::new(FVector::new(10.0, 0.0, 0.0), FVector::new(1.0, 0.0, 0.0));
    let beside = FRay::new(FVector::new(10.0, 5.0, 0.0), FVector::new(-1.0, 0.0, 0.0));
    assert_eq!(box_.intersect_with_ray(&away), None);
    assert_eq!(box_.intersect_with_ray(&beside), None);
}
