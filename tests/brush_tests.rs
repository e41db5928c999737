use approx::assert_abs_diff_eq;
use brushwork::box_::{FBox, DEFAULT_WORLD_HALF_SIZE};
use brushwork::brush::Brush;
use brushwork::error::GeometryError;
use brushwork::face::BrushFace;
use brushwork::geometry::AddFaceResult;
use brushwork::hit::{HitTarget, HitType, PickResult};
use brushwork::math::{EPointStatus, FMatrix, FPlane, FRay, FVector};
use brushwork::object::ObjectRef;
use cgmath::{Deg, InnerSpace};

fn world() -> FBox {
    FBox::world_bounds(DEFAULT_WORLD_HALF_SIZE)
}

fn cube_bounds(min: f32, max: f32) -> FBox {
    FBox::new_from_min_max(FVector::new(min, min, min), FVector::new(max, max, max))
}

fn make_cube() -> Brush {
    Brush::new_cuboid(&world(), &cube_bounds(-32.0, 32.0), "base")
}

fn plane_set(brush: &Brush) -> Vec<FPlane> {
    brush.faces().iter().map(|face| *face.boundary()).collect()
}

fn assert_convex_and_closed(brush: &Brush) {
    let geometry = brush.geometry().unwrap();
    assert!(geometry.closed());
    assert_eq!(geometry.sanity_check(), Ok(()));
    for face in brush.faces() {
        for vertex in brush.vertices() {
            assert_ne!(face.boundary().point_status(&vertex), EPointStatus::Above);
        }
        assert!(brush.face_vertices(face.id()).len() >= 3);
    }
    for (_, edge) in geometry.edges() {
        assert!(edge.left.is_some() && edge.right.is_some());
        assert_ne!(edge.left, edge.right);
    }
}

#[test]
fn cuboid_test() {
    let brush = make_cube();
    assert_eq!(brush.faces().len(), 6);
    assert!(brush.is_valid());
    assert_eq!(brush.bounds(), cube_bounds(-32.0, 32.0));
    assert_eq!(brush.vertices().len(), 8);
    assert_eq!(brush.edges().len(), 12);
    for face in brush.faces() {
        assert_eq!(face.brush(), Some(brush.id()));
        assert!(face.side().is_some());
    }
    assert_convex_and_closed(&brush);
}

#[test]
fn selection_test() {
    let mut brush = make_cube();
    assert!(!brush.is_selected());
    brush.select();
    assert!(brush.is_selected());
    brush.deselect();
    assert!(!brush.is_selected());
}

#[test]
fn open_brush_is_not_valid_test() {
    let faces = vec![BrushFace::from_plane(FPlane::new(FVector::unit_x(), 0.0), "half")];
    let brush = Brush::new(&world(), faces);
    assert_eq!(brush.faces().len(), 1);
    assert!(!brush.is_valid());
    assert_eq!(brush.bounds().max.x, 0.0);
    assert_eq!(brush.bounds().min.x, -DEFAULT_WORLD_HALF_SIZE);
}

#[test]
fn clip_test() {
    let mut brush = make_cube();
    let clip_face = BrushFace::from_plane(FPlane::new(FVector::unit_x(), 0.0), "clip");
    let clip_id = clip_face.id();

    assert!(brush.clip(&world(), clip_face));
    assert_eq!(brush.faces().len(), 6);
    assert!(brush.face(clip_id).is_some());
    assert_eq!(brush.bounds(), FBox::new_from_min_max(FVector::new(-32.0, -32.0, -32.0), FVector::new(0.0, 32.0, 32.0)));
    for vertex in brush.face_vertices(clip_id) {
        assert_eq!(vertex.x, 0.0);
    }
    assert_convex_and_closed(&brush);

    let mut result = PickResult::by_distance();
    brush.pick(&FRay::new(FVector::new(100.0, 0.0, 0.0), FVector::new(-1.0, 0.0, 0.0)), &mut result);
    assert_eq!(result.len(), 1);
    let hit = result.hits()[0];
    assert_eq!(hit.hit_type(), HitType::Face);
    assert_abs_diff_eq!(hit.distance(), 100.0, epsilon = 0.001);
    assert_abs_diff_eq!(hit.hit_point().magnitude(), 0.0, epsilon = 0.001);
    assert_eq!(hit.target(), HitTarget::Face { brush: brush.id(), face: clip_id });
    assert_eq!(hit.error(), 0.0);
}

#[test]
fn clip_outside_test() {
    let mut brush = make_cube();
    let before = plane_set(&brush);
    let ids: Vec<_> = brush.faces().iter().map(|face| face.id()).collect();
    let bounds = brush.bounds();

    // The plane passes well clear of the cube, which lies entirely behind it.
    let normal = FVector::new(1.0, 1.0, 1.0).normalize();
    let outside = BrushFace::from_plane(FPlane::new(normal, 1000.0), "outside");
    assert!(!brush.clip(&world(), outside));
    assert_eq!(plane_set(&brush), before);
    assert_eq!(brush.faces().iter().map(|face| face.id()).collect::<Vec<_>>(), ids);
    assert_eq!(brush.bounds(), bounds);
    assert_convex_and_closed(&brush);
}

#[test]
fn clip_redundant_test() {
    let mut brush = make_cube();
    let before = plane_set(&brush);
    let redundant = BrushFace::from_plane(FPlane::new(FVector::unit_x(), 1000.0), "redundant");
    assert!(!brush.clip(&world(), redundant));
    assert_eq!(plane_set(&brush), before);
    assert_eq!(brush.vertices().len(), 8);
}

#[test]
fn clip_excluding_brush_test() {
    let mut brush = make_cube();
    // Keeps x >= 1000, which the cube does not reach.
    let beyond = BrushFace::from_plane(FPlane::new(-FVector::unit_x(), -1000.0), "beyond");
    assert!(!brush.clip(&world(), beyond));
    assert!(brush.faces().is_empty());
    assert!(brush.geometry().is_none());
    assert!(!brush.is_valid());
}

#[test]
fn clip_removes_everything_test() {
    let mut brush = make_cube();
    let left = BrushFace::from_plane(FPlane::new(FVector::unit_x(), -50.0), "left");
    assert!(!brush.clip(&world(), left));
    assert!(brush.faces().is_empty());
    assert!(!brush.is_valid());

    let right = BrushFace::from_plane(FPlane::new(-FVector::unit_x(), -50.0), "right");
    assert!(!brush.clip(&world(), right));
    assert!(brush.faces().is_empty());
    assert!(brush.geometry().is_none());
}

#[test]
fn opposing_planes_null_brush_test() {
    let mut faces = make_cube().faces().to_vec();
    faces.push(BrushFace::from_plane(FPlane::new(FVector::unit_x(), -50.0), "left"));
    faces.push(BrushFace::from_plane(FPlane::new(-FVector::unit_x(), -50.0), "right"));
    let brush = Brush::new(&world(), faces);
    assert!(brush.faces().is_empty());
    assert!(brush.geometry().is_none());
    assert!(!brush.is_valid());
    assert!(!brush.bounds().is_valid);

    let mut result = PickResult::by_distance();
    brush.pick(&FRay::new(FVector::new(100.0, 0.0, 0.0), FVector::new(-1.0, 0.0, 0.0)), &mut result);
    assert!(result.is_empty());
}

#[test]
fn redundant_faces_are_dropped_test() {
    let mut faces = make_cube().faces().to_vec();
    faces.push(BrushFace::from_plane(FPlane::new(FVector::unit_y(), 100.0), "outside"));
    let brush = Brush::new(&world(), faces);
    assert_eq!(brush.faces().len(), 6);
    assert!(brush.is_valid());
}

#[test]
fn pick_miss_test() {
    let brush = make_cube();
    let mut result = PickResult::by_distance();
    brush.pick(&FRay::new(FVector::new(100.0, 50.0, 0.0), FVector::new(-1.0, 0.0, 0.0)), &mut result);
    brush.pick(&FRay::new(FVector::new(100.0, 0.0, 0.0), FVector::new(1.0, 0.0, 0.0)), &mut result);
    assert!(result.is_empty());
}

#[test]
fn pick_from_inside_test() {
    let brush = make_cube();
    let mut result = PickResult::by_distance();
    brush.pick(&FRay::new(FVector::new(0.0, 0.0, 0.0), FVector::new(0.0, 0.0, 1.0)), &mut result);
    // Every face points away from an inside ray's origin.
    assert!(result.is_empty());
}

#[test]
fn pick_oblique_test() {
    let brush = make_cube();
    let mut result = PickResult::by_distance();
    let ray = FRay::new(FVector::new(0.0, 100.0, 10.0), FVector::new(0.0, -1.0, 0.0));
    brush.pick(&ray, &mut result);
    let hit = result.first_of_type(HitType::Face);
    assert!(hit.is_match());
    assert_abs_diff_eq!(hit.distance(), 68.0, epsilon = 0.001);
    assert_abs_diff_eq!(hit.hit_point().y, 32.0, epsilon = 0.001);
    assert_eq!(hit.target(), HitTarget::Face { brush: brush.id(), face: brush.faces()[2].id() });
}

#[test]
fn snapshot_round_trip_test() {
    let mut brush = make_cube();
    let before = plane_set(&brush);
    let ids: Vec<_> = brush.faces().iter().map(|face| face.id()).collect();
    let snapshot = brush.take_snapshot();

    assert!(brush.clip(&world(), BrushFace::from_plane(FPlane::new(FVector::unit_x(), 0.0), "clip")));
    assert_ne!(plane_set(&brush), before);

    snapshot.restore(&mut brush);
    assert_eq!(snapshot.brush(), brush.id());
    assert_eq!(plane_set(&brush), before);
    let restored_ids: Vec<_> = brush.faces().iter().map(|face| face.id()).collect();
    assert_eq!(restored_ids, ids);
    assert_eq!(brush.bounds(), cube_bounds(-32.0, 32.0));
    assert_convex_and_closed(&brush);
}

#[test]
fn can_move_boundary_test() {
    let mut brush = make_cube();
    let face = brush.faces()[0].id();
    let sides: Vec<_> = brush.faces().iter().map(|face| face.side()).collect();

    assert!(brush.can_move_boundary(&world(), face, &FVector::new(16.0, 0.0, 0.0)));
    assert!(brush.can_move_boundary(&world(), face, &FVector::new(-16.0, 0.0, 0.0)));
    assert!(!brush.can_move_boundary(&world(), face, &FVector::new(-64.0, 0.0, 0.0)));
    assert!(!brush.can_move_boundary(&world(), face, &FVector::new(-100.0, 0.0, 0.0)));
    assert!(!brush.can_move_boundary(&world(), face, &FVector::new(9000.0, 0.0, 0.0)));

    let after: Vec<_> = brush.faces().iter().map(|face| face.side()).collect();
    assert_eq!(after, sides);
    assert_eq!(brush.bounds(), cube_bounds(-32.0, 32.0));
    assert_convex_and_closed(&brush);
}

#[test]
fn can_move_boundary_dropping_face_test() {
    let mut brush = make_cube();
    let corner_normal = FVector::new(1.0, 1.0, 0.0).normalize();
    let corner = BrushFace::from_plane(FPlane::new(corner_normal, FVector::new(16.0, 32.0, 0.0).dot(corner_normal)), "corner");
    assert!(brush.clip(&world(), corner));
    assert_eq!(brush.faces().len(), 7);

    // Pushing +X inward past the bevel swallows the bevel face.
    let face = brush.faces()[0].id();
    assert!(!brush.can_move_boundary(&world(), face, &FVector::new(-24.0, 0.0, 0.0)));
    assert!(brush.can_move_boundary(&world(), face, &FVector::new(-8.0, 0.0, 0.0)));
}

#[test]
fn move_boundary_test() {
    let mut brush = make_cube();
    let face = brush.faces()[0].id();
    assert_eq!(brush.move_boundary(&world(), face, &FVector::new(16.0, 0.0, 0.0), false), Ok(AddFaceResult::Ok));
    assert_eq!(brush.bounds().max.x, 48.0);
    assert_eq!(brush.bounds().min.x, -32.0);
    assert_eq!(brush.faces().len(), 6);
    assert_convex_and_closed(&brush);
}

#[test]
fn move_boundary_texture_lock_test() {
    let mut brush = make_cube();
    let face = brush.faces()[4].id();
    assert_eq!(brush.move_boundary(&world(), face, &FVector::new(8.0, 0.0, 16.0), true), Ok(AddFaceResult::Ok));
    let moved = brush.face(face).unwrap();
    assert_eq!(moved.x_offset, -8.0);
    assert_eq!(moved.y_offset, 0.0);
    assert_eq!(brush.bounds().max.z, 48.0);
}

#[test]
fn move_boundary_unchecked_null_test() {
    let mut brush = make_cube();
    let face = brush.faces()[0].id();
    assert!(!brush.can_move_boundary(&world(), face, &FVector::new(-100.0, 0.0, 0.0)));
    assert_eq!(brush.move_boundary(&world(), face, &FVector::new(-100.0, 0.0, 0.0), false), Ok(AddFaceResult::BrushIsNull));
    assert!(brush.faces().is_empty());
    assert!(!brush.is_valid());

    let missing = make_cube().faces()[0].id();
    assert_eq!(
        brush.move_boundary(&world(), missing, &FVector::new(8.0, 0.0, 0.0), false),
        Err(GeometryError::FaceNotFound(missing))
    );
}

#[test]
fn transform_translation_test() {
    let mut brush = make_cube();
    brush.transform(&world(), &FMatrix::from_translation(FVector::new(16.0, 0.0, 0.0)), false);
    assert_eq!(brush.faces().len(), 6);
    assert_abs_diff_eq!(brush.bounds().min.x, -16.0, epsilon = 0.001);
    assert_abs_diff_eq!(brush.bounds().max.x, 48.0, epsilon = 0.001);
    assert_eq!(brush.faces()[2].x_offset, 0.0);
    assert_convex_and_closed(&brush);
}

#[test]
fn transform_texture_lock_test() {
    let mut brush = make_cube();
    brush.transform(&world(), &FMatrix::from_translation(FVector::new(16.0, 0.0, 0.0)), true);
    // The +Y face projects its texture X axis onto world X.
    assert_eq!(brush.faces()[2].x_offset, -16.0);
    // The +X face does not see the move along its own normal.
    assert_eq!(brush.faces()[0].x_offset, 0.0);
    assert_eq!(brush.faces()[0].y_offset, 0.0);
}

#[test]
fn transform_rotation_test() {
    let mut brush = make_cube();
    brush.transform(&world(), &FMatrix::from_angle_z(Deg(90.0)), false);
    assert_eq!(brush.faces().len(), 6);
    let bounds = brush.bounds();
    assert_abs_diff_eq!(bounds.min.x, -32.0, epsilon = 0.01);
    assert_abs_diff_eq!(bounds.max.y, 32.0, epsilon = 0.01);
    assert_convex_and_closed(&brush);
}

#[test]
fn transform_singular_test() {
    let mut brush = make_cube();
    brush.transform(&world(), &FMatrix::from_nonuniform_scale(0.0, 1.0, 1.0), false);
    assert!(brush.faces().is_empty());
    assert!(!brush.is_valid());
}

#[test]
fn contains_point_test() {
    let brush = make_cube();
    assert!(brush.contains_point(&FVector::new(0.0, 0.0, 0.0)));
    assert!(brush.contains_point(&FVector::new(32.0, 32.0, 32.0)));
    assert!(!brush.contains_point(&FVector::new(40.0, 0.0, 0.0)));
}

#[test]
fn contains_brush_test() {
    let outer = make_cube();
    let inner = Brush::new_cuboid(&world(), &cube_bounds(-8.0, 8.0), "inner");
    let overlapping = Brush::new_cuboid(&world(), &cube_bounds(0.0, 64.0), "overlap");

    assert!(outer.contains(ObjectRef::Brush(&inner)));
    assert!(!inner.contains(ObjectRef::Brush(&outer)));
    assert!(!outer.contains(ObjectRef::Brush(&overlapping)));
    assert!(outer.bounds().contains_box(&inner.bounds()));
}

#[test]
fn contains_brush_beveled_test() {
    let mut outer = make_cube();
    let normal = FVector::new(1.0, 1.0, 1.0).normalize();
    assert!(outer.clip(&world(), BrushFace::from_plane(FPlane::new(normal, 48.0 * 3.0_f32.sqrt() / 1.5 / 2.0), "bevel")));
    // The bounds still contain the corner cube but the bevel cuts it off.
    let corner = Brush::new_cuboid(&world(), &cube_bounds(24.0, 32.0), "corner");
    assert!(outer.bounds().contains_box(&corner.bounds()));
    assert!(!outer.contains_brush(&corner));
}

#[test]
fn intersects_brush_test() {
    let a = make_cube();
    let overlapping = Brush::new_cuboid(&world(), &cube_bounds(0.0, 64.0), "overlap");
    let disjoint = Brush::new_cuboid(&world(), &cube_bounds(100.0, 164.0), "disjoint");

    assert!(a.intersects(ObjectRef::Brush(&overlapping)));
    assert!(overlapping.intersects(ObjectRef::Brush(&a)));
    assert!(!a.intersects(ObjectRef::Brush(&disjoint)));
    assert!(!disjoint.intersects(ObjectRef::Brush(&a)));
}

#[test]
fn intersects_separated_by_face_normal_test() {
    let mut a = make_cube();
    let normal = FVector::new(1.0, 1.0, 0.0).normalize();
    assert!(a.clip(&world(), BrushFace::from_plane(FPlane::new(normal, 0.0), "diagonal")));
    let b = Brush::new_cuboid(
        &world(),
        &FBox::new_from_min_max(FVector::new(16.0, 16.0, -8.0), FVector::new(48.0, 48.0, 8.0)),
        "b",
    );

    assert!(a.bounds().intersects(&b.bounds()));
    assert!(!a.intersects_brush(&b));
    assert!(!b.intersects_brush(&a));
}

#[test]
fn intersects_opposed_wedges_test() {
    // Two halves of the same cube with a gap between their diagonal faces.
    let mut a = Brush::new_cuboid(&world(), &cube_bounds(-32.0, 32.0), "a");
    let n = FVector::new(1.0, 1.0, 0.0).normalize();
    assert!(a.clip(&world(), BrushFace::from_plane(FPlane::new(n, 0.0), "a")));

    let mut b = Brush::new_cuboid(&world(), &cube_bounds(-32.0, 32.0), "b");
    let m = FVector::new(-1.0, -1.0, 0.0).normalize();
    assert!(b.clip(&world(), BrushFace::from_plane(FPlane::new(m, -20.0), "b")));

    assert_eq!(a.intersects_brush(&b), b.intersects_brush(&a));
    assert!(!a.intersects_brush(&b));
}

fn make_textured_cube() -> Brush {
    let faces = [
        (FVector::unit_x(), "east"),
        (-FVector::unit_x(), "west"),
        (FVector::unit_y(), "north"),
        (-FVector::unit_y(), "south"),
        (FVector::unit_z(), "top"),
        (-FVector::unit_z(), "bottom"),
    ]
    .into_iter()
    .map(|(normal, texture)| BrushFace::from_plane(FPlane::new(normal, 32.0), texture))
    .collect();
    Brush::new(&world(), faces)
}

fn has_vertex(brush: &Brush, position: FVector) -> bool {
    brush.vertices().iter().any(|v| (v - position).magnitude() < 0.01)
}

#[test]
fn move_vertex_test() {
    let mut brush = make_cube();
    let corner = FVector::new(32.0, 32.0, 32.0);
    let delta = FVector::new(16.0, 16.0, 16.0);
    assert!(brush.can_move_vertices(&world(), &[corner], &delta));

    let moved = brush.move_vertices(&world(), &[corner], &delta).unwrap();
    assert_eq!(moved.len(), 1);
    assert_abs_diff_eq!((moved[0] - FVector::new(48.0, 48.0, 48.0)).magnitude(), 0.0, epsilon = 0.01);
    assert_eq!(brush.vertices().len(), 8);
    // The three faces at the corner each bend into two triangles.
    assert_eq!(brush.faces().len(), 9);
    assert!(!has_vertex(&brush, corner));
    assert_convex_and_closed(&brush);
}

#[test]
fn move_vertex_inside_rejected_test() {
    let mut brush = make_cube();
    let before = plane_set(&brush);
    let corner = FVector::new(32.0, 32.0, 32.0);
    let delta = FVector::new(-32.0, -32.0, -32.0);
    assert!(!brush.can_move_vertices(&world(), &[corner], &delta));
    assert_eq!(
        brush.move_vertices(&world(), &[corner], &delta),
        Err(GeometryError::VertexAbsorbed(FVector::new(0.0, 0.0, 0.0)))
    );
    assert_eq!(plane_set(&brush), before);
    assert_convex_and_closed(&brush);
}

#[test]
fn move_vertices_rejects_unknown_input_test() {
    let mut brush = make_cube();
    let nowhere = FVector::new(5.0, 5.0, 5.0);
    assert_eq!(
        brush.move_vertices(&world(), &[nowhere], &FVector::new(8.0, 0.0, 0.0)),
        Err(GeometryError::VertexNotFound(nowhere))
    );
    let corner = FVector::new(32.0, 32.0, 32.0);
    assert!(!brush.can_move_vertices(&world(), &[corner], &FVector::new(0.0, 0.0, 0.0)));
    assert!(!brush.can_move_vertices(&world(), &[], &FVector::new(8.0, 0.0, 0.0)));
    assert!(!brush.can_move_vertices(&world(), &[corner], &FVector::new(9000.0, 0.0, 0.0)));
}

#[test]
fn move_edge_test() {
    let mut brush = make_textured_cube();
    let top = brush.faces()[4].id();
    let edge = (FVector::new(32.0, 32.0, -32.0), FVector::new(32.0, 32.0, 32.0));
    let delta = FVector::new(16.0, 16.0, 0.0);
    assert!(brush.can_move_edges(&world(), &[edge], &delta));

    let moved = brush.move_edges(&world(), &[edge], &delta).unwrap();
    assert_abs_diff_eq!((moved[0].0 - FVector::new(48.0, 48.0, -32.0)).magnitude(), 0.0, epsilon = 0.01);
    assert_abs_diff_eq!((moved[0].1 - FVector::new(48.0, 48.0, 32.0)).magnitude(), 0.0, epsilon = 0.01);
    assert_eq!(brush.faces().len(), 6);
    assert_eq!(brush.vertices().len(), 8);
    assert!(brush.face(top).is_some());
    assert_eq!(brush.face_vertices(top).len(), 4);
    assert!(brush.faces().iter().any(|face| face.texture_name == "east" && face.boundary().normal().x < 1.0));
    assert_convex_and_closed(&brush);
}

#[test]
fn move_edge_rejected_test() {
    let brush = make_cube();
    let diagonal = (FVector::new(-32.0, -32.0, -32.0), FVector::new(32.0, 32.0, 32.0));
    assert!(!brush.can_move_edges(&world(), &[diagonal], &FVector::new(8.0, 0.0, 0.0)));

    // Sliding an edge onto the opposite one merges its vertices away.
    let edge = (FVector::new(32.0, 32.0, -32.0), FVector::new(32.0, 32.0, 32.0));
    assert!(!brush.can_move_edges(&world(), &[edge], &FVector::new(-64.0, -64.0, 0.0)));
}

#[test]
fn move_face_test() {
    let mut brush = make_cube();
    let east = brush.faces()[0].id();
    assert!(brush.can_move_faces(&world(), &[east], &FVector::new(16.0, 0.0, 0.0)));

    brush.move_faces(&world(), &[east], &FVector::new(16.0, 0.0, 0.0)).unwrap();
    assert_eq!(brush.bounds().max.x, 48.0);
    assert_eq!(brush.bounds().min.x, -32.0);
    assert_eq!(brush.face(east).unwrap().boundary().distance(), 48.0);
    assert_eq!(brush.faces().len(), 6);
    assert_convex_and_closed(&brush);
}

#[test]
fn move_face_through_opposite_rejected_test() {
    let mut brush = make_cube();
    let east = brush.faces()[0].id();
    let before = plane_set(&brush);
    assert!(!brush.can_move_faces(&world(), &[east], &FVector::new(-80.0, 0.0, 0.0)));
    assert_eq!(
        brush.move_faces(&world(), &[east], &FVector::new(-80.0, 0.0, 0.0)),
        Err(GeometryError::FaceNotFound(east))
    );
    assert_eq!(plane_set(&brush), before);
}

#[test]
fn split_edge_test() {
    let mut brush = make_textured_cube();
    let start = FVector::new(32.0, 32.0, -32.0);
    let end = FVector::new(32.0, 32.0, 32.0);
    assert!(brush.can_split_edge(&world(), &start, &end, &FVector::new(8.0, 8.0, 0.0)));
    assert!(!brush.can_split_edge(&world(), &start, &end, &FVector::new(-8.0, -8.0, 0.0)));
    assert!(!brush.can_split_edge(&world(), &start, &end, &FVector::new(0.0, 0.0, 0.0)));

    let added = brush.split_edge(&world(), &start, &end, &FVector::new(8.0, 8.0, 0.0)).unwrap();
    assert_abs_diff_eq!((added - FVector::new(40.0, 40.0, 0.0)).magnitude(), 0.0, epsilon = 0.01);
    assert_eq!(brush.vertices().len(), 9);
    assert!(has_vertex(&brush, start));
    assert!(has_vertex(&brush, end));
    assert!(brush.faces().iter().all(|face| face.texture_name != "east" || face.boundary().normal().x < 1.0));
    assert_convex_and_closed(&brush);
}

#[test]
fn split_face_test() {
    let mut brush = make_textured_cube();
    let top = brush.faces()[4].id();
    assert!(!brush.can_split_face(&world(), top, &FVector::new(16.0, 0.0, 0.0)));
    assert!(!brush.can_split_face(&world(), top, &FVector::new(0.0, 0.0, -16.0)));
    assert!(brush.can_split_face(&world(), top, &FVector::new(0.0, 0.0, 16.0)));

    let apex = brush.split_face(&world(), top, &FVector::new(0.0, 0.0, 16.0)).unwrap();
    assert_abs_diff_eq!((apex - FVector::new(0.0, 0.0, 48.0)).magnitude(), 0.0, epsilon = 0.01);
    assert!(brush.face(top).is_none());
    assert_eq!(brush.vertices().len(), 9);
    assert_eq!(brush.faces().len(), 9);
    assert_eq!(brush.faces().iter().filter(|face| face.texture_name == "top").count(), 4);
    assert_abs_diff_eq!(brush.bounds().max.z, 48.0, epsilon = 0.01);
    assert_convex_and_closed(&brush);
}

#[test]
fn snap_to_grid_test() {
    let bounds = FBox::new_from_min_max(FVector::new(-29.0, -29.0, -29.0), FVector::new(30.0, 30.0, 30.0));
    let mut brush = Brush::new_cuboid(&world(), &bounds, "base");
    let ids: Vec<_> = brush.faces().iter().map(|face| face.id()).collect();

    brush.snap(&world(), 8.0).unwrap();
    assert_eq!(brush.bounds(), cube_bounds(-32.0, 32.0));
    assert_eq!(brush.faces().len(), 6);
    assert!(brush.faces().iter().all(|face| ids.contains(&face.id())));
    assert_convex_and_closed(&brush);

    assert_eq!(brush.snap(&world(), 0.0), Err(GeometryError::InvalidGrid(0.0)));
}

#[test]
fn correct_test() {
    let bounds = FBox::new_from_min_max(FVector::new(-32.0, -32.0, 10.5), FVector::new(31.995, 32.0, 32.0));
    let mut brush = Brush::new_cuboid(&world(), &bounds, "base");
    let east = brush.faces()[0].id();

    brush.correct(&world(), 0.01).unwrap();
    assert_eq!(brush.bounds().max.x, 32.0);
    assert_eq!(brush.bounds().min.z, 10.5);
    assert_eq!(brush.face(east).unwrap().boundary().distance(), 32.0);
    assert_convex_and_closed(&brush);
}

#[test]
fn vertex_edit_on_null_brush_test() {
    let mut brush = make_cube();
    let beyond = BrushFace::from_plane(FPlane::new(-FVector::unit_x(), -1000.0), "beyond");
    assert!(!brush.clip(&world(), beyond));
    assert_eq!(brush.snap(&world(), 8.0), Err(GeometryError::NoGeometry));
    assert!(!brush.can_move_vertices(&world(), &[FVector::new(32.0, 32.0, 32.0)], &FVector::new(8.0, 0.0, 0.0)));
}
