//! Bounding planes of the convex hull of a point set.

use cgmath::InnerSpace;
use parry3d::math::Point;
use parry3d::transformation::try_convex_hull;

use crate::error::GeometryError;
use crate::math::{planes_are_same, points_are_same, FPlane, FVector, THRESH_POINTS_ARE_SAME, THRESH_ZERO_NORM_SQUARED};

/// One planar facet of a hull and the hull points lying on it.
#[derive(Clone, Debug)]
pub struct HullFacet {
    pub plane: FPlane,
    pub points: Vec<FVector>,
}

/// Facets of the convex hull of `points`, each plane facing away from the hull.
/// Coplanar hull triangles are merged into one facet.
pub fn hull_facets(points: &[FVector]) -> Result<Vec<HullFacet>, GeometryError> {
    if points.len() < 4 {
        return Err(GeometryError::DegenerateHull);
    }

    let input: Vec<Point<f32>> = points.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();
    let (vertices, triangles) = try_convex_hull(&input).map_err(|_| GeometryError::DegenerateHull)?;
    if vertices.len() < 4 {
        return Err(GeometryError::DegenerateHull);
    }
    let vertices: Vec<FVector> = vertices.iter().map(|p| FVector::new(p.x, p.y, p.z)).collect();
    let center = vertices.iter().fold(FVector::new(0.0, 0.0, 0.0), |sum, v| sum + v) / vertices.len() as f32;

    let mut facets: Vec<HullFacet> = Vec::new();
    for triangle in &triangles {
        let [a, b, c] = triangle.map(|i| vertices[i as usize]);
        let normal = (b - a).cross(c - a);
        if normal.magnitude2() < THRESH_ZERO_NORM_SQUARED {
            continue;
        }
        let normal = normal.normalize();
        let mut plane = FPlane::new(normal, normal.dot(a));
        if plane.plane_dot(center) > 0.0 {
            plane = FPlane::new(-normal, -plane.w);
        }

        let index = match facets.iter().position(|f| planes_are_same(&f.plane, &plane, THRESH_POINTS_ARE_SAME)) {
            Some(index) => index,
            None => {
                facets.push(HullFacet { plane, points: Vec::new() });
                facets.len() - 1
            }
        };
        for p in [a, b, c] {
            if !facets[index].points.iter().any(|q| points_are_same(&p, q)) {
                facets[index].points.push(p);
            }
        }
    }

    if facets.len() < 4 {
        return Err(GeometryError::DegenerateHull);
    }
    Ok(facets)
}
