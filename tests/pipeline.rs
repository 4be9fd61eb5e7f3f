//! End-to-end exercise of the relief contract: samples → height field →
//! triangle soup → cylindrical wrap.

use bevy_relief_wrap::{
    field::{GraySamples, HeightField},
    height::EmbossProfile,
    mesh::ReliefMesh,
    types::Point,
    wrap::{CylinderWrap, PointTransform, cartesian_to_cylindrical},
};

fn checkerboard(rows: usize, cols: usize) -> GraySamples {
    GraySamples::from_shape_fn((rows, cols), |(r, c)| ((r + c) % 2) as f32)
}

/// Triangulates the top surface of a height field, two triangles per cell.
fn triangulate(field: &HeightField, cell: f32) -> Vec<Point> {
    let at = |r: usize, c: usize| Point::new(c as f32 * cell, r as f32 * cell, field.get(r, c));
    let mut vertices = Vec::new();
    for r in 0..field.rows() - 1 {
        for c in 0..field.cols() - 1 {
            vertices.extend([at(r, c), at(r, c + 1), at(r + 1, c + 1)]);
            vertices.extend([at(r, c), at(r + 1, c + 1), at(r + 1, c)]);
        }
    }
    vertices
}

#[test]
fn embossed_plate_wraps_onto_cylinder() {
    let samples = checkerboard(8, 8);
    let field = HeightField::from_samples(&samples, &EmbossProfile::default()).unwrap();

    // Invert profile: black cells protrude 3 units, white cells sit flat.
    assert_eq!(field.extent(), (0.0, 3.0));

    let planar = triangulate(&field, 1.0);
    let mut mesh = ReliefMesh::from_vertices(planar.clone()).unwrap();
    mesh.remap(&CylinderWrap::default());

    assert_eq!(mesh.vertices.len(), planar.len());
    assert_eq!(mesh.normals.len(), planar.len());

    // Every wrapped vertex sits at distance base_radius + emboss height from
    // the cylinder axis, with the plate's y running along the axis.
    for (wrapped, original) in mesh.vertices.iter().zip(&planar) {
        let (radius, _, z) = cartesian_to_cylindrical(*wrapped);
        assert!((radius - (30.0 + original.z)).abs() < 1e-4);
        assert!((z - original.y).abs() < 1e-5);
    }
}

#[test]
fn wrap_is_per_vertex_and_order_independent() {
    let wrap = CylinderWrap::default();
    let points = [
        Point::new(2.0, 3.0, 1.0),
        Point::new(-7.0, 0.5, 0.0),
        Point::new(40.0, -2.0, 3.0),
    ];

    // Remapping a whole mesh must agree with applying the policy one point
    // at a time, whatever the order.
    let mut mesh = ReliefMesh::from_vertices(points.to_vec()).unwrap();
    mesh.remap(&wrap);

    for (i, p) in points.iter().enumerate().rev() {
        let expected = wrap.apply(*p);
        assert!((mesh.vertices[i] - expected).norm() < 1e-6);
    }
}
