use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use nalgebra::Point3;
use noiz::prelude::*;

use bevy_relief_wrap::{
    ReliefWrapPlugin,
    field::{GraySamples, HeightField},
    mesh::ReliefMesh,
    plugin::{EmbossField, ReliefPlate},
};

const PLATE_RES: usize = 96;
const CELL: f32 = 0.5;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            ReliefWrapPlugin::default(),
            PanOrbitCameraPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, upload_relief)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            ..default()
        },
        Transform::from_xyz(0., 40., 40.).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    // Stand-in for a decoded logo image: a procedural grayscale pattern.
    commands.spawn(ReliefPlate::new(procedural_logo(PLATE_RES, PLATE_RES)));
}

/// Builds a normalized grayscale grid from layered gradient noise.
fn procedural_logo(rows: usize, cols: usize) -> GraySamples {
    let mut noise = Noise::<
        LayeredNoise<
            Normed<f32>,
            Persistence,
            Octave<MixCellGradients<OrthoGrid, Smoothstep, QuickGradients>>,
        >,
    >::default();
    noise.set_frequency(0.08);

    GraySamples::from_shape_fn((rows, cols), |(row, col)| {
        let g: f32 = noise.sample_for(Vec2::new(col as f32, row as f32));
        (0.5 * (g + 1.0)).clamp(0.0, 1.0)
    })
}

/// Once the plugin has computed the emboss field, triangulate the relief
/// surface and upload it as-is (no wrap).
fn upload_relief(
    mut commands: Commands,
    query: Query<(Entity, &EmbossField), Without<Mesh3d>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, field) in query.iter() {
        let mesh = ReliefMesh::from_vertices(relief_vertices(&field.0, CELL))
            .expect("triangulated surface has a whole number of triangles");
        let (positions, normals, indices) = mesh.into_buffers();

        let mut bevy_mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );
        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        bevy_mesh.insert_indices(Indices::U32(indices));

        commands.entity(entity).insert((
            Mesh3d(meshes.add(bevy_mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.8, 0.7, 0.3),
                ..Default::default()
            })),
        ));
    }
}

/// Triangulates the top surface of the relief: plate `x`/`y` in the plane,
/// emboss height along `z`. Two triangles per sample cell, centered on the
/// origin.
fn relief_vertices(field: &HeightField, cell: f32) -> Vec<Point3<f32>> {
    let half_w = (field.cols() - 1) as f32 * cell / 2.0;
    let half_d = (field.rows() - 1) as f32 * cell / 2.0;
    let at = |row: usize, col: usize| {
        Point3::new(
            col as f32 * cell - half_w,
            row as f32 * cell - half_d,
            field.get(row, col),
        )
    };

    let mut vertices = Vec::with_capacity((field.rows() - 1) * (field.cols() - 1) * 6);
    for row in 0..field.rows() - 1 {
        for col in 0..field.cols() - 1 {
            let (p00, p10) = (at(row, col), at(row, col + 1));
            let (p01, p11) = (at(row + 1, col), at(row + 1, col + 1));
            vertices.extend([p00, p10, p11]);
            vertices.extend([p00, p11, p01]);
        }
    }
    vertices
}
