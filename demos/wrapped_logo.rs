use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use nalgebra::Point3;
use noiz::prelude::*;

use bevy_relief_wrap::{
    ReliefWrapPlugin,
    field::{GraySamples, HeightField},
    plugin::{EmbossField, ReliefPlate, SourceMesh, WrapShape},
    wrap::CylinderWrap,
};

const PLATE_RES: usize = 96;
const CELL: f32 = 0.5;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            ReliefWrapPlugin::default(),
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, hand_over_to_wrap)
        .run();
}

fn setup(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            fadeout_distance: 500.0,
            ..Default::default()
        },
        ..Default::default()
    });

    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            ..default()
        },
        Transform::from_xyz(0., 60., 80.).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    commands.spawn((
        ReliefPlate::new(procedural_logo(PLATE_RES, PLATE_RES)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.6, 0.8),
            ..Default::default()
        })),
    ));
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

/// Once the emboss field is ready, triangulate the planar relief and hand it
/// back to the plugin to bend onto a cylinder. The wrap stage remaps every
/// vertex, rebuilds normals, and uploads the final `Mesh3d`.
fn hand_over_to_wrap(
    mut commands: Commands,
    query: Query<(Entity, &EmbossField), (Without<SourceMesh>, Without<Mesh3d>)>,
) {
    for (entity, field) in query.iter() {
        commands.entity(entity).insert((
            SourceMesh::new(relief_vertices(&field.0, CELL)),
            WrapShape {
                wrap: CylinderWrap::default(),
            },
        ));
    }
}

/// Triangulates the top surface of the relief: plate `x` sweeps around the
/// cylinder, plate `y` runs along the axis, emboss height along `z`.
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
