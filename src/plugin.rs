use std::sync::Arc;

use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};

use crate::{
    error::Result,
    field::{GraySamples, HeightField},
    height::EmbossProfile,
    mesh::ReliefMesh,
    types::{Point, Value},
    wrap::CylinderWrap,
};

/// System sets for the relief pipeline.
///
/// Use these to order your own systems relative to the pipeline — e.g. a
/// solid constructor that consumes [`EmbossField`] data:
///
/// ```rust,ignore
/// app.add_systems(Update, build_solid.after(ReliefSet::Generate)
///                                    .before(ReliefSet::Upload));
/// ```
///
/// ```text
/// ReliefSet::Spawn  →  [async compute]  →  ReliefSet::Generate  →  [your systems]  →  ReliefSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReliefSet {
    /// Spawns an async compute task for each queued plate or wrap shape.
    Spawn,
    /// Polls async tasks and inserts results on completion.
    Generate,
    /// Uploads wrapped geometry into a Bevy [`Mesh3d`].
    Upload,
}

/// Marker component added to entities that are waiting to be processed.
///
/// Removed automatically once the entity's result has been produced.
#[derive(Component)]
pub struct QueuedRelief;

/// A base plate with a grayscale image to emboss.
///
/// Spawn this to have the pipeline derive an [`EmbossField`] for the entity:
/// one height per sample, computed off the main thread with the plate's
/// [`EmbossProfile`].
///
/// `samples` is wrapped in an [`Arc`] so the async task can hold a reference
/// to the grid without copying it.
#[derive(Component)]
#[require(Transform)]
pub struct ReliefPlate {
    /// Normalized grayscale samples, indexed `[row][col]`.
    pub samples: Arc<GraySamples>,
    /// Grayscale-to-height policy.
    pub profile: EmbossProfile,
}

impl ReliefPlate {
    /// Creates a plate with the default (invert) emboss profile.
    pub fn new(samples: GraySamples) -> Self {
        Self {
            samples: Arc::new(samples),
            profile: EmbossProfile::default(),
        }
    }

    /// Sets the emboss profile.
    pub fn with_profile(mut self, profile: EmbossProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Per-pixel emboss heights computed from a [`ReliefPlate`].
///
/// Inserted by [`ReliefSet::Generate`]. Downstream solid constructors read
/// this to extrude the plate; this crate does not build the solid itself.
#[derive(Component)]
pub struct EmbossField(pub HeightField);

/// Planar relief geometry handed over by a solid constructor, as a flat
/// triangle soup (three consecutive vertices per triangle).
///
/// `vertices` is `Arc`-shared so the wrap task can read it without a
/// main-thread copy.
#[derive(Component)]
#[require(Transform)]
pub struct SourceMesh {
    pub vertices: Arc<Vec<Point>>,
}

impl SourceMesh {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self {
            vertices: Arc::new(vertices),
        }
    }
}

/// Bends a [`SourceMesh`] onto a cylindrical shell.
///
/// Spawn it together with the source mesh; the pipeline remaps every vertex
/// off the main thread, rebuilds flat normals, and uploads a [`Mesh3d`].
#[derive(Component, Default)]
pub struct WrapShape {
    pub wrap: CylinderWrap,
}

/// Holds the in-flight async task computing an [`EmbossField`].
#[derive(Component)]
pub struct FieldTask(Task<Result<HeightField>>);

/// Holds the in-flight async task bending a [`SourceMesh`].
#[derive(Component)]
pub struct WrapTask(Task<Result<ReliefMesh>>);

/// Wrapped geometry ready for upload, produced by [`ReliefSet::Generate`].
///
/// Removed again once [`ReliefSet::Upload`] has moved the buffers into a
/// Bevy mesh. Insert your own systems between the two sets to read it
/// (e.g. for collider generation).
#[derive(Component)]
pub struct WrappedMesh {
    pub positions: Vec<[Value; 3]>,
    pub normals: Vec<[Value; 3]>,
    pub indices: Vec<u32>,
}

/// Runtime configuration for the relief pipeline.
///
/// Inserted as a resource by [`ReliefWrapPlugin`]. Modify it at any time to
/// change behaviour.
#[derive(Resource)]
pub struct ReliefConfig {
    /// Maximum number of async tasks spawned per frame.
    ///
    /// Higher values process plates faster but may cause frame hitches when
    /// many entities are queued at once. Default: `4`.
    pub max_tasks_per_frame: usize,
}

impl Default for ReliefConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: 4,
        }
    }
}

/// Bevy plugin that drives emboss-field generation and cylindrical wrapping.
///
/// When the `auto_queue` feature is enabled, any [`ReliefPlate`] or
/// [`WrapShape`] added to the world is automatically processed. The heavy
/// work runs on Bevy's `AsyncComputeTaskPool` so the main thread is never
/// blocked:
///
/// ```text
/// ReliefPlate added                      WrapShape + SourceMesh added
///   → QueuedRelief inserted                → QueuedRelief inserted
///   → FieldTask spawned                    → WrapTask spawned
///   → [async compute runs]                 → [async compute runs]
///   → EmbossField inserted                 → WrappedMesh inserted
///   → QueuedRelief removed                 → [your collider systems here]
///                                          → Mesh3d inserted, markers removed
/// ```
pub struct ReliefWrapPlugin {
    /// Initial value for [`ReliefConfig::max_tasks_per_frame`].
    pub max_tasks_per_frame: usize,
}

impl Default for ReliefWrapPlugin {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: ReliefConfig::default().max_tasks_per_frame,
        }
    }
}

impl Plugin for ReliefWrapPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ReliefConfig {
            max_tasks_per_frame: self.max_tasks_per_frame,
        });

        #[cfg(feature = "auto_queue")]
        app.configure_sets(
            Update,
            (ReliefSet::Spawn, ReliefSet::Generate, ReliefSet::Upload).chain(),
        )
        .add_systems(
            Update,
            (
                on_relief_add,
                (spawn_field_tasks, spawn_wrap_tasks).in_set(ReliefSet::Spawn),
                (poll_field_tasks, poll_wrap_tasks).in_set(ReliefSet::Generate),
                upload_wrapped_mesh.in_set(ReliefSet::Upload),
            ),
        );
    }
}

/// Inserts [`QueuedRelief`] on every newly added [`ReliefPlate`] or [`WrapShape`].
fn on_relief_add(
    mut commands: Commands,
    plates: Query<Entity, (Added<ReliefPlate>, Without<QueuedRelief>)>,
    shapes: Query<Entity, (Added<WrapShape>, Without<QueuedRelief>)>,
) {
    for entity in plates.iter().chain(shapes.iter()) {
        commands.entity(entity).insert(QueuedRelief);
    }
}

/// Spawns emboss-field tasks for queued plates, up to
/// [`ReliefConfig::max_tasks_per_frame`] per frame.
fn spawn_field_tasks(
    mut commands: Commands,
    config: Res<ReliefConfig>,
    query: Query<(Entity, &ReliefPlate), (With<QueuedRelief>, Without<FieldTask>, Without<EmbossField>)>,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, plate) in query.iter().take(config.max_tasks_per_frame) {
        // Arc::clone is a single pointer bump — no heap allocation on the main thread.
        let samples: Arc<GraySamples> = Arc::clone(&plate.samples);
        let profile = plate.profile;

        let task = task_pool.spawn(async move { HeightField::from_samples(&samples, &profile) });

        commands.entity(entity).insert(FieldTask(task));
    }
}

/// Spawns wrap tasks for queued shapes, up to
/// [`ReliefConfig::max_tasks_per_frame`] per frame.
fn spawn_wrap_tasks(
    mut commands: Commands,
    config: Res<ReliefConfig>,
    query: Query<
        (Entity, &WrapShape, &SourceMesh),
        (With<QueuedRelief>, Without<WrapTask>, Without<Mesh3d>),
    >,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, shape, source) in query.iter().take(config.max_tasks_per_frame) {
        let wrap = shape.wrap;
        let vertices: Arc<Vec<Point>> = Arc::clone(&source.vertices);

        let task = task_pool.spawn(async move { run_wrap(wrap, &vertices) });

        commands.entity(entity).insert(WrapTask(task));
    }
}

/// Polls in-flight [`FieldTask`]s and inserts [`EmbossField`] on completion.
///
/// Non-blocking: tasks that haven't finished are skipped and retried next frame.
fn poll_field_tasks(mut commands: Commands, mut query: Query<(Entity, &mut FieldTask)>) {
    for (entity, mut task) in query.iter_mut() {
        let Some(result) = block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        match result {
            Ok(field) => {
                commands
                    .entity(entity)
                    .insert(EmbossField(field))
                    .remove::<(FieldTask, QueuedRelief)>();
            }
            Err(err) => {
                warn!("emboss field generation failed: {err}");
                commands.entity(entity).remove::<(FieldTask, QueuedRelief)>();
            }
        }
    }
}

/// Polls in-flight [`WrapTask`]s and inserts [`WrappedMesh`] on completion.
fn poll_wrap_tasks(mut commands: Commands, mut query: Query<(Entity, &mut WrapTask)>) {
    for (entity, mut task) in query.iter_mut() {
        let Some(result) = block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        match result {
            Ok(mesh) => {
                let (positions, normals, indices) = mesh.into_buffers();
                commands
                    .entity(entity)
                    .insert(WrappedMesh {
                        positions,
                        normals,
                        indices,
                    })
                    .remove::<WrapTask>();
            }
            Err(err) => {
                warn!("wrap failed: {err}");
                commands.entity(entity).remove::<(WrapTask, QueuedRelief)>();
            }
        }
    }
}

/// Uploads a [`WrappedMesh`] into a Bevy [`Mesh3d`], then removes
/// [`WrappedMesh`] and [`QueuedRelief`].
fn upload_wrapped_mesh(
    mut commands: Commands,
    query: Query<(Entity, &WrappedMesh), With<QueuedRelief>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (entity, wrapped) in query.iter() {
        let mut bevy_mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );

        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, wrapped.positions.clone());
        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, wrapped.normals.clone());
        bevy_mesh.insert_indices(Indices::U32(wrapped.indices.clone()));

        debug!("uploading wrapped mesh with {} vertices", wrapped.positions.len());

        commands
            .entity(entity)
            .insert(Mesh3d(meshes.add(bevy_mesh)))
            .remove::<(WrappedMesh, QueuedRelief)>();
    }
}

/// Bends a vertex soup onto a cylinder: group into triangles, remap every
/// vertex in parallel, rebuild flat normals.
fn run_wrap(wrap: CylinderWrap, vertices: &[Point]) -> Result<ReliefMesh> {
    let mut mesh = ReliefMesh::from_vertices(vertices.to_vec())?;
    mesh.remap(&wrap);
    Ok(mesh)
}
