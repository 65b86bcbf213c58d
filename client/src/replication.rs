//! Mirrors the simulation's scene graph into render entities.
//!
//! Nodes are spawned and despawned when the graph revision changes. Transforms,
//! visibility and tints are copied every frame.

use bevy::{platform::collections::HashMap, prelude::*};
use sim::{NodeId, SceneNode, Tint};

use crate::convert::{isometry_to_transform, vector_to_vec3};
use crate::loading::ModelVisuals;
use crate::session::{SimSession, SimSet};
use crate::state::AppState;

/// Render entity for a scene node.
#[derive(Component, Debug)]
pub struct SceneEntity {
    pub node: NodeId,
    tint: Option<Tint>,
}

/// Mesh child of a [`SceneEntity`], remembering the material it was loaded with.
#[derive(Component, Debug)]
struct BaseMaterial(Handle<StandardMaterial>);

#[derive(Resource, Default)]
struct Replicated {
    entities: HashMap<NodeId, Entity>,
    revision: Option<u64>,
}

#[derive(Resource)]
struct TintMaterials {
    hover: Handle<StandardMaterial>,
    screen: Handle<StandardMaterial>,
    fallback: Handle<StandardMaterial>,
}

impl TintMaterials {
    fn get(&self, tint: Tint) -> Handle<StandardMaterial> {
        match tint {
            Tint::Hover => self.hover.clone(),
            Tint::Screen => self.screen.clone(),
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Replicated>();
    app.add_systems(OnEnter(AppState::Playing), create_tint_materials);
    app.add_systems(
        Update,
        (sync_nodes, sync_poses, sync_tints)
            .chain()
            .in_set(SimSet::Present),
    );
}

fn create_tint_materials(mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>) {
    commands.insert_resource(TintMaterials {
        hover: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.2, 0.2),
            emissive: LinearRgba::rgb(0.8, 0.0, 0.0),
            ..default()
        }),
        screen: materials.add(StandardMaterial {
            base_color: Color::WHITE,
            emissive: LinearRgba::rgb(0.6, 0.7, 0.9),
            ..default()
        }),
        fallback: materials.add(StandardMaterial::default()),
    });
}

fn spawn_node(
    commands: &mut Commands,
    id: NodeId,
    node: &SceneNode,
    visuals: &ModelVisuals,
    fallback: &Handle<StandardMaterial>,
) -> Entity {
    let pivot = Transform::from_translation(vector_to_vec3(&node.pivot));
    let entity = commands
        .spawn((
            SceneEntity {
                node: id,
                tint: None,
            },
            Transform::default(),
            Visibility::default(),
            Name::new(node.name.clone()),
        ))
        .id();

    for visual in &node.visuals {
        for primitive in visuals.get(*visual) {
            let material = primitive.material.clone().unwrap_or_else(|| fallback.clone());
            commands.spawn((
                ChildOf(entity),
                Mesh3d(primitive.mesh.clone()),
                MeshMaterial3d(material.clone()),
                BaseMaterial(material),
                pivot * primitive.transform,
            ));
        }
    }
    entity
}

fn sync_nodes(
    mut commands: Commands,
    session: Res<SimSession>,
    visuals: Res<ModelVisuals>,
    tints: Res<TintMaterials>,
    mut replicated: ResMut<Replicated>,
) {
    let scene = session.scene();
    if replicated.revision == Some(scene.revision()) {
        return;
    }
    replicated.revision = Some(scene.revision());

    replicated.entities.retain(|id, entity| {
        let alive = scene.contains(*id);
        if !alive {
            commands.entity(*entity).despawn();
        }
        alive
    });

    let mut spawned = 0;
    for (id, node) in scene.iter() {
        if replicated.entities.contains_key(&id) {
            continue;
        }
        let entity = spawn_node(&mut commands, id, node, &visuals, &tints.fallback);
        replicated.entities.insert(id, entity);
        spawned += 1;
    }
    debug!(
        "scene revision {}: {spawned} nodes spawned, {} live",
        scene.revision(),
        replicated.entities.len()
    );
}

fn sync_poses(
    session: Res<SimSession>,
    mut nodes: Query<(&SceneEntity, &mut Transform, &mut Visibility)>,
) {
    let scene = session.scene();
    for (entity, mut transform, mut visibility) in &mut nodes {
        let Some(world) = scene.world_transform(entity.node) else {
            continue;
        };
        *transform = isometry_to_transform(&world);
        *visibility = if scene.is_visible(entity.node) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn sync_tints(
    session: Res<SimSession>,
    tints: Res<TintMaterials>,
    mut nodes: Query<(&mut SceneEntity, &Children)>,
    mut meshes: Query<(&BaseMaterial, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    let scene = session.scene();
    for (mut entity, children) in &mut nodes {
        let tint = scene.get(entity.node).and_then(|n| n.tint);
        if tint == entity.tint {
            continue;
        }
        entity.tint = tint;

        for child in children.iter() {
            let Ok((base, mut material)) = meshes.get_mut(child) else {
                continue;
            };
            material.0 = match tint {
                Some(tint) => tints.get(tint),
                None => base.0.clone(),
            };
        }
    }
}
