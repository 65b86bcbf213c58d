//! Requests the chosen glTF models and turns them into [`SceneAsset`]s once both
//! have loaded with all their meshes.

use bevy::{
    asset::LoadState,
    gltf::{Gltf, GltfMesh, GltfNode},
    mesh::{Indices, VertexAttributeValues},
    platform::collections::HashSet,
    prelude::*,
};
use sim::{AssetNode, AssetSource, MeshGeometry, SceneAsset, Session};

use crate::convert::vec3_to_point;
use crate::session::SimSession;
use crate::state::{AppState, Choice};

#[derive(Resource)]
struct ModelHandles {
    world: Handle<Gltf>,
    vehicle: Handle<Gltf>,
}

/// One renderable piece of a model node, in model space.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub mesh: Handle<Mesh>,
    pub material: Option<Handle<StandardMaterial>>,
    pub transform: Transform,
}

/// Renderable primitives per [`AssetNode`], indexed like the asset's nodes.
#[derive(Resource, Default)]
pub struct ModelVisuals {
    pub world: Vec<Vec<Primitive>>,
    pub vehicle: Vec<Vec<Primitive>>,
}

impl ModelVisuals {
    pub fn get(&self, visual: sim::VisualRef) -> &[Primitive] {
        let table = match visual.source {
            AssetSource::World => &self.world,
            AssetSource::Vehicle => &self.vehicle,
        };
        table.get(visual.index).map_or(&[], Vec::as_slice)
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::Loading), request_models);
    app.add_systems(
        Update,
        finish_loading.run_if(in_state(AppState::Loading)),
    );
}

fn request_models(mut commands: Commands, asset_server: Res<AssetServer>, choice: Res<Choice>) {
    commands.insert_resource(ModelHandles {
        world: asset_server.load(choice.world.model_path()),
        vehicle: asset_server.load(choice.vehicle.profile().model_path),
    });
}

struct ModelAssets<'a> {
    nodes: &'a Assets<GltfNode>,
    gltf_meshes: &'a Assets<GltfMesh>,
    meshes: &'a Assets<Mesh>,
}

fn finish_loading(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    handles: Res<ModelHandles>,
    choice: Res<Choice>,
    gltfs: Res<Assets<Gltf>>,
    nodes: Res<Assets<GltfNode>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    meshes: Res<Assets<Mesh>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: MessageWriter<AppExit>,
) {
    for handle in [&handles.world, &handles.vehicle] {
        if let LoadState::Failed(err) = asset_server.load_state(handle) {
            error!("model failed to load: {err}");
            exit.write(AppExit::error());
            return;
        }
    }
    if !asset_server.is_loaded_with_dependencies(&handles.world)
        || !asset_server.is_loaded_with_dependencies(&handles.vehicle)
    {
        return;
    }
    let (Some(world_gltf), Some(vehicle_gltf)) =
        (gltfs.get(&handles.world), gltfs.get(&handles.vehicle))
    else {
        return;
    };

    let assets = ModelAssets {
        nodes: &nodes,
        gltf_meshes: &gltf_meshes,
        meshes: &meshes,
    };
    let (world_asset, world_visuals) = convert_model(AssetSource::World, world_gltf, &assets);
    let (vehicle_asset, vehicle_visuals) =
        convert_model(AssetSource::Vehicle, vehicle_gltf, &assets);

    match Session::new(choice.world, &world_asset, choice.vehicle, &vehicle_asset) {
        Ok(session) => {
            commands.insert_resource(SimSession(session));
            commands.insert_resource(ModelVisuals {
                world: world_visuals,
                vehicle: vehicle_visuals,
            });
            commands.remove_resource::<ModelHandles>();
            next_state.set(AppState::Playing);
        }
        Err(err) => {
            error!("could not start the session: {err}");
            exit.write(AppExit::error());
        }
    }
}

/// Flattens the node tree into mesh nodes with model-space geometry.
fn convert_model(
    source: AssetSource,
    gltf: &Gltf,
    assets: &ModelAssets<'_>,
) -> (SceneAsset, Vec<Vec<Primitive>>) {
    let children: HashSet<AssetId<GltfNode>> = gltf
        .nodes
        .iter()
        .filter_map(|h| assets.nodes.get(h))
        .flat_map(|n| n.children.iter().map(Handle::id))
        .collect();

    let mut out = Vec::new();
    let mut visuals = Vec::new();
    let mut stack: Vec<(Handle<GltfNode>, GlobalTransform)> = gltf
        .nodes
        .iter()
        .filter(|h| !children.contains(&h.id()))
        .rev()
        .map(|h| (h.clone(), GlobalTransform::IDENTITY))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let Some(node) = assets.nodes.get(&handle) else {
            continue;
        };
        let global = parent.mul_transform(node.transform);

        if let Some(mesh) = node.mesh.as_ref().and_then(|h| assets.gltf_meshes.get(h)) {
            let (geometry, primitives) = convert_mesh(mesh, &global, assets.meshes);
            out.push(AssetNode {
                name: node.name.clone(),
                geometry,
            });
            visuals.push(primitives);
        }

        for child in node.children.iter().rev() {
            stack.push((child.clone(), global));
        }
    }

    debug!("{source:?} model: {} mesh nodes", out.len());
    (SceneAsset::new(source, out), visuals)
}

fn convert_mesh(
    gltf_mesh: &GltfMesh,
    global: &GlobalTransform,
    meshes: &Assets<Mesh>,
) -> (MeshGeometry, Vec<Primitive>) {
    let affine = global.affine();
    let mut geometry = MeshGeometry::default();
    let mut primitives = Vec::new();

    for primitive in &gltf_mesh.primitives {
        primitives.push(Primitive {
            mesh: primitive.mesh.clone(),
            material: primitive.material.clone(),
            transform: global.compute_transform(),
        });

        let Some(mesh) = meshes.get(&primitive.mesh) else {
            continue;
        };
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            continue;
        };

        let points = positions
            .iter()
            .map(|p| vec3_to_point(affine.transform_point3(Vec3::from_array(*p))))
            .collect();
        let flat: Vec<u32> = match mesh.indices() {
            Some(Indices::U16(i)) => i.iter().map(|v| u32::from(*v)).collect(),
            Some(Indices::U32(i)) => i.clone(),
            None => (0..positions.len() as u32).collect(),
        };
        let triangles = flat
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        geometry.append(&MeshGeometry::new(points, triangles));
    }

    (geometry, primitives)
}
