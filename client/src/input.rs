use bevy::{prelude::*, window::PrimaryWindow};
use leafwing_input_manager::prelude::*;
use sim::{CursorHint, Key};

use crate::convert::ray_from_bevy;
use crate::cursor::CurrentCursor;
use crate::session::{SimSession, SimSet};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    LeftClick,
}

/// Keyboard keys forwarded to the simulation.
const KEY_BINDINGS: [(KeyCode, Key); 13] = [
    (KeyCode::KeyW, Key::W),
    (KeyCode::KeyA, Key::A),
    (KeyCode::KeyS, Key::S),
    (KeyCode::KeyD, Key::D),
    (KeyCode::ArrowUp, Key::ArrowUp),
    (KeyCode::ArrowDown, Key::ArrowDown),
    (KeyCode::ArrowLeft, Key::ArrowLeft),
    (KeyCode::ArrowRight, Key::ArrowRight),
    (KeyCode::Space, Key::Space),
    (KeyCode::KeyE, Key::E),
    (KeyCode::KeyQ, Key::Q),
    (KeyCode::Delete, Key::Delete),
    (KeyCode::Backspace, Key::Delete),
];

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::LeftClick, MouseButton::Left);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());

    app.add_systems(
        Update,
        (forward_keys, forward_pointer).chain().in_set(SimSet::Input),
    );
}

fn forward_keys(keys: Res<ButtonInput<KeyCode>>, mut session: ResMut<SimSession>) {
    for (code, key) in KEY_BINDINGS {
        if keys.just_pressed(code) {
            session.key_down(key);
        }
        if keys.just_released(code) {
            session.key_up(key);
        }
    }
}

/// Pointer moves and clicks over the scene, routed to the road-kit editor.
fn forward_pointer(
    mut session: ResMut<SimSession>,
    mut cursor: ResMut<CurrentCursor>,
    mut moved: MessageReader<CursorMoved>,
    actions: Res<ActionState<InputAction>>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform), With<Camera3d>>,
    ui: Query<&Interaction>,
) {
    let moved = moved.read().count() > 0;
    let clicked = actions.just_pressed(&InputAction::LeftClick);
    if !session.is_editing() {
        cursor.set_if_neq(CurrentCursor(CursorHint::Default));
        return;
    }
    if !moved && !clicked {
        return;
    }
    if ui.iter().any(|i| *i != Interaction::None) {
        cursor.set_if_neq(CurrentCursor(CursorHint::Pointer));
        return;
    }

    let Some(position) = window.cursor_position() else {
        return;
    };
    let (camera, transform) = *camera;
    let Ok(ray) = camera.viewport_to_world(transform, position) else {
        return;
    };
    let ray = ray_from_bevy(ray);

    if moved {
        let hint = session.pointer_move(&ray);
        cursor.set_if_neq(CurrentCursor(hint));
    }
    if clicked {
        session.pointer_click(&ray);
    }
}
