use bevy::{
    prelude::*,
    window::{CursorEntered, CursorIcon, PrimaryWindow, SystemCursorIcon, WindowFocused},
};
use sim::CursorHint;

/// Cursor requested by the editor's pointer handling.
#[derive(Resource, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct CurrentCursor(pub CursorHint);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CurrentCursor>();

    // Apply when our desired cursor changes
    app.add_systems(
        Update,
        apply_cursor.run_if(resource_changed::<CurrentCursor>),
    );

    // Re-apply on focus/enter to avoid OS resets
    app.add_systems(Update, (reapply_on_focus, reapply_on_enter));
}

fn desired_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Default => CursorIcon::System(SystemCursorIcon::Default),
        CursorHint::Pointer => CursorIcon::System(SystemCursorIcon::Pointer),
    }
}

fn apply_cursor(
    mut commands: Commands,
    window: Single<(Entity, Option<&CursorIcon>), With<PrimaryWindow>>,
    current: Res<CurrentCursor>,
) {
    let (window, existing) = *window;
    let desired = desired_icon(current.0);
    if existing != Some(&desired) {
        commands.entity(window).insert(desired);
    }
}

fn reapply_on_focus(
    mut commands: Commands,
    mut messages: MessageReader<WindowFocused>,
    window: Single<Entity, With<PrimaryWindow>>,
    current: Res<CurrentCursor>,
) {
    for message in messages.read() {
        if message.focused {
            commands.entity(*window).insert(desired_icon(current.0));
        }
    }
}

fn reapply_on_enter(
    mut commands: Commands,
    mut messages: MessageReader<CursorEntered>,
    window: Single<Entity, With<PrimaryWindow>>,
    current: Res<CurrentCursor>,
) {
    for _ in messages.read() {
        commands.entity(*window).insert(desired_icon(current.0));
    }
}
