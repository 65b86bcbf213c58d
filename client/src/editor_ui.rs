//! Tile palette shown while the road-kit editor is open.

use bevy::prelude::*;
use sim::TileKind;

use crate::session::{SimSession, SimSet};

const BUTTON_IDLE: Color = Color::srgba(0.1, 0.1, 0.12, 0.85);
const BUTTON_HOVERED: Color = Color::srgba(0.3, 0.3, 0.35, 0.9);

#[derive(Component)]
struct Palette;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
enum PaletteButton {
    Tile(TileKind),
    Done,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (toggle_palette, handle_buttons, paint_buttons)
            .chain()
            .in_set(SimSet::Present),
    );
}

fn palette_button(label: &str, action: PaletteButton) -> impl Bundle {
    (
        Button,
        action,
        Node {
            padding: UiRect::axes(px(12), px(8)),
            margin: UiRect::all(px(3)),
            ..default()
        },
        BackgroundColor(BUTTON_IDLE),
        children![(Text::new(label), TextFont::from_font_size(16.0))],
    )
}

fn toggle_palette(
    mut commands: Commands,
    session: Res<SimSession>,
    palette: Query<Entity, With<Palette>>,
) {
    let open = !palette.is_empty();
    if session.is_editing() == open {
        return;
    }
    if open {
        for entity in &palette {
            commands.entity(entity).despawn();
        }
        return;
    }

    let root = commands
        .spawn((
            Palette,
            Node {
                position_type: PositionType::Absolute,
                left: px(12),
                top: px(12),
                flex_direction: FlexDirection::Column,
                ..default()
            },
        ))
        .id();
    for kind in TileKind::ALL {
        commands.spawn((ChildOf(root), palette_button(kind.label(), PaletteButton::Tile(kind))));
    }
    commands.spawn((ChildOf(root), palette_button("Done", PaletteButton::Done)));
}

fn handle_buttons(
    buttons: Query<(&Interaction, &PaletteButton), Changed<Interaction>>,
    mut session: ResMut<SimSession>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match *button {
            PaletteButton::Tile(kind) => {
                session.create_tile(kind);
            }
            PaletteButton::Done => session.close_editor(),
        }
    }
}

fn paint_buttons(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (With<PaletteButton>, Changed<Interaction>)>,
) {
    for (interaction, mut background) in &mut buttons {
        background.0 = match interaction {
            Interaction::None => BUTTON_IDLE,
            Interaction::Hovered | Interaction::Pressed => BUTTON_HOVERED,
        };
    }
}
