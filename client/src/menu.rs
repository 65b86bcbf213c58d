//! Vehicle and world selection overlay.

use bevy::prelude::*;
use sim::{VehicleKind, WorldKind};

use crate::state::{AppState, Choice};

const BUTTON_IDLE: Color = Color::srgb(0.15, 0.15, 0.18);
const BUTTON_HOVERED: Color = Color::srgb(0.25, 0.25, 0.3);
const BUTTON_CHOSEN: Color = Color::srgb(0.2, 0.45, 0.3);

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
enum MenuButton {
    Vehicle(VehicleKind),
    World(WorldKind),
    Start,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::Menu), spawn_menu);
    app.add_systems(
        Update,
        (handle_buttons, paint_buttons)
            .chain()
            .run_if(in_state(AppState::Menu)),
    );
}

fn button(label: &str, action: MenuButton) -> impl Bundle {
    (
        Button,
        action,
        Node {
            width: px(220),
            padding: UiRect::all(px(10)),
            margin: UiRect::all(px(4)),
            justify_content: JustifyContent::Center,
            ..default()
        },
        BackgroundColor(BUTTON_IDLE),
        children![(Text::new(label), TextFont::from_font_size(20.0))],
    )
}

fn spawn_menu(mut commands: Commands) {
    commands.spawn((Camera2d, DespawnOnExit(AppState::Menu)));

    let root = commands
        .spawn((
            DespawnOnExit(AppState::Menu),
            Node {
                width: percent(100),
                height: percent(100),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .id();

    commands.spawn((
        ChildOf(root),
        Text::new("Choose a vehicle"),
        TextFont::from_font_size(28.0),
    ));
    for kind in VehicleKind::ALL {
        commands.spawn((ChildOf(root), button(kind.profile().label, MenuButton::Vehicle(kind))));
    }

    commands.spawn((
        ChildOf(root),
        Text::new("Choose a world"),
        TextFont::from_font_size(28.0),
    ));
    for kind in WorldKind::ALL {
        commands.spawn((ChildOf(root), button(kind.label(), MenuButton::World(kind))));
    }

    commands.spawn((ChildOf(root), button("Start", MenuButton::Start)));
}

fn handle_buttons(
    buttons: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut choice: ResMut<Choice>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match *button {
            MenuButton::Vehicle(kind) => choice.vehicle = kind,
            MenuButton::World(kind) => choice.world = kind,
            MenuButton::Start => {
                info!(
                    "loading {} in the {}",
                    choice.vehicle.profile().label,
                    choice.world.label()
                );
                next_state.set(AppState::Loading);
            }
        }
    }
}

fn paint_buttons(
    mut buttons: Query<(&Interaction, &MenuButton, &mut BackgroundColor)>,
    choice: Res<Choice>,
) {
    for (interaction, button, mut background) in &mut buttons {
        let chosen = match *button {
            MenuButton::Vehicle(kind) => kind == choice.vehicle,
            MenuButton::World(kind) => kind == choice.world,
            MenuButton::Start => false,
        };
        background.0 = match (chosen, interaction) {
            (true, _) => BUTTON_CHOSEN,
            (false, Interaction::Hovered | Interaction::Pressed) => BUTTON_HOVERED,
            (false, Interaction::None) => BUTTON_IDLE,
        };
    }
}
