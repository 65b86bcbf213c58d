use bevy::prelude::*;

use crate::session::{SimSession, SimSet};
use crate::state::AppState;

#[derive(Component)]
struct PromptText;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::Playing), spawn_prompt);
    app.add_systems(Update, show_prompts.in_set(SimSet::Present));
}

fn spawn_prompt(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            bottom: px(32),
            width: percent(100),
            justify_content: JustifyContent::Center,
            ..default()
        },
        children![(
            PromptText,
            Text::default(),
            TextFont::from_font_size(22.0),
            TextShadow::default(),
            Visibility::Hidden,
        )],
    ));
}

/// Prompt markup bolds keys with `**`; the overlay shows them plain.
fn plain(prompt: &str) -> String {
    prompt.replace("**", "")
}

fn show_prompts(
    session: Res<SimSession>,
    prompt: Single<(&mut Text, &mut Visibility), With<PromptText>>,
) {
    let (mut text, mut visibility) = prompt.into_inner();
    let lines: Vec<String> = session.world().prompts().map(|z| plain(z.prompt)).collect();

    let shown = if lines.is_empty() {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
    visibility.set_if_neq(shown);

    let joined = lines.join("\n");
    if text.0 != joined {
        text.0 = joined;
    }
}
