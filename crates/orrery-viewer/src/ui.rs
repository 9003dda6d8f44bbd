//! UI: HUD, interaction prompt, content modal, loading and welcome screens.

use bevy::prelude::*;
use bevy::ui::FocusPolicy;
use orrery_logic::input::Intent;
use orrery_logic::interaction::CloseReason;
use orrery_logic::session::HudSnapshot;
use orrery_logic::startup::StartupError;

use crate::state::{
    CursorLock, EnrichmentText, FrameState, HudText, IntentButton, InteractButton, LoadingBar,
    LoadingRoot, LoadingText, ModalBackdrop, ModalBody, ModalCloseButton, ModalRoot, ModalTitle, ModalView,
    PromptText, Session, TouchRoles, WelcomeButton, WelcomeRoot,
};

const PANEL_BG: Color = Color::srgba(0.0, 0.02, 0.08, 0.75);
const ACCENT: Color = Color::srgb(0.4, 0.8, 1.0);
const BUTTON_BG: Color = Color::srgb(0.1, 0.25, 0.4);

/// Hold buttons stacked above the interact button, top to bottom.
const HOLD_BUTTONS: [Intent; 3] = [Intent::Ascend, Intent::Boost, Intent::Descend];

fn intent_label(intent: Intent) -> &'static str {
    match intent {
        Intent::Ascend => "Up",
        Intent::Descend => "Down",
        Intent::Boost => "Boost",
        Intent::Forward => "Forward",
        Intent::Backward => "Back",
        Intent::StrafeLeft => "Left",
        Intent::StrafeRight => "Right",
    }
}

pub fn setup_ui(mut commands: Commands) {
    // HUD panel (top-left)
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                top: Val::Px(12.0),
                padding: UiRect::all(Val::Px(10.0)),
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(ACCENT),
                HudText,
            ));
        });

    // Enrichment status (bottom-right)
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(Color::srgb(0.6, 0.6, 0.7)),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(12.0),
            bottom: Val::Px(12.0),
            ..default()
        },
        EnrichmentText,
    ));

    // Interaction prompt (bottom-centre)
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            bottom: Val::Px(60.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                PromptText,
            ));
        });

    // Touch interact button (bottom-right, above the status line)
    commands
        .spawn((
            Button,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(24.0),
                bottom: Val::Px(48.0),
                padding: UiRect::axes(Val::Px(18.0), Val::Px(12.0)),
                display: Display::None,
                ..default()
            },
            BackgroundColor(BUTTON_BG),
            InteractButton,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Visit"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });

    spawn_hold_buttons(&mut commands);
    spawn_modal(&mut commands);
    spawn_welcome(&mut commands);
    spawn_loading(&mut commands);
}

fn spawn_hold_buttons(commands: &mut Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            right: Val::Px(24.0),
            bottom: Val::Px(110.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(10.0),
            ..default()
        })
        .with_children(|column| {
            for intent in HOLD_BUTTONS {
                column
                    .spawn((
                        Button,
                        Node {
                            width: Val::Px(72.0),
                            padding: UiRect::axes(Val::Px(8.0), Val::Px(12.0)),
                            justify_content: JustifyContent::Center,
                            display: Display::None,
                            ..default()
                        },
                        BackgroundColor(BUTTON_BG),
                        IntentButton(intent),
                    ))
                    .with_children(|button| {
                        button.spawn((
                            Text::new(intent_label(intent)),
                            TextFont {
                                font_size: 16.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                    });
            }
        });
}

fn spawn_modal(commands: &mut Commands) {
    commands
        .spawn((
            Button,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                display: Display::None,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            GlobalZIndex(10),
            ModalRoot,
            ModalBackdrop,
        ))
        .with_children(|backdrop| {
            backdrop
                .spawn((
                    Node {
                        width: Val::Percent(60.0),
                        max_height: Val::Percent(80.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(24.0)),
                        row_gap: Val::Px(12.0),
                        border: UiRect::all(Val::Px(1.0)),
                        overflow: Overflow::clip_y(),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.04, 0.06, 0.12)),
                    BorderColor(ACCENT),
                    Interaction::default(),
                    FocusPolicy::Block,
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new(""),
                        TextFont {
                            font_size: 28.0,
                            ..default()
                        },
                        TextColor(ACCENT),
                        ModalTitle,
                    ));
                    panel.spawn((
                        Text::new(""),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.85, 0.85, 0.9)),
                        ModalBody,
                    ));
                    panel
                        .spawn((
                            Button,
                            Node {
                                align_self: AlignSelf::FlexEnd,
                                padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                                ..default()
                            },
                            BackgroundColor(BUTTON_BG),
                            ModalCloseButton,
                        ))
                        .with_children(|button| {
                            button.spawn((
                                Text::new("Close"),
                                TextFont {
                                    font_size: 16.0,
                                    ..default()
                                },
                                TextColor(Color::WHITE),
                            ));
                        });
                });
        });
}

fn spawn_welcome(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                display: Display::None,
                ..default()
            },
            GlobalZIndex(20),
            WelcomeRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(28.0)),
                    row_gap: Val::Px(14.0),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
            ))
            .with_children(|panel| {
                panel.spawn((
                    Text::new("Welcome aboard"),
                    TextFont {
                        font_size: 30.0,
                        ..default()
                    },
                    TextColor(ACCENT),
                ));
                panel.spawn((
                    Text::new(
                        "Arrow keys to fly, Space / C to rise and sink\n\
                         Hold the right mouse button to boost\n\
                         Fly close to a planet and click to explore it\n\
                         Keys 1-6 travel straight to a planet",
                    ),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    TextLayout::new_with_justify(JustifyText::Center),
                ));
                panel
                    .spawn((
                        Button,
                        Node {
                            padding: UiRect::axes(Val::Px(20.0), Val::Px(10.0)),
                            ..default()
                        },
                        BackgroundColor(BUTTON_BG),
                        WelcomeButton,
                    ))
                    .with_children(|button| {
                        button.spawn((
                            Text::new("Start exploring"),
                            TextFont {
                                font_size: 18.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                    });
            });
        });
}

fn spawn_loading(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.0, 0.0, 0.04)),
            GlobalZIndex(30),
            LoadingRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("Orrery"),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(ACCENT),
            ));
            root.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                TextLayout::new_with_justify(JustifyText::Center),
                LoadingText,
            ));
            root.spawn((
                Node {
                    width: Val::Px(320.0),
                    height: Val::Px(6.0),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.15, 0.15, 0.2)),
            ))
            .with_children(|track| {
                track.spawn((
                    Node {
                        width: Val::Percent(0.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(ACCENT),
                    LoadingBar,
                ));
            });
        });
}

fn hud_text(hud: &HudSnapshot) -> String {
    format!(
        "Speed: {}\nPosition: {}\nEngine: {}\nTarget: {}\nDistance: {}",
        hud.speed_label(),
        hud.position_label(),
        hud.status.label(),
        hud.target_label(),
        hud.distance_label()
    )
}

fn fatal_text(error: &StartupError) -> String {
    let mut text = format!("Error: {error}\n");
    for hint in error.remediation() {
        text.push_str("\n- ");
        text.push_str(hint);
    }
    text
}

pub fn update_hud(
    frame: Res<FrameState>,
    session: Res<Session>,
    mut hud_q: Query<&mut Text, (With<HudText>, Without<PromptText>, Without<EnrichmentText>)>,
    mut prompt_q: Query<&mut Text, (With<PromptText>, Without<HudText>, Without<EnrichmentText>)>,
    mut status_q: Query<&mut Text, (With<EnrichmentText>, Without<HudText>, Without<PromptText>)>,
) {
    let Some(hud) = &frame.hud else {
        return;
    };
    if let Ok(mut text) = hud_q.get_single_mut() {
        text.0 = hud_text(hud);
    }
    if let Ok(mut text) = prompt_q.get_single_mut() {
        text.0 = match (&hud.prompt, hud.modal_open) {
            (Some(prompt), false) => prompt.clone(),
            _ => String::new(),
        };
    }
    if let Ok(mut text) = status_q.get_single_mut() {
        text.0 = session.0.enrichment().status_line();
    }
}

pub fn update_modal(
    mut modal: ResMut<ModalView>,
    mut root_q: Query<&mut Node, With<ModalRoot>>,
    mut title_q: Query<&mut Text, (With<ModalTitle>, Without<ModalBody>)>,
    mut body_q: Query<&mut Text, (With<ModalBody>, Without<ModalTitle>)>,
) {
    if !modal.dirty {
        return;
    }
    modal.dirty = false;
    if let Ok(mut node) = root_q.get_single_mut() {
        node.display = if modal.open {
            Display::Flex
        } else {
            Display::None
        };
    }
    if modal.open {
        if let Ok(mut text) = title_q.get_single_mut() {
            text.0 = modal.title.clone();
        }
        if let Ok(mut text) = body_q.get_single_mut() {
            text.0 = modal.body.clone();
        }
    }
}

pub fn modal_buttons(
    mut session: ResMut<Session>,
    close_q: Query<&Interaction, (Changed<Interaction>, With<ModalCloseButton>)>,
    backdrop_q: Query<&Interaction, (Changed<Interaction>, With<ModalBackdrop>)>,
) {
    if close_q.iter().any(|i| *i == Interaction::Pressed) {
        session.0.on_modal_close(CloseReason::Button);
    } else if backdrop_q.iter().any(|i| *i == Interaction::Pressed) {
        session.0.on_modal_close(CloseReason::Backdrop);
    }
}

pub fn interact_button(
    mut session: ResMut<Session>,
    mut modal: ResMut<ModalView>,
    mut lock: ResMut<CursorLock>,
    frame: Res<FrameState>,
    roles: Res<TouchRoles>,
    mut button_q: Query<(&Interaction, &mut Node), With<InteractButton>>,
) {
    let Ok((interaction, mut node)) = button_q.get_single_mut() else {
        return;
    };
    let visible = roles.touch_seen
        && frame
            .hud
            .as_ref()
            .is_some_and(|hud| hud.target.is_some() && !hud.modal_open);
    node.display = if visible { Display::Flex } else { Display::None };
    if visible && *interaction == Interaction::Pressed {
        session.0.on_touch_interact(&mut *modal, &mut *lock);
    }
}

/// Touch-only hold buttons; an intent stays on while its button is held.
pub fn intent_buttons(
    mut session: ResMut<Session>,
    frame: Res<FrameState>,
    roles: Res<TouchRoles>,
    mut button_q: Query<(Ref<Interaction>, &IntentButton, &mut Node)>,
) {
    let visible = roles.touch_seen
        && frame
            .hud
            .as_ref()
            .is_some_and(|hud| !hud.modal_open);
    for (interaction, button, mut node) in &mut button_q {
        node.display = if visible { Display::Flex } else { Display::None };
        if interaction.is_changed() {
            let held = visible && *interaction == Interaction::Pressed;
            session.0.on_intent(button.0, held);
        }
    }
}

pub fn update_overlays(
    mut session: ResMut<Session>,
    frame: Res<FrameState>,
    welcome_button_q: Query<&Interaction, (Changed<Interaction>, With<WelcomeButton>)>,
    mut loading_root_q: Query<&mut Node, (With<LoadingRoot>, Without<WelcomeRoot>, Without<LoadingBar>)>,
    mut welcome_root_q: Query<&mut Node, (With<WelcomeRoot>, Without<LoadingRoot>, Without<LoadingBar>)>,
    mut bar_q: Query<&mut Node, (With<LoadingBar>, Without<LoadingRoot>, Without<WelcomeRoot>)>,
    mut loading_text_q: Query<&mut Text, With<LoadingText>>,
) {
    if welcome_button_q.iter().any(|i| *i == Interaction::Pressed) {
        session.0.acknowledge_welcome();
    }

    let startup = session.0.startup();
    let loading_visible = !startup.is_loaded();
    if let Ok(mut node) = loading_root_q.get_single_mut() {
        node.display = if loading_visible {
            Display::Flex
        } else {
            Display::None
        };
    }
    if loading_visible {
        if let Ok(mut text) = loading_text_q.get_single_mut() {
            text.0 = match &frame.fatal {
                Some(error) => fatal_text(error),
                None => format!("{} ({}%)", startup.status_text(), startup.progress()),
            };
        }
        if let Ok(mut bar) = bar_q.get_single_mut() {
            bar.width = Val::Percent(f32::from(startup.progress()));
        }
    }

    if let Ok(mut node) = welcome_root_q.get_single_mut() {
        node.display = if startup.welcome_visible() {
            Display::Flex
        } else {
            Display::None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_logic::navigation::EngineStatus;
    use orrery_logic::vector::Vec3;

    #[test]
    fn hud_text_without_target() {
        let hud = HudSnapshot {
            speed: 1.25,
            position: Vec3::new(0.0, 50.0, 100.0),
            status: EngineStatus::Normal,
            target: None,
            prompt: None,
            modal_open: false,
        };
        let text = hud_text(&hud);
        assert!(text.contains("Engine: NORMAL"));
        assert!(text.contains("Target: None"));
        assert!(text.contains("Distance: -- km"));
        assert!(text.contains("X: 0, Y: 50, Z: 100"));
    }

    #[test]
    fn hold_buttons_cover_what_the_joystick_cannot() {
        let labels: Vec<_> = HOLD_BUTTONS.iter().map(|i| intent_label(*i)).collect();
        assert_eq!(labels, ["Up", "Boost", "Down"]);
    }

    #[test]
    fn fatal_text_lists_remediation() {
        let text = fatal_text(&StartupError::UnsupportedEnvironment);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("- Reload the page"));
    }
}
