//! Demo level: ground, a few platforms and a low tunnel to crouch through.

use app::LOG_MAIN;
use avian2d::prelude::*;
use bevy::color::Mix;
use bevy::prelude::*;
use character_controller::prelude::*;
use settings::SettingsArc;
use tracing::info;

/// World units are meters; this many pixels per meter on screen.
const PIXELS_PER_METER: f32 = 48.0;

const BODY_RADIUS: f32 = 0.4;
const HEAD_SIZE: Vec2 = Vec2::new(0.7, 0.6);
const HEAD_OFFSET: f32 = 0.7;

const PLAYER_COLOR: Color = Color::srgb(0.95, 0.55, 0.2);
const LANDED_COLOR: Color = Color::srgb(1.0, 0.95, 0.6);
const HEAD_COLOR: Color = Color::srgb(0.85, 0.45, 0.15);
const GROUND_COLOR: Color = Color::srgb(0.3, 0.35, 0.4);

#[derive(PhysicsLayer, Default, Clone, Copy, Debug)]
pub enum GameLayer {
    #[default]
    Default,
    Ground,
    Player,
}

#[derive(Component)]
pub struct Player;

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_camera, spawn_level, spawn_player))
            .add_systems(
                Update,
                (flash_on_landing, hide_head_when_crouching, fade_player_tint, follow_player),
            );
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / PIXELS_PER_METER,
            ..OrthographicProjection::default_2d()
        }),
    ));
}

fn solid(commands: &mut Commands, name: &'static str, center: Vec2, size: Vec2) {
    commands.spawn((
        Name::new(name),
        Sprite::from_color(GROUND_COLOR, size),
        Transform::from_translation(center.extend(0.0)),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
    ));
}

fn spawn_level(mut commands: Commands) {
    solid(&mut commands, "Ground", Vec2::new(0.0, -3.0), Vec2::new(40.0, 1.0));
    solid(&mut commands, "Ledge", Vec2::new(-6.0, -0.5), Vec2::new(4.0, 0.4));
    solid(&mut commands, "High ledge", Vec2::new(-11.0, 1.5), Vec2::new(3.0, 0.4));
    // Bottom edge sits below head height, so the tunnel only fits a crouching player.
    solid(&mut commands, "Tunnel roof", Vec2::new(8.0, -0.5), Vec2::new(5.0, 2.0));
}

fn spawn_player(
    mut commands: Commands,
    controller_settings: Res<SettingsArc<ControllerSettings>>,
    input_settings: Res<SettingsArc<InputSettings>>,
) {
    let head = commands
        .spawn((
            Name::new("Player head"),
            Sprite::from_color(HEAD_COLOR, HEAD_SIZE),
            Transform::from_xyz(0.0, HEAD_OFFSET, 0.0),
            Collider::rectangle(HEAD_SIZE.x, HEAD_SIZE.y),
            CollisionLayers::new(GameLayer::Player, GameLayer::Ground),
        ))
        .id();

    let controller = CharacterController::from_settings(&controller_settings)
        .with_ground_check(Vec2::new(0.0, -BODY_RADIUS - 0.05))
        .with_ceiling_check(Vec2::new(0.0, HEAD_OFFSET + HEAD_SIZE.y))
        .with_ground_layers(GameLayer::Ground)
        .with_crouch_collider(head);

    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            controller,
            PlayerInput::with_run_speed(input_settings.run_speed()),
            Sprite::from_color(PLAYER_COLOR, Vec2::splat(BODY_RADIUS * 2.0)),
            Transform::from_xyz(0.0, 0.0, 1.0),
            RigidBody::Dynamic,
            Collider::circle(BODY_RADIUS),
            CollisionLayers::new(GameLayer::Player, GameLayer::Ground),
            Mass(1.0),
            LockedAxes::ROTATION_LOCKED,
            Friction::ZERO,
        ))
        .add_child(head)
        .id();

    info!(target: LOG_MAIN, "Spawned player {player}");
}

fn flash_on_landing(mut landed: MessageReader<Landed>, mut sprites: Query<&mut Sprite, With<Player>>) {
    for Landed { entity } in landed.read() {
        if let Ok(mut sprite) = sprites.get_mut(*entity) {
            sprite.color = LANDED_COLOR;
        }
    }
}

fn fade_player_tint(time: Res<Time>, mut sprites: Query<&mut Sprite, With<Player>>) {
    let t = (time.delta_secs() * 8.0).min(1.0);
    let base = PLAYER_COLOR.to_linear();
    for mut sprite in &mut sprites {
        sprite.color = sprite.color.to_linear().mix(&base, t).into();
    }
}

fn hide_head_when_crouching(
    mut changes: MessageReader<CrouchChanged>,
    controllers: Query<&CharacterController>,
    mut visibility: Query<&mut Visibility>,
) {
    for change in changes.read() {
        info!(target: LOG_MAIN, "Crouching: {}", change.crouching);
        let Some(head) = controllers
            .get(change.entity)
            .ok()
            .and_then(|controller| controller.crouch_collider)
        else {
            continue;
        };
        if let Ok(mut visibility) = visibility.get_mut(head) {
            *visibility = if change.crouching {
                Visibility::Hidden
            } else {
                Visibility::Inherited
            };
        }
    }
}

fn follow_player(
    player: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut camera: Query<&mut Transform, With<Camera2d>>,
) {
    let (Ok(player), Ok(mut camera)) = (player.single(), camera.single_mut()) else {
        return;
    };
    let target = player.translation.truncate() + Vec2::new(0.0, 2.0);
    let offset = (target - camera.translation.truncate()) * 0.1;
    camera.translation += offset.extend(0.0);
}
