use std::time::Duration;

/// Fixed simulation interval in seconds (60 Hz).
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Gravity along -Y in meters per second squared.
pub const GRAVITY_Y: f32 = -9.82;

/// Friction used by every collider that doesn't pick a surface material.
pub const DEFAULT_FRICTION: f32 = 0.2;

/// Wheel/ground contact friction.
pub const WHEEL_GROUND_FRICTION: f32 = 0.3;

/// Wheel/ground contact restitution.
pub const WHEEL_GROUND_RESTITUTION: f32 = 0.0;

/// Steering angle (radians) applied to the front wheels while a turn key is held.
pub const STEER_ANGLE: f32 = 0.25;

/// Sideways grip of each wheel.
pub const WHEEL_FRICTION_SLIP: f32 = 1.5;

/// Mass of the chassis and of each wheel body.
pub const VEHICLE_BODY_MASS: f32 = 1.0;

/// Angular damping for chassis and wheels.
///
/// Rapier damping is a rate (`v *= 1 / (1 + dt * d)`); 3.9 keeps about 2% of the
/// angular velocity after one second.
pub const VEHICLE_ANGULAR_DAMPING: f32 = 3.9;

/// Grace period before the engine loop stops once drive input goes neutral.
pub const ENGINE_STOP_GRACE: Duration = Duration::from_millis(200);

/// Engine loop playback rate range, mapped from chassis speed `0..=max_force`.
pub const ENGINE_MIN_RATE: f32 = 0.8;
pub const ENGINE_MAX_RATE: f32 = 1.2;

/// Chassis speed a contact needs before it is audible.
pub const COLLISION_MIN_SPEED: f32 = 1.5;

/// Minimum spacing between two collision sounds.
pub const COLLISION_SOUND_COOLDOWN: Duration = Duration::from_millis(100);

/// Proximity gain falloff distance and floor.
pub const PROXIMITY_MAX_DISTANCE: f32 = 3.0;
pub const PROXIMITY_MIN_VOLUME: f32 = -0.9;

/// Proximity baselines per emitter.
pub const VEHICLE_MAX_VOLUME: f32 = -0.3;
pub const RADIO_MAX_VOLUME: f32 = 0.8;
pub const TV_MAX_VOLUME: f32 = 0.8;

/// Edge length of one road-kit tile (meters).
pub const TILE_SIZE: f32 = 0.5;

/// Road-kit grid dimensions.
pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 5;

/// Cells sit slightly below the start-tile marker to avoid z-fighting with the floor.
pub const GRID_SURFACE_OFFSET: f32 = -0.032;

/// Yaw step for rotating the selected tile.
pub const TILE_ROTATION_STEP: f32 = std::f32::consts::FRAC_PI_2;

/// Pitch (degrees) that turns the slant template into a ramp.
pub const SLANT_PITCH_DEG: f32 = -25.0;

/// Extra height for slant tiles so the ramp sits on the floor.
pub const SLANT_Y_OFFSET: f32 = 0.12;

/// Half thickness of the bridge deck collider.
pub const BRIDGE_HALF_THICKNESS: f32 = 0.005;

/// Bridge deck collider sits this far below the bridge mesh top.
pub const BRIDGE_DECK_DROP: f32 = 0.02;

/// Camera pose used while the road-kit editor is open.
pub const EDITOR_CAMERA_POSITION: [f32; 3] = [1.2, 2.9, -0.1];
pub const EDITOR_CAMERA_PITCH: f32 = -1.5;
