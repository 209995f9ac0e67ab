//! Driver input to per-wheel engine, brake and steering commands.
//!
//! Pure functions that can be tested in isolation without Bevy dependencies.

use glam::Vec3;

/// Chassis local forward axis. Front wheels are mounted toward +Z.
pub const CHASSIS_FORWARD: Vec3 = Vec3::Z;

/// Configuration for the car and its controller.
#[derive(Clone, Debug)]
pub struct VehicleTuning {
    /// Chassis mass in kg.
    pub mass: f32,
    /// Chassis collider half extents.
    pub half_extents: Vec3,
    /// Where the car is placed at startup and on restart.
    pub spawn_position: Vec3,
    /// Engine force applied by each driven wheel at full throttle.
    pub full_engine_force: f32,
    /// Front wheel steering angle at full lock (radians, left positive).
    pub steering_limit: f32,
    /// Brake used when the throttle opposes the direction of travel.
    pub default_brake: f32,
    /// Brake used when coasting.
    pub idle_brake: f32,
    /// Signed speed (km/h) beyond which the throttle brakes instead.
    pub reversal_speed_kmh: f32,
    /// Chassis height below which a jump is allowed.
    pub jump_height_limit: f32,
    /// Added to linear velocity on jump.
    pub jump_linear_velocity: Vec3,
    /// Replaces angular velocity on jump.
    pub jump_angular_velocity: Vec3,
    /// Suspension spring stiffness per unit of chassis mass.
    pub suspension_stiffness: f32,
    /// Suspension damping while extending.
    pub damping_relaxation: f32,
    /// Suspension damping while compressing.
    pub damping_compression: f32,
    /// Upper bound on the suspension force of a single wheel.
    pub max_suspension_force: f32,
    /// Tire grip as a multiple of the wheel's normal load.
    pub friction_slip: f32,
    /// Height fraction at which side impulses are applied (0 = no body roll).
    pub roll_influence: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            mass: 100.0,
            half_extents: Vec3::new(1.0, 0.25, 2.0),
            spawn_position: Vec3::new(168.0, 1.0, 40.0),
            full_engine_force: 600.0,
            steering_limit: 0.35,
            default_brake: 4.0,
            idle_brake: 1.25,
            reversal_speed_kmh: 1.0,
            jump_height_limit: 3.0,
            jump_linear_velocity: Vec3::new(0.0, 6.0, 0.0),
            jump_angular_velocity: Vec3::new(0.3, 0.5, -2.5),
            suspension_stiffness: 50.0,
            damping_relaxation: 10.0,
            damping_compression: 0.0,
            max_suspension_force: 6000.0,
            friction_slip: 10.0,
            roll_influence: 0.0,
        }
    }
}

/// Driving input sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub forward: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
    /// Jump was pressed this tick.
    pub jump: bool,
}

/// Engine force and steering angle derived from input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringState {
    /// One of `-full`, `0` or `+full`.
    pub engine_force: f32,
    /// One of `-limit`, `0` or `+limit`.
    pub steering: f32,
}

impl SteeringState {
    /// Map an input snapshot onto engine force and steering.
    ///
    /// Forward wins over reverse and left over right when both are held.
    pub fn from_input(input: &DriveInput, tuning: &VehicleTuning) -> Self {
        let engine_force = if input.forward {
            tuning.full_engine_force
        } else if input.reverse {
            -tuning.full_engine_force
        } else {
            0.0
        };
        let steering = if input.left {
            tuning.steering_limit
        } else if input.right {
            -tuning.steering_limit
        } else {
            0.0
        };
        Self {
            engine_force,
            steering,
        }
    }
}

/// What a single wheel should do this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelCommand {
    pub engine_force: f32,
    pub brake: f32,
    pub steering: f32,
}

/// Command for one wheel given the controller state and signed speed.
///
/// Throttle in the direction of travel (or from near standstill) drives the
/// `driven` wheels and releases the brakes on the others. Throttle against the
/// direction of travel brakes with the default brake. No throttle applies the
/// idle brake.
pub fn wheel_command(
    driven: bool,
    steerable: bool,
    state: &SteeringState,
    speed_kmh: f32,
    tuning: &VehicleTuning,
) -> WheelCommand {
    let force = state.engine_force;
    let (engine_force, brake) = if force.abs() < f32::EPSILON {
        (0.0, tuning.idle_brake)
    } else {
        let can_move = (speed_kmh > -tuning.reversal_speed_kmh && force > 0.0)
            || (speed_kmh < tuning.reversal_speed_kmh && force < 0.0);
        match (can_move, driven) {
            (true, true) => (force, 0.0),
            (true, false) => (0.0, 0.0),
            (false, _) => (0.0, tuning.default_brake),
        }
    };

    WheelCommand {
        engine_force,
        brake,
        steering: if steerable { state.steering } else { 0.0 },
    }
}

/// Apply a jump if the chassis is low enough.
///
/// Adds the jump impulse to `linear_velocity` and replaces `angular_velocity`.
/// Returns whether the jump happened.
pub fn try_jump(
    chassis_height: f32,
    linear_velocity: &mut Vec3,
    angular_velocity: &mut Vec3,
    tuning: &VehicleTuning,
) -> bool {
    if chassis_height >= tuning.jump_height_limit {
        return false;
    }
    *linear_velocity += tuning.jump_linear_velocity;
    *angular_velocity = tuning.jump_angular_velocity;
    true
}

/// Whether wheel `index` sits on the right side of the car.
///
/// Right wheels share the left wheels' mesh and are yawed half a turn.
pub fn is_right_wheel(index: usize) -> bool {
    index % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(input: DriveInput) -> SteeringState {
        SteeringState::from_input(&input, &VehicleTuning::default())
    }

    #[test]
    fn test_from_input() {
        let s = state(DriveInput {
            forward: true,
            left: true,
            ..Default::default()
        });
        assert_eq!(s.engine_force, 600.0);
        assert_eq!(s.steering, 0.35);

        let s = state(DriveInput {
            reverse: true,
            right: true,
            ..Default::default()
        });
        assert_eq!(s.engine_force, -600.0);
        assert_eq!(s.steering, -0.35);

        assert_eq!(state(DriveInput::default()), SteeringState::default());
    }

    #[test]
    fn test_forward_wins_over_reverse() {
        let s = state(DriveInput {
            forward: true,
            reverse: true,
            left: true,
            right: true,
            jump: false,
        });
        assert_eq!(s.engine_force, 600.0);
        assert_eq!(s.steering, 0.35);
    }

    #[test]
    fn test_throttle_drives_only_driven_wheels() {
        let tuning = VehicleTuning::default();
        let s = SteeringState {
            engine_force: 600.0,
            steering: 0.35,
        };

        let front = wheel_command(true, true, &s, 20.0, &tuning);
        assert_eq!(front.engine_force, 600.0);
        assert_eq!(front.brake, 0.0);
        assert_eq!(front.steering, 0.35);

        let rear = wheel_command(false, false, &s, 20.0, &tuning);
        assert_eq!(rear, WheelCommand::default());
    }

    #[test]
    fn test_throttle_against_motion_brakes() {
        let tuning = VehicleTuning::default();
        let reverse = SteeringState {
            engine_force: -600.0,
            steering: 0.0,
        };
        let cmd = wheel_command(true, true, &reverse, 5.0, &tuning);
        assert_eq!(cmd.engine_force, 0.0);
        assert_eq!(cmd.brake, 4.0);

        // Below 1 km/h reversing is allowed.
        let cmd = wheel_command(true, true, &reverse, 0.5, &tuning);
        assert_eq!(cmd.engine_force, -600.0);

        let forward = SteeringState {
            engine_force: 600.0,
            steering: 0.0,
        };
        let cmd = wheel_command(false, false, &forward, -3.0, &tuning);
        assert_eq!(cmd.brake, 4.0);
    }

    #[test]
    fn test_coasting_uses_idle_brake() {
        let tuning = VehicleTuning::default();
        for speed in [-30.0, 0.0, 30.0] {
            let cmd = wheel_command(true, true, &SteeringState::default(), speed, &tuning);
            assert_eq!(cmd.engine_force, 0.0);
            assert_eq!(cmd.brake, 1.25);
        }
    }

    #[test]
    fn test_jump_only_when_low() {
        let tuning = VehicleTuning::default();
        let mut linear = Vec3::ZERO;
        let mut angular = Vec3::ZERO;

        assert!(try_jump(1.0, &mut linear, &mut angular, &tuning));
        assert_eq!(linear, Vec3::new(0.0, 6.0, 0.0));
        assert_eq!(angular, Vec3::new(0.3, 0.5, -2.5));

        let mut linear = Vec3::ZERO;
        let mut angular = Vec3::ZERO;
        assert!(!try_jump(3.5, &mut linear, &mut angular, &tuning));
        assert_eq!(linear, Vec3::ZERO);
        assert_eq!(angular, Vec3::ZERO);
    }

    #[test]
    fn test_jump_adds_to_existing_velocity() {
        let tuning = VehicleTuning::default();
        let mut linear = Vec3::new(3.0, -1.0, 0.0);
        let mut angular = Vec3::new(9.0, 9.0, 9.0);
        try_jump(0.8, &mut linear, &mut angular, &tuning);
        assert_eq!(linear, Vec3::new(3.0, 5.0, 0.0));
        assert_eq!(angular, tuning.jump_angular_velocity);
    }

    #[test]
    fn test_right_wheels() {
        let right: Vec<usize> = (0..4).filter(|i| is_right_wheel(*i)).collect();
        assert_eq!(right, [1, 3]);
    }
}
