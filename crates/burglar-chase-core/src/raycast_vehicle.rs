//! Raycast wheel model.
//!
//! Each wheel is a ray cast straight down from its mount on the chassis. The
//! hit distance drives a spring-damper suspension; the contact point receives
//! engine, brake and side-grip impulses. Everything is returned as a change
//! in chassis velocity so the physics engine can integrate it.

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::steering::{CHASSIS_FORWARD, VehicleTuning, WheelCommand, is_right_wheel};

/// Number of wheels on the car.
pub const WHEEL_COUNT: usize = 4;

/// Metres per second to kilometres per hour.
const MS_TO_KMH: f32 = 3.6;

/// Spin decay per tick for wheels in the air.
const AIRBORNE_SPIN_DECAY: f32 = 0.99;

/// Where a wheel sits on the chassis and how it behaves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelMount {
    /// Suspension attachment point in chassis space.
    pub offset: Vec3,
    pub radius: f32,
    /// Suspension length with no load.
    pub rest_length: f32,
    /// Follows the steering angle.
    pub steerable: bool,
    /// Receives engine force.
    pub driven: bool,
}

impl WheelMount {
    /// Length of the suspension ray.
    pub fn ray_length(&self) -> f32 {
        self.rest_length + self.radius
    }
}

/// The police car's wheels: front pair steers and drives, rear pair rolls.
///
/// Order is front left, front right, rear left, rear right.
pub fn default_wheel_mounts() -> [WheelMount; WHEEL_COUNT] {
    const RADIUS: f32 = 0.5;
    const REST_LENGTH: f32 = 0.3;
    const Y: f32 = -0.25;

    let front = |x: f32| WheelMount {
        offset: Vec3::new(x, Y, 1.7),
        radius: RADIUS,
        rest_length: REST_LENGTH,
        steerable: true,
        driven: true,
    };
    let rear = |x: f32| WheelMount {
        offset: Vec3::new(x, Y, -1.5),
        radius: RADIUS,
        rest_length: REST_LENGTH,
        steerable: false,
        driven: false,
    };
    [front(-1.0), front(1.0), rear(-1.0), rear(1.0)]
}

/// Ray hit reported by the physics engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelContact {
    /// Distance from the mount along the ray.
    pub distance: f32,
    /// Surface normal at the hit.
    pub normal: Vec3,
}

/// Per-wheel simulation state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelState {
    pub suspension_length: f32,
    pub in_contact: bool,
    /// Steering angle applied last tick.
    pub steering: f32,
    /// Accumulated spin about the axle (visual only).
    pub rotation: f32,
    pub delta_rotation: f32,
    /// Suspension force last tick.
    pub suspension_force: f32,
}

/// Chassis pose and velocities as seen by the wheels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChassisState {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl ChassisState {
    /// Chassis forward direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * CHASSIS_FORWARD
    }

    /// Chassis up direction in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Velocity of a world-space point rigidly attached to the chassis.
    pub fn velocity_at(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.position)
    }

    /// Signed speed along the chassis forward axis in km/h.
    pub fn speed_kmh(&self) -> f32 {
        self.linear_velocity.dot(self.forward()) * MS_TO_KMH
    }
}

/// Suspension ray in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelRay {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

/// Change in chassis velocity produced by the wheels in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityChange {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl VelocityChange {
    fn apply_impulse(&mut self, impulse: Vec3, lever: Vec3, inv_mass: f32, inv_inertia: f32) {
        self.linear += impulse * inv_mass;
        self.angular += lever.cross(impulse) * inv_inertia;
    }
}

/// Compute simplified scalar inertia from mass and half extents.
pub fn compute_inertia(mass: f32, half_extents: Vec3) -> f32 {
    let avg_extent = (half_extents.x + half_extents.y + half_extents.z) / 3.0;
    mass * avg_extent * avg_extent
}

/// Suspension ray for `mount` on `chassis`.
pub fn wheel_ray(mount: &WheelMount, chassis: &ChassisState) -> WheelRay {
    WheelRay {
        origin: chassis.position + chassis.rotation * mount.offset,
        direction: chassis.rotation * Vec3::NEG_Y,
        max_distance: mount.ray_length(),
    }
}

/// Four raycast wheels attached to one chassis.
#[derive(Clone, Debug)]
pub struct RaycastVehicle {
    pub mounts: [WheelMount; WHEEL_COUNT],
    pub wheels: [WheelState; WHEEL_COUNT],
}

impl Default for RaycastVehicle {
    fn default() -> Self {
        Self::new(default_wheel_mounts())
    }
}

impl RaycastVehicle {
    pub fn new(mounts: [WheelMount; WHEEL_COUNT]) -> Self {
        let wheels = mounts.map(|mount| WheelState {
            suspension_length: mount.rest_length,
            ..Default::default()
        });
        Self { mounts, wheels }
    }

    /// Suspension ray of wheel `index`.
    pub fn ray(&self, index: usize, chassis: &ChassisState) -> WheelRay {
        wheel_ray(&self.mounts[index], chassis)
    }

    /// Run one tick of suspension and tire forces.
    ///
    /// `contacts[i]` is the hit of wheel `i`'s ray, if any. Brakes act as an
    /// impulse limit that never pushes the contact point's forward velocity
    /// past zero.
    pub fn step(
        &mut self,
        chassis: &ChassisState,
        contacts: &[Option<WheelContact>; WHEEL_COUNT],
        commands: &[WheelCommand; WHEEL_COUNT],
        tuning: &VehicleTuning,
        dt: f32,
    ) -> VelocityChange {
        let inv_mass = 1.0 / tuning.mass.max(0.1);
        let inv_inertia = 1.0 / compute_inertia(tuning.mass, tuning.half_extents).max(0.1);
        #[allow(clippy::cast_precision_loss)]
        let wheels_on_ground = contacts.iter().flatten().count().max(1) as f32;
        let effective_mass = tuning.mass / wheels_on_ground;
        let up = chassis.up();

        let mut change = VelocityChange::default();
        for (index, contact) in contacts.iter().enumerate() {
            let mount = self.mounts[index];
            let command = commands[index];
            let wheel = &mut self.wheels[index];
            wheel.steering = command.steering;

            let Some(contact) = contact else {
                wheel.in_contact = false;
                wheel.suspension_length = mount.rest_length;
                wheel.suspension_force = 0.0;
                wheel.delta_rotation *= AIRBORNE_SPIN_DECAY;
                wheel.rotation += wheel.delta_rotation;
                continue;
            };

            let ray = wheel_ray(&mount, chassis);
            let normal = contact.normal.try_normalize().unwrap_or(up);
            let contact_point = ray.origin + ray.direction * contact.distance;
            let lever = contact_point - chassis.position;
            let point_velocity = chassis.velocity_at(contact_point);

            // Suspension.
            wheel.in_contact = true;
            wheel.suspension_length = (contact.distance - mount.radius).clamp(0.0, mount.rest_length);
            let compression = mount.rest_length - wheel.suspension_length;
            let separating_speed = normal.dot(point_velocity);
            let damping = if separating_speed < 0.0 {
                tuning.damping_compression
            } else {
                tuning.damping_relaxation
            };
            let force = ((tuning.suspension_stiffness * compression - damping * separating_speed)
                * tuning.mass)
                .clamp(0.0, tuning.max_suspension_force);
            wheel.suspension_force = force;
            change.apply_impulse(normal * force * dt, lever, inv_mass, inv_inertia);

            // Tire frame on the contact plane.
            let heading = chassis.rotation * (Quat::from_rotation_y(command.steering) * CHASSIS_FORWARD);
            let forward = (heading - normal * heading.dot(normal)).normalize_or_zero();
            if forward == Vec3::ZERO {
                continue;
            }
            let side = normal.cross(forward);
            let forward_speed = forward.dot(point_velocity);
            let side_speed = side.dot(point_velocity);

            let mut forward_impulse = if command.engine_force.abs() > f32::EPSILON {
                command.engine_force * dt
            } else {
                (-forward_speed * effective_mass).clamp(-command.brake, command.brake)
            };
            let mut side_impulse = -side_speed * effective_mass;

            // Skid once the combined impulse exceeds what the load can hold.
            let max_impulse = force * dt * tuning.friction_slip;
            let total = forward_impulse.hypot(side_impulse);
            if total > max_impulse && total > 0.0 {
                let scale = max_impulse / total;
                forward_impulse *= scale;
                side_impulse *= scale;
            }

            change.apply_impulse(forward * forward_impulse, lever, inv_mass, inv_inertia);
            let side_lever = lever - up * (lever.dot(up) * (1.0 - tuning.roll_influence));
            change.apply_impulse(side * side_impulse, side_lever, inv_mass, inv_inertia);

            wheel.delta_rotation = forward_speed * dt / mount.radius.max(0.01);
            wheel.rotation += wheel.delta_rotation;
        }

        change
    }

    /// World transform of wheel `index` for rendering.
    ///
    /// The hub sits at the end of the suspension. Right wheels get an extra
    /// half turn of yaw so a single mesh serves both sides.
    pub fn wheel_transform(&self, index: usize, chassis: &ChassisState) -> (Vec3, Quat) {
        let wheel = &self.wheels[index];
        let ray = self.ray(index, chassis);
        let position = ray.origin + ray.direction * wheel.suspension_length;

        let mut rotation = chassis.rotation
            * Quat::from_rotation_y(wheel.steering)
            * Quat::from_rotation_x(wheel.rotation);
        if is_right_wheel(index) {
            rotation *= Quat::from_rotation_y(PI);
        }
        (position, rotation)
    }

    /// Forget suspension and spin state.
    pub fn reset(&mut self) {
        *self = Self::new(self.mounts);
    }
}
