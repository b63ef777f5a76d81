// tarmac_core/src/dynamics.rs

//! The per-vehicle orchestrator. One `VehicleDynamics` owns the mutable
//! state of one car and advances it with `tick()`. Nothing here is shared
//! between vehicles except the read-only specs.

use nalgebra::{Rotation2, Vector2, Vector3};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::{ensure_finite, ensure_in_range, ConfigResult};
use crate::models::engine::EngineDrivetrain;
use crate::models::steering::{ackermann_angles, base_angle};
use crate::models::suspension::SuspensionModel;
use crate::models::tire::{PacejkaTire, TireForceModel};
use crate::specs::{SuspensionSpec, TireSpec, VehicleSpec};
use crate::state::{DriverInputs, PhysicsState, VehicleState, WheelState};
use crate::types::{finite_or_zero, Axle, Lifecycle, WheelPosition, GRAVITY, WHEEL_COUNT};

/// Floor on the slip-ratio denominator (m/s).
pub const MIN_SLIP_SPEED: f64 = 0.01;
/// Below this speed resistive forces are treated as zero (m/s).
const RESTING_SPEED: f64 = 1.0e-6;
const KMH_PER_MS: f64 = 3.6;

// =========================================================================
// == Builder ==
// =========================================================================

/// Assembles a [`VehicleDynamics`], allowing per-wheel tire models and an
/// initial pose. Every spec is validated in [`Self::build`].
#[derive(Debug, Clone)]
pub struct VehicleDynamicsBuilder {
    spec: Arc<VehicleSpec>,
    tires: [TireSpec; 2],
    suspensions: [SuspensionSpec; 2],
    tire_overrides: [Option<Box<dyn TireForceModel>>; WHEEL_COUNT],
    position: Vector3<f64>,
    yaw: f64,
    gear: i32,
}

impl VehicleDynamicsBuilder {
    pub fn new(spec: Arc<VehicleSpec>) -> Self {
        Self {
            spec,
            tires: [TireSpec::default(), TireSpec::default()],
            suspensions: [SuspensionSpec::default(), SuspensionSpec::default()],
            tire_overrides: [None, None, None, None],
            position: Vector3::zeros(),
            yaw: 0.0,
            gear: 1,
        }
    }

    /// Tire specs indexed by axle: `[front, rear]`.
    pub fn tires(mut self, tires: [TireSpec; 2]) -> Self {
        self.tires = tires;
        self
    }

    pub fn tire(mut self, axle: Axle, tire: TireSpec) -> Self {
        self.tires[axle.index()] = tire;
        self
    }

    /// Suspension specs indexed by axle: `[front, rear]`.
    pub fn suspensions(mut self, suspensions: [SuspensionSpec; 2]) -> Self {
        self.suspensions = suspensions;
        self
    }

    pub fn suspension(mut self, axle: Axle, suspension: SuspensionSpec) -> Self {
        self.suspensions[axle.index()] = suspension;
        self
    }

    /// Mounts a custom force model on one wheel instead of the axle's Pacejka tire.
    pub fn tire_model(mut self, position: WheelPosition, model: Box<dyn TireForceModel>) -> Self {
        self.tire_overrides[position.index()] = Some(model);
        self
    }

    pub fn position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn gear(mut self, gear: i32) -> Self {
        self.gear = gear;
        self
    }

    pub fn build(self) -> ConfigResult<VehicleDynamics> {
        let spec = self.spec;
        spec.validate()?;
        ensure_in_range(
            "gear",
            f64::from(self.gear),
            0.0,
            f64::from(spec.top_gear()),
        )?;
        ensure_finite("position.x", self.position.x)?;
        ensure_finite("position.y", self.position.y)?;
        ensure_finite("position.z", self.position.z)?;
        ensure_finite("yaw", self.yaw)?;

        let [front_tire, rear_tire] = self.tires;
        let axle_tires = [PacejkaTire::new(front_tire)?, PacejkaTire::new(rear_tire)?];
        let [front_suspension, rear_suspension] = self.suspensions;
        let suspensions = [
            SuspensionModel::new(front_suspension, spec.mass)?,
            SuspensionModel::new(rear_suspension, spec.mass)?,
        ];

        let mut overrides = self.tire_overrides;
        let tires = WheelPosition::ALL.map(|position| match overrides[position.index()].take() {
            Some(model) => model,
            None => Box::new(axle_tires[position.axle().index()].clone()) as Box<dyn TireForceModel>,
        });

        if spec.gear_ratios[0] == 0.0 {
            warn!("reverse gear ratio is zero; reverse will produce no drive torque");
        }

        let mut vehicle = VehicleState::new(spec.idle_rpm);
        vehicle.position = self.position;
        vehicle.yaw = self.yaw;
        vehicle.gear = self.gear;

        let state = PhysicsState {
            vehicle,
            wheels: WheelPosition::ALL.map(|p| WheelState::at_rest(spec.static_wheel_load(p))),
            lifecycle: Lifecycle::Created,
            track_width_front: spec.track_width_front,
            track_width_rear: spec.track_width_rear,
            wheelbase: spec.wheelbase,
        };

        debug!(
            mass = spec.mass,
            drivetrain = ?spec.drivetrain_type,
            gears = spec.top_gear(),
            "vehicle created"
        );

        Ok(VehicleDynamics {
            drivetrain: EngineDrivetrain::new(Arc::clone(&spec)),
            yaw_inertia: spec.effective_yaw_inertia(),
            spec,
            tires,
            suspensions,
            state,
        })
    }
}

// =========================================================================
// == Vehicle Dynamics ==
// =========================================================================

/// Advances one vehicle's physics on a fixed or variable timestep.
///
/// `tick()` never fails: inputs are clamped, non-finite values are replaced
/// with zero and a non-positive `dt` leaves the state untouched. All errors
/// surface at construction.
#[derive(Debug, Clone)]
pub struct VehicleDynamics {
    spec: Arc<VehicleSpec>,
    drivetrain: EngineDrivetrain,
    tires: [Box<dyn TireForceModel>; WHEEL_COUNT],
    /// Indexed by `Axle::index()`.
    suspensions: [SuspensionModel; 2],
    yaw_inertia: f64,
    state: PhysicsState,
}

impl VehicleDynamics {
    /// Builds a vehicle at the origin facing +x in first gear.
    /// `tires` and `suspensions` are `[front, rear]`.
    pub fn new(
        spec: Arc<VehicleSpec>,
        tires: [TireSpec; 2],
        suspensions: [SuspensionSpec; 2],
    ) -> ConfigResult<Self> {
        VehicleDynamicsBuilder::new(spec)
            .tires(tires)
            .suspensions(suspensions)
            .build()
    }

    pub fn builder(spec: Arc<VehicleSpec>) -> VehicleDynamicsBuilder {
        VehicleDynamicsBuilder::new(spec)
    }

    // --- Accessors ---

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn drivetrain(&self) -> &EngineDrivetrain {
        &self.drivetrain
    }

    pub fn tire_model(&self, position: WheelPosition) -> &dyn TireForceModel {
        self.tires[position.index()].as_ref()
    }

    pub fn suspension(&self, axle: Axle) -> &SuspensionModel {
        &self.suspensions[axle.index()]
    }

    pub fn state(&self) -> &PhysicsState {
        &self.state
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.state.vehicle
    }

    pub fn wheels(&self) -> &[WheelState; WHEEL_COUNT] {
        &self.state.wheels
    }

    pub fn wheel(&self, position: WheelPosition) -> &WheelState {
        self.state.wheel(position)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle
    }

    /// Owned copy of the current state for the render layer.
    pub fn snapshot(&self) -> PhysicsState {
        self.state.clone()
    }

    /// Ends the vehicle's life and hands back its final state.
    pub fn destroy(mut self) -> PhysicsState {
        self.state.lifecycle = Lifecycle::Destroyed;
        debug!(
            ticks = self.state.vehicle.tick_count,
            elapsed = self.state.vehicle.elapsed,
            "vehicle destroyed"
        );
        self.state
    }

    /// World-frame contact patch positions, in `WheelPosition::ALL` order.
    /// The host samples terrain heights at these points.
    pub fn wheel_contact_positions(&self) -> [Vector3<f64>; WHEEL_COUNT] {
        let vehicle = &self.state.vehicle;
        let rotation = Rotation2::new(vehicle.yaw);
        WheelPosition::ALL.map(|position| {
            let (x, y) = self.spec.wheel_offset(position);
            let world = rotation * Vector2::new(x, y);
            Vector3::new(
                vehicle.position.x + world.x,
                vehicle.position.y + world.y,
                vehicle.position.z,
            )
        })
    }

    /// Sets the base steer angle and the front road-wheel angles.
    /// `input` is in [-1, 1] (positive = left); rear wheels never steer.
    pub fn apply_steering(&mut self, input: f64, ackermann: bool) {
        let base = base_angle(input, self.spec.max_steering_angle);
        let (left, right) = if ackermann {
            ackermann_angles(base, self.spec.wheelbase, self.spec.track_width_front)
        } else {
            (base, base)
        };

        self.state.vehicle.steering_angle = base;
        let wheels = &mut self.state.wheels;
        wheels[WheelPosition::FrontLeft.index()].steer_angle = left;
        wheels[WheelPosition::FrontRight.index()].steer_angle = right;
        wheels[WheelPosition::RearLeft.index()].steer_angle = 0.0;
        wheels[WheelPosition::RearRight.index()].steer_angle = 0.0;
    }

    // =====================================================================
    // == Tick ==
    // =====================================================================

    /// Advances the vehicle by `dt` seconds.
    ///
    /// `terrain_heights` is the ground height under each wheel in
    /// `WheelPosition::ALL` order, typically sampled at
    /// [`Self::wheel_contact_positions`].
    pub fn tick(
        &mut self,
        inputs: &DriverInputs,
        terrain_heights: [f64; WHEEL_COUNT],
        dt: f64,
    ) -> &PhysicsState {
        if !dt.is_finite() || dt <= 0.0 {
            return &self.state;
        }
        let spec = Arc::clone(&self.spec);

        // --- 0. Inputs and steering ---
        let inputs = inputs.clamped(spec.top_gear());
        if self.state.lifecycle == Lifecycle::Created {
            self.state.lifecycle = Lifecycle::Active;
            debug!("vehicle active");
        }
        {
            let vehicle = &mut self.state.vehicle;
            vehicle.throttle = inputs.throttle;
            vehicle.brake = inputs.brake;
            vehicle.clutch = inputs.clutch;
            vehicle.gear = inputs.gear;
        }
        self.apply_steering(inputs.steering, inputs.ackermann.unwrap_or(spec.ackermann));

        // --- 1. Drivetrain ---
        let engagement = 1.0 - inputs.clutch;
        let throttle = self
            .drivetrain
            .rev_limited_throttle(self.state.vehicle.rpm, inputs.throttle);
        let axle_torque = self
            .drivetrain
            .signed_wheel_torque(self.state.vehicle.rpm, inputs.gear, throttle)
            * engagement;
        let driven_count = self.drivetrain.driven_wheel_count().max(1) as f64;
        let drive_per_wheel = axle_torque / driven_count;
        let wheel_speed_cap = self.drivetrain.max_wheel_speed(inputs.gear);

        // --- 2-3. Contact kinematics, tire forces and wheel spin ---
        let (v_fwd, v_left) = self.state.vehicle.body_velocity();
        let yaw_rate = self.state.vehicle.angular_velocity.z;
        let corner_mass = spec.mass / WHEEL_COUNT as f64;
        let yaw_share = WHEEL_COUNT as f64 / self.yaw_inertia;
        let mut body_force = Vector2::zeros();
        let mut yaw_moment = 0.0;

        for position in WheelPosition::ALL {
            let (ox, oy) = spec.wheel_offset(position);
            let radius = spec.tire_radius(position.axle());
            let tire = &self.tires[position.index()];
            let wheel = &mut self.state.wheels[position.index()];

            // Contact-patch velocity in the body frame, then in the wheel frame.
            let vx = v_fwd - yaw_rate * oy;
            let vy = v_left + yaw_rate * ox;
            let (sin_d, cos_d) = wheel.steer_angle.sin_cos();
            let v_long = vx * cos_d + vy * sin_d;
            let v_lat = -vx * sin_d + vy * cos_d;

            // Drive and brake act first; the tire then reacts to the wheel speed they leave.
            let drive = if self.drivetrain.is_driven(position) {
                drive_per_wheel
            } else {
                0.0
            };
            let spin_step = dt / spec.wheel_inertia;
            let free_spin = wheel.spin_rate + drive * spin_step;
            let brake_step = self.drivetrain.brake_torque(inputs.brake, position) * spin_step;
            let spin = if free_spin.abs() <= brake_step {
                0.0
            } else {
                free_spin - brake_step.copysign(free_spin)
            };

            let surface_speed = spin * radius;
            let slip_velocity = surface_speed - v_long;
            let denominator = surface_speed.abs().max(v_long.abs()).max(MIN_SLIP_SPEED);
            wheel.slip_ratio = slip_velocity / denominator;
            wheel.slip_angle = (-v_lat).atan2(v_long.abs());

            let grip = tire.grip_scale(wheel.tire_temperature, wheel.tire_wear);
            let (fx, fy) = tire.combined_force(
                wheel.slip_ratio,
                wheel.slip_angle,
                wheel.normal_force,
                0.0,
                grip,
            );

            // Cap each component at the impulse that would null its slip velocity this
            // step. Body mass and yaw inertia are shared by all four contacts.
            let lateral_inv_mass = 1.0 / corner_mass + ox * ox * yaw_share;
            let longitudinal_inv_mass =
                1.0 / corner_mass + oy * oy * yaw_share + radius * radius / spec.wheel_inertia;
            let fx = clamp_magnitude(fx, slip_velocity.abs() / (longitudinal_inv_mass * dt));
            let fy = clamp_magnitude(fy, v_lat.abs() / (lateral_inv_mass * dt));

            let mut spin = spin - fx * radius * spin_step;
            if self.drivetrain.is_driven(position) {
                spin = spin.clamp(-wheel_speed_cap, wheel_speed_cap);
            }
            wheel.spin_rate = finite_or_zero(spin);
            wheel.longitudinal_force = fx;
            wheel.lateral_force = fy;
            wheel.advance_rotation(dt);
            tire.advance_thermal(wheel, dt);

            let force = Vector2::new(fx * cos_d - fy * sin_d, fx * sin_d + fy * cos_d);
            body_force += force;
            yaw_moment += ox * force.y - oy * force.x;
        }

        // --- 4. Suspension and next tick's normal loads ---
        let heights = terrain_heights.map(finite_or_zero);
        let mean_height = finite_or_zero(heights.iter().sum::<f64>() / WHEEL_COUNT as f64);
        for position in WheelPosition::ALL {
            let model = &self.suspensions[position.axle().index()];
            let target = heights[position.index()] - mean_height;
            model.tick(&mut self.state.wheels[position.index()], target, dt);
        }
        let [front_left, front_right, rear_left, rear_right] = &mut self.state.wheels;
        self.suspensions[Axle::Front.index()].apply_anti_roll(front_left, front_right, dt);
        self.suspensions[Axle::Rear.index()].apply_anti_roll(rear_left, rear_right, dt);

        let last_acceleration = self.state.vehicle.acceleration;
        for position in WheelPosition::ALL {
            let transfer = load_transfer(&spec, position, &last_acceleration);
            let wheel = &mut self.state.wheels[position.index()];
            let load = spec.static_wheel_load(position) + transfer + wheel.suspension_force;
            wheel.normal_force = finite_or_zero(load).max(0.0);
        }

        // --- 5. Body integration ---
        let vehicle = &mut self.state.vehicle;
        let forward = vehicle.forward();
        let left = vehicle.left();
        let mut world_force = forward * body_force.x + left * body_force.y;
        world_force += resistive_force(&spec, &vehicle.velocity, dt);

        let acceleration = world_force / spec.mass;
        let velocity = vehicle.velocity;
        vehicle.position += velocity * dt;
        vehicle.position.z = mean_height;
        vehicle.velocity += acceleration * dt;
        vehicle.velocity.z = 0.0;
        vehicle.yaw += vehicle.angular_velocity.z * dt;
        vehicle.angular_velocity.z += yaw_moment / self.yaw_inertia * dt;
        vehicle.acceleration = Vector3::new(acceleration.dot(&forward), acceleration.dot(&left), 0.0);

        // --- 6. Engine speed and readouts ---
        let (driven_speed, driven_wheels) = WheelPosition::ALL
            .iter()
            .filter(|&&p| self.drivetrain.is_driven(p))
            .fold((0.0, 0usize), |(sum, n), &p| {
                (sum + self.state.wheels[p.index()].spin_rate.abs(), n + 1)
            });
        let mean_driven_speed = driven_speed / driven_wheels.max(1) as f64;
        let wheel_rpm = self.drivetrain.rpm_from_wheel_speed(mean_driven_speed, inputs.gear);
        let free_rpm = spec.idle_rpm + inputs.throttle * (spec.redline_rpm - spec.idle_rpm);

        let vehicle = &mut self.state.vehicle;
        vehicle.rpm = (engagement * wheel_rpm + inputs.clutch * free_rpm)
            .clamp(spec.idle_rpm, spec.redline_rpm);
        vehicle.speed_kmh = vehicle.velocity.xy().norm() * KMH_PER_MS;
        vehicle.elapsed += dt;
        vehicle.tick_count += 1;

        trace!(
            tick = vehicle.tick_count,
            speed_kmh = vehicle.speed_kmh,
            rpm = vehicle.rpm,
            gear = vehicle.gear,
            "tick"
        );
        &self.state
    }
}

/// Aerodynamic drag plus rolling resistance, never strong enough to reverse
/// the velocity within one step.
fn resistive_force(spec: &VehicleSpec, velocity: &Vector3<f64>, dt: f64) -> Vector3<f64> {
    let planar = Vector3::new(velocity.x, velocity.y, 0.0);
    let speed = planar.norm();
    if speed < RESTING_SPEED {
        return Vector3::zeros();
    }
    let drag = 0.5 * spec.air_density * spec.drag_coefficient * spec.frontal_area * speed * speed;
    let rolling = spec.rolling_resistance * spec.mass * GRAVITY;
    let stopping = speed * spec.mass / dt;
    -(planar / speed) * (drag + rolling).min(stopping)
}

/// Change in a wheel's normal load from body acceleration (body frame, x
/// forward, y left). Braking loads the front, turning left loads the right.
fn load_transfer(spec: &VehicleSpec, position: WheelPosition, acceleration: &Vector3<f64>) -> f64 {
    let axle = position.axle();
    let height = spec.center_of_gravity_height;
    let longitudinal = spec.mass * acceleration.x * height / spec.wheelbase / 2.0;
    let longitudinal = match axle {
        Axle::Front => -longitudinal,
        Axle::Rear => longitudinal,
    };
    let axle_share = match axle {
        Axle::Front => spec.mass_front_ratio,
        Axle::Rear => 1.0 - spec.mass_front_ratio,
    };
    let lateral =
        spec.mass * axle_share * acceleration.y * height / spec.track_width(axle);
    finite_or_zero(longitudinal - position.side_sign() * lateral)
}

#[inline]
fn clamp_magnitude(value: f64, limit: f64) -> f64 {
    if limit.is_finite() {
        value.clamp(-limit, limit)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_DT;
    use approx::assert_abs_diff_eq;

    fn sedan() -> VehicleDynamics {
        VehicleDynamics::new(
            Arc::new(VehicleSpec::default()),
            [TireSpec::default(), TireSpec::default()],
            [SuspensionSpec::default(), SuspensionSpec::default()],
        )
        .unwrap()
    }

    fn throttle(amount: f64) -> DriverInputs {
        DriverInputs {
            throttle: amount,
            ..Default::default()
        }
    }

    #[test]
    fn starts_at_rest_with_static_loads() {
        let car = sedan();
        assert_eq!(car.lifecycle(), Lifecycle::Created);
        let total: f64 = car.wheels().iter().map(|w| w.normal_force).sum();
        assert_abs_diff_eq!(total, 1500.0 * GRAVITY, epsilon = 1e-6);
        assert_eq!(car.vehicle().rpm, car.spec().idle_rpm);
    }

    #[test]
    fn first_tick_activates() {
        let mut car = sedan();
        car.tick(&DriverInputs::default(), [0.0; 4], DEFAULT_DT);
        assert_eq!(car.lifecycle(), Lifecycle::Active);
        assert_eq!(car.vehicle().tick_count, 1);
        let last = car.destroy();
        assert_eq!(last.lifecycle, Lifecycle::Destroyed);
    }

    #[test]
    fn idle_car_on_flat_ground_stays_put() {
        let mut car = sedan();
        for _ in 0..48 {
            car.tick(&DriverInputs::default(), [0.0; 4], DEFAULT_DT);
        }
        assert_eq!(car.vehicle().velocity, Vector3::zeros());
        assert_eq!(car.vehicle().position, Vector3::zeros());
        for wheel in car.wheels() {
            assert_eq!(wheel.suspension_compression, 0.0);
        }
    }

    #[test]
    fn non_positive_dt_changes_nothing() {
        let mut car = sedan();
        for _ in 0..10 {
            car.tick(&throttle(1.0), [0.0; 4], DEFAULT_DT);
        }
        let before = car.snapshot();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            car.tick(&throttle(1.0), [0.3, 0.0, 0.1, 0.0], dt);
            assert_eq!(car.state(), &before);
        }
    }

    #[test]
    fn throttle_drives_rear_wheels_forward() {
        let mut car = sedan();
        for _ in 0..72 {
            car.tick(&throttle(1.0), [0.0; 4], DEFAULT_DT);
        }
        let (v_fwd, v_left) = car.vehicle().body_velocity();
        assert!(v_fwd > 0.5, "forward speed {v_fwd}");
        assert_abs_diff_eq!(v_left, 0.0, epsilon = 1e-9);
        assert!(car.wheel(WheelPosition::RearLeft).spin_rate > 0.0);
        assert!(car.vehicle().rpm > car.spec().idle_rpm);
    }

    #[test]
    fn reverse_gear_backs_up() {
        let mut car = sedan();
        let inputs = DriverInputs {
            throttle: 0.5,
            gear: 0,
            ..Default::default()
        };
        for _ in 0..24 {
            car.tick(&inputs, [0.0; 4], DEFAULT_DT);
        }
        assert!(car.vehicle().body_velocity().0 < 0.0);
    }

    #[test]
    fn brakes_hold_a_stationary_car() {
        let mut car = sedan();
        let inputs = DriverInputs {
            brake: 1.0,
            ..Default::default()
        };
        for _ in 0..24 {
            car.tick(&inputs, [0.0; 4], DEFAULT_DT);
        }
        assert_eq!(car.vehicle().velocity, Vector3::zeros());
        for wheel in car.wheels() {
            assert_eq!(wheel.spin_rate, 0.0);
        }
    }

    #[test]
    fn clutch_disengaged_transmits_nothing() {
        let mut car = sedan();
        let inputs = DriverInputs {
            throttle: 1.0,
            clutch: 1.0,
            ..Default::default()
        };
        for _ in 0..24 {
            car.tick(&inputs, [0.0; 4], DEFAULT_DT);
        }
        assert_eq!(car.vehicle().velocity, Vector3::zeros());
        assert_eq!(car.vehicle().rpm, car.spec().redline_rpm);
    }

    #[test]
    fn steering_sets_front_wheels_only() {
        let mut car = sedan();
        car.apply_steering(0.5, true);
        let fl = car.wheel(WheelPosition::FrontLeft).steer_angle;
        let fr = car.wheel(WheelPosition::FrontRight).steer_angle;
        assert!(fl > fr && fr > 0.0);
        assert_eq!(car.wheel(WheelPosition::RearLeft).steer_angle, 0.0);
        assert_abs_diff_eq!(car.vehicle().steering_angle, 0.5 * 0.61, epsilon = 1e-12);

        car.apply_steering(-0.5, false);
        let fl = car.wheel(WheelPosition::FrontLeft).steer_angle;
        let fr = car.wheel(WheelPosition::FrontRight).steer_angle;
        assert_eq!(fl, fr);
    }

    #[test]
    fn steering_input_takes_effect_in_the_same_tick() {
        let mut car = sedan();
        let inputs = DriverInputs {
            steering: 0.5,
            ..Default::default()
        };
        let state = car.tick(&inputs, [0.0; 4], DEFAULT_DT);
        assert!(state.wheels[WheelPosition::FrontLeft.index()].steer_angle > 0.0);
        assert_abs_diff_eq!(state.vehicle.steering_angle, 0.5 * 0.61, epsilon = 1e-12);
    }

    #[test]
    fn contact_positions_follow_heading() {
        let car = VehicleDynamics::builder(Arc::new(VehicleSpec::default()))
            .position(Vector3::new(10.0, 5.0, 0.0))
            .yaw(std::f64::consts::FRAC_PI_2)
            .build()
            .unwrap();
        let contacts = car.wheel_contact_positions();
        let front_left = contacts[WheelPosition::FrontLeft.index()];
        let (x, y) = car.spec().wheel_offset(WheelPosition::FrontLeft);
        // Facing +y: body forward maps to world +y, body left to world -x.
        assert_abs_diff_eq!(front_left.x, 10.0 - y, epsilon = 1e-9);
        assert_abs_diff_eq!(front_left.y, 5.0 + x, epsilon = 1e-9);
    }

    #[test]
    fn builder_rejects_bad_gear_and_pose() {
        let spec = Arc::new(VehicleSpec::default());
        assert!(VehicleDynamics::builder(Arc::clone(&spec)).gear(9).build().is_err());
        assert!(VehicleDynamics::builder(Arc::clone(&spec)).gear(-1).build().is_err());
        assert!(VehicleDynamics::builder(spec).yaw(f64::NAN).build().is_err());
    }

    #[test]
    fn clones_evolve_independently() {
        let mut a = sedan();
        let b = a.clone();
        a.tick(&throttle(1.0), [0.0; 4], DEFAULT_DT);
        assert_eq!(b.vehicle().tick_count, 0);
        assert_eq!(a.vehicle().tick_count, 1);
    }
}
