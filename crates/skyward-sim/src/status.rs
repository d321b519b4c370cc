//! Mutable state of one simulation branch.

use std::sync::Arc;

use glam::{DQuat, DVec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skyward_models::{RigidBody, WorldCoordinate};
use skyward_rocket::{FlightConfiguration, MotorState};
use skyward_types::constants::{HIGH_SPEED_DEPLOYMENT, STEPPER_SEED_MASK};
use skyward_types::{AbortCause, DeviceKey, EventType, MotorKey, SimulationError, Warning, WarningSet};

use crate::conditions::SimulationConditions;
use crate::event::{EventData, EventQueue, FlightEvent};
use crate::flight_data::{FlightDataBranch, FlightDataType};
use crate::listener::fire_gate;
use crate::stepper::StepperKind;

/// Everything that changes while a branch is simulated: kinematics, motor
/// states, pending events, recorded data and warnings.
///
/// World frame is east-north-up with the origin at the launch point. The
/// body frame has +z pointing towards the nose; `orientation` rotates body
/// vectors into the world frame.
///
/// Every mutation, through a setter, a `&mut` accessor or a recording
/// method, bumps [`generation`](Self::generation), which lets the listener
/// dispatch detect listeners that modified the state.
#[derive(Debug, Clone)]
pub struct SimulationStatus {
    conditions: Arc<SimulationConditions>,
    configuration: FlightConfiguration,

    time: f64,
    previous_time_step: f64,
    position: DVec3,
    velocity: DVec3,
    orientation: DQuat,
    angular_velocity: DVec3,
    world_position: WorldCoordinate,
    launch_rod_direction: DVec3,
    mass: RigidBody,

    stepper: StepperKind,
    motors: Vec<MotorState>,
    event_queue: EventQueue,
    flight_data: FlightDataBranch,
    warnings: WarningSet,
    rng: ChaCha8Rng,
    generation: u64,

    motor_ignited: bool,
    liftoff: bool,
    launch_rod_cleared: bool,
    apogee_reached: bool,
    tumbling: bool,
    landed: bool,

    max_altitude: f64,
    max_altitude_time: f64,
    max_z_velocity: f64,
    start_warnings_time: f64,
    deployed_devices: Vec<DeviceKey>,
}

impl SimulationStatus {
    /// Status at rest on the launch rod at time zero.
    pub fn new(
        conditions: Arc<SimulationConditions>,
        configuration: FlightConfiguration,
        branch_name: impl Into<String>,
    ) -> Self {
        let angle = conditions.launch_rod_angle;
        let direction = conditions.launch_rod_direction;
        let launch_rod_direction = DVec3::new(
            angle.sin() * direction.sin(),
            angle.sin() * direction.cos(),
            angle.cos(),
        );
        let motors = configuration
            .active_motor_mounts()
            .map(|(key, mount)| MotorState::new(key, mount))
            .collect();
        let rng = ChaCha8Rng::seed_from_u64(conditions.random_seed ^ STEPPER_SEED_MASK);
        let world_position = conditions.launch_site;

        Self {
            configuration,
            time: 0.0,
            previous_time_step: conditions.time_step,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            orientation: DQuat::from_rotation_arc(DVec3::Z, launch_rod_direction),
            angular_velocity: DVec3::ZERO,
            world_position,
            launch_rod_direction,
            mass: RigidBody::default(),
            stepper: StepperKind::Rk4,
            motors,
            event_queue: EventQueue::new(),
            flight_data: FlightDataBranch::new(branch_name),
            warnings: WarningSet::new(),
            rng,
            generation: 0,
            motor_ignited: false,
            liftoff: false,
            launch_rod_cleared: false,
            apogee_reached: false,
            tumbling: false,
            landed: false,
            max_altitude: 0.0,
            max_altitude_time: 0.0,
            max_z_velocity: 0.0,
            start_warnings_time: f64::NAN,
            deployed_devices: Vec::new(),
            conditions,
        }
    }

    /// Independent copy for a booster separating as `stage`. The flight
    /// data keeps the shared history up to now.
    pub fn fork(&self, name: impl Into<String>, stage: usize) -> Self {
        let mut status = self.clone();
        status.flight_data = self.flight_data.fork(name, stage);
        status
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    // ─── Context ─────────────────────────────────────────────

    pub fn conditions(&self) -> &Arc<SimulationConditions> {
        &self.conditions
    }

    pub fn configuration(&self) -> &FlightConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut FlightConfiguration {
        self.touch();
        &mut self.configuration
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ─── Kinematics ──────────────────────────────────────────

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Moves the clock to `time`. Time never runs backwards: an earlier
    /// `time` is dropped with a warning.
    pub fn set_time(&mut self, time: f64) {
        if time < self.time {
            tracing::debug!(from = self.time, to = time, "ignoring backward time");
            self.add_warning(Warning::Other("time cannot move backwards".into()));
            return;
        }
        self.touch();
        self.time = time;
    }

    pub fn previous_time_step(&self) -> f64 {
        self.previous_time_step
    }

    pub fn set_previous_time_step(&mut self, dt: f64) {
        self.touch();
        self.previous_time_step = dt;
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.touch();
        self.position = position;
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: DVec3) {
        self.touch();
        self.velocity = velocity;
    }

    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: DQuat) {
        self.touch();
        self.orientation = orientation;
    }

    /// Rotation rate in world coordinates (rad/s).
    pub fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: DVec3) {
        self.touch();
        self.angular_velocity = angular_velocity;
    }

    pub fn world_position(&self) -> WorldCoordinate {
        self.world_position
    }

    pub fn set_world_position(&mut self, world_position: WorldCoordinate) {
        self.touch();
        self.world_position = world_position;
    }

    /// Unit vector along the launch rod, pointing up.
    pub fn launch_rod_direction(&self) -> DVec3 {
        self.launch_rod_direction
    }

    /// Mass properties from the most recent mass calculation.
    pub fn mass_snapshot(&self) -> RigidBody {
        self.mass
    }

    pub fn set_mass_snapshot(&mut self, mass: RigidBody) {
        self.touch();
        self.mass = mass;
    }

    // ─── Engine state ────────────────────────────────────────

    pub fn stepper(&self) -> StepperKind {
        self.stepper
    }

    pub(crate) fn set_stepper(&mut self, kind: StepperKind) {
        self.touch();
        self.stepper = kind;
    }

    pub fn motors(&self) -> &[MotorState] {
        &self.motors
    }

    pub fn motor(&self, key: MotorKey) -> Option<&MotorState> {
        self.motors.iter().find(|m| m.key() == key)
    }

    pub fn motor_mut(&mut self, key: MotorKey) -> Option<&mut MotorState> {
        self.touch();
        self.motors.iter_mut().find(|m| m.key() == key)
    }

    pub fn event_queue(&self) -> &EventQueue {
        &self.event_queue
    }

    pub fn event_queue_mut(&mut self) -> &mut EventQueue {
        self.touch();
        &mut self.event_queue
    }

    pub fn flight_data(&self) -> &FlightDataBranch {
        &self.flight_data
    }

    pub fn flight_data_mut(&mut self) -> &mut FlightDataBranch {
        self.touch();
        &mut self.flight_data
    }

    pub(crate) fn into_flight_data(self) -> (FlightDataBranch, WarningSet) {
        (self.flight_data, self.warnings)
    }

    pub fn warnings(&self) -> &WarningSet {
        &self.warnings
    }

    /// Random source for stepper perturbations.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        self.touch();
        &mut self.rng
    }

    // ─── Flags ───────────────────────────────────────────────

    pub fn is_motor_ignited(&self) -> bool {
        self.motor_ignited
    }

    pub fn set_motor_ignited(&mut self, ignited: bool) {
        self.touch();
        self.motor_ignited = ignited;
    }

    pub fn is_liftoff(&self) -> bool {
        self.liftoff
    }

    pub fn set_liftoff(&mut self, liftoff: bool) {
        self.touch();
        self.liftoff = liftoff;
    }

    pub fn is_launch_rod_cleared(&self) -> bool {
        self.launch_rod_cleared
    }

    pub fn set_launch_rod_cleared(&mut self, cleared: bool) {
        self.touch();
        self.launch_rod_cleared = cleared;
    }

    pub fn is_apogee_reached(&self) -> bool {
        self.apogee_reached
    }

    pub fn set_apogee_reached(&mut self, reached: bool) {
        self.touch();
        self.apogee_reached = reached;
    }

    pub fn is_tumbling(&self) -> bool {
        self.tumbling
    }

    pub fn set_tumbling(&mut self, tumbling: bool) {
        self.touch();
        self.tumbling = tumbling;
    }

    pub fn is_landed(&self) -> bool {
        self.landed
    }

    pub fn set_landed(&mut self, landed: bool) {
        self.touch();
        self.landed = landed;
    }

    // ─── Tracking ────────────────────────────────────────────

    pub fn max_altitude(&self) -> f64 {
        self.max_altitude
    }

    pub fn max_altitude_time(&self) -> f64 {
        self.max_altitude_time
    }

    pub(crate) fn track_max_altitude(&mut self) {
        self.touch();
        if self.position.z > self.max_altitude {
            self.max_altitude = self.position.z;
            self.max_altitude_time = self.time;
        }
        self.max_z_velocity = self.max_z_velocity.max(self.velocity.z);
    }

    pub fn max_z_velocity(&self) -> f64 {
        self.max_z_velocity
    }

    pub fn start_warnings_time(&self) -> f64 {
        self.start_warnings_time
    }

    pub fn set_start_warnings_time(&mut self, time: f64) {
        self.touch();
        self.start_warnings_time = time;
    }

    pub fn deployed_devices(&self) -> &[DeviceKey] {
        &self.deployed_devices
    }

    pub fn is_deployed(&self, key: DeviceKey) -> bool {
        self.deployed_devices.contains(&key)
    }

    pub fn deploy(&mut self, key: DeviceKey) {
        self.touch();
        if !self.deployed_devices.contains(&key) {
            self.deployed_devices.push(key);
        }
    }

    // ─── Derived quantities ──────────────────────────────────

    /// Total thrust of the motors in active stages at `time` (N).
    pub fn thrust_at(&self, time: f64) -> f64 {
        let rocket = self.configuration.rocket();
        self.motors
            .iter()
            .filter(|state| self.configuration.is_stage_active(state.key().stage))
            .filter_map(|state| {
                rocket
                    .motor_mount(state.key())
                    .map(|mount| state.thrust_at(&mount.motor, time))
            })
            .sum()
    }

    /// Whether a motor in an active stage is still thrusting.
    pub fn has_burning_motor(&self) -> bool {
        self.motors
            .iter()
            .any(|m| m.is_burning() && self.configuration.is_stage_active(m.key().stage))
    }

    /// Whether an ignition is still queued.
    pub fn has_pending_ignition(&self) -> bool {
        self.event_queue.iter().any(|e| e.kind == EventType::Ignition)
    }

    // ─── Events and warnings ─────────────────────────────────

    /// Queues `event` unless a listener vetoes it. Returns whether it was queued.
    pub fn add_event(&mut self, event: FlightEvent) -> bool {
        if !fire_gate(self, |listener, status| listener.add_flight_event(status, &event)) {
            tracing::debug!(event = %event.kind, time = event.time, "event vetoed by listener");
            return false;
        }
        self.event_queue_mut().push(event);
        true
    }

    /// Queues a `SIM_ABORT` at the current time.
    pub fn abort_simulation(&mut self, cause: AbortCause) {
        tracing::warn!(branch = self.flight_data.name(), time = self.time, %cause, "aborting branch");
        self.add_event(FlightEvent::abort(self.time, cause));
    }

    /// Adds a warning; a new or worse warning is also recorded as a
    /// `SIM_WARN` event in the branch.
    pub fn add_warning(&mut self, warning: Warning) {
        if self.warnings.add(warning.clone()) {
            self.touch();
            tracing::debug!(branch = self.flight_data.name(), %warning, "warning");
            let event = FlightEvent::new(EventType::SimWarn, self.time).with_data(EventData::Warning(warning));
            if let Err(e) = self.flight_data.add_event(event) {
                tracing::debug!(error = %e, "warning not recorded");
            }
        }
    }

    /// Merges aerodynamic warnings, ignoring them while they are expected:
    /// on the rod, shortly after leaving it, and at low vertical speed.
    pub fn record_warnings(&mut self, warnings: &WarningSet) {
        if !self.launch_rod_cleared
            || !(self.time >= self.start_warnings_time)
            || self.velocity.z < 0.2 * self.max_z_velocity
        {
            return;
        }
        for warning in warnings.iter() {
            self.add_warning(warning.clone());
        }
    }

    /// Records a handled event in the branch.
    pub(crate) fn record_event(&mut self, event: FlightEvent) -> Result<(), SimulationError> {
        self.touch();
        self.flight_data.add_event(event)
    }

    /// Opens a new data sample and writes the kinematic channels.
    pub fn store_data(&mut self) -> Result<(), SimulationError> {
        self.touch();
        let p = self.position;
        let v = self.velocity;
        let axis = self.orientation * DVec3::Z;
        let world = self.world_position;
        let data = &mut self.flight_data;
        data.add_point()?;
        data.set_value(FlightDataType::Time, self.time)?;
        data.set_value(FlightDataType::Altitude, p.z)?;
        data.set_value(FlightDataType::PositionX, p.x)?;
        data.set_value(FlightDataType::PositionY, p.y)?;
        data.set_value(FlightDataType::LateralDistance, p.x.hypot(p.y))?;
        data.set_value(FlightDataType::LateralDirection, p.x.atan2(p.y))?;
        data.set_value(FlightDataType::VelocityZ, v.z)?;
        data.set_value(FlightDataType::VelocityXY, v.x.hypot(v.y))?;
        data.set_value(FlightDataType::VelocityTotal, v.length())?;
        data.set_value(FlightDataType::Latitude, world.latitude)?;
        data.set_value(FlightDataType::Longitude, world.longitude)?;
        data.set_value(FlightDataType::OrientationTheta, axis.z.clamp(-1.0, 1.0).acos())?;
        data.set_value(FlightDataType::OrientationPhi, axis.y.atan2(axis.x))?;
        Ok(())
    }

    /// Warns about a deployment at high speed.
    pub(crate) fn check_deployment_speed(&mut self) {
        let speed = self.velocity.length();
        if speed > HIGH_SPEED_DEPLOYMENT {
            self.add_warning(Warning::HighSpeedDeployment(speed));
        }
    }
}
