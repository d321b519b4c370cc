//! Physical constants and simulation defaults.

use std::f64::consts::PI;

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1.0e-8;

/// Smallest time step any stepper will take (seconds).
pub const MIN_TIME_STEP: f64 = 0.001;

/// Recommended RK4 time step (seconds).
pub const RECOMMENDED_TIME_STEP: f64 = 0.05;

/// Recommended maximum rotation per RK4 step (radians).
pub const RECOMMENDED_ANGLE_STEP: f64 = 3.0 * PI / 180.0;

/// Hard upper bound on simulated flight time (seconds).
pub const MAX_SIMULATION_TIME: f64 = 1200.0;

/// Altitude above the launch point that counts as liftoff (meters).
pub const LIFTOFF_ALTITUDE: f64 = 0.02;

/// Drop below the maximum altitude that confirms apogee (meters).
pub const APOGEE_DROP: f64 = 0.01;

/// Angle of attack beyond which an unstable rocket starts tumbling (radians).
pub const AOA_TUMBLE_CONDITION: f64 = PI / 9.0;

/// Thrust above which a tumble transition is fatal (newtons).
pub const THRUST_TUMBLE_CONDITION: f64 = 0.01;

/// Speed above which a recovery deployment is flagged (m/s).
pub const HIGH_SPEED_DEPLOYMENT: f64 = 20.0;

/// Minimum delay between a deployment trigger and the deployment itself (seconds).
pub const MIN_DEPLOYMENT_DELAY: f64 = 0.001;

/// Angle of attack above which aerodynamic results are flagged (radians).
pub const LARGE_AOA: f64 = 17.5 * PI / 180.0;

/// Delay after rod clearance before aerodynamic warnings are recorded (seconds).
pub const WARNINGS_GRACE_TIME: f64 = 0.25;

/// Earth's rotation rate (rad/s).
pub const EARTH_ANGULAR_VELOCITY: f64 = 7.292_115_9e-5;

/// Mean Earth radius (meters).
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Mask XOR-ed into the simulation seed before seeding a stepper's RNG.
pub const STEPPER_SEED_MASK: u64 = 0x23E3_A01F;
