use ahash::RandomState;
use std::collections::HashMap as StdHashMap;
use std::f32::consts::PI;

pub const TWO_PI: f32 = PI * 2.0;

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;

/// `ternary!(cond, true_case, false_case)`
#[macro_export]
macro_rules! ternary {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition { $_true } else { $_false }
    };
}

/// Linear interpolation between two values. Returns a value between `start` and
/// `end` based on the interpolation parameter `t` (typically 0.0 to 1.0).
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// Convert decibels to a linear amplitude multiplier, e.g. `-6.0 => ~0.5`
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}
