//! Injectable randomness for experiences. Anything that picks colors, kinds,
//! angles or speeds takes a [`RandomSource`] so tests can substitute a fixed
//! sequence.

use nannou::rand::random;

pub trait RandomSource {
    /// Uniform sample in `[0, 1)`
    fn next_f32(&mut self) -> f32;

    /// Uniform sample in `[min, max)`
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}

/// Thread-local generator backed by `nannou::rand`
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f32(&mut self) -> f32 {
        random::<f32>()
    }
}

/// Cycles through a fixed list of samples. Values are clamped into `[0, 1)`.
#[derive(Clone, Debug)]
pub struct SequenceRandom {
    values: Vec<f32>,
    index: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let values = values.into();
        Self {
            values: if values.is_empty() { vec![0.0] } else { values },
            index: 0,
        }
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_f32(&mut self) -> f32 {
        let value = self.values[self.index % self.values.len()];
        self.index = self.index.wrapping_add(1);
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }
}

/// Uniformly pick one element of a closed set. Returns `None` only for an
/// empty slice.
pub fn pick<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<&'a T>
where
    R: RandomSource + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    let index = (rng.next_f32() * items.len() as f32) as usize;
    items.get(index.min(items.len() - 1))
}
