//! Scripted random source
//!
//! The engine draws uniform floats through [`rand::Rng`]. `ScriptedRng`
//! replays a fixed list of draws instead, so callers can pin the gate.

use rand::RngCore;

/// Largest value `Rng::gen::<f64>()` can produce
pub const MAX_ROLL: f64 = 1.0 - f64::EPSILON / 2.0;

/// An `RngCore` whose `gen::<f64>()` draws follow a script.
///
/// Draws cycle once the script runs out. An empty script always rolls 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    rolls: Vec<f64>,
    cursor: usize,
    draws: usize,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            cursor: 0,
            draws: 0,
        }
    }

    /// Every draw returns the same value
    pub fn constant(roll: f64) -> Self {
        Self::new([roll])
    }

    /// Number of draws consumed so far
    pub fn draws(&self) -> usize {
        self.draws
    }

    fn next_roll(&mut self) -> f64 {
        self.draws += 1;
        if self.rolls.is_empty() {
            return 0.0;
        }
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll
    }
}

/// Encode a float in [0, 1) so that rand's 53-bit float sampling
/// (top bits of `next_u64`) decodes it back.
fn encode(roll: f64) -> u64 {
    let roll = if roll.is_finite() { roll.clamp(0.0, MAX_ROLL) } else { 0.0 };
    let mantissa = (roll * (1u64 << 53) as f64) as u64;
    mantissa.min((1u64 << 53) - 1) << 11
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let roll = self.next_roll();
        encode(roll)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_replays_script() {
        let mut rng = ScriptedRng::new([0.25, 0.5, 0.75]);
        let a: f64 = rng.gen();
        let b: f64 = rng.gen();
        let c: f64 = rng.gen();
        let d: f64 = rng.gen();
        assert_eq!((a, b, c, d), (0.25, 0.5, 0.75, 0.25));
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_extremes() {
        let mut rng = ScriptedRng::new([0.0, 1.0, MAX_ROLL]);
        let zero: f64 = rng.gen();
        let clamped: f64 = rng.gen();
        let top: f64 = rng.gen();
        assert_eq!(zero, 0.0);
        assert!(clamped < 1.0);
        assert_eq!(top, MAX_ROLL);
    }

    #[test]
    fn test_empty_script_rolls_zero() {
        let mut rng = ScriptedRng::default();
        let roll: f64 = rng.gen();
        assert_eq!(roll, 0.0);
    }
}
