use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Build a Fixed64 from a millisecond count at compile time, rounding to
/// the nearest representable value. All behavior constants in this crate
/// (tick interval, belt spacing, the entry and pull guards) are exact
/// multiples of a thousandth, so this keeps them out of the float domain
/// entirely.
pub const fn from_millis(ms: i64) -> Fixed64 {
    Fixed64::from_bits(((ms << 32) + 500) / 1000)
}

/// Convert an f64 to Fixed64. Use only for initialization, never in the
/// sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and snapshot records,
/// never in the sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}
