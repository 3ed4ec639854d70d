//! 16.16 fixed-point scalars and binary angles used by the simulation.
//!
//! All positional and momentum math runs on [`Fixed`] so that authoritative
//! and speculative simulation produce bit-identical results. Trigonometry is
//! served from fine lookup tables that are built once per process with
//! integer CORDIC iterations, so every platform computes the same entries.

use std::{
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
    sync::OnceLock,
};

use serde::{Deserialize, Serialize};

/// Number of fractional bits carried by [`Fixed`].
pub const FRACBITS: u32 = 16;

/// Raw representation of `1.0` in [`Fixed`] units.
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// Number of entries in one revolution of the fine trigonometry tables.
pub const FINEANGLES: usize = 8192;

/// Shift converting a binary angle into a fine table index.
pub const ANGLETOFINESHIFT: u32 = 19;

/// Signed 16.16 fixed-point number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fixed(i32);

impl Fixed {
    /// The value `0.0`.
    pub const ZERO: Self = Self(0);
    /// The value `1.0`.
    pub const ONE: Self = Self(FRACUNIT);
    /// Largest representable value.
    pub const MAX: Self = Self(i32::MAX);
    /// Smallest representable value.
    pub const MIN: Self = Self(i32::MIN);

    /// Wraps a raw 16.16 value.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw 16.16 representation.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts a whole number of map units.
    #[must_use]
    pub const fn from_int(value: i32) -> Self {
        Self(value.wrapping_shl(FRACBITS))
    }

    /// Truncates toward negative infinity to whole map units.
    #[must_use]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    /// Converts a floating-point value, saturating at the representable range.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self((value * f64::from(FRACUNIT)) as i32)
    }

    /// Converts to floating point.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(FRACUNIT)
    }

    /// Absolute value, wrapping at `MIN`.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.wrapping_abs())
    }

    /// Reports whether the value is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Fixed-point product.
    #[must_use]
    pub const fn fixed_mul(self, rhs: Self) -> Self {
        Self(((self.0 as i64 * rhs.0 as i64) >> FRACBITS) as i32)
    }

    /// Fixed-point quotient that saturates instead of overflowing.
    #[must_use]
    pub const fn fixed_div(self, rhs: Self) -> Self {
        if (self.0.wrapping_abs() >> 14) >= rhs.0.wrapping_abs() {
            if (self.0 ^ rhs.0) < 0 {
                Self::MIN
            } else {
                Self::MAX
            }
        } else {
            Self((((self.0 as i64) << FRACBITS) / rhs.0 as i64) as i32)
        }
    }

    /// Arithmetic right shift of the raw value.
    #[must_use]
    pub const fn shr(self, bits: u32) -> Self {
        Self(self.0 >> bits)
    }

    /// Wrapping left shift of the raw value.
    #[must_use]
    pub const fn shl(self, bits: u32) -> Self {
        Self(self.0.wrapping_shl(bits))
    }

    /// Clamps the value into `[-limit, limit]`.
    #[must_use]
    pub fn clamp_magnitude(self, limit: Self) -> Self {
        if self > limit {
            limit
        } else if self < -limit {
            -limit
        } else {
            self
        }
    }
}

impl Add for Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl Mul<i32> for Fixed {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self(self.0.wrapping_mul(rhs))
    }
}

impl Div<i32> for Fixed {
    type Output = Self;

    fn div(self, rhs: i32) -> Self {
        Self(self.0 / rhs)
    }
}

/// Binary angle measure: a full turn spans the whole `u32` range.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Angle(u32);

impl Angle {
    /// Facing east.
    pub const ZERO: Self = Self(0);
    /// One eighth of a turn.
    pub const ANG45: Self = Self(0x2000_0000);
    /// A quarter turn.
    pub const ANG90: Self = Self(0x4000_0000);
    /// A half turn.
    pub const ANG180: Self = Self(0x8000_0000);
    /// Three quarters of a turn.
    pub const ANG270: Self = Self(0xc000_0000);

    /// Wraps a raw binary angle.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw binary angle.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Interprets the angle as a signed quantity (used for pitch).
    #[must_use]
    pub const fn as_signed(self) -> i32 {
        self.0 as i32
    }

    /// Converts placement degrees, snapping down to the nearest 45° octant.
    #[must_use]
    pub const fn from_map_degrees(degrees: i16) -> Self {
        let octants = (degrees as i32 / 45) as u32;
        Self(Self::ANG45.0.wrapping_mul(octants))
    }

    /// Index into the fine trigonometry tables.
    #[must_use]
    pub const fn fine_index(self) -> usize {
        (self.0 >> ANGLETOFINESHIFT) as usize
    }

    /// Fixed-point sine.
    #[must_use]
    pub fn sin(self) -> Fixed {
        Fixed(fine_sine()[self.fine_index()])
    }

    /// Fixed-point cosine.
    #[must_use]
    pub fn cos(self) -> Fixed {
        Fixed(fine_sine()[self.fine_index() + FINEANGLES / 4])
    }

    /// Angle of the vector `(dx, dy)` measured counter-clockwise from east.
    #[must_use]
    pub fn point_to_angle(dx: Fixed, dy: Fixed) -> Self {
        if dx.is_zero() && dy.is_zero() {
            return Self::ZERO;
        }
        let (mut x, mut y) = (i64::from(dx.0) << FRACBITS, i64::from(dy.0) << FRACBITS);
        let mut base = Self::ZERO;
        while x <= 0 || y < 0 {
            (x, y) = (y, -x);
            base = base + Self::ANG90;
        }
        Self(base.0.wrapping_add(cordic_vector(x, y) as u32))
    }
}

impl Add for Angle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Angle {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

/// Vertical aim slope matching a free-look pitch (positive pitch looks down).
#[must_use]
pub fn pitch_slope(pitch: Angle) -> Fixed {
    let index = (FINEANGLES / 4) as i64 - i64::from(pitch.as_signed() >> ANGLETOFINESHIFT);
    let clamped = index.clamp(0, (FINEANGLES / 2 - 1) as i64) as usize;
    Fixed(fine_tangent()[clamped])
}

/// Octagonal distance approximation used for range checks.
#[must_use]
pub fn approx_distance(dx: Fixed, dy: Fixed) -> Fixed {
    let dx = dx.abs();
    let dy = dy.abs();
    if dx < dy {
        dx + dy - dx.shr(1)
    } else {
        dx + dy - dy.shr(1)
    }
}

/// Exact length of a three-dimensional vector, rounded down.
#[must_use]
pub fn vector_length(dx: Fixed, dy: Fixed, dz: Fixed) -> Fixed {
    let square = |value: Fixed| {
        let value = i128::from(value.0).unsigned_abs();
        value * value
    };
    let length = isqrt(square(dx) + square(dy) + square(dz));
    Fixed(i32::try_from(length).unwrap_or(i32::MAX))
}

fn isqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let mut x = 1_u128 << ((129 - value.leading_zeros()) / 2);
    loop {
        let y = (x + value / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// `atan(2^-i)` as binary angles.
const CORDIC_ATAN: [u32; 30] = [
    536_870_912,
    316_933_406,
    167_458_907,
    85_004_756,
    42_667_331,
    21_354_465,
    10_679_838,
    5_340_245,
    2_670_163,
    1_335_087,
    667_544,
    333_772,
    166_886,
    83_443,
    41_722,
    20_861,
    10_430,
    5_215,
    2_608,
    1_304,
    652,
    326,
    163,
    81,
    41,
    20,
    10,
    5,
    3,
    1,
];
/// Fractional bits of the CORDIC working values.
const CORDIC_BITS: u32 = 30;
/// Reciprocal of the CORDIC gain in 2.30 fixed point.
const CORDIC_GAIN: i64 = 652_032_874;

/// Cosine and sine of `angle` in 2.30 fixed point.
fn cordic_rotate(angle: u32) -> (i64, i64) {
    let mut z = i64::from(angle as i32);
    let (quarter, half) = (i64::from(Angle::ANG90.0), i64::from(Angle::ANG180.0));
    let flip = z > quarter || z < -quarter;
    if flip {
        z += if z > 0 { -half } else { half };
    }

    let (mut x, mut y) = (CORDIC_GAIN, 0_i64);
    for (shift, step) in CORDIC_ATAN.iter().enumerate() {
        let step = i64::from(*step);
        let (dx, dy) = (y >> shift, x >> shift);
        if z >= 0 {
            (x, y) = (x - dx, y + dy);
            z -= step;
        } else {
            (x, y) = (x + dx, y - dy);
            z += step;
        }
    }
    if flip {
        (-x, -y)
    } else {
        (x, y)
    }
}

/// Binary angle of `(x, y)` for `x > 0` and `y >= 0`.
fn cordic_vector(mut x: i64, mut y: i64) -> i64 {
    let mut z = 0_i64;
    for (shift, step) in CORDIC_ATAN.iter().enumerate() {
        if y == 0 {
            break;
        }
        let step = i64::from(*step);
        let (dx, dy) = (y >> shift, x >> shift);
        if y > 0 {
            (x, y) = (x + dx, y - dy);
            z += step;
        } else {
            (x, y) = (x - dx, y + dy);
            z -= step;
        }
    }
    z
}

fn to_fixed(value: i64) -> i32 {
    let shift = CORDIC_BITS - FRACBITS;
    let rounded = (value + (1 << (shift - 1))) >> shift;
    i32::try_from(rounded).unwrap_or(if rounded < 0 { i32::MIN } else { i32::MAX })
}

/// Binary angle at the middle of fine table slot `index`.
fn fine_angle(index: i64) -> u32 {
    ((index << ANGLETOFINESHIFT) + (1 << (ANGLETOFINESHIFT - 1))) as u32
}

fn fine_sine() -> &'static [i32] {
    static TABLE: OnceLock<Box<[i32]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        (0..(FINEANGLES * 5 / 4) as i64)
            .map(|index| to_fixed(cordic_rotate(fine_angle(index)).1))
            .collect()
    })
}

fn fine_tangent() -> &'static [i32] {
    static TABLE: OnceLock<Box<[i32]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        (0..(FINEANGLES / 2) as i64)
            .map(|index| {
                let (cos, sin) = cordic_rotate(fine_angle(index - (FINEANGLES / 4) as i64));
                to_fixed((sin << CORDIC_BITS) / cos)
            })
            .collect()
    })
}
