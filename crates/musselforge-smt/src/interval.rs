//! Closed real intervals with infinite endpoints.
//!
//! An interval with `lo > hi` is empty. Arithmetic is the usual interval
//! extension; operations on an empty operand yield an empty result.


use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub const ENTIRE: Interval = Interval {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    pub const EMPTY: Interval = Interval {
        lo: f64::INFINITY,
        hi: f64::NEG_INFINITY,
    };

    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn point(v: f64) -> Self {
        Self { lo: v, hi: v }
    }

    pub fn at_least(lo: f64) -> Self {
        Self::new(lo, f64::INFINITY)
    }

    pub fn at_most(hi: f64) -> Self {
        Self::new(f64::NEG_INFINITY, hi)
    }

    pub fn is_empty(&self) -> bool {
        !(self.lo <= self.hi)
    }

    pub fn is_point(&self) -> bool {
        self.lo == self.hi
    }

    pub fn is_bounded(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite()
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.hi - self.lo
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }

    /// `v` moved to the nearest point of the interval; unchanged when empty.
    pub fn confine(&self, v: f64) -> f64 {
        if self.is_empty() {
            v
        } else {
            v.min(self.hi).max(self.lo)
        }
    }

    /// Intersection, snapping a crossing within `tol` to a point of `self`.
    pub fn intersect(&self, other: &Interval, tol: f64) -> Interval {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lo > hi && lo - hi <= tol * (1.0 + lo.abs().max(hi.abs())) {
            let at = if lo.is_finite() { lo } else { hi };
            return Interval::point(self.confine(at));
        }
        Interval::new(lo, hi)
    }

    pub fn hull(&self, other: &Interval) -> Interval {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Interval::new(self.lo.min(other.lo), self.hi.max(other.hi))
    }

    /// A representative point: the midpoint of a bounded interval, the
    /// finite endpoint of a half-line, or zero.
    pub fn midpoint(&self) -> f64 {
        match (self.lo.is_finite(), self.hi.is_finite()) {
            (true, true) => self.lo + (self.hi - self.lo) / 2.0,
            (true, false) => self.lo,
            (false, true) => self.hi,
            (false, false) => 0.0,
        }
    }

    pub fn add(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(self.lo + other.lo, self.hi + other.hi)
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(self.lo - other.hi, self.hi - other.lo)
    }

    pub fn neg(&self) -> Interval {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(-self.hi, -self.lo)
    }

    pub fn mul(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::EMPTY;
        }
        let products = [
            mul_bound(self.lo, other.lo),
            mul_bound(self.lo, other.hi),
            mul_bound(self.hi, other.lo),
            mul_bound(self.hi, other.hi),
        ];
        let lo = products.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = products.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Interval::new(lo, hi)
    }

    /// Division; a divisor straddling zero gives the whole line.
    pub fn div(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::EMPTY;
        }
        if other.contains(0.0) {
            if other.is_point() {
                return Interval::EMPTY;
            }
            return Interval::ENTIRE;
        }
        self.mul(&Interval::new(1.0 / other.hi, 1.0 / other.lo))
    }

    /// Square root of the non-negative part.
    pub fn sqrt(&self) -> Interval {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(self.lo.max(0.0).sqrt(), self.hi.max(0.0).sqrt())
    }

    pub fn floor(&self) -> Interval {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(self.lo.floor(), self.hi.floor())
    }

    pub fn min(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(self.lo.min(other.lo), self.hi.min(other.hi))
    }

    pub fn max(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(self.lo.max(other.lo), self.hi.max(other.hi))
    }

    /// Shrinks to the integers inside, tolerating `tol` of float noise.
    pub fn to_integers(&self, tol: f64) -> Interval {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new((self.lo - tol).ceil(), (self.hi + tol).floor())
    }
}

// 0 * inf counts as 0 so half-lines multiply sensibly.
fn mul_bound(a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 {
        0.0
    } else {
        a * b
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("[]")
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}
