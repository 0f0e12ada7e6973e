//! The catalog of Gauss-integral invariants and the degree selector.
//!
//! Every invariant of order `2k` is a sum over ordered index tuples
//! `a_1 < a_2 < ... < a_2k` of a product of `k` writhe terms `w(a_u, a_v)`;
//! the pairing `(u, v)` of the positions is what tells the invariants apart.
//! `I1324`, for instance, is `Σ w(a_1, a_3) · w(a_2, a_4)`.
//!
//! Most tables hold the invariant of the sub-chain `[i, j]`: every index
//! lies in `[i, j]`. The two end-anchored tables `I1234Tail` and
//! `I1324Tail` instead confine only the pair that holds position 1 to
//! `[i, j]`; the remaining indices run up to the last segment `N = L-1`.
//! Both agree with their sub-chain counterparts on the whole chain `(0, N)`.

use core::fmt;
use core::str::FromStr;

use gisa_core::{GisaError, Result};

/// How many invariant families to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Degree {
    /// Pairwise writhe table only.
    Zero,
    /// Adds `I12`.
    Two,
    /// Adds the three order-4 invariants and the two end-anchored tables.
    Four,
    /// Adds the fifteen order-6 invariants.
    Six,
}

impl Degree {
    /// Numeric value (0, 2, 4 or 6).
    pub fn value(self) -> u32 {
        match self {
            Degree::Zero => 0,
            Degree::Two => 2,
            Degree::Four => 4,
            Degree::Six => 6,
        }
    }

    /// Whether tables of this degree include `invariant`.
    pub fn includes(self, invariant: Invariant) -> bool {
        invariant.order() <= self.value()
    }

    /// The invariants computed at this degree, in catalog order.
    pub fn invariants(self) -> impl Iterator<Item = Invariant> {
        Invariant::ALL.into_iter().filter(move |inv| self.includes(*inv))
    }
}

impl TryFrom<u32> for Degree {
    type Error = GisaError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Degree::Zero),
            2 => Ok(Degree::Two),
            4 => Ok(Degree::Four),
            6 => Ok(Degree::Six),
            other => Err(GisaError::InvalidInput(format!(
                "degree must be one of 0, 2, 4, 6, got {other}"
            ))),
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// One named table of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Invariant {
    /// Raw pairwise writhe `w(i, j)`.
    W,
    I12,
    I1234,
    I1324,
    I1423,
    /// `I1234` with `a_1, a_2` in `[i, j]` and `a_3, a_4` up to the chain end.
    I1234Tail,
    /// `I1324` with `a_1, a_3` in `[i, j]` and `a_4` up to the chain end.
    I1324Tail,
    I123456,
    I123546,
    I123645,
    I132456,
    I132546,
    I132645,
    I142356,
    I142536,
    I142635,
    I152346,
    I152436,
    I152634,
    I162345,
    I162435,
    I162534,
}

impl Invariant {
    /// Number of catalog members.
    pub const COUNT: usize = 22;

    /// All members in catalog order (`W`, order 2, order 4, end-anchored
    /// order 4, order 6).
    pub const ALL: [Invariant; Invariant::COUNT] = [
        Invariant::W,
        Invariant::I12,
        Invariant::I1234,
        Invariant::I1324,
        Invariant::I1423,
        Invariant::I1234Tail,
        Invariant::I1324Tail,
        Invariant::I123456,
        Invariant::I123546,
        Invariant::I123645,
        Invariant::I132456,
        Invariant::I132546,
        Invariant::I132645,
        Invariant::I142356,
        Invariant::I142536,
        Invariant::I142635,
        Invariant::I152346,
        Invariant::I152436,
        Invariant::I152634,
        Invariant::I162345,
        Invariant::I162435,
        Invariant::I162534,
    ];

    /// Position in [`Invariant::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog name, e.g. `"I1324"`.
    pub fn name(self) -> &'static str {
        match self {
            Invariant::W => "w",
            Invariant::I12 => "I12",
            Invariant::I1234 => "I1234",
            Invariant::I1324 => "I1324",
            Invariant::I1423 => "I1423",
            Invariant::I1234Tail => "I1234_tail",
            Invariant::I1324Tail => "I1324_tail",
            Invariant::I123456 => "I123456",
            Invariant::I123546 => "I123546",
            Invariant::I123645 => "I123645",
            Invariant::I132456 => "I132456",
            Invariant::I132546 => "I132546",
            Invariant::I132645 => "I132645",
            Invariant::I142356 => "I142356",
            Invariant::I142536 => "I142536",
            Invariant::I142635 => "I142635",
            Invariant::I152346 => "I152346",
            Invariant::I152436 => "I152436",
            Invariant::I152634 => "I152634",
            Invariant::I162345 => "I162345",
            Invariant::I162435 => "I162435",
            Invariant::I162534 => "I162534",
        }
    }

    /// Order of the invariant: 0 for `W`, otherwise twice the number of pairs.
    pub fn order(self) -> u32 {
        match self {
            Invariant::W => 0,
            other => 2 * other.pairs().len() as u32,
        }
    }

    /// Position pairing (1-based). Empty for `W`.
    pub fn pairs(self) -> &'static [(usize, usize)] {
        match self {
            Invariant::W => &[],
            Invariant::I12 => &[(1, 2)],
            Invariant::I1234 | Invariant::I1234Tail => &[(1, 2), (3, 4)],
            Invariant::I1324 | Invariant::I1324Tail => &[(1, 3), (2, 4)],
            Invariant::I1423 => &[(1, 4), (2, 3)],
            Invariant::I123456 => &[(1, 2), (3, 4), (5, 6)],
            Invariant::I123546 => &[(1, 2), (3, 5), (4, 6)],
            Invariant::I123645 => &[(1, 2), (3, 6), (4, 5)],
            Invariant::I132456 => &[(1, 3), (2, 4), (5, 6)],
            Invariant::I132546 => &[(1, 3), (2, 5), (4, 6)],
            Invariant::I132645 => &[(1, 3), (2, 6), (4, 5)],
            Invariant::I142356 => &[(1, 4), (2, 3), (5, 6)],
            Invariant::I142536 => &[(1, 4), (2, 5), (3, 6)],
            Invariant::I142635 => &[(1, 4), (2, 6), (3, 5)],
            Invariant::I152346 => &[(1, 5), (2, 3), (4, 6)],
            Invariant::I152436 => &[(1, 5), (2, 4), (3, 6)],
            Invariant::I152634 => &[(1, 5), (2, 6), (3, 4)],
            Invariant::I162345 => &[(1, 6), (2, 3), (4, 5)],
            Invariant::I162435 => &[(1, 6), (2, 4), (3, 5)],
            Invariant::I162534 => &[(1, 6), (2, 5), (3, 4)],
        }
    }

    /// Partner of `position` in the pairing, if any.
    pub fn partner(self, position: usize) -> Option<usize> {
        self.pairs().iter().find_map(|&(u, v)| {
            if u == position {
                Some(v)
            } else if v == position {
                Some(u)
            } else {
                None
            }
        })
    }

    /// For end-anchored tables, the sub-chain invariant with the same pairing.
    pub fn anchored_base(self) -> Option<Invariant> {
        match self {
            Invariant::I1234Tail => Some(Invariant::I1234),
            Invariant::I1324Tail => Some(Invariant::I1324),
            _ => None,
        }
    }

    /// Whether only the pair holding position 1 is confined to `[i, j]`.
    pub fn is_end_anchored(self) -> bool {
        self.anchored_base().is_some()
    }

    /// For order-6 invariants whose first and last positions are paired,
    /// the order-4 invariant formed by the four inner positions.
    pub fn nested_inner(self) -> Option<Invariant> {
        match self {
            Invariant::I162345 => Some(Invariant::I1234),
            Invariant::I162435 => Some(Invariant::I1324),
            Invariant::I162534 => Some(Invariant::I1423),
            _ => None,
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Invariant {
    type Err = GisaError;

    fn from_str(s: &str) -> Result<Self> {
        Invariant::ALL
            .into_iter()
            .find(|inv| inv.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| GisaError::InvalidInput(format!("unknown invariant '{s}'")))
    }
}
