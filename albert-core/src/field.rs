//! Arithmetic in a small prime field.

use std::fmt;

/// Element of a prime field, always reduced.
#[must_use]
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct Scalar(u8);

impl Scalar {
    pub const ZERO: Scalar = Scalar(0);
    pub const ONE: Scalar = Scalar(1);

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("characteristic {0} does not fit in a byte")]
    TooLarge(u32),
    #[error("characteristic {0} is not prime")]
    NotPrime(u32),
}

/// `Z/pZ` for a prime `p < 256`.
#[derive(Debug, Clone)]
pub struct Field {
    prime: u8,
    inverses: Vec<u8>,
}

impl Default for Field {
    fn default() -> Self {
        Self::with_prime(Self::DEFAULT_PRIME)
    }
}

impl Field {
    pub const DEFAULT_PRIME: u8 = 251;

    pub fn new(prime: u32) -> Result<Self, FieldError> {
        let Ok(small) = u8::try_from(prime) else {
            return Err(FieldError::TooLarge(prime));
        };
        if !is_prime(small) {
            return Err(FieldError::NotPrime(prime));
        }
        Ok(Self::with_prime(small))
    }

    fn with_prime(prime: u8) -> Self {
        let p = u32::from(prime);
        // Fermat: x^(p-2) is the inverse of x.
        let inverses = (0..p)
            .map(|x| {
                if x == 0 {
                    return 0;
                }
                let mut acc = 1;
                for _ in 0..p - 2 {
                    acc = acc * x % p;
                }
                acc as u8
            })
            .collect();
        Self { prime, inverses }
    }

    #[must_use]
    pub fn prime(&self) -> u8 {
        self.prime
    }

    pub fn from_int(&self, x: i64) -> Scalar {
        Scalar(x.rem_euclid(i64::from(self.prime)) as u8)
    }
    pub fn add(&self, a: Scalar, b: Scalar) -> Scalar {
        Scalar(((u16::from(a.0) + u16::from(b.0)) % u16::from(self.prime)) as u8)
    }
    pub fn neg(&self, a: Scalar) -> Scalar {
        if a.is_zero() {
            a
        } else {
            Scalar(self.prime - a.0)
        }
    }
    pub fn sub(&self, a: Scalar, b: Scalar) -> Scalar {
        self.add(a, self.neg(b))
    }
    pub fn mul(&self, a: Scalar, b: Scalar) -> Scalar {
        Scalar(((u16::from(a.0) * u16::from(b.0)) % u16::from(self.prime)) as u8)
    }
    /// `None` for zero.
    #[must_use]
    pub fn inv(&self, a: Scalar) -> Option<Scalar> {
        (!a.is_zero()).then(|| Scalar(self.inverses[usize::from(a.0)]))
    }
}

fn is_prime(x: u8) -> bool {
    let x = u16::from(x);
    x >= 2 && (2..x).take_while(|d| d * d <= x).all(|d| x % d != 0)
}
