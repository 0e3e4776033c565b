// Prime Generation
// Random primes inside an integer interval

use log::debug;
use num_bigint::RandBigInt;
use num_traits::{One, Zero};
use rand::{thread_rng, Rng};

use super::bigint::{is_prime, RsaBigInt};
use crate::error::{Result, RsaError};

/// Smallest prime strictly greater than `n`.
pub fn next_prime(n: &RsaBigInt) -> RsaBigInt {
    let mut candidate = n + 1u8;
    while !is_prime(&candidate) {
        candidate += 1u8;
    }
    candidate
}

/// Largest prime strictly smaller than `n`, or `None` when `n <= 2`.
pub fn previous_prime(n: &RsaBigInt) -> Option<RsaBigInt> {
    if n <= &RsaBigInt::from(2u8) {
        return None;
    }
    let mut candidate = n - 1u8;
    while !is_prime(&candidate) {
        candidate -= 1u8;
    }
    Some(candidate)
}

/// Generate `count` distinct random primes in `[min, max)`.
pub fn generate_primes(min: &RsaBigInt, max: &RsaBigInt, count: usize) -> Result<Vec<RsaBigInt>> {
    generate_primes_with_rng(min, max, count, &mut thread_rng())
}

/// Generate `count` distinct primes in `[min, max)` from the given RNG.
///
/// Each prime starts from a random seed in `[min - 1, max]` and walks up to
/// the next unused prime. If that walk leaves the interval, the search
/// restarts downward from `max`, again skipping primes already taken. The
/// result keeps seed order.
pub fn generate_primes_with_rng<R: Rng + ?Sized>(
    min: &RsaBigInt,
    max: &RsaBigInt,
    count: usize,
    rng: &mut R,
) -> Result<Vec<RsaBigInt>> {
    if count < 1 {
        return Err(RsaError::InvalidCount);
    }
    if min > max {
        return Err(RsaError::InvalidRange {
            min: min.clone(),
            max: max.clone(),
        });
    }

    let seed_low = if min.is_zero() {
        RsaBigInt::zero()
    } else {
        min - RsaBigInt::one()
    };
    let seed_high = max + 1u8;
    let seeds: Vec<RsaBigInt> = (0..count)
        .map(|_| rng.gen_biguint_range(&seed_low, &seed_high))
        .collect();

    primes_from_seeds(min, max, seeds)
}

/// Turn each seed into a distinct prime in `[min, max)`, in seed order.
fn primes_from_seeds(min: &RsaBigInt, max: &RsaBigInt, seeds: Vec<RsaBigInt>) -> Result<Vec<RsaBigInt>> {
    let mut primes: Vec<RsaBigInt> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let mut prime = next_prime(&seed);
        while primes.contains(&prime) {
            prime = next_prime(&prime);
        }

        let prime = if &prime >= max {
            let mut lower = previous_prime(max);
            while let Some(p) = lower.as_ref().filter(|p| primes.contains(*p)) {
                lower = previous_prime(p);
            }
            lower
        } else {
            Some(prime)
        };

        match prime {
            Some(p) if &p >= min => {
                debug!("picked {}-bit prime from seed", p.bits());
                primes.push(p);
            }
            _ => {
                return Err(RsaError::NoPrimeInRange {
                    min: min.clone(),
                    max: max.clone(),
                })
            }
        }
    }

    Ok(primes)
}
