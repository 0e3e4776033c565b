// RSA Big Integer Operations
// Modular arithmetic over num-bigint: primality, exponentiation, inverses, totients

use std::collections::BTreeMap;

use log::debug;
use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::{thread_rng, Rng};

use crate::error::{Result, RsaError};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Witness rounds used by `is_prime`.
pub const MILLER_RABIN_ROUNDS: u32 = 20;

/// Divisors below this bound are removed by trial division before Pollard rho.
const TRIAL_DIVISION_LIMIT: u32 = 1000;

/// Random restarts of Pollard rho before a cofactor is declared unfactorable.
const RHO_ATTEMPTS: usize = 64;

/// Block size for the batched gcd in Brent's variant.
const RHO_BATCH: usize = 128;

/// Iterations Pollard rho may spend on one cofactor, across all restarts.
/// Expected cost is about sqrt(p) for the smallest factor p, so this covers
/// factors up to roughly 40 bits.
pub const RHO_MAX_STEPS: usize = 1 << 22;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Parse a non-negative decimal integer.
///
/// Signed input is rejected with `NegativeInput` so that callers reading user
/// text keep the "inputs must be non-negative" contract.
pub fn parse_biguint(text: &str) -> Result<RsaBigInt> {
    let trimmed = text.trim();
    if trimmed.starts_with('-') {
        return Err(RsaError::NegativeInput(trimmed.to_string()));
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RsaError::InvalidNumber(trimmed.to_string()));
    }
    RsaBigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| RsaError::InvalidNumber(trimmed.to_string()))
}

/// Number of digits in the decimal representation (`0` has one digit).
pub fn decimal_digits(n: &RsaBigInt) -> u32 {
    n.to_str_radix(10).len() as u32
}

/// 10^exp
pub fn pow10(exp: u32) -> RsaBigInt {
    RsaBigInt::from(10u8).pow(exp)
}

/// Modular exponentiation: base^exp mod modulus
/// Uses square-and-multiply algorithm
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> Result<RsaBigInt> {
    if modulus.is_zero() {
        return Err(RsaError::ZeroModulus);
    }
    if modulus.is_one() {
        return Ok(RsaBigInt::zero());
    }

    let mut result = RsaBigInt::one();
    let mut base = base % modulus;
    let mut exp = exp.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    Ok(result)
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x, y) such that a*x + b*y = gcd = gcd(a, b)
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Compute modular inverse: a^(-1) mod m, in [0, m)
/// Fails with `NoInverse` when gcd(a, m) != 1
pub fn mod_inverse(a: &RsaBigInt, m: &RsaBigInt) -> Result<RsaBigInt> {
    if m.is_zero() {
        return Err(RsaError::ZeroModulus);
    }

    let signed_a = BigInt::from_biguint(Sign::Plus, a.clone());
    let signed_m = BigInt::from_biguint(Sign::Plus, m.clone());
    let (gcd, x, _) = extended_gcd(&signed_a, &signed_m);

    if !gcd.is_one() {
        return Err(RsaError::NoInverse {
            value: a.clone(),
            modulus: m.clone(),
        });
    }

    // mod_floor keeps the representative non-negative
    x.mod_floor(&signed_m)
        .to_biguint()
        .ok_or_else(|| RsaError::NoInverse {
            value: a.clone(),
            modulus: m.clone(),
        })
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// gcd(a, b) == 1
pub fn are_coprime(a: &RsaBigInt, b: &RsaBigInt) -> bool {
    gcd(a, b).is_one()
}

/// Primality test used throughout key generation.
///
/// Small values are settled by trial division against the primes below 100;
/// everything else goes through `MILLER_RABIN_ROUNDS` random witnesses. A
/// prime is never rejected; a composite slips through with probability at
/// most 4^-rounds.
pub fn is_prime(n: &RsaBigInt) -> bool {
    is_probable_prime(n, MILLER_RABIN_ROUNDS)
}

/// Miller-Rabin primality test
/// Returns true if n is probably prime
pub fn is_probable_prime(n: &RsaBigInt, iterations: u32) -> bool {
    is_probable_prime_with_rng(n, iterations, &mut thread_rng())
}

/// Miller-Rabin with a caller-supplied witness source.
pub fn is_probable_prime_with_rng<R: Rng + ?Sized>(
    n: &RsaBigInt,
    iterations: u32,
    rng: &mut R,
) -> bool {
    let two = RsaBigInt::from(2u8);
    if n < &two {
        return false;
    }
    for &p in SMALL_PRIMES.iter() {
        let p = RsaBigInt::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    'witness: for _ in 0..iterations {
        // Pick random witness a in [2, n-1)
        let a = rng.gen_biguint_range(&two, &n_minus_one);

        // n > 97 here, so the modulus is never zero
        let mut x = match mod_pow(&a, &d, n) {
            Ok(x) => x,
            Err(_) => return false,
        };

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return false;
    }

    // Probably prime
    true
}

/// Prime factorisation as (prime, exponent) pairs in ascending order.
pub fn factorize(n: &RsaBigInt) -> Result<Vec<(RsaBigInt, u32)>> {
    factorize_with_rng(n, &mut thread_rng())
}

/// `factorize` with a caller-supplied source for the rho parameters.
pub fn factorize_with_rng<R: Rng + ?Sized>(
    n: &RsaBigInt,
    rng: &mut R,
) -> Result<Vec<(RsaBigInt, u32)>> {
    factorize_within(n, RHO_MAX_STEPS, rng)
}

fn factorize_within<R: Rng + ?Sized>(
    n: &RsaBigInt,
    max_steps: usize,
    rng: &mut R,
) -> Result<Vec<(RsaBigInt, u32)>> {
    if n.is_zero() {
        return Err(RsaError::ZeroModulus);
    }

    let mut factors: BTreeMap<RsaBigInt, u32> = BTreeMap::new();
    let mut rest = n.clone();

    for divisor in 2..TRIAL_DIVISION_LIMIT {
        let divisor = RsaBigInt::from(divisor);
        while (&rest % &divisor).is_zero() {
            rest /= &divisor;
            *factors.entry(divisor.clone()).or_insert(0) += 1;
        }
        if rest.is_one() {
            break;
        }
    }

    let mut pending = vec![rest];
    while let Some(m) = pending.pop() {
        if m.is_one() {
            continue;
        }
        if is_prime(&m) {
            *factors.entry(m).or_insert(0) += 1;
            continue;
        }
        debug!("pollard rho on {}-bit cofactor", m.bits());
        let divisor =
            pollard_brent(&m, max_steps, rng).ok_or_else(|| RsaError::FactorizationFailed(m.clone()))?;
        pending.push(&m / &divisor);
        pending.push(divisor);
    }

    Ok(factors.into_iter().collect())
}

/// Euler's totient, computed by factoring `n`.
///
/// For an RSA modulus `p*q` this is `(p-1)*(q-1)`. Only tractable because
/// the moduli used here are deliberately small.
pub fn euler_totient(n: &RsaBigInt) -> Result<RsaBigInt> {
    let factors = factorize(n)?;
    let mut phi = RsaBigInt::one();
    for (p, k) in factors {
        phi *= p.pow(k - 1) * (&p - 1u8);
    }
    Ok(phi)
}

/// Brent's variant of Pollard's rho. Returns a proper divisor of odd composite `n`,
/// or `None` once `max_steps` iterations have been spent without one.
fn pollard_brent<R: Rng + ?Sized>(n: &RsaBigInt, max_steps: usize, rng: &mut R) -> Option<RsaBigInt> {
    if n.is_even() {
        return Some(RsaBigInt::from(2u8));
    }
    let one = RsaBigInt::one();
    let step = |y: &RsaBigInt, c: &RsaBigInt| (y * y + c) % n;
    let distance = |a: &RsaBigInt, b: &RsaBigInt| if a > b { a - b } else { b - a };
    let mut steps = 0usize;

    for _ in 0..RHO_ATTEMPTS {
        let c = rng.gen_biguint_range(&one, n);
        let mut y = rng.gen_biguint_range(&one, n);
        let mut x = y.clone();
        let mut ys = y.clone();
        let mut q = one.clone();
        let mut g = one.clone();
        let mut r = 1usize;

        while g.is_one() {
            // checked once per doubling round
            if steps >= max_steps {
                debug!("pollard rho gave up after {} steps", steps);
                return None;
            }
            x = y.clone();
            for _ in 0..r {
                y = step(&y, &c);
            }
            steps += r;
            let mut k = 0;
            while k < r && g.is_one() {
                ys = y.clone();
                let batch = RHO_BATCH.min(r - k);
                for _ in 0..batch {
                    y = step(&y, &c);
                    q = (&q * distance(&x, &y)) % n;
                }
                steps += batch;
                g = q.gcd(n);
                k += RHO_BATCH;
            }
            r *= 2;
        }

        if &g == n {
            // batch overshot; replay one step at a time
            loop {
                ys = step(&ys, &c);
                g = distance(&x, &ys).gcd(n);
                if !g.is_one() {
                    break;
                }
            }
        }

        if &g != n {
            return Some(g);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mod_pow() {
        // 'H' under the 101 * 103 key
        let n = from_u64(10403);
        let c = mod_pow(&from_u64(72), &from_u64(7), &n).unwrap();
        assert_eq!(c, from_u64(9439));
        assert_eq!(mod_pow(&c, &from_u64(8743), &n).unwrap(), from_u64(72));
    }

    #[test]
    fn test_mod_pow_edge_moduli() {
        assert_eq!(
            mod_pow(&from_u64(3), &from_u64(5), &from_u64(0)),
            Err(RsaError::ZeroModulus)
        );
        assert_eq!(mod_pow(&from_u64(3), &from_u64(5), &from_u64(1)).unwrap(), from_u64(0));
        // x^0 = 1
        assert_eq!(mod_pow(&from_u64(9), &from_u64(0), &from_u64(10)).unwrap(), from_u64(1));
    }

    #[test]
    fn test_mod_inverse() {
        // private exponent for e = 7, phi = 100 * 102
        let phi = from_u64(10200);
        let d = mod_inverse(&from_u64(7), &phi).unwrap();
        assert_eq!(d, from_u64(8743));
        assert!((from_u64(7) * d % phi).is_one());
    }

    #[test]
    fn test_mod_inverse_negative_coefficient() {
        // 7 * x ≡ 1 mod 40 -> x = 23, Euclid yields -17 first
        assert_eq!(mod_inverse(&from_u64(7), &from_u64(40)).unwrap(), from_u64(23));
    }

    #[test]
    fn test_mod_inverse_missing() {
        let result = mod_inverse(&from_u64(6), &from_u64(9));
        assert_eq!(
            result,
            Err(RsaError::NoInverse {
                value: from_u64(6),
                modulus: from_u64(9)
            })
        );
        assert!(mod_inverse(&from_u64(4), &from_u64(0)).is_err());
    }

    #[test]
    fn test_extended_gcd() {
        let (g, x, y) = extended_gcd(&BigInt::from(240), &BigInt::from(46));
        assert_eq!(g, BigInt::from(2));
        assert_eq!(BigInt::from(240) * x + BigInt::from(46) * y, BigInt::from(2));
    }

    #[test]
    fn test_are_coprime() {
        assert!(are_coprime(&from_u64(8), &from_u64(15)));
        assert!(!are_coprime(&from_u64(12), &from_u64(18)));
    }

    #[test]
    fn test_is_probable_prime() {
        let mut rng = StdRng::seed_from_u64(3);
        for p in [2u64, 97, 101, 103, 1_000_003] {
            assert!(is_probable_prime_with_rng(&from_u64(p), 1, &mut rng), "{}", p);
        }
        // 101 * 103 and 1009 * 1013 both pass the small prime sieve
        for n in [10403u64, 1_022_117] {
            assert!(!is_probable_prime_with_rng(&from_u64(n), 5, &mut rng), "{}", n);
        }
    }

    #[test]
    fn test_is_prime_larger_values() {
        assert!(is_prime(&from_u64(10007)));
        assert!(is_prime(&from_u64(18446744073709551557))); // largest 64-bit prime
        assert!(!is_prime(&from_u64(10403))); // 101 * 103
        assert!(!is_prime(&from_u64(561))); // Carmichael
        assert!(!is_prime(&from_u64(0)));
        assert!(!is_prime(&from_u64(1)));
    }

    #[test]
    fn test_parse_biguint() {
        assert_eq!(parse_biguint(" 10403 ").unwrap(), from_u64(10403));
        assert_eq!(parse_biguint("+7").unwrap(), from_u64(7));
        assert!(matches!(parse_biguint("-5"), Err(RsaError::NegativeInput(_))));
        assert!(matches!(parse_biguint("12a"), Err(RsaError::InvalidNumber(_))));
        assert!(matches!(parse_biguint(""), Err(RsaError::InvalidNumber(_))));
    }

    #[test]
    fn test_decimal_digits() {
        assert_eq!(decimal_digits(&from_u64(0)), 1);
        assert_eq!(decimal_digits(&from_u64(9)), 1);
        assert_eq!(decimal_digits(&from_u64(10)), 2);
        assert_eq!(decimal_digits(&from_u64(10403)), 5);
        assert_eq!(pow10(3), from_u64(1000));
    }

    #[test]
    fn test_factorize() {
        let mut rng = StdRng::seed_from_u64(7);
        let factors = factorize_with_rng(&from_u64(360), &mut rng).unwrap();
        assert_eq!(
            factors,
            vec![(from_u64(2), 3), (from_u64(3), 2), (from_u64(5), 1)]
        );
        assert!(factorize(&from_u64(1)).unwrap().is_empty());
        assert_eq!(factorize(&from_u64(0)), Err(RsaError::ZeroModulus));
    }

    #[test]
    fn test_factorize_needs_rho() {
        // both factors are above the trial division bound
        let p = from_u64(1_000_003);
        let q = from_u64(998_244_353);
        let mut rng = StdRng::seed_from_u64(11);
        let factors = factorize_with_rng(&(&p * &q), &mut rng).unwrap();
        assert_eq!(factors, vec![(p, 1), (q, 1)]);
    }

    #[test]
    fn test_factorize_gives_up_past_step_budget() {
        // two 66-bit primes: far more rho steps than the budget allows
        let p: RsaBigInt = "36893488147419103363".parse().unwrap();
        let q: RsaBigInt = "36893488147419103397".parse().unwrap();
        let n = &p * &q;
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            factorize_within(&n, 1 << 12, &mut rng),
            Err(RsaError::FactorizationFailed(n.clone()))
        );
    }

    #[test]
    fn test_euler_totient() {
        assert_eq!(euler_totient(&from_u64(10403)).unwrap(), from_u64(100 * 102));
        assert_eq!(euler_totient(&from_u64(1)).unwrap(), from_u64(1));
        assert_eq!(euler_totient(&from_u64(13)).unwrap(), from_u64(12));
        // 2^3 * 3^2 -> 4 * 6
        assert_eq!(euler_totient(&from_u64(72)).unwrap(), from_u64(24));
        let n = from_u64(4_294_967_311) * from_u64(4_294_967_357);
        assert_eq!(
            euler_totient(&n).unwrap(),
            from_u64(4_294_967_310) * from_u64(4_294_967_356)
        );
    }
}
