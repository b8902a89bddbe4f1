use num_integer::Integer;
use strength_reduce::StrengthReducedUsize;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct PrimeFactor {
    pub value: usize,
    pub count: usize,
}

/// Factors an integer into its prime factors.
pub fn prime_factors(mut n: usize) -> Vec<PrimeFactor> {
    let mut result = Vec::new();

    let trailing_zeros = n.trailing_zeros();
    if n > 0 && trailing_zeros > 0 {
        result.push(PrimeFactor {
            value: 2,
            count: trailing_zeros as usize,
        });
        n >>= trailing_zeros;
    }
    if n > 1 {
        let mut divisor = 3;
        let mut limit = (n as f32).sqrt() as usize + 1;
        while divisor < limit {
            let mut count = 0;
            while n % divisor == 0 {
                n /= divisor;
                count += 1;
            }

            if count > 0 {
                result.push(PrimeFactor {
                    value: divisor,
                    count,
                });
            }

            // recalculate the limit to reduce the amount of other factors we need to check
            limit = (n as f32).sqrt() as usize + 1;
            divisor += 2;
        }

        if n > 1 {
            result.push(PrimeFactor { value: n, count: 1 });
        }
    }

    result
}

/// Returns true if every prime factor of `len` is 2, 3 or 5, IE if the mixed-radix engine can schedule it.
///
/// 1 counts as highly composite (it has no prime factors at all), 0 doesn't.
pub fn is_highly_composite(len: usize) -> bool {
    len > 0
        && prime_factors(len)
            .iter()
            .all(|factor| factor.value <= 5)
}

/// Returns the bit-reversal permutation of `0..len`, or None if `len` isn't a power of two.
///
/// The result is an involution: `perm[perm[i]] == i` for all `i`.
pub fn bit_reversal(len: usize) -> Option<Vec<usize>> {
    if !len.is_power_of_two() {
        return None;
    }
    if len == 1 {
        return Some(vec![0]);
    }

    let shift = usize::BITS - len.trailing_zeros();
    Some((0..len).map(|i| i.reverse_bits() >> shift).collect())
}

/// Returns the permutation of `0..len` that reverses the base-`radix` digits of each index,
/// or None if `len` isn't an exact power of `radix`.
///
/// With `radix == 2` this is the same table as [`bit_reversal`].
pub fn digit_reversal(len: usize, radix: usize) -> Option<Vec<usize>> {
    if len == 0 || radix < 2 {
        return None;
    }

    let mut num_digits = 0;
    let mut remaining = len;
    while remaining > 1 {
        let (quotient, remainder) = remaining.div_rem(&radix);
        if remainder != 0 {
            return None;
        }
        remaining = quotient;
        num_digits += 1;
    }

    let reducer = StrengthReducedUsize::new(radix);
    let table = (0..len)
        .map(|index| {
            let mut source = index;
            let mut reversed = 0;
            for _ in 0..num_digits {
                let (quotient, digit) = StrengthReducedUsize::div_rem(source, reducer);
                reversed = reversed * radix + digit;
                source = quotient;
            }
            reversed
        })
        .collect();
    Some(table)
}

/// Computes where flat index `index` lands in the natural layout of a mixed-radix decomposition of `len`.
///
/// The digits of `index` are extracted least significant first under the given `radices`, and digit `i` is
/// weighted by the span of stage `i`, IE `len / (radices[0] * ... * radices[i])`.
///
/// For `len = 6, radices = [3, 2]` this produces the layout `[0, 2, 4, 1, 3, 5]`.
pub fn mixed_radix_permutation(index: usize, len: usize, radices: &[usize]) -> usize {
    let mut remaining = index;
    let mut span = len;
    let mut result = 0;
    for &radix in radices {
        let (quotient, digit) = remaining.div_rem(&radix);
        span /= radix;
        result += digit * span;
        remaining = quotient;
    }
    result
}

/// Builds the full [`mixed_radix_permutation`] table for `len`. The product of `radices` must equal `len`.
pub fn mixed_radix_permutation_table(len: usize, radices: &[usize]) -> Vec<usize> {
    debug_assert_eq!(radices.iter().product::<usize>(), len);

    // precompute divisors and stage spans once so the per-index loop does no hardware division
    let reducers: Vec<(StrengthReducedUsize, usize)> = radices
        .iter()
        .scan(len, |span, &radix| {
            *span /= radix;
            Some((StrengthReducedUsize::new(radix), *span))
        })
        .collect();

    (0..len)
        .map(|index| {
            let mut remaining = index;
            let mut result = 0;
            for &(reducer, span) in &reducers {
                let (quotient, digit) = StrengthReducedUsize::div_rem(remaining, reducer);
                result += digit * span;
                remaining = quotient;
            }
            result
        })
        .collect()
}
