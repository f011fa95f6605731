//! Pure mixed-radix enumeration over the candidate search space.
//!
//! The digit vector assigns one version index per package. The first package
//! is the most significant digit and the last package the least significant,
//! so the counter rolls over like a vehicle odometer: `[0,0] -> [0,1] ->
//! [1,0] -> [1,1] -> exhausted` for two packages with two versions each.
//!
//! Everything here is a pure function of its inputs. That purity is what
//! makes resume-after-crash sound: the persisted ordinal alone reconstructs
//! the exact digit vector via [`ordinal_to_vector`], which is defined to
//! equal `ordinal` applications of [`increment`] to the zero vector (and is
//! computed in constant time as a direct mixed-radix decomposition).

/// The all-zero starting vector for a given shape.
pub fn initial(max_indices: &[usize]) -> Vec<usize> {
    vec![0; max_indices.len()]
}

/// Advances the digit vector by one step.
///
/// Scans from the last package backward, increments the first digit below
/// its maximum, and resets every digit after that position to zero. When
/// every digit is already at its maximum the vector is terminal:
/// `exhausted` is true and the returned vector is unchanged.
///
/// A package with a single version (max index 0) never varies but still
/// occupies its digit position.
pub fn increment(indices: &[usize], max_indices: &[usize]) -> (Vec<usize>, bool) {
    debug_assert_eq!(indices.len(), max_indices.len());

    let mut next = indices.to_vec();
    for position in (0..next.len()).rev() {
        if next[position] < max_indices[position] {
            next[position] += 1;
            for digit in &mut next[position + 1..] {
                *digit = 0;
            }
            return (next, false);
        }
    }
    (indices.to_vec(), true)
}

/// Reconstructs the digit vector for a given ordinal.
///
/// Equivalent to applying [`increment`] `ordinal` times to the zero vector,
/// computed directly: the last package is the least significant digit with
/// radix `max_indices[i] + 1`. Ordinals at or beyond the total combination
/// count do not occur in normal operation (the controller checks
/// [`total_combinations`] first); the decomposition simply wraps per digit.
pub fn ordinal_to_vector(ordinal: u128, max_indices: &[usize]) -> Vec<usize> {
    let mut vector = vec![0; max_indices.len()];
    let mut remaining = ordinal;
    for position in (0..max_indices.len()).rev() {
        let radix = max_indices[position] as u128 + 1;
        vector[position] = (remaining % radix) as usize;
        remaining /= radix;
    }
    vector
}

/// Total number of combinations: `prod(max_indices[i] + 1)`.
///
/// Returns `None` when the product overflows `u128` - the search space is
/// then astronomically large and callers fall back to attempt-count-only
/// progress reporting.
pub fn total_combinations(max_indices: &[usize]) -> Option<u128> {
    max_indices
        .iter()
        .try_fold(1u128, |acc, &max| acc.checked_mul(max as u128 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn enumeration_order_matches_odometer_rollover() {
        let max = vec![1, 1];
        let mut vector = initial(&max);
        assert_eq!(vector, vec![0, 0]);

        let expected = [vec![0, 1], vec![1, 0], vec![1, 1]];
        for step in &expected {
            let (next, exhausted) = increment(&vector, &max);
            assert!(!exhausted);
            assert_eq!(&next, step);
            vector = next;
        }

        let (terminal, exhausted) = increment(&vector, &max);
        assert!(exhausted);
        assert_eq!(terminal, vec![1, 1], "terminal vector is left unchanged");
    }

    #[test]
    fn totality_visits_every_combination_exactly_once() {
        let max = vec![2, 0, 3, 1];
        let total = total_combinations(&max).unwrap();

        let mut seen = HashSet::new();
        let mut vector = initial(&max);
        seen.insert(vector.clone());
        loop {
            let (next, exhausted) = increment(&vector, &max);
            if exhausted {
                break;
            }
            assert!(seen.insert(next.clone()), "vector repeated: {next:?}");
            vector = next;
        }
        assert_eq!(seen.len() as u128, total);
    }

    #[test]
    fn ordinal_decomposition_equals_repeated_increment() {
        let max = vec![2, 1, 3];
        let total = total_combinations(&max).unwrap();

        let mut vector = initial(&max);
        for ordinal in 0..total {
            assert_eq!(
                ordinal_to_vector(ordinal, &max),
                vector,
                "mismatch at ordinal {ordinal}"
            );
            let (next, exhausted) = increment(&vector, &max);
            assert_eq!(exhausted, ordinal == total - 1);
            vector = next;
        }
    }

    #[test]
    fn persisted_ordinal_two_reconstructs_third_combination() {
        // pkgA: ["2.0","1.0"], pkgB: ["1.1","1.0"] -> max_indices [1,1]
        assert_eq!(ordinal_to_vector(2, &[1, 1]), vec![1, 0]);
    }

    #[test]
    fn single_version_packages_exhaust_after_one_combination() {
        let max = vec![0, 0, 0];
        let vector = initial(&max);
        let (_, exhausted) = increment(&vector, &max);
        assert!(exhausted);
        assert_eq!(total_combinations(&max), Some(1));
    }

    #[test]
    fn zero_range_digit_never_varies_but_keeps_its_position() {
        let max = vec![1, 0, 1];
        let mut vector = initial(&max);
        loop {
            assert_eq!(vector[1], 0);
            let (next, exhausted) = increment(&vector, &max);
            if exhausted {
                break;
            }
            vector = next;
        }
    }

    #[test]
    fn total_overflows_to_none() {
        let max = vec![usize::MAX; 3];
        assert!(total_combinations(&max).is_none());
    }
}
