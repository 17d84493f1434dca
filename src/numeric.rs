//! Small numeric helpers shared by the economic and military models.

use rand::Rng;

/// CES combination of land and labor units with substitution exponent -1/2:
/// `base · (land^-½ + labor^-½)^-2`. Zero on either input yields zero.
pub fn ces_output(base: f64, land_units: f64, labor_units: f64) -> f64 {
    if base <= 0.0 || land_units <= 0.0 || labor_units <= 0.0 {
        return 0.0;
    }
    let denom = land_units.powf(-0.5) + labor_units.powf(-0.5);
    base * denom.powi(-2)
}

/// Same function with land unbounded, which reduces to `base · labor`.
pub fn labor_only_output(base: f64, labor_units: f64) -> f64 {
    if base <= 0.0 || labor_units <= 0.0 {
        return 0.0;
    }
    base * labor_units
}

/// `Π x_i^w_i` over the given pairs. Any weighted entry at or below zero
/// collapses the mean to zero; zero weights are ignored.
pub fn weighted_geometric_mean(terms: &[(f64, f64)]) -> f64 {
    let mut log_sum = 0.0;
    for &(value, weight) in terms {
        if weight <= 0.0 {
            continue;
        }
        if value <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        log_sum += weight * value.ln();
    }
    log_sum.exp()
}

/// Forward finite difference `(f(x + h) - f(x)) / h`.
pub fn forward_difference(f: impl Fn(f64) -> f64, x: f64, h: f64) -> f64 {
    (f(x + h) - f(x)) / h
}

/// Uniform draw in `[low, high]`. A degenerate range returns `low` without
/// consuming randomness.
pub fn uniform(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    if high <= low {
        return low;
    }
    rng.gen_range(low..=high)
}

pub fn chance(rng: &mut impl Rng, probability: f64) -> bool {
    if probability <= 0.0 {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    rng.gen_bool(probability)
}

/// Floors a non-negative real into an integer count; NaN and negatives map to 0.
pub fn floor_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

/// Index of the first maximum (ties go to the earliest entry).
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, value) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] >= *value => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Index of the first minimum (ties go to the earliest entry).
pub fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, value) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] <= *value => {}
            _ => best = Some(idx),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn ces_is_zero_without_land() {
        assert_eq!(ces_output(5.0, 0.0, 1000.0), 0.0);
        assert_eq!(ces_output(5.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn ces_balanced_inputs_give_a_quarter() {
        let out = ces_output(4.0, 100.0, 100.0);
        assert!((out - 100.0).abs() < 1e-9);
    }

    #[test]
    fn geometric_mean_collapses_on_zero() {
        assert_eq!(weighted_geometric_mean(&[(4.0, 0.5), (0.0, 0.5)]), 0.0);
        let mean = weighted_geometric_mean(&[(4.0, 0.5), (9.0, 0.5)]);
        assert!((mean - 6.0).abs() < 1e-9);
        assert!((weighted_geometric_mean(&[(7.0, 1.0), (0.0, 0.0)]) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn ties_resolve_to_first_index() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), Some(1));
        assert_eq!(argmin(&[2.0, 1.0, 1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn degenerate_uniform_is_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(uniform(&mut rng, 1.0, 1.0), 1.0);
        let draw = uniform(&mut rng, 0.75, 1.25);
        assert!((0.75..=1.25).contains(&draw));
    }
}
