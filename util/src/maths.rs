//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Round a value to the given number of decimal places.
pub fn round_dp<T>(value: T, decimals: i32) -> T
where
    T: Float
{
    let scale = T::from(10).unwrap_or_else(T::one).powi(decimals);
    (value * scale).round() / scale
}

/// Return `num` evenly spaced values over `[start, end]`, including both
/// endpoints.
///
/// A single value returns `start`, zero values returns an empty vector.
pub fn linspace<T>(start: T, end: T, num: usize) -> Vec<T>
where
    T: Float
{
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let last = num - 1;
            (0..num)
                .map(|i| {
                    // Pin the final value so it is exactly `end`
                    if i == last {
                        end
                    }
                    else {
                        let frac = T::from(i).unwrap_or_else(T::zero)
                            / T::from(last).unwrap_or_else(T::one);
                        start + (end - start) * frac
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (90f64, 0f64), 0.5), 45.0);
        assert_eq!(lin_map((0f64, 1f64), (145f64, 180f64), 1.0), 180.0);
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(12.8874f64, 1), 12.9);
        assert_eq!(round_dp(-12.6312f64, 1), -12.6);
        assert_eq!(round_dp(0.04f64, 1), 0.0);
        assert_eq!(round_dp(89.6f64, 0), 90.0);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0f64, 1f64, 0), Vec::<f64>::new());
        assert_eq!(linspace(0f64, 1f64, 1), vec![0.0]);
        assert_eq!(linspace(0f64, 1f64, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let t = linspace(0f64, 1f64, 10);
        assert_eq!(t.len(), 10);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[9], 1.0);
    }
}
