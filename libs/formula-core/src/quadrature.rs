//! Gauss-Legendre quadrature on the reference cell `[-1, 1]^D`
//!
//! Rules have 1 to [`MAX_POINTS`] points per axis. Abscissae are the roots of
//! the Legendre polynomial `P_n`, found by Newton iteration in `f64` and then
//! converted to `T`. A rule with `n` points integrates polynomials of degree
//! up to `2n - 1` exactly.
//!
//! Multi-dimensional rules are tensor products. Nodes are ordered by
//! ascending abscissa on the first axis, then the second, then the third,
//! and each weight is the product of the per-axis weights.
//!
//! # Example
//! ```rust
//! use formula_core::{quadrature, Formula};
//!
//! let mut integrand = Formula::<f64>::parse("x*x; x").unwrap();
//! let nodes = quadrature::gauss_legendre::<f64, 1>(2);
//! let area = quadrature::integrate(&nodes, [0.0], [3.0], |[x]| integrand.evaluate(&[*x]));
//! assert!((area - 9.0).abs() < 1e-12);
//! ```

use num_traits::Float;
use std::f64::consts::PI;
use tracing::trace;

/// Largest supported number of points per axis
pub const MAX_POINTS: usize = 64;

const NEWTON_TOLERANCE: f64 = 1e-15;
const NEWTON_MAX_ITERATIONS: usize = 100;

/// A quadrature point on `[-1, 1]^D` and its weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureNode<T, const D: usize> {
    pub abscissa: [T; D],
    pub weight: T,
}

/// `P_n(x)` and `P_n'(x)` by the three-term recurrence
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut current = 1.0;
    let mut previous = 0.0;
    for k in 1..=n {
        let k = k as f64;
        let next = ((2.0 * k - 1.0) * x * current - (k - 1.0) * previous) / k;
        previous = current;
        current = next;
    }
    let n = n as f64;
    let derivative = n * (x * current - previous) / (x * x - 1.0);
    (current, derivative)
}

/// Non-negative abscissae with their weights, ascending from the center
fn half_rule(points: usize) -> Vec<(f64, f64)> {
    let count = points.div_ceil(2);
    let n = points as f64;

    let mut rule: Vec<(f64, f64)> = (0..count)
        .map(|i| {
            if points % 2 == 1 && i == count - 1 {
                let (_, derivative) = legendre(points, 0.0);
                return (0.0, 2.0 / (derivative * derivative));
            }

            let mut x = (PI * (i as f64 + 0.75) / (n + 0.5)).cos();
            for _ in 0..NEWTON_MAX_ITERATIONS {
                let (value, derivative) = legendre(points, x);
                let step = value / derivative;
                x -= step;
                if step.abs() <= NEWTON_TOLERANCE {
                    break;
                }
            }
            let (_, derivative) = legendre(points, x);
            (x, 2.0 / ((1.0 - x * x) * derivative * derivative))
        })
        .collect();

    rule.reverse();
    rule
}

/// Ascending abscissae over `[-1, 1]` with their weights
fn line_rule(points: usize) -> Vec<(f64, f64)> {
    let half = half_rule(points);
    let skip_center = points % 2;

    half.iter()
        .skip(skip_center)
        .rev()
        .map(|&(x, w)| (-x, w))
        .chain(half.iter().copied())
        .collect()
}

fn cast<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Build the `points`-point Gauss-Legendre rule on `[-1, 1]^D`
///
/// Returns `points^D` nodes.
///
/// # Panics
/// Panics if `points` is outside `1..=MAX_POINTS` or `D` is zero.
pub fn gauss_legendre<T: Float, const D: usize>(points: usize) -> Vec<QuadratureNode<T, D>> {
    assert!(
        (1..=MAX_POINTS).contains(&points),
        "quadrature needs 1 to {} points, got {}",
        MAX_POINTS,
        points
    );
    assert!(D > 0, "quadrature needs at least one dimension");

    let line = line_rule(points);
    let total = points.pow(D as u32);

    let nodes = (0..total)
        .map(|flat| {
            // Mixed-radix digits, first axis most significant
            let mut abscissa = [T::zero(); D];
            let mut weight = 1.0;
            let mut rest = flat;
            for axis in (0..D).rev() {
                let (x, w) = line[rest % points];
                abscissa[axis] = cast(x);
                weight *= w;
                rest /= points;
            }
            QuadratureNode {
                abscissa,
                weight: cast(weight),
            }
        })
        .collect();

    trace!(points, dimensions = D, nodes = total, "quadrature rule built");
    nodes
}

/// Integrate `f` over the box `[lower, upper]` with a reference-cell rule
///
/// Each axis is mapped affinely from `[-1, 1]`; `f` receives the mapped point.
pub fn integrate<T: Float, const D: usize>(
    nodes: &[QuadratureNode<T, D>],
    lower: [T; D],
    upper: [T; D],
    mut f: impl FnMut(&[T; D]) -> T,
) -> T {
    let two = T::one() + T::one();
    let mut half_width = [T::zero(); D];
    let mut center = [T::zero(); D];
    let mut jacobian = T::one();
    for axis in 0..D {
        half_width[axis] = (upper[axis] - lower[axis]) / two;
        center[axis] = (upper[axis] + lower[axis]) / two;
        jacobian = jacobian * half_width[axis];
    }

    let mut point = [T::zero(); D];
    let sum = nodes.iter().fold(T::zero(), |sum, node| {
        for axis in 0..D {
            point[axis] = center[axis] + half_width[axis] * node.abscissa[axis];
        }
        sum + node.weight * f(&point)
    });
    sum * jacobian
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_weights_sum_to_cell_volume() {
        for points in 1..=MAX_POINTS {
            let line = gauss_legendre::<f64, 1>(points);
            assert_eq!(line.len(), points);
            assert_close(line.iter().map(|n| n.weight).sum(), 2.0, 1e-13);
        }
        for points in [1, 2, 5, 8] {
            let square = gauss_legendre::<f64, 2>(points);
            assert_eq!(square.len(), points * points);
            assert_close(square.iter().map(|n| n.weight).sum(), 4.0, 1e-13);

            let cube = gauss_legendre::<f64, 3>(points);
            assert_eq!(cube.len(), points * points * points);
            assert_close(cube.iter().map(|n| n.weight).sum(), 8.0, 1e-13);
        }
    }

    #[test]
    fn test_known_rules() {
        let one = gauss_legendre::<f64, 1>(1);
        assert_eq!(one, [QuadratureNode { abscissa: [0.0], weight: 2.0 }]);

        let two = gauss_legendre::<f64, 1>(2);
        let root = 1.0 / 3f64.sqrt();
        assert_close(two[0].abscissa[0], -root, 1e-15);
        assert_close(two[1].abscissa[0], root, 1e-15);
        assert_close(two[0].weight, 1.0, 1e-15);

        let three = gauss_legendre::<f64, 1>(3);
        let root = 0.6f64.sqrt();
        assert_close(three[0].abscissa[0], -root, 1e-15);
        assert_eq!(three[1].abscissa[0], 0.0);
        assert_close(three[2].abscissa[0], root, 1e-15);
        assert_close(three[0].weight, 5.0 / 9.0, 1e-15);
        assert_close(three[1].weight, 8.0 / 9.0, 1e-15);
    }

    #[test]
    fn test_nodes_are_symmetric_and_ascending() {
        for points in [4, 7, 64] {
            let line = gauss_legendre::<f64, 1>(points);
            assert!(line.windows(2).all(|w| w[0].abscissa[0] < w[1].abscissa[0]));
            for (left, right) in line.iter().zip(line.iter().rev()) {
                assert_eq!(left.abscissa[0], -right.abscissa[0]);
                assert_eq!(left.weight, right.weight);
            }
        }
    }

    #[test]
    fn test_tensor_order() {
        let line = gauss_legendre::<f64, 1>(3);
        let square = gauss_legendre::<f64, 2>(3);

        // First axis varies slowest
        assert_eq!(square[0].abscissa, [line[0].abscissa[0], line[0].abscissa[0]]);
        assert_eq!(square[1].abscissa, [line[0].abscissa[0], line[1].abscissa[0]]);
        assert_eq!(square[3].abscissa, [line[1].abscissa[0], line[0].abscissa[0]]);
        assert_eq!(square[4].weight, line[1].weight * line[1].weight);

        let cube = gauss_legendre::<f64, 3>(2);
        let low = line_rule(2)[0].0;
        assert_eq!(cube[0].abscissa, [low, low, low]);
        assert_eq!(cube[1].abscissa, [low, low, -low]);
        assert_eq!(cube[2].abscissa, [low, -low, low]);
        assert_eq!(cube[4].abscissa, [-low, low, low]);
    }

    #[test]
    fn test_polynomials_up_to_degree_2n_minus_1_are_exact() {
        for points in 1..=10 {
            let nodes = gauss_legendre::<f64, 1>(points);
            for degree in 0..2 * points {
                let integral = integrate(&nodes, [-1.0], [1.0], |[x]| x.powi(degree as i32));
                // Odd powers vanish on a symmetric interval
                let expected = if degree % 2 == 0 {
                    2.0 / (degree as f64 + 1.0)
                } else {
                    0.0
                };
                assert_close(integral, expected, 1e-13);
            }
        }
    }

    #[test]
    fn test_integrate_over_box() {
        let nodes = gauss_legendre::<f64, 2>(3);
        // x*y^2 over [0,2] x [0,3]: (2^2/2) * (3^3/3) = 18
        let value = integrate(&nodes, [0.0, 0.0], [2.0, 3.0], |[x, y]| x * y * y);
        assert_close(value, 18.0, 1e-12);

        let nodes = gauss_legendre::<f64, 3>(2);
        let volume = integrate(&nodes, [0.0; 3], [1.0, 2.0, 3.0], |_| 1.0);
        assert_close(volume, 6.0, 1e-13);
    }

    #[test]
    fn test_single_precision_rule() {
        let nodes = gauss_legendre::<f32, 1>(16);
        let total: f32 = nodes.iter().map(|n| n.weight).sum();
        assert!((total - 2.0).abs() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "1 to 64 points")]
    fn test_rejects_too_many_points() {
        gauss_legendre::<f64, 1>(65);
    }

    #[test]
    #[should_panic(expected = "1 to 64 points")]
    fn test_rejects_zero_points() {
        gauss_legendre::<f64, 1>(0);
    }
}
