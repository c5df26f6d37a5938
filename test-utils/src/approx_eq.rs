// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/// Asserts that two floats are approximately equal.
///
/// ```
/// use xayn_swap_test_utils::assert_approx_eq;
/// assert_approx_eq!(f32, 0.150_391_55, 0.150_391_6, ulps = 3);
/// assert_approx_eq!(f32, 50. * 0.8 + 50. * 0.2, 50., epsilon = 1e-5);
/// ```
///
/// The number of `ulps` defaults to `2` if not specified. Two NaN values
/// compare as approximately equal, since the assertion checks for "an expected
/// outcome" rather than semantic float equality.
#[macro_export]
macro_rules! assert_approx_eq {
    ($t:ty, $left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, ulps = $ulps:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = $ulps)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = $epsilon, ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr, ulps = $ulps:expr $(,)?) => {{
        let left: $t = $left;
        let right: $t = $right;
        if !(left.is_nan() && right.is_nan()) {
            std::assert!(
                $crate::approx_eq!($t, left, right, epsilon = $epsilon, ulps = $ulps),
                "Approximate equal assertion failed (ulps={:?}, epsilon={:?}): {:?} != {:?}",
                $ulps,
                $epsilon,
                left,
                right,
            );
        }
    }};
}

/// Asserts that two sequences of floats are element-wise approximately equal.
///
/// ```
/// use xayn_swap_test_utils::assert_approx_eq_all;
/// assert_approx_eq_all!(f32, [0.25, 1.25], vec![0.25, 1.25]);
/// ```
#[macro_export]
macro_rules! assert_approx_eq_all {
    ($t:ty, $left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq_all!($t, $left, $right, epsilon = 0., ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq_all!($t, $left, $right, epsilon = $epsilon, ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr, ulps = $ulps:expr $(,)?) => {{
        let left = $left.into_iter().collect::<Vec<$t>>();
        let right = $right.into_iter().collect::<Vec<$t>>();
        std::assert_eq!(
            left.len(),
            right.len(),
            "Length mismatch: {:?} != {:?}",
            left,
            right,
        );
        for (index, (lv, rv)) in left.iter().zip(&right).enumerate() {
            if !(lv.is_nan() && rv.is_nan()) {
                std::assert!(
                    $crate::approx_eq!($t, *lv, *rv, epsilon = $epsilon, ulps = $ulps),
                    "Approximate equal assertion failed (ulps={:?}, epsilon={:?}) at index {}: {:?} != {:?}",
                    $ulps,
                    $epsilon,
                    index,
                    lv,
                    rv,
                );
            }
        }
    }};
}
