/// Assert that the floating point numbers are equal within the given epsilon.
#[cfg(test)]
macro_rules! assert_float_eq {
    ($a:expr, $b:expr, $eps:expr, $debug:expr) => {{
        // Make variables to avoid evaluating experssions multiple times.
        let a = $a;
        let b = $b;
        let eps = $eps;
        let error = (a - b).abs();
        if error > eps {
            eprintln!("{:?}", $debug);
        }
        assert!(
            error <= eps,
            "Assertion failed: |({}) - ({})| = {:e} <= {:e}",
            a,
            b,
            error,
            eps
        );
    }};
    ($a:expr, $b:expr, $eps:expr) => {
        $crate::macros::assert_float_eq!($a, $b, $eps, "")
    };
}

/// Compare two `f64` values. Without an explicit epsilon, a tolerance of
/// `1e-12` is used.
#[cfg(test)]
macro_rules! assert_f64_eq {
    ($a:expr, $b:expr, $eps:expr, $debug:expr) => {
        $crate::macros::assert_float_eq!($a, $b, $eps, $debug)
    };
    ($a:expr, $b:expr, $eps:expr) => {
        $crate::macros::assert_float_eq!($a, $b, $eps)
    };
    ($a:expr, $b:expr) => {
        $crate::macros::assert_float_eq!($a, $b, 1e-12f64)
    };
}

#[cfg(test)]
pub(crate) use assert_f64_eq;
#[cfg(test)]
pub(crate) use assert_float_eq;
