pub mod range;

/// A macro to measure the evaluation time of an expression. Wraps an
/// expression, logs how long it took to evaluate, then evaluates to the value
/// of the expression. The log level defaults to `Debug`.
#[macro_export]
macro_rules! timed {
    ($label:expr, $ex:expr) => {
        $crate::timed!($label, log::Level::Debug, $ex)
    };
    ($label:expr, $log_level:expr, $ex:expr) => {{
        let now = std::time::Instant::now();
        let value = $ex;
        let elapsed = now.elapsed();
        log::log!($log_level, "{} took {} ms", $label, elapsed.as_millis());
        value
    }};
}

/// Arithmetic mean of a fixed set of values. Returns zero for an empty slice
/// rather than NaN, since a NaN here would leak straight into the output
/// geometry.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
