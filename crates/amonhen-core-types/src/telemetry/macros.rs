//! Canonical logging macros for operation boundaries

/// Log the start of an operation.
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::telemetry::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::telemetry::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation.
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::telemetry::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::telemetry::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error, tagged with the error's stable code.
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr) => {
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::telemetry::EVENT_END_ERROR,
            err_kind = ?$err.kind(),
            err_code = $err.code(),
        );
    };
    ($op:expr, $err:expr, $($field:tt)*) => {
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::telemetry::EVENT_END_ERROR,
            err_kind = ?$err.kind(),
            err_code = $err.code(),
            $($field)*
        );
    };
}
