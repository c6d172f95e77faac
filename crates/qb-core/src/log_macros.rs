/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so callers pass a bare identifier
/// (`exec`, `env`) instead of a string literal.
///
/// ```ignore
/// qb_debug!(exec, var = %name, "runtime variable resolved");
/// ```

#[doc(hidden)]
macro_rules! qb_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

macro_rules! qb_warn {
    ($domain:ident, $($rest:tt)*) => {
        qb_log!(warn, $domain, $($rest)*)
    };
}

macro_rules! qb_info {
    ($domain:ident, $($rest:tt)*) => {
        qb_log!(info, $domain, $($rest)*)
    };
}

macro_rules! qb_debug {
    ($domain:ident, $($rest:tt)*) => {
        qb_log!(debug, $domain, $($rest)*)
    };
}

macro_rules! qb_trace {
    ($domain:ident, $($rest:tt)*) => {
        qb_log!(trace, $domain, $($rest)*)
    };
}
