/// Compile a regex literal once and hand out a `&'static Regex`.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("invalid regex literal"));
        &*RE
    }};
}

/// Build a [`CronError::Parse`](crate::CronError::Parse) for `field` / `token`.
macro_rules! parse_err {
    ($field:expr, $token:expr, $($arg:tt)+) => {
        $crate::CronError::Parse { field: Some($field), token: $token.to_string(), message: format!($($arg)+) }
    };
}

/// Build a [`CronError::Validation`](crate::CronError::Validation) for `field`.
macro_rules! validation_err {
    ($field:expr, $($arg:tt)+) => {
        $crate::CronError::Validation { field: $field, message: format!($($arg)+) }
    };
}
