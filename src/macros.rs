/// Compile a regex literal once and hand out a `&'static Regex`.
///
/// Patterns are literals checked by the field parser tests, so a failure
/// here is a programming error rather than an input error.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("static cron pattern"));
        &*RE
    }};
}
