//! Pre-dispatch guards.

use crate::error::HandlerError;
use crate::handler::{truthy, Args, HandlerRegistry};
use crate::routing::params::Params;
use crate::routing::target::{Arg, FilterSpec};

/// Resolves declared arguments against captured parameters.
///
/// No `|` in the declaration means no arguments; otherwise a positional list where
/// uncaptured placeholders become missing values.
pub fn substitute(args: Option<&[Arg]>, params: &Params) -> Args {
    match args {
        None => Args::None,
        Some(args) => Args::List(args.iter().map(|arg| arg.resolve(params)).collect()),
    }
}

/// Runs `filter` and reads its result as allow/deny. Failures raised by the
/// filter are returned untouched.
pub fn run_filter(
    registry: &HandlerRegistry,
    filter: &FilterSpec,
    params: &Params,
) -> Result<bool, HandlerError> {
    let args = substitute(filter.args.as_deref(), params);
    let allowed = truthy(&registry.invoke(&filter.target, &args)?);
    tracing::debug!(filter = %filter, allowed, "Filter evaluated");
    Ok(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::target::CallSpec;
    use serde_json::{json, Value};

    fn registry() -> HandlerRegistry {
        HandlerRegistry::new()
            .function("owner_only", |args| {
                Ok(Value::Bool(args.get(0).as_deref() == Some("42")))
            })
            .function("echo_args", |args| {
                Ok(json!(args.positional()))
            })
            .function("explode", |_| Err(HandlerError::new("filter crashed")))
    }

    fn params() -> Params {
        [("id", "42")].into_iter().collect()
    }

    #[test]
    fn test_substitute() {
        let spec = CallSpec::parse("f|admin,$id,$missing");
        assert_eq!(
            substitute(spec.args.as_deref(), &params()),
            Args::List(vec![Some("admin".into()), Some("42".into()), None])
        );
        assert_eq!(substitute(None, &params()), Args::None);
    }

    #[test]
    fn test_filter_allows_and_denies() {
        let reg = registry();
        assert!(run_filter(&reg, &CallSpec::parse("owner_only|$id"), &params()).unwrap());
        let other: Params = [("id", "7")].into_iter().collect();
        assert!(!run_filter(&reg, &CallSpec::parse("owner_only|$id"), &other).unwrap());
    }

    #[test]
    fn test_filter_result_truthiness() {
        let reg = registry();
        // An empty argument list is falsy.
        assert!(!run_filter(&reg, &CallSpec::parse("echo_args"), &params()).unwrap());
        assert!(run_filter(&reg, &CallSpec::parse("echo_args|x"), &params()).unwrap());
    }

    #[test]
    fn test_filter_failure_propagates() {
        let err = run_filter(&registry(), &CallSpec::parse("explode"), &params()).unwrap_err();
        assert_eq!(err.message(), "filter crashed");
    }
}
