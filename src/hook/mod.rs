// ABOUTME: Hook strategy injected into agents at construction.
// ABOUTME: Validation, cache-key derivation and result post-processing.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;

use crate::cache::cache_key;

/// Per-agent customization points around a tool call.
///
/// Every method has a default, so an agent with no special needs uses
/// [`NoHooks`]. Hooks run synchronously: `validate` and `cache_key` on the
/// agent's message loop, `post_process` on the execution task.
pub trait AgentHooks: Send + Sync {
    /// Reject parameters before they are queued.
    ///
    /// Return `Err(reason)` to fail the request with `ValidationFailed`.
    fn validate(&self, params: &Value) -> Result<(), String> {
        let _ = params;
        Ok(())
    }

    /// Key used for result caching when the caller supplied none.
    ///
    /// Return `None` to skip caching for these parameters.
    fn cache_key(&self, tool: &str, params: &Value) -> Option<String> {
        Some(cache_key(tool, params))
    }

    /// Transform a successful result before it is cached and reported.
    ///
    /// Return `Err(reason)` to turn the success into an execution failure.
    fn post_process(&self, params: &Value, result: Value) -> Result<Value, String> {
        let _ = params;
        Ok(result)
    }
}

/// Run `post_process`, turning a panic into a failure reason.
pub(crate) fn guarded_post_process(
    hooks: &dyn AgentHooks,
    params: &Value,
    result: Value,
) -> Result<Value, String> {
    catch_unwind(AssertUnwindSafe(|| hooks.post_process(params, result)))
        .unwrap_or_else(|_| Err("post-process panicked".to_string()))
}

/// Hooks with every default in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl AgentHooks for NoHooks {}

/// Validates that the listed top-level fields are present and non-null.
#[derive(Debug, Clone, Default)]
pub struct RequiredFields {
    fields: Vec<String>,
}

impl RequiredFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl AgentHooks for RequiredFields {
    fn validate(&self, params: &Value) -> Result<(), String> {
        let Some(object) = params.as_object() else {
            return Err("parameters must be a JSON object".to_string());
        };

        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| object.get(f.as_str()).is_none_or(Value::is_null))
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required field(s): {}", missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Doubling;

    impl AgentHooks for Doubling {
        fn post_process(&self, _params: &Value, result: Value) -> Result<Value, String> {
            result
                .as_i64()
                .map(|n| json!(n * 2))
                .ok_or_else(|| "expected a number".to_string())
        }

        fn cache_key(&self, _tool: &str, _params: &Value) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_no_hooks_defaults() {
        let hooks = NoHooks;
        let params = json!({"path": "src"});

        assert!(hooks.validate(&params).is_ok());
        assert_eq!(hooks.cache_key("t", &params), Some(cache_key("t", &params)));
        assert_eq!(hooks.post_process(&params, json!(1)), Ok(json!(1)));
    }

    #[test]
    fn test_overridden_hooks() {
        let hooks = Doubling;
        assert_eq!(hooks.post_process(&json!({}), json!(21)), Ok(json!(42)));
        assert!(hooks.post_process(&json!({}), json!("x")).is_err());
        assert!(hooks.cache_key("t", &json!({})).is_none());
    }

    #[test]
    fn test_guarded_post_process_catches_panic() {
        struct Exploding;
        impl AgentHooks for Exploding {
            fn post_process(&self, params: &Value, result: Value) -> Result<Value, String> {
                if params["boom"] == json!(true) {
                    panic!("hook blew up");
                }
                Ok(result)
            }
        }

        assert_eq!(
            guarded_post_process(&Exploding, &json!({"boom": true}), json!(1)),
            Err("post-process panicked".to_string())
        );
        assert_eq!(
            guarded_post_process(&Exploding, &json!({}), json!(1)),
            Ok(json!(1))
        );
        assert_eq!(
            guarded_post_process(&Doubling, &json!({}), json!(2)),
            Ok(json!(4))
        );
    }

    #[test]
    fn test_required_fields() {
        let hooks = RequiredFields::new(["path", "depth"]);

        assert!(hooks.validate(&json!({"path": "src", "depth": 1})).is_ok());

        let err = hooks.validate(&json!({"path": null})).unwrap_err();
        assert_eq!(err, "missing required field(s): path, depth");

        assert!(hooks.validate(&json!([1, 2])).is_err());
    }
}
