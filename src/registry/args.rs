//! Lookup of bound argument values by declared name.

use serde_json::Value;

use crate::registry::descriptor::ArgDescriptor;

/// Return the value bound to the argument declared as `name`.
///
/// Names are compared case-insensitively. Returns `None` when nothing is
/// declared, no declaration matches, or fewer values were bound.
pub fn get_arg_by_name<'a>(
    accepts: &[ArgDescriptor],
    name: &str,
    args: &'a [Value],
) -> Option<&'a Value> {
    let position = accepts
        .iter()
        .position(|arg| arg.name.eq_ignore_ascii_case(name))?;
    args.get(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::descriptor::ArgType;
    use serde_json::json;

    fn accepts() -> Vec<ArgDescriptor> {
        vec![
            ArgDescriptor::new("id", ArgType::Number),
            ArgDescriptor::new("options", ArgType::Object),
        ]
    }

    #[test]
    fn test_case_insensitive_match() {
        let args = vec![json!(7), json!({ "accessToken": "abc" })];
        assert_eq!(get_arg_by_name(&accepts(), "OPTIONS", &args), Some(&args[1]));
        assert_eq!(get_arg_by_name(&accepts(), "id", &args), Some(&json!(7)));
    }

    #[test]
    fn test_no_match() {
        let args = vec![json!(7)];
        assert_eq!(get_arg_by_name(&accepts(), "filter", &args), None);
        assert_eq!(get_arg_by_name(&[], "id", &args), None);
        // Declared but not bound.
        assert_eq!(get_arg_by_name(&accepts(), "options", &args), None);
    }
}
