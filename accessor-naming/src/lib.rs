//! Accessor naming convention for rulekit
//! Extracted to a separate crate so the patterns compile once per process

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix-based accessor names: `get_x`, `is_x` and `set_x`
pub mod convention {
    use super::*;

    pub static ACCESSOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(get|is|set)_([a-z_][a-z0-9_]*)$").expect("Invalid regex pattern")
    });

    /// One side of an accessor pair, recovered from its method name
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Accessor {
        Getter { field: String, boolean: bool },
        Setter { field: String },
    }

    impl Accessor {
        pub fn field(&self) -> &str {
            match self {
                Accessor::Getter { field, .. } | Accessor::Setter { field } => field,
            }
        }
    }

    /// Getter name for a field. Boolean fields read through `is_`.
    pub fn getter_name(field: &str, boolean: bool) -> String {
        if boolean {
            format!("is_{field}")
        } else {
            format!("get_{field}")
        }
    }

    pub fn setter_name(field: &str) -> String {
        format!("set_{field}")
    }

    /// Parse an accessor method name
    pub fn parse(method: &str) -> Option<Accessor> {
        let caps = ACCESSOR_PATTERN.captures(method)?;
        let field = caps.get(2)?.as_str().to_string();

        match caps.get(1)?.as_str() {
            "get" => Some(Accessor::Getter { field, boolean: false }),
            "is" => Some(Accessor::Getter { field, boolean: true }),
            _ => Some(Accessor::Setter { field }),
        }
    }

    /// Field a name refers to, whether given as a field or as an accessor
    pub fn field_name(name: &str) -> String {
        let snake = super::case::to_snake_case(name.trim());
        match parse(&snake) {
            Some(accessor) => accessor.field().to_string(),
            None => snake,
        }
    }
}

/// Identifier case handling
pub mod case {
    use super::*;

    pub static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"([a-z0-9])([A-Z])").expect("Invalid regex pattern")
    });

    pub static FIELD_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[a-z_][a-z0-9_]*$").expect("Invalid regex pattern")
    });

    /// `integerObject` -> `integer_object`
    pub fn to_snake_case(name: &str) -> String {
        CAMEL_BOUNDARY.replace_all(name, "${1}_${2}").to_lowercase()
    }

    pub fn is_field_name(name: &str) -> bool {
        FIELD_PATTERN.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convention::Accessor;

    #[test]
    fn test_accessor_names() {
        assert_eq!(convention::getter_name("integer", false), "get_integer");
        assert_eq!(convention::getter_name("flag", true), "is_flag");
        assert_eq!(convention::setter_name("flag"), "set_flag");
    }

    #[test]
    fn test_parse_accessors() {
        assert_eq!(
            convention::parse("get_integer_object"),
            Some(Accessor::Getter { field: "integer_object".to_string(), boolean: false })
        );

        assert_eq!(
            convention::parse("is_flag"),
            Some(Accessor::Getter { field: "flag".to_string(), boolean: true })
        );

        assert_eq!(
            convention::parse("set_list_string"),
            Some(Accessor::Setter { field: "list_string".to_string() })
        );

        assert_eq!(convention::parse("compute"), None);
        assert_eq!(convention::parse("get_"), None);
    }

    #[test]
    fn test_field_name_normalization() {
        assert_eq!(convention::field_name("ignored"), "ignored");
        assert_eq!(convention::field_name("get_ignored"), "ignored");
        assert_eq!(convention::field_name("integerObject"), "integer_object");
        assert_eq!(convention::field_name("isFlagObject"), "flag_object");
        assert_eq!(convention::field_name(" flag "), "flag");
    }

    #[test]
    fn test_field_name_validation() {
        assert!(case::is_field_name("list_string"));
        assert!(case::is_field_name("_hidden"));
        assert!(!case::is_field_name("List"));
        assert!(!case::is_field_name("two words"));
        assert!(!case::is_field_name(""));
    }
}
