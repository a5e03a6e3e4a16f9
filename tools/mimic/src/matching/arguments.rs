use super::{Comparator, Mismatch};
use crate::matcher::ArgumentMatcher;
use crate::value::Value;
use std::collections::BTreeMap;

/// Drops default placeholders from a recorded argument list.
///
/// Top-level placeholders are removed. A trailing keyword mapping that holds
/// placeholders loses those entries and disappears once empty; a mapping
/// without placeholders is kept as is, even when empty.
pub fn without_defaults(recorded: &[Value]) -> Vec<Value> {
    let mut effective: Vec<Value> = recorded.iter().filter(|v| !v.is_default()).cloned().collect();

    let stripped = match effective.last() {
        Some(Value::Map(entries)) if entries.values().any(Value::is_default) => Some(
            entries
                .iter()
                .filter(|(_, v)| !v.is_default())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        ),
        _ => None,
    };
    if let Some(entries) = stripped {
        effective.pop();
        if !entries.is_empty() {
            effective.push(Value::Map(entries));
        }
    }
    effective
}

impl Comparator {
    pub fn same_args(&self, recorded: &[Value], stubbed: &[Value]) -> bool {
        self.compare_args(recorded, stubbed).is_ok()
    }

    pub fn compare_args(&self, recorded: &[Value], stubbed: &[Value]) -> Result<(), Mismatch> {
        let recorded = without_defaults(recorded);

        if let [Value::Matcher(matcher)] = stubbed {
            if matcher.is_call_matcher() {
                return if matcher.matches_args(&recorded) {
                    Ok(())
                } else {
                    Err(Mismatch::CallMatcher {
                        matcher: matcher.to_string(),
                    })
                };
            }
        }

        if recorded.len() != stubbed.len() {
            return Err(Mismatch::ArgumentCount {
                recorded: recorded.len(),
                stubbed: stubbed.len(),
            });
        }

        for (position, (r, s)) in recorded.iter().zip(stubbed).enumerate() {
            if !self.same_arg(r, s) {
                return Err(Mismatch::Argument {
                    position,
                    recorded: r.to_string(),
                    stubbed: s.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Structural equality that honours matchers and fakes nested anywhere
    /// on the stubbed side.
    fn same_arg(&self, recorded: &Value, stubbed: &Value) -> bool {
        match (recorded, stubbed) {
            (_, Value::Matcher(matcher)) => matcher.matches(recorded),
            (Value::Fake(r), Value::Fake(s)) => self.same_entities(r, s),
            (Value::List(r), Value::List(s)) => {
                r.len() == s.len() && r.iter().zip(s).all(|(r, s)| self.same_arg(r, s))
            }
            (Value::Map(r), Value::Map(s)) => {
                r.len() == s.len()
                    && r
                        .iter()
                        .all(|(key, r)| s.get(key).is_some_and(|s| self.same_arg(r, s)))
            }
            _ => recorded == stubbed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::without_defaults;
    use crate::matcher::Matcher;
    use crate::matching::{Comparator, Mismatch};
    use crate::value::{Value, ValueKind};

    fn sym(name: &str) -> Value {
        Value::sym(name)
    }

    #[test]
    fn top_level_defaults_are_removed() {
        assert_eq!(
            without_defaults(&[sym("bar"), Value::Default]),
            vec![sym("bar")]
        );
    }

    #[test]
    fn keyword_defaults_are_stripped_and_empty_mapping_dropped() {
        let recorded = [
            Value::Default,
            Value::map([("foo", Value::Default)]),
        ];
        assert!(without_defaults(&recorded).is_empty());

        let partial = [
            sym("bar"),
            Value::map([("foo", Value::Default), ("bar", Value::Integer(1))]),
        ];
        assert_eq!(
            without_defaults(&partial),
            vec![sym("bar"), Value::map([("bar", Value::Integer(1))])]
        );
    }

    #[test]
    fn mapping_without_defaults_survives_even_when_empty() {
        let recorded = [Value::map(Vec::<(String, Value)>::new())];
        assert_eq!(without_defaults(&recorded).len(), 1);
    }

    #[test]
    fn nil_is_a_real_argument() {
        let comparator = Comparator::default();
        assert!(!comparator.same_args(&[Value::Nil], &[]));
        assert!(comparator.same_args(&[Value::Default], &[]));
    }

    #[test]
    fn empty_lists_match() {
        assert!(Comparator::default().same_args(&[], &[]));
    }

    #[test]
    fn any_args_short_circuits_positional_checks() {
        let comparator = Comparator::default();
        let stubbed = [Value::Matcher(Matcher::AnyArgs)];
        assert!(comparator.same_args(&[sym("bar")], &stubbed));
        assert!(comparator.same_args(&[sym("a"), sym("b"), sym("c")], &stubbed));
        assert!(comparator.same_args(&[], &stubbed));
    }

    #[test]
    fn with_arguments_rejection_names_the_matcher() {
        let odd = Matcher::with_arguments(|args| {
            matches!(args, [Value::Integer(n)] if n % 2 != 0)
        });
        assert_eq!(
            Comparator::default().compare_args(&[Value::Integer(2)], &[Value::Matcher(odd)]),
            Err(Mismatch::CallMatcher {
                matcher: "WithArguments(..)".to_string(),
            })
        );
    }

    #[test]
    fn single_matchers_apply_per_position() {
        let comparator = Comparator::default();
        assert!(comparator.same_args(
            &[sym("bar"), sym("baz")],
            &[sym("bar"), Value::Matcher(Matcher::Anything)]
        ));
        assert_eq!(
            comparator.compare_args(
                &[sym("bar"), sym("baz")],
                &[sym("baz"), Value::Matcher(Matcher::Anything)]
            ),
            Err(Mismatch::Argument {
                position: 0,
                recorded: ":bar".to_string(),
                stubbed: ":baz".to_string(),
            })
        );
        assert!(comparator.same_args(
            &[Value::Integer(1)],
            &[Value::Matcher(Matcher::same_class(ValueKind::Integer))]
        ));
    }

    #[test]
    fn count_mismatch_is_reported_after_elision() {
        assert_eq!(
            Comparator::default().compare_args(&[Value::Default, sym("baz")], &[sym("bar"), sym("bar")]),
            Err(Mismatch::ArgumentCount {
                recorded: 1,
                stubbed: 2,
            })
        );
    }

    #[test]
    fn keyword_default_before_a_trailing_placeholder_is_still_stripped() {
        // The keyword mapping is judged after top-level placeholders are gone.
        let recorded = [Value::map([("foo", Value::Default)]), Value::Default];
        assert!(without_defaults(&recorded).is_empty());
        assert!(Comparator::default().same_args(&recorded, &[]));
    }

    #[test]
    fn matchers_inside_keyword_mappings_apply_per_entry() {
        let comparator = Comparator::default();
        let recorded = [sym("bar"), Value::map([("bar", Value::Integer(1))])];
        assert!(comparator.same_args(
            &recorded,
            &[sym("bar"), Value::map([("bar", Value::Matcher(Matcher::Anything))])]
        ));
        assert!(comparator.same_args(
            &recorded,
            &[
                sym("bar"),
                Value::map([(
                    "bar",
                    Value::Matcher(Matcher::same_class(ValueKind::Integer))
                )])
            ]
        ));
        assert!(!comparator.same_args(
            &recorded,
            &[sym("bar"), Value::map([("baz", Value::Matcher(Matcher::Anything))])]
        ));
        assert!(!comparator.same_args(
            &recorded,
            &[
                sym("bar"),
                Value::map([
                    ("bar", Value::Matcher(Matcher::Anything)),
                    ("baz", Value::Matcher(Matcher::Anything)),
                ])
            ]
        ));
    }

    #[test]
    fn matchers_inside_lists_apply_per_element() {
        let comparator = Comparator::default();
        let recorded = [Value::List(vec![Value::Integer(1), sym("x")])];
        assert!(comparator.same_args(
            &recorded,
            &[Value::List(vec![Value::Matcher(Matcher::Anything), sym("x")])]
        ));
        assert_eq!(
            comparator.compare_args(
                &recorded,
                &[Value::List(vec![Value::Matcher(Matcher::Anything)])]
            ),
            Err(Mismatch::Argument {
                position: 0,
                recorded: "[1, :x]".to_string(),
                stubbed: "[Anything]".to_string(),
            })
        );
    }

    #[test]
    fn matchers_on_the_recorded_side_are_plain_values() {
        assert!(!Comparator::default().same_args(
            &[Value::List(vec![Value::Matcher(Matcher::Anything)])],
            &[Value::List(vec![Value::Integer(1)])]
        ));
    }

    #[test]
    fn keyword_mapping_compares_as_one_element() {
        let comparator = Comparator::default();
        let recorded = [
            sym("bar"),
            Value::map([("foo", Value::Default), ("bar", Value::Integer(1))]),
        ];
        assert!(comparator.same_args(
            &recorded,
            &[sym("bar"), Value::map([("bar", Value::Integer(1))])]
        ));
        assert!(!comparator.same_args(
            &recorded,
            &[sym("bar"), Value::map([("bar", Value::Integer(2))])]
        ));
    }
}
