//! Whitelisted pure operations the evaluator may apply to folded values.

use crate::core::{
    eval::{EvalReason, Folded, MAX_RESULT_LEN, format_number},
    syntax::scope::{GLOBAL_OWNER, qualify},
};

/// Whitelisted methods on string receivers; all of them return a string.
pub const STRING_METHODS: &[&str] = &[
    "toUpperCase",
    "toLowerCase",
    "trim",
    "trimStart",
    "trimEnd",
    "concat",
    "repeat",
    "padStart",
    "padEnd",
    "replace",
    "replaceAll",
    "slice",
    "substring",
];

/// Apply a whitelisted method or function.
///
/// `receiver` is the folded receiver for method calls (`"a".trim()`), `None` for free calls.
pub fn invoke(
    owner: Option<&str>,
    name: &str,
    receiver: Option<&Folded>,
    args: &[Folded],
) -> Result<Folded, EvalReason> {
    let invalid = || EvalReason::InvalidArguments(name.to_string());

    match receiver {
        Some(Folded::Str(s)) => string_method(s, name, args).ok_or_else(invalid),
        Some(Folded::Array(items)) if name == "join" => {
            let separator = match args {
                [] => ",".to_string(),
                [Folded::Str(sep)] => sep.clone(),
                _ => return Err(invalid()),
            };
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Folded::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect();
            Ok(Folded::Str(parts.join(&separator)))
        }
        Some(_) => Err(EvalReason::UnsupportedCall(name.to_string())),
        None => match name {
            "String" if owner == Some(GLOBAL_OWNER) => match args {
                [] => Ok(Folded::Str(String::new())),
                [value, ..] => Ok(Folded::Str(value.to_js_string())),
            },
            "format" => format(args).ok_or_else(invalid),
            _ => Err(EvalReason::UnsupportedCall(name.to_string())),
        },
    }
}

/// Apply a whitelisted constructor.
pub fn construct(type_name: Option<&str>, args: &[Folded]) -> Result<Folded, EvalReason> {
    let name = type_name.unwrap_or_default();
    if name == qualify(GLOBAL_OWNER, "String") {
        return Ok(Folded::Str(
            args.first().map(Folded::to_js_string).unwrap_or_default(),
        ));
    }
    Err(EvalReason::UnsupportedCall(format!("new {}", short_name(name))))
}

fn short_name(qualified: &str) -> &str {
    qualified.rsplit('#').next().unwrap_or(qualified)
}

fn string_method(s: &str, name: &str, args: &[Folded]) -> Option<Folded> {
    let result = match (name, args) {
        ("toUpperCase", []) => s.to_uppercase(),
        ("toLowerCase", []) => s.to_lowercase(),
        ("trim", []) => s.trim().to_string(),
        ("trimStart", []) => s.trim_start().to_string(),
        ("trimEnd", []) => s.trim_end().to_string(),
        ("concat", rest) => {
            let mut out = s.to_string();
            for value in rest {
                out.push_str(&value.to_js_string());
            }
            out
        }
        ("repeat", [Folded::Num(count)]) if *count >= 0.0 && count.fract() == 0.0 => {
            if s.len() as f64 * count > MAX_RESULT_LEN as f64 {
                return None;
            }
            s.repeat(*count as usize)
        }
        ("padStart", [Folded::Num(len), rest @ ..]) => pad(s, *len, rest, true)?,
        ("padEnd", [Folded::Num(len), rest @ ..]) => pad(s, *len, rest, false)?,
        ("replace", [Folded::Str(from), Folded::Str(to)]) => s.replacen(from.as_str(), to, 1),
        ("replaceAll", [Folded::Str(from), Folded::Str(to)]) => s.replace(from.as_str(), to),
        ("slice", [Folded::Num(start)]) => slice(s, *start, None),
        ("slice", [Folded::Num(start), Folded::Num(end)]) => slice(s, *start, Some(*end)),
        ("substring", [Folded::Num(start)]) => substring(s, *start, None),
        ("substring", [Folded::Num(start), Folded::Num(end)]) => substring(s, *start, Some(*end)),
        _ => return None,
    };
    Some(Folded::Str(result))
}

fn pad(s: &str, target: f64, rest: &[Folded], at_start: bool) -> Option<String> {
    let filler = match rest {
        [] => " ".to_string(),
        [Folded::Str(filler)] => filler.clone(),
        _ => return None,
    };
    let current = s.chars().count();
    if target > MAX_RESULT_LEN as f64 {
        return None;
    }
    let target = if target.is_finite() && target > 0.0 {
        target as usize
    } else {
        0
    };
    if target <= current || filler.is_empty() {
        return Some(s.to_string());
    }

    let padding: String = filler.chars().cycle().take(target - current).collect();
    Some(if at_start {
        format!("{}{}", padding, s)
    } else {
        format!("{}{}", s, padding)
    })
}

/// Resolve a relative index the way `String.prototype.slice` does.
fn relative_index(index: f64, len: usize) -> usize {
    if index.is_nan() {
        return 0;
    }
    if index < 0.0 {
        let from_end = len as f64 + index.trunc();
        if from_end < 0.0 { 0 } else { from_end as usize }
    } else {
        (index.trunc() as usize).min(len)
    }
}

fn clamp_index(index: f64, len: usize) -> usize {
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index.trunc() as usize).min(len)
    }
}

fn slice(s: &str, start: f64, end: Option<f64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let start = relative_index(start, chars.len());
    let end = end.map_or(chars.len(), |end| relative_index(end, chars.len()));
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

fn substring(s: &str, start: f64, end: Option<f64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let start = clamp_index(start, chars.len());
    let end = end.map_or(chars.len(), |end| clamp_index(end, chars.len()));
    let (lo, hi) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };
    chars[lo..hi].iter().collect()
}

/// `format(fmt, ...args)` with `%s`, `%d` and `%%`.
///
/// Placeholders without a matching argument stay as written; surplus arguments are appended
/// separated by spaces.
fn format(args: &[Folded]) -> Option<Folded> {
    let (Folded::Str(template), rest) = args.split_first()? else {
        return None;
    };

    let mut values = rest.iter();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') => {
                chars.next();
                match values.next() {
                    Some(value) => out.push_str(&value.to_js_string()),
                    None => out.push_str("%s"),
                }
            }
            Some('d') => {
                chars.next();
                match values.next() {
                    Some(Folded::Num(n)) => out.push_str(&format_number(n.trunc())),
                    Some(_) => return None,
                    None => out.push_str("%d"),
                }
            }
            _ => out.push('%'),
        }
    }
    for value in values {
        out.push(' ');
        out.push_str(&value.to_js_string());
    }
    Some(Folded::Str(out))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::eval::builtins::*;

    fn s(value: &str) -> Folded {
        Folded::Str(value.to_string())
    }

    fn call(name: &str, receiver: &str, args: &[Folded]) -> Folded {
        invoke(None, name, Some(&s(receiver)), args).unwrap()
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(call("toUpperCase", "save", &[]), s("SAVE"));
        assert_eq!(call("trim", "  a  ", &[]), s("a"));
        assert_eq!(call("trimEnd", "  a  ", &[]), s("  a"));
    }

    #[test]
    fn test_padding_and_repeat() {
        assert_eq!(call("padStart", "7", &[Folded::Num(3.0), s("0")]), s("007"));
        assert_eq!(call("padEnd", "ab", &[Folded::Num(5.0)]), s("ab   "));
        assert_eq!(call("repeat", "ab", &[Folded::Num(2.0)]), s("abab"));
    }

    #[test]
    fn test_oversized_results_are_refused() {
        let refused = |name: &str, args: &[Folded]| {
            invoke(Some("string"), name, Some(&s("ab")), args).unwrap_err()
        };
        let invalid = |name: &str| EvalReason::InvalidArguments(name.to_string());

        assert_eq!(refused("repeat", &[Folded::Num(1e19)]), invalid("repeat"));
        assert_eq!(refused("padStart", &[Folded::Num(1e15)]), invalid("padStart"));
        assert_eq!(
            refused("padEnd", &[Folded::Num(f64::INFINITY)]),
            invalid("padEnd")
        );
        assert_eq!(
            call("repeat", "ab", &[Folded::Num((MAX_RESULT_LEN / 2) as f64)]).to_js_string().len(),
            MAX_RESULT_LEN
        );
    }

    #[test]
    fn test_slice_and_substring() {
        assert_eq!(call("slice", "Hello", &[Folded::Num(-3.0)]), s("llo"));
        assert_eq!(
            call("slice", "Hello", &[Folded::Num(1.0), Folded::Num(-1.0)]),
            s("ell")
        );
        assert_eq!(
            call("substring", "Hello", &[Folded::Num(4.0), Folded::Num(1.0)]),
            s("ell")
        );
    }

    #[test]
    fn test_replace_first_and_all() {
        assert_eq!(call("replace", "a-b-c", &[s("-"), s("+")]), s("a+b-c"));
        assert_eq!(call("replaceAll", "a-b-c", &[s("-"), s("+")]), s("a+b+c"));
    }

    #[test]
    fn test_join() {
        let array = Folded::Array(vec![s("a"), Folded::Num(1.0), Folded::Null]);
        assert_eq!(
            invoke(None, "join", Some(&array), &[s(" / ")]).unwrap(),
            s("a / 1 / ")
        );
    }

    #[test]
    fn test_format_placeholders() {
        let result = invoke(
            Some("src/util"),
            "format",
            None,
            &[s("%s has %d items (100%%)"), s("Cart"), Folded::Num(3.0)],
        )
        .unwrap();
        assert_eq!(result, s("Cart has 3 items (100%)"));
    }

    #[test]
    fn test_global_string_conversion() {
        assert_eq!(
            invoke(Some(GLOBAL_OWNER), "String", None, &[Folded::Num(42.0)]).unwrap(),
            s("42")
        );
        assert_eq!(
            construct(Some("globalThis#String"), &[s("x")]).unwrap(),
            s("x")
        );
    }

    #[test]
    fn test_unknown_operations_are_refused() {
        assert_eq!(
            invoke(None, "eval", None, &[s("1")]).unwrap_err(),
            EvalReason::UnsupportedCall("eval".to_string())
        );
        assert_eq!(
            invoke(None, "split", Some(&s("a,b")), &[s(",")]).unwrap_err(),
            EvalReason::InvalidArguments("split".to_string())
        );
        assert_eq!(
            construct(Some("src/app#Widget"), &[]).unwrap_err(),
            EvalReason::UnsupportedCall("new Widget".to_string())
        );
    }
}
