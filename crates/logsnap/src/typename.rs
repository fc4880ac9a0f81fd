//! Inspection of `core::any::type_name` strings.
//!
//! Type names are best-effort text, so everything here degrades to "not
//! recognised" rather than failing.

const PRIMITIVES: &[&str] = &[
    "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64", "()",
];

const STRINGS: &[&str] = &[
    "str",
    "alloc::string::String",
    "alloc::borrow::Cow<str>",
    "alloc::boxed::Box<str>",
    "alloc::rc::Rc<str>",
    "alloc::sync::Arc<str>",
];

const FORMATTED_MESSAGES: &[&str] = &["core::fmt::Arguments"];

// Dynamic values that already carry their own structure.
const SELF_DESCRIBING: &[&str] = &["serde_json::value::Value"];

// Wrappers whose `Serialize` always forwards to their first type argument.
const FORWARDING: &[&str] = &[
    "core::option::Option",
    "alloc::boxed::Box",
    "alloc::rc::Rc",
    "alloc::sync::Arc",
    "alloc::borrow::Cow",
];

// Cells forward too, but can fail on their own (a `RefCell` that is
// mutably borrowed).
const INTERIOR: &[&str] = &["core::cell::Cell", "core::cell::RefCell"];

/// Drops leading `&` / `&mut ` so a reference names the same type as its
/// referent.
pub fn strip_refs(name: &str) -> &str {
    let mut name = name.trim();
    loop {
        if let Some(rest) = name.strip_prefix("&mut ") {
            name = rest;
        } else if let Some(rest) = name.strip_prefix('&') {
            name = rest;
        } else {
            return name;
        }
    }
}

/// Name of the type that actually produces the serialized data: references
/// and transparent wrappers such as `Option`, `Box` or `RefCell` are peeled
/// off.
pub fn runtime_name(name: &str) -> &str {
    peel(name, &[FORWARDING, INTERIOR])
}

/// Like [`runtime_name`], but stops at cells: a failure of the returned type
/// is a failure of `name` and the other way round.
pub fn forwarded_name(name: &str) -> &str {
    peel(name, &[FORWARDING])
}

fn peel<'a>(name: &'a str, wrappers: &[&[&str]]) -> &'a str {
    let mut name = strip_refs(name);
    loop {
        let outer = name.split('<').next().unwrap_or(name);
        if !wrappers.iter().any(|set| set.contains(&outer)) {
            return name;
        }
        match generic_args(name).first() {
            Some(inner) => name = strip_refs(inner),
            None => return name,
        }
    }
}

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&strip_refs(name))
}

pub fn is_string(name: &str) -> bool {
    STRINGS.contains(&strip_refs(name))
}

pub fn is_formatted_message(name: &str) -> bool {
    FORMATTED_MESSAGES.contains(&strip_refs(name))
}

pub fn is_primitive_or_string(name: &str) -> bool {
    is_primitive(name) || is_string(name)
}

/// Closures, async blocks and `impl Trait` types have compiler-chosen names.
pub fn is_anonymous(name: &str) -> bool {
    name.contains("{{")
}

pub fn is_self_describing(name: &str) -> bool {
    SELF_DESCRIBING.contains(&strip_refs(name))
}

/// Arrays, slices and tuples: built-in sequence types with no type
/// parameters of their own.
pub fn is_array_like(name: &str) -> bool {
    let name = strip_refs(name);
    name.starts_with('[') || name.starts_with('(')
}

/// Type arguments of the outermost path, e.g. `["u32", "my::Order"]` for
/// `std::collections::hash::map::HashMap<u32, my::Order>`.
pub fn generic_args(name: &str) -> Vec<&str> {
    let name = strip_refs(name);
    let Some(open) = name.find('<') else {
        return Vec::new();
    };
    let Some(inner) = name[open + 1..].strip_suffix('>') else {
        return Vec::new();
    };
    split_top_level(inner, &[','])
}

/// Element type of an array, slice or tuple type name.
pub fn array_element(name: &str) -> Option<&str> {
    let name = strip_refs(name);
    let inner = if let Some(rest) = name.strip_prefix('[') {
        rest.strip_suffix(']')?
    } else {
        name.strip_prefix('(')?.strip_suffix(')')?
    };
    split_top_level(inner, &[';', ',']).into_iter().next()
}

fn split_top_level<'a>(s: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && separators.contains(&c) => {
                out.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        out.push(last);
    }
    out
}
