//! Pure helpers turning path segments into route names and URL paths.
//!
//! Route names are snake case joined with [`NAME_SEPARATOR`]; URL path segments
//! are kebab case. Nothing here touches the filesystem.

/// Separator between the words of a route name.
pub const NAME_SEPARATOR: char = '_';

/// One piece of a path segment: literal text or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Literal(String),
    Param {
        name: String,
        default: Option<String>,
        catch_all: bool,
    },
}

/// Splits `input` into lower-cased words on camel-case boundaries and on runs
/// of non-alphanumeric characters.
pub fn words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut words);
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                flush(&mut current, &mut words);
            }
        }
        current.extend(c.to_lowercase());
    }
    flush(&mut current, &mut words);
    words
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn kebab(segment: &str) -> String {
    words(segment).join("-")
}

/// Route name for a template: every word of `segments` then `base_name`,
/// joined with `_`.
///
/// ```
/// use pageroute::route::builder::route_name;
///
/// assert_eq!(route_name(&["Pages", "Blog"], "index"), "pages_blog_index");
/// assert_eq!(route_name(&["Pages", "UserProfile"], "edit--form"), "pages_user_profile_edit_form");
/// ```
pub fn route_name<S: AsRef<str>>(segments: &[S], base_name: &str) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .chain(std::iter::once(base_name))
        .flat_map(words)
        .collect::<Vec<_>>()
        .join(&NAME_SEPARATOR.to_string())
}

/// True when `base_name` is the index token and collapses onto its directory.
pub fn is_index(base_name: &str, index_token: &str) -> bool {
    base_name.eq_ignore_ascii_case(index_token)
}

/// URL path for a template.
///
/// Segments and base name are kebab-cased and joined with `/`, a base name
/// equal to `index_token` is dropped, and a non-empty `prefix` is prepended
/// verbatim. The result always starts with `/`.
///
/// ```
/// use pageroute::route::builder::route_path;
///
/// assert_eq!(route_path(&["Blog"], "index", None, "index"), "/blog");
/// assert_eq!(route_path(&["Blog"], "detail", None, "index"), "/blog/detail");
/// assert_eq!(route_path::<&str>(&[], "about", Some("/{_locale}/"), "index"), "/{_locale}/about");
/// ```
pub fn route_path<S: AsRef<str>>(
    segments: &[S],
    base_name: &str,
    prefix: Option<&str>,
    index_token: &str,
) -> String {
    let mut parts: Vec<String> = segments
        .iter()
        .map(|s| kebab(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect();
    if !is_index(base_name, index_token) {
        let base = kebab(base_name);
        if !base.is_empty() {
            parts.push(base);
        }
    }

    let mut path = String::new();
    if let Some(prefix) = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        path.push('/');
        path.push_str(prefix);
    }
    for part in parts {
        path.push('/');
        path.push_str(&part);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Joins a class-level path prefix and a method-level path.
pub fn combine(class_prefix: &str, method_path: &str) -> String {
    let class = class_prefix.trim_end_matches('/');
    let method = method_path.trim_start_matches('/');
    let class = if class.is_empty() || class.starts_with('/') {
        class.to_string()
    } else {
        format!("/{class}")
    };

    match (class.is_empty(), method.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => class,
        (true, false) => format!("/{method}"),
        (false, false) => format!("{class}/{method}"),
    }
}

/// Canonical form of a path pattern, for equality checks only.
///
/// Slashes are unified and collapsed, the trailing slash is dropped and every
/// placeholder becomes `{}` (`{*}` for catch-alls), whatever its name,
/// requirement or default.
///
/// ```
/// use pageroute::route::builder::normalize;
///
/// assert_eq!(normalize("/a//b/"), "/a/b");
/// assert_eq!(normalize("/post/{id<\\d+>}"), normalize("/post/:slug"));
/// ```
pub fn normalize(path: &str) -> String {
    let segments: Vec<String> = split_segments(path)
        .map(|segment| {
            pieces(segment)
                .into_iter()
                .map(|piece| match piece {
                    Piece::Literal(text) => text,
                    Piece::Param { catch_all: true, .. } => "{*}".to_string(),
                    Piece::Param { .. } => "{}".to_string(),
                })
                .collect::<String>()
        })
        .collect();
    join_segments(segments)
}

/// Rewrites placeholders into the `{name}` / `{*name}` syntax axum expects.
pub fn to_axum_path(path: &str) -> String {
    let segments: Vec<String> = split_segments(path)
        .map(|segment| {
            pieces(segment)
                .into_iter()
                .map(|piece| match piece {
                    Piece::Literal(text) => text,
                    Piece::Param {
                        name,
                        catch_all: true,
                        ..
                    } => format!("{{*{name}}}"),
                    Piece::Param { name, .. } => format!("{{{name}}}"),
                })
                .collect::<String>()
        })
        .collect();
    join_segments(segments)
}

pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty())
}

pub(crate) fn join_segments(segments: Vec<String>) -> String {
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Splits one path segment into literal text and placeholders.
///
/// Understands `{name}`, `{name<req>?default}`, `{name:req}`, `{*rest}`,
/// `:name`, `*rest` and `<name>`.
pub(crate) fn pieces(segment: &str) -> Vec<Piece> {
    if let Some(name) = segment.strip_prefix(':').filter(|n| !n.is_empty()) {
        return vec![param(name, None, false)];
    }
    if let Some(name) = segment.strip_prefix('*') {
        return vec![param(name, None, true)];
    }
    if segment.len() > 2 && segment.starts_with('<') && segment.ends_with('>') {
        return vec![param(&segment[1..segment.len() - 1], None, false)];
    }

    let mut result = Vec::new();
    let mut literal = String::new();
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            result.push(Piece::Literal(std::mem::take(&mut literal)));
        }
        let mut depth = 1;
        let mut inner = String::new();
        for n in chars.by_ref() {
            match n {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            inner.push(n);
        }
        result.push(parse_braced(&inner));
    }
    if !literal.is_empty() {
        result.push(Piece::Literal(literal));
    }
    result
}

fn parse_braced(inner: &str) -> Piece {
    let inner = inner.trim();
    let (catch_all, body) = match inner.strip_prefix('*') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name_end = body
        .find(|c: char| matches!(c, '<' | '?' | ':'))
        .unwrap_or(body.len());

    let mut depth = 0usize;
    let mut default = None;
    for (i, c) in body[name_end..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '?' if depth == 0 => {
                default = Some(body[name_end + i + 1..].to_string());
                break;
            }
            _ => {}
        }
    }
    param(&body[..name_end], default, catch_all)
}

fn param(name: &str, default: Option<String>, catch_all: bool) -> Piece {
    Piece::Param {
        name: name.trim().to_string(),
        default,
        catch_all,
    }
}
