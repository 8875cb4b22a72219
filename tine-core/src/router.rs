//! Request parsing and route rewriting.
//!
//! The [`Router`] turns a raw request (HTTP-shaped or CLI-simulated) into
//! a lowercased method, a slash-delimited segment list, `name=value`
//! filter tokens, request variables and an optional file extension. A
//! configured table of regex rewrite rules is applied first: the earliest
//! matching pattern rewrites the URL (with `$N` backreference
//! substitution) and the segments come from the rewritten path.
//!
//! The router reads nothing global. All request data comes through a
//! [`RequestSource`], so the router itself is a pure function of
//! `(method, raw url, variables, route table, config)` and can be handed
//! a [`StaticSource`] in tests or spoofed sub-requests.
//!
//! Parsing is lazy: accessors trigger [`Router::init`] on first use, and
//! re-running `init` recomputes every derived field from scratch.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::RouteError;

/// The delimiter that marks a path segment as a filter.
pub const FILTER_DELIMITER: char = '=';

/// Request variables parsed from the query string or body.
pub type Variables = BTreeMap<String, String>;

/// A filter value: one value, or a list when the filter name repeats.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    /// A filter that appeared once.
    One(String),
    /// A filter that appeared more than once, in path order.
    Many(Vec<String>),
}

impl FilterValue {
    fn push(&mut self, value: &str) {
        match self {
            FilterValue::One(first) => {
                *self = FilterValue::Many(vec![std::mem::take(first), value.to_string()]);
            }
            FilterValue::Many(values) => values.push(value.to_string()),
        }
    }

    /// The first (or only) value.
    pub fn first(&self) -> &str {
        match self {
            FilterValue::One(value) => value,
            FilterValue::Many(values) => values.first().map_or("", String::as_str),
        }
    }
}

/// Where the router reads its raw request data from.
///
/// Every accessor has a do-nothing default so a source only implements
/// what its transport actually provides.
pub trait RequestSource {
    /// Whether this source is a CLI entry point.
    fn is_cli(&self) -> bool {
        false
    }

    /// CLI arguments: `argv[1]` = method, `argv[2]` = URL, `argv[3]` =
    /// URL-encoded variables.
    fn argv(&self) -> &[String] {
        &[]
    }

    /// The transport request method, if any.
    fn method(&self) -> Option<&str> {
        None
    }

    /// The path info portion of the request, if the server provides one.
    fn path_info(&self) -> Option<&str> {
        None
    }

    /// The full request URI.
    fn request_uri(&self) -> Option<&str> {
        None
    }

    /// The query-string variables.
    fn get_variables(&self) -> Variables {
        Variables::new()
    }

    /// The parsed request body variables.
    fn post_variables(&self) -> Variables {
        Variables::new()
    }

    /// The raw request body.
    fn raw_input(&self) -> Option<&str> {
        None
    }

    /// Whether the request arrived over a secure transport.
    fn secure(&self) -> bool {
        false
    }
}

/// A fixed, in-memory request source.
///
/// Used by tests and by internal sub-requests, where every field is
/// supplied up front.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    /// The transport request method.
    pub method: Option<String>,
    /// The path info portion of the request.
    pub path_info: Option<String>,
    /// The full request URI.
    pub request_uri: Option<String>,
    /// Query-string variables.
    pub get: Variables,
    /// Body variables.
    pub post: Variables,
    /// The raw request body.
    pub raw_input: Option<String>,
    /// Whether the request arrived over a secure transport.
    pub secure: bool,
    /// CLI arguments.
    pub argv: Vec<String>,
    /// Whether this source is a CLI entry point.
    pub cli: bool,
}

impl RequestSource for StaticSource {
    fn is_cli(&self) -> bool {
        self.cli
    }

    fn argv(&self) -> &[String] {
        &self.argv
    }

    fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn path_info(&self) -> Option<&str> {
        self.path_info.as_deref()
    }

    fn request_uri(&self) -> Option<&str> {
        self.request_uri.as_deref()
    }

    fn get_variables(&self) -> Variables {
        self.get.clone()
    }

    fn post_variables(&self) -> Variables {
        self.post.clone()
    }

    fn raw_input(&self) -> Option<&str> {
        self.raw_input.as_deref()
    }

    fn secure(&self) -> bool {
        self.secure
    }
}

/// Everything `init` derives from the raw request.
#[derive(Clone, Debug, Default)]
struct RouteState {
    method: String,
    relative_url: String,
    routed_url: Option<String>,
    segments: Vec<String>,
    filters: BTreeMap<String, FilterValue>,
    variables: Variables,
    raw_data: Option<String>,
    extension: Option<String>,
}

/// Parses the request URL or CLI args, applies the rewrite table and
/// splits the result into segments and filters.
pub struct Router {
    source: Rc<dyn RequestSource>,
    base_url: String,
    end_slash: bool,
    mixed_post: bool,
    cli: Cell<bool>,
    routes: RefCell<Vec<(Regex, String)>>,
    state: RefCell<Option<RouteState>>,
}

impl Router {
    /// Creates a router over the source passed.
    ///
    /// `base_url` is the front controller path stripped from detected
    /// URLs; `end_slash` forces extensionless URLs to end with a slash;
    /// `mixed_post` merges query variables into POST variables.
    pub fn new(
        source: Rc<dyn RequestSource>,
        base_url: impl Into<String>,
        end_slash: bool,
        mixed_post: bool,
    ) -> Self {
        Self {
            source,
            base_url: base_url.into(),
            end_slash,
            mixed_post,
            cli: Cell::new(false),
            routes: RefCell::new(Vec::new()),
            state: RefCell::new(None),
        }
    }

    /// Compiles and installs the rewrite table. Rules apply in
    /// declaration order and at most one rewrites any given request.
    pub fn set_routes<'a, I>(&self, routes: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut compiled = Vec::new();
        for (pattern, replacement) in routes {
            compiled.push((Regex::new(pattern)?, replacement.to_string()));
        }
        *self.routes.borrow_mut() = compiled;
        Ok(())
    }

    /// Flags the router as CLI-driven when its source is a CLI entry
    /// point. Must be called before `init` if CLI access is possible.
    pub fn detect_cli(&self) {
        self.cli.set(self.source.is_cli());
    }

    /// Initializes the URL data: resolves the method, loads the URL,
    /// gathers the variables, applies the rewrite table and parses the
    /// result into segments and filters.
    ///
    /// Every argument overrides the corresponding detected value.
    /// Re-running recomputes all derived fields from scratch.
    pub fn init(
        &self,
        method: Option<&str>,
        relative_url: Option<&str>,
        variables: Option<Variables>,
    ) {
        let prior = self.state.borrow_mut().take();

        let method = match method {
            Some(method) => method.to_lowercase(),
            None if self.cli.get() => self
                .source
                .argv()
                .get(1)
                .map(|method| method.to_lowercase())
                .unwrap_or_else(|| "get".into()),
            None => self
                .source
                .method()
                .unwrap_or("get")
                .to_lowercase(),
        };

        let relative_url = match relative_url {
            Some(url) => url.to_string(),
            None => match prior.filter(|state| !state.relative_url.is_empty()) {
                Some(state) => state.relative_url,
                None => self.detect_url(),
            },
        };

        let (variables, raw_data) = match variables {
            Some(variables) => (variables, None),
            None => self.detect_variables(&method),
        };

        let routed_url = self.route_url(&relative_url);
        let (segments, filters, extension) = parse_url(&relative_url, routed_url.as_deref());

        let relative_url = if self.end_slash && extension.is_none() {
            let mut trimmed = relative_url
                .trim_end_matches([' ', '/'])
                .to_string();
            trimmed.push('/');
            trimmed
        } else {
            relative_url
        };

        *self.state.borrow_mut() = Some(RouteState {
            method,
            relative_url,
            routed_url,
            segments,
            filters,
            variables,
            raw_data,
            extension,
        });
    }

    /// Checks for a CLI URL first, then path info, then the request URI,
    /// stripping the base path and normalizing doubled slashes.
    fn detect_url(&self) -> String {
        let relative = if self.cli.get() {
            self.source.argv().get(2).cloned().unwrap_or_default()
        } else if let Some(path_info) = self.source.path_info().filter(|info| !info.is_empty()) {
            self.strip_base(path_info)
        } else if let Some(uri) = self.source.request_uri().filter(|uri| !uri.is_empty()) {
            self.strip_base(uri)
        } else {
            "/".to_string()
        };

        clean_url(&relative)
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn strip_base(&self, url: &str) -> String {
        if self.base_url.is_empty() {
            url.to_string()
        } else {
            url.replace(&self.base_url, "")
        }
    }

    /// Gathers the request variables from the source appropriate to the
    /// method, along with the raw body for PUT and POST requests.
    fn detect_variables(&self, method: &str) -> (Variables, Option<String>) {
        if self.cli.get() {
            let variables = self
                .source
                .argv()
                .get(3)
                .map(|query| parse_query_str(query))
                .unwrap_or_default();
            return (variables, None);
        }

        match method {
            "get" | "head" => (self.source.get_variables(), None),
            "post" => {
                let variables = if self.mixed_post {
                    let mut merged = self.source.get_variables();
                    merged.extend(self.source.post_variables());
                    merged
                } else {
                    self.source.post_variables()
                };
                (variables, self.source.raw_input().map(str::to_string))
            }
            "put" => {
                let raw = self.source.raw_input().map(str::to_string);
                let variables = raw.as_deref().map(parse_query_str).unwrap_or_default();
                (variables, raw)
            }
            _ => (Variables::new(), None),
        }
    }

    /// Applies the first matching rewrite rule, substituting `$N`
    /// backreferences from the match groups.
    fn route_url(&self, relative_url: &str) -> Option<String> {
        for (pattern, replacement) in self.routes.borrow().iter() {
            if let Some(captures) = pattern.captures(relative_url) {
                let mut route = replacement.clone();
                let mut substituted = false;
                for backref in backref_pattern().captures_iter(replacement) {
                    let group: usize = backref[1].parse().unwrap_or_default();
                    let text = captures.get(group).map_or("", |m| m.as_str());
                    route = route.replace(&backref[0], text);
                    substituted = true;
                }
                if substituted {
                    route = collapse_slashes(&route);
                }
                return Some(route);
            }
        }
        None
    }

    //-----------------------------------------------------------------
    //   get and set methods
    //-----------------------------------------------------------------

    fn state(&self) -> Ref<'_, RouteState> {
        if self.state.borrow().is_none() {
            self.init(None, None, None);
        }
        Ref::map(self.state.borrow(), |state| match state {
            Some(state) => state,
            None => unreachable!("init just populated the state"),
        })
    }

    /// The CLI flag. Only [`Router::detect_cli`] sets it.
    pub fn cli(&self) -> bool {
        self.cli.get()
    }

    /// The lowercased request method.
    pub fn method(&self) -> String {
        self.state().method.clone()
    }

    /// The base path of the system relative to the doc root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The URL excluding the base URL.
    pub fn relative_url(&self) -> String {
        self.state().relative_url.clone()
    }

    /// The post-rewrite URL, if a rewrite rule matched.
    pub fn routed_url(&self) -> Option<String> {
        self.state().routed_url.clone()
    }

    /// The base URL, the relative URL, and optionally the query string
    /// joined back together.
    pub fn full_url(&self, with_query_string: bool, encode: bool) -> String {
        let state = self.state();
        let mut url = format!("{}{}", self.base_url, state.relative_url);

        if with_query_string && state.method == "get" && !state.variables.is_empty() {
            let amp = if encode { "&amp;" } else { "&" };
            url.push_str(if url.contains('?') { amp } else { "?" });
            url.push_str(&build_query(&state.variables, amp));
        }

        url
    }

    /// The file extension of the current page, if there is one.
    pub fn extension(&self) -> Option<String> {
        self.state().extension.clone()
    }

    /// The URL segment at the position passed.
    pub fn segment(&self, position: usize) -> Option<String> {
        self.state().segments.get(position).cloned()
    }

    /// All the URL segments in order.
    pub fn segments(&self) -> Vec<String> {
        self.state().segments.clone()
    }

    /// The value of the URL filter, if it exists.
    pub fn filter(&self, name: &str) -> Option<FilterValue> {
        self.state().filters.get(name).cloned()
    }

    /// All the URL filters.
    pub fn filters(&self) -> BTreeMap<String, FilterValue> {
        self.state().filters.clone()
    }

    /// The value of the request variable, if it exists.
    pub fn variable(&self, name: &str) -> Option<String> {
        self.state().variables.get(name).cloned()
    }

    /// All the request variables.
    pub fn variables(&self) -> Variables {
        self.state().variables.clone()
    }

    /// The raw request body, for PUT and POST requests.
    pub fn raw_data(&self) -> Option<String> {
        self.state().raw_data.clone()
    }

    /// Whether the request arrived over a secure transport.
    pub fn secure(&self) -> bool {
        self.source.secure()
    }
}

impl Clone for Router {
    /// A cloned router is never itself a CLI entry point, so the CLI flag
    /// is reset; the parsed state is copied and independently mutable.
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            base_url: self.base_url.clone(),
            end_slash: self.end_slash,
            mixed_post: self.mixed_post,
            cli: Cell::new(false),
            routes: RefCell::new(self.routes.borrow().clone()),
            state: RefCell::new(self.state.borrow().clone()),
        }
    }
}

fn backref_pattern() -> &'static Regex {
    static BACKREF: OnceLock<Regex> = OnceLock::new();
    BACKREF.get_or_init(|| Regex::new(r"\$([0-9])").expect("static pattern compiles"))
}

/// Collapses runs of slashes to a single slash.
fn collapse_slashes(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Collapses doubled slashes to a single slash, except in runs that
/// directly follow a colon (`scheme://host` stays intact).
fn clean_url(url: &str) -> String {
    let trimmed = url.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;

    for c in trimmed.chars() {
        if c == '/' {
            run += 1;
            continue;
        }
        flush_slashes(&mut out, run, prev);
        out.push(c);
        prev = Some(c);
        run = 0;
    }
    flush_slashes(&mut out, run, prev);
    out
}

fn flush_slashes(out: &mut String, run: usize, prev: Option<char>) {
    let emit = if prev == Some(':') {
        run.min(2)
    } else {
        run.min(1)
    };
    for _ in 0..emit {
        out.push('/');
    }
}

/// Splits the URL on `/`, extracting `name=value` filters and dropping
/// empty segments. A segment *starting* with the delimiter is a plain
/// segment, not a filter. The extension is the suffix after the last dot
/// of the original relative URL.
fn parse_url(
    relative_url: &str,
    routed_url: Option<&str>,
) -> (
    Vec<String>,
    BTreeMap<String, FilterValue>,
    Option<String>,
) {
    let source = routed_url.unwrap_or(relative_url);
    let mut segments = Vec::new();
    let mut filters: BTreeMap<String, FilterValue> = BTreeMap::new();

    for segment in source.split('/') {
        match segment.find(FILTER_DELIMITER) {
            Some(position) if position > 0 => {
                let name = &segment[..position];
                let value = &segment[position + 1..];
                filters
                    .entry(name.to_string())
                    .and_modify(|existing| existing.push(value))
                    .or_insert_with(|| FilterValue::One(value.to_string()));
            }
            _ => {
                if !segment.is_empty() {
                    segments.push(segment.to_string());
                }
            }
        }
    }

    let extension = match relative_url.find('.') {
        Some(position) if position > 0 => relative_url
            .rfind('.')
            .map(|last| relative_url[last + 1..].to_string()),
        _ => None,
    };

    (segments, filters, extension)
}

/// Parses a URL-encoded query string into variables. Duplicate names
/// keep the last value.
pub fn parse_query_str(query: &str) -> Variables {
    let mut variables = Variables::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((name, value)) => {
                variables.insert(url_decode(name), url_decode(value));
            }
            None => {
                variables.insert(url_decode(pair), String::new());
            }
        }
    }
    variables
}

/// Builds a URL-encoded query string from variables.
pub fn build_query(variables: &Variables, separator: &str) -> String {
    variables
        .iter()
        .map(|(name, value)| format!("{}={}", url_encode(name), url_encode(value)))
        .collect::<Vec<_>>()
        .join(separator)
}

fn url_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn url_decode(text: &str) -> String {
    let mut bytes = Vec::with_capacity(text.len());
    let mut input = text.bytes();
    while let Some(byte) = input.next() {
        match byte {
            b'+' => bytes.push(b' '),
            b'%' => {
                let high = input.next();
                let low = input.next();
                match (high, low) {
                    (Some(high), Some(low)) => {
                        let pair = [high, low];
                        match u8::from_str_radix(std::str::from_utf8(&pair).unwrap_or(""), 16) {
                            Ok(decoded) => bytes.push(decoded),
                            Err(_) => {
                                bytes.push(b'%');
                                bytes.push(high);
                                bytes.push(low);
                            }
                        }
                    }
                    _ => bytes.push(b'%'),
                }
            }
            _ => bytes.push(byte),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_router(uri: &str) -> Router {
        let source = StaticSource {
            method: Some("GET".into()),
            request_uri: Some(uri.into()),
            ..StaticSource::default()
        };
        Router::new(Rc::new(source), "", false, false)
    }

    #[test]
    fn filters_are_extracted_from_segments() {
        let router = http_router("/foo/page=2/bar/");
        assert_eq!(router.segments(), vec!["foo", "bar"]);
        assert_eq!(router.filter("page"), Some(FilterValue::One("2".into())));
        assert_eq!(router.filter("page").unwrap().first(), "2");
        assert_eq!(router.segment(0), Some("foo".into()));
        assert_eq!(router.segment(5), None);
    }

    #[test]
    fn repeated_filters_accumulate_into_a_list() {
        let router = http_router("/a/x=1/x=2/b/");
        assert_eq!(router.segments(), vec!["a", "b"]);
        assert_eq!(
            router.filter("x"),
            Some(FilterValue::Many(vec!["1".into(), "2".into()]))
        );
    }

    #[test]
    fn a_segment_starting_with_the_delimiter_is_not_a_filter() {
        let router = http_router("/foo/=bare/bar/");
        assert_eq!(router.segments(), vec!["foo", "=bare", "bar"]);
        assert!(router.filters().is_empty());
    }

    #[test]
    fn rewrite_substitutes_backreferences() {
        let router = http_router("/error/404/");
        router
            .set_routes(vec![("^/error/([0-9]{3}/?)", "/home/fatal/$1")])
            .unwrap();

        assert_eq!(router.routed_url(), Some("/home/fatal/404/".into()));
        assert_eq!(router.segments(), vec!["home", "fatal", "404"]);
        // the relative URL is untouched by routing
        assert_eq!(router.relative_url(), "/error/404/");
    }

    #[test]
    fn only_the_first_matching_rule_applies() {
        let router = http_router("/error/500/");
        router
            .set_routes(vec![
                ("^/error/([0-9]{3}/?)", "/home/fatal/$1"),
                ("^/error/", "/home/never/"),
            ])
            .unwrap();
        assert_eq!(router.routed_url(), Some("/home/fatal/500/".into()));
    }

    #[test]
    fn missing_backreference_groups_substitute_empty() {
        let router = http_router("/error/");
        router
            .set_routes(vec![("^/error/([0-9]{3}/?)?", "/home/fatal/$1")])
            .unwrap();
        // the unmatched group collapses away along with its slash
        assert_eq!(router.routed_url(), Some("/home/fatal/".into()));
    }

    #[test]
    fn malformed_patterns_are_a_route_error() {
        let router = http_router("/");
        assert!(matches!(
            router.set_routes(vec![("([", "/broken/")]),
            Err(RouteError::Pattern(_))
        ));
    }

    #[test]
    fn reinit_is_idempotent() {
        let router = http_router("/foo/page=2/bar.xml");
        router
            .set_routes(vec![("^/never/", "/matches/")])
            .unwrap();
        router.init(None, None, None);
        let first = (
            router.segments(),
            router.filters(),
            router.extension(),
            router.routed_url(),
        );

        router.init(None, None, None);
        let second = (
            router.segments(),
            router.filters(),
            router.extension(),
            router.routed_url(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn extension_comes_from_the_last_dot() {
        let router = http_router("/api/encoders.json");
        assert_eq!(router.extension(), Some("json".into()));
        assert_eq!(router.segments(), vec!["api", "encoders.json"]);

        let router = http_router("/api/encoders/");
        assert_eq!(router.extension(), None);
    }

    #[test]
    fn end_slash_is_forced_only_without_an_extension() {
        let source = StaticSource {
            method: Some("GET".into()),
            request_uri: Some("/foo/bar".into()),
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "", true, false);
        assert_eq!(router.relative_url(), "/foo/bar/");

        let source = StaticSource {
            method: Some("GET".into()),
            request_uri: Some("/feed.xml".into()),
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "", true, false);
        assert_eq!(router.relative_url(), "/feed.xml");
    }

    #[test]
    fn doubled_slashes_collapse_except_after_a_colon() {
        assert_eq!(clean_url("/foo//bar///baz/"), "/foo/bar/baz/");
        assert_eq!(clean_url("http://example/a//b"), "http://example/a/b");
        assert_eq!(clean_url("  /spaced/  "), "/spaced/");
    }

    #[test]
    fn cli_args_supply_method_url_and_variables() {
        let source = StaticSource {
            cli: true,
            argv: vec![
                "index".into(),
                "PUT".into(),
                "/api/foo.xml".into(),
                "bar=123&baz=456".into(),
            ],
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "", false, false);
        router.detect_cli();

        assert_eq!(router.method(), "put");
        assert_eq!(router.segments(), vec!["api", "foo.xml"]);
        assert_eq!(router.extension(), Some("xml".into()));
        assert_eq!(router.variable("bar"), Some("123".into()));
        assert_eq!(router.variable("baz"), Some("456".into()));
    }

    #[test]
    fn cli_defaults_to_get_when_argv_is_short() {
        let source = StaticSource {
            cli: true,
            argv: vec!["index".into()],
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "", false, false);
        router.detect_cli();
        assert_eq!(router.method(), "get");
    }

    #[test]
    fn a_clone_never_inherits_the_cli_flag() {
        let source = StaticSource {
            cli: true,
            argv: vec!["index".into(), "get".into(), "/cli/url/".into()],
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "", false, false);
        router.detect_cli();
        assert!(router.cli());

        let clone = router.clone();
        assert!(!clone.cli());

        // the clone is independently re-initializable
        clone.init(Some("POST"), Some("/spoofed/url/"), Some(Variables::new()));
        assert_eq!(clone.segments(), vec!["spoofed", "url"]);
        assert_eq!(router.segments(), vec!["cli", "url"]);
    }

    #[test]
    fn explicit_init_overrides_detection() {
        let router = http_router("/detected/");
        let mut variables = Variables::new();
        variables.insert("a".into(), "1".into());
        router.init(Some("DELETE"), Some("/explicit/"), Some(variables));

        assert_eq!(router.method(), "delete");
        assert_eq!(router.segments(), vec!["explicit"]);
        assert_eq!(router.variable("a"), Some("1".into()));
        assert_eq!(router.variables().len(), 1);
    }

    #[test]
    fn the_secure_flag_comes_from_the_source() {
        let source = StaticSource {
            method: Some("GET".into()),
            request_uri: Some("/".into()),
            secure: true,
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "", false, false);
        assert!(router.secure());
        assert_eq!(router.base_url(), "");
    }

    #[test]
    fn the_base_url_is_stripped_from_detected_urls() {
        let source = StaticSource {
            method: Some("GET".into()),
            request_uri: Some("/index.php/foo/bar/".into()),
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "/index.php", false, false);
        assert_eq!(router.segments(), vec!["foo", "bar"]);
    }

    #[test]
    fn mixed_post_merges_query_variables() {
        let mut get = Variables::new();
        get.insert("from_get".into(), "1".into());
        let mut post = Variables::new();
        post.insert("from_post".into(), "2".into());

        let source = StaticSource {
            method: Some("POST".into()),
            request_uri: Some("/submit/".into()),
            get: get.clone(),
            post: post.clone(),
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source.clone()), "", false, true);
        assert_eq!(router.variable("from_get"), Some("1".into()));
        assert_eq!(router.variable("from_post"), Some("2".into()));

        let router = Router::new(Rc::new(source), "", false, false);
        assert_eq!(router.variable("from_get"), None);
    }

    #[test]
    fn put_variables_parse_from_the_raw_body() {
        let source = StaticSource {
            method: Some("PUT".into()),
            request_uri: Some("/thing/1/".into()),
            raw_input: Some("name=fork&count=3".into()),
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "", false, false);
        assert_eq!(router.variable("name"), Some("fork".into()));
        assert_eq!(router.raw_data(), Some("name=fork&count=3".into()));
    }

    #[test]
    fn full_url_round_trips_get_variables() {
        let mut get = Variables::new();
        get.insert("q".into(), "a b".into());
        let source = StaticSource {
            method: Some("GET".into()),
            request_uri: Some("/search/".into()),
            get,
            ..StaticSource::default()
        };
        let router = Router::new(Rc::new(source), "/index.php", false, false);
        assert_eq!(router.full_url(true, false), "/index.php/search/?q=a+b");
        assert_eq!(router.full_url(false, false), "/index.php/search/");
    }

    #[test]
    fn query_strings_decode_and_last_value_wins() {
        let variables = parse_query_str("a=1&b=two%20words&a=3&flag");
        assert_eq!(variables.get("a"), Some(&"3".to_string()));
        assert_eq!(variables.get("b"), Some(&"two words".to_string()));
        assert_eq!(variables.get("flag"), Some(&String::new()));
    }
}
