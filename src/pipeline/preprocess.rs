//! Content preprocessing: keyed field rewrites over the whole document tree.
//!
//! The document is walked recursively. Every object entry whose key has a
//! rewrite rule and whose value is a string is replaced by the rule's output;
//! everything else is left exactly as it was. Depth and position in the tree
//! play no part in whether a field is rewritten.
//!
//! | Key | Rewrite |
//! |-----|---------|
//! | `summary` | Markdown → HTML |
//! | `website` | URL string → structured URL object |

use pulldown_cmark::{html, Parser};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

/// A rewrite for one string field. `None` leaves the value unchanged.
pub type RewriteFn = fn(&str) -> Option<Value>;

/// Recursive visitor applying a table of keyed rewrite rules.
#[derive(Clone)]
pub struct Preprocessor {
    rules: Vec<(&'static str, RewriteFn)>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            rules: vec![("summary", render_markdown), ("website", parse_url)],
        }
    }
}

impl Preprocessor {
    /// A visitor with no rules; [`apply`](Self::apply) is then the identity.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add or replace the rule for `key`.
    pub fn with_rule(mut self, key: &'static str, rewrite: RewriteFn) -> Self {
        self.rules.retain(|(k, _)| *k != key);
        self.rules.push((key, rewrite));
        self
    }

    fn rule_for(&self, key: &str) -> Option<RewriteFn> {
        self.rules
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, rewrite)| *rewrite)
    }

    /// Rewrite every matching field in `document`.
    pub fn apply(&self, mut document: Value) -> Value {
        self.visit(&mut document);
        debug!("Preprocessed document: {document}");
        document
    }

    fn visit(&self, node: &mut Value) {
        match node {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    let rewritten = match (self.rule_for(key), child.as_str()) {
                        (Some(rewrite), Some(text)) => rewrite(text),
                        _ => None,
                    };
                    match rewritten {
                        Some(value) => *child = value,
                        None => self.visit(child),
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.visit(item)),
            _ => {}
        }
    }
}

/// Apply the standard `summary`/`website` rules.
pub fn preprocess(document: Value) -> Value {
    Preprocessor::default().apply(document)
}

/// Markdown → HTML.
pub fn render_markdown(text: &str) -> Option<Value> {
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(text));
    Some(Value::String(out))
}

/// URL string → object with `href`, `protocol`, `host`, `hostname`, `port`,
/// `pathname`, `search`, `query`, `hash`, `path`, `auth` and `slashes`.
///
/// Bare hosts such as `example.com/a` are read as `http://`. Unparseable
/// values are left as strings.
pub fn parse_url(text: &str) -> Option<Value> {
    let parsed = match Url::parse(text) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{text}")),
        other => other,
    };
    match parsed {
        Ok(url) => Some(url_object(&url)),
        Err(e) => {
            warn!("Leaving unparseable website '{text}' unchanged: {e}");
            None
        }
    }
}

fn url_object(url: &Url) -> Value {
    let search = url.query().map(|q| format!("?{q}"));
    let path = format!("{}{}", url.path(), search.as_deref().unwrap_or(""));
    let auth = match (url.username(), url.password()) {
        ("", _) => None,
        (user, Some(pass)) => Some(format!("{user}:{pass}")),
        (user, None) => Some(user.to_string()),
    };
    let host = url.host_str().map(|h| match url.port() {
        Some(port) => format!("{h}:{port}"),
        None => h.to_string(),
    });

    json!({
        "href": url.as_str(),
        "protocol": format!("{}:", url.scheme()),
        "slashes": url.has_authority(),
        "auth": auth,
        "host": host,
        "hostname": url.host_str(),
        "port": url.port().map(|p| p.to_string()),
        "pathname": url.path(),
        "search": search,
        "query": url.query(),
        "hash": url.fragment().map(|f| format!("#{f}")),
        "path": path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_renders_markdown() {
        let out = preprocess(json!({ "summary": "**bold**" }));
        let summary = out["summary"].as_str().unwrap();
        assert!(summary.contains("<strong>bold</strong>"), "got: {summary}");
    }

    #[test]
    fn test_website_becomes_url_object() {
        let out = preprocess(json!({ "website": "https://example.com/a" }));
        assert_eq!(out["website"]["host"], "example.com");
        assert_eq!(out["website"]["hostname"], "example.com");
        assert_eq!(out["website"]["pathname"], "/a");
        assert_eq!(out["website"]["protocol"], "https:");
        assert_eq!(out["website"]["href"], "https://example.com/a");
        assert_eq!(out["website"]["search"], Value::Null);
    }

    #[test]
    fn test_url_query_port_and_fragment() {
        let url = parse_url("http://user:pw@example.com:8080/p?q=1#top").unwrap();
        assert_eq!(url["host"], "example.com:8080");
        assert_eq!(url["port"], "8080");
        assert_eq!(url["auth"], "user:pw");
        assert_eq!(url["search"], "?q=1");
        assert_eq!(url["query"], "q=1");
        assert_eq!(url["path"], "/p?q=1");
        assert_eq!(url["hash"], "#top");
    }

    #[test]
    fn test_bare_host_gets_http_scheme() {
        let url = parse_url("example.com/me").unwrap();
        assert_eq!(url["protocol"], "http:");
        assert_eq!(url["host"], "example.com");
        assert_eq!(url["pathname"], "/me");
    }

    #[test]
    fn test_unparseable_website_left_unchanged() {
        let doc = json!({ "website": "http://[::1" });
        assert_eq!(preprocess(doc.clone()), doc);
    }

    #[test]
    fn test_rules_apply_at_any_depth() {
        let doc = json!({
            "summary": "*top*",
            "work": [
                { "projects": [{ "summary": "*deep*", "website": "https://deep.example/x" }] }
            ]
        });
        let out = preprocess(doc);
        assert!(out["summary"].as_str().unwrap().contains("<em>top</em>"));
        let deep = &out["work"][0]["projects"][0];
        assert!(deep["summary"].as_str().unwrap().contains("<em>deep</em>"));
        assert_eq!(deep["website"]["host"], "deep.example");
        assert_eq!(deep["website"]["pathname"], "/x");
    }

    #[test]
    fn test_document_without_rewritten_fields_is_identical() {
        let doc = json!({
            "basics": { "name": "Ada", "location": { "city": "London" } },
            "skills": [{ "name": "Maths", "keywords": ["analysis", 1, true, null] }],
            "summaryCount": 3
        });
        assert_eq!(preprocess(doc.clone()), doc);
    }

    #[test]
    fn test_non_string_fields_are_descended_not_rewritten() {
        let doc = json!({ "summary": { "summary": "**x**" }, "website": 7 });
        let out = preprocess(doc);
        assert!(out["summary"]["summary"].as_str().unwrap().contains("<strong>x</strong>"));
        assert_eq!(out["website"], 7);
    }

    #[test]
    fn test_custom_rules() {
        let shout: RewriteFn = |s| Some(Value::String(s.to_uppercase()));
        let pre = Preprocessor::empty().with_rule("name", shout);
        let out = pre.apply(json!({ "basics": { "name": "ada", "summary": "**x**" } }));
        assert_eq!(out["basics"]["name"], "ADA");
        assert_eq!(out["basics"]["summary"], "**x**");
    }
}
