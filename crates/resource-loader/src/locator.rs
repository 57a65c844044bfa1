use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::LoaderError;

/// A resource locator: `scheme://host/path?key=value&key2=value2`.
///
/// This is deliberately not a full RFC-3986 implementation. The core only
/// needs `scheme`, `host`, `path` and a flat, possibly-repeated query map,
/// with values percent-decoded lazily through [`Locator::arg_value_as`].
/// Query pairs may be separated by either `&` or `+`, matching the grammar
/// the generated-texture providers are queried with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    scheme: String,
    host: String,
    path: String,
    query: BTreeMap<String, String>,
}

impl Locator {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn has_scheme(&self, s: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(s)
    }

    pub fn has_path(&self, p: &str) -> bool {
        self.path == p
    }

    pub fn has_path_suffix(&self, suffix: &str) -> bool {
        self.path.ends_with(suffix)
    }

    /// Returns the raw (percent-decoded) string value of a query argument.
    pub fn arg_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Parses a query argument into `T`, returning `None` if absent or
    /// unparseable — per the spec's "missing query arg with a sane default"
    /// recoverable-error policy, callers are expected to fall back with
    /// `.unwrap_or(default)`, not propagate an error.
    pub fn arg_value_as<T: FromStr>(&self, name: &str) -> Option<T> {
        self.arg_value(name).and_then(|v| v.parse().ok())
    }

    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for Locator {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s.split_once(':').ok_or_else(|| LoaderError::ParseError {
            reason: format!("missing scheme in locator {s:?}"),
        })?;

        let rest = rest.strip_prefix("//").unwrap_or(rest);

        let (authority_and_path, query_str) = match rest.split_once('?') {
            Some((a, q)) => (a, Some(q)),
            None => (rest, None),
        };

        let (host, path) = match authority_and_path.split_once('/') {
            Some((h, p)) => (h, format!("/{p}")),
            None => (authority_and_path, String::new()),
        };

        let mut query = BTreeMap::new();
        if let Some(query_str) = query_str {
            for pair in query_str.split(['&', '+']) {
                if pair.is_empty() {
                    continue;
                }
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                query.insert(percent_decode(key), percent_decode(value));
            }
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            path,
            query,
        })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:///{}{}", self.scheme, self.host, self.path)?;
        if !self.query.is_empty() {
            write!(f, "?")?;
            for (i, (k, v)) in self.query.iter().enumerate() {
                if i > 0 {
                    write!(f, "&")?;
                }
                write!(f, "{k}={v}")?;
            }
        }
        Ok(())
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&s[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
