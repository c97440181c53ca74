//! Property allow/deny list.
//!
//! Entries are exact names (`font-size`), prefixes (`margin*`), the
//! wildcard `*`, or any of those negated with `!`. Negated entries always
//! win.

#[derive(Debug, Clone)]
pub struct PropListMatcher {
    has_wildcard: bool,
    allow: Vec<String>,
    deny: Vec<String>,
}

impl PropListMatcher {
    pub fn new<S: AsRef<str>>(prop_list: &[S]) -> Self {
        let mut allow = Vec::new();
        let mut deny = Vec::new();
        for entry in prop_list {
            match entry.as_ref().strip_prefix('!') {
                Some(negated) => deny.push(negated.to_string()),
                None => allow.push(entry.as_ref().to_string()),
            }
        }
        Self {
            has_wildcard: allow.iter().any(|p| p == "*"),
            allow,
            deny,
        }
    }

    pub fn matches(&self, prop: &str) -> bool {
        let denied = any_matches(&self.deny, prop);
        if self.has_wildcard && !denied {
            return true;
        }
        any_matches(&self.allow, prop) && !denied
    }
}

fn any_matches(patterns: &[String], prop: &str) -> bool {
    patterns.iter().any(|pattern| {
        if pattern == "*" {
            return true;
        }
        match pattern.strip_suffix('*') {
            Some(prefix) => prop.starts_with(prefix),
            None => prop == pattern,
        }
    })
}
