//! HTTP method set accepted in route declarations.

use std::fmt;
use std::str::FromStr;

/// A declared method. `Any` matches every request method and supersedes the
/// others when present in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Any,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl Method {
    pub const ALL: [Method; 10] = [
        Method::Any,
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Connect,
        Method::Options,
        Method::Trace,
        Method::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Any => "ANY",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }

    /// Parses a comma separated method list.
    ///
    /// Blank input means `ANY`. When `ANY` appears anywhere it is the only
    /// method returned. The error carries the offending token.
    pub fn parse_list(list: &str) -> Result<Vec<Method>, String> {
        let compact: String = list.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(vec![Method::Any]);
        }

        let mut methods = Vec::new();
        for token in compact.split(',') {
            let method = token.parse::<Method>().map_err(|_| token.to_uppercase())?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
        if methods.contains(&Method::Any) {
            return Ok(vec![Method::Any]);
        }
        Ok(methods)
    }
}

/// An unrecognized method token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or(UnknownMethod(upper))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>(), Ok(Method::Get));
        assert_eq!(" Patch ".parse::<Method>(), Ok(Method::Patch));
        assert_eq!("FETCH".parse::<Method>(), Err(UnknownMethod("FETCH".into())));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(Method::parse_list("get, post"), Ok(vec![Method::Get, Method::Post]));
        assert_eq!(Method::parse_list(""), Ok(vec![Method::Any]));
        assert_eq!(Method::parse_list("GET,any,POST"), Ok(vec![Method::Any]));
        assert_eq!(Method::parse_list("GET,fetch"), Err("FETCH".to_string()));
    }
}
