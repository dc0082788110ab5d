//! Session credential: the signing token plus the cookie set sent with
//! every call.

use crate::error::MtopError;

/// Cookie holding `<token>_<expiry>`; only the part before `_` signs requests.
pub const TOKEN_COOKIE: &str = "_m_h5_tk";

const DEFAULT_COOKIE_DOMAIN: &str = ".goofish.com";
const DEFAULT_COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

impl SessionCookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: DEFAULT_COOKIE_DOMAIN.to_string(),
            path: DEFAULT_COOKIE_PATH.to_string(),
        }
    }
}

/// Immutable for the lifetime of a run.
#[derive(Clone)]
pub struct SessionCredential {
    token: String,
    cookies: Vec<SessionCookie>,
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("token", &"[redacted]")
            .field(
                "cookies",
                &self.cookies.iter().map(|c| &c.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SessionCredential {
    /// Builds a credential from a raw token value (as found in the
    /// [`TOKEN_COOKIE`] cookie) and a cookie set.
    ///
    /// # Errors
    ///
    /// Returns [`MtopError::MissingCredential`] if the token is empty once
    /// its suffix is stripped.
    pub fn new(raw_token: &str, cookies: Vec<SessionCookie>) -> Result<Self, MtopError> {
        let token = signing_token(raw_token.trim());
        if token.is_empty() {
            return Err(MtopError::MissingCredential(format!(
                "{TOKEN_COOKIE} token is empty"
            )));
        }
        Ok(Self {
            token: token.to_string(),
            cookies,
        })
    }

    /// Parses a browser `Cookie` header string (`a=1; b=2`).
    ///
    /// Pairs without `=` or with an empty name are ignored; a repeated name
    /// keeps the last value.
    ///
    /// # Errors
    ///
    /// Returns [`MtopError::MissingCredential`] if [`TOKEN_COOKIE`] is absent
    /// or empty.
    pub fn from_cookie_header(header: &str) -> Result<Self, MtopError> {
        let mut cookies: Vec<SessionCookie> = Vec::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            match cookies.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.value = value.to_string(),
                None => cookies.push(SessionCookie::new(name, value)),
            }
        }

        let raw_token = cookies
            .iter()
            .find(|c| c.name == TOKEN_COOKIE)
            .map(|c| c.value.clone())
            .ok_or_else(|| {
                MtopError::MissingCredential(format!("cookie {TOKEN_COOKIE} not found"))
            })?;

        Self::new(&raw_token, cookies)
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }

    /// Renders the cookie set as a single `Cookie` header value.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Strips the `_<expiry>` suffix from a raw token cookie value.
#[must_use]
pub fn signing_token(raw: &str) -> &str {
    raw.split('_').next().unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_token_keeps_prefix() {
        assert_eq!(signing_token("abc123_1700000000000"), "abc123");
        assert_eq!(signing_token("plain"), "plain");
        assert_eq!(signing_token("_1700"), "");
    }

    #[test]
    fn parses_cookie_header() {
        let cred = SessionCredential::from_cookie_header(
            "cna=xyz; _m_h5_tk=abc123_1700000000000; _m_h5_tk_enc=enc; unb=42",
        )
        .unwrap();
        assert_eq!(cred.token(), "abc123");
        assert_eq!(cred.cookies().len(), 4);
        assert_eq!(cred.cookies()[0].domain, ".goofish.com");
        assert_eq!(cred.cookies()[0].path, "/");
    }

    #[test]
    fn cookie_values_may_contain_equals() {
        let cred = SessionCredential::from_cookie_header("_m_h5_tk=t_1; isg=a=b==").unwrap();
        let isg = cred.cookies().iter().find(|c| c.name == "isg").unwrap();
        assert_eq!(isg.value, "a=b==");
    }

    #[test]
    fn repeated_cookie_keeps_last_value() {
        let cred = SessionCredential::from_cookie_header("_m_h5_tk=old_1; _m_h5_tk=new_2").unwrap();
        assert_eq!(cred.cookies().len(), 1);
        assert_eq!(cred.token(), "new");
    }

    #[test]
    fn ignores_malformed_pairs() {
        let cred = SessionCredential::from_cookie_header("garbage; =x; _m_h5_tk=t_1;").unwrap();
        assert_eq!(cred.cookies().len(), 1);
    }

    #[test]
    fn missing_token_cookie_is_credential_error() {
        let err = SessionCredential::from_cookie_header("cna=xyz").unwrap_err();
        assert!(matches!(err, MtopError::MissingCredential(_)));
    }

    #[test]
    fn empty_token_is_credential_error() {
        let err = SessionCredential::from_cookie_header("_m_h5_tk=_1700").unwrap_err();
        assert!(matches!(err, MtopError::MissingCredential(_)));
    }

    #[test]
    fn cookie_header_round_trips_order() {
        let cred = SessionCredential::from_cookie_header("a=1; _m_h5_tk=t_1; b=2").unwrap();
        assert_eq!(cred.cookie_header(), "a=1; _m_h5_tk=t_1; b=2");
    }

    #[test]
    fn debug_redacts_token() {
        let cred = SessionCredential::from_cookie_header("_m_h5_tk=secret_1").unwrap();
        assert!(!format!("{cred:?}").contains("secret"));
    }
}
