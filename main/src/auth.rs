/// Credentials agents must present on the event listener interface,
/// configured once at startup and immutable for the server's lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Checks a raw `Authorization` header value. An absent header is read
    /// as the literal `"None None"`; the scheme is ignored and a token of
    /// `"None"` means no credentials were supplied. Anything else is
    /// base64-decoded and must equal `username:password` exactly.
    pub fn verify(&self, authorization: Option<&str>) -> bool {
        let authorization = authorization.unwrap_or("None None");
        let mut parts = authorization.split_whitespace();
        let _scheme = parts.next().unwrap_or("None");
        let token = parts.next().unwrap_or("None");
        if token == "None" {
            return false;
        }

        let decoded = match base64::decode(token) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let decoded = match String::from_utf8(decoded) {
            Ok(text) => text,
            Err(_) => return false,
        };

        decoded == format!("{}:{}", self.username, self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("willrule", "williamr")
    }

    #[test]
    fn test_verify_exact_match() {
        let auth = format!("Basic {}", base64::encode("willrule:williamr"));
        assert!(creds().verify(Some(&auth)));
    }

    #[test]
    fn test_verify_wrong_password() {
        let auth = format!("Basic {}", base64::encode("willrule:wrong"));
        assert!(!creds().verify(Some(&auth)));
    }

    #[test]
    fn test_verify_absent_header() {
        assert!(!creds().verify(None));
        assert!(!creds().verify(Some("None None")));
        assert!(!creds().verify(Some("Basic None")));
        assert!(!creds().verify(Some("Basic")));
    }

    #[test]
    fn test_verify_undecodable_token() {
        assert!(!creds().verify(Some("Basic %%%not-base64%%%")));
        // valid base64 but not UTF-8
        let auth = format!("Basic {}", base64::encode([0xff, 0xfe, 0xfd]));
        assert!(!creds().verify(Some(&auth)));
    }

    #[test]
    fn test_verify_no_partial_match() {
        let auth = format!("Basic {}", base64::encode("willrule:williamr:extra"));
        assert!(!creds().verify(Some(&auth)));
    }
}
