//! Google sign-in helpers for the federated flow.
//!
//! The user opens the authorization URL, signs in, and pastes back the URL
//! they were redirected to (or the bare ID token). The `id_token` from that
//! input is exchanged through `IdentityGateway::sign_in_with_federated_credential`.

pub const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";
const SCOPES: &str = "openid email profile";

/// A prepared authorization request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub url: String,
    pub state: String,
    pub nonce: String,
}

/// Builds the implicit-flow authorization URL with a fresh state and nonce.
pub fn build_auth_request(client_id: &str, redirect_uri: &str) -> AuthRequest {
    let state = uuid::Uuid::new_v4().simple().to_string();
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let url = build_auth_url(client_id, redirect_uri, &state, &nonce);
    AuthRequest { url, state, nonce }
}

pub fn build_auth_url(client_id: &str, redirect_uri: &str, state: &str, nonce: &str) -> String {
    let params = [
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("response_type", "id_token"),
        ("scope", SCOPES),
        ("nonce", nonce),
        ("state", state),
        ("prompt", "select_account"),
    ];

    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    format!("{AUTHORIZE_URL}?{query}")
}

/// Values pulled out of a pasted redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    pub id_token: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl RedirectParams {
    fn from_pairs(pairs: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(pairs.as_bytes()) {
            match key.as_ref() {
                "id_token" => params.id_token = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// True when the redirect carries no state or the expected one.
    pub fn state_matches(&self, expected: &str) -> bool {
        self.state.as_deref().is_none_or(|state| state == expected)
    }
}

/// Parses a redirect URL, a `key=value` fragment, or a raw ID token.
pub fn parse_redirect_input(input: &str) -> RedirectParams {
    let value = input.trim();
    if value.is_empty() {
        return RedirectParams::default();
    }

    if let Ok(url) = url::Url::parse(value) {
        // Implicit flow returns parameters in the fragment.
        if let Some(fragment) = url.fragment() {
            let params = RedirectParams::from_pairs(fragment);
            if params.id_token.is_some() || params.error.is_some() {
                return params;
            }
        }
        return RedirectParams::from_pairs(url.query().unwrap_or_default());
    }

    let pairs = value.trim_start_matches(['#', '?']);
    if pairs.contains("id_token=") || pairs.contains("error=") {
        return RedirectParams::from_pairs(pairs);
    }

    RedirectParams {
        id_token: Some(value.to_string()),
        ..RedirectParams::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url_contains_implicit_flow_params() {
        let request = build_auth_request("client-1.apps", "http://localhost");
        let url = url::Url::parse(&request.url).unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert!(request.url.starts_with(AUTHORIZE_URL));
        assert_eq!(pairs["client_id"], "client-1.apps");
        assert_eq!(pairs["response_type"], "id_token");
        assert_eq!(pairs["redirect_uri"], "http://localhost");
        assert_eq!(pairs["state"], request.state);
        assert_eq!(pairs["nonce"], request.nonce);
        assert_ne!(request.state, request.nonce);
    }

    #[test]
    fn test_parse_redirect_fragment() {
        let params =
            parse_redirect_input("http://localhost/#state=abc&id_token=eyJ.payload.sig&authuser=0");
        assert_eq!(params.id_token.as_deref(), Some("eyJ.payload.sig"));
        assert_eq!(params.state.as_deref(), Some("abc"));
        assert!(params.state_matches("abc"));
        assert!(!params.state_matches("other"));
    }

    #[test]
    fn test_parse_redirect_error() {
        let params = parse_redirect_input("http://localhost/?error=access_denied&state=abc");
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert_eq!(params.id_token, None);
    }

    #[test]
    fn test_parse_bare_fragment_and_raw_token() {
        let params = parse_redirect_input("#id_token=tok&state=s");
        assert_eq!(params.id_token.as_deref(), Some("tok"));

        let params = parse_redirect_input("  eyJ.raw.token  ");
        assert_eq!(params.id_token.as_deref(), Some("eyJ.raw.token"));
        assert!(params.state_matches("anything"));

        assert_eq!(parse_redirect_input(""), RedirectParams::default());
    }
}
