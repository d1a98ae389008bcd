use crate::config::{Credentials, Endpoints, ProjectSource};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How requests after login prove who we are
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMethod {
    Bearer(String),
    Cookies,
    /// Login succeeded but left neither a token nor a cookie
    Anonymous,
}

/// Logged in, project id not yet known
pub struct Authenticated {
    client: Client,
    auth: AuthMethod,
}

/// Logged in with a project id; ready to submit entries
pub struct Session {
    client: Client,
    auth: AuthMethod,
    project_id: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProjectLookup {
    #[serde(default)]
    success: bool,
    data: Option<ProjectData>,
}

#[derive(Debug, Deserialize)]
struct ProjectData {
    id: Option<serde_json::Value>,
}

/// Build the HTTP client shared by every call of a run. The cookie jar is
/// returned too so login can tell whether the portal set a session cookie.
pub fn build_client(timeout: Duration) -> Result<(Client, Arc<Jar>)> {
    let jar = Arc::new(Jar::default());
    let client = Client::builder()
        .timeout(timeout)
        .cookie_provider(jar.clone())
        .build()
        .context("Failed to create HTTP client")?;
    Ok((client, jar))
}

/// Exchange credentials for a bearer token, falling back to the cookie session
/// the login call established.
pub fn login(
    client: Client,
    jar: &Jar,
    endpoints: &Endpoints,
    credentials: &Credentials,
) -> Result<Authenticated> {
    let login_url = Url::parse(&endpoints.login)
        .with_context(|| format!("Invalid login URL: {}", endpoints.login))?;

    let response = client
        .post(login_url.clone())
        .header(ACCEPT, "application/json")
        .json(&LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        })
        .send()
        .with_context(|| format!("Failed to reach login endpoint {}", endpoints.login))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!(
            "Login failed with status {}: {}",
            status,
            response.text().unwrap_or_else(|_| "unknown error".to_string())
        );
    }

    let body: serde_json::Value = response.json().unwrap_or_else(|e| {
        log::debug!("Login response is not JSON: {}", e);
        serde_json::Value::Null
    });

    let token = body
        .get("token")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty());

    let auth = match token {
        Some(token) => {
            log::info!("Login returned a bearer token");
            AuthMethod::Bearer(token.to_string())
        }
        None if jar.cookies(&login_url).is_some() => {
            log::info!("No token in login response, using session cookies");
            AuthMethod::Cookies
        }
        None => {
            log::warn!("Login returned neither a token nor a session cookie; continuing anyway");
            AuthMethod::Anonymous
        }
    };

    Ok(Authenticated { client, auth })
}

impl Authenticated {
    /// Settle the project id, looking it up on the portal when none was supplied.
    pub fn into_session(self, endpoints: &Endpoints, source: ProjectSource) -> Result<Session> {
        let project_id = match source {
            ProjectSource::Cli(id) | ProjectSource::Static(id) => id,
            ProjectSource::AutoResolve => self.lookup_project(&endpoints.project)?,
        };

        Ok(Session {
            client: self.client,
            auth: self.auth,
            project_id,
        })
    }

    fn lookup_project(&self, url: &str) -> Result<String> {
        let response = authorize(self.client.get(url), &self.auth)
            .send()
            .with_context(|| format!("Failed to reach project endpoint {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "Project lookup failed with status {}: {}",
                status,
                response.text().unwrap_or_else(|_| "unknown error".to_string())
            );
        }

        let lookup: ProjectLookup = response
            .json()
            .context("Failed to parse project lookup response")?;

        let id = match lookup.data.and_then(|d| d.id) {
            Some(serde_json::Value::String(s)) if lookup.success && !s.is_empty() => s,
            Some(serde_json::Value::Number(n)) if lookup.success => n.to_string(),
            _ => anyhow::bail!("No project is associated with this account"),
        };

        log::info!("Resolved project id {}", id);
        Ok(id)
    }
}

impl Session {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn auth(&self) -> &AuthMethod {
        &self.auth
    }

    /// POST a JSON body with this session's credentials attached
    pub fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> reqwest::Result<Response> {
        authorize(self.client.post(url), &self.auth).json(body).send()
    }
}

fn authorize(request: RequestBuilder, auth: &AuthMethod) -> RequestBuilder {
    let request = request.header(ACCEPT, "application/json");
    match auth {
        AuthMethod::Bearer(token) => request.bearer_auth(token),
        // Cookies ride along from the client's jar
        AuthMethod::Cookies | AuthMethod::Anonymous => request,
    }
}
