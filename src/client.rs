//! Session-keeping client for the Opal portal.
//!
//! The portal has no API; pages are fetched as a logged-in browser would
//! fetch them. An expired session shows up as a redirect to a page under
//! `/login/`. The client intercepts that redirect instead of following it,
//! logs in again, and retries the original request once.

use std::sync::Arc;

use chrono_tz::Tz;
use reqwest::blocking::{Client, Response};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Url;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::config::Config;
use crate::credentials::{Auth, AuthStore, Credentials, StoredCookie};
use crate::error::{Error, Result};
use crate::models::{Activity, ActivityRequest, Overview};
use crate::parse::{self, TOKEN_FIELD};

const OVERVIEW_PATH: &str = "/registered/index";
const ACTIVITY_PATH: &str = "/registered/opal-card-transactions/";
const LOGIN_PAGE_PATH: &str = "/login/index";
const LOGIN_FORM_PATH: &str = "/login/registeredUserUsernameAndPasswordLogin";

const USERNAME_FIELD: &str = "h_username";
const PASSWORD_FIELD: &str = "h_password";

const MAX_REDIRECTS: usize = 10;

/// Outcome of a single GET.
#[derive(Debug)]
enum Fetch {
    Page(Vec<u8>),
    /// The portal tried to send us to the login page.
    SessionExpired,
}

fn is_login_path(url: &Url) -> bool {
    url.path().starts_with("/login/")
}

/// Follow redirects, except into the login flow.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if is_login_path(attempt.url()) {
            attempt.stop()
        } else if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

/// Whether a response is a redirect we declined to follow into `/login/`.
fn redirects_to_login(response: &Response) -> bool {
    if !response.status().is_redirection() {
        return false;
    }
    response
        .headers()
        .get(LOCATION)
        .and_then(|location| location.to_str().ok())
        .and_then(|location| response.url().join(location).ok())
        .is_some_and(|target| is_login_path(&target))
}

/// Client for one portal account.
///
/// Fetches take `&mut self`: a login triggered by one request must not
/// interleave with another request's retry, so an instance serves one
/// caller at a time.
pub struct PortalClient {
    http: Client,
    jar: Arc<Jar>,
    base_url: Url,
    zone: Tz,
    credentials: Credentials,
    store: Box<dyn AuthStore>,
    logins: u32,
}

impl PortalClient {
    /// Create a client, seeding its cookie jar from `store`.
    pub fn new(config: &Config, store: impl AuthStore + 'static) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| Error::Config(format!("bad base_url {:?}: {err}", config.base_url)))?;
        let zone = config.zone().map_err(|err| Error::Config(format!("{err:#}")))?;

        let auth = store.load().map_err(Error::AuthStore)?;

        let jar = Arc::new(Jar::default());
        for cookie in &auth.cookies {
            jar.add_cookie_str(&cookie.to_pair(), &base_url);
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_provider(Arc::clone(&jar))
            .redirect(redirect_policy())
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Config(format!("failed to create HTTP client: {err}")))?;

        debug!(
            base_url = %base_url,
            username = %auth.credentials.username,
            cookies = auth.cookies.len(),
            "Created portal client"
        );

        Ok(Self {
            http,
            jar,
            base_url,
            zone,
            credentials: auth.credentials,
            store: Box::new(store),
            logins: 0,
        })
    }

    /// Balances of the account's active cards.
    pub fn fetch_overview(&mut self) -> Result<Overview> {
        let url = self.endpoint(OVERVIEW_PATH)?;
        let body = self.fetch(&url)?;
        parse::parse_overview(&body)
    }

    /// One page of a card's transaction history.
    pub fn fetch_activity(&mut self, request: ActivityRequest) -> Result<Activity> {
        // The portal numbers pages from 1.
        let page_index = request
            .page
            .checked_add(1)
            .ok_or_else(|| {
                Error::Config(format!("activity page {} is out of range", request.page))
            })?;
        let mut url = self.endpoint(ACTIVITY_PATH)?;
        url.query_pairs_mut()
            .append_pair("cardIndex", &request.card_index.to_string())
            .append_pair("pageIndex", &page_index.to_string());
        let body = self.fetch(&url)?;
        parse::parse_activity(&body, self.zone)
    }

    /// Cookies currently held for the portal.
    pub fn cookies(&self) -> Vec<StoredCookie> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().ok().map(StoredCookie::parse_header))
            .unwrap_or_default()
    }

    /// Write the credentials and current cookies back to the auth store.
    pub fn save_auth(&self) -> Result<()> {
        let auth = Auth {
            credentials: self.credentials.clone(),
            cookies: self.cookies(),
        };
        self.store.save(&auth).map_err(Error::AuthStore)?;
        debug!(cookies = auth.cookies.len(), "Saved session");
        Ok(())
    }

    /// Number of logins this client has performed.
    pub fn logins(&self) -> u32 {
        self.logins
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| Error::Config(format!("bad portal path {path:?}: {err}")))
    }

    /// GET `url`, logging in and retrying once if the session has expired.
    fn fetch(&mut self, url: &Url) -> Result<Vec<u8>> {
        if let Fetch::Page(body) = self.get(url)? {
            return Ok(body);
        }

        info!(%url, "Session expired; logging in");
        self.login()?;

        match self.get(url)? {
            Fetch::Page(body) => Ok(body),
            Fetch::SessionExpired => Err(Error::authentication(format!(
                "still redirected to the login page after logging in (fetching {url})"
            ))),
        }
    }

    /// A single GET, with no login handling.
    fn get(&self, url: &Url) -> Result<Fetch> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        if redirects_to_login(&response) {
            return Ok(Fetch::SessionExpired);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(Fetch::Page(body.to_vec()))
    }

    /// Fetch the login form and submit the credentials with its token.
    ///
    /// A successful response sets the new session cookie in the jar.
    fn login(&mut self) -> Result<()> {
        let page_url = self.endpoint(LOGIN_PAGE_PATH)?;
        let page = match self.get(&page_url) {
            Ok(Fetch::Page(body)) => body,
            Ok(Fetch::SessionExpired) => {
                return Err(Error::authentication(
                    "login page redirected back into the login flow",
                ))
            }
            Err(Error::Status { status, .. }) => {
                return Err(Error::authentication(format!(
                    "login page response was {status}"
                )))
            }
            Err(err) => return Err(err),
        };
        let token = parse::parse_login(&page)?;

        let form_url = self.endpoint(LOGIN_FORM_PATH)?;
        let form = [
            (USERNAME_FIELD, self.credentials.username.as_str()),
            (PASSWORD_FIELD, self.credentials.password.expose_secret()),
            (TOKEN_FIELD, token.as_str()),
        ];
        let transport = |source: reqwest::Error| Error::Transport {
            url: form_url.to_string(),
            source,
        };
        let response = self
            .http
            .post(form_url.clone())
            .form(&form)
            .send()
            .map_err(transport)?;
        let status = response.status();
        response.bytes().map_err(transport)?;

        if !status.is_success() {
            return Err(Error::authentication(format!(
                "login form response was {status}"
            )));
        }

        self.logins += 1;
        info!(username = %self.credentials.username, "Logged in");
        Ok(())
    }
}
