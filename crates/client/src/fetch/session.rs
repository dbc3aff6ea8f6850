//! Authenticated fetching with transparent re-login.

use scraper::{Html, Selector};
use url::Url;

use super::{Page, SiteUrls, Transport};
use amap_core::Error;

/// Name of the anti-forgery field in the login form.
const CSRF_FIELD: &str = "_csrf_token";

/// Account credentials. The password never shows up in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The single authenticated session to the site.
///
/// Session state lives in the transport's cookie jar, so there is nothing to
/// open or close: the first request that bounces to the login page logs in.
pub struct Session<T> {
    transport: T,
    urls: SiteUrls,
    credentials: Credentials,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, urls: SiteUrls, credentials: Credentials) -> Self {
        Self { transport, urls, credentials }
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `url`, logging in and retrying once if the site asks for it.
    ///
    /// The page is returned whatever it contains, even if the retry still
    /// lands on the login page; extractors reject pages missing their markup.
    pub async fn fetch(&self, url: &Url) -> Result<Page, Error> {
        let page = self.transport.get(url).await?;

        if !self.urls.is_login(&page.final_url) {
            return Ok(page);
        }

        tracing::info!(target_url = %url, "session expired, logging in");
        self.login().await?;

        self.transport.get(url).await
    }

    /// Log in with the configured credentials.
    ///
    /// # Errors
    ///
    /// `Error::Auth` if the login form has no anti-forgery token or if the
    /// site still shows the login page after posting the credentials.
    pub async fn login(&self) -> Result<(), Error> {
        let login_url = self.urls.login();
        let form_page = self.transport.get(login_url).await?;

        let Some(token) = extract_csrf_token(&form_page.body) else {
            tracing::warn!("anti-forgery token not found on login page");
            return Err(Error::Auth("anti-forgery token not found on login page".into()));
        };

        let form = [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
            (CSRF_FIELD, token.as_str()),
        ];
        let result = self.transport.post_form(login_url, &form).await?;

        if self.urls.is_login(&result.final_url) {
            tracing::warn!(username = %self.credentials.username, "login rejected");
            return Err(Error::Auth("still on the login page after submitting credentials".into()));
        }

        tracing::info!(username = %self.credentials.username, "logged in");
        Ok(())
    }
}

/// Value of the anti-forgery input, if the page has one.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!(r#"input[name="{CSRF_FIELD}"]"#)).expect("invalid selector");
    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}
