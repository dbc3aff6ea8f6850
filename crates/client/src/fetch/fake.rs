//! In-memory stand-in for the AMAP site, used by tests.
//!
//! Protected pages redirect to the login page until a POST with the right
//! token and credentials has been seen. Every request is counted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use url::Url;

use super::{Page, SiteUrls, Transport};
use amap_core::Error;

pub(crate) struct FakeSite {
    urls: SiteUrls,
    pages: Mutex<HashMap<String, String>>,
    hits: Mutex<HashMap<String, usize>>,
    last_form: Mutex<Vec<(String, String)>>,
    logged_in: AtomicBool,
    gets: AtomicUsize,
    posts: AtomicUsize,
    serve_token: bool,
    accept_login: bool,
    keep_session: bool,
    reachable: AtomicBool,
}

impl FakeSite {
    pub(crate) const TOKEN: &'static str = "tok-42";
    pub(crate) const DOMAIN: &'static str = "https://amap.test";

    pub(crate) fn new() -> Self {
        Self {
            urls: SiteUrls::new(Self::DOMAIN).expect("valid test domain"),
            pages: Mutex::new(HashMap::new()),
            hits: Mutex::new(HashMap::new()),
            last_form: Mutex::new(Vec::new()),
            logged_in: AtomicBool::new(false),
            gets: AtomicUsize::new(0),
            posts: AtomicUsize::new(0),
            serve_token: true,
            accept_login: true,
            keep_session: true,
            reachable: AtomicBool::new(true),
        }
    }

    pub(crate) fn logged_in(self) -> Self {
        self.logged_in.store(true, Ordering::SeqCst);
        self
    }

    /// Login form without the anti-forgery input.
    pub(crate) fn without_token(mut self) -> Self {
        self.serve_token = false;
        self
    }

    /// Every login POST lands back on the login page.
    pub(crate) fn rejecting_login(mut self) -> Self {
        self.accept_login = false;
        self
    }

    /// Login POST succeeds but the session is not kept.
    pub(crate) fn forgetful(mut self) -> Self {
        self.keep_session = false;
        self
    }

    /// Every request fails with a network error.
    pub(crate) fn unreachable(self) -> Self {
        self.set_reachable(false);
        self
    }

    pub(crate) fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub(crate) fn with_page(self, path: &str, body: &str) -> Self {
        self.set_page(path, body);
        self
    }

    pub(crate) fn set_page(&self, path: &str, body: &str) {
        self.pages.lock().unwrap().insert(path.to_string(), body.to_string());
    }

    pub(crate) fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    pub(crate) fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) fn posts(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    /// GETs that reached `path` while logged in.
    pub(crate) fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub(crate) fn last_form(&self) -> Vec<(String, String)> {
        self.last_form.lock().unwrap().clone()
    }

    fn login_page(&self) -> Page {
        let token = if self.serve_token {
            format!(r#"<input type="hidden" name="_csrf_token" value="{}">"#, Self::TOKEN)
        } else {
            String::new()
        };
        Page {
            final_url: self.urls.login().clone(),
            status: 200,
            body: format!(
                r#"<html><body><form method="post">
                    <input name="username"><input name="password" type="password">{token}
                </form></body></html>"#
            ),
        }
    }
}

#[async_trait::async_trait]
impl Transport for FakeSite {
    async fn get(&self, url: &Url) -> Result<Page, Error> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("timeout fetching {url}")));
        }

        if self.urls.is_login(url) || !self.logged_in.load(Ordering::SeqCst) {
            return Ok(self.login_page());
        }

        *self.hits.lock().unwrap().entry(url.path().to_string()).or_default() += 1;

        let body = self.pages.lock().unwrap().get(url.path()).cloned();
        Ok(match body {
            Some(body) => Page { final_url: url.clone(), status: 200, body },
            None => Page { final_url: url.clone(), status: 404, body: "<h1>Not found</h1>".into() },
        })
    }

    async fn post_form(&self, _url: &Url, form: &[(&str, &str)]) -> Result<Page, Error> {
        self.posts.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".into()));
        }

        *self.last_form.lock().unwrap() = form.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

        let token_ok = form.iter().any(|(k, v)| *k == "_csrf_token" && *v == Self::TOKEN);
        if !(self.accept_login && token_ok) {
            return Ok(self.login_page());
        }

        if self.keep_session {
            self.logged_in.store(true, Ordering::SeqCst);
        }
        let home = Url::parse(&format!("{}/", Self::DOMAIN)).expect("valid test url");
        Ok(Page { final_url: home, status: 200, body: "<h1>Accueil</h1>".into() })
    }
}
