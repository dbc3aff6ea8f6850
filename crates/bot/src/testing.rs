//! Test doubles: a static AMAP site and a recording messenger.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::error::TelegramError;
use crate::handler::Bot;
use crate::telegram::{Messenger, SendMessage};
use amap_client::{AmapService, Credentials, Page, Session, SiteUrls, Transport};
use amap_core::{Error, FixedClock};

pub const DOMAIN: &str = "https://amap.test";
pub const PRODUCTS_PATH: &str = "/produits_a_recuperer/2024-05-08/14";
pub const CONTRACTS_PATH: &str = "/liste_contrats";

pub const BASKET_PAGE: &str = r#"
    <table id="table-summary">
        <tr><th>mercredi 08 mai</th><th>vendredi 10 mai</th><th>vendredi 17 mai</th></tr>
        <tr>
            <td><div class="product"><div class="product-quantity">1</div>miel</div></td>
            <td>
                <div class="product"><div class="product-quantity">2</div>oranges</div>
                <div class="product"><div class="product-quantity">1</div>pain</div>
            </td>
            <td><div class="product"><div class="product-quantity">3</div>Miel de sapin</div></td>
        </tr>
    </table>"#;

pub const CONTRACTS_PAGE: &str = r#"
    <a class="btn btn-success" href="/contrat/1">Légumes <small>jusqu'au 12/05</small></a>
    <a class="btn btn-success" href="/contrat/2">Pain <small>jusqu'au 20/05</small></a>"#;

/// Wednesday 8 May 2024; the upcoming Friday is the 10th.
pub fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()
}

/// Site that is always logged in and serves fixed pages.
#[derive(Default)]
pub struct StaticSite {
    pages: Mutex<HashMap<String, String>>,
    down: AtomicBool,
}

impl StaticSite {
    pub fn with_page(self, path: &str, body: &str) -> Self {
        self.set_page(path, body);
        self
    }

    pub fn set_page(&self, path: &str, body: &str) {
        self.pages.lock().unwrap().insert(path.to_string(), body.to_string());
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Transport for StaticSite {
    async fn get(&self, url: &Url) -> Result<Page, Error> {
        if self.down.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("timeout fetching {url}")));
        }
        let body = self.pages.lock().unwrap().get(url.path()).cloned();
        Ok(match body {
            Some(body) => Page { final_url: url.clone(), status: 200, body },
            None => Page { final_url: url.clone(), status: 404, body: String::new() },
        })
    }

    async fn post_form(&self, url: &Url, _form: &[(&str, &str)]) -> Result<Page, Error> {
        Err(Error::Network(format!("unexpected POST to {url}")))
    }
}

/// Messenger that keeps every message it is asked to send.
#[derive(Default)]
pub struct Recorder {
    sent: Mutex<Vec<SendMessage>>,
}

impl Recorder {
    pub fn sent(&self) -> Vec<SendMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }
}

#[async_trait::async_trait]
impl Messenger for Recorder {
    async fn send(&self, message: &SendMessage) -> Result<(), TelegramError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Bot wired to `site` and a fresh recorder, with the clock on [`wednesday`].
pub fn bot(site: StaticSite) -> Bot<StaticSite, Recorder> {
    let urls = SiteUrls::new(DOMAIN).unwrap();
    let session = Session::new(site, urls, Credentials::new("alice", "secret"));
    let service = AmapService::new(session, Arc::new(FixedClock::new(wednesday())));
    Bot::new(Arc::new(service), Arc::new(Recorder::default()))
}

/// Site serving both the basket and contracts pages.
pub fn full_site() -> StaticSite {
    StaticSite::default()
        .with_page(PRODUCTS_PATH, BASKET_PAGE)
        .with_page(CONTRACTS_PATH, CONTRACTS_PAGE)
}
