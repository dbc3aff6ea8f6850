//! Site URL layout and href resolution.

use chrono::NaiveDate;
use url::Url;

use amap_core::Error;

/// Days covered by one "products to collect" page.
pub const BASKET_WINDOW_DAYS: u32 = 14;

/// URLs of the pages the scraper reads, derived from the site root.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    domain: String,
    login: Url,
    products: String,
    contracts: Url,
}

impl SiteUrls {
    /// Derive every page URL from `domain` (e.g. `https://votre-amap.easyamap.fr`).
    pub fn new(domain: &str) -> Result<Self, Error> {
        let domain = domain.trim().trim_end_matches('/').to_string();
        if domain.is_empty() {
            return Err(Error::InvalidUrl("empty domain".into()));
        }

        let login = Url::parse(&format!("{domain}/login"))?;
        let contracts = Url::parse(&format!("{domain}/liste_contrats"))?;
        let products = format!("{domain}/produits_a_recuperer");

        match login.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
        }

        Ok(Self { domain, login, products, contracts })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn login(&self) -> &Url {
        &self.login
    }

    pub fn contracts(&self) -> &Url {
        &self.contracts
    }

    /// Products page covering [`BASKET_WINDOW_DAYS`] days from `start`.
    pub fn products(&self, start: NaiveDate) -> Result<Url, Error> {
        let url = format!("{}/{}/{}", self.products, start.format("%Y-%m-%d"), BASKET_WINDOW_DAYS);
        Ok(Url::parse(&url)?)
    }

    /// Whether `url` points at the login page. Query and fragment are ignored.
    pub fn is_login(&self, url: &Url) -> bool {
        url.scheme() == self.login.scheme()
            && url.host_str() == self.login.host_str()
            && url.port_or_known_default() == self.login.port_or_known_default()
            && url.path().trim_end_matches('/') == self.login.path()
    }

    /// Make a scraped href absolute.
    ///
    /// Absolute links are kept as is; relative ones are prefixed with the
    /// domain and exactly one slash.
    pub fn absolutize(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.domain, href)
        } else {
            format!("{}/{}", self.domain, href)
        }
    }
}
