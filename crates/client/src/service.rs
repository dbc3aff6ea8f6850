//! The scraping service: session, extractors and day caches behind the three
//! operations the bot and the CLI use.
//!
//! ### Caching
//! - Basket: read only when no start date is given; stored only when the
//!   fetched start date is today.
//! - Contracts: read unless `force_refresh`; every successful fetch
//!   overwrites the slot.
//! - A failed fetch never touches a slot.
//!
//! ### Concurrency
//! Slots sit behind short async mutexes that are never held across a network
//! call. Overlapping operations are safe but not serialized: both may hit the
//! network, and the last one to finish wins the slot.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::extract::{extract_basket, extract_contracts};
use crate::fetch::{Credentials, FetchConfig, HttpTransport, Session, SiteUrls, Transport};
use amap_core::{
    AppConfig, BasketDay, BasketSnapshot, Clock, ConfigError, ContractDelta, ContractSnapshot, DateResolver, DaySlot,
    Error, SystemClock, diff_contracts,
};

/// Errors raised while building a service from configuration.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] Error),
}

/// Process-wide scraping context.
pub struct AmapService<T> {
    session: Session<T>,
    clock: Arc<dyn Clock>,
    resolver: DateResolver,
    basket_cache: Mutex<DaySlot<BasketSnapshot>>,
    contracts_cache: Mutex<DaySlot<ContractSnapshot>>,
}

impl AmapService<HttpTransport> {
    /// Build the production service from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, SetupError> {
        let (username, password) = config.require_credentials()?;
        let urls = SiteUrls::new(&config.base_domain)?;
        let transport = HttpTransport::new(&FetchConfig::from(config))?;
        let session = Session::new(transport, urls, Credentials::new(username, password));
        Ok(Self::new(session, Arc::new(SystemClock)))
    }
}

impl<T: Transport> AmapService<T> {
    pub fn new(session: Session<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            session,
            clock,
            resolver: DateResolver::default(),
            basket_cache: Mutex::new(DaySlot::new()),
            contracts_cache: Mutex::new(DaySlot::new()),
        }
    }

    /// Replace the default Friday/French date resolver.
    pub fn with_resolver(mut self, resolver: DateResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Baskets for the 14 days starting at `start_date` (today if `None`).
    ///
    /// # Errors
    ///
    /// `Network` or `Auth` when the page cannot be fetched, `Parse` when it
    /// has no usable summary table.
    pub async fn get_basket(&self, start_date: Option<NaiveDate>) -> Result<Arc<BasketSnapshot>, Error> {
        let today = self.clock.today();

        if start_date.is_none() {
            let slot = self.basket_cache.lock().await;
            if let Some(cached) = slot.fresh(today) {
                tracing::debug!(%today, "basket cache hit");
                return Ok(cached);
            }
            tracing::debug!(%today, stamped = ?slot.stamped(), "basket cache miss");
        }

        let start = start_date.unwrap_or(today);
        let url = self.session.urls().products(start)?;
        let page = self.session.fetch(&url).await?;
        let snapshot = Arc::new(extract_basket(&page.body)?);

        if start == today {
            self.basket_cache.lock().await.store(Arc::clone(&snapshot), today);
        }

        tracing::info!(%start, dates = snapshot.len(), "basket fetched");
        Ok(snapshot)
    }

    /// Entry of `snapshot` for the upcoming Friday (or the configured weekday).
    pub fn find_basket_for_friday<'a>(&self, snapshot: &'a BasketSnapshot) -> Option<&'a BasketDay> {
        self.resolver.find(snapshot, self.clock.today())
    }

    /// Open contracts, from today's cache unless `force_refresh`.
    ///
    /// # Errors
    ///
    /// `Network` or `Auth` when the page cannot be fetched.
    pub async fn get_contracts(&self, force_refresh: bool) -> Result<Arc<ContractSnapshot>, Error> {
        let today = self.clock.today();

        if !force_refresh {
            let slot = self.contracts_cache.lock().await;
            if let Some(cached) = slot.fresh(today) {
                tracing::debug!(%today, "contracts cache hit");
                return Ok(cached);
            }
            tracing::debug!(%today, stamped = ?slot.stamped(), "contracts cache miss");
        }

        tracing::info!(force_refresh, "fetching contracts");
        let page = self.session.fetch(self.session.urls().contracts()).await?;
        let contracts = Arc::new(extract_contracts(&page.body, self.session.urls()));

        self.contracts_cache.lock().await.store(Arc::clone(&contracts), today);

        Ok(contracts)
    }

    /// Last contract snapshot fetched, whatever its date.
    pub async fn cached_contracts(&self) -> Option<Arc<ContractSnapshot>> {
        self.contracts_cache.lock().await.peek()
    }

    /// Force a contracts fetch and report what changed since the previous one.
    ///
    /// Empty on the first run, when there is nothing to compare against.
    pub async fn poll_contract_changes(&self) -> Result<ContractDelta, Error> {
        let previous = self.cached_contracts().await;
        let current = self.get_contracts(true).await?;

        if previous.is_none() {
            tracing::info!(count = current.len(), "first contracts snapshot, nothing to compare");
        }

        let delta = diff_contracts(previous.as_deref(), &current);
        tracing::info!(changes = delta.len(), "contracts compared");
        Ok(delta)
    }
}
