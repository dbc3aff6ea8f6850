//! Chat command handling.
//!
//! This module parses incoming messages into commands and routes them to the
//! scraping service, replying in the chat (and topic) the command came from.

use std::sync::Arc;

use crate::error::TelegramError;
use crate::format;
use crate::telegram::{ChatTarget, Message, Messenger, SendMessage};
use amap_client::{AmapService, Transport};

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/aide`
    Help,
    /// `/panier`
    Basket,
    /// `/contrats`
    Contracts,
    /// `/chercher <mot>`; empty when no argument was given.
    Search(String),
}

impl Command {
    /// Parse `/name[@bot] args...`. Anything else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "start" | "aide" => Some(Command::Help),
            "panier" => Some(Command::Basket),
            "contrats" => Some(Command::Contracts),
            "chercher" => Some(Command::Search(args.split_whitespace().collect::<Vec<_>>().join(" "))),
            _ => None,
        }
    }
}

/// Routes commands and jobs to the service and the chat.
pub struct Bot<T, M> {
    service: Arc<AmapService<T>>,
    messenger: Arc<M>,
}

impl<T: Transport, M: Messenger> Bot<T, M> {
    pub fn new(service: Arc<AmapService<T>>, messenger: Arc<M>) -> Self {
        Self { service, messenger }
    }

    pub fn service(&self) -> &AmapService<T> {
        &self.service
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Handle one incoming message. Non-command text is ignored.
    pub async fn handle(&self, message: &Message) -> Result<(), TelegramError> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let Some(command) = Command::parse(text) else {
            return Ok(());
        };

        tracing::info!(sender = message.sender_name(), command = text, "command received");
        let target = message.reply_target();

        match command {
            Command::Help => self.messenger.send(&SendMessage::markdown(target, format::HELP)).await,
            Command::Basket => {
                self.messenger.send(&SendMessage::text(target, format::BASKET_LOADING)).await?;
                if !self.send_basket(target).await? {
                    self.messenger.send(&SendMessage::text(target, format::BASKET_NOT_FOUND)).await?;
                }
                Ok(())
            }
            Command::Contracts => self.send_contracts(target).await,
            Command::Search(query) => self.send_search(target, &query).await,
        }
    }

    /// Send the upcoming Friday's basket to `target`.
    ///
    /// Returns `false` when nothing was sent: the site could not be read or
    /// has no entry for that Friday.
    pub async fn send_basket(&self, target: ChatTarget) -> Result<bool, TelegramError> {
        tracing::info!(chat_id = target.chat_id, "basket requested");

        let snapshot = match self.service.get_basket(None).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "basket unavailable");
                return Ok(false);
            }
        };

        let Some(day) = self.service.find_basket_for_friday(&snapshot) else {
            tracing::warn!(dates = snapshot.len(), "no distribution date matches the upcoming friday");
            return Ok(false);
        };

        tracing::info!(label = %day.label, products = day.products.len(), "sending basket");
        self.messenger.send(&SendMessage::markdown(target, format::basket(day))).await?;
        Ok(true)
    }

    async fn send_contracts(&self, target: ChatTarget) -> Result<(), TelegramError> {
        self.messenger.send(&SendMessage::text(target, format::CONTRACTS_LOADING)).await?;

        let contracts = match self.service.get_contracts(false).await {
            Ok(contracts) if !contracts.is_empty() => contracts,
            Ok(_) => {
                return self.messenger.send(&SendMessage::text(target, format::NO_CONTRACTS)).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "contracts unavailable");
                return self.messenger.send(&SendMessage::text(target, format::NO_CONTRACTS)).await;
            }
        };

        let reply = SendMessage::markdown(target, format::contracts(&contracts)).without_link_preview();
        self.messenger.send(&reply).await
    }

    async fn send_search(&self, target: ChatTarget, query: &str) -> Result<(), TelegramError> {
        if query.is_empty() {
            return self.messenger.send(&SendMessage::markdown(target, format::SEARCH_USAGE)).await;
        }

        let snapshot = match self.service.get_basket(None).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, query, "search skipped, basket unavailable");
                return Ok(());
            }
        };

        let reply = format::search(&snapshot, query);
        if format::find_products(&snapshot, query).is_empty() {
            self.messenger.send(&SendMessage::text(target, reply)).await
        } else {
            self.messenger.send(&SendMessage::markdown(target, reply)).await
        }
    }
}
