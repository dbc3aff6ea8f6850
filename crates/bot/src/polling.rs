//! Long-polling loop.
//!
//! Every error except a rejected token is logged and waited out; the bot
//! keeps polling until the process is stopped.

use std::sync::Arc;

use crate::error::TelegramError;
use crate::handler::Bot;
use crate::telegram::{Messenger, UpdateSource, next_offset};
use amap_client::Transport;

/// Fetch updates from `source` and dispatch each message on its own task.
///
/// Returns only when the token is rejected.
pub async fn poll_updates<T, M, U>(bot: &Arc<Bot<T, M>>, source: &U) -> Result<(), TelegramError>
where
    T: Transport + 'static,
    M: Messenger + 'static,
    U: UpdateSource + ?Sized,
{
    let mut offset = 0;
    loop {
        let updates = match source.get_updates(offset).await {
            Ok(updates) => updates,
            Err(TelegramError::Unauthorized) => return Err(TelegramError::Unauthorized),
            Err(e) => {
                if e.is_transient() {
                    tracing::warn!(error = %e, "telegram unreachable, retrying");
                } else {
                    tracing::error!(error = %e, "getUpdates failed, retrying");
                }
                tokio::time::sleep(e.backoff()).await;
                continue;
            }
        };

        offset = next_offset(offset, &updates);

        for message in updates.into_iter().filter_map(|u| u.message) {
            let bot = Arc::clone(bot);
            tokio::spawn(async move { log_reply_failure(bot.handle(&message).await) });
        }
    }
}

fn log_reply_failure(result: Result<(), TelegramError>) {
    if let Err(e) = result {
        if e.is_transient() {
            tracing::warn!(error = %e, "reply failed");
        } else {
            tracing::error!(error = %e, "reply rejected");
        }
    }
}
