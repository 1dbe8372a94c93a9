//! Exchange lifecycle: the unit of work for one send.

use tracing::warn;

use crate::completion::streaming::TokenStream;
use crate::core::sentiment::Sentiment;
use crate::session::core::ConversationSession;

/// Settled outcome of one send.
///
/// Transient coordination value; what persists are its effects (a memory
/// record pair and a history mutation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    /// The triggering user message.
    pub user_message: String,
    /// Sentiment classified for the user message.
    pub sentiment: Sentiment,
    /// Aggregate assistant response; possibly partial on failure.
    pub response: String,
    /// Whether the stream completed without interruption or cancellation.
    pub succeeded: bool,
}

/// Cancellable handle over an in-flight exchange.
///
/// Pull tokens with [`next_token`](Self::next_token); stop pulling at any
/// point and call [`finish`](Self::finish) to run best-effort persistence on
/// whatever text was produced and obtain the settled [`Exchange`].
pub struct ExchangeHandle {
    session: ConversationSession,
    user_message: String,
    sentiment: Sentiment,
    aggregate: String,
    failed: bool,
    stream: Option<TokenStream>,
}

impl ExchangeHandle {
    pub(crate) fn new(
        session: ConversationSession,
        user_message: &str,
        sentiment: Sentiment,
        stream: TokenStream,
    ) -> Self {
        Self {
            session,
            user_message: user_message.to_string(),
            sentiment,
            aggregate: String::new(),
            failed: false,
            stream: Some(stream),
        }
    }

    /// Pull the next token; `None` once the stream has settled.
    ///
    /// A mid-stream interruption ends the stream and marks the exchange
    /// failed; the text produced so far is kept in the aggregate.
    pub async fn next_token(&mut self) -> Option<String> {
        let stream = self.stream.as_mut()?;
        match stream.next_chunk().await {
            Some(Ok(token)) => {
                self.aggregate.push_str(&token);
                Some(token)
            }
            Some(Err(err)) => {
                warn!("completion stream failed: {err}");
                self.failed = true;
                self.stream = None;
                None
            }
            None => {
                self.stream = None;
                None
            }
        }
    }

    /// Sentiment settled during the gathering stage.
    #[must_use]
    pub const fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    /// Text produced so far.
    #[must_use]
    pub fn aggregate(&self) -> &str {
        &self.aggregate
    }

    /// Settle the exchange: close the completion stream if still open, run
    /// best-effort persistence on whatever text was produced, and return the
    /// result.
    ///
    /// Finishing before the stream is exhausted counts as a cancellation; the
    /// exchange is marked failed but partial text is still persisted.
    #[must_use = "the settled exchange reports whether the stream completed"]
    pub fn finish(self) -> Exchange {
        let Self {
            session,
            user_message,
            sentiment,
            aggregate,
            mut failed,
            stream,
        } = self;

        if stream.is_some() {
            failed = true;
        }
        drop(stream);

        let exchange = Exchange {
            user_message,
            sentiment,
            response: aggregate,
            succeeded: !failed,
        };
        session.persist_exchange(&exchange);
        exchange
    }
}
