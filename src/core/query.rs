//! Query handles owned by views.
//!
//! A query runs in its own task and publishes its outcome on a watch channel.
//! The view holds the receiving end; once the view is dropped, a late result
//! has nowhere to go and is discarded.

use crate::core::error::MarketDataError;
use std::future::Future;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Loading,
    Ready(T),
    Failed(MarketDataError),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

pub struct Query<T> {
    name: String,
    rx: watch::Receiver<QueryState<T>>,
}

impl<T> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts `fetch` on the runtime and returns a handle to its state.
    pub fn spawn<F>(name: impl Into<String>, fetch: F) -> Self
    where
        F: Future<Output = Result<T, MarketDataError>> + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = watch::channel(QueryState::Loading);
        let task_name = name.clone();
        tokio::spawn(async move {
            let state = match fetch.await {
                Ok(value) => QueryState::Ready(value),
                Err(e) => {
                    debug!(query = %task_name, error = %e, "Query failed");
                    QueryState::Failed(e)
                }
            };
            if tx.send(state).is_err() {
                debug!(query = %task_name, "Query resolved after its view was dropped");
            }
        });
        Self { name, rx }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> QueryState<T> {
        self.rx.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        match &*self.rx.borrow() {
            QueryState::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Waits until the query has either resolved or failed.
    pub async fn settled(&self) -> QueryState<T> {
        let mut rx = self.rx.clone();
        let settled = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => (*state).clone(),
            Err(_) => QueryState::Failed(MarketDataError::Network(format!(
                "query {} was aborted",
                self.name
            ))),
        };
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_query_resolves() {
        let query = Query::spawn("answer", async { Ok::<_, MarketDataError>(42) });
        assert_eq!(query.settled().await, QueryState::Ready(42));
        assert_eq!(query.data(), Some(42));
        assert_eq!(query.name(), "answer");
    }

    #[tokio::test]
    async fn test_query_reports_failure() {
        let query = Query::<i32>::spawn("broken", async {
            Err(MarketDataError::NotFound("asset nope".to_string()))
        });
        assert_eq!(
            query.settled().await,
            QueryState::Failed(MarketDataError::NotFound("asset nope".to_string()))
        );
        assert_eq!(query.data(), None);
    }

    #[tokio::test]
    async fn test_query_is_loading_until_resolved() {
        let (tx, rx) = oneshot::channel::<i32>();
        let query = Query::spawn("slow", async move {
            rx.await
                .map_err(|e| MarketDataError::Network(e.to_string()))
        });

        assert!(query.state().is_loading());
        tx.send(1).unwrap();
        assert_eq!(query.settled().await, QueryState::Ready(1));
    }

    #[tokio::test]
    async fn test_late_result_after_drop_is_discarded() {
        let (tx, rx) = oneshot::channel::<i32>();
        let (done_tx, done_rx) = oneshot::channel::<()>();
        let query = Query::spawn("orphan", async move {
            let value = rx.await.map_err(|e| MarketDataError::Network(e.to_string()));
            let _ = done_tx.send(());
            value
        });

        drop(query);
        tx.send(5).unwrap();
        // The task finishes without a receiver and must not panic
        done_rx.await.unwrap();
        tokio::task::yield_now().await;
    }
}
