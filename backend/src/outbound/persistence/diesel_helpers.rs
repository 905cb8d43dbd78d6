//! Time budget shared by every repository operation.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::ports::PersistenceError;

/// Run `operation`, failing with `Timeout` once `budget` has elapsed.
///
/// The pooled connection is dropped with the cancelled future; nothing is
/// retried.
pub async fn bounded<T, F>(
    budget: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, PersistenceError>
where
    F: Future<Output = Result<T, PersistenceError>>,
{
    match tokio::time::timeout(budget, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, budget_ms = budget.as_millis(), "repository operation timed out");
            Err(PersistenceError::timeout(operation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_operations_time_out() {
        let result: Result<(), _> = bounded(Duration::from_secs(3), "available rooms", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(PersistenceError::timeout("available rooms")));
    }

    #[tokio::test]
    async fn fast_operations_pass_through() {
        let result = bounded(Duration::from_secs(3), "find room", async { Ok(5) }).await;
        assert_eq!(result, Ok(5));
    }
}
