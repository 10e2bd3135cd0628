//! Poll-driven tracking for fire-and-forget mutations.
//!
//! Views apply optimistic updates before the request completes; the
//! context `C` carries whatever is needed to roll the update back (row
//! id, previous status, previous name). One mutation runs at a time:
//! `is_pending()` gates re-entry so a row cannot be submitted twice.

use std::future::Future;
use tokio::sync::mpsc;

/// Terminal outcome of a mutation, handed back exactly once from `poll`.
#[derive(Debug)]
pub enum MutationOutcome<C> {
  Success(C),
  Failure { context: C, error: String },
}

/// Tracks a single in-flight mutation, in the same channel-polled idiom
/// as `Query`.
pub struct Mutation<C> {
  pending: Option<(C, mpsc::UnboundedReceiver<Result<(), String>>)>,
}

impl<C> Default for Mutation<C> {
  fn default() -> Self {
    Self { pending: None }
  }
}

impl<C> Mutation<C> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Spawn the mutation future. Ignored if one is already pending.
  pub fn start<Fut>(&mut self, context: C, future: Fut)
  where
    Fut: Future<Output = Result<(), String>> + Send + 'static,
  {
    if self.pending.is_some() {
      tracing::debug!("mutation already pending, ignoring");
      return;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.pending = Some((context, rx));

    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }

  /// Poll for the outcome. Call from the event-loop tick.
  pub fn poll(&mut self) -> Option<MutationOutcome<C>> {
    let (_, rx) = self.pending.as_mut()?;

    let result = match rx.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return None,
      Err(mpsc::error::TryRecvError::Disconnected) => Err("Mutation was cancelled".to_string()),
    };

    let (context, _) = self.pending.take().expect("pending checked above");
    Some(match result {
      Ok(()) => MutationOutcome::Success(context),
      Err(error) => MutationOutcome::Failure { context, error },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_success_returns_context() {
    let mut mutation: Mutation<&str> = Mutation::new();
    mutation.start("row-1", async { Ok(()) });
    assert!(mutation.is_pending());

    tokio::time::sleep(Duration::from_millis(10)).await;

    match mutation.poll() {
      Some(MutationOutcome::Success(ctx)) => assert_eq!(ctx, "row-1"),
      other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!mutation.is_pending());
  }

  #[tokio::test]
  async fn test_failure_carries_context_for_rollback() {
    let mut mutation: Mutation<(String, u32)> = Mutation::new();
    mutation.start(("row-1".to_string(), 7), async {
      Err("500".to_string())
    });

    tokio::time::sleep(Duration::from_millis(10)).await;

    match mutation.poll() {
      Some(MutationOutcome::Failure { context, error }) => {
        assert_eq!(context, ("row-1".to_string(), 7));
        assert_eq!(error, "500");
      }
      other => panic!("unexpected outcome: {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_start_while_pending_is_ignored() {
    let mut mutation: Mutation<u32> = Mutation::new();
    mutation.start(1, async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok(())
    });
    mutation.start(2, async { Ok(()) });

    tokio::time::sleep(Duration::from_millis(80)).await;

    match mutation.poll() {
      Some(MutationOutcome::Success(ctx)) => assert_eq!(ctx, 1),
      other => panic!("unexpected outcome: {:?}", other),
    }
  }
}
