use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use color_eyre::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Cmd, Command, CommandEnv};
use crate::error::LoadError;
use crate::message::Message;
use crate::view::Inbox;

/// A single-shot async load that resolves to exactly one
/// [`Message::DataLoaded`] or [`Message::LoadError`].
///
/// The loader runs with the token it was constructed with; once that token
/// is cancelled the load is abandoned and nothing is delivered. Resolving
/// consumes the command, build a fresh one for every attempt.
pub struct TypedCommand<T> {
    name: String,
    token: CancellationToken,
    future: BoxFuture<'static, Result<T>>,
}

impl<T: Send + 'static> TypedCommand<T> {
    /// Bind `f` to `token` and `input`. Nothing runs until the command is
    /// resolved by the scheduler.
    pub fn new<I, F, Fut>(name: impl Into<String>, token: &CancellationToken, f: F, input: I) -> Self
    where
        I: Send + 'static,
        F: FnOnce(CancellationToken, I) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let bound = token.clone();
        Self {
            name: name.into(),
            token: token.clone(),
            future: Box::pin(async move { f(bound, input).await }),
        }
    }

    /// Transform the success payload, leaving errors untouched.
    pub fn map<U, F>(self, f: F) -> TypedCommand<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let future = self.future;
        TypedCommand {
            name: self.name,
            token: self.token,
            future: Box::pin(async move { future.await.map(f) }),
        }
    }

    /// Run the loader. `None` means the bound token was cancelled first.
    ///
    /// A panicking loader still resolves, as [`LoadError::Panicked`].
    pub async fn resolve(self) -> Option<std::result::Result<T, LoadError>> {
        let future = AssertUnwindSafe(self.future).catch_unwind();
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            outcome = future => Some(match outcome {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(report)) => Err(LoadError::from_report(&report)),
                Err(panic) => Err(LoadError::from_panic(panic.as_ref())),
            }),
        }
    }

    /// Deliver the outcome as a message to `inbox`.
    pub fn deliver_to(self, inbox: Inbox<T>) -> Cmd {
        Cmd::task(Deliver {
            command: self,
            inbox,
        })
    }
}

struct Deliver<T> {
    command: TypedCommand<T>,
    inbox: Inbox<T>,
}

#[async_trait]
impl<T: Send + 'static> Command for Deliver<T> {
    fn name(&self) -> String {
        self.command.name.clone()
    }

    async fn execute(self: Box<Self>, _env: CommandEnv) -> Result<()> {
        let Self { command, inbox } = *self;
        let name = command.name.clone();
        if inbox.is_closed() {
            debug!("Skipped '{name}', its frame is gone");
            return Ok(());
        }
        let delivered = match command.resolve().await {
            Some(Ok(value)) => inbox.send(Message::DataLoaded(value)),
            Some(Err(err)) => inbox.send(Message::LoadError(err)),
            None => return Ok(()),
        };
        if !delivered {
            debug!("Dropped result of '{name}', its frame is gone");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use color_eyre::eyre::eyre;
    use tokio::sync::mpsc;

    use super::*;
    use crate::command::tests::test_env;
    use crate::message::AppMessage;

    async fn double(_token: CancellationToken, n: u32) -> Result<u32> {
        Ok(n * 2)
    }

    async fn explode(_token: CancellationToken, (): ()) -> Result<u32> {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_resolves_to_loader_value() {
        let token = CancellationToken::new();
        let cmd = TypedCommand::new("double", &token, double, 21);
        assert_eq!(cmd.resolve().await, Some(Ok(42)));
    }

    #[tokio::test]
    async fn test_resolves_to_loader_error_verbatim() {
        let token = CancellationToken::new();
        let err = LoadError::failed("project not linked");
        let expected = err.clone();
        let cmd: TypedCommand<u32> = TypedCommand::new(
            "fail",
            &token,
            move |_, ()| async move { Err(color_eyre::Report::new(err)) },
            (),
        );
        assert_eq!(cmd.resolve().await, Some(Err(expected)));
    }

    #[tokio::test]
    async fn test_panicking_loader_still_resolves() {
        let token = CancellationToken::new();
        let cmd = TypedCommand::new("panic", &token, explode, ());
        assert_eq!(
            cmd.resolve().await,
            Some(Err(LoadError::Panicked("kaboom".to_string())))
        );
    }

    #[tokio::test]
    async fn test_cancelled_token_abandons_load() {
        let token = CancellationToken::new();
        let cmd = TypedCommand::new(
            "forever",
            &token,
            |_, ()| futures::future::pending::<Result<u32>>(),
            (),
        );
        token.cancel();
        assert_eq!(cmd.resolve().await, None);
    }

    #[tokio::test]
    async fn test_map_keeps_errors() {
        let token = CancellationToken::new();
        let ok = TypedCommand::new("double", &token, double, 2).map(|n| n.to_string());
        assert_eq!(ok.resolve().await, Some(Ok("4".to_string())));

        let failing: TypedCommand<u32> =
            TypedCommand::new("fail", &token, |_, ()| async { Err(eyre!("nope")) }, ());
        let mapped = failing.map(|n| n + 1);
        assert_eq!(mapped.resolve().await, Some(Err(LoadError::failed("nope"))));
    }

    #[tokio::test]
    async fn test_delivery_yields_exactly_one_message() {
        let (env, mut app_rx) = test_env();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let inbox = Inbox::new(tx, env.sender());
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let cmd = TypedCommand::new(
            "count",
            env.token(),
            move |_, n: u32| async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(n)
            },
            7,
        );
        cmd.deliver_to(inbox).run(env).await;

        assert!(matches!(rx.try_recv(), Ok(Message::DataLoaded(7))));
        assert!(rx.try_recv().is_err());
        assert!(matches!(app_rx.try_recv(), Ok(AppMessage::Wake)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_popped_frame_skips_the_loader() {
        let (env, _app_rx) = test_env();
        let (tx, rx) = mpsc::unbounded_channel::<Message<u32>>();
        let inbox = Inbox::new(tx, env.sender());
        drop(rx);
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        TypedCommand::new(
            "count",
            env.token(),
            move |_, (): ()| async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            },
            (),
        )
        .deliver_to(inbox)
        .run(env)
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
