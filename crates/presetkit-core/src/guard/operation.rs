//! Operation trait - guard が包む非同期処理
//!
//! # 学習ポイント
//! - ジェネリック async trait (`Operation<A, R, E>`)
//! - trait object として差し替え可能なスロット (`HandlerSlot`)
//! - クロージャのアダプタ (`FnOperation`)

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

/// The wrapped remote computation: request `A` in, response `R` or error `E` out.
///
/// ```ignore
/// struct Simulate { client: SimClient }
///
/// #[async_trait]
/// impl Operation<SimRequest, SimResponse, SimError> for Simulate {
///     async fn run(&self, request: SimRequest) -> Result<SimResponse, SimError> {
///         self.client.simulate(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait Operation<A, R, E>: Send + Sync
where
    A: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    async fn run(&self, args: A) -> Result<R, E>;
}

/// Adapter so a plain async closure can be used as an [`Operation`].
pub struct FnOperation<F> {
    f: F,
}

impl<F> FnOperation<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<A, R, E, F, Fut> Operation<A, R, E> for FnOperation<F>
where
    A: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    async fn run(&self, args: A) -> Result<R, E> {
        (self.f)(args).await
    }
}

/// Single-slot cell holding the current operation.
///
/// Read once per call, at call time. Replacing the slot never affects a call
/// that already captured the previous operation.
pub struct HandlerSlot<A, R, E> {
    current: RwLock<Arc<dyn Operation<A, R, E>>>,
}

impl<A, R, E> HandlerSlot<A, R, E>
where
    A: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    pub fn new(operation: Arc<dyn Operation<A, R, E>>) -> Self {
        Self {
            current: RwLock::new(operation),
        }
    }

    pub fn current(&self) -> Arc<dyn Operation<A, R, E>> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a new operation, returning the previous one.
    pub fn replace(&self, operation: Arc<dyn Operation<A, R, E>>) -> Arc<dyn Operation<A, R, E>> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, operation)
    }
}
