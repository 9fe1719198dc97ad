//! AsyncCallGuard - 重なった非同期呼び出しのうち「最後に発行したもの」だけを反映する
//!
//! # 状態遷移
//! `idle → pending → {committed | superseded}`
//!
//! # 設計原則
//! - 連番は `call()` の時点（future を poll する前）で採番する
//! - 完了順ではなく発行順で勝者を決める（遅い古いレスポンスが新しい結果を上書きしない）
//! - 古い呼び出しの結果は共有状態に反映しないが、呼び出し元には必ず返す
//! - キャンセルは助言的：通信自体は止めず、結果を無視するだけ
//! - リトライ・タイムアウトは持たない（呼び出し側の責務）

mod operation;
mod state;

pub use operation::{FnOperation, HandlerSlot, Operation};
pub use state::{CallPhase, CallState};

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

pub struct AsyncCallGuard<A, R, E> {
    slot: HandlerSlot<A, R, E>,
    seq: AtomicU64,
    state: watch::Sender<CallState<R>>,
}

impl<A, R, E> AsyncCallGuard<A, R, E>
where
    A: Send + 'static,
    R: Clone + Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
{
    pub fn new(operation: impl Operation<A, R, E> + 'static) -> Self {
        Self::from_shared(Arc::new(operation))
    }

    pub fn from_shared(operation: Arc<dyn Operation<A, R, E>>) -> Self {
        let (state, _) = watch::channel(CallState::default());
        Self {
            slot: HandlerSlot::new(operation),
            seq: AtomicU64::new(0),
            state,
        }
    }

    /// Swap the wrapped operation. Calls already issued keep the old one.
    pub fn set_operation(&self, operation: impl Operation<A, R, E> + 'static) {
        self.slot.replace(Arc::new(operation));
    }

    /// Issue a call.
    ///
    /// The sequence number and the operation are both captured here, before
    /// the returned future is first polled. The outcome is always handed back
    /// to the caller; it only reaches the shared state if no newer call (or
    /// `reset`) was issued in the meantime.
    ///
    /// Dropping the returned future before it completes abandons the call.
    /// If it was still the latest one, `loading` goes back to `false`.
    pub fn call(&self, args: A) -> impl Future<Output = Result<R, E>> + Send + '_ {
        let operation = self.slot.current();
        let mut seq = 0;
        // 採番と loading の更新は watch のロック内で一緒に行う（reset との競合対策）
        self.state.send_modify(|state| {
            seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
        });
        debug!(seq, "guarded call issued");

        let in_flight = InFlight {
            state: &self.state,
            counter: &self.seq,
            seq,
            armed: true,
        };
        async move {
            let outcome = operation.run(args).await;
            in_flight.settle(&outcome);
            outcome
        }
    }

    /// Invalidate every in-flight call and clear the shared state.
    pub fn reset(&self) {
        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            *state = CallState::default();
        });
        debug!(seq, "guard reset");
    }

    pub fn snapshot(&self) -> CallState<R> {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> CallPhase {
        self.state.borrow().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<CallState<R>> {
        self.state.subscribe()
    }

    /// Highest sequence number handed out so far (including resets).
    pub fn latest_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }
}

/// One issued call, from `call()` until it settles or is dropped.
///
/// Every freshness check runs inside the watch lock, the same lock under
/// which `call` and `reset` bump the counter.
struct InFlight<'a, R> {
    state: &'a watch::Sender<CallState<R>>,
    counter: &'a AtomicU64,
    seq: u64,
    armed: bool,
}

impl<R> InFlight<'_, R> {
    fn is_latest(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.seq
    }
}

impl<R: Clone> InFlight<'_, R> {
    fn settle<E: fmt::Display>(mut self, outcome: &Result<R, E>) {
        self.armed = false;
        let committed = self.state.send_if_modified(|state| {
            if !self.is_latest() {
                return false;
            }
            match outcome {
                Ok(data) => {
                    state.data = Some(data.clone());
                    state.error = None;
                }
                Err(e) => state.error = Some(e.to_string()),
            }
            state.loading = false;
            true
        });

        if committed {
            debug!(seq = self.seq, ok = outcome.is_ok(), "guarded call committed");
        } else {
            debug!(seq = self.seq, latest = self.counter.load(Ordering::SeqCst), "superseded result dropped");
        }
    }
}

impl<R> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let cleared = self.state.send_if_modified(|state| {
            if !self.is_latest() || !state.loading {
                return false;
            }
            state.loading = false;
            true
        });
        debug!(seq = self.seq, cleared, "guarded call abandoned");
    }
}
