use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};

use super::state::{CommitId, CommitState};

/// Ordered states of one submission, ending in exactly one terminal state.
pub struct CommitStream {
    id: CommitId,
    rejected: bool,
    inner: BoxStream<'static, CommitState>,
}

impl fmt::Debug for CommitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitStream")
            .field("id", &self.id)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

impl CommitStream {
    pub(crate) fn running(id: CommitId, inner: BoxStream<'static, CommitState>) -> Self {
        Self {
            id,
            rejected: false,
            inner,
        }
    }

    /// Stream that only reports the validation failure.
    pub(crate) fn rejected(id: CommitId, terminal: CommitState) -> Self {
        Self {
            id,
            rejected: true,
            inner: stream::once(async move { terminal }).boxed(),
        }
    }

    pub fn id(&self) -> CommitId {
        self.id
    }

    /// Input failed validation; nothing will be sent.
    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    /// Drive the commit to completion and return its terminal state.
    pub async fn settle(mut self) -> CommitState {
        let mut last = CommitState::Draft;
        while let Some(state) = self.inner.next().await {
            last = state;
        }
        last
    }

    /// Drive the commit to completion, keeping every state in order.
    pub async fn collect_states(self) -> Vec<CommitState> {
        self.inner.collect().await
    }
}

impl Stream for CommitStream {
    type Item = CommitState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
