//! Shared working set of classified posts.
//!
//! Each new search bumps a generation counter and clears the set. Stages
//! that outlive their search carry a [`SessionToken`] and their appends
//! are discarded once a newer search has started, so a superseded
//! pipeline can never write into the current feed.

use super::ClassifiedPost;
use std::sync::Mutex;
use uuid::Uuid;

/// Handle tying pipeline output to the search that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken {
    generation: u64,
    session_id: Uuid,
}

impl SessionToken {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

#[derive(Default)]
struct Inner {
    generation: u64,
    posts: Vec<ClassifiedPost>,
}

/// Owner of the classified posts the views read from.
#[derive(Default)]
pub struct FeedController {
    inner: Mutex<Inner>,
}

impl FeedController {
    pub fn new() -> FeedController {
        FeedController::default()
    }

    /// Clears the working set and invalidates all previously issued tokens.
    pub fn begin_session(&self) -> SessionToken {
        let mut inner = self.inner.lock().unwrap();
        inner.generation += 1;
        inner.posts.clear();
        SessionToken {
            generation: inner.generation,
            session_id: Uuid::new_v4(),
        }
    }

    /// Appends posts for the given session. Returns false and drops the
    /// posts when the token is stale.
    pub fn append(&self, token: &SessionToken, posts: Vec<ClassifiedPost>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.generation != token.generation {
            return false;
        }
        inner.posts.extend(posts);
        true
    }

    pub fn is_current(&self, token: &SessionToken) -> bool {
        self.inner.lock().unwrap().generation == token.generation
    }

    pub fn snapshot(&self) -> Vec<ClassifiedPost> {
        self.inner.lock().unwrap().posts.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
