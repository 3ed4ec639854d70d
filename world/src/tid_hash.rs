//! Thing-ID index: fixed buckets of doubly linked chains.
//!
//! Chain links live in a side table keyed by actor handle, so the actor record
//! itself carries no index bookkeeping. Insertion prepends, removal relinks the
//! neighbors (or the bucket head) in constant time.

use std::collections::HashMap;

use actorsim_core::{ActorId, ThingId};

const BUCKETS: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ChainLink {
    tid: ThingId,
    prev: Option<ActorId>,
    next: Option<ActorId>,
}

#[derive(Clone, Debug)]
pub(crate) struct TidHash {
    heads: [Option<ActorId>; BUCKETS],
    links: HashMap<ActorId, ChainLink>,
}

fn bucket(tid: ThingId) -> usize {
    usize::from(tid.get()) & (BUCKETS - 1)
}

impl TidHash {
    pub(crate) fn new() -> Self {
        Self {
            heads: [None; BUCKETS],
            links: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, actor: ActorId, tid: ThingId) {
        if tid.is_none() {
            return;
        }
        self.remove(actor);

        let head = &mut self.heads[bucket(tid)];
        let next = head.replace(actor);
        if let Some(next) = next {
            if let Some(link) = self.links.get_mut(&next) {
                link.prev = Some(actor);
            }
        }
        let _ = self.links.insert(
            actor,
            ChainLink {
                tid,
                prev: None,
                next,
            },
        );
    }

    pub(crate) fn remove(&mut self, actor: ActorId) {
        let Some(link) = self.links.remove(&actor) else {
            return;
        };

        match link.prev {
            Some(prev) => {
                if let Some(prev_link) = self.links.get_mut(&prev) {
                    prev_link.next = link.next;
                }
            }
            None => self.heads[bucket(link.tid)] = link.next,
        }
        if let Some(next) = link.next {
            if let Some(next_link) = self.links.get_mut(&next) {
                next_link.prev = link.prev;
            }
        }
    }

    /// Walks the chain of `tid`'s bucket from its head, or from the node after
    /// `after`, and returns the first node that carries `tid`.
    pub(crate) fn find_next(&self, after: Option<ActorId>, tid: ThingId) -> Option<ActorId> {
        if tid.is_none() {
            return None;
        }
        let mut cursor = match after {
            None => self.heads[bucket(tid)],
            Some(actor) => self.links.get(&actor)?.next,
        };
        while let Some(actor) = cursor {
            let link = self.links.get(&actor)?;
            if link.tid == tid {
                return Some(actor);
            }
            cursor = link.next;
        }
        None
    }

    /// Every node of `tid`'s bucket in chain order, whatever tag it carries.
    #[cfg(test)]
    fn bucket_chain(&self, tid: ThingId) -> Vec<ActorId> {
        let mut chain = Vec::new();
        let mut cursor = self.heads[bucket(tid)];
        while let Some(actor) = cursor {
            chain.push(actor);
            cursor = self.links.get(&actor).and_then(|link| link.next);
        }
        chain
    }
}
