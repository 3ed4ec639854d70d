//! Network identity allocation.

use std::collections::BTreeSet;

use actorsim_core::NetId;

/// Hands out the lowest free identity, starting at one.
#[derive(Clone, Debug, Default)]
pub(crate) struct NetIdPool {
    released: BTreeSet<u32>,
    high_water: u32,
}

impl NetIdPool {
    pub(crate) fn allocate(&mut self) -> NetId {
        if let Some(value) = self.released.pop_first() {
            return NetId::new(value);
        }
        self.high_water += 1;
        NetId::new(self.high_water)
    }

    pub(crate) fn release(&mut self, id: NetId) {
        if id.get() != 0 && id.get() <= self.high_water {
            let _ = self.released.insert(id.get());
        }
    }

    /// Takes a specific identity out of the pool; fails when it is in use.
    pub(crate) fn claim(&mut self, id: NetId) -> bool {
        let value = id.get();
        if value == 0 {
            return false;
        }
        if value > self.high_water {
            self.released.extend(self.high_water + 1..value);
            self.high_water = value;
            return true;
        }
        self.released.remove(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_identities_are_reused_lowest_first() {
        let mut pool = NetIdPool::default();
        let first = pool.allocate();
        let second = pool.allocate();
        let third = pool.allocate();
        pool.release(third);
        pool.release(first);

        assert_eq!(pool.allocate(), first);
        assert_eq!(pool.allocate(), third);
        assert_eq!(pool.allocate(), NetId::new(second.get() + 2));
    }

    #[test]
    fn claiming_ahead_frees_the_gap() {
        let mut pool = NetIdPool::default();
        assert!(pool.claim(NetId::new(4)));
        assert!(!pool.claim(NetId::new(4)));
        assert_eq!(pool.allocate(), NetId::new(1));
        assert_eq!(pool.allocate(), NetId::new(2));
        assert_eq!(pool.allocate(), NetId::new(3));
        assert_eq!(pool.allocate(), NetId::new(5));
    }
}
