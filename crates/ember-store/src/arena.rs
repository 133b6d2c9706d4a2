//! Two-slot grid arena with an active index.
//!
//! The two grid buffers of a store alternate between "current" (read
//! source) and "next" (write target). [`GridArena::swap`] only toggles which
//! slot is current; no grid data is copied.
//!
//! ```text
//! step k:   current = A ──stencil──▶ next = B     swap
//! step k+1: current = B ──stencil──▶ next = A     swap
//! ```

use ember_core::{GridDims, GridView, GridViewMut};

/// One of the two grid buffers of a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Buffer A, at `offset_buffer_a`. Current before the first step.
    #[default]
    A,
    /// Buffer B, at `offset_buffer_b`.
    B,
}

impl Slot {
    /// The other slot.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// The slot holding the state after `steps` steps from a fresh store.
    pub fn holding_step(steps: u64) -> Self {
        if steps % 2 == 0 {
            Self::A
        } else {
            Self::B
        }
    }
}

/// Mutable access to both grid buffers of a store.
///
/// Borrowed from [`Store::arena`](crate::Store::arena). The active index
/// lives in the store, so it survives across arena borrows.
#[derive(Debug)]
pub struct GridArena<'a> {
    a: GridViewMut<'a>,
    b: GridViewMut<'a>,
    current: &'a mut Slot,
}

impl<'a> GridArena<'a> {
    /// Pair two equally sized buffers with an active index.
    ///
    /// Stores build their arena over the mapping; tests and benchmarks can
    /// build one over plain vectors.
    ///
    /// # Panics
    ///
    /// Panics if the two views have different dimensions.
    pub fn new(a: GridViewMut<'a>, b: GridViewMut<'a>, current: &'a mut Slot) -> Self {
        assert_eq!(a.dims(), b.dims(), "arena slots must have equal dimensions");
        Self { a, b, current }
    }

    /// Grid dimensions shared by both slots.
    pub fn dims(&self) -> GridDims {
        self.a.dims()
    }

    /// The slot currently acting as the read source.
    pub fn current(&self) -> Slot {
        *self.current
    }

    /// Read-only view of `slot`.
    pub fn view(&self, slot: Slot) -> GridView<'_> {
        match slot {
            Slot::A => self.a.as_view(),
            Slot::B => self.b.as_view(),
        }
    }

    /// Mutable view of `slot`.
    pub fn view_mut(&mut self, slot: Slot) -> &mut GridViewMut<'a> {
        match slot {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
        }
    }

    /// Both buffers, A then B, for writes that must hit both.
    pub fn both_mut(&mut self) -> (&mut GridViewMut<'a>, &mut GridViewMut<'a>) {
        (&mut self.a, &mut self.b)
    }

    /// The current buffer (read-only) and the next buffer (writable).
    pub fn split(&mut self) -> (GridView<'_>, &mut GridViewMut<'a>) {
        match *self.current {
            Slot::A => (self.a.as_view(), &mut self.b),
            Slot::B => (self.b.as_view(), &mut self.a),
        }
    }

    /// Exchange the roles of current and next.
    pub fn swap(&mut self) {
        *self.current = self.current.other();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_step_alternates() {
        assert_eq!(Slot::holding_step(0), Slot::A);
        assert_eq!(Slot::holding_step(1), Slot::B);
        assert_eq!(Slot::holding_step(2), Slot::A);
        assert_eq!(Slot::A.other(), Slot::B);
        assert_eq!(Slot::B.other().other(), Slot::B);
    }

    #[test]
    fn split_tracks_active_index() {
        let dims = GridDims::new(1, 1).unwrap();
        let mut a = vec![1.0; 4];
        let mut b = vec![2.0; 4];
        let mut current = Slot::A;
        let mut arena = GridArena::new(
            GridViewMut::new(&mut a, dims).unwrap(),
            GridViewMut::new(&mut b, dims).unwrap(),
            &mut current,
        );

        {
            let (cur, next) = arena.split();
            assert_eq!(cur[(0, 0)], 1.0);
            next[(0, 0)] = 9.0;
        }
        arena.swap();
        assert_eq!(arena.current(), Slot::B);
        let (cur, _) = arena.split();
        assert_eq!(cur[(0, 0)], 9.0);

        drop(arena);
        assert_eq!(current, Slot::B);
        assert_eq!(b[0], 9.0);
        assert_eq!(a[0], 1.0);
    }
}
