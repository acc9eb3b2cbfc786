//! Completion notification returned by the animators.

use std::cell::RefCell;
use std::rc::Rc;

type Continuation = Box<dyn FnOnce()>;

#[derive(Default)]
struct ChainState {
    callbacks: Vec<Continuation>,
    completed: bool,
}

/// An ordered list of continuations fired once when an animation finishes.
///
/// Cloning yields another handle to the same chain, so the animator keeps one
/// handle for its completion timer while the caller registers on the other.
///
/// Continuations registered after completion are kept but never run.
#[derive(Clone, Default)]
pub struct CallbackChain {
    state: Rc<RefCell<ChainState>>,
}

impl CallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a continuation. Returns `self` so registrations can chain.
    pub fn then<F>(&self, callback: F) -> &Self
    where
        F: FnOnce() + 'static,
    {
        let mut state = self.state.borrow_mut();
        if state.completed {
            log::debug!("continuation registered on a completed chain will not run");
        }
        state.callbacks.push(Box::new(callback));
        self
    }

    /// Whether the owning animation has signalled completion
    pub fn is_done(&self) -> bool {
        self.state.borrow().completed
    }

    /// Number of continuations waiting to run
    pub fn pending(&self) -> usize {
        let state = self.state.borrow();
        if state.completed {
            0
        } else {
            state.callbacks.len()
        }
    }

    /// Run every registered continuation in order. Only the first call has
    /// any effect.
    pub(crate) fn done(&self) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.completed {
                return;
            }
            state.completed = true;
            std::mem::take(&mut state.callbacks)
        };
        // Borrow released: continuations may touch this chain again
        for callback in callbacks {
            callback();
        }
    }
}

impl std::fmt::Debug for CallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("CallbackChain")
            .field("callbacks", &state.callbacks.len())
            .field("completed", &state.completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let chain = CallbackChain::new();

        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        chain
            .then(move || a.borrow_mut().push(1))
            .then(move || b.borrow_mut().push(2))
            .then(move || c.borrow_mut().push(3));

        assert!(log.borrow().is_empty());
        chain.done();
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_fires_exactly_once() {
        let count = Rc::new(RefCell::new(0));
        let chain = CallbackChain::new();
        let counter = count.clone();
        chain.then(move || *counter.borrow_mut() += 1);

        chain.done();
        chain.done();
        assert_eq!(*count.borrow(), 1);
        assert!(chain.is_done());
    }

    #[test]
    fn test_late_registration_never_fires() {
        let fired = Rc::new(RefCell::new(false));
        let chain = CallbackChain::new();
        chain.done();

        let flag = fired.clone();
        chain.then(move || *flag.borrow_mut() = true);
        chain.done();

        assert!(!*fired.borrow());
        assert_eq!(chain.pending(), 0);
    }

    #[test]
    fn test_continuation_may_register_on_same_chain() {
        let chain = CallbackChain::new();
        let inner = chain.clone();
        chain.then(move || {
            inner.then(|| {});
        });
        chain.done();
        assert!(chain.is_done());
    }

    #[test]
    fn test_clones_share_state() {
        let chain = CallbackChain::new();
        let other = chain.clone();
        other.then(|| {});
        assert_eq!(chain.pending(), 1);
        other.done();
        assert!(chain.is_done());
    }
}
