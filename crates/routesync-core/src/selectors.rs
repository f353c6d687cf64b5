//! Selectors over the router slice of application state.

use crate::ports::RouterSlice;
use crate::routes::{Match, MatchOptions, PathPattern};
use crate::{ActionKind, Location, RouterState, SyncError};
use std::cell::RefCell;
use std::rc::Rc;

pub fn get_router<S: RouterSlice + ?Sized>(state: &S) -> &RouterState {
    state.router()
}

pub fn get_location<S: RouterSlice + ?Sized>(state: &S) -> &Location {
    &state.router().location
}

pub fn get_action<S: RouterSlice + ?Sized>(state: &S) -> ActionKind {
    state.router().action
}

pub fn get_search<S: RouterSlice + ?Sized>(state: &S) -> &str {
    &state.router().location.search
}

pub fn get_hash<S: RouterSlice + ?Sized>(state: &S) -> &str {
    &state.router().location.hash
}

#[derive(Debug, Default)]
struct LastSelection {
    pathname: Option<String>,
    selected: Option<Rc<Match>>,
}

/// Memoized selector matching the current pathname against one pattern.
///
/// Recomputes only when the pathname changes, and keeps returning the
/// previous `Rc<Match>` while the matched url and params stay the same.
#[derive(Debug)]
pub struct MatchSelector {
    pattern: PathPattern,
    last: RefCell<LastSelection>,
}

impl MatchSelector {
    /// Selector for a non-exact match of `path`.
    pub fn new(path: &str) -> Result<Self, SyncError> {
        Self::with_options(path, MatchOptions::default())
    }

    pub fn with_options(path: &str, options: MatchOptions) -> Result<Self, SyncError> {
        Ok(Self {
            pattern: PathPattern::compile(path, options)?,
            last: RefCell::new(LastSelection::default()),
        })
    }

    pub fn select<S: RouterSlice + ?Sized>(&self, state: &S) -> Option<Rc<Match>> {
        let pathname = &state.router().location.pathname;
        let mut last = self.last.borrow_mut();

        if last.pathname.as_deref() == Some(pathname.as_str()) {
            return last.selected.clone();
        }

        let fresh = self.pattern.matches(pathname);
        let keep_previous = match (&fresh, &last.selected) {
            (Some(fresh), Some(previous)) => {
                fresh.url == previous.url && fresh.params == previous.params
            }
            _ => false,
        };

        if !keep_previous {
            last.selected = fresh.map(Rc::new);
        }
        last.pathname = Some(pathname.clone());
        last.selected.clone()
    }
}
