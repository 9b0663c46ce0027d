//! Matcher reuse across blocks.
//!
//! A matcher is rebuilt from the order store every block; pooling only
//! recycles its allocations. Released matchers are reset before they are
//! stored, so acquisition always yields an empty matcher and behavior is
//! identical to constructing fresh ones.

use crate::matcher::Matcher;

#[derive(Debug, Default)]
pub struct MatcherPool {
    free: Vec<Matcher>,
}

impl MatcherPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an empty matcher, reusing a released one when available.
    pub fn acquire(&mut self) -> Matcher {
        self.free.pop().unwrap_or_default()
    }

    /// Return a matcher to the pool.
    pub fn release(&mut self, mut matcher: Matcher) {
        matcher.reset();
        self.free.push(matcher);
    }

    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}
