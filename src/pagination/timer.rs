//! Cancellable debounce timer driven by an external clock

/// Handle of a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone)]
struct Scheduled<A> {
    token: TimerToken,
    due_ms: u64,
    action: A,
}

/// Holds at most one pending action
///
/// Scheduling replaces whatever was pending, so a later request always
/// cancels an earlier one. Time is supplied by the caller.
#[derive(Debug, Clone)]
pub struct Debounce<A> {
    pending: Option<Scheduled<A>>,
    next_token: u64,
}

impl<A> Default for Debounce<A> {
    fn default() -> Self {
        Self {
            pending: None,
            next_token: 0,
        }
    }
}

impl<A> Debounce<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: A) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(Scheduled {
            token,
            due_ms: now_ms.saturating_add(delay_ms),
            action,
        });
        token
    }

    /// Cancel the pending action, if any
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Take the pending action if it is due at `now_ms`
    pub fn take_due(&mut self, now_ms: u64) -> Option<A> {
        match &self.pending {
            Some(s) if s.due_ms <= now_ms => self.pending.take().map(|s| s.action),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the pending action
    pub fn pending_token(&self) -> Option<TimerToken> {
        self.pending.as_ref().map(|s| s.token)
    }

    /// When the pending action is due
    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|s| s.due_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_when_due() {
        let mut timer = Debounce::new();
        timer.schedule(1000, 300, "resume");
        assert_eq!(timer.take_due(1299), None);
        assert_eq!(timer.take_due(1300), Some("resume"));
        assert!(!timer.is_pending());
        assert_eq!(timer.take_due(2000), None);
    }

    #[test]
    fn test_later_request_replaces_earlier() {
        let mut timer = Debounce::new();
        let first = timer.schedule(0, 300, 1);
        let second = timer.schedule(100, 500, 2);
        assert_ne!(first, second);
        assert_eq!(timer.pending_token(), Some(second));
        assert_eq!(timer.take_due(300), None);
        assert_eq!(timer.take_due(600), Some(2));
    }

    #[test]
    fn test_cancel() {
        let mut timer = Debounce::new();
        timer.schedule(0, 10, ());
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert_eq!(timer.take_due(100), None);
    }
}
