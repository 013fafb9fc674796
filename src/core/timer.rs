use std::time::Duration;

/// Single-slot deferred task keyed on the page clock.
///
/// Scheduling again replaces the pending deadline (cancel-and-restart), which
/// is what makes it usable as a debounce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deferred {
    due: Option<Duration>,
}

impl Deferred {
    pub fn schedule(&mut self, now: Duration, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Duration> {
        self.due
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Coalesces a burst of requests into one animation-frame callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameGate {
    ticking: bool,
}

impl FrameGate {
    /// `true` if the caller must request a frame; `false` if one is already pending.
    pub fn request(&mut self) -> bool {
        if self.ticking {
            return false;
        }
        self.ticking = true;
        true
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn complete(&mut self) {
        self.ticking = false;
    }
}

/// The one host timeout armed against the runtime's next deadline.
///
/// `H` is the host's timeout handle (a `setTimeout` id in the browser).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostTimer<H> {
    armed: Option<(H, Duration)>,
}

/// What the host must do to follow a new next-deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rearm<H> {
    pub clear: Option<H>,
    pub arm: Option<Duration>,
}

impl<H: Copy> HostTimer<H> {
    /// Nothing changes while the armed timeout already matches `next`.
    pub fn plan(&mut self, next: Option<Duration>) -> Rearm<H> {
        if self.armed.map(|(_, due)| due) == next {
            return Rearm {
                clear: None,
                arm: None,
            };
        }
        Rearm {
            clear: self.armed.take().map(|(handle, _)| handle),
            arm: next,
        }
    }

    pub fn armed(&mut self, handle: H, due: Duration) {
        self.armed = Some((handle, due));
    }

    /// Called from the timeout callback itself.
    pub fn fired(&mut self) {
        self.armed = None;
    }

    pub fn handle(&self) -> Option<H> {
        self.armed.map(|(handle, _)| handle)
    }
}

pub fn earliest(deadlines: impl IntoIterator<Item = Option<Duration>>) -> Option<Duration> {
    deadlines.into_iter().flatten().min()
}
