//! Command hand-off between execution contexts.
//!
//! The link task (or UART interrupt) decodes commands and the control loop
//! consumes them. [`CommandMailbox`] is the queue between the two: every
//! access runs inside the raw mutex, so a post and a take never interleave.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;
use rover_proto::DecodedCommand;

/// Bounded, overwrite-oldest queue of decoded commands.
///
/// With `M = CriticalSectionRawMutex` the mailbox is `Sync` and can live in a
/// `static`. `N = 1` gives a single-slot mailbox where each post replaces the
/// pending command.
///
/// # Example
///
/// ```
/// use embassy_sync::blocking_mutex::raw::NoopRawMutex;
/// use rover_core::CommandMailbox;
/// use rover_proto::CommandBuilder;
///
/// let mailbox: CommandMailbox<NoopRawMutex, 2> = CommandMailbox::new();
/// mailbox.post(CommandBuilder::stop().build());
/// assert_eq!(mailbox.len(), 1);
/// assert!(mailbox.take().is_some());
/// assert!(mailbox.take().is_none());
/// ```
pub struct CommandMailbox<M: RawMutex, const N: usize> {
    inner: Mutex<M, RefCell<Deque<DecodedCommand, N>>>,
}

impl<M: RawMutex, const N: usize> CommandMailbox<M, N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Queue `cmd` for the consumer.
    ///
    /// Returns the oldest pending command if it was dropped to make room.
    pub fn post(&self, cmd: DecodedCommand) -> Option<DecodedCommand> {
        self.inner.lock(|queue| {
            let mut queue = queue.borrow_mut();
            let evicted = if queue.is_full() {
                queue.pop_front()
            } else {
                None
            };
            if queue.push_back(cmd).is_err() {
                // Only reachable with N == 0, where nothing can be held
                return Some(cmd);
            }
            evicted
        })
    }

    /// Remove and return the oldest pending command.
    pub fn take(&self) -> Option<DecodedCommand> {
        self.inner.lock(|queue| queue.borrow_mut().pop_front())
    }

    /// Number of pending commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock(|queue| queue.borrow().len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock(|queue| queue.borrow().is_empty())
    }

    /// Drop every pending command.
    pub fn clear(&self) {
        self.inner.lock(|queue| queue.borrow_mut().clear());
    }
}

impl<M: RawMutex, const N: usize> Default for CommandMailbox<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
