//! Fixed-capacity command ring.
//!
//! Enqueue never fails: when the ring is full the oldest command is evicted
//! and handed back to the caller. Every enqueued command is stamped with a
//! 16-bit sequence id that counts 1..=65535 and then wraps to 1, so 0 always
//! means "not queued".

use crate::config::COMMAND_BUFFER_LEN;
use crate::error::BufferError;
use rover_proto::DecodedCommand;

/// Result of [`CommandBuffer::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Enqueued {
    /// Id stamped on the queued command.
    pub id: u16,
    /// Oldest command, if it had to make room.
    pub evicted: Option<DecodedCommand>,
}

/// Ring of decoded commands, oldest first.
///
/// # Example
///
/// ```
/// use rover_core::CommandBuffer;
/// use rover_proto::decode_payload;
///
/// let mut buffer: CommandBuffer = CommandBuffer::new();
/// let queued = buffer.enqueue(decode_payload(b"ST").unwrap());
/// assert_eq!(queued.id, 1);
/// assert!(queued.evicted.is_none());
///
/// let cmd = buffer.dequeue().unwrap();
/// assert_eq!(cmd.id, 1);
/// assert!(buffer.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct CommandBuffer<const N: usize = COMMAND_BUFFER_LEN> {
    slots: [DecodedCommand; N],
    /// Index of the oldest queued command
    head: usize,
    count: usize,
    newest_id: u16,
}

impl<const N: usize> CommandBuffer<N> {
    const NON_EMPTY: () = assert!(N > 0, "command buffer capacity must be non-zero");

    #[must_use]
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            slots: [DecodedCommand::EMPTY; N],
            head: 0,
            count: 0,
            newest_id: 0,
        }
    }

    /// Queue `cmd`, stamping it with the next sequence id.
    ///
    /// If the ring is full the oldest command is evicted first.
    pub fn enqueue(&mut self, cmd: DecodedCommand) -> Enqueued {
        let evicted = if self.count == N {
            let oldest = self.slots[self.head];
            self.head = (self.head + 1) % N;
            self.count -= 1;
            Some(oldest)
        } else {
            None
        };

        let id = self.next_id();
        let tail = (self.head + self.count) % N;
        self.slots[tail] = cmd.with_id(id);
        self.count += 1;

        Enqueued { id, evicted }
    }

    /// Remove and return the oldest command.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Empty`] if nothing is queued. The buffer is not
    /// modified in that case.
    pub fn dequeue(&mut self) -> Result<DecodedCommand, BufferError> {
        if self.count == 0 {
            return Err(BufferError::Empty);
        }

        let cmd = self.slots[self.head];
        self.head = (self.head + 1) % N;
        self.count -= 1;
        Ok(cmd)
    }

    /// Oldest command, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&DecodedCommand> {
        if self.count == 0 {
            None
        } else {
            Some(&self.slots[self.head])
        }
    }

    /// Drop every queued command. The id sequence keeps counting.
    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }

    /// Iterator that dequeues commands oldest first.
    pub fn drain(&mut self) -> Drain<'_, N> {
        Drain { buffer: self }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.count == N
    }

    /// Number of queued commands.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Id given to the most recent enqueue, 0 if there has been none.
    #[inline]
    #[must_use]
    pub const fn newest_id(&self) -> u16 {
        self.newest_id
    }

    fn next_id(&mut self) -> u16 {
        self.newest_id = match self.newest_id {
            u16::MAX => 1,
            id => id + 1,
        };
        self.newest_id
    }
}

impl<const N: usize> Default for CommandBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Draining iterator returned by [`CommandBuffer::drain`].
///
/// Commands not yet yielded stay queued if the iterator is dropped early.
pub struct Drain<'a, const N: usize> {
    buffer: &'a mut CommandBuffer<N>,
}

impl<const N: usize> Iterator for Drain<'_, N> {
    type Item = DecodedCommand;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.dequeue().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.buffer.count, Some(self.buffer.count))
    }
}

impl<const N: usize> ExactSizeIterator for Drain<'_, N> {}
