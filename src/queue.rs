//! Fixed-capacity circular queue of raw command strings.
//!
//! [`CommandQueue`] is a ring buffer with explicit read/write cursors and a
//! pending count. The count is authoritative: after a full wrap the cursors
//! are equal both when the queue is empty and when it is full.
//!
//! Entries are stored unparsed in fixed-size [`RawCommand`] slots so the
//! queue needs no allocator.
//!
//! ```rust
//! use rover_dispatch::queue::{CommandQueue, QueueError};
//!
//! let mut queue: CommandQueue<2> = CommandQueue::new();
//! queue.enqueue("forward-1").unwrap();
//! queue.enqueue("left-2").unwrap();
//! assert_eq!(queue.enqueue("stop"), Err(QueueError::Full));
//!
//! assert_eq!(queue.dequeue().as_deref(), Some("forward-1"));
//! queue.enqueue("stop").unwrap(); // wraps into slot 0
//! assert_eq!(queue.len(), 2);
//! ```

use heapless::String as HString;

/// Default number of pending commands.
pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

/// Maximum length of a single queued command, in bytes.
pub const MAX_COMMAND_LEN: usize = 64;

/// A raw, unparsed command held in a queue slot.
pub type RawCommand = HString<MAX_COMMAND_LEN>;

/// Reasons an enqueue can be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Every slot holds a pending command.
    #[error("command queue full")]
    Full,
    /// The command does not fit in a slot.
    #[error("command longer than a queue slot")]
    CommandTooLong,
    /// The write cursor points at a slot that still holds a command.
    ///
    /// Only reachable if the cursors and count disagree.
    #[error("write slot {0} still occupied")]
    SlotOccupied(usize),
}

/// Ring buffer of pending raw commands with capacity `N`.
///
/// # Invariants
///
/// - `count <= N`
/// - `read < N` and `write < N`
/// - exactly `count` slots are occupied, starting at `read`
pub struct CommandQueue<const N: usize = DEFAULT_QUEUE_CAPACITY> {
    slots: [Option<RawCommand>; N],
    write: usize,
    read: usize,
    count: usize,
}

impl<const N: usize> CommandQueue<N> {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            write: 0,
            read: 0,
            count: 0,
        }
    }

    /// Append a command at the write cursor.
    pub fn enqueue(&mut self, raw: &str) -> Result<(), QueueError> {
        if self.count >= N {
            return Err(QueueError::Full);
        }

        let slot = &mut self.slots[self.write];
        if let Some(stale) = slot.as_ref() {
            tracing::warn!(
                slot = self.write,
                stale = stale.as_str(),
                "command queue write slot not empty"
            );
            return Err(QueueError::SlotOccupied(self.write));
        }

        let entry = RawCommand::try_from(raw).map_err(|_| QueueError::CommandTooLong)?;
        *slot = Some(entry);
        self.write = (self.write + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Remove and return the oldest command.
    pub fn dequeue(&mut self) -> Option<RawCommand> {
        if self.count == 0 {
            return None;
        }

        let index = self.read;
        let entry = self.slots[index].take();
        self.read = (index + 1) % N;
        self.count -= 1;

        if entry.is_none() {
            tracing::warn!(slot = index, "command queue read slot was empty");
        }
        entry
    }

    /// The oldest command, without removing it.
    pub fn peek(&self) -> Option<&str> {
        if self.count == 0 {
            return None;
        }
        self.slots[self.read].as_deref()
    }

    /// Pending commands, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.count).filter_map(move |offset| self.slots[(self.read + offset) % N].as_deref())
    }

    /// Drop every pending command and rewind both cursors.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.write = 0;
        self.read = 0;
        self.count = 0;
    }

    /// Returns the number of pending commands.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Returns the fixed capacity `N`.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for CommandQueue<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("pending", &self.count)
            .field("capacity", &N)
            .field("read", &self.read)
            .field("write", &self.write)
            .finish()
    }
}
