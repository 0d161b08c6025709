//! Creation and extraction of the 29-bit CAN identifiers used on the
//! satellite bus.
//!
//! The identifier carries four fields. Their offsets are a wire contract
//! shared with every satellite firmware and are listed once, in [`layout`].
//!
//! ```text
//!  28 27 | 26 ........ 19 | 18 ...... 11 | 10 ........ 3 | 2 1 | 0
//!  prio  |   sender id    |   reserved   |    command    | rsv | response
//! ```

// Define, build, and decompose a watchdog CAN identifier.

/// Logical node identifier on the satellite bus.
pub type NodeId = u8;

/// Fixed bit layout of the extended identifier.
pub mod layout {
    /// Response flag: set when the frame answers a request.
    pub const RESPONSE_OFFSET: u32 = 0;
    pub const RESPONSE_WIDTH: u32 = 1;
    /// Command code (heartbeat, emergency stop…).
    pub const COMMAND_OFFSET: u32 = 3;
    pub const COMMAND_WIDTH: u32 = 8;
    /// Node ID of the emitter.
    pub const SENDER_OFFSET: u32 = 19;
    pub const SENDER_WIDTH: u32 = 8;
    /// Arbitration priority (0 = highest).
    pub const PRIORITY_OFFSET: u32 = 27;
    pub const PRIORITY_WIDTH: u32 = 2;

    /// Mask of all bits an extended identifier may use.
    pub const EXTENDED_ID_MASK: u32 = 0x1FFF_FFFF;

    /// Unshifted mask for a field of `width` bits.
    pub const fn field_mask(width: u32) -> u32 {
        (1 << width) - 1
    }

    /// Shifted mask for the sender field (`0x07F8_0000`).
    pub const SENDER_MASK: u32 = field_mask(SENDER_WIDTH) << SENDER_OFFSET;
    /// Shifted mask for the command field (`0x0000_07F8`).
    pub const COMMAND_MASK: u32 = field_mask(COMMAND_WIDTH) << COMMAND_OFFSET;
}

/// Command codes carried in the command field.
pub mod command {
    /// Periodic "still alive" frame emitted by every satellite.
    pub const HEARTBEAT: u8 = 0xE0;
    /// Alarm raised by the monitor: satellites must enter their safe state.
    pub const EMERGENCY_STOP: u8 = 0xE1;
}

/// Highest arbitration priority, used for alarms.
pub const PRIORITY_ALARM: u8 = 0;
/// Default priority for routine traffic (heartbeats).
pub const PRIORITY_ROUTINE: u8 = 2;

/// Extract the sender node ID from a raw identifier.
///
/// No validation: any value of the 8-bit field is returned as-is. Range
/// checking against the table belongs to the registry.
#[inline]
pub const fn decode_sender_id(identifier: u32) -> NodeId {
    ((identifier & layout::SENDER_MASK) >> layout::SENDER_OFFSET) as NodeId
}

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Encapsulates an extended CAN identifier (29 bits) and exposes accessors
/// for priority, sender, command, and response flag.
pub struct CanId(pub u32);

impl CanId {
    // Builder entry point
    /// Creates a pre-configured `CanIdBuilder` for a command and sender node.
    pub fn builder(command: u8, sender: NodeId) -> CanIdBuilder {
        CanIdBuilder::new(command, sender)
    }

    // Getters used to deconstruct the identifier
    /// Returns the priority (2 bits, value 0-3).
    pub fn priority(&self) -> u8 {
        self.field(layout::PRIORITY_OFFSET, layout::PRIORITY_WIDTH) as u8
    }

    /// Node ID of the emitter.
    pub fn sender(&self) -> NodeId {
        decode_sender_id(self.0)
    }

    /// Eight-bit command code.
    pub fn command(&self) -> u8 {
        self.field(layout::COMMAND_OFFSET, layout::COMMAND_WIDTH) as u8
    }

    /// Whether the frame is flagged as a response.
    pub fn is_response(&self) -> bool {
        self.field(layout::RESPONSE_OFFSET, layout::RESPONSE_WIDTH) == 1
    }

    #[inline]
    fn field(&self, offset: u32, width: u32) -> u32 {
        (self.0 >> offset) & layout::field_mask(width)
    }
}

//==================================================================================CAN_ID_BUILDER
#[derive(Debug, Clone, Copy)]
/// Fluent builder packing each field at its fixed offset.
///
/// Every field is masked to its width, so building never fails and stray bits
/// never leak into a neighbouring field.
pub struct CanIdBuilder {
    pub priority: u8,
    pub command: u8,
    pub sender: NodeId,
    pub response: bool,
}

impl CanIdBuilder {
    /// Initializes the builder for a given command and sender.
    pub fn new(command: u8, sender: NodeId) -> Self {
        Self {
            priority: PRIORITY_ROUTINE,
            command,
            sender,
            response: false,
        }
    }

    /// Sets the priority (2 bits) to use during construction.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority & layout::field_mask(layout::PRIORITY_WIDTH) as u8;
        self
    }

    /// Marks the identifier as a response.
    pub fn with_response(mut self, response: bool) -> Self {
        self.response = response;
        self
    }

    /// OR every field into its designated bit position.
    pub fn build(self) -> CanId {
        let id = ((self.priority as u32 & layout::field_mask(layout::PRIORITY_WIDTH))
            << layout::PRIORITY_OFFSET)
            | ((self.sender as u32) << layout::SENDER_OFFSET)
            | ((self.command as u32) << layout::COMMAND_OFFSET)
            | ((self.response as u32) << layout::RESPONSE_OFFSET);
        CanId(id & layout::EXTENDED_ID_MASK)
    }
}

//==================================================================================ACCEPTANCE_FILTER
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Single extended acceptance filter, in the "code + don't-care mask" form
/// used by CAN controllers: a bit set in `dont_care_mask` is ignored, every
/// other bit of the identifier must equal the same bit of `code`.
pub struct AcceptanceFilter {
    pub code: u32,
    pub dont_care_mask: u32,
}

impl AcceptanceFilter {
    /// Accept heartbeat frames only: the command field must equal
    /// [`command::HEARTBEAT`], every other field is ignored.
    pub const HEARTBEAT: Self = Self {
        code: (command::HEARTBEAT as u32) << layout::COMMAND_OFFSET,
        dont_care_mask: layout::EXTENDED_ID_MASK & !layout::COMMAND_MASK,
    };

    /// Let every frame through.
    pub const ACCEPT_ALL: Self = Self {
        code: 0,
        dont_care_mask: layout::EXTENDED_ID_MASK,
    };

    /// Checks an identifier against the filter.
    pub fn matches(&self, id: CanId) -> bool {
        let care = layout::EXTENDED_ID_MASK & !self.dont_care_mask;
        (id.0 & care) == (self.code & care)
    }
}
