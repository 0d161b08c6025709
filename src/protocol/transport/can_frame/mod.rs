//! In-memory representation of a satellite-bus CAN frame, and the builders
//! for the frames the watchdog emits.
use crate::protocol::transport::can_id::{command, CanId, NodeId, PRIORITY_ROUTINE};
use crate::protocol::transport::MAX_FRAME_DATA;
use embedded_can::{ExtendedId, Id};

/// Length of the emergency-stop payload.
pub const ESTOP_PAYLOAD_LEN: usize = 5;
/// Value of the last emergency-stop payload byte understood by satellites as "stop now".
pub const ESTOP_CODE: u8 = 0xFF;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw frame as read from / written to the CAN bus. Always extended.
pub struct CanFrame {
    /// Full 29-bit CAN identifier stored inside a `u32`.
    pub id: CanId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Build a frame, keeping at most eight payload bytes.
    pub fn new(id: CanId, payload: &[u8]) -> Self {
        let len = payload.len().min(MAX_FRAME_DATA);
        let mut data = [0u8; 8];
        data[..len].copy_from_slice(&payload[..len]);
        Self { id, data, len }
    }

    /// Valid payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len.min(MAX_FRAME_DATA)]
    }

    /// Emergency-stop alarm emitted by the monitor `this_node_id`.
    pub fn emergency_stop(this_node_id: NodeId, priority: u8) -> Self {
        encode_alarm_frame(
            this_node_id,
            priority,
            command::EMERGENCY_STOP,
            false,
            &emergency_stop_payload(),
        )
    }

    /// Heartbeat as a satellite would send it. Used by tests and bench tooling.
    pub fn heartbeat(sender: NodeId) -> Self {
        Self::new(
            CanId::builder(command::HEARTBEAT, sender)
                .with_priority(PRIORITY_ROUTINE)
                .build(),
            &[],
        )
    }
}

/// Build an outgoing alarm frame. Deterministic and infallible: each field is
/// masked into its slot of the identifier and the payload is truncated to
/// eight bytes.
pub fn encode_alarm_frame(
    this_node_id: NodeId,
    priority: u8,
    command: u8,
    response: bool,
    payload: &[u8],
) -> CanFrame {
    let id = CanId::builder(command, this_node_id)
        .with_priority(priority)
        .with_response(response)
        .build();
    CanFrame::new(id, payload)
}

/// Five bytes, all zero except the trailing stop code.
pub const fn emergency_stop_payload() -> [u8; ESTOP_PAYLOAD_LEN] {
    let mut payload = [0u8; ESTOP_PAYLOAD_LEN];
    payload[ESTOP_PAYLOAD_LEN - 1] = ESTOP_CODE;
    payload
}

//==================================================================================EMBEDDED_CAN
// Lets HAL drivers hand their frames over without a manual copy.
impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Extended(ext) if data.len() <= MAX_FRAME_DATA => {
                Some(CanFrame::new(CanId(ext.as_raw()), data))
            }
            _ => None,
        }
    }

    /// Remote frames are not used on the satellite bus.
    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        true
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        // `CanId` never carries bits above 28 when built through `CanIdBuilder`.
        match ExtendedId::new(self.id.0) {
            Some(ext) => Id::Extended(ext),
            None => Id::Extended(ExtendedId::MAX),
        }
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}
