//! Command encoder
//!
//! Maps logical commands onto the sensor's diagnostic request frames. All
//! three requests share one address; the payload is the side marker followed
//! by a fixed 7-byte template.

use bytes::{BufMut, BytesMut};
use contracts::{BusFrame, Channel, Command};

/// Diagnostic request address of the blind-spot sensor
pub const BSM_REQUEST_ADDRESS: u32 = 0x750;

/// Bus index the requests are sent on
pub const BSM_REQUEST_BUS: u8 = 0;

/// Enter extended reporting mode
pub const ENABLE_TEMPLATE: [u8; 7] = [0x02, 0x10, 0x60, 0x00, 0x00, 0x00, 0x00];

/// Return to default reporting mode
pub const DISABLE_TEMPLATE: [u8; 7] = [0x02, 0x10, 0x01, 0x00, 0x00, 0x00, 0x00];

/// Status request
pub const POLL_TEMPLATE: [u8; 7] = [0x02, 0x21, 0x69, 0x00, 0x00, 0x00, 0x00];

fn template(command: &Command) -> &'static [u8; 7] {
    match command {
        Command::EnableSession(_) => &ENABLE_TEMPLATE,
        Command::DisableSession(_) => &DISABLE_TEMPLATE,
        Command::Poll(_) => &POLL_TEMPLATE,
    }
}

/// Encode one command into its wire frame
pub fn encode(command: &Command) -> BusFrame {
    let mut data = BytesMut::with_capacity(8);
    data.put_u8(command.channel().marker());
    data.put_slice(template(command));
    BusFrame::new(BSM_REQUEST_ADDRESS, BSM_REQUEST_BUS, data.freeze())
}

/// Encode a cycle's commands, preserving order
pub fn encode_all(commands: &[Command]) -> Vec<BusFrame> {
    commands.iter().map(encode).collect()
}

/// Recover the command a request frame was encoded from
///
/// Returns `None` for frames that are not blind-spot requests.
pub fn decode(frame: &BusFrame) -> Option<Command> {
    if frame.address != BSM_REQUEST_ADDRESS || frame.data.len() != 8 {
        return None;
    }
    let channel = Channel::from_marker(frame.data[0])?;
    let body = &frame.data[1..];
    if body == &ENABLE_TEMPLATE[..] {
        Some(Command::EnableSession(channel))
    } else if body == &DISABLE_TEMPLATE[..] {
        Some(Command::DisableSession(channel))
    } else if body == &POLL_TEMPLATE[..] {
        Some(Command::Poll(channel))
    } else {
        None
    }
}
