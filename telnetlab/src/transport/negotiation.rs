//! Telnet command stripping and option refusal (RFC 854).
//!
//! Console servers open with a burst of `IAC WILL ECHO`, `IAC DO NAWS` and
//! similar. We behave like a dumb network virtual terminal: every option the
//! server offers or requests is refused, and only the data bytes are passed up.

use bytes::{BufMut, BytesMut};
use memchr::memchr2;

/// Interpret As Command.
pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
/// Subnegotiation begin.
pub const SB: u8 = 250;
/// Subnegotiation end.
pub const SE: u8 = 240;

const CR: u8 = b'\r';
const NUL: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    /// Saw CR; a following NUL is padding.
    Cr,
    Iac,
    /// Saw IAC + WILL/WONT/DO/DONT, waiting for the option byte.
    Option(u8),
    Sub,
    SubIac,
}

/// Incremental Telnet stream decoder.
///
/// Keeps its state across calls so sequences split over two socket reads are
/// handled correctly.
#[derive(Debug, Default)]
pub struct TelnetDecoder {
    state: State,
}

impl TelnetDecoder {
    /// Create a decoder in the data state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `input`, appending data bytes to `data` and the negotiation
    /// answers we owe the server to `replies`.
    pub fn decode(&mut self, input: &[u8], data: &mut BytesMut, replies: &mut BytesMut) {
        let mut i = 0;
        while i < input.len() {
            match self.state {
                State::Data => {
                    // Copy plain runs in one go
                    let rest = &input[i..];
                    match memchr2(IAC, CR, rest) {
                        None => {
                            data.extend_from_slice(rest);
                            i = input.len();
                        }
                        Some(pos) => {
                            data.extend_from_slice(&rest[..pos]);
                            if rest[pos] == CR {
                                data.put_u8(CR);
                                self.state = State::Cr;
                            } else {
                                self.state = State::Iac;
                            }
                            i += pos + 1;
                        }
                    }
                }
                State::Cr => {
                    self.state = State::Data;
                    if input[i] == NUL {
                        i += 1;
                    }
                }
                State::Iac => {
                    let byte = input[i];
                    i += 1;
                    self.state = match byte {
                        IAC => {
                            data.put_u8(IAC);
                            State::Data
                        }
                        WILL | WONT | DO | DONT => State::Option(byte),
                        SB => State::Sub,
                        // NOP, GA, AYT and friends carry no payload
                        _ => State::Data,
                    };
                }
                State::Option(verb) => {
                    let option = input[i];
                    i += 1;
                    match verb {
                        DO => replies.extend_from_slice(&[IAC, WONT, option]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, option]),
                        _ => {}
                    }
                    self.state = State::Data;
                }
                State::Sub => {
                    if input[i] == IAC {
                        self.state = State::SubIac;
                    }
                    i += 1;
                }
                State::SubIac => {
                    self.state = if input[i] == SE {
                        State::Data
                    } else {
                        State::Sub
                    };
                    i += 1;
                }
            }
        }
    }
}

/// Double every IAC byte so payload data is not read as a command.
pub fn escape_iac(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 2);
    for &byte in payload {
        out.push(byte);
        if byte == IAC {
            out.push(IAC);
        }
    }
    out
}
