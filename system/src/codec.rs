use crate::message::{ClientCommand, ProtocolError, ServerEvent};
use bincode::Options;

/// Upper bound for a single inbound frame, in bytes.
pub const MAX_FRAME_BYTES: usize = 1 << 20;

/// How a connection encodes its messages: JSON in text frames or bincode in binary frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    Json,
    Bincode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedFrame {
    Text(String),
    Binary(Vec<u8>),
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_FRAME_BYTES as u64)
}

impl Codec {
    /// Decodes and validates one inbound frame.
    pub fn decode_command(&self, bytes: &[u8]) -> Result<ClientCommand, ProtocolError> {
        let command: ClientCommand = match self {
            Codec::Json => serde_json::from_slice(bytes)?,
            Codec::Bincode => bincode_options().deserialize(bytes)?,
        };
        command.validate()?;
        Ok(command)
    }

    pub fn encode_command(&self, command: &ClientCommand) -> Result<EncodedFrame, ProtocolError> {
        Ok(match self {
            Codec::Json => EncodedFrame::Text(serde_json::to_string(command)?),
            Codec::Bincode => EncodedFrame::Binary(bincode::DefaultOptions::new().serialize(command)?),
        })
    }

    pub fn decode_event(&self, bytes: &[u8]) -> Result<ServerEvent, ProtocolError> {
        Ok(match self {
            Codec::Json => serde_json::from_slice(bytes)?,
            Codec::Bincode => bincode::DefaultOptions::new().deserialize(bytes)?,
        })
    }

    pub fn encode_event(&self, event: &ServerEvent) -> Result<EncodedFrame, ProtocolError> {
        Ok(match self {
            Codec::Json => EncodedFrame::Text(serde_json::to_string(event)?),
            Codec::Bincode => EncodedFrame::Binary(bincode::DefaultOptions::new().serialize(event)?),
        })
    }
}
