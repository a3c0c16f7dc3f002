//! Payload encoding
//!
//! ParameterSnapshot: `count: u16` then per entry
//! `name_len: u16, name: utf-8, kind: i32, _int: i64, _float: f32, _bool: u8`.
//!
//! StateChange: `state_hash: i32, normalized_time: f32`.

use bytes::{Buf, BufMut, BytesMut};

use mimic_core::{
    MimicError, MimicResult, ParameterDescriptor, ParameterKind, ParameterSnapshot,
    ParameterValue, StateChange, StateHash,
};

/// Fixed part of one parameter entry (everything except the name bytes)
pub const PARAMETER_ENTRY_FIXED_SIZE: usize = 2 + 4 + 8 + 4 + 1;

/// StateChange payload size
pub const STATE_CHANGE_SIZE: usize = 8;

/// Payload codec
pub struct PayloadCodec;

impl PayloadCodec {
    /// Encoded size of a parameter snapshot payload
    pub fn parameters_size(snapshot: &ParameterSnapshot) -> usize {
        2 + snapshot
            .iter()
            .map(|d| PARAMETER_ENTRY_FIXED_SIZE + d.name.len())
            .sum::<usize>()
    }

    /// Append a parameter snapshot payload to `buf`
    pub fn encode_parameters(snapshot: &ParameterSnapshot, buf: &mut BytesMut) -> MimicResult<()> {
        let count = u16::try_from(snapshot.len()).map_err(|_| {
            MimicError::InvalidWireFormat(format!("Too many parameters: {}", snapshot.len()))
        })?;

        buf.reserve(Self::parameters_size(snapshot));
        buf.put_u16_le(count);

        for descriptor in snapshot.iter() {
            let name = descriptor.name.as_bytes();
            let name_len = u16::try_from(name.len()).map_err(|_| {
                MimicError::InvalidWireFormat(format!("Parameter name too long: {}", name.len()))
            })?;

            buf.put_u16_le(name_len);
            buf.put_slice(name);
            buf.put_i32_le(descriptor.kind().code());
            buf.put_i64_le(descriptor.value.int_slot());
            buf.put_f32_le(descriptor.value.float_slot());
            buf.put_u8(descriptor.value.bool_slot() as u8);
        }

        Ok(())
    }

    /// Decode a parameter snapshot payload. The whole slice must be consumed.
    pub fn decode_parameters(mut data: &[u8]) -> MimicResult<ParameterSnapshot> {
        ensure_remaining(&data, 2)?;
        let count = data.get_u16_le() as usize;

        let mut snapshot = ParameterSnapshot::with_capacity(count);
        for _ in 0..count {
            ensure_remaining(&data, 2)?;
            let name_len = data.get_u16_le() as usize;

            ensure_remaining(&data, name_len + PARAMETER_ENTRY_FIXED_SIZE - 2)?;
            let name = std::str::from_utf8(&data[..name_len])
                .map_err(|_| MimicError::InvalidWireFormat("Parameter name is not utf-8".into()))?
                .to_owned();
            data.advance(name_len);

            let code = data.get_i32_le();
            let int = data.get_i64_le();
            let float = data.get_f32_le();
            let boolean = data.get_u8() != 0;

            let kind = ParameterKind::from_code(code).ok_or(MimicError::UnknownParameterKind(code))?;
            snapshot.push(ParameterDescriptor::new(
                name,
                ParameterValue::from_slots(kind, int, float, boolean),
            ));
        }

        if data.has_remaining() {
            return Err(MimicError::InvalidWireFormat(format!(
                "{} trailing bytes after parameter snapshot",
                data.remaining()
            )));
        }

        Ok(snapshot)
    }

    /// Append a state change payload to `buf`
    pub fn encode_state(change: &StateChange, buf: &mut BytesMut) {
        buf.reserve(STATE_CHANGE_SIZE);
        buf.put_i32_le(change.state_hash.0);
        buf.put_f32_le(change.normalized_time);
    }

    /// Decode a state change payload
    pub fn decode_state(mut data: &[u8]) -> MimicResult<StateChange> {
        if data.len() != STATE_CHANGE_SIZE {
            return Err(MimicError::InvalidWireFormat(format!(
                "State change payload must be {} bytes, got {}",
                STATE_CHANGE_SIZE,
                data.len()
            )));
        }

        let state_hash = StateHash::new(data.get_i32_le());
        let normalized_time = data.get_f32_le();
        Ok(StateChange::new(state_hash, normalized_time))
    }
}

fn ensure_remaining(data: &&[u8], needed: usize) -> MimicResult<()> {
    if data.remaining() < needed {
        return Err(MimicError::BufferTooShort {
            expected: needed,
            actual: data.remaining(),
        });
    }
    Ok(())
}
