//! Script opcode model, classification and output-template builders, grounded
//! on `original_source/src/script.c`'s `dogecoin_script_classify`/
//! `dogecoin_script_build_*` family.

pub mod error;

pub use error::ScriptError;

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CODESEPARATOR: u8 = 0xab;

/// One parsed script instruction: an opcode byte, plus the pushed data for
/// push opcodes (direct push and PUSHDATA1/2/4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub push_data: Option<Vec<u8>>,
}

/// The output-template kinds this crate recognizes by pattern-matching the
/// parsed opcode stream (never by comparing raw bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptKind {
    P2pkh,
    P2sh,
    Pubkey,
    Multisig { m: u8, n: u8, pubkeys: Vec<Vec<u8>> },
    Nonstandard,
}

/// Parses a raw script into its instruction sequence.
pub fn parse(script: &[u8]) -> Result<Vec<Instruction>, ScriptError> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < script.len() {
        let opcode = script[i];
        i += 1;
        let push_len = match opcode {
            0x01..=0x4b => Some(opcode as usize),
            OP_PUSHDATA1 => {
                let len = *script.get(i).ok_or(ScriptError::Truncated)? as usize;
                i += 1;
                Some(len)
            }
            OP_PUSHDATA2 => {
                let bytes = script.get(i..i + 2).ok_or(ScriptError::Truncated)?;
                i += 2;
                Some(u16::from_le_bytes([bytes[0], bytes[1]]) as usize)
            }
            OP_PUSHDATA4 => {
                let bytes = script.get(i..i + 4).ok_or(ScriptError::Truncated)?;
                i += 4;
                Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
            }
            _ => None,
        };

        match push_len {
            Some(len) => {
                let data = script.get(i..i + len).ok_or(ScriptError::Truncated)?;
                out.push(Instruction { opcode, push_data: Some(data.to_vec()) });
                i += len;
            }
            None => out.push(Instruction { opcode, push_data: None }),
        }
    }
    Ok(out)
}

fn write_instruction(out: &mut Vec<u8>, ins: &Instruction) {
    out.push(ins.opcode);
    if let Some(data) = &ins.push_data {
        match ins.opcode {
            OP_PUSHDATA1 => out.push(data.len() as u8),
            OP_PUSHDATA2 => out.extend_from_slice(&(data.len() as u16).to_le_bytes()),
            OP_PUSHDATA4 => out.extend_from_slice(&(data.len() as u32).to_le_bytes()),
            _ => {}
        }
        out.extend_from_slice(data);
    }
}

/// Drops every `OP_CODESEPARATOR` instruction from `src`, byte-for-byte
/// preserving everything else. Used by the sighash subscript step.
pub fn copy_without_op_codeseparator(src: &[u8]) -> Vec<u8> {
    let instructions = parse(src).unwrap_or_default();
    let mut out = Vec::with_capacity(src.len());
    for ins in instructions {
        if ins.opcode == OP_CODESEPARATOR {
            continue;
        }
        write_instruction(&mut out, &ins);
    }
    out
}

fn small_int_value(opcode: u8) -> Option<u8> {
    match opcode {
        OP_0 => Some(0),
        OP_1..=OP_16 => Some(opcode - OP_1 + 1),
        _ => None,
    }
}

fn small_int_opcode(v: u8) -> u8 {
    if v == 0 {
        OP_0
    } else {
        OP_1 + v - 1
    }
}

fn is_p2pkh(ins: &[Instruction]) -> bool {
    ins.len() == 5
        && ins[0].opcode == OP_DUP
        && ins[1].opcode == OP_HASH160
        && ins[2].push_data.as_ref().is_some_and(|d| d.len() == 20)
        && ins[3].opcode == OP_EQUALVERIFY
        && ins[4].opcode == OP_CHECKSIG
}

fn is_p2sh(ins: &[Instruction]) -> bool {
    ins.len() == 3
        && ins[0].opcode == OP_HASH160
        && ins[1].push_data.as_ref().is_some_and(|d| d.len() == 20)
        && ins[2].opcode == OP_EQUAL
}

fn is_pubkey(ins: &[Instruction]) -> bool {
    ins.len() == 2
        && ins[0].push_data.as_ref().is_some_and(|d| d.len() == 33 || d.len() == 65)
        && ins[1].opcode == OP_CHECKSIG
}

fn as_multisig(ins: &[Instruction]) -> Option<(u8, u8, Vec<Vec<u8>>)> {
    if ins.len() < 4 {
        return None;
    }
    let last = ins.last()?;
    if last.opcode != OP_CHECKMULTISIG {
        return None;
    }
    let m = small_int_value(ins[0].opcode)?;
    let n = small_int_value(ins[ins.len() - 2].opcode)?;
    if m == 0 || n == 0 || m > n || n > 16 {
        return None;
    }
    let pubkey_ins = &ins[1..ins.len() - 2];
    if pubkey_ins.len() != n as usize {
        return None;
    }
    let mut pubkeys = Vec::with_capacity(pubkey_ins.len());
    for p in pubkey_ins {
        let data = p.push_data.as_ref()?;
        if data.len() != 33 && data.len() != 65 {
            return None;
        }
        pubkeys.push(data.clone());
    }
    Some((m, n, pubkeys))
}

/// Classifies an already-parsed instruction sequence.
pub fn classify(ins: &[Instruction]) -> ScriptKind {
    if is_p2pkh(ins) {
        return ScriptKind::P2pkh;
    }
    if is_p2sh(ins) {
        return ScriptKind::P2sh;
    }
    if is_pubkey(ins) {
        return ScriptKind::Pubkey;
    }
    if let Some((m, n, pubkeys)) = as_multisig(ins) {
        return ScriptKind::Multisig { m, n, pubkeys };
    }
    ScriptKind::Nonstandard
}

/// Parses and classifies a raw script in one call.
pub fn classify_script(script: &[u8]) -> ScriptKind {
    match parse(script) {
        Ok(ins) => classify(&ins),
        Err(_) => ScriptKind::Nonstandard,
    }
}

fn push_data(out: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    if len <= 75 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.push(OP_PUSHDATA1);
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(OP_PUSHDATA2);
        out.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        out.push(OP_PUSHDATA4);
        out.extend_from_slice(&(len as u32).to_le_bytes());
    }
    out.extend_from_slice(data);
}

/// Builds a `pushdata(sig) pushdata(len)`-style push instruction for the
/// caller to assemble a `script_sig`.
pub fn push(out: &mut Vec<u8>, data: &[u8]) {
    push_data(out, data);
}

/// `OP_DUP OP_HASH160 <hash160> OP_EQUALVERIFY OP_CHECKSIG`.
pub fn build_p2pkh(hash160: &[u8; 20]) -> Vec<u8> {
    let mut out = Vec::with_capacity(25);
    out.push(OP_DUP);
    out.push(OP_HASH160);
    push_data(&mut out, hash160);
    out.push(OP_EQUALVERIFY);
    out.push(OP_CHECKSIG);
    out
}

/// `OP_HASH160 <hash160> OP_EQUAL`.
pub fn build_p2sh(hash160: &[u8; 20]) -> Vec<u8> {
    let mut out = Vec::with_capacity(23);
    out.push(OP_HASH160);
    push_data(&mut out, hash160);
    out.push(OP_EQUAL);
    out
}

/// `<m> <pubkey>* <n> OP_CHECKMULTISIG`, with `1 <= m <= n <= 16`.
pub fn build_multisig(m: u8, pubkeys: &[Vec<u8>]) -> Result<Vec<u8>, ScriptError> {
    let n = pubkeys.len();
    if m == 0 || n == 0 || (m as usize) > n || n > 16 {
        return Err(ScriptError::InvalidMultisigParams(m, n));
    }
    let mut out = Vec::new();
    out.push(small_int_opcode(m));
    for pk in pubkeys {
        push_data(&mut out, pk);
    }
    out.push(small_int_opcode(n as u8));
    out.push(OP_CHECKMULTISIG);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_p2pkh_pattern() {
        let hash = [7u8; 20];
        let script = build_p2pkh(&hash);
        let ins = parse(&script).unwrap();
        assert_eq!(classify(&ins), ScriptKind::P2pkh);
    }

    #[test]
    fn classifies_p2sh_pattern() {
        let hash = [9u8; 20];
        let script = build_p2sh(&hash);
        let ins = parse(&script).unwrap();
        assert_eq!(classify(&ins), ScriptKind::P2sh);
    }

    #[test]
    fn classifies_multisig_pattern() {
        let pubkeys: Vec<Vec<u8>> = (0..3).map(|i| vec![0x02u8; 32].into_iter().chain(std::iter::once(i)).collect()).collect();
        let script = build_multisig(2, &pubkeys).unwrap();
        let ins = parse(&script).unwrap();
        match classify(&ins) {
            ScriptKind::Multisig { m, n, pubkeys: recovered } => {
                assert_eq!(m, 2);
                assert_eq!(n, 3);
                assert_eq!(recovered, pubkeys);
            }
            other => panic!("expected multisig, got {other:?}"),
        }
    }

    #[test]
    fn rejects_multisig_with_m_greater_than_n() {
        let pubkeys: Vec<Vec<u8>> = vec![vec![0x02u8; 33]];
        assert_eq!(build_multisig(2, &pubkeys), Err(ScriptError::InvalidMultisigParams(2, 1)));
    }

    #[test]
    fn codeseparator_is_dropped_byte_exact_otherwise() {
        let mut script = build_p2pkh(&[1u8; 20]);
        script.push(OP_CODESEPARATOR);
        script.extend_from_slice(&build_p2sh(&[2u8; 20]));
        let stripped = copy_without_op_codeseparator(&script);
        let mut expected = build_p2pkh(&[1u8; 20]);
        expected.extend_from_slice(&build_p2sh(&[2u8; 20]));
        assert_eq!(stripped, expected);
    }

    #[test]
    fn truncated_pushdata1_is_an_error() {
        assert_eq!(parse(&[OP_PUSHDATA1]), Err(ScriptError::Truncated));
    }
}
