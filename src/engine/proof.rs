use crate::model::step::{ProofToken, StepAction};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// How runner implementations mint their attestation tokens. The
/// engine treats every token as opaque; swapping in a real proof
/// system means swapping this implementation, nothing else.
pub trait ProofGenerator {
    fn prove(&self, action: &StepAction, output: &Value, now: i64) -> ProofToken;
}

/// Default generator: a structured proof record hashed to an opaque
/// `proof-<service>-<digest prefix>` token. Not a cryptographic
/// commitment; it attests only that a record of the invocation was
/// folded into the token.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestProofGenerator;

impl ProofGenerator for DigestProofGenerator {
    fn prove(&self, action: &StepAction, output: &Value, now: i64) -> ProofToken {
        let record = Value::Object(Map::from_iter([
            ("service".to_string(), Value::String(action.service.clone())),
            ("action".to_string(), Value::String(action.kind.clone())),
            (
                "parameters".to_string(),
                Value::Object(action.parameters.clone()),
            ),
            ("result".to_string(), output.clone()),
            ("timestamp".to_string(), Value::from(now)),
        ]));
        let mut hasher = Sha256::new();
        hasher.update(record.to_string().as_bytes());
        let digest = hasher.finalize();
        let hash = to_hex(&digest[..8]);
        ProofToken::new(format!("proof-{}-{hash}", action.service))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
