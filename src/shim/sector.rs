// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a physical sector, assigned by the sector builder.
pub type SectorId = u64;

/// 32-byte commitment (`CommR`, `CommD`, `CommP`...).
pub type Commitment = [u8; 32];

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct PieceMetadata {
    pub piece_key: String,
    pub num_bytes: u64,
    pub comm_p: Option<Commitment>,
    pub piece_inclusion_proof: Option<Vec<u8>>,
}

/// What the sector builder reports once a sector has been sealed.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SealedSectorMetadata {
    pub sector_id: SectorId,
    pub sector_access: String,
    pub pieces: Vec<PieceMetadata>,
    pub comm_r_star: Commitment,
    pub comm_r: Commitment,
    pub comm_d: Commitment,
    pub proof: Vec<u8>,
}

impl SealedSectorMetadata {
    /// Returns the inclusion proof of the piece stored under `piece_key`, if the
    /// sector holds such a piece and the builder produced a proof for it.
    pub fn piece_inclusion_proof(&self, piece_key: &str) -> Option<&[u8]> {
        self.pieces
            .iter()
            .find(|piece| piece.piece_key == piece_key)
            .and_then(|piece| piece.piece_inclusion_proof.as_deref())
    }
}

// Proofs are large and unreadable; keep them out of logs.
impl fmt::Debug for SealedSectorMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SealedSectorMetadata")
            .field("sector_id", &self.sector_id)
            .field("sector_access", &self.sector_access)
            .field("pieces", &self.pieces)
            .field("comm_r_star", &self.comm_r_star)
            .field("comm_r", &self.comm_r)
            .field("comm_d", &self.comm_d)
            .field("proof_len", &self.proof.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_piece_inclusion_proof_by_key() {
        let meta = SealedSectorMetadata {
            sector_id: 42,
            pieces: vec![
                PieceMetadata {
                    piece_key: "a".into(),
                    num_bytes: 127,
                    ..Default::default()
                },
                PieceMetadata {
                    piece_key: "b".into(),
                    num_bytes: 254,
                    piece_inclusion_proof: Some(vec![1, 2, 3]),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(meta.piece_inclusion_proof("a"), None);
        assert_eq!(meta.piece_inclusion_proof("b"), Some(&[1u8, 2, 3][..]));
        assert_eq!(meta.piece_inclusion_proof("c"), None);
    }

    #[test]
    fn debug_omits_proof_bytes() {
        let meta = SealedSectorMetadata {
            sector_id: 7,
            proof: vec![0xAB; 192],
            ..Default::default()
        };
        let rendered = format!("{meta:?}");
        assert!(rendered.contains("proof_len: 192"));
        assert!(!rendered.contains("171"));
    }
}
