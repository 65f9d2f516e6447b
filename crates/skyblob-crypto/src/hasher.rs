use sha2::{Digest, Sha256, Sha512};
use skyblob_types::{CidVersion, ContentId, HashFunction, IdentifierError};

/// Hashes blob bytes under the function a [`ContentId`] declares.
///
/// The identifier is self-describing, so a single hasher serves every
/// supported [`HashFunction`]; the function is always taken from the
/// identifier being checked, never chosen by the caller.
pub struct BlobHasher;

impl BlobHasher {
    /// Raw digest of `data` under `function`.
    pub fn raw_digest(function: HashFunction, data: &[u8]) -> Vec<u8> {
        match function {
            HashFunction::Sha2_256 => Sha256::digest(data).to_vec(),
            HashFunction::Sha2_512 => Sha512::digest(data).to_vec(),
            HashFunction::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }

    /// Identifier for `data` with the same version, codec, and hash
    /// function as `template`.
    pub fn digest(template: &ContentId, data: &[u8]) -> Result<ContentId, IdentifierError> {
        let digest = Self::raw_digest(template.hash_function(), data);
        template.with_digest(&digest)
    }

    /// Returns `true` if `data` hashes to exactly `expected`.
    pub fn verify(expected: &ContentId, data: &[u8]) -> bool {
        Self::digest(expected, data).is_ok_and(|computed| computed == *expected)
    }

    /// CIDv1 for `data` under the given codec and hash function.
    pub fn cid_v1(
        codec: u64,
        function: HashFunction,
        data: &[u8],
    ) -> Result<ContentId, IdentifierError> {
        let digest = Self::raw_digest(function, data);
        ContentId::from_parts(CidVersion::V1, codec, function, &digest)
    }

    /// CIDv0 (DAG-PB, SHA2-256) for `data`.
    pub fn cid_v0(data: &[u8]) -> Result<ContentId, IdentifierError> {
        let digest = Self::raw_digest(HashFunction::Sha2_256, data);
        ContentId::from_parts(
            CidVersion::V0,
            skyblob_types::DAG_PB_CODEC,
            HashFunction::Sha2_256,
            &digest,
        )
    }

    /// Hex encoding of the identifier's digest, for log output.
    pub fn digest_hex(id: &ContentId) -> String {
        hex::encode(id.digest())
    }
}
