use std::fmt;
use std::str::FromStr;

use cid::{Cid, Version};
use multihash::Multihash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdentifierError;

/// Multicodec for unstructured bytes. Blobs are addressed with this codec.
pub const RAW_CODEC: u64 = 0x55;

/// Multicodec for DAG-PB. Every CIDv0 implicitly uses it.
pub const DAG_PB_CODEC: u64 = 0x70;

/// Multicodec for DAG-CBOR records.
pub const DAG_CBOR_CODEC: u64 = 0x71;

/// Hash functions a [`ContentId`] may declare in its multihash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashFunction {
    Sha2_256,
    Sha2_512,
    Blake3,
}

impl HashFunction {
    pub const ALL: [HashFunction; 3] = [Self::Sha2_256, Self::Sha2_512, Self::Blake3];

    /// Multicodec code of the function.
    pub const fn code(self) -> u64 {
        match self {
            Self::Sha2_256 => 0x12,
            Self::Sha2_512 => 0x13,
            Self::Blake3 => 0x1e,
        }
    }

    /// Length in bytes of a digest produced by this function.
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Sha2_256 | Self::Blake3 => 32,
            Self::Sha2_512 => 64,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    /// Multicodec table name (`sha2-256`, `sha2-512`, `blake3`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha2_256 => "sha2-256",
            Self::Sha2_512 => "sha2-512",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashFunction {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| IdentifierError::UnknownHashName(s.to_string()))
    }
}

/// Canonical, self-describing content identifier.
///
/// A `ContentId` wraps a CID whose multihash uses a supported
/// [`HashFunction`] with a digest of the correct length. The only way to
/// obtain one from text is [`ContentId::parse`], which rejects any input
/// that does not re-encode to exactly the same string. Two identifiers are
/// therefore equal iff their canonical string encodings are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId {
    cid: Cid,
    function: HashFunction,
}

impl ContentId {
    /// Decode `text`, requiring it to be the canonical encoding of a CID.
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        let cid = Cid::try_from(text).map_err(|e| IdentifierError::Malformed(e.to_string()))?;
        let id = Self::from_cid(cid)?;
        let canonical = id.to_string();
        if canonical != text {
            return Err(IdentifierError::NonCanonical {
                given: text.to_string(),
                canonical,
            });
        }
        Ok(id)
    }

    /// Build an identifier from its parts.
    ///
    /// A `Version::V0` identifier ignores `codec` (CIDv0 is always DAG-PB
    /// over SHA2-256) and fails for any other hash function.
    pub fn from_parts(
        version: Version,
        codec: u64,
        function: HashFunction,
        digest: &[u8],
    ) -> Result<Self, IdentifierError> {
        if digest.len() != function.digest_len() {
            return Err(IdentifierError::DigestLength {
                function,
                expected: function.digest_len(),
                actual: digest.len(),
            });
        }
        let hash = Multihash::<64>::wrap(function.code(), digest)
            .map_err(|e| IdentifierError::Malformed(e.to_string()))?;
        let cid = match version {
            Version::V0 => {
                Cid::new_v0(hash).map_err(|e| IdentifierError::Malformed(e.to_string()))?
            }
            Version::V1 => Cid::new_v1(codec, hash),
        };
        Ok(Self { cid, function })
    }

    /// Same version, codec, and hash function as `self`, with a new digest.
    pub fn with_digest(&self, digest: &[u8]) -> Result<Self, IdentifierError> {
        Self::from_parts(self.version(), self.codec(), self.function, digest)
    }

    fn from_cid(cid: Cid) -> Result<Self, IdentifierError> {
        let hash = cid.hash();
        let function = HashFunction::from_code(hash.code())
            .ok_or(IdentifierError::UnsupportedHash(hash.code()))?;
        if hash.digest().len() != function.digest_len() {
            return Err(IdentifierError::DigestLength {
                function,
                expected: function.digest_len(),
                actual: hash.digest().len(),
            });
        }
        Ok(Self { cid, function })
    }

    pub fn version(&self) -> Version {
        self.cid.version()
    }

    pub fn codec(&self) -> u64 {
        self.cid.codec()
    }

    /// The hash function declared by the multihash.
    pub fn hash_function(&self) -> HashFunction {
        self.function
    }

    /// The raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        self.cid.hash().digest()
    }

    pub fn as_cid(&self) -> &Cid {
        &self.cid
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.cid)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cid)
    }
}

impl FromStr for ContentId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw_v1(function: HashFunction, fill: u8) -> ContentId {
        let digest = vec![fill; function.digest_len()];
        ContentId::from_parts(Version::V1, RAW_CODEC, function, &digest).unwrap()
    }

    #[test]
    fn canonical_v1_parses_and_roundtrips() {
        let id = raw_v1(HashFunction::Sha2_256, 7);
        let text = id.to_string();
        assert!(text.starts_with('b'), "base32 CIDv1 expected: {text}");
        let parsed = ContentId::parse(&text).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), text);
        assert_eq!(parsed.codec(), RAW_CODEC);
        assert_eq!(parsed.hash_function(), HashFunction::Sha2_256);
    }

    #[test]
    fn canonical_v0_parses_and_roundtrips() {
        let id = ContentId::from_parts(Version::V0, DAG_PB_CODEC, HashFunction::Sha2_256, &[3; 32])
            .unwrap();
        let text = id.to_string();
        assert!(text.starts_with("Qm"));
        let parsed = ContentId::parse(&text).unwrap();
        assert_eq!(parsed.version(), Version::V0);
        assert_eq!(parsed.codec(), DAG_PB_CODEC);
        assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn v0_requires_sha2_256() {
        let err = ContentId::from_parts(Version::V0, DAG_PB_CODEC, HashFunction::Blake3, &[3; 32])
            .unwrap_err();
        assert!(matches!(err, IdentifierError::Malformed(_)));
    }

    #[test]
    fn uppercase_base32_is_rejected_as_non_canonical() {
        let text = raw_v1(HashFunction::Sha2_256, 9).to_string();
        let upper = text.to_uppercase();
        match ContentId::parse(&upper).unwrap_err() {
            IdentifierError::NonCanonical { given, canonical } => {
                assert_eq!(given, upper);
                assert_eq!(canonical, text);
            }
            other => panic!("expected NonCanonical, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        for text in ["", "not-a-cid", "bafy", "Qm"] {
            assert!(
                matches!(ContentId::parse(text), Err(IdentifierError::Malformed(_))),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn unsupported_hash_is_rejected() {
        // sha3-512
        let hash = Multihash::<64>::wrap(0x14, &[1; 64]).unwrap();
        let text = Cid::new_v1(RAW_CODEC, hash).to_string();
        assert_eq!(
            ContentId::parse(&text).unwrap_err(),
            IdentifierError::UnsupportedHash(0x14)
        );
    }

    #[test]
    fn truncated_digest_is_rejected() {
        let hash = Multihash::<64>::wrap(HashFunction::Sha2_256.code(), &[1; 20]).unwrap();
        let text = Cid::new_v1(RAW_CODEC, hash).to_string();
        assert!(matches!(
            ContentId::parse(&text).unwrap_err(),
            IdentifierError::DigestLength { expected: 32, actual: 20, .. }
        ));
    }

    #[test]
    fn with_digest_keeps_version_codec_and_function() {
        let id =
            ContentId::from_parts(Version::V1, DAG_CBOR_CODEC, HashFunction::Sha2_512, &[1; 64])
                .unwrap();
        let other = id.with_digest(&[2; 64]).unwrap();
        assert_eq!(other.version(), Version::V1);
        assert_eq!(other.codec(), DAG_CBOR_CODEC);
        assert_eq!(other.hash_function(), HashFunction::Sha2_512);
        assert_ne!(other, id);
        assert!(id.with_digest(&[2; 32]).is_err());
    }

    #[test]
    fn hash_function_names_roundtrip() {
        for f in HashFunction::ALL {
            assert_eq!(f.name().parse::<HashFunction>().unwrap(), f);
            assert_eq!(HashFunction::from_code(f.code()), Some(f));
        }
        assert!("md5".parse::<HashFunction>().is_err());
    }

    #[test]
    fn serde_uses_canonical_string() {
        let id = raw_v1(HashFunction::Blake3, 4);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ContentId>("\"nope\"").is_err());
    }

    fn any_function() -> impl Strategy<Value = HashFunction> {
        prop_oneof![
            Just(HashFunction::Sha2_256),
            Just(HashFunction::Sha2_512),
            Just(HashFunction::Blake3),
        ]
    }

    proptest! {
        #[test]
        fn parse_is_identity_on_canonical_text(
            function in any_function(),
            codec in prop_oneof![Just(RAW_CODEC), Just(DAG_CBOR_CODEC), Just(DAG_PB_CODEC)],
            seed in proptest::collection::vec(any::<u8>(), 64),
        ) {
            let digest = &seed[..function.digest_len()];
            let id = ContentId::from_parts(Version::V1, codec, function, digest).unwrap();
            let text = id.to_string();
            let parsed = ContentId::parse(&text).unwrap();
            prop_assert_eq!(parsed.to_string(), text);
            prop_assert_eq!(parsed, id);
        }

        #[test]
        fn parse_rejects_uppercase_reencoding(seed in proptest::collection::vec(any::<u8>(), 32)) {
            let id = ContentId::from_parts(Version::V1, RAW_CODEC, HashFunction::Sha2_256, &seed)
                .unwrap();
            let upper = id.to_string().to_uppercase();
            let is_non_canonical = matches!(
                ContentId::parse(&upper),
                Err(IdentifierError::NonCanonical { .. })
            );
            prop_assert!(is_non_canonical);
        }
    }
}
