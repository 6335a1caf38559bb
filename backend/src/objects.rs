use sled::IVec;

use crate::{errors::PeducError, peer::PeerId};

/// Encoding of values stored in a sled tree. Implemented with `#[derive(StoredObject)]`.
pub trait ToFromStore<T> {
    fn to_object(&self) -> Result<Vec<u8>, PeducError>;
    fn from_object(b: &[u8]) -> Result<T, PeducError>;
}

impl PeerId {
    /// Big-endian so that tree order is id order.
    pub fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl TryFrom<&IVec> for PeerId {
    type Error = PeducError;

    fn try_from(key: &IVec) -> Result<Self, Self::Error> {
        let bytes: [u8; 8] = key[..]
            .try_into()
            .map_err(|_| PeducError::CorruptKey(key.to_vec()))?;
        Ok(PeerId(u64::from_be_bytes(bytes)))
    }
}

/// Posting lists and term lists of the search index.
pub(crate) fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, PeducError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, PeducError> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_sort_by_id() {
        let mut keys = vec![PeerId(300).to_key(), PeerId(2).to_key(), PeerId(17).to_key()];
        keys.sort();
        let ids: Vec<_> = keys
            .iter()
            .map(|k| PeerId::try_from(&IVec::from(&k[..])).unwrap())
            .collect();
        assert_eq!(ids, vec![PeerId(2), PeerId(17), PeerId(300)]);
    }

    #[test]
    fn short_key_is_corrupt() {
        let key = IVec::from(&[1u8, 2, 3][..]);
        assert!(matches!(PeerId::try_from(&key), Err(PeducError::CorruptKey(_))));
    }
}
