use std::{fmt::Display, num::ParseIntError};

use macros::StoredObject;
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{FieldError, PeducError};

const NAME_MAX_LEN: usize = 100;
const EMAIL_MAX_LEN: usize = 254;
const BIO_MAX_LEN: usize = 2000;

/// Identity assigned by the store on first save.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> FromParam<'a> for PeerId {
    type Error = ParseIntError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse().map(PeerId)
    }
}

#[derive(
    Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema, StoredObject,
)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    /// Unset until the peer has been stored
    #[serde(default)]
    pub id: Option<PeerId>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Peer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: PeerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_bio(mut self, bio: &str) -> Self {
        self.bio = Some(bio.to_string());
        self
    }

    /// Text fields fed to the search index.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.email.as_deref())
            .chain(self.bio.as_deref())
    }

    /// Check the payload constraints. Every violated field is reported, not just the first.
    pub fn validate(&self) -> Result<(), PeducError> {
        let mut errors = vec![];

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be blank"));
        } else if self.name.chars().count() > NAME_MAX_LEN {
            errors.push(FieldError::new("name", "size must be at most 100"));
        }

        if let Some(email) = &self.email {
            if email.chars().count() > EMAIL_MAX_LEN {
                errors.push(FieldError::new("email", "size must be at most 254"));
            } else if !is_email(email) {
                errors.push(FieldError::new("email", "must be a well-formed email address"));
            }
        }

        if let Some(bio) = &self.bio {
            if bio.chars().count() > BIO_MAX_LEN {
                errors.push(FieldError::new("bio", "size must be at most 2000"));
            }
        }

        match errors.is_empty() {
            true => Ok(()),
            false => Err(PeducError::Validation(errors)),
        }
    }
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ToFromStore;

    #[test]
    fn missing_id_deserializes_as_unset() {
        let peer: Peer = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert_eq!(peer.id, None);
        assert_eq!(peer.name, "A");

        let peer: Peer = serde_json::from_str(r#"{"id":4,"name":"A","email":null}"#).unwrap();
        assert_eq!(peer.id, Some(PeerId(4)));
        assert_eq!(peer.email, None);
    }

    #[test]
    fn stored_encoding_keeps_every_field() {
        let peer = Peer::new("Ada")
            .with_id(PeerId(9))
            .with_email("ada@example.org")
            .with_bio("Teaches calculus");
        let bytes = peer.to_object().unwrap();
        assert_eq!(Peer::from_object(&bytes).unwrap(), peer);
    }

    #[test]
    fn validation_reports_all_fields() {
        let peer = Peer {
            id: None,
            name: "  ".to_string(),
            email: Some("nope".to_string()),
            bio: Some("x".repeat(BIO_MAX_LEN + 1)),
        };
        match peer.validate() {
            Err(PeducError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "bio"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_peer_passes() {
        assert!(Peer::new("Grace").with_email("grace@navy.mil").validate().is_ok());
        assert!(Peer::new("Grace").with_email("grace@").validate().is_err());
        assert!(Peer::new(&"n".repeat(NAME_MAX_LEN)).validate().is_ok());
        assert!(Peer::new(&"n".repeat(NAME_MAX_LEN + 1)).validate().is_err());
    }

    #[test]
    fn id_parses_from_path_segment() {
        assert_eq!(PeerId::from_param("12"), Ok(PeerId(12)));
        assert!(PeerId::from_param("twelve").is_err());
    }
}
