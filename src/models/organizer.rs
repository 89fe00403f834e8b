//! Organizer (university account) and authentication claims

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Organizer id of the read-only viewer account
pub const VIEWER_ID: i32 = 0;

/// Display name of the viewer account
pub const VIEWER_NAME: &str = "Visita";

/// Participating university
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Organizer {
    pub id: i32,
    pub name: String,
}

impl Organizer {
    /// The anonymous read-only viewer
    pub fn viewer() -> Self {
        Self {
            id: VIEWER_ID,
            name: VIEWER_NAME.to_string(),
        }
    }

    pub fn is_viewer(&self) -> bool {
        self.id == VIEWER_ID
    }

    /// Viewers may browse but never add, edit or delete
    pub fn require_editor(&self) -> Result<(), AppError> {
        if self.is_viewer() {
            Err(AppError::Authorization(
                "The viewer account cannot modify records".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// Only the owning organizer may touch a record
    pub fn require_owner(&self, owner_id: i32, what: &str) -> Result<(), AppError> {
        self.require_editor()?;
        if self.id == owner_id {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "{} belongs to another organizer",
                what
            )))
        }
    }
}

/// JWT claims for authenticated organizers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerClaims {
    pub sub: String,
    pub organizer_id: i32,
    pub organizer_name: String,
    pub exp: i64,
    pub iat: i64,
}

impl OrganizerClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn organizer(&self) -> Organizer {
        Organizer {
            id: self.organizer_id,
            name: self.organizer_name.clone(),
        }
    }
}
