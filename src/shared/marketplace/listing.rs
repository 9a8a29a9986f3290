/**
 * Marketplace Listing
 *
 * A listing is created by its owner through `uploadListing` and becomes
 * inactive exactly once, when it is purchased. Prices are integers in the
 * smallest unit of the listing's currency symbol.
 */

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// A stored listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Storage-assigned identifier
    pub id: i64,
    /// Short title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Image URLs in display order
    pub images: Vec<String>,
    /// Price in the smallest currency unit
    pub price: i64,
    /// Currency symbol the price is expressed in
    pub symbol: String,
    /// False once the listing has been bought
    pub active: bool,
    /// Username of the seller
    pub owner: String,
}

/// The caller-supplied part of a listing
///
/// Owner, id and the active flag are never taken from the client: the owner
/// comes from the connection's bound identity and the rest from storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: i64,
    pub symbol: String,
}

impl NewListing {
    /// Reject listings that could never be sold
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.title.trim().is_empty() {
            return Err(SharedError::validation("title", "Listing title cannot be empty"));
        }
        if self.symbol.trim().is_empty() {
            return Err(SharedError::validation("symbol", "Currency symbol cannot be empty"));
        }
        if self.price <= 0 {
            return Err(SharedError::validation("price", "Price must be positive"));
        }
        if self.images.iter().any(|url| url.trim().is_empty()) {
            return Err(SharedError::validation("images", "Image URLs cannot be empty"));
        }
        Ok(())
    }

    /// Materialize the stored form of this listing
    pub fn into_listing(self, id: i64, owner: impl Into<String>) -> Listing {
        Listing {
            id,
            title: self.title,
            description: self.description,
            images: self.images,
            price: self.price,
            symbol: self.symbol,
            active: true,
            owner: owner.into(),
        }
    }
}
