use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ProductId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

impl Rating {
    pub const MAX_STARS: usize = 5;

    /// Number of whole stars lit for this rating, clamped to `0..=MAX_STARS`.
    pub fn filled_stars(&self) -> usize {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return 0;
        }
        (self.rate.floor() as usize).min(Self::MAX_STARS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: Rating,
}

