//! Read-only identity projection models

use sqlx::FromRow;

/// Database model for the users reference table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: String,
    pub display_id: Option<String>,
    pub name: String,
    pub email: String,
    /// 'buyer', 'seller', 'support', 'admin'
    pub role: String,
}

/// Database model for the sellers reference table
#[derive(Debug, Clone, FromRow)]
pub struct SellerModel {
    pub id: String,
    pub brand_name: String,
    pub slug: String,
}
