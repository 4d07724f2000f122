//! Identity projection mappers

use desk_core::entities::{SellerRef, UserRef};
use desk_core::Role;

use crate::models::{SellerModel, UserModel};

/// Convert UserModel to UserRef
impl From<UserModel> for UserRef {
    fn from(model: UserModel) -> Self {
        UserRef {
            id: model.id,
            display_id: model.display_id,
            name: model.name,
            email: model.email,
            role: Role::parse_or_default(&model.role),
        }
    }
}

/// Convert SellerModel to SellerRef
impl From<SellerModel> for SellerRef {
    fn from(model: SellerModel) -> Self {
        SellerRef {
            id: model.id,
            brand_name: model.brand_name,
            slug: model.slug,
        }
    }
}
