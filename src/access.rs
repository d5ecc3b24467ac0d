//! Roles and what each may do.

use crate::error::AppError;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Tourist,
    Guide,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Tourist => "TOURIST",
            Role::Guide => "GUIDE",
            Role::Admin => "ADMIN",
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        use Capability::*;
        match capability {
            ListOwnBookings | ReadBookingMessages | ReadNotifications => true,
            ListAllBookings | ModerateUsers | ModerateListings => self == Role::Admin,
        }
    }

    /// Booking field that scopes this role's own bookings; `None` means every booking.
    pub fn booking_owner_field(self) -> Option<&'static str> {
        match self {
            Role::Tourist => Some("touristId"),
            Role::Guide => Some("guideId"),
            Role::Admin => None,
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TOURIST" => Ok(Role::Tourist),
            "GUIDE" => Ok(Role::Guide),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(AppError::Unauthorized(format!("unknown role: {}", s))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    ListOwnBookings,
    ListAllBookings,
    ReadBookingMessages,
    ReadNotifications,
    ModerateUsers,
    ModerateListings,
}

/// Fail with 403 unless `role` has `capability`.
pub fn require(role: Role, capability: Capability) -> Result<(), AppError> {
    if role.can(capability) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Access denied. Role {} may not {:?}",
            role, capability
        )))
    }
}
