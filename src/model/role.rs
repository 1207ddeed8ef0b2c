use strum_macros::{Display, EnumString};

/// Roles as the backend spells them in the token's `role` claim.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

impl Role {
    /// HR and Admin may read every employee's attendance.
    pub fn sees_all_attendance(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}
