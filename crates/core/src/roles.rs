//! Well-known role name constants.
//!
//! These must match the seed data in `20261001000001_create_roles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_VENDOR: &str = "vendor";
/// Warehouse person-in-charge; first reviewer of goods-receipt reports (BAPB).
pub const ROLE_PIC_GUDANG: &str = "pic_gudang";
/// Ordering/client person-in-charge; first reviewer of work-completion reports (BAPP).
pub const ROLE_PIC_PEMESAN: &str = "pic_pemesan";
/// Board-level approver; final review stage for both report kinds.
pub const ROLE_DIREKSI: &str = "direksi";

/// All role names seeded into the `roles` table.
pub const ALL_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_VENDOR,
    ROLE_PIC_GUDANG,
    ROLE_PIC_PEMESAN,
    ROLE_DIREKSI,
];

/// Returns `true` if `role` is one of the seeded role names.
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_recognised() {
        for role in ALL_ROLES {
            assert!(is_known_role(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(!is_known_role("reviewer"));
        assert!(!is_known_role(""));
        assert!(!is_known_role("Admin"));
    }
}
