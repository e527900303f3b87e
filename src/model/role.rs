#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    Manager = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::Manager),
            _ => None,
        }
    }

    /// Roles allowed to approve, reject or revoke requests.
    pub fn can_approve(self) -> bool {
        matches!(self, Role::Admin | Role::Hr | Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_managerial_roles_approve() {
        assert!(Role::Admin.can_approve());
        assert!(Role::Hr.can_approve());
        assert!(Role::Manager.can_approve());
        assert!(!Role::Employee.can_approve());
        assert_eq!(Role::from_id(9), None);
    }
}
