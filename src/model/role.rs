#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Hr = 1,
    HrDirector = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Hr),
            2 => Some(Role::HrDirector),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// The two elevated roles allowed to review cross-user absence data.
    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::Hr | Role::HrDirector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        assert_eq!(Role::from_id(1), Some(Role::Hr));
        assert_eq!(Role::from_id(2), Some(Role::HrDirector));
        assert_eq!(Role::from_id(3), Some(Role::Employee));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn only_hr_roles_review() {
        assert!(Role::Hr.is_reviewer());
        assert!(Role::HrDirector.is_reviewer());
        assert!(!Role::Employee.is_reviewer());
    }
}
