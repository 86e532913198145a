#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn for_admin_flag(is_admin: bool) -> Self {
        if is_admin { Role::Admin } else { Role::User }
    }

    /// Admins may do anything a plain user can.
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => self == Role::Admin,
        }
    }
}

pub trait RequiredRole {
    fn required() -> Role;
}

pub struct AdminRole;

impl RequiredRole for AdminRole {
    fn required() -> Role {
        Role::Admin
    }
}
