//! `copydesk-auth`: the permission authority and its RBAC catalog.
//!
//! This crate is intentionally decoupled from HTTP and storage: stores are
//! reached through the traits in [`store`], implemented in `copydesk-infra`.

pub mod authority;
pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod error;
pub mod permissions;
pub mod requests;
pub mod roles;
pub mod store;
pub mod user;

pub use authority::PermissionAuthority;
pub use authorize::{PermissionRequirement, RequiresPermission};
pub use catalog::{CatalogError, RbacCatalog};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use error::AccessError;
pub use permissions::{Action, Permission, PermissionCategory};
pub use requests::{AssignRoleRequest, ListUsersFilter, PaginatedUsers, UpdateUserPermissionsRequest};
pub use roles::{Role, RoleName};
pub use store::{CompanyStore, StoreError, UserQuery, UserQueryPage, UserStore};
pub use user::{Company, CompanyRef, User, UserPatch, UserView, UserWithCompany};
