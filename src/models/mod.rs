pub mod admin;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::admin::{self, Entity as Admin};
}
