//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Listing endpoints go
//! through the core listing engine via [`crate::store::PgStore`].

pub mod application_repo;
pub mod bill_repo;
pub mod defaulter_repo;
pub mod installment_repo;
pub mod member_repo;
pub mod notification_repo;
pub mod plot_repo;
pub mod possession_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use application_repo::{ApplicationRepo, ApplicationTypeRepo};
pub use bill_repo::BillRepo;
pub use defaulter_repo::DefaulterRepo;
pub use installment_repo::InstallmentRepo;
pub use member_repo::MemberRepo;
pub use notification_repo::NotificationRepo;
pub use plot_repo::{PlotCategoryRepo, PlotRepo};
pub use possession_repo::PossessionRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
