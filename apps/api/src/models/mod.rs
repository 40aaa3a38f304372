pub mod draft;
pub mod theme;
pub mod user;

pub use draft::Draft;
pub use theme::Theme;
pub use user::User;
