mod home;
mod login;

pub use home::{COMING_SOON, HomePage, HomeStatus};
pub use login::{LoginField, LoginPage, LoginStatus};
