mod error;
mod export;
mod paths;
mod reply;
mod site;

pub use error::ServerError;
pub use reply::Reply;
pub use site::Site;
