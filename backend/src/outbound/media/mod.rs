//! Image hosting for user avatars.

mod cloudinary;

pub use cloudinary::{CloudinaryAvatarStore, CloudinaryCredentials};
