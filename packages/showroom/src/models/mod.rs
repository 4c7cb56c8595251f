pub mod auth;
pub mod catalog;
pub mod contact;
pub mod draft;
pub mod media;
pub mod product;
pub mod shared;
