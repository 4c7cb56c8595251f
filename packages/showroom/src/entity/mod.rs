pub mod category;
pub mod contact;
pub mod gallery_image;
pub mod intro_slide;
pub mod product;
pub mod promotion;
pub mod video;
pub mod website_image;
