pub mod cloudinary;
pub mod replicate;
pub mod storage;
pub mod web;
