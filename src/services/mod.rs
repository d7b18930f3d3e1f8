pub mod config;
pub mod file_controller;
pub mod ocr;
